//! Bot module - routing, sessions, per-user queues and the event loop.

pub mod dispatcher;
pub mod keyboard;
mod queue;
mod reply;
pub mod router;
mod runtime;
pub mod session;

pub use dispatcher::AppState;
pub use reply::Reply;
pub use router::{CommandContext, CommandHandler, CommandRouter};
pub use runtime::run;
pub use session::Session;
