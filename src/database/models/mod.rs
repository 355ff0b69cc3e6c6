//! Database models.

pub mod relation;
pub mod user;

pub use relation::{Relation, RelationKind};
pub use user::{BotUser, Sex};
