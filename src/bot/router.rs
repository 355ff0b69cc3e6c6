//! Command router.
//!
//! Maps a normalized command string to exactly one handler. Anything not
//! registered goes to the fallback handler, so dispatch always produces a
//! reply.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info, warn};

use super::dispatcher::AppState;
use super::reply::Reply;
use super::session::Session;
use crate::error::BotError;
use crate::vk::IncomingMessage;

/// Everything a handler may look at or change.
pub struct CommandContext<'a> {
    pub state: &'a AppState,
    pub message: &'a IncomingMessage,
    pub session: &'a mut Session,
}

impl CommandContext<'_> {
    /// VK id of the requester.
    pub fn user_id(&self) -> i64 {
        self.message.from_id
    }

    pub fn locale(&self) -> &str {
        &self.state.locale
    }
}

/// A command implementation.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError>;
}

/// Registry of command handlers, built once at startup.
pub struct CommandRouter {
    handlers: HashMap<String, Arc<dyn CommandHandler>>,
    fallback: Arc<dyn CommandHandler>,
}

/// Case-insensitive, whitespace-insensitive command key.
pub fn normalize(command: &str) -> String {
    command
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl CommandRouter {
    pub fn new(fallback: Arc<dyn CommandHandler>) -> Self {
        Self {
            handlers: HashMap::new(),
            fallback,
        }
    }

    /// Register or replace the handler for `command`. Last registration wins.
    pub fn register(&mut self, command: &str, handler: Arc<dyn CommandHandler>) {
        let key = normalize(command);
        if key.is_empty() {
            warn!("Refusing to register an empty command");
            return;
        }
        if self.handlers.insert(key.clone(), handler).is_some() {
            debug!("Handler for '{}' replaced", key);
        }
    }

    /// Registered commands, sorted.
    pub fn commands(&self) -> Vec<String> {
        let mut commands: Vec<String> = self.handlers.keys().cloned().collect();
        commands.sort();
        commands
    }

    /// Run the handler for `command` and turn its outcome into a reply.
    pub async fn dispatch(&self, command: &str, ctx: &mut CommandContext<'_>) -> Reply {
        let key = normalize(command);
        let handler = match self.handlers.get(&key) {
            Some(handler) => {
                info!("User {} -> '{}'", ctx.user_id(), key);
                handler
            }
            None => {
                debug!("Unknown command '{}' from {}", key, ctx.user_id());
                &self.fallback
            }
        };

        match handler.handle(ctx).await {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_expected() {
                    info!("'{}' for {} ended with: {}", key, ctx.user_id(), e);
                } else {
                    error!("'{}' for {} failed: {}", key, ctx.user_id(), e);
                }
                Reply::text(e.user_message(ctx.locale()))
            }
        }
    }
}
