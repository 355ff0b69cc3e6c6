//! Per-user inbound queues.
//!
//! Each user with pending messages has one worker task fed by an unbounded
//! channel. Messages of one user are handled one at a time, in arrival
//! order. Different users run in parallel. A worker exits after a quiet
//! period, and the next message starts a new one.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error};

use super::dispatcher::AppState;
use super::router::{CommandContext, CommandRouter};
use crate::vk::{IncomingMessage, MessageSink};

/// How long a worker waits for the next message before exiting.
const WORKER_IDLE: Duration = Duration::from_secs(60);

struct Handler {
    state: AppState,
    router: Arc<CommandRouter>,
    sink: Arc<dyn MessageSink>,
}

/// Routes inbound messages to per-user workers.
#[derive(Clone)]
pub struct UserQueues {
    queues: Arc<DashMap<i64, UnboundedSender<IncomingMessage>>>,
    handler: Arc<Handler>,
    idle: Duration,
}

impl UserQueues {
    pub fn new(state: AppState, router: Arc<CommandRouter>, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            queues: Arc::new(DashMap::new()),
            handler: Arc::new(Handler {
                state,
                router,
                sink,
            }),
            idle: WORKER_IDLE,
        }
    }

    #[cfg(test)]
    fn with_idle(mut self, idle: Duration) -> Self {
        self.idle = idle;
        self
    }

    /// Queue a message behind the sender's earlier ones. Never blocks.
    pub fn submit(&self, message: IncomingMessage) {
        let user_id = message.from_id;
        // The entry guard is held while sending, so a worker cannot retire
        // between the emptiness check and this send.
        match self.queues.entry(user_id) {
            Entry::Occupied(mut entry) => {
                if let Err(mpsc::error::SendError(message)) = entry.get().send(message) {
                    debug!("Worker for {} is gone, starting a new one", user_id);
                    let (tx, rx) = mpsc::unbounded_channel();
                    let _ = tx.send(message);
                    entry.insert(tx);
                    self.spawn_worker(user_id, rx);
                }
            }
            Entry::Vacant(entry) => {
                let (tx, rx) = mpsc::unbounded_channel();
                let _ = tx.send(message);
                entry.insert(tx);
                self.spawn_worker(user_id, rx);
            }
        }
    }

    /// Users with a live worker.
    #[cfg(test)]
    fn active(&self) -> usize {
        self.queues.len()
    }

    fn spawn_worker(&self, user_id: i64, rx: UnboundedReceiver<IncomingMessage>) {
        let queues = self.clone();
        tokio::spawn(async move { queues.work(user_id, rx).await });
    }

    async fn work(self, user_id: i64, mut rx: UnboundedReceiver<IncomingMessage>) {
        loop {
            match tokio::time::timeout(self.idle, rx.recv()).await {
                Ok(Some(message)) => self.handler.handle(message).await,
                Ok(None) => break,
                Err(_) => {
                    // Retire only if nothing arrived meanwhile.
                    if self
                        .queues
                        .remove_if(&user_id, |_, _| rx.is_empty())
                        .is_some()
                    {
                        debug!("Worker for {} retired", user_id);
                        break;
                    }
                }
            }
        }
    }
}

impl Handler {
    async fn handle(&self, message: IncomingMessage) {
        let mut session = self.state.sessions.lock(message.from_id).await;
        let command = message.command();

        let reply = {
            let mut ctx = CommandContext {
                state: &self.state,
                message: &message,
                session: &mut session,
            };
            self.router.dispatch(&command, &mut ctx).await
        };

        if let Err(e) = self.sink.send(message.peer_id, &reply).await {
            error!("Failed to send reply to {}: {:#}", message.peer_id, e);
        }
    }
}
