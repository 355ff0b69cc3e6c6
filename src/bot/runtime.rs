//! Bot runtime - event loop over Long Poll or Callback API.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::dispatcher::{AppState, build_router};
use super::queue::UserQueues;
use crate::config::{BotMode, Config};
use crate::vk::callback::{self, CallbackSettings};
use crate::vk::longpoll::LongPoll;
use crate::vk::{MessageSink, VkClient};

/// Inbound messages buffered between the transport and the handlers.
const EVENT_BUFFER: usize = 256;

/// Run the bot with the configured transport until Ctrl+C.
///
/// `group_client` must carry the community token: it runs the long poll and
/// is usually also the `sink`.
pub async fn run(
    config: &Config,
    state: AppState,
    sink: Arc<dyn MessageSink>,
    group_client: VkClient,
) -> Result<()> {
    let router = Arc::new(build_router());
    info!("Router ready with {} commands", router.commands().len());

    let (tx, mut rx) = mpsc::channel(EVENT_BUFFER);

    let transport = match config.bot_mode {
        BotMode::LongPoll => {
            info!("Starting bot in long poll mode...");
            let long_poll = LongPoll::connect(group_client, config.group_id).await?;
            tokio::spawn(long_poll.listen(tx))
        }
        BotMode::Callback => {
            info!("Starting bot in callback mode...");
            let settings = CallbackSettings {
                group_id: config.group_id,
                confirmation: config.callback_confirmation.clone().unwrap_or_default(),
                secret: config.callback_secret.clone(),
            };
            tokio::spawn(callback::serve(config.callback_port, settings, tx))
        }
    };

    let queues = UserQueues::new(state, router, sink);

    loop {
        tokio::select! {
            received = rx.recv() => {
                let Some(message) = received else {
                    warn!("Transport stopped");
                    break;
                };
                queues.submit(message);
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down");
                break;
            }
        }
    }

    if transport.is_finished() {
        match transport.await {
            Ok(Err(e)) => error!("Transport failed: {:#}", e),
            Err(e) => error!("Transport task panicked: {}", e),
            Ok(Ok(())) => {}
        }
    } else {
        transport.abort();
    }

    Ok(())
}
