//! Bots Long Poll API listener.
//!
//! Fetches a long poll server for the community and keeps asking it for new
//! events, recovering from the `failed` codes VK documents.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use url::Url;

use super::client::VkClient;
use super::event::{GroupEvent, IncomingMessage};

/// Seconds VK holds a check request open.
const WAIT_SECS: u64 = 25;

/// Pause after a transport error before polling again.
const RETRY_DELAY: Duration = Duration::from_secs(3);

/// VK sends `ts` as a string, older servers as a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawTs {
    Text(String),
    Number(u64),
}

impl From<RawTs> for String {
    fn from(ts: RawTs) -> Self {
        match ts {
            RawTs::Text(s) => s,
            RawTs::Number(n) => n.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServerInfo {
    key: String,
    server: String,
    ts: RawTs,
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    ts: Option<RawTs>,
    #[serde(default)]
    updates: Vec<GroupEvent>,
    #[serde(default)]
    failed: Option<u8>,
}

/// What to do after a check.
#[derive(Debug, PartialEq)]
enum Step {
    Events {
        ts: Option<String>,
        events: Vec<GroupEvent>,
    },
    /// History is partially lost; continue from the new ts.
    NewTs(String),
    /// Key expired; fetch a new key and keep the ts.
    RefreshKey,
    /// Key and ts are gone; start over.
    RefreshAll,
}

/// Long poll session for one community.
pub struct LongPoll {
    client: VkClient,
    group_id: u64,
    server: String,
    key: String,
    ts: String,
}

impl LongPoll {
    /// Request a long poll server for the community.
    pub async fn connect(client: VkClient, group_id: u64) -> Result<Self> {
        let info = fetch_server(&client, group_id).await?;
        info!("Long poll server acquired for group {}", group_id);

        Ok(Self {
            client,
            group_id,
            server: info.server,
            key: info.key,
            ts: info.ts.into(),
        })
    }

    /// Run until the receiving side is dropped.
    pub async fn listen(mut self, events: mpsc::Sender<IncomingMessage>) -> Result<()> {
        loop {
            let batch = match self.poll().await {
                Ok(batch) => batch,
                Err(e) => {
                    warn!("Long poll check failed: {:#}", e);
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for event in batch {
                if let Some(message) = event.into_message() {
                    if events.send(message).await.is_err() {
                        info!("Event receiver closed, stopping long poll");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// One check round. Returns the events received (possibly none).
    async fn poll(&mut self) -> Result<Vec<GroupEvent>> {
        let url = check_url(&self.server, &self.key, &self.ts, WAIT_SECS)?;

        let response: CheckResponse = self
            .client
            .http()
            .get(url)
            .timeout(Duration::from_secs(WAIT_SECS + 10))
            .send()
            .await
            .context("Long poll request failed")?
            .json()
            .await
            .context("Long poll response is not JSON")?;

        match interpret(response) {
            Step::Events { ts, events } => {
                debug!("Long poll returned {} events", events.len());
                if let Some(ts) = ts {
                    self.ts = ts;
                }
                Ok(events)
            }
            Step::NewTs(ts) => {
                warn!("Long poll history lost, skipping to ts {}", ts);
                self.ts = ts;
                Ok(Vec::new())
            }
            Step::RefreshKey => {
                let info = fetch_server(&self.client, self.group_id).await?;
                self.server = info.server;
                self.key = info.key;
                Ok(Vec::new())
            }
            Step::RefreshAll => {
                let info = fetch_server(&self.client, self.group_id).await?;
                self.server = info.server;
                self.key = info.key;
                self.ts = info.ts.into();
                Ok(Vec::new())
            }
        }
    }
}

async fn fetch_server(client: &VkClient, group_id: u64) -> Result<ServerInfo> {
    client
        .call("groups.getLongPollServer", &[("group_id", group_id.to_string())])
        .await
        .context("groups.getLongPollServer failed")
}

fn check_url(server: &str, key: &str, ts: &str, wait: u64) -> Result<Url> {
    let mut url = Url::parse(server).with_context(|| format!("Bad long poll server '{}'", server))?;
    url.query_pairs_mut()
        .append_pair("act", "a_check")
        .append_pair("key", key)
        .append_pair("ts", ts)
        .append_pair("wait", &wait.to_string());
    Ok(url)
}

fn interpret(response: CheckResponse) -> Step {
    match response.failed {
        Some(1) => Step::NewTs(response.ts.map(String::from).unwrap_or_default()),
        Some(2) => Step::RefreshKey,
        Some(_) => Step::RefreshAll,
        None => Step::Events {
            ts: response.ts.map(String::from),
            events: response.updates,
        },
    }
}
