//! VK platform layer.
//!
//! The bot core only sees the [`SocialNetwork`] and [`MessageSink`] traits.
//! [`VkClient`] implements both over the VK HTTP API; inbound events arrive
//! through [`longpoll`] or [`callback`].

use anyhow::Result;
use async_trait::async_trait;

pub mod callback;
mod client;
mod event;
pub mod longpoll;
pub mod types;

pub use client::VkClient;
pub use event::IncomingMessage;
pub use types::{Candidate, Profile, SearchFilter};

use crate::bot::Reply;

/// Profile, city, search and photo lookups.
#[async_trait]
pub trait SocialNetwork: Send + Sync {
    /// `Ok(None)` when the profile is private, deleted or banned.
    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>>;

    /// Batched lookup; unknown ids are simply missing from the result.
    async fn get_profiles(&self, user_ids: &[i64]) -> Result<Vec<Profile>>;

    /// City title -> VK city id.
    async fn resolve_city(&self, title: &str) -> Result<Option<i64>>;

    /// One page of candidates, in the order VK returns them.
    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Candidate>>;

    /// Photo attachment refs, most liked first, at most `count`.
    async fn top_photos(&self, user_id: i64, count: usize) -> Result<Vec<String>>;
}

/// Outbound replies.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, peer_id: i64, reply: &Reply) -> Result<()>;
}
