//! Persistence: stored users and relation sets.
//!
//! Handlers talk to the [`UserStore`] and [`RelationStore`] traits; the
//! MongoDB repositories below are the production implementations.

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

mod models;
mod mongo;
mod relations;
mod users;

pub use models::*;
pub use mongo::Database;
pub use relations::RelationRepo;
pub use users::UserRepo;

/// Storage for users who sent "start".
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert unless a row for this VK id exists. Never overwrites.
    /// Returns `true` when a new row was written.
    async fn create_if_absent(&self, user: &BotUser) -> Result<bool>;

    async fn get(&self, user_id: i64) -> Result<Option<BotUser>>;
}

/// Storage for favorite / like / block sets.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// At-most-once insert per (user, counterpart, kind).
    /// Returns `true` when a new row was written.
    async fn insert(&self, relation: Relation) -> Result<bool>;

    /// Counterpart ids of one kind, in insertion order.
    async fn list(&self, user_id: i64, kind: RelationKind) -> Result<Vec<i64>>;

    /// Everyone this user blocked.
    async fn blocked(&self, user_id: i64) -> Result<HashSet<i64>> {
        Ok(self.list(user_id, RelationKind::Block).await?.into_iter().collect())
    }
}
