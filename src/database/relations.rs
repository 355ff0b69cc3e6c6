//! Relation repository.
//!
//! Favorites, likes and blocks share one collection keyed by
//! (user_id, kind, counterpart_id). Block sets are cached because every
//! search reads them.

use std::collections::HashSet;

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::{Stream, StreamExt};
use mongodb::Collection;
use mongodb::bson::{doc, to_document};
use mongodb::options::{FindOptions, UpdateOptions};
use tracing::debug;

use super::models::{Relation, RelationKind};
use super::mongo::{RELATIONS, is_duplicate_key};
use super::{Database, RelationStore};
use crate::cache::{CacheConfig, TypedCache};

/// Repository for user -> counterpart relations.
#[derive(Clone)]
pub struct RelationRepo {
    collection: Collection<Relation>,
    /// Requester id -> blocked counterpart ids.
    blocked_cache: TypedCache<i64, HashSet<i64>>,
}

impl RelationRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(RELATIONS),
            blocked_cache: TypedCache::new("blocked_sets", CacheConfig::block_sets()),
        }
    }
}

/// Counterpart ids in cursor order. One unreadable row fails the whole read,
/// so a block set is never silently missing an entry.
async fn collect_counterparts<S, E>(rows: &mut S, user_id: i64) -> Result<Vec<i64>>
where
    S: Stream<Item = std::result::Result<Relation, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    let mut ids = Vec::new();
    while let Some(row) = rows.next().await {
        let relation = row.with_context(|| format!("Unreadable relation for {}", user_id))?;
        ids.push(relation.counterpart_id);
    }
    Ok(ids)
}

#[async_trait]
impl RelationStore for RelationRepo {
    async fn insert(&self, relation: Relation) -> Result<bool> {
        let filter = doc! {
            "user_id": relation.user_id,
            "kind": relation.kind.as_str(),
            "counterpart_id": relation.counterpart_id,
        };
        let update = doc! { "$setOnInsert": to_document(&relation)? };
        let options = UpdateOptions::builder().upsert(true).build();

        let inserted = match self
            .collection
            .update_one(filter, update)
            .with_options(options)
            .await
        {
            Ok(result) => result.upserted_id.is_some(),
            Err(e) if is_duplicate_key(&e) => false,
            Err(e) => return Err(e).context("Failed to store relation"),
        };

        if relation.kind == RelationKind::Block {
            // Next search reloads the set from the database.
            self.blocked_cache.invalidate(&relation.user_id);
        }

        debug!(
            "{} {} -> {}: inserted={}",
            relation.kind.as_str(),
            relation.user_id,
            relation.counterpart_id,
            inserted
        );
        Ok(inserted)
    }

    async fn list(&self, user_id: i64, kind: RelationKind) -> Result<Vec<i64>> {
        let filter = doc! { "user_id": user_id, "kind": kind.as_str() };
        let options = FindOptions::builder()
            .sort(doc! { "created_at": 1, "_id": 1 })
            .build();

        let mut cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .context("Failed to query relations")?;

        collect_counterparts(&mut cursor, user_id).await
    }

    async fn blocked(&self, user_id: i64) -> Result<HashSet<i64>> {
        if let Some(blocked) = self.blocked_cache.get(&user_id) {
            return Ok(blocked);
        }

        let blocked: HashSet<i64> = self
            .list(user_id, RelationKind::Block)
            .await?
            .into_iter()
            .collect();
        self.blocked_cache.insert(user_id, blocked.clone());
        Ok(blocked)
    }
}
