//! User repository with cache-first reads.

use anyhow::{Context, Result};
use async_trait::async_trait;
use mongodb::Collection;
use mongodb::bson::{doc, to_document};
use mongodb::options::UpdateOptions;
use tracing::debug;

use super::models::BotUser;
use super::mongo::{USERS, is_duplicate_key};
use super::{Database, UserStore};
use crate::cache::{CacheConfig, TypedCache};

/// Repository for bot users.
#[derive(Clone)]
pub struct UserRepo {
    collection: Collection<BotUser>,
    cache_by_id: TypedCache<i64, BotUser>,
}

impl UserRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS),
            cache_by_id: TypedCache::new("users_by_id", CacheConfig::stored_users()),
        }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn create_if_absent(&self, user: &BotUser) -> Result<bool> {
        if self.cache_by_id.get(&user.user_id).is_some() {
            return Ok(false);
        }

        // $setOnInsert leaves an existing row untouched.
        let filter = doc! { "user_id": user.user_id };
        let update = doc! { "$setOnInsert": to_document(user)? };
        let options = UpdateOptions::builder().upsert(true).build();

        let inserted = match self
            .collection
            .update_one(filter, update)
            .with_options(options)
            .await
        {
            Ok(result) => result.upserted_id.is_some(),
            Err(e) if is_duplicate_key(&e) => false,
            Err(e) => return Err(e).context("Failed to store user"),
        };

        if inserted {
            self.cache_by_id.insert(user.user_id, user.clone());
        }

        debug!("create_if_absent user {}: inserted={}", user.user_id, inserted);
        Ok(inserted)
    }

    async fn get(&self, user_id: i64) -> Result<Option<BotUser>> {
        if let Some(user) = self.cache_by_id.get(&user_id) {
            return Ok(Some(user));
        }

        let result = self
            .collection
            .find_one(doc! { "user_id": user_id })
            .await
            .context("Failed to load user")?;

        if let Some(user) = &result {
            self.cache_by_id.insert(user_id, user.clone());
        }

        Ok(result)
    }
}
