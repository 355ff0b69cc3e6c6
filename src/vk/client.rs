//! VK API client.
//!
//! One client per access token: the community token sends messages and runs
//! the long poll, the user token does profile lookups and searches.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::types::{Candidate, Photo, Profile, SearchFilter, rank_photos};
use super::{MessageSink, SocialNetwork};
use crate::bot::Reply;
use crate::cache::{CacheConfig, TypedCache};

const API_BASE: &str = "https://api.vk.com/method";

/// `users.get` accepts at most this many ids per call.
const PROFILE_BATCH: usize = 1000;

/// Failure of a single VK API call.
#[derive(Debug, Error)]
pub enum VkError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("VK API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("unexpected VK response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("VK response had neither `response` nor `error`")]
    Empty,
}

impl VkError {
    /// Access denied, private profile, deleted or banned user.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::Api { code: 15 | 18 | 30 | 113, .. })
    }
}

#[derive(Deserialize)]
struct Envelope<T> {
    response: Option<T>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error_code: i64,
    error_msg: String,
}

#[derive(Deserialize)]
struct ItemList<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Deserialize)]
struct CityItem {
    id: i64,
}

/// Thin wrapper over the VK HTTP API.
#[derive(Clone)]
pub struct VkClient {
    http: reqwest::Client,
    token: String,
    version: String,
    base_url: String,
    /// Lowercased city title -> VK city id.
    city_ids: TypedCache<String, i64>,
}

impl VkClient {
    pub fn new(token: impl Into<String>, version: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            token: token.into(),
            version: version.into(),
            base_url: API_BASE.to_string(),
            city_ids: TypedCache::new("city_ids", CacheConfig::city_lookup()),
        })
    }

    /// Underlying HTTP client, shared with the long poll loop.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Call an API method and decode its `response` field.
    pub async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, VkError> {
        let mut form: Vec<(&str, &str)> = params.iter().map(|(k, v)| (*k, v.as_str())).collect();
        form.push(("access_token", self.token.as_str()));
        form.push(("v", self.version.as_str()));

        let body = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .form(&form)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        debug!("VK {} -> {} bytes", method, body.len());
        decode_envelope(&body)
    }
}

fn decode_envelope<T: DeserializeOwned>(body: &str) -> Result<T, VkError> {
    let envelope: Envelope<T> = serde_json::from_str(body)?;
    match (envelope.response, envelope.error) {
        (_, Some(error)) => Err(VkError::Api {
            code: error.error_code,
            message: error.error_msg,
        }),
        (Some(response), None) => Ok(response),
        (None, None) => Err(VkError::Empty),
    }
}

#[async_trait]
impl SocialNetwork for VkClient {
    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>> {
        let params = [
            ("user_ids", user_id.to_string()),
            ("fields", "sex,city,bdate,domain".to_string()),
        ];

        let profiles: Vec<Profile> = match self.call("users.get", &params).await {
            Ok(profiles) => profiles,
            Err(e) if e.is_access_denied() => {
                warn!("Profile {} is not accessible: {}", user_id, e);
                return Ok(None);
            }
            Err(e) => return Err(e).context("users.get failed"),
        };

        Ok(profiles
            .into_iter()
            .find(|p| p.id == user_id)
            .filter(|p| p.deactivated.is_none()))
    }

    async fn get_profiles(&self, user_ids: &[i64]) -> Result<Vec<Profile>> {
        let mut profiles = Vec::with_capacity(user_ids.len());

        for chunk in user_ids.chunks(PROFILE_BATCH) {
            let ids = chunk
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            let params = [("user_ids", ids), ("fields", "domain".to_string())];
            let batch: Vec<Profile> = self
                .call("users.get", &params)
                .await
                .context("users.get (batch) failed")?;
            profiles.extend(batch);
        }

        Ok(profiles)
    }

    async fn resolve_city(&self, title: &str) -> Result<Option<i64>> {
        let key = title.trim().to_lowercase();
        if key.is_empty() {
            return Ok(None);
        }
        if let Some(id) = self.city_ids.get(&key) {
            return Ok(Some(id));
        }

        let params = [("q", title.trim().to_string()), ("count", "1".to_string())];
        let cities: ItemList<CityItem> = self
            .call("database.getCities", &params)
            .await
            .context("database.getCities failed")?;

        let id = cities.items.first().map(|c| c.id);
        if let Some(id) = id {
            self.city_ids.insert(key, id);
        }
        Ok(id)
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Candidate>> {
        let params = [
            ("sex", u8::from(filter.sex).to_string()),
            ("age_from", filter.age_from.to_string()),
            ("age_to", filter.age_to.to_string()),
            ("city", filter.city_id.to_string()),
            ("has_photo", "1".to_string()),
            ("offset", filter.offset.to_string()),
            ("count", filter.count.to_string()),
            ("fields", "sex,domain,is_closed".to_string()),
        ];

        let page: ItemList<Candidate> = self
            .call("users.search", &params)
            .await
            .context("users.search failed")?;

        debug!(
            "users.search offset={} returned {} items",
            filter.offset,
            page.items.len()
        );
        Ok(page.items)
    }

    async fn top_photos(&self, user_id: i64, count: usize) -> Result<Vec<String>> {
        let params = [
            ("owner_id", user_id.to_string()),
            ("album_id", "profile".to_string()),
            ("extended", "1".to_string()),
            ("count", "100".to_string()),
        ];

        let photos: ItemList<Photo> = match self.call("photos.get", &params).await {
            Ok(photos) => photos,
            Err(e) if e.is_access_denied() => return Ok(Vec::new()),
            Err(e) => return Err(e).context("photos.get failed"),
        };

        Ok(rank_photos(photos.items, count))
    }
}

#[async_trait]
impl MessageSink for VkClient {
    async fn send(&self, peer_id: i64, reply: &Reply) -> Result<()> {
        let mut params = vec![
            ("peer_id", peer_id.to_string()),
            ("message", reply.text.clone()),
            ("random_id", rand::random::<i32>().to_string()),
        ];

        if !reply.attachments.is_empty() {
            params.push(("attachment", reply.attachments.join(",")));
        }
        if let Some(keyboard) = &reply.keyboard {
            params.push(("keyboard", keyboard.to_json()?));
        }

        let _message_id: serde_json::Value = self
            .call("messages.send", &params)
            .await
            .with_context(|| format!("messages.send to {} failed", peer_id))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_response() {
        let items: ItemList<CityItem> =
            decode_envelope(r#"{"response": {"count": 1, "items": [{"id": 1, "title": "Москва"}]}}"#)
                .unwrap();
        assert_eq!(items.items[0].id, 1);
    }

    #[test]
    fn test_decode_api_error() {
        let err = decode_envelope::<serde_json::Value>(
            r#"{"error": {"error_code": 30, "error_msg": "This profile is private"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, VkError::Api { code: 30, .. }));
        assert!(err.is_access_denied());
    }

    #[test]
    fn test_decode_garbage() {
        assert!(matches!(
            decode_envelope::<serde_json::Value>("<html>"),
            Err(VkError::Decode(_))
        ));
        assert!(matches!(
            decode_envelope::<serde_json::Value>("{}"),
            Err(VkError::Empty)
        ));
    }

    #[test]
    fn test_rate_limit_is_not_access_denied() {
        let err = VkError::Api {
            code: 6,
            message: "Too many requests per second".to_string(),
        };
        assert!(!err.is_access_denied());
    }
}
