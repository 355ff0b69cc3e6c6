//! Cache module - thin typed layer over Moka.
//!
//! Repositories and the VK client each own their caches:
//! - stored users by VK id
//! - block sets by requester id (read on every search)
//! - city title -> VK city id
//!
//! ```rust
//! let cities: TypedCache<String, i64> = TypedCache::new("city_ids", CacheConfig::city_lookup());
//! cities.insert("москва".to_string(), 1);
//! ```

mod config;
mod typed;

pub use config::CacheConfig;
pub use typed::TypedCache;
