//! vkinder - VK dating chat-bot
//!
//! Finds people of the opposite sex, similar age and the same city, shows
//! them one at a time and remembers favorites, likes and blocks.
//!
//! ## Architecture
//!
//! - `config` - Environment configuration
//! - `database` - MongoDB user and relation stores
//! - `cache` - Moka-backed typed caches
//! - `vk` - VK API client, Long Poll and Callback API transports
//! - `matching` - Candidate search and decisions
//! - `bot` - Router, sessions and the event loop
//! - `plugins` - Command handlers (extensible)
//! - `i18n` - Reply texts and command words

mod bot;
mod cache;
mod config;
mod database;
mod error;
mod i18n;
mod matching;
mod plugins;
mod vk;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bot::AppState;
use config::Config;
use database::{Database, RelationRepo, UserRepo};
use vk::VkClient;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    // If RUST_LOG is not set, default to "info" level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vkinder=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .init();

    info!("Starting vkinder bot...");

    i18n::init();

    let config = Config::from_env().context("invalid configuration")?;
    info!("Configuration loaded successfully");
    info!("Bot mode: {:?}, group: {}", config.bot_mode, config.group_id);

    info!("Connecting to MongoDB...");
    let db = Database::connect(&config.mongodb_uri, &config.mongodb_database).await?;
    db.ensure_indexes().await?;
    info!("Database connected");

    let users = Arc::new(UserRepo::new(&db));
    let relations = Arc::new(RelationRepo::new(&db));

    // Search and photos need a user token; messages and long poll need the community token.
    let social = Arc::new(VkClient::new(&config.user_token, &config.api_version)?);
    let group = VkClient::new(&config.group_token, &config.api_version)?;
    let sink = Arc::new(group.clone());

    let locale = i18n::resolve_locale(config.locale.as_deref());
    info!("Reply language: {}", locale);

    let state = AppState::new(social, users, relations, locale);

    bot::run(&config, state, sink, group).await?;

    info!("Bot stopped");
    Ok(())
}
