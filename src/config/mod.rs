//! Configuration module for the vkinder bot.
//!
//! Loads configuration from environment variables (and `.env`).

use std::env;

use anyhow::{Context, Result, bail};

/// How inbound events reach the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BotMode {
    /// Bots Long Poll API (the bot pulls events).
    #[default]
    LongPoll,
    /// Callback API (VK pushes events to our HTTP endpoint).
    Callback,
}

impl BotMode {
    /// An empty value selects the default.
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "longpoll" | "long_poll" | "polling" => Ok(Self::LongPoll),
            "callback" | "webhook" => Ok(Self::Callback),
            other => bail!("BOT_MODE must be 'longpoll' or 'callback', got '{}'", other),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    // VK
    /// Community token: long poll and `messages.send`.
    pub group_token: String,
    /// User token: `users.search`, `photos.get` and friends need one.
    pub user_token: String,
    pub group_id: u64,
    pub api_version: String,

    pub bot_mode: BotMode,
    pub callback_port: u16,
    /// String VK expects back on the `confirmation` event.
    pub callback_confirmation: Option<String>,
    /// Shared secret VK puts into every callback.
    pub callback_secret: Option<String>,

    /// Reply language (`ru` or `en`).
    pub locale: Option<String>,

    // MongoDB
    pub mongodb_uri: String,
    pub mongodb_database: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let bot_mode = BotMode::parse(&optional("BOT_MODE").unwrap_or_default())?;

        let callback_confirmation = optional("CALLBACK_CONFIRMATION");
        if bot_mode == BotMode::Callback && callback_confirmation.is_none() {
            bail!("CALLBACK_CONFIRMATION must be set when BOT_MODE is callback");
        }

        let group_id = required("VK_GROUP_ID")?
            .trim()
            .trim_start_matches("club")
            .parse::<u64>()
            .context("VK_GROUP_ID must be a positive number")?;

        let callback_port = match optional("CALLBACK_PORT") {
            Some(port) => port.parse().context("CALLBACK_PORT must be a port number")?,
            None => 8080,
        };

        Ok(Self {
            group_token: required("VK_GROUP_TOKEN")?,
            user_token: required("VK_USER_TOKEN")?,
            group_id,
            api_version: optional("VK_API_VERSION").unwrap_or_else(|| "5.199".to_string()),
            bot_mode,
            callback_port,
            callback_confirmation,
            callback_secret: optional("CALLBACK_SECRET"),
            locale: optional("BOT_LOCALE"),
            mongodb_uri: required("MONGODB_URI")?,
            mongodb_database: optional("MONGODB_DATABASE").unwrap_or_else(|| "vkinder".to_string()),
        })
    }
}

fn required(key: &str) -> Result<String> {
    optional(key).with_context(|| format!("{key} must be set"))
}

fn optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bot_mode_parse() {
        assert_eq!(BotMode::parse("callback").unwrap(), BotMode::Callback);
        assert_eq!(BotMode::parse(" Webhook ").unwrap(), BotMode::Callback);
        assert_eq!(BotMode::parse("longpoll").unwrap(), BotMode::LongPoll);
        assert_eq!(BotMode::parse("").unwrap(), BotMode::LongPoll);
    }

    #[test]
    fn test_unknown_bot_mode_is_rejected() {
        let err = BotMode::parse("websocket").unwrap_err();
        assert!(err.to_string().contains("websocket"));
    }
}
