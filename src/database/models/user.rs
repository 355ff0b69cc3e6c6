//! Stored bot user.
//!
//! Written once on the first "start" and read by every search.

use serde::{Deserialize, Serialize};

/// VK sex codes: 0 unknown, 1 female, 2 male.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum Sex {
    #[default]
    Unknown,
    Female,
    Male,
}

impl Sex {
    /// The sex to search for. `Unknown` stays `Unknown`, meaning "any".
    pub fn opposite(self) -> Self {
        match self {
            Self::Female => Self::Male,
            Self::Male => Self::Female,
            Self::Unknown => Self::Unknown,
        }
    }

    /// i18n key for display.
    pub fn text_key(self) -> &'static str {
        match self {
            Self::Female => "sex.female",
            Self::Male => "sex.male",
            Self::Unknown => "sex.unknown",
        }
    }
}

impl From<u8> for Sex {
    fn from(code: u8) -> Self {
        match code {
            1 => Self::Female,
            2 => Self::Male,
            _ => Self::Unknown,
        }
    }
}

impl From<Sex> for u8 {
    fn from(sex: Sex) -> Self {
        match sex {
            Sex::Unknown => 0,
            Sex::Female => 1,
            Sex::Male => 2,
        }
    }
}

/// A user who talked to the bot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BotUser {
    /// VK user ID.
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub sex: Sex,
    /// City title as shown on the profile.
    pub city: String,
    /// VK city id, when the profile exposes one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,
    /// Age derived at registration time.
    pub age: u32,
    /// Unix timestamp (millis) of registration.
    pub created_at: i64,
}

impl BotUser {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).trim().to_string()
    }
}
