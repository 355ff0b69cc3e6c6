//! Error kinds surfaced by command handlers.
//!
//! Every variant is recoverable: the router turns it into a localized reply
//! and the bot keeps running.

use thiserror::Error;

use crate::i18n::get_text;

/// Outcome of a command that did not produce its normal reply.
#[derive(Debug, Error)]
pub enum BotError {
    /// Own profile lookup failed or the profile is privacy-restricted.
    #[error("profile is unavailable")]
    ProfileUnavailable,

    /// The requester's city could not be resolved to a VK city id.
    #[error("city '{0}' not found")]
    CityNotFound(String),

    /// The search worked but nothing in the batch passed eligibility.
    #[error("no eligible candidate found")]
    NoCandidateFound,

    /// A decision was requested without a candidate on screen.
    #[error("no active candidate")]
    NoActiveCandidate,

    /// The requester never sent "start", so there is no stored profile.
    #[error("user is not registered")]
    UserNotRegistered,

    /// VK or database failure; not retried.
    #[error("external service error: {0:#}")]
    ExternalService(#[from] anyhow::Error),
}

impl BotError {
    /// Text shown to the user for this error.
    pub fn user_message(&self, locale: &str) -> String {
        match self {
            Self::ProfileUnavailable => get_text(locale, "errors.profile_unavailable"),
            Self::CityNotFound(city) => {
                get_text(locale, "errors.city_not_found").replace("{city}", city)
            }
            Self::NoCandidateFound => get_text(locale, "errors.no_candidate"),
            Self::NoActiveCandidate => get_text(locale, "errors.no_active_candidate"),
            Self::UserNotRegistered => get_text(locale, "errors.not_registered"),
            Self::ExternalService(_) => get_text(locale, "errors.external"),
        }
    }

    /// Whether this is an expected outcome rather than a failure worth logging loudly.
    pub fn is_expected(&self) -> bool {
        !matches!(self, Self::ExternalService(_))
    }
}
