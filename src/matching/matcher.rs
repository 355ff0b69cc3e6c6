//! Candidate search.
//!
//! One `find` makes exactly one search call over the session's current
//! window and returns the first eligible hit. There is no automatic paging:
//! moving the window is the job of [`Matcher::advance`].

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Context;
use tracing::{debug, warn};

use crate::bot::Session;
use crate::database::{BotUser, RelationStore, Sex};
use crate::error::BotError;
use crate::vk::{Candidate, SearchFilter, SocialNetwork};

/// Search tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchSettings {
    /// Candidates requested per search, also the window step.
    pub batch_size: u32,
    /// Years around the requester's age.
    pub age_spread: u32,
    /// Photos attached to a candidate card.
    pub photo_count: usize,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            age_spread: 4,
            photo_count: 3,
        }
    }
}

/// Whether `candidate` may be shown to a requester of `requester_sex`.
pub fn is_eligible(requester_sex: Sex, candidate: &Candidate, blocked: &HashSet<i64>) -> bool {
    let sex_matches = match requester_sex {
        Sex::Unknown => true,
        sex => candidate.sex == sex.opposite(),
    };
    sex_matches && !candidate.is_closed && !blocked.contains(&candidate.id)
}

/// First eligible candidate, keeping the search order.
pub fn first_eligible(
    requester_sex: Sex,
    batch: Vec<Candidate>,
    blocked: &HashSet<i64>,
) -> Option<Candidate> {
    batch
        .into_iter()
        .find(|candidate| is_eligible(requester_sex, candidate, blocked))
}

/// Finds candidates for stored users.
pub struct Matcher {
    social: Arc<dyn SocialNetwork>,
    relations: Arc<dyn RelationStore>,
    settings: MatchSettings,
}

impl Matcher {
    pub fn new(
        social: Arc<dyn SocialNetwork>,
        relations: Arc<dyn RelationStore>,
        settings: MatchSettings,
    ) -> Self {
        Self {
            social,
            relations,
            settings,
        }
    }

    /// Show the first eligible candidate in the current window.
    ///
    /// On success the candidate becomes the session's current one. On any
    /// error the session is left untouched.
    pub async fn find(
        &self,
        requester: &BotUser,
        session: &mut Session,
    ) -> Result<Candidate, BotError> {
        let city_id = self.city_id(requester).await?;
        let filter = self.search_filter(requester, city_id, session.search_offset());
        debug!("Searching for {} with {:?}", requester.user_id, filter);

        let batch = self
            .social
            .search(&filter)
            .await
            .context("candidate search failed")?;
        let blocked = self
            .relations
            .blocked(requester.user_id)
            .await
            .context("failed to load block set")?;

        let mut candidate =
            first_eligible(requester.sex, batch, &blocked).ok_or(BotError::NoCandidateFound)?;

        match self
            .social
            .top_photos(candidate.id, self.settings.photo_count)
            .await
        {
            Ok(photos) => candidate.photos = photos,
            Err(e) => warn!("Photos of {} unavailable: {:#}", candidate.id, e),
        }

        session.set_current(candidate.clone());
        Ok(candidate)
    }

    /// Move to the next window, then [`find`](Self::find).
    ///
    /// The offset moves even when nothing is found, so repeated "next"
    /// walks further through the results.
    pub async fn advance(
        &self,
        requester: &BotUser,
        session: &mut Session,
    ) -> Result<Candidate, BotError> {
        session.advance(self.settings.batch_size);
        self.find(requester, session).await
    }

    async fn city_id(&self, requester: &BotUser) -> Result<i64, BotError> {
        if let Some(id) = requester.city_id {
            return Ok(id);
        }

        let title = requester.city.trim();
        if title.is_empty() {
            return Err(BotError::CityNotFound(requester.city.clone()));
        }

        self.social
            .resolve_city(title)
            .await
            .context("city lookup failed")?
            .ok_or_else(|| BotError::CityNotFound(title.to_string()))
    }

    fn search_filter(&self, requester: &BotUser, city_id: i64, offset: u32) -> SearchFilter {
        SearchFilter {
            sex: requester.sex.opposite(),
            age_from: requester.age.saturating_sub(self.settings.age_spread),
            age_to: requester.age.saturating_add(self.settings.age_spread),
            city_id,
            offset,
            count: self.settings.batch_size,
        }
    }
}
