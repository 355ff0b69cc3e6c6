//! Application state and router construction.

use std::sync::Arc;

use crate::database::{RelationStore, UserStore};
use crate::matching::{MatchSettings, Matcher};
use crate::plugins;
use crate::vk::SocialNetwork;

use super::router::CommandRouter;
use super::session::SessionStore;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// VK lookups made with the user token.
    pub social: Arc<dyn SocialNetwork>,

    /// Users who sent "start".
    pub users: Arc<dyn UserStore>,

    /// Favorites, likes and blocks.
    pub relations: Arc<dyn RelationStore>,

    /// In-memory matching sessions.
    pub sessions: SessionStore,

    /// Candidate search over `social` and `relations`.
    pub matcher: Arc<Matcher>,

    /// Reply language.
    pub locale: String,
}

impl AppState {
    /// Create a new application state.
    pub fn new(
        social: Arc<dyn SocialNetwork>,
        users: Arc<dyn UserStore>,
        relations: Arc<dyn RelationStore>,
        locale: String,
    ) -> Self {
        let matcher = Arc::new(Matcher::new(
            social.clone(),
            relations.clone(),
            MatchSettings::default(),
        ));

        Self {
            social,
            users,
            relations,
            sessions: SessionStore::new(),
            matcher,
            locale,
        }
    }
}

/// Build the router with every command in every loaded language.
pub fn build_router() -> CommandRouter {
    plugins::command_router()
}
