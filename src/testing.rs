//! In-memory doubles of the external services, for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::bot::{AppState, CommandContext, CommandRouter, Reply};
use crate::database::{BotUser, Relation, RelationKind, RelationStore, Sex, UserStore};
use crate::vk::{Candidate, IncomingMessage, MessageSink, Profile, SearchFilter, SocialNetwork};

/// Scripted VK: candidates are one ordered result list sliced by offset.
#[derive(Default)]
pub struct FakeNetwork {
    profiles: Mutex<HashMap<i64, Profile>>,
    cities: Mutex<HashMap<String, i64>>,
    candidates: Mutex<Vec<Candidate>>,
    photos: Mutex<HashMap<i64, Vec<String>>>,
    searches: Mutex<Vec<SearchFilter>>,
    fail_profiles: AtomicBool,
    fail_search: AtomicBool,
    fail_photos: AtomicBool,
}

impl FakeNetwork {
    pub fn add_profile(&self, profile: Profile) {
        self.profiles.lock().unwrap().insert(profile.id, profile);
    }

    pub fn add_city(&self, title: &str, id: i64) {
        self.cities.lock().unwrap().insert(title.to_lowercase(), id);
    }

    pub fn set_candidates(&self, candidates: Vec<Candidate>) {
        *self.candidates.lock().unwrap() = candidates;
    }

    pub fn set_photos(&self, user_id: i64, photos: Vec<String>) {
        self.photos.lock().unwrap().insert(user_id, photos);
    }

    pub fn fail_profiles(&self) {
        self.fail_profiles.store(true, Ordering::SeqCst);
    }

    pub fn fail_search(&self) {
        self.fail_search.store(true, Ordering::SeqCst);
    }

    pub fn fail_photos(&self) {
        self.fail_photos.store(true, Ordering::SeqCst);
    }

    /// Every search filter received, in order.
    pub fn searches(&self) -> Vec<SearchFilter> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl SocialNetwork for FakeNetwork {
    async fn get_profile(&self, user_id: i64) -> Result<Option<Profile>> {
        if self.fail_profiles.load(Ordering::SeqCst) {
            return Err(anyhow!("users.get unavailable"));
        }
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn get_profiles(&self, user_ids: &[i64]) -> Result<Vec<Profile>> {
        if self.fail_profiles.load(Ordering::SeqCst) {
            return Err(anyhow!("users.get unavailable"));
        }
        let profiles = self.profiles.lock().unwrap();
        Ok(user_ids.iter().filter_map(|id| profiles.get(id).cloned()).collect())
    }

    async fn resolve_city(&self, title: &str) -> Result<Option<i64>> {
        Ok(self.cities.lock().unwrap().get(&title.to_lowercase()).copied())
    }

    async fn search(&self, filter: &SearchFilter) -> Result<Vec<Candidate>> {
        self.searches.lock().unwrap().push(filter.clone());
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(anyhow!("users.search unavailable"));
        }
        let candidates = self.candidates.lock().unwrap();
        Ok(candidates
            .iter()
            .skip(filter.offset as usize)
            .take(filter.count as usize)
            .cloned()
            .collect())
    }

    async fn top_photos(&self, user_id: i64, count: usize) -> Result<Vec<String>> {
        if self.fail_photos.load(Ordering::SeqCst) {
            return Err(anyhow!("photos.get unavailable"));
        }
        let photos = self.photos.lock().unwrap();
        Ok(photos
            .get(&user_id)
            .map(|p| p.iter().take(count).cloned().collect())
            .unwrap_or_default())
    }
}

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<i64, BotUser>>,
}

impl MemoryUserStore {
    pub fn len(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_if_absent(&self, user: &BotUser) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.user_id) {
            return Ok(false);
        }
        users.insert(user.user_id, user.clone());
        Ok(true)
    }

    async fn get(&self, user_id: i64) -> Result<Option<BotUser>> {
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}

#[derive(Default)]
pub struct MemoryRelationStore {
    rows: Mutex<Vec<Relation>>,
}

impl MemoryRelationStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl RelationStore for MemoryRelationStore {
    async fn insert(&self, relation: Relation) -> Result<bool> {
        let mut rows = self.rows.lock().unwrap();
        let exists = rows.iter().any(|r| {
            r.user_id == relation.user_id
                && r.counterpart_id == relation.counterpart_id
                && r.kind == relation.kind
        });
        if exists {
            return Ok(false);
        }
        rows.push(relation);
        Ok(true)
    }

    async fn list(&self, user_id: i64, kind: RelationKind) -> Result<Vec<i64>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == user_id && r.kind == kind)
            .map(|r| r.counterpart_id)
            .collect())
    }

    async fn blocked(&self, user_id: i64) -> Result<HashSet<i64>> {
        Ok(self
            .list(user_id, RelationKind::Block)
            .await?
            .into_iter()
            .collect())
    }
}

/// Keeps every reply instead of sending it.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<(i64, Reply)>>,
    fail: bool,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<(i64, Reply)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageSink for RecordingSink {
    async fn send(&self, peer_id: i64, reply: &Reply) -> Result<()> {
        if self.fail {
            return Err(anyhow!("messages.send unavailable"));
        }
        self.sent.lock().unwrap().push((peer_id, reply.clone()));
        Ok(())
    }
}

/// App state wired to in-memory doubles.
pub struct TestEnv {
    pub state: AppState,
    pub network: Arc<FakeNetwork>,
    pub users: Arc<MemoryUserStore>,
    pub relations: Arc<MemoryRelationStore>,
}

impl TestEnv {
    pub fn new() -> Self {
        crate::i18n::init();
        let network = Arc::new(FakeNetwork::default());
        let users = Arc::new(MemoryUserStore::default());
        let relations = Arc::new(MemoryRelationStore::default());
        let state = AppState::new(
            network.clone(),
            users.clone(),
            relations.clone(),
            "ru".to_string(),
        );
        Self {
            state,
            network,
            users,
            relations,
        }
    }

    /// Store a user as if they had sent "start".
    pub async fn register(&self, user: BotUser) {
        self.users.create_if_absent(&user).await.unwrap();
    }

    /// Route one message the way the bot loop does.
    pub async fn dispatch(&self, router: &CommandRouter, msg: &IncomingMessage) -> Reply {
        let mut session = self.state.sessions.lock(msg.from_id).await;
        let mut ctx = CommandContext {
            state: &self.state,
            message: msg,
            session: &mut session,
        };
        router.dispatch(&msg.command(), &mut ctx).await
    }
}

pub fn message(from_id: i64, text: &str) -> IncomingMessage {
    IncomingMessage {
        from_id,
        peer_id: from_id,
        text: text.to_string(),
        payload: None,
    }
}

/// Button press carrying `{"command": ...}`.
pub fn button(from_id: i64, label: &str, command: &str) -> IncomingMessage {
    IncomingMessage {
        payload: Some(serde_json::json!({ "command": command }).to_string()),
        ..message(from_id, label)
    }
}

pub fn candidate(id: i64, sex: Sex, is_closed: bool) -> Candidate {
    Candidate {
        id,
        first_name: format!("Имя{}", id),
        last_name: format!("Фамилия{}", id),
        sex,
        is_closed,
        domain: None,
        photos: Vec::new(),
    }
}

/// Open profile in Moscow (city id 1), born 14.3.1996.
pub fn profile(id: i64, sex: Sex) -> Profile {
    Profile {
        id,
        first_name: "Иван".to_string(),
        last_name: "Петров".to_string(),
        sex,
        city: Some(crate::vk::types::City {
            id: 1,
            title: "Москва".to_string(),
        }),
        bdate: Some("14.3.1996".to_string()),
        is_closed: false,
        domain: None,
        deactivated: None,
    }
}

/// Registered user in Moscow (city id 1), 30 years old.
pub fn bot_user(user_id: i64, sex: Sex) -> BotUser {
    BotUser {
        user_id,
        first_name: "Иван".to_string(),
        last_name: "Петров".to_string(),
        sex,
        city: "Москва".to_string(),
        city_id: Some(1),
        age: 30,
        created_at: 0,
    }
}
