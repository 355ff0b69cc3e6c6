//! Decisions about the candidate on screen.
//!
//! Each action only applies to the session's current candidate. A stale or
//! missing candidate is rejected before the store is touched.

use anyhow::Context;
use tracing::info;

use crate::bot::Session;
use crate::database::{Relation, RelationKind, RelationStore};
use crate::error::BotError;

/// Save the current candidate to favorites.
pub async fn add_favorite(
    store: &dyn RelationStore,
    user_id: i64,
    session: &Session,
    candidate_id: i64,
) -> Result<bool, BotError> {
    record(store, user_id, session, candidate_id, RelationKind::Favorite).await
}

/// Like the current candidate.
pub async fn add_like(
    store: &dyn RelationStore,
    user_id: i64,
    session: &Session,
    candidate_id: i64,
) -> Result<bool, BotError> {
    record(store, user_id, session, candidate_id, RelationKind::Like).await
}

/// Block the current candidate. Later searches skip them for good.
pub async fn add_block(
    store: &dyn RelationStore,
    user_id: i64,
    session: &Session,
    candidate_id: i64,
) -> Result<bool, BotError> {
    record(store, user_id, session, candidate_id, RelationKind::Block).await
}

/// Insert one relation. `Ok(false)` means it already existed.
pub async fn record(
    store: &dyn RelationStore,
    user_id: i64,
    session: &Session,
    candidate_id: i64,
    kind: RelationKind,
) -> Result<bool, BotError> {
    match session.current_candidate() {
        Some(current) if current.id == candidate_id => {}
        _ => return Err(BotError::NoActiveCandidate),
    }

    let inserted = store
        .insert(Relation::new(user_id, candidate_id, kind))
        .await
        .with_context(|| format!("failed to store {} for {}", kind.as_str(), user_id))?;

    info!(
        "User {} {} {} ({})",
        user_id,
        kind.as_str(),
        candidate_id,
        if inserted { "new" } else { "exists" }
    );
    Ok(inserted)
}
