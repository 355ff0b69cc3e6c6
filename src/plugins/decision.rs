//! "save", "like" and "block" - decide about the candidate on screen.

use async_trait::async_trait;

use crate::bot::keyboard::candidate_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply, Session};
use crate::database::RelationKind;
use crate::error::BotError;
use crate::i18n::get_text;
use crate::matching::decisions;

pub struct DecisionCommand {
    kind: RelationKind,
}

impl DecisionCommand {
    pub fn new(kind: RelationKind) -> Self {
        Self { kind }
    }
}

#[async_trait]
impl CommandHandler for DecisionCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let candidate_id = ctx
            .session
            .current_candidate()
            .map(|c| c.id)
            .ok_or(BotError::NoActiveCandidate)?;

        let state = ctx.state;
        let store = state.relations.as_ref();
        let user_id = ctx.user_id();
        let session: &Session = ctx.session;
        let inserted = match self.kind {
            RelationKind::Favorite => {
                decisions::add_favorite(store, user_id, session, candidate_id).await?
            }
            RelationKind::Like => decisions::add_like(store, user_id, session, candidate_id).await?,
            RelationKind::Block => decisions::add_block(store, user_id, session, candidate_id).await?,
        };

        let outcome = if inserted { "added" } else { "exists" };
        let key = format!("decisions.{}_{}", self.kind.as_str(), outcome);
        Ok(Reply::text(get_text(ctx.locale(), &key)).with_keyboard(candidate_keyboard(ctx.locale())))
    }
}
