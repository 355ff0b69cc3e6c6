//! "find" and "next" - show a candidate card.

use anyhow::Context;
use async_trait::async_trait;

use crate::bot::keyboard::candidate_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply};
use crate::database::BotUser;
use crate::error::BotError;
use crate::i18n::get_text;
use crate::vk::Candidate;

/// Search in the current window.
pub struct FindCommand;

/// Move the window forward, then search.
pub struct NextCommand;

#[async_trait]
impl CommandHandler for FindCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let user = registered_user(ctx).await?;
        let state = ctx.state;
        let candidate = state.matcher.find(&user, ctx.session).await?;
        Ok(candidate_card(ctx.locale(), &candidate))
    }
}

#[async_trait]
impl CommandHandler for NextCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let user = registered_user(ctx).await?;
        let state = ctx.state;
        let candidate = state.matcher.advance(&user, ctx.session).await?;
        Ok(candidate_card(ctx.locale(), &candidate))
    }
}

/// The requester's stored profile, or [`BotError::UserNotRegistered`].
pub async fn registered_user(ctx: &CommandContext<'_>) -> Result<BotUser, BotError> {
    ctx.state
        .users
        .get(ctx.user_id())
        .await
        .context("failed to load user")?
        .ok_or(BotError::UserNotRegistered)
}

/// Name, link and photos of one candidate, with the decision keyboard.
pub fn candidate_card(locale: &str, candidate: &Candidate) -> Reply {
    let mut text = get_text(locale, "candidate.card")
        .replace("{name}", &candidate.full_name())
        .replace("{link}", &candidate.link());
    if candidate.photos.is_empty() {
        text.push('\n');
        text.push_str(&get_text(locale, "candidate.no_photos"));
    }

    Reply::text(text)
        .with_attachments(candidate.photos.clone())
        .with_keyboard(candidate_keyboard(locale))
}
