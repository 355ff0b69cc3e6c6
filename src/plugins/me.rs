//! "me" - show what the bot stored about the requester.

use anyhow::Context;
use async_trait::async_trait;

use crate::bot::keyboard::main_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply};
use crate::error::BotError;
use crate::i18n::get_text;

pub struct MeCommand;

#[async_trait]
impl CommandHandler for MeCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let locale = ctx.locale();
        let stored = ctx
            .state
            .users
            .get(ctx.user_id())
            .await
            .context("failed to load user")?;

        let Some(user) = stored else {
            return Ok(Reply::text(get_text(locale, "me.not_found")));
        };

        let text = get_text(locale, "me.profile")
            .replace("{name}", &user.full_name())
            .replace("{sex}", &get_text(locale, user.sex.text_key()))
            .replace("{city}", &user.city)
            .replace("{age}", &user.age.to_string());
        Ok(Reply::text(text).with_keyboard(main_keyboard(locale)))
    }
}
