//! Fallback for anything that is not a command.

use async_trait::async_trait;

use crate::bot::keyboard::main_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply};
use crate::error::BotError;
use crate::i18n::get_text;

pub struct UnknownCommand;

#[async_trait]
impl CommandHandler for UnknownCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let text = get_text(ctx.locale(), "unknown.reply").replace("{text}", ctx.message.text.trim());
        Ok(Reply::text(text).with_keyboard(main_keyboard(ctx.locale())))
    }
}
