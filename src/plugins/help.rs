//! "help" - list the commands.

use async_trait::async_trait;

use crate::bot::keyboard::main_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply};
use crate::error::BotError;
use crate::i18n::get_text;

pub struct HelpCommand {
    listing: String,
}

impl HelpCommand {
    pub fn new(commands: &[String]) -> Self {
        let listing = commands
            .iter()
            .map(|c| format!("• {}", c))
            .collect::<Vec<_>>()
            .join("\n");
        Self { listing }
    }
}

#[async_trait]
impl CommandHandler for HelpCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let text = get_text(ctx.locale(), "help.header").replace("{commands}", &self.listing);
        Ok(Reply::text(text).with_keyboard(main_keyboard(ctx.locale())))
    }
}
