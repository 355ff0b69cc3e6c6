//! "favorites" - list saved candidates.

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;

use crate::bot::keyboard::main_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply};
use crate::database::RelationKind;
use crate::error::BotError;
use crate::i18n::get_text;

pub struct FavoritesCommand;

#[async_trait]
impl CommandHandler for FavoritesCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let locale = ctx.locale();
        let ids = ctx
            .state
            .relations
            .list(ctx.user_id(), RelationKind::Favorite)
            .await
            .context("failed to load favorites")?;

        if ids.is_empty() {
            return Ok(Reply::text(get_text(locale, "favorites.empty")).with_keyboard(main_keyboard(locale)));
        }

        let profiles: HashMap<i64, _> = ctx
            .state
            .social
            .get_profiles(&ids)
            .await
            .context("failed to load favorite profiles")?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let line = get_text(locale, "favorites.line");
        let mut lines = vec![get_text(locale, "favorites.header")];
        for id in ids {
            // Deleted and banned accounts come back as "DELETED".
            let (name, link) = match profiles.get(&id) {
                Some(profile) if profile.deactivated.is_none() => {
                    (profile.full_name(), profile.link())
                }
                _ => (format!("id{}", id), format!("https://vk.com/id{}", id)),
            };
            lines.push(line.replace("{name}", &name).replace("{link}", &link));
        }

        Ok(Reply::text(lines.join("\n")).with_keyboard(main_keyboard(locale)))
    }
}
