//! "start" - register the requester.

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};

use crate::bot::keyboard::main_keyboard;
use crate::bot::{CommandContext, CommandHandler, Reply};
use crate::database::BotUser;
use crate::error::BotError;
use crate::i18n::get_text;
use crate::matching::current_age;
use crate::vk::Profile;

pub struct StartCommand;

/// Stored form of a freshly fetched profile.
pub fn registration(profile: &Profile) -> BotUser {
    BotUser {
        user_id: profile.id,
        first_name: profile.first_name.clone(),
        last_name: profile.last_name.clone(),
        sex: profile.sex,
        city: profile
            .city
            .as_ref()
            .map(|c| c.title.clone())
            .unwrap_or_default(),
        city_id: profile.city.as_ref().map(|c| c.id),
        age: current_age(profile.bdate.as_deref()),
        created_at: Utc::now().timestamp_millis(),
    }
}

#[async_trait]
impl CommandHandler for StartCommand {
    async fn handle(&self, ctx: &mut CommandContext<'_>) -> Result<Reply, BotError> {
        let user_id = ctx.user_id();
        let profile = match ctx.state.social.get_profile(user_id).await {
            Ok(Some(profile)) => profile,
            Ok(None) => return Err(BotError::ProfileUnavailable),
            Err(e) => {
                warn!("Profile lookup for {} failed: {:#}", user_id, e);
                return Err(BotError::ProfileUnavailable);
            }
        };

        let user = registration(&profile);
        let created = ctx
            .state
            .users
            .create_if_absent(&user)
            .await
            .context("failed to store user")?;
        if created {
            info!("Registered user {} ({}, age {})", user_id, user.city, user.age);
        }

        let text = get_text(ctx.locale(), "start.greeting").replace("{name}", &profile.first_name);
        Ok(Reply::text(text).with_keyboard(main_keyboard(ctx.locale())))
    }
}
