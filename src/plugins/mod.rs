//! Command handlers.
//!
//! Add a new command by:
//! 1. Creating a handler file in this directory
//! 2. Adding `pub mod your_command;` below
//! 3. Adding a `commands.<key>` word to every language file and registering
//!    the handler under that key in `command_router()`

pub mod decision;
pub mod favorites;
pub mod help;
pub mod me;
pub mod search;
pub mod start;
pub mod unknown;

use std::sync::Arc;

use crate::bot::{CommandHandler, CommandRouter};
use crate::database::RelationKind;
use crate::i18n::{get_text, locales};

use decision::DecisionCommand;
use favorites::FavoritesCommand;
use help::HelpCommand;
use me::MeCommand;
use search::{FindCommand, NextCommand};
use start::StartCommand;
use unknown::UnknownCommand;

/// Build the router: every handler under its word in every language, plus
/// the English key that keyboard buttons send.
pub fn command_router() -> CommandRouter {
    let mut router = CommandRouter::new(Arc::new(UnknownCommand));

    register_everywhere(&mut router, "start", Arc::new(StartCommand));
    register_everywhere(&mut router, "me", Arc::new(MeCommand));
    register_everywhere(&mut router, "find", Arc::new(FindCommand));
    register_everywhere(&mut router, "next", Arc::new(NextCommand));
    register_everywhere(&mut router, "favorites", Arc::new(FavoritesCommand));
    register_everywhere(&mut router, "save", Arc::new(DecisionCommand::new(RelationKind::Favorite)));
    register_everywhere(&mut router, "like", Arc::new(DecisionCommand::new(RelationKind::Like)));
    register_everywhere(&mut router, "block", Arc::new(DecisionCommand::new(RelationKind::Block)));

    let mut listing = router.commands();
    listing.extend(command_words("help"));
    listing.sort();
    listing.dedup();
    register_everywhere(&mut router, "help", Arc::new(HelpCommand::new(&listing)));

    router
}

/// The English key and its word in every loaded language.
fn command_words(key: &str) -> Vec<String> {
    let mut words = vec![key.to_string()];
    for locale in locales() {
        words.push(get_text(&locale, &format!("commands.{}", key)));
    }
    words
}

fn register_everywhere(router: &mut CommandRouter, key: &str, handler: Arc<dyn CommandHandler>) {
    for word in command_words(key) {
        router.register(&word, handler.clone());
    }
}
