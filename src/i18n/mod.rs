//! Internationalization (i18n) module.
//!
//! Reply texts, button labels and command words live in embedded JSON tables.
//! Russian is the primary language; English is the fallback and the alias set.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde_json::Value;

/// Global translation store: LangCode -> Key -> Text
static TRANSLATIONS: OnceLock<HashMap<String, Value>> = OnceLock::new();

/// Locale used when nothing else is configured.
pub const DEFAULT_LOCALE: &str = "ru";

/// Locale used when a key is missing in the requested one.
const FALLBACK_LOCALE: &str = "en";

/// Load the embedded tables. Safe to call more than once.
pub fn init() {
    TRANSLATIONS.get_or_init(|| {
        let mut map = HashMap::new();

        for (lang, raw) in [("ru", include_str!("ru.json")), ("en", include_str!("en.json"))] {
            match serde_json::from_str(raw) {
                Ok(val) => {
                    map.insert(lang.to_string(), val);
                }
                Err(e) => tracing::error!("Broken translation table '{}': {}", lang, e),
            }
        }

        map
    });
}

/// Get text for a key in a specific language.
/// Supports nested keys via dot notation, e.g., "errors.no_candidate".
pub fn get_text(lang: &str, key: &str) -> String {
    let Some(store) = TRANSLATIONS.get() else {
        return key.to_string();
    };

    if let Some(text) = store.get(lang).and_then(|val| resolve_key(val, key)) {
        return text;
    }

    if lang != FALLBACK_LOCALE {
        if let Some(text) = store.get(FALLBACK_LOCALE).and_then(|val| resolve_key(val, key)) {
            return text;
        }
    }

    key.to_string()
}

/// Every loaded language code.
pub fn locales() -> Vec<String> {
    let mut langs: Vec<String> = TRANSLATIONS
        .get()
        .map(|store| store.keys().cloned().collect())
        .unwrap_or_default();
    langs.sort();
    langs
}

/// Pick the configured locale if we have a table for it.
pub fn resolve_locale(configured: Option<&str>) -> String {
    match configured.map(str::trim).map(str::to_lowercase) {
        Some(lang) if locales().contains(&lang) => lang,
        _ => DEFAULT_LOCALE.to_string(),
    }
}

fn resolve_key(val: &Value, key: &str) -> Option<String> {
    let mut current = val;
    for part in key.split('.') {
        current = current.get(part)?;
    }
    current.as_str().map(|s| s.to_string())
}
