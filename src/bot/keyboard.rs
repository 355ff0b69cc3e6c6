//! VK bot keyboards.
//!
//! Every button carries a `{"command": ...}` payload with the English command
//! word, so a press routes the same way whatever the label language is.

use serde::Serialize;

use crate::i18n::get_text;

/// Button colors VK understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonColor {
    Primary,
    Secondary,
    Negative,
    Positive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct ButtonAction {
    #[serde(rename = "type")]
    kind: &'static str,
    label: String,
    payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Button {
    action: ButtonAction,
    color: ButtonColor,
}

/// A reply keyboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyboard {
    one_time: bool,
    buttons: Vec<Vec<Button>>,
}

impl Keyboard {
    pub fn new(one_time: bool) -> Self {
        Self {
            one_time,
            buttons: vec![Vec::new()],
        }
    }

    /// Append a text button to the current row.
    #[must_use]
    pub fn button(mut self, label: impl Into<String>, command: &str, color: ButtonColor) -> Self {
        let payload = serde_json::json!({ "command": command }).to_string();
        let button = Button {
            action: ButtonAction {
                kind: "text",
                label: label.into(),
                payload,
            },
            color,
        };
        if let Some(row) = self.buttons.last_mut() {
            row.push(button);
        }
        self
    }

    /// Start a new row.
    #[must_use]
    pub fn row(mut self) -> Self {
        self.buttons.push(Vec::new());
        self
    }

    /// JSON for the `keyboard` parameter of `messages.send`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut keyboard = self.clone();
        keyboard.buttons.retain(|row| !row.is_empty());
        serde_json::to_string(&keyboard)
    }

    /// Labels in row order.
    #[cfg(test)]
    pub fn labels(&self) -> Vec<&str> {
        self.buttons
            .iter()
            .flatten()
            .map(|b| b.action.label.as_str())
            .collect()
    }
}

/// Keyboard shown outside the matching flow.
pub fn main_keyboard(locale: &str) -> Keyboard {
    Keyboard::new(false)
        .button(get_text(locale, "buttons.find"), "find", ButtonColor::Positive)
        .button(get_text(locale, "buttons.help"), "help", ButtonColor::Primary)
        .row()
        .button(get_text(locale, "buttons.favorites"), "favorites", ButtonColor::Primary)
}

/// Keyboard shown under a candidate card.
pub fn candidate_keyboard(locale: &str) -> Keyboard {
    Keyboard::new(false)
        .button(get_text(locale, "buttons.next"), "next", ButtonColor::Primary)
        .button(get_text(locale, "buttons.save"), "save", ButtonColor::Positive)
        .row()
        .button(get_text(locale, "buttons.like"), "like", ButtonColor::Positive)
        .button(get_text(locale, "buttons.block"), "block", ButtonColor::Negative)
        .row()
        .button(get_text(locale, "buttons.favorites"), "favorites", ButtonColor::Secondary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyboard_json_shape() {
        let json = Keyboard::new(true)
            .button("Go", "find", ButtonColor::Positive)
            .to_json()
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["one_time"], true);
        let button = &value["buttons"][0][0];
        assert_eq!(button["color"], "positive");
        assert_eq!(button["action"]["type"], "text");
        assert_eq!(button["action"]["label"], "Go");
        assert_eq!(button["action"]["payload"], r#"{"command":"find"}"#);
    }

    #[test]
    fn test_empty_rows_are_dropped() {
        let json = Keyboard::new(false).row().button("A", "a", ButtonColor::Primary).row().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["buttons"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_localized_labels() {
        crate::i18n::init();
        assert_eq!(main_keyboard("ru").labels(), vec!["Найти пару", "Помощь", "Избранные"]);
        assert_eq!(candidate_keyboard("en").labels()[..2], ["Next", "Save"]);
    }
}
