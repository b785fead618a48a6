//! Inline keyboard composition.
//!
//! Buttons are collected in order and arranged into rows by a [`Layout`]:
//! `stack` puts every button on its own row, `grid` wraps rows at a fixed
//! column count. Composition is pure; the same input always yields the same
//! rows.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{errors::Error, Result};

pub const DEFAULT_GRID_COLS: usize = 2;

/// Description of a Web App launched by a button.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAppInfo {
    pub url: String,
}

/// HTTPS URL used to authorize the user automatically.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginUrl {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_write_access: Option<bool>,
}

/// Placeholder; games are configured through BotFather.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackGame {}

/// What pressing a button does. Serialized as a single field next to `text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Url(String),
    CallbackData(String),
    WebApp(WebAppInfo),
    LoginUrl(LoginUrl),
    SwitchInlineQuery(String),
    SwitchInlineQueryCurrentChat(String),
    /// Must be the first button of the first row.
    CallbackGame(CallbackGame),
    /// Must be the first button of the first row; invoice messages only.
    Pay(bool),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    #[serde(flatten)]
    pub action: ButtonAction,
}

impl InlineKeyboardButton {
    pub fn new(text: impl Into<String>, action: ButtonAction) -> Self {
        Self {
            text: text.into(),
            action,
        }
    }
}

/// Wire shape of the `reply_markup` parameter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    Stack,
    Grid { cols: NonZeroUsize },
}

impl Layout {
    /// Resolve a policy name (`"stack"` or `"grid"`). `cols` only matters for grids.
    pub fn parse(policy: &str, cols: usize) -> Result<Self> {
        match policy {
            "stack" => Ok(Layout::Stack),
            "grid" => NonZeroUsize::new(cols)
                .map(|cols| Layout::Grid { cols })
                .ok_or_else(|| {
                    Error::InvalidLayout("grid needs at least one column".to_string())
                }),
            other => Err(Error::InvalidLayout(format!(
                "unknown keyboard type {other:?} (expected \"stack\" or \"grid\")"
            ))),
        }
    }
}

enum Push<T> {
    Pushed,
    Full(T),
}

struct GridRow<T> {
    cap: usize,
    items: Vec<T>,
}

impl<T> GridRow<T> {
    fn starting_with(cap: NonZeroUsize, first: T) -> Self {
        let mut items = Vec::with_capacity(cap.get());
        items.push(first);
        Self {
            cap: cap.get(),
            items,
        }
    }

    fn try_push(&mut self, item: T) -> Push<T> {
        if self.items.len() < self.cap {
            self.items.push(item);
            Push::Pushed
        } else {
            Push::Full(item)
        }
    }
}

/// Arrange `items` into rows according to `layout`.
pub fn compose<T>(layout: Layout, items: impl IntoIterator<Item = T>) -> Vec<Vec<T>> {
    match layout {
        Layout::Stack => items.into_iter().map(|item| vec![item]).collect(),
        Layout::Grid { cols } => {
            let mut rows: Vec<GridRow<T>> = Vec::new();
            for item in items {
                let overflow = match rows.last_mut() {
                    Some(row) => match row.try_push(item) {
                        Push::Pushed => None,
                        Push::Full(item) => Some(item),
                    },
                    None => Some(item),
                };
                if let Some(item) = overflow {
                    rows.push(GridRow::starting_with(cols, item));
                }
            }
            rows.into_iter().map(|row| row.items).collect()
        }
    }
}

/// Collects buttons and renders them into an [`InlineKeyboardMarkup`].
///
/// The policy is validated in [`KeyboardBuilder::build`], not on construction.
#[derive(Clone, Debug)]
pub struct KeyboardBuilder {
    policy: String,
    cols: usize,
    buttons: Vec<InlineKeyboardButton>,
}

impl Default for KeyboardBuilder {
    fn default() -> Self {
        Self::new("stack", DEFAULT_GRID_COLS)
    }
}

impl KeyboardBuilder {
    pub fn new(policy: impl Into<String>, cols: usize) -> Self {
        Self {
            policy: policy.into(),
            cols,
            buttons: Vec::new(),
        }
    }

    pub fn stack() -> Self {
        Self::default()
    }

    pub fn grid(cols: usize) -> Self {
        Self::new("grid", cols)
    }

    pub fn add_button(&mut self, text: impl Into<String>, action: ButtonAction) -> &mut Self {
        self.buttons.push(InlineKeyboardButton::new(text, action));
        self
    }

    pub fn button(mut self, text: impl Into<String>, action: ButtonAction) -> Self {
        self.add_button(text, action);
        self
    }

    pub fn build(&self) -> Result<InlineKeyboardMarkup> {
        let layout = Layout::parse(&self.policy, self.cols)?;
        Ok(InlineKeyboardMarkup {
            inline_keyboard: compose(layout, self.buttons.iter().cloned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn grid(cols: usize) -> Layout {
        Layout::parse("grid", cols).unwrap()
    }

    #[test]
    fn grid_wraps_at_column_count() {
        let rows = compose(grid(2), ['A', 'B', 'C', 'D', 'E']);
        assert_eq!(rows, vec![vec!['A', 'B'], vec!['C', 'D'], vec!['E']]);
    }

    #[test]
    fn stack_puts_each_button_on_its_own_row() {
        let rows = compose(Layout::Stack, ['A', 'B', 'C', 'D', 'E']);
        assert_eq!(
            rows,
            vec![vec!['A'], vec!['B'], vec!['C'], vec!['D'], vec!['E']]
        );
    }

    #[test]
    fn grid_rows_never_exceed_cols() {
        for cols in 1..=5 {
            for n in 0..=12 {
                let rows = compose(grid(cols), 0..n);
                assert!(rows.iter().all(|r| !r.is_empty() && r.len() <= cols));
                if let Some((_, full)) = rows.split_last() {
                    assert!(full.iter().all(|r| r.len() == cols));
                }
                let flat: Vec<_> = rows.into_iter().flatten().collect();
                assert_eq!(flat, (0..n).collect::<Vec<_>>());
            }
        }
    }

    #[test]
    fn empty_input_yields_no_rows() {
        assert!(compose(grid(3), Vec::<u8>::new()).is_empty());
        assert!(compose(Layout::Stack, Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn unknown_policy_fails_at_build_time() {
        let kb = KeyboardBuilder::new("diagonal", 2)
            .button("one", ButtonAction::CallbackData("1".into()));
        let err = kb.build().unwrap_err();
        assert!(matches!(err, Error::InvalidLayout(_)));
    }

    #[test]
    fn zero_column_grid_is_invalid() {
        assert!(matches!(
            Layout::parse("grid", 0),
            Err(Error::InvalidLayout(_))
        ));
        // cols is ignored for stack layouts.
        assert_eq!(Layout::parse("stack", 0).unwrap(), Layout::Stack);
    }

    #[test]
    fn build_is_idempotent() {
        let mut kb = KeyboardBuilder::grid(2);
        for i in 0..5 {
            kb.add_button(format!("b{i}"), ButtonAction::CallbackData(i.to_string()));
        }
        assert_eq!(kb.build().unwrap(), kb.build().unwrap());
    }

    #[test]
    fn serializes_to_inline_keyboard_wire_shape() {
        let markup = KeyboardBuilder::grid(2)
            .button("one", ButtonAction::CallbackData("1".into()))
            .button("docs", ButtonAction::Url("https://example.org".into()))
            .button("pay", ButtonAction::Pay(true))
            .button("game", ButtonAction::CallbackGame(CallbackGame {}))
            .button(
                "app",
                ButtonAction::WebApp(WebAppInfo {
                    url: "https://app.example.org".into(),
                }),
            )
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&markup).unwrap(),
            json!({
                "inline_keyboard": [
                    [
                        {"text": "one", "callback_data": "1"},
                        {"text": "docs", "url": "https://example.org"}
                    ],
                    [
                        {"text": "pay", "pay": true},
                        {"text": "game", "callback_game": {}}
                    ],
                    [
                        {"text": "app", "web_app": {"url": "https://app.example.org"}}
                    ]
                ]
            })
        );
    }

    #[test]
    fn switch_inline_query_fields_use_wire_names() {
        let btn = InlineKeyboardButton::new(
            "here",
            ButtonAction::SwitchInlineQueryCurrentChat(String::new()),
        );
        assert_eq!(
            serde_json::to_value(&btn).unwrap(),
            json!({"text": "here", "switch_inline_query_current_chat": ""})
        );

        let login = InlineKeyboardButton::new(
            "login",
            ButtonAction::LoginUrl(LoginUrl {
                url: "https://example.org/auth".into(),
                forward_text: None,
                bot_username: None,
                request_write_access: Some(true),
            }),
        );
        assert_eq!(
            serde_json::to_value(&login).unwrap(),
            json!({
                "text": "login",
                "login_url": {"url": "https://example.org/auth", "request_write_access": true}
            })
        );
    }
}
