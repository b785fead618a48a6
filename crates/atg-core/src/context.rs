//! Explicit bot context handed to every handler.
//!
//! The context exposes independent capability facades over one decoding
//! [`Api`]. It is cheap to clone and carries no polling state; the update
//! offset is owned by the dispatch loop alone.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    domain::{ChatId, MessageRef},
    gateway::{Api, Gateway},
    keyboard::InlineKeyboardMarkup,
    update::{Message, User},
    Result,
};

#[derive(Clone, Debug)]
pub struct Context {
    api: Api,
}

impl Context {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self {
            api: Api::new(gateway),
        }
    }

    /// Raw decoding client, for methods without a typed facade.
    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn messages(&self) -> MessagesApi<'_> {
        MessagesApi { api: &self.api }
    }

    pub fn inline(&self) -> InlineApi<'_> {
        InlineApi { api: &self.api }
    }
}

/// Sending and editing messages.
#[derive(Clone, Copy, Debug)]
pub struct MessagesApi<'a> {
    api: &'a Api,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

#[derive(Serialize)]
struct EditReplyMarkup<'a> {
    chat_id: i64,
    message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<&'a InlineKeyboardMarkup>,
}

impl MessagesApi<'_> {
    pub async fn get_me(&self) -> Result<User> {
        self.api.invoke_as("getMe", serde_json::json!({})).await
    }

    pub async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<Message> {
        self.api
            .invoke_as(
                "sendMessage",
                SendMessage {
                    chat_id: chat_id.0,
                    text,
                    reply_markup,
                },
            )
            .await
    }

    /// Replace (or with `None`, remove) the inline keyboard of a sent message.
    pub async fn edit_message_reply_markup(
        &self,
        msg: MessageRef,
        reply_markup: Option<&InlineKeyboardMarkup>,
    ) -> Result<()> {
        self.api
            .invoke(
                "editMessageReplyMarkup",
                EditReplyMarkup {
                    chat_id: msg.chat_id.0,
                    message_id: msg.message_id.0,
                    reply_markup,
                },
            )
            .await?;
        Ok(())
    }
}

/// Callback and inline query answers.
#[derive(Clone, Copy, Debug)]
pub struct InlineApi<'a> {
    api: &'a Api,
}

#[derive(Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

impl InlineApi<'_> {
    pub async fn answer_callback_query(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<()> {
        self.api
            .invoke(
                "answerCallbackQuery",
                AnswerCallbackQuery {
                    callback_query_id: callback_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::Error,
        fake::FakeGateway,
        keyboard::{ButtonAction, KeyboardBuilder},
    };
    use serde_json::json;

    #[tokio::test]
    async fn send_message_serializes_reply_markup() {
        let gw = Arc::new(FakeGateway::new());
        gw.push_ok(json!({
            "message_id": 5,
            "chat": {"id": 9, "type": "private"},
            "text": "pick"
        }));
        let ctx = Context::new(gw.clone());

        let kb = KeyboardBuilder::stack()
            .button("a", ButtonAction::CallbackData("a".into()))
            .build()
            .unwrap();
        let sent = ctx
            .messages()
            .send_message(ChatId(9), "pick", Some(&kb))
            .await
            .unwrap();
        assert_eq!(sent.message_id, 5);

        let calls = gw.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "sendMessage");
        assert_eq!(
            calls[0].1,
            json!({
                "chat_id": 9,
                "text": "pick",
                "reply_markup": {"inline_keyboard": [[{"text": "a", "callback_data": "a"}]]}
            })
        );
    }

    #[tokio::test]
    async fn remote_failure_surfaces_through_any_call() {
        let gw = Arc::new(FakeGateway::new());
        gw.push_failure(400, "Bad Request: query is too old");
        let ctx = Context::new(gw.clone());

        let err = ctx
            .inline()
            .answer_callback_query("cb1", None)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote { code: 400, .. }));
        assert_eq!(gw.calls()[0].1, json!({"callback_query_id": "cb1"}));
    }
}
