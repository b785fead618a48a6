//! Incoming update model.
//!
//! Only the fields the runtime routes on are typed. Every other payload kind is
//! kept as raw JSON behind an explicit variant so handlers can still inspect it.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{ChatId, MessageId, MessageRef, UpdateId};

/// Leading character of a command token.
pub const COMMAND_PREFIX: char = '/';

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    #[serde(default)]
    pub first_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub date: i64,
    pub chat: Chat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl Message {
    pub fn chat_id(&self) -> ChatId {
        ChatId(self.chat.id)
    }

    pub fn message_ref(&self) -> MessageRef {
        MessageRef {
            chat_id: self.chat_id(),
            message_id: MessageId(self.message_id),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
}

/// The payload carried by an update. At most one kind is populated.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateKind {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    CallbackQuery(CallbackQuery),
    InlineQuery(Value),
    ChosenInlineResult(Value),
    ShippingQuery(Value),
    PreCheckoutQuery(Value),
    Poll(Value),
    PollAnswer(Value),
    MyChatMember(Value),
    ChatMember(Value),
    ChatJoinRequest(Value),
    /// A payload field this runtime does not know about.
    Unknown { kind: String, raw: Value },
    /// A known payload field whose shape did not parse.
    Malformed {
        kind: String,
        raw: Value,
        reason: String,
    },
}

impl UpdateKind {
    /// Wire name of the payload field.
    pub fn name(&self) -> &str {
        match self {
            UpdateKind::Message(_) => "message",
            UpdateKind::EditedMessage(_) => "edited_message",
            UpdateKind::ChannelPost(_) => "channel_post",
            UpdateKind::EditedChannelPost(_) => "edited_channel_post",
            UpdateKind::CallbackQuery(_) => "callback_query",
            UpdateKind::InlineQuery(_) => "inline_query",
            UpdateKind::ChosenInlineResult(_) => "chosen_inline_result",
            UpdateKind::ShippingQuery(_) => "shipping_query",
            UpdateKind::PreCheckoutQuery(_) => "pre_checkout_query",
            UpdateKind::Poll(_) => "poll",
            UpdateKind::PollAnswer(_) => "poll_answer",
            UpdateKind::MyChatMember(_) => "my_chat_member",
            UpdateKind::ChatMember(_) => "chat_member",
            UpdateKind::ChatJoinRequest(_) => "chat_join_request",
            UpdateKind::Unknown { kind, .. } | UpdateKind::Malformed { kind, .. } => kind,
        }
    }

    fn from_field(key: String, value: Value) -> Self {
        match key.as_str() {
            "message" => typed(key, value, UpdateKind::Message),
            "edited_message" => typed(key, value, UpdateKind::EditedMessage),
            "channel_post" => typed(key, value, UpdateKind::ChannelPost),
            "edited_channel_post" => typed(key, value, UpdateKind::EditedChannelPost),
            "callback_query" => typed(key, value, UpdateKind::CallbackQuery),
            "inline_query" => UpdateKind::InlineQuery(value),
            "chosen_inline_result" => UpdateKind::ChosenInlineResult(value),
            "shipping_query" => UpdateKind::ShippingQuery(value),
            "pre_checkout_query" => UpdateKind::PreCheckoutQuery(value),
            "poll" => UpdateKind::Poll(value),
            "poll_answer" => UpdateKind::PollAnswer(value),
            "my_chat_member" => UpdateKind::MyChatMember(value),
            "chat_member" => UpdateKind::ChatMember(value),
            "chat_join_request" => UpdateKind::ChatJoinRequest(value),
            _ => UpdateKind::Unknown { kind: key, raw: value },
        }
    }
}

/// Parse a typed payload; a shape we cannot read becomes [`UpdateKind::Malformed`]
/// so the update still reaches the generic callback.
fn typed<T: DeserializeOwned>(
    key: String,
    value: Value,
    wrap: fn(T) -> UpdateKind,
) -> UpdateKind {
    match T::deserialize(&value) {
        Ok(payload) => wrap(payload),
        Err(e) => {
            tracing::warn!(kind = %key, error = %e, "malformed update payload");
            UpdateKind::Malformed {
                kind: key,
                raw: value,
                reason: e.to_string(),
            }
        }
    }
}

/// One unit of incoming activity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawUpdate")]
pub struct Update {
    pub id: UpdateId,
    pub kind: Option<UpdateKind>,
}

#[derive(Deserialize)]
struct RawUpdate {
    update_id: i64,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

impl TryFrom<RawUpdate> for Update {
    type Error = std::convert::Infallible;

    fn try_from(raw: RawUpdate) -> Result<Self, Self::Error> {
        // `null` fields are treated as absent. If the service ever sends more
        // than one payload, the first by key order wins.
        let kind = raw
            .fields
            .into_iter()
            .find(|(_, v)| !v.is_null())
            .map(|(k, v)| UpdateKind::from_field(k, v));

        Ok(Self {
            id: UpdateId(raw.update_id),
            kind,
        })
    }
}

impl Update {
    pub fn message(&self) -> Option<&Message> {
        match &self.kind {
            Some(UpdateKind::Message(m)) => Some(m),
            _ => None,
        }
    }

    /// Text of a plain `message` payload; the only text routed as commands.
    pub fn text(&self) -> Option<&str> {
        self.message().and_then(|m| m.text.as_deref())
    }

    /// Full message text when it is shaped like a command token.
    pub fn command_token(&self) -> Option<&str> {
        self.text().filter(|t| t.starts_with(COMMAND_PREFIX))
    }
}
