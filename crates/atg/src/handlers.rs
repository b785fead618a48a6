//! Demo handlers: a greeting, a help text, a keyboard menu and an echo fallback.

use std::future::Future;

use atg_core::{
    keyboard::{ButtonAction, KeyboardBuilder},
    Context, Error, Result, Update, UpdateKind,
};

const HELP: &str = "Commands:\n\
/start - greeting\n\
/help - this text\n\
/menu - pick an option from a keyboard\n\
Anything else is echoed back.";

const MENU_OPTIONS: [&str; 5] = ["red", "green", "blue", "yellow", "black"];

pub async fn start(update: Update, ctx: Context) -> Result<()> {
    let Some(msg) = update.message() else {
        return Ok(());
    };
    let name = msg
        .from
        .as_ref()
        .map(|u| u.first_name.as_str())
        .unwrap_or("there");
    ctx.messages()
        .send_message(msg.chat_id(), &format!("Hello, {name}! Try /menu."), None)
        .await?;
    Ok(())
}

pub async fn help(update: Update, ctx: Context) -> Result<()> {
    let Some(msg) = update.message() else {
        return Ok(());
    };
    ctx.messages()
        .send_message(msg.chat_id(), HELP, None)
        .await?;
    Ok(())
}

pub async fn menu(update: Update, ctx: Context) -> Result<()> {
    let Some(msg) = update.message() else {
        return Ok(());
    };
    let keyboard = menu_keyboard()?;
    ctx.messages()
        .send_message(msg.chat_id(), "Pick a colour:", Some(&keyboard))
        .await?;
    Ok(())
}

fn menu_keyboard() -> Result<atg_core::keyboard::InlineKeyboardMarkup> {
    let mut kb = KeyboardBuilder::grid(2);
    for opt in MENU_OPTIONS {
        kb.add_button(opt, ButtonAction::CallbackData(format!("colour:{opt}")));
    }
    kb.build()
}

/// Everything that is not a registered command.
pub async fn fallback(update: Update, ctx: Context) -> Result<()> {
    match &update.kind {
        Some(UpdateKind::Message(msg)) => {
            let Some(text) = msg.text.as_deref() else {
                tracing::debug!(update_id = update.id.0, "ignoring message without text");
                return Ok(());
            };
            let reply = if text.starts_with('/') {
                format!("Unknown command {text}. See /help.")
            } else {
                text.to_string()
            };
            ctx.messages()
                .send_message(msg.chat_id(), &reply, None)
                .await?;
        }
        Some(UpdateKind::CallbackQuery(q)) => {
            // Buttons from an older menu may still be pressed; they get a
            // silent answer so the client stops its spinner.
            let Some(picked) = q.data.as_deref().and_then(|d| d.strip_prefix("colour:")) else {
                tracing::warn!(update_id = update.id.0, data = ?q.data, "unknown callback data");
                ctx.inline().answer_callback_query(&q.id, None).await?;
                return Ok(());
            };
            ctx.inline()
                .answer_callback_query(&q.id, Some(&format!("You picked {picked}")))
                .await?;
            if let Some(msg) = &q.message {
                ctx.messages()
                    .edit_message_reply_markup(msg.message_ref(), None)
                    .await?;
            }
        }
        Some(other) => {
            tracing::debug!(update_id = update.id.0, kind = other.name(), "unhandled update kind");
        }
        None => {
            tracing::debug!(update_id = update.id.0, "update without payload");
        }
    }
    Ok(())
}

/// Keeps polling after a recoverable failure.
pub fn log_and_continue(err: &Error, _ctx: Context) -> impl Future<Output = Result<()>> {
    tracing::warn!(kind = %err.kind(), error = %err, "failure recovered, polling continues");
    async { Ok(()) }
}
