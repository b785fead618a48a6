use std::sync::Arc;

use anyhow::Context as _;

use atg_core::{config::Config, handler_fn, recover_fn, FailureKind, PollingApp};
use atg_http::{mask_token, HttpGateway};

mod handlers;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    atg_core::logging::init("atg")?;

    let cfg = Config::load()?;
    let gateway = Arc::new(HttpGateway::from_config(&cfg)?);
    let ctx = atg_core::Context::new(gateway);

    let me = ctx
        .messages()
        .get_me()
        .await
        .context("getMe failed; check BOT_TOKEN")?;
    tracing::info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        token = %mask_token(&cfg.bot_token),
        "atg started"
    );

    let mut app = PollingApp::new(ctx)
        .with_offset_autoincrement(cfg.offset_autoincrement)
        .with_fetch_params(cfg.get_updates());

    app.add_command_handler("/start", handler_fn(handlers::start));
    app.add_command_handler("/help", handler_fn(handlers::help));
    app.add_command_handler("/menu", handler_fn(handlers::menu));

    for kind in [
        FailureKind::Remote,
        FailureKind::Transport,
        FailureKind::Decode,
        FailureKind::Handler,
    ] {
        app.add_error_handler(kind, recover_fn(handlers::log_and_continue));
    }

    match app.run(handler_fn(handlers::fallback), cfg.poll_interval).await {
        Ok(never) => match never {},
        Err(e) => Err(e).context("polling stopped"),
    }
}
