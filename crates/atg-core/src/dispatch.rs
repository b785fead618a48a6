//! The polling/dispatch loop.
//!
//! Steady cycle: poll a batch, route every update in arrival order, sleep,
//! repeat. Any failure raised while polling or routing aborts the current
//! batch and is looked up by [`FailureKind`] in the error registry: a
//! registered handler recovers and the loop goes on sleeping and polling; an
//! unregistered kind ends the loop and is returned to the caller of
//! [`PollingApp::run`].

use std::{convert::Infallible, sync::Arc, time::Duration};

use crate::{
    context::Context,
    errors::{Error, FailureKind},
    handler::{ErrorHandler, UpdateHandler},
    offset::{GetUpdates, UpdatePoller},
    registry::{CommandRegistry, ErrorRegistry},
    update::Update,
    Result,
};

pub struct PollingApp {
    ctx: Context,
    poller: UpdatePoller,
    fetch: GetUpdates,
    commands: CommandRegistry,
    errors: ErrorRegistry,
}

impl PollingApp {
    /// New app with offset autoincrement enabled and default fetch parameters.
    pub fn new(ctx: Context) -> Self {
        Self {
            poller: UpdatePoller::new(ctx.api().clone(), true),
            ctx,
            fetch: GetUpdates::default(),
            commands: CommandRegistry::new(),
            errors: ErrorRegistry::new(),
        }
    }

    pub fn with_offset_autoincrement(mut self, enabled: bool) -> Self {
        self.poller.set_autoincrement(enabled);
        self
    }

    /// Parameters sent with every `getUpdates`. With autoincrement on, the
    /// offset is always replaced by the tracked one.
    pub fn with_fetch_params(mut self, params: GetUpdates) -> Self {
        self.fetch = params;
        self
    }

    /// Highest update id fetched so far (0 before the first non-empty batch).
    pub fn latest_seen(&self) -> i64 {
        self.poller.tracker().latest_seen()
    }

    /// Route messages whose full text equals `token` to `handler`.
    pub fn add_command_handler(
        &mut self,
        token: impl Into<String>,
        handler: impl UpdateHandler + 'static,
    ) {
        self.commands.register(token, Arc::new(handler));
    }

    pub fn remove_command_handler(&mut self, token: &str) -> Result<()> {
        self.commands.unregister(token)
    }

    pub fn add_error_handler(&mut self, kind: FailureKind, handler: impl ErrorHandler + 'static) {
        self.errors.register(kind, Arc::new(handler));
    }

    /// Run the loop until a failure nobody recovers from.
    ///
    /// `callback` receives every update that is not routed to a command
    /// handler. `wait_for` is the pause between batches.
    pub async fn run<H: UpdateHandler>(
        &mut self,
        callback: H,
        wait_for: Duration,
    ) -> Result<Infallible> {
        tracing::info!(
            commands = self.commands.len(),
            ?wait_for,
            autoincrement = self.poller.tracker().autoincrement(),
            "polling started"
        );

        loop {
            if let Err(err) = self.poll_once(&callback).await {
                self.recover(err).await?;
            }

            if wait_for.is_zero() {
                tokio::task::yield_now().await;
            } else {
                tokio::time::sleep(wait_for).await;
            }
        }
    }

    /// Fetch one batch and route it. Returns how many updates were routed.
    ///
    /// Stops at the first failing handler; the rest of the batch is dropped.
    pub async fn poll_once<H: UpdateHandler + ?Sized>(&mut self, callback: &H) -> Result<usize> {
        let updates = self.poller.fetch(&self.fetch).await?;
        for update in &updates {
            self.route(update, callback).await?;
        }
        Ok(updates.len())
    }

    async fn route<H: UpdateHandler + ?Sized>(&self, update: &Update, callback: &H) -> Result<()> {
        if let Some(token) = update.command_token() {
            if let Some(handler) = self.commands.get(token) {
                tracing::debug!(update_id = update.id.0, command = token, "routing to command");
                return handler.handle(update, &self.ctx).await;
            }
        }

        tracing::trace!(
            update_id = update.id.0,
            kind = update.kind.as_ref().map(|k| k.name()).unwrap_or("none"),
            "routing to callback"
        );
        callback.handle(update, &self.ctx).await
    }

    async fn recover(&self, err: Error) -> Result<()> {
        let kind = err.kind();
        let Some(handler) = self.errors.get(kind) else {
            tracing::error!(%kind, error = %err, "unhandled failure, polling stopped");
            return Err(err);
        };

        tracing::warn!(%kind, error = %err, "recovering from failure");
        handler.recover(&err, &self.ctx).await
    }
}
