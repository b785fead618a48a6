//! Handler traits and closure adapters.

use std::future::Future;

use async_trait::async_trait;

use crate::{context::Context, errors::Error, update::Update, Result};

/// Processes one update. Used both for command handlers and for the generic
/// per-update callback.
#[async_trait]
pub trait UpdateHandler: Send + Sync {
    async fn handle(&self, update: &Update, ctx: &Context) -> Result<()>;
}

/// Recovers from a failure raised while polling or routing.
///
/// Returning `Ok` resumes the loop. Returning `Err` ends it with that error.
#[async_trait]
pub trait ErrorHandler: Send + Sync {
    async fn recover(&self, err: &Error, ctx: &Context) -> Result<()>;
}

/// Adapter that turns an async closure into an [`UpdateHandler`].
pub struct HandlerFn<F>(F);

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Update, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    HandlerFn(f)
}

#[async_trait]
impl<F, Fut> UpdateHandler for HandlerFn<F>
where
    F: Fn(Update, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn handle(&self, update: &Update, ctx: &Context) -> Result<()> {
        (self.0)(update.clone(), ctx.clone()).await
    }
}

/// Adapter that turns a closure into an [`ErrorHandler`].
///
/// The closure sees the error by reference; copy out what the returned future
/// needs.
pub struct RecoverFn<F>(F);

pub fn recover_fn<F, Fut>(f: F) -> RecoverFn<F>
where
    F: Fn(&Error, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    RecoverFn(f)
}

#[async_trait]
impl<F, Fut> ErrorHandler for RecoverFn<F>
where
    F: Fn(&Error, Context) -> Fut + Send + Sync,
    Fut: Future<Output = Result<()>> + Send + 'static,
{
    async fn recover(&self, err: &Error, ctx: &Context) -> Result<()> {
        (self.0)(err, ctx.clone()).await
    }
}
