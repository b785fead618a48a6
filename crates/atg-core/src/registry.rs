//! Command and error-handler tables.
//!
//! Both tables are exact-match: no prefix matching for commands and no
//! hierarchy between failure kinds.

use std::{collections::HashMap, sync::Arc};

use crate::{
    errors::{Error, FailureKind},
    handler::{ErrorHandler, UpdateHandler},
    update::COMMAND_PREFIX,
    Result,
};

#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Arc<dyn UpdateHandler>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `token`, replacing any previous handler.
    pub fn register(&mut self, token: impl Into<String>, handler: Arc<dyn UpdateHandler>) {
        let token = token.into();
        if !token.starts_with(COMMAND_PREFIX) {
            tracing::warn!(%token, "command token without '/' prefix can never be routed");
        }
        if self.handlers.insert(token.clone(), handler).is_some() {
            tracing::debug!(%token, "replaced command handler");
        }
    }

    pub fn unregister(&mut self, token: &str) -> Result<()> {
        self.handlers
            .remove(token)
            .map(|_| ())
            .ok_or_else(|| Error::NotRegistered(token.to_string()))
    }

    pub fn get(&self, token: &str) -> Option<Arc<dyn UpdateHandler>> {
        self.handlers.get(token).cloned()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[derive(Default)]
pub struct ErrorRegistry {
    handlers: HashMap<FailureKind, Arc<dyn ErrorHandler>>,
}

impl ErrorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, kind: FailureKind, handler: Arc<dyn ErrorHandler>) {
        self.handlers.insert(kind, handler);
    }

    pub fn get(&self, kind: FailureKind) -> Option<Arc<dyn ErrorHandler>> {
        self.handlers.get(&kind).cloned()
    }
}
