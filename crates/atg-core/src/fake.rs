//! In-memory gateway used by unit tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::{errors::Error, gateway::Gateway, Result};

#[derive(Default)]
pub(crate) struct FakeGateway {
    replies: Mutex<VecDeque<Result<String>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeGateway {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_ok(&self, result: Value) {
        self.push_raw(json!({"ok": true, "result": result}).to_string());
    }

    pub(crate) fn push_failure(&self, code: i64, description: &str) {
        self.push_raw(
            json!({"ok": false, "error_code": code, "description": description}).to_string(),
        );
    }

    pub(crate) fn push_raw(&self, body: String) {
        self.replies.lock().unwrap().push_back(Ok(body));
    }

    pub(crate) fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls()
            .into_iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p)
            .collect()
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn call(&self, method: &str, params: Value) -> Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));
        // An exhausted script behaves like a dropped connection.
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Transport("fake gateway: no scripted reply".into())))
    }
}
