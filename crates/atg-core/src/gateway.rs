use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::{envelope, Result};

/// Hexagonal port for the remote Bot API.
///
/// Implementations perform the network round trip and hand back the raw
/// envelope body. They must not interpret `ok`; that is [`envelope::decode`]'s
/// job.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn call(&self, method: &str, params: Value) -> Result<String>;
}

/// Decoding client over a [`Gateway`]. Cheap to clone.
#[derive(Clone)]
pub struct Api {
    gateway: Arc<dyn Gateway>,
}

impl Api {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self { gateway }
    }

    /// Invoke a remote method and return the unwrapped `result` payload.
    pub async fn invoke(&self, method: &str, params: impl Serialize) -> Result<Value> {
        let body = self.round_trip(method, params).await?;
        envelope::decode(&body)
    }

    /// Like [`Api::invoke`], then deserializes the payload into `T`.
    pub async fn invoke_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: impl Serialize,
    ) -> Result<T> {
        let body = self.round_trip(method, params).await?;
        envelope::decode_as(&body)
    }

    async fn round_trip(&self, method: &str, params: impl Serialize) -> Result<String> {
        let params = serde_json::to_value(params)?;
        tracing::trace!(method, "invoking remote method");
        self.gateway.call(method, params).await
    }
}

impl std::fmt::Debug for Api {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Api").finish_non_exhaustive()
    }
}
