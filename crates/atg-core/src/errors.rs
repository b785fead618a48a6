use std::fmt;

/// Core error type for the bot runtime.
///
/// Adapter crates map their specific errors into this type so the dispatch loop
/// can look up recovery handlers by [`FailureKind`] consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The remote service answered with `"ok": false`.
    #[error("remote error <{code}>: {description}")]
    Remote { code: i64, description: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("command {0} was not registered")]
    NotRegistered(String),

    #[error("invalid keyboard layout: {0}")]
    InvalidLayout(String),

    #[error("handler error: {0}")]
    Handler(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn handler(msg: impl Into<String>) -> Self {
        Self::Handler(msg.into())
    }

    /// Categorical tag used as the key for recovery-handler lookup.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::Remote { .. } => FailureKind::Remote,
            Error::Transport(_) => FailureKind::Transport,
            Error::Json(_) | Error::MalformedEnvelope(_) => FailureKind::Decode,
            Error::NotRegistered(_) => FailureKind::NotRegistered,
            Error::InvalidLayout(_) => FailureKind::InvalidLayout,
            Error::Handler(_) => FailureKind::Handler,
            Error::Config(_) => FailureKind::Config,
            Error::Io(_) => FailureKind::Io,
        }
    }
}

/// Closed set of failure kinds.
///
/// Lookup is exact: there is no hierarchy between kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Remote,
    Transport,
    Decode,
    NotRegistered,
    InvalidLayout,
    Handler,
    Config,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Remote => "remote",
            FailureKind::Transport => "transport",
            FailureKind::Decode => "decode",
            FailureKind::NotRegistered => "not_registered",
            FailureKind::InvalidLayout => "invalid_layout",
            FailureKind::Handler => "handler",
            FailureKind::Config => "config",
            FailureKind::Io => "io",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_formats_code_and_description() {
        let err = Error::Remote {
            code: 409,
            description: "Conflict: terminated by other getUpdates request".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "remote error <409>: Conflict: terminated by other getUpdates request"
        );
        assert_eq!(err.kind(), FailureKind::Remote);
    }

    #[test]
    fn decode_failures_share_a_kind() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(Error::from(json_err).kind(), FailureKind::Decode);
        assert_eq!(
            Error::MalformedEnvelope("missing ok".into()).kind(),
            FailureKind::Decode
        );
    }
}
