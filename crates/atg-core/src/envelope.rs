//! Result decoder shared by every outbound call.
//!
//! The remote service wraps every answer in
//! `{"ok": true, "result": ...}` or
//! `{"ok": false, "error_code": 400, "description": "..."}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::{errors::Error, Result};

#[derive(Debug, Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

/// Decode a raw envelope body into its success payload.
pub fn decode(body: &str) -> Result<Value> {
    let env: Envelope = serde_json::from_str(body)?;

    if env.ok {
        return env
            .result
            .ok_or_else(|| Error::MalformedEnvelope("ok envelope without result".to_string()));
    }

    let (Some(code), Some(description)) = (env.error_code, env.description) else {
        return Err(Error::MalformedEnvelope(
            "failed envelope without error_code/description".to_string(),
        ));
    };

    Err(Error::Remote { code, description })
}

/// Like [`decode`], then deserializes the payload into `T`.
pub fn decode_as<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value = decode(body)?;
    Ok(serde_json::from_value(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FailureKind;

    #[test]
    fn ok_envelope_unwraps_result() {
        let v = decode(r#"{"ok":true,"result":[{"update_id":1}]}"#).unwrap();
        assert_eq!(v[0]["update_id"], 1);
    }

    #[test]
    fn ok_envelope_with_scalar_result() {
        assert_eq!(decode(r#"{"ok":true,"result":true}"#).unwrap(), Value::Bool(true));
    }

    #[test]
    fn failed_envelope_becomes_remote_error() {
        let err = decode(r#"{"ok":false,"error_code":401,"description":"Unauthorized"}"#)
            .unwrap_err();
        match err {
            Error::Remote { code, description } => {
                assert_eq!(code, 401);
                assert_eq!(description, "Unauthorized");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_bodies_are_decode_failures() {
        for body in [
            "not json",
            r#"{"result":[]}"#,
            r#"{"ok":true}"#,
            r#"{"ok":false,"description":"x"}"#,
        ] {
            let err = decode(body).unwrap_err();
            assert_eq!(err.kind(), FailureKind::Decode, "body: {body}");
        }
    }

    #[test]
    fn decode_as_deserializes_payload() {
        let ids: Vec<i64> = decode_as(r#"{"ok":true,"result":[1,2,3]}"#).unwrap();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
