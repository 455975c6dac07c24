//! Response validation for the KuCoin envelope.
//!
//! Every KuCoin REST response wraps its payload in `{code, data}` on
//! success or `{code, msg}` on failure, with HTTP 200 and `code "200000"`
//! as the only success combination. [`validate_response`] performs the
//! checks in order and hands back the `data` field.

use reqwest::StatusCode;
use serde_json::Value;
use tracing::debug;

use crate::error::{KucoinError, Result};

/// The envelope `code` KuCoin uses for success.
pub const SUCCESS_CODE: &str = "200000";

/// Substituted for the response body when it cannot be read off the wire.
pub(crate) const UNREADABLE_BODY: &str = "<unreadable body>";

const NO_ERROR_MESSAGE: &str = "No error message provided.";

/// Validates an HTTP response against the KuCoin envelope convention and
/// extracts the `data` payload.
///
/// Checks, in order: HTTP status must be 200, the body must be a JSON
/// object carrying a string `code`, and the code must be [`SUCCESS_CODE`].
/// On success the `data` field is returned (`Value::Null` when the
/// envelope omits it). Pure function over the arguments; safe to call any
/// number of times on the same input.
pub fn validate_response(status: StatusCode, body: &str) -> Result<Value> {
    if status != StatusCode::OK {
        return Err(KucoinError::HttpError {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    let mut envelope = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(fields)) => fields,
        Ok(other) => {
            debug!("Unexpected KuCoin response shape: {}", other);
            return Err(KucoinError::MalformedResponse {
                detail: "top-level JSON value is not an object".to_string(),
            });
        }
        Err(err) => {
            return Err(KucoinError::MalformedResponse {
                detail: format!("response body is not valid JSON: {}", err),
            });
        }
    };

    let code = match envelope.get("code").and_then(Value::as_str) {
        Some(code) => code.to_string(),
        None => {
            return Err(KucoinError::MalformedResponse {
                detail: "envelope has no `code` field".to_string(),
            });
        }
    };

    if code != SUCCESS_CODE {
        let message = envelope
            .get("msg")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .unwrap_or_else(|| NO_ERROR_MESSAGE.to_string());
        return Err(KucoinError::ApiError { code, message });
    }

    Ok(envelope.remove("data").unwrap_or(Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_envelope_yields_data() {
        let body = r#"{"code":"200000","data":{"currency":"BTC","available":"1.5"}}"#;
        let data = validate_response(StatusCode::OK, body).unwrap();
        assert_eq!(data, json!({"currency": "BTC", "available": "1.5"}));
    }

    #[test]
    fn test_validation_is_idempotent() {
        let body = r#"{"code":"200000","data":[1,2,3]}"#;
        let first = validate_response(StatusCode::OK, body).unwrap();
        let second = validate_response(StatusCode::OK, body).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_success_without_data_yields_null() {
        let data = validate_response(StatusCode::OK, r#"{"code":"200000"}"#).unwrap();
        assert!(data.is_null());
    }

    #[test]
    fn test_non_200_status_maps_to_http_error() {
        let err = validate_response(StatusCode::INTERNAL_SERVER_ERROR, "gateway blew up")
            .unwrap_err();
        match err {
            KucoinError::HttpError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "gateway blew up");
            }
            other => panic!("expected HttpError, got {:?}", other),
        }
    }

    #[test]
    fn test_business_error_with_message() {
        let body = r#"{"code":"400100","msg":"Invalid Parameter."}"#;
        let err = validate_response(StatusCode::OK, body).unwrap_err();
        match err {
            KucoinError::ApiError { code, message } => {
                assert_eq!(code, "400100");
                assert_eq!(message, "Invalid Parameter.");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_business_error_without_message_gets_placeholder() {
        let err = validate_response(StatusCode::OK, r#"{"code":"400100"}"#).unwrap_err();
        match err {
            KucoinError::ApiError { code, message } => {
                assert_eq!(code, "400100");
                assert_eq!(message, "No error message provided.");
            }
            other => panic!("expected ApiError, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        let err = validate_response(StatusCode::OK, "<html>not json</html>").unwrap_err();
        assert!(matches!(err, KucoinError::MalformedResponse { .. }));
    }

    #[test]
    fn test_missing_code_field_is_malformed() {
        let err = validate_response(StatusCode::OK, r#"{"data":[]}"#).unwrap_err();
        assert!(matches!(err, KucoinError::MalformedResponse { .. }));
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        let err = validate_response(StatusCode::OK, r#"[1,2,3]"#).unwrap_err();
        assert!(matches!(err, KucoinError::MalformedResponse { .. }));
    }
}
