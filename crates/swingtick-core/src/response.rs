use serde_json::{json, Value};

use crate::error::ApiError;

const DEFAULT_FAILURE_MESSAGE: &str = "API request failed";

/// Decoded broker response. The upstream signals application-level failure
/// through a top-level `return_code`; zero or absent means success.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse(Value);

impl ApiResponse {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Synthetic failure payload handed back when the retry budget is
    /// exhausted. Structurally valid so downstream return-code checks work.
    pub fn request_failed() -> Self {
        Self(json!({ "return_code": 1, "return_msg": "request failed" }))
    }

    pub fn return_code(&self) -> i64 {
        self.0
            .get("return_code")
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    pub fn return_msg(&self) -> &str {
        self.0
            .get("return_msg")
            .and_then(Value::as_str)
            .unwrap_or(DEFAULT_FAILURE_MESSAGE)
    }

    pub fn is_ok(&self) -> bool {
        self.return_code() == 0
    }

    /// Promote a non-zero return code into a domain error carrying the
    /// server-supplied message.
    pub fn ensure_ok(&self) -> Result<&Self, ApiError> {
        let code = self.return_code();
        if code != 0 {
            return Err(ApiError::App {
                code,
                message: self.return_msg().to_owned(),
            });
        }
        Ok(self)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_return_code_is_success() {
        let response = ApiResponse::new(json!({ "output": [] }));
        assert!(response.is_ok());
        assert!(response.ensure_ok().is_ok());
    }

    #[test]
    fn non_zero_return_code_surfaces_server_message() {
        let response = ApiResponse::new(json!({
            "return_code": 8005,
            "return_msg": "condition search unavailable",
        }));

        let error = response.ensure_ok().expect_err("must fail");
        match error {
            ApiError::App { code, message } => {
                assert_eq!(code, 8005);
                assert_eq!(message, "condition search unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn synthetic_failure_is_a_valid_payload() {
        let response = ApiResponse::request_failed();
        assert_eq!(response.return_code(), 1);
        assert_eq!(response.return_msg(), "request failed");
        assert!(!response.is_ok());
    }
}
