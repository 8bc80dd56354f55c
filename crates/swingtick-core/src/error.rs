use thiserror::Error;

/// Validation and contract errors exposed by `swingtick-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("stock code cannot be empty")]
    EmptyCode,

    #[error("missing broker credential '{name}' in environment")]
    MissingCredential { name: &'static str },
}

/// Errors raised by the API access layer.
///
/// Three disjoint severities share this type:
/// - fatal protocol/configuration errors (`MissingToken`, `Validation`) abort
///   a batch run outright,
/// - per-request errors (`Transport`, `Status`, `Decode`, `App`) fail one call
///   and are recorded by batch callers,
/// - rate-limit exhaustion never reaches this type: the executor hands back a
///   synthetic failure payload instead, so return-code checks still work.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The auth endpoint answered without a token field. This is a
    /// response-shape mismatch and is never retried.
    #[error("token missing in auth response: {body}")]
    MissingToken { body: String },

    #[error("transport failure after {attempts} attempt(s): {message}")]
    Transport { attempts: u32, message: String },

    /// Non-429 HTTP error status, raised without retry.
    #[error("upstream returned HTTP {status}")]
    Status { status: u16 },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// Non-zero `return_code` in an otherwise successful transport response.
    #[error("api error {code}: {message}")]
    App { code: i64, message: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Fatal errors abort batch runs; everything else is per-instrument.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingToken { .. } | Self::Validation(_))
    }
}
