use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};
use time::macros::format_description;
use time::{Duration, OffsetDateTime, PrimitiveDateTime};
use tokio::sync::Mutex;

use crate::config::BrokerConfig;
use crate::error::ApiError;
use crate::transport::{HttpClient, HttpRequest};

/// Safety margin applied before the reported expiry; credentials inside the
/// margin are refreshed proactively.
const EXPIRY_MARGIN: Duration = Duration::seconds(60);

const TOKEN_PATH: &str = "/oauth2/token";
const REVOKE_PATH: &str = "/oauth2/revoke";
const REVOKE_API_ID: &str = "au10002";

pub(crate) const CONTENT_TYPE_JSON: &str = "application/json;charset=UTF-8";

/// Bearer credential cached by the token manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    access_token: String,
    token_type: String,
    expires_at: Option<OffsetDateTime>,
}

impl Token {
    /// `expires_dt` is the upstream `YYYYMMDDHHMMSS` stamp; a missing or
    /// unparseable value means the credential never expires.
    pub fn new(
        access_token: impl Into<String>,
        token_type: impl Into<String>,
        expires_dt: Option<&str>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: token_type.into(),
            expires_at: expires_dt.and_then(parse_expiry),
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn token_type(&self) -> &str {
        &self.token_type
    }

    /// Expired means inside the safety margin, not past the stamp itself.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        match self.expires_at {
            Some(expires_at) => now >= expires_at - EXPIRY_MARGIN,
            None => false,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(OffsetDateTime::now_utc())
    }
}

fn parse_expiry(raw: &str) -> Option<OffsetDateTime> {
    let format = format_description!("[year][month][day][hour][minute][second]");
    PrimitiveDateTime::parse(raw.trim(), &format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Owns the single cached credential and its lifecycle. Refresh is serialized
/// under the slot mutex so concurrent callers never race an acquisition.
pub struct TokenManager {
    config: Arc<BrokerConfig>,
    http: Arc<dyn HttpClient>,
    slot: Mutex<Option<Token>>,
}

impl TokenManager {
    pub fn new(config: Arc<BrokerConfig>, http: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http,
            slot: Mutex::new(None),
        }
    }

    /// Header set for one API call: a currently-valid bearer token, the
    /// per-call api-id, and content-type metadata.
    pub async fn auth_headers(
        &self,
        api_id: &str,
    ) -> Result<BTreeMap<String, String>, ApiError> {
        let mut slot = self.slot.lock().await;
        let access_token = match slot.as_ref() {
            Some(token) if !token.is_expired() => token.access_token().to_owned(),
            _ => {
                let token = self.acquire().await?;
                let access_token = token.access_token().to_owned();
                *slot = Some(token);
                access_token
            }
        };
        drop(slot);

        let mut headers = BTreeMap::new();
        headers.insert("api-id".to_owned(), api_id.to_owned());
        headers.insert("authorization".to_owned(), format!("Bearer {access_token}"));
        headers.insert("content-type".to_owned(), CONTENT_TYPE_JSON.to_owned());
        Ok(headers)
    }

    async fn acquire(&self) -> Result<Token, ApiError> {
        let body = json!({
            "grant_type": "client_credentials",
            "appkey": self.config.app_key,
            "secretkey": self.config.app_secret,
        });
        let request = HttpRequest::post(self.config.endpoint_url(TOKEN_PATH), body.to_string())
            .with_header("content-type", CONTENT_TYPE_JSON)
            .with_timeout_ms(15_000);

        let response = self.http.execute(request).await.map_err(|error| {
            ApiError::Transport {
                attempts: 1,
                message: format!("token request failed: {error}"),
            }
        })?;
        if !response.is_success() {
            return Err(ApiError::Status {
                status: response.status,
            });
        }

        let payload: Value = serde_json::from_str(&response.body)?;
        let access_token = payload
            .get("token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .or_else(|| {
                payload
                    .get("access_token")
                    .and_then(Value::as_str)
                    .filter(|token| !token.is_empty())
            })
            .ok_or(ApiError::MissingToken {
                body: response.body.clone(),
            })?
            .to_owned();

        let token_type = payload
            .get("token_type")
            .and_then(Value::as_str)
            .unwrap_or("Bearer");
        let expires_dt = payload.get("expires_dt").and_then(Value::as_str);

        tracing::debug!(token_type, has_expiry = expires_dt.is_some(), "acquired access token");
        Ok(Token::new(access_token, token_type, expires_dt))
    }

    /// Best-effort revoke. The cached credential is cleared even when the
    /// upstream call fails so shutdown is never blocked on the network.
    pub async fn revoke(&self) {
        let mut slot = self.slot.lock().await;
        let Some(token) = slot.take() else {
            return;
        };
        drop(slot);

        let body = json!({
            "appkey": self.config.app_key,
            "secretkey": self.config.app_secret,
            "token": token.access_token(),
        });
        let request = HttpRequest::post(self.config.endpoint_url(REVOKE_PATH), body.to_string())
            .with_header("api-id", REVOKE_API_ID)
            .with_header(
                "authorization",
                format!("Bearer {}", token.access_token()),
            )
            .with_header("content-type", CONTENT_TYPE_JSON)
            .with_timeout_ms(10_000);

        if let Err(error) = self.http.execute(request).await {
            tracing::warn!(error = %error, "token revoke failed; cached credential cleared anyway");
        }
    }

    /// Snapshot of the cached credential, if any.
    pub async fn cached_token(&self) -> Option<Token> {
        self.slot.lock().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stamp(at: OffsetDateTime) -> String {
        let format = format_description!("[year][month][day][hour][minute][second]");
        at.format(&format).expect("formattable stamp")
    }

    #[test]
    fn expiry_inside_margin_counts_as_expired() {
        let now = OffsetDateTime::now_utc();
        let soon = Token::new("t", "Bearer", Some(&stamp(now + Duration::seconds(30))));
        let later = Token::new("t", "Bearer", Some(&stamp(now + Duration::minutes(2))));

        assert!(soon.is_expired_at(now));
        assert!(!later.is_expired_at(now));
    }

    #[test]
    fn missing_or_garbled_expiry_never_expires() {
        let now = OffsetDateTime::now_utc();
        let missing = Token::new("t", "Bearer", None);
        let garbled = Token::new("t", "Bearer", Some("not-a-stamp"));

        assert!(!missing.is_expired_at(now));
        assert!(!garbled.is_expired_at(now));
    }

    #[test]
    fn expiry_stamp_parses_compact_format() {
        let token = Token::new("t", "Bearer", Some("20260807120000"));
        let before = OffsetDateTime::parse(
            "2026-08-07T11:58:00Z",
            &time::format_description::well_known::Rfc3339,
        )
        .expect("valid timestamp");

        // 2 minutes out: still fresh. 30 seconds out: inside the margin.
        assert!(!token.is_expired_at(before));
        assert!(token.is_expired_at(before + Duration::seconds(90)));
    }
}
