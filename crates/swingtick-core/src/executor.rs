use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tokio::time::{sleep, Duration, Instant};

use crate::auth::TokenManager;
use crate::config::BrokerConfig;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::transport::{HttpClient, HttpRequest};

/// Minimum start-to-start gap between outbound requests. The upstream limit
/// is per credential, not per endpoint, so one clock is shared by every call.
pub const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(350);

/// Attempts per request, counting the first one.
pub const DEFAULT_RETRY_BUDGET: u32 = 3;

const RATE_LIMITED: u16 = 429;

/// Opaque continuation headers echoed from a previous paged response. The
/// executor forwards them without understanding pagination semantics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Continuation {
    pub cont_yn: String,
    pub next_key: String,
}

impl Continuation {
    pub fn new(cont_yn: impl Into<String>, next_key: impl Into<String>) -> Self {
        Self {
            cont_yn: cont_yn.into(),
            next_key: next_key.into(),
        }
    }

    fn apply(&self, mut request: HttpRequest) -> HttpRequest {
        if !self.cont_yn.is_empty() {
            request = request.with_header("cont-yn", self.cont_yn.as_str());
        }
        if !self.next_key.is_empty() {
            request = request.with_header("next-key", self.next_key.as_str());
        }
        request
    }
}

/// Paced, retrying request loop shared by every endpoint. Holds the single
/// pacing clock and the token manager.
pub struct RequestExecutor {
    config: Arc<BrokerConfig>,
    http: Arc<dyn HttpClient>,
    tokens: TokenManager,
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
    retry_budget: u32,
}

impl RequestExecutor {
    pub fn new(config: Arc<BrokerConfig>, http: Arc<dyn HttpClient>) -> Self {
        let tokens = TokenManager::new(Arc::clone(&config), Arc::clone(&http));
        Self {
            config,
            http,
            tokens,
            last_request: Mutex::new(None),
            min_interval: MIN_REQUEST_INTERVAL,
            retry_budget: DEFAULT_RETRY_BUDGET,
        }
    }

    pub fn with_retry_budget(mut self, retry_budget: u32) -> Self {
        self.retry_budget = retry_budget;
        self
    }

    pub fn with_min_interval(mut self, min_interval: Duration) -> Self {
        self.min_interval = min_interval;
        self
    }

    pub fn token_manager(&self) -> &TokenManager {
        &self.tokens
    }

    /// Block until the shared pacing gap has elapsed, then claim the clock.
    /// The lock is held across the wait so concurrent callers serialize their
    /// request starts.
    async fn pace(&self) {
        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last_request = Some(Instant::now());
    }

    /// Run one request template through pacing, auth, and the retry policy.
    ///
    /// Rate-limit responses back off (server `retry-after` first, then
    /// `(attempt + 1) * 2` seconds) and retry from the top with fresh headers.
    /// Other HTTP error statuses raise immediately. Transport failures retry
    /// until the budget is spent, then raise. A budget spent entirely on rate
    /// limits yields the synthetic failure payload instead of an error.
    pub async fn execute(
        &self,
        api_id: &str,
        path: &str,
        body: &Value,
        continuation: Option<&Continuation>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.config.endpoint_url(path);
        let payload = body.to_string();

        for attempt in 0..self.retry_budget {
            self.pace().await;
            let headers = self.tokens.auth_headers(api_id).await?;

            let mut request =
                HttpRequest::post(url.as_str(), payload.clone()).with_headers(&headers);
            if let Some(continuation) = continuation {
                request = continuation.apply(request);
            }

            let response = match self.http.execute(request).await {
                Ok(response) => response,
                Err(error) => {
                    if attempt + 1 == self.retry_budget {
                        return Err(ApiError::Transport {
                            attempts: self.retry_budget,
                            message: error.message().to_owned(),
                        });
                    }
                    tracing::warn!(api_id, attempt, error = %error, "transport failure, retrying");
                    continue;
                }
            };

            if response.status == RATE_LIMITED {
                if attempt + 1 == self.retry_budget {
                    break;
                }
                let wait = response
                    .retry_after_secs()
                    .map(Duration::from_secs)
                    .unwrap_or_else(|| Duration::from_secs(u64::from(attempt + 1) * 2));
                tracing::warn!(api_id, attempt, wait_s = wait.as_secs(), "rate limited, backing off");
                sleep(wait).await;
                continue;
            }

            if !response.is_success() {
                return Err(ApiError::Status {
                    status: response.status,
                });
            }

            let value: Value = serde_json::from_str(&response.body)?;
            return Ok(ApiResponse::new(value));
        }

        tracing::warn!(api_id, budget = self.retry_budget, "retry budget exhausted");
        Ok(ApiResponse::request_failed())
    }
}
