use std::sync::Arc;

use serde_json::{json, Value};

use crate::config::BrokerConfig;
use crate::domain::StockCode;
use crate::error::ApiError;
use crate::executor::{Continuation, RequestExecutor};
use crate::response::ApiResponse;
use crate::transport::{HttpClient, ReqwestHttpClient};

const VOLUME_RANK_API_ID: &str = "ka10030";
const CHANGE_RANK_API_ID: &str = "ka10027";
const MINUTE_CHART_API_ID: &str = "ka10080";

const RANKING_PATH: &str = "/api/dostk/rkinfo";
const CHART_PATH: &str = "/api/dostk/chart";

/// Typed facade over the fixed request templates the screener uses.
///
/// All pacing, auth, and retry behavior lives in the executor; methods return
/// the raw decoded response for the normalizer to pick apart. A non-zero
/// `return_code` is the caller's to check via [`ApiResponse::ensure_ok`].
pub struct MarketApi {
    config: Arc<BrokerConfig>,
    executor: RequestExecutor,
}

impl MarketApi {
    pub fn new(config: Arc<BrokerConfig>, http: Arc<dyn HttpClient>) -> Self {
        let executor = RequestExecutor::new(Arc::clone(&config), http);
        Self { config, executor }
    }

    /// Environment-configured client over the production transport.
    pub fn from_env() -> Result<Self, ApiError> {
        let config = Arc::new(BrokerConfig::from_env()?);
        Ok(Self::new(config, Arc::new(ReqwestHttpClient::new())))
    }

    pub fn with_executor(config: Arc<BrokerConfig>, executor: RequestExecutor) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    /// Top volume ranking for the configured exchange scope.
    pub async fn volume_rank(&self) -> Result<ApiResponse, ApiError> {
        let body = json!({
            "mrkt_tp": "000",
            "sort_tp": "1",
            "mang_stk_incls": "0",
            "crd_tp": "0",
            "trde_qty_tp": "0",
            "pric_tp": "0",
            "trde_prica_tp": "0",
            "mrkt_open_tp": "0",
            "stex_tp": self.config.environment.stex_tp(),
        });
        self.executor
            .execute(VOLUME_RANK_API_ID, RANKING_PATH, &body, None)
            .await
    }

    /// Top day-over-day change-rate ranking.
    pub async fn change_rate_rank(&self) -> Result<ApiResponse, ApiError> {
        let body = json!({
            "mrkt_tp": "000",
            "sort_tp": "1",
            "trde_qty_cnd": "0000",
            "stk_cnd": "0",
            "crd_cnd": "0",
            "updown_incls": "1",
            "pric_cnd": "0",
            "trde_prica_cnd": "0",
            "stex_tp": self.config.environment.stex_tp(),
        });
        self.executor
            .execute(CHANGE_RANK_API_ID, RANKING_PATH, &body, None)
            .await
    }

    /// Saved condition-expression list.
    pub async fn condition_list(&self) -> Result<ApiResponse, ApiError> {
        self.executor
            .execute(
                &self.config.condition_list_api_id,
                &self.config.condition_path,
                &json!({}),
                None,
            )
            .await
    }

    /// Instruments matching a saved condition expression.
    pub async fn condition_search(&self, condition_idx: &str) -> Result<ApiResponse, ApiError> {
        let body = json!({
            "seq": condition_idx,
            "search_type": "0",
        });
        self.executor
            .execute(
                &self.config.condition_search_api_id,
                &self.config.condition_path,
                &body,
                None,
            )
            .await
    }

    /// Minute-bar chart for one instrument. `tick_unit` is the minute scope
    /// (1/3/5/10...).
    pub async fn minute_chart(
        &self,
        code: &StockCode,
        tick_unit: &str,
    ) -> Result<ApiResponse, ApiError> {
        let body = json!({
            "stk_cd": code.as_str(),
            "tic_scope": tick_unit,
            "upd_stkpc_tp": "1",
        });
        self.executor
            .execute(MINUTE_CHART_API_ID, CHART_PATH, &body, None)
            .await
    }

    /// Raw passthrough for callers that page with continuation headers.
    pub async fn request(
        &self,
        api_id: &str,
        path: &str,
        body: &Value,
        continuation: Option<&Continuation>,
    ) -> Result<ApiResponse, ApiError> {
        self.executor.execute(api_id, path, body, continuation).await
    }

    /// Revoke the cached credential; call once on shutdown.
    pub async fn close(&self) {
        self.executor.token_manager().revoke().await;
    }
}
