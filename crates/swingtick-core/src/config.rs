use std::env;

use crate::error::ValidationError;

pub const PAPER_BASE_URL: &str = "https://mockapi.kiwoom.com";
pub const LIVE_BASE_URL: &str = "https://api.kiwoom.com";

const DEFAULT_CONDITION_LIST_API_ID: &str = "ka10171";
const DEFAULT_CONDITION_SEARCH_API_ID: &str = "ka10172";
const DEFAULT_CONDITION_PATH: &str = "/api/dostk/websocket";

/// Trading environment selector. Paper routes to the mock API host and reads
/// the paper credential set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradingEnv {
    Paper,
    Live,
}

impl TradingEnv {
    pub const fn is_paper(self) -> bool {
        matches!(self, Self::Paper)
    }

    /// Exchange-type code the ranking endpoints expect for this environment.
    pub const fn stex_tp(self) -> &'static str {
        match self {
            Self::Paper => "1",
            Self::Live => "3",
        }
    }
}

/// Immutable broker connection settings, fixed for the process lifetime.
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub app_key: String,
    pub app_secret: String,
    pub account_no: String,
    pub environment: TradingEnv,
    pub base_url: String,
    pub condition_list_api_id: String,
    pub condition_search_api_id: String,
    pub condition_path: String,
}

impl BrokerConfig {
    /// Load settings from the environment. `KIWOOM_ENV` selects the paper or
    /// live credential set; the base URL and the condition-search endpoint
    /// identifiers can be overridden individually.
    pub fn from_env() -> Result<Self, ValidationError> {
        let env_name = trimmed_var("KIWOOM_ENV").unwrap_or_default().to_lowercase();
        let environment = if env_name.is_empty() || env_name == "paper" {
            TradingEnv::Paper
        } else {
            TradingEnv::Live
        };

        let (key_var, secret_var, account_var, default_base_url) = match environment {
            TradingEnv::Paper => (
                "KIWOOM_PAPER_APP_KEY",
                "KIWOOM_PAPER_APP_SECRET",
                "KIWOOM_PAPER_ACCOUNT_NO",
                PAPER_BASE_URL,
            ),
            TradingEnv::Live => (
                "KIWOOM_APP_KEY",
                "KIWOOM_APP_SECRET",
                "KIWOOM_ACCOUNT_NO",
                LIVE_BASE_URL,
            ),
        };

        let app_key = trimmed_var(key_var)
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::MissingCredential { name: key_var })?;
        let app_secret = trimmed_var(secret_var)
            .filter(|value| !value.is_empty())
            .ok_or(ValidationError::MissingCredential { name: secret_var })?;
        let account_no = trimmed_var(account_var).unwrap_or_default();

        let base_url = trimmed_var("KIWOOM_BASE_URL")
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_base_url.to_owned());

        Ok(Self {
            app_key,
            app_secret,
            account_no,
            environment,
            base_url,
            condition_list_api_id: trimmed_var("KIWOOM_CONDITION_LIST_API_ID")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_CONDITION_LIST_API_ID.to_owned()),
            condition_search_api_id: trimmed_var("KIWOOM_CONDITION_SEARCH_API_ID")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_CONDITION_SEARCH_API_ID.to_owned()),
            condition_path: trimmed_var("KIWOOM_CONDITION_PATH")
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_CONDITION_PATH.to_owned()),
        })
    }

    /// Paper-trading config against the default mock host. Intended for tests
    /// and examples that supply their own transport.
    pub fn paper(app_key: impl Into<String>, app_secret: impl Into<String>) -> Self {
        Self {
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            account_no: String::new(),
            environment: TradingEnv::Paper,
            base_url: PAPER_BASE_URL.to_owned(),
            condition_list_api_id: DEFAULT_CONDITION_LIST_API_ID.to_owned(),
            condition_search_api_id: DEFAULT_CONDITION_SEARCH_API_ID.to_owned(),
            condition_path: DEFAULT_CONDITION_PATH.to_owned(),
        }
    }

    pub fn endpoint_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn trimmed_var(name: &str) -> Option<String> {
    env::var(name).ok().map(|value| value.trim().to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_config_uses_mock_host() {
        let config = BrokerConfig::paper("key", "secret");

        assert!(config.environment.is_paper());
        assert_eq!(config.base_url, PAPER_BASE_URL);
        assert_eq!(
            config.endpoint_url("/oauth2/token"),
            "https://mockapi.kiwoom.com/oauth2/token"
        );
    }

    #[test]
    fn stex_tp_differs_between_environments() {
        assert_eq!(TradingEnv::Paper.stex_tp(), "1");
        assert_eq!(TradingEnv::Live.stex_tp(), "3");
    }
}
