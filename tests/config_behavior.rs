//! Environment-driven configuration behavior.
//!
//! All assertions live in one test function: the process environment is
//! global, and this is the only test in the workspace that touches the
//! KIWOOM_* variables.

use std::env;

use swingtick_core::{BrokerConfig, ValidationError, PAPER_BASE_URL};

#[test]
fn environment_selection_and_overrides() {
    let vars = [
        "KIWOOM_ENV",
        "KIWOOM_PAPER_APP_KEY",
        "KIWOOM_PAPER_APP_SECRET",
        "KIWOOM_PAPER_ACCOUNT_NO",
        "KIWOOM_APP_KEY",
        "KIWOOM_APP_SECRET",
        "KIWOOM_ACCOUNT_NO",
        "KIWOOM_BASE_URL",
        "KIWOOM_CONDITION_LIST_API_ID",
        "KIWOOM_CONDITION_SEARCH_API_ID",
        "KIWOOM_CONDITION_PATH",
    ];
    for var in vars {
        env::remove_var(var);
    }

    // Missing credentials fail with the exact variable name.
    let error = BrokerConfig::from_env().expect_err("no credentials set");
    assert_eq!(
        error,
        ValidationError::MissingCredential {
            name: "KIWOOM_PAPER_APP_KEY"
        }
    );

    // Paper is the default environment and uses the mock host.
    env::set_var("KIWOOM_PAPER_APP_KEY", " paper-key ");
    env::set_var("KIWOOM_PAPER_APP_SECRET", "paper-secret");
    let config = BrokerConfig::from_env().expect("paper credentials set");
    assert!(config.environment.is_paper());
    assert_eq!(config.app_key, "paper-key");
    assert_eq!(config.base_url, PAPER_BASE_URL);
    assert_eq!(config.condition_list_api_id, "ka10171");
    assert_eq!(config.condition_search_api_id, "ka10172");
    assert_eq!(config.condition_path, "/api/dostk/websocket");

    // Live mode reads the live key set.
    env::set_var("KIWOOM_ENV", "live");
    let error = BrokerConfig::from_env().expect_err("live credentials missing");
    assert_eq!(
        error,
        ValidationError::MissingCredential {
            name: "KIWOOM_APP_KEY"
        }
    );
    env::set_var("KIWOOM_APP_KEY", "live-key");
    env::set_var("KIWOOM_APP_SECRET", "live-secret");
    let config = BrokerConfig::from_env().expect("live credentials set");
    assert!(!config.environment.is_paper());
    assert_eq!(config.base_url, "https://api.kiwoom.com");

    // Explicit overrides win over the environment defaults.
    env::set_var("KIWOOM_BASE_URL", "https://sandbox.example.test");
    env::set_var("KIWOOM_CONDITION_PATH", "/api/dostk/custom");
    let config = BrokerConfig::from_env().expect("overrides set");
    assert_eq!(config.base_url, "https://sandbox.example.test");
    assert_eq!(config.condition_path, "/api/dostk/custom");

    for var in vars {
        env::remove_var(var);
    }
}
