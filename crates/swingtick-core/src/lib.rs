//! # Swingtick Core
//!
//! Broker API access layer and response normalization for the swingtick
//! screener.
//!
//! ## Overview
//!
//! This crate owns everything between the wire and the signal engine:
//!
//! - **Token lifecycle** with proactive refresh and best-effort revoke
//! - **Paced, retrying executor** honoring the upstream per-credential limit
//! - **Typed endpoint facade** for the ranking, condition, and chart calls
//! - **Row normalizer** resolving per-operation field-name synonyms
//! - **Domain models** for normalized rows and price series
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`auth`] | Token manager and credential freshness rules |
//! | [`config`] | Environment-driven broker configuration |
//! | [`domain`] | `StockCode`, `StockRow`, `PriceSeries` |
//! | [`endpoints`] | `MarketApi` request templates |
//! | [`error`] | `ValidationError` and the `ApiError` taxonomy |
//! | [`executor`] | Shared pacing clock and retry policy |
//! | [`normalize`] | Candidate-key tables and field parsing |
//! | [`response`] | `ApiResponse` return-code handling |
//! | [`transport`] | `HttpClient` trait, reqwest and no-op transports |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use swingtick_core::{ListKind, MarketApi, normalize};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = MarketApi::from_env()?;
//!
//!     let response = api.volume_rank().await?;
//!     response.ensure_ok()?;
//!     for row in normalize::parse_rows(&response, ListKind::Volume) {
//!         println!("{} {}", row.code, row.name);
//!     }
//!
//!     api.close().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! The access layer keeps three failure paths apart on purpose: rate-limit
//! exhaustion returns a synthetic failure payload (so return-code checks keep
//! working), non-429 HTTP errors raise immediately, and a missing token field
//! is fatal. See [`error::ApiError`].

pub mod auth;
pub mod config;
pub mod domain;
pub mod endpoints;
pub mod error;
pub mod executor;
pub mod normalize;
pub mod response;
pub mod transport;

pub use auth::{Token, TokenManager};
pub use config::{BrokerConfig, TradingEnv, LIVE_BASE_URL, PAPER_BASE_URL};
pub use domain::{PriceSeries, StockCode, StockRow};
pub use endpoints::MarketApi;
pub use error::{ApiError, ValidationError};
pub use executor::{Continuation, RequestExecutor, DEFAULT_RETRY_BUDGET, MIN_REQUEST_INTERVAL};
pub use normalize::ListKind;
pub use response::ApiResponse;
pub use transport::{HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient};
