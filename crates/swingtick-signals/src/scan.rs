use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use swingtick_core::{normalize, ApiError, MarketApi, StockCode};

use crate::evaluator::{evaluate, sort_rows, SignalParams, SignalRow};

/// Why an instrument produced no signal row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SkipReason {
    /// Non-zero `return_code` from the chart endpoint.
    ApiError,
    /// Transport failure that survived the retry budget.
    TransportError,
    /// Non-429 HTTP error status.
    HttpError,
    /// Response carried no chart records.
    EmptyChart,
    /// Fewer than the minimum samples.
    InsufficientData,
}

impl SkipReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ApiError => "api_error",
            Self::TransportError => "transport_error",
            Self::HttpError => "http_error",
            Self::EmptyChart => "empty_chart",
            Self::InsufficientData => "insufficient_data",
        }
    }
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Candidate identity fed into a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub code: StockCode,
    pub name: String,
}

impl Candidate {
    pub fn new(code: StockCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}

/// Scan configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// Minute scope for the chart endpoint (1/3/5/10...).
    pub tick_unit: String,
    pub params: SignalParams,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            tick_unit: String::from("1"),
            params: SignalParams::default(),
        }
    }
}

/// Outcome of a batch scan. `rows` is sorted signal-first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanReport {
    pub rows: Vec<SignalRow>,
    pub input: usize,
    pub analyzed: usize,
    pub skipped: BTreeMap<SkipReason, usize>,
}

impl ScanReport {
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Evaluate every candidate, continuing past per-instrument failures.
///
/// Skips are the expected steady state for illiquid instruments and are
/// tallied per reason instead of aborting the run. Only fatal errors (a
/// missing token field, validation) stop the scan.
pub async fn scan(
    api: &MarketApi,
    candidates: &[Candidate],
    options: &ScanOptions,
) -> Result<ScanReport, ApiError> {
    let mut report = ScanReport {
        input: candidates.len(),
        ..ScanReport::default()
    };

    for candidate in candidates {
        let response = match api.minute_chart(&candidate.code, &options.tick_unit).await {
            Ok(response) => response,
            Err(error) if error.is_fatal() => return Err(error),
            Err(error) => {
                tracing::warn!(
                    code = candidate.code.as_str(),
                    error = %error,
                    "chart fetch failed, skipping"
                );
                bump(&mut report, skip_reason_for(&error));
                continue;
            }
        };

        if !response.is_ok() {
            tracing::warn!(
                code = candidate.code.as_str(),
                message = response.return_msg(),
                "chart request rejected, skipping"
            );
            bump(&mut report, SkipReason::ApiError);
            continue;
        }

        let series = normalize::chart_series(&response);
        if series.is_empty() {
            bump(&mut report, SkipReason::EmptyChart);
            continue;
        }

        match evaluate(
            candidate.code.clone(),
            candidate.name.clone(),
            &series,
            &options.params,
        ) {
            Some(row) => {
                report.analyzed += 1;
                report.rows.push(row);
            }
            None => bump(&mut report, SkipReason::InsufficientData),
        }
    }

    sort_rows(&mut report.rows);
    Ok(report)
}

fn bump(report: &mut ScanReport, reason: SkipReason) {
    *report.skipped.entry(reason).or_insert(0) += 1;
}

fn skip_reason_for(error: &ApiError) -> SkipReason {
    match error {
        ApiError::Transport { .. } => SkipReason::TransportError,
        ApiError::Status { .. } => SkipReason::HttpError,
        _ => SkipReason::ApiError,
    }
}
