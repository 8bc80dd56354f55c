use serde::{Deserialize, Serialize};

use super::StockCode;

/// Normalized ranking/search row.
///
/// Price is a magnitude: the upstream encodes direction separately from size,
/// so the sign is stripped on parse. Unknown fields stay `None` rather than
/// defaulting to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    pub code: StockCode,
    pub name: String,
    pub price: Option<f64>,
    pub volume: Option<u64>,
    pub change_rate: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swing_score: Option<f64>,
}

impl StockRow {
    pub fn new(code: StockCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
            price: None,
            volume: None,
            change_rate: None,
            swing_score: None,
        }
    }
}

/// Chronological close/volume samples for one instrument. Missing bars are
/// simply absent, never null-filled, and closes and volumes stay paired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceSeries {
    closes: Vec<f64>,
    volumes: Vec<u64>,
}

impl PriceSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pair up parallel close/volume vectors; excess entries on either side
    /// are dropped so the series stays aligned.
    pub fn from_parts(closes: Vec<f64>, volumes: Vec<u64>) -> Self {
        let len = closes.len().min(volumes.len());
        let mut closes = closes;
        let mut volumes = volumes;
        closes.truncate(len);
        volumes.truncate(len);
        Self { closes, volumes }
    }

    pub fn push(&mut self, close: f64, volume: u64) {
        self.closes.push(close);
        self.volumes.push(volume);
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn volumes(&self) -> &[u64] {
        &self.volumes
    }
}
