use serde::{Deserialize, Serialize};

use swingtick_core::{PriceSeries, StockCode};

/// Minimum samples a series needs before evaluation. Shorter series produce
/// no result rather than an error; illiquid instruments hit this constantly.
pub const MIN_SAMPLES: usize = 30;

const SHORT_WINDOW: usize = 5;
const LONG_WINDOW: usize = 20;

/// Close must hold at least this fraction of the long average for the trend
/// to count as intact.
const TREND_FLOOR: f64 = 0.98;

/// Thresholds for the pullback/rebound rules.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalParams {
    /// Lookback for the reference high of the retracement check.
    pub recent_high_bars: usize,
    /// Inclusive retracement band, percent.
    pub pullback_min: f64,
    pub pullback_max: f64,
    /// Minimum recent/previous volume ratio for rebound confirmation.
    pub min_vol_ratio: f64,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            recent_high_bars: 120,
            pullback_min: 3.0,
            pullback_max: 15.0,
            min_vol_ratio: 1.0,
        }
    }
}

/// Operator-facing classification derived from the two sub-conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuyTiming {
    /// Pullback complete and rebound confirmed.
    Enter,
    /// Pullback complete, rebound not yet confirmed.
    Watch,
    None,
}

impl BuyTiming {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Watch => "watch",
            Self::None => "none",
        }
    }
}

/// One evaluated instrument. Created once per evaluation call and immutable
/// thereafter; ordering between rows is derived via [`sort_rows`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalRow {
    pub code: StockCode,
    pub name: String,
    pub current_price: f64,
    pub retrace_pct: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub volume_ratio: f64,
    pub pullback_ok: bool,
    pub rebound_ok: bool,
    pub signal: bool,
    pub signal_score: f64,
}

impl SignalRow {
    pub fn timing(&self) -> BuyTiming {
        if self.signal {
            BuyTiming::Enter
        } else if self.pullback_ok {
            BuyTiming::Watch
        } else {
            BuyTiming::None
        }
    }
}

/// Evaluate one instrument's series against the pullback/rebound rules.
///
/// Returns `None` for series shorter than [`MIN_SAMPLES`]. The score is a
/// rank-ordering heuristic in [0, 100], not a probability: 40 points per
/// satisfied leg plus up to 20 for volume expansion above 1.0x.
pub fn evaluate(
    code: StockCode,
    name: impl Into<String>,
    series: &PriceSeries,
    params: &SignalParams,
) -> Option<SignalRow> {
    let closes = series.closes();
    let volumes = series.volumes();
    if closes.len() < MIN_SAMPLES {
        return None;
    }

    let current = closes[closes.len() - 1];

    let high_window = tail(closes, params.recent_high_bars.max(1));
    let recent_high = max_of(high_window);
    let retrace_pct = if recent_high > 0.0 {
        (recent_high - current) / recent_high * 100.0
    } else {
        0.0
    };

    let short_ma = mean(tail(closes, SHORT_WINDOW));
    let long_ma = mean(tail(closes, LONG_WINDOW));
    let prev5_high = if closes.len() >= SHORT_WINDOW + 1 {
        max_of(&closes[closes.len() - SHORT_WINDOW - 1..closes.len() - 1])
    } else {
        current
    };

    let recent_vol = mean_volumes(tail(volumes, SHORT_WINDOW));
    let prev_vol = mean_volumes(
        &volumes[volumes.len().saturating_sub(SHORT_WINDOW + LONG_WINDOW)
            ..volumes.len() - SHORT_WINDOW],
    );
    let volume_ratio = if prev_vol > 0.0 {
        recent_vol / prev_vol
    } else {
        0.0
    };

    let pullback_ok = retrace_pct >= params.pullback_min
        && retrace_pct <= params.pullback_max
        && long_ma > 0.0
        && current >= long_ma * TREND_FLOOR;
    let rebound_ok =
        current >= prev5_high && short_ma >= long_ma && volume_ratio >= params.min_vol_ratio;
    let signal = pullback_ok && rebound_ok;

    let mut signal_score = 0.0;
    if pullback_ok {
        signal_score += 40.0;
    }
    if rebound_ok {
        signal_score += 40.0;
    }
    signal_score += ((volume_ratio - 1.0) * 20.0).clamp(0.0, 20.0);

    Some(SignalRow {
        code,
        name: name.into(),
        current_price: current,
        retrace_pct,
        short_ma,
        long_ma,
        volume_ratio,
        pullback_ok,
        rebound_ok,
        signal,
        signal_score,
    })
}

/// Sort descending by `(signal, signal_score, volume_ratio)`. The boolean
/// dominates: every confirmed signal sorts before every non-signal regardless
/// of score, with ties broken by score and then volume momentum.
pub fn sort_rows(rows: &mut [SignalRow]) {
    rows.sort_by(|a, b| {
        b.signal
            .cmp(&a.signal)
            .then_with(|| b.signal_score.total_cmp(&a.signal_score))
            .then_with(|| b.volume_ratio.total_cmp(&a.volume_ratio))
    });
}

fn tail<T>(values: &[T], n: usize) -> &[T] {
    &values[values.len().saturating_sub(n)..]
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn mean_volumes(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64
}
