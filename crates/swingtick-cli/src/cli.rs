//! CLI argument definitions for swingtick.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rank` | Fetch a ranked stock list (volume, change, condition, swing) |
//! | `signals` | Evaluate pullback/rebound buy timing over a candidates CSV |
//!
//! # Examples
//!
//! ```bash
//! # Volume leaders, filtered and saved
//! swingtick rank --mode volume --min-price 5000 --out output/volume.csv
//!
//! # Swing intersection of the volume and change rankings
//! swingtick rank --mode swing --out output/weekly_candidates.csv
//!
//! # Evaluate the saved candidates
//! swingtick signals --input output/weekly_candidates.csv --only-signal
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Pullback/rebound swing screener over the brokerage ranking and chart
/// endpoints.
#[derive(Debug, Parser)]
#[command(
    name = "swingtick",
    version,
    about = "Pullback/rebound swing screener",
    long_about = "Swingtick pulls ranked stock lists and minute charts from the brokerage REST \
API and classifies each instrument into a pullback-completed / rebound-confirmed buy-timing \
state.\n\
\n\
Credentials are read from the environment (KIWOOM_ENV selects the paper or live key set); a \
.env file next to the binary is honored."
)]
pub struct Cli {
    /// Maximum rows printed to the terminal.
    #[arg(long, global = true, default_value_t = 50)]
    pub limit: usize,

    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch a ranked stock list.
    ///
    /// Modes: volume and change pull one ranking endpoint each, condition
    /// runs a saved condition expression, swing intersects the volume and
    /// change rankings into scored candidates.
    Rank(RankArgs),

    /// Evaluate pullback/rebound buy timing over a candidates CSV.
    ///
    /// Reads `code`/`name` pairs, fetches a minute chart per instrument, and
    /// reports the two-phase signal with a 0-100 score.
    Signals(SignalsArgs),
}

/// Ranking source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RankMode {
    /// Top traded volume.
    Volume,
    /// Top day-over-day change rate.
    Change,
    /// Saved condition-expression search.
    Condition,
    /// Intersection of volume and change rankings, rank-scored.
    Swing,
}

impl RankMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Change => "change",
            Self::Condition => "condition",
            Self::Swing => "swing",
        }
    }
}

/// Arguments for the `rank` command.
#[derive(Debug, Args)]
pub struct RankArgs {
    /// Ranking source.
    #[arg(long, value_enum, default_value_t = RankMode::Volume)]
    pub mode: RankMode,

    /// Saved condition index; required with `--mode condition`.
    #[arg(long)]
    pub condition_idx: Option<String>,

    /// Substring match over code or name.
    #[arg(long)]
    pub keyword: Option<String>,

    /// Minimum current price.
    #[arg(long)]
    pub min_price: Option<f64>,

    /// Maximum current price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Minimum traded volume.
    #[arg(long)]
    pub min_volume: Option<u64>,

    /// Write the filtered rows to this CSV path.
    #[arg(long)]
    pub out: Option<PathBuf>,

    /// Swing mode: minimum change rate, percent.
    #[arg(long, default_value_t = -3.0, allow_hyphen_values = true)]
    pub swing_min_change: f64,

    /// Swing mode: maximum change rate, percent.
    #[arg(long, default_value_t = 12.0)]
    pub swing_max_change: f64,
}

/// Arguments for the `signals` command.
#[derive(Debug, Args)]
pub struct SignalsArgs {
    /// Input candidates CSV; expects `code` and `name` columns.
    #[arg(long, default_value = "output/weekly_candidates.csv")]
    pub input: PathBuf,

    /// Minute tick unit for the chart endpoint (1/3/5/10...).
    #[arg(long, default_value = "1")]
    pub tick_unit: String,

    /// Output CSV path.
    #[arg(long, default_value = "output/weekly_signals.csv")]
    pub out: PathBuf,

    /// Print and save only rows with a confirmed signal.
    #[arg(long, default_value_t = false)]
    pub only_signal: bool,

    /// High-reference bars for the retracement check.
    #[arg(long, default_value_t = 120)]
    pub recent_high_bars: usize,

    /// Minimum pullback percent.
    #[arg(long, default_value_t = 3.0)]
    pub pullback_min: f64,

    /// Maximum pullback percent.
    #[arg(long, default_value_t = 15.0)]
    pub pullback_max: f64,

    /// Minimum recent/previous volume ratio.
    #[arg(long, default_value_t = 1.0)]
    pub min_vol_ratio: f64,
}
