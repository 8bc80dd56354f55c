use swingtick_core::{normalize, ApiResponse, ListKind, MarketApi, StockRow};
use swingtick_signals::{swing_candidates, RowFilter, ScreenParams};

use crate::cli::{RankArgs, RankMode};
use crate::error::CliError;
use crate::output;

pub async fn run(args: &RankArgs, api: &MarketApi, limit: usize) -> Result<(), CliError> {
    let rows = match args.mode {
        RankMode::Volume => rows_from(api.volume_rank().await?, ListKind::Volume)?,
        RankMode::Change => rows_from(api.change_rate_rank().await?, ListKind::Change)?,
        RankMode::Condition => {
            let condition_idx = args.condition_idx.as_deref().ok_or_else(|| {
                CliError::Usage(String::from(
                    "--condition-idx is required with --mode condition",
                ))
            })?;
            let response = api.condition_search(condition_idx).await?;
            if !response.is_ok() {
                eprintln!(
                    "hint: condition search uses the {} path and may be unavailable on paper accounts",
                    api.config().condition_path
                );
            }
            rows_from(response, ListKind::Condition)?
        }
        RankMode::Swing => {
            let volume_rows = rows_from(api.volume_rank().await?, ListKind::Volume)?;
            let change_rows = rows_from(api.change_rate_rank().await?, ListKind::Change)?;
            swing_candidates(
                &volume_rows,
                &change_rows,
                &ScreenParams {
                    min_change: args.swing_min_change,
                    max_change: args.swing_max_change,
                },
            )
        }
    };

    let filter = RowFilter {
        keyword: args.keyword.clone(),
        min_price: args.min_price,
        max_price: args.max_price,
        min_volume: args.min_volume,
    };
    let filtered = filter.apply(rows);
    tracing::debug!(
        mode = args.mode.as_str(),
        rows = filtered.len(),
        "rank fetch complete"
    );

    output::print_rank(&filtered, args.mode, limit);
    if let Some(path) = &args.out {
        output::write_rank_csv(path, &filtered)?;
        println!("saved: {}", path.display());
    }
    Ok(())
}

fn rows_from(response: ApiResponse, kind: ListKind) -> Result<Vec<StockRow>, CliError> {
    response.ensure_ok()?;
    Ok(normalize::parse_rows(&response, kind))
}
