use std::fs;
use std::path::Path;

use swingtick_core::{MarketApi, StockCode};
use swingtick_signals::{scan, Candidate, ScanOptions, SignalParams, SignalRow};

use crate::cli::SignalsArgs;
use crate::error::CliError;
use crate::output;

pub async fn run(args: &SignalsArgs, api: &MarketApi, limit: usize) -> Result<(), CliError> {
    let candidates = read_candidates(&args.input)?;
    let options = ScanOptions {
        tick_unit: args.tick_unit.clone(),
        params: SignalParams {
            recent_high_bars: args.recent_high_bars,
            pullback_min: args.pullback_min,
            pullback_max: args.pullback_max,
            min_vol_ratio: args.min_vol_ratio,
        },
    };

    let report = scan(api, &candidates, &options).await?;
    let rows: Vec<&SignalRow> = if args.only_signal {
        report.rows.iter().filter(|row| row.signal).collect()
    } else {
        report.rows.iter().collect()
    };

    output::print_signals(&report, &rows, limit);
    output::write_signals_csv(&args.out, &rows)?;
    println!("saved: {}", args.out.display());
    Ok(())
}

/// Read `code`/`name` pairs from a candidates CSV, tolerating a UTF-8 BOM
/// left by our own exports and by spreadsheet tools.
fn read_candidates(path: &Path) -> Result<Vec<Candidate>, CliError> {
    let raw = fs::read_to_string(path)?;
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(&raw);

    let mut reader = csv::Reader::from_reader(raw.as_bytes());
    let headers = reader.headers()?.clone();
    let code_idx = headers
        .iter()
        .position(|header| header == "code")
        .ok_or_else(|| {
            CliError::Usage(format!(
                "input CSV needs a 'code' column: {}",
                path.display()
            ))
        })?;
    let name_idx = headers.iter().position(|header| header == "name");

    let mut candidates = Vec::new();
    for record in reader.records() {
        let record = record?;
        let Some(code) = record
            .get(code_idx)
            .and_then(|raw| StockCode::parse(raw).ok())
        else {
            continue;
        };
        let name = name_idx
            .and_then(|index| record.get(index))
            .unwrap_or("")
            .trim()
            .to_owned();
        candidates.push(Candidate::new(code, name));
    }
    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    #[test]
    fn candidates_read_skips_blank_codes_and_bom() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all("\u{feff}code,name\n005930,Samsung\n,orphan\n 000660 ,Hynix\n".as_bytes())
            .expect("writable");

        let candidates = read_candidates(file.path()).expect("readable");
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].code.as_str(), "005930");
        assert_eq!(candidates[1].code.as_str(), "000660");
        assert_eq!(candidates[1].name, "Hynix");
    }

    #[test]
    fn missing_code_column_is_a_usage_error() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"symbol,name\n005930,Samsung\n").expect("writable");

        let error = read_candidates(file.path()).expect_err("must fail");
        assert!(matches!(error, CliError::Usage(_)));
    }
}
