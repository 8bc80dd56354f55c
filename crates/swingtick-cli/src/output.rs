//! Terminal tables and CSV snapshot export.

use std::fs::File;
use std::io::Write as _;
use std::path::Path;

use swingtick_core::StockRow;
use swingtick_signals::{ScanReport, SignalRow};

use crate::cli::RankMode;
use crate::error::CliError;

/// UTF-8 byte-order mark. Spreadsheet tools key off it to pick the right
/// encoding for Korean instrument names.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const RANK_HEADER: [&str; 6] = ["code", "name", "price", "volume", "change_rate", "swing_score"];
const SIGNAL_HEADER: [&str; 11] = [
    "code",
    "name",
    "current_price",
    "retrace_pct",
    "short_ma",
    "long_ma",
    "volume_ratio",
    "pullback_ok",
    "rebound_ok",
    "signal",
    "signal_score",
];

pub fn print_rank(rows: &[StockRow], mode: RankMode, limit: usize) {
    println!("mode={} total={}", mode.as_str(), rows.len());
    if mode == RankMode::Swing {
        println!("code\tname\tprice\tvolume\tchange_rate\tswing_score");
    } else {
        println!("code\tname\tprice\tvolume\tchange_rate");
    }

    for row in rows.iter().take(limit) {
        let base = format!(
            "{}\t{}\t{}\t{}\t{}",
            row.code,
            row.name,
            fmt_opt(row.price, 2),
            row.volume.map(|v| v.to_string()).unwrap_or_else(|| String::from("-")),
            fmt_opt(row.change_rate, 2),
        );
        if mode == RankMode::Swing {
            println!("{base}\t{}", fmt_opt(row.swing_score, 6));
        } else {
            println!("{base}");
        }
    }
}

pub fn print_signals(report: &ScanReport, rows: &[&SignalRow], limit: usize) {
    println!(
        "input={} analyzed={} output={}",
        report.input,
        report.analyzed,
        rows.len()
    );
    if report.skipped_total() > 0 {
        let breakdown: Vec<String> = report
            .skipped
            .iter()
            .map(|(reason, count)| format!("{reason}={count}"))
            .collect();
        println!(
            "skipped={} ({})",
            report.skipped_total(),
            breakdown.join(", ")
        );
    }

    println!("code\tname\tprice\tretrace%\tvol_ratio\tpullback\trebound\tsignal\tscore\ttiming");
    for row in rows.iter().take(limit) {
        println!(
            "{}\t{}\t{:.2}\t{:.2}\t{:.3}\t{}\t{}\t{}\t{:.1}\t{}",
            row.code,
            row.name,
            row.current_price,
            row.retrace_pct,
            row.volume_ratio,
            row.pullback_ok,
            row.rebound_ok,
            row.signal,
            row.signal_score,
            row.timing().as_str(),
        );
    }
}

/// CSV writer over a file primed with the UTF-8 signature.
fn create_csv(path: &Path) -> Result<csv::Writer<File>, CliError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;
    Ok(csv::Writer::from_writer(file))
}

pub fn write_rank_csv(path: &Path, rows: &[StockRow]) -> Result<(), CliError> {
    let mut writer = create_csv(path)?;
    writer.write_record(RANK_HEADER)?;
    for row in rows {
        writer.write_record(&[
            row.code.as_str().to_owned(),
            row.name.clone(),
            row.price.map(|v| format!("{v:.2}")).unwrap_or_default(),
            row.volume.map(|v| v.to_string()).unwrap_or_default(),
            row.change_rate.map(|v| format!("{v:.2}")).unwrap_or_default(),
            row.swing_score.map(|v| format!("{v:.6}")).unwrap_or_default(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_signals_csv(path: &Path, rows: &[&SignalRow]) -> Result<(), CliError> {
    let mut writer = create_csv(path)?;
    writer.write_record(SIGNAL_HEADER)?;
    for row in rows {
        writer.write_record(&[
            row.code.as_str().to_owned(),
            row.name.clone(),
            format!("{:.2}", row.current_price),
            format!("{:.2}", row.retrace_pct),
            format!("{:.2}", row.short_ma),
            format!("{:.2}", row.long_ma),
            format!("{:.3}", row.volume_ratio),
            row.pullback_ok.to_string(),
            row.rebound_ok.to_string(),
            row.signal.to_string(),
            format!("{:.1}", row.signal_score),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value
        .map(|v| format!("{v:.decimals$}"))
        .unwrap_or_else(|| String::from("-"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use swingtick_core::StockCode;

    use super::*;

    fn sample_row() -> SignalRow {
        SignalRow {
            code: StockCode::parse("005930").expect("valid code"),
            name: String::from("Samsung Electronics"),
            current_price: 70_500.0,
            retrace_pct: 4.25,
            short_ma: 69_800.0,
            long_ma: 69_200.0,
            volume_ratio: 1.5,
            pullback_ok: true,
            rebound_ok: true,
            signal: true,
            signal_score: 90.0,
        }
    }

    #[test]
    fn signals_csv_starts_with_bom_and_exact_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("signals.csv");
        let row = sample_row();

        write_signals_csv(&path, &[&row]).expect("writable");

        let bytes = fs::read(&path).expect("readable");
        assert_eq!(&bytes[..3], UTF8_BOM);

        let text = String::from_utf8(bytes[3..].to_vec()).expect("utf-8");
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "code,name,current_price,retrace_pct,short_ma,long_ma,volume_ratio,\
pullback_ok,rebound_ok,signal,signal_score"
            )
        );
        assert_eq!(
            lines.next(),
            Some("005930,Samsung Electronics,70500.00,4.25,69800.00,69200.00,1.500,true,true,true,90.0")
        );
    }

    #[test]
    fn rank_csv_creates_parent_directories() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("nested/out/rank.csv");
        let row = StockRow {
            code: StockCode::parse("000660").expect("valid code"),
            name: String::from("SK Hynix"),
            price: Some(180_000.0),
            volume: Some(3_000_000),
            change_rate: Some(-1.2),
            swing_score: None,
        };

        write_rank_csv(&path, &[row]).expect("writable");

        let text = fs::read_to_string(&path).expect("readable");
        assert!(text.contains("code,name,price,volume,change_rate,swing_score"));
        assert!(text.contains("000660,SK Hynix,180000.00,3000000,-1.20,"));
    }
}
