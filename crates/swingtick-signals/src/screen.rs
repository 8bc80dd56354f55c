use std::collections::HashMap;

use swingtick_core::{StockCode, StockRow};

/// Change-rate band applied to swing candidates, percent.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenParams {
    pub min_change: f64,
    pub max_change: f64,
}

impl Default for ScreenParams {
    fn default() -> Self {
        Self {
            min_change: -3.0,
            max_change: 12.0,
        }
    }
}

const VOLUME_RANK_WEIGHT: f64 = 0.6;
const CHANGE_RANK_WEIGHT: f64 = 0.4;

/// Rank position assigned to codes missing from a ranking list.
const UNRANKED: usize = 999;

/// Intersect the volume and change-rate ranking lists into scored swing
/// candidates.
///
/// Codes present in only one list are dropped, as are rows without a change
/// rate or outside the band. The score combines the two rank positions,
/// volume-weighted, and is only meaningful for ordering.
pub fn swing_candidates(
    volume_rows: &[StockRow],
    change_rows: &[StockRow],
    params: &ScreenParams,
) -> Vec<StockRow> {
    let change_by_code: HashMap<&StockCode, &StockRow> =
        change_rows.iter().map(|row| (&row.code, row)).collect();

    let volume_rank = rank_positions(volume_rows, |row| {
        row.volume.map(|v| v as f64).unwrap_or(0.0)
    });
    let change_rank = rank_positions(change_rows, |row| row.change_rate.unwrap_or(-999.0));

    let mut rows = Vec::new();
    for volume_row in volume_rows {
        let Some(change_row) = change_by_code.get(&volume_row.code) else {
            continue;
        };
        let Some(change_rate) = change_row.change_rate else {
            continue;
        };
        if change_rate < params.min_change || change_rate > params.max_change {
            continue;
        }

        let vr = volume_rank
            .get(&volume_row.code)
            .copied()
            .unwrap_or(UNRANKED);
        let cr = change_rank
            .get(&volume_row.code)
            .copied()
            .unwrap_or(UNRANKED);
        let score =
            VOLUME_RANK_WEIGHT / (vr as f64 + 1.0) + CHANGE_RANK_WEIGHT / (cr as f64 + 1.0);

        rows.push(StockRow {
            code: volume_row.code.clone(),
            name: if volume_row.name.is_empty() {
                change_row.name.clone()
            } else {
                volume_row.name.clone()
            },
            price: volume_row.price.or(change_row.price),
            volume: volume_row.volume.or(change_row.volume),
            change_rate: Some(change_rate),
            swing_score: Some(score),
        });
    }

    rows.sort_by(|a, b| {
        b.swing_score
            .unwrap_or(0.0)
            .total_cmp(&a.swing_score.unwrap_or(0.0))
            .then_with(|| a.code.as_str().cmp(b.code.as_str()))
    });
    rows
}

fn rank_positions<'a>(
    rows: &'a [StockRow],
    key: impl Fn(&StockRow) -> f64,
) -> HashMap<&'a StockCode, usize> {
    let mut sorted: Vec<&StockRow> = rows.iter().collect();
    sorted.sort_by(|a, b| key(b).total_cmp(&key(a)));
    sorted
        .into_iter()
        .enumerate()
        .map(|(index, row)| (&row.code, index))
        .collect()
}

/// Row filters shared by the ranking CLI modes. Rows missing a bounded value
/// are dropped by that bound.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub keyword: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_volume: Option<u64>,
}

impl RowFilter {
    pub fn matches(&self, row: &StockRow) -> bool {
        if let Some(keyword) = &self.keyword {
            let needle = keyword.to_lowercase();
            let hit = row.code.as_str().to_lowercase().contains(&needle)
                || row.name.to_lowercase().contains(&needle);
            if !hit {
                return false;
            }
        }
        if let Some(min_price) = self.min_price {
            if !row.price.is_some_and(|price| price >= min_price) {
                return false;
            }
        }
        if let Some(max_price) = self.max_price {
            if !row.price.is_some_and(|price| price <= max_price) {
                return false;
            }
        }
        if let Some(min_volume) = self.min_volume {
            if !row.volume.is_some_and(|volume| volume >= min_volume) {
                return false;
            }
        }
        true
    }

    pub fn apply(&self, rows: Vec<StockRow>) -> Vec<StockRow> {
        rows.into_iter().filter(|row| self.matches(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(code: &str, name: &str, volume: Option<u64>, change_rate: Option<f64>) -> StockRow {
        StockRow {
            code: StockCode::parse(code).expect("valid code"),
            name: name.to_owned(),
            price: Some(10_000.0),
            volume,
            change_rate,
            swing_score: None,
        }
    }

    #[test]
    fn only_codes_in_both_lists_survive() {
        let volume_rows = vec![
            row("005930", "Samsung", Some(5_000), None),
            row("000660", "Hynix", Some(4_000), None),
        ];
        let change_rows = vec![row("005930", "Samsung", None, Some(2.5))];

        let candidates = swing_candidates(&volume_rows, &change_rows, &ScreenParams::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].code.as_str(), "005930");
        assert_eq!(candidates[0].change_rate, Some(2.5));
        assert_eq!(candidates[0].volume, Some(5_000));
    }

    #[test]
    fn change_band_drops_overheated_and_dumping_rows() {
        let volume_rows = vec![
            row("005930", "ok", Some(3_000), None),
            row("000660", "hot", Some(2_000), None),
            row("035720", "cold", Some(1_000), None),
        ];
        let change_rows = vec![
            row("005930", "ok", None, Some(4.0)),
            row("000660", "hot", None, Some(20.0)),
            row("035720", "cold", None, Some(-8.0)),
        ];

        let candidates = swing_candidates(&volume_rows, &change_rows, &ScreenParams::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].code.as_str(), "005930");
    }

    #[test]
    fn rank_score_prefers_high_volume_and_high_change() {
        let volume_rows = vec![
            row("005930", "first", Some(9_000), None),
            row("000660", "second", Some(5_000), None),
        ];
        let change_rows = vec![
            row("005930", "first", None, Some(5.0)),
            row("000660", "second", None, Some(1.0)),
        ];

        let candidates = swing_candidates(&volume_rows, &change_rows, &ScreenParams::default());
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].code.as_str(), "005930");
        let first = candidates[0].swing_score.expect("scored");
        let second = candidates[1].swing_score.expect("scored");
        assert!(first > second);
        // Top of both lists: 0.6/1 + 0.4/1.
        assert!((first - 1.0).abs() < 1e-9);
    }

    #[test]
    fn filter_bounds_drop_rows_with_missing_values() {
        let rows = vec![
            row("005930", "Samsung", Some(5_000), None),
            row("000660", "Hynix", None, None),
        ];
        let filter = RowFilter {
            min_volume: Some(1_000),
            ..RowFilter::default()
        };

        let kept = filter.apply(rows);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].code.as_str(), "005930");
    }

    #[test]
    fn keyword_matches_code_or_name_case_insensitively() {
        let rows = vec![
            row("005930", "Samsung Electronics", Some(1), None),
            row("000660", "SK Hynix", Some(1), None),
        ];
        let filter = RowFilter {
            keyword: Some(String::from("samsung")),
            ..RowFilter::default()
        };
        assert_eq!(filter.apply(rows.clone()).len(), 1);

        let by_code = RowFilter {
            keyword: Some(String::from("0660")),
            ..RowFilter::default()
        };
        assert_eq!(by_code.apply(rows)[0].code.as_str(), "000660");
    }
}
