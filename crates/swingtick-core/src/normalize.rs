//! Response-shape normalization.
//!
//! The upstream exposes the same logical attribute under different field
//! names depending on the operation, and sometimes nests the payload one
//! level under `body`. Lookup is an ordered candidate-key list resolved
//! first-match-wins; the tables below are configuration data, not control
//! flow. Absence of data is a normal steady state and never an error.

use serde_json::{Map, Value};

use crate::domain::{PriceSeries, StockCode, StockRow};
use crate::response::ApiResponse;

/// Payload-list location per operation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Volume,
    Change,
    Condition,
    Chart,
}

impl ListKind {
    /// Candidate keys for the payload list, most specific first.
    const fn candidate_keys(self) -> &'static [&'static str] {
        match self {
            Self::Volume => &["tdy_trde_qty_upper", "output", "items"],
            Self::Change => &["pred_pre_flu_rt_upper", "output", "items"],
            Self::Condition => &["condition_item_list", "stk_list", "output", "items"],
            Self::Chart => &[
                "stk_min_pole_chart_qry",
                "stk_tic_stk_pc_chrt",
                "output",
                "items",
            ],
        }
    }
}

const CODE_KEYS: &[&str] = &["stk_cd", "code", "item_cd", "isu_cd"];
const NAME_KEYS: &[&str] = &["stk_nm", "name", "item_nm", "isu_nm"];
const PRICE_KEYS: &[&str] = &["cur_prc", "cur_price", "stck_prpr", "price"];
const VOLUME_KEYS: &[&str] = &["acml_vol", "trde_qty", "now_trde_qty", "volume"];
const CHANGE_KEYS: &[&str] = &["flu_rt", "prdy_ctrt", "change_rate"];
const CLOSE_KEYS: &[&str] = &["cur_prc", "stk_clsprc", "close"];
const BAR_VOLUME_KEYS: &[&str] = &["trde_qty", "volume"];

/// Locate the payload list, trying the top level first and then one level
/// under `body`. No match yields an empty list.
pub fn extract_items(response: &ApiResponse, kind: ListKind) -> Vec<&Map<String, Value>> {
    let root = response.value();
    if let Some(items) = items_under(root, kind) {
        return items;
    }
    root.get("body")
        .and_then(|body| items_under(body, kind))
        .unwrap_or_default()
}

fn items_under(value: &Value, kind: ListKind) -> Option<Vec<&Map<String, Value>>> {
    for key in kind.candidate_keys() {
        if let Some(Value::Array(entries)) = value.get(*key) {
            return Some(entries.iter().filter_map(Value::as_object).collect());
        }
    }
    None
}

/// First candidate field carrying a usable value. Null and blank-string
/// values fall through to the next synonym.
fn first_present<'a>(item: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .find_map(|key| item.get(*key).filter(|value| !is_absent(value)))
}

fn is_absent(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        _ => false,
    }
}

/// Parse a price field into a non-negative magnitude. Explicit signs and
/// thousands separators are stripped; the upstream encodes direction
/// separately from size.
pub fn parse_price(value: Option<&Value>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    match value {
        Value::Number(number) => number.as_f64().map(f64::abs).unwrap_or(0.0),
        Value::String(raw) => {
            let clean: String = raw.trim().chars().filter(|ch| *ch != ',').collect();
            let clean = clean.trim_start_matches(['+', '-']);
            if clean.is_empty() {
                0.0
            } else {
                clean.parse().unwrap_or(0.0)
            }
        }
        _ => 0.0,
    }
}

/// Parse a volume field; negative or unparseable input is unknown.
pub fn parse_volume(value: Option<&Value>) -> Option<u64> {
    let raw = parse_number(value?)?;
    if raw < 0.0 {
        return None;
    }
    Some(raw as u64)
}

/// Parse a signed change-rate percent.
pub fn parse_change_rate(value: Option<&Value>) -> Option<f64> {
    parse_number(value?)
}

fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(raw) => {
            let clean: String = raw.trim().chars().filter(|ch| *ch != ',').collect();
            clean.parse().ok()
        }
        _ => None,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Map one raw record into a `StockRow`. Records without a usable code are
/// dropped, which keeps the downstream invariant that codes are trimmed and
/// non-empty.
pub fn parse_row(item: &Map<String, Value>) -> Option<StockRow> {
    let code = first_present(item, CODE_KEYS)
        .map(|value| text_of(value))
        .and_then(|raw| StockCode::parse(&raw).ok())?;
    let name = first_present(item, NAME_KEYS)
        .map(|value| text_of(value).trim().to_owned())
        .unwrap_or_default();

    Some(StockRow {
        code,
        name,
        price: first_present(item, PRICE_KEYS).map(|value| parse_price(Some(value))),
        volume: parse_volume(first_present(item, VOLUME_KEYS)),
        change_rate: parse_change_rate(first_present(item, CHANGE_KEYS)),
        swing_score: None,
    })
}

/// Normalize a ranking/search response into rows.
pub fn parse_rows(response: &ApiResponse, kind: ListKind) -> Vec<StockRow> {
    extract_items(response, kind)
        .into_iter()
        .filter_map(parse_row)
        .collect()
}

/// Build a chronological close/volume series from chart records. Missing
/// fields parse to zero, matching the upstream's sparse payloads.
pub fn to_series(items: &[&Map<String, Value>]) -> PriceSeries {
    let mut series = PriceSeries::new();
    for item in items {
        let close = parse_price(first_present(item, CLOSE_KEYS));
        let volume = parse_volume(first_present(item, BAR_VOLUME_KEYS)).unwrap_or(0);
        series.push(close, volume);
    }
    series
}

/// Normalize a chart response straight into a series.
pub fn chart_series(response: &ApiResponse) -> PriceSeries {
    to_series(&extract_items(response, ListKind::Chart))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn response(value: Value) -> ApiResponse {
        ApiResponse::new(value)
    }

    #[test]
    fn price_parse_strips_sign_and_separators() {
        assert_eq!(parse_price(Some(&json!("1,234"))), 1234.0);
        assert_eq!(parse_price(Some(&json!("-1,234"))), 1234.0);
        assert_eq!(parse_price(Some(&json!("+70,500"))), 70500.0);
        assert_eq!(parse_price(Some(&json!(-250))), 250.0);
        assert_eq!(parse_price(None), 0.0);
        assert_eq!(parse_price(Some(&json!(""))), 0.0);
    }

    #[test]
    fn volume_parse_rejects_negatives() {
        assert_eq!(parse_volume(Some(&json!("12,345"))), Some(12_345));
        assert_eq!(parse_volume(Some(&json!(42))), Some(42));
        assert_eq!(parse_volume(Some(&json!("-5"))), None);
        assert_eq!(parse_volume(Some(&json!("n/a"))), None);
    }

    #[test]
    fn items_found_under_operation_specific_key() {
        let response = response(json!({
            "tdy_trde_qty_upper": [ { "stk_cd": "005930" }, { "stk_cd": "000660" } ],
        }));
        assert_eq!(extract_items(&response, ListKind::Volume).len(), 2);
    }

    #[test]
    fn items_found_one_level_under_body() {
        let response = response(json!({
            "body": { "output": [ { "stk_cd": "005930" } ] },
        }));
        assert_eq!(extract_items(&response, ListKind::Change).len(), 1);
    }

    #[test]
    fn unknown_shape_yields_empty_not_error() {
        let response = response(json!({ "return_code": 0, "unrelated": {} }));
        assert!(extract_items(&response, ListKind::Condition).is_empty());
    }

    #[test]
    fn row_parse_uses_field_synonyms_in_priority_order() {
        let response = response(json!({
            "output": [{
                "item_cd": " 035420 ",
                "item_nm": "NAVER",
                "stck_prpr": "+215,000",
                "now_trde_qty": "1,200,000",
                "prdy_ctrt": "-1.25",
            }],
        }));

        let rows = parse_rows(&response, ListKind::Condition);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.code.as_str(), "035420");
        assert_eq!(row.name, "NAVER");
        assert_eq!(row.price, Some(215_000.0));
        assert_eq!(row.volume, Some(1_200_000));
        assert_eq!(row.change_rate, Some(-1.25));
    }

    #[test]
    fn rows_without_code_are_dropped() {
        let response = response(json!({
            "output": [
                { "stk_cd": "", "stk_nm": "nameless" },
                { "stk_nm": "codeless" },
                { "stk_cd": "005930", "stk_nm": "Samsung Electronics" },
            ],
        }));

        let rows = parse_rows(&response, ListKind::Volume);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code.as_str(), "005930");
    }

    #[test]
    fn blank_synonym_falls_through_to_next_key() {
        let response = response(json!({
            "output": [ { "stk_cd": "  ", "code": "000660" } ],
        }));

        let rows = parse_rows(&response, ListKind::Volume);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].code.as_str(), "000660");
    }

    #[test]
    fn chart_series_pairs_closes_and_volumes() {
        let response = response(json!({
            "stk_min_pole_chart_qry": [
                { "cur_prc": "-1,000", "trde_qty": "10" },
                { "stk_clsprc": "1,010", "volume": "20" },
                { "close": 1020, "trde_qty": "30" },
            ],
        }));

        let series = chart_series(&response);
        assert_eq!(series.closes(), &[1000.0, 1010.0, 1020.0]);
        assert_eq!(series.volumes(), &[10, 20, 30]);
    }
}
