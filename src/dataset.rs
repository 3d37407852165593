//! Dataset loading and load-time normalization.
//!
//! The dataset is a JSON array of market objects. Boolean-like outcome
//! sentinels (`"TRUE"`, `"FALSE"`, real booleans) are collapsed into `bool`
//! here so nothing downstream has to sniff types again.

use serde::{Deserialize, Deserializer};
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::types::MarketRecord;

/// Dataset compiled into the binary; used unless DATA_PATH overrides it.
pub const BUNDLED_DATASET: &str = include_str!("../data/election_data.json");

/// Raw deserializable shape of one dataset row.
/// Everything except `name` is optional so sparse rows still load.
#[derive(Debug, Deserialize)]
struct RawMarketRecord {
    name: String,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_7d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_6d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_5d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_4d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_3d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_2d: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    d_prob_1d: Option<f64>,
    #[serde(default, deserialize_with = "de_flag")]
    d_won: bool,
    #[serde(default, deserialize_with = "de_opt_string")]
    resolution_date: Option<String>,
    #[serde(default, deserialize_with = "de_opt_f64")]
    combined_volume: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_string")]
    d_market_slug: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    r_market_slug: Option<String>,
}

impl From<RawMarketRecord> for MarketRecord {
    fn from(raw: RawMarketRecord) -> Self {
        MarketRecord {
            name: raw.name,
            d_probs: [
                raw.d_prob_1d,
                raw.d_prob_2d,
                raw.d_prob_3d,
                raw.d_prob_4d,
                raw.d_prob_5d,
                raw.d_prob_6d,
                raw.d_prob_7d,
            ],
            d_won: raw.d_won,
            resolution_date: raw.resolution_date,
            combined_volume: raw.combined_volume,
            d_market_slug: raw.d_market_slug,
            r_market_slug: raw.r_market_slug,
        }
    }
}

/// Where the records came from, for logging and the UI header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    Bundled,
    File(String),
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatasetSource::Bundled => write!(f, "bundled"),
            DatasetSource::File(path) => write!(f, "{path}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<MarketRecord>,
    pub source: DatasetSource,
    /// Rows that could not be read as a market (e.g. missing `name`).
    pub skipped: usize,
}

/// Load the dataset from `data_path`, or the bundled copy when `None`.
pub fn load(data_path: Option<&str>) -> Result<Dataset> {
    let (raw, source) = match data_path {
        Some(path) => (std::fs::read_to_string(path)?, DatasetSource::File(path.to_string())),
        None => (BUNDLED_DATASET.to_string(), DatasetSource::Bundled),
    };

    let (records, skipped) = parse_records(&raw)?;
    info!(
        source = %source,
        records = records.len(),
        skipped,
        "Dataset loaded: {} markets from {source}",
        records.len(),
    );

    Ok(Dataset { records, source, skipped })
}

/// Parse a JSON array of market objects.
///
/// Rows that fail to deserialize are skipped and counted rather than
/// failing the whole load. A document that is not an array is an error.
pub fn parse_records(raw: &str) -> Result<(Vec<MarketRecord>, usize)> {
    let value: serde_json::Value = serde_json::from_str(raw)?;
    let items = match value {
        serde_json::Value::Array(items) => items,
        _ => {
            return Err(AppError::Dataset(
                "dataset must be a JSON array of market objects".to_string(),
            ))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    let mut skipped = 0usize;
    for (idx, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<RawMarketRecord>(item) {
            Ok(r) => records.push(MarketRecord::from(r)),
            Err(e) => {
                skipped += 1;
                warn!(row = idx, "[DATASET] skipping malformed row: {e}");
            }
        }
    }

    debug!(parsed = records.len(), skipped, "[DATASET] parse complete");
    Ok((records, skipped))
}

// ---------------------------------------------------------------------------
// Field deserializers
// ---------------------------------------------------------------------------

/// Number, numeric string, or null. Anything unparseable becomes `None`.
fn de_opt_f64<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|f| f.is_finite()))
}

/// `true`/`false`, `"TRUE"`/`"FALSE"` in any case, or null (false).
fn de_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::Bool(b)) => b,
        Some(serde_json::Value::String(s)) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    })
}

/// String or null; empty strings are treated as absent.
fn de_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match v {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_dataset_parses_cleanly() {
        let (records, skipped) = parse_records(BUNDLED_DATASET).unwrap();
        assert!(!records.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn string_and_bool_sentinels_normalize() {
        let raw = r#"[
            {"name":"a","d_won":"TRUE"},
            {"name":"b","d_won":"FALSE"},
            {"name":"c","d_won":true},
            {"name":"d","d_won":false},
            {"name":"e","d_won":null},
            {"name":"f"}
        ]"#;
        let (records, _) = parse_records(raw).unwrap();
        let won: Vec<bool> = records.iter().map(|r| r.d_won).collect();
        assert_eq!(won, vec![true, false, true, false, false, false]);
    }

    #[test]
    fn probabilities_map_to_their_horizon() {
        let raw = r#"[{"name":"a","d_prob_7d":0.61,"d_prob_1d":"0.72","d_prob_4d":null}]"#;
        let (records, _) = parse_records(raw).unwrap();
        let r = &records[0];
        assert_eq!(r.prob(7), Some(0.61));
        assert_eq!(r.prob(1), Some(0.72));
        assert_eq!(r.prob(4), None);
        assert_eq!(r.prob(3), None);
    }

    #[test]
    fn absent_probability_is_distinct_from_zero() {
        let raw = r#"[{"name":"a","d_prob_2d":0.0}]"#;
        let (records, _) = parse_records(raw).unwrap();
        assert_eq!(records[0].prob(2), Some(0.0));
        assert_eq!(records[0].prob(3), None);
    }

    #[test]
    fn malformed_optional_fields_degrade() {
        let raw = r#"[{"name":"a","combined_volume":"lots","d_prob_5d":{"x":1},"resolution_date":42,"d_market_slug":""}]"#;
        let (records, skipped) = parse_records(raw).unwrap();
        assert_eq!(skipped, 0);
        let r = &records[0];
        assert_eq!(r.combined_volume, None);
        assert_eq!(r.prob(5), None);
        assert_eq!(r.resolution_date, None);
        assert_eq!(r.d_market_slug, None);
    }

    #[test]
    fn rows_without_name_are_skipped() {
        let raw = r#"[{"name":"ok"},{"d_won":true},"not an object"]"#;
        let (records, skipped) = parse_records(raw).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn non_array_document_is_an_error() {
        assert!(matches!(parse_records(r#"{"name":"a"}"#), Err(AppError::Dataset(_))));
        assert!(matches!(parse_records("not json"), Err(AppError::Json(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(load(Some("/nonexistent/election.json")), Err(AppError::Io(_))));
    }
}
