use crate::error::{AppError, Result};
use crate::types::SortDirection;

pub const MARKET_URL_BASE: &str = "https://polymarket.com/market/";

/// Day-horizons in display order, furthest from resolution first.
pub const HORIZONS: [u8; 7] = [7, 6, 5, 4, 3, 2, 1];

/// A probability strictly above this predicts a Democrat win.
/// Exactly 0.5 counts as a Republican prediction.
pub const PREDICTION_THRESHOLD: f64 = 0.5;

/// How long the event loop blocks waiting for input before redrawing (ms).
pub const EVENT_POLL_MS: u64 = 250;

/// Default sort key when SORT_FIELD is unset.
pub const DEFAULT_SORT_FIELD: &str = "combined_volume";

#[derive(Debug, Clone)]
pub struct Config {
    /// Dataset file overriding the bundled one (DATA_PATH)
    pub data_path: Option<String>,
    pub log_level: String,
    /// Log file; stdout belongs to the terminal UI (LOG_PATH)
    pub log_path: String,
    /// Initial sort key, e.g. "d_prob_1d" (SORT_FIELD)
    pub sort_field: String,
    /// Initial sort direction, "asc" or "desc" (SORT_DIRECTION)
    pub sort_direction: SortDirection,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_path: std::env::var("DATA_PATH")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_path: std::env::var("LOG_PATH").unwrap_or_else(|_| "explorer.log".to_string()),
            sort_field: std::env::var("SORT_FIELD")
                .unwrap_or_else(|_| DEFAULT_SORT_FIELD.to_string()),
            sort_direction: parse_direction(
                &std::env::var("SORT_DIRECTION").unwrap_or_else(|_| "desc".to_string()),
            )?,
        })
    }
}

fn parse_direction(raw: &str) -> Result<SortDirection> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Ok(SortDirection::Ascending),
        "desc" | "descending" => Ok(SortDirection::Descending),
        other => Err(AppError::Config(format!(
            "SORT_DIRECTION must be 'asc' or 'desc', got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direction_accepts_short_and_long_forms() {
        assert_eq!(parse_direction("asc").unwrap(), SortDirection::Ascending);
        assert_eq!(parse_direction(" DESC ").unwrap(), SortDirection::Descending);
        assert_eq!(parse_direction("descending").unwrap(), SortDirection::Descending);
    }

    #[test]
    fn direction_rejects_garbage() {
        assert!(matches!(parse_direction("sideways"), Err(AppError::Config(_))));
    }
}
