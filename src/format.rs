use chrono::{DateTime, NaiveDate};

use crate::config::MARKET_URL_BASE;

/// Placeholder for any value that is missing or unreadable.
pub const UNAVAILABLE: &str = "—";

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// `0.574` → `57.4%`.
pub fn format_prob(prob: Option<f64>) -> String {
    match prob {
        Some(p) => format!("{:.1}%", p * 100.0),
        None => UNAVAILABLE.to_string(),
    }
}

/// An already-scaled percentage, one decimal.
pub fn format_percent(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.1}%"),
        None => UNAVAILABLE.to_string(),
    }
}

/// Signed percentage points, e.g. `+3.6pp`.
pub fn format_bias(pp: Option<f64>) -> String {
    match pp {
        Some(v) => format!("{v:+.1}pp"),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn format_volume(vol: Option<f64>) -> String {
    match vol {
        Some(v) if v >= 1e9 => format!("${:.2}B", v / 1e9),
        Some(v) if v >= 1e6 => format!("${:.1}M", v / 1e6),
        Some(v) if v >= 1e3 => format!("${:.0}K", v / 1e3),
        Some(v) => format!("${v:.0}"),
        None => UNAVAILABLE.to_string(),
    }
}

/// `2024-11-06` (or an RFC 3339 timestamp) → `Nov 6, 2024`.
/// Anything unparseable renders as the placeholder.
pub fn format_date(date: Option<&str>) -> String {
    let Some(raw) = date.map(str::trim) else {
        return UNAVAILABLE.to_string();
    };
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()));
    match parsed {
        Some(d) => d.format("%b %-d, %Y").to_string(),
        None => UNAVAILABLE.to_string(),
    }
}

pub fn market_url(slug: &str) -> String {
    format!("{MARKET_URL_BASE}{slug}")
}

/// Shorten to at most `max` characters, ending in `…` when cut.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
