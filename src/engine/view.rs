use std::cmp::Ordering;

use crate::types::{MarketRecord, SortDirection, SortField, SortState};

/// Comparable projection of one record field.
///
/// `Missing` orders below every defined value, so it sinks to the bottom of a
/// descending sort and floats to the top of an ascending one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SortKey<'a> {
    Missing,
    Number(f64),
    Text(&'a str),
}

pub fn sort_key(record: &MarketRecord, field: SortField) -> SortKey<'_> {
    match field {
        SortField::Name => SortKey::Text(&record.name),
        SortField::DProb(day) => record.prob(day).map_or(SortKey::Missing, SortKey::Number),
        SortField::DWon => SortKey::Number(if record.d_won { 1.0 } else { 0.0 }),
        SortField::ResolutionDate => record
            .resolution_date
            .as_deref()
            .map_or(SortKey::Missing, SortKey::Text),
        SortField::CombinedVolume => record
            .combined_volume
            .map_or(SortKey::Missing, SortKey::Number),
    }
}

pub fn compare_keys(a: SortKey<'_>, b: SortKey<'_>) -> Ordering {
    match (a, b) {
        (SortKey::Missing, SortKey::Missing) => Ordering::Equal,
        (SortKey::Missing, _) => Ordering::Less,
        (_, SortKey::Missing) => Ordering::Greater,
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(&y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        // A field never mixes text and numbers; treat as a tie.
        _ => Ordering::Equal,
    }
}

/// Case-insensitive substring match against the market name.
/// `needle` must already be lowercased.
fn matches(record: &MarketRecord, needle: &str) -> bool {
    needle.is_empty() || record.name.to_lowercase().contains(needle)
}

/// Order `rows` (indices into `records`) in place.
pub fn sort_indices(records: &[MarketRecord], rows: &mut [usize], sort: SortState) {
    rows.sort_by(|&a, &b| {
        let ord = compare_keys(
            sort_key(&records[a], sort.field),
            sort_key(&records[b], sort.field),
        );
        match sort.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

/// Indices of the records matching `query`, ordered by `sort`.
///
/// With no sort the filtered rows keep dataset order. Ties keep dataset order
/// too, though callers should not rely on that.
pub fn view_indices(records: &[MarketRecord], query: &str, sort: Option<SortState>) -> Vec<usize> {
    let needle = query.to_lowercase();
    let mut rows: Vec<usize> = records
        .iter()
        .enumerate()
        .filter(|(_, r)| matches(r, &needle))
        .map(|(i, _)| i)
        .collect();

    if let Some(sort) = sort {
        sort_indices(records, &mut rows, sort);
    }
    rows
}

/// Filtered, ordered view over `records`. Never mutates the input.
pub fn view<'a>(
    records: &'a [MarketRecord],
    query: &str,
    sort: Option<SortState>,
) -> Vec<&'a MarketRecord> {
    view_indices(records, query, sort)
        .into_iter()
        .map(|i| &records[i])
        .collect()
}
