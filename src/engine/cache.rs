use tracing::debug;

use crate::engine::view::view_indices;
use crate::types::{MarketRecord, SortState};

/// Memoizes the last filtered/sorted view.
///
/// Keyed on (query, sort). The dataset is fixed for the life of the process,
/// so a key match is the only validity check.
#[derive(Debug, Default)]
pub struct ViewCache {
    key: Option<(String, Option<SortState>)>,
    rows: Vec<usize>,
    recomputes: u64,
}

impl ViewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indices into `records` for the given query and sort, recomputed only
    /// when either input differs from the previous call.
    pub fn get(&mut self, records: &[MarketRecord], query: &str, sort: Option<SortState>) -> &[usize] {
        let hit = matches!(&self.key, Some((q, s)) if q == query && *s == sort);
        if !hit {
            self.rows = view_indices(records, query, sort);
            self.key = Some((query.to_string(), sort));
            self.recomputes += 1;
            debug!(query, rows = self.rows.len(), recomputes = self.recomputes, "[VIEW] recomputed");
        }
        &self.rows
    }

    /// Result of the most recent `get`.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn recomputes(&self) -> u64 {
        self.recomputes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SortDirection, SortField};

    fn records() -> Vec<MarketRecord> {
        ["Ohio Senate", "Texas Senate", "House control"]
            .iter()
            .enumerate()
            .map(|(i, name)| MarketRecord {
                name: name.to_string(),
                d_probs: [None; 7],
                d_won: false,
                resolution_date: None,
                combined_volume: Some(i as f64),
                d_market_slug: None,
                r_market_slug: None,
            })
            .collect()
    }

    #[test]
    fn repeated_inputs_hit_the_cache() {
        let records = records();
        let mut cache = ViewCache::new();
        let first = cache.get(&records, "senate", Some(SortState::default())).to_vec();
        let second = cache.get(&records, "senate", Some(SortState::default())).to_vec();
        assert_eq!(first, vec![1, 0]);
        assert_eq!(first, second);
        assert_eq!(cache.recomputes(), 1);
    }

    #[test]
    fn changed_query_or_sort_recomputes() {
        let records = records();
        let mut cache = ViewCache::new();
        cache.get(&records, "", None);
        assert_eq!(cache.get(&records, "house", None), &[2]);
        let asc = SortState::new(SortField::CombinedVolume, SortDirection::Ascending);
        assert_eq!(cache.get(&records, "house", Some(asc)), &[2]);
        assert_eq!(cache.recomputes(), 3);
    }
}
