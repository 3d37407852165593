use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::{debug, warn};

use crate::dataset::{Dataset, DatasetSource};
use crate::engine::ViewCache;
use crate::stats::{aggregate, Statistics};
use crate::types::{MarketRecord, SortDirection, SortField, SortState};

const PAGE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Explorer,
    Visualizations,
}

impl Tab {
    pub fn next(self) -> Self {
        match self {
            Tab::Explorer => Tab::Visualizations,
            Tab::Visualizations => Tab::Explorer,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Explorer => 0,
            Tab::Visualizations => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    /// Keystrokes edit the search term.
    Search,
}

// ---------------------------------------------------------------------------
// App state
// ---------------------------------------------------------------------------

/// All UI state. Rendering reads it; only `handle_key` mutates it.
#[derive(Debug)]
pub struct AppState {
    pub records: Vec<MarketRecord>,
    pub source: DatasetSource,
    pub skipped: usize,
    /// Aggregated once at load; the dataset never changes afterwards.
    pub stats: Statistics,
    pub tab: Tab,
    pub mode: InputMode,
    pub search: String,
    /// `None` when the configured sort key was not a record field.
    pub sort: Option<SortState>,
    /// Position within the visible rows.
    pub selected: usize,
    /// Horizon compared against 7d on the visualizations tab.
    pub compare_day: u8,
    pub should_quit: bool,
    view: ViewCache,
}

impl AppState {
    pub fn new(dataset: Dataset, sort_key: &str, direction: SortDirection) -> Self {
        let sort = match SortField::from_key(sort_key) {
            Some(field) => Some(SortState::new(field, direction)),
            None => {
                warn!(sort_key, "Unknown sort field; rows start in dataset order");
                None
            }
        };
        let stats = aggregate(&dataset.records);

        let mut app = Self {
            records: dataset.records,
            source: dataset.source,
            skipped: dataset.skipped,
            stats,
            tab: Tab::Explorer,
            mode: InputMode::Normal,
            search: String::new(),
            sort,
            selected: 0,
            compare_day: 1,
            should_quit: false,
            view: ViewCache::new(),
        };
        app.refresh_view();
        app
    }

    /// Indices into `records` of the rows currently shown, in display order.
    pub fn rows(&self) -> &[usize] {
        self.view.rows()
    }

    pub fn selected_record(&self) -> Option<&MarketRecord> {
        self.rows().get(self.selected).map(|&i| &self.records[i])
    }

    /// Re-derive the visible rows from (search, sort) and keep the selection in range.
    fn refresh_view(&mut self) {
        let len = self.view.get(&self.records, &self.search, self.sort).len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    pub fn sort_by(&mut self, field: SortField) {
        let next = match self.sort {
            Some(current) => current.select(field),
            None => SortState::new(field, SortDirection::Descending),
        };
        debug!(field = %field.key(), direction = ?next.direction, "[SORT] changed");
        self.sort = Some(next);
        self.selected = 0;
        self.refresh_view();
    }

    fn move_selection(&mut self, delta: isize) {
        let max = self.rows().len().saturating_sub(1);
        self.selected = self.selected.saturating_add_signed(delta).min(max);
    }

    fn cycle_compare_day(&mut self, forward: bool) {
        // 7d is always shown; cycle the comparison among 1..=6.
        self.compare_day = match (forward, self.compare_day) {
            (true, 6) => 1,
            (true, d) => d + 1,
            (false, 1) => 6,
            (false, d) => d - 1,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        match self.mode {
            InputMode::Search => self.handle_search_key(key.code),
            InputMode::Normal => self.handle_normal_key(key.code),
        }
    }

    fn handle_search_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Enter => self.mode = InputMode::Normal,
            KeyCode::Esc => {
                self.mode = InputMode::Normal;
                self.search.clear();
                self.refresh_view();
            }
            KeyCode::Backspace => {
                self.search.pop();
                self.refresh_view();
            }
            KeyCode::Char(c) => {
                self.search.push(c);
                self.selected = 0;
                self.refresh_view();
            }
            _ => {}
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab | KeyCode::BackTab => self.tab = self.tab.next(),
            _ => match self.tab {
                Tab::Explorer => self.handle_explorer_key(code),
                Tab::Visualizations => self.handle_visualizations_key(code),
            },
        }
    }

    fn handle_explorer_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('/') => self.mode = InputMode::Search,
            KeyCode::Char('c') => {
                self.search.clear();
                self.refresh_view();
            }
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::PageDown => self.move_selection(PAGE as isize),
            KeyCode::PageUp => self.move_selection(-(PAGE as isize)),
            KeyCode::Home | KeyCode::Char('g') => self.selected = 0,
            KeyCode::End | KeyCode::Char('G') => self.move_selection(isize::MAX),
            KeyCode::Char('n') => self.sort_by(SortField::Name),
            KeyCode::Char(c @ '1'..='7') => self.sort_by(SortField::DProb(c as u8 - b'0')),
            KeyCode::Char('w') => self.sort_by(SortField::DWon),
            KeyCode::Char('d') => self.sort_by(SortField::ResolutionDate),
            KeyCode::Char('v') => self.sort_by(SortField::CombinedVolume),
            _ => {}
        }
    }

    fn handle_visualizations_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(']') | KeyCode::Right | KeyCode::Char('l') => self.cycle_compare_day(true),
            KeyCode::Char('[') | KeyCode::Left | KeyCode::Char('h') => self.cycle_compare_day(false),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::parse_records;

    fn app_with(raw: &str) -> AppState {
        let (records, skipped) = parse_records(raw).unwrap();
        let dataset = Dataset { records, source: DatasetSource::Bundled, skipped };
        AppState::new(dataset, "combined_volume", SortDirection::Descending)
    }

    fn sample() -> AppState {
        app_with(
            r#"[
                {"name":"Ohio Senate","d_prob_7d":0.38,"d_won":"FALSE","combined_volume":3700000},
                {"name":"Popular vote","d_prob_7d":0.57,"d_won":"FALSE","combined_volume":283700000},
                {"name":"Arizona Senate","d_prob_7d":0.84,"d_won":"TRUE","combined_volume":2600000}
            ]"#,
        )
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn visible_names(app: &AppState) -> Vec<&str> {
        app.rows().iter().map(|&i| app.records[i].name.as_str()).collect()
    }

    fn type_str(app: &mut AppState, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn starts_sorted_by_volume_descending() {
        let app = sample();
        assert_eq!(visible_names(&app), vec!["Popular vote", "Ohio Senate", "Arizona Senate"]);
        assert_eq!(app.stats.total_markets, 3);
    }

    #[test]
    fn unknown_sort_key_starts_unsorted() {
        let (records, _) = parse_records(r#"[{"name":"b"},{"name":"a"}]"#).unwrap();
        let dataset = Dataset { records, source: DatasetSource::Bundled, skipped: 0 };
        let mut app = AppState::new(dataset, "bogus_field", SortDirection::Descending);
        assert_eq!(app.sort, None);
        assert_eq!(visible_names(&app), vec!["b", "a"]);

        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.sort, Some(SortState::new(SortField::Name, SortDirection::Descending)));
    }

    #[test]
    fn search_mode_filters_as_you_type() {
        let mut app = sample();
        app.handle_key(key(KeyCode::Char('/')));
        assert_eq!(app.mode, InputMode::Search);
        type_str(&mut app, "senATE");
        assert_eq!(visible_names(&app), vec!["Ohio Senate", "Arizona Senate"]);

        // 'q' is text while searching, not quit
        app.handle_key(key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert!(app.rows().is_empty());

        app.handle_key(key(KeyCode::Backspace));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.mode, InputMode::Normal);
        assert_eq!(app.search, "senATE");
    }

    #[test]
    fn escape_from_search_clears_query() {
        let mut app = sample();
        app.handle_key(key(KeyCode::Char('/')));
        type_str(&mut app, "ohio");
        app.handle_key(key(KeyCode::Esc));
        assert_eq!(app.search, "");
        assert_eq!(app.rows().len(), 3);
        assert!(!app.should_quit);
    }

    #[test]
    fn sort_keys_toggle_and_reset() {
        let mut app = sample();
        app.handle_key(key(KeyCode::Char('v')));
        assert_eq!(app.sort.unwrap().direction, SortDirection::Ascending);
        assert_eq!(visible_names(&app), vec!["Arizona Senate", "Ohio Senate", "Popular vote"]);

        app.handle_key(key(KeyCode::Char('7')));
        assert_eq!(app.sort, Some(SortState::new(SortField::DProb(7), SortDirection::Descending)));
        assert_eq!(visible_names(&app), vec!["Arizona Senate", "Popular vote", "Ohio Senate"]);
    }

    #[test]
    fn selection_stays_in_range() {
        let mut app = sample();
        app.handle_key(key(KeyCode::Char('G')));
        assert_eq!(app.selected, 2);
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.selected, 2);

        app.handle_key(key(KeyCode::Char('/')));
        type_str(&mut app, "popular");
        assert_eq!(app.selected, 0);
        assert_eq!(app.selected_record().unwrap().name, "Popular vote");
    }

    #[test]
    fn tab_switches_and_compare_day_cycles() {
        let mut app = sample();
        app.handle_key(key(KeyCode::Tab));
        assert_eq!(app.tab, Tab::Visualizations);
        app.handle_key(key(KeyCode::Char('[')));
        assert_eq!(app.compare_day, 6);
        app.handle_key(key(KeyCode::Char(']')));
        app.handle_key(key(KeyCode::Char(']')));
        assert_eq!(app.compare_day, 2);

        // sort keys do nothing off the explorer tab
        let before = app.sort;
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.sort, before);
    }

    #[test]
    fn quit_keys() {
        let mut app = sample();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);

        let mut app = sample();
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }
}
