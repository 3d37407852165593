use crate::config::PREDICTION_THRESHOLD;

// ---------------------------------------------------------------------------
// MarketRecord
// ---------------------------------------------------------------------------

/// One resolved election market. Immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketRecord {
    pub name: String,
    /// Democrat win probability by horizon; index `day - 1`, so `d_probs[6]` is 7d.
    pub d_probs: [Option<f64>; 7],
    pub d_won: bool,
    pub resolution_date: Option<String>,
    pub combined_volume: Option<f64>,
    pub d_market_slug: Option<String>,
    pub r_market_slug: Option<String>,
}

impl MarketRecord {
    /// Probability at `day` days before resolution. Out-of-range days are absent.
    pub fn prob(&self, day: u8) -> Option<f64> {
        match day {
            1..=7 => self.d_probs[usize::from(day) - 1],
            _ => None,
        }
    }

    pub fn outcome(&self) -> Party {
        if self.d_won {
            Party::Democrat
        } else {
            Party::Republican
        }
    }

    /// Party implied by the probability at `day`, if one was recorded.
    pub fn prediction(&self, day: u8) -> Option<Party> {
        self.prob(day).map(Party::predicted_by)
    }
}

// ---------------------------------------------------------------------------
// Party
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Party {
    Democrat,
    Republican,
}

impl Party {
    /// Strict `>`: a probability of exactly 0.5 predicts Republican.
    pub fn predicted_by(d_prob: f64) -> Self {
        if d_prob > PREDICTION_THRESHOLD {
            Party::Democrat
        } else {
            Party::Republican
        }
    }

    pub fn letter(self) -> &'static str {
        match self {
            Party::Democrat => "D",
            Party::Republican => "R",
        }
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Party::Democrat => "democrat",
            Party::Republican => "republican",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Sorting
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortField {
    Name,
    /// Probability column for the given horizon (1..=7).
    DProb(u8),
    DWon,
    ResolutionDate,
    CombinedVolume,
}

impl SortField {
    /// Every sortable column, in table order.
    pub const ALL: [SortField; 11] = [
        SortField::Name,
        SortField::DProb(7),
        SortField::DProb(6),
        SortField::DProb(5),
        SortField::DProb(4),
        SortField::DProb(3),
        SortField::DProb(2),
        SortField::DProb(1),
        SortField::DWon,
        SortField::ResolutionDate,
        SortField::CombinedVolume,
    ];

    /// Parse a record key such as `"d_prob_3d"`. Unknown keys yield `None`.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(SortField::Name),
            "d_won" => Some(SortField::DWon),
            "resolution_date" => Some(SortField::ResolutionDate),
            "combined_volume" => Some(SortField::CombinedVolume),
            _ => {
                let day = key.strip_prefix("d_prob_")?.strip_suffix('d')?;
                match day.as_bytes() {
                    [d @ b'1'..=b'7'] => Some(SortField::DProb(d - b'0')),
                    _ => None,
                }
            }
        }
    }

    pub fn key(&self) -> String {
        match self {
            SortField::Name => "name".to_string(),
            SortField::DProb(d) => format!("d_prob_{d}d"),
            SortField::DWon => "d_won".to_string(),
            SortField::ResolutionDate => "resolution_date".to_string(),
            SortField::CombinedVolume => "combined_volume".to_string(),
        }
    }

    /// Column header label.
    pub fn label(&self) -> String {
        match self {
            SortField::Name => "Market".to_string(),
            SortField::DProb(d) => format!("{d}d"),
            SortField::DWon => "Won".to_string(),
            SortField::ResolutionDate => "Resolved".to_string(),
            SortField::CombinedVolume => "Volume".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Ascending => "↑",
            SortDirection::Descending => "↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortState {
    pub field: SortField,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Apply a user sort action: reselecting the active field flips the
    /// direction, choosing a new field starts descending.
    pub fn select(self, field: SortField) -> Self {
        if self.field == field {
            Self::new(field, self.direction.flipped())
        } else {
            Self::new(field, SortDirection::Descending)
        }
    }
}

impl Default for SortState {
    fn default() -> Self {
        Self::new(SortField::CombinedVolume, SortDirection::Descending)
    }
}
