use tracing::info;

use crate::config::HORIZONS;
use crate::types::{MarketRecord, Party};

// ---------------------------------------------------------------------------
// Derived types
// ---------------------------------------------------------------------------

/// Prediction accuracy at one horizon. `accuracy` is a percentage and is
/// `None` when no record has a probability at this horizon.
#[derive(Debug, Clone, PartialEq)]
pub struct AccuracyPoint {
    pub day: u8,
    pub correct: usize,
    pub total: usize,
    pub accuracy: Option<f64>,
}

/// Predicted vs actual Democrat win rate (percentages).
/// `predicted` is over records covered at `day`; `actual` is over the whole dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct WinRatePoint {
    pub day: u8,
    pub predicted: Option<f64>,
    pub actual: Option<f64>,
}

/// Predicted-vs-actual outcome counts at one horizon.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub predicted_r_actual_r: usize,
    pub predicted_d_actual_r: usize,
    pub predicted_r_actual_d: usize,
    pub predicted_d_actual_d: usize,
}

impl ConfusionMatrix {
    fn record(&mut self, predicted: Party, actual: Party) {
        let cell = match (predicted, actual) {
            (Party::Republican, Party::Republican) => &mut self.predicted_r_actual_r,
            (Party::Democrat, Party::Republican) => &mut self.predicted_d_actual_r,
            (Party::Republican, Party::Democrat) => &mut self.predicted_r_actual_d,
            (Party::Democrat, Party::Democrat) => &mut self.predicted_d_actual_d,
        };
        *cell += 1;
    }

    pub fn total(&self) -> usize {
        self.predicted_r_actual_r
            + self.predicted_d_actual_r
            + self.predicted_r_actual_d
            + self.predicted_d_actual_d
    }

    /// Share of the covered total in percent.
    pub fn share(&self, count: usize) -> Option<f64> {
        percent(count, self.total())
    }
}

/// A market whose prediction at some horizon disagreed with the outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct FailedPrediction {
    pub name: String,
    pub d_prob: f64,
    pub predicted: Party,
    pub actual: Party,
    pub combined_volume: Option<f64>,
}

impl FailedPrediction {
    pub fn error_label(&self) -> String {
        format!(
            "Predicted {}, {} won",
            self.predicted.letter(),
            self.actual.letter()
        )
    }
}

/// Everything the visual summaries need for one horizon beyond accuracy and
/// win rate.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonBreakdown {
    pub day: u8,
    pub confusion: ConfusionMatrix,
    /// Mean Democrat probability minus Democrat win rate over covered
    /// records, in percentage points. Positive = Democrats overestimated.
    pub bias_pp: Option<f64>,
    /// Ordered by volume, largest first; missing volume last.
    pub failed: Vec<FailedPrediction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
    pub accuracy_by_horizon: Vec<AccuracyPoint>,
    pub win_rate_by_horizon: Vec<WinRatePoint>,
    pub breakdowns: Vec<HorizonBreakdown>,
    pub total_markets: usize,
    pub actual_democrat_wins: usize,
}

impl Statistics {
    pub fn republican_wins(&self) -> usize {
        self.total_markets - self.actual_democrat_wins
    }

    pub fn accuracy(&self, day: u8) -> Option<&AccuracyPoint> {
        self.accuracy_by_horizon.iter().find(|p| p.day == day)
    }

    pub fn win_rate(&self, day: u8) -> Option<&WinRatePoint> {
        self.win_rate_by_horizon.iter().find(|p| p.day == day)
    }

    pub fn breakdown(&self, day: u8) -> Option<&HorizonBreakdown> {
        self.breakdowns.iter().find(|b| b.day == day)
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Derive every summary statistic from the full dataset.
///
/// Accuracy, predicted rate, confusion and bias use only records with a
/// probability at that horizon. The actual Democrat win rate always divides
/// by the full dataset size, so it is identical across horizons.
pub fn aggregate(records: &[MarketRecord]) -> Statistics {
    let total_markets = records.len();
    let actual_democrat_wins = records.iter().filter(|r| r.d_won).count();
    let actual_rate = percent(actual_democrat_wins, total_markets);

    let mut accuracy_by_horizon = Vec::with_capacity(HORIZONS.len());
    let mut win_rate_by_horizon = Vec::with_capacity(HORIZONS.len());
    let mut breakdowns = Vec::with_capacity(HORIZONS.len());

    for day in HORIZONS {
        let mut confusion = ConfusionMatrix::default();
        let mut failed = Vec::new();
        let mut prob_sum = 0.0;
        let mut covered_d_wins = 0usize;

        for r in records {
            let Some(d_prob) = r.prob(day) else {
                continue;
            };
            let predicted = Party::predicted_by(d_prob);
            let actual = r.outcome();
            confusion.record(predicted, actual);
            prob_sum += d_prob;
            if r.d_won {
                covered_d_wins += 1;
            }
            if predicted != actual {
                failed.push(FailedPrediction {
                    name: r.name.clone(),
                    d_prob,
                    predicted,
                    actual,
                    combined_volume: r.combined_volume,
                });
            }
        }

        let total = confusion.total();
        let correct = confusion.predicted_r_actual_r + confusion.predicted_d_actual_d;
        let predicted_d = confusion.predicted_d_actual_r + confusion.predicted_d_actual_d;

        let bias_pp = (total > 0)
            .then(|| (prob_sum / total as f64 - covered_d_wins as f64 / total as f64) * 100.0);

        failed.sort_by(|a, b| {
            let va = a.combined_volume.unwrap_or(f64::NEG_INFINITY);
            let vb = b.combined_volume.unwrap_or(f64::NEG_INFINITY);
            vb.total_cmp(&va)
        });

        accuracy_by_horizon.push(AccuracyPoint {
            day,
            correct,
            total,
            accuracy: percent(correct, total),
        });
        win_rate_by_horizon.push(WinRatePoint {
            day,
            predicted: percent(predicted_d, total),
            actual: actual_rate,
        });
        breakdowns.push(HorizonBreakdown {
            day,
            confusion,
            bias_pp,
            failed,
        });
    }

    let stats = Statistics {
        accuracy_by_horizon,
        win_rate_by_horizon,
        breakdowns,
        total_markets,
        actual_democrat_wins,
    };
    log_summary(&stats);
    stats
}

fn log_summary(stats: &Statistics) {
    let fmt = |v: Option<f64>| v.map_or("n/a".to_string(), |a| format!("{a:.1}%"));
    let acc = |day: u8| stats.accuracy(day).and_then(|p| p.accuracy);
    info!(
        total_markets = stats.total_markets,
        democrat_wins = stats.actual_democrat_wins,
        "[STATS] {} markets | D wins: {} | accuracy 7d: {} | accuracy 1d: {}",
        stats.total_markets,
        stats.actual_democrat_wins,
        fmt(acc(7)),
        fmt(acc(1)),
    );
}

/// `n / d` as a percentage; `None` for an empty denominator.
fn percent(n: usize, d: usize) -> Option<f64> {
    (d > 0).then(|| n as f64 / d as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, probs_7_to_1: [Option<f64>; 7], d_won: bool, volume: f64) -> MarketRecord {
        let mut d_probs = probs_7_to_1;
        d_probs.reverse();
        MarketRecord {
            name: name.to_string(),
            d_probs,
            d_won,
            resolution_date: None,
            combined_volume: Some(volume),
            d_market_slug: None,
            r_market_slug: None,
        }
    }

    fn only_7d(p: f64, d_won: bool) -> MarketRecord {
        record("m", [Some(p), None, None, None, None, None, None], d_won, 1.0)
    }

    #[test]
    fn perfectly_called_dataset_is_fully_accurate() {
        let mut records = Vec::new();
        for p in [0.51, 0.6, 0.7, 0.8, 0.9, 0.99] {
            records.push(only_7d(p, true));
        }
        for p in [0.5, 0.4, 0.2, 0.01] {
            records.push(only_7d(p, false));
        }
        let stats = aggregate(&records);
        let day7 = stats.accuracy(7).unwrap();
        assert_eq!(day7.correct, 10);
        assert_eq!(day7.total, 10);
        assert!((day7.accuracy.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn uncovered_horizon_is_unavailable_not_zero() {
        let records = vec![only_7d(0.8, true), only_7d(0.3, false)];
        let stats = aggregate(&records);
        let day3 = stats.accuracy(3).unwrap();
        assert_eq!(day3.total, 0);
        assert_eq!(day3.accuracy, None);
        assert_eq!(stats.win_rate(3).unwrap().predicted, None);
        assert_eq!(stats.breakdown(3).unwrap().bias_pp, None);
    }

    #[test]
    fn actual_rate_ignores_horizon_coverage() {
        let records = vec![
            record("a", [Some(0.9); 7], true, 1.0),
            record("b", [None, None, None, None, None, None, Some(0.2)], false, 1.0),
            record("c", [None; 7], true, 1.0),
            record("d", [Some(0.4), None, Some(0.6), None, None, None, None], false, 1.0),
        ];
        let stats = aggregate(&records);
        for point in &stats.win_rate_by_horizon {
            assert!((point.actual.unwrap() - 50.0).abs() < 1e-9, "day {}", point.day);
        }
        assert_eq!(stats.total_markets, 4);
        assert_eq!(stats.actual_democrat_wins, 2);
        assert_eq!(stats.republican_wins(), 2);
    }

    #[test]
    fn half_probability_is_a_republican_call() {
        let stats = aggregate(&[only_7d(0.5, true)]);
        let day7 = stats.accuracy(7).unwrap();
        assert_eq!(day7.correct, 0);
        assert_eq!(stats.win_rate(7).unwrap().predicted, Some(0.0));
        let matrix = &stats.breakdown(7).unwrap().confusion;
        assert_eq!(matrix.predicted_r_actual_d, 1);
    }

    #[test]
    fn predicted_rate_uses_covered_denominator() {
        let records = vec![
            only_7d(0.8, true),
            only_7d(0.3, true),
            record("uncovered", [None; 7], true, 1.0),
        ];
        let stats = aggregate(&records);
        let day7 = stats.win_rate(7).unwrap();
        assert!((day7.predicted.unwrap() - 50.0).abs() < 1e-9);
        assert!((day7.actual.unwrap() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn horizons_are_reported_seven_down_to_one() {
        let stats = aggregate(&[]);
        let days: Vec<u8> = stats.accuracy_by_horizon.iter().map(|p| p.day).collect();
        assert_eq!(days, vec![7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(stats.win_rate(1).unwrap().actual, None);
    }

    #[test]
    fn confusion_cells_sum_to_covered_total() {
        let records = vec![
            only_7d(0.9, true),
            only_7d(0.9, false),
            only_7d(0.1, true),
            only_7d(0.1, false),
            only_7d(0.2, false),
        ];
        let stats = aggregate(&records);
        let m = &stats.breakdown(7).unwrap().confusion;
        assert_eq!(m.total(), 5);
        assert_eq!(m.predicted_r_actual_r, 2);
        assert_eq!(m.predicted_d_actual_r, 1);
        assert_eq!(m.predicted_r_actual_d, 1);
        assert_eq!(m.predicted_d_actual_d, 1);
        assert!((m.share(2).unwrap() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn bias_is_positive_when_democrats_overestimated() {
        // Mean prob 0.7, Democrat win rate 0.5 → +20pp.
        let records = vec![only_7d(0.8, true), only_7d(0.6, false)];
        let stats = aggregate(&records);
        let bias = stats.breakdown(7).unwrap().bias_pp.unwrap();
        assert!((bias - 20.0).abs() < 1e-9, "bias={bias}");
    }

    #[test]
    fn failed_predictions_ordered_by_volume() {
        let records = vec![
            record("small miss", [Some(0.7), None, None, None, None, None, None], false, 10.0),
            record("hit", [Some(0.7), None, None, None, None, None, None], true, 99.0),
            record("big miss", [Some(0.4), None, None, None, None, None, None], true, 500.0),
        ];
        let stats = aggregate(&records);
        let failed = &stats.breakdown(7).unwrap().failed;
        let names: Vec<&str> = failed.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["big miss", "small miss"]);
        assert_eq!(failed[0].error_label(), "Predicted R, D won");
        assert_eq!(failed[1].error_label(), "Predicted D, R won");
    }

    #[test]
    fn aggregate_is_deterministic() {
        let records = vec![only_7d(0.8, true), only_7d(0.3, true)];
        assert_eq!(aggregate(&records), aggregate(&records));
    }
}
