//! Statistics over final bankrolls and per-step funnels

use serde::{Deserialize, Serialize};

use wh_core::Strategy;
use wh_engine::SpinRecord;

use crate::results::SimulationResults;

// ═══════════════════════════════════════════════════════════════════════════════
// STEP FUNNEL
// ═══════════════════════════════════════════════════════════════════════════════

/// How often a win tier fired and what it paid in total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TierOutcome {
    pub tier_name: String,
    pub count: u64,
    pub total_payout: f64,
}

/// Per-step funnel across every spin of every trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepStatistics {
    pub step_index: usize,
    pub step_id: String,
    pub times_reached: u64,
    pub times_won: u64,
    pub times_lost: u64,
    /// In first-fired order
    pub tier_outcomes: Vec<TierOutcome>,
}

impl StepStatistics {
    pub fn win_rate(&self) -> f64 {
        if self.times_reached > 0 {
            self.times_won as f64 / self.times_reached as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// One [`StepStatistics`] per strategy step, fed spin by spin.
#[derive(Debug, Clone)]
pub struct StepFunnel {
    steps: Vec<StepStatistics>,
}

impl StepFunnel {
    pub fn new(strategy: &Strategy) -> Self {
        let steps = strategy
            .steps
            .iter()
            .enumerate()
            .map(|(i, step)| StepStatistics {
                step_index: i,
                step_id: step.id.clone(),
                times_reached: 0,
                times_won: 0,
                times_lost: 0,
                tier_outcomes: Vec::new(),
            })
            .collect();
        Self { steps }
    }

    pub fn record(&mut self, spin: &SpinRecord) {
        let Some(stats) = self.steps.get_mut(spin.step_index) else {
            return;
        };
        stats.times_reached += 1;
        if !spin.is_win {
            stats.times_lost += 1;
            return;
        }
        stats.times_won += 1;

        if let Some(name) = &spin.tier_triggered_name {
            match stats.tier_outcomes.iter_mut().find(|t| &t.tier_name == name) {
                Some(tier) => {
                    tier.count += 1;
                    tier.total_payout += spin.total_payout;
                }
                None => stats.tier_outcomes.push(TierOutcome {
                    tier_name: name.clone(),
                    count: 1,
                    total_payout: spin.total_payout,
                }),
            }
        }
    }

    pub fn finish(self) -> Vec<StepStatistics> {
        self.steps
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DISTRIBUTION
// ═══════════════════════════════════════════════════════════════════════════════

/// Equal-width buckets spanning the observed [min, max].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Histogram {
    pub min: f64,
    pub max: f64,
    pub bucket_width: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// Bucket `values`. A zero-width range is treated as width 1.
    pub fn build(values: &[f64], buckets: usize) -> Self {
        let buckets = buckets.max(1);
        if values.is_empty() {
            return Self {
                min: 0.0,
                max: 0.0,
                bucket_width: 1.0 / buckets as f64,
                counts: vec![0; buckets],
            };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = if max - min == 0.0 { 1.0 } else { max - min };
        let bucket_width = range / buckets as f64;

        let mut counts = vec![0; buckets];
        for &value in values {
            let index = ((value - min) / bucket_width).floor() as usize;
            counts[index.min(buckets - 1)] += 1;
        }

        Self {
            min,
            max,
            bucket_width,
            counts,
        }
    }

    /// Lower edge of bucket `i`
    pub fn bucket_start(&self, i: usize) -> f64 {
        self.min + self.bucket_width * i as f64
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }
}

/// Value at percentile `p` of ascending `sorted`: index `floor(p/100 * n)`,
/// clamped to the last element. 0 for an empty slice.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let index = ((p / 100.0) * sorted.len() as f64).floor().max(0.0) as usize;
    sorted[index.min(sorted.len() - 1)]
}

/// Copy of `values` sorted ascending.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut v = values.to_vec();
    v.sort_by(f64::total_cmp);
    v
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Mean squared deviation from `mean`
pub fn variance(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    variance(values, mean).sqrt()
}

/// Average profit per unit of standard deviation; 0 when there is no spread.
pub fn risk_adjusted_return(avg_final: f64, initial_bankroll: f64, std_dev: f64) -> f64 {
    if std_dev == 0.0 {
        0.0
    } else {
        (avg_final - initial_bankroll) / std_dev
    }
}

/// Percentage of trials that ended in ruin
pub fn risk_of_ruin(results: &SimulationResults) -> f64 {
    if results.num_trials == 0 {
        return 0.0;
    }
    results.bankruptcy_count as f64 / results.num_trials as f64 * 100.0
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUMMARY / COMPARISON
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub variance: f64,
    pub risk_of_ruin: f64,
    pub risk_adjusted_return: f64,
    pub percentile5: f64,
    pub percentile25: f64,
    pub percentile75: f64,
    pub percentile95: f64,
}

impl SummaryStats {
    pub fn from_results(results: &SimulationResults) -> Self {
        let sorted = sorted(&results.final_bankrolls);
        let mean = results.avg_final_bankroll;
        let variance = variance(&sorted, mean);
        let std_dev = variance.sqrt();

        Self {
            min: sorted.first().copied().unwrap_or(0.0),
            max: sorted.last().copied().unwrap_or(0.0),
            median: percentile(&sorted, 50.0),
            mean,
            std_dev,
            variance,
            risk_of_ruin: risk_of_ruin(results),
            risk_adjusted_return: risk_adjusted_return(mean, results.initial_bankroll, std_dev),
            percentile5: percentile(&sorted, 5.0),
            percentile25: percentile(&sorted, 25.0),
            percentile75: percentile(&sorted, 75.0),
            percentile95: percentile(&sorted, 95.0),
        }
    }
}

/// Which side of a comparison came out ahead, metric by metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirstBetter {
    pub success_rate: bool,
    pub avg_bankroll: bool,
    pub risk_of_ruin: bool,
    pub ev: bool,
}

/// Differences are first minus second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub success_rate_diff: f64,
    pub avg_bankroll_diff: f64,
    pub risk_of_ruin_diff: f64,
    pub ev_diff: f64,
    pub first_better: FirstBetter,
}

pub fn compare(first: &SimulationResults, second: &SimulationResults) -> StrategyComparison {
    let ruin_a = risk_of_ruin(first);
    let ruin_b = risk_of_ruin(second);

    StrategyComparison {
        success_rate_diff: first.success_rate - second.success_rate,
        avg_bankroll_diff: first.avg_final_bankroll - second.avg_final_bankroll,
        risk_of_ruin_diff: ruin_a - ruin_b,
        ev_diff: first.expected_value_per_spin - second.expected_value_per_spin,
        first_better: FirstBetter {
            success_rate: first.success_rate > second.success_rate,
            avg_bankroll: first.avg_final_bankroll > second.avg_final_bankroll,
            risk_of_ruin: ruin_a < ruin_b,
            ev: first.expected_value_per_spin > second.expected_value_per_spin,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wh_core::{ActionKind, Pocket, Step};

    #[test]
    fn test_percentile_indexing() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        assert_eq!(percentile(&values, 0.0), 1.0);
        assert_eq!(percentile(&values, 5.0), 1.0);
        assert_eq!(percentile(&values, 25.0), 3.0);
        assert_eq!(percentile(&values, 50.0), 6.0);
        assert_eq!(percentile(&values, 95.0), 10.0);
        assert_eq!(percentile(&values, 100.0), 10.0);
        assert_eq!(percentile(&[], 50.0), 0.0);
    }

    #[test]
    fn test_histogram() {
        let values = [0.0, 10.0, 20.0, 100.0];
        let h = Histogram::build(&values, 10);
        assert_eq!(h.counts.len(), 10);
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[1], 1);
        assert_eq!(h.counts[2], 1);
        // Max value lands in the last bucket
        assert_eq!(h.counts[9], 1);
        assert_eq!(h.total(), 4);
        assert_eq!(h.bucket_start(5), 50.0);
    }

    #[test]
    fn test_histogram_degenerate_range() {
        let h = Histogram::build(&[500.0; 7], 20);
        assert_eq!(h.counts[0], 7);
        assert_eq!(h.bucket_width, 1.0 / 20.0);
        assert_eq!(h.total(), 7);
    }

    #[test]
    fn test_variance() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert_relative_eq!(m, 5.0);
        assert_relative_eq!(variance(&values, m), 4.0);
        assert_relative_eq!(std_dev(&values, m), 2.0);
        assert_relative_eq!(risk_adjusted_return(m, 4.0, 2.0), 0.5);
        assert_eq!(risk_adjusted_return(m, 4.0, 0.0), 0.0);
    }

    #[test]
    fn test_funnel() {
        let strategy = Strategy::new("s", "x", 10.0, 20.0, 5)
            .with_step(Step::new("a", vec![]))
            .with_step(Step::new("b", vec![]));
        let mut funnel = StepFunnel::new(&strategy);

        let spin = |index: usize, win: bool, tier: Option<&str>, payout: f64| SpinRecord {
            outcome: Pocket::Number(1),
            is_win: win,
            total_payout: payout,
            profit: 0.0,
            step_id: String::new(),
            step_index: index,
            tier_triggered_name: tier.map(String::from),
            action_kind: ActionKind::NextStep,
        };

        funnel.record(&spin(0, true, Some("big"), 30.0));
        funnel.record(&spin(0, true, Some("big"), 40.0));
        funnel.record(&spin(0, false, None, 0.0));
        funnel.record(&spin(1, true, Some("small"), 5.0));
        funnel.record(&spin(7, true, None, 5.0));

        let stats = funnel.finish();
        assert_eq!(stats[0].times_reached, 3);
        assert_eq!(stats[0].times_won, 2);
        assert_eq!(stats[0].times_lost, 1);
        assert_eq!(stats[0].tier_outcomes[0].count, 2);
        assert_eq!(stats[0].tier_outcomes[0].total_payout, 70.0);
        assert_eq!(stats[1].tier_outcomes[0].tier_name, "small");
        assert_relative_eq!(stats[0].win_rate(), 200.0 / 3.0);
    }
}
