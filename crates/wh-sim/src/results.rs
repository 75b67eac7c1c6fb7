//! Aggregated results of a Monte Carlo run

use serde::{Deserialize, Serialize};

use wh_engine::{EndReason, TrialResult};

use crate::stats::{Histogram, StepStatistics};

/// Trials per end reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndReasonCounts {
    pub goal_reached: usize,
    pub bankruptcy: usize,
    pub max_iterations: usize,
    pub max_drawdown: usize,
    pub insufficient_funds: usize,
}

impl EndReasonCounts {
    pub fn add(&mut self, reason: EndReason) {
        *self.slot(reason) += 1;
    }

    pub fn get(&self, reason: EndReason) -> usize {
        match reason {
            EndReason::GoalReached => self.goal_reached,
            EndReason::Bankruptcy => self.bankruptcy,
            EndReason::MaxIterations => self.max_iterations,
            EndReason::MaxDrawdown => self.max_drawdown,
            EndReason::InsufficientFunds => self.insufficient_funds,
        }
    }

    fn slot(&mut self, reason: EndReason) -> &mut usize {
        match reason {
            EndReason::GoalReached => &mut self.goal_reached,
            EndReason::Bankruptcy => &mut self.bankruptcy,
            EndReason::MaxIterations => &mut self.max_iterations,
            EndReason::MaxDrawdown => &mut self.max_drawdown,
            EndReason::InsufficientFunds => &mut self.insufficient_funds,
        }
    }
}

/// Summary of `num_trials` independent trials of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResults {
    pub strategy_id: String,
    pub strategy_name: String,
    pub initial_bankroll: f64,
    pub target_bankroll: f64,
    pub num_trials: usize,
    /// Base seed of the per-trial random streams
    pub seed: u64,
    /// Percentage of trials that reached the target
    pub success_rate: f64,
    pub avg_final_bankroll: f64,
    pub avg_iterations_to_success: f64,
    /// Trials ending in bankruptcy or insufficient funds
    pub bankruptcy_count: usize,
    pub profit_count: usize,
    pub avg_max_drawdown: f64,
    pub expected_value_per_spin: f64,
    pub avg_completed_cycles: f64,
    pub end_reasons: EndReasonCounts,
    pub final_bankroll_histogram: Histogram,
    /// Final bankroll of every trial, in trial order
    pub final_bankrolls: Vec<f64>,
    /// Empty when the run kept summaries only
    #[serde(default)]
    pub all_trials: Vec<TrialResult>,
    pub per_step_statistics: Vec<StepStatistics>,
    pub timestamp: i64,
}

impl SimulationResults {
    pub fn success_count(&self) -> usize {
        self.end_reasons.goal_reached
    }

    /// Percentage of trials that finished above the initial bankroll
    pub fn profit_rate(&self) -> f64 {
        if self.num_trials == 0 {
            0.0
        } else {
            self.profit_count as f64 / self.num_trials as f64 * 100.0
        }
    }
}
