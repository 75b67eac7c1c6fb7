//! wh-sim: Monte Carlo simulation for Wheelhouse
//!
//! Runs many independent trials of one strategy and reduces them to
//! success rates, ruin counts, bankroll distributions and a per-step funnel.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wh_sim::{MonteCarlo, SimConfig, report};
//!
//! let strategy = wh_core::presets::preset("martingale-red").unwrap();
//! let results = MonteCarlo::new(SimConfig::standard().with_seed(7)).run(&strategy)?;
//! println!("{}", report::to_text(&results));
//! ```

pub mod config;
pub mod monte_carlo;
pub mod progress;
pub mod report;
pub mod results;
pub mod stats;

pub use config::{SimConfig, TrialRetention};
pub use monte_carlo::MonteCarlo;
pub use progress::{CancelToken, NoProgress, Progress, ProgressSink};
pub use results::{EndReasonCounts, SimulationResults};
pub use stats::{
    FirstBetter, Histogram, StepStatistics, StrategyComparison, SummaryStats, TierOutcome, compare, percentile,
};
