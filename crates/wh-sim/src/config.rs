//! Simulation configuration

use serde::{Deserialize, Serialize};

use wh_core::{WhError, WhResult};

/// What to keep of each trial once it has been aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrialRetention {
    /// Keep every trial with its bankroll history and spin log
    #[default]
    Full,
    /// Keep only final bankrolls and aggregate statistics
    Summary,
}

/// Configuration for a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of independent trials
    pub num_trials: usize,

    /// Base seed for reproducibility (None = drawn from the OS once per run)
    pub seed: Option<u64>,

    /// Trials between progress events
    pub batch_size: usize,

    /// Buckets in the final-bankroll histogram
    pub histogram_buckets: usize,

    /// Stake used to value symbolic sizing rules in expected value
    pub ev_base_unit: f64,

    /// Run trials on a rayon pool
    pub parallel: bool,

    /// Worker threads for parallel runs (None = one per core)
    pub threads: Option<usize>,

    pub retain: TrialRetention,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            num_trials: 1000,
            seed: None,
            batch_size: 100,
            histogram_buckets: 20,
            ev_base_unit: 1.0,
            parallel: false,
            threads: None,
            retain: TrialRetention::Full,
        }
    }
}

impl SimConfig {
    /// Quick look, fast enough for every keystroke in an editor
    pub fn quick() -> Self {
        Self {
            num_trials: 100,
            batch_size: 25,
            ..Default::default()
        }
    }

    pub fn standard() -> Self {
        Self::default()
    }

    /// Tight estimates; runs in parallel and keeps summaries only
    pub fn thorough() -> Self {
        Self {
            num_trials: 10_000,
            batch_size: 500,
            parallel: true,
            retain: TrialRetention::Summary,
            ..Default::default()
        }
    }

    /// Builder: set trial count
    pub fn with_trials(mut self, n: usize) -> Self {
        self.num_trials = n;
        self
    }

    /// Builder: set seed for reproducibility
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Builder: set progress batch size
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_histogram_buckets(mut self, buckets: usize) -> Self {
        self.histogram_buckets = buckets;
        self
    }

    pub fn with_ev_base_unit(mut self, unit: f64) -> Self {
        self.ev_base_unit = unit;
        self
    }

    /// Builder: run on a rayon pool
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn with_retention(mut self, retain: TrialRetention) -> Self {
        self.retain = retain;
        self
    }

    pub fn validate(&self) -> WhResult<()> {
        if self.num_trials == 0 {
            return Err(WhError::NoTrials);
        }
        if self.batch_size == 0 {
            return Err(WhError::InvalidConfig("batch size must be at least 1".into()));
        }
        if self.histogram_buckets == 0 {
            return Err(WhError::InvalidConfig("histogram needs at least one bucket".into()));
        }
        if self.threads == Some(0) {
            return Err(WhError::InvalidConfig("thread count must be at least 1".into()));
        }
        if !(self.ev_base_unit.is_finite() && self.ev_base_unit > 0.0) {
            return Err(WhError::InvalidConfig("EV base unit must be positive".into()));
        }
        Ok(())
    }
}
