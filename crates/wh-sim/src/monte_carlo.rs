//! Monte Carlo aggregator
//!
//! Trials run in batches. Inside a batch they may run on a rayon pool, but
//! their results are folded into the accumulators one at a time in trial
//! order, so parallel and sequential runs produce identical statistics.

use log::{debug, info, warn};
use rand::prelude::*;
use rayon::prelude::*;

use wh_core::{Strategy, WhError, WhResult, now_millis};
use wh_engine::{TrialResult, Wheel, run_trial, strategy_ev};

use crate::config::{SimConfig, TrialRetention};
use crate::progress::{CancelToken, NoProgress, Progress, ProgressSink};
use crate::results::{EndReasonCounts, SimulationResults};
use crate::stats::{Histogram, StepFunnel};

/// Running sums over absorbed trials.
struct Accumulator {
    retain: TrialRetention,
    initial_bankroll: f64,
    success_count: usize,
    iterations_to_success: u64,
    profit_count: usize,
    sum_final: f64,
    sum_max_drawdown: f64,
    sum_cycles: u64,
    end_reasons: EndReasonCounts,
    final_bankrolls: Vec<f64>,
    funnel: StepFunnel,
    trials: Vec<TrialResult>,
}

impl Accumulator {
    fn new(strategy: &Strategy, config: &SimConfig) -> Self {
        let keep = match config.retain {
            TrialRetention::Full => config.num_trials,
            TrialRetention::Summary => 0,
        };
        Self {
            retain: config.retain,
            initial_bankroll: strategy.initial_bankroll,
            success_count: 0,
            iterations_to_success: 0,
            profit_count: 0,
            sum_final: 0.0,
            sum_max_drawdown: 0.0,
            sum_cycles: 0,
            end_reasons: EndReasonCounts::default(),
            final_bankrolls: Vec::with_capacity(config.num_trials),
            funnel: StepFunnel::new(strategy),
            trials: Vec::with_capacity(keep),
        }
    }

    fn absorb(&mut self, trial: &TrialResult) {
        if trial.goal_reached {
            self.success_count += 1;
            self.iterations_to_success += u64::from(trial.iterations_played);
        }
        if trial.final_bankroll > self.initial_bankroll {
            self.profit_count += 1;
        }
        self.sum_final += trial.final_bankroll;
        self.sum_max_drawdown += trial.max_drawdown_observed;
        self.sum_cycles += u64::from(trial.completed_cycles);
        self.end_reasons.add(trial.end_reason);
        self.final_bankrolls.push(trial.final_bankroll);
        for spin in &trial.spin_log {
            self.funnel.record(spin);
        }
    }

    fn keep(&mut self, trial: TrialResult) {
        if self.retain == TrialRetention::Full {
            self.trials.push(trial);
        }
    }
}

/// A run in progress: one batch per [`Session::advance`].
struct Session<'a> {
    strategy: &'a Strategy,
    config: &'a SimConfig,
    seed: u64,
    pool: Option<rayon::ThreadPool>,
    completed: usize,
    acc: Accumulator,
}

impl<'a> Session<'a> {
    fn start(strategy: &'a Strategy, config: &'a SimConfig) -> WhResult<Self> {
        config.validate()?;
        strategy.validate()?;
        for warning in strategy.warnings() {
            warn!("{}: {}", strategy.name, warning);
        }

        let pool = if config.parallel {
            let mut builder = rayon::ThreadPoolBuilder::new();
            if let Some(threads) = config.threads {
                builder = builder.num_threads(threads);
            }
            Some(builder.build().map_err(|e| WhError::InvalidConfig(format!("thread pool: {}", e)))?)
        } else {
            None
        };

        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        info!(
            "Simulating '{}': {} trials, seed {}, {}",
            strategy.name,
            config.num_trials,
            seed,
            if config.parallel { "parallel" } else { "sequential" }
        );

        Ok(Self {
            strategy,
            config,
            seed,
            pool,
            completed: 0,
            acc: Accumulator::new(strategy, config),
        })
    }

    fn is_done(&self) -> bool {
        self.completed >= self.config.num_trials
    }

    fn play(&self, range: std::ops::Range<usize>) -> Vec<TrialResult> {
        let strategy = self.strategy;
        let seed = self.seed;
        let trial = move |i: usize| run_trial(strategy, &mut Wheel::with_stream(seed, i as u64));

        match &self.pool {
            Some(pool) => pool.install(|| range.into_par_iter().map(trial).collect()),
            None => range.map(trial).collect(),
        }
    }

    /// Play one batch and report it.
    fn advance<S: ProgressSink + ?Sized>(&mut self, sink: &mut S, cancel: Option<&CancelToken>) -> WhResult<()> {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            info!("Simulation of '{}' cancelled after {} trials", self.strategy.name, self.completed);
            return Err(WhError::Cancelled {
                completed: self.completed,
            });
        }

        let total = self.config.num_trials;
        let end = (self.completed + self.config.batch_size).min(total);
        let trials = self.play(self.completed..end);

        let mut latest = None;
        for trial in trials {
            self.acc.absorb(&trial);
            if let Some(previous) = latest.replace(trial) {
                self.acc.keep(previous);
            }
        }
        self.completed = end;

        sink.on_progress(&Progress {
            completed: end,
            total,
            percent: end as f64 / total as f64 * 100.0,
            latest: latest.as_ref(),
        });
        if let Some(trial) = latest {
            self.acc.keep(trial);
        }

        debug!("Batch done: {}/{} trials", end, total);
        Ok(())
    }

    fn finish(self) -> SimulationResults {
        let strategy = self.strategy;
        let acc = self.acc;
        let n = self.completed as f64;

        let ev = strategy_ev(strategy, self.config.ev_base_unit);

        let results = SimulationResults {
            strategy_id: strategy.id.clone(),
            strategy_name: strategy.name.clone(),
            initial_bankroll: strategy.initial_bankroll,
            target_bankroll: strategy.target_bankroll,
            num_trials: self.completed,
            seed: self.seed,
            success_rate: acc.success_count as f64 / n * 100.0,
            avg_final_bankroll: acc.sum_final / n,
            avg_iterations_to_success: if acc.success_count > 0 {
                acc.iterations_to_success as f64 / acc.success_count as f64
            } else {
                0.0
            },
            bankruptcy_count: acc.end_reasons.bankruptcy + acc.end_reasons.insufficient_funds,
            profit_count: acc.profit_count,
            avg_max_drawdown: acc.sum_max_drawdown / n,
            expected_value_per_spin: ev,
            avg_completed_cycles: acc.sum_cycles as f64 / n,
            end_reasons: acc.end_reasons,
            final_bankroll_histogram: Histogram::build(&acc.final_bankrolls, self.config.histogram_buckets),
            final_bankrolls: acc.final_bankrolls,
            all_trials: acc.trials,
            per_step_statistics: acc.funnel.finish(),
            timestamp: now_millis(),
        };

        info!(
            "Simulated '{}': success {:.1}%, avg final {:.2}, ruined {}",
            results.strategy_name, results.success_rate, results.avg_final_bankroll, results.bankruptcy_count
        );
        results
    }
}

/// Runs independent trials of a strategy and reduces them to statistics.
#[derive(Debug, Clone, Default)]
pub struct MonteCarlo {
    config: SimConfig,
}

impl MonteCarlo {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Run to completion without progress reporting.
    pub fn run(&self, strategy: &Strategy) -> WhResult<SimulationResults> {
        self.run_with(strategy, &mut NoProgress, None)
    }

    /// Run to completion, reporting after every batch.
    ///
    /// Fails up front on an invalid strategy or configuration, and with
    /// [`WhError::Cancelled`] if `cancel` fires before the last batch.
    pub fn run_with<S: ProgressSink + ?Sized>(
        &self,
        strategy: &Strategy,
        sink: &mut S,
        cancel: Option<&CancelToken>,
    ) -> WhResult<SimulationResults> {
        let mut session = Session::start(strategy, &self.config)?;
        while !session.is_done() {
            session.advance(sink, cancel)?;
        }
        Ok(session.finish())
    }

    /// Same as [`MonteCarlo::run_with`], yielding to the tokio scheduler
    /// between batches.
    #[cfg(feature = "async")]
    pub async fn run_async<S: ProgressSink + ?Sized>(
        &self,
        strategy: &Strategy,
        sink: &mut S,
        cancel: Option<&CancelToken>,
    ) -> WhResult<SimulationResults> {
        let mut session = Session::start(strategy, &self.config)?;
        while !session.is_done() {
            session.advance(sink, cancel)?;
            tokio::task::yield_now().await;
        }
        Ok(session.finish())
    }
}
