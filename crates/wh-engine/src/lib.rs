//! wh-engine: Roulette step engine
//!
//! Plays one strategy trial spin by spin:
//!
//! - [`wheel`]: 38-pocket wheel, bet evaluation, payout tables
//! - [`sizing`]: resolves sizing rules to concrete stakes
//! - [`executor`]: legacy and advanced step executors
//! - [`trial`]: the loop that drives an executor to a terminal condition
//!
//! ```rust,ignore
//! use wh_engine::{Wheel, run_trial};
//!
//! let strategy = wh_core::presets::preset("martingale-red").unwrap();
//! let result = run_trial(&strategy, &mut Wheel::seeded(42));
//! println!("{} after {} spins", result.end_reason, result.iterations_played);
//! ```

pub mod executor;
pub mod sizing;
pub mod trial;
pub mod wheel;

pub use executor::{AdvancedExecutor, LegacyExecutor, StepExecutor, StepOutcome, TrialState};
pub use sizing::{BetContext, resolve};
pub use trial::{EndReason, SpinRecord, TrialResult, run_trial};
pub use wheel::{
    OutcomeSource, ScriptedWheel, Wheel, coverage, evaluate, expected_value, gross_return, payout_multiplier,
    strategy_ev, win_probability,
};
