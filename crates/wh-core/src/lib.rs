//! wh-core: Shared types for Wheelhouse
//!
//! Roulette pockets, bets and sizing rules, multi-step strategies with their
//! validation rules, and the built-in strategy catalog.

mod bet;
mod error;
mod pocket;
mod strategy;

pub mod presets;

pub use bet::*;
pub use error::*;
pub use pocket::*;
pub use strategy::*;
