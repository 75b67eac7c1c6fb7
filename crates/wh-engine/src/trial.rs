//! Single-trial runner

use std::fmt;

use serde::{Deserialize, Serialize};

use wh_core::{ActionKind, Pocket, Strategy};

use crate::executor::{AdvancedExecutor, LegacyExecutor, StepExecutor, StepOutcome, TrialState};
use crate::wheel::OutcomeSource;

/// Why a trial stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    GoalReached,
    Bankruptcy,
    MaxIterations,
    MaxDrawdown,
    InsufficientFunds,
}

impl EndReason {
    pub const ALL: [EndReason; 5] = [
        EndReason::GoalReached,
        EndReason::Bankruptcy,
        EndReason::MaxIterations,
        EndReason::MaxDrawdown,
        EndReason::InsufficientFunds,
    ];

    /// Bankruptcy and insufficient funds both count as ruin.
    pub fn is_ruin(&self) -> bool {
        matches!(self, Self::Bankruptcy | Self::InsufficientFunds)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GoalReached => "goal_reached",
            Self::Bankruptcy => "bankruptcy",
            Self::MaxIterations => "max_iterations",
            Self::MaxDrawdown => "max_drawdown",
            Self::InsufficientFunds => "insufficient_funds",
        }
    }
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spin of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpinRecord {
    pub outcome: Pocket,
    pub is_win: bool,
    pub total_payout: f64,
    pub profit: f64,
    pub step_id: String,
    pub step_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier_triggered_name: Option<String>,
    pub action_kind: ActionKind,
}

/// Full record of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialResult {
    pub final_bankroll: f64,
    pub iterations_played: u32,
    pub goal_reached: bool,
    pub max_drawdown_observed: f64,
    /// Total value after every spin; first entry is the initial bankroll
    pub bankroll_history: Vec<f64>,
    pub spin_log: Vec<SpinRecord>,
    pub end_reason: EndReason,
    pub completed_cycles: u32,
}

impl TrialResult {
    pub fn profit(&self, initial_bankroll: f64) -> f64 {
        self.final_bankroll - initial_bankroll
    }
}

/// Play `strategy` against `wheel` until a terminal condition.
///
/// The strategy is assumed valid; see [`Strategy::validate`].
pub fn run_trial<W: OutcomeSource + ?Sized>(strategy: &Strategy, wheel: &mut W) -> TrialResult {
    if strategy.is_advanced() {
        drive(&AdvancedExecutor, strategy, wheel)
    } else {
        drive(&LegacyExecutor, strategy, wheel)
    }
}

fn drive<E: StepExecutor, W: OutcomeSource + ?Sized>(executor: &E, strategy: &Strategy, wheel: &mut W) -> TrialResult {
    let mut state = TrialState::new(strategy.initial_bankroll);
    let mut bankroll_history = vec![strategy.initial_bankroll];
    let mut spin_log = Vec::new();
    let mut halted = false;
    let mut drawdown_hit = false;

    while !strategy.steps.is_empty()
        && state.total_value() > 0.0
        && state.total_value() < strategy.target_bankroll
        && state.iterations < strategy.max_iterations
    {
        match executor.execute(strategy, &mut state, wheel) {
            StepOutcome::Halted => {
                halted = true;
                break;
            }
            StepOutcome::CycleRestarted => continue,
            StepOutcome::Spun(record) => {
                state.iterations += 1;
                let value = state.total_value();
                bankroll_history.push(value);
                spin_log.push(record);

                let drawdown = state.observe(value);
                if strategy.max_drawdown.is_some_and(|cap| drawdown >= cap) {
                    drawdown_hit = true;
                    break;
                }
            }
        }
    }

    let final_value = state.total_value();
    let end_reason = if final_value <= 0.0 {
        EndReason::Bankruptcy
    } else if final_value >= strategy.target_bankroll {
        EndReason::GoalReached
    } else if drawdown_hit {
        EndReason::MaxDrawdown
    } else if halted {
        EndReason::InsufficientFunds
    } else {
        EndReason::MaxIterations
    };

    TrialResult {
        final_bankroll: final_value,
        iterations_played: state.iterations,
        goal_reached: final_value >= strategy.target_bankroll,
        max_drawdown_observed: state.max_drawdown,
        bankroll_history,
        spin_log,
        end_reason,
        completed_cycles: state.completed_cycles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wheel::{ScriptedWheel, Wheel};
    use wh_core::{Bet, BetTarget, EvenMoney, SizingRule, Step, StepAction};

    fn red(amount: f64) -> Bet {
        Bet::fixed(BetTarget::EvenMoney(EvenMoney::Red), amount)
    }

    fn flat_red(initial: f64, target: f64, max_iterations: u32) -> Strategy {
        Strategy::new("flat", "Flat Red", initial, target, max_iterations)
            .with_step(Step::new("only", vec![red(10.0)]).reset_on_loss(true))
    }

    #[test]
    fn test_history_tracks_every_spin() {
        let strategy = flat_red(500.0, 600.0, 200);
        let result = run_trial(&strategy, &mut Wheel::seeded(3));

        assert_eq!(result.bankroll_history.len(), result.spin_log.len() + 1);
        assert_eq!(result.bankroll_history[0], 500.0);
        assert_eq!(result.iterations_played as usize, result.spin_log.len());
        assert_eq!(*result.bankroll_history.last().unwrap(), result.final_bankroll);
    }

    #[test]
    fn test_goal_reached() {
        let strategy = flat_red(50.0, 80.0, 100);
        let result = run_trial(&strategy, &mut ScriptedWheel::always(Pocket::Number(1)));

        assert_eq!(result.end_reason, EndReason::GoalReached);
        assert!(result.goal_reached);
        assert_eq!(result.iterations_played, 3);
        assert_eq!(result.final_bankroll, 80.0);
    }

    #[test]
    fn test_bankruptcy() {
        let strategy = flat_red(30.0, 80.0, 100);
        let result = run_trial(&strategy, &mut ScriptedWheel::always(Pocket::Number(2)));

        assert_eq!(result.end_reason, EndReason::Bankruptcy);
        assert_eq!(result.final_bankroll, 0.0);
        assert_eq!(result.iterations_played, 3);
        assert_eq!(result.max_drawdown_observed, 30.0);
    }

    #[test]
    fn test_max_iterations() {
        let strategy = flat_red(100.0, 1000.0, 4);
        let wheel = vec![Pocket::Number(1), Pocket::Number(2)];
        let result = run_trial(&strategy, &mut ScriptedWheel::new(wheel));

        assert_eq!(result.end_reason, EndReason::MaxIterations);
        assert_eq!(result.iterations_played, 4);
        assert_eq!(result.final_bankroll, 100.0);
    }

    #[test]
    fn test_drawdown_cap_stops_at_exact_spin() {
        let strategy = flat_red(500.0, 600.0, 1000).with_max_drawdown(50.0);
        // One win lifts the peak to 510, then black forever
        let mut outcomes = vec![Pocket::Number(1)];
        outcomes.extend(std::iter::repeat_n(Pocket::Number(2), 20));
        let mut wheel = ScriptedWheel::new(outcomes);
        let result = run_trial(&strategy, &mut wheel);

        assert_eq!(result.end_reason, EndReason::MaxDrawdown);
        assert_eq!(result.iterations_played, 6);
        assert_eq!(result.final_bankroll, 460.0);
        assert_eq!(result.max_drawdown_observed, 50.0);
        assert_eq!(wheel.spins(), 6);
        assert_eq!(result.bankroll_history.len(), 7);
    }

    #[test]
    fn test_legacy_insufficient_funds() {
        let strategy = Strategy::new("s", "x", 15.0, 100.0, 100).with_step(
            Step::new("a", vec![red(10.0), Bet::fixed(BetTarget::EvenMoney(EvenMoney::Black), 10.0)]),
        );
        let result = run_trial(&strategy, &mut ScriptedWheel::always(Pocket::Number(1)));

        assert_eq!(result.end_reason, EndReason::InsufficientFunds);
        assert_eq!(result.iterations_played, 0);
        assert_eq!(result.bankroll_history, vec![15.0]);
    }

    #[test]
    fn test_bullet_larger_than_bankroll() {
        let strategy = flat_red(5.0, 100.0, 100).with_bullet(10.0);
        let result = run_trial(&strategy, &mut ScriptedWheel::always(Pocket::Number(1)));

        assert_eq!(result.end_reason, EndReason::InsufficientFunds);
        assert_eq!(result.iterations_played, 0);
        assert_eq!(result.final_bankroll, 5.0);
        assert!(result.spin_log.is_empty());
    }

    #[test]
    fn test_advanced_spending_last_bullet_is_not_ruin_yet() {
        // Bullet equals the whole bankroll: value lives in carry
        let strategy = Strategy::new("s", "x", 10.0, 40.0, 100)
            .with_bullet(10.0)
            .with_step(Step::new("a", vec![Bet::sized(BetTarget::EvenMoney(EvenMoney::Red), SizingRule::Carry)]).continue_on_win(true));
        let result = run_trial(&strategy, &mut ScriptedWheel::always(Pocket::Number(1)));

        assert_eq!(result.end_reason, EndReason::GoalReached);
        assert_eq!(result.final_bankroll, 40.0);
        assert_eq!(result.iterations_played, 2);
        assert_eq!(result.completed_cycles, 2);
    }

    #[test]
    fn test_empty_carry_never_spins_for_free() {
        let strategy = Strategy::new("s", "x", 100.0, 1000.0, 50)
            .with_bullet(10.0)
            .with_step(Step::new("a", vec![red(10.0)]))
            .with_step(Step::new("b", vec![red(40.0)]).with_on_loss(StepAction::repeat_step()));
        let result = run_trial(&strategy, &mut ScriptedWheel::always(Pocket::Number(2)));

        // Every bullet is lost at step a; step b restarts the cycle instead of staking $0
        assert_eq!(result.end_reason, EndReason::Bankruptcy);
        assert_eq!(result.iterations_played, 10);
        assert!(result.spin_log.iter().all(|r| r.step_index == 0 && r.profit == -10.0));
    }

    #[test]
    fn test_end_reason_serialized_snake_case() {
        let json = serde_json::to_string(&EndReason::InsufficientFunds).unwrap();
        assert_eq!(json, "\"insufficient_funds\"");
        assert!(EndReason::InsufficientFunds.is_ruin());
        assert!(!EndReason::MaxDrawdown.is_ruin());
    }
}
