//! Step engine
//!
//! One call to [`StepExecutor::execute`] plays the current step for one spin:
//! stakes are resolved, the wheel is spun, the owning account is settled and
//! the step pointer moves. Legacy and advanced strategies each get their own
//! executor, picked once per trial.

use serde::{Deserialize, Serialize};

use wh_core::{ActionKind, BetSizing, CarryAmount, Pocket, PocketAmount, Step, StepAction, Strategy, find_tier};

use crate::sizing::{BetContext, resolve};
use crate::trial::SpinRecord;
use crate::wheel::{OutcomeSource, evaluate, gross_return};

/// Mutable accumulators of one trial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrialState {
    pub bankroll: f64,
    /// Money committed to the current advanced cycle. Always 0 in legacy mode.
    pub carry: f64,
    pub step_index: usize,
    pub previous_winnings: f64,
    pub peak: f64,
    pub max_drawdown: f64,
    pub completed_cycles: u32,
    pub iterations: u32,
    /// Carry was just funded by a bullet and nothing has been staked from it
    pub fresh_bullet: bool,
}

impl TrialState {
    pub fn new(initial_bankroll: f64) -> Self {
        Self {
            bankroll: initial_bankroll,
            carry: 0.0,
            step_index: 0,
            previous_winnings: 0.0,
            peak: initial_bankroll,
            max_drawdown: 0.0,
            completed_cycles: 0,
            iterations: 0,
            fresh_bullet: false,
        }
    }

    /// Bankroll plus carry
    pub fn total_value(&self) -> f64 {
        self.bankroll + self.carry
    }

    /// Track the running peak and return the current drawdown from it.
    pub fn observe(&mut self, value: f64) -> f64 {
        if value > self.peak {
            self.peak = value;
        }
        let drawdown = self.peak - value;
        if drawdown > self.max_drawdown {
            self.max_drawdown = drawdown;
        }
        drawdown
    }

    /// Move the whole carry back to bankroll.
    fn release_carry(&mut self) {
        self.bankroll += self.carry;
        self.carry = 0.0;
    }
}

/// What one execution produced.
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// The wheel was spun
    Spun(SpinRecord),
    /// The step could not be funded from carry; the cycle was abandoned
    CycleRestarted,
    /// Nothing can be staked; the trial ends with insufficient funds
    Halted,
}

/// Totals of one spin across every bet of a step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Settlement {
    pub outcome: Pocket,
    pub any_win: bool,
    pub total_staked: f64,
    pub total_payout: f64,
}

impl Settlement {
    pub fn profit(&self) -> f64 {
        self.total_payout - self.total_staked
    }
}

/// Where the pointer went after a spin.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub next_index: usize,
    pub action: ActionKind,
    pub tier: Option<String>,
    /// Pointer wrapped past the last step or returned to step 0 from later on
    pub cycle_completed: bool,
}

impl Transition {
    fn new(from: usize, to: usize, wrapped: bool, action: ActionKind) -> Self {
        Self {
            next_index: to,
            action,
            tier: None,
            cycle_completed: wrapped || (to == 0 && from != 0),
        }
    }
}

/// Executes a single step of a strategy for one spin.
pub trait StepExecutor {
    fn execute<W: OutcomeSource + ?Sized>(&self, strategy: &Strategy, state: &mut TrialState, wheel: &mut W) -> StepOutcome;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SHARED PIECES
// ═══════════════════════════════════════════════════════════════════════════════

fn context(strategy: &Strategy, state: &TrialState, step: &Step, advanced: bool) -> BetContext {
    BetContext {
        bankroll: state.bankroll,
        carry: state.carry,
        bullet_size: strategy.bullet(),
        bets_in_step: step.bets.len(),
        previous_winnings: state.previous_winnings,
        advanced,
    }
}

fn stakes(step: &Step, ctx: &BetContext) -> Vec<f64> {
    step.bets.iter().map(|bet| resolve(bet.sizing, ctx)).collect()
}

/// Total the step asks for before fixed amounts are capped by the source.
fn requested(step: &Step, stakes: &[f64]) -> f64 {
    step.bets
        .iter()
        .zip(stakes)
        .map(|(bet, stake)| match bet.sizing {
            BetSizing::Fixed(amount) => amount.max(*stake),
            BetSizing::Symbolic(_) => *stake,
        })
        .sum()
}

/// Spin once and evaluate every bet against the same outcome.
fn spin_and_settle<W: OutcomeSource + ?Sized>(step: &Step, stakes: &[f64], wheel: &mut W) -> Settlement {
    let outcome = wheel.spin();
    let mut settlement = Settlement {
        outcome,
        any_win: false,
        total_staked: stakes.iter().sum(),
        total_payout: 0.0,
    };
    for (bet, &stake) in step.bets.iter().zip(stakes) {
        if evaluate(outcome, &bet.target) {
            settlement.any_win = true;
            settlement.total_payout += gross_return(bet.kind(), stake);
        }
    }
    settlement
}

/// Index after `index`, wrapping to 0. Second value is true on wrap.
fn advance(index: usize, len: usize) -> (usize, bool) {
    if index + 1 >= len { (0, true) } else { (index + 1, false) }
}

/// Pointer rules driven by `continue_on_win` / `reset_on_loss`.
///
/// A `next_step_on_*` id that does not exist falls through to the following step.
pub fn legacy_transition(strategy: &Strategy, state: &mut TrialState, settlement: &Settlement) -> Transition {
    let from = state.step_index;
    let len = strategy.steps.len();
    let step = &strategy.steps[from];
    let pointer = |id: &Option<String>| -> usize {
        id.as_deref().and_then(|id| strategy.step_index(id)).unwrap_or(from + 1)
    };

    if settlement.any_win {
        state.previous_winnings = settlement.total_payout;
        if !step.continue_on_win {
            state.previous_winnings = 0.0;
            return Transition::new(from, 0, false, ActionKind::Restart);
        }
        let next = pointer(&step.next_step_on_win);
        if next >= len {
            state.previous_winnings = 0.0;
            return Transition::new(from, 0, true, ActionKind::NextStep);
        }
        Transition::new(from, next, false, ActionKind::NextStep)
    } else {
        state.previous_winnings = 0.0;
        if step.reset_on_loss {
            return Transition::new(from, 0, false, ActionKind::Restart);
        }
        let next = pointer(&step.next_step_on_loss);
        if next >= len {
            return Transition::new(from, 0, true, ActionKind::NextStep);
        }
        Transition::new(from, next, false, ActionKind::NextStep)
    }
}

/// Run a step action against the post-spin carry.
///
/// The pocketed amount and anything not carried forward go to bankroll, so
/// `bankroll + carry` is unchanged. `Restart` always leaves carry at 0.
pub fn apply_action(strategy: &Strategy, state: &mut TrialState, action: &StepAction) -> Transition {
    let from = state.step_index;
    let carry = state.carry.max(0.0);

    let pocket = match action.pocket_amount {
        None => 0.0,
        Some(PocketAmount::All) => carry,
        Some(PocketAmount::Fixed(x)) => x.max(0.0).min(carry),
    };
    let left = carry - pocket;
    let kept = match (action.kind, action.carry_amount) {
        (ActionKind::Restart, _) => 0.0,
        (_, None | Some(CarryAmount::All) | Some(CarryAmount::Remainder)) => left,
        (_, Some(CarryAmount::Fixed(x))) => x.max(0.0).min(left),
    };
    state.bankroll += carry - kept;
    state.carry = kept;

    match action.kind {
        ActionKind::NextStep => {
            let (to, wrapped) = advance(from, strategy.steps.len());
            Transition::new(from, to, wrapped, action.kind)
        }
        ActionKind::RepeatStep => Transition::new(from, from, false, action.kind),
        ActionKind::GotoStep => {
            let to = action.target_step_id.as_deref().and_then(|id| strategy.step_index(id)).unwrap_or(0);
            Transition::new(from, to, false, action.kind)
        }
        ActionKind::Restart => Transition::new(from, 0, false, action.kind),
    }
}

fn record(step: &Step, from: usize, settlement: &Settlement, transition: Transition) -> SpinRecord {
    SpinRecord {
        outcome: settlement.outcome,
        is_win: settlement.any_win,
        total_payout: settlement.total_payout,
        profit: settlement.profit(),
        step_id: step.id.clone(),
        step_index: from,
        tier_triggered_name: transition.tier,
        action_kind: transition.action,
    }
}

fn commit(state: &mut TrialState, transition: &Transition) {
    state.step_index = transition.next_index;
    if transition.cycle_completed {
        state.completed_cycles += 1;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEGACY MODE
// ═══════════════════════════════════════════════════════════════════════════════

/// Stakes from and pays into the bankroll directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct LegacyExecutor;

impl StepExecutor for LegacyExecutor {
    fn execute<W: OutcomeSource + ?Sized>(&self, strategy: &Strategy, state: &mut TrialState, wheel: &mut W) -> StepOutcome {
        let from = state.step_index;
        let step = &strategy.steps[from];

        let stakes = stakes(step, &context(strategy, state, step, false));
        let total: f64 = stakes.iter().sum();
        if total > state.bankroll {
            return StepOutcome::Halted;
        }

        let settlement = spin_and_settle(step, &stakes, wheel);
        state.bankroll = state.bankroll - settlement.total_staked + settlement.total_payout;

        let transition = legacy_transition(strategy, state, &settlement);
        commit(state, &transition);
        StepOutcome::Spun(record(step, from, &settlement, transition))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADVANCED MODE
// ═══════════════════════════════════════════════════════════════════════════════

/// Stakes from the carry account, funded by a bullet at the start of each cycle.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdvancedExecutor;

impl AdvancedExecutor {
    /// Draw a bullet into an empty carry at step 0. False when unaffordable.
    fn fund_cycle(strategy: &Strategy, state: &mut TrialState) -> bool {
        if state.step_index != 0 || state.carry > 0.0 {
            return true;
        }
        let bullet = strategy.bullet();
        if state.bankroll < bullet {
            return false;
        }
        state.bankroll -= bullet;
        state.carry += bullet;
        state.fresh_bullet = true;
        true
    }
}

impl StepExecutor for AdvancedExecutor {
    fn execute<W: OutcomeSource + ?Sized>(&self, strategy: &Strategy, state: &mut TrialState, wheel: &mut W) -> StepOutcome {
        if !Self::fund_cycle(strategy, state) {
            return StepOutcome::Halted;
        }

        let from = state.step_index;
        let step = &strategy.steps[from];

        let stakes = stakes(step, &context(strategy, state, step, true));
        if state.carry <= 0.0 || requested(step, &stakes) > state.carry {
            let fresh = state.fresh_bullet;
            state.release_carry();
            state.fresh_bullet = false;
            if fresh {
                return StepOutcome::Halted;
            }
            state.step_index = 0;
            return StepOutcome::CycleRestarted;
        }

        let settlement = spin_and_settle(step, &stakes, wheel);
        state.carry = state.carry - settlement.total_staked + settlement.total_payout;
        state.fresh_bullet = false;

        let transition = if !step.is_advanced() {
            legacy_transition(strategy, state, &settlement)
        } else if settlement.any_win {
            match find_tier(&step.win_tiers, settlement.total_payout) {
                Some(tier) => Transition {
                    tier: Some(tier.name.clone()),
                    ..apply_action(strategy, state, &tier.action)
                },
                None => apply_action(strategy, state, &StepAction::next_step()),
            }
        } else {
            let restart = StepAction::restart();
            apply_action(strategy, state, step.on_loss.as_ref().unwrap_or(&restart))
        };

        commit(state, &transition);
        StepOutcome::Spun(record(step, from, &settlement, transition))
    }
}
