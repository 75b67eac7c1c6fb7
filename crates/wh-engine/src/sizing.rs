//! Bet sizing resolver

use wh_core::{BetSizing, SizingRule};

/// Financial context a stake is resolved against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BetContext {
    pub bankroll: f64,
    pub carry: f64,
    pub bullet_size: f64,
    /// Bets sharing the current step, for split carry
    pub bets_in_step: usize,
    /// Payout of the previous winning spin (let-it-ride)
    pub previous_winnings: f64,
    /// Advanced strategies stake from carry and honour carry/bullet rules
    pub advanced: bool,
}

impl BetContext {
    /// Funds a fixed stake is capped by.
    pub fn available(&self) -> f64 {
        if self.advanced { self.carry } else { self.bankroll }
    }
}

/// Resolve a sizing rule to a concrete stake.
///
/// Never negative and never more than the account the rule draws from.
/// Carry and bullet rules resolve to 0 outside advanced mode.
pub fn resolve(sizing: BetSizing, ctx: &BetContext) -> f64 {
    let bankroll = ctx.bankroll.max(0.0);
    let carry = ctx.carry.max(0.0);

    let stake = match sizing {
        BetSizing::Fixed(amount) => amount.min(ctx.available().max(0.0)),
        BetSizing::Symbolic(rule) => match rule {
            SizingRule::AllIn => bankroll,
            SizingRule::HalfBankroll => (bankroll / 2.0).floor(),
            SizingRule::LetItRide if ctx.previous_winnings > 0.0 => ctx.previous_winnings.min(bankroll),
            SizingRule::LetItRide => bankroll,
            _ if !ctx.advanced => 0.0,
            SizingRule::Bullet => ctx.bullet_size.min(bankroll),
            SizingRule::Carry => carry,
            SizingRule::CarrySplit if ctx.bets_in_step > 0 => (carry / ctx.bets_in_step as f64).floor(),
            SizingRule::CarrySplit => carry,
        },
    };

    stake.max(0.0)
}
