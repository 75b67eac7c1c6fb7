//! American roulette wheel and bet evaluation

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use wh_core::{Bet, BetKind, BetSizing, BetTarget, EvenMoney, POCKET_COUNT, Pocket, RED_NUMBERS, Strategy};

/// Anything that can produce spin outcomes.
pub trait OutcomeSource {
    fn spin(&mut self) -> Pocket;
}

impl<T: OutcomeSource + ?Sized> OutcomeSource for &mut T {
    fn spin(&mut self) -> Pocket {
        (**self).spin()
    }
}

/// Uniform 38-pocket wheel over any RNG.
pub struct Wheel<R: Rng = ChaCha8Rng> {
    rng: R,
}

impl<R: Rng> Wheel<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl Wheel<ChaCha8Rng> {
    /// Reproducible wheel
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Wheel on stream `stream` of the generator seeded with `seed`.
    pub fn with_stream(seed: u64, stream: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);
        Self::new(rng)
    }

    pub fn from_os_rng() -> Self {
        Self::new(ChaCha8Rng::from_os_rng())
    }
}

impl<R: Rng> OutcomeSource for Wheel<R> {
    fn spin(&mut self) -> Pocket {
        pocket_at(self.rng.random_range(0..POCKET_COUNT))
    }
}

/// Pocket by table index: 0, 00, then 1..=36.
fn pocket_at(index: usize) -> Pocket {
    match index {
        0 => Pocket::Zero,
        1 => Pocket::DoubleZero,
        n => Pocket::Number((n - 1) as u8),
    }
}

/// Replays a fixed outcome sequence, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedWheel {
    outcomes: Vec<Pocket>,
    position: usize,
}

impl ScriptedWheel {
    pub fn new(outcomes: Vec<Pocket>) -> Self {
        Self { outcomes, position: 0 }
    }

    /// Same pocket every spin
    pub fn always(pocket: Pocket) -> Self {
        Self::new(vec![pocket])
    }

    /// Number of spins served so far
    pub fn spins(&self) -> usize {
        self.position
    }
}

impl OutcomeSource for ScriptedWheel {
    fn spin(&mut self) -> Pocket {
        if self.outcomes.is_empty() {
            return Pocket::Zero;
        }
        let pocket = self.outcomes[self.position % self.outcomes.len()];
        self.position += 1;
        pocket
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVALUATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Does a bet on `target` win when `outcome` comes up?
///
/// 0 and 00 lose everything except a straight bet on that exact pocket (and
/// a split or corner that lists 0, which covers the single zero only).
pub fn evaluate(outcome: Pocket, target: &BetTarget) -> bool {
    match target {
        BetTarget::Straight(pocket) => outcome == *pocket,
        BetTarget::Split(numbers) => outcome.value().is_some_and(|v| numbers.contains(&v)),
        BetTarget::Corner(numbers) => outcome.value().is_some_and(|v| numbers.contains(&v)),
        BetTarget::Street(start) => in_rows(outcome, *start, 3),
        BetTarget::DoubleStreet(start) => in_rows(outcome, *start, 6),
        BetTarget::Column(third) => outcome.plain_number().is_some_and(|n| (n - 1) % 3 + 1 == third.index()),
        BetTarget::Dozen(third) => outcome.plain_number().is_some_and(|n| (n - 1) / 12 + 1 == third.index()),
        BetTarget::EvenMoney(prop) => outcome.plain_number().is_some_and(|n| match prop {
            EvenMoney::Red => RED_NUMBERS.contains(&n),
            EvenMoney::Black => !RED_NUMBERS.contains(&n),
            EvenMoney::Odd => n % 2 == 1,
            EvenMoney::Even => n % 2 == 0,
            EvenMoney::Low => n <= 18,
            EvenMoney::High => n >= 19,
        }),
    }
}

fn in_rows(outcome: Pocket, start: u8, width: u8) -> bool {
    outcome
        .plain_number()
        .is_some_and(|n| n >= start && u16::from(n) < u16::from(start) + u16::from(width))
}

/// Profit multiple paid on a winning bet (35 to 1, 17 to 1, ...).
pub fn payout_multiplier(kind: BetKind) -> f64 {
    match kind {
        BetKind::Straight => 35.0,
        BetKind::Split => 17.0,
        BetKind::Street => 11.0,
        BetKind::Corner => 8.0,
        BetKind::DoubleStreet => 5.0,
        BetKind::Column | BetKind::Dozen => 2.0,
        BetKind::EvenMoney => 1.0,
    }
}

/// Number of pockets a bet of this kind covers.
pub fn coverage(kind: BetKind) -> u32 {
    match kind {
        BetKind::Straight => 1,
        BetKind::Split => 2,
        BetKind::Street => 3,
        BetKind::Corner => 4,
        BetKind::DoubleStreet => 6,
        BetKind::Column | BetKind::Dozen => 12,
        BetKind::EvenMoney => 18,
    }
}

pub fn win_probability(kind: BetKind) -> f64 {
    f64::from(coverage(kind)) / POCKET_COUNT as f64
}

/// Stake returned plus profit.
pub fn gross_return(kind: BetKind, amount: f64) -> f64 {
    amount * payout_multiplier(kind) + amount
}

/// Theoretical expected value of one spin of `bets`.
///
/// Fixed amounts are used as-is; symbolic sizing is valued at `base_unit`.
pub fn expected_value(bets: &[Bet], base_unit: f64) -> f64 {
    bets.iter()
        .map(|bet| {
            let amount = match bet.sizing {
                BetSizing::Fixed(amount) => amount,
                BetSizing::Symbolic(_) => base_unit,
            };
            let p = win_probability(bet.kind());
            p * payout_multiplier(bet.kind()) * amount - (1.0 - p) * amount
        })
        .sum()
}

/// Mean per-spin expected value over a strategy's steps; 0 without steps.
pub fn strategy_ev(strategy: &Strategy, base_unit: f64) -> f64 {
    if strategy.steps.is_empty() {
        return 0.0;
    }
    let total: f64 = strategy.steps.iter().map(|step| expected_value(&step.bets, base_unit)).sum();
    total / strategy.steps.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use wh_core::Third;

    #[test]
    fn test_pocket_index_covers_wheel() {
        let pockets: Vec<Pocket> = (0..POCKET_COUNT).map(pocket_at).collect();
        assert_eq!(pockets, Pocket::all().to_vec());
    }

    #[test]
    fn test_seeded_wheel_is_reproducible() {
        let mut a = Wheel::seeded(7);
        let mut b = Wheel::seeded(7);
        let xs: Vec<Pocket> = (0..100).map(|_| a.spin()).collect();
        let ys: Vec<Pocket> = (0..100).map(|_| b.spin()).collect();
        assert_eq!(xs, ys);

        let mut c = Wheel::with_stream(7, 1);
        let zs: Vec<Pocket> = (0..100).map(|_| c.spin()).collect();
        assert_ne!(xs, zs);
    }

    #[test]
    fn test_wheel_is_roughly_uniform() {
        let mut wheel = Wheel::seeded(42);
        let mut counts = [0u32; POCKET_COUNT];
        let spins = 38_000;
        for _ in 0..spins {
            let pocket = wheel.spin();
            let index = Pocket::all().iter().position(|p| *p == pocket).unwrap();
            counts[index] += 1;
        }
        // Expected 1000 per pocket
        for count in counts {
            assert!((800..1200).contains(&count), "count {} out of band", count);
        }
    }

    #[test]
    fn test_scripted_wheel_cycles() {
        let mut wheel = ScriptedWheel::new(vec![Pocket::Number(1), Pocket::DoubleZero]);
        assert_eq!(wheel.spin(), Pocket::Number(1));
        assert_eq!(wheel.spin(), Pocket::DoubleZero);
        assert_eq!(wheel.spin(), Pocket::Number(1));
        assert_eq!(wheel.spins(), 3);
    }

    #[test]
    fn test_double_zero_only_hits_its_straight() {
        let targets = [
            BetTarget::Straight(Pocket::Zero),
            BetTarget::Split([0, 1]),
            BetTarget::Corner([0, 1, 2, 3]),
            BetTarget::Street(1),
            BetTarget::Column(Third::First),
            BetTarget::Dozen(Third::First),
            BetTarget::EvenMoney(EvenMoney::Even),
            BetTarget::EvenMoney(EvenMoney::Low),
        ];
        for target in targets {
            assert!(!evaluate(Pocket::DoubleZero, &target), "00 should lose {:?}", target);
        }
        assert!(evaluate(Pocket::DoubleZero, &BetTarget::Straight(Pocket::DoubleZero)));
        assert!(!evaluate(Pocket::Zero, &BetTarget::Straight(Pocket::DoubleZero)));
    }

    #[test]
    fn test_zero_loses_outside_bets() {
        assert!(!evaluate(Pocket::Zero, &BetTarget::EvenMoney(EvenMoney::Even)));
        assert!(!evaluate(Pocket::Zero, &BetTarget::Column(Third::Third)));
        assert!(evaluate(Pocket::Zero, &BetTarget::Split([0, 2])));
    }

    #[test]
    fn test_probability_matches_coverage() {
        for kind in BetKind::ALL {
            assert_relative_eq!(win_probability(kind) * 38.0, f64::from(coverage(kind)), epsilon = 1e-12);
        }
    }

    #[test]
    fn test_gross_return() {
        assert_eq!(gross_return(BetKind::Straight, 10.0), 360.0);
        assert_eq!(gross_return(BetKind::Dozen, 5.0), 15.0);
        assert_eq!(gross_return(BetKind::EvenMoney, 10.0), 20.0);
    }

    #[test]
    fn test_strategy_ev_averages_steps() {
        let red = |amount| Bet::fixed(BetTarget::EvenMoney(EvenMoney::Red), amount);
        let strategy = Strategy::new("s", "x", 100.0, 200.0, 10)
            .with_step(wh_core::Step::new("a", vec![red(10.0)]))
            .with_step(wh_core::Step::new("b", vec![red(30.0)]));
        assert_relative_eq!(strategy_ev(&strategy, 1.0), -20.0 * 2.0 / 38.0, epsilon = 1e-12);

        let empty = Strategy::new("s", "x", 100.0, 200.0, 10);
        assert_eq!(strategy_ev(&empty, 1.0), 0.0);
    }

    #[test]
    fn test_expected_value_house_edge() {
        let bets = [Bet::fixed(BetTarget::EvenMoney(EvenMoney::Red), 10.0)];
        assert_relative_eq!(expected_value(&bets, 1.0), -10.0 / 19.0, epsilon = 1e-12);

        let bets = [Bet::sized(BetTarget::Straight(Pocket::Number(5)), wh_core::SizingRule::AllIn)];
        assert_relative_eq!(expected_value(&bets, 1.0), -2.0 / 38.0, epsilon = 1e-12);

        let bets = [Bet::fixed(BetTarget::DoubleStreet(1), 38.0)];
        assert_relative_eq!(expected_value(&bets, 1.0), -2.0, epsilon = 1e-12);
    }
}
