//! Built-in strategy catalog
//!
//! Classic progressions plus one advanced bullet/tier example. Step ids are
//! stable so presets can be referenced from saved results and CLI flags.

use crate::bet::{Bet, BetTarget, EvenMoney, SizingRule, Third};
use crate::pocket::Pocket;
use crate::strategy::{CarryAmount, PocketAmount, Step, StepAction, Strategy, WinTier};

fn step(preset: &str, n: usize, bets: Vec<Bet>) -> Step {
    Step::new(format!("{}-{}", preset, n), bets)
}

fn preset_strategy(id: &str, name: &str, description: &str, bankroll: (f64, f64), max_iterations: u32) -> Strategy {
    let mut strategy = Strategy::new(id, name, bankroll.0, bankroll.1, max_iterations).with_description(description);
    strategy.is_preloaded = true;
    strategy
}

/// Single-bet ladder: `amounts[i]` on `target`, last rung resets on loss.
fn ladder(id: &str, target: BetTarget, amounts: &[f64]) -> Vec<Step> {
    let last = amounts.len().saturating_sub(1);
    amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| step(id, i + 1, vec![Bet::fixed(target, amount)]).reset_on_loss(i == last))
        .collect()
}

fn mod_tie_fighter() -> Strategy {
    let id = "mod-tie-fighter";
    let mut s = preset_strategy(
        id,
        "MOD Tie Fighter",
        "A multi-bet strategy covering the 2nd dozen with supporting double streets and corners. Aims for consistent small wins.",
        (500.0, 600.0),
        100,
    )
    .with_max_drawdown(250.0);
    s.steps.push(
        step(
            id,
            1,
            vec![
                Bet::fixed(BetTarget::Dozen(Third::Second), 10.0),
                Bet::fixed(BetTarget::DoubleStreet(1), 5.0),
                Bet::fixed(BetTarget::DoubleStreet(31), 5.0),
                Bet::fixed(BetTarget::Corner([8, 9, 11, 12]), 5.0),
                Bet::fixed(BetTarget::Corner([26, 27, 29, 30]), 5.0),
            ],
        )
        .reset_on_loss(true),
    );
    s
}

fn double_street_straight() -> Strategy {
    let id = "double-street-straight";
    let mut s = preset_strategy(
        id,
        "Double Street Straight",
        "A progressive double street bet with an increasing straight bet. Reset on any win.",
        (500.0, 600.0),
        50,
    )
    .with_max_drawdown(200.0);
    for (i, unit) in [1.0, 2.0, 4.0].into_iter().enumerate() {
        s.steps.push(
            step(
                id,
                i + 1,
                vec![
                    Bet::fixed(BetTarget::DoubleStreet(13), 10.0 * unit),
                    Bet::fixed(BetTarget::Straight(Pocket::Number(17)), 2.0 * unit),
                ],
            )
            .reset_on_loss(i == 2),
        );
    }
    s
}

fn double_street_mod() -> Strategy {
    let id = "double-street-mod";
    let mut s = preset_strategy(
        id,
        "Double Street Mod",
        "Modified double street with coverage on multiple lines. A balanced approach to table coverage.",
        (500.0, 600.0),
        40,
    )
    .with_max_drawdown(150.0);
    for (i, amount) in [6.0, 12.0].into_iter().enumerate() {
        let bets = [1, 13, 25].into_iter().map(|start| Bet::fixed(BetTarget::DoubleStreet(start), amount)).collect();
        s.steps.push(step(id, i + 1, bets).reset_on_loss(i == 1));
    }
    s
}

fn double_street_125() -> Strategy {
    let id = "double-street-125";
    let mut s = preset_strategy(
        id,
        "Double Street 125",
        "A 125-unit double street progression. Start small, increase on losses to recover.",
        (250.0, 260.0),
        100,
    )
    .with_max_drawdown(125.0);
    s.steps = ladder(id, BetTarget::DoubleStreet(7), &[1.0, 2.0, 5.0, 10.0, 20.0, 40.0, 47.0]);
    s
}

fn random_number_dozens() -> Strategy {
    let id = "random-number-dozens";
    let mut s = preset_strategy(
        id,
        "Random Number Dozens",
        "Bet on two dozens with a small straight bet for potential big wins. A coverage strategy with upside potential.",
        (500.0, 600.0),
        50,
    )
    .with_max_drawdown(200.0);
    for (i, unit) in [1.0, 2.0, 4.0].into_iter().enumerate() {
        s.steps.push(
            step(
                id,
                i + 1,
                vec![
                    Bet::fixed(BetTarget::Dozen(Third::First), 5.0 * unit),
                    Bet::fixed(BetTarget::Dozen(Third::Second), 5.0 * unit),
                    Bet::fixed(BetTarget::Straight(Pocket::Number(29)), unit),
                ],
            )
            .reset_on_loss(i == 2),
        );
    }
    s
}

fn progressive_let_it_ride() -> Strategy {
    let id = "progressive-let-it-ride";
    preset_strategy(
        id,
        "Progressive Let-It-Ride",
        "Start with even money bets and let winnings ride on subsequent spins. High risk, high reward strategy.",
        (200.0, 400.0),
        100,
    )
    .with_max_drawdown(100.0)
    .with_step(
        step(id, 1, vec![Bet::fixed(BetTarget::EvenMoney(EvenMoney::Red), 10.0)])
            .continue_on_win(true)
            .reset_on_loss(true),
    )
    .with_step(
        step(id, 2, vec![Bet::sized(BetTarget::EvenMoney(EvenMoney::Black), SizingRule::LetItRide)])
            .continue_on_win(true)
            .reset_on_loss(true),
    )
    .with_step(step(id, 3, vec![Bet::sized(BetTarget::Dozen(Third::Second), SizingRule::LetItRide)]).reset_on_loss(true))
}

fn martingale_red() -> Strategy {
    let id = "martingale-red";
    let mut s = preset_strategy(
        id,
        "Classic Martingale (Red)",
        "The classic Martingale system: double your bet after each loss on red. Demonstrates why this system fails long-term.",
        (500.0, 600.0),
        200,
    )
    .with_max_drawdown(315.0);
    s.steps = ladder(id, BetTarget::EvenMoney(EvenMoney::Red), &[5.0, 10.0, 20.0, 40.0, 80.0, 160.0]);
    s
}

fn dalembert_system() -> Strategy {
    let id = "dalembert-system";
    let mut s = preset_strategy(
        id,
        "D'Alembert System",
        "A safer progression than Martingale. Increase bet by 1 unit after loss, decrease by 1 after win.",
        (300.0, 400.0),
        100,
    )
    .with_max_drawdown(150.0);
    s.steps = ladder(id, BetTarget::EvenMoney(EvenMoney::Black), &[10.0, 15.0, 20.0, 25.0, 30.0]);
    s
}

/// Two-rung carry ladder: a $25 bullet rides the 2nd dozen, the bullet is
/// pocketed on the first hit and the profit is split over the outer dozens.
fn bullet_ladder() -> Strategy {
    let id = "bullet-ladder";
    preset_strategy(
        id,
        "Bullet Ladder",
        "Advanced carry progression. Draw a bullet, let it ride the 2nd dozen, pocket the bullet on the first hit and press the profit across the outer dozens.",
        (1000.0, 1250.0),
        500,
    )
    .with_bullet(25.0)
    .with_max_drawdown(400.0)
    .with_step(
        step(id, 1, vec![Bet::sized(BetTarget::Dozen(Third::Second), SizingRule::Carry)])
            .with_tier(WinTier::new(
                "Climb",
                0.0,
                None,
                StepAction::next_step()
                    .with_pocket(PocketAmount::Fixed(25.0))
                    .with_carry(CarryAmount::Remainder),
            ))
            .with_on_loss(StepAction::restart()),
    )
    .with_step(
        step(
            id,
            2,
            vec![
                Bet::sized(BetTarget::Dozen(Third::First), SizingRule::CarrySplit),
                Bet::sized(BetTarget::Dozen(Third::Third), SizingRule::CarrySplit),
            ],
        )
        .with_tier(WinTier::new("Bank", 0.0, None, StepAction::restart().with_pocket(PocketAmount::All)))
        .with_on_loss(StepAction::restart()),
    )
}

/// Every built-in strategy.
pub fn preloaded() -> Vec<Strategy> {
    vec![
        mod_tie_fighter(),
        double_street_straight(),
        double_street_mod(),
        double_street_125(),
        random_number_dozens(),
        progressive_let_it_ride(),
        martingale_red(),
        dalembert_system(),
        bullet_ladder(),
    ]
}

/// Built-in strategy by id
pub fn preset(id: &str) -> Option<Strategy> {
    preloaded().into_iter().find(|s| s.id == id)
}

/// Starting point for a user-authored strategy.
pub fn blank() -> Strategy {
    let mut strategy = Strategy::new(format!("custom-{}", uuid::Uuid::new_v4()), "New Strategy", 500.0, 600.0, 100)
        .with_description("A custom betting strategy")
        .with_max_drawdown(250.0)
        .with_step(
            Step::new(uuid::Uuid::new_v4().to_string(), vec![Bet::fixed(BetTarget::EvenMoney(EvenMoney::Red), 10.0)])
                .reset_on_loss(true),
        );
    strategy.touch();
    strategy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        for strategy in preloaded() {
            assert!(strategy.validate().is_ok(), "{} failed: {:?}", strategy.id, strategy.validation_errors());
            assert!(strategy.warnings().is_empty(), "{} warned: {:?}", strategy.id, strategy.warnings());
            assert!(strategy.is_preloaded);
        }
    }

    #[test]
    fn test_preset_ids_unique() {
        let mut ids: Vec<String> = preloaded().into_iter().map(|s| s.id).collect();
        let count = ids.len();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), count);
        assert_eq!(count, 9);
    }

    #[test]
    fn test_preset_lookup() {
        let martingale = preset("martingale-red").unwrap();
        assert_eq!(martingale.steps.len(), 6);
        assert!(martingale.steps[5].reset_on_loss);
        assert!(!martingale.steps[4].reset_on_loss);
        assert_eq!(martingale.steps[5].bets[0].sizing.fixed_amount(), Some(160.0));

        assert!(preset("bullet-ladder").unwrap().is_advanced());
        assert!(preset("nope").is_none());
    }

    #[test]
    fn test_blank() {
        let a = blank();
        let b = blank();
        assert!(a.validate().is_ok());
        assert_ne!(a.id, b.id);
        assert!(!a.is_preloaded);
        assert!(a.created_at > 0);
    }
}
