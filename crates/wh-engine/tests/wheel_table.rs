//! Bet evaluation against every pocket
//!
//! Each bet kind is checked against a hand-written coverage set, and every
//! legal target of each kind is checked to cover exactly its advertised
//! number of pockets.

use wh_core::{BetKind, BetTarget, EvenMoney, Pocket, Third};
use wh_engine::{coverage, evaluate};

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn winners(target: &BetTarget) -> Vec<Pocket> {
    Pocket::all().into_iter().filter(|p| evaluate(*p, target)).collect()
}

fn numbers(ns: &[u8]) -> Vec<Pocket> {
    ns.iter().map(|&n| Pocket::from_number(n).unwrap()).collect()
}

fn every_target(kind: BetKind) -> Vec<BetTarget> {
    let thirds = [Third::First, Third::Second, Third::Third];
    match kind {
        BetKind::Straight => Pocket::all().into_iter().map(BetTarget::Straight).collect(),
        BetKind::Split => (1..=36u8)
            .flat_map(|n| {
                let mut v = Vec::new();
                if n % 3 != 0 {
                    v.push(BetTarget::Split([n, n + 1]));
                }
                if n <= 33 {
                    v.push(BetTarget::Split([n, n + 3]));
                }
                v
            })
            .collect(),
        BetKind::Street => (1..=34u8).step_by(3).map(BetTarget::Street).collect(),
        BetKind::Corner => (1..=32u8)
            .filter(|n| n % 3 != 0)
            .map(|n| BetTarget::Corner([n, n + 1, n + 3, n + 4]))
            .collect(),
        BetKind::DoubleStreet => (1..=31u8).step_by(3).map(BetTarget::DoubleStreet).collect(),
        BetKind::Column => thirds.into_iter().map(BetTarget::Column).collect(),
        BetKind::Dozen => thirds.into_iter().map(BetTarget::Dozen).collect(),
        BetKind::EvenMoney => [
            EvenMoney::Red,
            EvenMoney::Black,
            EvenMoney::Odd,
            EvenMoney::Even,
            EvenMoney::Low,
            EvenMoney::High,
        ]
        .into_iter()
        .map(BetTarget::EvenMoney)
        .collect(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HAND-ENUMERATED COVERAGE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_straight_coverage() {
    assert_eq!(winners(&BetTarget::Straight(Pocket::Number(17))), numbers(&[17]));
    assert_eq!(winners(&BetTarget::Straight(Pocket::Zero)), vec![Pocket::Zero]);
    assert_eq!(winners(&BetTarget::Straight(Pocket::DoubleZero)), vec![Pocket::DoubleZero]);
}

#[test]
fn test_inside_coverage() {
    assert_eq!(winners(&BetTarget::Split([8, 11])), numbers(&[8, 11]));
    assert_eq!(winners(&BetTarget::Street(4)), numbers(&[4, 5, 6]));
    assert_eq!(winners(&BetTarget::Street(34)), numbers(&[34, 35, 36]));
    assert_eq!(winners(&BetTarget::Corner([26, 27, 29, 30])), numbers(&[26, 27, 29, 30]));
    assert_eq!(winners(&BetTarget::DoubleStreet(13)), numbers(&[13, 14, 15, 16, 17, 18]));
    assert_eq!(winners(&BetTarget::DoubleStreet(31)), numbers(&[31, 32, 33, 34, 35, 36]));
}

#[test]
fn test_column_coverage() {
    let first: Vec<u8> = (1..=34).step_by(3).collect();
    let second: Vec<u8> = (2..=35).step_by(3).collect();
    let third: Vec<u8> = (3..=36).step_by(3).collect();
    assert_eq!(winners(&BetTarget::Column(Third::First)), numbers(&first));
    assert_eq!(winners(&BetTarget::Column(Third::Second)), numbers(&second));
    assert_eq!(winners(&BetTarget::Column(Third::Third)), numbers(&third));
}

#[test]
fn test_dozen_coverage() {
    let first: Vec<u8> = (1..=12).collect();
    let second: Vec<u8> = (13..=24).collect();
    let third: Vec<u8> = (25..=36).collect();
    assert_eq!(winners(&BetTarget::Dozen(Third::First)), numbers(&first));
    assert_eq!(winners(&BetTarget::Dozen(Third::Second)), numbers(&second));
    assert_eq!(winners(&BetTarget::Dozen(Third::Third)), numbers(&third));
}

#[test]
fn test_even_money_coverage() {
    let red = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];
    let black = [2, 4, 6, 8, 10, 11, 13, 15, 17, 20, 22, 24, 26, 28, 29, 31, 33, 35];
    let odd: Vec<u8> = (1..=35).step_by(2).collect();
    let even: Vec<u8> = (2..=36).step_by(2).collect();
    let low: Vec<u8> = (1..=18).collect();
    let high: Vec<u8> = (19..=36).collect();

    assert_eq!(winners(&BetTarget::EvenMoney(EvenMoney::Red)), numbers(&red));
    assert_eq!(winners(&BetTarget::EvenMoney(EvenMoney::Black)), numbers(&black));
    assert_eq!(winners(&BetTarget::EvenMoney(EvenMoney::Odd)), numbers(&odd));
    assert_eq!(winners(&BetTarget::EvenMoney(EvenMoney::Even)), numbers(&even));
    assert_eq!(winners(&BetTarget::EvenMoney(EvenMoney::Low)), numbers(&low));
    assert_eq!(winners(&BetTarget::EvenMoney(EvenMoney::High)), numbers(&high));
}

// ═══════════════════════════════════════════════════════════════════════════════
// EXHAUSTIVE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_every_target_covers_its_count() {
    for kind in BetKind::ALL {
        let targets = every_target(kind);
        assert!(!targets.is_empty());
        for target in targets {
            assert!(target.check().is_ok(), "{:?} should be a legal target", target);
            assert_eq!(winners(&target).len() as u32, coverage(kind), "{:?} covers the wrong number of pockets", target);
        }
    }
}

#[test]
fn test_green_pockets_lose_outside_bets() {
    for kind in [BetKind::Street, BetKind::DoubleStreet, BetKind::Column, BetKind::Dozen, BetKind::EvenMoney] {
        for target in every_target(kind) {
            assert!(!evaluate(Pocket::Zero, &target), "0 should lose {:?}", target);
            assert!(!evaluate(Pocket::DoubleZero, &target), "00 should lose {:?}", target);
        }
    }
}
