//! Bet shapes, bet targets and sizing rules

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::WhError;
use crate::pocket::Pocket;

/// The eight standard bet shapes on an American table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetKind {
    Straight,
    Split,
    Street,
    Corner,
    DoubleStreet,
    Column,
    Dozen,
    EvenMoney,
}

impl BetKind {
    pub const ALL: [BetKind; 8] = [
        BetKind::Straight,
        BetKind::Split,
        BetKind::Street,
        BetKind::Corner,
        BetKind::DoubleStreet,
        BetKind::Column,
        BetKind::Dozen,
        BetKind::EvenMoney,
    ];

    /// Display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Straight => "Straight (Single Number)",
            Self::Split => "Split (Two Numbers)",
            Self::Street => "Street (Three Numbers)",
            Self::Corner => "Corner (Four Numbers)",
            Self::DoubleStreet => "Double Street (Six Numbers)",
            Self::Column => "Column (12 Numbers)",
            Self::Dozen => "Dozen (12 Numbers)",
            Self::EvenMoney => "Even Money (18 Numbers)",
        }
    }
}

/// First / second / third column or dozen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Third {
    #[serde(rename = "1st")]
    First,
    #[serde(rename = "2nd")]
    Second,
    #[serde(rename = "3rd")]
    Third,
}

impl Third {
    /// 1-based index
    pub fn index(&self) -> u8 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::First => "1st",
            Self::Second => "2nd",
            Self::Third => "3rd",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "1st" => Some(Self::First),
            "2nd" => Some(Self::Second),
            "3rd" => Some(Self::Third),
            _ => None,
        }
    }
}

/// Even-money propositions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvenMoney {
    #[serde(rename = "red")]
    Red,
    #[serde(rename = "black")]
    Black,
    #[serde(rename = "odd")]
    Odd,
    #[serde(rename = "even")]
    Even,
    #[serde(rename = "1-18")]
    Low,
    #[serde(rename = "19-36")]
    High,
}

impl EvenMoney {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Black => "black",
            Self::Odd => "odd",
            Self::Even => "even",
            Self::Low => "1-18",
            Self::High => "19-36",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        match label {
            "red" => Some(Self::Red),
            "black" => Some(Self::Black),
            "odd" => Some(Self::Odd),
            "even" => Some(Self::Even),
            "1-18" => Some(Self::Low),
            "19-36" => Some(Self::High),
            _ => None,
        }
    }
}

/// Where a bet sits on the layout. One variant per bet kind, carrying only
/// the detail that kind needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BetTarget {
    Straight(Pocket),
    Split([u8; 2]),
    /// First number of a three-number row (1, 4, ..., 34)
    Street(u8),
    Corner([u8; 4]),
    /// First number of a six-number double row (1, 4, ..., 31)
    DoubleStreet(u8),
    Column(Third),
    Dozen(Third),
    EvenMoney(EvenMoney),
}

impl BetTarget {
    pub fn kind(&self) -> BetKind {
        match self {
            Self::Straight(_) => BetKind::Straight,
            Self::Split(_) => BetKind::Split,
            Self::Street(_) => BetKind::Street,
            Self::Corner(_) => BetKind::Corner,
            Self::DoubleStreet(_) => BetKind::DoubleStreet,
            Self::Column(_) => BetKind::Column,
            Self::Dozen(_) => BetKind::Dozen,
            Self::EvenMoney(_) => BetKind::EvenMoney,
        }
    }

    /// Check the numbers carried by the target are on the layout.
    pub fn check(&self) -> Result<(), String> {
        match self {
            Self::Straight(_) | Self::Column(_) | Self::Dozen(_) | Self::EvenMoney(_) => Ok(()),
            Self::Split(numbers) => check_distinct_numbers("split", numbers),
            Self::Corner(numbers) => check_distinct_numbers("corner", numbers),
            Self::Street(start) => check_row_start("street", *start, 34),
            Self::DoubleStreet(start) => check_row_start("double street", *start, 31),
        }
    }

    fn from_parts(kind: BetKind, detail: DetailRepr) -> Result<Self, String> {
        let mismatch = || format!("detail does not match bet kind {:?}", kind);
        let target = match (kind, detail) {
            (BetKind::Straight, DetailRepr::Number(n)) => {
                Self::Straight(Pocket::from_number(n).ok_or_else(|| format!("straight number {} is not on the wheel", n))?)
            }
            (BetKind::Straight, DetailRepr::Text(s)) if s == "00" => Self::Straight(Pocket::DoubleZero),
            (BetKind::Split, DetailRepr::Numbers(v)) => {
                Self::Split(v.try_into().map_err(|_| "split requires exactly two numbers".to_string())?)
            }
            (BetKind::Street, DetailRepr::Number(n)) => Self::Street(n),
            (BetKind::Corner, DetailRepr::Numbers(v)) => {
                Self::Corner(v.try_into().map_err(|_| "corner requires exactly four numbers".to_string())?)
            }
            (BetKind::DoubleStreet, DetailRepr::Number(n)) => Self::DoubleStreet(n),
            (BetKind::Column, DetailRepr::Text(s)) => Self::Column(Third::from_label(&s).ok_or_else(mismatch)?),
            (BetKind::Dozen, DetailRepr::Text(s)) => Self::Dozen(Third::from_label(&s).ok_or_else(mismatch)?),
            (BetKind::EvenMoney, DetailRepr::Text(s)) => {
                Self::EvenMoney(EvenMoney::from_label(&s).ok_or_else(mismatch)?)
            }
            _ => return Err(mismatch()),
        };
        target.check()?;
        Ok(target)
    }

    fn detail(&self) -> DetailRepr {
        match self {
            Self::Straight(Pocket::DoubleZero) => DetailRepr::Text("00".into()),
            Self::Straight(pocket) => DetailRepr::Number(pocket.value().unwrap_or(0)),
            Self::Split(numbers) => DetailRepr::Numbers(numbers.to_vec()),
            Self::Street(start) | Self::DoubleStreet(start) => DetailRepr::Number(*start),
            Self::Corner(numbers) => DetailRepr::Numbers(numbers.to_vec()),
            Self::Column(third) | Self::Dozen(third) => DetailRepr::Text(third.label().into()),
            Self::EvenMoney(prop) => DetailRepr::Text(prop.label().into()),
        }
    }
}

fn check_distinct_numbers(label: &str, numbers: &[u8]) -> Result<(), String> {
    if let Some(n) = numbers.iter().find(|&&n| n > 36) {
        return Err(format!("{} number {} is not on the layout", label, n));
    }
    for (i, n) in numbers.iter().enumerate() {
        if numbers[..i].contains(n) {
            return Err(format!("{} numbers must be distinct", label));
        }
    }
    Ok(())
}

fn check_row_start(label: &str, start: u8, last: u8) -> Result<(), String> {
    if start == 0 || start > last || (start - 1) % 3 != 0 {
        return Err(format!("{} must start on a row (1, 4, ..., {}), got {}", label, last, start));
    }
    Ok(())
}

impl fmt::Display for BetTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Straight(pocket) => write!(f, "Number {}", pocket),
            Self::Split([a, b]) => write!(f, "{}-{}", a, b),
            Self::Street(start) => write!(f, "Row {}-{}", start, start + 2),
            Self::Corner([a, b, c, d]) => write!(f, "{},{},{},{}", a, b, c, d),
            Self::DoubleStreet(start) => write!(f, "{}-{}", start, start + 5),
            Self::Column(third) => write!(f, "{} Column", third.label()),
            Self::Dozen(third) => write!(f, "{} Dozen", third.label()),
            Self::EvenMoney(prop) => write!(f, "{}", prop.label()),
        }
    }
}

/// Symbolic sizing rules.
///
/// `AllIn`, `HalfBankroll` and `LetItRide` size against the bankroll.
/// `Bullet`, `Carry` and `CarrySplit` size against the carry account and only
/// apply to advanced strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SizingRule {
    AllIn,
    HalfBankroll,
    LetItRide,
    Bullet,
    Carry,
    #[serde(alias = "carry_split")]
    CarrySplit,
}

impl SizingRule {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Bullet | Self::Carry | Self::CarrySplit)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::AllIn => "All-In",
            Self::HalfBankroll => "Half Bankroll",
            Self::LetItRide => "Let It Ride",
            Self::Bullet => "Bullet",
            Self::Carry => "Carry",
            Self::CarrySplit => "Split Carry",
        }
    }
}

/// How much to wager: a fixed amount or a symbolic rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BetSizing {
    Fixed(f64),
    Symbolic(SizingRule),
}

impl BetSizing {
    /// Fixed amount, if any
    pub fn fixed_amount(&self) -> Option<f64> {
        match self {
            Self::Fixed(amount) => Some(*amount),
            Self::Symbolic(_) => None,
        }
    }

    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Symbolic(rule) if rule.is_advanced())
    }
}

impl fmt::Display for BetSizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(amount) => write!(f, "${}", amount),
            Self::Symbolic(rule) => write!(f, "{}", rule.display_name()),
        }
    }
}

/// A single wager within a step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BetRepr", into = "BetRepr")]
pub struct Bet {
    pub target: BetTarget,
    pub sizing: BetSizing,
}

impl Bet {
    pub fn new(target: BetTarget, sizing: BetSizing) -> Self {
        Self { target, sizing }
    }

    /// Bet a fixed amount
    pub fn fixed(target: BetTarget, amount: f64) -> Self {
        Self::new(target, BetSizing::Fixed(amount))
    }

    /// Bet with a symbolic sizing rule
    pub fn sized(target: BetTarget, rule: SizingRule) -> Self {
        Self::new(target, BetSizing::Symbolic(rule))
    }

    pub fn kind(&self) -> BetKind {
        self.target.kind()
    }

    /// Check shape and amount.
    pub fn check(&self) -> Result<(), WhError> {
        self.target.check().map_err(WhError::InvalidBet)?;
        match self.sizing {
            BetSizing::Fixed(amount) if !(amount.is_finite() && amount > 0.0) => Err(WhError::InvalidBet(
                format!("fixed amount must be positive, got {}", amount),
            )),
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Bet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.sizing, self.target)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERIALIZED FORM: {betKind, sizingRule, detail}
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum DetailRepr {
    Number(u8),
    Text(String),
    Numbers(Vec<u8>),
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BetRepr {
    #[serde(alias = "betType")]
    bet_kind: BetKind,
    #[serde(alias = "betAmount")]
    sizing_rule: BetSizing,
    #[serde(alias = "betDetail")]
    detail: DetailRepr,
}

impl TryFrom<BetRepr> for Bet {
    type Error = String;

    fn try_from(repr: BetRepr) -> Result<Self, Self::Error> {
        let target = BetTarget::from_parts(repr.bet_kind, repr.detail)?;
        Ok(Bet::new(target, repr.sizing_rule))
    }
}

impl From<Bet> for BetRepr {
    fn from(bet: Bet) -> Self {
        BetRepr {
            bet_kind: bet.kind(),
            sizing_rule: bet.sizing,
            detail: bet.target.detail(),
        }
    }
}
