//! Wheel pockets for American roulette (0, 00, 1-36)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Red numbers on an American wheel.
pub const RED_NUMBERS: [u8; 18] = [1, 3, 5, 7, 9, 12, 14, 16, 18, 19, 21, 23, 25, 27, 30, 32, 34, 36];

/// Number of pockets on an American wheel.
pub const POCKET_COUNT: usize = 38;

/// A single pocket on the wheel.
///
/// `DoubleZero` is its own value: it never compares equal to any numeric pocket,
/// so only a straight bet placed on it can win when it comes up.
///
/// Serialized as a plain number for 0-36 and as the string `"00"` for double zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PocketRepr", into = "PocketRepr")]
pub enum Pocket {
    Zero,
    DoubleZero,
    Number(u8),
}

/// Pocket colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PocketColor {
    Red,
    Black,
    Green,
}

impl Pocket {
    /// Every pocket, in table order (0, 00, 1..=36).
    pub fn all() -> [Pocket; POCKET_COUNT] {
        let mut pockets = [Pocket::Zero; POCKET_COUNT];
        pockets[1] = Pocket::DoubleZero;
        for n in 1..=36u8 {
            pockets[n as usize + 1] = Pocket::Number(n);
        }
        pockets
    }

    /// Build a pocket from a number in 0..=36.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            0 => Some(Self::Zero),
            1..=36 => Some(Self::Number(n)),
            _ => None,
        }
    }

    /// Numeric value for 0..=36. `None` for double zero.
    pub fn value(&self) -> Option<u8> {
        match self {
            Self::Zero => Some(0),
            Self::DoubleZero => None,
            Self::Number(n) => Some(*n),
        }
    }

    /// The number for 1..=36, `None` for either green pocket.
    pub fn plain_number(&self) -> Option<u8> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_green(&self) -> bool {
        matches!(self, Self::Zero | Self::DoubleZero)
    }

    pub fn color(&self) -> PocketColor {
        match self {
            Self::Zero | Self::DoubleZero => PocketColor::Green,
            Self::Number(n) if RED_NUMBERS.contains(n) => PocketColor::Red,
            Self::Number(_) => PocketColor::Black,
        }
    }
}

impl fmt::Display for Pocket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "0"),
            Self::DoubleZero => write!(f, "00"),
            Self::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PocketRepr {
    Number(u8),
    Text(String),
}

impl TryFrom<PocketRepr> for Pocket {
    type Error = String;

    fn try_from(repr: PocketRepr) -> Result<Self, Self::Error> {
        match repr {
            PocketRepr::Number(n) => {
                Pocket::from_number(n).ok_or_else(|| format!("pocket {} is not on the wheel", n))
            }
            PocketRepr::Text(s) if s == "00" => Ok(Pocket::DoubleZero),
            PocketRepr::Text(s) => s
                .parse::<u8>()
                .ok()
                .and_then(Pocket::from_number)
                .ok_or_else(|| format!("pocket '{}' is not on the wheel", s)),
        }
    }
}

impl From<Pocket> for PocketRepr {
    fn from(pocket: Pocket) -> Self {
        match pocket {
            Pocket::DoubleZero => PocketRepr::Text("00".into()),
            Pocket::Zero => PocketRepr::Number(0),
            Pocket::Number(n) => PocketRepr::Number(n),
        }
    }
}
