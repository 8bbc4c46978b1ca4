//! Dice notation parsing and seeded rolling.
//!
//! Parses standard notation like "2d6", "1d8+2", "3d4-1". All rolls draw
//! from an explicitly threaded `Rng` so an identical seed and call sequence
//! reproduces identical results.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// A parsed dice specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceRoll {
    pub count: u32,
    pub sides: u32,
    pub modifier: i32,
}

/// Outcome of rolling a `DiceRoll`: the summed total (modifier applied,
/// clamped at 0) and each individual die value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollResult {
    pub total: u32,
    pub rolls: Vec<u32>,
}

impl DiceRoll {
    pub fn new(count: u32, sides: u32, modifier: i32) -> Self {
        Self {
            count,
            sides,
            modifier,
        }
    }

    /// Rolls each die uniformly in `[1, sides]` and sums the results.
    pub fn roll(&self, rng: &mut impl Rng) -> RollResult {
        let mut rolls = Vec::with_capacity(self.count as usize);
        for _ in 0..self.count {
            rolls.push(rng.gen_range(1..=self.sides));
        }
        let sum: u32 = rolls.iter().sum();
        let total = (sum as i64 + self.modifier as i64).max(0) as u32;
        RollResult { total, rolls }
    }

    /// Minimum possible total.
    pub fn min(&self) -> u32 {
        (self.count as i64 + self.modifier as i64).max(0) as u32
    }

    /// Maximum possible total.
    pub fn max(&self) -> u32 {
        ((self.count * self.sides) as i64 + self.modifier as i64).max(0) as u32
    }
}

impl FromStr for DiceRoll {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_dice(s)
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            m if m > 0 => write!(f, "{}d{}+{}", self.count, self.sides, m),
            m if m < 0 => write!(f, "{}d{}{}", self.count, self.sides, m),
            _ => write!(f, "{}d{}", self.count, self.sides),
        }
    }
}

/// Parses dice notation of the form `NdM`, `NdM+Z`, or `NdM-Z`.
///
/// Count and sides must both be positive. Anything else is a `ParseError`.
pub fn parse_dice(notation: &str) -> Result<DiceRoll, EngineError> {
    let trimmed = notation.trim().to_lowercase();
    let err = || EngineError::ParseError(notation.to_string());

    let d_pos = trimmed.find('d').ok_or_else(err)?;
    let count: u32 = trimmed[..d_pos].parse().map_err(|_| err())?;

    let rest = &trimmed[d_pos + 1..];
    let (sides_str, modifier) = match rest.find(['+', '-']) {
        Some(sign_pos) => {
            let modifier: i32 = rest[sign_pos..].parse().map_err(|_| err())?;
            (&rest[..sign_pos], modifier)
        }
        None => (rest, 0),
    };
    let sides: u32 = sides_str.parse().map_err(|_| err())?;

    if count == 0 || sides == 0 {
        return Err(err());
    }

    Ok(DiceRoll::new(count, sides, modifier))
}

/// Parses and rolls notation in one step.
pub fn roll_notation(notation: &str, rng: &mut impl Rng) -> Result<RollResult, EngineError> {
    Ok(parse_dice(notation)?.roll(rng))
}

/// Critical hit check: a natural 20 on a d20.
pub fn crit_check(rng: &mut impl Rng) -> bool {
    rng.gen_range(1..=20) == 20
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_parse_simple_notation() {
        assert_eq!(parse_dice("2d6").unwrap(), DiceRoll::new(2, 6, 0));
        assert_eq!(parse_dice("1d20").unwrap(), DiceRoll::new(1, 20, 0));
        assert_eq!(parse_dice("  3D8 ").unwrap(), DiceRoll::new(3, 8, 0));
    }

    #[test]
    fn test_parse_with_modifier() {
        assert_eq!(parse_dice("2d6+3").unwrap(), DiceRoll::new(2, 6, 3));
        assert_eq!(parse_dice("1d8-2").unwrap(), DiceRoll::new(1, 8, -2));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "d", "abc", "2x6", "d6", "2d", "2d6+", "-1d6", "1.5d6"] {
            assert!(parse_dice(bad).is_err(), "expected error for {:?}", bad);
        }
    }

    #[test]
    fn test_parse_rejects_nonpositive() {
        assert!(parse_dice("0d6").is_err());
        assert!(parse_dice("2d0").is_err());
        assert!(parse_dice("0d0").is_err());
    }

    #[test]
    fn test_roll_range_and_count() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let spec = parse_dice("3d6").unwrap();
        for _ in 0..100 {
            let result = spec.roll(&mut rng);
            assert_eq!(result.rolls.len(), 3);
            assert!((3..=18).contains(&result.total));
            for roll in &result.rolls {
                assert!((1..=6).contains(roll));
            }
            assert_eq!(result.total, result.rolls.iter().sum::<u32>());
        }
    }

    #[test]
    fn test_roll_is_seed_deterministic() {
        let spec = parse_dice("4d10").unwrap();
        let a = spec.roll(&mut ChaCha8Rng::seed_from_u64(7));
        let b = spec.roll(&mut ChaCha8Rng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_modifier_clamps_at_zero() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spec = parse_dice("1d2-5").unwrap();
        for _ in 0..20 {
            assert_eq!(spec.roll(&mut rng).total, 0);
        }
    }

    #[test]
    fn test_min_max() {
        let spec = parse_dice("2d6+1").unwrap();
        assert_eq!(spec.min(), 3);
        assert_eq!(spec.max(), 13);
    }

    #[test]
    fn test_display_round_trip() {
        for s in ["2d6", "1d8+2", "3d4-1"] {
            assert_eq!(parse_dice(s).unwrap().to_string(), s);
        }
    }
}
