//! Team and virus colour definitions.

use serde::{Deserialize, Serialize};

/// Owning team of a tile or player.
///
/// `Neutral` is the map's default unowned colour. Players always belong to
/// one of the other variants.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum TeamColor {
    /// Unowned.
    #[default]
    Neutral,
    /// First playable team.
    Amber,
    /// Second playable team.
    Teal,
    /// Third playable team.
    Violet,
    /// Fourth playable team.
    Crimson,
}

impl TeamColor {
    /// Every playable team, in seating order.
    pub const PLAYABLE: [TeamColor; 4] = [Self::Amber, Self::Teal, Self::Violet, Self::Crimson];

    /// Returns true for the unowned colour.
    #[must_use]
    pub const fn is_neutral(self) -> bool {
        matches!(self, Self::Neutral)
    }

    /// Get the display name for this team.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Neutral => "Neutral",
            Self::Amber => "Amber",
            Self::Teal => "Teal",
            Self::Violet => "Violet",
            Self::Crimson => "Crimson",
        }
    }
}

/// Per-tile colour tag used for line display and collision arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VirusColor {
    /// No virus on this tile.
    #[default]
    None,
    /// Red virus.
    Red,
    /// Green virus.
    Green,
    /// Blue virus.
    Blue,
}

impl VirusColor {
    /// Returns true if an advancing line of this colour takes a tile held by
    /// `defender`.
    ///
    /// Red beats blue, green beats red, blue beats green. Every other pairing,
    /// including equal colours and `None`, is not a capture.
    #[must_use]
    pub const fn dominates(self, defender: VirusColor) -> bool {
        matches!(
            (self, defender),
            (Self::Red, Self::Blue) | (Self::Green, Self::Red) | (Self::Blue, Self::Green)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLORS: [VirusColor; 3] = [VirusColor::Red, VirusColor::Green, VirusColor::Blue];

    #[test]
    fn test_dominance_cycle() {
        assert!(VirusColor::Red.dominates(VirusColor::Blue));
        assert!(VirusColor::Green.dominates(VirusColor::Red));
        assert!(VirusColor::Blue.dominates(VirusColor::Green));

        assert!(!VirusColor::Blue.dominates(VirusColor::Red));
        assert!(!VirusColor::Red.dominates(VirusColor::Green));
        assert!(!VirusColor::Green.dominates(VirusColor::Blue));
    }

    #[test]
    fn test_dominance_is_total_over_distinct_colors() {
        for a in COLORS {
            for b in COLORS {
                if a == b {
                    assert!(!a.dominates(b));
                } else {
                    // Exactly one direction wins
                    assert!(a.dominates(b) ^ b.dominates(a), "{a:?} vs {b:?}");
                }
            }
        }
    }

    #[test]
    fn test_uncolored_never_captures() {
        for c in COLORS {
            assert!(!VirusColor::None.dominates(c));
            assert!(!c.dominates(VirusColor::None));
        }
    }

    #[test]
    fn test_neutral_team() {
        assert!(TeamColor::Neutral.is_neutral());
        assert!(TeamColor::PLAYABLE.iter().all(|t| !t.is_neutral()));
        assert_eq!(TeamColor::Teal.display_name(), "Teal");
    }
}
