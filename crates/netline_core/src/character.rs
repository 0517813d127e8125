//! Characters, abilities and the built-in roster.

use serde::{Deserialize, Serialize};

/// Status tag carried by abilities and passives.
///
/// Only some tags drive combat rules (see [`crate::combat`]); the rest are
/// carried as data for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StatusEffect {
    /// Restore hp.
    Hp,
    /// Restore five hp.
    Hp5,
    /// Cooldown reduction.
    Cdr,
    /// Five-turn cooldown reduction.
    Cdr5,
    /// Reduce the target's move allowance by one.
    MovesMinusOne,
    /// Put every target ability on full cooldown.
    AbilityLock,
    /// No effect.
    #[default]
    None,
    /// Damage ignores armor.
    Pierce,
    /// Firewall capture.
    Capture,
    /// Change the virus colour of a line.
    EditStream,
    /// Drag the target one cell toward the attacker.
    Pull,
    /// Shove the target one cell away from the attacker.
    Push,
    /// Clear every target ability cooldown.
    AbilityUnlock,
    /// Reduce the target's sight.
    Blind,
}

/// A usable character ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    /// Display name.
    pub name: String,
    /// Maximum Manhattan distance to the target tile.
    pub range: u32,
    /// Area radius around the target tile.
    pub radius: u32,
    /// Turns until usable again.
    pub cdr: u32,
    /// Cooldown applied after use.
    pub max_cdr: u32,
    /// Base damage before armor.
    pub damage: i32,
    /// Status tag.
    pub effect: StatusEffect,
    /// Flavour text.
    pub description: String,
}

impl Ability {
    /// Create a ready-to-use ability.
    #[must_use]
    pub fn new(name: impl Into<String>, damage: i32, effect: StatusEffect) -> Self {
        Self {
            name: name.into(),
            range: 1,
            radius: 0,
            cdr: 0,
            max_cdr: 1,
            damage,
            effect,
            description: String::new(),
        }
    }

    /// Builder method to set range.
    #[must_use]
    pub fn with_range(mut self, range: u32) -> Self {
        self.range = range;
        self
    }

    /// Builder method to set the max cooldown.
    #[must_use]
    pub fn with_cooldown(mut self, max_cdr: u32) -> Self {
        self.max_cdr = max_cdr;
        self
    }

    /// Builder method to set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns true if the ability is off cooldown.
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        self.cdr == 0
    }
}

/// A persistent modifier on a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passive {
    /// Stack count.
    pub stacks: u32,
    /// Status tag.
    pub effect: StatusEffect,
    /// Debuff rather than buff.
    pub is_negative: bool,
    /// Stacks are applied to the owner.
    pub stacks_target_self: bool,
    /// Affects nearby players.
    pub is_aura: bool,
}

/// A playable character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    /// Roster identifier.
    pub id: String,
    /// Glyph shown on the map.
    pub rune: String,
    /// Current hp.
    pub hp: i32,
    /// Maximum hp.
    pub max_hp: i32,
    /// Moves left this turn.
    pub move_points: u32,
    /// Moves granted each turn.
    pub max_move: u32,
    /// Flat damage reduction.
    pub armor: i32,
    /// Sight radius.
    pub sight: u32,
    /// Usable abilities.
    pub abilities: Vec<Ability>,
    /// Passive modifiers.
    pub passives: Vec<Passive>,
}

impl Character {
    /// Reset the move allowance to its maximum.
    pub fn restore_moves(&mut self) {
        self.move_points = self.max_move;
    }

    /// Count every non-zero cooldown down by one.
    pub fn tick_cooldowns(&mut self) {
        for ability in &mut self.abilities {
            ability.cdr = ability.cdr.saturating_sub(1);
        }
    }
}

// ============================================================================
// Roster
// ============================================================================

/// Identifier of the character bots pick by default.
pub const DEFAULT_BOT_CHARACTER: &str = "technician";

/// Firewall specialist: cheap capture, a piercing probe.
#[must_use]
pub fn technician() -> Character {
    Character {
        id: "technician".into(),
        rune: "T".into(),
        hp: 10,
        max_hp: 10,
        move_points: 3,
        max_move: 3,
        armor: 1,
        sight: 4,
        abilities: vec![
            Ability::new("Breach", 0, StatusEffect::Capture)
                .with_range(0)
                .with_description("Work on the firewall underfoot"),
            Ability::new("Probe", 3, StatusEffect::Pierce)
                .with_range(2)
                .with_cooldown(2)
                .with_description("Armor-piercing jab"),
        ],
        passives: Vec::new(),
    }
}

/// Frontliner with displacement.
#[must_use]
pub fn enforcer() -> Character {
    Character {
        id: "enforcer".into(),
        rune: "E".into(),
        hp: 14,
        max_hp: 14,
        move_points: 2,
        max_move: 2,
        armor: 3,
        sight: 3,
        abilities: vec![
            Ability::new("Hook", 2, StatusEffect::Pull)
                .with_range(3)
                .with_cooldown(2),
            Ability::new("Shove", 3, StatusEffect::Push).with_cooldown(1),
            Ability::new("Clamp", 1, StatusEffect::MovesMinusOne)
                .with_range(2)
                .with_cooldown(2),
        ],
        passives: vec![Passive {
            stacks: 1,
            effect: StatusEffect::Hp,
            is_negative: false,
            stacks_target_self: true,
            is_aura: false,
        }],
    }
}

/// Disruptor that interferes with abilities and sight.
#[must_use]
pub fn saboteur() -> Character {
    Character {
        id: "saboteur".into(),
        rune: "S".into(),
        hp: 8,
        max_hp: 8,
        move_points: 4,
        max_move: 4,
        armor: 0,
        sight: 5,
        abilities: vec![
            Ability::new("Lockout", 1, StatusEffect::AbilityLock)
                .with_range(3)
                .with_cooldown(4),
            Ability::new("Blackout", 1, StatusEffect::Blind)
                .with_range(3)
                .with_cooldown(3),
            Ability::new("Reroute", 0, StatusEffect::EditStream).with_cooldown(3),
        ],
        passives: Vec::new(),
    }
}

/// Every built-in character.
#[must_use]
pub fn roster() -> Vec<Character> {
    vec![technician(), enforcer(), saboteur()]
}

/// Look up a built-in character by roster id.
#[must_use]
pub fn by_id(id: &str) -> Option<Character> {
    roster().into_iter().find(|c| c.id == id)
}
