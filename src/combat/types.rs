//! Combat data model: enemies, actions, and the combat state machine.

use serde::{Deserialize, Serialize};

use crate::combat::ai::Behavior;
use crate::combat::hooks::AbilityHook;
use crate::effects::{EffectKind, StatusEffect};
use crate::items::Tier;

/// A special attack an enemy can use when its behavior says so: a normal
/// hit that also inflicts a status effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecialMove {
    pub name: String,
    pub inflicts: EffectKind,
    pub duration: u32,
    pub magnitude: u32,
}

/// An enemy combatant. Owned exclusively by the combat or room that spawned
/// it; defeated enemies keep their slot with 0 health so a resurrection hook
/// can bring them back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub health: u32,
    pub max_health: u32,
    pub armor: u32,
    /// Damage dice notation, e.g. "2d6".
    pub damage_dice: String,
    pub agility: u32,
    pub weakness: Option<String>,
    /// Set by the Examine action; gates the weakness multiplier and any
    /// immune-until-examined hook.
    pub examined: bool,
    pub xp_reward: u64,
    pub gold_reward: u64,
    /// Tier used to roll this enemy's loot drop.
    pub loot_tier: Tier,
    pub status_effects: Vec<StatusEffect>,
    pub hooks: Vec<AbilityHook>,
    pub behavior: Behavior,
    /// Rounds until the special move is ready again.
    pub cooldown: u32,
    pub special: Option<SpecialMove>,
}

impl Enemy {
    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }
}

/// A combatant slot in the turn order. Enemy indices point into
/// `CombatState::enemies` and stay valid for the combat's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CombatantId {
    Hero,
    Enemy(usize),
}

/// How a finished combat resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Victory,
    Defeat,
    Escaped,
}

/// A player action for one combat round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Basic attack against an enemy by id.
    Attack { target: String },
    /// Class skill against an enemy by id.
    UseSkill { skill_id: String, target: String },
    /// Halves the next incoming hit this round.
    Defend,
    /// Attempt to escape; success depends on agility versus enemy tier.
    Flee,
    /// Reveals an enemy's weakness and lifts examine-gated immunity.
    Examine { target: String },
    /// Consumes an inventory item.
    UseItem { item_id: String },
}

/// Active combat session state.
///
/// Turn order is computed once at creation and only changes when an enemy
/// is defeated (removed) or resurrected (re-appended).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatState {
    pub active: bool,
    pub resolution: Option<Resolution>,
    pub enemies: Vec<Enemy>,
    pub turn_order: Vec<CombatantId>,
    pub turn_index: usize,
    pub round: u32,
    pub hero_defending: bool,
    /// Whether the hero's one-per-combat revive has been consumed.
    pub revive_used: bool,
}

impl CombatState {
    pub fn whose_turn(&self) -> Option<CombatantId> {
        self.turn_order.get(self.turn_index).copied()
    }

    pub fn alive_enemies(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter().filter(|e| e.is_alive())
    }

    pub fn alive_enemy_count(&self) -> usize {
        self.alive_enemies().count()
    }

    /// Index of a living enemy by id.
    pub fn find_enemy(&self, id: &str) -> Option<usize> {
        self.enemies
            .iter()
            .position(|e| e.id == id && e.is_alive())
    }

    /// Strongest tier among living enemies; drives the flee penalty.
    pub fn opposing_tier(&self) -> Tier {
        self.alive_enemies()
            .map(|e| e.tier)
            .max()
            .unwrap_or(Tier::Common)
    }
}
