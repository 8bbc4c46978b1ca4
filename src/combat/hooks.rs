//! Declarative enemy special abilities.
//!
//! Abilities are hook bindings keyed by trigger event, dispatched generically
//! by the combat engine. Adding a monster behavior means registering a new
//! hook on its template, not adding a branch to the engine.

use serde::{Deserialize, Serialize};

/// When a hook fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Trigger {
    OnTurnStart,
    OnDamaged,
    OnAllyDefeated,
}

/// What a hook does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    /// Acts twice on its turn.
    MultiAttack,
    /// Re-rolls armor at the start of each turn.
    RandomizeStats,
    /// Takes a random item from the hero's inventory.
    StealItem,
    /// Brings a defeated ally back at partial health.
    ReviveAlly,
    /// Takes no damage until the hero examines it.
    ImmuneUntilExamined,
}

impl Ability {
    pub fn name(&self) -> &'static str {
        match self {
            Ability::MultiAttack => "multi_attack",
            Ability::RandomizeStats => "randomize_stats",
            Ability::StealItem => "steal_item",
            Ability::ReviveAlly => "revive_ally",
            Ability::ImmuneUntilExamined => "immune_until_examined",
        }
    }
}

/// A trigger/ability binding carried by an enemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityHook {
    pub trigger: Trigger,
    pub ability: Ability,
    /// Fires at most once per combat when set.
    pub once: bool,
    pub used: bool,
}

impl AbilityHook {
    pub fn new(trigger: Trigger, ability: Ability) -> Self {
        Self {
            trigger,
            ability,
            once: false,
            used: false,
        }
    }

    pub fn once(trigger: Trigger, ability: Ability) -> Self {
        Self {
            trigger,
            ability,
            once: true,
            used: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        !self.once || !self.used
    }
}
