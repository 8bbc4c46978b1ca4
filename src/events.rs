//! Structured outcome events.
//!
//! The engine reports what happened as data, never prose. Turning events
//! into user-facing narrative text is the presentation layer's job, which
//! keeps the core decoupled from theming and localization.

use serde::{Deserialize, Serialize};

use crate::combat::types::Resolution;
use crate::effects::EffectKind;
use crate::items::Item;

/// One resolved step of combat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CombatEvent {
    /// An attack landed. `rolls` carries the individual die values.
    DamageDealt {
        attacker: String,
        target: String,
        amount: u32,
        rolls: Vec<u32>,
        critical: bool,
    },
    /// Damage was fully negated (e.g. an unexamined immune enemy).
    AttackBlocked { target: String },
    EnemyDefeated {
        enemy_id: String,
        xp: u64,
        gold: u64,
        loot: Option<Item>,
    },
    HeroDamaged { source: String, amount: u32 },
    StatusInflicted {
        target: String,
        kind: EffectKind,
        duration: u32,
    },
    StatusExpired { target: String, kind: EffectKind },
    Defended { combatant: String },
    TurnSkipped { combatant: String },
    FleeAttempted { success: bool },
    /// A declarative special-ability hook fired.
    AbilityTriggered { enemy_id: String, ability: String },
    EnemyRevived { enemy_id: String, health: u32 },
    WeaknessRevealed {
        enemy_id: String,
        weakness: Option<String>,
    },
    ItemStolen { enemy_id: String, item_id: String },
    ItemUsed { item_id: String },
    HeroRevived { health: u32 },
    CombatEnded { resolution: Resolution },
}

/// Progression changes produced from combat outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProgressionEvent {
    XpGained { amount: u64, total: u64 },
    GoldGained { amount: u64, total: u64 },
    LevelUp {
        level: u32,
        max_health: u32,
        max_mana: u32,
    },
    SkillUnlocked { skill_id: String },
    /// A fragment-multiple threshold was crossed; one event per multiple.
    FragmentBonus { fragments: u32, max_health: u32 },
}
