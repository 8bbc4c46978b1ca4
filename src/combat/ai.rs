//! Enemy action selection.
//!
//! Each enemy carries a declarative behavior descriptor; `select_action` is
//! a pure function of the enemy's state, so tests can assert exact action
//! sequences.

use serde::{Deserialize, Serialize};

use crate::combat::types::Enemy;

/// Per-enemy behavior descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Behavior {
    /// Always uses the basic attack.
    BasicAttack,
    /// Uses the special move whenever its cooldown is ready, otherwise
    /// attacks. `cooldown` is the number of rounds between uses.
    SpecialEvery { cooldown: u32 },
}

/// What an enemy chose to do this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyAction {
    Attack,
    Special,
}

/// Chooses this enemy's action. Deterministic given the same enemy state.
pub fn select_action(enemy: &Enemy) -> EnemyAction {
    match enemy.behavior {
        Behavior::BasicAttack => EnemyAction::Attack,
        Behavior::SpecialEvery { .. } => {
            if enemy.cooldown == 0 && enemy.special.is_some() {
                EnemyAction::Special
            } else {
                EnemyAction::Attack
            }
        }
    }
}

/// Advances the behavior clock after the enemy acted.
pub fn after_action(enemy: &mut Enemy, action: EnemyAction) {
    match (enemy.behavior, action) {
        (Behavior::SpecialEvery { cooldown }, EnemyAction::Special) => {
            enemy.cooldown = cooldown;
        }
        (Behavior::SpecialEvery { .. }, EnemyAction::Attack) => {
            enemy.cooldown = enemy.cooldown.saturating_sub(1);
        }
        (Behavior::BasicAttack, _) => {}
    }
}
