//! Combat system: types, special-ability hooks, enemy AI, and resolution.

pub mod ai;
pub mod hooks;
pub mod logic;
pub mod types;

pub use logic::{mitigated_damage, resolve_action, start_combat};
pub use types::{Action, CombatState, CombatantId, Enemy, Resolution};
