//! Delve - Turn-Based Dungeon RPG Engine
//!
//! A deterministic rules engine for a turn-based dungeon crawler: dice,
//! status effects, combat resolution, enemy behavior, seeded room
//! generation, and character progression. The engine holds no global
//! state and produces structured events instead of prose, so any
//! front end can drive it.

pub mod combat;
pub mod constants;
pub mod dice;
pub mod dungeon;
pub mod effects;
pub mod error;
pub mod events;
pub mod game;
pub mod hero;
pub mod items;
pub mod progression;
pub mod skills;

pub use combat::{resolve_action, start_combat, Action, CombatState, Resolution};
pub use error::{EngineError, Result};
pub use events::{CombatEvent, ProgressionEvent};
pub use game::{GameState, TurnOutcome};
pub use hero::{Hero, Role};
