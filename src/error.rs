//! Engine error types.
//!
//! Every fallible engine operation returns one of these. All variants except
//! `InvalidConfig` are recoverable: a failed call leaves hero, room, and
//! combat state untouched so the caller can retry or report.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Malformed dice notation (e.g. "abc", "0d6", "2d0").
    #[error("invalid dice notation: {0}")]
    ParseError(String),

    /// Action references a combatant or item not present in the current
    /// room or combat.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// Skill cost exceeds the actor's current resource pool.
    #[error("insufficient resources: {skill} costs {cost}, {available} available")]
    InsufficientResource {
        skill: String,
        cost: u32,
        available: u32,
    },

    /// Action is illegal in the current engine state (e.g. attacking while
    /// not in combat).
    #[error("invalid action: {0}")]
    InvalidAction(String),

    /// Attempted combat-state transition violates the state machine
    /// (e.g. resolving a turn on a resolved combat).
    #[error("illegal state transition: {0}")]
    IllegalTransition(String),

    /// Malformed generator configuration, detected by startup validation.
    /// Not recoverable per-call.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;
