//! Status effect tracking: application, round ticks, and expiry.
//!
//! Effects live on the combatant they afflict. At most one active instance
//! of a non-stackable kind may exist at a time; applying a duplicate
//! refreshes its duration and keeps the larger magnitude.

use serde::{Deserialize, Serialize};

/// Kinds of timed afflictions and buffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Skips the afflicted combatant's next actions.
    Stunned,
    /// Damage over time; magnitude is damage per round tick. Stackable.
    Poisoned,
    /// Boosts outgoing damage; magnitude is the percent bonus (25 = +25%).
    Empowered,
    /// Reduces outgoing damage; magnitude is the percent penalty (50 = -50%).
    Weakened,
    /// Bonus armor; magnitude is the flat armor added.
    Shielded,
    /// Reduces skill costs; magnitude is the percent discount (50 = half cost).
    Focused,
}

impl EffectKind {
    pub fn name(&self) -> &'static str {
        match self {
            EffectKind::Stunned => "Stunned",
            EffectKind::Poisoned => "Poisoned",
            EffectKind::Empowered => "Empowered",
            EffectKind::Weakened => "Weakened",
            EffectKind::Shielded => "Shielded",
            EffectKind::Focused => "Focused",
        }
    }

    /// Whether multiple instances of this kind may be active at once.
    pub fn stackable(&self) -> bool {
        matches!(self, EffectKind::Poisoned)
    }
}

/// An active status effect on a combatant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffect {
    pub kind: EffectKind,
    /// Rounds remaining before expiry.
    pub duration: u32,
    pub magnitude: u32,
    /// Applied mid-round and not yet armed: the coming round tick arms the
    /// effect instead of counting it down, so an affliction spans its
    /// victim's next turn no matter where the attacker sits in turn order.
    #[serde(default)]
    pub pending: bool,
}

impl StatusEffect {
    pub fn new(kind: EffectKind, duration: u32, magnitude: u32) -> Self {
        Self {
            kind,
            duration,
            magnitude,
            pending: false,
        }
    }
}

/// What happened to a combatant during a round tick.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickOutcome {
    /// Total poison damage to subtract from the combatant's health.
    pub poison_damage: u32,
    /// Effects that expired this tick.
    pub expired: Vec<EffectKind>,
}

/// Inserts a new effect, or refreshes an existing non-stackable instance of
/// the same kind: duration is reset to the new value, magnitude keeps the
/// maximum of old and new. The effect starts pending and arms at the next
/// round tick. Zero-duration effects are discarded.
pub fn apply_effect(effects: &mut Vec<StatusEffect>, new: StatusEffect) {
    if new.duration == 0 {
        return;
    }
    let mut new = new;
    new.pending = true;
    if !new.kind.stackable() {
        if let Some(existing) = effects.iter_mut().find(|e| e.kind == new.kind) {
            existing.duration = new.duration;
            existing.magnitude = existing.magnitude.max(new.magnitude);
            existing.pending = true;
            return;
        }
    }
    effects.push(new);
}

/// Removes every instance of a kind. Returns whether anything was removed.
pub fn remove_effect(effects: &mut Vec<StatusEffect>, kind: EffectKind) -> bool {
    let before = effects.len();
    effects.retain(|e| e.kind != kind);
    effects.len() != before
}

/// End-of-round tick: arms effects applied during the round, and for every
/// armed effect decrements the duration by exactly 1, drops it at 0, and
/// accumulates periodic behavior (poison damage). Calling this once per
/// round never produces negative durations.
pub fn tick_effects(effects: &mut Vec<StatusEffect>) -> TickOutcome {
    let mut outcome = TickOutcome::default();
    for effect in effects.iter_mut() {
        if effect.pending {
            effect.pending = false;
            continue;
        }
        if effect.kind == EffectKind::Poisoned {
            outcome.poison_damage += effect.magnitude;
        }
        effect.duration = effect.duration.saturating_sub(1);
        if effect.duration == 0 {
            outcome.expired.push(effect.kind);
        }
    }
    effects.retain(|e| e.duration > 0);
    outcome
}

/// Whether a turn-skip condition is active. Pending stuns do not gate yet;
/// they arm at the round tick.
pub fn is_stunned(effects: &[StatusEffect]) -> bool {
    effects
        .iter()
        .any(|e| e.kind == EffectKind::Stunned && !e.pending)
}

/// Multiplicative outgoing-damage modifier from active effects.
pub fn damage_modifier(effects: &[StatusEffect]) -> f64 {
    let mut modifier = 1.0;
    for effect in effects {
        match effect.kind {
            EffectKind::Empowered => modifier *= 1.0 + effect.magnitude as f64 / 100.0,
            EffectKind::Weakened => modifier *= 1.0 - effect.magnitude as f64 / 100.0,
            _ => {}
        }
    }
    modifier
}

/// Flat armor bonus from active effects.
pub fn armor_bonus(effects: &[StatusEffect]) -> u32 {
    effects
        .iter()
        .filter(|e| e.kind == EffectKind::Shielded)
        .map(|e| e.magnitude)
        .sum()
}

/// Multiplicative skill-cost modifier from active effects.
pub fn cost_modifier(effects: &[StatusEffect]) -> f64 {
    let mut modifier = 1.0;
    for effect in effects {
        if effect.kind == EffectKind::Focused {
            modifier *= 1.0 - effect.magnitude as f64 / 100.0;
        }
    }
    modifier
}
