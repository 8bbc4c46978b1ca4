//! Experience, leveling, stat growth, and fragment bonuses.
//!
//! `xp` on the hero tracks progress toward the next level; each level-up
//! consumes the requirement for the level reached. All changes are reported
//! as structured progression events.

use tracing::{debug, info};

use crate::constants::{FRAGMENT_BONUS_THRESHOLD, LEVEL_UP_RESTORE_FRACTION, XP_CURVE_BASE, XP_CURVE_EXPONENT};
use crate::events::{CombatEvent, ProgressionEvent};
use crate::hero::{Hero, Role};
use crate::skills;

/// XP required to advance into a level. Strictly increasing in `level`.
pub fn xp_required_for_level(level: u32) -> u64 {
    (XP_CURVE_BASE * (level as f64).powf(XP_CURVE_EXPONENT)) as u64
}

/// Per-level stat growth as (might, insight, agility, resilience).
fn level_growth(role: Role) -> (u32, u32, u32, u32) {
    match role {
        Role::Warrior => (2, 0, 0, 1),
        Role::Mage => (0, 2, 1, 0),
        Role::Rogue => (1, 0, 2, 0),
        Role::Cleric => (0, 1, 0, 2),
    }
}

/// Applies the rewards from a finished combat to the hero: xp, gold, and
/// any level-ups they trigger.
pub fn apply_outcome(hero: &mut Hero, events: &[CombatEvent]) -> Vec<ProgressionEvent> {
    let mut xp = 0u64;
    let mut gold = 0u64;
    for event in events {
        if let CombatEvent::EnemyDefeated {
            xp: e_xp,
            gold: e_gold,
            ..
        } = event
        {
            xp += e_xp;
            gold += e_gold;
        }
    }

    let mut out = Vec::new();
    if gold > 0 {
        hero.gold += gold;
        out.push(ProgressionEvent::GoldGained {
            amount: gold,
            total: hero.gold,
        });
    }
    if xp > 0 {
        out.extend(add_experience(hero, xp));
    }
    out
}

/// Adds experience and resolves every level-up it triggers.
pub fn add_experience(hero: &mut Hero, amount: u64) -> Vec<ProgressionEvent> {
    hero.xp += amount;
    let mut events = vec![ProgressionEvent::XpGained {
        amount,
        total: hero.xp,
    }];

    while hero.xp >= xp_required_for_level(hero.level + 1) {
        hero.xp -= xp_required_for_level(hero.level + 1);
        hero.level += 1;

        let (might, insight, agility, resilience) = level_growth(hero.role);
        hero.might += might;
        hero.insight += insight;
        hero.agility += agility;
        hero.resilience += resilience;
        hero.recalculate_pools();

        // Partial restore on level-up; stays capped at the new max
        hero.heal((hero.max_health as f64 * LEVEL_UP_RESTORE_FRACTION) as u32);
        hero.restore_mana((hero.max_mana as f64 * LEVEL_UP_RESTORE_FRACTION) as u32);

        info!(level = hero.level, "level up");
        events.push(ProgressionEvent::LevelUp {
            level: hero.level,
            max_health: hero.max_health,
            max_mana: hero.max_mana,
        });

        if let Some(skill) = skills::skill_unlocked_at(hero.role, hero.level) {
            if !hero.has_skill(skill.id) {
                hero.skills.push(skill.id.to_string());
                events.push(ProgressionEvent::SkillUnlocked {
                    skill_id: skill.id.to_string(),
                });
            }
        }
    }
    events
}

/// Adds fragments one at a time so every threshold multiple crossed in a
/// batch grants its bonus exactly once.
pub fn add_fragments(hero: &mut Hero, count: u32) -> Vec<ProgressionEvent> {
    let mut events = Vec::new();
    for _ in 0..count {
        hero.fragments += 1;
        if hero.fragments % FRAGMENT_BONUS_THRESHOLD == 0 {
            hero.recalculate_pools();
            debug!(fragments = hero.fragments, "fragment bonus");
            events.push(ProgressionEvent::FragmentBonus {
                fragments: hero.fragments,
                max_health: hero.max_health,
            });
        }
    }
    events
}
