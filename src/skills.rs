//! Class skill definitions.
//!
//! Skills are static data: the combat engine looks them up by id and applies
//! cost, multiplier, and effect fields uniformly. Adding a skill means
//! adding a table entry, not a code path.

use crate::effects::EffectKind;
use crate::hero::Role;

/// A declarative skill description.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Skill {
    pub id: &'static str,
    pub name: &'static str,
    /// None means usable by every role (basic attack).
    pub role: Option<Role>,
    pub min_level: u32,
    /// Mana cost before any cost-reducing effects.
    pub cost: u32,
    /// Damage multiplier applied before weakness and status modifiers.
    pub multiplier: f64,
    pub ignore_armor: bool,
    /// Effect inflicted on the target: (kind, duration, magnitude).
    pub inflicts: Option<(EffectKind, u32, u32)>,
    /// Effect granted to the caster: (kind, duration, magnitude).
    pub grants: Option<(EffectKind, u32, u32)>,
    /// One-time self-revive when health hits 0. Triggers on its own; the
    /// skill cannot be cast as an action.
    pub revive: bool,
}

pub const SKILLS: &[Skill] = &[
    Skill {
        id: "basic_attack",
        name: "Basic Attack",
        role: None,
        min_level: 1,
        cost: 0,
        multiplier: 1.0,
        ignore_armor: false,
        inflicts: None,
        grants: None,
        revive: false,
    },
    // Warrior
    Skill {
        id: "power_strike",
        name: "Power Strike",
        role: Some(Role::Warrior),
        min_level: 1,
        cost: 10,
        multiplier: 1.5,
        ignore_armor: false,
        inflicts: None,
        grants: None,
        revive: false,
    },
    Skill {
        id: "crushing_blow",
        name: "Crushing Blow",
        role: Some(Role::Warrior),
        min_level: 5,
        cost: 20,
        multiplier: 2.0,
        ignore_armor: true,
        inflicts: None,
        grants: None,
        revive: false,
    },
    // Mage
    Skill {
        id: "firebolt",
        name: "Firebolt",
        role: Some(Role::Mage),
        min_level: 1,
        cost: 8,
        multiplier: 1.5,
        ignore_armor: false,
        inflicts: None,
        grants: None,
        revive: false,
    },
    Skill {
        id: "stasis_field",
        name: "Stasis Field",
        role: Some(Role::Mage),
        min_level: 5,
        cost: 15,
        multiplier: 1.0,
        ignore_armor: false,
        inflicts: Some((EffectKind::Stunned, 1, 0)),
        grants: None,
        revive: false,
    },
    // Rogue
    Skill {
        id: "backstab",
        name: "Backstab",
        role: Some(Role::Rogue),
        min_level: 1,
        cost: 8,
        multiplier: 1.5,
        ignore_armor: false,
        inflicts: None,
        grants: None,
        revive: false,
    },
    Skill {
        id: "poison_blade",
        name: "Poison Blade",
        role: Some(Role::Rogue),
        min_level: 5,
        cost: 12,
        multiplier: 1.0,
        ignore_armor: false,
        inflicts: Some((EffectKind::Poisoned, 3, 2)),
        grants: None,
        revive: false,
    },
    // Cleric
    Skill {
        id: "divine_grace",
        name: "Divine Grace",
        role: Some(Role::Cleric),
        min_level: 1,
        cost: 0,
        multiplier: 0.0,
        ignore_armor: false,
        inflicts: None,
        grants: None,
        revive: true,
    },
    Skill {
        id: "smite",
        name: "Smite",
        role: Some(Role::Cleric),
        min_level: 1,
        cost: 8,
        multiplier: 1.25,
        ignore_armor: false,
        inflicts: None,
        grants: None,
        revive: false,
    },
    Skill {
        id: "blessed_guard",
        name: "Blessed Guard",
        role: Some(Role::Cleric),
        min_level: 5,
        cost: 10,
        multiplier: 1.0,
        ignore_armor: false,
        inflicts: None,
        grants: Some((EffectKind::Shielded, 3, 3)),
        revive: false,
    },
];

/// Looks up a skill by id.
pub fn get_skill(id: &str) -> Option<&'static Skill> {
    SKILLS.iter().find(|s| s.id == id)
}

/// The skill a role unlocks at exactly this level, if any.
pub fn skill_unlocked_at(role: Role, level: u32) -> Option<&'static Skill> {
    SKILLS
        .iter()
        .find(|s| s.role == Some(role) && s.min_level == level && level > 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_skill() {
        assert_eq!(get_skill("basic_attack").unwrap().cost, 0);
        assert_eq!(get_skill("power_strike").unwrap().multiplier, 1.5);
        assert!(get_skill("nonexistent").is_none());
    }

    #[test]
    fn test_skill_unlocked_at_level_five() {
        let skill = skill_unlocked_at(Role::Warrior, 5).unwrap();
        assert_eq!(skill.id, "crushing_blow");
        assert!(skill_unlocked_at(Role::Warrior, 4).is_none());
        // Level 1 skills are starting skills, not unlocks
        assert!(skill_unlocked_at(Role::Warrior, 1).is_none());
    }

    #[test]
    fn test_divine_grace_is_the_only_revive() {
        let revivers: Vec<_> = SKILLS.iter().filter(|s| s.revive).collect();
        assert_eq!(revivers.len(), 1);
        assert_eq!(revivers[0].id, "divine_grace");
        assert_eq!(revivers[0].role, Some(Role::Cleric));
        assert_eq!(revivers[0].min_level, 1);
    }

    #[test]
    fn test_every_role_has_an_unlock_track() {
        for role in [Role::Warrior, Role::Mage, Role::Rogue, Role::Cleric] {
            assert!(skill_unlocked_at(role, 5).is_some());
        }
    }
}
