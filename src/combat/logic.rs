//! Combat resolution: turn order, the damage pipeline, and ability hooks.
//!
//! One `resolve_action` call resolves one full round: the hero's chosen
//! action on the hero's turn, every enemy's AI-selected action in turn-order
//! position, then the end-of-round status tick. Any validation failure
//! returns before the first mutation, so hero and combat state are never
//! left partially updated.

use rand::Rng;
use tracing::debug;

use crate::combat::ai::{self, EnemyAction};
use crate::combat::hooks::{Ability, Trigger};
use crate::combat::types::{Action, CombatState, CombatantId, Enemy, Resolution, SpecialMove};
use crate::constants::*;
use crate::dice::{self, RollResult};
use crate::dungeon::data::roll_loot;
use crate::effects::{self, EffectKind, StatusEffect};
use crate::error::{EngineError, Result};
use crate::events::CombatEvent;
use crate::hero::Hero;
use crate::items::{ConsumableEffect, Item, Tier};
use crate::skills::{self, Skill};

/// Computes turn order and opens a combat session.
///
/// Combatants are ranked by descending agility; ties break hero-first, then
/// enemy insertion order. The order is stable for the combat's lifetime
/// except for defeat removal and resurrection re-entry.
pub fn start_combat(hero: &Hero, enemies: Vec<Enemy>) -> CombatState {
    let mut ranked: Vec<(CombatantId, u32, usize)> = vec![(CombatantId::Hero, hero.agility, 0)];
    for (index, enemy) in enemies.iter().enumerate() {
        ranked.push((CombatantId::Enemy(index), enemy.agility, index + 1));
    }
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    let turn_order = ranked.into_iter().map(|(id, _, _)| id).collect();
    debug!(enemies = enemies.len(), "combat started");

    CombatState {
        active: true,
        resolution: None,
        enemies,
        turn_order,
        turn_index: 0,
        round: 1,
        hero_defending: false,
        revive_used: false,
    }
}

/// The hero's action, resolved against the current state before anything
/// mutates.
enum PreparedAction {
    Strike {
        target: usize,
        skill: &'static Skill,
        cost: u32,
    },
    Defend,
    Flee,
    Examine { target: usize },
    UseItem { index: usize },
}

/// Resolves one combat round driven by the hero's chosen action.
pub fn resolve_action(
    state: &mut CombatState,
    hero: &mut Hero,
    action: Action,
    rng: &mut impl Rng,
) -> Result<Vec<CombatEvent>> {
    if !state.active {
        return Err(EngineError::IllegalTransition(
            "combat is already resolved".to_string(),
        ));
    }

    let prepared = prepare_action(state, hero, &action)?;

    // Pre-parse every dice expression that can roll this round so a bad
    // notation surfaces before any mutation.
    if let Some(weapon) = &hero.equipped.weapon {
        dice::parse_dice(&weapon.damage_dice)?;
    }
    for enemy in state.alive_enemies() {
        dice::parse_dice(&enemy.damage_dice)?;
    }

    let mut events = Vec::new();
    let mut i = 0;
    while state.active && i < state.turn_order.len() {
        state.turn_index = i;
        match state.turn_order[i] {
            CombatantId::Hero => {
                // The defend flag lasts until the start of the hero's next turn.
                state.hero_defending = false;
                if effects::is_stunned(&hero.status_effects) {
                    events.push(CombatEvent::TurnSkipped {
                        combatant: "hero".to_string(),
                    });
                } else {
                    hero_turn(state, hero, &prepared, rng, &mut events);
                }
            }
            CombatantId::Enemy(index) => {
                if state.enemies[index].is_alive() {
                    enemy_turn(state, hero, index, rng, &mut events);
                }
            }
        }
        purge_defeated(state, &mut i);
        check_victory(state, &mut events);
        i += 1;
    }

    if state.active {
        end_of_round(state, hero, rng, &mut events);
    }

    Ok(events)
}

/// Validates the hero's action without mutating anything.
fn prepare_action(state: &CombatState, hero: &Hero, action: &Action) -> Result<PreparedAction> {
    match action {
        Action::Attack { target } => {
            let target = find_target(state, target)?;
            let skill = skills::get_skill("basic_attack")
                .ok_or_else(|| EngineError::InvalidConfig("missing basic_attack".to_string()))?;
            Ok(PreparedAction::Strike {
                target,
                skill,
                cost: 0,
            })
        }
        Action::UseSkill { skill_id, target } => {
            let skill = skills::get_skill(skill_id)
                .ok_or_else(|| EngineError::InvalidAction(format!("unknown skill {skill_id}")))?;
            if !hero.has_skill(skill_id) {
                return Err(EngineError::InvalidAction(format!(
                    "skill {skill_id} is not unlocked"
                )));
            }
            if let Some(role) = skill.role {
                if role != hero.role {
                    return Err(EngineError::InvalidAction(format!(
                        "skill {skill_id} requires the {} role",
                        role.name()
                    )));
                }
            }
            if skill.revive {
                return Err(EngineError::InvalidAction(format!(
                    "skill {skill_id} triggers on its own"
                )));
            }
            let cost = effective_cost(skill, hero);
            if hero.mana < cost {
                return Err(EngineError::InsufficientResource {
                    skill: skill_id.clone(),
                    cost,
                    available: hero.mana,
                });
            }
            let target = find_target(state, target)?;
            Ok(PreparedAction::Strike {
                target,
                skill,
                cost,
            })
        }
        Action::Defend => Ok(PreparedAction::Defend),
        Action::Flee => Ok(PreparedAction::Flee),
        Action::Examine { target } => Ok(PreparedAction::Examine {
            target: find_target(state, target)?,
        }),
        Action::UseItem { item_id } => {
            let index = hero
                .inventory
                .iter()
                .position(|stack| stack.item.id() == item_id)
                .ok_or_else(|| EngineError::InvalidTarget(item_id.clone()))?;
            if !matches!(hero.inventory[index].item, Item::Consumable(_)) {
                return Err(EngineError::InvalidAction(format!(
                    "{item_id} is not consumable"
                )));
            }
            Ok(PreparedAction::UseItem { index })
        }
    }
}

fn find_target(state: &CombatState, id: &str) -> Result<usize> {
    state
        .find_enemy(id)
        .ok_or_else(|| EngineError::InvalidTarget(id.to_string()))
}

/// Skill cost after cost-reducing status effects.
fn effective_cost(skill: &Skill, hero: &Hero) -> u32 {
    (skill.cost as f64 * effects::cost_modifier(&hero.status_effects)).round() as u32
}

/// Applies the damage pipeline in its fixed order: skill multiplier, then
/// weakness, then status modifiers, then armor, floored at 0 so health
/// never increases from an attack.
pub fn mitigated_damage(
    base: u32,
    skill_multiplier: f64,
    weakness_multiplier: f64,
    status_multiplier: f64,
    armor: u32,
    ignore_armor: bool,
) -> u32 {
    let scaled =
        (base as f64 * skill_multiplier * weakness_multiplier * status_multiplier).floor() as i64;
    let armor = if ignore_armor { 0 } else { armor as i64 };
    (scaled - armor).max(0) as u32
}

fn hero_turn(
    state: &mut CombatState,
    hero: &mut Hero,
    prepared: &PreparedAction,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    match prepared {
        PreparedAction::Strike {
            target,
            skill,
            cost,
        } => hero_strike(state, hero, *target, skill, *cost, rng, events),
        PreparedAction::Defend => {
            state.hero_defending = true;
            events.push(CombatEvent::Defended {
                combatant: "hero".to_string(),
            });
        }
        PreparedAction::Flee => {
            let chance = flee_chance(hero.agility, state.opposing_tier());
            let success = rng.gen::<f64>() < chance;
            events.push(CombatEvent::FleeAttempted { success });
            if success {
                finish(state, Resolution::Escaped, events);
            }
        }
        PreparedAction::Examine { target } => {
            let enemy = &mut state.enemies[*target];
            enemy.examined = true;
            events.push(CombatEvent::WeaknessRevealed {
                enemy_id: enemy.id.clone(),
                weakness: enemy.weakness.clone(),
            });
        }
        PreparedAction::UseItem { index } => {
            use_item(hero, *index, events);
        }
    }
}

/// Flee success chance: base plus an agility bonus, minus a penalty for the
/// strongest opposing tier. High enough agility against common enemies is a
/// guaranteed escape.
pub fn flee_chance(agility: u32, opposing: Tier) -> f64 {
    let penalty = match opposing {
        Tier::Common => 0.0,
        Tier::Uncommon => 0.05,
        Tier::Rare => 0.10,
        Tier::Boss => 0.25,
    };
    (FLEE_BASE_CHANCE + agility as f64 * FLEE_AGILITY_BONUS - penalty)
        .clamp(FLEE_MIN_CHANCE, FLEE_MAX_CHANCE)
}

fn hero_strike(
    state: &mut CombatState,
    hero: &mut Hero,
    target: usize,
    skill: &Skill,
    cost: u32,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    hero.spend_mana(cost);

    // Examine-gated immunity negates the hit entirely.
    let enemy = &state.enemies[target];
    let immune = !enemy.examined
        && enemy
            .hooks
            .iter()
            .any(|h| h.trigger == Trigger::OnDamaged && h.ability == Ability::ImmuneUntilExamined);
    if immune {
        events.push(CombatEvent::AttackBlocked {
            target: enemy.id.clone(),
        });
        return;
    }

    let roll = match &hero.equipped.weapon {
        // Notation was validated before the round started.
        Some(weapon) => dice::parse_dice(&weapon.damage_dice)
            .map(|spec| spec.roll(rng))
            .unwrap_or(RollResult {
                total: UNARMED_DAMAGE,
                rolls: Vec::new(),
            }),
        None => RollResult {
            total: UNARMED_DAMAGE,
            rolls: Vec::new(),
        },
    };

    let mut base = roll.total + hero.might / MIGHT_PER_DAMAGE_BONUS;
    let critical = dice::crit_check(rng);
    if critical {
        base *= CRIT_MULTIPLIER;
    }

    let enemy = &state.enemies[target];
    let weakness_multiplier = if enemy.examined && enemy.weakness.is_some() {
        WEAKNESS_MULTIPLIER
    } else {
        1.0
    };
    let armor = enemy.armor + effects::armor_bonus(&enemy.status_effects);
    let damage = mitigated_damage(
        base,
        skill.multiplier,
        weakness_multiplier,
        effects::damage_modifier(&hero.status_effects),
        armor,
        skill.ignore_armor,
    );
    debug!(skill = skill.id, damage, critical, "hero strike");

    let enemy = &mut state.enemies[target];
    enemy.take_damage(damage);
    events.push(CombatEvent::DamageDealt {
        attacker: "hero".to_string(),
        target: enemy.id.clone(),
        amount: damage,
        rolls: roll.rolls,
        critical,
    });

    if let Some((kind, duration, magnitude)) = skill.inflicts {
        if enemy.is_alive() {
            effects::apply_effect(
                &mut enemy.status_effects,
                StatusEffect::new(kind, duration, magnitude),
            );
            events.push(CombatEvent::StatusInflicted {
                target: enemy.id.clone(),
                kind,
                duration,
            });
        }
    }
    if let Some((kind, duration, magnitude)) = skill.grants {
        effects::apply_effect(
            &mut hero.status_effects,
            StatusEffect::new(kind, duration, magnitude),
        );
        events.push(CombatEvent::StatusInflicted {
            target: "hero".to_string(),
            kind,
            duration,
        });
    }

    if !state.enemies[target].is_alive() {
        defeat_enemy(state, target, rng, events);
    }
}

fn use_item(hero: &mut Hero, index: usize, events: &mut Vec<CombatEvent>) {
    let Item::Consumable(consumable) = hero.inventory[index].item.clone() else {
        return;
    };
    match consumable.effect {
        ConsumableEffect::RestoreHealth(amount) => hero.heal(amount),
        ConsumableEffect::RestoreMana(amount) => hero.restore_mana(amount),
        ConsumableEffect::CureStatus => {
            for kind in [
                EffectKind::Stunned,
                EffectKind::Poisoned,
                EffectKind::Weakened,
            ] {
                effects::remove_effect(&mut hero.status_effects, kind);
            }
        }
        ConsumableEffect::Buff(kind, duration, magnitude) => {
            effects::apply_effect(
                &mut hero.status_effects,
                StatusEffect::new(kind, duration, magnitude),
            );
            events.push(CombatEvent::StatusInflicted {
                target: "hero".to_string(),
                kind,
                duration,
            });
        }
    }
    hero.remove_from_inventory(&consumable.id, 1);
    events.push(CombatEvent::ItemUsed {
        item_id: consumable.id,
    });
}

fn enemy_turn(
    state: &mut CombatState,
    hero: &mut Hero,
    index: usize,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    let mut attacks = 1;

    // Dispatch on-turn-start hooks generically.
    for hook_index in 0..state.enemies[index].hooks.len() {
        let hook = state.enemies[index].hooks[hook_index];
        if hook.trigger != Trigger::OnTurnStart || !hook.is_ready() {
            continue;
        }
        let enemy_id = state.enemies[index].id.clone();
        match hook.ability {
            Ability::MultiAttack => {
                attacks = 2;
                events.push(CombatEvent::AbilityTriggered {
                    enemy_id,
                    ability: hook.ability.name().to_string(),
                });
            }
            Ability::RandomizeStats => {
                state.enemies[index].armor = rng.gen_range(0..=4);
                events.push(CombatEvent::AbilityTriggered {
                    enemy_id,
                    ability: hook.ability.name().to_string(),
                });
            }
            Ability::StealItem => {
                if !hero.inventory.is_empty() {
                    let stolen = rng.gen_range(0..hero.inventory.len());
                    let item_id = hero.inventory[stolen].item.id().to_string();
                    hero.remove_from_inventory(&item_id, 1);
                    state.enemies[index].hooks[hook_index].used = true;
                    events.push(CombatEvent::ItemStolen { enemy_id, item_id });
                }
            }
            Ability::ReviveAlly | Ability::ImmuneUntilExamined => {}
        }
    }

    if effects::is_stunned(&state.enemies[index].status_effects) {
        events.push(CombatEvent::TurnSkipped {
            combatant: state.enemies[index].id.clone(),
        });
        return;
    }

    for _ in 0..attacks {
        if !state.active {
            break;
        }
        let action = ai::select_action(&state.enemies[index]);
        let special = match action {
            EnemyAction::Special => state.enemies[index].special.clone(),
            EnemyAction::Attack => None,
        };
        enemy_strike(state, hero, index, special, rng, events);
        ai::after_action(&mut state.enemies[index], action);
    }
}

fn enemy_strike(
    state: &mut CombatState,
    hero: &mut Hero,
    index: usize,
    special: Option<SpecialMove>,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    let enemy = &state.enemies[index];
    // Notation was validated before the round started.
    let roll = dice::parse_dice(&enemy.damage_dice)
        .map(|spec| spec.roll(rng))
        .unwrap_or(RollResult {
            total: 0,
            rolls: Vec::new(),
        });

    let mut scaled = roll.total as f64 * effects::damage_modifier(&enemy.status_effects);
    if state.hero_defending {
        scaled *= 1.0 - DEFENSE_DAMAGE_REDUCTION;
        state.hero_defending = false;
    }
    let damage = (scaled.floor() as i64 - hero.armor_value() as i64).max(0) as u32;

    hero.take_damage(damage);
    events.push(CombatEvent::HeroDamaged {
        source: state.enemies[index].id.clone(),
        amount: damage,
    });

    if let Some(special) = special {
        effects::apply_effect(
            &mut hero.status_effects,
            StatusEffect::new(special.inflicts, special.duration, special.magnitude),
        );
        events.push(CombatEvent::StatusInflicted {
            target: "hero".to_string(),
            kind: special.inflicts,
            duration: special.duration,
        });
    }

    if hero.health == 0 {
        hero_down(state, hero, events);
    }
}

/// The hero hit 0 health: consume a one-time revive if the hero knows a
/// revive-flagged skill, otherwise resolve to defeat.
fn hero_down(state: &mut CombatState, hero: &mut Hero, events: &mut Vec<CombatEvent>) {
    let has_revive = hero
        .skills
        .iter()
        .any(|id| skills::get_skill(id).is_some_and(|s| s.revive));
    if has_revive && !state.revive_used {
        state.revive_used = true;
        hero.health = ((hero.max_health as f64 * REVIVE_HEALTH_FRACTION) as u32).max(1);
        events.push(CombatEvent::HeroRevived {
            health: hero.health,
        });
        return;
    }
    finish(state, Resolution::Defeat, events);
}

fn defeat_enemy(
    state: &mut CombatState,
    index: usize,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    let enemy = &state.enemies[index];
    let loot = roll_loot(enemy.loot_tier, rng);
    debug!(enemy = %enemy.id, "enemy defeated");
    events.push(CombatEvent::EnemyDefeated {
        enemy_id: enemy.id.clone(),
        xp: enemy.xp_reward,
        gold: enemy.gold_reward,
        loot,
    });

    // On-ally-defeated hooks fire on the surviving enemies.
    for survivor in 0..state.enemies.len() {
        if survivor == index || !state.enemies[survivor].is_alive() {
            continue;
        }
        for hook_index in 0..state.enemies[survivor].hooks.len() {
            let hook = state.enemies[survivor].hooks[hook_index];
            if hook.trigger != Trigger::OnAllyDefeated
                || hook.ability != Ability::ReviveAlly
                || !hook.is_ready()
            {
                continue;
            }
            let Some(fallen) = state.enemies.iter().position(|e| !e.is_alive()) else {
                continue;
            };
            state.enemies[survivor].hooks[hook_index].used = true;
            let health = ((state.enemies[fallen].max_health as f64
                * ALLY_REVIVE_HEALTH_FRACTION) as u32)
                .max(1);
            state.enemies[fallen].health = health;
            // A combatant defeated and revived within the same turn is
            // still in the order; only re-add a missing entry.
            if !state.turn_order.contains(&CombatantId::Enemy(fallen)) {
                state.turn_order.push(CombatantId::Enemy(fallen));
            }
            events.push(CombatEvent::AbilityTriggered {
                enemy_id: state.enemies[survivor].id.clone(),
                ability: Ability::ReviveAlly.name().to_string(),
            });
            events.push(CombatEvent::EnemyRevived {
                enemy_id: state.enemies[fallen].id.clone(),
                health,
            });
        }
    }
}

/// Removes defeated enemies from the turn order, keeping the loop cursor
/// pointed at the same combatant.
fn purge_defeated(state: &mut CombatState, cursor: &mut usize) {
    let mut position = 0;
    while position < state.turn_order.len() {
        if let CombatantId::Enemy(index) = state.turn_order[position] {
            if !state.enemies[index].is_alive() {
                state.turn_order.remove(position);
                if position <= *cursor && *cursor > 0 {
                    *cursor -= 1;
                }
                continue;
            }
        }
        position += 1;
    }
}

fn check_victory(state: &mut CombatState, events: &mut Vec<CombatEvent>) {
    if state.active && state.alive_enemy_count() == 0 {
        finish(state, Resolution::Victory, events);
    }
}

fn finish(state: &mut CombatState, resolution: Resolution, events: &mut Vec<CombatEvent>) {
    state.active = false;
    state.resolution = Some(resolution);
    debug!(?resolution, "combat resolved");
    events.push(CombatEvent::CombatEnded { resolution });
}

/// End-of-round bookkeeping: tick every combatant's status effects once,
/// apply periodic damage, and advance the round counter.
fn end_of_round(
    state: &mut CombatState,
    hero: &mut Hero,
    rng: &mut impl Rng,
    events: &mut Vec<CombatEvent>,
) {
    let outcome = effects::tick_effects(&mut hero.status_effects);
    for kind in outcome.expired {
        events.push(CombatEvent::StatusExpired {
            target: "hero".to_string(),
            kind,
        });
    }
    if outcome.poison_damage > 0 {
        hero.take_damage(outcome.poison_damage);
        events.push(CombatEvent::HeroDamaged {
            source: "poison".to_string(),
            amount: outcome.poison_damage,
        });
        if hero.health == 0 {
            hero_down(state, hero, events);
        }
    }

    for index in 0..state.enemies.len() {
        if !state.enemies[index].is_alive() {
            continue;
        }
        let outcome = effects::tick_effects(&mut state.enemies[index].status_effects);
        for kind in outcome.expired {
            events.push(CombatEvent::StatusExpired {
                target: state.enemies[index].id.clone(),
                kind,
            });
        }
        if outcome.poison_damage > 0 {
            state.enemies[index].take_damage(outcome.poison_damage);
            if !state.enemies[index].is_alive() {
                defeat_enemy(state, index, rng, events);
            }
        }
    }

    let mut cursor = state.turn_order.len();
    purge_defeated(state, &mut cursor);
    check_victory(state, events);

    if state.active {
        state.round += 1;
        state.turn_index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::ai::Behavior;
    use crate::hero::Role;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(99)
    }

    fn enemy(id: &str, agility: u32) -> Enemy {
        Enemy {
            id: id.into(),
            name: id.into(),
            tier: Tier::Common,
            health: 10,
            max_health: 10,
            armor: 0,
            damage_dice: "1d4".into(),
            agility,
            weakness: None,
            examined: false,
            xp_reward: 10,
            gold_reward: 5,
            loot_tier: Tier::Common,
            status_effects: Vec::new(),
            hooks: Vec::new(),
            behavior: Behavior::BasicAttack,
            cooldown: 0,
            special: None,
        }
    }

    #[test]
    fn test_exact_damage_pipeline_order() {
        // base 7, +25% damage boost, armor 2: floor(7 * 1.25) - 2 = 6
        assert_eq!(mitigated_damage(7, 1.0, 1.0, 1.25, 2, false), 6);
    }

    #[test]
    fn test_damage_never_negative() {
        assert_eq!(mitigated_damage(3, 1.0, 1.0, 1.0, 100, false), 0);
    }

    #[test]
    fn test_ignore_armor() {
        assert_eq!(mitigated_damage(7, 1.0, 1.0, 1.0, 100, true), 7);
    }

    #[test]
    fn test_turn_order_by_agility_with_hero_tiebreak() {
        let hero = Hero::new("Vex", Role::Rogue); // agility 14
        let enemies = vec![enemy("slow", 5), enemy("tied", 14), enemy("fast", 20)];
        let state = start_combat(&hero, enemies);
        assert_eq!(
            state.turn_order,
            vec![
                CombatantId::Enemy(2),
                CombatantId::Hero,
                CombatantId::Enemy(1),
                CombatantId::Enemy(0),
            ]
        );
    }

    #[test]
    fn test_turn_order_is_deterministic() {
        let hero = Hero::new("Vex", Role::Rogue);
        let enemies = vec![enemy("a", 9), enemy("b", 9), enemy("c", 12)];
        let first = start_combat(&hero, enemies.clone());
        let second = start_combat(&hero, enemies);
        assert_eq!(first.turn_order, second.turn_order);
        // Equal-agility enemies keep insertion order
        assert_eq!(
            first.turn_order,
            vec![
                CombatantId::Hero,
                CombatantId::Enemy(2),
                CombatantId::Enemy(0),
                CombatantId::Enemy(1),
            ]
        );
    }

    #[test]
    fn test_resolved_combat_rejects_actions() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut state = start_combat(&hero, vec![enemy("rat", 5)]);
        state.active = false;
        state.resolution = Some(Resolution::Victory);
        let result = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng());
        assert!(matches!(result, Err(EngineError::IllegalTransition(_))));
    }

    #[test]
    fn test_invalid_target_leaves_state_unchanged() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut state = start_combat(&hero, vec![enemy("rat", 5)]);
        let hero_before = hero.clone();
        let state_before = state.clone();
        let result = resolve_action(
            &mut state,
            &mut hero,
            Action::Attack {
                target: "ghost".to_string(),
            },
            &mut rng(),
        );
        assert!(matches!(result, Err(EngineError::InvalidTarget(_))));
        assert_eq!(hero, hero_before);
        assert_eq!(state, state_before);
    }

    #[test]
    fn test_insufficient_mana_leaves_state_unchanged() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        hero.mana = 0;
        let mut state = start_combat(&hero, vec![enemy("rat", 5)]);
        let hero_before = hero.clone();
        let result = resolve_action(
            &mut state,
            &mut hero,
            Action::UseSkill {
                skill_id: "power_strike".to_string(),
                target: "rat".to_string(),
            },
            &mut rng(),
        );
        assert!(matches!(
            result,
            Err(EngineError::InsufficientResource { .. })
        ));
        assert_eq!(hero, hero_before);
    }

    #[test]
    fn test_flee_chance_table() {
        assert!((flee_chance(25, Tier::Common) - 1.0).abs() < 1e-9);
        assert!((flee_chance(10, Tier::Common) - 0.7).abs() < 1e-9);
        assert!((flee_chance(10, Tier::Boss) - 0.45).abs() < 1e-9);
        assert_eq!(flee_chance(0, Tier::Boss), 0.25);
    }

    #[test]
    fn test_guaranteed_flee_resolves_escaped() {
        let mut hero = Hero::new("Vex", Role::Rogue);
        hero.agility = 25;
        let mut state = start_combat(&hero, vec![enemy("rat", 5)]);
        let events = resolve_action(&mut state, &mut hero, Action::Flee, &mut rng()).unwrap();
        assert_eq!(state.resolution, Some(Resolution::Escaped));
        assert!(!state.active);
        assert!(events.contains(&CombatEvent::FleeAttempted { success: true }));
    }

    #[test]
    fn test_victory_when_last_enemy_falls() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let _ = hero.equip_weapon(crate::items::Weapon {
            id: "greatsword".into(),
            name: "Greatsword".into(),
            tier: Tier::Rare,
            damage_dice: "10d10".into(),
        });
        let mut weak = enemy("rat", 5);
        weak.health = 1;
        let mut state = start_combat(&hero, vec![weak]);
        let events = resolve_action(
            &mut state,
            &mut hero,
            Action::Attack {
                target: "rat".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert_eq!(state.resolution, Some(Resolution::Victory));
        assert!(state.turn_order.iter().all(|c| *c == CombatantId::Hero));
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::EnemyDefeated { .. })));
    }

    #[test]
    fn test_defend_halves_next_hit() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut brute = enemy("brute", 5);
        brute.damage_dice = "1d1+9".into(); // always 10
        let mut state = start_combat(&hero, vec![brute]);
        let health_before = hero.health;
        resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        // 10 * 0.5 = 5 damage taken instead of 10
        assert_eq!(health_before - hero.health, 5);
        assert!(!state.hero_defending);
    }

    #[test]
    fn test_immune_enemy_blocks_damage_until_examined() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut sentinel = enemy("sentinel", 1);
        sentinel.health = 30;
        sentinel.max_health = 30;
        sentinel.weakness = Some("light".to_string());
        sentinel.hooks.push(crate::combat::hooks::AbilityHook::new(
            Trigger::OnDamaged,
            Ability::ImmuneUntilExamined,
        ));
        let mut state = start_combat(&hero, vec![sentinel]);

        let events = resolve_action(
            &mut state,
            &mut hero,
            Action::Attack {
                target: "sentinel".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::AttackBlocked { .. })));
        assert_eq!(state.enemies[0].health, 30);

        resolve_action(
            &mut state,
            &mut hero,
            Action::Examine {
                target: "sentinel".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert!(state.enemies[0].examined);

        resolve_action(
            &mut state,
            &mut hero,
            Action::Attack {
                target: "sentinel".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert!(state.enemies[0].health < 30);
    }

    #[test]
    fn test_revive_hook_brings_ally_back_once() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let _ = hero.equip_weapon(crate::items::Weapon {
            id: "greatsword".into(),
            name: "Greatsword".into(),
            tier: Tier::Rare,
            damage_dice: "10d10".into(),
        });
        let mut minion = enemy("minion", 20);
        minion.health = 1;
        let mut necromancer = enemy("necromancer", 1);
        necromancer.health = 200;
        necromancer.max_health = 200;
        necromancer.armor = 100; // survives the round
        necromancer.hooks.push(crate::combat::hooks::AbilityHook::once(
            Trigger::OnAllyDefeated,
            Ability::ReviveAlly,
        ));
        let mut state = start_combat(&hero, vec![minion, necromancer]);

        let events = resolve_action(
            &mut state,
            &mut hero,
            Action::Attack {
                target: "minion".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::EnemyRevived { .. })));
        assert!(state.enemies[0].is_alive());
        assert_eq!(state.enemies[0].health, 5);

        // The hook is spent: killing the minion again stays dead
        let events = resolve_action(
            &mut state,
            &mut hero,
            Action::Attack {
                target: "minion".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert!(!events
            .iter()
            .any(|e| matches!(e, CombatEvent::EnemyRevived { .. })));
        assert!(!state.enemies[0].is_alive());
    }

    #[test]
    fn test_cleric_revive_consumed_once() {
        let mut hero = Hero::new("Lumen", Role::Cleric);
        hero.health = 1;
        let mut brute = enemy("brute", 20);
        brute.damage_dice = "1d1+99".into(); // always 100
        let mut state = start_combat(&hero, vec![brute]);

        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::HeroRevived { .. })));
        assert!(state.active);
        assert!(hero.health > 0);

        // Second lethal hit has no revive left
        hero.health = 1;
        resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert_eq!(state.resolution, Some(Resolution::Defeat));
    }

    #[test]
    fn test_revive_comes_from_the_skill_not_the_role() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        hero.skills.push("divine_grace".to_string());
        hero.health = 1;
        let mut brute = enemy("brute", 20);
        brute.damage_dice = "1d1+99".into();
        let mut state = start_combat(&hero, vec![brute]);

        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::HeroRevived { .. })));
        assert!(state.active);

        // A warrior without the skill just goes down
        let mut plain = Hero::new("Borin", Role::Warrior);
        plain.health = 1;
        let mut brute = enemy("brute", 20);
        brute.damage_dice = "1d1+99".into();
        let mut state = start_combat(&plain, vec![brute]);
        resolve_action(&mut state, &mut plain, Action::Defend, &mut rng()).unwrap();
        assert_eq!(state.resolution, Some(Resolution::Defeat));
    }

    #[test]
    fn test_revive_skill_cannot_be_cast() {
        let mut hero = Hero::new("Lumen", Role::Cleric);
        let mut state = start_combat(&hero, vec![enemy("rat", 5)]);
        let err = resolve_action(
            &mut state,
            &mut hero,
            Action::UseSkill {
                skill_id: "divine_grace".to_string(),
                target: "rat".to_string(),
            },
            &mut rng(),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAction(_)));
    }

    #[test]
    fn test_stun_from_a_slower_attacker_gates_the_next_round() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut wyrm = enemy("wyrm", 1);
        wyrm.health = 100;
        wyrm.max_health = 100;
        wyrm.damage_dice = "1d1".into();
        wyrm.behavior = Behavior::SpecialEvery { cooldown: 9 };
        wyrm.special = Some(SpecialMove {
            name: "Tail Sweep".into(),
            inflicts: EffectKind::Stunned,
            duration: 1,
            magnitude: 0,
        });
        let mut state = start_combat(&hero, vec![wyrm]);

        // Round 1: the wyrm acts after the hero and lands its stun; the
        // round tick arms it instead of expiring it
        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(events.iter().any(|e| matches!(
            e,
            CombatEvent::StatusInflicted {
                kind: EffectKind::Stunned,
                ..
            }
        )));
        assert!(hero
            .status_effects
            .iter()
            .any(|e| e.kind == EffectKind::Stunned));

        // Round 2: the hero is gated
        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(events.iter().any(
            |e| matches!(e, CombatEvent::TurnSkipped { combatant } if combatant == "hero")
        ));

        // Round 3: the stun has run out
        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(!events.iter().any(
            |e| matches!(e, CombatEvent::TurnSkipped { combatant } if combatant == "hero")
        ));
        assert!(hero.status_effects.is_empty());
    }

    #[test]
    fn test_stun_gates_an_enemy_faster_than_the_caster() {
        let mut hero = Hero::new("Mira", Role::Mage);
        hero.skills.push("stasis_field".to_string());
        let mut blur = enemy("blur", 20);
        blur.health = 80;
        blur.max_health = 80;
        let mut state = start_combat(&hero, vec![blur]);

        // The blur has already acted this round when the stun lands
        let events = resolve_action(
            &mut state,
            &mut hero,
            Action::UseSkill {
                skill_id: "stasis_field".to_string(),
                target: "blur".to_string(),
            },
            &mut rng(),
        )
        .unwrap();
        assert!(!events.iter().any(
            |e| matches!(e, CombatEvent::TurnSkipped { combatant } if combatant == "blur")
        ));

        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(events.iter().any(
            |e| matches!(e, CombatEvent::TurnSkipped { combatant } if combatant == "blur")
        ));
    }

    #[test]
    fn test_stunned_enemy_skips_turn() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut rat = enemy("rat", 20);
        rat.status_effects
            .push(StatusEffect::new(EffectKind::Stunned, 1, 0));
        let mut state = start_combat(&hero, vec![rat]);
        let health_before = hero.health;
        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert_eq!(hero.health, health_before);
        assert!(events.iter().any(
            |e| matches!(e, CombatEvent::TurnSkipped { combatant } if combatant == "rat")
        ));
    }

    #[test]
    fn test_resources_stay_in_bounds_over_many_rounds() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut state = start_combat(&hero, vec![enemy("rat", 5), enemy("bat", 15)]);
        let mut rng = rng();
        for _ in 0..30 {
            if !state.active {
                break;
            }
            let target = state
                .alive_enemies()
                .next()
                .map(|e| e.id.clone())
                .unwrap_or_default();
            resolve_action(&mut state, &mut hero, Action::Attack { target }, &mut rng).ok();
            assert!(hero.health <= hero.max_health);
            assert!(hero.mana <= hero.max_mana);
            for enemy in &state.enemies {
                assert!(enemy.health <= enemy.max_health);
            }
        }
    }

    #[test]
    fn test_multi_attack_hits_twice() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        let mut spider = enemy("spider", 5);
        spider.damage_dice = "1d1".into(); // always 1
        spider.hooks.push(crate::combat::hooks::AbilityHook::new(
            Trigger::OnTurnStart,
            Ability::MultiAttack,
        ));
        let mut state = start_combat(&hero, vec![spider]);
        let health_before = hero.health;
        resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        // Two hits: the first halved by defend (1 -> 0), the second full
        assert_eq!(health_before - hero.health, 1);
    }

    #[test]
    fn test_steal_item_hook_takes_from_inventory() {
        let mut hero = Hero::new("Aldric", Role::Warrior);
        hero.add_to_inventory(
            Item::Consumable(crate::items::Consumable {
                id: "hp_potion".into(),
                name: "Health Potion".into(),
                tier: Tier::Common,
                effect: ConsumableEffect::RestoreHealth(20),
            }),
            1,
        );
        let mut thief = enemy("thief", 20);
        thief
            .hooks
            .push(crate::combat::hooks::AbilityHook::once(
                Trigger::OnTurnStart,
                Ability::StealItem,
            ));
        let mut state = start_combat(&hero, vec![thief]);
        let events = resolve_action(&mut state, &mut hero, Action::Defend, &mut rng()).unwrap();
        assert!(hero.inventory.is_empty());
        assert!(events
            .iter()
            .any(|e| matches!(e, CombatEvent::ItemStolen { .. })));
    }
}
