//! Static enemy and item tables, bracketed by tier.
//!
//! Everything generation spawns comes from these tables. `validate_tables`
//! runs the whole set through the dice parser and bracket checks once at
//! startup so malformed entries fail loudly instead of mid-fight.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::combat::ai::Behavior;
use crate::combat::hooks::{Ability, AbilityHook, Trigger};
use crate::combat::types::{Enemy, SpecialMove};
use crate::constants::{BOSS_HP_DEPTH_SCALING, ENEMY_HP_DEPTH_SCALING};
use crate::dice;
use crate::effects::EffectKind;
use crate::error::{EngineError, Result};
use crate::items::{Armor, Consumable, ConsumableEffect, Item, Tier, Weapon};

/// Blueprint an `Enemy` is stamped from. Health scales with depth at spawn
/// time; the template itself never changes.
#[derive(Debug, Clone)]
pub struct EnemyTemplate {
    pub id: &'static str,
    pub name: &'static str,
    pub tier: Tier,
    pub health: u32,
    pub armor: u32,
    pub damage_dice: &'static str,
    pub agility: u32,
    pub weakness: Option<&'static str>,
    pub xp_reward: u64,
    pub gold_reward: u64,
    pub hooks: Vec<AbilityHook>,
    pub behavior: Behavior,
    pub special: Option<SpecialTemplate>,
}

#[derive(Debug, Clone, Copy)]
pub struct SpecialTemplate {
    pub name: &'static str,
    pub inflicts: EffectKind,
    pub duration: u32,
    pub magnitude: u32,
}

/// Blueprint for a droppable item.
#[derive(Debug, Clone)]
pub struct ItemTemplate {
    pub tier: Tier,
    pub drop_rate: f64,
    pub kind: ItemKind,
}

#[derive(Debug, Clone)]
pub enum ItemKind {
    Weapon {
        id: &'static str,
        name: &'static str,
        damage_dice: &'static str,
    },
    Armor {
        id: &'static str,
        name: &'static str,
        protection: u32,
    },
    Consumable {
        id: &'static str,
        name: &'static str,
        effect: ConsumableEffect,
    },
}

impl ItemTemplate {
    /// Stamps a concrete item from the blueprint.
    pub fn build(&self) -> Item {
        match &self.kind {
            ItemKind::Weapon {
                id,
                name,
                damage_dice,
            } => Item::Weapon(Weapon {
                id: (*id).to_string(),
                name: (*name).to_string(),
                tier: self.tier,
                damage_dice: (*damage_dice).to_string(),
            }),
            ItemKind::Armor {
                id,
                name,
                protection,
            } => Item::Armor(Armor {
                id: (*id).to_string(),
                name: (*name).to_string(),
                tier: self.tier,
                protection: *protection,
            }),
            ItemKind::Consumable { id, name, effect } => Item::Consumable(Consumable {
                id: (*id).to_string(),
                name: (*name).to_string(),
                tier: self.tier,
                effect: *effect,
            }),
        }
    }
}

/// Returns the enemy pool for a tier.
pub fn enemy_pool(tier: Tier) -> Vec<EnemyTemplate> {
    match tier {
        Tier::Common => vec![
            EnemyTemplate {
                id: "giant_rat",
                name: "Giant Rat",
                tier: Tier::Common,
                health: 12,
                armor: 0,
                damage_dice: "1d4",
                agility: 12,
                weakness: None,
                xp_reward: 15,
                gold_reward: 5,
                hooks: Vec::new(),
                behavior: Behavior::BasicAttack,
                special: None,
            },
            EnemyTemplate {
                id: "cave_bat",
                name: "Cave Bat",
                tier: Tier::Common,
                health: 8,
                armor: 0,
                damage_dice: "1d3",
                agility: 16,
                weakness: None,
                xp_reward: 12,
                gold_reward: 3,
                hooks: vec![AbilityHook::new(Trigger::OnTurnStart, Ability::MultiAttack)],
                behavior: Behavior::BasicAttack,
                special: None,
            },
            EnemyTemplate {
                id: "rusted_skeleton",
                name: "Rusted Skeleton",
                tier: Tier::Common,
                health: 18,
                armor: 1,
                damage_dice: "1d6",
                agility: 6,
                weakness: Some("smite"),
                xp_reward: 20,
                gold_reward: 8,
                hooks: Vec::new(),
                behavior: Behavior::BasicAttack,
                special: None,
            },
            EnemyTemplate {
                id: "goblin_cutpurse",
                name: "Goblin Cutpurse",
                tier: Tier::Common,
                health: 14,
                armor: 0,
                damage_dice: "1d4+1",
                agility: 14,
                weakness: None,
                xp_reward: 18,
                gold_reward: 12,
                hooks: vec![AbilityHook::once(Trigger::OnTurnStart, Ability::StealItem)],
                behavior: Behavior::BasicAttack,
                special: None,
            },
        ],
        Tier::Uncommon => vec![
            EnemyTemplate {
                id: "pit_adder",
                name: "Pit Adder",
                tier: Tier::Uncommon,
                health: 24,
                armor: 1,
                damage_dice: "1d6+1",
                agility: 13,
                weakness: None,
                xp_reward: 35,
                gold_reward: 15,
                hooks: Vec::new(),
                behavior: Behavior::SpecialEvery { cooldown: 2 },
                special: Some(SpecialTemplate {
                    name: "Venom Spit",
                    inflicts: EffectKind::Poisoned,
                    duration: 3,
                    magnitude: 2,
                }),
            },
            EnemyTemplate {
                id: "door_mimic",
                name: "Door Mimic",
                tier: Tier::Uncommon,
                health: 30,
                armor: 2,
                damage_dice: "2d4",
                agility: 4,
                weakness: Some("backstab"),
                xp_reward: 45,
                gold_reward: 25,
                hooks: vec![AbilityHook::new(Trigger::OnDamaged, Ability::ImmuneUntilExamined)],
                behavior: Behavior::BasicAttack,
                special: None,
            },
            EnemyTemplate {
                id: "chaos_imp",
                name: "Chaos Imp",
                tier: Tier::Uncommon,
                health: 20,
                armor: 1,
                damage_dice: "1d8",
                agility: 15,
                weakness: None,
                xp_reward: 40,
                gold_reward: 18,
                hooks: vec![AbilityHook::new(Trigger::OnTurnStart, Ability::RandomizeStats)],
                behavior: Behavior::BasicAttack,
                special: None,
            },
        ],
        Tier::Rare => vec![
            EnemyTemplate {
                id: "shadow_stalker",
                name: "Shadow Stalker",
                tier: Tier::Rare,
                health: 40,
                armor: 2,
                damage_dice: "2d6",
                agility: 18,
                weakness: Some("firebolt"),
                xp_reward: 80,
                gold_reward: 40,
                hooks: vec![AbilityHook::new(Trigger::OnTurnStart, Ability::MultiAttack)],
                behavior: Behavior::BasicAttack,
                special: None,
            },
            EnemyTemplate {
                id: "bone_priest",
                name: "Bone Priest",
                tier: Tier::Rare,
                health: 35,
                armor: 1,
                damage_dice: "1d10",
                agility: 8,
                weakness: Some("smite"),
                xp_reward: 90,
                gold_reward: 50,
                hooks: vec![AbilityHook::once(Trigger::OnAllyDefeated, Ability::ReviveAlly)],
                behavior: Behavior::SpecialEvery { cooldown: 3 },
                special: Some(SpecialTemplate {
                    name: "Withering Curse",
                    inflicts: EffectKind::Weakened,
                    duration: 2,
                    magnitude: 25,
                }),
            },
            EnemyTemplate {
                id: "stone_wyrmling",
                name: "Stone Wyrmling",
                tier: Tier::Rare,
                health: 50,
                armor: 4,
                damage_dice: "2d6+2",
                agility: 7,
                weakness: None,
                xp_reward: 100,
                gold_reward: 55,
                hooks: Vec::new(),
                behavior: Behavior::SpecialEvery { cooldown: 2 },
                special: Some(SpecialTemplate {
                    name: "Tail Sweep",
                    inflicts: EffectKind::Stunned,
                    duration: 1,
                    magnitude: 0,
                }),
            },
        ],
        Tier::Boss => vec![
            EnemyTemplate {
                id: "rotfang_matriarch",
                name: "Rotfang Matriarch",
                tier: Tier::Boss,
                health: 80,
                armor: 2,
                damage_dice: "2d8",
                agility: 10,
                weakness: Some("firebolt"),
                xp_reward: 250,
                gold_reward: 120,
                hooks: vec![AbilityHook::new(Trigger::OnTurnStart, Ability::MultiAttack)],
                behavior: Behavior::SpecialEvery { cooldown: 3 },
                special: Some(SpecialTemplate {
                    name: "Festering Bite",
                    inflicts: EffectKind::Poisoned,
                    duration: 4,
                    magnitude: 3,
                }),
            },
            EnemyTemplate {
                id: "lich_sentinel",
                name: "Lich Sentinel",
                tier: Tier::Boss,
                health: 120,
                armor: 3,
                damage_dice: "2d10",
                agility: 9,
                weakness: Some("smite"),
                xp_reward: 500,
                gold_reward: 250,
                hooks: vec![
                    AbilityHook::new(Trigger::OnDamaged, Ability::ImmuneUntilExamined),
                    AbilityHook::once(Trigger::OnAllyDefeated, Ability::ReviveAlly),
                ],
                behavior: Behavior::SpecialEvery { cooldown: 2 },
                special: Some(SpecialTemplate {
                    name: "Grave Chill",
                    inflicts: EffectKind::Weakened,
                    duration: 3,
                    magnitude: 30,
                }),
            },
            EnemyTemplate {
                id: "the_devourer",
                name: "The Devourer",
                tier: Tier::Boss,
                health: 180,
                armor: 4,
                damage_dice: "3d8",
                agility: 11,
                weakness: Some("crushing_blow"),
                xp_reward: 1000,
                gold_reward: 500,
                hooks: vec![
                    AbilityHook::new(Trigger::OnTurnStart, Ability::MultiAttack),
                    AbilityHook::new(Trigger::OnTurnStart, Ability::RandomizeStats),
                ],
                behavior: Behavior::SpecialEvery { cooldown: 2 },
                special: Some(SpecialTemplate {
                    name: "Maw of Ruin",
                    inflicts: EffectKind::Stunned,
                    duration: 1,
                    magnitude: 0,
                }),
            },
        ],
    }
}

/// Returns the droppable item pool for a tier.
pub fn item_pool(tier: Tier) -> Vec<ItemTemplate> {
    match tier {
        Tier::Common => vec![
            ItemTemplate {
                tier,
                drop_rate: 0.8,
                kind: ItemKind::Consumable {
                    id: "minor_health_draught",
                    name: "Minor Health Draught",
                    effect: ConsumableEffect::RestoreHealth(20),
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.6,
                kind: ItemKind::Consumable {
                    id: "minor_mana_draught",
                    name: "Minor Mana Draught",
                    effect: ConsumableEffect::RestoreMana(15),
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.5,
                kind: ItemKind::Weapon {
                    id: "rusty_sword",
                    name: "Rusty Sword",
                    damage_dice: "1d6",
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.5,
                kind: ItemKind::Armor {
                    id: "leather_vest",
                    name: "Leather Vest",
                    protection: 1,
                },
            },
        ],
        Tier::Uncommon => vec![
            ItemTemplate {
                tier,
                drop_rate: 0.7,
                kind: ItemKind::Consumable {
                    id: "health_draught",
                    name: "Health Draught",
                    effect: ConsumableEffect::RestoreHealth(40),
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.4,
                kind: ItemKind::Consumable {
                    id: "antidote",
                    name: "Antidote",
                    effect: ConsumableEffect::CureStatus,
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.45,
                kind: ItemKind::Weapon {
                    id: "steel_longsword",
                    name: "Steel Longsword",
                    damage_dice: "1d8+1",
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.45,
                kind: ItemKind::Armor {
                    id: "chain_shirt",
                    name: "Chain Shirt",
                    protection: 2,
                },
            },
        ],
        Tier::Rare => vec![
            ItemTemplate {
                tier,
                drop_rate: 0.6,
                kind: ItemKind::Consumable {
                    id: "greater_health_draught",
                    name: "Greater Health Draught",
                    effect: ConsumableEffect::RestoreHealth(80),
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.35,
                kind: ItemKind::Consumable {
                    id: "battle_tonic",
                    name: "Battle Tonic",
                    effect: ConsumableEffect::Buff(EffectKind::Empowered, 3, 25),
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.3,
                kind: ItemKind::Weapon {
                    id: "runed_greatblade",
                    name: "Runed Greatblade",
                    damage_dice: "2d6+1",
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.3,
                kind: ItemKind::Armor {
                    id: "warded_plate",
                    name: "Warded Plate",
                    protection: 4,
                },
            },
        ],
        Tier::Boss => vec![
            ItemTemplate {
                tier,
                drop_rate: 0.8,
                kind: ItemKind::Weapon {
                    id: "devourer_fang",
                    name: "Devourer Fang",
                    damage_dice: "2d8+2",
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 0.6,
                kind: ItemKind::Armor {
                    id: "matriarch_carapace",
                    name: "Matriarch Carapace",
                    protection: 6,
                },
            },
            ItemTemplate {
                tier,
                drop_rate: 1.0,
                kind: ItemKind::Consumable {
                    id: "royal_elixir",
                    name: "Royal Elixir",
                    effect: ConsumableEffect::RestoreHealth(150),
                },
            },
        ],
    }
}

/// Stamps a concrete enemy from a template, scaling health for depth.
/// Bosses scale at a gentler rate than regular enemies.
pub fn spawn_enemy(template: &EnemyTemplate, depth: u32) -> Enemy {
    let scaling = if template.tier == Tier::Boss {
        BOSS_HP_DEPTH_SCALING
    } else {
        ENEMY_HP_DEPTH_SCALING
    };
    let health = (template.health as f64 * (1.0 + depth as f64 * scaling)) as u32;
    Enemy {
        id: template.id.to_string(),
        name: template.name.to_string(),
        tier: template.tier,
        health,
        max_health: health,
        armor: template.armor,
        damage_dice: template.damage_dice.to_string(),
        agility: template.agility,
        weakness: template.weakness.map(str::to_string),
        examined: false,
        xp_reward: template.xp_reward,
        gold_reward: template.gold_reward,
        loot_tier: template.tier,
        status_effects: Vec::new(),
        hooks: template.hooks.clone(),
        behavior: template.behavior,
        cooldown: 0,
        special: template.special.map(|s| SpecialMove {
            name: s.name.to_string(),
            inflicts: s.inflicts,
            duration: s.duration,
            magnitude: s.magnitude,
        }),
    }
}

/// Picks the boss template for a depth: one boss per five-depth bracket,
/// repeating the final boss once the roster runs out.
pub fn boss_for_depth(depth: u32) -> EnemyTemplate {
    let pool = enemy_pool(Tier::Boss);
    let index = ((depth / 5).saturating_sub(1) as usize).min(pool.len() - 1);
    pool[index].clone()
}

/// Rolls a single drop from a tier's item pool. Each candidate passes its
/// own drop-rate check first; misses mean no drop at all.
pub fn roll_loot(tier: Tier, rng: &mut impl Rng) -> Option<Item> {
    let pool = item_pool(tier);
    let candidates: Vec<&ItemTemplate> = pool
        .iter()
        .filter(|template| rng.gen::<f64>() < template.drop_rate)
        .collect();
    candidates.choose(rng).map(|template| template.build())
}

/// Checks every table entry once at startup. A bad dice string or an empty
/// pool here would otherwise surface as a runtime failure deep in combat.
pub fn validate_tables() -> Result<()> {
    for tier in [Tier::Common, Tier::Uncommon, Tier::Rare, Tier::Boss] {
        let enemies = enemy_pool(tier);
        if enemies.is_empty() {
            return Err(EngineError::InvalidConfig(format!(
                "empty enemy pool for tier {}",
                tier.name()
            )));
        }
        for template in &enemies {
            dice::parse_dice(template.damage_dice).map_err(|_| {
                EngineError::InvalidConfig(format!(
                    "enemy {} has bad damage dice {:?}",
                    template.id, template.damage_dice
                ))
            })?;
            if template.health == 0 {
                return Err(EngineError::InvalidConfig(format!(
                    "enemy {} has zero health",
                    template.id
                )));
            }
            if matches!(template.behavior, Behavior::SpecialEvery { .. })
                && template.special.is_none()
            {
                return Err(EngineError::InvalidConfig(format!(
                    "enemy {} has a special behavior but no special move",
                    template.id
                )));
            }
        }

        let items = item_pool(tier);
        if items.is_empty() {
            return Err(EngineError::InvalidConfig(format!(
                "empty item pool for tier {}",
                tier.name()
            )));
        }
        for template in &items {
            if !(0.0..=1.0).contains(&template.drop_rate) {
                return Err(EngineError::InvalidConfig(format!(
                    "item {} has drop rate {} outside [0, 1]",
                    template.build().id(),
                    template.drop_rate
                )));
            }
            if let ItemKind::Weapon { id, damage_dice, .. } = &template.kind {
                dice::parse_dice(damage_dice).map_err(|_| {
                    EngineError::InvalidConfig(format!(
                        "weapon {} has bad damage dice {:?}",
                        id, damage_dice
                    ))
                })?;
            }
        }
    }
    Ok(())
}
