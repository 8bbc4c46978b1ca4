//! Hero character model: stats, resource pools, inventory, and equipment.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::effects::{self, StatusEffect};
use crate::items::{Armor, Item, InventoryItem, EquipmentSlots, Weapon};

/// Character class. Determines base pool modifiers, per-level stat growth,
/// and the skill unlock track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Warrior,
    Mage,
    Rogue,
    Cleric,
}

impl Role {
    pub fn name(&self) -> &'static str {
        match self {
            Role::Warrior => "Warrior",
            Role::Mage => "Mage",
            Role::Rogue => "Rogue",
            Role::Cleric => "Cleric",
        }
    }

    /// Flat bonus to max health from class.
    pub fn health_modifier(&self) -> i32 {
        match self {
            Role::Warrior => 20,
            Role::Mage => -10,
            Role::Rogue => 0,
            Role::Cleric => 10,
        }
    }

    /// Flat bonus to max mana from class.
    pub fn mana_modifier(&self) -> i32 {
        match self {
            Role::Warrior => -10,
            Role::Mage => 30,
            Role::Rogue => 0,
            Role::Cleric => 15,
        }
    }

    /// Starting stat bonuses as (might, insight, agility, resilience).
    pub fn stat_bonuses(&self) -> (u32, u32, u32, u32) {
        match self {
            Role::Warrior => (4, 0, 0, 2),
            Role::Mage => (0, 4, 2, 0),
            Role::Rogue => (2, 0, 4, 0),
            Role::Cleric => (0, 2, 0, 4),
        }
    }
}

/// The player character. Mutated only through combat and progression calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hero {
    pub name: String,
    pub role: Role,
    pub level: u32,
    pub xp: u64,

    // Resource pools
    pub health: u32,
    pub max_health: u32,
    pub mana: u32,
    pub max_mana: u32,

    // Core stats
    pub might: u32,
    pub insight: u32,
    pub agility: u32,
    pub resilience: u32,

    // Inventory & equipment
    pub inventory: Vec<InventoryItem>,
    pub equipped: EquipmentSlots,

    // Status & progression
    pub status_effects: Vec<StatusEffect>,
    pub gold: u64,
    pub skills: Vec<String>,
    pub fragments: u32,
}

/// Skill ids every fresh hero of a role begins with.
fn starting_skills(role: Role) -> Vec<String> {
    let mut skills = vec!["basic_attack".to_string()];
    skills.extend(
        crate::skills::SKILLS
            .iter()
            .filter(|s| s.role == Some(role) && s.min_level == 1)
            .map(|s| s.id.to_string()),
    );
    skills
}

impl Hero {
    /// Creates a level 1 hero with class bonuses applied and full pools.
    pub fn new(name: impl Into<String>, role: Role) -> Self {
        let (might, insight, agility, resilience) = role.stat_bonuses();
        let mut hero = Self {
            name: name.into(),
            role,
            level: 1,
            xp: 0,
            health: 0,
            max_health: 0,
            mana: 0,
            max_mana: 0,
            might: BASE_STAT + might,
            insight: BASE_STAT + insight,
            agility: BASE_STAT + agility,
            resilience: BASE_STAT + resilience,
            inventory: Vec::new(),
            equipped: EquipmentSlots::default(),
            status_effects: Vec::new(),
            gold: 0,
            skills: starting_skills(role),
            fragments: 0,
        };
        hero.recalculate_pools();
        hero.health = hero.max_health;
        hero.mana = hero.max_mana;
        hero
    }

    /// Max health derived from resilience, class, and fragment bonuses.
    pub fn calculate_max_health(&self) -> u32 {
        let base = BASE_HEALTH as i32 + self.role.health_modifier();
        let resilience_bonus = self.resilience * HEALTH_PER_RESILIENCE;
        let fragment_bonus = (self.fragments / FRAGMENT_BONUS_THRESHOLD) * FRAGMENT_HEALTH_BONUS;
        (base.max(1) as u32) + resilience_bonus + fragment_bonus
    }

    /// Max mana derived from insight and class.
    pub fn calculate_max_mana(&self) -> u32 {
        let base = BASE_MANA as i32 + self.role.mana_modifier();
        (base.max(0) as u32) + self.insight * MANA_PER_INSIGHT
    }

    /// Recomputes max pools and caps current values. Called after any stat
    /// or fragment change.
    pub fn recalculate_pools(&mut self) {
        self.max_health = self.calculate_max_health();
        self.max_mana = self.calculate_max_mana();
        self.health = self.health.min(self.max_health);
        self.mana = self.mana.min(self.max_mana);
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    pub fn heal(&mut self, amount: u32) {
        self.health = (self.health + amount).min(self.max_health);
    }

    pub fn restore_mana(&mut self, amount: u32) {
        self.mana = (self.mana + amount).min(self.max_mana);
    }

    pub fn spend_mana(&mut self, amount: u32) {
        self.mana = self.mana.saturating_sub(amount);
    }

    /// Total armor: equipped protection plus any shielding effects.
    pub fn armor_value(&self) -> u32 {
        let base = self.equipped.armor.as_ref().map_or(0, |a| a.protection);
        base + effects::armor_bonus(&self.status_effects)
    }

    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.skills.iter().any(|s| s == skill_id)
    }

    /// Adds an item, stacking by id. Returns false when the inventory is
    /// full and the item is not already stacked.
    pub fn add_to_inventory(&mut self, item: Item, quantity: u32) -> bool {
        if let Some(stack) = self.inventory.iter_mut().find(|s| s.item.id() == item.id()) {
            stack.quantity += quantity;
            return true;
        }
        if self.inventory.len() >= MAX_INVENTORY_SIZE {
            return false;
        }
        self.inventory.push(InventoryItem { item, quantity });
        true
    }

    /// Removes up to `quantity` of an item. Returns false when absent.
    pub fn remove_from_inventory(&mut self, item_id: &str, quantity: u32) -> bool {
        let Some(index) = self.inventory.iter().position(|s| s.item.id() == item_id) else {
            return false;
        };
        let stack = &mut self.inventory[index];
        stack.quantity = stack.quantity.saturating_sub(quantity);
        if stack.quantity == 0 {
            self.inventory.remove(index);
        }
        true
    }

    pub fn equip_weapon(&mut self, weapon: Weapon) -> Option<Weapon> {
        self.equipped.weapon.replace(weapon)
    }

    pub fn equip_armor(&mut self, armor: Armor) -> Option<Armor> {
        let previous = self.equipped.armor.replace(armor);
        self.recalculate_pools();
        previous
    }
}
