//! Item types: weapons, armor, and consumables.
//!
//! Items are a tagged union where every variant carries its full field set,
//! so there is never a "missing field" state to guard against at read time.

use serde::{Deserialize, Serialize};

use crate::effects::EffectKind;

/// Rarity/difficulty bracket shared by enemies and items. Gates which depth
/// ranges content appears in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Boss = 3,
}

impl Tier {
    pub fn name(&self) -> &'static str {
        match self {
            Tier::Common => "Common",
            Tier::Uncommon => "Uncommon",
            Tier::Rare => "Rare",
            Tier::Boss => "Boss",
        }
    }

    /// Tier bracket for enemy/loot selection at a given depth.
    pub fn for_depth(depth: u32) -> Tier {
        match depth {
            0..=3 => Tier::Common,
            4..=6 => Tier::Uncommon,
            _ => Tier::Rare,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weapon {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    /// Damage dice notation, e.g. "2d6".
    pub damage_dice: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Armor {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub protection: u32,
}

/// What a consumable does when used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumableEffect {
    RestoreHealth(u32),
    RestoreMana(u32),
    CureStatus,
    /// Applies a buff to the user: (kind, duration in rounds, magnitude).
    Buff(EffectKind, u32, u32),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consumable {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub effect: ConsumableEffect,
}

/// A dungeon item. Each variant declares its complete required field set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    Weapon(Weapon),
    Armor(Armor),
    Consumable(Consumable),
}

impl Item {
    pub fn id(&self) -> &str {
        match self {
            Item::Weapon(w) => &w.id,
            Item::Armor(a) => &a.id,
            Item::Consumable(c) => &c.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Item::Weapon(w) => &w.name,
            Item::Armor(a) => &a.name,
            Item::Consumable(c) => &c.name,
        }
    }

    pub fn tier(&self) -> Tier {
        match self {
            Item::Weapon(w) => w.tier,
            Item::Armor(a) => a.tier,
            Item::Consumable(c) => c.tier,
        }
    }
}

/// An inventory stack: an item plus how many of it the hero carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub item: Item,
    pub quantity: u32,
}

/// Character equipment slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EquipmentSlots {
    pub weapon: Option<Weapon>,
    pub armor: Option<Armor>,
    pub accessory: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_for_depth_brackets() {
        assert_eq!(Tier::for_depth(1), Tier::Common);
        assert_eq!(Tier::for_depth(3), Tier::Common);
        assert_eq!(Tier::for_depth(4), Tier::Uncommon);
        assert_eq!(Tier::for_depth(6), Tier::Uncommon);
        assert_eq!(Tier::for_depth(7), Tier::Rare);
        assert_eq!(Tier::for_depth(12), Tier::Rare);
    }

    #[test]
    fn test_item_accessors() {
        let item = Item::Weapon(Weapon {
            id: "rusty_sword".into(),
            name: "Rusty Sword".into(),
            tier: Tier::Common,
            damage_dice: "1d6".into(),
        });
        assert_eq!(item.id(), "rusty_sword");
        assert_eq!(item.name(), "Rusty Sword");
        assert_eq!(item.tier(), Tier::Common);
    }
}
