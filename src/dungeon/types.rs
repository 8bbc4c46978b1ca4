//! Dungeon data structures: rooms, room types, and exits.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::types::Enemy;
use crate::items::Item;

/// Type of room. Fixed at creation; never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RoomType {
    /// Narrow passage, light encounters (40% weight)
    Corridor,
    /// Open area, standard encounters (30% weight)
    Chamber,
    /// Loot cache, no enemies (15% weight)
    Treasure,
    /// Ambush room, enemy-heavy, no loot (10% weight)
    Trap,
    /// Boss encounter; occurs exactly on every fifth depth
    Boss,
}

impl RoomType {
    pub fn name(&self) -> &'static str {
        match self {
            RoomType::Corridor => "corridor",
            RoomType::Chamber => "chamber",
            RoomType::Treasure => "treasure",
            RoomType::Trap => "trap",
            RoomType::Boss => "boss",
        }
    }
}

/// Exit direction from a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

/// A generated dungeon room.
///
/// Room type and exits are immutable after creation; items and enemies
/// drain as the hero loots and fights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub room_type: RoomType,
    pub depth: u32,
    /// Exits to other room ids. BTreeMap keeps iteration (and serialized)
    /// order deterministic.
    pub exits: BTreeMap<Direction, String>,
    pub items: Vec<Item>,
    pub enemies: Vec<Enemy>,
    pub cleared: bool,
    pub discovered: bool,
}

impl Room {
    pub fn has_live_enemies(&self) -> bool {
        self.enemies.iter().any(|e| e.is_alive())
    }

    /// Takes an item out of the room by id.
    pub fn take_item(&mut self, item_id: &str) -> Option<Item> {
        let index = self.items.iter().position(|i| i.id() == item_id)?;
        Some(self.items.remove(index))
    }
}
