//! Game session state: the hero, the generated rooms, and any active combat.
//!
//! Everything lives on one caller-owned `GameState` value; the engine never
//! touches globals. All mutation goes through the methods here, which keep
//! the room/combat invariants straight: combat starts when entering a room
//! with live enemies, movement is blocked until it resolves, and rooms are
//! marked cleared on victory.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::combat::{self, Action, CombatState, Resolution};
use crate::dungeon::{self, data, Direction, Room};
use crate::error::{EngineError, Result};
use crate::events::{CombatEvent, ProgressionEvent};
use crate::hero::Hero;
use crate::progression;

/// Rooms generated per dungeon level.
pub const ROOMS_PER_LEVEL: usize = 5;

/// Everything produced by one resolved combat round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnOutcome {
    pub combat: Vec<CombatEvent>,
    pub progression: Vec<ProgressionEvent>,
}

/// A full game session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub hero: Hero,
    pub seed: u64,
    pub rooms: BTreeMap<String, Room>,
    pub current_room_id: String,
    pub combat: Option<CombatState>,
    pub depth: u32,
    pub max_depth_reached: u32,
    pub turn_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    /// Starts a new session at depth 1. Validates the content tables once
    /// so table mistakes surface here rather than mid-combat.
    pub fn new(hero: Hero, seed: u64) -> Result<Self> {
        data::validate_tables()?;
        let rooms = dungeon::generate_level(1, seed, ROOMS_PER_LEVEL)?;
        let entrance = "room_1_0".to_string();
        let now = Utc::now();
        let mut state = Self {
            hero,
            seed,
            rooms,
            current_room_id: entrance.clone(),
            combat: None,
            depth: 1,
            max_depth_reached: 1,
            turn_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.enter_room(&entrance)?;
        info!(seed, "new game session");
        Ok(state)
    }

    pub fn current_room(&self) -> Result<&Room> {
        self.rooms
            .get(&self.current_room_id)
            .ok_or_else(|| EngineError::InvalidConfig(format!(
                "current room {} missing",
                self.current_room_id
            )))
    }

    pub fn in_combat(&self) -> bool {
        self.combat.as_ref().is_some_and(|c| c.active)
    }

    /// Places the hero in a room, marking it discovered and engaging any
    /// live enemies it still holds.
    pub fn enter_room(&mut self, room_id: &str) -> Result<()> {
        if self.in_combat() {
            return Err(EngineError::IllegalTransition(
                "cannot change rooms during combat".to_string(),
            ));
        }
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| EngineError::InvalidTarget(format!("no room {}", room_id)))?;
        room.discovered = true;
        self.current_room_id = room_id.to_string();
        self.depth = self.depth.max(room.depth);
        self.max_depth_reached = self.max_depth_reached.max(room.depth);

        if !room.cleared {
            if room.has_live_enemies() {
                let enemies: Vec<_> =
                    room.enemies.iter().filter(|e| e.is_alive()).cloned().collect();
                info!(room = room_id, enemies = enemies.len(), "combat engaged");
                self.combat = Some(combat::start_combat(&self.hero, enemies));
            } else {
                room.cleared = true;
            }
        }
        self.touch();
        Ok(())
    }

    /// Moves the hero through an exit of the current room.
    pub fn move_hero(&mut self, direction: Direction) -> Result<()> {
        if self.in_combat() {
            return Err(EngineError::IllegalTransition(
                "cannot move during combat".to_string(),
            ));
        }
        let target = self
            .current_room()?
            .exits
            .get(&direction)
            .cloned()
            .ok_or_else(|| {
                EngineError::InvalidAction(format!("no exit to the {}", direction.name()))
            })?;
        self.turn_count += 1;
        self.enter_room(&target)
    }

    /// Generates the next level down and places the hero at its entrance.
    /// The current room must be cleared first.
    pub fn descend(&mut self) -> Result<()> {
        if self.in_combat() {
            return Err(EngineError::IllegalTransition(
                "cannot descend during combat".to_string(),
            ));
        }
        if !self.current_room()?.cleared {
            return Err(EngineError::InvalidAction(
                "clear the current room before descending".to_string(),
            ));
        }
        let next_depth = self.depth + 1;
        let level = dungeon::generate_level(next_depth, self.seed, ROOMS_PER_LEVEL)?;
        self.rooms.extend(level);
        self.turn_count += 1;
        info!(depth = next_depth, "descended");
        self.enter_room(&format!("room_{}_0", next_depth))
    }

    /// Resolves one combat round and, when the fight ends, folds the result
    /// back into the session: loot and progression on victory, surviving
    /// enemies written back to the room on escape.
    pub fn take_action(&mut self, action: Action, rng: &mut impl Rng) -> Result<TurnOutcome> {
        let events = {
            let Some(state) = self.combat.as_mut() else {
                return Err(EngineError::InvalidAction("not in combat".to_string()));
            };
            combat::resolve_action(state, &mut self.hero, action, rng)?
        };
        self.turn_count += 1;

        let mut progression = Vec::new();
        let finished = self.combat.as_ref().and_then(|c| c.resolution);
        if let Some(resolution) = finished {
            let survivors = self
                .combat
                .take()
                .map(|c| c.enemies)
                .unwrap_or_default();
            match resolution {
                Resolution::Victory => {
                    progression = progression::apply_outcome(&mut self.hero, &events);
                    self.collect_loot(&events);
                    if let Some(room) = self.rooms.get_mut(&self.current_room_id) {
                        room.enemies.clear();
                        room.cleared = true;
                    }
                }
                Resolution::Escaped => {
                    // The room stays uncleared; wounded enemies keep their
                    // current health for the next engagement
                    if let Some(room) = self.rooms.get_mut(&self.current_room_id) {
                        room.enemies = survivors.into_iter().filter(|e| e.is_alive()).collect();
                    }
                }
                Resolution::Defeat => {}
            }
            info!(?resolution, "combat resolved");
        }

        self.touch();
        Ok(TurnOutcome {
            combat: events,
            progression,
        })
    }

    /// Picks up an item lying in the current room.
    pub fn pick_up(&mut self, item_id: &str) -> Result<()> {
        if self.in_combat() {
            return Err(EngineError::IllegalTransition(
                "cannot loot during combat".to_string(),
            ));
        }
        let room = self
            .rooms
            .get_mut(&self.current_room_id)
            .ok_or_else(|| EngineError::InvalidTarget("current room missing".to_string()))?;
        let item = room
            .take_item(item_id)
            .ok_or_else(|| EngineError::InvalidTarget(format!("no item {} here", item_id)))?;
        if !self.hero.add_to_inventory(item.clone(), 1) {
            // Inventory full: the item stays where it was
            room.items.push(item);
            return Err(EngineError::InvalidAction("inventory is full".to_string()));
        }
        self.touch();
        Ok(())
    }

    /// Moves dropped loot from defeat events into the hero's inventory,
    /// spilling onto the floor when the inventory is full.
    fn collect_loot(&mut self, events: &[CombatEvent]) {
        for event in events {
            if let CombatEvent::EnemyDefeated {
                loot: Some(item), ..
            } = event
            {
                if !self.hero.add_to_inventory(item.clone(), 1) {
                    if let Some(room) = self.rooms.get_mut(&self.current_room_id) {
                        room.items.push(item.clone());
                    }
                }
            }
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
