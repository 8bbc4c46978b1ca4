//! Dungeon generation: room types, static content tables, and seeded layout.

pub mod data;
pub mod logic;
pub mod types;

pub use logic::{generate_level, generate_room, reachable_rooms};
pub use types::{Direction, Room, RoomType};
