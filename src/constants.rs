// Base resource pools before class and stat modifiers
pub const BASE_HEALTH: u32 = 100;
pub const BASE_MANA: u32 = 50;
pub const BASE_STAT: u32 = 10;

// Derived pool scaling
pub const HEALTH_PER_RESILIENCE: u32 = 5;
pub const MANA_PER_INSIGHT: u32 = 3;

// Experience and progression constants
pub const XP_CURVE_BASE: f64 = 100.0;
pub const XP_CURVE_EXPONENT: f64 = 1.5;
pub const SKILL_UNLOCK_INTERVAL: u32 = 5;
pub const LEVEL_UP_RESTORE_FRACTION: f64 = 0.5;

// Collectible fragments: every FRAGMENT_BONUS_THRESHOLD collected grants a
// permanent +FRAGMENT_HEALTH_BONUS to max health
pub const FRAGMENT_BONUS_THRESHOLD: u32 = 3;
pub const FRAGMENT_HEALTH_BONUS: u32 = 5;

// Inventory
pub const MAX_INVENTORY_SIZE: usize = 20;

// Combat constants
pub const DEFENSE_DAMAGE_REDUCTION: f64 = 0.5;
pub const WEAKNESS_MULTIPLIER: f64 = 1.5;
pub const CRIT_MULTIPLIER: u32 = 2;
pub const MIGHT_PER_DAMAGE_BONUS: u32 = 5; // +1 damage per 5 might
pub const UNARMED_DAMAGE: u32 = 1;
pub const REVIVE_HEALTH_FRACTION: f64 = 0.5;
pub const ALLY_REVIVE_HEALTH_FRACTION: f64 = 0.5;

// Flee: base chance + per-agility bonus - tier penalty, clamped
pub const FLEE_BASE_CHANCE: f64 = 0.5;
pub const FLEE_AGILITY_BONUS: f64 = 0.02;
pub const FLEE_MIN_CHANCE: f64 = 0.05;
// 1.0 keeps high agility against common foes a guaranteed escape
pub const FLEE_MAX_CHANCE: f64 = 1.0;

// Generation: room type weights out of 100 at non-boss depths; boss rooms
// occur exactly when depth % BOSS_DEPTH_INTERVAL == 0
pub const ROOM_WEIGHT_CORRIDOR: u32 = 40;
pub const ROOM_WEIGHT_CHAMBER: u32 = 30;
pub const ROOM_WEIGHT_TREASURE: u32 = 15;
pub const ROOM_WEIGHT_TRAP: u32 = 10;
pub const BOSS_DEPTH_INTERVAL: u32 = 5;

// Enemy HP scaling per depth level
pub const ENEMY_HP_DEPTH_SCALING: f64 = 0.1;
pub const BOSS_HP_DEPTH_SCALING: f64 = 0.05;
