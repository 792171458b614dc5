use crate::types::GhostRole;

pub const TICK_RATE: u32 = 60;

pub const TILE_SIZE: f32 = 8.0;
/// Pixels per tick at 100 % speed.
pub const BASE_SPEED: f32 = 1.25;

pub const GHOST_SPEED_INSIDE_HOUSE_PERCENT: u32 = 50;
pub const GHOST_SPEED_RETURNING_PERCENT: u32 = 200;
pub const GHOST_EATEN_TICKS: u32 = 60;

/// Pokey stops chasing once it is within this distance (Euclidean, in tiles).
pub const POKEY_SCATTER_RADIUS: f32 = 8.0;

pub const SPEEDY_LOOKAHEAD: i32 = 4;
pub const BASHFUL_LOOKAHEAD: i32 = 2;

pub const AUTOPILOT_GHOST_AHEAD_DIST: i32 = 4;
pub const AUTOPILOT_GHOST_BEHIND_DIST: i32 = 1;
pub const AUTOPILOT_GHOST_CHASE_DIST: f32 = 10.0;
pub const AUTOPILOT_BONUS_HARVEST_DIST: f32 = 20.0;
pub const AUTOPILOT_CHASE_MARGIN_TICKS: u32 = TICK_RATE;
pub const AUTOPILOT_ENERGIZER_SKIP_TICKS: u32 = 2 * TICK_RATE;

pub const HUNTING_TICKS_LEVEL_1: [Option<u32>; 8] = [
    Some(420),
    Some(1200),
    Some(420),
    Some(1200),
    Some(300),
    Some(1200),
    Some(300),
    None,
];
pub const HUNTING_TICKS_LEVEL_2_TO_4: [Option<u32>; 8] = [
    Some(420),
    Some(1200),
    Some(420),
    Some(1200),
    Some(300),
    Some(61980),
    Some(1),
    None,
];
pub const HUNTING_TICKS_LEVEL_5_PLUS: [Option<u32>; 8] = [
    Some(300),
    Some(1200),
    Some(300),
    Some(1200),
    Some(300),
    Some(62262),
    Some(1),
    None,
];

pub fn hunting_ticks_for_level(level_number: u32) -> &'static [Option<u32>; 8] {
    if level_number <= 1 {
        return &HUNTING_TICKS_LEVEL_1;
    }
    if level_number <= 4 {
        return &HUNTING_TICKS_LEVEL_2_TO_4;
    }
    &HUNTING_TICKS_LEVEL_5_PLUS
}

/// Converts a speed percentage into whole tiles per tick for the move buffer.
pub fn tiles_per_tick(percent: u32) -> f32 {
    BASE_SPEED * percent as f32 / 100.0 / TILE_SIZE
}

pub fn seconds_to_ticks(seconds: u32) -> u32 {
    seconds * TICK_RATE
}

/// Release order used when a caller just wants "the next ghost out".
pub const RELEASE_ORDER: [GhostRole; 4] = [
    GhostRole::Shadow,
    GhostRole::Speedy,
    GhostRole::Bashful,
    GhostRole::Pokey,
];
