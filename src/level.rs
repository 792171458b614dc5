use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::seconds_to_ticks;
use crate::error::EngineError;

/// Per-level tunables. Speeds are percentages of the base speed; Elroy
/// thresholds are counts of uneaten food.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub pac_speed: u32,
    pub ghost_speed: u32,
    pub ghost_tunnel_speed: u32,
    pub elroy1_dots_left: u32,
    pub elroy1_speed: u32,
    pub elroy2_dots_left: u32,
    pub elroy2_speed: u32,
    pub pac_speed_powered: u32,
    pub ghost_speed_frightened: u32,
    pub pac_power_seconds: u32,
    pub num_flashes: u32,
}

impl LevelData {
    pub fn power_ticks(&self) -> u32 {
        seconds_to_ticks(self.pac_power_seconds)
    }
}

const fn row(v: [u32; 11]) -> LevelData {
    LevelData {
        pac_speed: v[0],
        ghost_speed: v[1],
        ghost_tunnel_speed: v[2],
        elroy1_dots_left: v[3],
        elroy1_speed: v[4],
        elroy2_dots_left: v[5],
        elroy2_speed: v[6],
        pac_speed_powered: v[7],
        ghost_speed_frightened: v[8],
        pac_power_seconds: v[9],
        num_flashes: v[10],
    }
}

pub const ARCADE_LEVELS: [LevelData; 21] = [
    row([80, 75, 40, 20, 80, 10, 85, 90, 50, 6, 5]),
    row([90, 85, 45, 30, 90, 15, 95, 95, 55, 5, 5]),
    row([90, 85, 45, 40, 90, 20, 95, 95, 55, 4, 5]),
    row([90, 85, 45, 40, 90, 20, 95, 95, 55, 3, 5]),
    row([100, 95, 50, 40, 100, 20, 105, 100, 60, 2, 5]),
    row([100, 95, 50, 50, 100, 25, 105, 100, 60, 5, 5]),
    row([100, 95, 50, 50, 100, 25, 105, 100, 60, 2, 5]),
    row([100, 95, 50, 50, 100, 25, 105, 100, 60, 2, 5]),
    row([100, 95, 50, 60, 100, 30, 105, 100, 60, 1, 3]),
    row([100, 95, 50, 60, 100, 30, 105, 100, 60, 5, 5]),
    row([100, 95, 50, 60, 100, 30, 105, 100, 60, 2, 5]),
    row([100, 95, 50, 80, 100, 40, 105, 100, 60, 1, 3]),
    row([100, 95, 50, 80, 100, 40, 105, 100, 60, 1, 3]),
    row([100, 95, 50, 80, 100, 40, 105, 100, 60, 3, 5]),
    row([100, 95, 50, 100, 100, 50, 105, 100, 60, 1, 3]),
    row([100, 95, 50, 100, 100, 50, 105, 100, 60, 1, 3]),
    row([100, 95, 50, 100, 100, 50, 105, 100, 60, 0, 0]),
    row([100, 95, 50, 100, 100, 50, 105, 100, 60, 1, 3]),
    row([100, 95, 50, 120, 100, 60, 105, 100, 60, 0, 0]),
    row([100, 95, 50, 120, 100, 60, 105, 100, 60, 0, 0]),
    row([90, 95, 50, 120, 100, 60, 105, 100, 60, 0, 0]),
];

#[derive(Clone, Debug, Deserialize)]
struct LevelTableFile {
    levels: Vec<LevelData>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LevelTable {
    rows: Vec<LevelData>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::arcade()
    }
}

impl LevelTable {
    pub fn arcade() -> Self {
        Self {
            rows: ARCADE_LEVELS.to_vec(),
        }
    }

    pub fn new(rows: Vec<LevelData>) -> Result<Self, EngineError> {
        if rows.is_empty() {
            return Err(EngineError::InvalidLevelTable(
                "table has no rows".to_string(),
            ));
        }
        for (index, data) in rows.iter().enumerate() {
            if data.elroy2_dots_left > data.elroy1_dots_left {
                return Err(EngineError::InvalidLevelTable(format!(
                    "level {}: elroy2 threshold {} exceeds elroy1 threshold {}",
                    index + 1,
                    data.elroy2_dots_left,
                    data.elroy1_dots_left
                )));
            }
        }
        Ok(Self { rows })
    }

    pub fn from_json_str(json: &str) -> Result<Self, EngineError> {
        let file: LevelTableFile = serde_json::from_str(json)?;
        Self::new(file.levels)
    }

    pub fn from_file(path: &Path) -> Result<Self, EngineError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Level numbers start at 1. Anything past the last row plays like the last row.
    pub fn level(&self, level_number: u32) -> LevelData {
        let index = (level_number.max(1) as usize - 1).min(self.rows.len() - 1);
        self.rows[index]
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// Reproduce the arcade bug where "ahead of Pac-Man facing up" also shifts left.
    pub simulate_overflow_bug: bool,
    pub autopilot: bool,
    pub rng_seed: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simulate_overflow_bug: true,
            autopilot: false,
            rng_seed: 1,
        }
    }
}
