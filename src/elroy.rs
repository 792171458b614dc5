use serde::Serialize;

use crate::error::EngineError;
use crate::level::LevelData;
use crate::types::GhostRole;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ElroyLevel {
    Off = 0,
    One = 1,
    Two = 2,
}

impl TryFrom<i8> for ElroyLevel {
    type Error = EngineError;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ElroyLevel::Off),
            1 => Ok(ElroyLevel::One),
            2 => Ok(ElroyLevel::Two),
            other => Err(EngineError::InvalidElroyLevel(other)),
        }
    }
}

/// Cruise Elroy state of the shadow ghost. The level only rises within a
/// level; Pac-Man's death latches it as suppressed until the pokey ghost
/// leaves the house again.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElroyController {
    level: ElroyLevel,
    suppressed: bool,
}

impl Default for ElroyController {
    fn default() -> Self {
        Self::new()
    }
}

impl ElroyController {
    pub fn new() -> Self {
        Self {
            level: ElroyLevel::Off,
            suppressed: false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn level(&self) -> ElroyLevel {
        self.level
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Elroy level that currently affects speed and targeting.
    pub fn effective_level(&self) -> ElroyLevel {
        if self.suppressed {
            ElroyLevel::Off
        } else {
            self.level
        }
    }

    /// Arcade encoding: negative while suppressed.
    pub fn signed_value(&self) -> i8 {
        let value = self.level as i8;
        if self.suppressed {
            -value
        } else {
            value
        }
    }

    /// Returns the new signed value if it changed.
    pub fn set(&mut self, value: i8) -> Result<Option<i8>, EngineError> {
        let level = ElroyLevel::try_from(value)?;
        Ok(self.apply(level, self.suppressed))
    }

    /// Raises the level when uneaten food reaches a threshold. Never lowers it.
    pub fn update(&mut self, food_left: u32, data: &LevelData) -> Option<i8> {
        let reached = if food_left <= data.elroy2_dots_left {
            ElroyLevel::Two
        } else if food_left <= data.elroy1_dots_left {
            ElroyLevel::One
        } else {
            ElroyLevel::Off
        };
        if reached <= self.level {
            return None;
        }
        self.apply(reached, self.suppressed)
    }

    pub fn suppress(&mut self) -> Option<i8> {
        self.apply(self.level, true)
    }

    /// Release notification from the house. Only the pokey ghost lifts the
    /// suppression.
    pub fn on_ghost_released(&mut self, role: GhostRole) -> Option<i8> {
        if role != GhostRole::Pokey {
            return None;
        }
        self.apply(self.level, false)
    }

    fn apply(&mut self, level: ElroyLevel, suppressed: bool) -> Option<i8> {
        let before = self.signed_value();
        self.level = level;
        self.suppressed = suppressed;
        let after = self.signed_value();
        (before != after).then_some(after)
    }
}
