use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Tile {
    pub x: i32,
    pub y: i32,
}

impl Tile {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn plus(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// The tile `steps` tiles away in `dir`.
    pub fn towards(self, dir: Direction, steps: i32) -> Self {
        let (dx, dy) = dir.vector();
        self.plus(dx * steps, dy * steps)
    }

    pub fn neighbor(self, dir: Direction) -> Self {
        self.towards(dir, 1)
    }

    pub fn manhattan(self, other: Tile) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn squared_distance(self, other: Tile) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    pub fn euclidean(self, other: Tile) -> f32 {
        (self.squared_distance(other) as f32).sqrt()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Arcade tie-break order for target-tile navigation.
    pub const PRIORITY: [Direction; 4] = [
        Direction::Up,
        Direction::Left,
        Direction::Down,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit vector in screen coordinates (y grows downwards).
    pub fn vector(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }

    pub fn clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    pub fn counter_clockwise(self) -> Self {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostRole {
    Shadow,
    Speedy,
    Bashful,
    Pokey,
}

impl GhostRole {
    pub const ALL: [GhostRole; 4] = [
        GhostRole::Shadow,
        GhostRole::Speedy,
        GhostRole::Bashful,
        GhostRole::Pokey,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostState {
    Locked,
    LeavingHouse,
    Hunting,
    Frightened,
    Eaten,
    ReturningHome,
    EnteringHouse,
}

impl GhostState {
    /// States in which a ghost is outside the house and moving through the maze
    /// under its own targeting rules.
    pub fn is_roaming(self) -> bool {
        matches!(self, GhostState::Hunting | GhostState::Frightened)
    }

    pub fn may_use_house(self) -> bool {
        matches!(self, GhostState::LeavingHouse | GhostState::EnteringHouse)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HuntingPhase {
    Scatter,
    Chase,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuntimeEvent {
    HuntingPhaseChanged {
        #[serde(rename = "phaseIndex")]
        phase_index: u8,
        phase: HuntingPhase,
    },
    GhostStateChanged {
        ghost: GhostRole,
        from: GhostState,
        to: GhostState,
    },
    CruiseElroyChanged {
        level: i8,
    },
    GhostReleased {
        ghost: GhostRole,
    },
    FoodEaten {
        tile: Tile,
        energizer: bool,
    },
    PowerStarted {
        ticks: u32,
    },
    PowerEnded,
    GhostEaten {
        ghost: GhostRole,
        tile: Tile,
    },
    PacKilled {
        by: GhostRole,
        tile: Tile,
    },
    BonusEaten {
        tile: Tile,
    },
    LevelCompleted {
        level: u32,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PacView {
    pub tile: Tile,
    pub dir: Direction,
    #[serde(rename = "wishDir")]
    pub wish_dir: Option<Direction>,
    /// False once Pac-Man is stopped by a wall.
    pub moved: bool,
    #[serde(rename = "newTileEntered")]
    pub new_tile_entered: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct GhostView {
    pub role: GhostRole,
    pub state: GhostState,
    pub tile: Tile,
    pub dir: Direction,
    #[serde(rename = "wishDir")]
    pub wish_dir: Direction,
    #[serde(rename = "targetTile")]
    pub target_tile: Option<Tile>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub level: u32,
    pub phase: HuntingPhase,
    #[serde(rename = "phaseIndex")]
    pub phase_index: u8,
    #[serde(rename = "foodLeft")]
    pub food_left: u32,
    #[serde(rename = "powerTicksLeft")]
    pub power_ticks_left: u32,
    #[serde(rename = "cruiseElroy")]
    pub cruise_elroy: i8,
    pub pac: PacView,
    pub ghosts: Vec<GhostView>,
    pub events: Vec<RuntimeEvent>,
}
