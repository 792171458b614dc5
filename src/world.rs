use std::collections::HashSet;

use crate::error::EngineError;
use crate::types::{Direction, GhostRole, Tile};

/// Read-only view of the maze consumed by ghost targeting and the autopilot.
pub trait WorldQuery {
    fn width(&self) -> i32;
    fn height(&self) -> i32;

    fn is_inside(&self, tile: Tile) -> bool {
        tile.x >= 0 && tile.y >= 0 && tile.x < self.width() && tile.y < self.height()
    }

    /// Tiles outside the map count as walls.
    fn is_wall(&self, tile: Tile) -> bool;
    fn is_door(&self, tile: Tile) -> bool;
    fn is_house_interior(&self, tile: Tile) -> bool;
    fn is_tunnel(&self, tile: Tile) -> bool;
    fn portal_wrap(&self, tile: Tile) -> Tile;
    fn has_food_at(&self, tile: Tile) -> bool;
    fn is_energizer_tile(&self, tile: Tile) -> bool;
    fn uneaten_food_count(&self) -> u32;
    fn special_no_up_tiles(&self) -> &HashSet<Tile>;
    /// Uneaten food in row-major order.
    fn food_tiles(&self) -> Vec<Tile>;

    /// Open maze tile outside the ghost house.
    fn is_open(&self, tile: Tile) -> bool {
        self.is_inside(tile)
            && !self.is_wall(tile)
            && !self.is_door(tile)
            && !self.is_house_interior(tile)
    }

    fn is_intersection(&self, tile: Tile) -> bool {
        if !self.is_open(tile) {
            return false;
        }
        Direction::ALL
            .iter()
            .filter(|dir| self.is_open(self.portal_wrap(tile.neighbor(**dir))))
            .count()
            >= 3
    }

    fn has_uneaten_energizer(&self, tile: Tile) -> bool {
        self.is_energizer_tile(tile) && self.has_food_at(tile)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Cell {
    Wall,
    Path,
    Tunnel,
    Door,
    House,
}

/// Fixed house and corner geometry for one maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HouseLayout {
    /// Tile right above the door; ghosts leave and re-enter through it.
    pub entry: Tile,
    pub home: [Tile; 4],
    pub revival: [Tile; 4],
    pub scatter: [Tile; 4],
    pub pac_start: Tile,
}

impl HouseLayout {
    pub fn arcade() -> Self {
        Self {
            entry: Tile::new(13, 14),
            home: [
                Tile::new(13, 14),
                Tile::new(13, 17),
                Tile::new(11, 17),
                Tile::new(15, 17),
            ],
            revival: [
                Tile::new(13, 17),
                Tile::new(13, 17),
                Tile::new(11, 17),
                Tile::new(15, 17),
            ],
            scatter: [
                Tile::new(25, 0),
                Tile::new(2, 0),
                Tile::new(27, 34),
                Tile::new(0, 34),
            ],
            pac_start: Tile::new(13, 26),
        }
    }

    pub fn home_of(&self, role: GhostRole) -> Tile {
        self.home[role.index()]
    }

    pub fn revival_of(&self, role: GhostRole) -> Tile {
        self.revival[role.index()]
    }

    pub fn scatter_of(&self, role: GhostRole) -> Tile {
        self.scatter[role.index()]
    }
}

const ARCADE_MAP: &str = "\
############################
############################
############################
############################
#............##............#
#.####.#####.##.#####.####.#
#o####.#####.##.#####.####o#
#.####.#####.##.#####.####.#
#..........................#
#.####.##.########.##.####.#
#.####.##.########.##.####.#
#......##....##....##......#
######.##### ## #####.######
######.##### ## #####.######
######.##          ##.######
######.## ###--### ##.######
######.## #______# ##.######
tttttt.   #______#   .tttttt
######.## #______# ##.######
######.## ######## ##.######
######.##          ##.######
######.## ######## ##.######
######.## ######## ##.######
#............##............#
#.####.#####.##.#####.####.#
#.####.#####.##.#####.####.#
#o..##.......  .......##..o#
###.##.##.########.##.##.###
###.##.##.########.##.##.###
#......##....##....##......#
#.##########.##.##########.#
#.##########.##.##########.#
#..........................#
############################
############################
############################";

/// Ghosts may not turn up on these tiles in the arcade maze.
pub const ARCADE_NO_UP_TILES: [Tile; 4] = [
    Tile::new(12, 14),
    Tile::new(15, 14),
    Tile::new(12, 26),
    Tile::new(15, 26),
];

#[derive(Clone, Debug)]
pub struct Maze {
    width: i32,
    height: i32,
    cells: Vec<Cell>,
    food: Vec<bool>,
    initial_food: Vec<bool>,
    energizers: Vec<bool>,
    food_left: u32,
    total_food: u32,
    no_up_tiles: HashSet<Tile>,
    pub house: HouseLayout,
}

impl Maze {
    pub fn arcade() -> Self {
        Self::parse(ARCADE_MAP, HouseLayout::arcade(), &ARCADE_NO_UP_TILES)
            .expect("built-in arcade maze should parse")
    }

    /// `#` wall, `.` pellet, `o` energizer, `-` house door, `_` house floor,
    /// `t` tunnel, space empty path.
    pub fn parse(text: &str, house: HouseLayout, no_up_tiles: &[Tile]) -> Result<Self, EngineError> {
        let lines: Vec<&str> = text.lines().collect();
        let Some(first) = lines.first() else {
            return Err(EngineError::MazeParse {
                line: 0,
                reason: "empty maze".to_string(),
            });
        };
        let width = first.chars().count();
        let mut cells = Vec::with_capacity(width * lines.len());
        let mut food = Vec::with_capacity(width * lines.len());
        let mut energizers = Vec::with_capacity(width * lines.len());

        for (line_idx, line) in lines.iter().enumerate() {
            if line.chars().count() != width {
                return Err(EngineError::MazeParse {
                    line: line_idx + 1,
                    reason: format!("expected {} columns, found {}", width, line.chars().count()),
                });
            }
            for c in line.chars() {
                let (cell, has_food, energizer) = match c {
                    '#' => (Cell::Wall, false, false),
                    '.' => (Cell::Path, true, false),
                    'o' => (Cell::Path, true, true),
                    ' ' => (Cell::Path, false, false),
                    't' => (Cell::Tunnel, false, false),
                    '-' => (Cell::Door, false, false),
                    '_' => (Cell::House, false, false),
                    other => {
                        return Err(EngineError::MazeParse {
                            line: line_idx + 1,
                            reason: format!("unknown tile character {other:?}"),
                        })
                    }
                };
                cells.push(cell);
                food.push(has_food);
                energizers.push(energizer);
            }
        }

        let total_food = food.iter().filter(|f| **f).count() as u32;
        Ok(Self {
            width: width as i32,
            height: lines.len() as i32,
            cells,
            initial_food: food.clone(),
            food,
            energizers,
            food_left: total_food,
            total_food,
            no_up_tiles: no_up_tiles.iter().copied().collect(),
            house,
        })
    }

    fn index(&self, tile: Tile) -> Option<usize> {
        if !self.is_inside(tile) {
            return None;
        }
        Some((tile.y * self.width + tile.x) as usize)
    }

    fn cell(&self, tile: Tile) -> Cell {
        self.index(tile)
            .map(|idx| self.cells[idx])
            .unwrap_or(Cell::Wall)
    }

    pub fn total_food(&self) -> u32 {
        self.total_food
    }

    /// Removes the food at `tile`. Returns whether it was an energizer, or
    /// `None` if there was nothing to eat.
    pub fn eat_food(&mut self, tile: Tile) -> Option<bool> {
        let idx = self.index(tile)?;
        if !self.food[idx] {
            return None;
        }
        self.food[idx] = false;
        self.food_left = self.food_left.saturating_sub(1);
        Some(self.energizers[idx])
    }

    /// Puts every pellet and energizer back for a new level.
    pub fn restore_food(&mut self) {
        self.food.clone_from(&self.initial_food);
        self.food_left = self.total_food;
    }
}

impl WorldQuery for Maze {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn is_wall(&self, tile: Tile) -> bool {
        self.cell(tile) == Cell::Wall
    }

    fn is_door(&self, tile: Tile) -> bool {
        self.cell(tile) == Cell::Door
    }

    fn is_house_interior(&self, tile: Tile) -> bool {
        self.cell(tile) == Cell::House
    }

    fn is_tunnel(&self, tile: Tile) -> bool {
        self.cell(tile) == Cell::Tunnel
    }

    fn portal_wrap(&self, tile: Tile) -> Tile {
        if tile.y < 0 || tile.y >= self.height {
            return tile;
        }
        let left = Tile::new(0, tile.y);
        let right = Tile::new(self.width - 1, tile.y);
        let is_portal_row = !self.is_wall(left) && !self.is_wall(right);
        if !is_portal_row {
            return tile;
        }
        if tile.x < 0 {
            Tile::new(tile.x + self.width, tile.y)
        } else if tile.x >= self.width {
            Tile::new(tile.x - self.width, tile.y)
        } else {
            tile
        }
    }

    fn has_food_at(&self, tile: Tile) -> bool {
        self.index(tile).map(|idx| self.food[idx]).unwrap_or(false)
    }

    fn is_energizer_tile(&self, tile: Tile) -> bool {
        self.index(tile)
            .map(|idx| self.energizers[idx])
            .unwrap_or(false)
    }

    fn uneaten_food_count(&self) -> u32 {
        self.food_left
    }

    fn special_no_up_tiles(&self) -> &HashSet<Tile> {
        &self.no_up_tiles
    }

    fn food_tiles(&self) -> Vec<Tile> {
        self.food
            .iter()
            .enumerate()
            .filter(|(_, has_food)| **has_food)
            .map(|(idx, _)| Tile::new(idx as i32 % self.width, idx as i32 / self.width))
            .collect()
    }
}
