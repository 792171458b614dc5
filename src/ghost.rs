use crate::constants::{
    tiles_per_tick, BASHFUL_LOOKAHEAD, GHOST_EATEN_TICKS, GHOST_SPEED_INSIDE_HOUSE_PERCENT,
    GHOST_SPEED_RETURNING_PERCENT, POKEY_SCATTER_RADIUS, SPEEDY_LOOKAHEAD,
};
use crate::elroy::ElroyLevel;
use crate::level::LevelData;
use crate::navigation::direction_towards;
use crate::rng::Rng;
use crate::types::{Direction, GhostRole, GhostState, GhostView, HuntingPhase, Tile};
use crate::world::{HouseLayout, WorldQuery};

/// Everything a ghost reads about the rest of the game when it picks a
/// target. Built once per tick from end-of-previous-tick positions, so no
/// ghost sees another ghost's move from the same tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetContext {
    pub phase: HuntingPhase,
    pub pac_tile: Tile,
    pub pac_dir: Direction,
    pub shadow_tile: Tile,
    pub elroy: ElroyLevel,
    pub power_active: bool,
    pub simulate_overflow_bug: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    pub role: GhostRole,
    pub from: GhostState,
    pub to: GhostState,
}

/// The tile `steps` ahead of an actor. The arcade computed "ahead while
/// facing up" with an overflow that also shifts the point left by `steps`.
pub fn tiles_ahead(tile: Tile, dir: Direction, steps: i32, overflow_bug: bool) -> Tile {
    let ahead = tile.towards(dir, steps);
    if overflow_bug && dir == Direction::Up {
        ahead.plus(-steps, 0)
    } else {
        ahead
    }
}

/// Chase-mode target for each role. Pure function of the context.
pub fn chase_target(role: GhostRole, ghost_tile: Tile, scatter_tile: Tile, ctx: &TargetContext) -> Tile {
    match role {
        GhostRole::Shadow => ctx.pac_tile,
        GhostRole::Speedy => tiles_ahead(
            ctx.pac_tile,
            ctx.pac_dir,
            SPEEDY_LOOKAHEAD,
            ctx.simulate_overflow_bug,
        ),
        GhostRole::Bashful => {
            let ahead = tiles_ahead(
                ctx.pac_tile,
                ctx.pac_dir,
                BASHFUL_LOOKAHEAD,
                ctx.simulate_overflow_bug,
            );
            Tile::new(
                2 * ahead.x - ctx.shadow_tile.x,
                2 * ahead.y - ctx.shadow_tile.y,
            )
        }
        GhostRole::Pokey => {
            let radius = POKEY_SCATTER_RADIUS as i32;
            if ghost_tile.squared_distance(ctx.pac_tile) <= radius * radius {
                scatter_tile
            } else {
                ctx.pac_tile
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Ghost {
    pub role: GhostRole,
    pub state: GhostState,
    pub tile: Tile,
    pub dir: Direction,
    pub wish_dir: Direction,
    home: Tile,
    revival: Tile,
    scatter: Tile,
    house_entry: Tile,
    move_buffer: f32,
    reverse_pending: bool,
    eaten_ticks: u32,
    /// Frightened before making it out of the house; still on the exit route.
    leaving: bool,
    /// Eaten during the current power period. Comes back out hunting.
    fright_victim: bool,
}

impl Ghost {
    pub fn new(role: GhostRole, house: &HouseLayout) -> Self {
        let mut ghost = Self {
            role,
            state: GhostState::Locked,
            tile: house.home_of(role),
            dir: Direction::Left,
            wish_dir: Direction::Left,
            home: house.home_of(role),
            revival: house.revival_of(role),
            scatter: house.scatter_of(role),
            house_entry: house.entry,
            move_buffer: 0.0,
            reverse_pending: false,
            eaten_ticks: 0,
            leaving: false,
            fright_victim: false,
        };
        ghost.reset();
        ghost
    }

    /// Back to the start position, locked in (or at) the house.
    pub fn reset(&mut self) {
        self.state = GhostState::Locked;
        self.tile = self.home;
        self.dir = match self.role {
            GhostRole::Shadow => Direction::Left,
            GhostRole::Speedy => Direction::Down,
            GhostRole::Bashful | GhostRole::Pokey => Direction::Up,
        };
        self.wish_dir = self.dir;
        self.move_buffer = 0.0;
        self.reverse_pending = false;
        self.eaten_ticks = 0;
        self.leaving = false;
        self.fright_victim = false;
    }

    pub fn scatter_tile(&self) -> Tile {
        self.scatter
    }

    pub fn is_reverse_pending(&self) -> bool {
        self.reverse_pending
    }

    /// Current target, recomputed from scratch on every call. `None` only
    /// while frightened, where moves are random.
    pub fn target_tile(&self, ctx: &TargetContext) -> Option<Tile> {
        match self.state {
            GhostState::Hunting => {
                let chasing = ctx.phase == HuntingPhase::Chase
                    || (self.role == GhostRole::Shadow && ctx.elroy != ElroyLevel::Off);
                Some(if chasing {
                    chase_target(self.role, self.tile, self.scatter, ctx)
                } else {
                    self.scatter
                })
            }
            GhostState::Frightened => None,
            GhostState::Locked => Some(self.home),
            GhostState::LeavingHouse | GhostState::Eaten | GhostState::ReturningHome => {
                Some(self.house_entry)
            }
            GhostState::EnteringHouse => Some(self.revival),
        }
    }

    pub fn speed_percent(&self, world: &dyn WorldQuery, data: &LevelData, elroy: ElroyLevel) -> u32 {
        match self.state {
            GhostState::Locked | GhostState::Eaten => 0,
            GhostState::LeavingHouse | GhostState::EnteringHouse => {
                GHOST_SPEED_INSIDE_HOUSE_PERCENT
            }
            GhostState::Frightened if self.leaving => GHOST_SPEED_INSIDE_HOUSE_PERCENT,
            GhostState::ReturningHome => GHOST_SPEED_RETURNING_PERCENT,
            GhostState::Frightened => {
                if world.is_tunnel(self.tile) {
                    data.ghost_tunnel_speed
                } else {
                    data.ghost_speed_frightened
                }
            }
            GhostState::Hunting => {
                if world.is_tunnel(self.tile) {
                    data.ghost_tunnel_speed
                } else if self.role == GhostRole::Shadow && elroy == ElroyLevel::One {
                    data.elroy1_speed
                } else if self.role == GhostRole::Shadow && elroy == ElroyLevel::Two {
                    data.elroy2_speed
                } else {
                    data.ghost_speed
                }
            }
        }
    }

    /// Opens the house for this ghost. A ghost already standing on the
    /// entry tile goes straight to hunting.
    pub fn release(&mut self, power_active: bool) -> Option<StateChange> {
        if self.state != GhostState::Locked {
            return None;
        }
        if self.tile == self.house_entry {
            let to = if power_active && !self.fright_victim {
                GhostState::Frightened
            } else {
                GhostState::Hunting
            };
            return Some(self.change_state(to));
        }
        Some(self.change_state(GhostState::LeavingHouse))
    }

    /// Energizer eaten: a new power period starts. Leaving ghosts turn
    /// frightened but keep walking out. Locked ghosts and ghosts on their way
    /// home ignore it.
    pub fn frighten(&mut self) -> Option<StateChange> {
        self.fright_victim = false;
        match self.state {
            GhostState::Hunting => {
                self.reverse_pending = true;
                Some(self.change_state(GhostState::Frightened))
            }
            GhostState::Frightened => {
                self.reverse_pending = !self.leaving;
                None
            }
            GhostState::LeavingHouse => {
                self.leaving = true;
                Some(self.change_state(GhostState::Frightened))
            }
            _ => None,
        }
    }

    /// Power period over. A ghost still inside goes back to leaving.
    pub fn end_fright(&mut self) -> Option<StateChange> {
        self.fright_victim = false;
        if self.state != GhostState::Frightened {
            return None;
        }
        let to = if self.leaving {
            GhostState::LeavingHouse
        } else {
            GhostState::Hunting
        };
        self.leaving = false;
        Some(self.change_state(to))
    }

    /// Scatter/chase switch: hunting ghosts turn around at the next step.
    pub fn on_phase_change(&mut self) {
        if self.state == GhostState::Hunting {
            self.reverse_pending = true;
        }
    }

    pub fn eaten(&mut self) -> Option<StateChange> {
        if self.state != GhostState::Frightened {
            return None;
        }
        self.eaten_ticks = GHOST_EATEN_TICKS;
        self.reverse_pending = false;
        self.leaving = false;
        self.fright_victim = true;
        self.move_buffer = 0.0;
        Some(self.change_state(GhostState::Eaten))
    }

    pub fn update(
        &mut self,
        world: &dyn WorldQuery,
        ctx: &TargetContext,
        data: &LevelData,
        rng: &mut Rng,
    ) -> Option<StateChange> {
        match self.state {
            GhostState::Locked => return None,
            GhostState::Eaten => {
                self.eaten_ticks = self.eaten_ticks.saturating_sub(1);
                if self.eaten_ticks == 0 {
                    return Some(self.change_state(GhostState::ReturningHome));
                }
                return None;
            }
            _ => {}
        }

        if let Some(change) = self.check_arrival(ctx) {
            return Some(change);
        }

        self.move_buffer += tiles_per_tick(self.speed_percent(world, data, ctx.elroy));
        let mut safety = 0;
        while self.move_buffer >= 1.0 {
            self.move_buffer -= 1.0;
            safety += 1;
            if safety > 3 {
                break;
            }
            self.step(world, ctx, rng);
            if let Some(change) = self.check_arrival(ctx) {
                return Some(change);
            }
        }
        None
    }

    pub fn view(&self, ctx: &TargetContext) -> GhostView {
        GhostView {
            role: self.role,
            state: self.state,
            tile: self.tile,
            dir: self.dir,
            wish_dir: self.wish_dir,
            target_tile: self.target_tile(ctx),
        }
    }

    fn change_state(&mut self, to: GhostState) -> StateChange {
        let from = self.state;
        self.state = to;
        StateChange {
            role: self.role,
            from,
            to,
        }
    }

    fn check_arrival(&mut self, ctx: &TargetContext) -> Option<StateChange> {
        match self.state {
            GhostState::LeavingHouse if self.tile == self.house_entry => {
                self.dir = Direction::Left;
                self.wish_dir = Direction::Left;
                self.move_buffer = 0.0;
                let to = if ctx.power_active && !self.fright_victim {
                    GhostState::Frightened
                } else {
                    GhostState::Hunting
                };
                Some(self.change_state(to))
            }
            GhostState::Frightened if self.leaving && self.tile == self.house_entry => {
                self.dir = Direction::Left;
                self.wish_dir = Direction::Left;
                self.move_buffer = 0.0;
                self.leaving = false;
                None
            }
            GhostState::ReturningHome if self.tile == self.house_entry => {
                self.dir = Direction::Down;
                self.wish_dir = Direction::Down;
                Some(self.change_state(GhostState::EnteringHouse))
            }
            GhostState::EnteringHouse if self.tile == self.revival => {
                self.dir = Direction::Up;
                self.wish_dir = Direction::Up;
                self.move_buffer = 0.0;
                Some(self.change_state(GhostState::Locked))
            }
            _ => None,
        }
    }

    fn can_access(&self, world: &dyn WorldQuery, tile: Tile) -> bool {
        if !world.is_inside(tile) || world.is_wall(tile) {
            return false;
        }
        if world.is_door(tile) || world.is_house_interior(tile) {
            return self.state.may_use_house() || self.leaving;
        }
        true
    }

    fn neighbor(&self, world: &dyn WorldQuery, dir: Direction) -> Option<Tile> {
        let tile = world.portal_wrap(self.tile.neighbor(dir));
        self.can_access(world, tile).then_some(tile)
    }

    fn choose_direction(
        &mut self,
        world: &dyn WorldQuery,
        ctx: &TargetContext,
        rng: &mut Rng,
    ) -> Option<Direction> {
        if self.reverse_pending && self.state.is_roaming() && !self.leaving {
            self.reverse_pending = false;
            return Some(self.dir.opposite());
        }
        match self.state {
            GhostState::LeavingHouse => Some(self.house_route(self.house_entry, true)),
            GhostState::EnteringHouse => Some(self.house_route(self.revival, false)),
            GhostState::Frightened if self.leaving => Some(self.house_route(self.house_entry, true)),
            GhostState::Frightened => self.random_direction(world, rng),
            GhostState::Hunting | GhostState::ReturningHome => {
                let target = self.target_tile(ctx)?;
                let no_up = self.state == GhostState::Hunting
                    && world.special_no_up_tiles().contains(&self.tile);
                direction_towards(self.dir, target, |dir| {
                    if no_up && dir == Direction::Up {
                        return None;
                    }
                    self.neighbor(world, dir)
                })
            }
            GhostState::Locked | GhostState::Eaten => None,
        }
    }

    /// Scripted in-house route: line up with the door column, then go
    /// straight through it (up when leaving, down when entering).
    fn house_route(&self, goal: Tile, leaving: bool) -> Direction {
        let door_column = self.house_entry.x;
        if leaving {
            if self.tile.x < door_column {
                Direction::Right
            } else if self.tile.x > door_column {
                Direction::Left
            } else {
                Direction::Up
            }
        } else if self.tile.y < goal.y {
            Direction::Down
        } else if self.tile.x < goal.x {
            Direction::Right
        } else if self.tile.x > goal.x {
            Direction::Left
        } else {
            Direction::Up
        }
    }

    fn random_direction(&self, world: &dyn WorldQuery, rng: &mut Rng) -> Option<Direction> {
        let options: Vec<Direction> = Direction::ALL
            .into_iter()
            .filter(|dir| *dir != self.dir.opposite())
            .filter(|dir| self.neighbor(world, *dir).is_some())
            .collect();
        if options.is_empty() {
            return self
                .neighbor(world, self.dir.opposite())
                .map(|_| self.dir.opposite());
        }
        Some(options[rng.pick_index(options.len())])
    }

    /// One whole-tile move. Holds position when the chosen way is blocked.
    fn step(&mut self, world: &dyn WorldQuery, ctx: &TargetContext, rng: &mut Rng) {
        if let Some(dir) = self.choose_direction(world, ctx, rng) {
            self.wish_dir = dir;
        }
        if let Some(next) = self.neighbor(world, self.wish_dir) {
            self.tile = next;
            self.dir = self.wish_dir;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::LevelTable;
    use crate::world::Maze;

    fn ctx(phase: HuntingPhase, pac_tile: Tile, pac_dir: Direction) -> TargetContext {
        TargetContext {
            phase,
            pac_tile,
            pac_dir,
            shadow_tile: Tile::new(13, 14),
            elroy: ElroyLevel::Off,
            power_active: false,
            simulate_overflow_bug: true,
        }
    }

    fn hunting(role: GhostRole, tile: Tile, dir: Direction) -> Ghost {
        let mut ghost = Ghost::new(role, &HouseLayout::arcade());
        ghost.state = GhostState::Hunting;
        ghost.tile = tile;
        ghost.dir = dir;
        ghost
    }

    #[test]
    fn scatter_phase_targets_corner() {
        for role in GhostRole::ALL {
            let ghost = hunting(role, Tile::new(6, 8), Direction::Left);
            let c = ctx(HuntingPhase::Scatter, Tile::new(13, 26), Direction::Left);
            assert_eq!(ghost.target_tile(&c), Some(HouseLayout::arcade().scatter_of(role)));
        }
    }

    #[test]
    fn shadow_chases_in_scatter_when_elroy_active() {
        let ghost = hunting(GhostRole::Shadow, Tile::new(6, 8), Direction::Left);
        let mut c = ctx(HuntingPhase::Scatter, Tile::new(13, 26), Direction::Left);
        c.elroy = ElroyLevel::One;
        assert_eq!(ghost.target_tile(&c), Some(Tile::new(13, 26)));

        let speedy = hunting(GhostRole::Speedy, Tile::new(6, 8), Direction::Left);
        assert_eq!(speedy.target_tile(&c), Some(speedy.scatter_tile()));
    }

    #[test]
    fn speedy_overflow_bug_when_facing_up() {
        let ghost = hunting(GhostRole::Speedy, Tile::new(6, 8), Direction::Left);
        let mut c = ctx(HuntingPhase::Chase, Tile::new(13, 26), Direction::Up);
        assert_eq!(ghost.target_tile(&c), Some(Tile::new(9, 22)));
        c.simulate_overflow_bug = false;
        assert_eq!(ghost.target_tile(&c), Some(Tile::new(13, 22)));
        c.pac_dir = Direction::Right;
        assert_eq!(ghost.target_tile(&c), Some(Tile::new(17, 26)));
    }

    #[test]
    fn bashful_reflects_through_shadow() {
        let ghost = hunting(GhostRole::Bashful, Tile::new(6, 8), Direction::Left);
        let mut c = ctx(HuntingPhase::Chase, Tile::new(10, 20), Direction::Left);
        c.shadow_tile = Tile::new(12, 16);
        // Two ahead of Pac-Man is (8,20); doubled vector from (12,16) lands on (4,24).
        assert_eq!(ghost.target_tile(&c), Some(Tile::new(4, 24)));

        c.pac_dir = Direction::Up;
        // With the bug the pivot is (8,18): 2*(8,18) - (12,16) = (4,20).
        assert_eq!(ghost.target_tile(&c), Some(Tile::new(4, 20)));
    }

    #[test]
    fn pokey_switches_at_eight_tiles() {
        let pac = Tile::new(13, 26);
        let c = ctx(HuntingPhase::Chase, pac, Direction::Left);
        let far = hunting(GhostRole::Pokey, Tile::new(3, 26), Direction::Left);
        assert_eq!(far.target_tile(&c), Some(pac));
        let near = hunting(GhostRole::Pokey, Tile::new(8, 26), Direction::Left);
        assert_eq!(near.target_tile(&c), Some(near.scatter_tile()));
        let edge = hunting(GhostRole::Pokey, Tile::new(5, 26), Direction::Left);
        assert_eq!(edge.target_tile(&c), Some(edge.scatter_tile()));
        let past_edge = hunting(GhostRole::Pokey, Tile::new(5, 25), Direction::Left);
        assert_eq!(past_edge.target_tile(&c), Some(pac));
    }

    #[test]
    fn target_is_pure() {
        let ghost = hunting(GhostRole::Bashful, Tile::new(6, 8), Direction::Left);
        let c = ctx(HuntingPhase::Chase, Tile::new(10, 20), Direction::Down);
        assert_eq!(ghost.target_tile(&c), ghost.target_tile(&c));
    }

    #[test]
    fn frightened_has_no_target_and_eaten_heads_home() {
        let mut ghost = hunting(GhostRole::Speedy, Tile::new(6, 8), Direction::Left);
        let c = ctx(HuntingPhase::Chase, Tile::new(10, 20), Direction::Down);
        ghost.frighten();
        assert_eq!(ghost.target_tile(&c), None);
        ghost.eaten();
        assert_eq!(ghost.target_tile(&c), Some(HouseLayout::arcade().entry));
    }

    #[test]
    fn speed_priority_tunnel_then_elroy() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut shadow = hunting(GhostRole::Shadow, Tile::new(6, 8), Direction::Left);
        assert_eq!(shadow.speed_percent(&maze, &data, ElroyLevel::Off), 75);
        assert_eq!(shadow.speed_percent(&maze, &data, ElroyLevel::One), 80);
        assert_eq!(shadow.speed_percent(&maze, &data, ElroyLevel::Two), 85);
        shadow.tile = Tile::new(2, 17);
        assert_eq!(shadow.speed_percent(&maze, &data, ElroyLevel::Two), 40);

        let speedy = hunting(GhostRole::Speedy, Tile::new(6, 8), Direction::Left);
        assert_eq!(speedy.speed_percent(&maze, &data, ElroyLevel::Two), 75);
    }

    #[test]
    fn no_up_tiles_block_hunting_ghosts() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut rng = Rng::new(1);
        // Moving right on (12,26) with a target straight above.
        let mut ghost = hunting(GhostRole::Shadow, Tile::new(12, 26), Direction::Right);
        let c = ctx(HuntingPhase::Chase, Tile::new(12, 4), Direction::Left);
        ghost.move_buffer = 1.0;
        ghost.update(&maze, &c, &data, &mut rng);
        assert_eq!(ghost.dir, Direction::Right);
        assert_eq!(ghost.tile, Tile::new(13, 26));
    }

    #[test]
    fn phase_change_reverses_at_next_step() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut rng = Rng::new(1);
        let mut ghost = hunting(GhostRole::Shadow, Tile::new(3, 8), Direction::Right);
        let c = ctx(HuntingPhase::Chase, Tile::new(26, 8), Direction::Left);
        ghost.on_phase_change();
        ghost.move_buffer = 1.0;
        ghost.update(&maze, &c, &data, &mut rng);
        assert_eq!(ghost.dir, Direction::Left);
        assert_eq!(ghost.tile, Tile::new(2, 8));
        assert!(!ghost.is_reverse_pending());
    }

    #[test]
    fn release_and_leave_house() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut rng = Rng::new(3);
        let house = HouseLayout::arcade();
        let c = ctx(HuntingPhase::Scatter, Tile::new(13, 26), Direction::Left);

        let mut shadow = Ghost::new(GhostRole::Shadow, &house);
        let change = shadow.release(false).expect("locked ghost should release");
        assert_eq!(change.to, GhostState::Hunting);

        let mut bashful = Ghost::new(GhostRole::Bashful, &house);
        assert_eq!(
            bashful.release(false).map(|c| c.to),
            Some(GhostState::LeavingHouse)
        );
        assert!(bashful.release(false).is_none());

        let mut last = None;
        for _ in 0..2_000 {
            if let Some(change) = bashful.update(&maze, &c, &data, &mut rng) {
                last = Some(change);
                break;
            }
        }
        let change = last.expect("bashful should get out");
        assert_eq!(change.to, GhostState::Hunting);
        assert_eq!(bashful.tile, house.entry);
        assert_eq!(bashful.dir, Direction::Left);
    }

    #[test]
    fn eaten_ghost_returns_and_locks() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut rng = Rng::new(3);
        let house = HouseLayout::arcade();
        let c = ctx(HuntingPhase::Scatter, Tile::new(13, 26), Direction::Left);

        let mut ghost = hunting(GhostRole::Pokey, Tile::new(6, 8), Direction::Left);
        ghost.frighten();
        ghost.eaten().expect("frightened ghost can be eaten");

        let mut states = vec![ghost.state];
        for _ in 0..10_000 {
            if let Some(change) = ghost.update(&maze, &c, &data, &mut rng) {
                states.push(change.to);
                if change.to == GhostState::Locked {
                    break;
                }
            }
        }
        assert_eq!(
            states,
            vec![
                GhostState::Eaten,
                GhostState::ReturningHome,
                GhostState::EnteringHouse,
                GhostState::Locked
            ]
        );
        assert_eq!(ghost.tile, house.revival_of(GhostRole::Pokey));
    }

    #[test]
    fn leaving_ghost_is_frightened_and_keeps_walking_out() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut rng = Rng::new(5);
        let house = HouseLayout::arcade();
        let mut c = ctx(HuntingPhase::Scatter, Tile::new(13, 26), Direction::Left);
        c.power_active = true;

        let mut bashful = Ghost::new(GhostRole::Bashful, &house);
        bashful.release(false);
        let change = bashful.frighten().expect("leaving ghost should be frightened");
        assert_eq!(change.from, GhostState::LeavingHouse);
        assert_eq!(change.to, GhostState::Frightened);
        assert!(!bashful.is_reverse_pending());
        assert_eq!(bashful.target_tile(&c), None);
        assert_eq!(
            bashful.speed_percent(&maze, &data, ElroyLevel::Off),
            GHOST_SPEED_INSIDE_HOUSE_PERCENT
        );

        for _ in 0..2_000 {
            assert!(bashful.update(&maze, &c, &data, &mut rng).is_none());
            if !bashful.leaving {
                break;
            }
        }
        assert_eq!(bashful.state, GhostState::Frightened);
        assert_eq!(bashful.tile, house.entry);
        assert_eq!(bashful.dir, Direction::Left);
    }

    #[test]
    fn power_ending_inside_house_resumes_leaving() {
        let house = HouseLayout::arcade();
        let mut pokey = Ghost::new(GhostRole::Pokey, &house);
        pokey.release(false);
        pokey.frighten();
        let change = pokey.end_fright().expect("frightened ghost should recover");
        assert_eq!(change.to, GhostState::LeavingHouse);
        assert!(!pokey.leaving);
    }

    #[test]
    fn ghost_eaten_during_power_comes_back_out_hunting() {
        let maze = Maze::arcade();
        let data = LevelTable::arcade().level(1);
        let mut rng = Rng::new(9);
        let house = HouseLayout::arcade();
        let mut c = ctx(HuntingPhase::Scatter, Tile::new(1, 32), Direction::Left);
        c.power_active = true;

        let mut shadow = hunting(GhostRole::Shadow, Tile::new(6, 8), Direction::Left);
        shadow.frighten();
        shadow.eaten().expect("frightened ghost can be eaten");
        for _ in 0..10_000 {
            shadow.update(&maze, &c, &data, &mut rng);
            if shadow.state == GhostState::Locked {
                break;
            }
        }
        assert_eq!(shadow.state, GhostState::Locked);
        assert_eq!(
            shadow.release(true).map(|change| change.to),
            Some(GhostState::LeavingHouse)
        );

        let mut exit = None;
        for _ in 0..2_000 {
            if let Some(change) = shadow.update(&maze, &c, &data, &mut rng) {
                exit = Some(change);
                break;
            }
        }
        assert_eq!(exit.map(|change| change.to), Some(GhostState::Hunting));
        assert_eq!(shadow.tile, house.entry);

        // A fresh energizer makes it fair game again.
        shadow.frighten();
        assert_eq!(shadow.state, GhostState::Frightened);
    }

    #[test]
    fn frighten_ignores_ghosts_in_house() {
        let house = HouseLayout::arcade();
        let mut ghost = Ghost::new(GhostRole::Speedy, &house);
        assert!(ghost.frighten().is_none());
        assert_eq!(ghost.state, GhostState::Locked);
        assert!(ghost.eaten().is_none());
    }
}
