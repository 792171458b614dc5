use crate::elroy::ElroyController;
use crate::error::EngineError;
use crate::ghost::{Ghost, TargetContext};
use crate::hunting::HuntingTimer;
use crate::level::{EngineConfig, LevelData, LevelTable};
use crate::rng::Rng;
use crate::types::{
    Direction, GhostRole, GhostView, PacView, RuntimeEvent, Snapshot, Tile,
};
use crate::world::{Maze, WorldQuery};

mod ghost_system;
mod pac_system;
mod utils;

use self::utils::state_change_event;

#[derive(Clone, Debug)]
struct PacInternal {
    tile: Tile,
    dir: Direction,
    wish_dir: Option<Direction>,
    move_buffer: f32,
    stuck: bool,
    new_tile_entered: bool,
}

impl PacInternal {
    fn at(tile: Tile) -> Self {
        Self {
            tile,
            dir: Direction::Left,
            wish_dir: None,
            move_buffer: 0.0,
            stuck: false,
            new_tile_entered: false,
        }
    }

    fn view(&self) -> PacView {
        PacView {
            tile: self.tile,
            dir: self.dir,
            wish_dir: self.wish_dir,
            moved: !self.stuck,
            new_tile_entered: self.new_tile_entered,
        }
    }
}

/// Single-owner tick driver for one maze: hunting timer, ghosts, Pac-Man and
/// the Cruise Elroy controller all advance together in `step`.
#[derive(Clone, Debug)]
pub struct GameEngine {
    pub config: EngineConfig,
    world: Maze,
    levels: LevelTable,
    level_number: u32,
    level: LevelData,

    rng: Rng,
    hunting: HuntingTimer,
    elroy: ElroyController,
    ghosts: Vec<Ghost>,
    pac: PacInternal,
    bonus: Option<Tile>,
    power_ticks_left: u32,
    events: Vec<RuntimeEvent>,

    tick_counter: u64,
    pac_dead: bool,
    level_complete: bool,
}

impl GameEngine {
    pub fn new(world: Maze, levels: LevelTable, config: EngineConfig, level_number: u32) -> Self {
        let ghosts = GhostRole::ALL
            .iter()
            .map(|role| Ghost::new(*role, &world.house))
            .collect();
        let pac = PacInternal::at(world.house.pac_start);
        let level = levels.level(level_number);
        let mut engine = Self {
            rng: Rng::new(config.rng_seed),
            config,
            world,
            levels,
            level_number,
            level,
            hunting: HuntingTimer::for_level(level_number),
            elroy: ElroyController::new(),
            ghosts,
            pac,
            bonus: None,
            power_ticks_left: 0,
            events: Vec::new(),
            tick_counter: 0,
            pac_dead: false,
            level_complete: false,
        };
        engine.start_level(level_number);
        engine
    }

    pub fn world(&self) -> &Maze {
        &self.world
    }

    pub fn level_number(&self) -> u32 {
        self.level_number
    }

    pub fn level_data(&self) -> &LevelData {
        &self.level
    }

    pub fn hunting_timer(&self) -> &HuntingTimer {
        &self.hunting
    }

    pub fn ghost(&self, role: GhostRole) -> &Ghost {
        &self.ghosts[role.index()]
    }

    pub fn is_level_complete(&self) -> bool {
        self.level_complete
    }

    pub fn is_pac_dead(&self) -> bool {
        self.pac_dead
    }

    pub fn is_power_active(&self) -> bool {
        self.power_ticks_left > 0
    }

    /// Fresh food, fresh timer, Elroy back to zero, everybody home.
    pub fn start_level(&mut self, level_number: u32) {
        self.level_number = level_number.max(1);
        self.level = self.levels.level(self.level_number);
        self.world.restore_food();
        self.hunting = HuntingTimer::for_level(self.level_number);
        self.elroy.reset();
        self.level_complete = false;
        self.bonus = None;
        self.reset_round();
    }

    /// Restart after Pac-Man's death. Food and the (suppressed) Elroy state
    /// carry over.
    pub fn reset_round(&mut self) {
        self.pac = PacInternal::at(self.world.house.pac_start);
        for ghost in &mut self.ghosts {
            ghost.reset();
        }
        self.power_ticks_left = 0;
        self.pac_dead = false;
        self.hunting.reset();
        self.hunting.start();
    }

    /// Opens the house door for one ghost. Returns whether anything happened.
    pub fn release_ghost(&mut self, role: GhostRole) -> bool {
        let power_active = self.is_power_active();
        let Some(change) = self.ghosts[role.index()].release(power_active) else {
            return false;
        };
        self.events.push(RuntimeEvent::GhostReleased { ghost: role });
        self.events.push(state_change_event(change));
        if let Some(level) = self.elroy.on_ghost_released(role) {
            self.events.push(RuntimeEvent::CruiseElroyChanged { level });
        }
        true
    }

    pub fn set_cruise_elroy(&mut self, value: i8) -> Result<(), EngineError> {
        if let Some(level) = self.elroy.set(value)? {
            self.events.push(RuntimeEvent::CruiseElroyChanged { level });
        }
        Ok(())
    }

    pub fn set_pac_wish(&mut self, dir: Direction) {
        self.pac.wish_dir = Some(dir);
    }

    pub fn set_bonus(&mut self, tile: Option<Tile>) {
        self.bonus = tile;
    }

    pub fn step(&mut self) {
        if self.pac_dead || self.level_complete {
            return;
        }
        self.tick_counter += 1;

        self.update_hunting_timer();
        self.update_power();
        self.update_cruise_elroy();

        let ctx = self.target_context();
        let pac_before = self.pac.tile;
        let ghosts_before: Vec<GhostView> =
            self.ghosts.iter().map(|ghost| ghost.view(&ctx)).collect();

        self.update_ghosts(&ctx);
        if self.config.autopilot {
            self.update_autopilot(&ghosts_before);
        }
        self.update_pac();
        self.resolve_collisions(pac_before, &ghosts_before);
        self.check_level_complete();
    }

    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        let ctx = self.target_context();
        let snapshot = Snapshot {
            tick: self.tick_counter,
            level: self.level_number,
            phase: self.hunting.phase(),
            phase_index: self.hunting.phase_index(),
            food_left: self.world.uneaten_food_count(),
            power_ticks_left: self.power_ticks_left,
            cruise_elroy: self.elroy.signed_value(),
            pac: self.pac.view(),
            ghosts: self.ghosts.iter().map(|ghost| ghost.view(&ctx)).collect(),
            events: if include_events {
                self.events.clone()
            } else {
                Vec::new()
            },
        };
        if include_events {
            self.events.clear();
        }
        snapshot
    }

    fn update_hunting_timer(&mut self) {
        let Some(change) = self.hunting.tick() else {
            return;
        };
        self.events.push(RuntimeEvent::HuntingPhaseChanged {
            phase_index: change.phase_index,
            phase: change.phase,
        });
        for ghost in &mut self.ghosts {
            ghost.on_phase_change();
        }
    }

    fn update_cruise_elroy(&mut self) {
        let food_left = self.world.uneaten_food_count();
        if let Some(level) = self.elroy.update(food_left, &self.level) {
            self.events.push(RuntimeEvent::CruiseElroyChanged { level });
        }
    }

    fn check_level_complete(&mut self) {
        if self.pac_dead || self.world.uneaten_food_count() > 0 {
            return;
        }
        self.level_complete = true;
        self.hunting.stop();
        self.events.push(RuntimeEvent::LevelCompleted {
            level: self.level_number,
        });
    }

    fn target_context(&self) -> TargetContext {
        TargetContext {
            phase: self.hunting.phase(),
            pac_tile: self.pac.tile,
            pac_dir: self.pac.dir,
            shadow_tile: self.ghosts[GhostRole::Shadow.index()].tile,
            elroy: self.elroy.effective_level(),
            power_active: self.is_power_active(),
            simulate_overflow_bug: self.config.simulate_overflow_bug,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::GameEngine;
    use crate::level::{EngineConfig, LevelTable};
    use crate::types::{
        Direction, GhostRole, GhostState, HuntingPhase, RuntimeEvent, Tile,
    };
    use crate::world::{Maze, WorldQuery};

    fn make_engine(config: EngineConfig) -> GameEngine {
        GameEngine::new(Maze::arcade(), LevelTable::arcade(), config, 1)
    }

    fn eat_all_but(engine: &mut GameEngine, keep: &[Tile]) {
        for tile in engine.world.food_tiles() {
            if !keep.contains(&tile) {
                engine.world.eat_food(tile);
            }
        }
    }

    fn has_event(events: &[RuntimeEvent], wanted: &RuntimeEvent) -> bool {
        events.iter().any(|event| event == wanted)
    }

    #[test]
    fn same_seed_produces_same_progression() {
        let config = EngineConfig {
            autopilot: true,
            rng_seed: 4242,
            ..EngineConfig::default()
        };
        let mut a = make_engine(config.clone());
        let mut b = make_engine(config);
        for role in GhostRole::ALL {
            a.release_ghost(role);
            b.release_ghost(role);
        }

        for _ in 0..2_000 {
            a.step();
            b.step();
            let sa = a.build_snapshot(true);
            let sb = b.build_snapshot(true);
            assert_eq!(sa.pac, sb.pac);
            assert_eq!(sa.ghosts, sb.ghosts);
            assert_eq!(sa.events, sb.events);
            assert_eq!(sa.food_left, sb.food_left);
            if a.is_pac_dead() || a.is_level_complete() {
                assert_eq!(a.is_pac_dead(), b.is_pac_dead());
                break;
            }
        }
    }

    #[test]
    fn build_snapshot_drains_events_when_requested() {
        let mut engine = make_engine(EngineConfig::default());
        engine.release_ghost(GhostRole::Speedy);

        let kept = engine.build_snapshot(false);
        assert!(kept.events.is_empty());
        let first = engine.build_snapshot(true);
        let second = engine.build_snapshot(true);
        assert_eq!(first.events.len(), 2);
        assert!(second.events.is_empty());
    }

    #[test]
    fn first_phase_change_after_420_ticks() {
        let mut engine = make_engine(EngineConfig::default());
        for _ in 0..419 {
            engine.step();
        }
        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.phase, HuntingPhase::Scatter);
        assert!(!snapshot
            .events
            .iter()
            .any(|e| matches!(e, RuntimeEvent::HuntingPhaseChanged { .. })));

        engine.step();
        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.phase, HuntingPhase::Chase);
        assert_eq!(snapshot.phase_index, 1);
        assert!(has_event(
            &snapshot.events,
            &RuntimeEvent::HuntingPhaseChanged {
                phase_index: 1,
                phase: HuntingPhase::Chase,
            }
        ));
    }

    #[test]
    fn energizer_frightens_and_pauses_hunting() {
        let mut engine = make_engine(EngineConfig::default());
        engine.release_ghost(GhostRole::Shadow);
        engine.ghosts[GhostRole::Shadow.index()].tile = Tile::new(26, 4);
        engine.pac.tile = Tile::new(2, 26);
        engine.pac.dir = Direction::Left;
        engine.pac.move_buffer = 0.99;
        engine.step();

        let snapshot = engine.build_snapshot(true);
        assert!(has_event(
            &snapshot.events,
            &RuntimeEvent::FoodEaten {
                tile: Tile::new(1, 26),
                energizer: true,
            }
        ));
        assert!(has_event(&snapshot.events, &RuntimeEvent::PowerStarted { ticks: 360 }));
        assert_eq!(engine.ghost(GhostRole::Shadow).state, GhostState::Frightened);
        assert_eq!(engine.ghost(GhostRole::Speedy).state, GhostState::Locked);
        assert!(!engine.hunting_timer().is_running());
        let elapsed = engine.hunting_timer().elapsed();

        for _ in 0..360 {
            engine.step();
        }
        let snapshot = engine.build_snapshot(true);
        assert!(has_event(&snapshot.events, &RuntimeEvent::PowerEnded));
        assert_eq!(engine.ghost(GhostRole::Shadow).state, GhostState::Hunting);
        assert!(engine.hunting_timer().is_running());
        assert_eq!(engine.hunting_timer().elapsed(), elapsed);
    }

    #[test]
    fn energizer_frightens_ghost_still_leaving_house() {
        let mut engine = make_engine(EngineConfig::default());
        engine.release_ghost(GhostRole::Bashful);
        engine.step();
        assert_eq!(engine.ghost(GhostRole::Bashful).state, GhostState::LeavingHouse);

        engine.pac.tile = Tile::new(2, 26);
        engine.pac.dir = Direction::Left;
        engine.pac.move_buffer = 0.99;
        engine.step();

        assert!(engine.is_power_active());
        assert_eq!(engine.ghost(GhostRole::Bashful).state, GhostState::Frightened);
        let snapshot = engine.build_snapshot(true);
        assert!(has_event(
            &snapshot.events,
            &RuntimeEvent::GhostStateChanged {
                ghost: GhostRole::Bashful,
                from: GhostState::LeavingHouse,
                to: GhostState::Frightened,
            }
        ));

        let entry = engine.world.house.entry;
        for _ in 0..200 {
            engine.step();
            if engine.ghost(GhostRole::Bashful).tile == entry {
                break;
            }
        }
        assert_eq!(engine.ghost(GhostRole::Bashful).tile, entry);
        assert_eq!(engine.ghost(GhostRole::Bashful).state, GhostState::Frightened);
    }

    #[test]
    fn hunting_ghosts_only_reverse_after_phase_change_or_energizer() {
        for seed in [7, 1234, 99_001] {
            let config = EngineConfig {
                autopilot: true,
                rng_seed: seed,
                ..EngineConfig::default()
            };
            let mut engine = make_engine(config);
            for role in GhostRole::ALL {
                engine.release_ghost(role);
            }
            let mut previous = engine.build_snapshot(true);
            let mut reverse_allowed = [false; 4];

            for _ in 0..3_000 {
                engine.step();
                let snapshot = engine.build_snapshot(true);
                let turn_around = snapshot.events.iter().any(|event| match event {
                    RuntimeEvent::HuntingPhaseChanged { .. } => true,
                    RuntimeEvent::FoodEaten { energizer, .. } => *energizer,
                    _ => false,
                });
                if turn_around {
                    for ghost in &previous.ghosts {
                        if ghost.state == GhostState::Hunting {
                            reverse_allowed[ghost.role.index()] = true;
                        }
                    }
                }

                for (before, after) in previous.ghosts.iter().zip(snapshot.ghosts.iter()) {
                    let reversed = before.state == GhostState::Hunting
                        && after.state == GhostState::Hunting
                        && after.tile != before.tile
                        && after.dir == before.dir.opposite();
                    if reversed {
                        let allowed = &mut reverse_allowed[after.role.index()];
                        assert!(
                            *allowed,
                            "seed {seed}: {:?} reversed at tick {}",
                            after.role, snapshot.tick
                        );
                        *allowed = false;
                    }
                }

                if engine.is_pac_dead() || engine.is_level_complete() {
                    break;
                }
                previous = snapshot;
            }
        }
    }

    #[test]
    fn hunting_ghost_on_pac_tile_kills_and_suppresses_elroy() {
        let mut engine = make_engine(EngineConfig::default());
        engine.set_cruise_elroy(1).expect("valid elroy value");
        engine.ghosts[GhostRole::Speedy.index()].state = GhostState::Hunting;
        engine.ghosts[GhostRole::Speedy.index()].tile = engine.pac.tile;
        let ctx = engine.target_context();
        let before: Vec<_> = engine.ghosts.iter().map(|g| g.view(&ctx)).collect();
        engine.resolve_collisions(engine.pac.tile, &before);

        assert!(engine.is_pac_dead());
        assert!(!engine.hunting_timer().is_running());
        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.cruise_elroy, -1);
        assert!(has_event(
            &snapshot.events,
            &RuntimeEvent::PacKilled {
                by: GhostRole::Speedy,
                tile: Tile::new(13, 26),
            }
        ));

        let tick = snapshot.tick;
        engine.step();
        assert_eq!(engine.build_snapshot(false).tick, tick);

        engine.reset_round();
        assert!(!engine.is_pac_dead());
        assert_eq!(engine.build_snapshot(false).cruise_elroy, -1);
        engine.release_ghost(GhostRole::Pokey);
        assert_eq!(engine.build_snapshot(false).cruise_elroy, 1);
    }

    #[test]
    fn swapping_tiles_counts_as_collision() {
        let mut engine = make_engine(EngineConfig::default());
        let pac_before = Tile::new(12, 26);
        engine.pac.tile = Tile::new(11, 26);
        let shadow = GhostRole::Shadow.index();
        engine.ghosts[shadow].state = GhostState::Frightened;
        engine.ghosts[shadow].tile = Tile::new(11, 26);
        let ctx = engine.target_context();
        let mut before: Vec<_> = engine.ghosts.iter().map(|g| g.view(&ctx)).collect();
        before[shadow].tile = Tile::new(11, 26);
        engine.ghosts[shadow].tile = pac_before;

        engine.resolve_collisions(pac_before, &before);
        assert_eq!(engine.ghost(GhostRole::Shadow).state, GhostState::Eaten);
        assert!(!engine.is_pac_dead());
        let snapshot = engine.build_snapshot(true);
        assert!(has_event(
            &snapshot.events,
            &RuntimeEvent::GhostEaten {
                ghost: GhostRole::Shadow,
                tile: pac_before,
            }
        ));
    }

    #[test]
    fn elroy_rises_with_food_and_resets_on_new_level() {
        let mut engine = make_engine(EngineConfig::default());
        let keep: Vec<Tile> = engine.world.food_tiles().into_iter().take(20).collect();
        eat_all_but(&mut engine, &keep);
        engine.step();
        let snapshot = engine.build_snapshot(true);
        assert!(snapshot.cruise_elroy >= 1);
        assert!(has_event(&snapshot.events, &RuntimeEvent::CruiseElroyChanged { level: 1 }));

        engine.start_level(2);
        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.cruise_elroy, 0);
        assert_eq!(snapshot.food_left, 244);
        assert_eq!(snapshot.level, 2);
    }

    #[test]
    fn invalid_elroy_value_is_rejected() {
        let mut engine = make_engine(EngineConfig::default());
        assert!(engine.set_cruise_elroy(3).is_err());
        assert!(engine.set_cruise_elroy(-1).is_err());
        assert_eq!(engine.build_snapshot(true).cruise_elroy, 0);
    }

    #[test]
    fn eating_last_pellet_completes_level() {
        let mut engine = make_engine(EngineConfig::default());
        eat_all_but(&mut engine, &[Tile::new(12, 26)]);
        engine.set_pac_wish(Direction::Left);
        for _ in 0..60 {
            engine.step();
            if engine.is_level_complete() {
                break;
            }
        }
        assert!(engine.is_level_complete());
        let snapshot = engine.build_snapshot(true);
        assert_eq!(snapshot.food_left, 0);
        assert!(has_event(&snapshot.events, &RuntimeEvent::LevelCompleted { level: 1 }));
    }

    #[test]
    fn release_from_entry_goes_straight_to_hunting() {
        let mut engine = make_engine(EngineConfig::default());
        assert!(engine.release_ghost(GhostRole::Shadow));
        assert!(!engine.release_ghost(GhostRole::Shadow));
        assert_eq!(engine.ghost(GhostRole::Shadow).state, GhostState::Hunting);
        assert!(engine.release_ghost(GhostRole::Bashful));
        assert_eq!(engine.ghost(GhostRole::Bashful).state, GhostState::LeavingHouse);
    }

    #[test]
    fn bonus_is_eaten_once() {
        let mut engine = make_engine(EngineConfig::default());
        engine.set_bonus(Some(Tile::new(12, 26)));
        engine.set_pac_wish(Direction::Left);
        for _ in 0..20 {
            engine.step();
        }
        let snapshot = engine.build_snapshot(true);
        let count = snapshot
            .events
            .iter()
            .filter(|e| matches!(e, RuntimeEvent::BonusEaten { .. }))
            .count();
        assert_eq!(count, 1);
        assert_eq!(engine.bonus, None);
    }
}
