use crate::constants::tiles_per_tick;
use crate::steering::{steer, SteeringInput};

use super::*;

impl GameEngine {
    pub(super) fn update_autopilot(&mut self, ghosts_before: &[GhostView]) {
        let input = SteeringInput {
            pac: self.pac.view(),
            ghosts: ghosts_before,
            power_ticks_left: self.power_ticks_left,
            bonus: self.bonus,
        };
        if let Some(dir) = steer(&self.world, &input, &mut self.rng) {
            self.pac.wish_dir = Some(dir);
        }
    }

    pub(super) fn update_pac(&mut self) {
        self.pac.new_tile_entered = false;
        let percent = if self.is_power_active() {
            self.level.pac_speed_powered
        } else {
            self.level.pac_speed
        };
        self.pac.move_buffer += tiles_per_tick(percent);
        let mut safety = 0;
        while self.pac.move_buffer >= 1.0 {
            self.pac.move_buffer -= 1.0;
            safety += 1;
            if safety > 3 {
                break;
            }
            if !self.advance_pac_one_tile() {
                self.pac.move_buffer = 0.0;
                break;
            }
            self.apply_pac_pickups();
        }
    }

    fn pac_neighbor(&self, dir: Direction) -> Option<Tile> {
        let next = self.world.portal_wrap(self.pac.tile.neighbor(dir));
        self.world.is_open(next).then_some(next)
    }

    /// Turns toward the wish direction when it is open, otherwise keeps going.
    fn advance_pac_one_tile(&mut self) -> bool {
        if let Some(wish) = self.pac.wish_dir {
            if self.pac_neighbor(wish).is_some() {
                self.pac.dir = wish;
            }
        }
        let Some(next) = self.pac_neighbor(self.pac.dir) else {
            self.pac.stuck = true;
            return false;
        };
        self.pac.tile = next;
        self.pac.stuck = false;
        self.pac.new_tile_entered = true;
        true
    }

    fn apply_pac_pickups(&mut self) {
        let tile = self.pac.tile;
        if let Some(energizer) = self.world.eat_food(tile) {
            self.events.push(RuntimeEvent::FoodEaten { tile, energizer });
            if energizer {
                self.start_power();
            }
        }
        if self.bonus == Some(tile) {
            self.bonus = None;
            self.events.push(RuntimeEvent::BonusEaten { tile });
        }
    }
}
