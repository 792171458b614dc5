use crate::types::GhostState;

use super::*;

impl GameEngine {
    /// Every ghost reads the same context, captured before anybody moves.
    pub(super) fn update_ghosts(&mut self, ctx: &TargetContext) {
        for idx in 0..self.ghosts.len() {
            let change = self.ghosts[idx].update(&self.world, ctx, &self.level, &mut self.rng);
            if let Some(change) = change {
                self.events.push(state_change_event(change));
            }
        }
    }

    pub(super) fn update_power(&mut self) {
        if self.power_ticks_left == 0 {
            return;
        }
        self.power_ticks_left -= 1;
        if self.power_ticks_left > 0 {
            return;
        }
        self.events.push(RuntimeEvent::PowerEnded);
        for idx in 0..self.ghosts.len() {
            if let Some(change) = self.ghosts[idx].end_fright() {
                self.events.push(state_change_event(change));
            }
        }
        self.hunting.start();
    }

    /// Energizer eaten. With no power time left at high levels, ghosts only
    /// turn around.
    pub(super) fn start_power(&mut self) {
        let ticks = self.level.power_ticks();
        if ticks == 0 {
            for ghost in &mut self.ghosts {
                ghost.on_phase_change();
            }
            return;
        }
        self.power_ticks_left = ticks;
        self.hunting.stop();
        self.events.push(RuntimeEvent::PowerStarted { ticks });
        for idx in 0..self.ghosts.len() {
            if let Some(change) = self.ghosts[idx].frighten() {
                self.events.push(state_change_event(change));
            }
        }
    }

    /// Same tile after moving, or Pac-Man and a ghost swapped tiles this tick.
    pub(super) fn resolve_collisions(&mut self, pac_before: Tile, ghosts_before: &[GhostView]) {
        if self.pac_dead {
            return;
        }
        for idx in 0..self.ghosts.len() {
            let ghost_tile = self.ghosts[idx].tile;
            let overlap = ghost_tile == self.pac.tile;
            let swapped = ghosts_before
                .get(idx)
                .map(|before| before.tile == self.pac.tile && pac_before == ghost_tile)
                .unwrap_or(false);
            if !overlap && !swapped {
                continue;
            }

            match self.ghosts[idx].state {
                GhostState::Frightened => {
                    if let Some(change) = self.ghosts[idx].eaten() {
                        self.events.push(RuntimeEvent::GhostEaten {
                            ghost: change.role,
                            tile: ghost_tile,
                        });
                        self.events.push(state_change_event(change));
                    }
                }
                GhostState::Hunting => {
                    self.kill_pac(self.ghosts[idx].role);
                    return;
                }
                _ => {}
            }
        }
    }

    fn kill_pac(&mut self, by: GhostRole) {
        self.pac_dead = true;
        self.pac.move_buffer = 0.0;
        self.hunting.stop();
        self.events.push(RuntimeEvent::PacKilled {
            by,
            tile: self.pac.tile,
        });
        if let Some(level) = self.elroy.suppress() {
            self.events.push(RuntimeEvent::CruiseElroyChanged { level });
        }
    }
}
