use crate::constants::{
    AUTOPILOT_BONUS_HARVEST_DIST, AUTOPILOT_CHASE_MARGIN_TICKS, AUTOPILOT_ENERGIZER_SKIP_TICKS,
    AUTOPILOT_GHOST_AHEAD_DIST, AUTOPILOT_GHOST_BEHIND_DIST, AUTOPILOT_GHOST_CHASE_DIST,
};
use crate::navigation::direction_towards;
use crate::rng::Rng;
use crate::types::{Direction, GhostState, GhostView, PacView, Tile};
use crate::world::WorldQuery;

/// What the autopilot sees of the game at the end of the previous tick.
#[derive(Clone, Copy, Debug)]
pub struct SteeringInput<'a> {
    pub pac: PacView,
    pub ghosts: &'a [GhostView],
    pub power_ticks_left: u32,
    pub bonus: Option<Tile>,
}

/// Greedy attract-mode steering. Returns the new wish direction, or `None`
/// to keep the current one (mid-tile, or nowhere to go).
///
/// Deliberately memoryless: it only looks a few tiles around Pac-Man and
/// walks toward a single target, so it loses lives like the arcade demo.
pub fn steer(world: &dyn WorldQuery, input: &SteeringInput<'_>, rng: &mut Rng) -> Option<Direction> {
    let pac = input.pac;
    if pac.moved && !pac.new_tile_entered {
        return None;
    }

    if threat_ahead(world, input).is_some() {
        let behind = threat_behind(world, input).is_some();
        return escape_direction(world, pac.tile, pac.dir, behind, rng);
    }

    if pac.moved && !world.is_intersection(pac.tile) {
        return Some(pac.dir);
    }

    let target = chase_target(input)
        .or_else(|| bonus_target(input))
        .or_else(|| food_target(world, input))?;
    direction_towards(pac.dir, target, |dir| open_neighbor(world, pac.tile, dir))
}

fn open_neighbor(world: &dyn WorldQuery, tile: Tile, dir: Direction) -> Option<Tile> {
    let next = world.portal_wrap(tile.neighbor(dir));
    world.is_open(next).then_some(next)
}

fn is_threat(ghost: &GhostView) -> bool {
    ghost.state == GhostState::Hunting
}

fn is_present(ghost: &GhostView) -> bool {
    !matches!(
        ghost.state,
        GhostState::Eaten | GhostState::ReturningHome | GhostState::EnteringHouse
    )
}

fn hunting_ghost_at(input: &SteeringInput<'_>, tiles: &[Tile]) -> Option<GhostView> {
    input
        .ghosts
        .iter()
        .find(|ghost| is_threat(ghost) && tiles.contains(&ghost.tile))
        .copied()
}

/// First hunting ghost on or beside the corridor ahead. An uneaten energizer
/// in between cancels the threat.
fn threat_ahead(world: &dyn WorldQuery, input: &SteeringInput<'_>) -> Option<GhostView> {
    let pac = input.pac;
    for steps in 1..=AUTOPILOT_GHOST_AHEAD_DIST {
        let ahead = world.portal_wrap(pac.tile.towards(pac.dir, steps));
        if !world.is_open(ahead) {
            return None;
        }
        if world.has_uneaten_energizer(ahead) {
            return None;
        }
        let left = world.portal_wrap(ahead.neighbor(pac.dir.counter_clockwise()));
        let right = world.portal_wrap(ahead.neighbor(pac.dir.clockwise()));
        if let Some(ghost) = hunting_ghost_at(input, &[ahead, left, right]) {
            return Some(ghost);
        }
    }
    None
}

fn threat_behind(world: &dyn WorldQuery, input: &SteeringInput<'_>) -> Option<GhostView> {
    let pac = input.pac;
    let behind = world.portal_wrap(pac.tile.towards(pac.dir.opposite(), AUTOPILOT_GHOST_BEHIND_DIST));
    if !world.is_open(behind) {
        return None;
    }
    hunting_ghost_at(input, &[behind])
}

fn escape_direction(
    world: &dyn WorldQuery,
    tile: Tile,
    dir: Direction,
    avoid_reverse: bool,
    rng: &mut Rng,
) -> Option<Direction> {
    let candidates: Vec<(Direction, Tile)> = rng
        .shuffled_directions()
        .into_iter()
        .filter(|candidate| *candidate != dir)
        .filter(|candidate| !(avoid_reverse && *candidate == dir.opposite()))
        .filter_map(|candidate| open_neighbor(world, tile, candidate).map(|next| (candidate, next)))
        .collect();
    candidates
        .iter()
        .find(|(_, next)| world.is_tunnel(*next))
        .or_else(|| candidates.first())
        .map(|(candidate, _)| *candidate)
}

fn chase_target(input: &SteeringInput<'_>) -> Option<Tile> {
    if input.power_ticks_left < AUTOPILOT_CHASE_MARGIN_TICKS {
        return None;
    }
    let pac_tile = input.pac.tile;
    input
        .ghosts
        .iter()
        .filter(|ghost| ghost.state == GhostState::Frightened)
        .filter(|ghost| ghost.tile.euclidean(pac_tile) <= AUTOPILOT_GHOST_CHASE_DIST)
        .min_by_key(|ghost| ghost.tile.squared_distance(pac_tile))
        .map(|ghost| ghost.tile)
}

fn bonus_target(input: &SteeringInput<'_>) -> Option<Tile> {
    input
        .bonus
        .filter(|bonus| bonus.euclidean(input.pac.tile) <= AUTOPILOT_BONUS_HARVEST_DIST)
}

/// Closest food by Manhattan distance. Ties prefer the tile whose nearest
/// ghost is farthest away, then scan order.
fn food_target(world: &dyn WorldQuery, input: &SteeringInput<'_>) -> Option<Tile> {
    let pac_tile = input.pac.tile;
    let skip_energizers = input.power_ticks_left > AUTOPILOT_ENERGIZER_SKIP_TICKS
        && world.uneaten_food_count() > 1;

    let mut best: Option<(Tile, i32, i32)> = None;
    for tile in world.food_tiles() {
        if skip_energizers && world.is_energizer_tile(tile) {
            continue;
        }
        let dist = tile.manhattan(pac_tile);
        let ghost_dist = nearest_ghost_distance(input, tile);
        let better = match best {
            None => true,
            Some((_, best_dist, best_ghost_dist)) => {
                dist < best_dist || (dist == best_dist && ghost_dist > best_ghost_dist)
            }
        };
        if better {
            best = Some((tile, dist, ghost_dist));
        }
    }
    best.map(|(tile, _, _)| tile)
}

fn nearest_ghost_distance(input: &SteeringInput<'_>, tile: Tile) -> i32 {
    input
        .ghosts
        .iter()
        .filter(|ghost| is_present(ghost))
        .map(|ghost| ghost.tile.manhattan(tile))
        .min()
        .unwrap_or(i32::MAX)
}
