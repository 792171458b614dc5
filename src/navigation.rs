use crate::types::{Direction, Tile};

/// Greedy arcade navigation: among the non-reversing directions the caller
/// allows, pick the neighbour closest to `target` by straight-line distance.
/// Ties go to the earlier entry of `Direction::PRIORITY`.
///
/// Falls back to reversing only when nothing else is open (dead end). Returns
/// `None` when the actor is boxed in.
pub fn direction_towards(
    current_dir: Direction,
    target: Tile,
    mut allowed: impl FnMut(Direction) -> Option<Tile>,
) -> Option<Direction> {
    let mut best: Option<(Direction, i32)> = None;
    for dir in Direction::PRIORITY {
        if dir == current_dir.opposite() {
            continue;
        }
        let Some(neighbor) = allowed(dir) else {
            continue;
        };
        let dist = neighbor.squared_distance(target);
        if best.map(|(_, best_dist)| dist < best_dist).unwrap_or(true) {
            best = Some((dir, dist));
        }
    }
    if let Some((dir, _)) = best {
        return Some(dir);
    }
    allowed(current_dir.opposite()).map(|_| current_dir.opposite())
}
