//! Grid pathfinding.
//!
//! The engine only depends on the [`Pathfinder`] trait. [`AStar`] is the
//! default 4-directional implementation; hosts may plug in their own.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use crate::grid::{Coord, Direction};

/// Upper bound on expanded nodes, so a predicate that admits an unbounded
/// region cannot stall the engine.
const MAX_EXPANSIONS: usize = 65_536;

/// Shortest-path search over the grid.
pub trait Pathfinder {
    /// Compute an ordered sequence of coordinates from `start` to `goal`
    /// (both included) that only steps on cells where `is_passable` holds.
    /// The start cell itself is not tested.
    ///
    /// Returns an empty sequence when the goal is unreachable.
    fn compute_path(
        &self,
        start: Coord,
        goal: Coord,
        is_passable: &dyn Fn(Coord) -> bool,
    ) -> Vec<Coord>;
}

/// A* search with a Manhattan heuristic and deterministic tie-breaking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AStar;

/// A node in the A* open set priority queue.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
struct AStarNode {
    coord: Coord,
    /// f_score = g_score + heuristic
    f_score: u32,
    /// Tie-breaker for determinism: lower coordinates first.
    tie_breaker: u64,
}

impl Ord for AStarNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so reverse for min-heap behavior.
        match other.f_score.cmp(&self.f_score) {
            Ordering::Equal => other.tie_breaker.cmp(&self.tie_breaker),
            ord => ord,
        }
    }
}

impl PartialOrd for AStarNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Convert coordinates to a tie-breaker value for deterministic ordering.
#[inline]
fn coords_to_tie_breaker(coord: Coord) -> u64 {
    ((coord.y as u32 as u64) << 32) | (coord.x as u32 as u64)
}

impl Pathfinder for AStar {
    fn compute_path(
        &self,
        start: Coord,
        goal: Coord,
        is_passable: &dyn Fn(Coord) -> bool,
    ) -> Vec<Coord> {
        if start == goal {
            return vec![start];
        }
        if !is_passable(goal) {
            return Vec::new();
        }

        let mut open_set = BinaryHeap::new();
        let mut came_from: HashMap<Coord, Coord> = HashMap::new();
        let mut g_score: HashMap<Coord, u32> = HashMap::new();

        g_score.insert(start, 0);
        open_set.push(AStarNode {
            coord: start,
            f_score: start.manhattan(goal),
            tie_breaker: coords_to_tie_breaker(start),
        });

        let mut expansions = 0;
        while let Some(current) = open_set.pop() {
            if current.coord == goal {
                return reconstruct_path(&came_from, goal);
            }
            expansions += 1;
            if expansions > MAX_EXPANSIONS {
                break;
            }

            let current_g = g_score.get(&current.coord).copied().unwrap_or(u32::MAX);

            for direction in Direction::ALL {
                let next = current.coord.step(direction);
                if !is_passable(next) {
                    continue;
                }

                let tentative_g = current_g.saturating_add(1);
                if tentative_g < g_score.get(&next).copied().unwrap_or(u32::MAX) {
                    came_from.insert(next, current.coord);
                    g_score.insert(next, tentative_g);
                    open_set.push(AStarNode {
                        coord: next,
                        f_score: tentative_g + next.manhattan(goal),
                        tie_breaker: coords_to_tie_breaker(next),
                    });
                }
            }
        }

        Vec::new()
    }
}

/// Reconstruct path from came_from map.
fn reconstruct_path(came_from: &HashMap<Coord, Coord>, goal: Coord) -> Vec<Coord> {
    let mut path = vec![goal];
    let mut current = goal;
    while let Some(&prev) = came_from.get(&current) {
        path.push(prev);
        current = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(w: i32, h: i32) -> impl Fn(Coord) -> bool {
        move |c: Coord| c.x >= 0 && c.y >= 0 && c.x < w && c.y < h
    }

    #[test]
    fn test_simple_path() {
        let path = AStar.compute_path(Coord::new(0, 0), Coord::new(3, 2), &open(5, 5));

        assert_eq!(path.first(), Some(&Coord::new(0, 0)));
        assert_eq!(path.last(), Some(&Coord::new(3, 2)));
        // 4-directional shortest path visits manhattan + 1 cells
        assert_eq!(path.len(), 6);
        assert!(path.windows(2).all(|w| w[0].is_adjacent(w[1])));
    }

    #[test]
    fn test_path_around_obstacle() {
        // Vertical wall at x = 2 with a gap at y = 4
        let passable = |c: Coord| open(5, 5)(c) && !(c.x == 2 && c.y < 4);
        let path = AStar.compute_path(Coord::new(0, 0), Coord::new(4, 0), &passable);

        assert!(!path.is_empty());
        assert!(path.iter().all(|&c| passable(c)));
        assert!(path.contains(&Coord::new(2, 4)));
    }

    #[test]
    fn test_no_path_exists() {
        let passable = |c: Coord| open(5, 5)(c) && c.x != 2;
        let path = AStar.compute_path(Coord::new(0, 0), Coord::new(4, 0), &passable);
        assert!(path.is_empty());
    }

    #[test]
    fn test_blocked_goal() {
        let passable = |c: Coord| open(5, 5)(c) && c != Coord::new(3, 3);
        assert!(AStar
            .compute_path(Coord::new(0, 0), Coord::new(3, 3), &passable)
            .is_empty());
    }

    #[test]
    fn test_path_to_same_cell() {
        let path = AStar.compute_path(Coord::new(2, 2), Coord::new(2, 2), &open(5, 5));
        assert_eq!(path, vec![Coord::new(2, 2)]);
    }

    #[test]
    fn test_determinism() {
        let passable = |c: Coord| open(20, 20)(c) && !(c.x == 10 && (5..15).contains(&c.y));
        let start = Coord::new(5, 10);
        let goal = Coord::new(15, 10);

        let path1 = AStar.compute_path(start, goal, &passable);
        let path2 = AStar.compute_path(start, goal, &passable);
        let path3 = AStar.compute_path(start, goal, &passable);

        assert!(!path1.is_empty());
        assert_eq!(path1, path2);
        assert_eq!(path2, path3);
    }
}
