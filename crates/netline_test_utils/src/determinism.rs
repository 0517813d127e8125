//! Determinism testing utilities.
//!
//! Provides a harness for verifying that match resolution produces
//! identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! Every participant in a networked match resolves turns locally, so the
//! engine must be 100% deterministic. Sources of non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized. The
//!   session only stores ordered collections (`Vec`, `BTreeMap`).
//!
//! - **Search tie-breaking**: pathfinding and target selection break ties by
//!   coordinates, never by insertion order.
//!
//! - **System randomness**: the engine never calls a random source.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual resolver determinism (combat, capture, etc.)
//! 2. **Property tests**: Random maps must still resolve deterministically
//! 3. **Integration tests**: Full bot matches are reproducible
//! 4. **Parallel tests**: Running N matches on threads all match

use std::thread;

use netline_core::pathfinding::AStar;
use netline_core::session::Session;
use netline_core::turn::advance_tick;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic resolution).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run agreed, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Match resolution is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run any state machine multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run
/// * `ticks` - Number of steps per run
/// * `setup` - Function to create the initial state
/// * `step` - Function to advance the state by one step
/// * `hash` - Function to compute the state hash
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Advance a session by one tick with the default pathfinder.
///
/// # Panics
///
/// Panics if turn resolution fails.
pub fn tick(session: &mut Session) {
    if let Err(e) = advance_tick(session, &AStar) {
        panic!("tick failed at turn {}: {e}", session.turn);
    }
}

/// Hash a session.
///
/// # Panics
///
/// Panics if the session cannot be serialized.
#[must_use]
pub fn hash(session: &Session) -> u64 {
    session
        .state_hash()
        .unwrap_or_else(|e| panic!("state hash failed: {e}"))
}

/// Run a session setup twice for `num_ticks` ticks and compare the final
/// state hashes.
///
/// Returns `true` if both runs produced identical state hashes.
pub fn verify_session_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Session,
{
    verify_determinism(2, num_ticks, &setup_fn, tick, hash).is_deterministic
}

/// Run N sessions on scoped threads and collect their final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_sessions<F>(setup_fn: F, num_runs: usize, num_ticks: u64) -> DeterminismResult
where
    F: Fn() -> Session + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_runs)
            .map(|_| {
                s.spawn(|| {
                    let mut session = setup_fn();
                    for _ in 0..num_ticks {
                        tick(&mut session);
                    }
                    hash(&session)
                })
            })
            .collect();

        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compare two runs tick-by-tick, finding the first divergence.
///
/// # Returns
///
/// `None` if the runs agree throughout, `Some(tick)` if they diverge at that
/// tick.
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    F: Fn() -> Session,
{
    let mut first = setup_fn();
    let mut second = setup_fn();

    if hash(&first) != hash(&second) {
        return Some(0);
    }

    for n in 1..=num_ticks {
        tick(&mut first);
        tick(&mut second);

        if hash(&first) != hash(&second) {
            tracing::debug!(tick = n, turn = first.turn, "Runs diverged");
            return Some(n);
        }
    }

    None
}

/// Verify that a snapshot round-trip preserves session state exactly.
pub fn verify_serialization_determinism<F>(setup_fn: F, num_ticks: u64) -> bool
where
    F: Fn() -> Session,
{
    let mut session = setup_fn();

    for _ in 0..num_ticks {
        tick(&mut session);
    }

    let Ok(bytes) = session.serialize() else {
        return false;
    };
    let Ok(restored) = Session::deserialize(&bytes) else {
        return false;
    };

    restored == session && hash(&restored) == hash(&session)
}

/// Proptest strategies for engine testing.
pub mod strategies {
    use netline_core::grid::Coord;
    use netline_core::team::{TeamColor, VirusColor};
    use proptest::prelude::*;

    /// Any virus colour, including `None`.
    pub fn arb_virus() -> impl Strategy<Value = VirusColor> {
        prop_oneof![
            Just(VirusColor::None),
            Just(VirusColor::Red),
            Just(VirusColor::Green),
            Just(VirusColor::Blue),
        ]
    }

    /// Any playable team.
    pub fn arb_team() -> impl Strategy<Value = TeamColor> {
        proptest::sample::select(TeamColor::PLAYABLE.to_vec())
    }

    /// Coordinates inside a `width` x `height` grid.
    pub fn arb_coord(width: i32, height: i32) -> impl Strategy<Value = Coord> {
        (0..width, 0..height).prop_map(|(x, y)| Coord::new(x, y))
    }

    /// ASCII map rows with an Amber hub top-left and a Teal hub
    /// bottom-right; everything else is drawn from gaps, floor, neutral
    /// line, neutral firewalls and both teams' spawn pads.
    pub fn arb_ascii_map() -> impl Strategy<Value = Vec<String>> {
        (1usize..=4, 3usize..=10).prop_flat_map(|(height, width)| {
            proptest::collection::vec(
                proptest::sample::select(vec!['.', '#', '-', '-', 'F', 'S', 's']),
                height * width,
            )
            .prop_map(move |mut cells| {
                cells[0] = 'H';
                cells[height * width - 1] = 'h';
                cells
                    .chunks(width)
                    .map(|row| row.iter().collect::<String>())
                    .collect()
            })
        })
    }

    /// Number of seats at the table.
    pub fn arb_player_count() -> impl Strategy<Value = usize> {
        1usize..=4
    }
}
