//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the rules produce identical results
//! given identical inputs.
//!
//! # Testing Strategy
//!
//! Rules resolution must be 100% reproducible so that a server and its
//! clients agree, and so that a game replays from its seed. Sources of
//! non-determinism include:
//!
//! - **Floating-point math**: battle value and other fractional formulas
//!   use [`mek_core::math::Fixed`].
//!
//! - **HashMap iteration order**: entities live in a `BTreeMap` and are
//!   always visited in id order.
//!
//! - **Hidden randomness**: every roll goes through an explicit
//!   [`DiceRoller`], seeded or replayed.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: individual rules (movement, to-hit, damage)
//! 2. **Property tests**: random inputs still produce deterministic outputs
//! 3. **Integration tests**: full skirmishes are reproducible from a seed
//! 4. **Parallel tests**: running N games on N threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use mek_core::dice::{DiceRoller, SeededDice};
use mek_core::game::Game;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Seed every run used.
    pub seed: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic rules).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the runs were deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Rules are non-deterministic!\n\
                 Runs: {}\n\
                 Seed: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.seed,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a scenario several times from the same seed and compare the results.
///
/// # Arguments
///
/// * `runs` - Number of times to run the scenario
/// * `seed` - Dice seed shared by every run
/// * `setup` - Function to create the initial state
/// * `play` - Function that plays the scenario with the run's dice
/// * `hash` - Function to compute the final state hash
///
/// # Example
///
/// ```
/// use mek_test_utils::determinism::verify_determinism;
/// use mek_core::dice::DiceRoller;
///
/// let result = verify_determinism(
///     3,
///     42,
///     || 0u32,
///     |total, dice| *total += dice.roll_d6(2),
///     |total| u64::from(*total),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Play, HashFn>(
    runs: usize,
    seed: u64,
    setup: Setup,
    play: Play,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Play: Fn(&mut S, &mut dyn DiceRoller),
    HashFn: Fn(&S) -> u64,
{
    let hashes: Vec<u64> = (0..runs)
        .map(|_| {
            let mut state = setup();
            let mut dice = SeededDice::from_seed(seed);
            play(&mut state, &mut dice);
            hash(&state)
        })
        .collect();

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        seed,
    }
}

/// Play a game twice from the same seed and compare state hashes.
pub fn verify_game_determinism<Setup, Play>(setup: Setup, seed: u64, play: Play) -> bool
where
    Setup: Fn() -> Game,
    Play: Fn(&mut Game, &mut dyn DiceRoller),
{
    verify_determinism(2, seed, setup, play, Game::state_hash).is_deterministic
}

/// Play N copies of a game on N threads and collect the final hashes.
///
/// # Panics
///
/// Panics if a worker thread panics.
pub fn run_parallel_games<Setup, Play>(setup: Setup, play: Play, num_games: usize, seed: u64) -> DeterminismResult
where
    Setup: Fn() -> Game + Sync,
    Play: Fn(&mut Game, &mut dyn DiceRoller) + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_games)
            .map(|_| {
                s.spawn(|| {
                    let mut game = setup();
                    let mut dice = SeededDice::from_seed(seed);
                    play(&mut game, &mut dice);
                    game.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("game thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        seed,
    }
}

/// Play two copies of a game round by round, finding the first divergence.
///
/// # Returns
///
/// `None` if the games stay identical, `Some(round)` if they differ after
/// that round (0 means the setup itself differs).
pub fn find_first_divergence<Setup, Round>(setup: Setup, rounds: u32, seed: u64, round: Round) -> Option<u32>
where
    Setup: Fn() -> Game,
    Round: Fn(&mut Game, &mut dyn DiceRoller),
{
    let mut first = setup();
    let mut second = setup();
    let mut first_dice = SeededDice::from_seed(seed);
    let mut second_dice = SeededDice::from_seed(seed);

    if first.state_hash() != second.state_hash() {
        return Some(0);
    }

    for index in 1..=rounds {
        round(&mut first, &mut first_dice);
        round(&mut second, &mut second_dice);

        if first.state_hash() != second.state_hash() {
            return Some(index);
        }
    }

    None
}

/// Verify that a serialization round trip preserves the state hash.
pub fn verify_serialization_determinism(game: &Game) -> bool {
    let Ok(bytes) = game.serialize() else {
        return false;
    };
    let Ok(restored) = Game::deserialize(&bytes) else {
        return false;
    };
    restored.state_hash() == game.state_hash() && &restored == game
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for rules testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing.
pub mod strategies {
    use mek_core::entity::Location;
    use mek_core::hex::{Facing, HexCoord};
    use mek_core::movement::StepType;
    use proptest::prelude::*;

    /// A coordinate on a board of the given size.
    pub fn arb_coord(width: i32, height: i32) -> impl Strategy<Value = HexCoord> {
        (0..width, 0..height).prop_map(|(x, y)| HexCoord::new(x, y))
    }

    /// Any facing.
    pub fn arb_facing() -> impl Strategy<Value = Facing> {
        (0i32..6).prop_map(Facing::from_index)
    }

    /// A movement step that does not declare an attack.
    pub fn arb_step() -> impl Strategy<Value = StepType> {
        prop_oneof![
            4 => Just(StepType::Forward),
            2 => Just(StepType::TurnLeft),
            2 => Just(StepType::TurnRight),
            1 => Just(StepType::Backward),
            1 => Just(StepType::StartJump),
            1 => Just(StepType::GetUp),
        ]
    }

    /// A sequence of movement steps.
    pub fn arb_steps(max_len: usize) -> impl Strategy<Value = Vec<StepType>> {
        proptest::collection::vec(arb_step(), 0..max_len)
    }

    /// Any location a mech has.
    pub fn arb_mech_location() -> impl Strategy<Value = Location> {
        prop_oneof![
            Just(Location::Head),
            Just(Location::CenterTorso),
            Just(Location::RightTorso),
            Just(Location::LeftTorso),
            Just(Location::RightArm),
            Just(Location::LeftArm),
            Just(Location::RightLeg),
            Just(Location::LeftLeg),
        ]
    }

    /// Damage values (1-40).
    pub fn arb_damage() -> impl Strategy<Value = u32> {
        1u32..40u32
    }

    /// Heat levels (0-40).
    pub fn arb_heat() -> impl Strategy<Value = u32> {
        0u32..40u32
    }

    /// Skill ratings (0-8).
    pub fn arb_skill() -> impl Strategy<Value = u32> {
        0u32..8u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{duel, exchange_fire, skirmish};
    use mek_core::options::GameOptions;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 11, || 0u32, |n, dice| *n += dice.roll_d6(3), |n| u64::from(*n));
        result.assert_deterministic();
        assert_eq!(result.hashes.len(), 3);
    }

    #[test]
    fn test_skirmish_is_deterministic() {
        let play = |game: &mut Game, dice: &mut dyn DiceRoller| {
            for _ in 0..4 {
                exchange_fire(game, dice).unwrap();
            }
        };
        assert!(verify_game_determinism(|| skirmish(GameOptions::default()), 99, play));
    }

    #[test]
    fn test_parallel_games_match() {
        let result = run_parallel_games(
            || duel(3).game,
            |game, dice| {
                for _ in 0..3 {
                    exchange_fire(game, dice).unwrap();
                }
            },
            4,
            5,
        );
        result.assert_deterministic();
    }

    #[test]
    fn test_no_divergence() {
        let divergence = find_first_divergence(
            || duel(4).game,
            5,
            21,
            |game, dice| {
                exchange_fire(game, dice).unwrap();
            },
        );
        assert_eq!(divergence, None);
    }

    #[test]
    fn test_serialization_after_play() {
        let mut game = skirmish(GameOptions::default());
        let mut dice = SeededDice::from_seed(3);
        exchange_fire(&mut game, &mut dice).unwrap();
        assert!(verify_serialization_determinism(&game));
    }

    #[test]
    fn test_compute_hash_is_stable() {
        assert_eq!(compute_hash(&(1u8, "mech")), compute_hash(&(1u8, "mech")));
    }
}
