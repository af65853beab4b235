//! Dice providers.
//!
//! Every rule that needs randomness takes an explicit `&mut dyn DiceRoller`.
//! There is no global RNG: a game seeded with [`SeededDice`] replays
//! bit-for-bit, and [`RecordedDice`] replays an exact roll sequence
//! captured with [`RecordingDice`].

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of six-sided dice rolls.
pub trait DiceRoller {
    /// Roll a single die, returning 1..=6.
    fn roll_die(&mut self) -> u32;

    /// Roll `n` dice and return their sum.
    fn roll_d6(&mut self, n: u32) -> u32 {
        (0..n).map(|_| self.roll_die()).sum()
    }
}

/// Seeded, reproducible dice.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: ChaCha8Rng,
    seed: u64,
}

impl SeededDice {
    /// Create dice from a seed.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed these dice were created with.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

impl DiceRoller for SeededDice {
    fn roll_die(&mut self) -> u32 {
        self.rng.gen_range(1..=6)
    }
}

/// Replays a fixed sequence of die faces.
///
/// Useful for replaying a recorded game and for scripting exact outcomes.
#[derive(Debug, Clone, Default)]
pub struct RecordedDice {
    faces: VecDeque<u32>,
}

impl RecordedDice {
    /// Create from individual die faces.
    ///
    /// # Panics
    ///
    /// Panics if any face is outside 1..=6.
    #[must_use]
    pub fn new(faces: impl IntoIterator<Item = u32>) -> Self {
        let faces: VecDeque<u32> = faces.into_iter().collect();
        assert!(
            faces.iter().all(|face| (1..=6).contains(face)),
            "die faces must be between 1 and 6"
        );
        Self { faces }
    }

    /// Number of faces left to replay.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.faces.len()
    }
}

impl DiceRoller for RecordedDice {
    /// # Panics
    ///
    /// Panics when the recorded sequence is exhausted; a replay that needs
    /// more rolls than were recorded has diverged.
    fn roll_die(&mut self) -> u32 {
        match self.faces.pop_front() {
            Some(face) => face,
            None => panic!("recorded dice exhausted: replay diverged from the recording"),
        }
    }
}

/// Wraps another roller and records every face it produces.
#[derive(Debug)]
pub struct RecordingDice<D> {
    inner: D,
    faces: Vec<u32>,
}

impl<D: DiceRoller> RecordingDice<D> {
    /// Wrap a roller.
    #[must_use]
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            faces: Vec::new(),
        }
    }

    /// Faces rolled so far.
    #[must_use]
    pub fn faces(&self) -> &[u32] {
        &self.faces
    }

    /// Turn the recording into a replayable roller.
    #[must_use]
    pub fn into_replay(self) -> RecordedDice {
        RecordedDice::new(self.faces)
    }
}

impl<D: DiceRoller> DiceRoller for RecordingDice<D> {
    fn roll_die(&mut self) -> u32 {
        let face = self.inner.roll_die();
        self.faces.push(face);
        face
    }
}
