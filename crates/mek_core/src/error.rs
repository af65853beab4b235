//! Error types for the rules engine.
//!
//! Only contract violations are errors. Rule-driven outcomes such as an
//! impossible shot or an illegal move step are ordinary result values
//! (see [`crate::to_hit::ToHitData`] and [`crate::movement::CompiledPath`]).

use thiserror::Error;

use crate::entity::{EntityId, Location, MountError};
use crate::hex::HexCoord;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all rules-engine contract violations.
#[derive(Debug, Error)]
pub enum GameError {
    /// An argument violated the documented contract of an operation.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// The entity's archetype has no such location.
    #[error("Location {location:?} does not exist on entity {entity}")]
    NoSuchLocation {
        /// Entity that was queried.
        entity: EntityId,
        /// Location that was requested.
        location: Location,
    },

    /// A coordinate lies outside the board.
    #[error("Coordinate {0} is off the board")]
    OffBoard(HexCoord),

    /// Attempted to raise armor or internal structure above its original value.
    #[error("{location:?} value {requested} exceeds original {original}")]
    ExceedsOriginal {
        /// Location being written.
        location: Location,
        /// Requested value.
        requested: i32,
        /// Original (construction-time) value.
        original: i32,
    },

    /// Equipment could not be mounted while building a unit.
    #[error("Equipment mount failed: {0}")]
    Mount(#[from] MountError),

    /// Data file parsing error.
    #[error("Failed to parse data '{source_name}': {message}")]
    DataParseError {
        /// Name of the data source that failed to parse.
        source_name: String,
        /// Error message.
        message: String,
    },

    /// Snapshot serialization or deserialization failed.
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
