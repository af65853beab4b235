//! # Mek Core
//!
//! Deterministic rules engine for hex-grid armored combat.
//!
//! This crate contains **only** rules logic:
//! - No rendering
//! - No IO
//! - No global randomness (dice are passed in explicitly)
//! - No floating-point math (uses fixed-point)
//!
//! This separation enables:
//! - Server-authoritative rules with thin clients
//! - Replays from a seed or a recorded roll sequence
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`hex`] - Hex coordinates, facings, arcs and sightlines
//! - [`board`] - Terrain and the map
//! - [`entity`] - Units, locations, critical slots and equipment
//! - [`game`] - The game container and the [`game::GameView`] provider trait
//! - [`movement`] - Path compilation and legality
//! - [`to_hit`] - Weapon and physical attack target numbers
//! - [`damage`] - Hit locations, damage transfer and critical hits
//! - [`battle_value`] - Unit worth scoring
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod battle_value;
pub mod board;
pub mod damage;
pub mod data;
pub mod dice;
pub mod entity;
pub mod error;
pub mod game;
pub mod hex;
pub mod math;
pub mod movement;
pub mod options;
pub mod to_hit;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::board::{Board, Hex, Terrain, TerrainKind};
    pub use crate::damage::{apply_damage, resolve_hit, roll_location, DamageEvent, DamageReport, HitData, HitTable, Side};
    pub use crate::data::EquipmentCatalog;
    pub use crate::dice::{DiceRoller, RecordedDice, SeededDice};
    pub use crate::entity::{Entity, EntityBuilder, EntityId, Location, MotiveType, MovementMode, Points};
    pub use crate::error::{GameError, Result};
    pub use crate::game::{Game, GameView};
    pub use crate::hex::{Facing, HexCoord};
    pub use crate::math::Fixed;
    pub use crate::movement::{compile_path, CompiledPath, MoveType, StepType};
    pub use crate::options::GameOptions;
    pub use crate::to_hit::{weapon_to_hit, Outcome, ToHitData};
}
