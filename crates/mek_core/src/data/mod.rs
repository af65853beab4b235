//! Data structures for equipment definitions.
//!
//! This module contains pure data structures for weapons, ammunition and
//! miscellaneous equipment. All structs deserialize from RON; the standard
//! catalog ships embedded in the crate.
//!
//! **Note:** This module contains no IO. Loading unit definitions from disk
//! is left to the host application.

mod catalog;
mod equipment_data;

pub use catalog::EquipmentCatalog;
pub use equipment_data::{
    AmmoStats, EquipmentData, EquipmentKind, MiscKind, RangeBracket, WeaponStats,
};
