//! Equipment mounted on an entity.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::location::Location;
use crate::data::EquipmentData;

/// Index of a mounted item in its entity's equipment list.
pub type EquipmentId = usize;

/// A piece of equipment mounted on an entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mounted {
    /// Definition.
    pub data: EquipmentData,
    /// Location it is bound to, `None` for unallocated equipment.
    pub location: Option<Location>,
    /// Whether it faces the rear arc.
    pub rear_mounted: bool,
    /// Linked ammunition bin, for ammo-fed weapons.
    pub ammo_link: Option<EquipmentId>,
    /// Shots left, for ammunition bins.
    pub shots_left: u32,
    /// Whether a critical hit destroyed it.
    pub destroyed: bool,
    /// Whether it fired this turn.
    pub fired_this_turn: bool,
}

impl Mounted {
    pub(crate) fn new(data: EquipmentData, location: Option<Location>, rear_mounted: bool) -> Self {
        let shots_left = data.ammo().map_or(0, |ammo| ammo.shots);
        Self {
            data,
            location,
            rear_mounted,
            ammo_link: None,
            shots_left,
            destroyed: false,
            fired_this_turn: false,
        }
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.data.name
    }
}

/// Why equipment could not be mounted or linked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MountError {
    /// Not enough free critical slots.
    #[error("{location} has {free} free slots, {needed} needed")]
    LocationFull {
        /// Target location.
        location: Location,
        /// Slots the item needs.
        needed: u32,
        /// Slots available.
        free: u32,
    },

    /// The archetype has no such location.
    #[error("no such location {0}")]
    NoSuchLocation(Location),

    /// The location is destroyed.
    #[error("location {0} is destroyed")]
    LocationDestroyed(Location),

    /// The ammo link does not pair a weapon with matching ammunition.
    #[error("equipment {ammo} is not valid ammunition for {weapon}")]
    InvalidAmmoLink {
        /// Weapon being linked.
        weapon: EquipmentId,
        /// Proposed ammunition bin.
        ammo: EquipmentId,
    },
}
