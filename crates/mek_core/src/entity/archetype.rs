//! Unit archetypes and their static capability tables.
//!
//! Each archetype variant maps to one `static` [`ArchetypeCaps`]. Rules code
//! asks the table rather than matching on the archetype, so adding a motive
//! type is a new table, not a new code path.

use serde::{Deserialize, Serialize};

use super::location::Location;
use crate::board::{Hex, TerrainKind, WoodsDensity};
use crate::damage::tables::{infantry_hit_location, mech_hit_location, vehicle_hit_location};
use crate::damage::{HitTable, Side};
use crate::hex::Arc;

/// Ground vehicle motive systems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MotiveType {
    /// Tracked.
    Tracked,
    /// Wheeled.
    Wheeled,
    /// Hovercraft.
    Hover,
}

/// Kind of combat unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    /// Walking humanoid combat unit.
    Mech,
    /// Ground vehicle.
    Vehicle(MotiveType),
    /// Conventional infantry.
    Infantry,
}

impl Archetype {
    /// Static capability table for this archetype.
    #[must_use]
    pub const fn caps(self) -> &'static ArchetypeCaps {
        match self {
            Self::Mech => &MECH_CAPS,
            Self::Vehicle(MotiveType::Tracked) => &TRACKED_CAPS,
            Self::Vehicle(MotiveType::Wheeled) => &WHEELED_CAPS,
            Self::Vehicle(MotiveType::Hover) => &HOVER_CAPS,
            Self::Infantry => &INFANTRY_CAPS,
        }
    }

    /// Whether this is a mech.
    #[must_use]
    pub const fn is_mech(self) -> bool {
        matches!(self, Self::Mech)
    }

    /// Whether this is a vehicle.
    #[must_use]
    pub const fn is_vehicle(self) -> bool {
        matches!(self, Self::Vehicle(_))
    }
}

/// One location in an archetype's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocationSpec {
    /// The location.
    pub location: Location,
    /// Number of critical slots.
    pub slots: usize,
    /// Whether it carries separate rear armor.
    pub rear_armor: bool,
}

/// Where excess damage goes once a location's internal structure is gone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferTarget {
    /// Continue into another location.
    Transfer(Location),
    /// Losing the location destroys the unit.
    DestroyUnit,
    /// Excess damage is lost.
    Absorb,
}

/// Static rules data for one archetype.
#[derive(Debug)]
pub struct ArchetypeCaps {
    /// Display name.
    pub name: &'static str,
    /// Locations in canonical order.
    pub locations: &'static [LocationSpec],
    /// Damage transfer graph.
    pub transfer: fn(Location) -> TransferTarget,
    /// Hit location for a table, attacked side and roll; the flag marks a
    /// possible through-armor critical.
    pub hit_location: fn(HitTable, Side, u32) -> (Location, bool),
    /// Dice rolled on a hit table.
    pub hit_dice: fn(HitTable) -> u32,
    /// Firing arcs of a weapon at a location (second argument: rear mounted).
    pub weapon_arcs: fn(Location, bool) -> &'static [Arc],
    /// Largest elevation change allowed in one ground step.
    pub max_elevation_change: i32,
    /// Terrain the unit cannot enter.
    pub prohibited: fn(&Hex) -> bool,
    /// Height above its hex in levels.
    pub height: i32,
    /// Defensive battle-value multiplier, in hundredths.
    pub bv_multiplier: i32,
}

impl ArchetypeCaps {
    /// Layout entry for a location, if the archetype has it.
    #[must_use]
    pub fn location_spec(&self, location: Location) -> Option<&LocationSpec> {
        self.locations.iter().find(|spec| spec.location == location)
    }
}

// ============================================================================
// Mech
// ============================================================================

const MECH_LOCATIONS: [LocationSpec; 8] = [
    LocationSpec { location: Location::Head, slots: 6, rear_armor: false },
    LocationSpec { location: Location::CenterTorso, slots: 12, rear_armor: true },
    LocationSpec { location: Location::RightTorso, slots: 12, rear_armor: true },
    LocationSpec { location: Location::LeftTorso, slots: 12, rear_armor: true },
    LocationSpec { location: Location::RightArm, slots: 12, rear_armor: false },
    LocationSpec { location: Location::LeftArm, slots: 12, rear_armor: false },
    LocationSpec { location: Location::RightLeg, slots: 6, rear_armor: false },
    LocationSpec { location: Location::LeftLeg, slots: 6, rear_armor: false },
];

const fn mech_transfer(location: Location) -> TransferTarget {
    match location {
        Location::LeftArm | Location::LeftLeg => TransferTarget::Transfer(Location::LeftTorso),
        Location::RightArm | Location::RightLeg => TransferTarget::Transfer(Location::RightTorso),
        Location::LeftTorso | Location::RightTorso => {
            TransferTarget::Transfer(Location::CenterTorso)
        }
        _ => TransferTarget::DestroyUnit,
    }
}

const fn mech_hit_dice(table: HitTable) -> u32 {
    match table {
        HitTable::Normal => 2,
        HitTable::Punch | HitTable::Kick => 1,
    }
}

const FRONT: &[Arc] = &[Arc::Front];
const REAR: &[Arc] = &[Arc::Rear];
const FRONT_LEFT: &[Arc] = &[Arc::Front, Arc::Left];
const FRONT_RIGHT: &[Arc] = &[Arc::Front, Arc::Right];
const LEFT: &[Arc] = &[Arc::Left];
const RIGHT: &[Arc] = &[Arc::Right];
const ALL_ARCS: &[Arc] = &[Arc::Front, Arc::Left, Arc::Right, Arc::Rear];

const fn mech_weapon_arcs(location: Location, rear_mounted: bool) -> &'static [Arc] {
    match location {
        Location::LeftArm => FRONT_LEFT,
        Location::RightArm => FRONT_RIGHT,
        _ if rear_mounted => REAR,
        _ => FRONT,
    }
}

const fn mech_prohibited(_hex: &Hex) -> bool {
    false
}

/// Mech capabilities.
pub static MECH_CAPS: ArchetypeCaps = ArchetypeCaps {
    name: "Mech",
    locations: &MECH_LOCATIONS,
    transfer: mech_transfer,
    hit_location: mech_hit_location,
    hit_dice: mech_hit_dice,
    weapon_arcs: mech_weapon_arcs,
    max_elevation_change: 2,
    prohibited: mech_prohibited,
    height: 1,
    bv_multiplier: 100,
};

// ============================================================================
// Vehicles
// ============================================================================

const VEHICLE_LOCATIONS: [LocationSpec; 5] = [
    LocationSpec { location: Location::Front, slots: 0, rear_armor: false },
    LocationSpec { location: Location::Right, slots: 0, rear_armor: false },
    LocationSpec { location: Location::Left, slots: 0, rear_armor: false },
    LocationSpec { location: Location::Rear, slots: 0, rear_armor: false },
    LocationSpec { location: Location::Turret, slots: 0, rear_armor: false },
];

const fn vehicle_transfer(location: Location) -> TransferTarget {
    match location {
        Location::Turret => TransferTarget::Absorb,
        _ => TransferTarget::DestroyUnit,
    }
}

const fn vehicle_hit_dice(_table: HitTable) -> u32 {
    2
}

const fn vehicle_weapon_arcs(location: Location, _rear_mounted: bool) -> &'static [Arc] {
    match location {
        Location::Turret | Location::Body => ALL_ARCS,
        Location::Left => LEFT,
        Location::Right => RIGHT,
        Location::Rear => REAR,
        _ => FRONT,
    }
}

fn is_unbridged_water(hex: &Hex) -> bool {
    hex.water_depth() > 0 && !hex.contains(TerrainKind::Bridge)
}

fn tracked_prohibited(hex: &Hex) -> bool {
    is_unbridged_water(hex)
        || hex.woods() == Some(WoodsDensity::Heavy)
        || hex.contains(TerrainKind::Building)
}

fn wheeled_prohibited(hex: &Hex) -> bool {
    is_unbridged_water(hex)
        || hex.woods().is_some()
        || hex.contains(TerrainKind::Rough)
        || hex.contains(TerrainKind::Rubble)
        || hex.contains(TerrainKind::Building)
}

fn hover_prohibited(hex: &Hex) -> bool {
    hex.woods().is_some()
        || hex.contains(TerrainKind::Rough)
        || hex.contains(TerrainKind::Rubble)
        || hex.contains(TerrainKind::Building)
}

/// Tracked vehicle capabilities.
pub static TRACKED_CAPS: ArchetypeCaps = ArchetypeCaps {
    name: "Tracked Vehicle",
    locations: &VEHICLE_LOCATIONS,
    transfer: vehicle_transfer,
    hit_location: vehicle_hit_location,
    hit_dice: vehicle_hit_dice,
    weapon_arcs: vehicle_weapon_arcs,
    max_elevation_change: 1,
    prohibited: tracked_prohibited,
    height: 0,
    bv_multiplier: 90,
};

/// Wheeled vehicle capabilities.
pub static WHEELED_CAPS: ArchetypeCaps = ArchetypeCaps {
    name: "Wheeled Vehicle",
    locations: &VEHICLE_LOCATIONS,
    transfer: vehicle_transfer,
    hit_location: vehicle_hit_location,
    hit_dice: vehicle_hit_dice,
    weapon_arcs: vehicle_weapon_arcs,
    max_elevation_change: 1,
    prohibited: wheeled_prohibited,
    height: 0,
    bv_multiplier: 80,
};

/// Hovercraft capabilities.
pub static HOVER_CAPS: ArchetypeCaps = ArchetypeCaps {
    name: "Hovercraft",
    locations: &VEHICLE_LOCATIONS,
    transfer: vehicle_transfer,
    hit_location: vehicle_hit_location,
    hit_dice: vehicle_hit_dice,
    weapon_arcs: vehicle_weapon_arcs,
    max_elevation_change: 1,
    prohibited: hover_prohibited,
    height: 0,
    bv_multiplier: 70,
};

// ============================================================================
// Infantry
// ============================================================================

const INFANTRY_LOCATIONS: [LocationSpec; 1] = [LocationSpec {
    location: Location::Squad,
    slots: 0,
    rear_armor: false,
}];

const fn infantry_transfer(_location: Location) -> TransferTarget {
    TransferTarget::DestroyUnit
}

const fn infantry_hit_dice(_table: HitTable) -> u32 {
    0
}

const fn infantry_weapon_arcs(_location: Location, _rear_mounted: bool) -> &'static [Arc] {
    ALL_ARCS
}

/// Infantry capabilities.
pub static INFANTRY_CAPS: ArchetypeCaps = ArchetypeCaps {
    name: "Infantry",
    locations: &INFANTRY_LOCATIONS,
    transfer: infantry_transfer,
    hit_location: infantry_hit_location,
    hit_dice: infantry_hit_dice,
    weapon_arcs: infantry_weapon_arcs,
    max_elevation_change: 1,
    prohibited: is_unbridged_water,
    height: 0,
    bv_multiplier: 100,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Terrain;

    #[test]
    fn test_mech_transfer_graph_reaches_destruction() {
        let caps = Archetype::Mech.caps();
        for spec in caps.locations {
            let mut location = spec.location;
            let mut hops = 0;
            while let TransferTarget::Transfer(next) = (caps.transfer)(location) {
                location = next;
                hops += 1;
                assert!(hops < caps.locations.len(), "transfer cycle from {}", spec.location);
            }
            assert_eq!((caps.transfer)(location), TransferTarget::DestroyUnit);
        }
    }

    #[test]
    fn test_mech_transfer_edges() {
        let transfer = Archetype::Mech.caps().transfer;
        assert_eq!(transfer(Location::LeftArm), TransferTarget::Transfer(Location::LeftTorso));
        assert_eq!(transfer(Location::RightLeg), TransferTarget::Transfer(Location::RightTorso));
        assert_eq!(transfer(Location::LeftTorso), TransferTarget::Transfer(Location::CenterTorso));
        assert_eq!(transfer(Location::Head), TransferTarget::DestroyUnit);
    }

    #[test]
    fn test_vehicle_turret_absorbs() {
        let caps = Archetype::Vehicle(MotiveType::Tracked).caps();
        assert_eq!((caps.transfer)(Location::Turret), TransferTarget::Absorb);
        assert_eq!((caps.transfer)(Location::Front), TransferTarget::DestroyUnit);
    }

    #[test]
    fn test_prohibited_terrain() {
        let light_woods = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 1));
        let heavy_woods = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 2));
        let water = Hex::new(0).with(Terrain::new(TerrainKind::Water, 1));

        let mech = Archetype::Mech.caps();
        assert!(!(mech.prohibited)(&heavy_woods));
        assert!(!(mech.prohibited)(&water));

        let tracked = Archetype::Vehicle(MotiveType::Tracked).caps();
        assert!(!(tracked.prohibited)(&light_woods));
        assert!((tracked.prohibited)(&heavy_woods));

        let wheeled = Archetype::Vehicle(MotiveType::Wheeled).caps();
        assert!((wheeled.prohibited)(&light_woods));

        let hover = Archetype::Vehicle(MotiveType::Hover).caps();
        assert!(!(hover.prohibited)(&water));
        assert!((hover.prohibited)(&light_woods));

        assert!((Archetype::Infantry.caps().prohibited)(&water));
    }

    #[test]
    fn test_arm_arcs_include_side() {
        let arcs = (Archetype::Mech.caps().weapon_arcs)(Location::LeftArm, false);
        assert!(arcs.contains(&Arc::Front));
        assert!(arcs.contains(&Arc::Left));
        assert!(!arcs.contains(&Arc::Right));

        let rear = (Archetype::Mech.caps().weapon_arcs)(Location::CenterTorso, true);
        assert_eq!(rear, &[Arc::Rear]);
    }
}
