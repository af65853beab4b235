//! Locations, damage points and critical slots.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::equipment::EquipmentId;
use crate::error::{GameError, Result};

/// A hit location on some archetype.
///
/// One enum covers every archetype; the archetype's capability table
/// decides which of these a given unit actually has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    /// Mech head.
    Head,
    /// Mech center torso.
    CenterTorso,
    /// Mech right torso.
    RightTorso,
    /// Mech left torso.
    LeftTorso,
    /// Mech right arm.
    RightArm,
    /// Mech left arm.
    LeftArm,
    /// Mech right leg.
    RightLeg,
    /// Mech left leg.
    LeftLeg,
    /// Vehicle front.
    Front,
    /// Vehicle right side.
    Right,
    /// Vehicle left side.
    Left,
    /// Vehicle rear.
    Rear,
    /// Vehicle turret.
    Turret,
    /// Vehicle body, for equipment not on any facing.
    Body,
    /// Infantry squad.
    Squad,
}

impl Location {
    /// Short abbreviation used in hit logs.
    #[must_use]
    pub const fn abbreviation(self) -> &'static str {
        match self {
            Self::Head => "HD",
            Self::CenterTorso => "CT",
            Self::RightTorso => "RT",
            Self::LeftTorso => "LT",
            Self::RightArm => "RA",
            Self::LeftArm => "LA",
            Self::RightLeg => "RL",
            Self::LeftLeg => "LL",
            Self::Front => "FR",
            Self::Right => "RS",
            Self::Left => "LS",
            Self::Rear => "RR",
            Self::Turret => "TU",
            Self::Body => "BD",
            Self::Squad => "SQ",
        }
    }

    /// Whether this is a mech arm.
    #[must_use]
    pub const fn is_arm(self) -> bool {
        matches!(self, Self::LeftArm | Self::RightArm)
    }

    /// Whether this is a mech leg.
    #[must_use]
    pub const fn is_leg(self) -> bool {
        matches!(self, Self::LeftLeg | Self::RightLeg)
    }

    /// The limb on the other side of the body, for arms and legs.
    #[must_use]
    pub const fn other_limb(self) -> Option<Self> {
        match self {
            Self::LeftArm => Some(Self::RightArm),
            Self::RightArm => Some(Self::LeftArm),
            Self::LeftLeg => Some(Self::RightLeg),
            Self::RightLeg => Some(Self::LeftLeg),
            _ => None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// Armor or internal-structure points of a location.
///
/// Raw integer form uses the sentinels `-1` (not applicable), `-2`
/// (destroyed) and `-3` (doomed: destroyed this phase, finalised at the end
/// of the phase).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Points {
    /// Remaining points.
    Intact(u32),
    /// The location has no such component (e.g. no rear armor).
    NotApplicable,
    /// Permanently destroyed.
    Destroyed,
    /// Destroyed during the current phase.
    Doomed,
}

impl Points {
    /// Raw value for not applicable.
    pub const RAW_NOT_APPLICABLE: i32 = -1;
    /// Raw value for destroyed.
    pub const RAW_DESTROYED: i32 = -2;
    /// Raw value for doomed.
    pub const RAW_DOOMED: i32 = -3;

    /// Raw integer form.
    #[must_use]
    pub const fn raw(self) -> i32 {
        match self {
            Self::Intact(points) => points as i32,
            Self::NotApplicable => Self::RAW_NOT_APPLICABLE,
            Self::Destroyed => Self::RAW_DESTROYED,
            Self::Doomed => Self::RAW_DOOMED,
        }
    }

    /// Parse the raw integer form.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::InvalidArgument`] for negative values other than
    /// the three sentinels.
    pub fn from_raw(raw: i32) -> Result<Self> {
        match raw {
            Self::RAW_NOT_APPLICABLE => Ok(Self::NotApplicable),
            Self::RAW_DESTROYED => Ok(Self::Destroyed),
            Self::RAW_DOOMED => Ok(Self::Doomed),
            n if n >= 0 => Ok(Self::Intact(n.unsigned_abs())),
            n => Err(GameError::InvalidArgument(format!("invalid points value {n}"))),
        }
    }

    /// Remaining points, 0 for any sentinel.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Intact(points) => points,
            _ => 0,
        }
    }

    /// Whether this is destroyed or doomed.
    #[must_use]
    pub const fn is_lost(self) -> bool {
        matches!(self, Self::Destroyed | Self::Doomed)
    }
}

/// Non-equipment systems occupying critical slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SystemType {
    /// Life support.
    LifeSupport,
    /// Sensors.
    Sensors,
    /// Cockpit.
    Cockpit,
    /// Engine.
    Engine,
    /// Gyro.
    Gyro,
    /// Shoulder actuator.
    Shoulder,
    /// Upper arm actuator.
    UpperArm,
    /// Lower arm actuator.
    LowerArm,
    /// Hand actuator.
    Hand,
    /// Hip actuator.
    Hip,
    /// Upper leg actuator.
    UpperLeg,
    /// Lower leg actuator.
    LowerLeg,
    /// Foot actuator.
    Foot,
}

/// What occupies a critical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotKind {
    /// A built-in system.
    System(SystemType),
    /// Mounted equipment, by index into the entity's equipment list.
    Equipment(EquipmentId),
    /// Nothing.
    Empty,
}

/// A single critical slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CriticalSlot {
    /// Occupant.
    pub kind: SlotKind,
    /// Whether a critical hit has destroyed it.
    pub destroyed: bool,
    /// Whether a critical roll can select it.
    pub hittable: bool,
}

impl CriticalSlot {
    /// An empty, unhittable slot.
    pub const EMPTY: Self = Self {
        kind: SlotKind::Empty,
        destroyed: false,
        hittable: false,
    };

    /// A hittable system slot.
    #[must_use]
    pub const fn system(system: SystemType) -> Self {
        Self {
            kind: SlotKind::System(system),
            destroyed: false,
            hittable: true,
        }
    }

    /// A hittable equipment slot.
    #[must_use]
    pub const fn equipment(id: EquipmentId) -> Self {
        Self {
            kind: SlotKind::Equipment(id),
            destroyed: false,
            hittable: true,
        }
    }

    /// Whether a critical roll landing here would hit something.
    #[must_use]
    pub const fn can_be_hit(&self) -> bool {
        self.hittable && !self.destroyed
    }
}

/// Damage state of one location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationState {
    /// Which location this is.
    pub location: Location,
    pub(crate) armor: Points,
    pub(crate) original_armor: Points,
    pub(crate) rear_armor: Points,
    pub(crate) original_rear_armor: Points,
    pub(crate) internal: Points,
    pub(crate) original_internal: Points,
    pub(crate) slots: Vec<CriticalSlot>,
}

impl LocationState {
    /// Fresh location with the given starting points and empty slots.
    #[must_use]
    pub fn new(location: Location, armor: Points, rear_armor: Points, internal: Points, slots: usize) -> Self {
        Self {
            location,
            armor,
            original_armor: armor,
            rear_armor,
            original_rear_armor: rear_armor,
            internal,
            original_internal: internal,
            slots: vec![CriticalSlot::EMPTY; slots],
        }
    }

    /// Critical slots.
    #[must_use]
    pub fn slots(&self) -> &[CriticalSlot] {
        &self.slots
    }

    /// Whether internal structure is destroyed or doomed.
    #[must_use]
    pub const fn is_lost(&self) -> bool {
        self.internal.is_lost()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_points_sentinels() {
        assert_eq!(Points::NotApplicable.raw(), -1);
        assert_eq!(Points::Destroyed.raw(), -2);
        assert_eq!(Points::Doomed.raw(), -3);
        assert_eq!(Points::Intact(12).raw(), 12);

        assert_eq!(Points::from_raw(-3).unwrap(), Points::Doomed);
        assert_eq!(Points::from_raw(0).unwrap(), Points::Intact(0));
        assert!(Points::from_raw(-4).is_err());
    }

    #[test]
    fn test_points_value() {
        assert_eq!(Points::Intact(7).value(), 7);
        assert_eq!(Points::Doomed.value(), 0);
        assert!(Points::Doomed.is_lost());
        assert!(!Points::Intact(0).is_lost());
    }

    #[test]
    fn test_slot_hittable() {
        assert!(!CriticalSlot::EMPTY.can_be_hit());
        let mut slot = CriticalSlot::system(SystemType::Gyro);
        assert!(slot.can_be_hit());
        slot.destroyed = true;
        assert!(!slot.can_be_hit());
    }

    #[test]
    fn test_other_limb() {
        assert_eq!(Location::LeftArm.other_limb(), Some(Location::RightArm));
        assert_eq!(Location::RightLeg.other_limb(), Some(Location::LeftLeg));
        assert_eq!(Location::CenterTorso.other_limb(), None);
    }
}
