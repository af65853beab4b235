//! Equipment data structures for data-driven unit loadouts.

use serde::{Deserialize, Serialize};

use crate::math::{fixed_serde, Fixed};

/// Range brackets and firing characteristics of a weapon.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeaponStats {
    /// Damage per hit.
    pub damage: u32,

    /// Heat generated when fired.
    pub heat: u32,

    /// Minimum range; 0 when the weapon has none.
    #[serde(default)]
    pub min_range: u32,

    /// Upper bound of short range, in hexes.
    pub short_range: u32,

    /// Upper bound of medium range, in hexes.
    pub medium_range: u32,

    /// Upper bound of long range, in hexes.
    pub long_range: u32,

    /// Upper bound of extreme range, in hexes.
    pub extreme_range: u32,

    /// Ammunition type consumed, `None` for energy weapons.
    #[serde(default)]
    pub ammo_type: Option<String>,
}

/// Range bracket of a shot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeBracket {
    /// Short range.
    Short,
    /// Medium range.
    Medium,
    /// Long range.
    Long,
    /// Extreme range (optional rule).
    Extreme,
}

impl WeaponStats {
    /// Range bracket for a distance, `None` when out of range.
    #[must_use]
    pub const fn bracket(&self, distance: u32, extreme_allowed: bool) -> Option<RangeBracket> {
        if distance <= self.short_range {
            Some(RangeBracket::Short)
        } else if distance <= self.medium_range {
            Some(RangeBracket::Medium)
        } else if distance <= self.long_range {
            Some(RangeBracket::Long)
        } else if extreme_allowed && distance <= self.extreme_range {
            Some(RangeBracket::Extreme)
        } else {
            None
        }
    }
}

/// A bin of ammunition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AmmoStats {
    /// Ammunition type, matched against [`WeaponStats::ammo_type`].
    pub ammo_type: String,

    /// Shots in a full bin.
    pub shots: u32,

    /// Damage each shot deals when the bin explodes.
    pub damage_per_shot: u32,

    /// Whether a critical hit on this bin detonates it.
    #[serde(default = "default_explosive")]
    pub explosive: bool,
}

/// Default explosiveness for ammunition without an explicit flag.
const fn default_explosive() -> bool {
    true
}

/// Miscellaneous equipment that the rules treat specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MiscKind {
    /// Dissipates one point of heat per turn.
    HeatSink,
    /// Provides one jump MP.
    JumpJet,
    /// Vents ammunition explosions out of its location.
    Case,
}

/// What a piece of equipment is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipmentKind {
    /// Weapon.
    Weapon(WeaponStats),
    /// Ammunition bin.
    Ammo(AmmoStats),
    /// Other equipment.
    Misc(MiscKind),
}

/// Data-driven equipment definition.
///
/// # Example RON
///
/// ```ron
/// EquipmentData(
///     id: "medium_laser",
///     name: "Medium Laser",
///     tonnage: 4294967296,  // Fixed-point for 1.0
///     slots: 1,
///     bv: 46,
///     kind: Weapon(WeaponStats(
///         damage: 5,
///         heat: 3,
///         short_range: 3,
///         medium_range: 6,
///         long_range: 9,
///         extreme_range: 12,
///     )),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EquipmentData {
    /// Unique string identifier.
    pub id: String,

    /// Display name.
    pub name: String,

    /// Weight in tons (fixed-point).
    #[serde(with = "fixed_serde")]
    pub tonnage: Fixed,

    /// Critical slots occupied.
    pub slots: u32,

    /// Battle value contribution.
    #[serde(default)]
    pub bv: u32,

    /// Equipment category and category-specific stats.
    pub kind: EquipmentKind,
}

impl EquipmentData {
    /// Weapon stats, if this is a weapon.
    #[must_use]
    pub const fn weapon(&self) -> Option<&WeaponStats> {
        match &self.kind {
            EquipmentKind::Weapon(stats) => Some(stats),
            _ => None,
        }
    }

    /// Ammunition stats, if this is an ammo bin.
    #[must_use]
    pub const fn ammo(&self) -> Option<&AmmoStats> {
        match &self.kind {
            EquipmentKind::Ammo(stats) => Some(stats),
            _ => None,
        }
    }

    /// Whether this is the given kind of miscellaneous equipment.
    #[must_use]
    pub fn is_misc(&self, misc: MiscKind) -> bool {
        self.kind == EquipmentKind::Misc(misc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn large_laser() -> WeaponStats {
        WeaponStats {
            damage: 8,
            heat: 8,
            min_range: 0,
            short_range: 5,
            medium_range: 10,
            long_range: 15,
            extreme_range: 20,
            ammo_type: None,
        }
    }

    #[test]
    fn test_range_brackets() {
        let stats = large_laser();
        assert_eq!(stats.bracket(0, false), Some(RangeBracket::Short));
        assert_eq!(stats.bracket(5, false), Some(RangeBracket::Short));
        assert_eq!(stats.bracket(6, false), Some(RangeBracket::Medium));
        assert_eq!(stats.bracket(15, false), Some(RangeBracket::Long));
        assert_eq!(stats.bracket(16, false), None);
        assert_eq!(stats.bracket(16, true), Some(RangeBracket::Extreme));
        assert_eq!(stats.bracket(21, true), None);
    }

    #[test]
    fn test_equipment_data_from_ron() {
        let ron_str = r#"
            EquipmentData(
                id: "ac_5_ammo",
                name: "AC/5 Ammo",
                tonnage: 4294967296,
                slots: 1,
                bv: 9,
                kind: Ammo(AmmoStats(ammo_type: "ac_5", shots: 20, damage_per_shot: 5)),
            )
        "#;

        let data: EquipmentData = ron::from_str(ron_str).unwrap();
        assert_eq!(data.tonnage, Fixed::ONE);
        let ammo = data.ammo().unwrap();
        assert_eq!(ammo.shots, 20);
        assert!(ammo.explosive);
        assert!(data.weapon().is_none());
    }
}
