//! Battle value: a single number rating a unit's combat worth.
//!
//! The score combines a defensive rating (armor, structure, mobility) with an
//! offensive rating (weapons, ammunition, speed) and scales the sum by the
//! crew's skill. Everything is computed from the unit's current damage state
//! in fixed-point so every client agrees on the result.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::data::EquipmentKind;
use crate::entity::{Entity, EquipmentId};
use crate::math::{div_ceil, fixed_serde, hundredths, round_to_u32, Fixed};

/// Defensive penalty per explosive ammunition bin outside CASE.
pub const UNPROTECTED_AMMO_PENALTY: u32 = 20;

/// Heat a mech builds by running, counted against its dissipation.
const RUNNING_HEAT: u32 = 2;

/// Speed factors in hundredths, indexed by adjusted MP.
const SPEED_FACTORS: [i32; 26] = [
    44, 54, 65, 77, 88, 100, 112, 124, 137, 149, 162, 175, 188, 201, 214, 227, 241, 254, 268, 282, 296, 310, 324, 338,
    352, 367,
];

/// Skill multipliers in hundredths, indexed by gunnery then piloting.
const PILOT_MULTIPLIERS: [[i32; 8]; 8] = [
    [242, 231, 221, 210, 193, 175, 168, 159],
    [221, 211, 202, 192, 176, 160, 154, 146],
    [193, 185, 176, 168, 154, 140, 135, 128],
    [166, 158, 151, 144, 132, 120, 116, 110],
    [138, 132, 126, 120, 110, 100, 95, 90],
    [131, 119, 113, 108, 99, 90, 86, 81],
    [124, 112, 107, 102, 94, 85, 81, 77],
    [117, 106, 101, 96, 88, 80, 76, 72],
];

/// The parts a battle value is assembled from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleValue {
    /// Defensive rating.
    #[serde(with = "fixed_serde")]
    pub defensive: Fixed,
    /// Offensive rating.
    #[serde(with = "fixed_serde")]
    pub offensive: Fixed,
    /// Crew skill multiplier.
    #[serde(with = "fixed_serde")]
    pub pilot_multiplier: Fixed,
    /// Final score.
    pub total: u32,
}

/// Battle value of a unit in its current state.
#[must_use]
pub fn calculate(entity: &Entity) -> u32 {
    breakdown(entity).total
}

/// Battle value with its intermediate ratings.
#[must_use]
pub fn breakdown(entity: &Entity) -> BattleValue {
    let defensive = defensive_value(entity);
    let offensive = offensive_value(entity);
    let pilot_multiplier = pilot_multiplier(entity.crew.gunnery, entity.crew.piloting);
    let total = round_to_u32((defensive + offensive) * pilot_multiplier);
    trace!(
        entity = entity.id,
        defensive = %defensive,
        offensive = %offensive,
        total,
        "Battle value"
    );
    BattleValue {
        defensive,
        offensive,
        pilot_multiplier,
        total,
    }
}

// ============================================================================
// Tables
// ============================================================================

/// Target movement modifier for a movement allowance.
#[must_use]
pub const fn movement_modifier(mp: u32) -> u32 {
    match mp {
        0..=2 => 0,
        3 | 4 => 1,
        5 | 6 => 2,
        7..=9 => 3,
        10..=17 => 4,
        18..=24 => 5,
        _ => 6,
    }
}

/// Speed factor for run MP plus half the jump MP, rounded up.
#[must_use]
pub fn speed_factor(run_mp: u32, jump_mp: u32) -> Fixed {
    let mp = (run_mp + div_ceil(jump_mp, 2)).min(SPEED_FACTORS.len() as u32 - 1);
    hundredths(SPEED_FACTORS[mp as usize])
}

/// Skill multiplier; skills worse than 7 use the 7 column.
#[must_use]
pub fn pilot_multiplier(gunnery: u32, piloting: u32) -> Fixed {
    let gunnery = gunnery.min(7) as usize;
    let piloting = piloting.min(7) as usize;
    hundredths(PILOT_MULTIPLIERS[gunnery][piloting])
}

// ============================================================================
// Defensive
// ============================================================================

fn defensive_value(entity: &Entity) -> Fixed {
    let positive = Fixed::from_num(entity.total_armor() * 2)
        + Fixed::from_num(entity.total_internal()) * hundredths(150)
        + Fixed::from_num(entity.tonnage());
    let penalty = Fixed::from_num(unprotected_ammo(entity) * UNPROTECTED_AMMO_PENALTY + overheat(entity));
    let base = (positive - penalty).max(Fixed::ONE);

    let run = movement_modifier(entity.run_mp());
    let jump = entity.jump_mp();
    let modifier = if jump > 0 { run.max(movement_modifier(jump) + 1) } else { run };
    let movement_factor = Fixed::ONE + Fixed::from_num(modifier) / Fixed::from_num(10);

    base * movement_factor * hundredths(entity.caps().bv_multiplier)
}

/// Explosive bins with shots left outside CASE.
fn unprotected_ammo(entity: &Entity) -> u32 {
    (0..entity.equipment().len())
        .filter(|&id| entity.is_equipment_functional(id))
        .filter(|&id| {
            let mounted = &entity.equipment()[id];
            let explosive = mounted.data.ammo().is_some_and(|ammo| ammo.explosive);
            explosive && mounted.shots_left > 0 && !mounted.location.is_some_and(|loc| entity.has_case(loc))
        })
        .count() as u32
}

/// Heat a mech cannot shed when firing everything while running.
fn overheat(entity: &Entity) -> u32 {
    let Some(dissipation) = entity.heat_dissipation() else {
        return 0;
    };
    let weapon_heat: u32 = working_weapons(entity)
        .filter_map(|id| entity.equipment()[id].data.weapon())
        .map(|stats| stats.heat)
        .sum();
    (weapon_heat + RUNNING_HEAT).saturating_sub(dissipation)
}

// ============================================================================
// Offensive
// ============================================================================

fn working_weapons(entity: &Entity) -> impl Iterator<Item = EquipmentId> + '_ {
    entity.weapons().filter(|&id| entity.is_equipment_functional(id))
}

fn offensive_value(entity: &Entity) -> Fixed {
    let base = weapon_value(entity)
        + Fixed::from_num(ammo_value(entity) + misc_value(entity))
        + Fixed::from_num(entity.tonnage()) / Fixed::from_num(2);
    base * speed_factor(entity.run_mp(), entity.jump_mp())
}

/// Weapon BV, best first; weapons fired past the heat the unit can shed
/// count half.
fn weapon_value(entity: &Entity) -> Fixed {
    let mut weapons: Vec<(u32, u32)> = working_weapons(entity)
        .filter_map(|id| {
            let data = &entity.equipment()[id].data;
            data.weapon().map(|stats| (data.bv, stats.heat))
        })
        .collect();
    weapons.sort_by(|a, b| b.0.cmp(&a.0));

    let dissipation = entity.heat_dissipation();
    let mut heat = 0;
    let mut total = Fixed::ZERO;
    for (bv, weapon_heat) in weapons {
        heat += weapon_heat;
        let value = Fixed::from_num(bv);
        total += match dissipation {
            Some(limit) if heat > limit => value / Fixed::from_num(2),
            _ => value,
        };
    }
    total
}

/// BV of working ammunition some working weapon can fire.
fn ammo_value(entity: &Entity) -> u32 {
    let fed: Vec<&str> = working_weapons(entity)
        .filter_map(|id| entity.equipment()[id].data.weapon()?.ammo_type.as_deref())
        .collect();
    (0..entity.equipment().len())
        .filter(|&id| entity.is_equipment_functional(id))
        .filter_map(|id| {
            let data = &entity.equipment()[id].data;
            let ammo = data.ammo()?;
            fed.contains(&ammo.ammo_type.as_str()).then_some(data.bv)
        })
        .sum()
}

fn misc_value(entity: &Entity) -> u32 {
    (0..entity.equipment().len())
        .filter(|&id| entity.is_equipment_functional(id))
        .map(|id| &entity.equipment()[id].data)
        .filter(|data| matches!(data.kind, EquipmentKind::Misc(_)))
        .map(|data| data.bv)
        .sum()
}
