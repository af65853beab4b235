//! Critical hits: slot rolls for mechs, the effect table for vehicles.

use serde::{Deserialize, Serialize};

use super::transfer::{self, Strike};
use super::{DamageEvent, DamageReport, HitData};
use crate::dice::DiceRoller;
use crate::entity::{
    Archetype, CriticalSlot, DestructionCause, Entity, EquipmentId, Location, SlotKind, SystemType,
    ENGINE_DESTROYED_HITS,
};
use crate::error::{GameError, Result};
use crate::options::{GameOptions, FLOATING_CRITS, NO_TAC};

/// Pilot hits taken when an ammunition bin explodes.
const AMMO_EXPLOSION_PILOT_HITS: u32 = 2;

/// Outcome of a vehicle critical roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleCritical {
    /// Nothing happened.
    NoEffect,
    /// One motive hit.
    MotiveDamaged,
    /// A weapon in the location was destroyed.
    WeaponDestroyed(EquipmentId),
    /// The crew is stunned.
    CrewStunned,
    /// The turret can no longer rotate.
    TurretLocked,
    /// The engine was hit.
    EngineHit,
    /// Stored ammunition exploded, destroying the vehicle.
    AmmoExplosion,
    /// The motive system was destroyed.
    Immobilized,
}

/// Roll a critical check against a mech location and apply the hits.
///
/// 8-9 gives one critical, 10-11 two, and 12 or more blows off a limb or
/// the head, or gives three criticals to a torso.
pub(super) fn critical_check(
    entity: &mut Entity,
    location: Location,
    dice: &mut dyn DiceRoller,
    report: &mut DamageReport,
) -> Result<()> {
    let roll = dice.roll_d6(2);
    let blows_off = location == Location::Head || location.is_arm() || location.is_leg();

    if roll >= 12 && blows_off {
        report.push(DamageEvent::CriticalCheck { location, roll, hits: 0 });
        report.push(DamageEvent::LimbBlownOff { location });
        return transfer::lose_location(entity, location, report);
    }

    let hits = match roll {
        0..=7 => 0,
        8 | 9 => 1,
        10 | 11 => 2,
        _ => 3,
    };
    report.push(DamageEvent::CriticalCheck { location, roll, hits });

    for _ in 0..hits {
        if entity.is_destroyed() || entity.is_location_lost(location) {
            break;
        }
        let Some(slot) = choose_slot(entity, location, dice) else {
            break;
        };
        apply_slot_hit(entity, location, slot, report)?;
    }
    Ok(())
}

/// Pick a hittable slot, re-rolling empty and destroyed ones.
///
/// Locations with more than six slots roll for the upper or lower block
/// first. Returns `None` when nothing in the location can be hit.
fn choose_slot(entity: &Entity, location: Location, dice: &mut dyn DiceRoller) -> Option<usize> {
    let slots = entity.location_state(location)?.slots();
    if !slots.iter().any(CriticalSlot::can_be_hit) {
        return None;
    }
    loop {
        let block = if slots.len() > 6 && dice.roll_die() > 3 { 6 } else { 0 };
        let index = block + dice.roll_die() as usize - 1;
        if slots.get(index).is_some_and(CriticalSlot::can_be_hit) {
            return Some(index);
        }
    }
}

fn apply_slot_hit(entity: &mut Entity, location: Location, index: usize, report: &mut DamageReport) -> Result<()> {
    let slot = entity.critical_slot_mut(location, index).ok_or_else(|| {
        GameError::InvalidState(format!("{location} has no critical slot {index}"))
    })?;
    slot.destroyed = true;
    let kind = slot.kind;
    report.push(DamageEvent::CriticalHit {
        location,
        slot: index,
        kind,
    });

    match kind {
        SlotKind::System(SystemType::Cockpit) => {
            transfer::destroy_unit(entity, DestructionCause::CockpitDestroyed, report);
        }
        SlotKind::System(SystemType::Engine) if entity.engine_hits() >= ENGINE_DESTROYED_HITS => {
            transfer::destroy_unit(entity, DestructionCause::EngineDestroyed, report);
        }
        SlotKind::Equipment(id) => equipment_hit(entity, id, report)?,
        SlotKind::System(_) | SlotKind::Empty => {}
    }
    Ok(())
}

/// Destroy a mounted item; a loaded explosive bin goes off.
fn equipment_hit(entity: &mut Entity, id: EquipmentId, report: &mut DamageReport) -> Result<()> {
    let mounted = entity
        .mounted_mut(id)
        .ok_or_else(|| GameError::InvalidState(format!("no equipment {id}")))?;
    mounted.destroyed = true;

    let per_shot = mounted
        .data
        .ammo()
        .filter(|ammo| ammo.explosive)
        .map(|ammo| ammo.damage_per_shot);
    let (Some(per_shot), Some(location)) = (per_shot, mounted.location) else {
        return Ok(());
    };
    if mounted.shots_left == 0 {
        return Ok(());
    }
    let damage = mounted.shots_left * per_shot;
    mounted.shots_left = 0;

    ammo_explosion(entity, location, id, damage, report)
}

fn ammo_explosion(
    entity: &mut Entity,
    location: Location,
    bin: EquipmentId,
    damage: u32,
    report: &mut DamageReport,
) -> Result<()> {
    let contained = entity.has_case(location);
    report.push(DamageEvent::AmmoExplosion {
        location,
        equipment: bin,
        damage,
        contained,
    });

    if !entity.archetype().is_mech() {
        transfer::destroy_unit(entity, DestructionCause::AmmoExplosion, report);
        return Ok(());
    }

    entity.damage_crew(AMMO_EXPLOSION_PILOT_HITS);
    report.push(DamageEvent::PilotDamaged {
        hits: AMMO_EXPLOSION_PILOT_HITS,
    });
    if entity.destruction_cause() == Some(DestructionCause::CrewKilled) {
        report.push(DamageEvent::UnitDestroyed {
            cause: DestructionCause::CrewKilled,
        });
    }

    transfer::run(entity, Strike::internal(location, damage, contained), report)
}

/// Resolve a through-armor critical for a hit that rolled one.
pub(super) fn through_armor_critical(
    entity: &mut Entity,
    hit: &HitData,
    options: &GameOptions,
    dice: &mut dyn DiceRoller,
    report: &mut DamageReport,
) -> Result<()> {
    if options.boolean_option(NO_TAC) {
        return Ok(());
    }
    let location = if options.boolean_option(FLOATING_CRITS) {
        super::roll_location(entity, hit.table, hit.side, dice).location
    } else {
        hit.location
    };
    report.push(DamageEvent::ThroughArmorCritical { location });
    if entity.is_location_lost(location) {
        return Ok(());
    }

    match entity.archetype() {
        Archetype::Mech => critical_check(entity, location, dice, report),
        Archetype::Vehicle(_) => {
            vehicle_critical(entity, location, dice, report);
            Ok(())
        }
        Archetype::Infantry => Ok(()),
    }
}

/// Roll on the vehicle critical table.
fn vehicle_critical(entity: &mut Entity, location: Location, dice: &mut dyn DiceRoller, report: &mut DamageReport) {
    let roll = dice.roll_d6(2);
    let effect = match roll {
        0..=5 => VehicleCritical::NoEffect,
        6 => {
            entity.vehicle.motive_hits += 1;
            VehicleCritical::MotiveDamaged
        }
        7 => destroy_weapon_at(entity, location),
        8 => {
            entity.vehicle.crew_stunned = true;
            VehicleCritical::CrewStunned
        }
        9 if entity.has_location(Location::Turret) && !entity.is_location_lost(Location::Turret) => {
            entity.vehicle.turret_locked = true;
            VehicleCritical::TurretLocked
        }
        9 => destroy_weapon_at(entity, location),
        10 => {
            entity.vehicle.engine_hit = true;
            VehicleCritical::EngineHit
        }
        11 if has_loaded_ammo(entity) => VehicleCritical::AmmoExplosion,
        11 => destroy_weapon_at(entity, location),
        _ => {
            entity.vehicle.immobilized = true;
            VehicleCritical::Immobilized
        }
    };

    report.push(DamageEvent::VehicleCritical { location, roll, effect });
    if effect == VehicleCritical::AmmoExplosion {
        transfer::destroy_unit(entity, DestructionCause::AmmoExplosion, report);
    }
}

fn destroy_weapon_at(entity: &mut Entity, location: Location) -> VehicleCritical {
    let target = entity.weapons().find(|&id| {
        entity.is_equipment_functional(id) && entity.mounted(id).is_some_and(|m| m.location == Some(location))
    });
    match target.and_then(|id| entity.mounted_mut(id).map(|mounted| (id, mounted))) {
        Some((id, mounted)) => {
            mounted.destroyed = true;
            VehicleCritical::WeaponDestroyed(id)
        }
        None => VehicleCritical::NoEffect,
    }
}

fn has_loaded_ammo(entity: &Entity) -> bool {
    (0..entity.equipment().len()).any(|id| {
        entity.is_equipment_functional(id)
            && entity
                .mounted(id)
                .is_some_and(|mounted| mounted.data.ammo().is_some() && mounted.shots_left > 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::EquipmentCatalog;
    use crate::dice::RecordedDice;
    use crate::entity::{EntityBuilder, MotiveType};

    fn catalog() -> EquipmentCatalog {
        EquipmentCatalog::standard().unwrap()
    }

    #[test]
    fn test_roll_below_eight_does_nothing() {
        let mut entity = EntityBuilder::mech("Target", 50).build().unwrap();
        let mut report = DamageReport::new(entity.id);
        critical_check(&mut entity, Location::CenterTorso, &mut RecordedDice::new([3, 4]), &mut report).unwrap();
        assert_eq!(
            report.events,
            vec![DamageEvent::CriticalCheck {
                location: Location::CenterTorso,
                roll: 7,
                hits: 0
            }]
        );
    }

    #[test]
    fn test_twelve_blows_off_limb() {
        let mut entity = EntityBuilder::mech("Target", 50).build().unwrap();
        let mut report = DamageReport::new(entity.id);
        critical_check(&mut entity, Location::RightArm, &mut RecordedDice::new([6, 6]), &mut report).unwrap();
        assert!(entity.is_location_lost(Location::RightArm));
        assert!(report.events.contains(&DamageEvent::LimbBlownOff {
            location: Location::RightArm
        }));
        assert!(!entity.is_destroyed());
    }

    #[test]
    fn test_head_blown_off_destroys_unit() {
        let mut entity = EntityBuilder::mech("Target", 50).build().unwrap();
        let mut report = DamageReport::new(entity.id);
        critical_check(&mut entity, Location::Head, &mut RecordedDice::new([6, 6]), &mut report).unwrap();
        assert!(entity.is_destroyed());
        assert!(report.unit_destroyed());
    }

    #[test]
    fn test_cockpit_hit_destroys_unit() {
        let mut entity = EntityBuilder::mech("Target", 50).build().unwrap();
        let mut report = DamageReport::new(entity.id);
        // 8 -> one critical; head has six slots, slot 3 is the cockpit.
        critical_check(&mut entity, Location::Head, &mut RecordedDice::new([4, 4, 3]), &mut report).unwrap();
        assert_eq!(entity.destruction_cause(), Some(DestructionCause::CockpitDestroyed));
    }

    #[test]
    fn test_empty_slot_is_rerolled() {
        let mut entity = EntityBuilder::mech("Target", 50).build().unwrap();
        let mut report = DamageReport::new(entity.id);
        // Head slot 4 is empty: roll 4, then 1 (life support).
        critical_check(&mut entity, Location::Head, &mut RecordedDice::new([4, 4, 4, 1]), &mut report).unwrap();
        assert!(report.events.contains(&DamageEvent::CriticalHit {
            location: Location::Head,
            slot: 0,
            kind: SlotKind::System(SystemType::LifeSupport)
        }));
    }

    #[test]
    fn test_ammo_explosion_without_case_transfers() {
        let catalog = catalog();
        let mut entity = EntityBuilder::mech("Target", 50)
            .equip(catalog.require("ac_20_ammo").unwrap(), Location::LeftArm)
            .build()
            .unwrap();
        let bin = entity.equipment().len() - 1;
        let mut report = DamageReport::new(entity.id);
        equipment_hit(&mut entity, bin, &mut report).unwrap();

        // 5 shots x 20 damage rips through the arm and torso.
        assert!(report.events.contains(&DamageEvent::AmmoExplosion {
            location: Location::LeftArm,
            equipment: bin,
            damage: 100,
            contained: false
        }));
        assert_eq!(entity.crew.hits, 2);
        assert!(entity.is_destroyed());
    }

    #[test]
    fn test_case_contains_explosion() {
        let catalog = catalog();
        let mut entity = EntityBuilder::mech("Target", 50)
            .equip(catalog.require("ac_20_ammo").unwrap(), Location::LeftTorso)
            .equip(catalog.require("case").unwrap(), Location::LeftTorso)
            .build()
            .unwrap();
        let bin = entity
            .equipment()
            .iter()
            .position(|mounted| mounted.data.ammo().is_some())
            .unwrap();
        let mut report = DamageReport::new(entity.id);
        equipment_hit(&mut entity, bin, &mut report).unwrap();

        assert!(entity.is_location_lost(Location::LeftTorso));
        assert!(!entity.is_destroyed());
        assert_eq!(report.transferred(), 0);
    }

    #[test]
    fn test_empty_bin_does_not_explode() {
        let catalog = catalog();
        let mut entity = EntityBuilder::mech("Target", 50)
            .equip(catalog.require("srm_6_ammo").unwrap(), Location::RightTorso)
            .build()
            .unwrap();
        entity.mounted_mut(0).unwrap().shots_left = 0;
        let mut report = DamageReport::new(entity.id);
        equipment_hit(&mut entity, 0, &mut report).unwrap();
        assert!(report.events.is_empty());
        assert!(entity.mounted(0).unwrap().destroyed);
    }

    #[test]
    fn test_vehicle_critical_table() {
        let catalog = catalog();
        let mut tank = EntityBuilder::vehicle("Tank", MotiveType::Tracked, 50)
            .equip(catalog.require("medium_laser").unwrap(), Location::Front)
            .build()
            .unwrap();
        let mut report = DamageReport::new(tank.id);

        vehicle_critical(&mut tank, Location::Front, &mut RecordedDice::new([3, 3]), &mut report);
        assert_eq!(tank.vehicle.motive_hits, 1);

        vehicle_critical(&mut tank, Location::Front, &mut RecordedDice::new([3, 4]), &mut report);
        assert!(tank.mounted(0).unwrap().destroyed);

        // No turret: a 9 falls back to a weapon, and none are left.
        vehicle_critical(&mut tank, Location::Front, &mut RecordedDice::new([4, 5]), &mut report);
        assert!(!tank.vehicle.turret_locked);

        vehicle_critical(&mut tank, Location::Front, &mut RecordedDice::new([6, 6]), &mut report);
        assert!(tank.vehicle.immobilized);
        assert!(tank.is_immobile());
        assert!(!tank.is_destroyed());
    }

    #[test]
    fn test_vehicle_ammo_explosion() {
        let catalog = catalog();
        let mut tank = EntityBuilder::vehicle("Tank", MotiveType::Tracked, 50)
            .equip(catalog.require("srm_6_ammo").unwrap(), Location::Rear)
            .build()
            .unwrap();
        let mut report = DamageReport::new(tank.id);
        vehicle_critical(&mut tank, Location::Rear, &mut RecordedDice::new([5, 6]), &mut report);
        assert_eq!(tank.destruction_cause(), Some(DestructionCause::AmmoExplosion));
    }
}
