//! Physical attacks: punch, kick, push, charge and death from above.

use tracing::debug;

use super::{
    attacker_movement, basic_impossibility, resolve_pair, target_immobile, target_movement, target_prone, target_side,
    target_terrain, ToHitData,
};
use crate::damage::HitTable;
use crate::entity::{Entity, EntityId, Location, MovementMode, SystemType};
use crate::error::{GameError, Result};
use crate::game::GameView;
use crate::hex::{arc_of, translate, Arc};
use crate::math::div_ceil;

const PUNCH_BASE: i32 = 4;
const KICK_BASE: i32 = 3;
const PUSH_BASE: i32 = 4;
const CHARGE_BASE: i32 = 5;
const DFA_BASE: i32 = 5;

/// Piloting skill the physical attack bases are calibrated for.
const BASELINE_PILOTING: i32 = 5;

type Check = std::result::Result<(), String>;

fn fail(reason: impl Into<String>) -> Check {
    Err(reason.into())
}

fn common_checks(attacker: &Entity, target: &Entity) -> Check {
    if let Some(reason) = basic_impossibility(attacker, target) {
        return fail(reason);
    }
    if attacker.turn.prone {
        return fail("attacker prone");
    }
    if !attacker.position.is_adjacent(target.position) {
        return fail("target not adjacent");
    }
    Ok(())
}

fn elevation_check(attacker: &Entity, target: &Entity) -> Check {
    if (attacker.elevation - target.elevation).abs() > 1 {
        return fail("elevation difference too great");
    }
    Ok(())
}

fn in_arc(attacker: &Entity, target: &Entity, arcs: &[Arc]) -> Check {
    let arc = arc_of(attacker.position, attacker.facing, target.position);
    if arcs.contains(&arc) {
        Ok(())
    } else {
        fail("target not in arc")
    }
}

fn require_mech(attacker: &Entity) -> Check {
    if attacker.archetype().is_mech() {
        Ok(())
    } else {
        fail("only mechs can make this attack")
    }
}

/// Piloting, movement and terrain modifiers shared by every physical attack.
fn build(
    game: &dyn GameView,
    attacker: &Entity,
    target: &Entity,
    base: i32,
    reason: &str,
    table: HitTable,
    actuators: &[(i32, &str)],
) -> ToHitData {
    let mut data = ToHitData::new(base, reason);
    data.add_modifier(attacker.crew.piloting as i32 - BASELINE_PILOTING, "piloting skill");
    for &(value, why) in actuators {
        data.add_modifier(value, why);
    }
    attacker_movement(&mut data, attacker);
    target_movement(&mut data, target);
    target_terrain(&mut data, game, target);
    target_immobile(&mut data, target);
    target_prone(&mut data, attacker, target);
    data.hit_table = table;
    data.side = target_side(attacker, target);
    data.finish()
}

fn resolve(
    game: &dyn GameView,
    attacker: EntityId,
    target: EntityId,
    kind: &str,
    attack: impl FnOnce(&Entity, &Entity) -> std::result::Result<ToHitData, String>,
) -> Result<ToHitData> {
    let (attacker, target) = resolve_pair(game, attacker, target)?;
    let data = attack(attacker, target).unwrap_or_else(ToHitData::impossible);
    debug!(
        attacker = attacker.id,
        target = target.id,
        kind,
        outcome = ?data.outcome,
        value = data.value(),
        "Physical to-hit"
    );
    Ok(data)
}

// ============================================================================
// Punch
// ============================================================================

/// To-hit number for a punch with one arm.
///
/// # Errors
///
/// Returns [`GameError::InvalidArgument`] if `arm` is not an arm and
/// [`GameError::EntityNotFound`] if either unit is not in the game.
pub fn punch_to_hit(game: &dyn GameView, attacker: EntityId, target: EntityId, arm: Location) -> Result<ToHitData> {
    if !arm.is_arm() {
        return Err(GameError::InvalidArgument(format!("{arm} is not an arm")));
    }
    resolve(game, attacker, target, "punch", |attacker, target| {
        require_mech(attacker)?;
        common_checks(attacker, target)?;
        if attacker.is_location_lost(arm) {
            fail(format!("{arm} destroyed"))?;
        }
        if attacker.actuator_hit(arm, SystemType::Shoulder) {
            fail(format!("{arm} shoulder destroyed"))?;
        }
        if attacker.fired_from(arm) {
            fail(format!("weapon fired from {arm}"))?;
        }
        elevation_check(attacker, target)?;
        in_arc(attacker, target, (attacker.caps().weapon_arcs)(arm, false))?;

        let mut actuators = Vec::new();
        if attacker.actuator_hit(arm, SystemType::UpperArm) {
            actuators.push((2, "upper arm actuator destroyed"));
        }
        if attacker.actuator_hit(arm, SystemType::LowerArm) {
            actuators.push((2, "lower arm actuator destroyed"));
        }
        if attacker.actuator_hit(arm, SystemType::Hand) {
            actuators.push((1, "hand actuator destroyed"));
        }
        Ok(build(game, attacker, target, PUNCH_BASE, "punch", HitTable::Punch, &actuators))
    })
}

/// Punch damage: a tenth of the tonnage, rounded up, halved for each
/// damaged upper or lower arm actuator.
#[must_use]
pub fn punch_damage(attacker: &Entity, arm: Location) -> u32 {
    let mut damage = div_ceil(attacker.tonnage(), 10);
    for actuator in [SystemType::UpperArm, SystemType::LowerArm] {
        if attacker.actuator_hit(arm, actuator) {
            damage = div_ceil(damage, 2);
        }
    }
    damage
}

// ============================================================================
// Kick
// ============================================================================

/// To-hit number for a kick with one leg.
///
/// # Errors
///
/// Returns [`GameError::InvalidArgument`] if `leg` is not a leg and
/// [`GameError::EntityNotFound`] if either unit is not in the game.
pub fn kick_to_hit(game: &dyn GameView, attacker: EntityId, target: EntityId, leg: Location) -> Result<ToHitData> {
    if !leg.is_leg() {
        return Err(GameError::InvalidArgument(format!("{leg} is not a leg")));
    }
    resolve(game, attacker, target, "kick", |attacker, target| {
        require_mech(attacker)?;
        common_checks(attacker, target)?;
        if attacker.is_location_lost(leg) {
            fail(format!("{leg} destroyed"))?;
        }
        if attacker.actuator_hit(leg, SystemType::Hip) {
            fail(format!("{leg} hip destroyed"))?;
        }
        if leg.other_limb().is_some_and(|other| attacker.is_location_lost(other)) {
            fail("cannot kick on one leg")?;
        }
        if attacker.fired_from(leg) {
            fail(format!("weapon fired from {leg}"))?;
        }
        elevation_check(attacker, target)?;
        in_arc(attacker, target, &[Arc::Front])?;

        let mut actuators = Vec::new();
        if attacker.actuator_hit(leg, SystemType::UpperLeg) {
            actuators.push((2, "upper leg actuator destroyed"));
        }
        if attacker.actuator_hit(leg, SystemType::LowerLeg) {
            actuators.push((2, "lower leg actuator destroyed"));
        }
        if attacker.actuator_hit(leg, SystemType::Foot) {
            actuators.push((1, "foot actuator destroyed"));
        }
        Ok(build(game, attacker, target, KICK_BASE, "kick", HitTable::Kick, &actuators))
    })
}

/// Kick damage: a fifth of the tonnage, rounded down, halved for each
/// damaged upper or lower leg actuator.
#[must_use]
pub fn kick_damage(attacker: &Entity, leg: Location) -> u32 {
    let mut damage = attacker.tonnage() / 5;
    for actuator in [SystemType::UpperLeg, SystemType::LowerLeg] {
        if attacker.actuator_hit(leg, actuator) {
            damage = div_ceil(damage, 2);
        }
    }
    damage
}

// ============================================================================
// Push
// ============================================================================

/// To-hit number for a two-armed push.
///
/// # Errors
///
/// Returns [`GameError::EntityNotFound`] if either unit is not in the game.
pub fn push_to_hit(game: &dyn GameView, attacker: EntityId, target: EntityId) -> Result<ToHitData> {
    resolve(game, attacker, target, "push", |attacker, target| {
        require_mech(attacker)?;
        common_checks(attacker, target)?;
        for arm in [Location::LeftArm, Location::RightArm] {
            if attacker.is_location_lost(arm) {
                fail(format!("{arm} destroyed"))?;
            }
            if attacker.actuator_hit(arm, SystemType::Shoulder) {
                fail(format!("{arm} shoulder destroyed"))?;
            }
            if attacker.fired_from(arm) {
                fail(format!("weapon fired from {arm}"))?;
            }
        }
        if !target.archetype().is_mech() {
            fail("only mechs can be pushed")?;
        }
        if translate(attacker.position, attacker.facing) != target.position {
            fail("target not directly ahead")?;
        }
        if attacker.elevation != target.elevation {
            fail("target not at the same elevation")?;
        }
        Ok(build(game, attacker, target, PUSH_BASE, "push", HitTable::Normal, &[]))
    })
}

// ============================================================================
// Charge and death from above
// ============================================================================

/// To-hit number for a charge at the end of a ground move.
///
/// # Errors
///
/// Returns [`GameError::EntityNotFound`] if either unit is not in the game.
pub fn charge_to_hit(game: &dyn GameView, attacker: EntityId, target: EntityId) -> Result<ToHitData> {
    resolve(game, attacker, target, "charge", |attacker, target| {
        common_checks(attacker, target)?;
        if attacker.archetype().is_mech() || attacker.archetype().is_vehicle() {
            if attacker.turn.movement == MovementMode::Jumped {
                fail("cannot charge after jumping")?;
            }
        } else {
            fail("only mechs and vehicles can charge")?;
        }
        elevation_check(attacker, target)?;
        in_arc(attacker, target, &[Arc::Front])?;
        Ok(build(game, attacker, target, CHARGE_BASE, "charge", HitTable::Normal, &[]))
    })
}

/// Charge damage: a tenth of the tonnage per hex moved after the first,
/// rounded up.
#[must_use]
pub fn charge_damage(attacker: &Entity, hexes_moved: u32) -> u32 {
    div_ceil(attacker.tonnage() * hexes_moved.saturating_sub(1), 10)
}

/// To-hit number for a death from above at the end of a jump.
///
/// # Errors
///
/// Returns [`GameError::EntityNotFound`] if either unit is not in the game.
pub fn dfa_to_hit(game: &dyn GameView, attacker: EntityId, target: EntityId) -> Result<ToHitData> {
    resolve(game, attacker, target, "death from above", |attacker, target| {
        require_mech(attacker)?;
        common_checks(attacker, target)?;
        if attacker.turn.movement != MovementMode::Jumped {
            fail("death from above needs a jump")?;
        }
        in_arc(attacker, target, &[Arc::Front])?;
        Ok(build(game, attacker, target, DFA_BASE, "death from above", HitTable::Punch, &[]))
    })
}

/// Death-from-above damage: three tenths of the tonnage, rounded up.
#[must_use]
pub fn dfa_damage(attacker: &Entity) -> u32 {
    div_ceil(attacker.tonnage() * 3, 10)
}
