//! Weapon fire.

use tracing::debug;

use super::{
    attacker_movement, basic_impossibility, line_of_sight, resolve_pair, target_immobile, target_movement,
    target_prone, target_side, target_terrain, ToHitData,
};
use crate::damage::HitTable;
use crate::data::{RangeBracket, WeaponStats};
use crate::entity::{Entity, EntityId, EquipmentId, Location, Mounted, SystemType, SENSORS_DESTROYED_HITS};
use crate::error::Result;
use crate::game::GameView;
use crate::hex::{arc_of, Arc};
use crate::options::MAXTECH_RANGE;

const FRONT_ONLY: &[Arc] = &[Arc::Front];

/// Heat modifier to fire.
#[must_use]
pub const fn heat_modifier(heat: u32) -> i32 {
    match heat {
        0..=7 => 0,
        8..=12 => 1,
        13..=16 => 2,
        17..=23 => 3,
        _ => 4,
    }
}

/// Range modifier for a bracket.
#[must_use]
pub const fn range_modifier(bracket: RangeBracket) -> i32 {
    match bracket {
        RangeBracket::Short => 0,
        RangeBracket::Medium => 2,
        RangeBracket::Long => 4,
        RangeBracket::Extreme => 6,
    }
}

fn weapon_arcs(attacker: &Entity, mounted: &Mounted) -> &'static [Arc] {
    mounted
        .location
        .map_or(FRONT_ONLY, |location| (attacker.caps().weapon_arcs)(location, mounted.rear_mounted))
}

/// Conditions that stop the shot, checked in order. Returns the weapon when
/// none apply.
fn check_weapon<'a>(
    game: &dyn GameView,
    attacker: &'a Entity,
    target: &Entity,
    weapon: EquipmentId,
) -> std::result::Result<(&'a Mounted, &'a WeaponStats), String> {
    if let Some(reason) = basic_impossibility(attacker, target) {
        return Err(reason.to_owned());
    }

    let Some(mounted) = attacker.mounted(weapon) else {
        return Err(format!("no equipment {weapon}"));
    };
    let Some(stats) = mounted.data.weapon() else {
        return Err(format!("{} is not a weapon", mounted.name()));
    };
    if mounted.destroyed {
        return Err(format!("{} destroyed", mounted.name()));
    }
    if let Some(location) = mounted.location {
        if attacker.is_location_lost(location) {
            return Err(format!("{} location {location} destroyed", mounted.name()));
        }
    }
    if mounted.fired_this_turn {
        return Err(format!("{} already fired", mounted.name()));
    }
    if attacker.needs_ammo(weapon) && attacker.ammo_for(weapon).is_none() {
        return Err(format!("{} has no ammo", mounted.name()));
    }
    if attacker.sensor_hits() >= SENSORS_DESTROYED_HITS {
        return Err("sensors destroyed".to_owned());
    }

    let distance = attacker.position.distance(target.position);
    let extreme = game.options().boolean_option(MAXTECH_RANGE);
    if stats.bracket(distance, extreme).is_none() {
        return Err(format!("target out of range ({distance} hexes)"));
    }

    let arc = arc_of(attacker.position, attacker.facing, target.position);
    if !weapon_arcs(attacker, mounted).contains(&arc) {
        return Err(format!("target not in {} arc", mounted.name()));
    }

    let los = line_of_sight(game, attacker, target);
    if los.blocked_by_terrain {
        return Err("line of sight blocked by terrain".to_owned());
    }
    if los.blocked_by_woods() {
        return Err("line of sight blocked by woods".to_owned());
    }

    if attacker.turn.prone {
        if attacker.is_location_lost(Location::LeftArm) && attacker.is_location_lost(Location::RightArm) {
            return Err("prone with both arms destroyed".to_owned());
        }
        if let Some(location) = mounted.location {
            if location.is_leg() {
                return Err("cannot fire leg weapons while prone".to_owned());
            }
            if attacker.turn.propping_arm == Some(location) {
                return Err("arm is propping the unit up".to_owned());
            }
        }
    }
    Ok((mounted, stats))
}

/// To-hit number for firing a weapon at a target.
///
/// # Errors
///
/// Returns [`crate::error::GameError::EntityNotFound`] if either unit is not
/// in the game. Everything that stops the shot is reported as
/// [`super::Outcome::Impossible`].
pub fn weapon_to_hit(
    game: &dyn GameView,
    attacker: EntityId,
    target: EntityId,
    weapon: EquipmentId,
) -> Result<ToHitData> {
    let (attacker, target) = resolve_pair(game, attacker, target)?;

    let (mounted, stats) = match check_weapon(game, attacker, target, weapon) {
        Ok(found) => found,
        Err(reason) => {
            debug!(attacker = attacker.id, target = target.id, weapon, %reason, "Shot impossible");
            return Ok(ToHitData::impossible(reason));
        }
    };

    let mut data = ToHitData::new(attacker.crew.gunnery as i32, "gunnery skill");

    let distance = attacker.position.distance(target.position);
    let extreme = game.options().boolean_option(MAXTECH_RANGE);
    if let Some(bracket) = stats.bracket(distance, extreme) {
        data.add_modifier(range_modifier(bracket), format!("{bracket:?} range"));
    }
    if distance <= stats.min_range {
        data.add_modifier((stats.min_range - distance + 1) as i32, "minimum range");
    }

    attacker_movement(&mut data, attacker);
    target_movement(&mut data, target);

    if game.hex_at(attacker.position).is_some_and(|hex| hex.water_depth() > 0) {
        data.add_modifier(1, "attacker in water");
    }
    target_terrain(&mut data, game, target);

    let los = line_of_sight(game, attacker, target);
    data.add_modifier(los.light_woods as i32, "intervening light woods");
    data.add_modifier(2 * los.heavy_woods as i32, "intervening heavy woods");
    if los.partial_cover {
        data.add_modifier(3, "target has partial cover");
        data.hit_table = HitTable::Punch;
    }

    data.add_modifier(heat_modifier(attacker.heat), "heat");
    if attacker.sensor_hits() > 0 {
        data.add_modifier(2, "sensors damaged");
    }
    if let Some(arm) = mounted.location.filter(|location| location.is_arm()) {
        if attacker.actuator_hit(arm, SystemType::Shoulder) {
            data.add_modifier(4, "shoulder actuator destroyed");
        }
        if attacker.actuator_hit(arm, SystemType::UpperArm) {
            data.add_modifier(1, "upper arm actuator destroyed");
        }
        if attacker.actuator_hit(arm, SystemType::LowerArm) {
            data.add_modifier(1, "lower arm actuator destroyed");
        }
    }

    target_immobile(&mut data, target);
    if attacker.turn.prone {
        data.add_modifier(2, "attacker prone");
    }
    target_prone(&mut data, attacker, target);

    data.side = target_side(attacker, target);
    let data = data.finish();
    debug!(
        attacker = attacker.id,
        target = target.id,
        weapon,
        value = data.value(),
        "Weapon to-hit"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hex, Terrain, TerrainKind};
    use crate::damage::Side;
    use crate::data::EquipmentCatalog;
    use crate::entity::{EntityBuilder, MovementMode};
    use crate::game::Game;
    use crate::hex::{Facing, HexCoord};
    use crate::to_hit::Outcome;

    struct Duel {
        game: Game,
        attacker: EntityId,
        target: EntityId,
    }

    fn duel(weapon: &str, location: Location, distance: i32) -> Duel {
        let catalog = EquipmentCatalog::standard().unwrap();
        let mut builder = EntityBuilder::mech("Shooter", 50)
            .crew(4, 5)
            .at(HexCoord::new(4, 2), Facing::South)
            .equip(catalog.require(weapon).unwrap(), location);
        if let Some(ammo) = catalog.require(weapon).unwrap().weapon().and_then(|w| w.ammo_type.clone()) {
            builder = builder.equip(catalog.require(&format!("{ammo}_ammo")).unwrap(), Location::RightTorso);
        }
        let mut game = Game::default();
        let attacker = game.add_entity(builder.build().unwrap()).unwrap();
        let target = game
            .add_entity(
                EntityBuilder::mech("Target", 50)
                    .side(1, 1)
                    .at(HexCoord::new(4, 2 + distance), Facing::North)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        Duel { game, attacker, target }
    }

    fn to_hit(duel: &Duel) -> ToHitData {
        weapon_to_hit(&duel.game, duel.attacker, duel.target, 0).unwrap()
    }

    #[test]
    fn test_stationary_short_range() {
        let duel = duel("medium_laser", Location::RightArm, 3);
        let data = to_hit(&duel);
        assert_eq!(data.outcome, Outcome::Normal);
        assert_eq!(data.value(), 4);
        assert!(data.modifiers.is_empty());
        assert_eq!(data.side, Side::Front);
        assert_eq!(data.hit_table, HitTable::Normal);
    }

    #[test]
    fn test_range_brackets() {
        assert_eq!(to_hit(&duel("medium_laser", Location::RightArm, 5)).value(), 6);
        assert_eq!(to_hit(&duel("medium_laser", Location::RightArm, 9)).value(), 8);
        let data = to_hit(&duel("medium_laser", Location::RightArm, 10));
        assert!(matches!(data.outcome, Outcome::Impossible(_)));

        let mut far = duel("medium_laser", Location::RightArm, 10);
        far.game.options_mut().set(MAXTECH_RANGE, true);
        assert_eq!(to_hit(&far).value(), 10);
    }

    #[test]
    fn test_minimum_range() {
        // PPC minimum 3 at 2 hexes: +2.
        let data = to_hit(&duel("ppc", Location::RightArm, 2));
        assert_eq!(data.value(), 6);
        assert_eq!(data.modifiers[0].reason, "minimum range");
    }

    #[test]
    fn test_moving_target_in_heavy_woods() {
        let mut duel = duel("medium_laser", Location::RightArm, 3);
        let heavy = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 2));
        duel.game.board_mut().set_hex(HexCoord::new(4, 5), heavy).unwrap();
        let target = duel.game.entity_mut(duel.target).unwrap();
        target.turn.movement = MovementMode::Ran;
        target.turn.hexes_moved = 6;

        let data = to_hit(&duel);
        let reasons: Vec<(i32, &str)> = data
            .modifiers
            .iter()
            .map(|modifier| (modifier.value, modifier.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![(2, "target moved 6 hexes"), (2, "target in heavy woods")]
        );
        assert_eq!(data.value(), 8);
    }

    #[test]
    fn test_self_target() {
        let duel = duel("medium_laser", Location::RightArm, 3);
        let data = weapon_to_hit(&duel.game, duel.attacker, duel.attacker, 0).unwrap();
        assert_eq!(data.outcome, Outcome::Impossible("cannot target self".to_owned()));
        assert!(data.modifiers.is_empty());
    }

    #[test]
    fn test_target_behind_is_out_of_arc() {
        let mut duel = duel("medium_laser", Location::CenterTorso, 3);
        duel.game.entity_mut(duel.attacker).unwrap().facing = Facing::North;
        let data = to_hit(&duel);
        assert!(matches!(data.outcome, Outcome::Impossible(ref reason) if reason.contains("arc")));
    }

    #[test]
    fn test_fired_and_out_of_ammo() {
        let mut duel = duel("ac_5", Location::RightTorso, 6);
        duel.game.entity_mut(duel.attacker).unwrap().fire_weapon(0).unwrap();
        assert!(matches!(to_hit(&duel).outcome, Outcome::Impossible(ref r) if r.contains("already fired")));

        let attacker = duel.game.entity_mut(duel.attacker).unwrap();
        attacker.new_turn();
        attacker.mounted_mut(1).unwrap().shots_left = 0;
        assert!(matches!(to_hit(&duel).outcome, Outcome::Impossible(ref r) if r.contains("no ammo")));
    }

    #[test]
    fn test_heat_and_attacker_movement() {
        let mut duel = duel("medium_laser", Location::RightArm, 3);
        let attacker = duel.game.entity_mut(duel.attacker).unwrap();
        attacker.heat = 14;
        attacker.turn.movement = MovementMode::Jumped;
        assert_eq!(to_hit(&duel).value(), 4 + 3 + 2);
    }

    #[test]
    fn test_partial_cover_uses_punch_table() {
        let mut duel = duel("medium_laser", Location::RightArm, 4);
        duel.game.board_mut().set_hex(HexCoord::new(4, 5), Hex::new(1)).unwrap();
        let data = to_hit(&duel);
        assert_eq!(data.hit_table, HitTable::Punch);
        assert_eq!(data.value(), 4 + 2 + 3);
    }

    #[test]
    fn test_automatic_fail_above_twelve() {
        let mut duel = duel("medium_laser", Location::RightArm, 9);
        let attacker = duel.game.entity_mut(duel.attacker).unwrap();
        attacker.turn.movement = MovementMode::Jumped;
        attacker.heat = 30;
        assert!(matches!(to_hit(&duel).outcome, Outcome::AutomaticFail(_)));
    }
}
