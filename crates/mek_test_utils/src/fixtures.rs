//! Test fixtures and helpers.
//!
//! Pre-built units, boards and scenarios for consistent testing.

use fixed::types::I32F32;
use mek_core::board::{Board, Hex, Terrain, TerrainKind};
use mek_core::damage::{resolve_hit, roll_location};
use mek_core::data::EquipmentCatalog;
use mek_core::dice::DiceRoller;
use mek_core::entity::{EntityBuilder, EntityId, EquipmentId, Location, MotiveType};
use mek_core::error::Result;
use mek_core::game::{Game, GameView};
use mek_core::hex::{Facing, HexCoord};
use mek_core::options::GameOptions;
use mek_core::to_hit::{weapon_to_hit, Outcome};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// The standard equipment catalog.
///
/// # Panics
///
/// Panics if the embedded catalog does not parse.
#[must_use]
pub fn catalog() -> EquipmentCatalog {
    EquipmentCatalog::standard().expect("standard catalog parses")
}

/// A 50-ton mech with full armor, two medium lasers and an autocannon.
///
/// The autocannon ammunition sits in the left torso without CASE.
#[must_use]
pub fn medium_mech(name: &str) -> EntityBuilder {
    let catalog = catalog();
    let item = |id: &str| catalog.require(id).expect("catalog item");
    EntityBuilder::mech(name, 50)
        .walk(4)
        .standard_armor()
        .equip(item("medium_laser"), Location::RightArm)
        .equip(item("medium_laser"), Location::LeftArm)
        .equip(item("ac_5"), Location::RightTorso)
        .equip(item("ac_5_ammo"), Location::LeftTorso)
}

/// A 40-ton tracked tank with a turret-mounted large laser.
#[must_use]
pub fn turret_tank(name: &str) -> EntityBuilder {
    let catalog = catalog();
    EntityBuilder::vehicle(name, MotiveType::Tracked, 40)
        .turret(true)
        .standard_armor()
        .equip(catalog.require("large_laser").expect("catalog item"), Location::Turret)
}

/// A board with a strip of light woods, a heavy woods hex and a pond.
#[must_use]
pub fn mixed_board() -> Board {
    let mut board = Board::new(16, 17);
    let light = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 1));
    let heavy = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 2));
    let pond = Hex::new(0).with(Terrain::new(TerrainKind::Water, 1));
    for x in 2..6 {
        board
            .set_hex(HexCoord::new(x, 8), light.clone())
            .expect("hex on board");
    }
    board.set_hex(HexCoord::new(9, 9), heavy).expect("hex on board");
    board.set_hex(HexCoord::new(11, 4), pond).expect("hex on board");
    board
}

/// Two opposing units and the game holding them.
#[derive(Debug, Clone)]
pub struct Duel {
    /// The game.
    pub game: Game,
    /// Team 0 unit at (4, 2), facing south.
    pub attacker: EntityId,
    /// Team 1 unit `distance` hexes south of the attacker, facing north.
    pub target: EntityId,
}

/// Two medium mechs facing each other down column 4.
///
/// # Panics
///
/// Panics if the target would land off the default board.
#[must_use]
pub fn duel(distance: i32) -> Duel {
    let mut game = Game::default();
    let attacker = game
        .add_entity(
            medium_mech("Attacker")
                .at(HexCoord::new(4, 2), Facing::South)
                .build()
                .expect("attacker builds"),
        )
        .expect("attacker on board");
    let target = game
        .add_entity(
            medium_mech("Target")
                .side(1, 1)
                .at(HexCoord::new(4, 2 + distance), Facing::North)
                .build()
                .expect("target builds"),
        )
        .expect("target on board");
    Duel { game, attacker, target }
}

/// A four-unit skirmish on the mixed board: two mechs and a tank per side.
///
/// # Panics
///
/// Panics if a fixture unit fails to build.
#[must_use]
pub fn skirmish(options: GameOptions) -> Game {
    let mut game = Game::new(mixed_board(), options);
    let units = [
        (medium_mech("Alpha"), 0, HexCoord::new(3, 3), Facing::South),
        (medium_mech("Bravo"), 0, HexCoord::new(7, 3), Facing::South),
        (turret_tank("Crusher"), 0, HexCoord::new(5, 2), Facing::South),
        (medium_mech("Delta"), 1, HexCoord::new(3, 11), Facing::North),
        (medium_mech("Echo"), 1, HexCoord::new(7, 11), Facing::North),
        (turret_tank("Fortress"), 1, HexCoord::new(5, 12), Facing::North),
    ];
    for (builder, team, position, facing) in units {
        let entity = builder
            .side(team, team)
            .at(position, facing)
            .build()
            .expect("fixture unit builds");
        game.add_entity(entity).expect("fixture unit on board");
    }
    game
}

/// Closest active enemy, ties broken by id.
#[must_use]
pub fn nearest_hostile(game: &Game, id: EntityId) -> Option<EntityId> {
    let shooter = game.entity(id).ok()?;
    game.active_entities()
        .filter(|other| other.team != shooter.team)
        .min_by_key(|other| (shooter.position.distance(other.position), other.id))
        .map(|other| other.id)
}

/// One round of fire: every active unit, in id order, fires every weapon
/// that can hit at its nearest enemy. Ends the turn and sheds heat.
///
/// Returns the number of hits landed.
///
/// # Errors
///
/// Propagates rules errors, which indicate a broken fixture.
pub fn exchange_fire(game: &mut Game, dice: &mut dyn DiceRoller) -> Result<u32> {
    let shooters: Vec<EntityId> = game.active_entities().map(|entity| entity.id).collect();
    let mut hits = 0;

    for shooter in shooters {
        if game.entity(shooter)?.is_destroyed() {
            continue;
        }
        let Some(target) = nearest_hostile(game, shooter) else {
            continue;
        };
        let weapons: Vec<EquipmentId> = game.entity(shooter)?.weapons().collect();
        for weapon in weapons {
            let to_hit = weapon_to_hit(game, shooter, target, weapon)?;
            if !to_hit.is_possible() || matches!(to_hit.outcome, Outcome::AutomaticFail(_)) {
                continue;
            }
            let damage = game
                .entity(shooter)?
                .mounted(weapon)
                .and_then(|mounted| mounted.data.weapon())
                .map_or(0, |stats| stats.damage);
            game.entity_mut(shooter)?.fire_weapon(weapon)?;

            let roll = dice.roll_d6(2) as i32;
            let landed = matches!(to_hit.outcome, Outcome::AutomaticSuccess(_)) || roll >= to_hit.value();
            if landed {
                let options = game.options().clone();
                let victim = game.entity_mut(target)?;
                let hit = roll_location(victim, to_hit.hit_table, to_hit.side, dice);
                resolve_hit(victim, &hit, damage, &options, dice, None)?;
                hits += 1;
            }
        }
    }

    let ids: Vec<EntityId> = game.entities().map(|entity| entity.id).collect();
    for id in ids {
        let entity = game.entity_mut(id)?;
        if let Some(dissipation) = entity.heat_dissipation() {
            entity.heat = entity.heat.saturating_sub(dissipation);
        }
    }
    game.new_turn();
    Ok(hits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mek_core::dice::SeededDice;

    #[test]
    fn test_fixture_units_build() {
        let mech = medium_mech("Probe").build().unwrap();
        assert_eq!(mech.weapons().count(), 3);
        assert!(mech.total_armor() > 0);

        let tank = turret_tank("Probe").build().unwrap();
        assert!(tank.has_location(Location::Turret));
    }

    #[test]
    fn test_duel_places_units() {
        let duel = duel(3);
        let target = duel.game.entity(duel.target).unwrap();
        assert_eq!(target.position, HexCoord::new(4, 5));
        assert_eq!(nearest_hostile(&duel.game, duel.attacker), Some(duel.target));
    }

    #[test]
    fn test_exchange_fire_lands_hits() {
        let mut duel = duel(2);
        let mut dice = SeededDice::from_seed(7);
        let hits: u32 = (0..5)
            .map(|_| exchange_fire(&mut duel.game, &mut dice).unwrap())
            .sum();
        assert!(hits > 0);
        assert_eq!(duel.game.turn(), 6);
    }
}
