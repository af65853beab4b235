//! Line of sight between two units.

use serde::{Deserialize, Serialize};

use crate::board::{WoodsDensity, WOODS_HEIGHT};
use crate::entity::Entity;
use crate::game::GameView;
use crate::hex::intervening_exclusive;

/// Intervening woods points that block sight.
pub const WOODS_BLOCKING_POINTS: u32 = 3;

/// What lies between an attacker and its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LosData {
    /// An intervening hex rises above both units.
    pub blocked_by_terrain: bool,
    /// Light woods hexes in the way.
    pub light_woods: u32,
    /// Heavy woods hexes in the way.
    pub heavy_woods: u32,
    /// The target is a mech with its legs covered.
    pub partial_cover: bool,
}

impl LosData {
    /// Woods points in the way: one per light hex, two per heavy hex.
    #[must_use]
    pub const fn woods_points(&self) -> u32 {
        self.light_woods + 2 * self.heavy_woods
    }

    /// Whether intervening woods block sight.
    #[must_use]
    pub const fn blocked_by_woods(&self) -> bool {
        self.woods_points() >= WOODS_BLOCKING_POINTS
    }

    /// Whether anything blocks sight.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked_by_terrain || self.blocked_by_woods()
    }
}

/// Highest level a unit occupies.
fn top(entity: &Entity) -> i32 {
    entity.elevation + entity.caps().height
}

/// Trace the sightline between two units.
///
/// Every hex the line touches counts, including hexes it only grazes, so
/// the result does not depend on which unit looks at which.
#[must_use]
pub fn line_of_sight(game: &dyn GameView, attacker: &Entity, target: &Entity) -> LosData {
    let mut los = LosData::default();
    let attacker_top = top(attacker);
    let target_top = top(target);
    let highest = attacker_top.max(target_top);
    let lowest = attacker_top.min(target_top);

    for coord in intervening_exclusive(attacker.position, target.position) {
        let Some(hex) = game.hex_at(coord) else {
            continue;
        };
        if hex.ceiling() > highest {
            los.blocked_by_terrain = true;
        }
        if hex.elevation + WOODS_HEIGHT > lowest {
            match hex.woods() {
                Some(WoodsDensity::Light) => los.light_woods += 1,
                Some(WoodsDensity::Heavy) => los.heavy_woods += 1,
                None => {}
            }
        }
        if target.archetype().is_mech()
            && coord.is_adjacent(target.position)
            && hex.elevation == target.elevation + 1
            && attacker.elevation <= hex.elevation
        {
            los.partial_cover = true;
        }
    }

    if target.archetype().is_mech() && game.hex_at(target.position).is_some_and(|hex| hex.water_depth() == 1) {
        los.partial_cover = true;
    }
    los
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Hex, Terrain, TerrainKind};
    use crate::entity::{EntityBuilder, EntityId};
    use crate::game::Game;
    use crate::hex::{Facing, HexCoord};

    fn duel(attacker_at: HexCoord, target_at: HexCoord) -> (Game, EntityId, EntityId) {
        let mut game = Game::default();
        let a = game
            .add_entity(EntityBuilder::mech("A", 50).at(attacker_at, Facing::South).build().unwrap())
            .unwrap();
        let b = game
            .add_entity(
                EntityBuilder::mech("B", 50)
                    .side(1, 1)
                    .at(target_at, Facing::North)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        (game, a, b)
    }

    fn los(game: &Game, from: EntityId, to: EntityId) -> LosData {
        line_of_sight(game, game.entity(from).unwrap(), game.entity(to).unwrap())
    }

    #[test]
    fn test_clear_sight() {
        let (game, a, b) = duel(HexCoord::new(4, 2), HexCoord::new(4, 8));
        assert_eq!(los(&game, a, b), LosData::default());
    }

    #[test]
    fn test_hill_blocks() {
        let (mut game, a, b) = duel(HexCoord::new(4, 2), HexCoord::new(4, 8));
        game.board_mut().set_hex(HexCoord::new(4, 5), Hex::new(2)).unwrap();
        assert!(los(&game, a, b).blocked_by_terrain);
        assert!(los(&game, b, a).blocked_by_terrain);
    }

    #[test]
    fn test_woods_accumulate() {
        let (mut game, a, b) = duel(HexCoord::new(4, 2), HexCoord::new(4, 8));
        let light = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 1));
        let heavy = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 2));
        game.board_mut().set_hex(HexCoord::new(4, 4), light).unwrap();
        let data = los(&game, a, b);
        assert_eq!((data.light_woods, data.heavy_woods), (1, 0));
        assert!(!data.is_blocked());

        game.board_mut().set_hex(HexCoord::new(4, 6), heavy).unwrap();
        assert!(los(&game, a, b).blocked_by_woods());
    }

    #[test]
    fn test_woods_below_both_units_ignored() {
        let (mut game, a, b) = duel(HexCoord::new(4, 2), HexCoord::new(4, 8));
        for coord in [HexCoord::new(4, 2), HexCoord::new(4, 8)] {
            game.board_mut().set_hex(coord, Hex::new(4)).unwrap();
            let ids: Vec<EntityId> = game.entities_at(coord).iter().map(|entity| entity.id).collect();
            for id in ids {
                game.entity_mut(id).unwrap().elevation = 4;
            }
        }
        let heavy = Hex::new(0).with(Terrain::new(TerrainKind::Woods, 2));
        game.board_mut().set_hex(HexCoord::new(4, 5), heavy).unwrap();
        assert_eq!(los(&game, a, b).woods_points(), 0);
    }

    #[test]
    fn test_partial_cover_from_rise() {
        let (mut game, a, b) = duel(HexCoord::new(4, 2), HexCoord::new(4, 8));
        game.board_mut().set_hex(HexCoord::new(4, 7), Hex::new(1)).unwrap();
        let data = los(&game, a, b);
        assert!(data.partial_cover);
        assert!(!data.blocked_by_terrain);
    }

    #[test]
    fn test_partial_cover_in_shallow_water() {
        let (mut game, a, b) = duel(HexCoord::new(4, 2), HexCoord::new(4, 8));
        let water = Hex::new(0).with(Terrain::new(TerrainKind::Water, 1));
        game.board_mut().set_hex(HexCoord::new(4, 8), water).unwrap();
        assert!(los(&game, a, b).partial_cover);
    }
}
