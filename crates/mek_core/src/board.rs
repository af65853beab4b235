//! Board and terrain model.
//!
//! A [`Board`] is a rectangle of [`Hex`]es stored in row-major order. Hexes
//! carry an elevation and a small set of terrain features; once a board is
//! built it only changes through [`Board::set_hex`].

use serde::{Deserialize, Serialize};

use crate::error::{GameError, Result};
use crate::hex::{Facing, HexCoord};

/// Terrain feature kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Water; level is the depth.
    Water,
    /// Woods; level 1 is light, 2 is heavy.
    Woods,
    /// Rough ground.
    Rough,
    /// Rubble from collapsed structures.
    Rubble,
    /// Paved surface.
    Pavement,
    /// Road; `exits` marks connected hexsides.
    Road,
    /// Building; level is its height in levels.
    Building,
    /// Bridge; `exits` marks connected hexsides.
    Bridge,
}

/// Woods density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WoodsDensity {
    /// Light woods.
    Light,
    /// Heavy woods.
    Heavy,
}

/// A single terrain feature in a hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terrain {
    /// Feature kind.
    pub kind: TerrainKind,
    /// Depth, density or height depending on kind.
    pub level: i32,
    /// Bitmask of connected hexsides (bit `n` is facing index `n`).
    pub exits: u8,
}

impl Terrain {
    /// Create a terrain feature without exits.
    #[must_use]
    pub const fn new(kind: TerrainKind, level: i32) -> Self {
        Self {
            kind,
            level,
            exits: 0,
        }
    }

    /// Create a terrain feature with connected hexsides.
    #[must_use]
    pub fn with_exits(kind: TerrainKind, level: i32, exits: &[Facing]) -> Self {
        let mask = exits
            .iter()
            .fold(0u8, |mask, facing| mask | (1 << facing.index()));
        Self {
            kind,
            level,
            exits: mask,
        }
    }

    /// Whether this feature connects through the given hexside.
    #[must_use]
    pub const fn has_exit(&self, facing: Facing) -> bool {
        self.exits & (1 << facing.index()) != 0
    }
}

/// A single board hex.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Hex {
    /// Ground elevation in levels.
    pub elevation: i32,
    /// Terrain features, at most one per kind.
    terrains: Vec<Terrain>,
}

/// Height of woods canopy above the ground, in levels.
pub const WOODS_HEIGHT: i32 = 2;

impl Hex {
    /// Clear hex at the given elevation.
    #[must_use]
    pub const fn new(elevation: i32) -> Self {
        Self {
            elevation,
            terrains: Vec::new(),
        }
    }

    /// Builder: add or replace a terrain feature.
    #[must_use]
    pub fn with(mut self, terrain: Terrain) -> Self {
        self.set_terrain(terrain);
        self
    }

    /// Add or replace a terrain feature.
    pub fn set_terrain(&mut self, terrain: Terrain) {
        self.terrains.retain(|t| t.kind != terrain.kind);
        self.terrains.push(terrain);
        self.terrains.sort_by_key(|t| t.kind);
    }

    /// Remove a terrain feature kind.
    pub fn remove_terrain(&mut self, kind: TerrainKind) {
        self.terrains.retain(|t| t.kind != kind);
    }

    /// All terrain features.
    #[must_use]
    pub fn terrains(&self) -> &[Terrain] {
        &self.terrains
    }

    /// Terrain feature of a kind, if present.
    #[must_use]
    pub fn terrain(&self, kind: TerrainKind) -> Option<&Terrain> {
        self.terrains.iter().find(|t| t.kind == kind)
    }

    /// Level of a terrain feature, if present.
    #[must_use]
    pub fn level(&self, kind: TerrainKind) -> Option<i32> {
        self.terrain(kind).map(|t| t.level)
    }

    /// Whether a terrain feature kind is present.
    #[must_use]
    pub fn contains(&self, kind: TerrainKind) -> bool {
        self.terrain(kind).is_some()
    }

    /// Water depth (0 when dry).
    #[must_use]
    pub fn water_depth(&self) -> i32 {
        self.level(TerrainKind::Water).unwrap_or(0).max(0)
    }

    /// Woods density, if wooded.
    #[must_use]
    pub fn woods(&self) -> Option<WoodsDensity> {
        match self.level(TerrainKind::Woods) {
            Some(level) if level >= 2 => Some(WoodsDensity::Heavy),
            Some(level) if level == 1 => Some(WoodsDensity::Light),
            _ => None,
        }
    }

    /// Highest point of solid terrain that can block a sightline.
    #[must_use]
    pub fn ceiling(&self) -> i32 {
        self.elevation + self.level(TerrainKind::Building).unwrap_or(0).max(0)
    }

    /// Whether a road or bridge links this hex through the given hexside.
    #[must_use]
    pub fn has_road_exit(&self, facing: Facing) -> bool {
        self.terrains
            .iter()
            .any(|t| matches!(t.kind, TerrainKind::Road | TerrainKind::Bridge) && t.has_exit(facing))
    }
}

/// Rectangular hex board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    /// Width in columns.
    width: u32,
    /// Height in rows.
    height: u32,
    /// Hexes stored in row-major order.
    hexes: Vec<Hex>,
}

impl Board {
    /// Create a board of clear level-0 hexes.
    ///
    /// # Panics
    ///
    /// Panics if `width` or `height` is zero.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        assert!(width > 0, "Board width must be positive");
        assert!(height > 0, "Board height must be positive");

        let count = (width as usize) * (height as usize);
        Self {
            width,
            height,
            hexes: vec![Hex::new(0); count],
        }
    }

    /// Board width in columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Board height in rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Whether a coordinate is on the board.
    #[must_use]
    pub fn contains(&self, coord: HexCoord) -> bool {
        coord.x >= 0 && coord.y >= 0 && (coord.x as u32) < self.width && (coord.y as u32) < self.height
    }

    #[inline]
    fn index(&self, coord: HexCoord) -> usize {
        (coord.y as usize) * (self.width as usize) + (coord.x as usize)
    }

    /// Hex at a coordinate, `None` when off the board.
    #[must_use]
    pub fn hex(&self, coord: HexCoord) -> Option<&Hex> {
        if self.contains(coord) {
            Some(&self.hexes[self.index(coord)])
        } else {
            None
        }
    }

    /// Replace the hex at a coordinate.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::OffBoard`] if the coordinate is outside the board.
    pub fn set_hex(&mut self, coord: HexCoord, hex: Hex) -> Result<()> {
        if !self.contains(coord) {
            return Err(GameError::OffBoard(coord));
        }
        let index = self.index(coord);
        self.hexes[index] = hex;
        Ok(())
    }

    /// Iterate over all coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = HexCoord> + '_ {
        (0..self.height as i32)
            .flat_map(move |y| (0..self.width as i32).map(move |x| HexCoord::new(x, y)))
    }
}

impl Default for Board {
    /// A 16 x 17 board, the size of one standard map sheet.
    fn default() -> Self {
        Self::new(16, 17)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_bounds() {
        let board = Board::new(4, 3);
        assert!(board.contains(HexCoord::new(0, 0)));
        assert!(board.contains(HexCoord::new(3, 2)));
        assert!(!board.contains(HexCoord::new(4, 0)));
        assert!(!board.contains(HexCoord::new(0, -1)));
        assert!(board.hex(HexCoord::new(9, 9)).is_none());
    }

    #[test]
    fn test_set_hex() {
        let mut board = Board::new(4, 4);
        let woods = Hex::new(1).with(Terrain::new(TerrainKind::Woods, 2));
        board.set_hex(HexCoord::new(2, 2), woods).unwrap();

        let hex = board.hex(HexCoord::new(2, 2)).unwrap();
        assert_eq!(hex.elevation, 1);
        assert_eq!(hex.woods(), Some(WoodsDensity::Heavy));

        let result = board.set_hex(HexCoord::new(7, 7), Hex::new(0));
        assert!(matches!(result, Err(GameError::OffBoard(_))));
    }

    #[test]
    fn test_terrain_replace() {
        let hex = Hex::new(0)
            .with(Terrain::new(TerrainKind::Water, 1))
            .with(Terrain::new(TerrainKind::Water, 3));
        assert_eq!(hex.water_depth(), 3);
        assert_eq!(hex.terrains().len(), 1);
    }

    #[test]
    fn test_road_exits() {
        let road = Terrain::with_exits(TerrainKind::Road, 1, &[Facing::North, Facing::South]);
        let hex = Hex::new(0).with(road);
        assert!(hex.has_road_exit(Facing::North));
        assert!(hex.has_road_exit(Facing::South));
        assert!(!hex.has_road_exit(Facing::NorthEast));
    }

    #[test]
    fn test_ceiling_includes_buildings() {
        let hex = Hex::new(1).with(Terrain::new(TerrainKind::Building, 2));
        assert_eq!(hex.ceiling(), 3);
        assert_eq!(Hex::new(2).ceiling(), 2);
    }

    #[test]
    fn test_coords_iterates_row_major() {
        let board = Board::new(2, 2);
        let coords: Vec<_> = board.coords().collect();
        assert_eq!(
            coords,
            vec![
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
                HexCoord::new(0, 1),
                HexCoord::new(1, 1)
            ]
        );
    }
}
