//! Movement point costs of entering hexes.

use crate::board::{Board, Hex, TerrainKind, WoodsDensity};
use crate::error::{GameError, Result};
use crate::hex::{direction, Facing, HexCoord};

/// MP to enter a hex on the ground, before elevation change.
///
/// `entry` is the hexside of `hex` the unit comes through; a road or
/// bridge exit on that side makes the hex cost 1 whatever else is in it.
#[must_use]
pub fn terrain_cost(hex: &Hex, entry: Option<Facing>) -> u32 {
    if hex.contains(TerrainKind::Pavement) || entry.is_some_and(|side| hex.has_road_exit(side)) {
        return 1;
    }

    let mut cost = 1;
    if hex.contains(TerrainKind::Rough) || hex.contains(TerrainKind::Rubble) {
        cost = cost.max(2);
    }
    match hex.woods() {
        Some(WoodsDensity::Light) => cost = cost.max(2),
        Some(WoodsDensity::Heavy) => cost = cost.max(3),
        None => {}
    }
    match hex.water_depth() {
        0 => {}
        1 => cost = cost.max(2),
        _ => cost = cost.max(4),
    }
    cost
}

/// MP to step from one hex into an adjacent one.
///
/// A jumping step always costs 1. A ground step costs the destination's
/// terrain plus one per level of elevation change.
///
/// # Errors
///
/// Returns [`GameError::InvalidArgument`] if the hexes are not adjacent and
/// [`GameError::OffBoard`] if either is off the board.
pub fn step_cost(board: &Board, from: HexCoord, to: HexCoord, jumping: bool) -> Result<u32> {
    if !from.is_adjacent(to) {
        return Err(GameError::InvalidArgument(format!(
            "{from} and {to} are not adjacent"
        )));
    }
    let source = board.hex(from).ok_or(GameError::OffBoard(from))?;
    let destination = board.hex(to).ok_or(GameError::OffBoard(to))?;
    if jumping {
        return Ok(1);
    }

    let climb = (destination.elevation - source.elevation).unsigned_abs();
    Ok(terrain_cost(destination, direction(to, from)) + climb)
}
