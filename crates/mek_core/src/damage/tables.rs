//! Hit-location tables.
//!
//! Each function maps (table, attacked side, roll) to a location and a flag
//! marking a possible through-armor critical. Rolls outside the table's
//! range clamp to its ends.

use super::{HitTable, Side};
use crate::entity::Location;

use Location::{
    CenterTorso as CT, Front, Head as HD, Left, LeftArm as LA, LeftLeg as LL, LeftTorso as LT, Rear,
    Right, RightArm as RA, RightLeg as RL, RightTorso as RT, Squad, Turret,
};

/// 2d6 table against the front or rear, rolls 2 through 12.
const MECH_FRONT: [Location; 11] = [CT, RA, RA, RL, RT, CT, LT, LL, LA, LA, HD];
const MECH_LEFT: [Location; 11] = [LT, LL, LA, LA, LL, LT, CT, RT, RA, RL, HD];
const MECH_RIGHT: [Location; 11] = [RT, RL, RA, RA, RL, RT, CT, LT, LA, LL, HD];

/// 1d6 punch table, rolls 1 through 6.
const PUNCH_FRONT: [Location; 6] = [LA, LT, CT, RT, RA, HD];
const PUNCH_LEFT: [Location; 6] = [LT, LT, CT, LA, LA, HD];
const PUNCH_RIGHT: [Location; 6] = [RT, RT, CT, RA, RA, HD];

/// 1d6 kick table, rolls 1 through 6.
const KICK_FRONT: [Location; 6] = [RL, RL, RL, LL, LL, LL];
const KICK_LEFT: [Location; 6] = [LL; 6];
const KICK_RIGHT: [Location; 6] = [RL; 6];

const fn index(roll: u32, first: u32, len: usize) -> usize {
    let offset = roll.saturating_sub(first) as usize;
    if offset >= len {
        len - 1
    } else {
        offset
    }
}

/// Mech hit location.
#[must_use]
pub const fn mech_hit_location(table: HitTable, side: Side, roll: u32) -> (Location, bool) {
    match table {
        HitTable::Normal => {
            let row = match side {
                Side::Front | Side::Rear => &MECH_FRONT,
                Side::Left => &MECH_LEFT,
                Side::Right => &MECH_RIGHT,
            };
            (row[index(roll, 2, row.len())], roll == 2)
        }
        HitTable::Punch => {
            let row = match side {
                Side::Front | Side::Rear => &PUNCH_FRONT,
                Side::Left => &PUNCH_LEFT,
                Side::Right => &PUNCH_RIGHT,
            };
            (row[index(roll, 1, row.len())], false)
        }
        HitTable::Kick => {
            let row = match side {
                Side::Front | Side::Rear => &KICK_FRONT,
                Side::Left => &KICK_LEFT,
                Side::Right => &KICK_RIGHT,
            };
            (row[index(roll, 1, row.len())], false)
        }
    }
}

/// Vehicle hit location. Every table type uses the 2d6 table.
#[must_use]
pub const fn vehicle_hit_location(_table: HitTable, side: Side, roll: u32) -> (Location, bool) {
    let (primary, on_five, on_nine) = match side {
        Side::Front => (Front, Right, Left),
        Side::Left => (Left, Front, Rear),
        Side::Right => (Right, Front, Rear),
        Side::Rear => (Rear, Left, Right),
    };
    let location = match roll {
        0..=4 | 6..=8 => primary,
        5 => on_five,
        9 => on_nine,
        _ => Turret,
    };
    (location, roll == 2 || roll >= 12)
}

/// Infantry hit location: always the squad.
#[must_use]
pub const fn infantry_hit_location(_table: HitTable, _side: Side, _roll: u32) -> (Location, bool) {
    (Squad, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mech_front_table() {
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Front, 2), (CT, true));
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Front, 7), (CT, false));
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Front, 12), (HD, false));
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Rear, 5), (RL, false));
    }

    #[test]
    fn test_mech_side_tables_mirror() {
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Left, 2), (LT, true));
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Right, 2), (RT, true));
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Left, 10), (RA, false));
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Right, 10), (LA, false));
    }

    #[test]
    fn test_punch_and_kick_tables() {
        assert_eq!(mech_hit_location(HitTable::Punch, Side::Front, 6), (HD, false));
        assert_eq!(mech_hit_location(HitTable::Punch, Side::Left, 4), (LA, false));
        assert_eq!(mech_hit_location(HitTable::Kick, Side::Front, 3), (RL, false));
        assert_eq!(mech_hit_location(HitTable::Kick, Side::Front, 4), (LL, false));
        assert_eq!(mech_hit_location(HitTable::Kick, Side::Right, 1), (RL, false));
    }

    #[test]
    fn test_out_of_range_rolls_clamp() {
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Front, 0).0, CT);
        assert_eq!(mech_hit_location(HitTable::Normal, Side::Front, 40).0, HD);
        assert_eq!(mech_hit_location(HitTable::Punch, Side::Front, 0).0, LA);
    }

    #[test]
    fn test_vehicle_table() {
        assert_eq!(vehicle_hit_location(HitTable::Normal, Side::Front, 2), (Front, true));
        assert_eq!(vehicle_hit_location(HitTable::Normal, Side::Front, 5), (Right, false));
        assert_eq!(vehicle_hit_location(HitTable::Normal, Side::Front, 9), (Left, false));
        assert_eq!(vehicle_hit_location(HitTable::Normal, Side::Front, 10), (Turret, false));
        assert_eq!(vehicle_hit_location(HitTable::Normal, Side::Left, 5), (Front, false));
        assert_eq!(vehicle_hit_location(HitTable::Normal, Side::Rear, 12), (Turret, true));
    }
}
