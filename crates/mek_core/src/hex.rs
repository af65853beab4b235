//! Hex grid geometry.
//!
//! Board coordinates are offset coordinates: `x` is the column, `y` is the
//! row, and odd columns sit half a hex lower than even ones. Hexes are
//! flat-topped, so facing 0 is north and facings increase clockwise.
//!
//! Internally everything converts to cube coordinates, which makes
//! distance, direction and arc tests plain integer arithmetic.
//!
//! # Line of sight
//!
//! [`intervening`] is an exact geometric test with no sampling and no
//! floating point. Each hex is treated as the closed hexagon around its
//! center; a hex is crossed when the closed segment between the two centers
//! touches it. A sightline running exactly along a hexside or through a
//! vertex therefore includes every hex touching that boundary, which makes
//! the result symmetric in its arguments.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A hex position on the board (offset coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct HexCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the six hex directions, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Facing {
    /// Direction 0.
    #[default]
    North,
    /// Direction 1.
    NorthEast,
    /// Direction 2.
    SouthEast,
    /// Direction 3.
    South,
    /// Direction 4.
    SouthWest,
    /// Direction 5.
    NorthWest,
}

impl Facing {
    /// All six facings in index order.
    pub const ALL: [Facing; 6] = [
        Facing::North,
        Facing::NorthEast,
        Facing::SouthEast,
        Facing::South,
        Facing::SouthWest,
        Facing::NorthWest,
    ];

    /// Facing from an index; any integer is reduced modulo 6.
    #[must_use]
    pub const fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(6) as usize]
    }

    /// Index of this facing (0..6).
    #[must_use]
    pub const fn index(self) -> i32 {
        self as i32
    }

    /// Rotate one hexside clockwise.
    #[must_use]
    pub const fn clockwise(self) -> Self {
        Self::from_index(self.index() + 1)
    }

    /// Rotate one hexside counter-clockwise.
    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        Self::from_index(self.index() - 1)
    }

    /// The facing pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        Self::from_index(self.index() + 3)
    }

    /// Axial (q, r) offset of one step in this direction.
    const fn axial_delta(self) -> (i32, i32) {
        match self {
            Facing::North => (0, -1),
            Facing::NorthEast => (1, -1),
            Facing::SouthEast => (1, 0),
            Facing::South => (0, 1),
            Facing::SouthWest => (-1, 1),
            Facing::NorthWest => (-1, 0),
        }
    }

    /// Cube (q, r, s) offset of one step in this direction.
    const fn cube_delta(self) -> Cube {
        let (q, r) = self.axial_delta();
        Cube::new(q, r)
    }
}

/// Cube coordinate (q + r + s = 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cube {
    q: i64,
    r: i64,
    s: i64,
}

impl Cube {
    const fn new(q: i32, r: i32) -> Self {
        Self {
            q: q as i64,
            r: r as i64,
            s: -(q as i64) - (r as i64),
        }
    }

    const fn sub(self, other: Self) -> Self {
        Self {
            q: self.q - other.q,
            r: self.r - other.r,
            s: self.s - other.s,
        }
    }

    const fn scale(self, k: i64) -> Self {
        Self {
            q: self.q * k,
            r: self.r * k,
            s: self.s * k,
        }
    }

    const fn dot(self, other: Self) -> i64 {
        self.q * other.q + self.r * other.r + self.s * other.s
    }

    /// Rotate 60 degrees counter-clockwise.
    const fn rotate_ccw(self) -> Self {
        Self {
            q: -self.s,
            r: -self.q,
            s: -self.r,
        }
    }
}

impl HexCoord {
    /// Create a new coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    fn to_cube(self) -> Cube {
        let q = self.x;
        let r = self.y - (self.x - (self.x & 1)) / 2;
        Cube::new(q, r)
    }

    fn from_axial(q: i32, r: i32) -> Self {
        Self {
            x: q,
            y: r + (q - (q & 1)) / 2,
        }
    }

    /// Distance in hexes.
    #[must_use]
    pub fn distance(self, other: Self) -> u32 {
        distance(self, other)
    }

    /// Adjacent coordinate in the given direction.
    #[must_use]
    pub fn translate(self, facing: Facing) -> Self {
        translate(self, facing)
    }

    /// Whether the two hexes share a hexside.
    #[must_use]
    pub fn is_adjacent(self, other: Self) -> bool {
        distance(self, other) == 1
    }

    /// The six neighbours, in facing order.
    #[must_use]
    pub fn neighbors(self) -> [HexCoord; 6] {
        Facing::ALL.map(|facing| self.translate(facing))
    }
}

/// Distance between two hexes.
#[must_use]
pub fn distance(a: HexCoord, b: HexCoord) -> u32 {
    let d = b.to_cube().sub(a.to_cube());
    ((d.q.abs() + d.r.abs() + d.s.abs()) / 2) as u32
}

/// Adjacent hex in a direction.
#[must_use]
pub fn translate(coord: HexCoord, facing: Facing) -> HexCoord {
    translate_n(coord, facing, 1)
}

/// Hex `n` steps away in a straight line.
#[must_use]
pub fn translate_n(coord: HexCoord, facing: Facing, n: i32) -> HexCoord {
    let c = coord.to_cube();
    let (dq, dr) = facing.axial_delta();
    HexCoord::from_axial(c.q as i32 + dq * n, c.r as i32 + dr * n)
}

/// Hex direction closest in angle to the vector from `a` to `b`.
///
/// When `b` lies exactly between two directions the lower index wins.
/// Returns `None` when both coordinates are the same hex.
#[must_use]
pub fn direction(a: HexCoord, b: HexCoord) -> Option<Facing> {
    if a == b {
        return None;
    }
    let delta = b.to_cube().sub(a.to_cube());
    let mut best = Facing::North;
    let mut best_dot = i64::MIN;
    for facing in Facing::ALL {
        let dot = delta.dot(facing.cube_delta());
        if dot > best_dot {
            best = facing;
            best_dot = dot;
        }
    }
    Some(best)
}

// ============================================================================
// Arcs
// ============================================================================

/// The four arcs around a unit, relative to its facing.
///
/// Front and rear span 120 degrees, each side 60 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arc {
    /// Forward arc.
    Front,
    /// Left side arc.
    Left,
    /// Right side arc.
    Right,
    /// Rear arc.
    Rear,
}

/// Delta from `from` to `to` rotated so that `facing` points north.
fn relative_delta(from: HexCoord, facing: Facing, to: HexCoord) -> Cube {
    let mut delta = to.to_cube().sub(from.to_cube());
    for _ in 0..facing.index() {
        delta = delta.rotate_ccw();
    }
    delta
}

/// Whether `to` lies within `arc` of a unit at `from` facing `facing`.
///
/// Arc boundaries are inclusive, so a hex on the line between two arcs is
/// in both. A unit's own hex is in every arc.
#[must_use]
pub fn is_in_arc(from: HexCoord, facing: Facing, to: HexCoord, arc: Arc) -> bool {
    let d = relative_delta(from, facing, to);
    match arc {
        Arc::Front => d.r <= 0 && d.s >= 0,
        Arc::Rear => d.r >= 0 && d.s <= 0,
        Arc::Left => d.r >= 0 && d.s >= 0,
        Arc::Right => d.r <= 0 && d.s <= 0,
    }
}

/// Classify `to` into exactly one arc of a unit at `from`.
///
/// Boundary hexes resolve to the front or rear arc before a side arc.
#[must_use]
pub fn arc_of(from: HexCoord, facing: Facing, to: HexCoord) -> Arc {
    if is_in_arc(from, facing, to, Arc::Front) {
        Arc::Front
    } else if is_in_arc(from, facing, to, Arc::Rear) {
        Arc::Rear
    } else if is_in_arc(from, facing, to, Arc::Left) {
        Arc::Left
    } else {
        Arc::Right
    }
}

// ============================================================================
// Intervening hexes
// ============================================================================

/// Non-negative rational used for segment parameters.
#[derive(Debug, Clone, Copy)]
struct Ratio {
    num: i64,
    den: i64,
}

impl Ratio {
    const ZERO: Self = Self { num: 0, den: 1 };
    const ONE: Self = Self { num: 1, den: 1 };

    fn new(num: i64, den: i64) -> Self {
        if den < 0 {
            Self {
                num: -num,
                den: -den,
            }
        } else {
            Self { num, den }
        }
    }

    fn cmp(self, other: Self) -> Ordering {
        (self.num * other.den).cmp(&(other.num * self.den))
    }
}

/// Half-width of a hexagon in the scaled cube space used by [`entry_parameter`].
const HEX_EXTENT: i64 = 3;

/// Parameter `t` in `[0, 1]` where the segment from `a` to `b` first touches
/// the closed hexagon around `c`, or `None` if it never does.
///
/// Coordinates are scaled by three so every hexagon vertex is integral; a
/// point `p` lies in the hexagon around `c` iff for `d = p - c`
/// `|dq - dr|`, `|dr - ds|` and `|ds - dq|` are all at most three.
fn entry_parameter(a: Cube, b: Cube, c: Cube) -> Option<Ratio> {
    let start = a.scale(3).sub(c.scale(3));
    let step = b.scale(3).sub(a.scale(3));

    let constraints = [
        (start.q - start.r, step.q - step.r),
        (start.r - start.s, step.r - step.s),
        (start.s - start.q, step.s - step.q),
    ];

    let mut lo = Ratio::ZERO;
    let mut hi = Ratio::ONE;
    for (alpha, beta) in constraints {
        // -3 <= alpha + beta * t <= 3
        if beta == 0 {
            if alpha.abs() > HEX_EXTENT {
                return None;
            }
            continue;
        }
        let bound_a = Ratio::new(-HEX_EXTENT - alpha, beta);
        let bound_b = Ratio::new(HEX_EXTENT - alpha, beta);
        let (lower, upper) = if beta > 0 {
            (bound_a, bound_b)
        } else {
            (bound_b, bound_a)
        };
        if lower.cmp(lo) == Ordering::Greater {
            lo = lower;
        }
        if upper.cmp(hi) == Ordering::Less {
            hi = upper;
        }
        if lo.cmp(hi) == Ordering::Greater {
            return None;
        }
    }
    Some(lo)
}

/// Hexes crossed by the sightline from the center of `a` to the center of `b`.
///
/// Both endpoints are included. Hexes are ordered by where the line first
/// enters them; hexes entered at the same point are ordered by coordinate.
#[must_use]
pub fn intervening(a: HexCoord, b: HexCoord) -> Vec<HexCoord> {
    if a == b {
        return vec![a];
    }

    let n = distance(a, b) as i32;
    let ca = a.to_cube();
    let cb = b.to_cube();

    let mut crossed: Vec<(Ratio, HexCoord)> = Vec::new();
    for dq in -n..=n {
        let r_min = (-n).max(-dq - n);
        let r_max = n.min(-dq + n);
        for dr in r_min..=r_max {
            let q = ca.q as i32 + dq;
            let r = ca.r as i32 + dr;
            let candidate = HexCoord::from_axial(q, r);
            if distance(candidate, b) as i32 > n {
                continue;
            }
            if let Some(t) = entry_parameter(ca, cb, candidate.to_cube()) {
                crossed.push((t, candidate));
            }
        }
    }

    crossed.sort_by(|(ta, ha), (tb, hb)| ta.cmp(*tb).then_with(|| ha.cmp(hb)));
    crossed.into_iter().map(|(_, hex)| hex).collect()
}

/// Hexes strictly between `a` and `b` on the sightline.
#[must_use]
pub fn intervening_exclusive(a: HexCoord, b: HexCoord) -> Vec<HexCoord> {
    intervening(a, b)
        .into_iter()
        .filter(|hex| *hex != a && *hex != b)
        .collect()
}
