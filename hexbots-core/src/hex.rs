//! Hex board geometry with cube coordinates

use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Sub};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Side lengths a board may have
pub const SIDE_LENGTHS: [u8; 2] = [5, 7];

/// Largest distance covered by the direction tables
pub const MAX_DIRECTION_DISTANCE: i32 = 3;

/// Cube hex coordinates
///
/// `x` and `z` are authoritative; `y` is re-derived by [`Hex::reduce`] so that
/// `x + y + z == 0`. Equality and hashing only look at the reduced form.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
pub struct Hex {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Hex {
    /// Board center
    pub const ORIGIN: Hex = Hex::axial(0, 0);

    /// Raw coordinate, not necessarily reduced
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Reduced coordinate from its two authoritative axes
    pub const fn axial(x: i32, z: i32) -> Self {
        Self { x, y: -x - z, z }
    }

    /// Restore the `x + y + z == 0` invariant
    pub const fn reduce(self) -> Self {
        Self::axial(self.x, self.z)
    }

    pub const fn is_reduced(&self) -> bool {
        self.x + self.y + self.z == 0
    }

    /// Rewrite a displacement as step counts along the x, y and z axes.
    ///
    /// A y step moves +1 in x and -1 in z, so opposing-sign x/z pairs fold
    /// into y. At most two components of the result are non-zero and the sum
    /// of their magnitudes is the hex distance covered.
    pub fn fold(self) -> [i32; 3] {
        let d = self.reduce();
        let (dx, dz) = (d.x, d.z);
        if dx > 0 && dz < 0 {
            let m = dx.min(-dz);
            [dx - m, m, dz + m]
        } else if dx < 0 && dz > 0 {
            let m = (-dx).min(dz);
            [dx + m, -m, dz - m]
        } else {
            [dx, 0, dz]
        }
    }

    /// Distance between two hexes
    pub fn distance(&self, other: Hex) -> i32 {
        let a = self.reduce();
        let b = other.reduce();
        if a.x == b.x {
            return (a.z - b.z).abs();
        }
        if a.z == b.z {
            return (a.x - b.x).abs();
        }
        let [fx, fy, fz] = (b - a).fold();
        fx.abs() + fy.abs() + fz.abs()
    }

    /// Check if this hex lies on a board with the given side length
    pub fn is_in_bounds(&self, side: u8) -> bool {
        let Some(bounds) = bounds_for(side) else {
            return false;
        };
        let c = self.reduce();
        [c.x, c.y, c.z]
            .iter()
            .zip(bounds.min.iter().zip(bounds.max.iter()))
            .all(|(&v, (&lo, &hi))| lo <= v && v <= hi)
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: u8) -> Hex {
        *self + DIRECTIONS[direction as usize % 6]
    }

    /// Corner `k` (0-5) of a board with the given side length
    pub fn corner(side: u8, k: u8) -> Hex {
        DIRECTIONS[k as usize % 6] * (i32::from(side) - 1)
    }
}

impl PartialEq for Hex {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.z == other.z
    }
}

impl Eq for Hex {}

impl Hash for Hex {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.x.hash(state);
        self.z.hash(state);
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, rhs: Hex) -> Hex {
        Hex::axial(self.x + rhs.x, self.z + rhs.z)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, rhs: Hex) -> Hex {
        Hex::axial(self.x - rhs.x, self.z - rhs.z)
    }
}

impl Mul<i32> for Hex {
    type Output = Hex;

    fn mul(self, k: i32) -> Hex {
        Hex::axial(self.x * k, self.z * k)
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let c = self.reduce();
        write!(f, "({}, {}, {})", c.x, c.y, c.z)
    }
}

/// Direction vectors, clockwise from north
/// Index: 0=N, 1=NE, 2=SE, 3=S, 4=SW, 5=NW
pub const DIRECTIONS: [Hex; 6] = [
    Hex::axial(0, -1),  // N
    Hex::axial(1, -1),  // NE
    Hex::axial(1, 0),   // SE
    Hex::axial(0, 1),   // S
    Hex::axial(-1, 1),  // SW
    Hex::axial(-1, 0),  // NW
];

/// Per-axis extent of a board
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct AxisBounds {
    side: u8,
    min: [i32; 3],
    max: [i32; 3],
}

const BOUNDS: [AxisBounds; 2] = [
    AxisBounds { side: 5, min: [-4; 3], max: [4; 3] },
    AxisBounds { side: 7, min: [-6; 3], max: [6; 3] },
];

fn bounds_for(side: u8) -> Option<&'static AxisBounds> {
    BOUNDS.iter().find(|b| b.side == side)
}

/// Every hex on a board of the given side length
pub fn board_hexes(side: u8) -> impl Iterator<Item = Hex> {
    let r = i32::from(side.saturating_sub(1));
    (-r..=r).flat_map(move |x| (-r..=r).map(move |z| Hex::axial(x, z)))
        .filter(move |h| h.is_in_bounds(side))
}

/// Lookup between ring displacements and discrete directions.
///
/// Ring `k` (1..=3) has `6k` directions numbered clockwise from the hex
/// straight north. Corner `i` of the ring is direction `i * k`.
#[derive(Clone, Debug)]
pub struct DirectionTable {
    index: FxHashMap<Hex, u8>,
    rings: Vec<Vec<Hex>>,
}

impl DirectionTable {
    pub fn new() -> Self {
        let mut index = FxHashMap::default();
        let mut rings = Vec::with_capacity(MAX_DIRECTION_DISTANCE as usize);

        for k in 1..=MAX_DIRECTION_DISTANCE {
            let ring = walk_ring(k);
            for (i, &d) in ring.iter().enumerate() {
                index.insert(d, i as u8);
            }
            rings.push(ring);
        }

        Self { index, rings }
    }

    /// Absolute direction index of `to` as seen from `from`
    pub fn absolute(&self, from: Hex, to: Hex) -> Option<u8> {
        let k = from.distance(to);
        if !(1..=MAX_DIRECTION_DISTANCE).contains(&k) {
            return None;
        }
        self.index.get(&(to - from)).copied()
    }

    /// Direction of `to` relative to a piece at `from` facing `facing`
    pub fn relative(&self, facing: u8, from: Hex, to: Hex) -> Option<u8> {
        let abs = self.absolute(from, to)? as i32;
        let k = from.distance(to);
        let sectors = 6 * k;
        let rel = (abs - i32::from(facing % 6) * k).rem_euclid(sectors);
        Some(rel as u8)
    }

    /// Displacement for an absolute direction on ring `distance`
    pub fn displacement(&self, distance: i32, direction: u8) -> Option<Hex> {
        if !(1..=MAX_DIRECTION_DISTANCE).contains(&distance) {
            return None;
        }
        self.rings[(distance - 1) as usize].get(direction as usize).copied()
    }

    /// Hex at a relative direction and distance from a piece.
    /// Distance 0 is the piece's own hex.
    pub fn relative_target(&self, from: Hex, facing: u8, distance: i32, relative: i32) -> Option<Hex> {
        if distance == 0 {
            return Some(from);
        }
        if !(1..=MAX_DIRECTION_DISTANCE).contains(&distance) {
            return None;
        }
        let sectors = 6 * distance;
        let abs = (relative + i32::from(facing % 6) * distance).rem_euclid(sectors);
        self.displacement(distance, abs as u8).map(|d| from + d)
    }
}

impl Default for DirectionTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Facing (0-5) closest counter-clockwise to a ring direction
pub fn facing_for(direction: u8, distance: i32) -> u8 {
    if distance <= 0 {
        return 0;
    }
    ((i32::from(direction) / distance) % 6) as u8
}

fn walk_ring(k: i32) -> Vec<Hex> {
    let mut out = Vec::with_capacity((6 * k) as usize);
    let mut hex = DIRECTIONS[0] * k;
    for side in 0..6 {
        for _ in 0..k {
            out.push(hex);
            hex = hex + DIRECTIONS[(side + 2) % 6];
        }
    }
    out
}
