//! Hex geometry with axial coordinates (pointy-top orientation)

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

const SQRT_3: f64 = 1.732_050_807_568_877_2;

/// Axial hex coordinates
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

impl Hex {
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Third cube coordinate, always `-q - r`
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Distance between two hexes in steps
    pub fn distance_to(&self, other: Hex) -> u32 {
        let dq = (self.q - other.q).unsigned_abs();
        let dr = (self.r - other.r).unsigned_abs();
        let ds = (self.s() - other.s()).unsigned_abs();
        dq.max(dr).max(ds)
    }

    /// Get neighbor in direction (0-5)
    pub fn neighbor(&self, direction: usize) -> Hex {
        let (dq, dr) = DIRECTIONS[direction % 6];
        Hex::new(self.q + dq, self.r + dr)
    }

    /// All six neighbors, in `DIRECTIONS` order
    pub fn neighbors(&self) -> [Hex; 6] {
        std::array::from_fn(|i| self.neighbor(i))
    }

    /// Convert to the odd-r offset address used by rectangular maps
    pub fn to_offset(&self) -> OffsetCoord {
        OffsetCoord::from_axial(*self)
    }
}

impl Add for Hex {
    type Output = Hex;

    fn add(self, other: Hex) -> Hex {
        Hex::new(self.q + other.q, self.r + other.r)
    }
}

impl Sub for Hex {
    type Output = Hex;

    fn sub(self, other: Hex) -> Hex {
        Hex::new(self.q - other.q, self.r - other.r)
    }
}

impl std::fmt::Display for Hex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

/// Direction vectors in axial coordinates (dq, dr)
/// Index: 0=E, 1=NE, 2=NW, 3=W, 4=SW, 5=SE
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (1, -1),  // NE
    (0, -1),  // NW
    (-1, 0),  // W
    (-1, 1),  // SW
    (0, 1),   // SE
];

/// Neighbor offsets (dcol, drow) for even rows, same order as `DIRECTIONS`
pub const EVEN_ROW_NEIGHBORS: [(i32, i32); 6] = [
    (1, 0),
    (0, -1),
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, 1),
];

/// Neighbor offsets (dcol, drow) for odd rows, same order as `DIRECTIONS`
pub const ODD_ROW_NEIGHBORS: [(i32, i32); 6] = [
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, 0),
    (0, 1),
    (1, 1),
];

/// Row/column address of a hex in a rectangular map.
///
/// Odd rows are shifted right by half a hex ("odd-r"). Because of that shift the
/// neighbor offsets depend on row parity, see [`OffsetCoord::neighbors`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OffsetCoord {
    pub col: i32,
    pub row: i32,
}

impl OffsetCoord {
    pub const fn new(col: i32, row: i32) -> Self {
        Self { col, row }
    }

    pub fn is_odd_row(&self) -> bool {
        self.row & 1 == 1
    }

    pub fn to_axial(&self) -> Hex {
        Hex::new(self.col - (self.row - (self.row & 1)) / 2, self.row)
    }

    pub fn from_axial(hex: Hex) -> Self {
        Self::new(hex.q + (hex.r - (hex.r & 1)) / 2, hex.r)
    }

    /// Offset table for this row's parity
    pub fn neighbor_table(&self) -> &'static [(i32, i32); 6] {
        if self.is_odd_row() {
            &ODD_ROW_NEIGHBORS
        } else {
            &EVEN_ROW_NEIGHBORS
        }
    }

    /// All six neighbors, in `DIRECTIONS` order
    pub fn neighbors(&self) -> [OffsetCoord; 6] {
        let table = self.neighbor_table();
        std::array::from_fn(|i| {
            let (dc, dr) = table[i];
            OffsetCoord::new(self.col + dc, self.row + dr)
        })
    }
}

/// Fractional axial coordinates produced by pixel conversion
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FractionalHex {
    pub q: f64,
    pub r: f64,
}

impl FractionalHex {
    pub const fn new(q: f64, r: f64) -> Self {
        Self { q, r }
    }

    pub fn s(&self) -> f64 {
        -self.q - self.r
    }

    /// Round to the nearest hex, keeping `q + r + s == 0`
    pub fn round(&self) -> Hex {
        round_to_nearest_hex(self.q, self.r)
    }
}

/// Pixel-space position
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        self.distance_squared(other).sqrt()
    }

    pub fn distance_squared(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Hex size plus pixel origin, shared by every conversion on a grid
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    /// Center-to-corner radius in pixels
    pub size: f64,
    /// Pixel position of hex (0, 0)
    pub origin: Point,
}

impl Layout {
    pub const fn new(size: f64, origin: Point) -> Self {
        Self { size, origin }
    }

    pub fn hex_to_pixel(&self, hex: Hex) -> Point {
        axial_to_pixel(hex.q, hex.r, self.size, self.origin.x, self.origin.y)
    }

    pub fn pixel_to_hex(&self, point: Point) -> FractionalHex {
        pixel_to_axial(point.x, point.y, self.size, self.origin.x, self.origin.y)
    }

    /// Hex containing `point`
    pub fn hex_at_pixel(&self, point: Point) -> Hex {
        self.pixel_to_hex(point).round()
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::new(32.0, Point::default())
    }
}

/// Center of hex (q, r) in pixel space
pub fn axial_to_pixel(q: i32, r: i32, hex_size: f64, offset_x: f64, offset_y: f64) -> Point {
    let (q, r) = (q as f64, r as f64);
    Point::new(
        hex_size * (SQRT_3 * q + SQRT_3 / 2.0 * r) + offset_x,
        hex_size * (1.5 * r) + offset_y,
    )
}

/// Inverse of [`axial_to_pixel`], without rounding
pub fn pixel_to_axial(x: f64, y: f64, hex_size: f64, offset_x: f64, offset_y: f64) -> FractionalHex {
    let px = x - offset_x;
    let py = y - offset_y;
    FractionalHex::new(
        (SQRT_3 / 3.0 * px - py / 3.0) / hex_size,
        (2.0 / 3.0 * py) / hex_size,
    )
}

/// Cube rounding: the component with the largest rounding error is rebuilt
/// from the other two.
pub fn round_to_nearest_hex(q_frac: f64, r_frac: f64) -> Hex {
    let s_frac = -q_frac - r_frac;

    let mut q = q_frac.round();
    let mut r = r_frac.round();
    let s = s_frac.round();

    let dq = (q - q_frac).abs();
    let dr = (r - r_frac).abs();
    let ds = (s - s_frac).abs();

    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }
    // otherwise s absorbs the error and is simply dropped

    Hex::new(q as i32, r as i32)
}

/// All hexes within `radius` steps of the origin
pub fn hexagon(radius: i32) -> Vec<Hex> {
    let mut hexes = Vec::new();
    for q in -radius..=radius {
        let r_min = (-radius).max(-q - radius);
        let r_max = radius.min(-q + radius);
        for r in r_min..=r_max {
            hexes.push(Hex::new(q, r));
        }
    }
    hexes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance() {
        assert_eq!(Hex::new(0, 0).distance_to(Hex::new(0, 0)), 0);
        assert_eq!(Hex::new(0, 0).distance_to(Hex::new(1, 0)), 1);
        assert_eq!(Hex::new(0, 0).distance_to(Hex::new(2, 2)), 4);
        assert_eq!(Hex::new(-2, 1).distance_to(Hex::new(1, -1)), 3);
    }

    #[test]
    fn test_neighbors_are_adjacent() {
        let center = Hex::new(3, -2);
        for n in center.neighbors() {
            assert_eq!(center.distance_to(n), 1);
            assert_eq!(n.q + n.r + n.s(), 0);
        }
    }

    #[test]
    fn test_offset_roundtrip() {
        for row in -5..5 {
            for col in -5..5 {
                let oc = OffsetCoord::new(col, row);
                assert_eq!(OffsetCoord::from_axial(oc.to_axial()), oc);
            }
        }
    }

    #[test]
    fn test_offset_tables_match_axial_directions() {
        for row in -3..4 {
            for col in -3..4 {
                let oc = OffsetCoord::new(col, row);
                let from_table: Vec<Hex> = oc.neighbors().iter().map(|n| n.to_axial()).collect();
                assert_eq!(from_table, oc.to_axial().neighbors().to_vec(), "row {}", row);
            }
        }
    }

    #[test]
    fn test_pixel_conversion() {
        let p = axial_to_pixel(0, 0, 10.0, 5.0, 7.0);
        assert_eq!(p, Point::new(5.0, 7.0));

        let p = axial_to_pixel(0, 2, 10.0, 0.0, 0.0);
        assert!((p.x - 10.0 * SQRT_3).abs() < 1e-9);
        assert!((p.y - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_pixel_roundtrip() {
        let layout = Layout::new(24.0, Point::new(100.0, -40.0));
        for hex in hexagon(6) {
            let center = layout.hex_to_pixel(hex);
            assert_eq!(layout.hex_at_pixel(center), hex);
        }
    }

    #[test]
    fn test_rounding_keeps_invariant() {
        let samples = [(0.4, 0.4), (0.5, -0.2), (-1.49, 0.98), (2.33, -1.66), (0.0, 0.51)];
        for (q, r) in samples {
            let h = round_to_nearest_hex(q, r);
            assert_eq!(h.q + h.r + h.s(), 0);
            // rounded hex is never more than one step from the naive rounding
            assert!(h.distance_to(Hex::new(q.round() as i32, r.round() as i32)) <= 1);
        }
    }

    #[test]
    fn test_rounding_corrects_largest_error() {
        // q=0.2 r=0.1 s=-0.3: s has the largest error and is dropped
        assert_eq!(round_to_nearest_hex(0.2, 0.1), Hex::new(0, 0));
        // q=0.4 r=0.4 s=-0.8: q and r tie, r wins over s
        assert_eq!(round_to_nearest_hex(0.4, 0.4), Hex::new(0, 1));
        // q=0.6 r=0.3 s=-0.9: q has the largest error, q = -r - s
        assert_eq!(round_to_nearest_hex(0.6, 0.3), Hex::new(1, 0));
        // q=0.3 r=0.6: r has the largest error
        assert_eq!(round_to_nearest_hex(0.3, 0.6), Hex::new(0, 1));
    }

    #[test]
    fn test_hexagon_size() {
        assert_eq!(hexagon(0).len(), 1);
        assert_eq!(hexagon(1).len(), 7);
        assert_eq!(hexagon(4).len(), 61);
    }
}
