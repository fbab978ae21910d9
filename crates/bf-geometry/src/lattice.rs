//! Hexagonal lattice coordinates.
//!
//! Axial coordinates `(q, r)` with directions ordered counter-clockwise from
//! +x. Used both for pins inside a bundle and for assemblies inside a core.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hex {
    pub q: i32,
    pub r: i32,
}

/// Unit steps, counter-clockwise, starting along +x.
pub const DIRECTIONS: [Hex; 6] = [
    Hex { q: 1, r: 0 },
    Hex { q: 0, r: 1 },
    Hex { q: -1, r: 1 },
    Hex { q: -1, r: 0 },
    Hex { q: 0, r: -1 },
    Hex { q: 1, r: -1 },
];

impl Hex {
    pub const ORIGIN: Hex = Hex { q: 0, r: 0 };

    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// 0-based ring index (hex distance from the origin).
    pub fn ring(self) -> u32 {
        (self.q.unsigned_abs() + self.r.unsigned_abs() + (self.q + self.r).unsigned_abs()) / 2
    }

    pub fn add(self, other: Hex) -> Hex {
        Hex::new(self.q + other.q, self.r + other.r)
    }

    pub fn scale(self, k: i32) -> Hex {
        Hex::new(self.q * k, self.r * k)
    }

    pub fn neighbor(self, direction: usize) -> Hex {
        self.add(DIRECTIONS[direction % 6])
    }

    /// Position `pos` (0-based) on 0-based ring `ring`, walking
    /// counter-clockwise from the corner on +x.
    pub fn on_ring(ring: u32, pos: u32) -> Option<Hex> {
        if ring == 0 {
            return (pos == 0).then_some(Hex::ORIGIN);
        }
        if pos >= 6 * ring {
            return None;
        }
        let k = i32::try_from(ring).ok()?;
        let side = (pos / ring) as usize;
        let step = i32::try_from(pos % ring).ok()?;
        Some(
            DIRECTIONS[side]
                .scale(k)
                .add(DIRECTIONS[(side + 2) % 6].scale(step)),
        )
    }

    /// Cartesian center for lattice pitch `pitch`.
    pub fn cartesian(self, pitch: f64) -> [f64; 2] {
        let q = f64::from(self.q);
        let r = f64::from(self.r);
        [pitch * (q + 0.5 * r), pitch * r * 3f64.sqrt() / 2.0]
    }
}

/// All lattice sites of a bundle with `rings` rings, ordered by ring then
/// counter-clockwise position, with reverse lookup.
#[derive(Debug, Clone)]
pub struct HexLattice {
    sites: Vec<Hex>,
    index: HashMap<Hex, usize>,
    rings: u32,
}

impl HexLattice {
    pub fn new(rings: u32) -> Self {
        let mut sites = Vec::new();
        for ring in 0..rings {
            let count = if ring == 0 { 1 } else { 6 * ring };
            sites.extend((0..count).filter_map(|pos| Hex::on_ring(ring, pos)));
        }
        let index = sites.iter().enumerate().map(|(i, &h)| (h, i)).collect();
        Self {
            sites,
            index,
            rings,
        }
    }

    /// Number of sites: `3N(N-1) + 1`.
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn rings(&self) -> u32 {
        self.rings
    }

    pub fn sites(&self) -> &[Hex] {
        &self.sites
    }

    pub fn index_of(&self, hex: Hex) -> Option<usize> {
        self.index.get(&hex).copied()
    }

    pub fn contains(&self, hex: Hex) -> bool {
        self.index.contains_key(&hex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lattice_site_counts() {
        for (rings, expected) in [(1, 1), (2, 7), (3, 19), (5, 61), (9, 217)] {
            assert_eq!(HexLattice::new(rings).len(), expected);
        }
    }

    #[test]
    fn ring_walk_stays_on_ring() {
        for ring in 1..5 {
            for pos in 0..6 * ring {
                let h = Hex::on_ring(ring, pos).unwrap();
                assert_eq!(h.ring(), ring, "ring {ring} pos {pos}");
            }
            assert!(Hex::on_ring(ring, 6 * ring).is_none());
        }
    }

    #[test]
    fn neighbors_are_one_pitch_apart() {
        let pitch = 0.01;
        let c = Hex::new(2, -1);
        let [x0, y0] = c.cartesian(pitch);
        for d in 0..6 {
            let [x, y] = c.neighbor(d).cartesian(pitch);
            let dist = ((x - x0).powi(2) + (y - y0).powi(2)).sqrt();
            assert!((dist - pitch).abs() < 1e-12);
        }
    }

    #[test]
    fn index_round_trip() {
        let lat = HexLattice::new(4);
        for (i, &h) in lat.sites().iter().enumerate() {
            assert_eq!(lat.index_of(h), Some(i));
        }
        assert!(!lat.contains(Hex::new(4, 0)));
    }
}
