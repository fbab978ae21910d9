//! Hexagonal core map.
//!
//! Assemblies sit on a hex lattice whose neighbor direction `d` faces duct
//! side `d` of both the assembly and, from the other side, side `(d + 3) % 6`
//! of the neighbor.

use std::collections::HashMap;

use bf_geometry::Hex;

use crate::error::{ConfigError, ConfigResult};

/// Lattice position from 1-based ring and 1-based position in that ring.
pub fn ring_position(ring: u32, position: u32) -> Option<Hex> {
    if ring == 0 || position == 0 {
        return None;
    }
    Hex::on_ring(ring - 1, position - 1)
}

/// A shared face between two neighboring assemblies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub a: usize,
    pub side_a: usize,
    pub b: usize,
    pub side_b: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreMap {
    positions: Vec<Hex>,
    index: HashMap<Hex, usize>,
}

impl CoreMap {
    pub fn new(positions: Vec<Hex>) -> ConfigResult<Self> {
        let mut index = HashMap::with_capacity(positions.len());
        for (i, &p) in positions.iter().enumerate() {
            if let Some(prev) = index.insert(p, i) {
                return Err(ConfigError::InvalidCore {
                    what: format!(
                        "assemblies {} and {} share position ({}, {})",
                        prev, i, p.q, p.r
                    ),
                });
            }
        }
        Ok(Self { positions, index })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn position(&self, asm: usize) -> Option<Hex> {
        self.positions.get(asm).copied()
    }

    /// Assembly across duct side `side` of `asm`.
    pub fn neighbor(&self, asm: usize, side: usize) -> Option<usize> {
        let p = self.positions.get(asm)?;
        self.index.get(&p.neighbor(side)).copied()
    }

    /// Every shared face, listed once with `a < b`.
    pub fn faces(&self) -> Vec<Face> {
        let mut faces = Vec::new();
        for a in 0..self.positions.len() {
            for side_a in 0..6 {
                if let Some(b) = self.neighbor(a, side_a)
                    && a < b
                {
                    faces.push(Face {
                        a,
                        side_a,
                        b,
                        side_b: (side_a + 3) % 6,
                    });
                }
            }
        }
        faces
    }
}
