//! Subchannel mesh of a hexagonal pin bundle.
//!
//! Interior subchannels are the triangles between three neighboring pins,
//! edge subchannels the strips between two outer-row pins and a duct flat,
//! corner subchannels the kites between a corner pin and a duct corner.
//! The perimeter (edge and corner subchannels) is ordered counter-clockwise
//! starting at the corner on +x; wire-wrap swirl follows that order.

use std::collections::HashMap;
use std::f64::consts::PI;

use bf_correlations::{SubchannelClass, SubchannelType};

use crate::bundle::PinBundle;
use crate::lattice::{DIRECTIONS, Hex, HexLattice};

/// Share of one pin's perimeter facing a subchannel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinContact {
    pub pin: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subchannel {
    pub kind: SubchannelType,
    /// Coolant flow area [m²].
    pub area: f64,
    /// Pin, wire and duct perimeter in contact with coolant [m].
    pub wetted_perimeter: f64,
    /// Wire cross-section inside the subchannel [m²].
    pub wire_area: f64,
    pub centroid: [f64; 2],
    pub pins: Vec<PinContact>,
    /// Length of duct wall bounding the subchannel [m]; zero for interior.
    pub wall_length: f64,
}

impl Subchannel {
    pub fn hydraulic_diameter(&self) -> f64 {
        4.0 * self.area / self.wetted_perimeter
    }

    pub fn on_perimeter(&self) -> bool {
        self.kind != SubchannelType::Interior
    }
}

/// Lateral opening between two subchannels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    pub a: usize,
    pub b: usize,
    /// Gap width [m].
    pub gap: f64,
    /// Centroid-to-centroid distance [m].
    pub distance: f64,
}

/// Duct wall piece bounding one perimeter subchannel.
#[derive(Debug, Clone, PartialEq)]
pub struct DuctSegment {
    pub subchannel: usize,
    pub length: f64,
    /// Duct sides (0..6) covered by the segment and the share on each.
    pub sides: Vec<(usize, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubchannelMesh {
    subchannels: Vec<Subchannel>,
    connections: Vec<Connection>,
    perimeter: Vec<usize>,
    segments: Vec<DuctSegment>,
    pins: Vec<[f64; 2]>,
    /// Pin-center to duct-flat distance of the outer row [m].
    wall_distance: f64,
    classes: [SubchannelClass; 3],
}

fn unit(deg: f64) -> [f64; 2] {
    let rad = deg.to_radians();
    [rad.cos(), rad.sin()]
}

fn distance(p: [f64; 2], q: [f64; 2]) -> f64 {
    ((p[0] - q[0]).powi(2) + (p[1] - q[1]).powi(2)).sqrt()
}

fn bond(i: usize, j: usize) -> (usize, usize) {
    if i < j { (i, j) } else { (j, i) }
}

impl SubchannelMesh {
    /// Build the mesh inside a duct of inner flat-to-flat `inner_ftf`.
    ///
    /// Dimensions are assumed validated: the outer pin row must clear the
    /// duct wall.
    pub fn build(bundle: &PinBundle, inner_ftf: f64) -> Self {
        let lattice = HexLattice::new(bundle.rings);
        let k = i32::try_from(bundle.rings.saturating_sub(1)).unwrap_or(0);
        let p = bundle.pin_pitch;
        let d = bundle.pin_diameter;
        let a = inner_ftf / 2.0 - bundle.outer_row_apothem();
        let pin_area = bundle.pin_area();
        let wire_area = bundle.wire_area();
        let pin_perim = PI * d;
        let wire_perim = if bundle.has_wire() {
            PI * bundle.wire_diameter / bundle.wire_cos()
        } else {
            0.0
        };
        let sqrt3 = 3f64.sqrt();

        let pins: Vec<[f64; 2]> = lattice.sites().iter().map(|h| h.cartesian(p)).collect();
        let mut subchannels = Vec::new();
        let mut bonds: HashMap<(usize, usize), Vec<usize>> = HashMap::new();

        // Interior triangles, each anchored at one of its own vertices so
        // every triangle with all three pins in the lattice is visited.
        let up = [Hex::new(0, 0), Hex::new(1, 0), Hex::new(0, 1)];
        let down = [Hex::new(0, 0), Hex::new(-1, 1), Hex::new(0, 1)];
        for &site in lattice.sites() {
            for shape in [up, down] {
                let found: Option<Vec<usize>> = shape
                    .iter()
                    .map(|&offset| lattice.index_of(site.add(offset)))
                    .collect();
                let Some(tri) = found else { continue };
                let id = subchannels.len();
                let centroid = [
                    tri.iter().map(|&i| pins[i][0]).sum::<f64>() / 3.0,
                    tri.iter().map(|&i| pins[i][1]).sum::<f64>() / 3.0,
                ];
                subchannels.push(Subchannel {
                    kind: SubchannelType::Interior,
                    area: sqrt3 / 4.0 * p * p - pin_area / 2.0 - wire_area / 2.0,
                    wetted_perimeter: (pin_perim + wire_perim) / 2.0,
                    wire_area: wire_area / 2.0,
                    centroid,
                    pins: tri
                        .iter()
                        .map(|&pin| PinContact {
                            pin,
                            fraction: 1.0 / 6.0,
                        })
                        .collect(),
                    wall_length: 0.0,
                });
                for (x, y) in [(0, 1), (1, 2), (0, 2)] {
                    bonds.entry(bond(tri[x], tri[y])).or_default().push(id);
                }
            }
        }

        // Perimeter: corner s, then the edges along side s.
        let mut perimeter = Vec::new();
        let mut segments = Vec::new();
        for side in 0..6 {
            let corner_hex = DIRECTIONS[side].scale(k);
            let corner_pin = lattice.index_of(corner_hex).unwrap_or(0);
            let u = unit(60.0 * side as f64);
            let reach = 7.0 * a / (6.0 * sqrt3);
            let id = subchannels.len();
            subchannels.push(Subchannel {
                kind: SubchannelType::Corner,
                area: a * a / sqrt3 - pin_area / 6.0 - wire_area / 6.0,
                wetted_perimeter: 2.0 * a / sqrt3 + (pin_perim + wire_perim) / 6.0,
                wire_area: wire_area / 6.0,
                centroid: [
                    pins[corner_pin][0] + reach * u[0],
                    pins[corner_pin][1] + reach * u[1],
                ],
                pins: vec![PinContact {
                    pin: corner_pin,
                    fraction: 1.0 / 6.0,
                }],
                wall_length: 2.0 * a / sqrt3,
            });
            perimeter.push(id);
            segments.push(DuctSegment {
                subchannel: id,
                length: 2.0 * a / sqrt3,
                sides: vec![((side + 5) % 6, 0.5), (side, 0.5)],
            });

            let n = unit(60.0 * side as f64 + 30.0);
            let step = DIRECTIONS[(side + 2) % 6];
            for j in 0..k {
                let h1 = corner_hex.add(step.scale(j));
                let h2 = h1.add(step);
                let (Some(p1), Some(p2)) = (lattice.index_of(h1), lattice.index_of(h2)) else {
                    continue;
                };
                let id = subchannels.len();
                let mid = [
                    0.5 * (pins[p1][0] + pins[p2][0]),
                    0.5 * (pins[p1][1] + pins[p2][1]),
                ];
                subchannels.push(Subchannel {
                    kind: SubchannelType::Edge,
                    area: p * a - pin_area / 2.0 - wire_area / 2.0,
                    wetted_perimeter: p + (pin_perim + wire_perim) / 2.0,
                    wire_area: wire_area / 2.0,
                    centroid: [mid[0] + 0.5 * a * n[0], mid[1] + 0.5 * a * n[1]],
                    pins: vec![
                        PinContact {
                            pin: p1,
                            fraction: 0.25,
                        },
                        PinContact {
                            pin: p2,
                            fraction: 0.25,
                        },
                    ],
                    wall_length: p,
                });
                bonds.entry(bond(p1, p2)).or_default().push(id);
                perimeter.push(id);
                segments.push(DuctSegment {
                    subchannel: id,
                    length: p,
                    sides: vec![(side, 1.0)],
                });
            }
        }

        let mut connections = Vec::new();
        let mut shared: Vec<_> = bonds.into_iter().collect();
        shared.sort_by_key(|(key, _)| *key);
        for (_, owners) in shared {
            if let [x, y] = owners[..] {
                connections.push(Connection {
                    a: x,
                    b: y,
                    gap: p - d,
                    distance: distance(subchannels[x].centroid, subchannels[y].centroid),
                });
            }
        }
        for (i, &x) in perimeter.iter().enumerate() {
            let y = perimeter[(i + 1) % perimeter.len()];
            connections.push(Connection {
                a: x,
                b: y,
                gap: a - d / 2.0,
                distance: distance(subchannels[x].centroid, subchannels[y].centroid),
            });
        }

        let classes = summarize(&subchannels, bundle);
        Self {
            subchannels,
            connections,
            perimeter,
            segments,
            pins,
            wall_distance: a,
            classes,
        }
    }

    pub fn subchannels(&self) -> &[Subchannel] {
        &self.subchannels
    }

    pub fn len(&self) -> usize {
        self.subchannels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subchannels.is_empty()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Perimeter subchannels in swirl order.
    pub fn perimeter(&self) -> &[usize] {
        &self.perimeter
    }

    /// Duct segments, one per perimeter subchannel, in perimeter order.
    pub fn segments(&self) -> &[DuctSegment] {
        &self.segments
    }

    /// Pin centers [m].
    pub fn pins(&self) -> &[[f64; 2]] {
        &self.pins
    }

    pub fn count(&self, kind: SubchannelType) -> usize {
        self.classes[kind.slot()].count
    }

    pub fn classes(&self) -> [SubchannelClass; 3] {
        self.classes
    }

    pub fn total_area(&self) -> f64 {
        self.subchannels.iter().map(|s| s.area).sum()
    }

    /// Distance from an outer-row pin center to the duct flat [m].
    pub fn wall_distance(&self) -> f64 {
        self.wall_distance
    }
}

fn summarize(subchannels: &[Subchannel], bundle: &PinBundle) -> [SubchannelClass; 3] {
    let sweep = if bundle.has_wire() {
        PI * (bundle.pin_diameter + bundle.wire_diameter) * bundle.wire_diameter
    } else {
        0.0
    };
    let mut classes = [SubchannelClass::default(); 3];
    for kind in SubchannelType::ALL {
        let Some(first) = subchannels.iter().find(|s| s.kind == kind) else {
            continue;
        };
        let projected = match kind {
            SubchannelType::Interior => sweep / 6.0,
            SubchannelType::Edge => sweep / 4.0,
            SubchannelType::Corner => sweep / 6.0,
        };
        classes[kind.slot()] = SubchannelClass {
            count: subchannels.iter().filter(|s| s.kind == kind).count(),
            area: first.area,
            wetted_perimeter: first.wetted_perimeter,
            wire_area: first.wire_area,
            wire_projected_area: projected,
        };
    }
    classes
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bundle(rings: u32) -> (PinBundle, f64) {
        let b = PinBundle {
            rings,
            pin_pitch: 0.00726,
            pin_diameter: 0.0063,
            clad_thickness: 0.0005,
            wire_pitch: 0.2032,
            wire_diameter: 0.0011,
        };
        let ftf = 2.0 * (b.outer_row_apothem() + b.pin_diameter / 2.0 + 0.0011);
        (b, ftf)
    }

    #[test]
    fn subchannel_counts() {
        for rings in 1..7u32 {
            let (b, ftf) = bundle(rings);
            let mesh = SubchannelMesh::build(&b, ftf);
            let k = (rings - 1) as usize;
            assert_eq!(mesh.count(SubchannelType::Interior), 6 * k * k);
            assert_eq!(mesh.count(SubchannelType::Edge), 6 * k);
            assert_eq!(mesh.count(SubchannelType::Corner), 6);
            assert_eq!(mesh.perimeter().len(), 6 * k + 6);
            assert_eq!(mesh.segments().len(), mesh.perimeter().len());
        }
    }

    #[test]
    fn pin_perimeter_fractions_close() {
        for rings in 1..9u32 {
            let (b, ftf) = bundle(rings);
            let mesh = SubchannelMesh::build(&b, ftf);
            let mut share = vec![0.0; mesh.pins().len()];
            for sc in mesh.subchannels() {
                for c in &sc.pins {
                    share[c.pin] += c.fraction;
                }
            }
            for s in &share {
                assert_relative_eq!(*s, 1.0, epsilon = 1e-12);
            }
            let total: f64 = share.iter().sum();
            assert_relative_eq!(total, b.n_pins() as f64, epsilon = 1e-9);
        }
    }

    #[test]
    fn every_subchannel_is_connected() {
        let (b, ftf) = bundle(3);
        let mesh = SubchannelMesh::build(&b, ftf);
        let mut degree = vec![0usize; mesh.len()];
        for c in mesh.connections() {
            degree[c.a] += 1;
            degree[c.b] += 1;
            assert!(c.gap > 0.0 && c.distance > 0.0);
        }
        for (i, sc) in mesh.subchannels().iter().enumerate() {
            let expected = match sc.kind {
                SubchannelType::Interior => 3,
                SubchannelType::Edge => 3,
                SubchannelType::Corner => 2,
            };
            assert_eq!(degree[i], expected, "subchannel {i} ({:?})", sc.kind);
        }
    }

    #[test]
    fn duct_segments_cover_each_side() {
        let (b, ftf) = bundle(3);
        let mesh = SubchannelMesh::build(&b, ftf);
        let mut per_side = [0.0; 6];
        for seg in mesh.segments() {
            for &(side, share) in &seg.sides {
                per_side[side] += share * seg.length;
            }
        }
        let side_len = ftf / 3f64.sqrt();
        for len in per_side {
            assert_relative_eq!(len, side_len, max_relative = 1e-12);
        }
    }
}
