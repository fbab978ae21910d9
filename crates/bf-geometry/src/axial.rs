//! Axial regions and spacer grids.

use bf_correlations::SpacerGridLoss;

use crate::error::{GeometryError, GeometryResult};

/// Boundaries closer than this are treated as coincident [m].
pub const AXIAL_TOL: f64 = 1e-9;

/// A contiguous axial range `[z_lo, z_hi)`.
///
/// `coolant_fraction == None` marks a rodded region resolved by the
/// subchannel mesh; `Some(f)` a homogenized region with flow area
/// `f × duct interior area`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxialRegion {
    pub name: String,
    pub z_lo: f64,
    pub z_hi: f64,
    pub coolant_fraction: Option<f64>,
    /// Hydraulic diameter override for a homogenized region [m].
    pub hydraulic_diameter: Option<f64>,
}

impl AxialRegion {
    pub fn rodded(name: impl Into<String>, z_lo: f64, z_hi: f64) -> Self {
        Self {
            name: name.into(),
            z_lo,
            z_hi,
            coolant_fraction: None,
            hydraulic_diameter: None,
        }
    }

    pub fn lumped(name: impl Into<String>, z_lo: f64, z_hi: f64, coolant_fraction: f64) -> Self {
        Self {
            name: name.into(),
            z_lo,
            z_hi,
            coolant_fraction: Some(coolant_fraction),
            hydraulic_diameter: None,
        }
    }

    pub fn is_rodded(&self) -> bool {
        self.coolant_fraction.is_none()
    }

    pub fn length(&self) -> f64 {
        self.z_hi - self.z_lo
    }

    pub fn contains(&self, z: f64) -> bool {
        z >= self.z_lo && z < self.z_hi
    }
}

/// Regions sorted by `z_lo`, validated to tile `[0, length)`.
#[derive(Debug, Clone, PartialEq)]
pub struct AxialRegions {
    regions: Vec<AxialRegion>,
    length: f64,
}

impl AxialRegions {
    pub fn new(assembly: &str, mut regions: Vec<AxialRegion>, length: f64) -> GeometryResult<Self> {
        if !(length.is_finite() && length > 0.0) {
            return Err(GeometryError::invalid(
                assembly,
                format!("assembly length {} must be finite and positive", length),
            ));
        }
        if regions.is_empty() {
            regions.push(AxialRegion::rodded("bundle", 0.0, length));
        }
        regions.sort_by(|a, b| a.z_lo.total_cmp(&b.z_lo));

        let mut cursor = 0.0;
        for r in &regions {
            if !(r.z_lo.is_finite() && r.z_hi.is_finite() && r.z_hi > r.z_lo) {
                return Err(GeometryError::invalid(
                    assembly,
                    format!("region '{}' has an empty or non-finite range", r.name),
                ));
            }
            if r.z_lo < cursor - AXIAL_TOL {
                return Err(GeometryError::invalid(
                    assembly,
                    format!("region '{}' overlaps the region below it at z = {}", r.name, r.z_lo),
                ));
            }
            if r.z_lo > cursor + AXIAL_TOL {
                return Err(GeometryError::invalid(
                    assembly,
                    format!("axial gap between z = {} and z = {}", cursor, r.z_lo),
                ));
            }
            if let Some(f) = r.coolant_fraction
                && !(f > 0.0 && f <= 1.0)
            {
                return Err(GeometryError::invalid(
                    assembly,
                    format!("region '{}' coolant fraction {} outside (0, 1]", r.name, f),
                ));
            }
            if let Some(dh) = r.hydraulic_diameter
                && !(dh.is_finite() && dh > 0.0)
            {
                return Err(GeometryError::invalid(
                    assembly,
                    format!("region '{}' hydraulic diameter must be positive", r.name),
                ));
            }
            cursor = r.z_hi;
        }
        if (cursor - length).abs() > AXIAL_TOL {
            return Err(GeometryError::invalid(
                assembly,
                format!("regions end at z = {} but the assembly is {} long", cursor, length),
            ));
        }
        Ok(Self { regions, length })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AxialRegion> {
        self.regions.iter()
    }

    pub fn get(&self, index: usize) -> Option<&AxialRegion> {
        self.regions.get(index)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    /// Covered segments with touching neighbors merged.
    pub fn coverage(&self) -> Vec<(f64, f64)> {
        let mut out: Vec<(f64, f64)> = Vec::new();
        for r in &self.regions {
            match out.last_mut() {
                Some(last) if (r.z_lo - last.1).abs() <= AXIAL_TOL => last.1 = r.z_hi,
                _ => out.push((r.z_lo, r.z_hi)),
            }
        }
        out
    }

    /// Index of the region holding `z`; the top end maps to the last region.
    pub fn index_at(&self, z: f64) -> usize {
        self.regions
            .iter()
            .position(|r| r.contains(z))
            .unwrap_or(self.regions.len().saturating_sub(1))
    }

    /// Every region boundary including 0 and the length.
    pub fn boundaries(&self) -> Vec<f64> {
        let mut b: Vec<f64> = self.regions.iter().map(|r| r.z_lo).collect();
        b.push(self.length);
        b
    }
}

/// A localized pressure loss at one axial position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpacerGrid {
    pub z: f64,
    pub loss: SpacerGridLoss,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_region_spans_length() {
        let regions = AxialRegions::new("a", vec![], 2.0).unwrap();
        assert_eq!(regions.coverage(), vec![(0.0, 2.0)]);
        assert!(regions.get(0).unwrap().is_rodded());
    }

    #[test]
    fn unsorted_regions_are_ordered() {
        let regions = AxialRegions::new(
            "a",
            vec![
                AxialRegion::lumped("upper", 1.5, 2.0, 0.3),
                AxialRegion::rodded("core", 0.5, 1.5),
                AxialRegion::lumped("lower", 0.0, 0.5, 0.25),
            ],
            2.0,
        )
        .unwrap();
        let names: Vec<_> = regions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["lower", "core", "upper"]);
        assert_eq!(regions.index_at(0.5), 1);
        assert_eq!(regions.index_at(2.0), 2);
    }

    #[test]
    fn overlap_and_gap_rejected() {
        let overlap = AxialRegions::new(
            "a",
            vec![
                AxialRegion::rodded("x", 0.0, 1.1),
                AxialRegion::rodded("y", 1.0, 2.0),
            ],
            2.0,
        );
        assert!(matches!(overlap, Err(GeometryError::InvalidGeometry { .. })));

        let gap = AxialRegions::new(
            "a",
            vec![
                AxialRegion::rodded("x", 0.0, 0.9),
                AxialRegion::rodded("y", 1.0, 2.0),
            ],
            2.0,
        );
        assert!(gap.is_err());

        let short = AxialRegions::new("a", vec![AxialRegion::rodded("x", 0.0, 1.9)], 2.0);
        assert!(short.is_err());
    }

    #[test]
    fn coolant_fraction_bounds() {
        let bad = AxialRegions::new("a", vec![AxialRegion::lumped("x", 0.0, 1.0, 1.2)], 1.0);
        assert!(bad.is_err());
        let plugged = AxialRegions::new("a", vec![AxialRegion::lumped("x", 0.0, 1.0, 0.0)], 1.0);
        assert!(plugged.is_err());
        let open = AxialRegions::new("a", vec![AxialRegion::lumped("x", 0.0, 1.0, 1.0)], 1.0);
        assert!(open.is_ok());
    }
}
