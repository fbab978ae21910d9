//! Validating geometry builder.

use bf_correlations::{BundleParams, SpacerGridLoss};

use crate::axial::{AxialRegion, AxialRegions, SpacerGrid};
use crate::bundle::{DuctWall, PinBundle};
use crate::error::{GeometryError, GeometryResult};
use crate::mesh::SubchannelMesh;
use crate::pin::{FuelModel, PinInternals, PinModel};

/// Relative slack allowed when comparing the wire against its clearance.
const WIRE_CLEARANCE_TOL: f64 = 1e-6;

/// Builder for an assembly geometry.
///
/// Collect bundle parameters, duct walls, axial regions, spacer grids and
/// pin internals, then call `build()` to validate and freeze them into an
/// immutable `AssemblyGeometry`.
#[derive(Debug, Default)]
pub struct GeometryBuilder {
    name: String,
    bundle: Option<PinBundle>,
    duct_ftf: Vec<f64>,
    length: Option<f64>,
    regions: Vec<AxialRegion>,
    grids: Vec<SpacerGrid>,
    fuel: Option<FuelModel>,
    pin: Option<PinModel>,
}

impl GeometryBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn bundle(mut self, bundle: PinBundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// Flat-to-flat distances, inner and outer per wall, innermost first.
    pub fn duct_ftf(mut self, ftf: impl IntoIterator<Item = f64>) -> Self {
        self.duct_ftf = ftf.into_iter().collect();
        self
    }

    pub fn length(mut self, length: f64) -> Self {
        self.length = Some(length);
        self
    }

    pub fn region(mut self, region: AxialRegion) -> Self {
        self.regions.push(region);
        self
    }

    pub fn spacer_grid(mut self, z: f64, loss: SpacerGridLoss) -> Self {
        self.grids.push(SpacerGrid { z, loss });
        self
    }

    pub fn fuel_model(mut self, fuel: FuelModel) -> Self {
        self.fuel = Some(fuel);
        self
    }

    pub fn pin_model(mut self, pin: PinModel) -> Self {
        self.pin = Some(pin);
        self
    }

    pub fn build(self) -> GeometryResult<AssemblyGeometry> {
        let name = self.name;
        let pin_internals = PinInternals::select(&name, self.fuel, self.pin)?;

        let bundle = self
            .bundle
            .ok_or_else(|| GeometryError::invalid(&name, "missing pin bundle parameters"))?;
        validate_bundle(&name, &bundle)?;
        let duct = validate_duct(&name, &self.duct_ftf)?;
        validate_clearances(&name, &bundle, duct[0].inner_ftf)?;

        let length = self
            .length
            .ok_or_else(|| GeometryError::invalid(&name, "missing assembly length"))?;
        let regions = AxialRegions::new(&name, self.regions, length)?;

        let mut grids = self.grids;
        for g in &grids {
            if !(g.z >= 0.0 && g.z <= length) {
                return Err(GeometryError::invalid(
                    &name,
                    format!("spacer grid at z = {} outside [0, {}]", g.z, length),
                ));
            }
        }
        grids.sort_by(|a, b| a.z.total_cmp(&b.z));

        if let Some(internals) = &pin_internals {
            internals.validate(&name, bundle.clad_inner_radius())?;
        }

        let mesh = SubchannelMesh::build(&bundle, duct[0].inner_ftf);
        if mesh.subchannels().iter().any(|s| s.area <= 0.0) {
            return Err(GeometryError::invalid(
                &name,
                "non-positive subchannel flow area",
            ));
        }

        Ok(AssemblyGeometry {
            name,
            bundle,
            duct,
            regions,
            grids,
            mesh,
            pin_internals,
        })
    }
}

fn positive(assembly: &str, what: &str, value: f64) -> GeometryResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GeometryError::invalid(
            assembly,
            format!("{} must be finite and positive, got {}", what, value),
        ))
    }
}

fn validate_bundle(name: &str, b: &PinBundle) -> GeometryResult<()> {
    if b.rings == 0 {
        return Err(GeometryError::invalid(name, "bundle needs at least one ring"));
    }
    positive(name, "pin pitch", b.pin_pitch)?;
    positive(name, "pin diameter", b.pin_diameter)?;
    positive(name, "clad thickness", b.clad_thickness)?;
    if b.rings > 1 && b.pin_pitch < b.pin_diameter {
        return Err(GeometryError::invalid(
            name,
            format!(
                "pin pitch {} smaller than pin diameter {}",
                b.pin_pitch, b.pin_diameter
            ),
        ));
    }
    if b.clad_thickness >= b.pin_diameter / 2.0 {
        return Err(GeometryError::invalid(
            name,
            "clad thickness must be smaller than the pin radius",
        ));
    }
    let wire_given = b.wire_diameter != 0.0 || b.wire_pitch != 0.0;
    if wire_given {
        positive(name, "wire diameter", b.wire_diameter)?;
        positive(name, "wire pitch", b.wire_pitch)?;
    }
    Ok(())
}

fn validate_duct(name: &str, ftf: &[f64]) -> GeometryResult<Vec<DuctWall>> {
    if ftf.is_empty() || ftf.len() % 2 != 0 {
        return Err(GeometryError::invalid(
            name,
            format!(
                "duct flat-to-flat list needs inner/outer pairs, got {} values",
                ftf.len()
            ),
        ));
    }
    for &v in ftf {
        positive(name, "duct flat-to-flat", v)?;
    }
    if ftf.windows(2).any(|w| w[1] <= w[0]) {
        return Err(GeometryError::invalid(
            name,
            "duct flat-to-flat values must be strictly increasing",
        ));
    }
    Ok(ftf
        .chunks_exact(2)
        .map(|c| DuctWall {
            inner_ftf: c[0],
            outer_ftf: c[1],
        })
        .collect())
}

fn validate_clearances(name: &str, b: &PinBundle, inner_ftf: f64) -> GeometryResult<()> {
    let wall_gap = inner_ftf / 2.0 - b.outer_row_apothem() - b.pin_diameter / 2.0;
    if wall_gap <= 0.0 {
        return Err(GeometryError::invalid(
            name,
            format!(
                "pins do not fit inside the duct (pin-to-wall gap {:.3e} m)",
                wall_gap
            ),
        ));
    }
    let slack = 1.0 + WIRE_CLEARANCE_TOL;
    if b.wire_diameter > wall_gap * slack {
        return Err(GeometryError::invalid(
            name,
            format!(
                "wire diameter {} exceeds pin-to-wall clearance {}",
                b.wire_diameter, wall_gap
            ),
        ));
    }
    if b.rings > 1 && b.wire_diameter > (b.pin_pitch - b.pin_diameter) * slack {
        return Err(GeometryError::invalid(
            name,
            format!(
                "wire diameter {} exceeds pin-to-pin clearance {}",
                b.wire_diameter,
                b.pin_pitch - b.pin_diameter
            ),
        ));
    }
    Ok(())
}

/// Immutable, validated geometry of one assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyGeometry {
    name: String,
    bundle: PinBundle,
    duct: Vec<DuctWall>,
    regions: AxialRegions,
    grids: Vec<SpacerGrid>,
    mesh: SubchannelMesh,
    pin_internals: Option<PinInternals>,
}

impl AssemblyGeometry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bundle(&self) -> &PinBundle {
        &self.bundle
    }

    pub fn duct(&self) -> &[DuctWall] {
        &self.duct
    }

    pub fn length(&self) -> f64 {
        self.regions.length()
    }

    pub fn regions(&self) -> &AxialRegions {
        &self.regions
    }

    /// Spacer grids sorted by position.
    pub fn grids(&self) -> &[SpacerGrid] {
        &self.grids
    }

    pub fn mesh(&self) -> &SubchannelMesh {
        &self.mesh
    }

    pub fn pin_internals(&self) -> Option<&PinInternals> {
        self.pin_internals.as_ref()
    }

    pub fn n_pins(&self) -> usize {
        self.bundle.n_pins()
    }

    pub fn inner_ftf(&self) -> f64 {
        self.duct.first().map_or(0.0, |d| d.inner_ftf)
    }

    pub fn outer_ftf(&self) -> f64 {
        self.duct.last().map_or(0.0, |d| d.outer_ftf)
    }

    /// Area enclosed by the innermost duct wall [m²].
    pub fn duct_interior_area(&self) -> f64 {
        DuctWall::hex_area(self.inner_ftf())
    }

    /// Total duct wall thickness [m].
    pub fn duct_thickness(&self) -> f64 {
        self.duct.iter().map(DuctWall::thickness).sum()
    }

    /// Coolant flow area of region `index` [m²].
    pub fn flow_area(&self, index: usize) -> f64 {
        match self.regions.get(index).and_then(|r| r.coolant_fraction) {
            Some(fraction) => fraction * self.duct_interior_area(),
            None => self.mesh.total_area(),
        }
    }

    /// Hydraulic diameter of region `index` [m].
    pub fn hydraulic_diameter(&self, index: usize) -> f64 {
        match self.regions.get(index) {
            Some(r) if !r.is_rodded() => r.hydraulic_diameter.unwrap_or_else(|| {
                let perimeter = 6.0 * DuctWall::side_length(self.inner_ftf());
                4.0 * self.flow_area(index) / perimeter
            }),
            _ => self.bundle_params().hydraulic_diameter(),
        }
    }

    /// Summary used by the bundle correlations.
    pub fn bundle_params(&self) -> BundleParams {
        BundleParams {
            n_pins: self.n_pins(),
            pin_pitch: self.bundle.pin_pitch,
            pin_diameter: self.bundle.pin_diameter,
            wire_pitch: self.bundle.wire_pitch,
            wire_diameter: self.bundle.wire_diameter,
            edge_pitch: self.mesh.wall_distance() + self.bundle.pin_diameter / 2.0,
            classes: self.mesh.classes(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle() -> PinBundle {
        PinBundle {
            rings: 5,
            pin_pitch: 0.00726,
            pin_diameter: 0.0063,
            clad_thickness: 0.0005,
            wire_pitch: 0.2032,
            wire_diameter: 0.00094,
        }
    }

    fn builder() -> GeometryBuilder {
        GeometryBuilder::new("fuel")
            .bundle(bundle())
            .duct_ftf([0.0585, 0.0625])
            .length(1.0)
    }

    #[test]
    fn builds_minimal_assembly() {
        let geom = builder().build().unwrap();
        assert_eq!(geom.n_pins(), 61);
        assert_eq!(geom.regions().len(), 1);
        assert!(geom.flow_area(0) > 0.0);
    }

    #[test]
    fn odd_duct_list_rejected() {
        let err = builder().duct_ftf([0.0585]).build().unwrap_err();
        assert!(matches!(err, GeometryError::InvalidGeometry { .. }));
    }

    #[test]
    fn decreasing_duct_rejected() {
        assert!(builder().duct_ftf([0.0625, 0.0585]).build().is_err());
    }

    #[test]
    fn pins_must_fit() {
        assert!(builder().duct_ftf([0.055, 0.060]).build().is_err());
    }

    #[test]
    fn fat_wire_rejected() {
        let mut b = bundle();
        b.wire_diameter = 0.002;
        assert!(builder().bundle(b).build().is_err());
    }

    #[test]
    fn grid_outside_assembly_rejected() {
        let loss = SpacerGridLoss::Constant { k: 0.5 };
        assert!(builder().spacer_grid(1.2, loss).build().is_err());
        let ok = builder()
            .spacer_grid(0.8, loss)
            .spacer_grid(0.2, loss)
            .build()
            .unwrap();
        assert_eq!(ok.grids()[0].z, 0.2);
    }

    #[test]
    fn lumped_region_uses_duct_area() {
        let geom = builder()
            .region(AxialRegion::lumped("shield", 0.0, 0.4, 0.25))
            .region(AxialRegion::rodded("core", 0.4, 1.0))
            .build()
            .unwrap();
        let duct = DuctWall::hex_area(0.0585);
        assert!((geom.flow_area(0) - 0.25 * duct).abs() < 1e-15);
        assert_eq!(geom.flow_area(1), geom.mesh().total_area());
    }

    #[test]
    fn conflicting_pin_model_precedes_other_checks() {
        let err = GeometryBuilder::new("bad")
            .fuel_model(FuelModel::default())
            .pin_model(PinModel { zones: vec![] })
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GeometryError::ConflictingPinModel {
                assembly: "bad".into()
            }
        );
    }
}
