//! Radial pin descriptions.
//!
//! An assembly carries at most one of two descriptions: a fuel model
//! (metallic fuel slug, bond and porosity) or a pin model (explicit radial
//! zones inside the cladding). Materials are referenced by name and resolved
//! when the assembly is built.

use crate::error::{GeometryError, GeometryResult};

/// Metallic fuel slug inside the cladding.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelModel {
    pub fuel_material: String,
    /// Material filling the fuel-clad gap.
    pub bond_material: String,
    /// Radial fuel-clad gap thickness [m].
    pub gap_thickness: f64,
    /// Fuel porosity, in `[0, 1)`.
    pub porosity: f64,
    /// Radius of a central void, as a fraction of the fuel radius.
    pub annulus_fraction: f64,
}

impl Default for FuelModel {
    fn default() -> Self {
        Self {
            fuel_material: "u10zr".to_string(),
            bond_material: "sodium".to_string(),
            gap_thickness: 0.0,
            porosity: 0.0,
            annulus_fraction: 0.0,
        }
    }
}

/// One annular zone of a `PinModel`.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialZone {
    pub material: String,
    /// Outer radius as a fraction of the clad inner radius.
    pub outer_fraction: f64,
}

/// Explicit radial zones, innermost first. The last zone reaches the clad.
#[derive(Debug, Clone, PartialEq)]
pub struct PinModel {
    pub zones: Vec<RadialZone>,
}

/// Validated pin internals of one assembly.
#[derive(Debug, Clone, PartialEq)]
pub enum PinInternals {
    Fuel(FuelModel),
    Zones(PinModel),
}

impl PinInternals {
    /// Pick the single configured description; both at once is an error.
    pub fn select(
        assembly: &str,
        fuel: Option<FuelModel>,
        pin: Option<PinModel>,
    ) -> GeometryResult<Option<Self>> {
        match (fuel, pin) {
            (Some(_), Some(_)) => Err(GeometryError::ConflictingPinModel {
                assembly: assembly.to_string(),
            }),
            (Some(f), None) => Ok(Some(PinInternals::Fuel(f))),
            (None, Some(p)) => Ok(Some(PinInternals::Zones(p))),
            (None, None) => Ok(None),
        }
    }

    pub(crate) fn validate(&self, assembly: &str, clad_inner_radius: f64) -> GeometryResult<()> {
        match self {
            PinInternals::Fuel(f) => {
                if !(f.porosity >= 0.0 && f.porosity < 1.0) {
                    return Err(GeometryError::invalid(
                        assembly,
                        format!("fuel porosity {} outside [0, 1)", f.porosity),
                    ));
                }
                if !(f.gap_thickness >= 0.0 && f.gap_thickness < clad_inner_radius) {
                    return Err(GeometryError::invalid(
                        assembly,
                        "fuel-clad gap must be non-negative and smaller than the clad inner radius",
                    ));
                }
                if !(f.annulus_fraction >= 0.0 && f.annulus_fraction < 1.0) {
                    return Err(GeometryError::invalid(
                        assembly,
                        "fuel annulus fraction outside [0, 1)",
                    ));
                }
            }
            PinInternals::Zones(p) => {
                if p.zones.is_empty() {
                    return Err(GeometryError::invalid(assembly, "pin model has no zones"));
                }
                let mut last = 0.0;
                for zone in &p.zones {
                    if !(zone.outer_fraction > last && zone.outer_fraction <= 1.0 + 1e-9) {
                        return Err(GeometryError::invalid(
                            assembly,
                            format!(
                                "pin zone '{}' outer fraction {} not increasing within (0, 1]",
                                zone.material, zone.outer_fraction
                            ),
                        ));
                    }
                    last = zone.outer_fraction;
                }
                if (last - 1.0).abs() > 1e-6 {
                    return Err(GeometryError::invalid(
                        assembly,
                        "outermost pin zone must reach the clad inner radius",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Names of every material the description references.
    pub fn materials(&self) -> Vec<&str> {
        match self {
            PinInternals::Fuel(f) => vec![f.fuel_material.as_str(), f.bond_material.as_str()],
            PinInternals::Zones(p) => p.zones.iter().map(|z| z.material.as_str()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zones() -> PinModel {
        PinModel {
            zones: vec![
                RadialZone {
                    material: "u10zr".into(),
                    outer_fraction: 0.8,
                },
                RadialZone {
                    material: "sodium".into(),
                    outer_fraction: 1.0,
                },
            ],
        }
    }

    #[test]
    fn both_models_conflict() {
        let err = PinInternals::select("a1", Some(FuelModel::default()), Some(zones())).unwrap_err();
        assert_eq!(
            err,
            GeometryError::ConflictingPinModel {
                assembly: "a1".into()
            }
        );
    }

    #[test]
    fn neither_model_is_allowed() {
        assert_eq!(PinInternals::select("a1", None, None).unwrap(), None);
    }

    #[test]
    fn zones_must_reach_clad() {
        let mut p = zones();
        p.zones[1].outer_fraction = 0.9;
        assert!(PinInternals::Zones(p).validate("a1", 0.003).is_err());
        assert!(PinInternals::Zones(zones()).validate("a1", 0.003).is_ok());
    }

    #[test]
    fn porosity_bounds() {
        let f = FuelModel {
            porosity: 1.0,
            ..FuelModel::default()
        };
        assert!(PinInternals::Fuel(f).validate("a1", 0.003).is_err());
    }
}
