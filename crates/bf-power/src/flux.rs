//! Flux-based power sources.
//!
//! Reading neutronics output is left to implementors of `FluxSource`; this
//! module only turns fluxes into deposited power.

use crate::error::{PowerError, PowerResult};
use crate::field::validate_edges;

/// Scalar neutron and gamma flux of one assembly on its axial mesh.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyFlux {
    pub z_edges: Vec<f64>,
    /// Per interval.
    pub neutron: Vec<f64>,
    /// Per interval.
    pub gamma: Vec<f64>,
    /// Optional relative pin powers; normalized to a mean of one on use.
    pub pin_weights: Option<Vec<f64>>,
}

impl AssemblyFlux {
    pub(crate) fn validate(&self, assembly: usize, n_pins: usize) -> PowerResult<()> {
        validate_edges(&self.z_edges)?;
        let n = self.z_edges.len() - 1;
        if self.neutron.len() != n || self.gamma.len() != n {
            return Err(PowerError::PowerIndexMismatch {
                what: format!(
                    "assembly {}: flux has {}/{} values for {} axial intervals",
                    assembly,
                    self.neutron.len(),
                    self.gamma.len(),
                    n
                ),
            });
        }
        if let Some(w) = &self.pin_weights
            && w.len() != n_pins
        {
            return Err(PowerError::PowerIndexMismatch {
                what: format!(
                    "assembly {}: {} pin weights for {} pins",
                    assembly,
                    w.len(),
                    n_pins
                ),
            });
        }
        Ok(())
    }
}

/// Boundary collaborator supplying flux per assembly in core order.
pub trait FluxSource {
    /// Number of assemblies the source covers.
    fn assemblies(&self) -> usize;

    /// Flux of assembly `index`; `None` for assemblies without flux data.
    fn flux(&self, index: usize) -> PowerResult<Option<AssemblyFlux>>;
}

/// In-memory flux source.
#[derive(Debug, Clone, Default)]
pub struct StaticFlux {
    pub assemblies: Vec<Option<AssemblyFlux>>,
}

impl FluxSource for StaticFlux {
    fn assemblies(&self) -> usize {
        self.assemblies.len()
    }

    fn flux(&self, index: usize) -> PowerResult<Option<AssemblyFlux>> {
        Ok(self.assemblies.get(index).cloned().flatten())
    }
}

/// Volumetric heating per unit flux for one material class [W/m³ per flux unit].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MaterialHeating {
    pub neutron: f64,
    pub gamma: f64,
}

impl MaterialHeating {
    pub fn power_density(&self, neutron: f64, gamma: f64) -> f64 {
        self.neutron * neutron + self.gamma * gamma
    }
}

/// Heating coefficients for the fuel, structure and coolant classes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeatingCoefficients {
    pub fuel: MaterialHeating,
    pub structure: MaterialHeating,
    pub coolant: MaterialHeating,
}

impl HeatingCoefficients {
    pub fn validate(&self) -> PowerResult<()> {
        let all = [self.fuel, self.structure, self.coolant];
        if all
            .iter()
            .any(|h| !(h.neutron.is_finite() && h.gamma.is_finite() && h.neutron >= 0.0 && h.gamma >= 0.0))
        {
            return Err(PowerError::InvalidData {
                what: "heating coefficients must be finite and non-negative".into(),
            });
        }
        Ok(())
    }
}
