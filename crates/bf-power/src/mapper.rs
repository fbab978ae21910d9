//! Assemble a `PowerField` from the configured sources.

use tracing::{debug, info};

use crate::error::{PowerError, PowerResult};
use crate::field::{AssemblyPower, PowerField};
use crate::flux::{AssemblyFlux, FluxSource, HeatingCoefficients};
use crate::table::PowerTable;

/// What the mapper needs to know about each assembly in core order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AssemblyLayout {
    pub n_pins: usize,
    pub length: f64,
    /// Fuel cross-section of all pins [m²].
    pub fuel_area: f64,
    /// Clad and wire cross-section of all pins [m²].
    pub clad_area: f64,
    /// Duct wall cross-section [m²].
    pub duct_area: f64,
    /// Coolant cross-section [m²].
    pub coolant_area: f64,
}

/// Maps flux and tabulated sources onto the core.
///
/// Tabulated rows take precedence over flux data for any assembly they
/// mention. Assemblies covered by neither source are unheated.
pub struct PowerMapper<'a> {
    layouts: &'a [AssemblyLayout],
    flux: Option<(&'a dyn FluxSource, HeatingCoefficients)>,
    table: Option<&'a PowerTable>,
    total_power: Option<f64>,
    scaling_factor: f64,
}

impl<'a> PowerMapper<'a> {
    pub fn new(layouts: &'a [AssemblyLayout]) -> Self {
        Self {
            layouts,
            flux: None,
            table: None,
            total_power: None,
            scaling_factor: 1.0,
        }
    }

    pub fn flux(mut self, source: &'a dyn FluxSource, coefficients: HeatingCoefficients) -> Self {
        self.flux = Some((source, coefficients));
        self
    }

    pub fn table(mut self, table: &'a PowerTable) -> Self {
        self.table = Some(table);
        self
    }

    /// Renormalize the mapped field to this core power [W].
    pub fn total_power(mut self, watts: f64) -> Self {
        self.total_power = Some(watts);
        self
    }

    /// Multiplier applied after normalization.
    pub fn scaling_factor(mut self, factor: f64) -> Self {
        self.scaling_factor = factor;
        self
    }

    pub fn build(self) -> PowerResult<PowerField> {
        if !(self.scaling_factor.is_finite() && self.scaling_factor >= 0.0) {
            return Err(PowerError::InvalidData {
                what: format!("power scaling factor {}", self.scaling_factor),
            });
        }
        let pins: Vec<usize> = self.layouts.iter().map(|l| l.n_pins).collect();
        let tabulated = match self.table {
            Some(t) => {
                t.validate(&pins)?;
                t.assemblies()
            }
            None => Default::default(),
        };
        if let Some((source, coefficients)) = self.flux {
            coefficients.validate()?;
            if source.assemblies() != self.layouts.len() {
                return Err(PowerError::PowerIndexMismatch {
                    what: format!(
                        "flux source covers {} assemblies, core has {}",
                        source.assemblies(),
                        self.layouts.len()
                    ),
                });
            }
        }

        let mut assemblies = Vec::with_capacity(self.layouts.len());
        for (index, layout) in self.layouts.iter().enumerate() {
            let power = match (self.table, self.flux) {
                (Some(table), _) if tabulated.contains(&index) => {
                    debug!(assembly = index, "power from table");
                    from_table(table, index, layout)?
                }
                (_, Some((source, coefficients))) => match source.flux(index)? {
                    Some(flux) => {
                        debug!(assembly = index, "power from flux");
                        flux.validate(index, layout.n_pins)?;
                        from_flux(&flux, &coefficients, layout)?
                    }
                    None => AssemblyPower::zero(layout.n_pins, layout.length),
                },
                _ => AssemblyPower::zero(layout.n_pins, layout.length),
            };
            assemblies.push(power);
        }
        let mut field = PowerField::new(assemblies);

        if let Some(target) = self.total_power {
            if !(target.is_finite() && target >= 0.0) {
                return Err(PowerError::InvalidData {
                    what: format!("total core power {}", target),
                });
            }
            let mapped = field.total_power();
            if mapped <= 0.0 {
                if target > 0.0 {
                    return Err(PowerError::ZeroPower { target });
                }
            } else {
                let renorm = target / mapped;
                info!(mapped, target, renorm, "normalizing core power");
                field.scale(renorm);
            }
        }
        if self.scaling_factor != 1.0 {
            info!(factor = self.scaling_factor, "scaling core power");
            field.scale(self.scaling_factor);
        }
        Ok(field)
    }
}

fn from_table(table: &PowerTable, index: usize, layout: &AssemblyLayout) -> PowerResult<AssemblyPower> {
    let n = table.n_axial();
    let split = table.split;
    let mut pin = vec![0.0; layout.n_pins * n];
    let mut coolant = vec![0.0; n];
    let mut duct = vec![0.0; n];
    for row in table.rows.iter().filter(|r| r.assembly == index) {
        pin[row.pin * n + row.axial] = row.linear_power * split.pin();
        coolant[row.axial] += row.linear_power * split.coolant;
        duct[row.axial] += row.linear_power * split.duct;
    }
    let fuel_share = if split.pin() > 0.0 {
        split.fuel / split.pin()
    } else {
        1.0
    };
    AssemblyPower::new(
        table.z_edges.clone(),
        layout.n_pins,
        pin,
        coolant,
        duct,
        fuel_share,
    )
}

fn from_flux(
    flux: &AssemblyFlux,
    coefficients: &HeatingCoefficients,
    layout: &AssemblyLayout,
) -> PowerResult<AssemblyPower> {
    let n = flux.z_edges.len() - 1;
    let n_pins = layout.n_pins.max(1);
    let weights = match &flux.pin_weights {
        Some(w) => {
            let sum: f64 = w.iter().sum();
            if !(sum > 0.0) || w.iter().any(|x| !x.is_finite() || *x < 0.0) {
                return Err(PowerError::InvalidData {
                    what: "pin weights must be non-negative with a positive sum".into(),
                });
            }
            w.iter().map(|x| x * n_pins as f64 / sum).collect()
        }
        None => vec![1.0; layout.n_pins],
    };

    let mut pin = vec![0.0; layout.n_pins * n];
    let mut coolant = vec![0.0; n];
    let mut duct = vec![0.0; n];
    let (mut fuel_total, mut pin_total) = (0.0, 0.0);
    for j in 0..n {
        let (phi_n, phi_g) = (flux.neutron[j], flux.gamma[j]);
        let q_fuel = coefficients.fuel.power_density(phi_n, phi_g) * layout.fuel_area;
        let structure = coefficients.structure.power_density(phi_n, phi_g);
        let q_clad = structure * layout.clad_area;
        duct[j] = structure * layout.duct_area;
        coolant[j] = coefficients.coolant.power_density(phi_n, phi_g) * layout.coolant_area;

        let per_pin = (q_fuel + q_clad) / n_pins as f64;
        for (i, w) in weights.iter().enumerate() {
            pin[i * n + j] = per_pin * w;
        }
        let dz = flux.z_edges[j + 1] - flux.z_edges[j];
        fuel_total += q_fuel * dz;
        pin_total += (q_fuel + q_clad) * dz;
    }
    let fuel_share = if pin_total > 0.0 {
        fuel_total / pin_total
    } else {
        1.0
    };
    AssemblyPower::new(
        flux.z_edges.clone(),
        layout.n_pins,
        pin,
        coolant,
        duct,
        fuel_share,
    )
}
