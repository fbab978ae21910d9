//! Material model trait and the property pack returned to solvers.

use crate::error::{MaterialError, MaterialResult};
use bf_core::units::{Density, DynVisc, Temperature, kgpm3, pas};
use std::fmt;

/// Specific heat capacity [J/(kg·K)].
pub type SpecHeatCapacity = f64;

/// Thermal conductivity [W/(m·K)].
///
/// Kept as plain f64 like the heat capacity; the solver works on raw values
/// inside its marching loop anyway.
pub type Conductivity = f64;

/// Physical phase of a material over its working range.
///
/// Solids are not required to report a viscosity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Liquid,
    Solid,
}

/// Plain SI property values as produced by a model.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawProperties {
    /// Density [kg/m³]
    pub rho: f64,
    /// Specific heat [J/(kg·K)]
    pub cp: f64,
    /// Thermal conductivity [W/(m·K)]
    pub k: f64,
    /// Dynamic viscosity [Pa·s]
    pub mu: f64,
}

/// Properties at one temperature.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Properties {
    pub density: Density,
    pub heat_capacity: SpecHeatCapacity,
    pub conductivity: Conductivity,
    pub viscosity: DynVisc,
}

impl Properties {
    pub fn from_raw(raw: RawProperties) -> Self {
        Self {
            density: kgpm3(raw.rho),
            heat_capacity: raw.cp,
            conductivity: raw.k,
            viscosity: pas(raw.mu),
        }
    }

    pub fn raw(&self) -> RawProperties {
        RawProperties {
            rho: self.density.value,
            cp: self.heat_capacity,
            k: self.conductivity,
            mu: self.viscosity.value,
        }
    }

    /// Prandtl number cp·μ/k.
    pub fn prandtl(&self) -> f64 {
        self.heat_capacity * self.viscosity.value / self.conductivity
    }
}

/// Whether an evaluation fell inside the model's validated range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RangeStatus {
    InRange,
    /// Value was extrapolated outside `[lo, hi]`.
    Extrapolated { lo: f64, hi: f64 },
}

/// Result of a property query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyEval {
    pub properties: Properties,
    pub range: RangeStatus,
}

impl PropertyEval {
    pub fn is_extrapolated(&self) -> bool {
        matches!(self.range, RangeStatus::Extrapolated { .. })
    }

    /// The non-fatal `OutOfRange` error describing this evaluation, if any.
    pub fn out_of_range(&self, material: &str, t: Temperature) -> Option<MaterialError> {
        match self.range {
            RangeStatus::InRange => None,
            RangeStatus::Extrapolated { lo, hi } => Some(MaterialError::OutOfRange {
                material: material.to_string(),
                t: t.value,
                lo,
                hi,
            }),
        }
    }
}

/// Temperature-dependent property model.
///
/// Implementations must be pure functions of temperature.
pub trait MaterialModel: Send + Sync + fmt::Debug {
    /// Evaluate all properties at `t_k` [K]. No range checking.
    fn evaluate(&self, t_k: f64) -> RawProperties;

    /// Validated temperature range [K], if the model documents one.
    fn valid_range(&self) -> Option<(f64, f64)>;

    fn phase(&self) -> Phase {
        Phase::Liquid
    }

    /// Short label of the model kind, e.g. "built-in" or "table".
    fn kind(&self) -> &'static str;
}

/// A named, resolved material.
///
/// Immutable after construction and shared across assemblies through `Arc`.
#[derive(Debug)]
pub struct Material {
    name: String,
    model: Box<dyn MaterialModel>,
}

impl Material {
    pub fn new(name: impl Into<String>, model: impl MaterialModel + 'static) -> Self {
        Self {
            name: name.into(),
            model: Box::new(model),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.model.phase()
    }

    pub fn kind(&self) -> &'static str {
        self.model.kind()
    }

    pub fn valid_range(&self) -> Option<(f64, f64)> {
        self.model.valid_range()
    }

    /// Evaluate properties at temperature `t`.
    ///
    /// Outside the validated range the extrapolated value is returned with
    /// `RangeStatus::Extrapolated`. Fails only when the value is non-physical.
    pub fn properties(&self, t: Temperature) -> MaterialResult<PropertyEval> {
        let t_k = t.value;
        if !t_k.is_finite() || t_k <= 0.0 {
            return Err(MaterialError::NonPhysical {
                material: self.name.clone(),
                what: "temperature",
                t: t_k,
            });
        }

        let raw = self.model.evaluate(t_k);
        validation::validate_raw(&self.name, raw, self.model.phase(), t_k)?;

        let range = match self.model.valid_range() {
            Some((lo, hi)) if t_k < lo || t_k > hi => RangeStatus::Extrapolated { lo, hi },
            _ => RangeStatus::InRange,
        };

        Ok(PropertyEval {
            properties: Properties::from_raw(raw),
            range,
        })
    }
}

pub(crate) mod validation {
    use super::{Phase, RawProperties};
    use crate::error::{MaterialError, MaterialResult};

    fn positive(material: &str, what: &'static str, v: f64, t: f64) -> MaterialResult<()> {
        if v.is_finite() && v > 0.0 {
            Ok(())
        } else {
            Err(MaterialError::NonPhysical {
                material: material.to_string(),
                what,
                t,
            })
        }
    }

    pub fn validate_raw(
        material: &str,
        raw: RawProperties,
        phase: Phase,
        t: f64,
    ) -> MaterialResult<()> {
        positive(material, "density", raw.rho, t)?;
        positive(material, "specific heat", raw.cp, t)?;
        positive(material, "thermal conductivity", raw.k, t)?;
        if phase == Phase::Liquid {
            positive(material, "viscosity", raw.mu, t)?;
        }
        Ok(())
    }
}
