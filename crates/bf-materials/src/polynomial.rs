//! User-supplied polynomial property model.

use crate::error::{MaterialError, MaterialResult};
use crate::model::{MaterialModel, Phase, RawProperties};

/// `property(T) = Σ cᵢ·Tⁱ` for each property, T in kelvin.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialModel {
    pub density: Vec<f64>,
    pub heat_capacity: Vec<f64>,
    pub conductivity: Vec<f64>,
    /// Empty for solids.
    pub viscosity: Vec<f64>,
    pub range: Option<(f64, f64)>,
}

fn horner(coeffs: &[f64], t: f64) -> f64 {
    coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
}

impl PolynomialModel {
    /// Check that the mandatory coefficient lists are present and finite.
    pub fn validate(&self, name: &str) -> MaterialResult<()> {
        let invalid = |what: &str| MaterialError::InvalidDefinition {
            material: name.to_string(),
            what: what.to_string(),
        };

        for (what, coeffs) in [
            ("density", &self.density),
            ("heat_capacity", &self.heat_capacity),
            ("conductivity", &self.conductivity),
        ] {
            if coeffs.is_empty() {
                return Err(invalid(&format!("missing {what} coefficients")));
            }
        }
        let all = self
            .density
            .iter()
            .chain(&self.heat_capacity)
            .chain(&self.conductivity)
            .chain(&self.viscosity);
        if all.into_iter().any(|c| !c.is_finite()) {
            return Err(invalid("non-finite coefficient"));
        }
        if let Some((lo, hi)) = self.range
            && !(lo.is_finite() && hi.is_finite() && lo < hi)
        {
            return Err(invalid("range must satisfy lo < hi"));
        }
        Ok(())
    }
}

impl MaterialModel for PolynomialModel {
    fn evaluate(&self, t_k: f64) -> RawProperties {
        RawProperties {
            rho: horner(&self.density, t_k),
            cp: horner(&self.heat_capacity, t_k),
            k: horner(&self.conductivity, t_k),
            mu: horner(&self.viscosity, t_k),
        }
    }

    fn valid_range(&self) -> Option<(f64, f64)> {
        self.range
    }

    fn phase(&self) -> Phase {
        if self.viscosity.is_empty() {
            Phase::Solid
        } else {
            Phase::Liquid
        }
    }

    fn kind(&self) -> &'static str {
        "polynomial"
    }
}
