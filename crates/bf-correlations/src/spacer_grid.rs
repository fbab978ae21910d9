//! Localized pressure loss at spacer grids.

use crate::common::{MIN_REYNOLDS, check_finite};
use crate::error::{CorrelationError, CorrelationFamily, CorrelationResult};

/// Grid solidity used when a grid does not specify one.
pub const DEFAULT_SOLIDITY: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpacerGridModel {
    /// Rehme: `K = Cv·ε²`.
    #[default]
    Rehme,
    /// Fixed loss coefficient.
    Constant,
}

impl SpacerGridModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "REH" => Ok(Self::Rehme),
            "CONST" => Ok(Self::Constant),
            _ => Err(CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::SpacerGrid,
                name: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Rehme => "REH",
            Self::Constant => "CONST",
        }
    }
}

/// Loss model of one grid, resolved at build time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpacerGridLoss {
    Rehme { solidity: f64 },
    Constant { k: f64 },
}

impl SpacerGridLoss {
    /// Resolve a grid from its correlation name and optional parameters.
    pub fn new(
        model: SpacerGridModel,
        solidity: Option<f64>,
        loss_coefficient: Option<f64>,
    ) -> CorrelationResult<Self> {
        match model {
            SpacerGridModel::Rehme => {
                let solidity = solidity.unwrap_or(DEFAULT_SOLIDITY);
                if !(solidity > 0.0 && solidity < 1.0) {
                    return Err(CorrelationError::InvalidArg {
                        what: "grid solidity must lie in (0, 1)",
                    });
                }
                Ok(Self::Rehme { solidity })
            }
            SpacerGridModel::Constant => match loss_coefficient {
                Some(k) if k.is_finite() && k >= 0.0 => Ok(Self::Constant { k }),
                _ => Err(CorrelationError::InvalidArg {
                    what: "constant grid loss needs a non-negative loss coefficient",
                }),
            },
        }
    }

    pub fn model(&self) -> SpacerGridModel {
        match self {
            Self::Rehme { .. } => SpacerGridModel::Rehme,
            Self::Constant { .. } => SpacerGridModel::Constant,
        }
    }

    /// Loss coefficient K at bundle Reynolds number `re`.
    pub fn coefficient(&self, re: f64) -> CorrelationResult<f64> {
        let k = match *self {
            Self::Rehme { solidity } => {
                let re = re.max(MIN_REYNOLDS);
                let cv = 3.5 + 73.14 / re.powf(0.264) + 2.79e10 / re.powf(2.79);
                cv * solidity * solidity
            }
            Self::Constant { k } => k,
        };
        check_finite(k, "spacer grid loss coefficient")?;
        Ok(k)
    }

    /// Pressure drop `K·ρU²/2` [Pa].
    pub fn pressure_drop(&self, re: f64, rho: f64, velocity: f64) -> CorrelationResult<f64> {
        Ok(self.coefficient(re)? * 0.5 * rho * velocity * velocity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_solidity_applies() {
        let g = SpacerGridLoss::new(SpacerGridModel::Rehme, None, None).unwrap();
        assert_eq!(
            g,
            SpacerGridLoss::Rehme {
                solidity: DEFAULT_SOLIDITY
            }
        );
    }

    #[test]
    fn rehme_loss_falls_with_reynolds() {
        let g = SpacerGridLoss::new(SpacerGridModel::Rehme, Some(0.5), None).unwrap();
        assert!(g.coefficient(1.0e4).unwrap() > g.coefficient(1.0e5).unwrap());
    }

    #[test]
    fn constant_grid_needs_coefficient() {
        assert!(SpacerGridLoss::new(SpacerGridModel::Constant, None, None).is_err());
        let g = SpacerGridLoss::new(SpacerGridModel::Constant, None, Some(0.8)).unwrap();
        let dp = g.pressure_drop(5.0e4, 850.0, 2.0).unwrap();
        assert!((dp - 0.8 * 0.5 * 850.0 * 4.0).abs() < 1e-9);
    }

    #[test]
    fn solidity_out_of_range_rejected() {
        assert!(SpacerGridLoss::new(SpacerGridModel::Rehme, Some(1.2), None).is_err());
    }
}
