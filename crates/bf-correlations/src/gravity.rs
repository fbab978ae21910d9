//! Gravity head loss.

use crate::error::{CorrelationError, CorrelationFamily, CorrelationResult};
use bf_core::units::constants::G0_MPS2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GravityModel {
    #[default]
    Off,
    On,
}

impl GravityModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "OFF" | "NONE" => Ok(Self::Off),
            "ON" => Ok(Self::On),
            _ => Err(CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::Gravity,
                name: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Off => "OFF",
            Self::On => "ON",
        }
    }

    /// `ρ·g·Δz` for upward flow when enabled, otherwise zero [Pa].
    pub fn head_loss(self, rho: f64, dz: f64) -> f64 {
        match self {
            Self::Off => 0.0,
            Self::On => rho * G0_MPS2 * dz,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn head_loss_only_when_enabled() {
        assert_eq!(GravityModel::Off.head_loss(850.0, 0.01), 0.0);
        let dp = GravityModel::On.head_loss(850.0, 0.01);
        assert!((dp - 850.0 * 9.806_65 * 0.01).abs() < 1e-9);
        assert_eq!(GravityModel::from_name("on").unwrap(), GravityModel::On);
    }
}
