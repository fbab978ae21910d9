//! Nusselt number correlations for pin-to-coolant and duct-to-coolant
//! convection.

use crate::error::{CorrelationError, CorrelationFamily, CorrelationResult};

/// Local flow state for a Nusselt evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NusseltInput {
    pub reynolds: f64,
    pub prandtl: f64,
    pub p_over_d: f64,
}

impl NusseltInput {
    pub fn peclet(&self) -> f64 {
        self.reynolds * self.prandtl
    }
}

pub type NusseltFn = fn(NusseltInput) -> f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NusseltModel {
    DittusBoelter,
    Lyon,
    SebanShimazaki,
    #[default]
    Mikityuk,
}

impl NusseltModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        parse(name).ok_or_else(|| CorrelationError::UnsupportedCorrelation {
            family: CorrelationFamily::Nusselt,
            name: name.to_string(),
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::DittusBoelter => "DB",
            Self::Lyon => "LYON",
            Self::SebanShimazaki => "SS",
            Self::Mikityuk => "MIK",
        }
    }

    pub fn function(self) -> NusseltFn {
        match self {
            Self::DittusBoelter => dittus_boelter,
            Self::Lyon => lyon,
            Self::SebanShimazaki => seban_shimazaki,
            Self::Mikityuk => mikityuk,
        }
    }
}

/// Duct-wall heat transfer; Mikityuk is a bundle correlation and is not offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuctHtcModel {
    DittusBoelter,
    Lyon,
    #[default]
    SebanShimazaki,
}

impl DuctHtcModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        match parse(name) {
            Some(NusseltModel::DittusBoelter) => Ok(Self::DittusBoelter),
            Some(NusseltModel::Lyon) => Ok(Self::Lyon),
            Some(NusseltModel::SebanShimazaki) => Ok(Self::SebanShimazaki),
            Some(NusseltModel::Mikityuk) | None => {
                Err(CorrelationError::UnsupportedCorrelation {
                    family: CorrelationFamily::DuctHtc,
                    name: name.to_string(),
                })
            }
        }
    }

    pub fn name(self) -> &'static str {
        self.as_nusselt().name()
    }

    pub fn function(self) -> NusseltFn {
        self.as_nusselt().function()
    }

    fn as_nusselt(self) -> NusseltModel {
        match self {
            Self::DittusBoelter => NusseltModel::DittusBoelter,
            Self::Lyon => NusseltModel::Lyon,
            Self::SebanShimazaki => NusseltModel::SebanShimazaki,
        }
    }
}

fn parse(name: &str) -> Option<NusseltModel> {
    match name.trim().to_ascii_uppercase().as_str() {
        "DB" | "DITTUS-BOELTER" => Some(NusseltModel::DittusBoelter),
        "LYON" => Some(NusseltModel::Lyon),
        "SS" | "SEBAN-SHIMAZAKI" => Some(NusseltModel::SebanShimazaki),
        "MIK" | "MIKITYUK" => Some(NusseltModel::Mikityuk),
        _ => None,
    }
}

fn dittus_boelter(i: NusseltInput) -> f64 {
    0.023 * i.reynolds.max(0.0).powf(0.8) * i.prandtl.max(0.0).powf(0.4)
}

fn lyon(i: NusseltInput) -> f64 {
    7.0 + 0.025 * i.peclet().max(0.0).powf(0.8)
}

fn seban_shimazaki(i: NusseltInput) -> f64 {
    5.0 + 0.025 * i.peclet().max(0.0).powf(0.8)
}

fn mikityuk(i: NusseltInput) -> f64 {
    let x = i.p_over_d;
    0.047 * (1.0 - (-3.8 * (x - 1.0)).exp()) * (i.peclet().max(0.0).powf(0.77) + 250.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn input(pe: f64) -> NusseltInput {
        NusseltInput {
            reynolds: pe / 0.005,
            prandtl: 0.005,
            p_over_d: 1.2,
        }
    }

    #[test]
    fn liquid_metal_correlations_have_conduction_floor() {
        let lo = input(0.0);
        assert_relative_eq!(NusseltModel::Lyon.function()(lo), 7.0);
        assert_relative_eq!(NusseltModel::SebanShimazaki.function()(lo), 5.0);
        let mik = NusseltModel::Mikityuk.function()(lo);
        assert_relative_eq!(mik, 0.047 * (1.0 - (-0.76f64).exp()) * 250.0);
    }

    #[test]
    fn nusselt_grows_with_peclet() {
        for model in [
            NusseltModel::DittusBoelter,
            NusseltModel::Lyon,
            NusseltModel::SebanShimazaki,
            NusseltModel::Mikityuk,
        ] {
            let f = model.function();
            assert!(f(input(500.0)) > f(input(50.0)), "{}", model.name());
        }
    }

    #[test]
    fn duct_htc_rejects_bundle_only_models() {
        assert!(DuctHtcModel::from_name("MIK").is_err());
        assert_eq!(DuctHtcModel::from_name("db").unwrap(), DuctHtcModel::DittusBoelter);
        assert_eq!(DuctHtcModel::default().name(), "SS");
    }
}
