//! Bundle-average Darcy friction factor correlations.

use crate::bundle::{BundleParams, SubchannelType};
use crate::common::{MIN_CLEARANCE_RATIO, MIN_REYNOLDS, intermittency};
use crate::error::{CorrelationError, CorrelationFamily, CorrelationResult};
use crate::flow_split::novendstern_split;
use std::f64::consts::PI;

/// Bundle friction factor as a function of geometry and bundle Reynolds number.
pub type FrictionFn = fn(&BundleParams, f64) -> f64;

/// Turbulent exponent of the Cheng-Todreas subchannel power law.
pub(crate) const M_TURBULENT: f64 = 0.18;
pub(crate) const M_LAMINAR: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrictionModel {
    /// Cheng-Todreas detailed (subchannel based).
    #[default]
    ChengTodreasDetailed,
    /// Cheng-Todreas simple (bundle fit).
    ChengTodreasSimple,
    Novendstern,
    Rehme,
    Engel,
}

impl FrictionModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "CTD" => Ok(Self::ChengTodreasDetailed),
            "CTS" => Ok(Self::ChengTodreasSimple),
            "NOV" => Ok(Self::Novendstern),
            "REH" => Ok(Self::Rehme),
            "ENG" => Ok(Self::Engel),
            _ => Err(CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::Friction,
                name: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ChengTodreasDetailed => "CTD",
            Self::ChengTodreasSimple => "CTS",
            Self::Novendstern => "NOV",
            Self::Rehme => "REH",
            Self::Engel => "ENG",
        }
    }

    pub fn function(self) -> FrictionFn {
        match self {
            Self::ChengTodreasDetailed => cheng_todreas_detailed,
            Self::ChengTodreasSimple => cheng_todreas_simple,
            Self::Novendstern => novendstern,
            Self::Rehme => rehme,
            Self::Engel => engel,
        }
    }
}

/// Bare-rod subchannel constant `a + b1·(x-1) + b2·(x-1)²`.
///
/// `x` is P/D for interior subchannels and W/D for edge and corner ones.
fn bare_constant(t: SubchannelType, laminar: bool, x: f64) -> f64 {
    let tight = x < 1.1;
    let (a, b1, b2) = match (t, laminar, tight) {
        (SubchannelType::Interior, true, true) => (26.00, 888.2, -3334.0),
        (SubchannelType::Interior, true, false) => (62.97, 216.9, -190.2),
        (SubchannelType::Edge, true, true) => (26.18, 554.5, -1480.0),
        (SubchannelType::Edge, true, false) => (44.40, 256.7, -267.6),
        (SubchannelType::Corner, true, true) => (26.98, 1636.0, -10050.0),
        (SubchannelType::Corner, true, false) => (87.26, 38.59, -55.12),
        (SubchannelType::Interior, false, true) => (0.09378, 1.398, -8.664),
        (SubchannelType::Interior, false, false) => (0.1458, 0.03632, -0.03333),
        (SubchannelType::Edge, false, true) => (0.09377, 0.8732, -3.341),
        (SubchannelType::Edge, false, false) => (0.1430, 0.04199, -0.04428),
        (SubchannelType::Corner, false, true) => (0.1004, 1.625, -11.85),
        (SubchannelType::Corner, false, false) => (0.1499, 0.006706, -0.009567),
    };
    let e = x - 1.0;
    a + b1 * e + b2 * e * e
}

/// Wire-wrapped subchannel friction constants `C_fi` for one regime.
pub(crate) fn subchannel_constants(b: &BundleParams, laminar: bool) -> [f64; 3] {
    let m = if laminar { M_LAMINAR } else { M_TURBULENT };
    let dw_d = b.dw_over_d();
    let w_d_turb = 29.5 - 140.0 * dw_d + 401.0 * dw_d * dw_d;
    let w_d = if laminar { 1.4 * w_d_turb } else { w_d_turb };
    let w_s_turb = 20.0 * (b.wire_pitch / (b.pin_diameter + b.wire_diameter)).log10() - 7.0;
    let w_s = if laminar { 0.3 * w_s_turb } else { w_s_turb };
    let tan2 = b.helix_tan().powi(2);

    let mut out = [0.0; 3];
    for t in SubchannelType::ALL {
        let class = b.class(t);
        let x = match t {
            SubchannelType::Interior => b.p_over_d(),
            _ => b.w_over_d(),
        };
        let bare = bare_constant(t, laminar, x);
        out[t.slot()] = if b.wire_diameter <= 0.0 || class.count == 0 {
            bare
        } else {
            match t {
                SubchannelType::Interior => {
                    let de = class.hydraulic_diameter();
                    bare + w_d
                        * (3.0 * class.wire_projected_area / class.bare_area())
                        * (de / b.wire_pitch)
                        * (de / b.wire_diameter).powf(m)
                }
                _ => {
                    let drag = 1.0 + w_s * (class.wire_projected_area / class.bare_area()) * tan2;
                    bare * drag.max(1.0).powf((3.0 - m) / 2.0)
                }
            }
        };
    }
    out
}

/// Bundle constant and per-type velocity ratios for the power law exponent `m`.
///
/// Equal axial pressure gradient in every subchannel plus mass conservation
/// gives `X_i = (C_fb/C_fi)^(1/(2-m)) (De_i/De)^((1+m)/(2-m))`.
pub(crate) fn bundle_constant_and_split(b: &BundleParams, cf: [f64; 3], m: f64) -> (f64, [f64; 3]) {
    let de = b.hydraulic_diameter();
    let e_de = (1.0 + m) / (2.0 - m);
    let e_cf = 1.0 / (2.0 - m);

    let sum: f64 = SubchannelType::ALL
        .iter()
        .filter(|&&t| b.class(t).count > 0)
        .map(|&t| {
            let rel = b.class(t).hydraulic_diameter() / de;
            b.area_fraction(t) * rel.powf(e_de) * cf[t.slot()].powf(-e_cf)
        })
        .sum();
    let c_fb = sum.powf(-(2.0 - m));

    let mut x = [0.0; 3];
    for t in SubchannelType::ALL {
        if b.class(t).count == 0 {
            continue;
        }
        let rel = b.class(t).hydraulic_diameter() / de;
        x[t.slot()] = (c_fb / cf[t.slot()]).powf(e_cf) * rel.powf(e_de);
    }
    (c_fb, x)
}

/// Blend laminar and turbulent values the way both Cheng-Todreas forms do.
pub(crate) fn blend_transition(f_lam: f64, f_turb: f64, psi: f64) -> f64 {
    f_lam * (1.0 - psi).cbrt() * (1.0 - psi.powi(7)) + f_turb * psi.cbrt()
}

fn cheng_todreas_detailed(b: &BundleParams, re: f64) -> f64 {
    let re = re.max(MIN_REYNOLDS);
    let psi = intermittency(re, b.p_over_d());
    let (c_l, _) = bundle_constant_and_split(b, subchannel_constants(b, true), M_LAMINAR);
    let (c_t, _) = bundle_constant_and_split(b, subchannel_constants(b, false), M_TURBULENT);
    blend_transition(c_l / re, c_t / re.powf(M_TURBULENT), psi)
}

fn cheng_todreas_simple(b: &BundleParams, re: f64) -> f64 {
    let re = re.max(MIN_REYNOLDS);
    let x = b.p_over_d();
    let hd = b.h_over_d();
    let log_hd = hd.log10();
    let c_l = (-974.6 + 1612.0 * x - 598.5 * x * x) * hd.powf(0.06 - 0.085 * x);
    let c_t = (0.8063 - 0.9022 * log_hd + 0.3526 * log_hd * log_hd)
        * x.powf(9.7)
        * hd.powf(1.78 - 2.0 * x);
    let psi = intermittency(re, x);
    blend_transition(c_l / re, c_t / re.powf(M_TURBULENT), psi)
}

/// Novendstern: smooth-tube Blasius factor times a wire-wrap multiplier,
/// evaluated at the interior subchannel Reynolds number.
fn novendstern(b: &BundleParams, re: f64) -> f64 {
    let re = re.max(MIN_REYNOLDS);
    let x = b.p_over_d();
    let split = novendstern_split(b);
    let interior = b.class(SubchannelType::Interior);
    let re_1 = if interior.count > 0 {
        re * split[0] * interior.hydraulic_diameter() / b.hydraulic_diameter()
    } else {
        re
    };
    let mult = (1.034 / x.powf(0.124)
        + 29.7 * x.powf(6.94) * re_1.powf(0.086) / b.h_over_d().powf(2.239))
    .powf(0.885);
    let turbulent = mult * 0.316 / re_1.powf(0.25);
    turbulent.max(64.0 / re)
}

fn rehme(b: &BundleParams, re: f64) -> f64 {
    let re = re.max(MIN_REYNOLDS);
    let x = b.p_over_d();
    let dd = b.pin_diameter + b.wire_diameter;
    let f_geom = x.sqrt() + (7.6 * dd / b.wire_pitch * x * x).powf(2.16);
    let wetted_ratio = b.n_pins as f64 * PI * dd / b.total_wetted_perimeter();
    (64.0 / re * f_geom.sqrt() + 0.0816 / re.powf(0.133) * f_geom.powf(0.9335)) * wetted_ratio
}

fn engel(_b: &BundleParams, re: f64) -> f64 {
    let re = re.max(MIN_REYNOLDS);
    if re <= 400.0 {
        110.0 / re
    } else if re >= 5000.0 {
        0.55 / re.powf(0.25)
    } else {
        let psi = (re - 400.0) / 4600.0;
        110.0 / re * (1.0 - psi).sqrt() + 0.55 / re.powf(0.25) * psi.sqrt()
    }
}

/// Guard used by mixing correlations that carry `(P/D - 1)^-n`.
pub(crate) fn clearance_excess(x: f64) -> f64 {
    (x - 1.0).max(MIN_CLEARANCE_RATIO)
}

/// Darcy factor of a smooth round channel, used for homogenized regions.
///
/// Laminar `64/Re` below Re 2300, Swamee-Jain with zero roughness above.
pub fn pipe_friction(re: f64) -> f64 {
    let re = re.max(MIN_REYNOLDS);
    if re < 2300.0 {
        64.0 / re
    } else {
        let b = 5.74 / re.powf(0.9);
        (0.25 / b.log10().powi(2)).max(1e-4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures::bundle_61;

    const ALL: [FrictionModel; 5] = [
        FrictionModel::ChengTodreasDetailed,
        FrictionModel::ChengTodreasSimple,
        FrictionModel::Novendstern,
        FrictionModel::Rehme,
        FrictionModel::Engel,
    ];

    #[test]
    fn names_round_trip() {
        for model in ALL {
            assert_eq!(FrictionModel::from_name(model.name()).unwrap(), model);
        }
        assert_eq!(
            FrictionModel::from_name(" cts ").unwrap(),
            FrictionModel::ChengTodreasSimple
        );
    }

    #[test]
    fn pipe_friction_regimes() {
        assert!((pipe_friction(1000.0) - 0.064).abs() < 1e-12);
        let f = pipe_friction(1.0e5);
        assert!(f > 0.015 && f < 0.02, "f = {f}");
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = FrictionModel::from_name("COLEBROOK").unwrap_err();
        assert!(matches!(
            err,
            CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::Friction,
                ..
            }
        ));
    }

    #[test]
    fn turbulent_factors_are_plausible() {
        let b = bundle_61();
        for model in ALL {
            let f = model.function()(&b, 5.0e4);
            assert!(f > 0.005 && f < 0.2, "{}: f = {f}", model.name());
        }
    }

    #[test]
    fn friction_decreases_with_reynolds_when_turbulent() {
        let b = bundle_61();
        for model in ALL {
            let f = model.function();
            assert!(f(&b, 2.0e4) > f(&b, 1.0e5), "{}", model.name());
        }
    }

    #[test]
    fn laminar_limit_scales_inversely_with_reynolds() {
        let b = bundle_61();
        let f = FrictionModel::ChengTodreasSimple.function();
        let ratio = f(&b, 50.0) / f(&b, 100.0);
        assert!((ratio - 2.0).abs() < 1e-9);
    }

    #[test]
    fn detailed_split_conserves_mass() {
        let b = bundle_61();
        for laminar in [true, false] {
            let m = if laminar { M_LAMINAR } else { M_TURBULENT };
            let (_, x) = bundle_constant_and_split(&b, subchannel_constants(&b, laminar), m);
            let total: f64 = SubchannelType::ALL
                .iter()
                .map(|&t| b.area_fraction(t) * x[t.slot()])
                .sum();
            assert!((total - 1.0).abs() < 1e-9, "sum = {total}");
        }
    }
}
