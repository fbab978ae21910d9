//! Inter-subchannel mixing: eddy diffusivity and wire-wrap swirl.

use crate::bundle::{BundleParams, SubchannelType};
use crate::common::{MIN_REYNOLDS, intermittency};
use crate::error::{CorrelationError, CorrelationFamily, CorrelationResult};
use crate::friction::clearance_excess;

/// Dimensionless mixing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MixingParams {
    /// Eddy diffusivity ε / (U_interior · D).
    pub eddy: f64,
    /// Swirl velocity along the duct over edge subchannel velocity.
    pub swirl: f64,
}

pub type MixingFn = fn(&BundleParams, f64) -> MixingParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MixingModel {
    #[default]
    ChengTodreasDetailed,
    /// Chiu-Rohsenow-Todreas.
    Mit,
    /// Bare-rod eddy mixing with no swirl.
    KcBare,
}

impl MixingModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "CTD" => Ok(Self::ChengTodreasDetailed),
            "MIT" => Ok(Self::Mit),
            "KC-BARE" => Ok(Self::KcBare),
            _ => Err(CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::Mixing,
                name: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ChengTodreasDetailed => "CTD",
            Self::Mit => "MIT",
            Self::KcBare => "KC-BARE",
        }
    }

    pub fn function(self) -> MixingFn {
        match self {
            Self::ChengTodreasDetailed => cheng_todreas,
            Self::Mit => mit,
            Self::KcBare => kc_bare,
        }
    }
}

fn wire_ratio(b: &BundleParams, t: SubchannelType) -> f64 {
    let c = b.class(t);
    if c.count == 0 || c.bare_area() <= 0.0 {
        0.0
    } else {
        (c.wire_projected_area / c.bare_area()).sqrt()
    }
}

fn cheng_todreas(b: &BundleParams, re: f64) -> MixingParams {
    let x = b.p_over_d();
    let psi = intermittency(re.max(MIN_REYNOLDS), x);
    let tan = b.helix_tan();
    let excess = clearance_excess(x).sqrt();
    let hd = b.h_over_d().powf(0.3);

    let c_m = 0.077 / excess + (0.14 / excess - 0.077 / excess) * psi.powf(2.0 / 3.0);
    let c_s = 0.413 * hd + (0.75 * hd - 0.413 * hd) * psi.powf(2.0 / 3.0);

    MixingParams {
        eddy: c_m * wire_ratio(b, SubchannelType::Interior) * tan,
        swirl: c_s * wire_ratio(b, SubchannelType::Edge) * tan,
    }
}

fn mit(b: &BundleParams, _re: f64) -> MixingParams {
    let tan = b.helix_tan();
    let wall_gap = b.edge_pitch - b.pin_diameter;
    MixingParams {
        eddy: 0.1 * wire_ratio(b, SubchannelType::Interior) * tan,
        swirl: 10.5 * (wall_gap / b.pin_pitch).max(0.0).powf(0.35)
            * wire_ratio(b, SubchannelType::Edge)
            * tan,
    }
}

/// Rogers-Tahir form for bare rods, `0.0058 (s/D)^-1.46 Re^-0.1`.
fn kc_bare(b: &BundleParams, re: f64) -> MixingParams {
    let s_over_d = clearance_excess(b.p_over_d());
    MixingParams {
        eddy: 0.0058 * s_over_d.powf(-1.46) * re.max(MIN_REYNOLDS).powf(-0.1),
        swirl: 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures::bundle_61;

    #[test]
    fn wire_wrap_models_produce_swirl() {
        let b = bundle_61();
        for model in [MixingModel::ChengTodreasDetailed, MixingModel::Mit] {
            let p = model.function()(&b, 4.0e4);
            assert!(p.eddy > 0.0 && p.swirl > 0.0, "{}: {p:?}", model.name());
        }
    }

    #[test]
    fn bare_rod_model_has_no_swirl() {
        let b = bundle_61();
        let p = MixingModel::KcBare.function()(&b, 4.0e4);
        assert_eq!(p.swirl, 0.0);
        assert!(p.eddy > 0.0);
    }

    #[test]
    fn turbulent_mixing_exceeds_laminar() {
        let b = bundle_61();
        let f = MixingModel::ChengTodreasDetailed.function();
        let lam = f(&b, 100.0);
        let turb = f(&b, 1.0e5);
        assert!(turb.eddy > lam.eddy);
        assert!(turb.swirl > lam.swirl);
    }

    #[test]
    fn names_parse() {
        assert_eq!(
            MixingModel::from_name("kc-bare").unwrap(),
            MixingModel::KcBare
        );
        assert!(MixingModel::from_name("KC").is_err());
    }
}
