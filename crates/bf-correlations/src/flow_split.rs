//! Flow split: subchannel-to-bundle average velocity ratios `X_i`.
//!
//! Every model returns ratios that satisfy `Σ S_i·X_i = 1`, where `S_i` is
//! the area fraction of subchannel type `i`.

use crate::bundle::{BundleParams, SubchannelType};
use crate::common::{MIN_REYNOLDS, intermittency};
use crate::error::{CorrelationError, CorrelationFamily, CorrelationResult};
use crate::friction::{M_LAMINAR, M_TURBULENT, bundle_constant_and_split, subchannel_constants};

/// Velocity ratios indexed by `SubchannelType::slot`.
pub type FlowSplitFn = fn(&BundleParams, f64) -> [f64; 3];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FlowSplitModel {
    #[default]
    ChengTodreasDetailed,
    Novendstern,
    /// Equal velocity in every subchannel.
    Uniform,
}

impl FlowSplitModel {
    pub fn from_name(name: &str) -> CorrelationResult<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "CTD" => Ok(Self::ChengTodreasDetailed),
            "NOV" => Ok(Self::Novendstern),
            "UNIFORM" => Ok(Self::Uniform),
            _ => Err(CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::FlowSplit,
                name: name.to_string(),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::ChengTodreasDetailed => "CTD",
            Self::Novendstern => "NOV",
            Self::Uniform => "UNIFORM",
        }
    }

    pub fn function(self) -> FlowSplitFn {
        match self {
            Self::ChengTodreasDetailed => cheng_todreas_split,
            Self::Novendstern => novendstern,
            Self::Uniform => uniform,
        }
    }
}

fn normalize(b: &BundleParams, mut x: [f64; 3]) -> [f64; 3] {
    let total: f64 = SubchannelType::ALL
        .iter()
        .map(|&t| b.area_fraction(t) * x[t.slot()])
        .sum();
    if total > 0.0 {
        for v in &mut x {
            *v /= total;
        }
    }
    x
}

fn cheng_todreas_split(b: &BundleParams, re: f64) -> [f64; 3] {
    let psi = intermittency(re.max(MIN_REYNOLDS), b.p_over_d());
    let (_, x_l) = bundle_constant_and_split(b, subchannel_constants(b, true), M_LAMINAR);
    let (_, x_t) = bundle_constant_and_split(b, subchannel_constants(b, false), M_TURBULENT);
    let mut x = [0.0; 3];
    for i in 0..3 {
        x[i] = x_l[i] + (x_t[i] - x_l[i]) * psi;
    }
    normalize(b, x)
}

fn novendstern(b: &BundleParams, _re: f64) -> [f64; 3] {
    novendstern_split(b)
}

fn uniform(_b: &BundleParams, _re: f64) -> [f64; 3] {
    [1.0; 3]
}

/// Novendstern: `X_i ∝ De_i^0.714`.
pub(crate) fn novendstern_split(b: &BundleParams) -> [f64; 3] {
    let de = b.hydraulic_diameter();
    let mut x = [0.0; 3];
    for t in SubchannelType::ALL {
        if b.class(t).count > 0 {
            x[t.slot()] = (b.class(t).hydraulic_diameter() / de).powf(0.714);
        }
    }
    normalize(b, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::fixtures::bundle_61;
    use proptest::prelude::*;

    fn weighted_sum(b: &BundleParams, x: [f64; 3]) -> f64 {
        SubchannelType::ALL
            .iter()
            .map(|&t| b.area_fraction(t) * x[t.slot()])
            .sum()
    }

    #[test]
    fn uniform_split_is_identity() {
        let b = bundle_61();
        let x = FlowSplitModel::Uniform.function()(&b, 3.0e4);
        assert_eq!(x, [1.0; 3]);
    }

    #[test]
    fn edge_flow_exceeds_interior_for_wire_wrap() {
        let b = bundle_61();
        let x = FlowSplitModel::ChengTodreasDetailed.function()(&b, 5.0e4);
        assert!(x[1] > x[0], "X = {x:?}");
    }

    #[test]
    fn unknown_split_rejected() {
        assert!(FlowSplitModel::from_name("MIT").is_err());
    }

    proptest! {
        #[test]
        fn every_split_conserves_mass(re in 50.0f64..2.0e5) {
            let b = bundle_61();
            for model in [FlowSplitModel::ChengTodreasDetailed, FlowSplitModel::Novendstern] {
                let x = model.function()(&b, re);
                prop_assert!((weighted_sum(&b, x) - 1.0).abs() < 1e-9);
                prop_assert!(x.iter().all(|v| *v > 0.0));
            }
        }
    }
}
