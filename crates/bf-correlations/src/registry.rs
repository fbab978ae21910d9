//! Per-assembly correlation selection.

use crate::error::CorrelationResult;
use crate::flow_split::{FlowSplitFn, FlowSplitModel};
use crate::friction::{FrictionFn, FrictionModel};
use crate::gravity::GravityModel;
use crate::heat_transfer::{DuctHtcModel, NusseltFn, NusseltModel};
use crate::mixing::{MixingFn, MixingModel};
use std::fmt;

/// Correlation names as written in configuration; `None` selects the default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CorrelationNames {
    pub friction: Option<String>,
    pub flow_split: Option<String>,
    pub mixing: Option<String>,
    pub nusselt: Option<String>,
    pub duct_htc: Option<String>,
    pub gravity: Option<String>,
}

/// A resolved correlation: its name for reporting and the function itself.
#[derive(Clone, Copy)]
pub struct Resolved<F> {
    pub name: &'static str,
    pub eval: F,
}

impl<F> fmt::Debug for Resolved<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Resolved").field(&self.name).finish()
    }
}

/// Correlations fixed for the lifetime of one assembly.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationSet {
    pub friction: Resolved<FrictionFn>,
    pub flow_split: Resolved<FlowSplitFn>,
    pub mixing: Resolved<MixingFn>,
    pub nusselt: Resolved<NusseltFn>,
    pub duct_htc: Resolved<NusseltFn>,
    pub gravity: GravityModel,
}

fn pick<T: Default>(
    name: Option<&String>,
    parse: fn(&str) -> CorrelationResult<T>,
) -> CorrelationResult<T> {
    name.map_or_else(|| Ok(T::default()), |n| parse(n))
}

impl CorrelationSet {
    /// Resolve every family. Unknown names fail here, before any solve.
    pub fn resolve(names: &CorrelationNames) -> CorrelationResult<Self> {
        let friction = pick(names.friction.as_ref(), FrictionModel::from_name)?;
        let flow_split = pick(names.flow_split.as_ref(), FlowSplitModel::from_name)?;
        let mixing = pick(names.mixing.as_ref(), MixingModel::from_name)?;
        let nusselt = pick(names.nusselt.as_ref(), NusseltModel::from_name)?;
        let duct_htc = pick(names.duct_htc.as_ref(), DuctHtcModel::from_name)?;
        let gravity = pick(names.gravity.as_ref(), GravityModel::from_name)?;

        Ok(Self {
            friction: Resolved {
                name: friction.name(),
                eval: friction.function(),
            },
            flow_split: Resolved {
                name: flow_split.name(),
                eval: flow_split.function(),
            },
            mixing: Resolved {
                name: mixing.name(),
                eval: mixing.function(),
            },
            nusselt: Resolved {
                name: nusselt.name(),
                eval: nusselt.function(),
            },
            duct_htc: Resolved {
                name: duct_htc.name(),
                eval: duct_htc.function(),
            },
            gravity,
        })
    }
}

impl Default for CorrelationSet {
    fn default() -> Self {
        Self {
            friction: Resolved {
                name: FrictionModel::default().name(),
                eval: FrictionModel::default().function(),
            },
            flow_split: Resolved {
                name: FlowSplitModel::default().name(),
                eval: FlowSplitModel::default().function(),
            },
            mixing: Resolved {
                name: MixingModel::default().name(),
                eval: MixingModel::default().function(),
            },
            nusselt: Resolved {
                name: NusseltModel::default().name(),
                eval: NusseltModel::default().function(),
            },
            duct_htc: Resolved {
                name: DuctHtcModel::default().name(),
                eval: DuctHtcModel::default().function(),
            },
            gravity: GravityModel::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CorrelationError, CorrelationFamily};

    #[test]
    fn defaults_apply_when_unspecified() {
        let set = CorrelationSet::resolve(&CorrelationNames::default()).unwrap();
        assert_eq!(set.friction.name, "CTD");
        assert_eq!(set.flow_split.name, "CTD");
        assert_eq!(set.mixing.name, "CTD");
        assert_eq!(set.nusselt.name, "MIK");
        assert_eq!(set.duct_htc.name, "SS");
        assert_eq!(set.gravity, GravityModel::Off);
    }

    #[test]
    fn named_selection_is_honored() {
        let names = CorrelationNames {
            friction: Some("REH".into()),
            mixing: Some("KC-BARE".into()),
            nusselt: Some("DB".into()),
            gravity: Some("ON".into()),
            ..Default::default()
        };
        let set = CorrelationSet::resolve(&names).unwrap();
        assert_eq!(set.friction.name, "REH");
        assert_eq!(set.mixing.name, "KC-BARE");
        assert_eq!(set.nusselt.name, "DB");
        assert_eq!(set.gravity, GravityModel::On);
    }

    #[test]
    fn unknown_name_fails_at_resolution() {
        let names = CorrelationNames {
            flow_split: Some("SE2".into()),
            ..Default::default()
        };
        let err = CorrelationSet::resolve(&names).unwrap_err();
        assert_eq!(
            err,
            CorrelationError::UnsupportedCorrelation {
                family: CorrelationFamily::FlowSplit,
                name: "SE2".into(),
            }
        );
    }
}
