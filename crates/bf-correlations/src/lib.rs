//! Correlation library for wire-wrapped hexagonal pin bundles.
//!
//! Every family is a closed enum of named models. Names are parsed once, when
//! an assembly is built, and resolved to plain function pointers collected in
//! a [`CorrelationSet`]; the solver never looks a name up again.

pub mod bundle;
pub mod common;
pub mod error;
pub mod flow_split;
pub mod friction;
pub mod gravity;
pub mod heat_transfer;
pub mod mixing;
pub mod registry;
pub mod spacer_grid;

pub use bundle::{BundleParams, SubchannelClass, SubchannelType};
pub use error::{CorrelationError, CorrelationFamily, CorrelationResult};
pub use flow_split::{FlowSplitFn, FlowSplitModel};
pub use friction::{FrictionFn, FrictionModel, pipe_friction};
pub use gravity::GravityModel;
pub use heat_transfer::{DuctHtcModel, NusseltFn, NusseltInput, NusseltModel};
pub use mixing::{MixingFn, MixingModel, MixingParams};
pub use registry::{CorrelationNames, CorrelationSet, Resolved};
pub use spacer_grid::{DEFAULT_SOLIDITY, SpacerGridLoss, SpacerGridModel};
