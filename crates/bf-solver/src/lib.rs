//! Steady-state thermal-hydraulics of wire-wrapped hexagonal assemblies.
//!
//! Each assembly is marched axially from inlet to outlet on a subchannel
//! mesh (`axial`). Assemblies exchange heat through the inter-assembly gaps;
//! the core network solver (`network`) iterates a fixed point over immutable
//! boundary snapshots, solving all assemblies of one iteration in parallel.
//! The orificing optimizer (`orificing`) wraps full-core solves in a
//! bisection search over group flow rates.

pub mod assembly;
pub mod axial;
pub mod error;
pub mod gap;
pub mod hotspot;
pub mod layout;
pub mod mesh;
pub mod network;
pub mod orificing;
pub mod pin;
pub mod reactor;
pub mod result;

pub use assembly::{Assembly, AssemblyBuilder, AssemblyMaterials, PinMaterials};
pub use axial::{AssemblyBoundary, AxialOptions, DuctBoundary, MarchState, solve_assembly};
pub use error::{ConfigError, ConfigResult, OptimizerWarning, SolverError, SolverResult};
pub use gap::{BoundarySnapshot, GapFace, GapRelaxation};
pub use hotspot::{HotspotFactors, HotspotTerms, StatisticalFactor};
pub use layout::{CoreMap, Face, ring_position};
pub use mesh::AxialMesh;
pub use network::{NetworkOptions, NetworkSolver, NetworkState, solve_core};
pub use orificing::{OrificingOptions, OrificingResult, TrialRecord, optimize};
pub use pin::{PinNode, PinRadial};
pub use reactor::{
    Core, CoreBuilder, FlowAssignment, GapModel, GroupConstraint, LimitQuantity, OrificingGroup,
};
pub use result::{
    AssemblyResult, BypassResult, CoreResult, EnergyBalance, HotspotPeaks, IterationRecord,
    RegionPressureDrop,
};
