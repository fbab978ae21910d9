//! bf-core: stable foundation for bundleflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + tolerances + float helpers)
//! - ids (compact IDs for assemblies, groups, subchannels)
//! - error (shared error types)

pub mod error;
pub mod ids;
pub mod numeric;
pub mod units;

pub use error::{BfError, BfResult};
pub use ids::*;
pub use numeric::*;
pub use units::*;
