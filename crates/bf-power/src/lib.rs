//! Power distribution mapping.
//!
//! Produces a read-only `PowerField` (linear power per pin, per axial
//! interval, plus direct coolant and duct heating) from either flux data
//! and heating coefficients or a tabulated pin power listing.

pub mod error;
pub mod field;
pub mod flux;
pub mod mapper;
pub mod table;

pub use error::{PowerError, PowerResult};
pub use field::{AssemblyPower, DepositionSplit, PowerField};
pub use flux::{AssemblyFlux, FluxSource, HeatingCoefficients, MaterialHeating, StaticFlux};
pub use mapper::{AssemblyLayout, PowerMapper};
pub use table::{PowerRow, PowerTable};
