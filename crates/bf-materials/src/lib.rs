//! bf-materials: temperature-dependent material properties for bundleflow.
//!
//! Provides:
//! - Built-in correlations for liquid-metal coolants, structural steels and
//!   metallic fuel, each with a documented validity range
//! - User polynomial models (`property = Σ cᵢ·Tⁱ`)
//! - User tabulated models with linear interpolation
//! - `MaterialLibrary`, which resolves names in that order and hands out
//!   shared `Arc<Material>` handles
//!
//! Out-of-range queries are not errors: the value is extrapolated and the
//! returned `PropertyEval` is flagged so that callers can log it.
//!
//! # Example
//!
//! ```
//! use bf_materials::MaterialLibrary;
//! use bf_core::units::k;
//!
//! let lib = MaterialLibrary::new();
//! let sodium = lib.resolve("Na").unwrap();
//! let eval = sodium.properties(k(700.0)).unwrap();
//! assert!(eval.properties.density.value > 800.0);
//! assert!(!eval.is_extrapolated());
//! ```

pub mod builtin;
pub mod catalog;
pub mod error;
pub mod library;
pub mod model;
pub mod polynomial;
pub mod table;

pub use builtin::Builtin;
pub use catalog::{BuiltinCatalogEntry, builtin_catalog, filter_builtin_catalog, lookup_builtin};
pub use error::{MaterialError, MaterialResult};
pub use library::MaterialLibrary;
pub use model::{
    Conductivity, Material, MaterialModel, Phase, Properties, PropertyEval, RangeStatus,
    RawProperties, SpecHeatCapacity,
};
pub use polynomial::PolynomialModel;
pub use table::TabulatedModel;
