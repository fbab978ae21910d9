//! Assembly geometry for hexagonal wire-wrapped pin bundles.
//!
//! - `lattice`: hexagonal coordinates shared by pin maps and core maps
//! - `bundle`: pin bundle and duct wall parameters
//! - `mesh`: interior/edge/corner subchannel mesh with adjacency
//! - `axial`: axial regions and spacer grids
//! - `pin`: mutually exclusive fuel/pin radial models
//! - `builder`: validating builder producing an immutable `AssemblyGeometry`

pub mod axial;
pub mod builder;
pub mod bundle;
pub mod error;
pub mod lattice;
pub mod mesh;
pub mod pin;

pub use axial::{AxialRegion, AxialRegions, SpacerGrid};
pub use builder::{AssemblyGeometry, GeometryBuilder};
pub use bundle::{DuctWall, PinBundle};
pub use error::{GeometryError, GeometryResult};
pub use lattice::{DIRECTIONS, Hex, HexLattice};
pub use mesh::{Connection, DuctSegment, PinContact, Subchannel, SubchannelMesh};
pub use pin::{FuelModel, PinInternals, PinModel, RadialZone};
