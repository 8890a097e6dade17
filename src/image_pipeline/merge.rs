//! HDR merge module
//!
//! Combines aligned exposures and a camera response into one radiance map.

mod debevec;
pub mod types;

pub use debevec::DebevecMerger;
pub use types::RadianceMap;
