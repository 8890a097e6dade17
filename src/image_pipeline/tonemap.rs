//! Tonemapping module
//!
//! Compresses a radiance map into a displayable 8-bit RGB image. Each operator
//! produces normalized floats in [0, 1] which are scaled by the operator's
//! output gain and saturated into bytes.

mod drago;
mod mantiuk;
pub(crate) mod plane;
mod reinhard;
mod tonemapper;
pub mod types;

pub use drago::DragoTonemapper;
pub use mantiuk::MantiukTonemapper;
pub use reinhard::ReinhardTonemapper;
pub use tonemapper::Tonemapper;
pub use types::{
    DragoParams, MantiukParams, ReinhardParams, TonemapConfig, TonemapOperator, ToneMappedImage,
};
