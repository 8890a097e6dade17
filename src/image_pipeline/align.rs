//! Image alignment module
//!
//! Compensates for camera motion between bracketed exposures before they are merged.

pub mod mtb;
pub mod types;

pub use mtb::{MtbAligner, shift_image};
pub use types::{AlignedExposures, AlignmentConfig, Shift};
