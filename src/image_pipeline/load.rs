//! Image loading module
//!
//! This module reads bracketed exposures from storage and groups them into a
//! validated exposure set.

mod directory_loader;
pub mod types;

pub use directory_loader::{DirectoryLoader, normalize_extension};
pub use types::ExposureSet;
