//! Common utilities module
//!
//! This module contains the error type shared across the HDR pipeline.

pub mod error;

pub use error::{HdrError, Result};
