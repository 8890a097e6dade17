//! Alignment types

use crate::image_pipeline::load::ExposureSet;

/// Settings for median threshold bitmap alignment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentConfig {
    /// Run alignment at all. Tripod brackets can skip it.
    pub enabled: bool,
    /// Upper bound on pyramid depth; the search reaches roughly `2^max_bits` pixels.
    pub max_bits: u32,
    /// Pixels within this distance of the median are ignored when comparing bitmaps.
    pub exclude_range: u8,
}

impl Default for AlignmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_bits: 6,
            exclude_range: 4,
        }
    }
}

/// Integer translation that moves an image onto the reference frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Shift {
    pub dx: i32,
    pub dy: i32,
}

impl Shift {
    pub const ZERO: Shift = Shift { dx: 0, dy: 0 };

    pub fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

/// Output of the aligner: the translated frames and the shift applied to each.
#[derive(Debug, Clone)]
pub struct AlignedExposures {
    pub exposures: ExposureSet,
    pub shifts: Vec<Shift>,
    pub reference_index: usize,
}
