//! Directory based image loading.
//!
//! Lists a flat directory, keeps the files whose extension is in the accepted
//! set and decodes each of them to 8-bit RGB with the `image` crate.

use std::path::{Path, PathBuf};

use image::{ImageError, RgbImage};
use tracing::debug;

use crate::image_pipeline::common::error::{HdrError, Result};

/// Loads bracketed exposures from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryLoader {
    extensions: Vec<String>,
}

/// Lowercases an extension and strips its leading dot, so `.JPG` and `jpg` match.
pub fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_ascii_lowercase()
}

impl DirectoryLoader {
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        Self {
            extensions: extensions
                .iter()
                .map(|e| normalize_extension(e.as_ref()))
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.extensions.contains(&normalize_extension(e)))
            .unwrap_or(false)
    }

    /// Lists the accepted files of `dir`, sorted by file name.
    ///
    /// # Returns
    ///
    /// * `Ok(paths)` - At least one matching file
    /// * `Err(HdrError::InputRead)` - The directory could not be read
    /// * `Err(HdrError::NoImagesFound)` - Nothing matched the extension set
    pub fn list(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let entries = std::fs::read_dir(dir)
            .map_err(|e| HdrError::InputRead(format!("{}: {}", dir.display(), e)))?;

        let mut files = Vec::new();
        for entry in entries {
            let entry =
                entry.map_err(|e| HdrError::InputRead(format!("{}: {}", dir.display(), e)))?;
            let path = entry.path();

            if !path.is_file() || !self.accepts(&path) {
                debug!("Skipping {}", path.display());
                continue;
            }
            files.push(path);
        }

        if files.is_empty() {
            return Err(HdrError::NoImagesFound {
                dir: dir.to_path_buf(),
                extensions: self.extensions.clone(),
            });
        }

        files.sort();
        Ok(files)
    }

    pub fn read(&self, path: &Path) -> Result<RgbImage> {
        debug!("Decoding {}", path.display());

        let image = image::open(path).map_err(|e| match e {
            ImageError::IoError(io) => HdrError::InputRead(format!("{}: {}", path.display(), io)),
            other => HdrError::Decode(format!("{}: {}", path.display(), other)),
        })?;

        Ok(image.to_rgb8())
    }

    pub fn read_all(&self, paths: &[PathBuf]) -> Result<Vec<RgbImage>> {
        paths.iter().map(|p| self.read(p)).collect()
    }
}
