//! Image metadata probing.
//!
//! Only the header is read; decoding pixels is a backend concern.

use std::path::Path;

use crate::error::DisplayError;

/// Pixel dimensions of an image file.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32), DisplayError> {
    if !path.exists() {
        return Err(DisplayError::NotFound {
            path: path.to_path_buf(),
        });
    }
    image::image_dimensions(path).map_err(|e| DisplayError::DecodeFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
