/// Image collaborators backed by the `image` crate
///
/// - `ImageDecoder` reads only the header to get pixel dimensions
/// - `HandleRenderer` decodes the full image into an iced handle, downscaling
///   anything larger than the preview limit
use image::imageops::FilterType;
use iced::widget::image::Handle;
use std::path::Path;

use crate::error::CollaboratorError;
use crate::geometry::Dimensions;
use crate::validation::{MetadataDecoder, Renderer};

/// Longest side of a display handle. Larger images are downscaled.
pub const MAX_PREVIEW_SIDE: u32 = 4096;

fn image_error(path: &Path, source: image::ImageError) -> CollaboratorError {
    CollaboratorError::Image {
        path: path.to_path_buf(),
        source,
    }
}

/// Header-only dimension reader
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageDecoder;

impl MetadataDecoder for ImageDecoder {
    fn decode_metadata(&mut self, path: &Path) -> Result<Dimensions, CollaboratorError> {
        if !path.exists() {
            return Err(CollaboratorError::NotFound(path.to_path_buf()));
        }
        let (width, height) = image::image_dimensions(path).map_err(|e| image_error(path, e))?;
        Ok(Dimensions::new(width, height))
    }
}

/// Full decoder producing RGBA display handles
#[derive(Debug, Default, Clone, Copy)]
pub struct HandleRenderer;

impl Renderer for HandleRenderer {
    type Handle = Handle;

    fn render_prepare(&mut self, path: &Path) -> Result<Handle, CollaboratorError> {
        let img = image::open(path).map_err(|e| image_error(path, e))?;

        let img = if img.width() > MAX_PREVIEW_SIDE || img.height() > MAX_PREVIEW_SIDE {
            img.resize(MAX_PREVIEW_SIDE, MAX_PREVIEW_SIDE, FilterType::Triangle)
        } else {
            img
        };

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Handle::from_rgba(width, height, rgba.into_raw()))
    }
}
