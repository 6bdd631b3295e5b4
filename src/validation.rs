/// Entry validation gateway
///
/// An entry has to pass two independent checks before it is ever shown:
/// the metadata decoder must report its pixel size, and the renderer must
/// produce a displayable handle for it. Each check is memoized by its own
/// flag on the entry, and a failure evicts the entry from the ring for good.
use log::{debug, warn};
use std::path::Path;

use crate::error::{CollaboratorError, Result};
use crate::geometry::Dimensions;
use crate::selection;
use crate::state::data::EntryId;
use crate::state::ring::Ring;

/// Reads an image's pixel size without keeping its pixels
pub trait MetadataDecoder {
    fn decode_metadata(&mut self, path: &Path) -> std::result::Result<Dimensions, CollaboratorError>;
}

/// Turns a file into something the UI can draw
pub trait Renderer {
    type Handle;

    fn render_prepare(&mut self, path: &Path) -> std::result::Result<Self::Handle, CollaboratorError>;
}

/// Outcome of validating one entry
#[derive(Debug)]
pub enum Validation<H> {
    /// Both checks passed. Carries the handle if the render check ran now.
    Navigable(Option<H>),
    /// A check failed and the entry was removed from the ring
    Evicted,
}

/// Runs decode and render checks against the ring's entries
#[derive(Debug)]
pub struct Gateway<D, R> {
    decoder: D,
    renderer: R,
}

impl<D, R> Gateway<D, R>
where
    D: MetadataDecoder,
    R: Renderer,
{
    pub fn new(decoder: D, renderer: R) -> Self {
        Self { decoder, renderer }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Prepare a fresh display handle for an already validated entry
    pub fn prepare(&mut self, path: &Path) -> std::result::Result<R::Handle, CollaboratorError> {
        self.renderer.render_prepare(path)
    }

    /// Validate one entry, evicting it on failure
    ///
    /// Fails only when the failing entry is the last one in the ring.
    pub fn validate(&mut self, ring: &mut Ring, id: EntryId) -> Result<Validation<R::Handle>> {
        let Some(entry) = ring.get(id) else {
            return Ok(Validation::Evicted);
        };
        let path = entry.path.clone();
        let aspect = entry.aspect;
        let needs_decode = !entry.decode_valid;
        let needs_render = !entry.render_valid;

        if needs_decode {
            debug!("Test-loading metadata: {}", path.display());
            let decoded = self.decoder.decode_metadata(&path).and_then(|dims| {
                if selection::fits(dims, aspect) {
                    Ok(dims)
                } else {
                    Err(CollaboratorError::Degenerate {
                        path: path.clone(),
                        aspect,
                    })
                }
            });

            match decoded {
                Ok(dims) => {
                    if let Some(entry) = ring.get_mut(id) {
                        entry.dimensions = dims;
                        entry.selection = selection::reset(entry);
                        entry.decode_valid = true;
                        debug!("   -- {}x{}, selection {:?}", dims.width, dims.height, entry.selection);
                    }
                }
                Err(err) => {
                    warn!("⚠️  Skipping {}: {}", path.display(), err);
                    ring.remove(id)?;
                    return Ok(Validation::Evicted);
                }
            }
        } else {
            debug!("Metadata already tested: {}", path.display());
        }

        let mut handle = None;
        if needs_render {
            debug!("Test-loading image: {}", path.display());
            match self.renderer.render_prepare(&path) {
                Ok(prepared) => {
                    if let Some(entry) = ring.get_mut(id) {
                        entry.render_valid = true;
                    }
                    handle = Some(prepared);
                }
                Err(err) => {
                    warn!("⚠️  Skipping {}: {}", path.display(), err);
                    ring.remove(id)?;
                    return Ok(Validation::Evicted);
                }
            }
        }

        Ok(Validation::Navigable(handle))
    }
}
