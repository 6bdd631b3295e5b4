/// Shared data structures for the session state
///
/// These structs represent the data model that flows between
/// the navigation ring, the selection engine and the UI layer.
use std::path::{Path, PathBuf};

use crate::color::OutlineColor;
use crate::geometry::{Dimensions, Rect};

/// Sequential id of an entry, assigned when the ring is built
///
/// Ids are dense and ascending in directory order, and double as the
/// entry's slot in the ring arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryId(pub usize);

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One candidate image file and its selection state
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEntry {
    /// Sequential id, stable for the session
    pub id: EntryId,
    /// Full path to the file
    pub path: PathBuf,
    /// Filename only (e.g., "DSC_0001.jpg")
    pub filename: String,
    /// Pixel bounds, set once on the first successful decode
    pub dimensions: Dimensions,
    /// Target width / height ratio shared by every entry
    pub aspect: f64,
    /// Selection box in image pixel space
    pub selection: Rect,
    /// Selection outline color
    pub outline: OutlineColor,
    /// Set once the metadata decoder has accepted the file
    pub decode_valid: bool,
    /// Set once the renderer has produced a displayable handle
    pub render_valid: bool,
}

impl ImageEntry {
    /// Create an unvalidated entry
    pub fn new(id: EntryId, path: PathBuf, aspect: f64) -> Self {
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self {
            id,
            path,
            filename,
            dimensions: Dimensions::default(),
            aspect,
            selection: Rect::default(),
            outline: OutlineColor::default(),
            decode_valid: false,
            render_valid: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Both validation checks have passed
    pub fn is_navigable(&self) -> bool {
        self.decode_valid && self.render_valid
    }
}
