/// Window title
use std::path::Path;

use crate::geometry::{Dimensions, Rect};
use crate::state::data::EntryId;

/// Title bar text for the entry being shown
pub fn window_title(id: EntryId, image: Dimensions, selection: Rect, path: &Path) -> String {
    format!(
        "wallcrop -- Image: {} -- Size: {:.3} Mpx -- Selection: {}x{} -- File: {}",
        id,
        image.megapixels(),
        selection.width,
        selection.height,
        path.display()
    )
}
