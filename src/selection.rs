/// Selection box constraint engine
///
/// Every mutating operation follows the same shape: compute a candidate
/// rectangle, run it through [`sanitize`], commit. After any single public
/// call the selection of an entry satisfies:
///
/// 1. width / height is the target aspect ratio, up to integer rounding
/// 2. 1 <= width <= image width and 1 <= height <= image height
/// 3. width, height >= [`min_dimension`] whenever the image can host such a box
/// 4. the box lies entirely inside the image
use crate::geometry::{Dimensions, Rect};
use crate::state::data::ImageEntry;

/// Default multiplicative step for resizing (5% per key press)
pub const DEFAULT_SIZE_STEP: f64 = 0.05;

/// Default step for moving, as a fraction of the image side
pub const DEFAULT_POSITION_STEP: f64 = 0.05;

/// Upper bound on max-clamp passes (one pass suffices for any finite box)
const MAX_CLAMP_PASSES: usize = 4;

/// Step sizes for resize and move
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Steps {
    /// Fraction by which Grow/Shrink scale the width
    pub size: f64,
    /// Fraction of the image side covered by one move
    pub position: f64,
}

impl Default for Steps {
    fn default() -> Self {
        Self {
            size: DEFAULT_SIZE_STEP,
            position: DEFAULT_POSITION_STEP,
        }
    }
}

/// Direction of a resize
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeDirection {
    Grow,
    Shrink,
}

/// Direction of a move
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Smallest side a selection may have for a given size step
///
/// Below `1 / size_step` pixels a single grow step truncates back to the
/// same width and the box could never be enlarged again.
pub fn min_dimension(size_step: f64) -> i32 {
    (1.0 / size_step).ceil() as i32
}

/// Centered, maximal selection for an entry
pub fn reset(entry: &ImageEntry) -> Rect {
    reset_for(entry.dimensions, entry.aspect)
}

/// Centered, maximal selection for an image of `dims` at `aspect`
pub fn reset_for(dims: Dimensions, aspect: f64) -> Rect {
    let img_w = dims.width as i32;
    let img_h = dims.height as i32;

    let (width, height) = if dims.aspect() > aspect {
        // Image is wider than the target: fill the height
        let height = img_h;
        ((f64::from(height) * aspect) as i32, height)
    } else {
        // Image is narrower than (or identical to) the target: fill the width
        let width = img_w;
        (width, (f64::from(width) / aspect) as i32)
    };

    Rect::new((img_w - width) / 2, (img_h - height) / 2, width, height)
}

/// Whether an image of `dims` can host any selection at `aspect`
pub fn fits(dims: Dimensions, aspect: f64) -> bool {
    if !dims.is_valid() || !aspect.is_finite() || aspect <= 0.0 {
        return false;
    }
    let rect = reset_for(dims, aspect);
    rect.width >= 1 && rect.height >= 1
}

/// Restore all selection invariants for `rect` inside `entry`'s image
///
/// Idempotent: sanitizing an already sanitized rectangle returns it as is.
pub fn sanitize(rect: Rect, entry: &ImageEntry, size_step: f64) -> Rect {
    let img_w = entry.dimensions.width as i32;
    let img_h = entry.dimensions.height as i32;
    let floor = min_dimension(size_step);

    let (mut width, mut height) = (rect.width, rect.height);

    // Minimum-size floor
    if width < floor || height < floor {
        (width, height) = floor_size(entry.aspect, floor);
    }

    // Maximum-size clamp
    (width, height) = clamp_size(width, height, img_w, img_h);

    // The image is smaller than the floor box. Every such case settles on the
    // same clamped floor box so that a second pass changes nothing.
    if width < floor || height < floor {
        let (floor_w, floor_h) = floor_size(entry.aspect, floor);
        (width, height) = clamp_size(floor_w, floor_h, img_w, img_h);
    }

    // Position clamp, y before x, upper bound before lower bound
    let y = rect.y.min(img_h - height).max(0);
    let x = rect.x.min(img_w - width).max(0);

    Rect::new(x, y, width, height)
}

/// Grow or shrink the selection by one step, keeping its center
pub fn resize(entry: &mut ImageEntry, direction: ResizeDirection, steps: &Steps) {
    let old = entry.selection;

    let factor = match direction {
        ResizeDirection::Grow => 1.0 + steps.size,
        ResizeDirection::Shrink => 1.0 - steps.size,
    };
    let width = (f64::from(old.width) * factor) as i32;
    let height = (f64::from(width) / entry.aspect) as i32;

    // Verify that the new size doesn't exceed bounds
    let sized = sanitize(Rect::new(0, 0, width, height), entry, steps.size);

    // Center the new box exactly where the old one was centered
    let centered = Rect {
        x: old.x + old.width / 2 - sized.width / 2,
        y: old.y + old.height / 2 - sized.height / 2,
        ..sized
    };

    entry.selection = sanitize(centered, entry, steps.size);
}

/// Move the selection by one step, keeping its size
pub fn move_selection(entry: &mut ImageEntry, direction: MoveDirection, steps: &Steps) {
    let dx = (steps.position * f64::from(entry.dimensions.width)) as i32;
    let dy = (steps.position * f64::from(entry.dimensions.height)) as i32;

    let mut candidate = entry.selection;
    match direction {
        MoveDirection::Up => candidate.y -= dy,
        MoveDirection::Down => candidate.y += dy,
        MoveDirection::Left => candidate.x -= dx,
        MoveDirection::Right => candidate.x += dx,
    }

    entry.selection = sanitize(candidate, entry, steps.size);
}

/// Flip the outline between light and dark
pub fn toggle_outline_color(entry: &mut ImageEntry) {
    entry.outline = entry.outline.toggled();
}

/// Smallest aspect-correct box, derived from the shorter side
fn floor_size(aspect: f64, floor: i32) -> (i32, i32) {
    let start = f64::from(floor + 1);
    if aspect > 1.0 {
        ((start * aspect) as i32, start as i32)
    } else {
        (start as i32, (start / aspect) as i32)
    }
}

/// Scale (width, height) down until it fits inside the image
fn clamp_size(width: i32, height: i32, img_w: i32, img_h: i32) -> (i32, i32) {
    let (img_w, img_h) = (i64::from(img_w), i64::from(img_h));
    let (mut w, mut h) = (i64::from(width), i64::from(height));

    for _ in 0..MAX_CLAMP_PASSES {
        if w <= img_w && h <= img_h {
            break;
        }
        if w > img_w {
            h = h * img_w / w;
            w = img_w;
        }
        if h > img_h {
            w = w * img_h / h;
            h = img_h;
        }
    }

    (w.clamp(1, img_w) as i32, h.clamp(1, img_h) as i32)
}
