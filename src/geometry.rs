/// Plain geometry value types
///
/// All values live in image pixel space. Nothing here knows about aspect
/// ratios or image bounds; that is the job of the selection engine.

/// A rectangle in image pixel space
///
/// Offsets are signed so that a candidate box may temporarily hang off the
/// image edge before it is sanitized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Right edge (exclusive)
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Bottom edge (exclusive)
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Width and height of an image in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when both sides are non-zero
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Width / height as a float
    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Pixel count in megapixels
    pub fn megapixels(&self) -> f64 {
        (u64::from(self.width) * u64::from(self.height)) as f64 / 1_000_000.0
    }
}
