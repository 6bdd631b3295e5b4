/// Selection outline colors
///
/// The outline only ever toggles between two opaque colors so that it stays
/// visible on both bright and dark photos.

/// Two-state outline color of a selection box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutlineColor {
    /// Opaque white (default)
    #[default]
    Light,
    /// Opaque black
    Dark,
}

impl OutlineColor {
    /// The other color
    pub fn toggled(self) -> Self {
        match self {
            OutlineColor::Light => OutlineColor::Dark,
            OutlineColor::Dark => OutlineColor::Light,
        }
    }

    /// RGBA components, 0-255
    pub fn rgba(self) -> [u8; 4] {
        match self {
            OutlineColor::Light => [255, 255, 255, 255],
            OutlineColor::Dark => [0, 0, 0, 255],
        }
    }
}

impl From<OutlineColor> for iced::Color {
    fn from(color: OutlineColor) -> Self {
        let [r, g, b, a] = color.rgba();
        iced::Color::from_rgba8(r, g, b, f32::from(a) / 255.0)
    }
}
