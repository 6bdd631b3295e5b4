/// Selection overlay
///
/// The image is drawn letterboxed into the window (scaled to fit, centered).
/// This canvas sits on top of it and strokes the selection box mapped from
/// image pixels into the same letterboxed area.
use iced::mouse::Cursor;
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::color::OutlineColor;
use crate::geometry::{Dimensions, Rect};

/// Outline width in screen pixels
const OUTLINE_WIDTH: f32 = 2.0;

/// Area an image of `image` size occupies when fit into `bounds`
pub fn letterbox(bounds: Size, image: Dimensions) -> Rectangle {
    if !image.is_valid() || bounds.width <= 0.0 || bounds.height <= 0.0 {
        return Rectangle::new(Point::ORIGIN, Size::ZERO);
    }

    let scale = (bounds.width / image.width as f32).min(bounds.height / image.height as f32);
    let size = Size::new(image.width as f32 * scale, image.height as f32 * scale);
    let origin = Point::new(
        (bounds.width - size.width) / 2.0,
        (bounds.height - size.height) / 2.0,
    );
    Rectangle::new(origin, size)
}

/// Map a selection in image pixels onto the letterboxed `area`
pub fn to_screen(selection: Rect, image: Dimensions, area: Rectangle) -> Rectangle {
    if !image.is_valid() {
        return Rectangle::new(area.position(), Size::ZERO);
    }

    let scale = area.width / image.width as f32;
    Rectangle {
        x: area.x + selection.x as f32 * scale,
        y: area.y + selection.y as f32 * scale,
        width: selection.width as f32 * scale,
        height: selection.height as f32 * scale,
    }
}

/// Canvas program drawing the selection outline
#[derive(Debug, Clone, Copy)]
pub struct SelectionOverlay {
    pub image: Dimensions,
    pub selection: Rect,
    pub outline: OutlineColor,
}

impl SelectionOverlay {
    pub fn new(image: Dimensions, selection: Rect, outline: OutlineColor) -> Self {
        Self {
            image,
            selection,
            outline,
        }
    }
}

impl<Message> canvas::Program<Message> for SelectionOverlay {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let area = letterbox(bounds.size(), self.image);
        let rect = to_screen(self.selection, self.image, area);
        if rect.width > 0.0 && rect.height > 0.0 {
            let path = Path::rectangle(rect.position(), rect.size());
            frame.stroke(
                &path,
                Stroke::default()
                    .with_color(Color::from(self.outline))
                    .with_width(OUTLINE_WIDTH),
            );
        }

        vec![frame.into_geometry()]
    }
}
