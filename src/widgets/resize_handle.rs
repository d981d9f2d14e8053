use egui::{Color32, CursorIcon, Painter, Rect, Stroke, Vec2};

use crate::geometry::{CursorHint, ResizeHandle};

const HANDLE_FILL: Color32 = Color32::from_rgb(30, 120, 255);

pub fn cursor_icon(hint: CursorHint) -> CursorIcon {
    match hint {
        CursorHint::Default => CursorIcon::Default,
        CursorHint::Crosshair => CursorIcon::Crosshair,
        CursorHint::Move => CursorIcon::Move,
        CursorHint::Grab => CursorIcon::Grab,
        CursorHint::Grabbing => CursorIcon::Grabbing,
        CursorHint::Text => CursorIcon::Text,
        CursorHint::ResizeNwSe => CursorIcon::ResizeNwSe,
        CursorHint::ResizeNeSw => CursorIcon::ResizeNeSw,
        CursorHint::ResizeVertical => CursorIcon::ResizeVertical,
        CursorHint::ResizeHorizontal => CursorIcon::ResizeHorizontal,
    }
}

/// The crop selection overlay: dimmed surroundings, a white
/// border and the eight resize handles. `selection` and `surface` are in
/// screen coordinates.
pub struct SelectionOverlay {
    selection: Rect,
    surface: Rect,
    handle_size: f32,
}

impl SelectionOverlay {
    pub fn new(selection: Rect, surface: Rect, handle_size: f32) -> Self {
        Self {
            selection,
            surface,
            handle_size,
        }
    }

    pub fn paint(&self, painter: &Painter) {
        let shade = Color32::from_black_alpha(128);
        let (outer, inner) = (self.surface, self.selection);

        // Four bands around the selection
        let bands = [
            Rect::from_min_max(outer.min, egui::pos2(outer.max.x, inner.min.y)),
            Rect::from_min_max(egui::pos2(outer.min.x, inner.max.y), outer.max),
            Rect::from_min_max(
                egui::pos2(outer.min.x, inner.min.y),
                egui::pos2(inner.min.x, inner.max.y),
            ),
            Rect::from_min_max(
                egui::pos2(inner.max.x, inner.min.y),
                egui::pos2(outer.max.x, inner.max.y),
            ),
        ];
        for band in bands {
            if band.is_positive() {
                painter.rect_filled(band, 0.0, shade);
            }
        }

        painter.rect_stroke(inner, 0.0, Stroke::new(2.0, Color32::WHITE));

        for handle in ResizeHandle::ALL {
            Self::draw_handle(painter, handle.anchor(inner), self.handle_size);
        }
    }

    /// Draw a single handle centered on `center`
    pub fn draw_handle(painter: &Painter, center: egui::Pos2, size: f32) {
        let rect = Rect::from_center_size(center, Vec2::splat(size));
        painter.rect_filled(rect, 2.0, HANDLE_FILL);
        painter.rect_stroke(rect, 2.0, Stroke::new(1.0, Color32::WHITE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resize_cursors_map_to_egui() {
        assert_eq!(cursor_icon(ResizeHandle::NorthWest.cursor()), CursorIcon::ResizeNwSe);
        assert_eq!(cursor_icon(ResizeHandle::East.cursor()), CursorIcon::ResizeHorizontal);
        assert_eq!(cursor_icon(CursorHint::Default), CursorIcon::Default);
    }
}
