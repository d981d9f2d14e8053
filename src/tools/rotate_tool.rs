use log::{debug, info};

use super::{Tool, ToolKind};
use crate::raster;
use crate::surface::Surface;

/// Quarter-turn rotation of the working buffer.
///
/// Quarter turns are destructive: the surface is re-rasterized with swapped
/// dimensions and becomes the new buffer. Any other angle is only recorded
/// as a presentation rotation that the next redraw applies.
#[derive(Debug, Clone, Default)]
pub struct RotateTool {
    active: bool,
}

impl RotateTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rotate_left(&mut self, surface: &mut Surface) -> bool {
        self.rotate(-90, surface)
    }

    pub fn rotate_right(&mut self, surface: &mut Surface) -> bool {
        self.rotate(90, surface)
    }

    /// Rotate by `degrees` (positive = clockwise). Returns true when the
    /// surface changed and needs a redraw.
    pub fn rotate(&mut self, degrees: i32, surface: &mut Surface) -> bool {
        if !surface.is_loaded() {
            debug!("rotate: no image loaded");
            return false;
        }

        surface.add_rotation(degrees);

        if degrees % 90 == 0 {
            let rotated = raster::rotate_quarter_turns(surface.frame(), degrees / 90);
            info!(
                "Rotated {} degrees: {}x{} -> {}x{}",
                degrees,
                surface.width(),
                surface.height(),
                rotated.width(),
                rotated.height()
            );
            surface.replace_buffer(rotated);
            // Framing from before the turn no longer applies
            surface.set_scale(1.0);
        } else {
            surface.add_pending_rotation(degrees);
            debug!("Presentation rotation now {} degrees", surface.pending_rotation());
        }
        true
    }
}

impl Tool for RotateTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Rotate
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, _surface: &Surface) {
        self.active = true;
    }

    fn deactivate(&mut self, _surface: &Surface) {
        self.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use image::{Rgba, RgbaImage};

    fn loaded_surface() -> Surface {
        let mut surface = Surface::new(&EditorConfig::default());
        surface.load(RgbaImage::from_fn(400, 300, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, 0, 255])
        }));
        surface.render_frame();
        surface
    }

    #[test]
    fn test_quarter_turn_swaps_dimensions_and_resets_framing() {
        let mut surface = loaded_surface();
        surface.set_scale(2.0);
        surface.set_offset(egui::vec2(10.0, 10.0));

        let mut tool = RotateTool::new();
        assert!(tool.rotate_right(&mut surface));
        surface.render_frame();

        assert_eq!((surface.width(), surface.height()), (300, 400));
        assert_eq!(surface.scale(), 1.0);
        assert_eq!(surface.offset(), egui::Vec2::ZERO);
        assert_eq!(surface.rotation_degrees(), 90);
    }

    #[test]
    fn test_left_turn_wraps_angle() {
        let mut surface = loaded_surface();
        let mut tool = RotateTool::new();
        tool.rotate_left(&mut surface);
        assert_eq!(surface.rotation_degrees(), 270);
    }

    #[test]
    fn test_arbitrary_angle_keeps_buffer() {
        let mut surface = loaded_surface();
        let mut tool = RotateTool::new();
        assert!(tool.rotate(45, &mut surface));
        surface.render_frame();

        assert_eq!(surface.buffer_size(), Some((400, 300)));
        assert_eq!(surface.pending_rotation(), 45);
        assert_eq!((surface.width(), surface.height()), (400, 300));
    }

    #[test]
    fn test_rotate_without_image_is_noop() {
        let mut surface = Surface::new(&EditorConfig::default());
        let mut tool = RotateTool::new();
        assert!(!tool.rotate_right(&mut surface));
        assert_eq!(surface.rotation_degrees(), 0);
    }
}
