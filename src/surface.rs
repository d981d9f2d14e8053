use std::sync::Arc;

use egui::{Pos2, Rect, Vec2, vec2};
use image::RgbaImage;

use crate::config::EditorConfig;
use crate::raster;

/// Limits used to lay the surface out on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayLimits {
    pub max: Vec2,
    pub min: Vec2,
    pub viewport_fill: f32,
}

impl DisplayLimits {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            max: Vec2::from(config.max_display),
            min: Vec2::from(config.min_display),
            viewport_fill: config.viewport_fill,
        }
    }
}

/// On-screen size for an image of `image_size` pixels inside `viewport`.
///
/// Oversized images shrink to fit while keeping their aspect ratio; images
/// under the minimum are scaled up until both sides reach it.
pub fn fit_display_size(image_size: Vec2, viewport: Vec2, limits: &DisplayLimits) -> Vec2 {
    if image_size.x <= 0.0 || image_size.y <= 0.0 {
        return Vec2::ZERO;
    }

    let max = vec2(
        (viewport.x * limits.viewport_fill).min(limits.max.x),
        (viewport.y * limits.viewport_fill).min(limits.max.y),
    );

    let mut size = image_size;
    if size.x > max.x || size.y > max.y {
        let ratio = (max.x / size.x).min(max.y / size.y);
        size *= ratio;
    }

    if size.x < limits.min.x || size.y < limits.min.y {
        let ratio = (limits.min.x / size.x).max(limits.min.y / size.y);
        size *= ratio;
    }

    size
}

/// The drawing surface and everything the editor knows about the loaded image.
///
/// Coordinates called "local" are in unzoomed display units with the origin
/// at the surface's top-left corner. Tools receive pointer positions in
/// local units and keep their state in them.
pub struct Surface {
    /// The image as first loaded. Only `reset` reads it.
    original: Option<Arc<RgbaImage>>,
    /// Working buffer, replaced wholesale by destructive operations
    current: Option<RgbaImage>,
    /// Drawing surface pixels, produced by `render_frame`
    frame: RgbaImage,

    display_size: Vec2,
    scale: f32,
    rotation_degrees: i32,
    /// Rotation shown on the surface but not yet realised in the buffer
    pending_rotation: i32,
    offset: Vec2,

    loaded: bool,
    viewport: Rect,
    limits: DisplayLimits,
    revision: u64,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("buffer_size", &self.buffer_size())
            .field("frame_size", &self.frame.dimensions())
            .field("display_size", &self.display_size)
            .field("scale", &self.scale)
            .field("rotation_degrees", &self.rotation_degrees)
            .field("offset", &self.offset)
            .field("loaded", &self.loaded)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl Surface {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            original: None,
            current: None,
            frame: RgbaImage::new(0, 0),
            display_size: Vec2::ZERO,
            scale: 1.0,
            rotation_degrees: 0,
            pending_rotation: 0,
            offset: Vec2::ZERO,
            loaded: false,
            viewport: Rect::from_min_size(Pos2::ZERO, Vec2::from(config.default_viewport)),
            limits: DisplayLimits::from_config(config),
            revision: 0,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Drawing surface width in pixels
    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    /// Drawing surface height in pixels
    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    pub fn current(&self) -> Option<&RgbaImage> {
        self.current.as_ref()
    }

    pub fn original(&self) -> Option<&RgbaImage> {
        self.original.as_deref()
    }

    pub fn buffer_size(&self) -> Option<(u32, u32)> {
        self.current.as_ref().map(RgbaImage::dimensions)
    }

    /// Unzoomed on-screen size; also the extent of local coordinates
    pub fn display_size(&self) -> Vec2 {
        self.display_size
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn rotation_degrees(&self) -> i32 {
        self.rotation_degrees
    }

    pub fn pending_rotation(&self) -> i32 {
        self.pending_rotation
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Bumped on every redraw so presentation layers know to refresh
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Surface pixels per local unit, per axis
    pub fn pixel_ratio(&self) -> Vec2 {
        if self.display_size.x <= 0.0 || self.display_size.y <= 0.0 {
            return vec2(1.0, 1.0);
        }
        vec2(
            self.width() as f32 / self.display_size.x,
            self.height() as f32 / self.display_size.y,
        )
    }

    /// On-screen bounding box of the surface, including zoom and pan
    pub fn rect(&self) -> Rect {
        let center = self.viewport.center() + self.offset * self.scale;
        Rect::from_center_size(center, self.display_size * self.scale)
    }

    /// Map a screen position into local units
    pub fn to_local(&self, screen: Pos2) -> Pos2 {
        let rect = self.rect();
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        Pos2::ZERO + (screen - rect.min) / scale
    }

    /// Map a local position back onto the screen
    pub fn to_screen(&self, local: Pos2) -> Pos2 {
        self.rect().min + local.to_vec2() * self.scale
    }

    pub fn contains_local(&self, local: Pos2) -> bool {
        Rect::from_min_size(Pos2::ZERO, self.display_size).contains(local)
    }

    pub(crate) fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    pub(crate) fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    pub(crate) fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Accumulate rotation into the informational angle
    pub(crate) fn add_rotation(&mut self, degrees: i32) {
        self.rotation_degrees = (self.rotation_degrees + degrees).rem_euclid(360);
    }

    /// Accumulate rotation that `render_frame` applies without touching the buffer
    pub(crate) fn add_pending_rotation(&mut self, degrees: i32) {
        self.pending_rotation = (self.pending_rotation + degrees).rem_euclid(360);
    }

    /// Take a freshly decoded image as both original and working buffer
    pub(crate) fn load(&mut self, image: RgbaImage) {
        self.original = Some(Arc::new(image.clone()));
        self.current = Some(image);
        self.setup();
        self.loaded = true;
    }

    /// Put the original image back as the working buffer
    pub(crate) fn restore_original(&mut self) -> bool {
        let Some(original) = &self.original else {
            return false;
        };
        self.current = Some(original.as_ref().clone());
        self.setup();
        true
    }

    /// Replace the working buffer after a destructive operation.
    ///
    /// The new buffer already contains whatever was on the surface, so any
    /// pending rotation is consumed and the pan is cleared.
    pub(crate) fn replace_buffer(&mut self, image: RgbaImage) {
        self.current = Some(image);
        self.pending_rotation = 0;
        self.offset = Vec2::ZERO;
        self.refit();
    }

    /// Reset every transform and lay the surface out for the current buffer
    fn setup(&mut self) {
        self.scale = 1.0;
        self.rotation_degrees = 0;
        self.pending_rotation = 0;
        self.offset = Vec2::ZERO;
        self.refit();
    }

    fn refit(&mut self) {
        if let Some((w, h)) = self.buffer_size() {
            self.display_size =
                fit_display_size(vec2(w as f32, h as f32), self.viewport.size(), &self.limits);
        }
    }

    /// Clear the surface and draw the working buffer onto it.
    ///
    /// The surface takes the buffer's dimensions. Only the pending rotation
    /// affects pixels; zoom and pan are applied at presentation time.
    /// Returns false when there is nothing to draw.
    pub(crate) fn render_frame(&mut self) -> bool {
        let Some(current) = &self.current else {
            return false;
        };
        self.frame = if self.pending_rotation == 0 {
            current.clone()
        } else {
            raster::rotate_about_center(current, self.pending_rotation as f32)
        };
        self.revision += 1;
        debug_assert_eq!(self.frame.dimensions(), current.dimensions());
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limits() -> DisplayLimits {
        DisplayLimits::from_config(&EditorConfig::default())
    }

    #[test]
    fn test_fit_keeps_in_range_sizes() {
        let size = fit_display_size(vec2(400.0, 300.0), vec2(1400.0, 900.0), &limits());
        assert_eq!(size, vec2(400.0, 300.0));
    }

    #[test]
    fn test_fit_scales_down_oversized() {
        let size = fit_display_size(vec2(2400.0, 1200.0), vec2(1400.0, 900.0), &limits());
        assert_eq!(size, vec2(1200.0, 600.0));
    }

    #[test]
    fn test_fit_scales_up_small_images() {
        let size = fit_display_size(vec2(100.0, 50.0), vec2(1400.0, 900.0), &limits());
        // Width needs x3, height needs x4; the larger ratio wins
        assert_eq!(size, vec2(400.0, 200.0));
    }

    #[test]
    fn test_fit_respects_viewport_fill() {
        let size = fit_display_size(vec2(1000.0, 500.0), vec2(1000.0, 1000.0), &limits());
        assert_eq!(size, vec2(900.0, 450.0));
    }
}
