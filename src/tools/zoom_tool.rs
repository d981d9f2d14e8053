use egui::{Pos2, Vec2};
use log::debug;

use super::{Tool, ToolKind};
use crate::config::EditorConfig;
use crate::event::EditorEvent;
use crate::surface::Surface;

/// Snapshot of the zoom range and where the current scale sits in it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomInfo {
    pub current: f32,
    pub min: f32,
    pub max: f32,
    pub can_zoom_in: bool,
    pub can_zoom_out: bool,
}

/// What the zoom controls show
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomDisplay {
    /// Percentage label, e.g. "150%"
    pub label: String,
    pub slider: f32,
    pub zoom_in_enabled: bool,
    pub zoom_out_enabled: bool,
}

impl Default for ZoomDisplay {
    fn default() -> Self {
        Self {
            label: "100%".to_owned(),
            slider: 1.0,
            zoom_in_enabled: true,
            zoom_out_enabled: true,
        }
    }
}

/// Presentation-only magnification.
///
/// Zoom writes the surface's scale and pan offset but never its pixels, so
/// it needs no redraw and is fully reversible.
#[derive(Debug, Clone)]
pub struct ZoomTool {
    active: bool,
    min: f32,
    max: f32,
    step: f32,
    fit_padding: f32,
    display: ZoomDisplay,
}

impl ZoomTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            active: false,
            min: config.zoom_min,
            max: config.zoom_max,
            step: config.zoom_step,
            fit_padding: config.zoom_fit_padding,
            display: ZoomDisplay::default(),
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    pub fn display(&self) -> &ZoomDisplay {
        &self.display
    }

    /// Clamp into the zoom range; NaN maps to the minimum
    pub fn clamp(&self, zoom: f32) -> f32 {
        if zoom.is_nan() {
            return self.min;
        }
        zoom.clamp(self.min, self.max)
    }

    pub fn zoom_info(&self, surface: &Surface) -> ZoomInfo {
        let current = surface.scale();
        ZoomInfo {
            current,
            min: self.min,
            max: self.max,
            can_zoom_in: current < self.max,
            can_zoom_out: current > self.min,
        }
    }

    /// Set the scale, clamped into range. Returns false when no image is loaded.
    pub fn set_zoom(&mut self, zoom: f32, surface: &mut Surface) -> bool {
        if !surface.is_loaded() {
            debug!("set_zoom: no image loaded");
            return false;
        }
        if zoom.is_nan() {
            debug!("set_zoom: ignoring NaN");
            return false;
        }
        surface.set_scale(self.clamp(zoom));
        self.sync_display(surface);
        true
    }

    pub fn adjust_zoom(&mut self, delta: f32, surface: &mut Surface) -> bool {
        let target = surface.scale() + delta;
        self.set_zoom(target, surface)
    }

    pub fn zoom_in(&mut self, surface: &mut Surface) -> bool {
        self.adjust_zoom(self.step, surface)
    }

    pub fn zoom_out(&mut self, surface: &mut Surface) -> bool {
        self.adjust_zoom(-self.step, surface)
    }

    /// Wheel input while zoom is active; scrolling down zooms out
    pub fn on_wheel(&mut self, delta_y: f32, surface: &mut Surface) -> bool {
        if !self.active || delta_y == 0.0 {
            return false;
        }
        let delta = if delta_y > 0.0 { -self.step } else { self.step };
        self.adjust_zoom(delta, surface)
    }

    /// Largest scale, up to 100%, at which the surface fits the viewport
    pub fn fit_to_canvas(&mut self, surface: &mut Surface) -> bool {
        if !surface.is_loaded() {
            return false;
        }
        let display = surface.display_size();
        if display.x <= 0.0 || display.y <= 0.0 {
            return false;
        }
        let available = surface.viewport().size() - Vec2::splat(self.fit_padding);
        let fit = (available.x / display.x).min(available.y / display.y).min(1.0);
        self.set_zoom(fit, surface)
    }

    /// Change the scale by `delta` while keeping the surface-local point
    /// `focus` at the same place on screen.
    pub fn zoom_to_point(&mut self, focus: Pos2, delta: f32, surface: &mut Surface) -> bool {
        if !surface.is_loaded() {
            return false;
        }
        let old = surface.scale();
        let new = self.clamp(old + delta);
        if new == old {
            return false;
        }

        // Screen position is center + scale * (offset + focus - display / 2)
        let from_center = focus.to_vec2() - surface.display_size() * 0.5;
        let offset = (surface.offset() + from_center) * (old / new) - from_center;
        surface.set_offset(offset);
        self.set_zoom(new, surface)
    }

    /// Back to 100% with no pan
    pub fn reset_zoom(&mut self, surface: &mut Surface) {
        surface.set_scale(1.0);
        surface.set_offset(Vec2::ZERO);
        self.sync_display(surface);
    }

    fn sync_display(&mut self, surface: &Surface) {
        let info = self.zoom_info(surface);
        self.display = ZoomDisplay {
            label: format!("{}%", (info.current * 100.0).round() as i32),
            slider: info.current,
            zoom_in_enabled: info.can_zoom_in,
            zoom_out_enabled: info.can_zoom_out,
        };
    }
}

impl Tool for ZoomTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Zoom
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, surface: &Surface) {
        self.active = true;
        self.sync_display(surface);
    }

    fn deactivate(&mut self, _surface: &Surface) {
        self.active = false;
    }

    fn on_event(&mut self, event: &EditorEvent, surface: &Surface) {
        match event {
            EditorEvent::ToolActivated { tool } if *tool == ToolKind::Zoom => self.activate(surface),
            EditorEvent::ToolDeactivated => self.deactivate(surface),
            EditorEvent::CanvasUpdated | EditorEvent::ImageReset => self.sync_display(surface),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn setup() -> (ZoomTool, Surface) {
        let config = EditorConfig::default();
        let mut surface = Surface::new(&config);
        surface.load(RgbaImage::new(400, 300));
        surface.render_frame();
        (ZoomTool::new(&config), surface)
    }

    #[test]
    fn test_zoom_is_clamped() {
        let (mut zoom, mut surface) = setup();
        zoom.set_zoom(3.0, &mut surface);
        zoom.adjust_zoom(10.0, &mut surface);
        assert_eq!(surface.scale(), 3.0);

        zoom.set_zoom(0.25, &mut surface);
        zoom.adjust_zoom(-10.0, &mut surface);
        assert_eq!(surface.scale(), 0.25);
    }

    #[test]
    fn test_nan_zoom_keeps_scale_in_range() {
        let (mut zoom, mut surface) = setup();
        zoom.set_zoom(1.5, &mut surface);

        assert!(!zoom.set_zoom(f32::NAN, &mut surface));
        assert!(!zoom.adjust_zoom(f32::NAN, &mut surface));
        assert_eq!(surface.scale(), 1.5);
        assert!(surface.rect().min.x.is_finite());

        assert_eq!(zoom.clamp(f32::NAN), 0.25);
    }

    #[test]
    fn test_display_label_and_buttons() {
        let (mut zoom, mut surface) = setup();
        zoom.set_zoom(1.5, &mut surface);
        assert_eq!(zoom.display().label, "150%");
        assert!(zoom.display().zoom_in_enabled);

        zoom.set_zoom(3.0, &mut surface);
        assert!(!zoom.display().zoom_in_enabled);
        assert!(zoom.display().zoom_out_enabled);
    }

    #[test]
    fn test_zoom_does_not_touch_pixels() {
        let (mut zoom, mut surface) = setup();
        let revision = surface.revision();
        zoom.zoom_in(&mut surface);
        assert_eq!(surface.revision(), revision);
        assert_eq!((surface.width(), surface.height()), (400, 300));
    }

    #[test]
    fn test_wheel_only_when_active() {
        let (mut zoom, mut surface) = setup();
        assert!(!zoom.on_wheel(1.0, &mut surface));

        zoom.activate(&surface);
        assert!(zoom.on_wheel(1.0, &mut surface));
        assert_eq!(surface.scale(), 0.75);
        zoom.on_wheel(-1.0, &mut surface);
        assert_eq!(surface.scale(), 1.0);
    }

    #[test]
    fn test_fit_never_exceeds_full_size() {
        let (mut zoom, mut surface) = setup();
        zoom.fit_to_canvas(&mut surface);
        assert_eq!(surface.scale(), 1.0);

        surface.set_viewport(egui::Rect::from_min_size(Pos2::ZERO, egui::vec2(240.0, 340.0)));
        zoom.fit_to_canvas(&mut surface);
        assert_eq!(surface.scale(), 0.5);
    }

    #[test]
    fn test_zoom_to_point_keeps_focus_on_screen() {
        let (mut zoom, mut surface) = setup();
        let focus = egui::pos2(100.0, 50.0);
        let before = surface.to_screen(focus);

        assert!(zoom.zoom_to_point(focus, 1.0, &mut surface));
        let after = surface.to_screen(focus);
        assert!((before - after).length() < 1e-3);
        assert_eq!(surface.scale(), 2.0);
    }

    #[test]
    fn test_zoom_without_image_is_noop() {
        let config = EditorConfig::default();
        let mut surface = Surface::new(&config);
        let mut zoom = ZoomTool::new(&config);
        assert!(!zoom.zoom_in(&mut surface));
        assert_eq!(surface.scale(), 1.0);
    }
}
