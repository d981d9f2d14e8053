use egui::{Pos2, Rect, Vec2, pos2};
use log::{debug, info};

use super::{Tool, ToolKind};
use crate::config::EditorConfig;
use crate::event::EditorEvent;
use crate::geometry::{CursorHint, ResizeHandle, clamp_to_bounds, handle_at};
use crate::raster;
use crate::surface::Surface;

/// Interaction state of the crop tool
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CropState {
    Inactive,
    /// Active, waiting for a press
    Idle,
    /// Drawing a new rectangle from `anchor`
    Selecting { anchor: Pos2 },
    /// Moving the selection; `grab` is the pointer's offset from its top-left
    Dragging { grab: Vec2 },
    /// Dragging one of the eight handles; `last` is the previous pointer position
    Resizing { handle: ResizeHandle, last: Pos2 },
}

/// Rectangle selection over the surface, in surface-local units
#[derive(Debug, Clone)]
pub struct CropTool {
    state: CropState,
    selection: Option<Rect>,
    min_size: f32,
    handle_size: f32,
}

impl CropTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            state: CropState::Inactive,
            selection: None,
            min_size: config.crop_min_size,
            handle_size: config.crop_handle_size,
        }
    }

    pub fn state(&self) -> CropState {
        self.state
    }

    /// The current selection, always normalized (top-left origin, non-negative size)
    pub fn selection(&self) -> Option<Rect> {
        self.selection
    }

    pub fn has_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn handle_size(&self) -> f32 {
        self.handle_size
    }

    pub fn handle_at(&self, pos: Pos2) -> Option<ResizeHandle> {
        self.selection
            .and_then(|selection| handle_at(pos, selection, self.handle_size))
    }

    /// Cursor to show while hovering at `pos`
    pub fn cursor_hint(&self, pos: Pos2) -> CursorHint {
        match self.state {
            CropState::Inactive => CursorHint::Default,
            CropState::Resizing { handle, .. } => handle.cursor(),
            CropState::Dragging { .. } => CursorHint::Move,
            CropState::Selecting { .. } => CursorHint::Crosshair,
            CropState::Idle => {
                if let Some(handle) = self.handle_at(pos) {
                    handle.cursor()
                } else if self.selection.is_some_and(|s| s.contains(pos)) {
                    CursorHint::Move
                } else {
                    CursorHint::Crosshair
                }
            }
        }
    }

    /// Discard the selection without touching the image.
    /// Returns false when there was nothing to discard.
    pub fn cancel_crop(&mut self) -> bool {
        let had_selection = self.selection.take().is_some();
        if self.state != CropState::Inactive {
            self.state = CropState::Idle;
        }
        had_selection
    }

    /// Cut the selected region out of the surface and make it the working buffer.
    ///
    /// The selection is mapped from local units to surface pixels with the
    /// surface's pixel ratio. Returns false when there is no selection or no
    /// image; the caller redraws and deactivates on success.
    pub fn apply_crop(&mut self, surface: &mut Surface) -> bool {
        let Some(selection) = self.selection else {
            debug!("apply_crop: no selection");
            return false;
        };
        if !surface.is_loaded() {
            debug!("apply_crop: no image loaded");
            return false;
        }

        let ratio = surface.pixel_ratio();
        let x = (selection.min.x * ratio.x).round().max(0.0) as u32;
        let y = (selection.min.y * ratio.y).round().max(0.0) as u32;
        let width = (selection.width() * ratio.x).round().max(1.0) as u32;
        let height = (selection.height() * ratio.y).round().max(1.0) as u32;

        let cropped = raster::crop_region(surface.frame(), x, y, width, height);
        info!(
            "Cropped {}x{} at ({}, {}) from {}x{}",
            cropped.width(),
            cropped.height(),
            x,
            y,
            surface.width(),
            surface.height()
        );
        surface.replace_buffer(cropped);

        self.selection = None;
        self.state = CropState::Idle;
        true
    }

    fn begin_selection(&mut self, pos: Pos2) {
        self.selection = Some(Rect::from_min_size(pos, Vec2::ZERO));
        self.state = CropState::Selecting { anchor: pos };
    }

    /// Move only the edges the handle owns by the pointer delta, then enforce
    /// the minimum size and keep the rectangle inside `bounds`.
    fn resize(&self, selection: Rect, handle: ResizeHandle, delta: Vec2, bounds: Vec2) -> Rect {
        let (mut left, mut top) = (selection.min.x, selection.min.y);
        let (mut right, mut bottom) = (selection.max.x, selection.max.y);

        if handle.moves_left() {
            left += delta.x;
        }
        if handle.moves_right() {
            right += delta.x;
        }
        if handle.moves_top() {
            top += delta.y;
        }
        if handle.moves_bottom() {
            bottom += delta.y;
        }

        // Minimum size is reached by moving the dragged edge back
        if right - left < self.min_size {
            if handle.moves_left() {
                left = right - self.min_size;
            } else {
                right = left + self.min_size;
            }
        }
        if bottom - top < self.min_size {
            if handle.moves_top() {
                top = bottom - self.min_size;
            } else {
                bottom = top + self.min_size;
            }
        }

        left = left.max(0.0);
        top = top.max(0.0);
        right = right.min(bounds.x);
        bottom = bottom.min(bounds.y);

        // A clamp may have shrunk the rectangle below the minimum again
        let min_w = self.min_size.min(bounds.x);
        let min_h = self.min_size.min(bounds.y);
        if right - left < min_w {
            if left <= 0.0 {
                right = min_w;
            } else {
                left = right - min_w;
            }
        }
        if bottom - top < min_h {
            if top <= 0.0 {
                bottom = min_h;
            } else {
                top = bottom - min_h;
            }
        }

        Rect::from_min_max(pos2(left, top), pos2(right, bottom))
    }
}

impl Tool for CropTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Crop
    }

    fn is_active(&self) -> bool {
        self.state != CropState::Inactive
    }

    fn activate(&mut self, _surface: &Surface) {
        self.selection = None;
        self.state = CropState::Idle;
        info!("Crop tool activated");
    }

    fn deactivate(&mut self, _surface: &Surface) {
        self.selection = None;
        self.state = CropState::Inactive;
    }

    fn on_event(&mut self, event: &EditorEvent, surface: &Surface) {
        match event {
            EditorEvent::ToolActivated { tool } if *tool == ToolKind::Crop => self.activate(surface),
            EditorEvent::ToolDeactivated | EditorEvent::ImageReset => self.deactivate(surface),
            EditorEvent::CanvasUpdated => {
                let bounds = Rect::from_min_size(Pos2::ZERO, surface.display_size());
                if self.selection.is_some_and(|s| !bounds.contains_rect(s)) {
                    debug!("Selection no longer fits the surface, discarding");
                    self.selection = None;
                    if self.is_active() {
                        self.state = CropState::Idle;
                    }
                }
            }
            _ => {}
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, surface: &Surface) -> bool {
        if !self.is_active() {
            return false;
        }
        let bounds = surface.display_size();

        if let Some(handle) = self.handle_at(pos) {
            self.state = CropState::Resizing { handle, last: pos };
            return true;
        }

        if let Some(selection) = self.selection {
            if selection.contains(pos) {
                self.state = CropState::Dragging {
                    grab: pos - selection.min,
                };
                return true;
            }
        }

        self.begin_selection(clamp_to_bounds(pos, bounds));
        true
    }

    fn on_pointer_move(&mut self, pos: Pos2, surface: &Surface) -> bool {
        let Some(selection) = self.selection else {
            return false;
        };
        let bounds = surface.display_size();

        match self.state {
            CropState::Selecting { anchor } => {
                let pos = clamp_to_bounds(pos, bounds);
                self.selection = Some(Rect::from_two_pos(anchor, pos));
                true
            }
            CropState::Dragging { grab } => {
                let max = (bounds - selection.size()).max(Vec2::ZERO);
                let min = (pos - grab).clamp(Pos2::ZERO, max.to_pos2());
                self.selection = Some(Rect::from_min_size(min, selection.size()));
                true
            }
            CropState::Resizing { handle, last } => {
                self.selection = Some(self.resize(selection, handle, pos - last, bounds));
                self.state = CropState::Resizing { handle, last: pos };
                true
            }
            CropState::Idle | CropState::Inactive => false,
        }
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _surface: &Surface) -> bool {
        match self.state {
            CropState::Selecting { .. } | CropState::Dragging { .. } | CropState::Resizing { .. } => {
                self.state = CropState::Idle;
                true
            }
            _ => false,
        }
    }

    fn current_state_name(&self) -> &'static str {
        match self.state {
            CropState::Inactive => "Inactive",
            CropState::Idle => "Idle",
            CropState::Selecting { .. } => "Selecting",
            CropState::Dragging { .. } => "Dragging",
            CropState::Resizing { .. } => "Resizing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn loaded_surface(w: u32, h: u32) -> Surface {
        let mut surface = Surface::new(&EditorConfig::default());
        surface.load(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])));
        surface.render_frame();
        surface
    }

    fn active_tool(surface: &Surface) -> CropTool {
        let mut tool = CropTool::new(&EditorConfig::default());
        tool.activate(surface);
        tool
    }

    fn draw(tool: &mut CropTool, surface: &Surface, from: Pos2, to: Pos2) {
        tool.on_pointer_down(from, surface);
        tool.on_pointer_move(to, surface);
        tool.on_pointer_up(to, surface);
    }

    #[test]
    fn test_selection_is_normalized_when_drawn_backwards() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(150.0, 120.0), pos2(50.0, 40.0));

        let selection = tool.selection().unwrap();
        assert_eq!(selection.min, pos2(50.0, 40.0));
        assert_eq!(selection.size(), Vec2::new(100.0, 80.0));
        assert_eq!(tool.state(), CropState::Idle);
    }

    #[test]
    fn test_selecting_clamps_pointer_to_bounds() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(350.0, 250.0), pos2(900.0, 900.0));

        assert_eq!(tool.selection().unwrap().max, pos2(400.0, 300.0));
    }

    #[test]
    fn test_drag_stays_inside_bounds() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(50.0, 50.0), pos2(150.0, 150.0));

        tool.on_pointer_down(pos2(100.0, 100.0), &surface);
        assert_eq!(tool.current_state_name(), "Dragging");
        tool.on_pointer_move(pos2(1000.0, -500.0), &surface);
        tool.on_pointer_up(pos2(1000.0, -500.0), &surface);

        let selection = tool.selection().unwrap();
        assert_eq!(selection.min, pos2(300.0, 0.0));
        assert_eq!(selection.size(), Vec2::new(100.0, 100.0));
    }

    #[test]
    fn test_resize_enforces_minimum_by_moving_dragged_edge() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(50.0, 50.0), pos2(150.0, 150.0));

        // Drag the east edge far past the west edge
        tool.on_pointer_down(pos2(150.0, 100.0), &surface);
        assert_eq!(tool.current_state_name(), "Resizing");
        tool.on_pointer_move(pos2(0.0, 100.0), &surface);

        let selection = tool.selection().unwrap();
        assert_eq!(selection.min.x, 50.0);
        assert_eq!(selection.width(), 20.0);
        assert_eq!(selection.height(), 100.0);
    }

    #[test]
    fn test_resize_never_leaves_bounds() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(50.0, 50.0), pos2(150.0, 150.0));

        tool.on_pointer_down(pos2(50.0, 50.0), &surface);
        tool.on_pointer_move(pos2(-300.0, -300.0), &surface);

        let selection = tool.selection().unwrap();
        assert_eq!(selection.min, Pos2::ZERO);
        assert_eq!(selection.max, pos2(150.0, 150.0));
    }

    #[test]
    fn test_resize_of_tiny_selection_against_edge() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(395.0, 295.0), pos2(400.0, 300.0));

        tool.on_pointer_down(pos2(400.0, 300.0), &surface);
        tool.on_pointer_move(pos2(402.0, 302.0), &surface);

        let selection = tool.selection().unwrap();
        assert!(selection.width() >= 20.0 && selection.height() >= 20.0);
        assert!(Rect::from_min_size(Pos2::ZERO, Vec2::new(400.0, 300.0)).contains_rect(selection));
    }

    #[test]
    fn test_apply_crop_uses_pixel_ratio() {
        // 2400x1200 fits as 1200x600, so one local unit is two pixels
        let mut surface = loaded_surface(2400, 1200);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(100.0, 100.0), pos2(200.0, 150.0));

        assert!(tool.apply_crop(&mut surface));
        assert_eq!(surface.buffer_size(), Some((200, 100)));
        assert!(!tool.has_selection());
    }

    #[test]
    fn test_apply_without_selection_is_noop() {
        let mut surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        assert!(!tool.apply_crop(&mut surface));
        assert_eq!(surface.buffer_size(), Some((400, 300)));
    }

    #[test]
    fn test_cursor_hints() {
        let surface = loaded_surface(400, 300);
        let mut tool = active_tool(&surface);
        draw(&mut tool, &surface, pos2(50.0, 50.0), pos2(150.0, 150.0));

        assert_eq!(tool.cursor_hint(pos2(50.0, 50.0)), CursorHint::ResizeNwSe);
        assert_eq!(tool.cursor_hint(pos2(100.0, 100.0)), CursorHint::Move);
        assert_eq!(tool.cursor_hint(pos2(300.0, 250.0)), CursorHint::Crosshair);
    }
}
