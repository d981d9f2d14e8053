use egui::{Color32, Key, Modifiers, Pos2, Rect, Vec2, pos2, vec2};
use image::RgbaImage;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use uuid::Uuid;

use super::{Tool, ToolKind};
use crate::config::EditorConfig;
use crate::event::EditorEvent;
use crate::fonts::{self, FontBook, TextRun};
use crate::geometry::{CursorHint, clamp_prefer_min};
use crate::surface::Surface;

/// Texts offered when the user adds text without typing any
pub const PLACEHOLDER_TEXTS: [&str; 10] = [
    "Sample Text",
    "Your Text Here",
    "Edit Me",
    "Click to Edit",
    "Add Your Message",
    "Custom Text",
    "Type Here",
    "Hello World",
    "Amazing Photo",
    "Beautiful Image",
];

/// Shown when an edit leaves an element empty
const EMPTY_TEXT: &str = "Empty Text";

/// Padding around the glyphs of an element, both axes
pub const ELEMENT_PADDING: f32 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// CSS-style family list, first match wins
    pub font_family: String,
    pub font_size: f32,
    pub color: Color32,
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    pub fn from_config(config: &EditorConfig) -> Self {
        let [r, g, b] = config.default_text_color;
        Self {
            font_family: config.default_font_family.clone(),
            font_size: config.default_font_size,
            color: Color32::from_rgb(r, g, b),
            bold: false,
            italic: false,
        }
    }
}

/// A text block floating above the surface. Positions are surface-local.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub id: Uuid,
    pub text: String,
    pub style: TextStyle,
    /// Top-left corner
    pub position: Pos2,
    /// Size reported by whoever lays the text out on screen
    pub measured_size: Option<Vec2>,
}

impl TextElement {
    /// On-screen extent: the measured size when known, otherwise an estimate
    pub fn extent(&self) -> Vec2 {
        self.measured_size.unwrap_or_else(|| {
            let chars = self.text.chars().count() as f32;
            vec2(
                chars * self.style.font_size * 0.6 + ELEMENT_PADDING,
                self.style.font_size * 1.2 + ELEMENT_PADDING,
            )
        })
    }

    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position, self.extent())
    }
}

/// Values of the text controls. New elements take this style; edits to it
/// are copied onto the selected element.
#[derive(Debug, Clone, PartialEq)]
pub struct TextControls {
    pub input: String,
    pub style: TextStyle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { id: Uuid, grab: Vec2 },
}

/// Overlay text elements and their selection, drag and edit lifecycle.
///
/// Elements are never written into the working buffer; they are burnt in
/// only when exporting.
#[derive(Debug)]
pub struct TextTool {
    active: bool,
    elements: Vec<TextElement>,
    selected: Option<Uuid>,
    editing: Option<Uuid>,
    drag: DragState,
    controls: TextControls,
    counter: usize,
    rng: StdRng,
    spawn_padding: f32,
    spawn_reserve: Vec2,
    drag_margin: f32,
}

impl TextTool {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Construct with a fixed random source, for reproducible placement
    pub fn with_rng(config: &EditorConfig, rng: StdRng) -> Self {
        Self {
            active: false,
            elements: Vec::new(),
            selected: None,
            editing: None,
            drag: DragState::Idle,
            controls: TextControls {
                input: String::new(),
                style: TextStyle::from_config(config),
            },
            counter: 1,
            rng,
            spawn_padding: config.text_spawn_padding,
            spawn_reserve: Vec2::from(config.text_spawn_reserve),
            drag_margin: config.text_drag_margin,
        }
    }

    pub fn elements(&self) -> &[TextElement] {
        &self.elements
    }

    pub fn element(&self, id: Uuid) -> Option<&TextElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    fn element_mut(&mut self, id: Uuid) -> Option<&mut TextElement> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    pub fn selected(&self) -> Option<Uuid> {
        self.selected
    }

    pub fn selected_element(&self) -> Option<&TextElement> {
        self.selected.and_then(|id| self.element(id))
    }

    pub fn editing(&self) -> Option<Uuid> {
        self.editing
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn controls(&self) -> &TextControls {
        &self.controls
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.controls.input = text.into();
    }

    /// Topmost element under `pos`
    pub fn element_at(&self, pos: Pos2) -> Option<Uuid> {
        self.elements
            .iter()
            .rev()
            .find(|e| e.rect().contains(pos))
            .map(|e| e.id)
    }

    pub fn cursor_hint(&self, pos: Pos2) -> CursorHint {
        if !self.active {
            return CursorHint::Default;
        }
        match (self.drag, self.element_at(pos)) {
            (DragState::Dragging { .. }, _) => CursorHint::Grabbing,
            (_, Some(id)) if self.editing == Some(id) => CursorHint::Text,
            (_, Some(_)) => CursorHint::Move,
            (_, None) => CursorHint::Default,
        }
    }

    /// Add an element using the pending input, or a numbered placeholder
    /// when the input is blank. The new element is placed at a random spot
    /// inside the surface and selected.
    pub fn add_text(&mut self, surface: &Surface) -> Option<Uuid> {
        if !surface.is_loaded() {
            debug!("add_text: no image loaded");
            return None;
        }

        let input = self.controls.input.trim();
        let text = if input.is_empty() {
            let placeholder = PLACEHOLDER_TEXTS[self.rng.gen_range(0..PLACEHOLDER_TEXTS.len())];
            let text = format!("{placeholder} {}", self.counter);
            self.counter += 1;
            text
        } else {
            input.to_owned()
        };

        let position = self.spawn_position(surface.display_size());
        let element = TextElement {
            id: Uuid::new_v4(),
            text,
            style: self.controls.style.clone(),
            position,
            measured_size: None,
        };
        let id = element.id;
        info!("Added text '{}' at ({:.0}, {:.0})", element.text, position.x, position.y);

        self.elements.push(element);
        self.controls.input.clear();
        self.select(id);
        Some(id)
    }

    fn spawn_position(&mut self, bounds: Vec2) -> Pos2 {
        let padding = self.spawn_padding;
        let max_x = padding.max(bounds.x - self.spawn_reserve.x);
        let max_y = padding.max(bounds.y - self.spawn_reserve.y);
        pos2(
            self.rng.gen_range(padding..=max_x),
            self.rng.gen_range(padding..=max_y),
        )
    }

    /// Make `id` the selected element and load its style into the controls
    pub fn select(&mut self, id: Uuid) -> bool {
        let Some(style) = self.element(id).map(|e| e.style.clone()) else {
            return false;
        };
        if self.editing.is_some_and(|editing| editing != id) {
            self.commit_edit();
        }
        self.selected = Some(id);
        self.controls.style = style;
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.elements.len();
        self.elements.retain(|e| e.id != id);
        if self.elements.len() == before {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        if self.editing == Some(id) {
            self.editing = None;
        }
        if matches!(self.drag, DragState::Dragging { id: dragged, .. } if dragged == id) {
            self.drag = DragState::Idle;
        }
        info!("Deleted text element {id}");
        true
    }

    pub fn delete_selected(&mut self) -> bool {
        match self.selected {
            Some(id) => self.delete(id),
            None => false,
        }
    }

    pub fn clear_all(&mut self) {
        self.elements.clear();
        self.selected = None;
        self.editing = None;
        self.drag = DragState::Idle;
    }

    /// Enter inline editing of `id`
    pub fn start_editing(&mut self, id: Uuid) -> bool {
        if !self.active || self.element(id).is_none() {
            return false;
        }
        self.select(id);
        self.editing = Some(id);
        self.drag = DragState::Idle;
        true
    }

    /// Replace the text of the element being edited
    pub fn update_edit(&mut self, text: &str) -> bool {
        let Some(id) = self.editing else {
            return false;
        };
        match self.element_mut(id) {
            Some(element) => {
                element.text = text.to_owned();
                element.measured_size = None;
                true
            }
            None => false,
        }
    }

    /// Leave inline editing. Blank text becomes a placeholder.
    pub fn commit_edit(&mut self) -> bool {
        let Some(id) = self.editing.take() else {
            return false;
        };
        if let Some(element) = self.element_mut(id) {
            if element.text.trim().is_empty() {
                element.text = EMPTY_TEXT.to_owned();
                element.measured_size = None;
            }
        }
        true
    }

    pub fn set_measured_size(&mut self, id: Uuid, size: Vec2) {
        if let Some(element) = self.element_mut(id) {
            element.measured_size = Some(size);
        }
    }

    fn apply_to_selected(&mut self, apply: impl FnOnce(&mut TextStyle)) {
        let Some(id) = self.selected else {
            return;
        };
        if let Some(element) = self.element_mut(id) {
            apply(&mut element.style);
            element.measured_size = None;
        }
    }

    pub fn set_font_family(&mut self, family: &str) {
        self.controls.style.font_family = family.to_owned();
        self.apply_to_selected(|style| style.font_family = family.to_owned());
    }

    pub fn set_font_size(&mut self, size: f32) {
        let size = size.max(1.0);
        self.controls.style.font_size = size;
        self.apply_to_selected(|style| style.font_size = size);
    }

    pub fn set_color(&mut self, color: Color32) {
        self.controls.style.color = color;
        self.apply_to_selected(|style| style.color = color);
    }

    pub fn set_bold(&mut self, bold: bool) {
        self.controls.style.bold = bold;
        self.apply_to_selected(|style| style.bold = bold);
    }

    pub fn set_italic(&mut self, italic: bool) {
        self.controls.style.italic = italic;
        self.apply_to_selected(|style| style.italic = italic);
    }

    pub fn toggle_bold(&mut self) {
        self.set_bold(!self.controls.style.bold);
    }

    pub fn toggle_italic(&mut self) {
        self.set_italic(!self.controls.style.italic);
    }

    /// Double-click on the surface: start editing the element under the pointer
    pub fn on_double_click(&mut self, pos: Pos2) -> bool {
        match self.element_at(pos) {
            Some(id) => self.start_editing(id),
            None => false,
        }
    }

    /// Keyboard shortcuts. Returns true when the key was consumed.
    pub fn on_key(&mut self, key: Key, modifiers: Modifiers) -> bool {
        if !self.active {
            return false;
        }
        let command = modifiers.ctrl || modifiers.command || modifiers.mac_cmd;
        match key {
            Key::Delete | Key::Backspace if command => self.delete_selected(),
            Key::Enter if !modifiers.shift => self.commit_edit(),
            Key::Escape => self.commit_edit(),
            _ => false,
        }
    }

    fn clamp_into(&self, element: &TextElement, bounds: Vec2) -> Pos2 {
        let extent = element.extent();
        let margin = self.drag_margin;
        pos2(
            clamp_prefer_min(element.position.x, margin, bounds.x - extent.x - margin),
            clamp_prefer_min(element.position.y, margin, bounds.y - extent.y - margin),
        )
    }

    fn clamp_all(&mut self, bounds: Vec2) {
        let positions: Vec<Pos2> = self
            .elements
            .iter()
            .map(|element| self.clamp_into(element, bounds))
            .collect();
        for (element, position) in self.elements.iter_mut().zip(positions) {
            element.position = position;
        }
    }

    /// Burn every element into `target`, mapping local units to pixels with
    /// `pixel_ratio`. Elements whose font cannot be resolved are skipped.
    pub fn rasterize(&self, target: &mut RgbaImage, fonts: &FontBook, pixel_ratio: Vec2) {
        for element in &self.elements {
            let Some(font) = fonts.resolve(&element.style.font_family) else {
                warn!(
                    "No font for '{}', skipping text '{}'",
                    element.style.font_family, element.text
                );
                continue;
            };
            let rect = element.rect();
            let run = TextRun {
                text: &element.text,
                size: element.style.font_size * pixel_ratio.y,
                color: element.style.color,
                bold: element.style.bold,
                italic: element.style.italic,
            };
            fonts::draw_text(
                target,
                font,
                &run,
                rect.min.x * pixel_ratio.x,
                rect.max.y * pixel_ratio.y,
            );
        }
    }
}

impl Tool for TextTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Text
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn activate(&mut self, _surface: &Surface) {
        self.active = true;
        info!("Text tool activated with {} elements", self.elements.len());
    }

    fn deactivate(&mut self, _surface: &Surface) {
        self.active = false;
        self.commit_edit();
        self.deselect();
        self.drag = DragState::Idle;
    }

    fn on_event(&mut self, event: &EditorEvent, surface: &Surface) {
        match event {
            EditorEvent::ToolActivated { tool } if *tool == ToolKind::Text => self.activate(surface),
            EditorEvent::ToolDeactivated => self.deactivate(surface),
            EditorEvent::ImageReset => self.clear_all(),
            EditorEvent::CanvasUpdated => self.clamp_all(surface.display_size()),
            _ => {}
        }
    }

    fn on_pointer_down(&mut self, pos: Pos2, _surface: &Surface) -> bool {
        if !self.active {
            return false;
        }
        let Some(id) = self.element_at(pos) else {
            self.commit_edit();
            self.deselect();
            return true;
        };
        // Presses inside the element being edited belong to the text field
        if self.editing == Some(id) {
            return true;
        }
        if self.selected != Some(id) {
            self.select(id);
        }
        if let Some(element) = self.element(id) {
            self.drag = DragState::Dragging {
                id,
                grab: pos - element.position,
            };
        }
        true
    }

    fn on_pointer_move(&mut self, pos: Pos2, surface: &Surface) -> bool {
        let DragState::Dragging { id, grab } = self.drag else {
            return false;
        };
        if !self.active {
            return false;
        }
        let bounds = surface.display_size();
        let Some(mut moved) = self.element(id).cloned() else {
            self.drag = DragState::Idle;
            return false;
        };
        moved.position = pos - grab;
        let clamped = self.clamp_into(&moved, bounds);
        if let Some(element) = self.element_mut(id) {
            element.position = clamped;
        }
        true
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _surface: &Surface) -> bool {
        let was_dragging = matches!(self.drag, DragState::Dragging { .. });
        self.drag = DragState::Idle;
        was_dragging
    }

    fn current_state_name(&self) -> &'static str {
        match (self.active, self.drag, self.editing) {
            (false, ..) => "Inactive",
            (true, DragState::Dragging { .. }, _) => "Dragging",
            (true, _, Some(_)) => "Editing",
            (true, DragState::Idle, None) => "Idle",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (TextTool, Surface) {
        let config = EditorConfig::default();
        let mut surface = Surface::new(&config);
        surface.load(RgbaImage::new(400, 300));
        surface.render_frame();
        let mut tool = TextTool::with_rng(&config, StdRng::seed_from_u64(7));
        tool.activate(&surface);
        (tool, surface)
    }

    #[test]
    fn test_placeholder_text_is_numbered() {
        let (mut tool, surface) = setup();
        let first = tool.add_text(&surface).unwrap();
        let second = tool.add_text(&surface).unwrap();

        let first = &tool.element(first).unwrap().text;
        let second = &tool.element(second).unwrap().text;
        assert!(first.ends_with(" 1"));
        assert!(second.ends_with(" 2"));
        assert!(PLACEHOLDER_TEXTS.iter().any(|p| first.starts_with(p)));
    }

    #[test]
    fn test_typed_text_is_used_and_cleared() {
        let (mut tool, surface) = setup();
        tool.set_input_text("  Caption  ");
        let id = tool.add_text(&surface).unwrap();
        assert_eq!(tool.element(id).unwrap().text, "Caption");
        assert!(tool.controls().input.is_empty());
        assert_eq!(tool.selected(), Some(id));
    }

    #[test]
    fn test_spawn_position_is_padded() {
        let (mut tool, surface) = setup();
        for _ in 0..50 {
            let id = tool.add_text(&surface).unwrap();
            let pos = tool.element(id).unwrap().position;
            assert!((50.0..=200.0).contains(&pos.x));
            assert!((50.0..=220.0).contains(&pos.y));
        }
    }

    #[test]
    fn test_drag_is_clamped_with_margin() {
        let (mut tool, surface) = setup();
        let id = tool.add_text(&surface).unwrap();
        tool.set_measured_size(id, vec2(100.0, 40.0));
        let start = tool.element(id).unwrap().position + vec2(10.0, 10.0);

        assert!(tool.on_pointer_down(start, &surface));
        assert_eq!(tool.current_state_name(), "Dragging");
        tool.on_pointer_move(pos2(1000.0, 1000.0), &surface);
        tool.on_pointer_up(pos2(1000.0, 1000.0), &surface);

        assert_eq!(tool.element(id).unwrap().position, pos2(295.0, 255.0));

        tool.on_pointer_down(pos2(300.0, 260.0), &surface);
        tool.on_pointer_move(pos2(-500.0, -500.0), &surface);
        assert_eq!(tool.element(id).unwrap().position, pos2(5.0, 5.0));
    }

    #[test]
    fn test_click_outside_deselects() {
        let (mut tool, surface) = setup();
        tool.add_text(&surface);
        assert!(tool.selected().is_some());
        tool.on_pointer_down(pos2(399.0, 1.0), &surface);
        assert!(tool.selected().is_none());
    }

    #[test]
    fn test_empty_edit_commits_placeholder() {
        let (mut tool, surface) = setup();
        let id = tool.add_text(&surface).unwrap();
        let inside = tool.element(id).unwrap().rect().center();

        assert!(tool.on_double_click(inside));
        assert_eq!(tool.editing(), Some(id));
        tool.update_edit("   ");
        assert!(tool.on_key(Key::Enter, Modifiers::NONE));
        assert_eq!(tool.element(id).unwrap().text, "Empty Text");
        assert_eq!(tool.editing(), None);
    }

    #[test]
    fn test_style_controls_apply_to_selection_only() {
        let (mut tool, surface) = setup();
        let first = tool.add_text(&surface).unwrap();
        let second = tool.add_text(&surface).unwrap();

        tool.set_font_size(48.0);
        tool.toggle_bold();
        assert_eq!(tool.element(second).unwrap().style.font_size, 48.0);
        assert!(tool.element(second).unwrap().style.bold);
        assert_eq!(tool.element(first).unwrap().style.font_size, 24.0);

        tool.select(first);
        assert_eq!(tool.controls().style.font_size, 24.0);
        assert!(!tool.controls().style.bold);
    }

    #[test]
    fn test_canvas_update_pulls_elements_back_inside() {
        let (mut tool, mut surface) = setup();
        let id = tool.add_text(&surface).unwrap();
        tool.set_measured_size(id, vec2(100.0, 40.0));

        // Shrinks the display to the 300x200 minimum
        surface.replace_buffer(RgbaImage::new(150, 100));
        surface.render_frame();
        tool.on_event(&EditorEvent::CanvasUpdated, &surface);

        let rect = tool.element(id).unwrap().rect();
        assert!(rect.max.x <= 295.0 && rect.max.y <= 195.0);
    }

    #[test]
    fn test_estimated_extent() {
        let config = EditorConfig::default();
        let element = TextElement {
            id: Uuid::new_v4(),
            text: "abcd".to_owned(),
            style: TextStyle::from_config(&config),
            position: Pos2::ZERO,
            measured_size: None,
        };
        assert_eq!(element.extent(), vec2(4.0 * 24.0 * 0.6 + 10.0, 24.0 * 1.2 + 10.0));
    }
}
