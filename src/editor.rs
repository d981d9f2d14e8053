use std::borrow::Cow;

use egui::{Pos2, Rect};
use image::RgbaImage;
use log::{debug, info, trace};
use rand::rngs::StdRng;
use uuid::Uuid;

use crate::config::EditorConfig;
use crate::error::EditorResult;
use crate::event::{EditorEvent, EventBus, EventHandler, SubscriptionId};
use crate::filters;
use crate::fonts::FontBook;
use crate::geometry::CursorHint;
use crate::input::InputEvent;
use crate::raster;
use crate::surface::Surface;
use crate::tools::{FilterParam, FilterSettings, TextTool, ToolKind, ToolSet, ZoomDisplay, ZoomInfo};

/// A composited image ready to be written out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The coordination core.
///
/// Owns the surface, every tool and the event bus. Tools never reach each
/// other directly: operations go through the editor, which mutates the
/// surface and publishes lifecycle events that every tool and external
/// subscriber sees before the call returns.
pub struct Editor {
    config: EditorConfig,
    surface: Surface,
    tools: ToolSet,
    bus: EventBus,
    active_tool: Option<ToolKind>,
    fonts: FontBook,
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("surface", &self.surface)
            .field("active_tool", &self.active_tool)
            .field("subscribers", &self.bus.len())
            .finish_non_exhaustive()
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            surface: Surface::new(&config),
            tools: ToolSet::new(&config),
            bus: EventBus::new(),
            active_tool: None,
            fonts: FontBook::with_builtin_fonts(),
            config,
        }
    }

    /// Use `rng` for text placement and placeholder choice
    pub fn with_text_rng(mut self, rng: StdRng) -> Self {
        self.tools.text = TextTool::with_rng(&self.config, rng);
        self
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontBook {
        &mut self.fonts
    }

    pub fn is_loaded(&self) -> bool {
        self.surface.is_loaded()
    }

    pub fn active_tool(&self) -> Option<ToolKind> {
        self.active_tool
    }

    // --- Events ---

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> SubscriptionId {
        self.bus.subscribe(handler)
    }

    pub fn subscribe_fn(&self, handler: impl FnMut(&EditorEvent) + 'static) -> SubscriptionId {
        self.bus.subscribe_fn(handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.bus.unsubscribe(id)
    }

    /// Deliver `event` to every tool, then to external subscribers
    fn publish(&mut self, event: EditorEvent) {
        trace!("Publishing {event}");
        self.tools.dispatch(&event, &self.surface);
        self.bus.emit(&event);
    }

    // --- Surface lifecycle ---

    /// Decode `bytes` and load the result
    pub fn load_image(&mut self, bytes: &[u8]) -> EditorResult<()> {
        let image = raster::decode_image_blocking(bytes)?;
        self.load_decoded(image);
        Ok(())
    }

    /// Make an already decoded image both the original and the working buffer
    pub fn load_decoded(&mut self, image: RgbaImage) {
        info!("Loading image: {}x{}", image.width(), image.height());
        self.surface.load(image);
        self.redraw();
    }

    /// Re-rasterize the surface from the working buffer and announce it
    pub fn redraw(&mut self) {
        if self.surface.render_frame() {
            self.publish(EditorEvent::CanvasUpdated);
        }
    }

    /// Tell the editor where the canvas area is on screen
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.surface.set_viewport(viewport);
    }

    /// On-screen rectangle of the surface, including zoom and pan
    pub fn surface_rect(&self) -> Rect {
        self.surface.rect()
    }

    pub fn to_surface_local(&self, screen: Pos2) -> Pos2 {
        self.surface.to_local(screen)
    }

    /// Make `kind` the only active tool. Every tool is deactivated first,
    /// so subscribers always see `toolDeactivated` before `toolActivated`.
    pub fn activate_tool(&mut self, kind: ToolKind) -> bool {
        if !self.is_loaded() {
            debug!("activate_tool({}): no image loaded", kind.name());
            return false;
        }
        self.deactivate_all_tools();
        self.active_tool = Some(kind);
        info!("Activated tool: {}", kind.name());
        self.publish(EditorEvent::ToolActivated { tool: kind });
        true
    }

    pub fn deactivate_all_tools(&mut self) {
        self.active_tool = None;
        self.publish(EditorEvent::ToolDeactivated);
    }

    /// Go back to the image as loaded: transforms, filters, overlays and
    /// the active tool are all cleared.
    pub fn reset(&mut self) -> bool {
        if !self.surface.restore_original() {
            debug!("reset: no image loaded");
            return false;
        }
        info!("Resetting image");
        self.redraw();
        self.deactivate_all_tools();
        self.publish(EditorEvent::ImageReset);
        true
    }

    /// Composite the surface, the filters and the text overlays into a PNG.
    ///
    /// Works on a copy; no live state changes. `Ok(None)` when nothing is loaded.
    pub fn save(&self) -> EditorResult<Option<ExportedImage>> {
        if !self.is_loaded() {
            debug!("save: no image loaded");
            return Ok(None);
        }
        let mut composed = filters::apply_filters(self.surface.frame(), &self.tools.filters.settings());
        self.tools
            .text
            .rasterize(&mut composed, &self.fonts, self.surface.pixel_ratio());
        let bytes = raster::encode_png(&composed)?;
        info!(
            "Exported {}x{} image ({} bytes)",
            composed.width(),
            composed.height(),
            bytes.len()
        );
        Ok(Some(ExportedImage {
            file_name: self.config.export_file_name.clone(),
            bytes,
        }))
    }

    /// The surface as it should be presented, with filters applied.
    ///
    /// Filtering runs on a copy no larger than `preview_max_side`, with the
    /// blur radius scaled to match; [`Self::save`] filters at full size.
    pub fn preview_image(&self) -> Option<Cow<'_, RgbaImage>> {
        if !self.is_loaded() {
            return None;
        }
        let mut settings = self.tools.filters.settings();
        if settings.is_identity() {
            return Some(Cow::Borrowed(self.surface.frame()));
        }

        let frame = self.surface.frame();
        let preview = match raster::downscale_to_fit(frame, self.config.preview_max_side) {
            Some(small) => {
                settings.blur *= small.width() as f32 / frame.width() as f32;
                filters::apply_filters(&small, &settings)
            }
            None => filters::apply_filters(frame, &settings),
        };
        Some(Cow::Owned(preview))
    }

    // --- Input ---

    /// Route input to the active tool. Returns true when something consumed it.
    pub fn handle_input(&mut self, event: InputEvent) -> bool {
        // Zooming around the pointer works whichever tool is active
        if let InputEvent::ZoomAt { pos, delta_y } = event {
            if delta_y == 0.0 {
                return false;
            }
            let step = self.tools.zoom.step();
            let delta = if delta_y > 0.0 { -step } else { step };
            return self.zoom_to_point(pos, delta);
        }

        let Some(kind) = self.active_tool else {
            return false;
        };
        if !self.is_loaded() {
            return false;
        }

        match event {
            InputEvent::PointerDown { pos } => {
                let local = self.surface.to_local(pos);
                if !self.surface.contains_local(local) {
                    return false;
                }
                self.tools.get_mut(kind).on_pointer_down(local, &self.surface)
            }
            InputEvent::PointerMove { pos } => {
                let local = self.surface.to_local(pos);
                self.tools.get_mut(kind).on_pointer_move(local, &self.surface)
            }
            InputEvent::PointerUp { pos } => {
                let local = self.surface.to_local(pos);
                self.tools.get_mut(kind).on_pointer_up(local, &self.surface)
            }
            InputEvent::DoubleClick { pos } if kind == ToolKind::Text => {
                let local = self.surface.to_local(pos);
                self.tools.text.on_double_click(local)
            }
            InputEvent::Wheel { delta_y } if kind == ToolKind::Zoom => {
                self.tools.zoom.on_wheel(delta_y, &mut self.surface)
            }
            InputEvent::KeyDown { key, modifiers } if kind == ToolKind::Text => {
                self.tools.text.on_key(key, modifiers)
            }
            _ => false,
        }
    }

    /// Cursor the active tool wants at a screen position
    pub fn cursor_hint(&self, screen: Pos2) -> CursorHint {
        let local = self.surface.to_local(screen);
        match self.active_tool {
            Some(ToolKind::Crop) => self.tools.crop.cursor_hint(local),
            Some(ToolKind::Text) => self.tools.text.cursor_hint(local),
            _ => CursorHint::Default,
        }
    }

    // --- Crop ---

    /// Crop to the current selection, then redraw and deactivate all tools
    pub fn apply_crop(&mut self) -> bool {
        if !self.tools.crop.apply_crop(&mut self.surface) {
            return false;
        }
        self.redraw();
        self.deactivate_all_tools();
        true
    }

    pub fn cancel_crop(&mut self) {
        if !self.is_loaded() {
            return;
        }
        self.tools.crop.cancel_crop();
        self.deactivate_all_tools();
    }

    // --- Rotate ---

    pub fn rotate_left(&mut self) -> bool {
        self.rotate(-90)
    }

    pub fn rotate_right(&mut self) -> bool {
        self.rotate(90)
    }

    pub fn rotate(&mut self, degrees: i32) -> bool {
        if !self.tools.rotate.rotate(degrees, &mut self.surface) {
            return false;
        }
        self.redraw();
        true
    }

    // --- Zoom ---

    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        self.tools.zoom.set_zoom(zoom, &mut self.surface)
    }

    pub fn adjust_zoom(&mut self, delta: f32) -> bool {
        self.tools.zoom.adjust_zoom(delta, &mut self.surface)
    }

    pub fn zoom_in(&mut self) -> bool {
        self.tools.zoom.zoom_in(&mut self.surface)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.tools.zoom.zoom_out(&mut self.surface)
    }

    pub fn fit_to_canvas(&mut self) -> bool {
        self.tools.zoom.fit_to_canvas(&mut self.surface)
    }

    pub fn reset_zoom(&mut self) {
        self.tools.zoom.reset_zoom(&mut self.surface);
    }

    /// Zoom by `delta` around a screen position
    pub fn zoom_to_point(&mut self, screen: Pos2, delta: f32) -> bool {
        let local = self.surface.to_local(screen);
        self.tools.zoom.zoom_to_point(local, delta, &mut self.surface)
    }

    pub fn zoom_info(&self) -> ZoomInfo {
        self.tools.zoom.zoom_info(&self.surface)
    }

    pub fn zoom_display(&self) -> &ZoomDisplay {
        self.tools.zoom.display()
    }

    // --- Text ---

    pub fn add_text(&mut self) -> Option<Uuid> {
        self.tools.text.add_text(&self.surface)
    }

    /// Direct access for selection, editing and style controls
    pub fn text_mut(&mut self) -> &mut TextTool {
        &mut self.tools.text
    }

    // --- Filters ---

    pub fn set_filter(&mut self, param: FilterParam, value: f32) -> f32 {
        self.tools.filters.set(param, value)
    }

    pub fn filter_settings(&self) -> FilterSettings {
        self.tools.filters.settings()
    }

    pub fn set_filter_settings(&mut self, settings: FilterSettings) {
        self.tools.filters.set_settings(settings);
    }

    pub fn reset_filters(&mut self) {
        self.tools.filters.reset_filters();
    }

    pub fn filter_string(&self) -> String {
        self.tools.filters.filter_string()
    }

    /// Filter descriptor for the presentation; `None` until an image is loaded
    pub fn presentation_filter(&self) -> Option<String> {
        self.tools.filters.presentation_filter(&self.surface)
    }
}
