use serde::{Deserialize, Serialize};

use crate::error::EditorResult;

/// Tunable constants for the editor.
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old config
pub struct EditorConfig {
    /// Upper bound for the on-screen surface size
    pub max_display: [f32; 2],
    /// Lower bound for the on-screen surface size; small images are scaled up to it
    pub min_display: [f32; 2],
    /// Fraction of the viewport the surface may occupy
    pub viewport_fill: f32,
    /// Viewport size used until the host reports a real one
    pub default_viewport: [f32; 2],

    pub crop_min_size: f32,
    pub crop_handle_size: f32,

    pub zoom_min: f32,
    pub zoom_max: f32,
    pub zoom_step: f32,
    /// Space kept free around the surface by "fit to canvas"
    pub zoom_fit_padding: f32,

    /// Distance from the surface edge at which new text may spawn
    pub text_spawn_padding: f32,
    /// Room reserved right/below the spawn point so new text stays visible
    pub text_spawn_reserve: [f32; 2],
    /// Gap kept between dragged text and the surface edge
    pub text_drag_margin: f32,
    pub default_font_family: String,
    pub default_font_size: f32,
    pub default_text_color: [u8; 3],

    pub export_file_name: String,
    /// Longest side of the filtered preview; export always uses full resolution
    pub preview_max_side: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            max_display: [1200.0, 800.0],
            min_display: [300.0, 200.0],
            viewport_fill: 0.9,
            default_viewport: [1400.0, 900.0],
            crop_min_size: 20.0,
            crop_handle_size: 10.0,
            zoom_min: 0.25,
            zoom_max: 3.0,
            zoom_step: 0.25,
            zoom_fit_padding: 40.0,
            text_spawn_padding: 50.0,
            text_spawn_reserve: [200.0, 80.0],
            text_drag_margin: 5.0,
            default_font_family: "Arial, sans-serif".to_owned(),
            default_font_size: 24.0,
            default_text_color: [0, 0, 0],
            export_file_name: "edited-image.png".to_owned(),
            preview_max_side: 1600,
        }
    }
}

impl EditorConfig {
    pub fn from_json_str(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
