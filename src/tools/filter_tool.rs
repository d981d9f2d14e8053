use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::{Tool, ToolKind};
use crate::event::EditorEvent;
use crate::surface::Surface;

/// One of the seven filter controls, in descriptor order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterParam {
    Brightness,
    Contrast,
    Saturation,
    Blur,
    Grayscale,
    Sepia,
    Hue,
}

impl FilterParam {
    pub const ALL: [FilterParam; 7] = [
        Self::Brightness,
        Self::Contrast,
        Self::Saturation,
        Self::Blur,
        Self::Grayscale,
        Self::Sepia,
        Self::Hue,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Brightness => "Brightness",
            Self::Contrast => "Contrast",
            Self::Saturation => "Saturation",
            Self::Blur => "Blur",
            Self::Grayscale => "Grayscale",
            Self::Sepia => "Sepia",
            Self::Hue => "Hue",
        }
    }

    /// Slider bounds
    pub fn range(&self) -> (f32, f32) {
        match self {
            Self::Brightness | Self::Contrast | Self::Saturation => (0.0, 200.0),
            Self::Blur => (0.0, 10.0),
            Self::Grayscale | Self::Sepia => (0.0, 100.0),
            Self::Hue => (0.0, 360.0),
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            Self::Blur => "px",
            Self::Hue => "deg",
            _ => "%",
        }
    }

    /// Name of the function in the composed filter string
    fn function(&self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Saturation => "saturate",
            Self::Blur => "blur",
            Self::Grayscale => "grayscale",
            Self::Sepia => "sepia",
            Self::Hue => "hue-rotate",
        }
    }
}

/// The seven filter values. Defaults are the identity filter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub saturation: f32,
    pub blur: f32,
    pub grayscale: f32,
    pub sepia: f32,
    pub hue: f32,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            brightness: 100.0,
            contrast: 100.0,
            saturation: 100.0,
            blur: 0.0,
            grayscale: 0.0,
            sepia: 0.0,
            hue: 0.0,
        }
    }
}

impl FilterSettings {
    pub fn get(&self, param: FilterParam) -> f32 {
        match param {
            FilterParam::Brightness => self.brightness,
            FilterParam::Contrast => self.contrast,
            FilterParam::Saturation => self.saturation,
            FilterParam::Blur => self.blur,
            FilterParam::Grayscale => self.grayscale,
            FilterParam::Sepia => self.sepia,
            FilterParam::Hue => self.hue,
        }
    }

    /// Store `value` clamped to the parameter's range and return what was stored
    pub fn set(&mut self, param: FilterParam, value: f32) -> f32 {
        let (min, max) = param.range();
        let value = if value.is_nan() { min } else { value.clamp(min, max) };
        let slot = match param {
            FilterParam::Brightness => &mut self.brightness,
            FilterParam::Contrast => &mut self.contrast,
            FilterParam::Saturation => &mut self.saturation,
            FilterParam::Blur => &mut self.blur,
            FilterParam::Grayscale => &mut self.grayscale,
            FilterParam::Sepia => &mut self.sepia,
            FilterParam::Hue => &mut self.hue,
        };
        *slot = value;
        value
    }

    /// Copy with every value clamped into range
    pub fn clamped(&self) -> Self {
        let mut out = Self::default();
        for param in FilterParam::ALL {
            out.set(param, self.get(param));
        }
        out
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Compose the CSS-style filter descriptor, always listing all seven
    /// functions in fixed order.
    pub fn filter_string(&self) -> String {
        FilterParam::ALL
            .iter()
            .map(|param| format!("{}({}{})", param.function(), self.get(*param), param.unit()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Non-destructive colour filters.
///
/// The settings only describe how the surface is presented; pixels are
/// filtered when exporting.
#[derive(Debug, Clone, Default)]
pub struct FilterTool {
    active: bool,
    settings: FilterSettings,
}

impl FilterTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(&self) -> FilterSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: FilterSettings) {
        self.settings = settings.clamped();
        debug!("Filters set to {}", self.filter_string());
    }

    pub fn set(&mut self, param: FilterParam, value: f32) -> f32 {
        self.settings.set(param, value)
    }

    pub fn reset_filters(&mut self) {
        self.settings = FilterSettings::default();
        info!("Filters reset");
    }

    pub fn filter_string(&self) -> String {
        self.settings.filter_string()
    }

    /// The descriptor to apply to the presentation, if any. Filters only
    /// take effect once an image is loaded.
    pub fn presentation_filter(&self, surface: &Surface) -> Option<String> {
        surface.is_loaded().then(|| self.filter_string())
    }
}

impl Tool for FilterTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Filters
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

    fn on_event(&mut self, event: &EditorEvent, surface: &Surface) {
        match event {
            EditorEvent::ToolActivated { tool } if *tool == ToolKind::Filters => self.activate(surface),
            EditorEvent::ToolDeactivated => self.deactivate(surface),
            EditorEvent::ImageReset => self.reset_filters(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_string() {
        assert_eq!(
            FilterSettings::default().filter_string(),
            "brightness(100%) contrast(100%) saturate(100%) blur(0px) grayscale(0%) sepia(0%) hue-rotate(0deg)"
        );
    }

    #[test]
    fn test_values_are_clamped_to_slider_ranges() {
        let mut settings = FilterSettings::default();
        assert_eq!(settings.set(FilterParam::Brightness, 500.0), 200.0);
        assert_eq!(settings.set(FilterParam::Blur, -3.0), 0.0);
        assert_eq!(settings.set(FilterParam::Hue, 400.0), 360.0);
        assert_eq!(settings.set(FilterParam::Sepia, f32::NAN), 0.0);
    }

    #[test]
    fn test_fractional_values_are_kept() {
        let mut settings = FilterSettings::default();
        settings.set(FilterParam::Blur, 2.5);
        assert!(settings.filter_string().contains("blur(2.5px)"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: FilterSettings = serde_json::from_str(r#"{"sepia": 40}"#).unwrap();
        assert_eq!(settings.sepia, 40.0);
        assert_eq!(settings.brightness, 100.0);
    }

    #[test]
    fn test_image_reset_restores_defaults() {
        let surface = Surface::new(&crate::config::EditorConfig::default());
        let mut tool = FilterTool::new();
        tool.set(FilterParam::Contrast, 150.0);
        tool.on_event(&EditorEvent::ImageReset, &surface);
        assert!(tool.settings().is_identity());
    }
}
