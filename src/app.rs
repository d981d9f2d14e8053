use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::error::EditorResult;
use crate::file_handler::FileHandler;
use crate::input::InputHandler;
use crate::panels::{central_panel, tools_panel};
use crate::texture_manager::{TextureGenerationError, TextureManager};
use crate::tools::FilterSettings;

/// What survives a restart. Images and overlays never do.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)] // if we add new fields, give them default values when deserializing old state
struct PersistedState {
    config: EditorConfig,
    filters: FilterSettings,
}

/// The desktop/web shell around an [`Editor`]
pub struct EditorApp {
    editor: Editor,
    input: InputHandler,
    files: FileHandler,
    textures: TextureManager,
    alert: Option<String>,
}

impl Default for EditorApp {
    fn default() -> Self {
        Self::with_config(EditorConfig::default())
    }
}

impl EditorApp {
    /// Called once before the first frame.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let state: PersistedState = cc
            .storage
            .and_then(|storage| eframe::get_value(storage, eframe::APP_KEY))
            .unwrap_or_default();
        let mut app = Self::with_config(state.config);
        app.editor.set_filter_settings(state.filters);
        app
    }

    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            editor: Editor::new(config),
            input: InputHandler::new(egui::Rect::NOTHING),
            files: FileHandler::new(),
            textures: TextureManager::new(),
            alert: None,
        }
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputHandler {
        &mut self.input
    }

    /// Name of the file being decoded, if any
    pub fn loading(&self) -> Option<&str> {
        self.files.loading()
    }

    pub(crate) fn surface_texture(
        &mut self,
        ctx: &egui::Context,
    ) -> Result<egui::TextureId, TextureGenerationError> {
        self.textures.surface_texture(ctx, &self.editor)
    }

    /// While an alert is shown the panels are disabled and canvas input is dropped
    pub fn alert_open(&self) -> bool {
        self.alert.is_some()
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    /// Export the composited image and report the outcome to the user
    pub fn save_image(&mut self) {
        match self.export() {
            Ok(Some(path)) => info!("Saved image to {}", path),
            Ok(None) => {}
            Err(err) => {
                error!("Saving failed: {}", err);
                self.show_alert(format!("Could not save the image: {err}"));
            }
        }
    }

    fn export(&self) -> EditorResult<Option<String>> {
        let Some(image) = self.editor.save()? else {
            return Ok(None);
        };

        #[cfg(not(target_arch = "wasm32"))]
        let saved = {
            std::fs::write(&image.file_name, &image.bytes)?;
            Some(image.file_name)
        };

        #[cfg(target_arch = "wasm32")]
        let saved = {
            log::warn!(
                "Saving is not available in the browser build ({} bytes discarded)",
                image.bytes.len()
            );
            None
        };

        Ok(saved)
    }

    fn receive_files(&mut self, ctx: &egui::Context) {
        if let Some(result) = self.files.poll() {
            match result.image {
                Ok(image) => {
                    info!("Loaded {}", result.file_name);
                    self.editor.load_decoded(image);
                }
                Err(err) => {
                    error!("Failed to decode {}: {}", result.file_name, err);
                    self.show_alert(format!("Could not open {}: {err}", result.file_name));
                }
            }
        }

        if let Err(err) = self.files.handle_dropped_files(ctx) {
            self.show_alert(err.to_string());
        }
        self.files.preview_files_being_dropped(ctx);
    }

    fn alert_window(&mut self, ctx: &egui::Context) {
        let Some(message) = &self.alert else {
            return;
        };
        let mut dismissed = false;
        egui::Window::new("Something went wrong")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message.as_str());
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        if dismissed {
            self.alert = None;
        }
    }
}

impl eframe::App for EditorApp {
    /// Called by the frame work to save state before shutdown.
    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let state = PersistedState {
            config: self.editor.config().clone(),
            filters: self.editor.filter_settings(),
        };
        eframe::set_value(storage, eframe::APP_KEY, &state);
    }

    /// Called each time the UI needs repainting, which may be many times per second.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.receive_files(ctx);

        tools_panel(self, ctx);
        central_panel(self, ctx);

        self.alert_window(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::ToolKind;
    use egui::{Event, Modifiers, PointerButton, Pos2, RawInput};
    use image::RgbaImage;

    fn press_at(pos: Pos2) -> RawInput {
        RawInput {
            events: vec![
                Event::PointerMoved(pos),
                Event::PointerButton {
                    pos,
                    button: PointerButton::Primary,
                    pressed: true,
                    modifiers: Modifiers::NONE,
                },
            ],
            ..Default::default()
        }
    }

    fn run_frame(app: &mut EditorApp, ctx: &egui::Context, input: RawInput) {
        let _ = ctx.run(input, |ctx| {
            tools_panel(app, ctx);
            central_panel(app, ctx);
            app.alert_window(ctx);
        });
    }

    fn app_with_crop(ctx: &egui::Context) -> EditorApp {
        let mut app = EditorApp::default();
        app.editor_mut().load_decoded(RgbaImage::new(400, 300));
        app.editor_mut().activate_tool(ToolKind::Crop);
        // First frame lays the canvas out
        run_frame(&mut app, ctx, RawInput::default());
        app
    }

    #[test]
    fn test_alert_blocks_canvas_input() {
        let ctx = egui::Context::default();
        let mut app = app_with_crop(&ctx);
        app.show_alert("Not an image");
        assert!(app.alert_open());

        let center = app.editor().surface_rect().center();
        run_frame(&mut app, &ctx, press_at(center));
        assert!(!app.editor().tools().crop.has_selection());
    }

    #[test]
    fn test_canvas_input_without_alert() {
        let ctx = egui::Context::default();
        let mut app = app_with_crop(&ctx);

        let center = app.editor().surface_rect().center();
        run_frame(&mut app, &ctx, press_at(center));
        assert!(app.editor().tools().crop.has_selection());
    }
}
