use std::sync::Arc;

use eframe::egui;
use image::RgbaImage;
use parking_lot::Mutex;

use crate::error::{EditorError, EditorResult};
use crate::raster;

/// Outcome of a background decode, picked up on a later frame
#[derive(Debug)]
pub struct LoadResult {
    pub file_name: String,
    pub image: EditorResult<RgbaImage>,
}

/// Accepts dropped files and decodes images off the UI path
#[derive(Default)]
pub struct FileHandler {
    slot: Arc<Mutex<Option<LoadResult>>>,
    loading: Option<String>,
}

impl FileHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name of the file currently being decoded
    pub fn loading(&self) -> Option<&str> {
        self.loading.as_deref()
    }

    /// Start loading the first file dropped this frame.
    ///
    /// Returns `Ok(true)` when a decode was started. A non-image file is an
    /// [`EditorError::UnsupportedFile`] for the caller to show.
    pub fn handle_dropped_files(&mut self, ctx: &egui::Context) -> EditorResult<bool> {
        let dropped = ctx.input(|i| i.raw.dropped_files.first().cloned());
        let Some(file) = dropped else {
            return Ok(false);
        };

        let file_name = display_name(&file);
        if !is_image_file(&file) {
            log::warn!("Dropped file is not an image: {}", file_name);
            return Err(EditorError::UnsupportedFile(file_name));
        }

        let bytes = read_bytes(&file)?;
        self.spawn_decode(file_name, bytes, ctx);
        Ok(true)
    }

    /// Decode `bytes` in the background; the result shows up in [`Self::poll`]
    pub fn spawn_decode(&mut self, file_name: String, bytes: Vec<u8>, ctx: &egui::Context) {
        log::info!("Decoding {} ({} bytes)", file_name, bytes.len());
        self.loading = Some(file_name.clone());

        let slot = Arc::clone(&self.slot);
        let ctx = ctx.clone();
        let task = async move {
            let image = raster::decode_image(bytes).await;
            *slot.lock() = Some(LoadResult { file_name, image });
            ctx.request_repaint();
        };

        #[cfg(not(target_arch = "wasm32"))]
        std::thread::spawn(move || futures::executor::block_on(task));

        #[cfg(target_arch = "wasm32")]
        wasm_bindgen_futures::spawn_local(task);
    }

    /// Take a finished decode, if any
    pub fn poll(&mut self) -> Option<LoadResult> {
        let result = self.slot.lock().take();
        if result.is_some() {
            self.loading = None;
        }
        result
    }

    /// Darken the window while files hover over it
    pub fn preview_files_being_dropped(&self, ctx: &egui::Context) {
        use egui::{Align2, Color32, FontId, Id, LayerId, Order};

        let hovered: Vec<String> = ctx.input(|i| {
            i.raw
                .hovered_files
                .iter()
                .map(|file| match &file.path {
                    Some(path) => path.display().to_string(),
                    None if !file.mime.is_empty() => file.mime.clone(),
                    None => "(unknown file)".to_owned(),
                })
                .collect()
        });
        if hovered.is_empty() {
            return;
        }

        let painter = ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));
        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            format!("Drop to open:\n{}", hovered.join("\n")),
            FontId::proportional(20.0),
            Color32::WHITE,
        );
    }
}

fn display_name(file: &egui::DroppedFile) -> String {
    if let Some(path) = &file.path {
        path.display().to_string()
    } else if !file.name.is_empty() {
        file.name.clone()
    } else {
        "unknown".to_owned()
    }
}

/// Check if a file is an image based on MIME type or extension
pub fn is_image_file(file: &egui::DroppedFile) -> bool {
    if !file.mime.is_empty() {
        return file.mime.starts_with("image/");
    }
    let name = match &file.path {
        Some(path) => path.to_string_lossy().to_string(),
        None => file.name.clone(),
    };
    has_image_extension(&name)
}

pub fn has_image_extension(name: &str) -> bool {
    let Some((_, ext)) = name.rsplit_once('.') else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "gif" | "webp" | "bmp" | "tif" | "tiff" | "ico"
    )
}

fn read_bytes(file: &egui::DroppedFile) -> EditorResult<Vec<u8>> {
    if let Some(bytes) = &file.bytes {
        return Ok(bytes.to_vec());
    }

    // Browsers never hand out paths
    #[cfg(not(target_arch = "wasm32"))]
    {
        if let Some(path) = &file.path {
            return Ok(std::fs::read(path)?);
        }
    }

    Err(EditorError::UnsupportedFile(display_name(file)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dropped(name: &str, mime: &str) -> egui::DroppedFile {
        egui::DroppedFile {
            name: name.to_owned(),
            mime: mime.to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn test_mime_type_wins_over_extension() {
        assert!(is_image_file(&dropped("photo.txt", "image/png")));
        assert!(!is_image_file(&dropped("photo.png", "text/plain")));
    }

    #[test]
    fn test_extension_fallback() {
        assert!(is_image_file(&dropped("Holiday.JPG", "")));
        assert!(!is_image_file(&dropped("notes.md", "")));
        assert!(!is_image_file(&dropped("README", "")));
    }

    #[test]
    fn test_file_without_data_is_rejected() {
        let result = read_bytes(&dropped("ghost.png", "image/png"));
        assert!(matches!(result, Err(EditorError::UnsupportedFile(_))));
    }
}
