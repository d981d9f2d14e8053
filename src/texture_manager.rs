use egui::{ColorImage, Context, TextureHandle, TextureId, TextureOptions};
use image::RgbaImage;
use thiserror::Error;

use crate::editor::Editor;
use crate::tools::FilterSettings;

/// Errors that can occur during texture generation
#[derive(Error, Debug)]
pub enum TextureGenerationError {
    #[error("Nothing to upload")]
    NothingLoaded,
    #[error("Invalid texture dimensions: {0}x{1}")]
    InvalidDimensions(u32, u32),
}

/// What the cached texture was built from
#[derive(Debug, Clone, Copy, PartialEq)]
struct TextureKey {
    revision: u64,
    filters: FilterSettings,
}

/// Keeps the surface uploaded as a GPU texture.
///
/// The texture is rebuilt only when the surface has been redrawn or the
/// filters changed since the last upload.
#[derive(Default)]
pub struct TextureManager {
    handle: Option<TextureHandle>,
    key: Option<TextureKey>,
    uploads: u64,
}

impl TextureManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Texture for the editor's current preview, uploading it if stale
    pub fn surface_texture(
        &mut self,
        ctx: &Context,
        editor: &Editor,
    ) -> Result<TextureId, TextureGenerationError> {
        let key = TextureKey {
            revision: editor.surface().revision(),
            filters: editor.filter_settings(),
        };

        if let (Some(handle), Some(cached)) = (&self.handle, self.key) {
            if cached == key {
                return Ok(handle.id());
            }
        }

        let preview = editor
            .preview_image()
            .ok_or(TextureGenerationError::NothingLoaded)?;
        let image = to_color_image(&preview)?;

        let id = if let Some(handle) = &mut self.handle {
            handle.set(image, TextureOptions::LINEAR);
            handle.id()
        } else {
            let handle = ctx.load_texture("surface", image, TextureOptions::LINEAR);
            let id = handle.id();
            self.handle = Some(handle);
            id
        };
        self.key = Some(key);
        self.uploads += 1;
        Ok(id)
    }

    /// Number of uploads so far
    pub fn uploads(&self) -> u64 {
        self.uploads
    }

    pub fn clear(&mut self) {
        self.handle = None;
        self.key = None;
    }
}

pub fn to_color_image(image: &RgbaImage) -> Result<ColorImage, TextureGenerationError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(TextureGenerationError::InvalidDimensions(w, h));
    }
    Ok(ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::FilterParam;

    fn editor_with_image() -> Editor {
        let mut editor = Editor::default();
        editor.load_decoded(RgbaImage::new(40, 30));
        editor
    }

    #[test]
    fn test_cache_hit_until_redraw() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let mut editor = editor_with_image();

        let first = manager.surface_texture(&ctx, &editor).unwrap();
        let second = manager.surface_texture(&ctx, &editor).unwrap();
        assert_eq!(first, second);
        assert_eq!(manager.uploads(), 1);

        editor.redraw();
        manager.surface_texture(&ctx, &editor).unwrap();
        assert_eq!(manager.uploads(), 2);
    }

    #[test]
    fn test_filter_change_reuploads() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let mut editor = editor_with_image();

        manager.surface_texture(&ctx, &editor).unwrap();
        editor.set_filter(FilterParam::Sepia, 50.0);
        manager.surface_texture(&ctx, &editor).unwrap();
        assert_eq!(manager.uploads(), 2);
    }

    #[test]
    fn test_nothing_loaded() {
        let ctx = Context::default();
        let mut manager = TextureManager::new();
        let result = manager.surface_texture(&ctx, &Editor::default());
        assert!(matches!(result, Err(TextureGenerationError::NothingLoaded)));
    }
}
