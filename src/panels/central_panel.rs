use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontId, Rect, Stroke, Vec2, pos2, vec2};
use uuid::Uuid;

use crate::EditorApp;
use crate::input::InputEvent;
use crate::tools::{ELEMENT_PADDING, TextElement, ToolKind};
use crate::widgets::{SelectionOverlay, cursor_icon};

const SELECTED_OUTLINE: Color32 = Color32::from_rgb(33, 150, 243);

pub fn central_panel(app: &mut EditorApp, ctx: &egui::Context) {
    egui::CentralPanel::default().show(ctx, |ui| {
        let canvas_rect = ui.available_rect_before_wrap();
        app.editor_mut().set_viewport(canvas_rect);
        app.input_mut().set_canvas_rect(canvas_rect);

        if !app.editor().is_loaded() {
            ui.centered_and_justified(|ui| {
                ui.label("Drop an image here to start editing");
            });
            return;
        }

        if app.alert_open() {
            ui.disable();
        } else {
            handle_input(app, ctx, canvas_rect);
        }

        let painter = ui.painter_at(canvas_rect);
        let surface_rect = app.editor().surface_rect();
        match app.surface_texture(ctx) {
            Ok(texture) => {
                let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
                painter.image(texture, surface_rect, uv, Color32::WHITE);
            }
            Err(err) => log::error!("Failed to upload surface: {}", err),
        }

        text_overlays(app, ui, &painter);

        let editor = app.editor();
        if editor.active_tool() == Some(ToolKind::Crop) {
            if let Some(selection) = editor.tools().crop.selection() {
                let screen = Rect::from_min_max(
                    editor.surface().to_screen(selection.min),
                    editor.surface().to_screen(selection.max),
                );
                SelectionOverlay::new(screen, surface_rect, editor.tools().crop.handle_size())
                    .paint(&painter);
            }
        }
    });
}

fn handle_input(app: &mut EditorApp, ctx: &egui::Context, canvas_rect: Rect) {
    let editing = app.editor().tools().text.editing().is_some();
    let widget_has_keyboard = ctx.wants_keyboard_input();

    for event in app.input_mut().process_input(ctx) {
        if let InputEvent::KeyDown { key, .. } = &event {
            if !forward_key(*key, editing, widget_has_keyboard) {
                continue;
            }
        }
        app.editor_mut().handle_input(event);
    }

    if let Some(pos) = ctx.pointer_hover_pos() {
        if canvas_rect.contains(pos) {
            ctx.set_cursor_icon(cursor_icon(app.editor().cursor_hint(pos)));
        }
    }
}

/// Whether a key press reaches the editor. The inline editor owns the
/// keyboard apart from its commit keys; any other focused widget owns it
/// entirely.
fn forward_key(key: egui::Key, inline_editing: bool, widget_has_keyboard: bool) -> bool {
    if inline_editing {
        matches!(key, egui::Key::Enter | egui::Key::Escape)
    } else {
        !widget_has_keyboard
    }
}

/// Font for a family list: monospace families map to egui's monospace font
fn font_id(family_list: &str, size: f32) -> FontId {
    let monospace = family_list.split(',').any(|family| {
        let family = family
            .trim()
            .trim_matches(|c| c == '"' || c == '\'')
            .to_ascii_lowercase();
        family == "monospace" || family.contains("courier") || family.contains("mono")
    });
    if monospace {
        FontId::monospace(size)
    } else {
        FontId::proportional(size)
    }
}

enum Edit {
    Update(String),
    Commit,
}

/// Paint the text elements above the surface, report their laid-out size
/// back to the text tool, and host the inline editor.
fn text_overlays(app: &mut EditorApp, ui: &mut egui::Ui, painter: &egui::Painter) {
    let scale = app.editor().surface().scale();
    let text = &app.editor().tools().text;
    let elements: Vec<TextElement> = text.elements().to_vec();
    let selected = text.selected();
    let editing = text.editing();
    let text_active = app.editor().active_tool() == Some(ToolKind::Text);

    let mut measured: Vec<(Uuid, Vec2)> = Vec::new();
    let mut edit = None;

    for element in &elements {
        let style = &element.style;
        let origin = app.editor().surface().to_screen(element.position);
        let screen_rect = Rect::from_min_size(origin, element.extent() * scale);
        let font = font_id(&style.font_family, style.font_size * scale);
        let inset = Vec2::splat(ELEMENT_PADDING / 2.0 * scale);

        if editing == Some(element.id) {
            let mut buffer = element.text.clone();
            let response = ui.put(
                screen_rect,
                egui::TextEdit::singleline(&mut buffer)
                    .font(font)
                    .text_color(style.color)
                    .frame(true),
            );
            if response.changed() {
                edit = Some(Edit::Update(buffer));
            } else if response.lost_focus() {
                edit = Some(Edit::Commit);
            } else if !response.has_focus() {
                response.request_focus();
            }
            continue;
        }

        let job = LayoutJob::single_section(
            element.text.clone(),
            TextFormat {
                font_id: font,
                color: style.color,
                italics: style.italic,
                ..Default::default()
            },
        );
        let galley = ui.fonts(|fonts| fonts.layout_job(job));
        let local_size = galley.size() / scale + Vec2::splat(ELEMENT_PADDING);

        painter.galley(origin + inset, galley.clone(), style.color);
        if style.bold {
            painter.galley(origin + inset + vec2(1.0, 0.0), galley, style.color);
        }

        if element.measured_size != Some(local_size) {
            measured.push((element.id, local_size));
        }

        if text_active && selected == Some(element.id) {
            painter.rect_stroke(screen_rect, 2.0, Stroke::new(1.5, SELECTED_OUTLINE));
        }
    }

    let tool = app.editor_mut().text_mut();
    for (id, size) in measured {
        tool.set_measured_size(id, size);
    }
    match edit {
        Some(Edit::Update(text)) => {
            tool.update_edit(&text);
        }
        Some(Edit::Commit) => {
            tool.commit_edit();
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focused_field_keeps_delete_shortcut() {
        use egui::Key;

        // Ctrl+Backspace in the side panel's text field edits the field only
        assert!(!forward_key(Key::Backspace, false, true));
        assert!(!forward_key(Key::Delete, false, true));
        assert!(forward_key(Key::Delete, false, false));

        assert!(forward_key(Key::Enter, true, true));
        assert!(forward_key(Key::Escape, true, true));
        assert!(!forward_key(Key::Backspace, true, true));
    }

    #[test]
    fn test_monospace_family_detection() {
        assert_eq!(font_id("Courier New, monospace", 12.0), FontId::monospace(12.0));
        assert_eq!(font_id("'Fira Mono'", 12.0), FontId::monospace(12.0));
        assert_eq!(font_id("Arial, sans-serif", 12.0), FontId::proportional(12.0));
    }
}
