use egui::{Color32, RichText};

use crate::EditorApp;
use crate::components::ToolButton;
use crate::tools::{FilterParam, ToolKind};

/// Family lists offered by the text controls
const FONT_FAMILIES: [&str; 4] = [
    "Arial, sans-serif",
    "Georgia, serif",
    "Courier New, monospace",
    "Impact, sans-serif",
];

pub fn tools_panel(app: &mut EditorApp, ctx: &egui::Context) {
    egui::SidePanel::left("tools_panel")
        .resizable(true)
        .default_width(240.0)
        .show(ctx, |ui| {
            if app.alert_open() {
                ui.disable();
            }
            ui.heading("Image Editor");

            if let Some(name) = app.loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label(format!("Loading {name}"));
                });
            }

            let loaded = app.editor().is_loaded();
            if !loaded {
                ui.label("Drop an image file onto the window to start.");
            }

            ui.horizontal(|ui| {
                if ui.add_enabled(loaded, egui::Button::new("Save")).clicked() {
                    app.save_image();
                }
                if ui.add_enabled(loaded, egui::Button::new("Reset")).clicked() {
                    app.editor_mut().reset();
                }
            });
            ui.separator();

            ui.heading("Tools");
            let active = app.editor().active_tool();
            ui.horizontal_wrapped(|ui| {
                for kind in ToolKind::ALL {
                    let selected = active == Some(kind);
                    if ToolButton::new(kind, selected, loaded).show(ui).clicked() {
                        log::info!("Tool selected from UI: {}", kind.name());
                        if selected {
                            app.editor_mut().deactivate_all_tools();
                        } else {
                            app.editor_mut().activate_tool(kind);
                        }
                    }
                }
            });

            let Some(kind) = app.editor().active_tool() else {
                return;
            };
            ui.separator();
            ui.horizontal(|ui| {
                ui.heading(kind.label());
                let state = app.editor().tools().get(kind).current_state_name();
                ui.label(format!("(State: {state})"));
            });

            match kind {
                ToolKind::Crop => crop_controls(app, ui),
                ToolKind::Text => text_controls(app, ui),
                ToolKind::Filters => filter_controls(app, ui),
                ToolKind::Rotate => rotate_controls(app, ui),
                ToolKind::Zoom => zoom_controls(app, ui),
            }
        });
}

fn crop_controls(app: &mut EditorApp, ui: &mut egui::Ui) {
    ui.label("Drag on the image to select an area.");
    let has_selection = app.editor().tools().crop.has_selection();
    if let Some(selection) = app.editor().tools().crop.selection() {
        ui.label(format!(
            "{:.0} × {:.0}",
            selection.width(),
            selection.height()
        ));
    }
    ui.horizontal(|ui| {
        if ui
            .add_enabled(has_selection, egui::Button::new("Apply Crop"))
            .clicked()
        {
            app.editor_mut().apply_crop();
        }
        if ui.button("Cancel").clicked() {
            app.editor_mut().cancel_crop();
        }
    });
}

fn rotate_controls(app: &mut EditorApp, ui: &mut egui::Ui) {
    ui.horizontal(|ui| {
        if ui.button("⟲ Left").clicked() {
            app.editor_mut().rotate_left();
        }
        if ui.button("⟳ Right").clicked() {
            app.editor_mut().rotate_right();
        }
    });
    let degrees = app.editor().surface().rotation_degrees();
    ui.label(format!("Rotation: {degrees}°"));
}

fn zoom_controls(app: &mut EditorApp, ui: &mut egui::Ui) {
    let display = app.editor().zoom_display().clone();
    let info = app.editor().zoom_info();

    ui.horizontal(|ui| {
        if ui
            .add_enabled(display.zoom_out_enabled, egui::Button::new("−"))
            .clicked()
        {
            app.editor_mut().zoom_out();
        }

        let mut zoom = display.slider;
        let slider = egui::Slider::new(&mut zoom, info.min..=info.max).show_value(false);
        if ui.add(slider).changed() {
            app.editor_mut().set_zoom(zoom);
        }

        if ui
            .add_enabled(display.zoom_in_enabled, egui::Button::new("+"))
            .clicked()
        {
            app.editor_mut().zoom_in();
        }
        ui.label(display.label.as_str());
    });

    ui.horizontal(|ui| {
        if ui.button("Fit").clicked() {
            app.editor_mut().fit_to_canvas();
        }
        if ui.button("100%").clicked() {
            app.editor_mut().reset_zoom();
        }
    });
    ui.label(RichText::new("Scroll over the image to zoom.").weak());
}

fn text_controls(app: &mut EditorApp, ui: &mut egui::Ui) {
    let controls = app.editor().tools().text.controls().clone();
    let has_selection = app.editor().tools().text.selected().is_some();

    let mut input = controls.input.clone();
    ui.horizontal(|ui| {
        let field = ui.text_edit_singleline(&mut input);
        if field.changed() {
            app.editor_mut().text_mut().set_input_text(input.clone());
        }
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        let clicked = ui.button("Add Text").clicked();
        if add_text_requested(clicked, field.lost_focus(), enter) {
            app.editor_mut().add_text();
        }
    });

    let style = controls.style;
    egui::ComboBox::from_label("Font")
        .selected_text(style.font_family.as_str())
        .show_ui(ui, |ui| {
            for family in FONT_FAMILIES {
                if ui
                    .selectable_label(style.font_family == family, family)
                    .clicked()
                {
                    app.editor_mut().text_mut().set_font_family(family);
                }
            }
        });

    ui.horizontal(|ui| {
        let mut size = style.font_size;
        if ui
            .add(egui::DragValue::new(&mut size).range(8.0..=200.0).suffix(" px"))
            .changed()
        {
            app.editor_mut().text_mut().set_font_size(size);
        }

        let mut color = style.color;
        if ui.color_edit_button_srgba(&mut color).changed() {
            app.editor_mut().text_mut().set_color(color);
        }

        if ui
            .selectable_label(style.bold, RichText::new("B").strong())
            .clicked()
        {
            app.editor_mut().text_mut().toggle_bold();
        }
        if ui
            .selectable_label(style.italic, RichText::new("I").italics())
            .clicked()
        {
            app.editor_mut().text_mut().toggle_italic();
        }
    });

    if ui
        .add_enabled(has_selection, egui::Button::new("Delete Selected"))
        .clicked()
    {
        app.editor_mut().text_mut().delete_selected();
    }

    let count = app.editor().tools().text.elements().len();
    ui.label(
        RichText::new(format!(
            "{count} text element(s). Double-click a text to edit it."
        ))
        .weak(),
    );
}

/// The button adds text, and so does Enter in the input field
fn add_text_requested(button_clicked: bool, field_lost_focus: bool, enter_pressed: bool) -> bool {
    button_clicked || (field_lost_focus && enter_pressed)
}

fn filter_controls(app: &mut EditorApp, ui: &mut egui::Ui) {
    let settings = app.editor().filter_settings();

    egui::Grid::new("filter_grid")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui| {
            for param in FilterParam::ALL {
                let (min, max) = param.range();
                let mut value = settings.get(param);
                ui.label(param.label());
                let slider = egui::Slider::new(&mut value, min..=max)
                    .suffix(param.unit())
                    .fixed_decimals(0);
                if ui.add(slider).changed() {
                    app.editor_mut().set_filter(param, value);
                }
                ui.end_row();
            }
        });

    if ui.button("Reset Filters").clicked() {
        app.editor_mut().reset_filters();
    }
    if let Some(descriptor) = app.editor().presentation_filter() {
        ui.label(RichText::new(descriptor).small().color(Color32::GRAY));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enter_in_field_adds_text() {
        assert!(add_text_requested(true, false, false));
        assert!(add_text_requested(false, true, true));
        // Clicking elsewhere also takes focus away from the field
        assert!(!add_text_requested(false, true, false));
        assert!(!add_text_requested(false, false, true));
    }
}
