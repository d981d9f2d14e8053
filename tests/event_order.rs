use std::cell::RefCell;
use std::rc::Rc;

use eframe_image_editor::{Editor, EditorConfig, EditorEvent, EventLog, ToolKind};
use image::RgbaImage;

fn loaded_editor() -> (Editor, EventLog) {
    let mut editor = Editor::default();
    let log = EventLog::new();
    editor.subscribe(Box::new(log.clone()));
    editor.load_decoded(RgbaImage::new(400, 300));
    log.clear();
    (editor, log)
}

#[test]
fn test_activation_deactivates_first() {
    let (mut editor, log) = loaded_editor();
    editor.activate_tool(ToolKind::Crop);
    editor.activate_tool(ToolKind::Zoom);

    assert_eq!(
        log.events(),
        vec![
            EditorEvent::ToolDeactivated,
            EditorEvent::ToolActivated { tool: ToolKind::Crop },
            EditorEvent::ToolDeactivated,
            EditorEvent::ToolActivated { tool: ToolKind::Zoom },
        ]
    );
    assert_eq!(editor.tools().active_kinds(), vec![ToolKind::Zoom]);
}

#[test]
fn test_reset_order() {
    let (mut editor, log) = loaded_editor();
    editor.activate_tool(ToolKind::Text);
    log.clear();

    editor.reset();
    assert_eq!(log.names(), vec!["canvasUpdated", "toolDeactivated", "imageReset"]);
}

#[test]
fn test_apply_crop_redraws_then_deactivates() {
    let (mut editor, log) = loaded_editor();
    editor.activate_tool(ToolKind::Crop);
    let down = editor.surface().to_screen(egui::pos2(20.0, 20.0));
    let up = editor.surface().to_screen(egui::pos2(120.0, 80.0));
    editor.handle_input(eframe_image_editor::InputEvent::PointerDown { pos: down });
    editor.handle_input(eframe_image_editor::InputEvent::PointerMove { pos: up });
    editor.handle_input(eframe_image_editor::InputEvent::PointerUp { pos: up });
    log.clear();

    assert!(editor.apply_crop());
    assert_eq!(log.names(), vec!["canvasUpdated", "toolDeactivated"]);
}

#[test]
fn test_nothing_happens_without_an_image() {
    let mut editor = Editor::default();
    let log = EventLog::new();
    editor.subscribe(Box::new(log.clone()));

    assert!(!editor.activate_tool(ToolKind::Crop));
    assert!(!editor.reset());
    assert!(!editor.rotate_right());
    assert!(!editor.apply_crop());
    assert!(log.events().is_empty());
}

#[test]
fn test_closure_subscriber() {
    let (mut editor, _log) = loaded_editor();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let sink = Rc::clone(&seen);
    editor.subscribe_fn(move |event| {
        sink.borrow_mut().push(event.to_string());
    });

    editor.activate_tool(ToolKind::Rotate);
    assert_eq!(*seen.borrow(), vec!["toolDeactivated", "toolActivated(rotate)"]);
    assert_eq!(editor.tools().active_kinds(), vec![ToolKind::Rotate]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let (mut editor, log) = loaded_editor();
    let extra = EventLog::new();
    let id = editor.subscribe(Box::new(extra.clone()));

    editor.redraw();
    assert!(editor.unsubscribe(id));
    editor.redraw();

    assert_eq!(extra.names(), vec!["canvasUpdated"]);
    assert_eq!(log.names(), vec!["canvasUpdated", "canvasUpdated"]);
}

#[test]
fn test_config_from_partial_json() {
    let config = EditorConfig::from_json_str(r#"{ "zoom_max": 5.0, "crop_min_size": 40.0 }"#).unwrap();
    assert_eq!(config.zoom_max, 5.0);
    assert_eq!(config.crop_min_size, 40.0);
    assert_eq!(config.zoom_min, EditorConfig::default().zoom_min);

    let mut editor = Editor::new(config);
    editor.load_decoded(RgbaImage::new(400, 300));
    editor.set_zoom(10.0);
    assert_eq!(editor.surface().scale(), 5.0);
}
