use egui::{Context, Key, Modifiers, PointerButton, Pos2, Rect};

/// Input the editor understands. Pointer positions are in screen coordinates;
/// the editor maps them onto the surface.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Pos2 },
    PointerMove { pos: Pos2 },
    PointerUp { pos: Pos2 },
    DoubleClick { pos: Pos2 },
    /// Wheel movement; positive is towards the user (scrolling down)
    Wheel { delta_y: f32 },
    /// Ctrl/Cmd + wheel: zoom around `pos`; same sign convention as `Wheel`
    ZoomAt { pos: Pos2, delta_y: f32 },
    KeyDown { key: Key, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pos(&self) -> Option<Pos2> {
        match self {
            Self::PointerDown { pos }
            | Self::PointerMove { pos }
            | Self::PointerUp { pos }
            | Self::DoubleClick { pos }
            | Self::ZoomAt { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}

/// Turns raw egui input into [`InputEvent`]s for the canvas area
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    canvas_rect: Rect,
}

impl InputHandler {
    pub fn new(canvas_rect: Rect) -> Self {
        Self {
            last_pointer_pos: None,
            canvas_rect,
        }
    }

    /// Update the canvas rectangle (e.g. if window is resized)
    pub fn set_canvas_rect(&mut self, rect: Rect) {
        self.canvas_rect = rect;
    }

    /// Collect this frame's events. Presses and wheel movement only count
    /// inside the canvas; moves and releases are reported anywhere so drags
    /// can leave it.
    pub fn process_input(&mut self, ctx: &Context) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let canvas_rect = self.canvas_rect;

        ctx.input(|input| {
            let hover = input.pointer.hover_pos();

            if let Some(pos) = hover {
                if Some(pos) != self.last_pointer_pos {
                    events.push(InputEvent::PointerMove { pos });
                }
            }
            self.last_pointer_pos = hover;

            if let Some(pos) = input.pointer.interact_pos() {
                let in_canvas = canvas_rect.contains(pos);
                if in_canvas && input.pointer.button_pressed(PointerButton::Primary) {
                    events.push(InputEvent::PointerDown { pos });
                }
                if input.pointer.button_released(PointerButton::Primary) {
                    events.push(InputEvent::PointerUp { pos });
                }
                if in_canvas && input.pointer.button_double_clicked(PointerButton::Primary) {
                    events.push(InputEvent::DoubleClick { pos });
                }
            }

            if hover.is_some_and(|pos| canvas_rect.contains(pos)) && input.raw_scroll_delta.y != 0.0 {
                // egui reports scrolling up as positive
                events.push(InputEvent::Wheel {
                    delta_y: -input.raw_scroll_delta.y,
                });
            }

            // egui turns Ctrl/Cmd + wheel into a zoom factor instead of scrolling
            let zoom = input.zoom_delta();
            if zoom != 1.0 {
                if let Some(pos) = hover.filter(|pos| canvas_rect.contains(*pos)) {
                    events.push(InputEvent::ZoomAt {
                        pos,
                        delta_y: if zoom > 1.0 { -1.0 } else { 1.0 },
                    });
                }
            }

            for event in &input.raw.events {
                if let egui::Event::Key {
                    key,
                    pressed: true,
                    modifiers,
                    ..
                } = event
                {
                    events.push(InputEvent::KeyDown {
                        key: *key,
                        modifiers: *modifiers,
                    });
                }
            }
        });

        events
    }
}
