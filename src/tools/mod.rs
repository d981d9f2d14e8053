use egui::Pos2;

use crate::config::EditorConfig;
use crate::event::EditorEvent;
use crate::surface::Surface;

mod crop_tool;
mod filter_tool;
mod rotate_tool;
mod text_tool;
mod zoom_tool;

pub use crop_tool::{CropState, CropTool};
pub use filter_tool::{FilterParam, FilterSettings, FilterTool};
pub use rotate_tool::RotateTool;
pub use text_tool::{
    DragState, ELEMENT_PADDING, PLACEHOLDER_TEXTS, TextControls, TextElement, TextStyle, TextTool,
};
pub use zoom_tool::{ZoomDisplay, ZoomInfo, ZoomTool};

/// The interactive modes of the editor. At most one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    Crop,
    Text,
    Filters,
    Rotate,
    Zoom,
}

impl ToolKind {
    /// Every tool, in event delivery order
    pub const ALL: [ToolKind; 5] = [Self::Crop, Self::Text, Self::Filters, Self::Rotate, Self::Zoom];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Text => "text",
            Self::Filters => "filters",
            Self::Rotate => "rotate",
            Self::Zoom => "zoom",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Label for tool buttons
    pub fn label(&self) -> &'static str {
        match self {
            Self::Crop => "Crop",
            Self::Text => "Text",
            Self::Filters => "Filters",
            Self::Rotate => "Rotate",
            Self::Zoom => "Zoom",
        }
    }
}

/// Behaviour shared by every tool.
///
/// Tools never flip their own active flag; the editor calls `activate` and
/// `deactivate` through the lifecycle events it publishes.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    fn name(&self) -> &'static str {
        self.kind().name()
    }

    fn is_active(&self) -> bool;

    /// Called when the tool becomes the active tool
    fn activate(&mut self, surface: &Surface);

    /// Called for every `toolDeactivated`, whether or not the tool was active
    fn deactivate(&mut self, surface: &Surface);

    /// React to a lifecycle event. The default handles activation only.
    fn on_event(&mut self, event: &EditorEvent, surface: &Surface) {
        match event {
            EditorEvent::ToolActivated { tool } if *tool == self.kind() => self.activate(surface),
            EditorEvent::ToolDeactivated => self.deactivate(surface),
            _ => {}
        }
    }

    /// Pointer pressed at a surface-local position.
    /// Returns true if the tool consumed the press.
    fn on_pointer_down(&mut self, _pos: Pos2, _surface: &Surface) -> bool {
        false
    }

    fn on_pointer_move(&mut self, _pos: Pos2, _surface: &Surface) -> bool {
        false
    }

    fn on_pointer_up(&mut self, _pos: Pos2, _surface: &Surface) -> bool {
        false
    }

    /// Name of the tool's current interaction state, for logging and tests
    fn current_state_name(&self) -> &'static str {
        if self.is_active() { "Active" } else { "Inactive" }
    }
}

/// All tools, owned by the editor and reached through it
#[derive(Debug)]
pub struct ToolSet {
    pub crop: CropTool,
    pub text: TextTool,
    pub filters: FilterTool,
    pub rotate: RotateTool,
    pub zoom: ZoomTool,
}

impl ToolSet {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            crop: CropTool::new(config),
            text: TextTool::new(config),
            filters: FilterTool::new(),
            rotate: RotateTool::new(),
            zoom: ZoomTool::new(config),
        }
    }

    pub fn get(&self, kind: ToolKind) -> &dyn Tool {
        match kind {
            ToolKind::Crop => &self.crop,
            ToolKind::Text => &self.text,
            ToolKind::Filters => &self.filters,
            ToolKind::Rotate => &self.rotate,
            ToolKind::Zoom => &self.zoom,
        }
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> &mut dyn Tool {
        match kind {
            ToolKind::Crop => &mut self.crop,
            ToolKind::Text => &mut self.text,
            ToolKind::Filters => &mut self.filters,
            ToolKind::Rotate => &mut self.rotate,
            ToolKind::Zoom => &mut self.zoom,
        }
    }

    /// Deliver an event to every tool in delivery order
    pub fn dispatch(&mut self, event: &EditorEvent, surface: &Surface) {
        for kind in ToolKind::ALL {
            self.get_mut(kind).on_event(event, surface);
        }
    }

    /// Tools currently reporting themselves active
    pub fn active_kinds(&self) -> Vec<ToolKind> {
        ToolKind::ALL
            .into_iter()
            .filter(|kind| self.get(*kind).is_active())
            .collect()
    }
}
