use crate::tools::ToolKind;

/// Lifecycle events published by the editor.
///
/// Delivery is synchronous: every subscriber has seen the event before
/// `publish` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    /// A tool became the single active tool
    ToolActivated { tool: ToolKind },
    /// Every tool was deactivated
    ToolDeactivated,
    /// The image was restored to the originally loaded one; tools clear their state
    ImageReset,
    /// Surface dimensions or content changed
    CanvasUpdated,
}

impl EditorEvent {
    /// The event's name as used by external listeners
    pub fn name(&self) -> &'static str {
        match self {
            Self::ToolActivated { .. } => "toolActivated",
            Self::ToolDeactivated => "toolDeactivated",
            Self::ImageReset => "imageReset",
            Self::CanvasUpdated => "canvasUpdated",
        }
    }

    pub fn tool(&self) -> Option<ToolKind> {
        match self {
            Self::ToolActivated { tool } => Some(*tool),
            _ => None,
        }
    }
}

impl std::fmt::Display for EditorEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ToolActivated { tool } => write!(f, "{}({})", self.name(), tool.name()),
            _ => f.write_str(self.name()),
        }
    }
}
