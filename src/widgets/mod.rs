pub mod resize_handle;

pub use resize_handle::{SelectionOverlay, cursor_icon};
