pub mod hit_testing;

pub use hit_testing::{CursorHint, ResizeHandle, clamp_prefer_min, clamp_to_bounds, handle_at};
