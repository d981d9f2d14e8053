#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod components;
pub mod config;
pub mod editor;
pub mod error;
pub mod event;
pub mod file_handler;
pub mod filters;
pub mod fonts;
pub mod geometry;
pub mod input;
pub mod panels;
pub mod raster;
pub mod surface;
pub mod texture_manager;
pub mod tools;
pub mod widgets;

pub use app::EditorApp;
pub use config::EditorConfig;
pub use editor::{Editor, ExportedImage};
pub use error::{EditorError, EditorResult};
pub use event::{EditorEvent, EventBus, EventHandler, EventLog, SubscriptionId};
pub use input::{InputEvent, InputHandler};
pub use raster::decode_image;
pub use surface::Surface;
pub use tools::{FilterParam, FilterSettings, Tool, ToolKind};
