//! Diagram composition and terminal output.

pub mod compose;
pub mod config;
pub mod terminal;
pub mod theme;

// Re-export commonly used items
pub use compose::{compose, Cell, Frame};
pub use config::{DisplayConfig, Highlight, DEFAULT_FPS};
pub use terminal::{print_frame, LiveView, Renderer};
pub use theme::Theme;
