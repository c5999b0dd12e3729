//! # Pinout Pi - Live Raspberry Pi GPIO Header Diagram
//!
//! Draws the Raspberry Pi 40-pin header in the terminal and overlays the
//! live state of every GPIO line, as reported by `pinctrl`.
//!
//! ## Features
//!
//! - **Header diagram**: GPIO, power and ground labels with optional I2C/SPI columns
//! - **Pin debug state**: mode, drive, pull, level and consumer for each GPIO
//! - **Search**: highlight any label matching a regex or glob
//! - **Live mode**: redraw in place whenever a pin changes
//! - **Library + Binary**: Use as a crate or standalone application
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pinout_pi::{DisplayConfig, PinctrlSource, Refresher, Renderer, SourceConfig, Theme};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DisplayConfig::default().with_labels(["i2c"])?.with_debug(true);
//!     let mut refresher = Refresher::new(PinctrlSource::new(SourceConfig::default()));
//!
//!     refresher
//!         .run(&config, &Theme::default(), Renderer::new(true), std::io::stdout(), std::future::pending())
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod pins;
pub mod refresh;
pub mod render;

// Re-export public API
pub use error::{PinoutError, Result};
pub use pins::{
    apply_states, parse_all, parse_line, DebugState, Field, PinStateSource, PinTable,
    PinctrlSource, SourceConfig, GPIO_COUNT,
};
pub use refresh::{RefreshMode, Refresher};
pub use render::{compose, DisplayConfig, Frame, Renderer, Theme, DEFAULT_FPS};
