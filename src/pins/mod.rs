//! Pin state ingestion: header topology, `pinctrl` parsing and state diffing.
//!
//! One refresh cycle reads a full batch of states from a [`PinStateSource`],
//! then merges it into the [`PinTable`] with [`apply_states`]. A batch that
//! fails to parse is discarded whole, so the table never holds a partial update.

pub mod device;
pub mod diff;
pub mod parser;
pub mod source;
pub mod topology;

// Re-export commonly used items
pub use device::{locate_controllable_device, open_device, ControllableDevice, LineInfo};
pub use diff::apply_states;
pub use parser::{parse_all, parse_line, RawLineRecord};
pub use source::{PinStateSource, PinctrlSource, SourceConfig};
pub use topology::{
    DebugState, Field, HeaderRow, Pin, PinCategory, PinFunction, PinTable, GPIO_COUNT,
};
