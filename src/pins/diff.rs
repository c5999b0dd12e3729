//! Merging a batch of pin states into the header table.

use crate::pins::topology::{DebugState, PinTable};
use tracing::trace;

/// Copy `states` into every GPIO pin of `table`.
///
/// Power, ground and decorative positions are never touched. Returns `true`
/// when at least one pin's state differed from the batch.
pub fn apply_states(table: &mut PinTable, states: &[DebugState]) -> bool {
    let mut changed = false;

    for row in table.rows_mut() {
        for pin in row.pins_mut() {
            let Some(index) = pin.function.gpio_index() else {
                continue;
            };
            let Some(state) = states.get(index) else {
                trace!("No state for GPIO {} in this batch", index);
                continue;
            };
            if pin.debug != *state {
                pin.debug = state.clone();
                changed = true;
            }
        }
    }

    changed
}
