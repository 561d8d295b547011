/*!
 * Braille Display Interface
 *
 * The physical (or simulated) display as seen by the display manager:
 * cell count, frame output and connection state. Transport code reports
 * connection changes and key presses through a `DisplayEventSink`.
 */

pub mod input_event;
pub mod simulated;

pub use input_event::{ArgumentType, BrailleInputEvent, InputCommand};
pub use simulated::{DisplayFrame, SimulatedDisplay};

/// Static properties reported by a connected display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayProperties {
    /// Number of cells available for text.
    pub num_text_cells: usize,
    /// Number of status cells (not used for content).
    pub num_status_cells: usize,
}

/// Connection state reported by the display transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Output side of a braille display.
///
/// Only ever called from the display worker.
pub trait BrailleDisplay: Send {
    /// Current properties, `None` while no device is attached.
    fn properties(&self) -> Option<DisplayProperties>;

    /// Shows `cells`. `text` is the printed text the cells stand for and
    /// `braille_to_text[i]` the offset in `text` of cell `i`.
    fn display_dots(&mut self, cells: &[u8], text: &str, braille_to_text: &[usize]);

    /// True for on-screen displays without hardware.
    fn is_simulated(&self) -> bool {
        false
    }

    /// Releases the transport. Called once when the manager stops.
    fn shutdown(&mut self) {}
}
