/*!
 * Braille Display Manager Library
 *
 * Content, translation and panning for refreshable braille displays.
 */

pub mod config;
pub mod content;
pub mod display;
pub mod error;
pub mod manager;
pub mod position;
pub mod translate;

// Re-export commonly used types
pub use config::DisplayConfig;
pub use content::{Content, ContentBuilder, ContractionMode, NodeRef, PanStrategy, Span, SpanKind};
pub use display::{
    BrailleDisplay, BrailleInputEvent, ConnectionState, InputCommand, SimulatedDisplay,
};
pub use error::{ConfigError, DisplayError, TranslationError};
pub use manager::{DisplayEventSink, DisplayListener, DisplayManager};
pub use translate::{ComputerBrailleTranslator, TranslationResult, Translator};
