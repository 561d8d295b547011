//! Input events raised by a braille display.

use std::time::Instant;

/// Commands a display can raise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    PanLeft,
    PanRight,
    LinePrevious,
    LineNext,
    ItemPrevious,
    ItemNext,
    Top,
    Bottom,
    ActivateCurrent,
    ScrollBackward,
    ScrollForward,
    /// Cursor routing key; argument is the cell on the display.
    Route,
    LongPressRoute,
    SelectionStart,
    SelectionEnd,
    /// Chord typed on the braille keyboard; argument is the dot pattern.
    BrailleKey,
    KeyEnter,
    KeyDelete,
    GlobalBack,
    GlobalHome,
    Help,
}

/// How to interpret [`BrailleInputEvent::argument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentType {
    None,
    /// A cell relative to the display's left edge (mapped to a text offset).
    Position,
    /// A dot pattern.
    Dots,
}

impl InputCommand {
    pub fn argument_type(self) -> ArgumentType {
        match self {
            Self::Route | Self::LongPressRoute | Self::SelectionStart | Self::SelectionEnd => {
                ArgumentType::Position
            }
            Self::BrailleKey => ArgumentType::Dots,
            _ => ArgumentType::None,
        }
    }
}

/// A key press on the display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrailleInputEvent {
    pub command: InputCommand,
    pub argument: usize,
    pub event_time: Instant,
}

impl BrailleInputEvent {
    pub fn new(command: InputCommand, argument: usize) -> Self {
        Self {
            command,
            argument,
            event_time: Instant::now(),
        }
    }

    /// Same event with a different argument.
    pub fn with_argument(self, argument: usize) -> Self {
        Self { argument, ..self }
    }
}
