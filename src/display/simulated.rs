/*!
 * Simulated Display
 *
 * In-process braille display. Records every frame and renders it as
 * Unicode braille (U+2800 block, same dot-to-bit layout as the cells).
 */

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use super::{BrailleDisplay, DisplayProperties};

/// One `display_dots` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFrame {
    pub cells: Vec<u8>,
    pub text: String,
    pub braille_to_text: Vec<usize>,
}

impl DisplayFrame {
    /// Cells as Unicode braille patterns.
    pub fn to_unicode(&self) -> String {
        self.cells
            .iter()
            .map(|&dots| char::from_u32(0x2800 + u32::from(dots)).unwrap_or(' '))
            .collect()
    }
}

#[derive(Debug)]
struct SimulatedState {
    num_cells: usize,
    connected: bool,
    frames: Vec<DisplayFrame>,
    shut_down: bool,
}

type FrameCallback = Arc<dyn Fn(&DisplayFrame) + Send + Sync>;

/// Display backed by memory. Clones share state, so a test or UI can keep a
/// clone to inspect frames and resize while the manager owns another.
#[derive(Clone)]
pub struct SimulatedDisplay {
    state: Arc<Mutex<SimulatedState>>,
    on_frame: Option<FrameCallback>,
}

impl SimulatedDisplay {
    pub fn new(num_cells: usize) -> Self {
        info!("Simulated display created with {} cells", num_cells);
        Self {
            state: Arc::new(Mutex::new(SimulatedState {
                num_cells,
                connected: true,
                frames: Vec::new(),
                shut_down: false,
            })),
            on_frame: None,
        }
    }

    /// Invokes `callback` for every frame shown.
    pub fn on_frame(mut self, callback: impl Fn(&DisplayFrame) + Send + Sync + 'static) -> Self {
        self.on_frame = Some(Arc::new(callback));
        self
    }

    /// Changes the cell count, as when the on-screen display is resized.
    pub fn resize(&self, num_cells: usize) {
        debug!("Simulated display resized to {} cells", num_cells);
        self.lock().num_cells = num_cells;
    }

    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected;
    }

    pub fn frames(&self) -> Vec<DisplayFrame> {
        self.lock().frames.clone()
    }

    pub fn last_frame(&self) -> Option<DisplayFrame> {
        self.lock().frames.last().cloned()
    }

    pub fn is_shut_down(&self) -> bool {
        self.lock().shut_down
    }

    fn lock(&self) -> MutexGuard<'_, SimulatedState> {
        // Plain data; a poisoned lock still holds a consistent state.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BrailleDisplay for SimulatedDisplay {
    fn properties(&self) -> Option<DisplayProperties> {
        let state = self.lock();
        state.connected.then_some(DisplayProperties {
            num_text_cells: state.num_cells,
            num_status_cells: 0,
        })
    }

    fn display_dots(&mut self, cells: &[u8], text: &str, braille_to_text: &[usize]) {
        let frame = DisplayFrame {
            cells: cells.to_vec(),
            text: text.to_string(),
            braille_to_text: braille_to_text.to_vec(),
        };
        if let Some(callback) = &self.on_frame {
            callback(&frame);
        }
        self.lock().frames.push(frame);
    }

    fn is_simulated(&self) -> bool {
        true
    }

    fn shutdown(&mut self) {
        info!("Simulated display shut down");
        let mut state = self.lock();
        state.shut_down = true;
        state.connected = false;
    }
}
