/*!
 * Display Manager
 *
 * Async front end of the display content manager. Commands, key presses and
 * connection changes are queued to a display task that owns all manager
 * state and the blink timer. Results go to the listener through a second,
 * callback task.
 */

pub mod callbacks;
pub mod content_manager;
pub mod split_points;

pub use callbacks::DisplayListener;
pub use content_manager::{
    DisplayContentManager, DisplayedWindow, InputOutcome, PanDirection, PanOutcome,
};
pub use split_points::SplitPoints;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};
use tracing::{debug, info, warn};

use crate::config::DisplayConfig;
use crate::content::Content;
use crate::display::{BrailleDisplay, BrailleInputEvent, ConnectionState};
use crate::error::DisplayError;
use crate::translate::Translator;
use callbacks::{callback_loop, Callback};

enum DisplayCommand {
    SetContent(Content),
    Retranslate,
    SetTranslator(Option<Arc<dyn Translator>>),
    PanLeft,
    PanRight,
    InputEvent(BrailleInputEvent),
    ConnectionStateChanged(ConnectionState),
    Stop,
}

/// Entry point for the display transport: connection changes and key
/// presses, queued in order with the manager's other commands.
#[derive(Clone)]
pub struct DisplayEventSink {
    tx: mpsc::UnboundedSender<DisplayCommand>,
}

impl DisplayEventSink {
    pub fn connection_state_changed(&self, state: ConnectionState) -> Result<(), DisplayError> {
        send(&self.tx, DisplayCommand::ConnectionStateChanged(state))
    }

    pub fn input_event(&self, event: BrailleInputEvent) -> Result<(), DisplayError> {
        send(&self.tx, DisplayCommand::InputEvent(event))
    }
}

fn send(
    tx: &mpsc::UnboundedSender<DisplayCommand>,
    command: DisplayCommand,
) -> Result<(), DisplayError> {
    tx.send(command).map_err(|_| DisplayError::NotRunning)
}

/// Handle to a running display manager.
///
/// Every method only queues work; none waits for the display task except
/// [`DisplayManager::shutdown`].
pub struct DisplayManager {
    command_tx: mpsc::UnboundedSender<DisplayCommand>,
    is_simulated: Arc<AtomicBool>,
    shutdown_timeout: Duration,
    /// Task handles for graceful shutdown
    tasks: Option<(JoinHandle<()>, JoinHandle<()>)>,
}

impl DisplayManager {
    /// Spawns the display and callback tasks. Must be called from within a
    /// Tokio runtime.
    pub fn start<L: DisplayListener>(
        config: &DisplayConfig,
        display: Box<dyn BrailleDisplay>,
        translator: Option<Arc<dyn Translator>>,
        listener: L,
    ) -> Self {
        info!("Starting display manager");

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (callback_tx, callback_rx) = mpsc::unbounded_channel();

        let core = DisplayContentManager::new(display, translator, config);
        let is_simulated = Arc::new(AtomicBool::new(core.is_simulated()));

        let worker = DisplayWorker {
            core,
            callback_tx,
            blink_on: config.blink_on(),
            blink_off: config.blink_off(),
            pulse_at: None,
            is_simulated: is_simulated.clone(),
        };
        let display_task = tokio::spawn(worker.run(command_rx));
        let callback_task = tokio::spawn(callback_loop(callback_rx, listener));

        info!("Display manager started");

        Self {
            command_tx,
            is_simulated,
            shutdown_timeout: config.shutdown_timeout(),
            tasks: Some((display_task, callback_task)),
        }
    }

    pub fn set_content(&self, content: Content) -> Result<(), DisplayError> {
        send(&self.command_tx, DisplayCommand::SetContent(content))
    }

    pub fn retranslate(&self) -> Result<(), DisplayError> {
        send(&self.command_tx, DisplayCommand::Retranslate)
    }

    /// Switches braille tables; `None` leaves the display blank.
    pub fn set_translator(
        &self,
        translator: Option<Arc<dyn Translator>>,
    ) -> Result<(), DisplayError> {
        send(&self.command_tx, DisplayCommand::SetTranslator(translator))
    }

    pub fn pan_left(&self) -> Result<(), DisplayError> {
        send(&self.command_tx, DisplayCommand::PanLeft)
    }

    pub fn pan_right(&self) -> Result<(), DisplayError> {
        send(&self.command_tx, DisplayCommand::PanRight)
    }

    /// Queues a key press from the physical display.
    pub fn on_input_event(&self, event: BrailleInputEvent) -> Result<(), DisplayError> {
        send(&self.command_tx, DisplayCommand::InputEvent(event))
    }

    pub fn event_sink(&self) -> DisplayEventSink {
        DisplayEventSink {
            tx: self.command_tx.clone(),
        }
    }

    /// Whether the display seen at the last connection change is simulated.
    pub fn is_simulated_display(&self) -> bool {
        self.is_simulated.load(Ordering::Relaxed)
    }

    /// Stops the display task after the commands already queued, releases
    /// the current content and waits (bounded) for both tasks.
    pub async fn shutdown(mut self) {
        info!("Stopping display manager");

        if self.command_tx.send(DisplayCommand::Stop).is_err() {
            debug!("Display task already stopped");
        }

        if let Some((display_task, callback_task)) = self.tasks.take() {
            let wait = async {
                if let Err(e) = display_task.await {
                    warn!("Display task join error: {}", e);
                }
                if let Err(e) = callback_task.await {
                    warn!("Callback task join error: {}", e);
                }
            };
            match tokio::time::timeout(self.shutdown_timeout, wait).await {
                Ok(()) => info!("Display manager stopped"),
                Err(_) => warn!(
                    "Display manager did not stop within {:?}, continuing",
                    self.shutdown_timeout
                ),
            }
        }
    }
}

impl Drop for DisplayManager {
    fn drop(&mut self) {
        if self.tasks.is_some() {
            debug!("Display manager dropped without shutdown, stopping tasks");
            let _ = self.command_tx.send(DisplayCommand::Stop);
        }
    }
}

struct DisplayWorker {
    core: DisplayContentManager,
    callback_tx: mpsc::UnboundedSender<Callback>,
    blink_on: Duration,
    blink_off: Duration,
    /// Next overlay toggle, while blinking.
    pulse_at: Option<Instant>,
    is_simulated: Arc<AtomicBool>,
}

impl DisplayWorker {
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<DisplayCommand>) {
        info!("[Display] Display loop started");

        loop {
            let command = match self.pulse_at {
                Some(deadline) => tokio::select! {
                    command = rx.recv() => command,
                    _ = sleep_until(deadline) => {
                        self.pulse_at = None;
                        self.core.pulse();
                        self.schedule_blink();
                        continue;
                    }
                },
                None => rx.recv().await,
            };

            let Some(command) = command else {
                info!("[Display] All handles dropped");
                break;
            };

            if !self.handle(command) {
                break;
            }
            self.schedule_blink();
        }

        // Stop ends the task; anything still queued is dropped with `rx`.
        info!("[Display] Display loop stopped");
    }

    /// Returns false once stopped.
    fn handle(&mut self, command: DisplayCommand) -> bool {
        match command {
            DisplayCommand::SetContent(content) => {
                self.pulse_at = None;
                if let Some(old) = self.core.set_content(content) {
                    self.notify(Callback::ContentReleased(old));
                }
            }
            DisplayCommand::Retranslate => {
                self.pulse_at = None;
                self.core.retranslate();
            }
            DisplayCommand::SetTranslator(translator) => {
                self.pulse_at = None;
                self.core.set_translator(translator);
            }
            DisplayCommand::PanLeft => {
                if self.core.pan_left() == PanOutcome::Overflow {
                    self.notify_overflow(PanDirection::Left);
                }
            }
            DisplayCommand::PanRight => {
                if self.core.pan_right() == PanOutcome::Overflow {
                    self.notify_overflow(PanDirection::Right);
                }
            }
            DisplayCommand::InputEvent(event) => match self.core.on_input_event(event) {
                InputOutcome::Mapped(mapped) => {
                    let content = self.core.content().clone();
                    self.notify(Callback::MappedInputEvent(mapped, content));
                }
                InputOutcome::PanOverflow(direction) => self.notify_overflow(direction),
                InputOutcome::Panned(_) | InputOutcome::Dropped => {}
            },
            DisplayCommand::ConnectionStateChanged(state) => {
                if state == ConnectionState::Disconnected {
                    self.pulse_at = None;
                }
                self.core.on_connection_state_changed(state);
                self.is_simulated.store(self.core.is_simulated(), Ordering::Relaxed);
                self.notify(Callback::ConnectionStateChanged(state));
            }
            DisplayCommand::Stop => {
                self.pulse_at = None;
                if let Some(content) = self.core.shutdown() {
                    self.notify(Callback::ContentReleased(content));
                }
                return false;
            }
        }
        true
    }

    /// Starts or cancels the blink timer to match the shown window.
    fn schedule_blink(&mut self) {
        if !self.core.blink_needed() {
            self.pulse_at = None;
            self.core.reset_blink();
            return;
        }
        if self.pulse_at.is_none() {
            let delay = if self.core.overlays_on() { self.blink_on } else { self.blink_off };
            self.pulse_at = Some(Instant::now() + delay);
        }
    }

    fn notify_overflow(&self, direction: PanDirection) {
        let content = self.core.content().clone();
        match direction {
            PanDirection::Left => self.notify(Callback::PanLeftOverflow(content)),
            PanDirection::Right => self.notify(Callback::PanRightOverflow(content)),
        }
    }

    fn notify(&self, callback: Callback) {
        if self.callback_tx.send(callback).is_err() {
            warn!("[Display] Callback task gone, dropping callback");
        }
    }
}
