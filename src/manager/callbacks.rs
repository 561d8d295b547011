//! Listener callbacks and the task that delivers them.
//!
//! Callbacks run on their own task, in the order the display worker queued
//! them, so a slow listener never stalls the display.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::content::Content;
use crate::display::{BrailleInputEvent, ConnectionState};

/// Receives display events that the manager does not handle itself.
pub trait DisplayListener: Send + 'static {
    /// Key press with position arguments already mapped to offsets in `content`.
    fn on_mapped_input_event(&mut self, event: BrailleInputEvent, content: &Content);

    /// Panned left past the start of `content`.
    fn on_pan_left_overflow(&mut self, content: &Content);

    /// Panned right past the end of `content`.
    fn on_pan_right_overflow(&mut self, content: &Content);

    fn on_connection_state_changed(&mut self, state: ConnectionState);

    /// `content` is no longer displayed; called once per content, after
    /// every other callback that refers to it.
    fn on_content_released(&mut self, _content: Arc<Content>) {}
}

pub(crate) enum Callback {
    MappedInputEvent(BrailleInputEvent, Arc<Content>),
    PanLeftOverflow(Arc<Content>),
    PanRightOverflow(Arc<Content>),
    ConnectionStateChanged(ConnectionState),
    ContentReleased(Arc<Content>),
}

pub(crate) async fn callback_loop<L: DisplayListener>(
    mut rx: mpsc::UnboundedReceiver<Callback>,
    mut listener: L,
) {
    info!("[Display] Callback loop started");

    while let Some(callback) = rx.recv().await {
        match callback {
            Callback::MappedInputEvent(event, content) => {
                listener.on_mapped_input_event(event, &content);
            }
            Callback::PanLeftOverflow(content) => listener.on_pan_left_overflow(&content),
            Callback::PanRightOverflow(content) => listener.on_pan_right_overflow(&content),
            Callback::ConnectionStateChanged(state) => listener.on_connection_state_changed(state),
            Callback::ContentReleased(content) => {
                debug!("[Display] Releasing content {}", content.id());
                listener.on_content_released(content);
            }
        }
    }

    info!("[Display] Callback loop stopped");
}
