/*!
 * Display Content Manager
 *
 * Synchronous core of the display manager. Owns the current content, its
 * translation, the overlaid cells and the pan position, and pushes the
 * visible window to the display. Runs on the display worker only.
 */

use std::sync::Arc;

use tracing::{debug, info, trace};

use super::split_points::SplitPoints;
use crate::config::DisplayConfig;
use crate::content::{Content, PanStrategy};
use crate::display::{
    ArgumentType, BrailleDisplay, BrailleInputEvent, ConnectionState, InputCommand,
};
use crate::position::{display_to_text_position, text_to_display_position};
use crate::translate::{translate_content, TranslationResult, Translator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanDirection {
    Left,
    Right,
}

/// Result of a pan request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanOutcome {
    Moved,
    /// Already at the edge; the window did not move.
    Overflow,
}

/// What became of an input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    Panned(PanDirection),
    PanOverflow(PanDirection),
    /// Event to forward, position arguments translated to text offsets.
    Mapped(BrailleInputEvent),
    /// Position argument outside the shown window.
    Dropped,
}

/// The slice of braille currently on the display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayedWindow {
    /// First cell shown (inclusive).
    pub start: usize,
    /// Last cell shown (exclusive).
    pub end: usize,
    /// Translated cells without overlays.
    pub braille: Vec<u8>,
    /// Cells with selection and focus dots, when any were marked.
    pub overlaid: Option<Vec<u8>>,
    /// Printed text the window stands for, padded with a space per extra cell.
    pub text: String,
    /// Offset into `text` of every shown cell.
    pub braille_to_text: Vec<usize>,
    /// Overlays change at least one shown cell.
    pub blink_needed: bool,
}

pub struct DisplayContentManager {
    display: Box<dyn BrailleDisplay>,
    translator: Option<Arc<dyn Translator>>,
    selection_dots: u8,
    focus_dots: u8,
    connected: bool,
    content: Arc<Content>,
    /// The initial empty content is never handed back for release.
    placeholder: bool,
    /// Cursor hint passed to the translator.
    cursor: Option<usize>,
    translation: TranslationResult,
    braille: Vec<u8>,
    /// Copy of `braille` made on the first overlay mark.
    overlaid: Option<Vec<u8>>,
    display_start: usize,
    split_points: SplitPoints,
    overlays_on: bool,
    window: DisplayedWindow,
}

impl DisplayContentManager {
    pub fn new(
        display: Box<dyn BrailleDisplay>,
        translator: Option<Arc<dyn Translator>>,
        config: &DisplayConfig,
    ) -> Self {
        let connected = display.properties().is_some();
        info!(
            "[Display] Content manager created (connected: {}, table: {})",
            connected,
            translator.as_ref().map_or("none", |t| t.table_id())
        );
        Self {
            display,
            translator,
            selection_dots: config.selection_dots,
            focus_dots: config.focus_dots,
            connected,
            content: Arc::new(Content::new("")),
            placeholder: true,
            cursor: None,
            translation: TranslationResult::default(),
            braille: Vec::new(),
            overlaid: None,
            display_start: 0,
            split_points: SplitPoints::default(),
            overlays_on: true,
            window: DisplayedWindow::default(),
        }
    }

    /// Replaces the content and positions the window according to its
    /// pan strategy. Returns the content it superseded, if any.
    pub fn set_content(&mut self, content: Content) -> Option<Arc<Content>> {
        debug!(
            "[Display] Set content {} ({} chars, {:?})",
            content.id(),
            content.len(),
            content.pan_strategy()
        );
        let old_content = std::mem::replace(&mut self.content, Arc::new(content));
        let old_translation = std::mem::take(&mut self.translation);
        let old_display_start = self.display_start;
        let was_placeholder = std::mem::replace(&mut self.placeholder, false);

        self.cursor = self.content.cursor_position();
        self.translate_current_content();
        self.overlays_on = true;

        let pan_position = match self.content.pan_strategy() {
            PanStrategy::Reset => Some(0),
            PanStrategy::Keep => {
                self.find_matching_pan_position(&old_content, &old_translation, old_display_start)
            }
            PanStrategy::Cursor => None,
        };
        let cursor_cell = self.mark_cursor();
        let num_cells = self.num_text_cells();
        let split_points = &self.split_points;
        self.display_start = pan_position
            .or_else(|| cursor_cell.map(|cell| split_points.fix_display_position(cell, num_cells)))
            .unwrap_or(0);
        self.clamp_display_position();
        self.update_displayed_content();

        (!was_placeholder).then_some(old_content)
    }

    /// Translates the current content again, keeping the text at the left
    /// edge of the display in place.
    pub fn retranslate(&mut self) {
        let old_text_position =
            display_to_text_position(&self.translation, self.cursor, self.display_start);
        self.translate_current_content();
        self.display_start =
            text_to_display_position(&self.translation, self.cursor, old_text_position);
        self.mark_cursor();
        self.clamp_display_position();
        self.overlays_on = true;
        self.update_displayed_content();
        debug!(
            "[Display] Retranslated, text offset {} now at cell {}",
            old_text_position, self.display_start
        );
    }

    /// Switches tables and retranslates.
    pub fn set_translator(&mut self, translator: Option<Arc<dyn Translator>>) {
        info!(
            "[Display] Translator changed to {}",
            translator.as_ref().map_or("none", |t| t.table_id())
        );
        self.translator = translator;
        self.retranslate();
    }

    pub fn pan_left(&mut self) -> PanOutcome {
        if self.display_start == 0 {
            return PanOutcome::Overflow;
        }
        let num_cells = self.num_text_cells();
        let left_limit = self.split_points.left_limit(self.display_start);
        self.display_start = left_limit.max(self.display_start.saturating_sub(num_cells));
        self.update_displayed_content();
        PanOutcome::Moved
    }

    /// Pans right by a display width, stopping at the next paragraph start.
    pub fn pan_right(&mut self) -> PanOutcome {
        let len = self.braille.len();
        let num_cells = self.num_text_cells();
        let right_limit = self.split_points.right_limit(self.display_start, len);
        let new_start = (self.display_start + num_cells).min(right_limit);
        if new_start >= len {
            return PanOutcome::Overflow;
        }
        self.display_start = new_start;
        self.clamp_display_position();
        self.update_displayed_content();
        PanOutcome::Moved
    }

    pub fn on_input_event(&mut self, event: BrailleInputEvent) -> InputOutcome {
        trace!("[Display] Input {:?} ({})", event.command, event.argument);
        match event.command {
            InputCommand::PanLeft => match self.pan_left() {
                PanOutcome::Moved => InputOutcome::Panned(PanDirection::Left),
                PanOutcome::Overflow => InputOutcome::PanOverflow(PanDirection::Left),
            },
            InputCommand::PanRight => match self.pan_right() {
                PanOutcome::Moved => InputOutcome::Panned(PanDirection::Right),
                PanOutcome::Overflow => InputOutcome::PanOverflow(PanDirection::Right),
            },
            _ => match self.map_input_event(event) {
                Some(mapped) => InputOutcome::Mapped(mapped),
                None => InputOutcome::Dropped,
            },
        }
    }

    /// Maps a position argument to a text offset; other events pass through.
    pub fn map_input_event(&self, event: BrailleInputEvent) -> Option<BrailleInputEvent> {
        if event.command.argument_type() != ArgumentType::Position {
            return Some(event);
        }
        self.map_input_position(event.argument)
            .map(|text_position| event.with_argument(text_position))
    }

    /// Text offset of the cell `cell_offset` cells right of the display's
    /// left edge, `None` if that cell is past the shown paragraph.
    pub fn map_input_position(&self, cell_offset: usize) -> Option<usize> {
        let Some(cell) = self.display_start.checked_add(cell_offset) else {
            debug!("[Display] Input offset {} out of range, dropped", cell_offset);
            return None;
        };
        let right_limit = self.split_points.right_limit(self.display_start, self.braille.len());
        if cell >= right_limit {
            debug!("[Display] Input at cell {} is past the shown text, dropped", cell);
            return None;
        }
        Some(display_to_text_position(&self.translation, self.cursor, cell))
    }

    pub fn on_connection_state_changed(&mut self, state: ConnectionState) {
        info!("[Display] Connection state: {:?}", state);
        match state {
            ConnectionState::Connected => {
                self.connected = true;
                if let Some(properties) = self.display.properties() {
                    info!(
                        "[Display] {} text cells, {} status cells",
                        properties.num_text_cells, properties.num_status_cells
                    );
                }
                self.retranslate();
            }
            ConnectionState::Disconnected => {
                self.connected = false;
                self.overlays_on = true;
                self.window.blink_needed = false;
            }
        }
    }

    /// Toggles overlay visibility and shows the result.
    pub fn pulse(&mut self) {
        self.overlays_on = !self.overlays_on;
        trace!("[Display] Overlays {}", if self.overlays_on { "on" } else { "off" });
        self.refresh();
    }

    /// Makes overlays visible again without redrawing.
    pub fn reset_blink(&mut self) {
        self.overlays_on = true;
    }

    pub fn blink_needed(&self) -> bool {
        self.connected && self.window.blink_needed
    }

    pub fn overlays_on(&self) -> bool {
        self.overlays_on
    }

    /// Releases the display and hands back the current content.
    pub fn shutdown(&mut self) -> Option<Arc<Content>> {
        info!("[Display] Shutting down display");
        self.display.shutdown();
        self.connected = false;
        let was_placeholder = std::mem::replace(&mut self.placeholder, true);
        let content = std::mem::replace(&mut self.content, Arc::new(Content::new("")));
        (!was_placeholder).then_some(content)
    }

    /// Current content; the empty placeholder before any was set.
    pub fn content(&self) -> &Arc<Content> {
        &self.content
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_simulated(&self) -> bool {
        self.display.is_simulated()
    }

    pub fn display_start(&self) -> usize {
        self.display_start
    }

    pub fn translation(&self) -> &TranslationResult {
        &self.translation
    }

    pub fn braille(&self) -> &[u8] {
        &self.braille
    }

    /// Cells with overlays; equal to the braille when nothing is marked.
    pub fn overlaid(&self) -> &[u8] {
        self.overlaid.as_deref().unwrap_or(&self.braille)
    }

    pub fn split_points(&self) -> &SplitPoints {
        &self.split_points
    }

    pub fn window(&self) -> &DisplayedWindow {
        &self.window
    }

    /// Width of the text area; 1 while disconnected.
    pub fn num_text_cells(&self) -> usize {
        if !self.connected {
            return 1;
        }
        self.display
            .properties()
            .map_or(1, |properties| properties.num_text_cells.max(1))
    }

    fn translate_current_content(&mut self) {
        let allow_contraction = self.content.allow_contraction();
        self.translation = translate_content(
            self.translator.as_deref(),
            &self.content,
            self.cursor,
            allow_contraction,
        );
        self.split_points = SplitPoints::calculate(&self.content, &self.translation, self.cursor);
        self.braille = self.translation.cells().to_vec();
        self.overlaid = None;
    }

    /// Shift that keeps the node nearest the old window's left edge at the
    /// same place on the display.
    fn find_matching_pan_position(
        &self,
        old_content: &Content,
        old_translation: &TranslationResult,
        old_display_start: usize,
    ) -> Option<usize> {
        let num_cells = self.num_text_cells();
        let old_text_start = display_to_text_position(old_translation, None, old_display_start);
        let old_text_end =
            display_to_text_position(old_translation, None, old_display_start + num_cells);

        let mut candidates: Vec<_> =
            old_content.nodes_touching(old_text_start, old_text_end).collect();
        candidates.sort_by_key(|(span, _)| (span.start.abs_diff(old_text_start), span.len()));

        candidates.into_iter().find_map(|(old_span, node)| {
            let new_span = self.content.find_node(node)?;
            let old_cell = text_to_display_position(old_translation, None, old_span.start);
            let new_cell = text_to_display_position(&self.translation, None, new_span.start);
            debug!("[Display] Keeping node {:?} in place ({} -> {})", node, old_cell, new_cell);
            Some((old_display_start + new_cell).saturating_sub(old_cell))
        })
    }

    /// Marks selections and focuses; returns the cell to pan to, preferring
    /// the first selection over the first focus.
    fn mark_cursor(&mut self) -> Option<usize> {
        let content = Arc::clone(&self.content);
        let selection = self.mark_selections(&content);
        let focus = self.mark_focuses(&content);
        selection.or(focus)
    }

    fn mark_selections(&mut self, content: &Content) -> Option<usize> {
        let mut first = None;
        for span in content.selections() {
            let start = text_to_display_position(&self.translation, self.cursor, span.start);
            let mut end = text_to_display_position(&self.translation, self.cursor, span.end);
            if end <= start {
                end = start + 1;
            }
            if end > self.braille.len() {
                self.extend_for_cursor();
            }
            let dots = self.selection_dots;
            let overlaid = self.overlaid_mut();
            let end = end.min(overlaid.len());
            for cell in overlaid.iter_mut().take(end).skip(start) {
                *cell |= dots;
            }
            first.get_or_insert(start);
        }
        first
    }

    fn mark_focuses(&mut self, content: &Content) -> Option<usize> {
        let mut first = None;
        for span in content.focuses() {
            let cell = text_to_display_position(&self.translation, self.cursor, span.start);
            let dots = self.focus_dots;
            if let Some(target) = self.overlaid_mut().get_mut(cell) {
                *target |= dots;
                first.get_or_insert(cell);
            }
        }
        first
    }

    fn overlaid_mut(&mut self) -> &mut Vec<u8> {
        let braille = &self.braille;
        self.overlaid.get_or_insert_with(|| braille.clone())
    }

    /// Adds a blank cell after the text so a cursor at the end has a cell.
    fn extend_for_cursor(&mut self) {
        let mut overlaid = self.overlaid.take().unwrap_or_else(|| self.braille.clone());
        overlaid.push(0);
        self.braille.push(0);
        self.overlaid = Some(overlaid);
    }

    /// Keeps the window inside the braille and right-aligns the last page
    /// of a paragraph.
    fn clamp_display_position(&mut self) {
        let len = self.braille.len();
        if len == 0 {
            self.display_start = 0;
            return;
        }
        let num_cells = self.num_text_cells();
        let start = self.display_start.min(len - 1);
        let paragraph_start = self.split_points.floor(start).unwrap_or(0);
        let right_limit = self.split_points.right_limit(start, len);
        self.display_start = start.min(paragraph_start.max(right_limit.saturating_sub(num_cells)));
    }

    fn update_displayed_content(&mut self) {
        if !self.connected {
            return;
        }
        let len = self.braille.len();
        let start = self.display_start;
        let end = self
            .split_points
            .right_limit(start, len)
            .min(start + self.num_text_cells())
            .max(start);

        let braille_to_text = self.translation.braille_to_text();
        let text_len = self.content.len();
        let text_left = braille_to_text.get(start).copied().unwrap_or(text_len);
        let text_right = braille_to_text.get(end).copied().unwrap_or(text_len).max(text_left);
        let mut text = self.content.substring(text_left, text_right);
        let mut text_chars = text.chars().count();

        // Cells past the translation (the cursor cell) get a padding space.
        let mut window_map = Vec::with_capacity(end - start);
        for cell in start..end {
            match braille_to_text.get(cell) {
                Some(&offset) => window_map.push(offset.saturating_sub(text_left)),
                None => {
                    window_map.push(text_chars);
                    text.push(' ');
                    text_chars += 1;
                }
            }
        }

        let braille = self.braille[start..end].to_vec();
        let overlaid = self.overlaid.as_ref().map(|cells| cells[start..end].to_vec());
        let blink_needed = overlaid.as_ref().is_some_and(|cells| *cells != braille);

        self.window = DisplayedWindow {
            start,
            end,
            braille,
            overlaid,
            text,
            braille_to_text: window_map,
            blink_needed,
        };
        self.refresh();
    }

    fn refresh(&mut self) {
        if !self.connected {
            return;
        }
        let window = &self.window;
        let cells = match (&window.overlaid, self.overlays_on) {
            (Some(overlaid), true) => overlaid,
            _ => &window.braille,
        };
        self.display.display_dots(cells, &window.text, &window.braille_to_text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::NodeRef;
    use crate::display::SimulatedDisplay;
    use crate::error::TranslationError;
    use crate::translate::tests::{BrokenTranslator, IdentityTranslator};

    /// Two cells per character.
    struct DoubleTranslator;

    impl Translator for DoubleTranslator {
        fn translate(
            &self,
            text: &str,
            cursor: Option<usize>,
            _allow_contraction: bool,
        ) -> Result<TranslationResult, TranslationError> {
            let n = text.chars().count();
            let cells = text.chars().flat_map(|c| [c as u8 & 0x3F, 0x24]).collect();
            Ok(TranslationResult::new(
                cells,
                (0..n).map(|i| i * 2).collect(),
                (0..2 * n).map(|c| c / 2).collect(),
                cursor.filter(|&c| c <= n).map(|c| c * 2),
            ))
        }

        fn table_id(&self) -> &str {
            "double"
        }
    }

    fn manager(num_cells: usize) -> (DisplayContentManager, SimulatedDisplay) {
        let display = SimulatedDisplay::new(num_cells);
        let manager = DisplayContentManager::new(
            Box::new(display.clone()),
            Some(Arc::new(IdentityTranslator)),
            &DisplayConfig::default(),
        );
        (manager, display)
    }

    fn nodes_content(text: &str, nodes: &[(usize, usize, u64)], strategy: PanStrategy) -> Content {
        nodes
            .iter()
            .fold(Content::builder(text), |builder, &(start, end, id)| {
                builder.node(start, end, NodeRef(id))
            })
            .pan_strategy(strategy)
            .build()
    }

    #[test]
    fn cursor_strategy_pans_to_selection() {
        let (mut manager, display) = manager(6);
        let content = Content::builder("Hello, World")
            .selection(7, 7)
            .pan_strategy(PanStrategy::Cursor)
            .build();
        manager.set_content(content);

        assert_eq!(manager.display_start(), 6);
        let frame = display.last_frame().unwrap();
        assert_eq!(frame.text, " World");
        assert_eq!(frame.braille_to_text, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(frame.cells[1] & 0xC0, 0xC0);
        for (i, cell) in frame.cells.iter().enumerate() {
            if i != 1 {
                assert_eq!(cell & 0xC0, 0, "cell {} should not be overlaid", i);
            }
        }
        assert!(manager.blink_needed());
    }

    #[test]
    fn empty_content_shows_empty_frame() {
        let (mut manager, display) = manager(10);
        manager.set_content(Content::new(""));
        let frame = display.last_frame().unwrap();
        assert!(frame.cells.is_empty());
        assert!(frame.text.is_empty());
        assert!(!manager.blink_needed());
    }

    #[test]
    fn reset_strategy_starts_at_left_edge() {
        let (mut manager, display) = manager(5);
        let content = Content::builder("Hello, World").selection(9, 10).build();
        manager.set_content(content);
        assert_eq!(manager.display_start(), 0);
        assert_eq!(display.last_frame().unwrap().text, "Hello");
    }

    #[test]
    fn selection_wins_over_focus_for_pan_position() {
        let (mut manager, _display) = manager(4);
        let content = Content::builder("Hello, World")
            .focus(0, 5)
            .selection(9, 9)
            .pan_strategy(PanStrategy::Cursor)
            .build();
        manager.set_content(content);
        assert_eq!(manager.display_start(), 8);
        // Both overlays are still marked.
        assert_eq!(manager.overlaid()[0] & 0xC0, 0xC0);
        assert_eq!(manager.overlaid()[9] & 0xC0, 0xC0);
        assert_eq!(manager.braille()[9] & 0xC0, 0);
    }

    #[test]
    fn focus_positions_window_without_selection() {
        let (mut manager, _display) = manager(4);
        let content = Content::builder("Hello, World")
            .focus(5, 7)
            .pan_strategy(PanStrategy::Cursor)
            .build();
        manager.set_content(content);
        assert_eq!(manager.display_start(), 4);
        assert_eq!(manager.overlaid()[5] & 0xC0, 0xC0);
        assert_eq!(manager.overlaid()[6] & 0xC0, 0);
    }

    #[test]
    fn cursor_at_end_of_text_gets_a_cell() {
        let (mut manager, display) = manager(6);
        let content = Content::builder("abc")
            .selection(3, 3)
            .pan_strategy(PanStrategy::Cursor)
            .build();
        manager.set_content(content);

        assert_eq!(manager.braille().len(), 4);
        assert_eq!(manager.overlaid()[3], 0xC0);
        let frame = display.last_frame().unwrap();
        assert_eq!(frame.cells.len(), 4);
        assert_eq!(frame.text, "abc ");
        assert_eq!(frame.braille_to_text, vec![0, 1, 2, 3]);
    }

    #[test]
    fn pan_right_and_left() {
        let (mut manager, display) = manager(8);
        manager.set_content(Content::new("abcdefghijklmnopqrst"));

        assert_eq!(manager.pan_right(), PanOutcome::Moved);
        assert_eq!(manager.display_start(), 8);
        assert_eq!(display.last_frame().unwrap().text, "ijklmnop");

        // Last page is right-aligned.
        assert_eq!(manager.pan_right(), PanOutcome::Moved);
        assert_eq!(manager.display_start(), 12);
        assert_eq!(display.last_frame().unwrap().text, "mnopqrst");

        let frames = display.frames().len();
        assert_eq!(manager.pan_right(), PanOutcome::Overflow);
        assert_eq!(manager.display_start(), 12);
        assert_eq!(display.frames().len(), frames);

        assert_eq!(manager.pan_left(), PanOutcome::Moved);
        assert_eq!(manager.display_start(), 4);
        assert_eq!(manager.pan_left(), PanOutcome::Moved);
        assert_eq!(manager.display_start(), 0);
        assert_eq!(manager.pan_left(), PanOutcome::Overflow);
        assert_eq!(manager.display_start(), 0);
    }

    #[test]
    fn short_content_overflows_both_ways() {
        let (mut manager, _display) = manager(6);
        manager.set_content(Content::new("abc"));
        assert_eq!(manager.pan_right(), PanOutcome::Overflow);
        assert_eq!(manager.pan_left(), PanOutcome::Overflow);
        assert_eq!(manager.display_start(), 0);
    }

    #[test]
    fn pan_stops_at_paragraph_starts() {
        let (mut manager, display) = manager(4);
        manager.set_content(Content::builder("ab\ncdefgh\nij").split_paragraphs(true).build());
        assert_eq!(manager.split_points().as_slice(), &[3, 10]);
        assert_eq!(display.last_frame().unwrap().text, "ab\n");

        let mut starts = vec![];
        while manager.pan_right() == PanOutcome::Moved {
            starts.push(manager.display_start());
        }
        assert_eq!(starts, vec![3, 6, 10]);
        assert_eq!(display.last_frame().unwrap().text, "ij");

        let mut starts = vec![];
        while manager.pan_left() == PanOutcome::Moved {
            starts.push(manager.display_start());
        }
        assert_eq!(starts, vec![6, 3, 0]);
    }

    #[test]
    fn route_maps_to_text_offset() {
        let (mut manager, _display) = manager(6);
        manager.set_content(
            Content::builder("Hello, World")
                .selection(7, 7)
                .pan_strategy(PanStrategy::Cursor)
                .build(),
        );

        let outcome = manager.on_input_event(BrailleInputEvent::new(InputCommand::Route, 2));
        match outcome {
            InputOutcome::Mapped(event) => {
                assert_eq!(event.command, InputCommand::Route);
                assert_eq!(event.argument, 8);
            }
            other => panic!("unexpected outcome {:?}", other),
        }

        assert_eq!(manager.map_input_position(1), Some(7));
        assert_eq!(manager.map_input_position(6), None);
        assert_eq!(
            manager.on_input_event(BrailleInputEvent::new(InputCommand::LongPressRoute, 9)),
            InputOutcome::Dropped
        );
    }

    #[test]
    fn huge_route_argument_is_dropped() {
        let (mut manager, _display) = manager(6);
        manager.set_content(Content::new("Hello, World"));
        manager.pan_right();
        assert_eq!(manager.display_start(), 6);

        assert_eq!(manager.map_input_position(usize::MAX), None);
        assert_eq!(
            manager.on_input_event(BrailleInputEvent::new(InputCommand::Route, usize::MAX)),
            InputOutcome::Dropped
        );
    }

    #[test]
    fn non_position_arguments_pass_through() {
        let (mut manager, _display) = manager(6);
        manager.set_content(Content::new("Hello"));
        let event = BrailleInputEvent::new(InputCommand::BrailleKey, 0x1B);
        assert_eq!(manager.on_input_event(event), InputOutcome::Mapped(event));
        let event = BrailleInputEvent::new(InputCommand::KeyEnter, 0);
        assert_eq!(manager.on_input_event(event), InputOutcome::Mapped(event));
    }

    #[test]
    fn pan_commands_report_overflow() {
        let (mut manager, _display) = manager(6);
        manager.set_content(Content::new("Hello, World"));
        assert_eq!(
            manager.on_input_event(BrailleInputEvent::new(InputCommand::PanLeft, 0)),
            InputOutcome::PanOverflow(PanDirection::Left)
        );
        assert_eq!(
            manager.on_input_event(BrailleInputEvent::new(InputCommand::PanRight, 0)),
            InputOutcome::Panned(PanDirection::Right)
        );
        assert_eq!(
            manager.on_input_event(BrailleInputEvent::new(InputCommand::PanRight, 0)),
            InputOutcome::PanOverflow(PanDirection::Right)
        );
    }

    #[test]
    fn keep_strategy_follows_nearest_node() {
        let (mut manager, display) = manager(4);
        let nodes = [(0, 3, 1), (4, 7, 2), (8, 13, 3)];
        manager.set_content(nodes_content("one two three", &nodes, PanStrategy::Reset));
        manager.pan_right();
        assert_eq!(manager.display_start(), 4);

        // Window [4, 8] touches "two" (distance 0) and "three" (distance 4).
        let nodes = [(0, 4, 0), (5, 8, 1), (9, 12, 2), (13, 18, 3), (19, 23, 4)];
        manager.set_content(nodes_content("zero one two three four", &nodes, PanStrategy::Keep));
        assert_eq!(manager.display_start(), 9);
        assert_eq!(display.last_frame().unwrap().text, "two ");
    }

    #[test]
    fn keep_strategy_prefers_shorter_node_at_equal_distance() {
        let (mut manager, _display) = manager(4);
        // Both nodes start at the window's left edge; the longer one is listed first.
        let nodes = [(4, 13, 1), (4, 7, 2)];
        manager.set_content(nodes_content("one two three", &nodes, PanStrategy::Reset));
        manager.pan_right();
        assert_eq!(manager.display_start(), 4);

        let nodes = [(2, 12, 1), (9, 12, 2)];
        manager.set_content(nodes_content("zero one two three four", &nodes, PanStrategy::Keep));
        assert_eq!(manager.display_start(), 9);
    }

    #[test]
    fn keep_strategy_falls_back_to_cursor() {
        let (mut manager, _display) = manager(4);
        manager.set_content(nodes_content("one two three", &[(0, 3, 1)], PanStrategy::Reset));
        manager.pan_right();

        let content = Content::builder("something else entirely")
            .node(0, 9, NodeRef(7))
            .focus(15, 16)
            .pan_strategy(PanStrategy::Keep)
            .build();
        manager.set_content(content);
        assert_eq!(manager.display_start(), 12);
    }

    #[test]
    fn retranslate_keeps_left_edge_text() {
        let (mut manager, display) = manager(10);
        let text: String = ('a'..='z').chain('A'..='N').collect();
        manager.set_content(Content::new(text.clone()));
        manager.pan_right();
        assert_eq!(manager.display_start(), 10);

        manager.set_translator(Some(Arc::new(DoubleTranslator)));
        assert_eq!(manager.display_start(), 20);
        assert_eq!(manager.braille().len(), 80);
        let frame = display.last_frame().unwrap();
        assert_eq!(frame.cells.len(), 10);
        assert_eq!(frame.text, "klmno");
        assert_eq!(frame.braille_to_text, vec![0, 0, 1, 1, 2, 2, 3, 3, 4, 4]);
    }

    #[test]
    fn set_content_returns_superseded_content() {
        let (mut manager, _display) = manager(10);
        assert!(manager.set_content(Content::new("first")).is_none());
        let old = manager.set_content(Content::new("second")).unwrap();
        assert_eq!(old.text(), "first");
        assert_eq!(manager.shutdown().map(|c| c.text().to_string()), Some("second".to_string()));
        assert!(manager.shutdown().is_none());
    }

    #[test]
    fn failing_translator_shows_blank_display() {
        let display = SimulatedDisplay::new(10);
        let mut manager = DisplayContentManager::new(
            Box::new(display.clone()),
            Some(Arc::new(BrokenTranslator)),
            &DisplayConfig::default(),
        );
        manager.set_content(Content::builder("Hello").focus(1, 2).build());
        let frame = display.last_frame().unwrap();
        assert!(frame.cells.is_empty());
        assert!(manager.overlaid().is_empty());
        assert_eq!(manager.map_input_position(0), None);
    }

    #[test]
    fn pulse_toggles_overlays() {
        let (mut manager, display) = manager(12);
        manager.set_content(Content::builder("Hello, World").selection(0, 5).build());
        assert!(manager.blink_needed());
        let overlaid = display.last_frame().unwrap().cells;

        manager.pulse();
        assert!(!manager.overlays_on());
        let plain = display.last_frame().unwrap().cells;
        assert_eq!(plain, manager.braille());
        assert_ne!(plain, overlaid);

        manager.pulse();
        assert_eq!(display.last_frame().unwrap().cells, overlaid);
    }

    #[test]
    fn overlays_outside_window_need_no_blink() {
        let (mut manager, _display) = manager(5);
        manager.set_content(Content::builder("Hello, World").focus(9, 10).build());
        assert_eq!(manager.display_start(), 0);
        assert!(!manager.blink_needed());
        assert!(!manager.window().blink_needed);
    }

    #[test]
    fn disconnected_display_is_not_written() {
        let (mut manager, display) = manager(10);
        display.set_connected(false);
        manager.on_connection_state_changed(ConnectionState::Disconnected);
        assert_eq!(manager.num_text_cells(), 1);

        manager.set_content(Content::new("Hello"));
        assert!(display.frames().is_empty());
        assert!(!manager.blink_needed());

        display.set_connected(true);
        manager.on_connection_state_changed(ConnectionState::Connected);
        assert_eq!(manager.num_text_cells(), 10);
        assert_eq!(display.last_frame().unwrap().text, "Hello");
    }

    #[test]
    fn window_is_clamped_after_resize() {
        let (mut manager, display) = manager(4);
        manager.set_content(Content::new("abcdefghij"));
        manager.pan_right();
        manager.pan_right();
        assert_eq!(manager.display_start(), 6);

        display.resize(8);
        manager.retranslate();
        assert_eq!(manager.display_start(), 2);
        assert_eq!(display.last_frame().unwrap().text, "cdefghij");
    }
}
