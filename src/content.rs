/*!
 * Display Content
 *
 * Immutable text-plus-annotations value handed to the display manager.
 * Offsets are character offsets into `text`, never byte offsets.
 */

use tracing::warn;
use uuid::Uuid;

/// Opaque token identifying the UI node that produced a range of text.
///
/// Only compared for equality, never dereferenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub u64);

/// What a span annotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpanKind {
    /// Text selection, or a cursor when empty.
    Selection,
    /// Focused element; only the start offset is marked.
    Focus,
    /// Pre-rendered cells that replace the translation of the range.
    VerbatimBraille(Vec<u8>),
    /// Range produced by an external UI node.
    Node(NodeRef),
}

/// An annotation over `[start, end)` of the content text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub kind: SpanKind,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Same overlap rule as a spanned-text range query: touching counts.
    fn touches(&self, start: usize, end: usize) -> bool {
        self.start <= end && self.end >= start
    }
}

/// Where to put the pan window when content is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PanStrategy {
    /// Leftmost position.
    #[default]
    Reset,
    /// Cover the start of the first selection, else the first focus.
    Cursor,
    /// Stay on the same node as the previous content, else behave like `Cursor`.
    Keep,
}

/// Whether the translator may use contracted braille.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContractionMode {
    /// Contract unless the content has a selection.
    #[default]
    Default,
    AlwaysAllow,
}

/// What should currently be on the display.
#[derive(Debug, Clone)]
pub struct Content {
    id: Uuid,
    text: String,
    char_len: usize,
    spans: Vec<Span>,
    pan_strategy: PanStrategy,
    contraction_mode: ContractionMode,
    split_paragraphs: bool,
    first_node: Option<NodeRef>,
    last_node: Option<NodeRef>,
}

impl Content {
    /// Plain text with no annotations and default strategies.
    pub fn new(text: impl Into<String>) -> Self {
        Self::builder(text).build()
    }

    pub fn builder(text: impl Into<String>) -> ContentBuilder {
        ContentBuilder::new(text)
    }

    /// Identifier used to correlate log lines about this content.
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.char_len
    }

    pub fn is_empty(&self) -> bool {
        self.char_len == 0
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    pub fn pan_strategy(&self) -> PanStrategy {
        self.pan_strategy
    }

    pub fn contraction_mode(&self) -> ContractionMode {
        self.contraction_mode
    }

    pub fn split_paragraphs(&self) -> bool {
        self.split_paragraphs
    }

    /// Node just before this content, for moving focus on a left overflow.
    pub fn first_node(&self) -> Option<NodeRef> {
        self.first_node
    }

    /// Node just after this content, for moving focus on a right overflow.
    pub fn last_node(&self) -> Option<NodeRef> {
        self.last_node
    }

    pub fn selections(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(|s| s.kind == SpanKind::Selection)
    }

    pub fn focuses(&self) -> impl Iterator<Item = &Span> {
        self.spans.iter().filter(|s| s.kind == SpanKind::Focus)
    }

    pub fn verbatim_braille(&self) -> impl Iterator<Item = (&Span, &[u8])> {
        self.spans.iter().filter_map(|s| match &s.kind {
            SpanKind::VerbatimBraille(cells) => Some((s, cells.as_slice())),
            _ => None,
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = (&Span, NodeRef)> {
        self.spans.iter().filter_map(|s| match s.kind {
            SpanKind::Node(node) => Some((s, node)),
            _ => None,
        })
    }

    /// Node spans touching `[start, end]`.
    pub fn nodes_touching(
        &self,
        start: usize,
        end: usize,
    ) -> impl Iterator<Item = (&Span, NodeRef)> {
        self.nodes().filter(move |(span, _)| span.touches(start, end))
    }

    /// First span in this content referring to `node`.
    pub fn find_node(&self, node: NodeRef) -> Option<&Span> {
        self.nodes().find(|(_, n)| *n == node).map(|(span, _)| span)
    }

    /// Text offset handed to the translator as the cursor hint: start of the
    /// first selection, else start of the first focus.
    pub fn cursor_position(&self) -> Option<usize> {
        self.selections()
            .next()
            .or_else(|| self.focuses().next())
            .map(|span| span.start)
    }

    /// Contraction is off only for `ContractionMode::Default` content that has a selection.
    pub fn allow_contraction(&self) -> bool {
        match self.contraction_mode {
            ContractionMode::AlwaysAllow => true,
            ContractionMode::Default => self.selections().next().is_none(),
        }
    }

    /// Characters `[start, end)`, clamped to the text.
    pub fn substring(&self, start: usize, end: usize) -> String {
        let end = end.min(self.char_len);
        if start >= end {
            return String::new();
        }
        self.text.chars().skip(start).take(end - start).collect()
    }
}

/// Builds a [`Content`], normalizing span ranges as they are added.
#[derive(Debug)]
pub struct ContentBuilder {
    text: String,
    char_len: usize,
    spans: Vec<Span>,
    pan_strategy: PanStrategy,
    contraction_mode: ContractionMode,
    split_paragraphs: bool,
    first_node: Option<NodeRef>,
    last_node: Option<NodeRef>,
}

impl ContentBuilder {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let char_len = text.chars().count();
        Self {
            text,
            char_len,
            spans: Vec::new(),
            pan_strategy: PanStrategy::default(),
            contraction_mode: ContractionMode::default(),
            split_paragraphs: false,
            first_node: None,
            last_node: None,
        }
    }

    /// Marks a selection; `start == end` marks a cursor.
    pub fn selection(self, start: usize, end: usize) -> Self {
        self.span(SpanKind::Selection, start, end)
    }

    pub fn focus(self, start: usize, end: usize) -> Self {
        self.span(SpanKind::Focus, start, end)
    }

    pub fn verbatim_braille(self, start: usize, end: usize, cells: impl Into<Vec<u8>>) -> Self {
        self.span(SpanKind::VerbatimBraille(cells.into()), start, end)
    }

    pub fn node(self, start: usize, end: usize, node: NodeRef) -> Self {
        self.span(SpanKind::Node(node), start, end)
    }

    /// Attributes the whole text to `node`.
    pub fn whole_node(self, node: NodeRef) -> Self {
        let len = self.char_len;
        self.span(SpanKind::Node(node), 0, len)
    }

    pub fn pan_strategy(mut self, strategy: PanStrategy) -> Self {
        self.pan_strategy = strategy;
        self
    }

    pub fn contraction_mode(mut self, mode: ContractionMode) -> Self {
        self.contraction_mode = mode;
        self
    }

    pub fn split_paragraphs(mut self, value: bool) -> Self {
        self.split_paragraphs = value;
        self
    }

    pub fn first_node(mut self, node: NodeRef) -> Self {
        self.first_node = Some(node);
        self
    }

    pub fn last_node(mut self, node: NodeRef) -> Self {
        self.last_node = Some(node);
        self
    }

    pub fn build(self) -> Content {
        Content {
            id: Uuid::new_v4(),
            text: self.text,
            char_len: self.char_len,
            spans: self.spans,
            pan_strategy: self.pan_strategy,
            contraction_mode: self.contraction_mode,
            split_paragraphs: self.split_paragraphs,
            first_node: self.first_node,
            last_node: self.last_node,
        }
    }

    fn span(mut self, kind: SpanKind, mut start: usize, mut end: usize) -> Self {
        if end < start {
            warn!("[Content] Reversed span {:?} [{}, {}), swapping", kind, start, end);
            std::mem::swap(&mut start, &mut end);
        }
        if end > self.char_len {
            warn!(
                "[Content] Span {:?} [{}, {}) exceeds text length {}, clamping",
                kind, start, end, self.char_len
            );
            end = self.char_len;
            start = start.min(end);
        }
        self.spans.push(Span { kind, start, end });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversed_ranges_are_swapped() {
        let content = Content::builder("Hello").selection(4, 1).build();
        let span = content.selections().next().unwrap();
        assert_eq!((span.start, span.end), (1, 4));
    }

    #[test]
    fn ranges_past_the_end_are_clamped() {
        let content = Content::builder("abc").focus(2, 9).node(7, 8, NodeRef(1)).build();
        let focus = content.focuses().next().unwrap();
        assert_eq!((focus.start, focus.end), (2, 3));
        let (node, _) = content.nodes().next().unwrap();
        assert_eq!((node.start, node.end), (3, 3));
    }

    #[test]
    fn selection_takes_precedence_for_cursor() {
        let content = Content::builder("Hello, World").focus(0, 5).selection(7, 7).build();
        assert_eq!(content.cursor_position(), Some(7));

        let focus_only = Content::builder("Hello").focus(2, 3).build();
        assert_eq!(focus_only.cursor_position(), Some(2));

        assert_eq!(Content::new("Hello").cursor_position(), None);
    }

    #[test]
    fn contraction_disabled_only_by_selection() {
        assert!(Content::new("text").allow_contraction());
        assert!(Content::builder("text").focus(0, 1).build().allow_contraction());
        assert!(!Content::builder("text").selection(1, 1).build().allow_contraction());
        assert!(Content::builder("text")
            .selection(1, 1)
            .contraction_mode(ContractionMode::AlwaysAllow)
            .build()
            .allow_contraction());
    }

    #[test]
    fn substring_counts_characters() {
        let content = Content::new("héllo wörld");
        assert_eq!(content.len(), 11);
        assert_eq!(content.substring(1, 5), "éllo");
        assert_eq!(content.substring(6, 99), "wörld");
        assert_eq!(content.substring(5, 2), "");
    }

    #[test]
    fn node_lookup() {
        let content = Content::builder("one two three")
            .node(0, 3, NodeRef(1))
            .node(4, 7, NodeRef(2))
            .node(8, 13, NodeRef(3))
            .build();
        assert_eq!(content.find_node(NodeRef(2)).map(|s| s.start), Some(4));
        assert!(content.find_node(NodeRef(9)).is_none());

        let touching: Vec<NodeRef> = content.nodes_touching(5, 8).map(|(_, n)| n).collect();
        assert_eq!(touching, vec![NodeRef(2), NodeRef(3)]);
    }

    #[test]
    fn whole_node_covers_text() {
        let content = Content::builder("button").whole_node(NodeRef(42)).build();
        let span = content.find_node(NodeRef(42)).unwrap();
        assert_eq!((span.start, span.end), (0, 6));
    }
}
