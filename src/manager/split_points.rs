//! Paragraph split points.
//!
//! A split point is a cell that must be the leftmost cell on the display
//! whenever it is shown at all, so the pan window never straddles one.

use crate::content::Content;
use crate::position::text_to_display_position;
use crate::translate::TranslationResult;

/// Sorted, de-duplicated cell indices where paragraphs start.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitPoints {
    points: Vec<usize>,
}

impl SplitPoints {
    /// Split points of `content` under `translation`: the cell of every
    /// character that follows a `'\n'`. Empty unless the content asks for
    /// split paragraphs.
    pub fn calculate(
        content: &Content,
        translation: &TranslationResult,
        cursor: Option<usize>,
    ) -> Self {
        if !content.split_paragraphs() {
            return Self::default();
        }
        let last = content.len().saturating_sub(1);
        let mut points: Vec<usize> = content
            .text()
            .chars()
            .take(last)
            .enumerate()
            .filter(|&(_, ch)| ch == '\n')
            .map(|(i, _)| text_to_display_position(translation, cursor, i + 1))
            .collect();
        points.sort_unstable();
        points.dedup();
        Self { points }
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.points
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Index of the largest split point `<= position`.
    fn floor_index(&self, position: usize) -> Option<usize> {
        match self.points.binary_search(&position) {
            Ok(index) => Some(index),
            Err(0) => None,
            Err(index) => Some(index - 1),
        }
    }

    /// Largest split point `<= position`.
    pub fn floor(&self, position: usize) -> Option<usize> {
        self.floor_index(position).map(|index| self.points[index])
    }

    /// How far left a pan from `display_start` may go: the start of the
    /// current paragraph, or of the previous one when already at a start.
    pub fn left_limit(&self, display_start: usize) -> usize {
        match self.floor_index(display_start) {
            Some(index) if self.points[index] < display_start => self.points[index],
            Some(index) if index > 0 => self.points[index - 1],
            _ => 0,
        }
    }

    /// First split point after `display_start`, or `num_cells` (the end of
    /// the braille) when there is none.
    pub fn right_limit(&self, display_start: usize, num_cells: usize) -> usize {
        let next = self.floor_index(display_start).map_or(0, |index| index + 1);
        self.points.get(next).copied().unwrap_or(num_cells)
    }

    /// Aligns `position` down to a multiple of the display width, counted
    /// from the enclosing paragraph start. Keeps the window steady while a
    /// cursor moves inside it.
    pub fn fix_display_position(&self, position: usize, display_width: usize) -> usize {
        let width = display_width.max(1);
        let split = self.floor(position).unwrap_or(0);
        (position - split) / width * width + split
    }
}
