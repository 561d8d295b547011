//! Text <-> braille position mapping.
//!
//! Contracted braille makes the maps ambiguous inside a contraction, so both
//! directions special-case the cursor: the translator reports the exact cell
//! of the cursor hint, and that pair is used instead of the maps.

use crate::translate::TranslationResult;

/// Cell index of text offset `text_position`.
///
/// Offsets past the end of the text map to the past-the-end cell.
pub fn text_to_display_position(
    translation: &TranslationResult,
    cursor: Option<usize>,
    text_position: usize,
) -> usize {
    if cursor == Some(text_position) {
        if let Some(cell) = translation.cursor_position() {
            return cell;
        }
    }
    translation
        .text_to_braille()
        .get(text_position)
        .copied()
        .unwrap_or(translation.braille_to_text().len())
}

/// Text offset of cell `display_position`.
///
/// Cells past the end of the braille map to the past-the-end text offset.
pub fn display_to_text_position(
    translation: &TranslationResult,
    cursor: Option<usize>,
    display_position: usize,
) -> usize {
    if let (Some(cell), Some(text)) = (translation.cursor_position(), cursor) {
        if cell == display_position {
            return text;
        }
    }
    translation
        .braille_to_text()
        .get(display_position)
        .copied()
        .unwrap_or(translation.text_to_braille().len())
}
