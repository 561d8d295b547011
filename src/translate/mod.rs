/*!
 * Braille Translation
 *
 * Translator contract, translation results and the verbatim-braille splice.
 * The translation rules themselves live behind the `Translator` trait.
 */

pub mod computer_braille;

pub use computer_braille::ComputerBrailleTranslator;

use tracing::{debug, error, warn};

use crate::content::Content;
use crate::error::TranslationError;

/// Converts text to braille cells.
pub trait Translator: Send + Sync {
    /// Translates `text`.
    ///
    /// `cursor`, when set, is a character offset whose cell position the
    /// translator reports exactly in [`TranslationResult::cursor_position`].
    /// With `allow_contraction` false, contracted tables must produce
    /// uncontracted output.
    fn translate(
        &self,
        text: &str,
        cursor: Option<usize>,
        allow_contraction: bool,
    ) -> Result<TranslationResult, TranslationError>;

    /// Name of the active table, for logging.
    fn table_id(&self) -> &str;
}

/// Braille cells plus position maps in both directions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TranslationResult {
    cells: Vec<u8>,
    text_to_braille: Vec<usize>,
    braille_to_text: Vec<usize>,
    cursor_position: Option<usize>,
}

impl TranslationResult {
    /// `text_to_braille` has one entry per character, `braille_to_text` one per cell.
    pub fn new(
        cells: Vec<u8>,
        text_to_braille: Vec<usize>,
        braille_to_text: Vec<usize>,
        cursor_position: Option<usize>,
    ) -> Self {
        debug_assert_eq!(cells.len(), braille_to_text.len());
        Self {
            cells,
            text_to_braille,
            braille_to_text,
            cursor_position,
        }
    }

    /// Blank translation of a text with `text_len` characters: no cells and
    /// an all-zero text-to-braille map.
    pub fn empty(text_len: usize) -> Self {
        Self {
            cells: Vec::new(),
            text_to_braille: vec![0; text_len],
            braille_to_text: Vec::new(),
            cursor_position: None,
        }
    }

    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    pub fn text_to_braille(&self) -> &[usize] {
        &self.text_to_braille
    }

    pub fn braille_to_text(&self) -> &[usize] {
        &self.braille_to_text
    }

    /// Cell of the cursor hint that was passed to the translator.
    pub fn cursor_position(&self) -> Option<usize> {
        self.cursor_position
    }
}

/// Translates `content`, substituting the cells of its first verbatim-braille
/// span for the translation of that range.
///
/// Never fails: without a translator, or when the translator fails on the
/// whole text, the result is [`TranslationResult::empty`].
pub fn translate_content(
    translator: Option<&dyn Translator>,
    content: &Content,
    cursor: Option<usize>,
    allow_contraction: bool,
) -> TranslationResult {
    let Some(translator) = translator else {
        debug!("[Translate] {}, showing blank", TranslationError::NoTable);
        return TranslationResult::empty(content.len());
    };

    let mut verbatim = content.verbatim_braille();
    let first = verbatim.next();
    if verbatim.next().is_some() {
        warn!("[Translate] More than one verbatim braille span, handling first only");
    }

    // Empty spans and spans without cells are not spliced.
    let first = first.filter(|(span, cells)| !cells.is_empty() && !span.is_empty());
    if let Some((span, cells)) = first {
        let spliced = splice_verbatim(
            translator,
            content,
            span.start,
            span.end,
            cells,
            cursor,
            allow_contraction,
        );
        match spliced {
            Ok(result) => return result,
            Err(e) => {
                error!(
                    "[Translate] Could not translate around verbatim braille ({}), \
                     falling back on default translation",
                    e
                );
            }
        }
    }

    translate_or_empty(translator, content.text(), content.len(), cursor, allow_contraction)
}

fn translate_or_empty(
    translator: &dyn Translator,
    text: &str,
    text_len: usize,
    cursor: Option<usize>,
    allow_contraction: bool,
) -> TranslationResult {
    match translator.translate(text, cursor, allow_contraction) {
        Ok(result) => result,
        Err(e) => {
            warn!("[Translate] Table {} failed, showing blank: {}", translator.table_id(), e);
            TranslationResult::empty(text_len)
        }
    }
}

/// Translates a sub-range, short-circuiting empty text so that a verbatim
/// span covering a whole side never depends on the translator.
fn translate_part(
    translator: &dyn Translator,
    text: &str,
    cursor: Option<usize>,
    allow_contraction: bool,
) -> Result<TranslationResult, TranslationError> {
    if text.is_empty() {
        return Ok(TranslationResult {
            cursor_position: cursor.map(|_| 0),
            ..TranslationResult::default()
        });
    }
    translator.translate(text, cursor, allow_contraction)
}

/// left `[0, start)` translated + literal cells + right `[end, len)` translated.
fn splice_verbatim(
    translator: &dyn Translator,
    content: &Content,
    start: usize,
    end: usize,
    literal: &[u8],
    cursor: Option<usize>,
    allow_contraction: bool,
) -> Result<TranslationResult, TranslationError> {
    let text_len = content.len();

    let left_text = content.substring(0, start);
    let left = translate_part(
        translator,
        &left_text,
        cursor.filter(|&c| c < start),
        allow_contraction,
    )?;

    let right_text = content.substring(end, text_len);
    let right = translate_part(
        translator,
        &right_text,
        cursor.filter(|&c| c >= end).map(|c| c - end),
        allow_contraction,
    )?;

    let start_braille = left.cells.len();
    let end_braille = start_braille + literal.len();
    let total_braille = end_braille + right.cells.len();

    let mut cells = Vec::with_capacity(total_braille);
    cells.extend_from_slice(&left.cells);
    cells.extend_from_slice(literal);
    cells.extend_from_slice(&right.cells);

    let mut text_to_braille = Vec::with_capacity(text_len);
    text_to_braille.extend(
        (0..start).map(|i| left.text_to_braille.get(i).copied().unwrap_or(start_braille)),
    );
    text_to_braille.extend((start..end).map(|_| start_braille));
    text_to_braille.extend((end..text_len).map(|i| {
        end_braille + right.text_to_braille.get(i - end).copied().unwrap_or(right.cells.len())
    }));

    let mut braille_to_text = Vec::with_capacity(total_braille);
    braille_to_text.extend(
        (0..start_braille).map(|i| left.braille_to_text.get(i).copied().unwrap_or(start)),
    );
    braille_to_text.extend((start_braille..end_braille).map(|_| start));
    braille_to_text.extend((end_braille..total_braille).map(|i| {
        end + right.braille_to_text.get(i - end_braille).copied().unwrap_or(0)
    }));

    let cursor_position = match cursor {
        None => None,
        Some(c) if c < start => left.cursor_position,
        Some(c) if c < end => Some(start_braille),
        Some(_) => right.cursor_position.map(|p| end_braille + p),
    };

    Ok(TranslationResult {
        cells,
        text_to_braille,
        braille_to_text,
        cursor_position,
    })
}
