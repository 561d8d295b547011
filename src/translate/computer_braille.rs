//! Uncontracted 8-dot computer braille.
//!
//! Every character becomes exactly one cell, so the position maps are the
//! identity and the cursor hint maps to itself.

use crate::error::TranslationError;

use super::{TranslationResult, Translator};

/// Printable ASCII 0x20..=0x5F indexed by 6-dot pattern (dot 1 = bit 0).
const ASCII_BRAILLE: &[u8; 64] =
    b" A1B'K2L@CIF/MSP\"E3H9O6R^DJG>NTQ,*5<-U8V.%[$+X!&;:4\\0Z7(_?W]#Y)=";

pub const DOT7: u8 = 0x40;
pub const DOT8: u8 = 0x80;

/// Shown for characters the table has no pattern for.
pub const UNKNOWN_CELL: u8 = 0xFF;

/// Built-in computer braille table.
#[derive(Debug, Clone)]
pub struct ComputerBrailleTranslator {
    patterns: [Option<u8>; 128],
}

impl ComputerBrailleTranslator {
    pub fn new() -> Self {
        let mut patterns = [None; 128];
        for (dots, &ch) in ASCII_BRAILLE.iter().enumerate() {
            let dots = dots as u8;
            patterns[ch as usize] = Some(dots);
            if ch.is_ascii_uppercase() {
                // Lowercase letters are plain, capitals carry dot 7.
                patterns[ch.to_ascii_lowercase() as usize] = Some(dots);
                patterns[ch as usize] = Some(dots | DOT7);
            } else if (0x40..=0x5F).contains(&ch) {
                // ` { | } ~ reuse @ [ \ ] ^ plus dot 7.
                patterns[(ch + 0x20) as usize & 0x7F] = Some(dots | DOT7);
            }
        }
        patterns[b'\n' as usize] = Some(0);
        patterns[0x7F] = None;
        Self { patterns }
    }

    /// Dot pattern for `ch`.
    pub fn cell(&self, ch: char) -> u8 {
        u8::try_from(ch)
            .ok()
            .and_then(|b| self.patterns.get(b as usize).copied().flatten())
            .unwrap_or(UNKNOWN_CELL)
    }
}

impl Default for ComputerBrailleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

impl Translator for ComputerBrailleTranslator {
    fn translate(
        &self,
        text: &str,
        cursor: Option<usize>,
        _allow_contraction: bool,
    ) -> Result<TranslationResult, TranslationError> {
        let cells: Vec<u8> = text.chars().map(|ch| self.cell(ch)).collect();
        let len = cells.len();
        Ok(TranslationResult::new(
            cells,
            (0..len).collect(),
            (0..len).collect(),
            cursor.filter(|&c| c <= len),
        ))
    }

    fn table_id(&self) -> &str {
        "computer-braille-8dot"
    }
}
