//! Duplicate-glyph removal.
//!
//! Some producers draw the same text twice at the same position (faux bold,
//! redaction overlays, shadow effects). The glyph stream is cut into
//! provisional words; a word whose rounded box, text, rotation and font face
//! already occurred earlier on the page is dropped with all of its glyphs.
//! The first occurrence always wins, so stream order is preserved.

use crate::model::{Char, FontInfo};
use crate::pipeline::postprocess::SOFT_HYPHEN;
use std::collections::HashSet;
use tracing::debug;

struct Word {
    text: String,
    /// Rotation of the word's first glyph, truncated to whole degrees.
    rotation: i64,
    chars: Vec<Char>,
}

impl Word {
    fn start(ch: Char) -> Self {
        Word {
            text: ch.char.to_string(),
            rotation: ch.rotation.trunc() as i64,
            chars: vec![ch],
        }
    }

    fn font(&self) -> &FontInfo {
        &self.chars[0].font
    }

    fn ends_word(&self) -> bool {
        self.text.ends_with(['\n', ' ', SOFT_HYPHEN])
    }
}

#[derive(PartialEq, Eq, Hash)]
struct WordKey {
    bbox: [i64; 4],
    text: String,
    rotation: i64,
    font_name: String,
    font_flags: u32,
    font_size_bits: u64,
    font_weight: u32,
}

impl WordKey {
    fn of(word: &Word) -> Self {
        let bbox = word
            .chars
            .iter()
            .skip(1)
            .fold(word.chars[0].bbox, |acc, c| acc.merge(&c.bbox))
            .to_array()
            .map(|v| v.round_ties_even() as i64);
        let font = word.font();
        WordKey {
            bbox,
            text: word.text.clone(),
            rotation: word.rotation,
            font_name: font.name.clone(),
            font_flags: font.flags,
            font_size_bits: font.size.to_bits(),
            font_weight: font.weight,
        }
    }
}

pub fn deduplicate_chars(chars: Vec<Char>) -> Vec<Char> {
    let total = chars.len();
    let mut words: Vec<Word> = Vec::new();

    for ch in chars {
        let extend = match words.last() {
            Some(word) => {
                !word.ends_word()
                    && ch.font.same_face(word.font())
                    && ch.rotation == word.rotation as f64
            }
            None => false,
        };

        match words.last_mut() {
            Some(word) if extend => {
                word.text.push(ch.char);
                word.chars.push(ch);
            }
            _ => words.push(Word::start(ch)),
        }
    }

    let mut seen = HashSet::with_capacity(words.len());
    let kept: Vec<Char> = words
        .into_iter()
        .filter(|w| seen.insert(WordKey::of(w)))
        .flat_map(|w| w.chars)
        .collect();

    if kept.len() != total {
        debug!("Dropped {} duplicated glyphs", total - kept.len());
    }
    kept
}
