//! Text normalisation applied to span and line text before it is emitted.
//!
//! pdfium hands back text exactly as the content stream encoded it: several
//! flavours of space, stray control codes, presentation-form ligatures, and
//! an internal `\x02` marker wherever the PDF signalled a soft hyphen at a
//! line wrap. The rules here turn that into plain, predictable text.
//!
//! None of these functions can fail. Malformed input always produces a
//! best-effort string, with U+FFFD standing in for anything unrecoverable.
//!
//! ## Rule Order
//!
//! 1. CRLF → LF
//! 2. Canonical space / line-break / tab code points
//! 3. Strip `C*` general-category code points (control, format, unassigned…)
//!    except the soft-hyphen marker and standard whitespace
//! 4. Expand ligatures
//!
//! Hyphen handling ([`handle_hyphens`]) is a separate pass because plain
//! text runs it over the whole page while structured output runs it per span.

use crate::config::HyphenMode;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use unicode_general_category::{get_general_category, GeneralCategory};

/// Internal marker pdfium emits at a soft-hyphenated line wrap.
pub const SOFT_HYPHEN: char = '\x02';

const LINE_BREAKS: [char; 2] = ['\n', '\r'];
const SPACES: [char; 4] = [' ', '\u{FFFE}', '\u{FEFF}', '\u{A0}'];
const WHITESPACE: [char; 5] = ['\n', '\r', '\x0C', '\t', ' '];

static LIGATURES: Lazy<HashMap<char, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ('\u{FB00}', "ff"),
        ('\u{FB03}', "ffi"),
        ('\u{FB04}', "ffl"),
        ('\u{FB01}', "fi"),
        ('\u{FB02}', "fl"),
        ('\u{FB06}', "st"),
        ('\u{FB05}', "st"),
    ])
});

/// Apply every normalisation rule to `input`, in order.
pub fn postprocess_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = replace_special_chars(&s);
    let s = remove_control_chars(&s);
    replace_ligatures(&s)
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n")
}

// ── Rule 2: Canonical whitespace ─────────────────────────────────────────────

fn replace_special_chars(input: &str) -> String {
    input
        .chars()
        .map(|c| {
            if SPACES.contains(&c) {
                ' '
            } else if LINE_BREAKS.contains(&c) {
                '\n'
            } else {
                c
            }
        })
        .collect()
}

// ── Rule 3: Strip "other" category code points ──────────────────────────────

fn is_other_category(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::Control
            | GeneralCategory::Format
            | GeneralCategory::Surrogate
            | GeneralCategory::PrivateUse
            | GeneralCategory::Unassigned
    )
}

fn remove_control_chars(input: &str) -> String {
    input
        .chars()
        .filter(|&c| c == SOFT_HYPHEN || WHITESPACE.contains(&c) || !is_other_category(c))
        .collect()
}

// ── Rule 4: Expand ligatures ─────────────────────────────────────────────────

fn replace_ligatures(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match LIGATURES.get(&c) {
            Some(expansion) => out.push_str(expansion),
            None => out.push(c),
        }
    }
    out
}

// ── Surrogate repair ─────────────────────────────────────────────────────────

pub(crate) fn is_high_surrogate(unit: u32) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

pub(crate) fn is_low_surrogate(unit: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Combine a high/low surrogate pair into the scalar it encodes.
pub fn combine_surrogates(high: u32, low: u32) -> Option<char> {
    if !is_high_surrogate(high) || !is_low_surrogate(low) {
        return None;
    }
    char::from_u32(0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00))
}

/// Decode a stream of code values that may contain UTF-16 surrogate halves.
///
/// Valid high+low pairs are recombined; unpaired surrogates and values that
/// are not Unicode scalars become U+FFFD.
pub fn repair_code_units(units: &[u32]) -> String {
    let mut out = String::with_capacity(units.len());
    let mut i = 0;
    while i < units.len() {
        if let Some(c) = units
            .get(i + 1)
            .and_then(|&low| combine_surrogates(units[i], low))
        {
            out.push(c);
            i += 2;
            continue;
        }
        out.push(char::from_u32(units[i]).unwrap_or(char::REPLACEMENT_CHARACTER));
        i += 1;
    }
    out
}

// ── Hyphenation ──────────────────────────────────────────────────────────────

/// Resolve soft-hyphen markers.
///
/// * [`HyphenMode::Keep`] renders each marker as a literal `"-\n"`.
/// * [`HyphenMode::Join`] glues the fragment after a marker onto the one
///   before it: line breaks following the marker are dropped, characters are
///   absorbed up to the next space, and that space becomes a single `'\n'`.
pub fn handle_hyphens(text: &str, mode: HyphenMode) -> String {
    match mode {
        HyphenMode::Keep => text.replace(SOFT_HYPHEN, "-\n"),
        HyphenMode::Join => join_hyphenated(text),
    }
}

fn join_hyphenated(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut after_marker = false;

    for c in text.chars() {
        if c == SOFT_HYPHEN {
            after_marker = true;
        } else if after_marker {
            if LINE_BREAKS.contains(&c) {
                continue;
            } else if SPACES.contains(&c) {
                out.truncate(out.trim_end().len());
                out.push('\n');
                after_marker = false;
            } else {
                out.push(c);
            }
        } else {
            out.push(c);
        }
    }
    out
}
