//! Small text normalization helpers shared by the codec, extractor and
//! inference modules.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Removes diacritics by NFKD-decomposing and dropping combining marks
///
/// ```
/// use listing_harvester::text::fold_diacritics;
///
/// assert_eq!(fold_diacritics("Móstoles Ñandú"), "Mostoles Nandu");
/// ```
pub fn fold_diacritics(text: &str) -> String {
    text.nfkd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Lowercases, strips accents and collapses whitespace
pub fn fold_for_match(text: &str) -> String {
    fold_diacritics(text)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-cases the first letter of every alphabetic run, lower-cases the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Upper-cases the first character and lower-cases everything after it
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    }
}
