//! Text normalization for search matching.
//!
//! Matching is case- and accent-insensitive by default, so both the
//! user-entered search text and every candidate's keyword string pass through
//! the same canonicalization: punctuation stripping, case folding, and
//! diacritic removal. All functions here are pure and total.

use std::borrow::Cow;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Punctuation stripped from user-entered search text before matching.
///
/// Each occurrence is replaced with a space so adjacent words stay separate
/// tokens.
const SEARCH_PUNCTUATION: &[char] = &[
    '&', '/', '\\', '#', ',', '+', '(', ')', '$', '~', '%', '.', '\'', '"', ':', '*', '?', '<',
    '>', '{', '}',
];

/// Replace the search-punctuation denylist with spaces and trim the result.
pub fn strip_search_punctuation(text: &str) -> String {
    let replaced: String = text
        .chars()
        .map(|c| {
            if SEARCH_PUNCTUATION.contains(&c) {
                ' '
            } else {
                c
            }
        })
        .collect();
    replaced.trim().to_string()
}

/// Strip diacritics by NFD decomposition and combining-mark removal.
///
/// ASCII input (and input whose decomposition carries no combining marks) is
/// returned borrowed without allocating.
///
/// # Examples
///
/// ```
/// use horizon_picker::text::remove_accents;
///
/// assert_eq!(remove_accents("São Tomé"), "Sao Tome");
/// assert_eq!(remove_accents("plain"), "plain");
/// ```
pub fn remove_accents(text: &str) -> Cow<'_, str> {
    if text.is_ascii() {
        return Cow::Borrowed(text);
    }

    let stripped: String = text.nfd().filter(|c| !is_combining_mark(*c)).collect();
    if stripped == text {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(stripped)
    }
}

/// Lowercase and trim when `lowercase` is set, otherwise just trim.
pub(crate) fn fold_case(text: &str, lowercase: bool) -> String {
    if lowercase {
        text.to_lowercase().trim().to_string()
    } else {
        text.trim().to_string()
    }
}
