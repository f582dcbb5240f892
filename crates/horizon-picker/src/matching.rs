//! The match engine: tokenizing, filtering, sorting, and highlighting.
//!
//! A search pass always runs the same pipeline, in order, over the complete
//! freshly-projected item list: filter, then sort, then highlight. The
//! default filter keeps items whose keywords contain the search tokens as
//! plain substrings (no fuzzy matching); both the filter and the sort can be
//! replaced wholesale through [`MatchPolicy`].
//!
//! Highlighting wraps every occurrence of each *distinct matched substring
//! pattern* in the label with `<b>…</b>`. Two long-standing quirks of this
//! annotation scheme are intentionally preserved:
//!
//! - a matched pattern equal to the tag body `"b"` is skipped, so the markup
//!   itself is not rewritten;
//! - insertion is not robust against a later pattern overlapping markup
//!   inserted for an earlier one.

use std::cmp::Ordering;
use std::sync::Arc;

use crate::config::AutocompleteOptions;
use crate::item::{FilteredItem, ListItem};
use crate::text;

/// Replacement filter predicate: `(candidate, tokens) -> keep`.
pub type ItemFilterFn<T> = Arc<dyn Fn(&T, &[String]) -> bool + Send + Sync>;

/// Replacement sort comparator: `(candidate, candidate, tokens) -> ordering`.
pub type ItemSortFn<T> = Arc<dyn Fn(&T, &T, &[String]) -> Ordering + Send + Sync>;

/// Caller overrides for the filter and sort stages.
///
/// An unset stage uses the default policy described on
/// [`number_of_matches`] and the module docs.
pub struct MatchPolicy<T> {
    /// Replaces the default keep-if-tokens-match filter.
    pub filter: Option<ItemFilterFn<T>>,
    /// Replaces the default match-count ordering.
    pub sort: Option<ItemSortFn<T>>,
}

impl<T> MatchPolicy<T> {
    /// Set a replacement filter predicate.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&T, &[String]) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Arc::new(filter));
        self
    }

    /// Set a replacement sort comparator.
    pub fn with_sort<F>(mut self, sort: F) -> Self
    where
        F: Fn(&T, &T, &[String]) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(sort));
        self
    }
}

impl<T> Default for MatchPolicy<T> {
    fn default() -> Self {
        Self {
            filter: None,
            sort: None,
        }
    }
}

impl<T> Clone for MatchPolicy<T> {
    fn clone(&self) -> Self {
        Self {
            filter: self.filter.clone(),
            sort: self.sort.clone(),
        }
    }
}

impl<T> std::fmt::Debug for MatchPolicy<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchPolicy")
            .field("has_filter", &self.filter.is_some())
            .field("has_sort", &self.sort.is_some())
            .finish()
    }
}

/// Split cleaned search text into tokens, dropping empties.
pub fn tokenize(cleaned: &str) -> Vec<String> {
    cleaned
        .split_whitespace()
        .map(|word| word.to_string())
        .collect()
}

/// Count the tokens contained (as substrings) in an item's keywords.
pub fn number_of_matches<T>(entry: &ListItem<T>, tokens: &[String]) -> usize {
    tokens
        .iter()
        .filter(|token| entry.keywords.contains(token.as_str()))
        .count()
}

fn default_keep<T>(entry: &ListItem<T>, tokens: &[String], match_all: bool) -> bool {
    let matches = number_of_matches(entry, tokens);
    if match_all {
        matches >= tokens.len()
    } else {
        matches > 0
    }
}

/// Run filter, sort, and highlight over a fresh projection.
pub(crate) fn run_pipeline<T>(
    entries: &[ListItem<T>],
    tokens: &[String],
    options: &AutocompleteOptions,
    policy: &MatchPolicy<T>,
) -> Vec<FilteredItem<T>> {
    let mut kept: Vec<ListItem<T>> = if options.local_filtering {
        let filtered: Vec<ListItem<T>> = match &policy.filter {
            Some(filter) => entries
                .iter()
                .filter(|entry| filter(&entry.item, tokens))
                .cloned()
                .collect(),
            None => entries
                .iter()
                .filter(|entry| default_keep(entry, tokens, options.match_all_keywords))
                .cloned()
                .collect(),
        };
        filtered
    } else {
        entries.to_vec()
    };

    if options.local_filtering && options.local_sorting {
        if let Some(sort) = &policy.sort {
            kept.sort_by(|a, b| sort(&a.item, &b.item, tokens));
        } else if options.sort_by_matched_keywords {
            // Stable sort: equal match counts keep their original order.
            kept.sort_by(|a, b| {
                number_of_matches(b, tokens).cmp(&number_of_matches(a, tokens))
            });
        }
    }

    kept.iter()
        .map(|entry| FilteredItem {
            label: entry.label.clone(),
            highlighted: highlight_label(&entry.label, tokens, options.ignore_accents),
            item: entry.item.clone(),
        })
        .collect()
}

/// Annotate a label with `<b>…</b>` around every matched span.
///
/// Token positions are located in the lowercased (and optionally
/// accent-stripped) label; the distinct substring patterns read back at
/// those character positions in the *unstripped* lowercase label are then
/// wrapped case-insensitively in the label itself. Positions are character
/// offsets, so precomposed accents keep the stripped and unstripped views
/// aligned; a span that falls outside the unstripped label (decomposed
/// input shortens under stripping) is skipped.
pub fn highlight_label(label: &str, tokens: &[String], ignore_accents: bool) -> String {
    if tokens.is_empty() {
        return label.to_string();
    }

    let label_lower = label.to_lowercase();
    let lower_chars: Vec<char> = label_lower.chars().collect();
    let searchable: Vec<char> = if ignore_accents {
        text::remove_accents(&label_lower).chars().collect()
    } else {
        lower_chars.clone()
    };

    let mut spans: Vec<(usize, usize)> = Vec::new();
    for token in tokens {
        let token = if ignore_accents {
            text::remove_accents(token).into_owned()
        } else {
            token.clone()
        };
        let token_chars: Vec<char> = token.chars().collect();
        if token_chars.is_empty() {
            continue;
        }

        // Leftmost, non-overlapping occurrences.
        let mut from = 0;
        while from + token_chars.len() <= searchable.len() {
            if searchable[from..from + token_chars.len()] == token_chars[..] {
                spans.push((from, from + token_chars.len()));
                from += token_chars.len();
            } else {
                from += 1;
            }
        }
    }

    if spans.is_empty() {
        return label.to_string();
    }

    // Distinct patterns, in first-match order.
    let mut patterns: Vec<String> = Vec::new();
    for (start, end) in spans {
        if end > lower_chars.len() {
            continue;
        }
        let pattern: String = lower_chars[start..end].iter().collect();
        if !patterns.iter().any(|p| *p == pattern) {
            patterns.push(pattern);
        }
    }

    let mut highlighted = label.to_string();
    for pattern in patterns {
        // Wrapping the tag body itself would corrupt earlier markup.
        if pattern == "b" {
            continue;
        }
        highlighted = wrap_occurrences(&highlighted, &pattern);
    }

    highlighted
}

/// Wrap every case-insensitive occurrence of `pattern` (already lowercase)
/// in `<b>…</b>`.
fn wrap_occurrences(haystack: &str, pattern: &str) -> String {
    if pattern.is_empty() {
        return haystack.to_string();
    }

    let mut out = String::with_capacity(haystack.len() + 16);
    let mut rest = haystack;
    while let Some((start, end)) = find_case_insensitive(rest, pattern) {
        out.push_str(&rest[..start]);
        out.push_str("<b>");
        out.push_str(&rest[start..end]);
        out.push_str("</b>");
        rest = &rest[end..];
    }
    out.push_str(rest);
    out
}

fn find_case_insensitive(haystack: &str, pattern: &str) -> Option<(usize, usize)> {
    for (start, _) in haystack.char_indices() {
        if let Some(end) = match_at(haystack, start, pattern) {
            return Some((start, end));
        }
    }
    None
}

/// Match `pattern` at byte offset `start`, comparing the lowercase expansion
/// of each haystack character. Returns the end offset of the match.
fn match_at(haystack: &str, start: usize, pattern: &str) -> Option<usize> {
    let mut pattern_chars = pattern.chars().peekable();
    for (offset, c) in haystack[start..].char_indices() {
        if pattern_chars.peek().is_none() {
            return Some(start + offset);
        }
        for lowered in c.to_lowercase() {
            match pattern_chars.next() {
                Some(expected) if expected == lowered => {}
                // A partial match inside one character's case expansion
                // cannot be wrapped; treat it as a non-match.
                _ => return None,
            }
        }
    }
    if pattern_chars.peek().is_none() {
        Some(haystack.len())
    } else {
        None
    }
}
