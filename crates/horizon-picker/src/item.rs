//! List item projection.
//!
//! Candidates are projected into [`ListItem`]s, the searchable view the
//! match engine works on, and, after a search pass, into [`FilteredItem`]s
//! carrying highlight markup. Projections are rebuilt wholesale whenever the
//! candidate set changes; they are never patched in place.

use std::sync::Arc;

use crate::accessor::ItemAccessors;
use crate::config::AutocompleteOptions;
use crate::text;

/// The searchable projection of one candidate.
///
/// `label` and `keywords` are recomputed from `item` whenever the candidate
/// set changes. The back-reference is an `Arc`, so list items never own
/// their candidate and identity comparisons stay cheap.
pub struct ListItem<T> {
    /// Normalized keyword string the match engine searches in. Empty when
    /// local filtering is disabled.
    pub keywords: String,
    /// Display label.
    pub label: String,
    /// The projected candidate.
    pub item: Arc<T>,
}

impl<T> Clone for ListItem<T> {
    fn clone(&self) -> Self {
        Self {
            keywords: self.keywords.clone(),
            label: self.label.clone(),
            item: self.item.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ListItem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListItem")
            .field("label", &self.label)
            .field("keywords", &self.keywords)
            .finish()
    }
}

/// A list item annotated with highlight markup after a search pass.
///
/// Rebuilt on every search; never cached across searches.
pub struct FilteredItem<T> {
    /// Display label, unannotated.
    pub label: String,
    /// Label with matched spans wrapped in `<b>…</b>`.
    pub highlighted: String,
    /// The underlying candidate.
    pub item: Arc<T>,
}

impl<T> FilteredItem<T> {
    /// A filtered item with no highlight annotation.
    pub fn plain(entry: &ListItem<T>) -> Self {
        Self {
            label: entry.label.clone(),
            highlighted: entry.label.clone(),
            item: entry.item.clone(),
        }
    }
}

impl<T> Clone for FilteredItem<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            highlighted: self.highlighted.clone(),
            item: self.item.clone(),
        }
    }
}

impl<T> std::fmt::Debug for FilteredItem<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilteredItem")
            .field("label", &self.label)
            .field("highlighted", &self.highlighted)
            .finish()
    }
}

/// Project the full candidate list into list items.
///
/// Keywords are extracted and normalized only while local filtering is on;
/// with a pre-filtering search source they are left empty.
pub(crate) fn project<T>(
    items: &[Arc<T>],
    accessors: &ItemAccessors<T>,
    options: &AutocompleteOptions,
) -> Vec<ListItem<T>> {
    items
        .iter()
        .map(|item| ListItem {
            keywords: if options.local_filtering {
                normalized_keywords(accessors.keywords_of(item), accessors, options)
            } else {
                String::new()
            },
            label: accessors.label_of(item),
            item: item.clone(),
        })
        .collect()
}

/// Normalize a raw keyword string: cleaning hook, case folding, accents.
pub(crate) fn normalized_keywords<T>(
    raw: String,
    accessors: &ItemAccessors<T>,
    options: &AutocompleteOptions,
) -> String {
    let cleaned = accessors.clean_keywords(&raw);
    let folded = text::fold_case(&cleaned, options.lowercase_keywords);
    if options.ignore_accents {
        text::remove_accents(&folded).into_owned()
    } else {
        folded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arcs(items: Vec<&str>) -> Vec<Arc<String>> {
        items.into_iter().map(|s| Arc::new(s.to_string())).collect()
    }

    #[test]
    fn test_project_extracts_label_and_keywords() {
        let items = arcs(vec!["São Paulo", "Rio"]);
        let accessors = ItemAccessors::<String>::display();
        let options = AutocompleteOptions::default();

        let entries = project(&items, &accessors, &options);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].label, "São Paulo");
        assert_eq!(entries[0].keywords, "sao paulo");
        assert!(Arc::ptr_eq(&entries[0].item, &items[0]));
    }

    #[test]
    fn test_project_without_local_filtering_skips_keywords() {
        let items = arcs(vec!["São Paulo"]);
        let accessors = ItemAccessors::<String>::display();
        let options = AutocompleteOptions::default().with_local_filtering(false);

        let entries = project(&items, &accessors, &options);
        assert_eq!(entries[0].keywords, "");
        assert_eq!(entries[0].label, "São Paulo");
    }

    #[test]
    fn test_keywords_respect_case_and_accent_options() {
        let items = arcs(vec!["São"]);
        let accessors = ItemAccessors::<String>::display();

        let options = AutocompleteOptions::default()
            .with_lowercase_keywords(false)
            .with_ignore_accents(false);
        let entries = project(&items, &accessors, &options);
        assert_eq!(entries[0].keywords, "São");
    }

    #[test]
    fn test_keywords_clean_hook_runs_before_folding() {
        let items = arcs(vec!["A-B"]);
        let accessors =
            ItemAccessors::<String>::display().with_keywords_clean(|k| k.replace('-', " "));
        let options = AutocompleteOptions::default();

        let entries = project(&items, &accessors, &options);
        assert_eq!(entries[0].keywords, "a b");
    }

    #[test]
    fn test_plain_filtered_item() {
        let items = arcs(vec!["Rio"]);
        let accessors = ItemAccessors::<String>::display();
        let options = AutocompleteOptions::default();
        let entries = project(&items, &accessors, &options);

        let plain = FilteredItem::plain(&entries[0]);
        assert_eq!(plain.label, "Rio");
        assert_eq!(plain.highlighted, "Rio");
    }
}
