//! Configuration options for the picker.
//!
//! [`AutocompleteOptions`] collects every boolean/numeric switch the widget
//! core recognizes. Each option toggles exactly one behavior in the search
//! coordinator or the selection state machine; accessor and policy callbacks
//! live in [`crate::accessor`] and [`crate::matching`] instead, so this
//! struct stays plain data.

use std::time::Duration;

/// Behavior switches for an [`Autocomplete`](crate::Autocomplete) instance.
///
/// The defaults match the common single-select, locally-filtered setup:
/// matching is case- and accent-insensitive, every search token must match,
/// and searches run on every keystroke without delay.
#[derive(Debug, Clone)]
pub struct AutocompleteOptions {
    /// Multi-select mode: the selection is an ordered sequence and picking an
    /// already-selected candidate toggles it off.
    pub multiple: bool,
    /// Allow creating a new candidate from the entered text when nothing is
    /// highlighted (requires an `on_create` callback).
    pub create: bool,
    /// Lock the control once a selection exists; selection commands succeed
    /// trivially without changing anything until the selection is cleared.
    pub lock: bool,
    /// Debounce delay between a keystroke and the search it triggers.
    /// `Duration::ZERO` searches synchronously on every keystroke.
    pub delay: Duration,
    /// Minimum number of characters (after cleaning) before a search runs.
    pub min_characters_to_search: usize,
    /// Hint passed to the search source for how many items the list will
    /// show. `0` means no limit.
    pub max_items_to_show_in_list: usize,
    /// Strip diacritics from keywords and search text before matching.
    pub ignore_accents: bool,
    /// Keep an item only if every search token matches its keywords;
    /// otherwise one matching token suffices.
    pub match_all_keywords: bool,
    /// Order the filtered list by descending match count.
    pub sort_by_matched_keywords: bool,
    /// When the dropdown closes with empty text, select the first entry.
    pub select_first_if_empty: bool,
    /// Close the dropdown when the input loses focus.
    pub close_on_blur: bool,
    /// Enable drag reordering of the selected sequence (multi-select).
    pub orderable_selection: bool,
    /// Filter candidates locally. Disable when the search source already
    /// returns a filtered result set.
    pub local_filtering: bool,
    /// Sort the locally filtered list. Only consulted while local filtering
    /// is on.
    pub local_sorting: bool,
    /// Strip the punctuation denylist from user-entered text before
    /// matching.
    pub clean_user_text: bool,
    /// Lowercase (and trim) keywords and search text before matching.
    pub lowercase_keywords: bool,
    /// Always expose the clear affordance, not just in lock/multiple mode.
    pub show_clear: bool,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            multiple: false,
            create: false,
            lock: false,
            delay: Duration::ZERO,
            min_characters_to_search: 1,
            max_items_to_show_in_list: 0,
            ignore_accents: true,
            match_all_keywords: true,
            sort_by_matched_keywords: false,
            select_first_if_empty: false,
            close_on_blur: false,
            orderable_selection: false,
            local_filtering: true,
            local_sorting: true,
            clean_user_text: true,
            lowercase_keywords: true,
            show_clear: false,
        }
    }
}

impl AutocompleteOptions {
    /// Options for a multi-select picker.
    pub fn multi() -> Self {
        Self {
            multiple: true,
            ..Self::default()
        }
    }

    /// Set multi-select mode.
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Enable the create-new-candidate flow.
    pub fn with_create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    /// Enable lock-on-selection.
    pub fn with_lock(mut self, lock: bool) -> Self {
        self.lock = lock;
        self
    }

    /// Set the input debounce delay.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the minimum search-text length.
    pub fn with_min_characters_to_search(mut self, min: usize) -> Self {
        self.min_characters_to_search = min;
        self
    }

    /// Set the max-items hint forwarded to the search source.
    pub fn with_max_items_to_show_in_list(mut self, max: usize) -> Self {
        self.max_items_to_show_in_list = max;
        self
    }

    /// Toggle accent-insensitive matching.
    pub fn with_ignore_accents(mut self, ignore: bool) -> Self {
        self.ignore_accents = ignore;
        self
    }

    /// Toggle the all-tokens-must-match policy.
    pub fn with_match_all_keywords(mut self, all: bool) -> Self {
        self.match_all_keywords = all;
        self
    }

    /// Toggle ordering by match count.
    pub fn with_sort_by_matched_keywords(mut self, sort: bool) -> Self {
        self.sort_by_matched_keywords = sort;
        self
    }

    /// Toggle select-first-on-close-with-empty-text.
    pub fn with_select_first_if_empty(mut self, select: bool) -> Self {
        self.select_first_if_empty = select;
        self
    }

    /// Toggle close-on-blur.
    pub fn with_close_on_blur(mut self, close: bool) -> Self {
        self.close_on_blur = close;
        self
    }

    /// Toggle drag reordering of the selection.
    pub fn with_orderable_selection(mut self, orderable: bool) -> Self {
        self.orderable_selection = orderable;
        self
    }

    /// Toggle local filtering.
    pub fn with_local_filtering(mut self, local: bool) -> Self {
        self.local_filtering = local;
        self
    }

    /// Toggle local sorting.
    pub fn with_local_sorting(mut self, local: bool) -> Self {
        self.local_sorting = local;
        self
    }

    /// Toggle user-text cleaning.
    pub fn with_clean_user_text(mut self, clean: bool) -> Self {
        self.clean_user_text = clean;
        self
    }

    /// Toggle keyword lowercasing.
    pub fn with_lowercase_keywords(mut self, lowercase: bool) -> Self {
        self.lowercase_keywords = lowercase;
        self
    }

    /// Toggle the always-clearable affordance.
    pub fn with_show_clear(mut self, show: bool) -> Self {
        self.show_clear = show;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = AutocompleteOptions::default();
        assert!(!options.multiple);
        assert_eq!(options.min_characters_to_search, 1);
        assert_eq!(options.delay, Duration::ZERO);
        assert!(options.ignore_accents);
        assert!(options.match_all_keywords);
        assert!(options.local_filtering);
        assert!(options.local_sorting);
        assert!(options.lowercase_keywords);
        assert!(!options.sort_by_matched_keywords);
    }

    #[test]
    fn test_builder_chain() {
        let options = AutocompleteOptions::multi()
            .with_create(true)
            .with_delay(Duration::from_millis(150))
            .with_min_characters_to_search(3);
        assert!(options.multiple);
        assert!(options.create);
        assert_eq!(options.delay, Duration::from_millis(150));
        assert_eq!(options.min_characters_to_search, 3);
    }
}
