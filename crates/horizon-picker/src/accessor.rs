//! Candidate accessors.
//!
//! Candidates are opaque to the picker core; everything it needs from them
//! (a display label, a keyword string to match against, a value projection)
//! comes through caller-supplied accessor functions bundled in
//! [`ItemAccessors`]. Accessors return `Option<String>`: `None` is the
//! misconfiguration signal (missing field, unmappable candidate) and is
//! logged and replaced with an empty string rather than aborting the batch,
//! so one misbehaving candidate can never break the whole widget.
//!
//! For the common "candidates are JSON-ish records" case,
//! [`ItemAccessors::fields`] builds accessors from field names, mirroring a
//! dynamic-language widget's `labelFieldName`/`keywordsFieldName`
//! configuration without reflection.
//!
//! # Example
//!
//! ```
//! use horizon_picker::accessor::ItemAccessors;
//!
//! struct Country {
//!     iso: &'static str,
//!     name: &'static str,
//! }
//!
//! let accessors = ItemAccessors::with_label(|c: &Country| Some(c.name.to_string()))
//!     .with_keywords(|c| Some(format!("{} {}", c.name, c.iso)));
//!
//! let argentina = Country { iso: "AR", name: "Argentina" };
//! assert_eq!(accessors.label_of(&argentina), "Argentina");
//! ```

use std::fmt::Display;
use std::sync::Arc;

use serde_json::Value;
use tracing::warn;

/// Accessor from a candidate to an optional string.
pub type StringAccessor<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Text-cleaning hook applied to keywords or user-entered text.
pub type CleanFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// The capability bundle the core uses to read candidates.
///
/// Holds the label accessor, an optional keywords accessor (defaulting to
/// the label), and optional cleaning hooks for keywords and user-entered
/// text.
pub struct ItemAccessors<T> {
    label: StringAccessor<T>,
    keywords: Option<StringAccessor<T>>,
    keywords_clean: Option<CleanFn>,
    text_clean: Option<CleanFn>,
}

impl<T> ItemAccessors<T> {
    /// Build accessors from a label function; keywords default to the label.
    pub fn with_label<F>(label: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        Self {
            label: Arc::new(label),
            keywords: None,
            keywords_clean: None,
            text_clean: None,
        }
    }

    /// Accessors for candidates that render themselves.
    pub fn display() -> Self
    where
        T: Display,
    {
        Self::with_label(|item: &T| Some(item.to_string()))
    }

    /// Replace the keywords accessor.
    pub fn with_keywords<F>(mut self, keywords: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.keywords = Some(Arc::new(keywords));
        self
    }

    /// Install a hook that post-processes extracted keywords.
    pub fn with_keywords_clean<F>(mut self, clean: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.keywords_clean = Some(Arc::new(clean));
        self
    }

    /// Install a hook that post-processes user-entered search text.
    pub fn with_text_clean<F>(mut self, clean: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.text_clean = Some(Arc::new(clean));
        self
    }

    /// The candidate's display label.
    ///
    /// A `None` from the accessor is logged and replaced with `""`.
    pub fn label_of(&self, item: &T) -> String {
        match (self.label)(item) {
            Some(label) => label,
            None => {
                warn!(
                    target: "horizon_picker::items",
                    "label accessor produced no value; substituting empty label"
                );
                String::new()
            }
        }
    }

    /// The candidate's raw keyword string, before normalization.
    ///
    /// Falls back to the label accessor when no keywords accessor is
    /// configured; a `None` is logged and replaced with `""`.
    pub fn keywords_of(&self, item: &T) -> String {
        let raw = match &self.keywords {
            Some(keywords) => keywords(item),
            None => (self.label)(item),
        };
        match raw {
            Some(keywords) => keywords,
            None => {
                warn!(
                    target: "horizon_picker::items",
                    "keywords accessor produced no value; substituting empty keywords"
                );
                String::new()
            }
        }
    }

    /// Apply the keywords-cleaning hook, if any.
    pub(crate) fn clean_keywords(&self, raw: &str) -> String {
        match &self.keywords_clean {
            Some(clean) => clean(raw),
            None => raw.to_string(),
        }
    }

    /// Apply the user-text-cleaning hook, if any.
    pub(crate) fn clean_text(&self, raw: &str) -> String {
        match &self.text_clean {
            Some(clean) => clean(raw),
            None => raw.to_string(),
        }
    }
}

impl<T> Clone for ItemAccessors<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            keywords: self.keywords.clone(),
            keywords_clean: self.keywords_clean.clone(),
            text_clean: self.text_clean.clone(),
        }
    }
}

impl<T> std::fmt::Debug for ItemAccessors<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ItemAccessors")
            .field("has_keywords", &self.keywords.is_some())
            .field("has_keywords_clean", &self.keywords_clean.is_some())
            .field("has_text_clean", &self.text_clean.is_some())
            .finish()
    }
}

/// Field names for building accessors over JSON-ish candidates.
#[derive(Debug, Clone, Default)]
pub struct FieldNames {
    /// Field holding the display label. `None` stringifies the whole value.
    pub label: Option<String>,
    /// Field holding the keyword text. `None` falls back to the label field.
    pub keywords: Option<String>,
    /// Field holding the value projection. `None` uses the whole value.
    pub value: Option<String>,
}

impl FieldNames {
    /// Label (and keywords) come from the given field.
    pub fn label(field: impl Into<String>) -> Self {
        Self {
            label: Some(field.into()),
            keywords: None,
            value: None,
        }
    }

    /// Set the keywords field.
    pub fn with_keywords(mut self, field: impl Into<String>) -> Self {
        self.keywords = Some(field.into());
        self
    }

    /// Set the value field.
    pub fn with_value(mut self, field: impl Into<String>) -> Self {
        self.value = Some(field.into());
        self
    }
}

/// Read a field of a JSON value as a string.
///
/// String fields are taken verbatim; other field types are stringified via
/// their JSON rendering. A missing field yields `None` (the misuse signal).
fn field_as_string(item: &Value, field: &str) -> Option<String> {
    match item.get(field)? {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn value_as_string(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl ItemAccessors<Value> {
    /// Accessors over JSON candidates driven by field names.
    pub fn fields(names: FieldNames) -> Self {
        let label_field = names.label.clone();
        let keywords_field = names.keywords.or_else(|| names.label.clone());

        let mut accessors = Self::with_label(move |item: &Value| match &label_field {
            Some(field) => field_as_string(item, field),
            None => value_as_string(item),
        });

        if let Some(field) = keywords_field {
            accessors = accessors.with_keywords(move |item: &Value| field_as_string(item, &field));
        }

        accessors
    }
}

/// A value projection over JSON candidates driven by a field name.
///
/// Returns the named field (cloned) or, when `field` is `None`, the whole
/// candidate. A missing field is logged and projected as `Value::Null`.
pub fn json_field_value(field: Option<String>) -> impl Fn(&Value) -> Value + Send + Sync + 'static {
    move |item: &Value| match &field {
        Some(name) => match item.get(name) {
            Some(value) => value.clone(),
            None => {
                warn!(
                    target: "horizon_picker::items",
                    field = %name,
                    "value field missing on candidate; projecting null"
                );
                Value::Null
            }
        },
        None => item.clone(),
    }
}
