//! The record capability queries are evaluated against.
//!
//! The query engine never owns or mutates records. Anything that can report
//! its entry type, its fields and its keywords can be searched by
//! implementing [`Record`]. [`Entry`] is a small in-memory implementation.

use std::collections::BTreeMap;

/// Name of the field holding the keyword list.
pub const KEYWORDS_FIELD: &str = "keywords";

/// Read-only view of a bibliographic record.
///
/// Field names are lowercase. The query engine lowercases the field names a
/// user types before calling [`field_value`](Record::field_value).
///
/// # Manual Implementation
///
/// ```
/// use std::collections::BTreeMap;
/// use bibquery::Record;
///
/// struct Paper {
///     title: String,
/// }
///
/// impl Record for Paper {
///     fn entry_type_name(&self) -> &str {
///         "article"
///     }
///
///     fn field_value(&self, name: &str) -> Option<&str> {
///         match name {
///             "title" => Some(&self.title),
///             _ => None,
///         }
///     }
///
///     fn all_field_values(&self) -> BTreeMap<&str, &str> {
///         BTreeMap::from([("title", self.title.as_str())])
///     }
/// }
/// ```
pub trait Record {
    /// Returns the entry type, e.g. `article` or `inproceedings`.
    fn entry_type_name(&self) -> &str;

    /// Returns the value of a field, or `None` if the record does not have it.
    fn field_value(&self, name: &str) -> Option<&str>;

    /// Returns every field the record has, keyed by field name.
    fn all_field_values(&self) -> BTreeMap<&str, &str>;

    /// Returns the keyword list in order.
    ///
    /// The default splits the `keywords` field on `delimiter`, trims each
    /// entry and drops empty ones.
    fn keyword_list(&self, delimiter: char) -> Vec<String> {
        self.field_value(KEYWORDS_FIELD)
            .map(|raw| split_keywords(raw, delimiter))
            .unwrap_or_default()
    }
}

fn split_keywords(raw: &str, delimiter: char) -> Vec<String> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .map(str::to_string)
        .collect()
}

/// A plain in-memory record.
///
/// Field names are normalized to lowercase on insertion.
///
/// # Example
///
/// ```
/// use bibquery::{Entry, Record};
///
/// let entry = Entry::new("InProceedings")
///     .with_field("Title", "Fruity features")
///     .with_field("keywords", "banana, pineapple");
///
/// assert_eq!(entry.field_value("title"), Some("Fruity features"));
/// assert_eq!(entry.keyword_list(','), vec!["banana", "pineapple"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    entry_type: String,
    fields: BTreeMap<String, String>,
}

impl Entry {
    /// Creates an entry of the given type with no fields.
    pub fn new(entry_type: impl Into<String>) -> Self {
        Entry {
            entry_type: entry_type.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Sets a field and returns the entry.
    pub fn with_field(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_lowercase(), value.into());
    }

    /// Appends a keyword unless the list already contains it.
    pub fn add_keyword(&mut self, keyword: &str, delimiter: char) {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return;
        }
        let existing = self.keyword_list(delimiter);
        if existing.iter().any(|k| k == keyword) {
            return;
        }
        let separator = format!("{delimiter} ");
        let joined = existing
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(keyword))
            .collect::<Vec<_>>()
            .join(separator.as_str());
        self.fields.insert(KEYWORDS_FIELD.to_string(), joined);
    }
}

impl Record for Entry {
    fn entry_type_name(&self) -> &str {
        &self.entry_type
    }

    fn field_value(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    fn all_field_values(&self) -> BTreeMap<&str, &str> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }
}
