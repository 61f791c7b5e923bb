//! Extraction results
//!
//! [`ResultStore`] maps each top-level query key to its records in
//! document order. Records nest: a record produced by a step with children
//! carries its own key → records map.

use indexmap::IndexMap;
use serde::Serialize;
use std::ops::Index;

/// Label → records, in first-seen order
pub type ChildMap = IndexMap<String, Vec<ResultRecord>>;

/// Captured facets of one matched element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    /// Key this record was produced under (selector text or alias)
    #[serde(skip)]
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<IndexMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inner_html: Option<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub children: ChildMap,
}

impl ResultRecord {
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Tag name, if captured
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Attribute value, if attributes were captured and the attribute exists
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.as_ref()?.get(name).map(String::as_str)
    }

    pub fn attributes(&self) -> Option<&IndexMap<String, String>> {
        self.attributes.as_ref()
    }

    pub fn text_content(&self) -> Option<&str> {
        self.text_content.as_deref()
    }

    pub fn inner_html(&self) -> Option<&str> {
        self.inner_html.as_deref()
    }

    /// Nested records under `key` (empty when absent)
    pub fn children(&self, key: &str) -> &[ResultRecord] {
        self.children.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether any nested record exists under `key`
    pub fn has_children(&self, key: &str) -> bool {
        self.children.contains_key(key)
    }

    /// Nested keys in first-seen order
    pub fn child_keys(&self) -> impl Iterator<Item = &str> {
        self.children.keys().map(String::as_str)
    }
}

impl Index<&str> for ResultRecord {
    type Output = [ResultRecord];

    fn index(&self, key: &str) -> &[ResultRecord] {
        self.children(key)
    }
}

/// Top-level results: key → records, in plan declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultStore {
    entries: IndexMap<String, Vec<ResultRecord>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, key: String, records: Vec<ResultRecord>) {
        self.entries.insert(key, records);
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Records for `key`, or None if the key is not part of the plan
    pub fn get(&self, key: &str) -> Option<&[ResultRecord]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Keys in plan declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ResultRecord])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of top-level records across all keys
    pub fn record_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// Unwrap into the underlying ordered map
    pub fn into_inner(self) -> IndexMap<String, Vec<ResultRecord>> {
        self.entries
    }
}

impl Index<&str> for ResultStore {
    type Output = [ResultRecord];

    /// Panics when `key` is not part of the plan
    fn index(&self, key: &str) -> &[ResultRecord] {
        match self.get(key) {
            Some(records) => records,
            None => panic!("no query with key `{key}` in result store"),
        }
    }
}

impl<'a> IntoIterator for &'a ResultStore {
    type Item = (&'a String, &'a Vec<ResultRecord>);
    type IntoIter = indexmap::map::Iter<'a, String, Vec<ResultRecord>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
