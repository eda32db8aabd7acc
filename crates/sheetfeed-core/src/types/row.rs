//! Row dictionaries projected from list feed entries.

use crate::types::feed::ListEntry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key under which a row's id is stored in its [`Row`] projection.
pub const ID_FIELD: &str = "__rowid__";

/// Derives the list feed column name for a header cell.
///
/// The service lower-cases header text and drops everything that is not
/// alphanumeric.
///
/// # Examples
///
/// ```
/// use sheetfeed_core::types::column_key;
///
/// assert_eq!(column_key("First Name"), "firstname");
/// assert_eq!(column_key("e-mail #"), "email");
/// ```
pub fn column_key(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// A worksheet row as a flat column-name to value map.
///
/// Rows read from the service carry their id under [`ID_FIELD`]; rows built
/// by callers for insertion usually do not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, String>);

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Projects a list entry into a row, adding its id under [`ID_FIELD`].
    pub fn from_entry(entry: &ListEntry) -> Self {
        let mut values = entry.values.clone();
        values.insert(ID_FIELD.to_string(), entry.row_id().to_string());
        Self(values)
    }

    /// Returns the row id, if present.
    pub fn id(&self) -> Option<&str> {
        self.0.get(ID_FIELD).map(String::as_str)
    }

    /// Returns the value of a column.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.0.get(column).map(String::as_str)
    }

    /// Sets a column value, returning the previous one.
    pub fn insert(
        &mut self,
        column: impl Into<String>,
        value: impl Into<String>,
    ) -> Option<String> {
        self.0.insert(column.into(), value.into())
    }

    /// Builder-style [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(column, value);
        self
    }

    /// Overwrites this row's values with every field of `other`.
    pub fn merge(&mut self, other: &Row) {
        for (k, v) in &other.0 {
            self.0.insert(k.clone(), v.clone());
        }
    }

    /// Number of fields, [`ID_FIELD`] included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over `(column, value)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Column values to send to the service, without [`ID_FIELD`].
    pub fn to_values(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .filter(|(k, _)| k.as_str() != ID_FIELD)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl From<BTreeMap<String, String>> for Row {
    fn from(values: BTreeMap<String, String>) -> Self {
        Self(values)
    }
}

impl<K, V> FromIterator<(K, V)> for Row
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Row {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
