//! Inputs consumed by the engine: submitted values and column descriptors.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static VARCHAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)VARCHAR\((\d*)\)").expect("static pattern"));

/// A single submitted value: one string, or several for `name[]` inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Submitted {
    Text(String),
    List(Vec<String>),
}

impl Submitted {
    /// The scalar string, if this is not a list.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    /// True for an all-whitespace string or an empty list.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }

    /// Display form used when echoing invalid input back to the user.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

impl From<&str> for Submitted {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for Submitted {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for Submitted {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

/// Submitted key/value mapping for one request.
///
/// Conventionally decoded from a POST body or query string, but any map
/// works, so tests inject literal submissions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Submission {
    values: HashMap<String, Submitted>,
}

impl Submission {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a submission of scalar values.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let values = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), Submitted::Text(v.into())))
            .collect();
        Self { values }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Submitted>) {
        self.values.insert(key.into(), value.into());
    }

    /// Appends to a list value, promoting a scalar to a list if needed.
    pub fn push(&mut self, key: impl Into<String>, item: impl Into<String>) {
        let item = item.into();
        match self.values.entry(key.into()) {
            std::collections::hash_map::Entry::Occupied(mut e) => {
                let slot = e.get_mut();
                match slot {
                    Submitted::List(items) => items.push(item),
                    Submitted::Text(prev) => {
                        *slot = Submitted::List(vec![std::mem::take(prev), item]);
                    }
                }
            }
            std::collections::hash_map::Entry::Vacant(e) => {
                e.insert(Submitted::List(vec![item]));
            }
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Submitted> {
        self.values.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Submitted)> {
        self.values.iter()
    }
}

/// Description of one database column, as reported by `SHOW COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    /// Column type string, e.g. `varchar(63)` or `enum('a','b')`.
    #[serde(rename = "Type")]
    pub sql_type: String,
    /// Whether the column accepts NULL (`Null: "YES"`).
    #[serde(rename = "Null", with = "yes_no")]
    pub nullable: bool,
    /// Column default, if any.
    #[serde(rename = "Default", default)]
    pub default: Option<String>,
}

impl ColumnDescriptor {
    #[must_use]
    pub fn new(sql_type: impl Into<String>, nullable: bool, default: Option<&str>) -> Self {
        Self {
            sql_type: sql_type.into(),
            nullable,
            default: default.map(str::to_string),
        }
    }

    /// Declared length of a `VARCHAR(n)` column.
    #[must_use]
    pub fn varchar_length(&self) -> Option<usize> {
        VARCHAR_RE
            .captures(&self.sql_type)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Ordered column name → descriptor table for one database table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnTable {
    columns: Vec<(String, ColumnDescriptor)>,
}

impl ColumnTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a column, replacing an earlier one of the same name in place.
    pub fn insert(&mut self, name: impl Into<String>, descriptor: ColumnDescriptor) {
        let name = name.into();
        if let Some(slot) = self.columns.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = descriptor;
        } else {
            self.columns.push((name, descriptor));
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, d)| d)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnDescriptor)> {
        self.columns.iter().map(|(n, d)| (n.as_str(), d))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, ColumnDescriptor)> for ColumnTable {
    fn from_iter<I: IntoIterator<Item = (S, ColumnDescriptor)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (name, descriptor) in iter {
            table.insert(name, descriptor);
        }
        table
    }
}

mod yes_no {
    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub fn serialize<S: Serializer>(value: &bool, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(if *value { "YES" } else { "NO" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(raw.eq_ignore_ascii_case("yes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_detection() {
        assert!(Submitted::from("   ").is_blank());
        assert!(Submitted::List(vec![]).is_blank());
        assert!(!Submitted::from(" x ").is_blank());
        assert!(!Submitted::List(vec![String::new()]).is_blank());
    }

    #[test]
    fn push_promotes_scalar_to_list() {
        let mut s = Submission::new();
        s.insert("pets", "cat");
        s.push("pets", "dog");
        assert_eq!(
            s.get("pets"),
            Some(&Submitted::List(vec!["cat".into(), "dog".into()]))
        );
    }

    #[test]
    fn varchar_length_parsed_case_insensitively() {
        let col = ColumnDescriptor::new("varchar(40)", true, None);
        assert_eq!(col.varchar_length(), Some(40));
        let col = ColumnDescriptor::new("int(11)", true, None);
        assert_eq!(col.varchar_length(), None);
    }

    #[test]
    fn column_descriptor_deserializes_show_columns_shape() {
        let json = r#"{"Type": "varchar(20)", "Null": "NO", "Default": "x"}"#;
        let col: ColumnDescriptor = serde_json::from_str(json).unwrap();
        assert!(!col.nullable);
        assert_eq!(col.default.as_deref(), Some("x"));
    }

    #[test]
    fn column_table_preserves_order() {
        let table: ColumnTable = [
            ("b", ColumnDescriptor::new("int", true, None)),
            ("a", ColumnDescriptor::new("date", true, None)),
        ]
        .into_iter()
        .collect();
        let names: Vec<_> = table.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
