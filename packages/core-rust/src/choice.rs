//! Choice tables backing single- and multiple-choice fields.
//!
//! Keys are typed: a numeric string key normalizes to [`ChoiceKey::Int`] on
//! insertion, and lookups compare typed keys exactly. `"16"` and
//! `"16 & 18"` are therefore distinct keys and can never collide.

use std::fmt;
use std::sync::LazyLock;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value as JsonValue};
use sha2::{Digest, Sha256};

use crate::escape::html_escape;

static INVALID_CHOICE: LazyLock<String> = LazyLock::new(|| {
    let digest = Sha256::digest(b"not_bloody_likely");
    hex::encode(&digest[..16])
});

/// Placeholder key submitted by hidden inputs so a choice field's name is
/// always present in the submission, even when nothing is selected.
///
/// Validation ignores it.
#[must_use]
pub fn invalid_choice() -> &'static str {
    INVALID_CHOICE.as_str()
}

/// Stored key of a choice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChoiceKey {
    Int(i64),
    Str(String),
}

impl ChoiceKey {
    /// Normalizes a submitted string into a key.
    ///
    /// Only canonical decimal integers (`"0"`, `"16"`, `"-3"`, never `"016"`
    /// or `"+1"`) become `Int`.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let digits = raw.strip_prefix('-').unwrap_or(raw);
        let canonical = !digits.is_empty()
            && digits.bytes().all(|b| b.is_ascii_digit())
            && (digits == "0" || !digits.starts_with('0'))
            && raw != "-0";
        if canonical {
            if let Ok(i) = raw.parse::<i64>() {
                return Self::Int(i);
            }
        }
        Self::Str(raw.to_string())
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            Self::Str(_) => None,
        }
    }
}

impl fmt::Display for ChoiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ChoiceKey {
    fn from(i: i64) -> Self {
        Self::Int(i)
    }
}

impl From<i32> for ChoiceKey {
    fn from(i: i32) -> Self {
        Self::Int(i64::from(i))
    }
}

impl From<&str> for ChoiceKey {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl Serialize for ChoiceKey {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Int(i) => s.serialize_i64(*i),
            Self::Str(v) => s.serialize_str(v),
        }
    }
}

/// A choice carrying more than a label: a stored name, a longer
/// description, and free-form metadata (contact, type, flags).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChoiceItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub payload: Map<String, JsonValue>,
}

impl ChoiceItem {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            payload: Map::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_payload(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.payload.insert(key.into(), value.into());
        self
    }

    /// Boolean payload entry; `None` if absent or not a boolean.
    #[must_use]
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.payload.get(key).and_then(JsonValue::as_bool)
    }

    /// String payload entry.
    #[must_use]
    pub fn text(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(JsonValue::as_str)
    }
}

/// One entry of a choice table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Choice {
    /// Plain label; also serves as a separator in menu-item menus.
    Label(String),
    Item(ChoiceItem),
}

impl Choice {
    /// The presentation value: the label, or the item's name.
    #[must_use]
    pub fn presentation(&self) -> &str {
        match self {
            Self::Label(s) => s,
            Self::Item(item) => &item.name,
        }
    }

    #[must_use]
    pub fn html_value(&self) -> String {
        html_escape(self.presentation())
    }

    /// Plain-text rendering: the item's description when it has one.
    #[must_use]
    pub fn text_value(&self) -> &str {
        match self {
            Self::Label(s) => s,
            Self::Item(item) => item.description.as_deref().unwrap_or(&item.name),
        }
    }

    /// Escaped label shown next to an input or inside an `<option>`.
    #[must_use]
    pub fn html_label(&self) -> String {
        html_escape(self.text_value())
    }

    #[must_use]
    pub fn as_item(&self) -> Option<&ChoiceItem> {
        match self {
            Self::Item(item) => Some(item),
            Self::Label(_) => None,
        }
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        Self::Label(s.to_string())
    }
}

impl From<String> for Choice {
    fn from(s: String) -> Self {
        Self::Label(s)
    }
}

impl From<ChoiceItem> for Choice {
    fn from(item: ChoiceItem) -> Self {
        Self::Item(item)
    }
}

/// Ordered key → choice table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Choices {
    entries: Vec<(ChoiceKey, Choice)>,
}

impl Choices {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from explicit key/choice pairs.
    pub fn from_pairs<K, C>(pairs: impl IntoIterator<Item = (K, C)>) -> Self
    where
        K: Into<ChoiceKey>,
        C: Into<Choice>,
    {
        let mut choices = Self::new();
        for (k, c) in pairs {
            choices.insert(k, c);
        }
        choices
    }

    /// Labels keyed by position, starting at 0.
    pub fn from_list<C: Into<Choice>>(labels: impl IntoIterator<Item = C>) -> Self {
        let mut choices = Self::new();
        for (i, c) in (0_i64..).zip(labels) {
            choices.insert(i, c);
        }
        choices
    }

    /// Labels that are also their own stored keys.
    pub fn from_labels<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> Self {
        let mut choices = Self::new();
        for label in labels {
            let label = label.as_ref();
            choices.insert(label, label);
        }
        choices
    }

    /// Inserts or replaces (in place) the choice for a key.
    pub fn insert(&mut self, key: impl Into<ChoiceKey>, choice: impl Into<Choice>) {
        let key = key.into();
        let choice = choice.into();
        if let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = choice;
        } else {
            self.entries.push((key, choice));
        }
    }

    #[must_use]
    pub fn get(&self, key: &ChoiceKey) -> Option<&Choice> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, c)| c)
    }

    /// Resolves a submitted string to the stored key it names, if any.
    #[must_use]
    pub fn lookup(&self, raw: &str) -> Option<&ChoiceKey> {
        let key = ChoiceKey::parse(raw);
        self.entries.iter().find(|(k, _)| *k == key).map(|(k, _)| k)
    }

    #[must_use]
    pub fn contains(&self, key: &ChoiceKey) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ChoiceKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ChoiceKey, &Choice)> {
        self.entries.iter().map(|(k, c)| (k, c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if the first key is numeric (SQL enums are read back as `+0`).
    #[must_use]
    pub fn first_key_is_numeric(&self) -> bool {
        matches!(self.entries.first(), Some((ChoiceKey::Int(_), _)))
    }

    /// True if every key is an integer, so selections can pack into a bitmask.
    #[must_use]
    pub fn is_numeric_domain(&self) -> bool {
        !self.entries.is_empty() && self.entries.iter().all(|(k, _)| k.as_int().is_some())
    }

    /// True if some choice presents as the empty string.
    #[must_use]
    pub fn has_blank_choice(&self) -> bool {
        self.entries.iter().any(|(_, c)| c.presentation().is_empty())
    }

    /// Bit offset for packing: 1 when the key domain does not include 0,
    /// matching SQL ENUM/SET numbering that starts at 1.
    #[must_use]
    pub fn bit_offset(&self) -> i64 {
        i64::from(!self.contains(&ChoiceKey::Int(0)))
    }

    /// Packs integer keys into a bitmask. Non-integer or out-of-range keys
    /// are ignored.
    #[must_use]
    pub fn pack<'a>(&self, keys: impl IntoIterator<Item = &'a ChoiceKey>) -> u64 {
        let offset = self.bit_offset();
        keys.into_iter()
            .filter_map(ChoiceKey::as_int)
            .map(|k| k - offset)
            .filter(|bit| (0..64).contains(bit))
            .fold(0_u64, |mask, bit| mask | (1_u64 << bit))
    }

    /// Reconstructs the selected keys, in table order, from a bitmask.
    #[must_use]
    pub fn unpack(&self, mask: u64) -> Vec<ChoiceKey> {
        let offset = self.bit_offset();
        self.entries
            .iter()
            .filter(|(k, _)| {
                k.as_int()
                    .map(|k| k - offset)
                    .filter(|bit| (0..64).contains(bit))
                    .is_some_and(|bit| (1_u64 << bit) & mask != 0)
            })
            .map(|(k, _)| k.clone())
            .collect()
    }
}

impl Serialize for Choices {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = s.serialize_map(Some(self.entries.len()))?;
        for (k, c) in &self.entries {
            map.serialize_entry(&k.to_string(), c)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Choices {
    /// Accepts a JSON object (document order kept) or an array of labels
    /// keyed from 0.
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        struct ChoicesVisitor;

        impl<'de> Visitor<'de> for ChoicesVisitor {
            type Value = Choices;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of key to choice, or a list of choices")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Choices, A::Error> {
                let mut choices = Choices::new();
                while let Some((key, choice)) = access.next_entry::<String, Choice>()? {
                    choices.insert(ChoiceKey::parse(&key), choice);
                }
                Ok(choices)
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Choices, A::Error> {
                let mut choices = Choices::new();
                let mut i = 0_i64;
                while let Some(choice) = access.next_element::<Choice>()? {
                    choices.insert(i, choice);
                    i += 1;
                }
                Ok(choices)
            }
        }

        d.deserialize_any(ChoicesVisitor)
            .map_err(|e: D::Error| de::Error::custom(format!("invalid choices: {e}")))
    }
}
