//! Validation for single-choice, multiple-choice, boolean and time-menu
//! fields.

use super::{Field, FieldKind, FieldValue, SingleStyle};
use crate::choice::{invalid_choice, ChoiceKey, Choices};
use crate::source::Submitted;

impl Field {
    pub(super) fn choice_is_valid(&self, raw: &Submitted) -> bool {
        match &self.kind {
            FieldKind::Single { style, choices } => match single_key(choices, raw) {
                Selection::Nothing => !self.required,
                Selection::Key(key) => {
                    *style != SingleStyle::MenuItem
                        || choices.get(&key).is_some_and(|c| c.as_item().is_some())
                }
                Selection::Unknown => false,
            },
            FieldKind::TimeMenu { choices, .. } => match single_key(choices, raw) {
                Selection::Nothing => !self.required,
                Selection::Key(_) => true,
                Selection::Unknown => false,
            },
            FieldKind::Multiple { choices, .. } => {
                multiple_keys(choices, raw).is_some_and(|keys| !keys.is_empty() || !self.required)
            }
            FieldKind::Boolean => {
                if raw.is_blank() {
                    !self.required
                } else {
                    truthy(raw) || !self.required
                }
            }
            _ => false,
        }
    }

    pub(super) fn choice_canonical(&self, raw: &Submitted) -> Option<FieldValue> {
        match &self.kind {
            FieldKind::Single { choices, .. } | FieldKind::TimeMenu { choices, .. } => {
                match single_key(choices, raw) {
                    Selection::Key(key) => Some(FieldValue::Key(key)),
                    Selection::Nothing | Selection::Unknown => None,
                }
            }
            FieldKind::Multiple { choices, .. } => multiple_keys(choices, raw)
                .filter(|keys| !keys.is_empty())
                .map(FieldValue::Keys),
            FieldKind::Boolean => (!raw.is_blank()).then(|| FieldValue::Bool(truthy(raw))),
            _ => None,
        }
    }
}

enum Selection {
    /// Blank, or only the sentinel.
    Nothing,
    Key(ChoiceKey),
    Unknown,
}

fn single_key(choices: &Choices, raw: &Submitted) -> Selection {
    let Some(text) = raw.as_text() else {
        return Selection::Unknown;
    };
    if text.trim().is_empty() || text == invalid_choice() {
        return Selection::Nothing;
    }
    choices
        .lookup(text)
        .map_or(Selection::Unknown, |key| Selection::Key(key.clone()))
}

/// Selected keys in declaration order; `None` if any submitted key is
/// unknown.
///
/// Accepts a list of keys, a packed bitmask over an integer key domain, or
/// a comma-separated SQL `SET` string. The sentinel is ignored.
fn multiple_keys(choices: &Choices, raw: &Submitted) -> Option<Vec<ChoiceKey>> {
    let submitted: Vec<&str> = match raw {
        Submitted::List(items) => items.iter().map(String::as_str).collect(),
        Submitted::Text(text) => {
            let text = text.trim();
            if text.is_empty() || text == invalid_choice() {
                Vec::new()
            } else if choices.is_numeric_domain() && text.bytes().all(|b| b.is_ascii_digit()) {
                let mask: u64 = text.parse().ok()?;
                return Some(choices.unpack(mask));
            } else {
                text.split(',').collect()
            }
        }
    };

    let mut selected = Vec::new();
    for item in submitted {
        if item.trim().is_empty() || item == invalid_choice() {
            continue;
        }
        selected.push(choices.lookup(item)?);
    }
    Some(
        choices
            .keys()
            .filter(|key| selected.contains(key))
            .cloned()
            .collect(),
    )
}

/// Checkbox semantics: anything but blank, `0`, `off`, `false` or the
/// sentinel counts as checked.
fn truthy(raw: &Submitted) -> bool {
    let is_true = |s: &str| {
        let s = s.trim();
        !(s.is_empty()
            || s == "0"
            || s.eq_ignore_ascii_case("off")
            || s.eq_ignore_ascii_case("false")
            || s == invalid_choice())
    };
    match raw {
        Submitted::Text(s) => is_true(s),
        Submitted::List(items) => items.iter().any(|s| is_true(s)),
    }
}
