//! Composite fields: named sub-fields parsed together, with required-ness
//! derived from what was actually entered.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Field, FieldKind, FieldState, FieldValue};
use crate::config::ParseContext;
use crate::source::{Submission, Submitted};

/// Makes the other sub-fields depend on the item chosen in `controller`.
///
/// When the chosen item's payload `flag` is false the dependents are
/// skipped. When it is true (or absent) the dependents are parsed even if
/// not submitted, and the composite becomes required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gate {
    pub controller: String,
    pub flag: String,
}

#[derive(Debug, Clone, Default)]
pub struct Composite {
    fields: Vec<(String, Field)>,
    gate: Option<Gate>,
    derived_required: bool,
}

impl Composite {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, field: Field) -> Self {
        self.fields.push((key.into(), field));
        self
    }

    #[must_use]
    pub fn with_gate(mut self, gate: Gate) -> Self {
        self.gate = Some(gate);
        self
    }

    #[must_use]
    pub fn gate(&self) -> Option<&Gate> {
        self.gate.as_ref()
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Field)> {
        self.fields.iter().map(|(k, f)| (k.as_str(), f))
    }

    pub(super) fn fields_mut(&mut self) -> impl Iterator<Item = (&str, &mut Field)> {
        self.fields.iter_mut().map(|(k, f)| (k.as_str(), f))
    }

    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, f)| f)
    }

    fn field_mut(&mut self, key: &str) -> Option<&mut Field> {
        self.fields
            .iter_mut()
            .find(|(k, _)| k == key)
            .map(|(_, f)| f)
    }

    /// Required-ness computed by the last parse.
    #[must_use]
    pub fn derived_required(&self) -> bool {
        self.derived_required
    }

    /// `None` without a gate; otherwise whether the dependents apply.
    #[must_use]
    pub fn gate_open(&self) -> Option<bool> {
        let gate = self.gate.as_ref()?;
        let controller = self.field(&gate.controller)?;
        let open = match (controller.kind.choices(), controller.value()) {
            (Some(choices), Some(FieldValue::Key(key))) => choices
                .get(key)
                .and_then(|c| c.as_item())
                .and_then(|item| item.flag(&gate.flag))
                .unwrap_or(true),
            _ => false,
        };
        Some(open)
    }

    fn is_dependent(&self, key: &str) -> bool {
        self.gate.as_ref().is_some_and(|g| g.controller != key)
    }

    /// First required sub-field that failed, among those that apply.
    pub(super) fn first_missing(&self) -> Option<&Field> {
        let open = self.gate_open();
        self.fields
            .iter()
            .filter(|(key, _)| open != Some(false) || !self.is_dependent(key))
            .map(|(_, f)| f)
            .find(|f| f.required() && !f.is_valid_state())
    }

    pub(super) fn reset(&mut self) {
        self.derived_required = false;
        for (_, field) in &mut self.fields {
            field.reset();
        }
    }

    pub(super) fn html_value(&self) -> String {
        self.fields
            .iter()
            .map(|(_, f)| f.html_value())
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn values(&self) -> BTreeMap<String, FieldValue> {
        self.fields
            .iter()
            .filter_map(|(key, f)| f.value().map(|v| (key.clone(), v.clone())))
            .collect()
    }

    fn inputs(&self) -> Vec<String> {
        self.fields
            .iter()
            .map(|(_, f)| match f.state() {
                FieldState::Invalid(raw) => raw.display(),
                _ => f.choice().map(|p| p.display()).unwrap_or_default(),
            })
            .collect()
    }
}

/// Folds one parsed sub-field into the composite's running verdict.
fn tally(sub: &Field, ok: bool, required: &mut bool, all_required_valid: &mut bool) {
    if !sub.required() {
        return;
    }
    if !ok {
        *all_required_valid = false;
    } else if sub.has_value() {
        *required = true;
    }
}

impl Field {
    /// A composite is valid if no sub-field made it required, or if every
    /// required sub-field is valid.
    pub(super) fn parse_composite(&mut self, source: &Submission, ctx: &ParseContext) -> bool {
        let mut required = self.required;
        let mut all_required_valid = true;
        let FieldKind::Composite(composite) = &mut self.kind else {
            return false;
        };
        composite.derived_required = false;

        let gate = composite.gate.clone();
        let open = match &gate {
            Some(gate) => {
                if let Some(controller) = composite.field_mut(&gate.controller) {
                    // A required composite always needs its controller chosen.
                    if required || controller.is_present(source) {
                        let ok = controller.parse_value(source, ctx);
                        tally(controller, ok, &mut required, &mut all_required_valid);
                        if required && !controller.has_value() {
                            all_required_valid = false;
                        }
                    } else {
                        controller.reset();
                    }
                }
                composite.gate_open()
            }
            None => None,
        };

        for (key, sub) in &mut composite.fields {
            if gate.as_ref().is_some_and(|g| g.controller == *key) {
                continue;
            }
            match open {
                Some(false) => sub.reset(),
                Some(true) => {
                    let ok = sub.parse_value(source, ctx);
                    tally(sub, ok, &mut required, &mut all_required_valid);
                }
                None => {
                    if sub.is_present(source) {
                        let ok = sub.parse_value(source, ctx);
                        tally(sub, ok, &mut required, &mut all_required_valid);
                    }
                }
            }
        }
        if open == Some(true) {
            required = true;
        }

        let valid = all_required_valid || !required;
        composite.derived_required = required;
        self.state = if valid {
            let values = composite.values();
            if values.is_empty() {
                FieldState::Empty
            } else {
                FieldState::Valid(FieldValue::Composite(values))
            }
        } else {
            FieldState::Invalid(Submitted::List(composite.inputs()))
        };
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::{ChoiceItem, Choices};
    use crate::field::TimeRange;

    fn meeting() -> Field {
        let room = Field::new("room", FieldKind::menu(Choices::from_labels(["A", "B"])));
        let time = Field::new(
            "meet_time",
            FieldKind::time_menu("meet_time", TimeRange::new(9.0, 17.0, 1.0)).unwrap(),
        )
        .with_description("Time");
        Field::new(
            "meeting",
            FieldKind::Composite(
                Composite::new()
                    .with_field("room", room)
                    .with_field("time", time),
            ),
        )
        .optional()
    }

    fn parse(field: &mut Field, pairs: &[(&str, &str)]) -> bool {
        let source = Submission::from_pairs(pairs.iter().copied());
        field.parse_value(&source, &ParseContext::default())
    }

    #[test]
    fn optional_composite_left_blank_is_valid() {
        let mut field = meeting();
        assert!(parse(&mut field, &[]));
        assert_eq!(field.state(), &FieldState::Empty);
        assert!(!field.required());
    }

    #[test]
    fn one_required_sub_value_makes_all_required() {
        let mut field = meeting();
        assert!(!parse(&mut field, &[("room", "A"), ("meet_time", "")]));
        assert!(field.required());
        assert_eq!(
            field.error_message(),
            "You must specify Time for Meeting."
        );
    }

    #[test]
    fn complete_composite_collects_values() {
        let mut field = meeting();
        assert!(parse(&mut field, &[("room", "B"), ("meet_time", "2")]));
        let Some(FieldValue::Composite(values)) = field.value() else {
            panic!("expected composite value");
        };
        assert_eq!(values.len(), 2);
        assert_eq!(field.html_value(), "B 11:00am");
    }

    #[test]
    fn gate_closed_skips_dependents() {
        let mut classes = Choices::new();
        classes.insert("swim", ChoiceItem::new("swim").with_payload("daytime", false));
        classes.insert("yoga", ChoiceItem::new("yoga"));
        let composite = Composite::new()
            .with_field("class", Field::new("c_class", FieldKind::menu_item(classes)).optional())
            .with_field("day", Field::new("c_day", FieldKind::menu(Choices::from_labels(["Monday"]))))
            .with_gate(Gate {
                controller: "class".into(),
                flag: "daytime".into(),
            });
        let mut field = Field::new("c", FieldKind::Composite(composite)).optional();

        assert!(parse(&mut field, &[("c_class", "swim"), ("c_day", "Monday")]));
        assert!(!field.required());
        assert!(!field.sub_field("day").unwrap().has_value());

        assert!(!parse(&mut field, &[("c_class", "yoga")]));
        assert!(field.required());
        assert_eq!(field.error_message(), "You must specify C Day for C.");

        assert!(parse(&mut field, &[("c_class", "yoga"), ("c_day", "Monday")]));
    }
}
