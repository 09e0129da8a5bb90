//! Declarative field specifications.
//!
//! A [`FieldSpec`] names a field and carries its options; the concrete
//! kind is resolved by [`crate::infer`] when the spec is built into a
//! [`Field`]. Specs deserialize from JSON so whole forms can be defined
//! outside code:
//!
//! ```json
//! { "name": "contact_email", "optional": true, "placeholder": "me@example.org" }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::choice::Choices;
use crate::error::FormError;
use crate::field::{Composite, Field, FieldKind, Gate, NumberRange, TimeRange};
use crate::infer::{infer, Inferred, KindTag};
use crate::source::ColumnTable;

/// Per-kind options. Options that do not apply to the resolved kind are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    pub pattern: Option<String>,
    pub choices: Option<Choices>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
    pub instance: Option<String>,
    pub priority: Option<i64>,
    pub maxlength: Option<usize>,
    pub default: Option<String>,
    pub readonly: bool,
    pub autosubmit: bool,
    pub title: Option<String>,
    pub placeholder: Option<String>,
    pub annotation: Option<String>,
    pub allow_uri: bool,
    /// Time menus: first slot, in hours.
    pub start: Option<f64>,
    /// Time menus: last slot, in hours.
    pub end: Option<f64>,
    /// Time menus: hours between slots.
    pub interval: Option<f64>,
    /// Composite sub-fields, in order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gate: Option<Gate>,
}

/// Declarative descriptor of one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    /// Defaults to the name with underscores as spaces, title-cased.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Explicit kind; inferred when absent.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub optional: bool,
    /// Key inside a composite; defaults to the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(flatten)]
    pub options: FieldOptions,
}

/// A required field spec.
pub fn field(name: impl Into<String>) -> FieldSpec {
    FieldSpec {
        name: name.into(),
        description: None,
        kind: None,
        optional: false,
        key: None,
        options: FieldOptions::default(),
    }
}

/// An optional field spec.
pub fn opt_field(name: impl Into<String>) -> FieldSpec {
    FieldSpec {
        optional: true,
        ..field(name)
    }
}

impl FieldSpec {
    #[must_use]
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the explicit type string (`"email"`, `"menu"`, ...).
    #[must_use]
    pub fn typed(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    #[must_use]
    pub fn choices(mut self, choices: Choices) -> Self {
        self.options.choices = Some(choices);
        self
    }

    #[must_use]
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.options.pattern = Some(pattern.into());
        self
    }

    #[must_use]
    pub fn range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.options.min = min;
        self.options.max = max;
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: i64) -> Self {
        self.options.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.options.instance = Some(instance.into());
        self
    }

    #[must_use]
    pub fn maxlength(mut self, maxlength: usize) -> Self {
        self.options.maxlength = Some(maxlength);
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.options.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn annotation(mut self, annotation: impl Into<String>) -> Self {
        self.options.annotation = Some(annotation.into());
        self
    }

    #[must_use]
    pub fn allow_uri(mut self) -> Self {
        self.options.allow_uri = true;
        self
    }

    #[must_use]
    pub fn readonly(mut self) -> Self {
        self.options.readonly = true;
        self
    }

    #[must_use]
    pub fn autosubmit(mut self) -> Self {
        self.options.autosubmit = true;
        self
    }

    /// Time-menu slots from `start` to `end` every `interval` hours.
    #[must_use]
    pub fn times(mut self, start: f64, end: f64, interval: f64) -> Self {
        self.options.start = Some(start);
        self.options.end = Some(end);
        self.options.interval = Some(interval);
        self
    }

    /// Adds a composite sub-field under `key`.
    #[must_use]
    pub fn sub_field(mut self, key: impl Into<String>, mut spec: FieldSpec) -> Self {
        spec.key = Some(key.into());
        self.options.fields.push(spec);
        self
    }

    #[must_use]
    pub fn gate(mut self, controller: impl Into<String>, flag: impl Into<String>) -> Self {
        self.options.gate = Some(Gate {
            controller: controller.into(),
            flag: flag.into(),
        });
        self
    }

    /// `name` plus the instance suffix.
    #[must_use]
    pub fn id(&self) -> String {
        format!(
            "{}{}",
            self.name,
            self.options.instance.as_deref().unwrap_or_default()
        )
    }

    /// Resolves the kind tag this spec would build.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownType`] for an unknown explicit type.
    pub fn inferred(
        &self,
        enums: &HashMap<String, Choices>,
        columns: Option<&ColumnTable>,
    ) -> Result<Inferred, FormError> {
        let choices = self
            .options
            .choices
            .as_ref()
            .or_else(|| enums.get(&self.name));
        let column = columns.and_then(|c| c.get(&self.id()));
        infer(&self.name, self.kind.as_deref(), choices, column)
    }

    /// Builds the concrete field.
    ///
    /// # Errors
    ///
    /// Fails for unknown or upload types, a pattern kind without a valid
    /// pattern, a choice kind without choices, or a time menu without a
    /// usable range.
    pub fn build(
        &self,
        enums: &HashMap<String, Choices>,
        columns: Option<&ColumnTable>,
    ) -> Result<Field, FormError> {
        let inferred = self.inferred(enums, columns)?;
        debug!(field = %self.name, kind = inferred.kind.as_str(), source = ?inferred.source, "resolved field kind");
        let kind = self.kind_for(inferred.kind, enums, columns)?;

        let options = &self.options;
        let mut field = Field::new(self.name.clone(), kind)
            .readonly(options.readonly)
            .autosubmit(options.autosubmit)
            .allow_uri(options.allow_uri);
        if let Some(description) = &self.description {
            field = field.with_description(description.clone());
        }
        if self.optional {
            field = field.optional();
        }
        if let Some(instance) = &options.instance {
            field = field.with_instance(instance.clone());
        }
        if let Some(priority) = options.priority {
            field = field.with_priority(priority);
        }
        if let Some(default) = &options.default {
            field = field.with_default(default.clone());
        }
        if let Some(maxlength) = options.maxlength {
            field = field.with_maxlength(maxlength);
        }
        if let Some(title) = &options.title {
            field = field.with_title(title.clone());
        }
        if let Some(placeholder) = &options.placeholder {
            field = field.with_placeholder(placeholder.clone());
        }
        if let Some(annotation) = &options.annotation {
            field = field.with_annotation(annotation.clone());
        }
        Ok(field)
    }

    fn choice_table(&self, enums: &HashMap<String, Choices>) -> Result<Choices, FormError> {
        self.options
            .choices
            .clone()
            .or_else(|| enums.get(&self.name).cloned())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| FormError::MissingChoices { field: self.id() })
    }

    fn kind_for(
        &self,
        tag: KindTag,
        enums: &HashMap<String, Choices>,
        columns: Option<&ColumnTable>,
    ) -> Result<FieldKind, FormError> {
        let options = &self.options;
        Ok(match tag {
            KindTag::Text => FieldKind::Text,
            KindTag::TextArea => FieldKind::TextArea,
            KindTag::Email => FieldKind::Email,
            KindTag::Password => FieldKind::Password,
            KindTag::Number => FieldKind::Number(NumberRange {
                min: options.min,
                max: options.max,
                step: options.step,
            }),
            KindTag::PostalCode => FieldKind::PostalCode,
            KindTag::Pattern => {
                let pattern = options
                    .pattern
                    .as_deref()
                    .ok_or_else(|| FormError::MissingPattern { field: self.id() })?;
                FieldKind::pattern(&self.id(), pattern)?
            }
            KindTag::State => FieldKind::State,
            KindTag::Country => FieldKind::Country,
            KindTag::Zip => FieldKind::Zip,
            KindTag::Phone => FieldKind::Phone,
            KindTag::InternationalPhone => FieldKind::InternationalPhone,
            KindTag::Year => FieldKind::Year,
            KindTag::Date => FieldKind::Date,
            KindTag::Birthdate => FieldKind::Birthdate,
            KindTag::Daytime => FieldKind::Daytime,
            KindTag::Radio => FieldKind::radio(self.choice_table(enums)?),
            KindTag::Menu => FieldKind::menu(self.choice_table(enums)?),
            KindTag::MenuItem => FieldKind::menu_item(self.choice_table(enums)?),
            KindTag::Checkbox => FieldKind::checkbox(self.choice_table(enums)?),
            KindTag::Set => FieldKind::Multiple {
                style: crate::field::MultipleStyle::Set,
                choices: self.choice_table(enums)?,
            },
            KindTag::Boolean => FieldKind::Boolean,
            KindTag::TimeMenu => {
                let (Some(start), Some(end), Some(interval)) =
                    (options.start, options.end, options.interval)
                else {
                    return Err(FormError::BadTimeRange { field: self.id() });
                };
                FieldKind::time_menu(&self.id(), TimeRange::new(start, end, interval))?
            }
            KindTag::Composite => {
                let mut composite = Composite::new();
                for sub in &options.fields {
                    let key = sub.key.clone().unwrap_or_else(|| sub.name.clone());
                    composite = composite.with_field(key, sub.build(enums, columns)?);
                }
                if let Some(gate) = &options.gate {
                    composite = composite.with_gate(gate.clone());
                }
                FieldKind::Composite(composite)
            }
            KindTag::File | KindTag::Image => {
                return Err(FormError::Unsupported {
                    kind: tag.as_str(),
                })
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::MultipleStyle;
    use crate::source::ColumnDescriptor;

    fn no_enums() -> HashMap<String, Choices> {
        HashMap::new()
    }

    #[test]
    fn builders_set_required_ness() {
        assert!(!field("name").optional);
        assert!(opt_field("name").optional);
        let built = opt_field("home_phone").build(&no_enums(), None).unwrap();
        assert!(!built.required());
        assert_eq!(built.kind().tag(), KindTag::Phone);
        assert_eq!(built.description(), "Home Phone");
    }

    #[test]
    fn explicit_type_and_options() {
        let built = field("age")
            .typed("number")
            .range(Some(0.0), Some(120.0))
            .priority(2)
            .instance("3")
            .build(&no_enums(), None)
            .unwrap();
        assert_eq!(built.id(), "age3");
        assert_eq!(built.priority(), 2);
        assert!(matches!(
            built.kind(),
            FieldKind::Number(NumberRange { max: Some(m), .. }) if (*m - 120.0).abs() < f64::EPSILON
        ));
    }

    #[test]
    fn choices_come_from_enums() {
        let mut enums = HashMap::new();
        enums.insert("size".to_string(), Choices::from_list(["S", "M"]));
        let built = field("size").build(&enums, None).unwrap();
        assert_eq!(built.kind().tag(), KindTag::Checkbox);
        assert!(matches!(
            built.kind(),
            FieldKind::Multiple { style: MultipleStyle::Checkbox, .. }
        ));
    }

    #[test]
    fn column_types_drive_inference() {
        let columns: ColumnTable = [("agreed", ColumnDescriptor::new("tinyint(1)", false, None))]
            .into_iter()
            .collect();
        let built = field("agreed").build(&no_enums(), Some(&columns)).unwrap();
        assert_eq!(built.kind().tag(), KindTag::Boolean);
    }

    #[test]
    fn programmer_errors() {
        assert!(matches!(
            field("x").typed("hologram").build(&no_enums(), None),
            Err(FormError::UnknownType(t)) if t == "hologram"
        ));
        assert!(matches!(
            field("code").typed("pattern").build(&no_enums(), None),
            Err(FormError::MissingPattern { .. })
        ));
        assert!(matches!(
            field("color").typed("menu").build(&no_enums(), None),
            Err(FormError::MissingChoices { .. })
        ));
        assert!(matches!(
            field("slot").typed("timemenu").build(&no_enums(), None),
            Err(FormError::BadTimeRange { .. })
        ));
        assert!(matches!(
            field("profile_picture").build(&no_enums(), None),
            Err(FormError::Unsupported { kind: "file" | "image" })
        ));
    }

    #[test]
    fn specs_deserialize_from_json() {
        let spec: FieldSpec = serde_json::from_str(
            r#"{
                "name": "favorite",
                "type": "radio",
                "optional": true,
                "choices": {"16": "A", "16 & 18": "B"},
                "annotation": "pick one"
            }"#,
        )
        .unwrap();
        let built = spec.build(&no_enums(), None).unwrap();
        assert!(!built.required());
        assert_eq!(built.annotation(), Some("pick one"));
        assert_eq!(built.kind().choices().map(Choices::len), Some(2));
    }

    #[test]
    fn composite_specs_nest() {
        let spec = field("meeting")
            .typed("composite")
            .sub_field("room", field("meeting_room").typed("text"))
            .sub_field("when", field("meeting_time").times(9.0, 17.0, 1.0).typed("timemenu"));
        let built = spec.build(&no_enums(), None).unwrap();
        assert!(built.sub_field("room").is_some());
        assert_eq!(
            built.sub_field("when").map(|f| f.kind().tag()),
            Some(KindTag::TimeMenu)
        );
    }
}
