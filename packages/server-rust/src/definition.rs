//! JSON form definitions.
//!
//! ```json
//! {
//!   "name": "signup",
//!   "choices": { "size": { "1": "Small", "2": "Large" } },
//!   "fields": [ { "name": "full_name" }, { "name": "size" } ],
//!   "sections": [
//!     { "name": "contact", "header": "<h3>Contact</h3>", "fields": [ { "name": "email" } ] }
//!   ]
//! }
//! ```

use std::collections::HashMap;

use formwork_core::{Choices, ColumnTable, FieldSpec, Form, FormConfig, FormError};
use serde::{Deserialize, Serialize};

/// A named group of fields with optional header and footer markup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
}

/// A whole form: top-level fields land in the form's own section, followed
/// by the named sections in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormDefinition {
    pub name: String,
    #[serde(default)]
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default)]
    pub usedivs: bool,
    /// Column descriptors, as `[name, descriptor]` pairs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<ColumnTable>,
    /// Choice tables by field name.
    #[serde(default)]
    pub choices: HashMap<String, Choices>,
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(default)]
    pub sections: Vec<SectionDefinition>,
}

impl FormDefinition {
    /// # Errors
    ///
    /// Returns the parse error for malformed JSON or an unknown shape.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builds the form.
    ///
    /// # Errors
    ///
    /// Returns the first error from building a field.
    pub fn into_form(self, config: FormConfig) -> Result<Form, FormError> {
        let mut form = Form::new(self.name)
            .with_action(self.action)
            .with_divs(self.usedivs)
            .with_config(config);
        if let Some(method) = self.method {
            form = form.with_method(method);
        }
        if let Some(columns) = self.columns {
            form = form.with_columns(columns);
        }
        for (name, choices) in self.choices {
            form.add_choices(name, choices);
        }
        form.add_specs(&self.fields)?;
        for section in self.sections {
            form.start_section(section.name, section.header.as_deref());
            form.add_specs(&section.fields)?;
            form.finish_section(section.footer.as_deref());
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIGNUP: &str = r#"{
        "name": "signup",
        "action": "/signup",
        "choices": { "size": { "1": "Small", "2": "Large" } },
        "fields": [ { "name": "full_name" }, { "name": "size" } ],
        "sections": [
            { "name": "contact", "header": "<h3>Contact</h3>",
              "fields": [ { "name": "email", "optional": true } ] }
        ]
    }"#;

    #[test]
    fn sections_follow_top_level_fields() {
        let form = FormDefinition::from_json(SIGNUP)
            .unwrap()
            .into_form(FormConfig::default())
            .unwrap();
        assert_eq!(form.action(), "/signup");
        assert_eq!(form.section_names(), vec!["signup", "contact"]);
        let contact: Vec<&str> = form
            .section_fields(Some("contact"))
            .iter()
            .map(|f| f.id())
            .collect();
        assert_eq!(contact, vec!["email"]);
        assert!(form.field("size", None).unwrap().kind().choices().is_some());
    }

    #[test]
    fn bad_field_types_fail_the_build() {
        let definition =
            FormDefinition::from_json(r#"{"name": "x", "fields": [{"name": "a", "type": "hologram"}]}"#)
                .unwrap();
        assert!(matches!(
            definition.into_form(FormConfig::default()),
            Err(FormError::UnknownType(_))
        ));
    }

    #[test]
    fn unknown_keys_still_parse() {
        let definition = FormDefinition::from_json(r#"{"name": "x", "extra": 1}"#).unwrap();
        assert!(definition.fields.is_empty());
        assert!(definition.method.is_none());
    }
}
