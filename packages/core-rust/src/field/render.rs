//! HTML and plain-text rendering of a single field.

use std::fmt::Write as _;
use std::sync::LazyLock;

use regex::Regex;

use super::{Field, FieldKind, FieldState, FieldValue, MultipleStyle, SingleStyle};
use crate::choice::{invalid_choice, ChoiceKey, Choices};
use crate::escape::html_escape;

static LABEL_END_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w\d)\]]$").expect("static pattern"));

/// Appends a colon unless the label already ends in punctuation.
#[must_use]
pub fn add_label_colon(label: &str) -> String {
    if LABEL_END_RE.is_match(label) {
        format!("{label}:")
    } else {
        label.to_string()
    }
}

impl Field {
    /// The `type` attribute of the `<input>` for text-like kinds.
    #[must_use]
    pub fn input_type(&self) -> &'static str {
        match &self.kind {
            FieldKind::Password => "password",
            FieldKind::Email if self.html5 => "email",
            FieldKind::Number(_) if self.html5 => "number",
            FieldKind::Phone | FieldKind::InternationalPhone if self.html5 => "tel",
            FieldKind::Date | FieldKind::Birthdate if self.html5 && self.iso_dates => "date",
            FieldKind::Daytime if self.html5 && self.iso_dates => "time",
            _ => "text",
        }
    }

    fn wants_autocorrect_off(&self) -> bool {
        self.html5
            && matches!(
                self.kind,
                FieldKind::Email
                    | FieldKind::Pattern(_)
                    | FieldKind::State
                    | FieldKind::Country
                    | FieldKind::Zip
                    | FieldKind::Phone
                    | FieldKind::InternationalPhone
                    | FieldKind::Year
                    | FieldKind::Date
                    | FieldKind::Birthdate
                    | FieldKind::Daytime
            )
    }

    /// Extra attributes shared by every input this field renders.
    #[must_use]
    pub fn additional_attributes(&self) -> String {
        let mut attrs = String::new();
        if let Some(title) = self.title() {
            let _ = write!(attrs, " title='{}'", html_escape(&title));
        }
        if let Some(placeholder) = self.placeholder() {
            let _ = write!(attrs, " placeholder='{}'", html_escape(placeholder));
        }
        if let Some(maxlength) = self.maxlength() {
            let _ = write!(attrs, " maxlength='{maxlength}'");
        }
        if self.readonly {
            attrs.push_str(" disabled='disabled'");
        }
        if self.autosubmit {
            attrs.push_str(" onchange='document.forms[0].submit()'");
        }
        if self.wants_autocorrect_off() {
            attrs.push_str(" autocorrect='off' autocapitalize='off'");
        }
        if let FieldKind::Number(range) = &self.kind {
            if let Some(min) = range.min {
                let _ = write!(attrs, " min='{min}'");
            }
            if let Some(max) = range.max {
                let _ = write!(attrs, " max='{max}'");
            }
            if let Some(step) = range.step {
                let _ = write!(attrs, " step='{step}'");
            }
        }
        attrs
    }

    fn invalid_class(&self) -> &'static str {
        if self.is_valid_state() {
            ""
        } else {
            " class=\"invalid\""
        }
    }

    fn selected_keys(&self) -> Vec<&ChoiceKey> {
        match self.value() {
            Some(FieldValue::Key(key)) => vec![key],
            Some(FieldValue::Keys(keys)) => keys.iter().collect(),
            _ => Vec::new(),
        }
    }

    /// The input element(s) for this field.
    #[must_use]
    pub fn html_form_element(&self) -> String {
        match &self.kind {
            FieldKind::TextArea => self.html_textarea(),
            FieldKind::Single {
                style: SingleStyle::Radio,
                choices,
            } => self.html_radio(choices),
            FieldKind::Single {
                style: SingleStyle::Menu,
                choices,
            }
            | FieldKind::TimeMenu { choices, .. } => self.html_menu(choices),
            FieldKind::Single {
                style: SingleStyle::MenuItem,
                choices,
            } => self.html_menu_item(choices),
            FieldKind::Multiple {
                style: MultipleStyle::Checkbox,
                choices,
            } => self.html_checkbox(choices),
            FieldKind::Multiple {
                style: MultipleStyle::Set,
                choices,
            } => self.html_set(choices),
            FieldKind::Boolean => self.html_boolean(),
            FieldKind::Composite(composite) => {
                let mut element = format!("\n      <fieldset id=\"{}\">", self.id);
                for (_, sub) in composite.fields() {
                    let _ = write!(
                        element,
                        "\n        <div class=\"{}\">{}\n        </div>",
                        sub.name,
                        sub.html_table_column()
                    );
                }
                element.push_str("\n      </fieldset>");
                element
            }
            _ => self.html_input(),
        }
    }

    fn html_input(&self) -> String {
        let (class, onfocus, val) = match (&self.state, self.default.as_deref()) {
            (FieldState::Invalid(_), _) => (
                " class=\"invalid\"",
                " onfocus=\"this.className = '';\"",
                self.html_value(),
            ),
            (FieldState::Valid(_), _) => ("", "", self.html_value()),
            (FieldState::Empty, Some(default)) => (
                " class=\"hint\"",
                " onfocus=\"this.className = ''; this.value = '';\"",
                html_escape(default),
            ),
            (FieldState::Empty, None) => ("", "", String::new()),
        };
        format!(
            "\n          <input{class}{onfocus} name=\"{}\" id=\"{}\" type=\"{}\"{} value=\"{val}\">",
            self.input,
            self.id,
            self.input_type(),
            self.additional_attributes()
        )
    }

    fn html_textarea(&self) -> String {
        let val = if self.has_value() {
            self.html_value()
        } else {
            self.default.as_deref().map(html_escape).unwrap_or_default()
        };
        format!(
            "\n      <textarea{} name=\"{}\" id=\"{}\"{}>{val}</textarea>",
            self.invalid_class(),
            self.input,
            self.id,
            self.additional_attributes()
        )
    }

    fn html_radio(&self, choices: &Choices) -> String {
        let additional = self.additional_attributes();
        let selected = self.selected_keys();
        let mut element = format!(
            "\n      <fieldset{} id=\"{}\">",
            self.invalid_class(),
            self.id
        );
        for (key, choice) in choices.iter() {
            let checked = if selected.contains(&key) { " checked" } else { "" };
            let _ = write!(
                element,
                "\n        <label for=\"{id}\">\n          <input name=\"{input}\" type=\"radio\" class=\"radio\" value=\"{key}\"{checked}{additional}>\n          <span>{desc}</span>\n        </label>",
                id = self.id,
                input = self.input,
                key = html_escape(&key.to_string()),
                desc = choice.html_label(),
            );
        }
        // Keeps the field in the submission when nothing is selected.
        if selected.is_empty() {
            let _ = write!(
                element,
                "\n        <input style=\"display: none\" type=\"radio\" name=\"{}\" value=\"{}\" checked>",
                self.input,
                invalid_choice()
            );
        }
        element.push_str("\n      </fieldset>");
        element
    }

    fn html_menu(&self, choices: &Choices) -> String {
        let selected = self.selected_keys();
        let mut element = format!(
            "\n      <select{} name=\"{}\" id=\"{}\"{}>\n        <option value=\"{}\">Select {}</option>",
            self.invalid_class(),
            self.input,
            self.id,
            self.additional_attributes(),
            invalid_choice(),
            self.description
        );
        for (key, choice) in choices.iter() {
            let flag = if selected.contains(&key) { " selected" } else { "" };
            let _ = write!(
                element,
                "\n        <option value=\"{}\"{flag}>{}</option>",
                html_escape(&key.to_string()),
                choice.html_label()
            );
        }
        element.push_str("\n      </select>");
        element
    }

    fn html_menu_item(&self, choices: &Choices) -> String {
        let selected = self.selected_keys();
        let mut element = format!(
            "\n      <select{} name=\"{}\" id=\"{}\"{}>\n        <option value=\"{}\">Select {}</option>",
            self.invalid_class(),
            self.input,
            self.id,
            self.additional_attributes(),
            invalid_choice(),
            self.description
        );
        for (key, choice) in choices.iter() {
            if choice.as_item().is_some() {
                let flag = if selected.contains(&key) { " selected" } else { "" };
                let _ = write!(
                    element,
                    "\n        <option value=\"{}\"{flag}>&nbsp;&nbsp;{}</option>",
                    html_escape(&key.to_string()),
                    choice.html_label()
                );
            } else {
                let _ = write!(element, "\n        <option>{}</option>", choice.html_label());
            }
        }
        element.push_str("\n      </select>");
        element
    }

    fn html_checkbox(&self, choices: &Choices) -> String {
        let selected = self.selected_keys();
        let mut element = format!(
            "\n      <fieldset{} id=\"{}\">",
            self.invalid_class(),
            self.id
        );
        for (key, choice) in choices.iter() {
            let checked = if selected.contains(&key) { " checked" } else { "" };
            let _ = write!(
                element,
                "\n        <label for=\"{id}\">\n          <input name=\"{input}[]\" type=\"checkbox\" class=\"checkbox\" value=\"{key}\"{checked}>\n          <span>{desc}</span>\n        </label>",
                id = self.id,
                input = self.input,
                key = html_escape(&key.to_string()),
                desc = choice.html_label(),
            );
        }
        // Always submitted, so an empty selection still reaches the parser.
        let _ = write!(
            element,
            "\n        <input style=\"display: none\" type=\"checkbox\" name=\"{}[]\" value=\"{}\" checked>",
            self.input,
            invalid_choice()
        );
        element.push_str("\n      </fieldset>");
        element
    }

    fn html_set(&self, choices: &Choices) -> String {
        let selected = self.selected_keys();
        let mut element = format!(
            "\n      <input type=\"hidden\" name=\"{}[]\" value=\"{}\">\n      <select{} name=\"{}[]\" id=\"{}\" multiple{}>",
            self.input,
            invalid_choice(),
            self.invalid_class(),
            self.input,
            self.id,
            self.additional_attributes()
        );
        for (key, choice) in choices.iter() {
            let flag = if selected.contains(&key) { " selected" } else { "" };
            let _ = write!(
                element,
                "\n        <option value=\"{}\"{flag}>{}</option>",
                html_escape(&key.to_string()),
                choice.html_label()
            );
        }
        element.push_str("\n      </select>");
        element
    }

    fn html_boolean(&self) -> String {
        let class = if self.is_valid_state() {
            "checkbox"
        } else {
            "checkbox invalid"
        };
        let checked = if self.value() == Some(&FieldValue::Bool(true)) {
            " checked"
        } else {
            ""
        };
        format!(
            "\n          <input name=\"{}\" id=\"{}\" type=\"checkbox\" class=\"{class}\" value=\"1\"{checked}{}>",
            self.input,
            self.id,
            self.additional_attributes()
        )
    }

    /// The form element, plus a hidden copy of the value when the element
    /// is disabled (disabled inputs are not submitted).
    #[must_use]
    pub fn html_table_column(&self) -> String {
        let mut element = self.html_form_element();
        if self.readonly && !matches!(self.kind, FieldKind::Composite(_)) {
            let _ = write!(
                element,
                "\n      <input type=\"hidden\" name=\"{}\" id=\"{}\" value=\"{}\">",
                self.input,
                self.id,
                self.html_value()
            );
        }
        element
    }

    /// A labelled row: `<tr>`/`<td>` cells, or `<div>`s when `usedivs`.
    #[must_use]
    pub fn html_table_row(&self, usedivs: bool) -> String {
        let required = self.required();
        let marker = if required {
            "<span class='required'>*</span>"
        } else {
            ""
        };
        let rowclass = if required {
            format!("{} requiredfield", self.name)
        } else {
            self.name.clone()
        };
        let (tr, td) = if usedivs { ("div", "div") } else { ("tr", "td") };
        format!(
            "\n      <{tr} class=\"{rowclass}\">\n        <{td} class=\"label\">\n          <label for=\"{id}\">{desc}</label>{marker}\n        </{td}>\n        <{td} class=\"field\">{column}\n        </{td}>\n        <{td} class=\"annotation\">{annotation}</{td}>\n      </{tr}>",
            id = self.id,
            desc = self.description,
            column = self.html_table_column(),
            annotation = self.annotation.as_deref().unwrap_or_default(),
        )
    }

    /// Plain-text value; empty unless the field is valid with a value.
    #[must_use]
    pub fn text_value(&self) -> String {
        let Some(value) = self.value() else {
            return String::new();
        };
        match (&self.kind, value) {
            (FieldKind::Composite(composite), _) => composite
                .fields()
                .map(|(_, sub)| sub.text_value())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            (kind, FieldValue::Key(key)) => kind
                .choices()
                .and_then(|c| c.get(key))
                .map(|c| c.text_value().to_string())
                .unwrap_or_default(),
            (kind, FieldValue::Keys(keys)) => {
                let Some(choices) = kind.choices() else {
                    return String::new();
                };
                let texts: Vec<&str> = keys
                    .iter()
                    .filter_map(|k| choices.get(k))
                    .map(|c| c.text_value())
                    .collect();
                format!("\t{}", texts.join("\n\t"))
            }
            _ => self.choice().map(|p| p.display()).unwrap_or_default(),
        }
    }

    /// `Label: value`, for notification emails. `brief` labels by id.
    #[must_use]
    pub fn text_form(&self, brief: bool) -> String {
        let label = if brief {
            self.id.clone()
        } else {
            match &self.instance {
                Some(instance) => format!("{} {instance}", self.description),
                None => self.description.clone(),
            }
        };
        let label = add_label_colon(&label);
        match &self.kind {
            FieldKind::TextArea if self.has_value() => format!("{label}\n\t{}", self.text_value()),
            FieldKind::Multiple { .. } if self.has_value() => {
                format!("{label}\n{}", self.text_value())
            }
            FieldKind::TextArea | FieldKind::Multiple { .. } => label,
            FieldKind::Composite(composite) => {
                let (lead, sep) = if brief { (" ", "; ") } else { ("\n  ", "\n  ") };
                let subs: Vec<String> = composite
                    .fields()
                    .map(|(_, sub)| sub.text_form(brief))
                    .collect();
                format!("{label}{lead}{}", subs.join(sep))
            }
            _ => format!("{label} {}", self.text_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseContext;
    use crate::field::NumberRange;
    use crate::source::{Submission, Submitted};

    fn parsed(mut field: Field, raw: impl Into<Submitted>) -> Field {
        let mut source = Submission::new();
        source.insert(field.input().to_string(), raw);
        field.parse_value(&source, &ParseContext::default());
        field
    }

    #[test]
    fn label_colon_respects_punctuation() {
        assert_eq!(add_label_colon("Name"), "Name:");
        assert_eq!(add_label_colon("Size (cm)"), "Size (cm):");
        assert_eq!(add_label_colon("Really?"), "Really?");
    }

    #[test]
    fn text_input_shows_default_as_hint() {
        let field = Field::new("city", FieldKind::Text).with_default("Boston");
        let html = field.html_form_element();
        assert!(html.contains("class=\"hint\""));
        assert!(html.contains("value=\"Boston\""));
        assert!(html.contains("name=\"city\" id=\"city\" type=\"text\""));
    }

    #[test]
    fn invalid_input_is_flagged_and_echoed() {
        let field = parsed(Field::new("zip", FieldKind::Zip), "12<3");
        let html = field.html_form_element();
        assert!(html.contains("class=\"invalid\""));
        assert!(html.contains("value=\"12&lt;3\""));
        assert!(html.contains(" maxlength='10'"));
        assert!(html.contains("autocorrect='off'"));
    }

    #[test]
    fn number_attributes() {
        let field = Field::new(
            "age",
            FieldKind::Number(NumberRange {
                min: Some(0.0),
                max: Some(120.0),
                step: Some(1.0),
            }),
        );
        assert_eq!(field.input_type(), "number");
        let attrs = field.additional_attributes();
        assert!(attrs.contains(" title='number between 0 and 120'"));
        assert!(attrs.contains(" min='0' max='120' step='1'"));
    }

    #[test]
    fn radio_adds_sentinel_only_without_selection() {
        let choices = Choices::from_pairs([(1, "Small"), (2, "Large")]);
        let field = Field::new("size", FieldKind::radio(choices));
        assert!(field.html_form_element().contains(invalid_choice()));
        let field = parsed(field, "2");
        let html = field.html_form_element();
        assert!(html.contains("value=\"2\" checked"));
        assert!(!html.contains(invalid_choice()));
    }

    #[test]
    fn checkbox_always_carries_sentinel() {
        let choices = Choices::from_pairs([(1, "Cats"), (2, "Dogs")]);
        let field = parsed(
            Field::new("pets", FieldKind::checkbox(choices)),
            Submitted::List(vec!["2".into()]),
        );
        let html = field.html_form_element();
        assert!(html.contains("name=\"pets[]\" type=\"checkbox\" class=\"checkbox\" value=\"2\" checked"));
        assert!(html.contains(&format!("value=\"{}\" checked", invalid_choice())));
    }

    #[test]
    fn menu_opens_with_prompt() {
        let field = Field::new("color", FieldKind::menu(Choices::from_labels(["Red"])));
        let html = field.html_form_element();
        assert!(html.contains(&format!(
            "<option value=\"{}\">Select Color</option>",
            invalid_choice()
        )));
        assert!(html.contains("<option value=\"Red\">Red</option>"));
    }

    #[test]
    fn readonly_column_submits_hidden_copy() {
        let field = parsed(Field::new("code", FieldKind::Text).readonly(true), "A1");
        let html = field.html_table_column();
        assert!(html.contains("disabled='disabled'"));
        assert!(html.contains("<input type=\"hidden\" name=\"code\" id=\"code\" value=\"A1\">"));
    }

    #[test]
    fn table_row_marks_required() {
        let row = Field::new("email", FieldKind::Email).html_table_row(false);
        assert!(row.contains("<tr class=\"email requiredfield\">"));
        assert!(row.contains("<label for=\"email\">Email</label><span class='required'>*</span>"));
        let row = Field::new("note", FieldKind::Text).optional().html_table_row(true);
        assert!(row.contains("<div class=\"note\">"));
        assert!(row.contains("<div class=\"annotation\"></div>"));
    }

    #[test]
    fn text_forms() {
        let field = parsed(Field::new("phone", FieldKind::Phone), "555.123.4567");
        assert_eq!(field.text_form(false), "Phone: 555-123-4567");
        assert_eq!(field.text_form(true), "phone: 555-123-4567");

        let notes = parsed(Field::new("notes", FieldKind::TextArea), "Hello");
        assert_eq!(notes.text_form(false), "Notes:\n\tHello");

        let choices = Choices::from_pairs([(1, "Cats"), (2, "Dogs")]);
        let pets = parsed(
            Field::new("pets", FieldKind::checkbox(choices)).with_instance("2"),
            Submitted::List(vec!["1".into(), "2".into()]),
        );
        assert_eq!(pets.text_form(false), "Pets 2:\n\tCats\n\tDogs");
    }
}
