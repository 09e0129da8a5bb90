//! Fields: identity, kind, and per-request validation state.
//!
//! A [`Field`] is created from a declaration, bound to its form (which may
//! override required-ness, default, maximum length and choices from a
//! column table), mutated once per request by [`Field::parse_value`], and
//! read afterwards for rendering and SQL emission.

mod choice;
mod composite;
mod render;
mod sql;
mod temporal;
mod text;

use std::collections::{BTreeMap, HashMap};

use regex::Regex;

pub use composite::{Composite, Gate};
pub use temporal::TimeRange;

use crate::choice::{invalid_choice, ChoiceKey, Choices};
use crate::config::{FormConfig, ParseContext};
use crate::error::FormError;
use crate::escape::html_escape;
use crate::infer::KindTag;
use crate::source::{ColumnTable, Submission, Submitted};

/// Canonical, typed value of a valid field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Key(ChoiceKey),
    Keys(Vec<ChoiceKey>),
    Bool(bool),
    Composite(BTreeMap<String, FieldValue>),
}

impl FieldValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Validation state of a field.
///
/// `Invalid` keeps the submitted input so it can be shown back to the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FieldState {
    /// Valid with no value (blank optional input, or never parsed).
    #[default]
    Empty,
    Valid(FieldValue),
    Invalid(Submitted),
}

/// Presentation of a valid value, as returned by [`Field::choice`].
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Text(String),
    List(Vec<String>),
    Bool(bool),
    /// Sub-field key and presentation, for composites.
    Map(Vec<(String, String)>),
}

impl Presentation {
    /// Flattened display form.
    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
            Self::Bool(b) => if *b { "Yes" } else { "No" }.to_string(),
            Self::Map(entries) => entries
                .iter()
                .map(|(_, v)| v.as_str())
                .filter(|v| !v.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Inclusive numeric bounds and HTML step of a number field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct NumberRange {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub step: Option<f64>,
}

/// Presentation of a single-choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleStyle {
    Radio,
    Menu,
    /// Menu whose plain-label entries are unselectable separators.
    MenuItem,
}

/// Presentation of a multiple-choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipleStyle {
    Checkbox,
    /// Multi-select list, stored as an SQL `SET`.
    Set,
}

/// Every kind of field the engine knows.
#[derive(Debug, Clone)]
pub enum FieldKind {
    Text,
    TextArea,
    Email,
    Password,
    Number(NumberRange),
    PostalCode,
    Pattern(Regex),
    State,
    Country,
    Zip,
    Phone,
    InternationalPhone,
    Year,
    Date,
    Birthdate,
    Daytime,
    Single {
        style: SingleStyle,
        choices: Choices,
    },
    Multiple {
        style: MultipleStyle,
        choices: Choices,
    },
    Boolean,
    TimeMenu {
        range: TimeRange,
        choices: Choices,
    },
    Composite(Composite),
}

impl FieldKind {
    /// Custom pattern kind.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::InvalidPattern`] if `pattern` does not compile.
    pub fn pattern(field: &str, pattern: &str) -> Result<Self, FormError> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|source| FormError::InvalidPattern {
                field: field.to_string(),
                source,
            })
    }

    #[must_use]
    pub fn radio(choices: Choices) -> Self {
        Self::Single {
            style: SingleStyle::Radio,
            choices,
        }
    }

    #[must_use]
    pub fn menu(choices: Choices) -> Self {
        Self::Single {
            style: SingleStyle::Menu,
            choices,
        }
    }

    #[must_use]
    pub fn menu_item(choices: Choices) -> Self {
        Self::Single {
            style: SingleStyle::MenuItem,
            choices,
        }
    }

    #[must_use]
    pub fn checkbox(choices: Choices) -> Self {
        Self::Multiple {
            style: MultipleStyle::Checkbox,
            choices,
        }
    }

    /// Time-of-day menu built from a range.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::BadTimeRange`] for an empty or inverted range.
    pub fn time_menu(field: &str, range: TimeRange) -> Result<Self, FormError> {
        let choices = range.choices(field)?;
        Ok(Self::TimeMenu { range, choices })
    }

    /// The inference tag this kind corresponds to.
    #[must_use]
    pub fn tag(&self) -> KindTag {
        match self {
            Self::Text => KindTag::Text,
            Self::TextArea => KindTag::TextArea,
            Self::Email => KindTag::Email,
            Self::Password => KindTag::Password,
            Self::Number(_) => KindTag::Number,
            Self::PostalCode => KindTag::PostalCode,
            Self::Pattern(_) => KindTag::Pattern,
            Self::State => KindTag::State,
            Self::Country => KindTag::Country,
            Self::Zip => KindTag::Zip,
            Self::Phone => KindTag::Phone,
            Self::InternationalPhone => KindTag::InternationalPhone,
            Self::Year => KindTag::Year,
            Self::Date => KindTag::Date,
            Self::Birthdate => KindTag::Birthdate,
            Self::Daytime => KindTag::Daytime,
            Self::Single { style, .. } => match style {
                SingleStyle::Radio => KindTag::Radio,
                SingleStyle::Menu => KindTag::Menu,
                SingleStyle::MenuItem => KindTag::MenuItem,
            },
            Self::Multiple { style, .. } => match style {
                MultipleStyle::Checkbox => KindTag::Checkbox,
                MultipleStyle::Set => KindTag::Set,
            },
            Self::Boolean => KindTag::Boolean,
            Self::TimeMenu { .. } => KindTag::TimeMenu,
            Self::Composite(_) => KindTag::Composite,
        }
    }

    /// Choice table backing a choice-style kind.
    #[must_use]
    pub fn choices(&self) -> Option<&Choices> {
        match self {
            Self::Single { choices, .. }
            | Self::Multiple { choices, .. }
            | Self::TimeMenu { choices, .. } => Some(choices),
            _ => None,
        }
    }

    fn choices_mut(&mut self) -> Option<&mut Choices> {
        match self {
            Self::Single { choices, .. } | Self::Multiple { choices, .. } => Some(choices),
            _ => None,
        }
    }

    /// Kinds validated as free text (subject to the URI guard).
    fn is_textual(&self) -> bool {
        !matches!(
            self,
            Self::Single { .. }
                | Self::Multiple { .. }
                | Self::Boolean
                | Self::TimeMenu { .. }
                | Self::Composite(_)
        )
    }

    /// Kinds whose error message carries a format hint.
    fn has_format_hint(&self) -> bool {
        matches!(
            self,
            Self::Email
                | Self::Number(_)
                | Self::Pattern(_)
                | Self::State
                | Self::Country
                | Self::Zip
                | Self::Phone
                | Self::InternationalPhone
                | Self::Year
                | Self::Date
                | Self::Birthdate
                | Self::Daytime
        )
    }

    fn default_maxlength(&self) -> Option<usize> {
        match self {
            Self::Email => Some(254),
            Self::State => Some(2),
            Self::Zip => Some(10),
            Self::Phone => Some(16),
            Self::InternationalPhone => Some(24),
            Self::Year => Some(4),
            Self::Date | Self::Birthdate => Some(16),
            Self::Daytime => Some(8),
            _ => None,
        }
    }

    fn default_title(&self) -> Option<String> {
        let title = match self {
            Self::Email => "email address",
            Self::Password => "password",
            Self::Number(range) => {
                return Some(match (range.min, range.max) {
                    (Some(min), Some(max)) => format!("number between {min} and {max}"),
                    _ => "number".to_string(),
                });
            }
            Self::PostalCode => "Postal code",
            Self::Pattern(_) => "entry",
            Self::State => "state designation",
            Self::Country => "country designation",
            Self::Zip => "ZIP code",
            Self::Phone => "phone number",
            Self::InternationalPhone => "international phone number",
            Self::Year => "year",
            Self::Date => "date",
            Self::Birthdate => "birth date",
            Self::Daytime => "time",
            _ => return None,
        };
        Some(title.to_string())
    }

    fn default_placeholder(&self, iso: bool) -> Option<&'static str> {
        Some(match self {
            Self::Email => "you@isp.com",
            Self::State => "ST",
            Self::Country => "CC",
            Self::Zip => "01234-5678",
            Self::Phone => "555-555-1234",
            Self::InternationalPhone => "+1 555 555 1234",
            Self::Year => "YYYY",
            Self::Date | Self::Birthdate if iso => "YYYY-MM-DD",
            Self::Date => "MM/DD/YY",
            Self::Birthdate => "MM/DD/YYYY",
            Self::Daytime if iso => "HH:MM",
            Self::Daytime => "H:MM am",
            _ => return None,
        })
    }
}

/// Default description: underscores become spaces and each word is
/// capitalized.
#[must_use]
pub fn default_description(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One input of a form.
#[derive(Debug, Clone)]
pub struct Field {
    name: String,
    description: String,
    instance: Option<String>,
    id: String,
    input: String,
    kind: FieldKind,
    required: bool,
    priority: i64,
    default: Option<String>,
    maxlength: Option<usize>,
    title: Option<String>,
    placeholder: Option<String>,
    annotation: Option<String>,
    readonly: bool,
    autosubmit: bool,
    allow_uri: bool,
    iso_dates: bool,
    html5: bool,
    state: FieldState,
}

impl Field {
    /// A required field of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        let name = name.into();
        let config = FormConfig::default();
        let mut field = Self {
            description: default_description(&name),
            id: name.clone(),
            input: name.clone(),
            name,
            instance: None,
            kind,
            required: true,
            priority: 0,
            default: None,
            maxlength: None,
            title: None,
            placeholder: None,
            annotation: None,
            readonly: false,
            autosubmit: false,
            allow_uri: false,
            iso_dates: config.iso_dates,
            html5: config.html5,
            state: FieldState::Empty,
        };
        field.set_instance(None);
        field
    }

    // --- builders ---

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.set_required(false);
        self
    }

    #[must_use]
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.set_instance(Some(instance.into()));
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i64) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn with_maxlength(mut self, maxlength: usize) -> Self {
        self.maxlength = Some(maxlength);
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    #[must_use]
    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    #[must_use]
    pub fn readonly(mut self, on: bool) -> Self {
        self.readonly = on;
        self
    }

    #[must_use]
    pub fn autosubmit(mut self, on: bool) -> Self {
        self.autosubmit = on;
        self
    }

    /// Accept values that look like URIs.
    #[must_use]
    pub fn allow_uri(mut self, on: bool) -> Self {
        self.allow_uri = on;
        self
    }

    pub fn set_required(&mut self, required: bool) {
        self.required = required;
    }

    /// Sets the repetition suffix; `id` and `input` become `name + instance`.
    pub fn set_instance(&mut self, instance: Option<String>) {
        let suffix = instance.as_deref().unwrap_or_default();
        self.id = format!("{}{suffix}", self.name);
        self.input.clone_from(&self.id);
        if let FieldKind::Composite(composite) = &mut self.kind {
            for (_, sub) in composite.fields_mut() {
                sub.set_instance(instance.clone());
            }
        }
        self.instance = instance;
    }

    // --- accessors ---

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Submission key this field reads.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether a value is required.
    ///
    /// For composites this includes required-ness derived by the last parse.
    #[must_use]
    pub fn required(&self) -> bool {
        match &self.kind {
            FieldKind::Composite(c) => self.required || c.derived_required(),
            _ => self.required,
        }
    }

    #[must_use]
    pub fn priority(&self) -> i64 {
        self.priority
    }

    #[must_use]
    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Explicit, column-derived or kind-default maximum length.
    #[must_use]
    pub fn maxlength(&self) -> Option<usize> {
        self.maxlength.or_else(|| self.kind.default_maxlength())
    }

    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.title.clone().or_else(|| self.kind.default_title())
    }

    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder
            .as_deref()
            .or_else(|| self.kind.default_placeholder(self.iso_dates))
    }

    #[must_use]
    pub fn annotation(&self) -> Option<&str> {
        self.annotation.as_deref()
    }

    #[must_use]
    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    #[must_use]
    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// The canonical value, if the field is valid and has one.
    #[must_use]
    pub fn value(&self) -> Option<&FieldValue> {
        match &self.state {
            FieldState::Valid(v) => Some(v),
            _ => None,
        }
    }

    /// False only when the last parse rejected the input.
    #[must_use]
    pub fn is_valid_state(&self) -> bool {
        !matches!(self.state, FieldState::Invalid(_))
    }

    #[must_use]
    pub fn has_value(&self) -> bool {
        matches!(self.state, FieldState::Valid(_))
    }

    /// Sub-field of a composite, by key.
    #[must_use]
    pub fn sub_field(&self, key: &str) -> Option<&Field> {
        match &self.kind {
            FieldKind::Composite(c) => c.field(key),
            _ => None,
        }
    }

    // --- binding ---

    /// Adapts the field to its form: presentation flags, column
    /// constraints and enum choices.
    ///
    /// A column for this id makes the field required unless the column is
    /// nullable, supplies a default, and supplies a maximum length from
    /// `VARCHAR(n)` when the field has none.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::MissingChoices`] if a choice kind ends up with
    /// an empty choice table.
    pub fn bind(
        &mut self,
        columns: Option<&ColumnTable>,
        enums: &HashMap<String, Choices>,
        config: &FormConfig,
    ) -> Result<(), FormError> {
        self.iso_dates = config.iso_dates;
        self.html5 = config.html5;

        if let Some(column) = columns.and_then(|c| c.get(&self.id)) {
            self.required = !column.nullable;
            if let Some(default) = column.default.as_deref().filter(|d| !d.is_empty()) {
                self.default = Some(default.to_string());
            }
            if self.maxlength().is_none() {
                self.maxlength = column.varchar_length();
            }
        }

        if let Some(enum_choices) = enums.get(&self.name) {
            if let Some(choices) = self.kind.choices_mut() {
                choices.clone_from(enum_choices);
            }
        }
        if self.kind.choices().is_some_and(Choices::is_empty) {
            return Err(FormError::MissingChoices {
                field: self.id.clone(),
            });
        }

        if let FieldKind::Composite(composite) = &mut self.kind {
            for (_, sub) in composite.fields_mut() {
                sub.bind(columns, enums, config)?;
            }
        }
        Ok(())
    }

    // --- validation ---

    /// Whether `raw` is acceptable for this field.
    ///
    /// Blank input is valid exactly when the field is optional. Composites
    /// are never submitted under their own key and validate through
    /// [`Field::parse_value`].
    #[must_use]
    pub fn is_valid(&self, raw: &Submitted, ctx: &ParseContext) -> bool {
        match &self.kind {
            FieldKind::Composite(_) => raw.is_blank() && !self.required,
            kind if !kind.is_textual() => self.choice_is_valid(raw),
            _ => {
                let Some(text) = raw.as_text() else {
                    return false;
                };
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return !self.required;
                }
                if !self.allow_uri && text::looks_like_uri(trimmed) {
                    return false;
                }
                self.normalize(trimmed, ctx).is_some()
            }
        }
    }

    /// Canonical form of `raw`.
    ///
    /// `None` is "no value". For text kinds an input that fails the kind's
    /// rule comes back trimmed but otherwise unchanged.
    #[must_use]
    pub fn canonical(&self, raw: &Submitted, ctx: &ParseContext) -> Option<FieldValue> {
        match &self.kind {
            FieldKind::Composite(_) => None,
            kind if !kind.is_textual() => self.choice_canonical(raw),
            _ => {
                let trimmed = raw.as_text()?.trim();
                if trimmed.is_empty() {
                    return None;
                }
                let canonical = self
                    .normalize(trimmed, ctx)
                    .unwrap_or_else(|| trimmed.to_string());
                Some(FieldValue::Text(canonical))
            }
        }
    }

    /// Kind rule for non-blank text: `Some(canonical)` if valid.
    fn normalize(&self, trimmed: &str, ctx: &ParseContext) -> Option<String> {
        match &self.kind {
            FieldKind::Text | FieldKind::TextArea | FieldKind::PostalCode => {
                text::within_length(trimmed, self.maxlength()).then(|| trimmed.to_string())
            }
            FieldKind::Email => text::email(trimmed),
            FieldKind::Password => text::password(trimmed),
            FieldKind::Number(range) => text::number(trimmed, range),
            FieldKind::Pattern(re) => text::pattern(re, trimmed),
            FieldKind::State => text::state(trimmed),
            FieldKind::Country => text::country(trimmed),
            FieldKind::Zip => text::zip(trimmed),
            FieldKind::Phone => text::phone(trimmed),
            FieldKind::InternationalPhone => text::international_phone(trimmed),
            FieldKind::Year => temporal::year(trimmed, ctx),
            FieldKind::Date => temporal::date(trimmed, ctx, false),
            FieldKind::Birthdate => temporal::date(trimmed, ctx, true),
            FieldKind::Daytime => temporal::daytime(trimmed),
            _ => None,
        }
    }

    /// Validates and stores `raw`: canonical value if valid, otherwise the
    /// input itself, marked invalid.
    pub fn set_value(&mut self, raw: &Submitted, ctx: &ParseContext) {
        self.state = if self.is_valid(raw, ctx) {
            self.canonical(raw, ctx)
                .map_or(FieldState::Empty, FieldState::Valid)
        } else {
            FieldState::Invalid(raw.clone())
        };
    }

    /// Sets a value only if the field has none yet.
    pub fn initial_value(&mut self, raw: &Submitted, ctx: &ParseContext) {
        if matches!(self.state, FieldState::Empty) {
            self.set_value(raw, ctx);
        }
    }

    /// Forgets any parsed value.
    pub fn reset(&mut self) {
        self.state = FieldState::Empty;
        if let FieldKind::Composite(composite) = &mut self.kind {
            composite.reset();
        }
    }

    /// Whether the submission carries input for this field.
    ///
    /// Booleans are always present: an unchecked box submits nothing.
    #[must_use]
    pub fn is_present(&self, source: &Submission) -> bool {
        match &self.kind {
            FieldKind::Boolean => true,
            FieldKind::Composite(c) => c.fields().any(|(_, sub)| sub.is_present(source)),
            _ => source.contains(&self.input),
        }
    }

    /// Parses this field's input from `source`; returns whether it is valid.
    ///
    /// Missing input is treated as blank.
    pub fn parse_value(&mut self, source: &Submission, ctx: &ParseContext) -> bool {
        if matches!(self.kind, FieldKind::Composite(_)) {
            return self.parse_composite(source, ctx);
        }
        let raw = source
            .get(&self.input)
            .cloned()
            .unwrap_or_else(|| Submitted::Text(String::new()));
        self.set_value(&raw, ctx);
        self.is_valid_state()
    }

    // --- presentation ---

    /// Presentation of the current value; `None` unless valid with a value.
    #[must_use]
    pub fn choice(&self) -> Option<Presentation> {
        let value = self.value()?;
        match (&self.kind, value) {
            (FieldKind::Date | FieldKind::Birthdate, FieldValue::Text(iso)) if !self.iso_dates => {
                Some(Presentation::Text(
                    temporal::local_date(iso).unwrap_or_else(|| iso.clone()),
                ))
            }
            (FieldKind::Daytime, FieldValue::Text(iso)) if !self.iso_dates => Some(
                Presentation::Text(temporal::local_time(iso).unwrap_or_else(|| iso.clone())),
            ),
            (_, FieldValue::Text(s)) => Some(Presentation::Text(s.clone())),
            (_, FieldValue::Bool(b)) => Some(Presentation::Bool(*b)),
            (kind, FieldValue::Key(key)) => kind
                .choices()
                .and_then(|c| c.get(key))
                .map(|c| Presentation::Text(c.presentation().to_string())),
            (kind, FieldValue::Keys(keys)) => {
                let choices = kind.choices()?;
                Some(Presentation::List(
                    keys.iter()
                        .filter_map(|k| choices.get(k))
                        .map(|c| c.presentation().to_string())
                        .collect(),
                ))
            }
            (FieldKind::Composite(c), FieldValue::Composite(_)) => Some(Presentation::Map(
                c.fields()
                    .map(|(key, sub)| {
                        let shown = sub.choice().map(|p| p.display()).unwrap_or_default();
                        (key.to_string(), shown)
                    })
                    .collect(),
            )),
            (_, FieldValue::Composite(_)) => None,
        }
    }

    /// Escaped display value. Invalid input is echoed back, except for
    /// passwords.
    #[must_use]
    pub fn html_value(&self) -> String {
        if matches!(self.kind, FieldKind::Password) {
            return String::new();
        }
        match &self.state {
            FieldState::Valid(_) => match &self.kind {
                FieldKind::Composite(c) => c.html_value(),
                kind => match (kind.choices(), self.value()) {
                    (Some(choices), Some(FieldValue::Key(key))) => {
                        choices.get(key).map(|c| c.html_value()).unwrap_or_default()
                    }
                    (Some(choices), Some(FieldValue::Keys(keys))) => keys
                        .iter()
                        .filter_map(|k| choices.get(k))
                        .map(crate::choice::Choice::html_value)
                        .collect::<Vec<_>>()
                        .join(","),
                    _ => self
                        .choice()
                        .map(|p| html_escape(&p.display()))
                        .unwrap_or_default(),
                },
            },
            FieldState::Invalid(raw) => match &self.kind {
                FieldKind::Composite(c) => c.html_value(),
                _ => html_escape(&visible_input(raw)),
            },
            FieldState::Empty => String::new(),
        }
    }

    /// User-facing message explaining why the field is invalid.
    #[must_use]
    pub fn error_message(&self) -> String {
        if let FieldKind::Composite(c) = &self.kind {
            if let Some(sub) = c.first_missing() {
                return format!(
                    "You must specify {} for {}.",
                    sub.description(),
                    self.description
                );
            }
        }
        // An invalid boolean is always an unchecked required box.
        let blank = match (&self.kind, &self.state) {
            (FieldKind::Boolean, _) => true,
            (_, FieldState::Invalid(raw)) => visible_input(raw).trim().is_empty(),
            _ => !self.has_value(),
        };
        if blank && self.required() {
            return format!(
                "{} is a required field. Please enter it below.",
                self.description
            );
        }
        if matches!(self.kind, FieldKind::Password) {
            return format!(
                "{} is not a valid password. Please enter at least 8 characters without spaces.",
                self.description
            );
        }
        if self.kind.has_format_hint() {
            let title = self.title().unwrap_or_default();
            let hint = self
                .placeholder()
                .map(|p| format!(" ({p})"))
                .unwrap_or_default();
            return format!(
                "{}: \"{}\" is not a valid {title}. Please enter a valid {title}{hint}.",
                self.description,
                self.html_value()
            );
        }
        format!(
            "{}: \"{}\" is not a valid entry.",
            self.description,
            self.html_value()
        )
    }
}

/// Submitted input as the user would see it, with the choice sentinel
/// stripped.
fn visible_input(raw: &Submitted) -> String {
    match raw {
        Submitted::Text(s) if s == invalid_choice() => String::new(),
        Submitted::Text(s) => s.clone(),
        Submitted::List(items) => items
            .iter()
            .filter(|s| s.as_str() != invalid_choice())
            .cloned()
            .collect::<Vec<_>>()
            .join(","),
    }
}
