//! Heuristic field-kind inference.
//!
//! A kind is chosen from, in order: an explicit type string, an ordered
//! substring scan of the field name, the shape of a declared choice table,
//! and the SQL column type. The substring scan is deliberately naive:
//! `date_updated` is a date and `state_of_mind` is a US state.

use tracing::warn;

use crate::choice::{ChoiceKey, Choices};
use crate::error::FormError;
use crate::source::ColumnDescriptor;

/// Concrete kind selected for a field, before it is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KindTag {
    Text,
    TextArea,
    Email,
    Password,
    Number,
    PostalCode,
    Pattern,
    State,
    Country,
    Zip,
    Phone,
    InternationalPhone,
    Year,
    Date,
    Birthdate,
    Daytime,
    Radio,
    Menu,
    MenuItem,
    Checkbox,
    Set,
    Boolean,
    TimeMenu,
    Composite,
    File,
    Image,
}

impl KindTag {
    /// Resolves an explicit type string. Matching is case-insensitive.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownType`] for a string that names no kind.
    pub fn from_type_name(name: &str) -> Result<Self, FormError> {
        let tag = match name.to_ascii_lowercase().as_str() {
            "text" | "string" => Self::Text,
            "area" | "textarea" => Self::TextArea,
            "email" => Self::Email,
            "password" => Self::Password,
            "number" => Self::Number,
            "postal" => Self::PostalCode,
            "pattern" => Self::Pattern,
            "state" => Self::State,
            "country" => Self::Country,
            "zip" => Self::Zip,
            "phone" | "cell" => Self::Phone,
            "intlphone" | "international" => Self::InternationalPhone,
            "year" => Self::Year,
            "date" => Self::Date,
            "birth" | "birthdate" => Self::Birthdate,
            "daytime" | "datetime" | "time" => Self::Daytime,
            "button" | "radio" | "radiobutton" | "choice" | "single" => Self::Radio,
            "menu" => Self::Menu,
            "menuitem" => Self::MenuItem,
            "check" | "checkbox" | "multiple" => Self::Checkbox,
            "set" => Self::Set,
            "boolean" | "bool" => Self::Boolean,
            "timemenu" => Self::TimeMenu,
            "composite" | "multi" => Self::Composite,
            "file" => Self::File,
            "image" | "picture" => Self::Image,
            _ => return Err(FormError::UnknownType(name.to_string())),
        };
        Ok(tag)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::TextArea => "textarea",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::PostalCode => "postal",
            Self::Pattern => "pattern",
            Self::State => "state",
            Self::Country => "country",
            Self::Zip => "zip",
            Self::Phone => "phone",
            Self::InternationalPhone => "intlphone",
            Self::Year => "year",
            Self::Date => "date",
            Self::Birthdate => "birthdate",
            Self::Daytime => "daytime",
            Self::Radio => "radio",
            Self::Menu => "menu",
            Self::MenuItem => "menuitem",
            Self::Checkbox => "checkbox",
            Self::Set => "set",
            Self::Boolean => "boolean",
            Self::TimeMenu => "timemenu",
            Self::Composite => "composite",
            Self::File => "file",
            Self::Image => "image",
        }
    }

    /// True for upload kinds, which the engine does not implement.
    #[must_use]
    pub fn is_upload(self) -> bool {
        matches!(self, Self::File | Self::Image)
    }
}

/// Which rule produced an inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InferenceSource {
    Explicit,
    /// Name contained this key.
    Name(&'static str),
    Choices,
    /// Column type contained this key.
    Column(&'static str),
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inferred {
    pub kind: KindTag,
    pub source: InferenceSource,
}

/// Name keys, scanned in order. More specific keys precede the generic
/// ones they contain (`datetime` before `date`, `birth` before `date`).
const NAME_KEYS: &[(&str, KindTag)] = &[
    ("email", KindTag::Email),
    ("password", KindTag::Password),
    ("number", KindTag::Number),
    ("choice", KindTag::Radio),
    ("state", KindTag::State),
    ("zip", KindTag::Zip),
    ("postal", KindTag::PostalCode),
    ("country", KindTag::Country),
    ("phone", KindTag::Phone),
    ("cell", KindTag::Phone),
    ("birth", KindTag::Birthdate),
    ("datetime", KindTag::Daytime),
    ("daytime", KindTag::Daytime),
    ("date", KindTag::Date),
    ("time", KindTag::Daytime),
    ("year", KindTag::Year),
    ("file", KindTag::File),
    ("image", KindTag::Image),
    ("picture", KindTag::Image),
];

/// Column-type keys, scanned in order. `tinyint(1)` must precede `int`,
/// `datetime`/`timestamp` must precede `date` and `time`, and raw SQL
/// dates map to birthdates so 4-digit years are required.
const COLUMN_KEYS: &[(&str, KindTag)] = &[
    ("tinyint(1)", KindTag::Boolean),
    ("bool", KindTag::Boolean),
    ("varchar", KindTag::Text),
    ("text", KindTag::TextArea),
    ("datetime", KindTag::Daytime),
    ("timestamp", KindTag::Daytime),
    ("date", KindTag::Birthdate),
    ("time", KindTag::Daytime),
    ("decimal", KindTag::Number),
    ("int", KindTag::Number),
    ("blob", KindTag::Image),
];

/// Infers the kind of a field.
///
/// # Errors
///
/// Returns [`FormError::UnknownType`] if `explicit` names no kind.
pub fn infer(
    name: &str,
    explicit: Option<&str>,
    choices: Option<&Choices>,
    column: Option<&ColumnDescriptor>,
) -> Result<Inferred, FormError> {
    if let Some(explicit) = explicit {
        return Ok(Inferred {
            kind: KindTag::from_type_name(explicit)?,
            source: InferenceSource::Explicit,
        });
    }

    let lower = name.to_lowercase();
    if let Some((key, kind)) = NAME_KEYS.iter().find(|(key, _)| lower.contains(key)) {
        return Ok(Inferred {
            kind: *kind,
            source: InferenceSource::Name(key),
        });
    }

    if let Some(choices) = choices {
        let kind = if choices.contains(&ChoiceKey::Int(0)) {
            KindTag::Checkbox
        } else if choices.has_blank_choice() {
            KindTag::Menu
        } else {
            KindTag::Radio
        };
        return Ok(Inferred {
            kind,
            source: InferenceSource::Choices,
        });
    }

    if let Some(column) = column {
        let sql_type = column.sql_type.to_lowercase();
        if let Some((key, kind)) = COLUMN_KEYS.iter().find(|(key, _)| sql_type.contains(key)) {
            return Ok(Inferred {
                kind: *kind,
                source: InferenceSource::Column(key),
            });
        }
        warn!(
            field = name,
            sql_type = %column.sql_type,
            "could not infer a field type, using text"
        );
    }

    Ok(Inferred {
        kind: KindTag::Text,
        source: InferenceSource::Fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kind_of(name: &str) -> KindTag {
        infer(name, None, None, None).unwrap().kind
    }

    fn column_kind(sql_type: &str) -> KindTag {
        let col = ColumnDescriptor::new(sql_type, true, None);
        infer("misc", None, None, Some(&col)).unwrap().kind
    }

    #[test]
    fn explicit_type_wins() {
        let inferred = infer("email", Some("menu"), None, None).unwrap();
        assert_eq!(inferred.kind, KindTag::Menu);
        assert_eq!(inferred.source, InferenceSource::Explicit);
    }

    #[test]
    fn unknown_explicit_type_is_an_error() {
        assert!(matches!(
            infer("x", Some("hologram"), None, None),
            Err(FormError::UnknownType(t)) if t == "hologram"
        ));
    }

    #[test]
    fn name_scan_is_ordered() {
        assert_eq!(kind_of("Contact_Email"), KindTag::Email);
        assert_eq!(kind_of("event_datetime"), KindTag::Daytime);
        assert_eq!(kind_of("birthdate"), KindTag::Birthdate);
        assert_eq!(kind_of("date_updated"), KindTag::Date);
        assert_eq!(kind_of("start_time"), KindTag::Daytime);
        assert_eq!(kind_of("cell"), KindTag::Phone);
        assert_eq!(kind_of("graduation_year"), KindTag::Year);
    }

    #[test]
    fn naive_matches_are_preserved() {
        assert_eq!(kind_of("state_of_mind"), KindTag::State);
        assert_eq!(kind_of("profile"), KindTag::File);
    }

    #[test]
    fn choice_shape_decides_style() {
        let zero = Choices::from_list(["No", "Yes"]);
        let blank = Choices::from_pairs([(1, ""), (2, "Red")]);
        let plain = Choices::from_pairs([(1, "Red"), (2, "Blue")]);
        let kind = |c: &Choices| infer("color", None, Some(c), None).unwrap().kind;
        assert_eq!(kind(&zero), KindTag::Checkbox);
        assert_eq!(kind(&blank), KindTag::Menu);
        assert_eq!(kind(&plain), KindTag::Radio);
    }

    #[test]
    fn column_types_map_in_order() {
        assert_eq!(column_kind("tinyint(1)"), KindTag::Boolean);
        assert_eq!(column_kind("tinyint(4)"), KindTag::Number);
        assert_eq!(column_kind("VARCHAR(40)"), KindTag::Text);
        assert_eq!(column_kind("mediumtext"), KindTag::TextArea);
        assert_eq!(column_kind("datetime"), KindTag::Daytime);
        assert_eq!(column_kind("date"), KindTag::Birthdate);
        assert_eq!(column_kind("decimal(10,2)"), KindTag::Number);
        assert_eq!(column_kind("longblob"), KindTag::Image);
    }

    #[test]
    fn fallback_is_text() {
        let inferred = infer("misc", None, None, None).unwrap();
        assert_eq!(inferred.kind, KindTag::Text);
        assert_eq!(inferred.source, InferenceSource::Fallback);
        assert_eq!(column_kind("geometry"), KindTag::Text);
    }
}
