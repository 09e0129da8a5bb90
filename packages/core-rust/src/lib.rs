//! formwork core: declarative form fields, kind inference, the validation
//! engine, the priority-tiered parse pipeline, and HTML/SQL/text output.

pub mod choice;
pub mod config;
pub mod country;
pub mod declare;
pub mod error;
pub mod escape;
pub mod field;
pub mod form;
pub mod infer;
pub mod presets;
pub mod source;

pub use choice::{Choice, ChoiceItem, ChoiceKey, Choices};
pub use config::{FixedYear, FormConfig, ParseContext, SystemYear, YearSource};
pub use declare::{field, opt_field, FieldOptions, FieldSpec};
pub use error::FormError;
pub use escape::SqlParam;
pub use field::{Field, FieldKind, FieldState, FieldValue, Presentation};
pub use form::{Form, LAST_PRIORITY};
pub use infer::{infer, InferenceSource, Inferred, KindTag};
pub use source::{ColumnDescriptor, ColumnTable, Submission, Submitted};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_exports_cover_a_round_trip() {
        let mut form = Form::new("smoke");
        form.add_spec(&field("full_name")).unwrap();
        assert!(form.parse_values(&Submission::from_pairs([("full_name", "Ann")]), true));
        assert!(form.is_complete());
        assert_eq!(form.field_text_value("full_name", None).as_deref(), Some("Ann"));
        assert_eq!(SqlParam::from_text("12"), SqlParam::Int(12));
    }
}
