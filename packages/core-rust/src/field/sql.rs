//! SQL emission: legacy literals, typed parameters, and column DDL.

use super::{Field, FieldKind, FieldValue};
use crate::choice::{ChoiceKey, Choices};
use crate::escape::{sql_ident, sql_literal, sql_quote, SqlParam};

fn enum_members(choices: &Choices) -> String {
    choices
        .iter()
        .map(|(_, c)| sql_literal(c.presentation()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn key_param(key: &ChoiceKey) -> SqlParam {
    match key {
        ChoiceKey::Int(i) => SqlParam::Int(*i),
        ChoiceKey::Str(s) => SqlParam::Text(s.clone()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn number_type(min: Option<f64>, max: Option<f64>) -> String {
    let mut bound = max.unwrap_or(0.0);
    if let Some(min) = min {
        if min < 0.0 && -min > bound {
            bound = -min;
        }
    }
    let base = if bound > 0.0 && bound < 128.0 {
        "TINYINT"
    } else if bound > 2_147_483_647.0 {
        "DECIMAL"
    } else {
        "INT"
    };
    let digits = bound.log10().ceil();
    if bound > 0.0 && digits >= 1.0 {
        format!("{base}({})", digits as i64)
    } else {
        base.to_string()
    }
}

impl Field {
    /// Typed parameter for the stored value; `None` means `DEFAULT`.
    ///
    /// Composites have no single column; see [`Field::sql_assignments`].
    #[must_use]
    pub fn sql_param(&self) -> Option<SqlParam> {
        let value = self.value()?;
        match (&self.kind, value) {
            (FieldKind::Composite(_), _) | (_, FieldValue::Composite(_)) => None,
            (FieldKind::Number(_) | FieldKind::Year, FieldValue::Text(s)) => {
                Some(SqlParam::from_text(s))
            }
            (_, FieldValue::Text(s)) => Some(SqlParam::Text(s.clone())),
            (FieldKind::TimeMenu { range, .. }, FieldValue::Key(key)) => {
                let index = usize::try_from(key.as_int()?).ok()?;
                range.time_at(index).map(SqlParam::Text)
            }
            (_, FieldValue::Key(key)) => Some(key_param(key)),
            (kind, FieldValue::Keys(keys)) => {
                let choices = kind.choices()?;
                if choices.is_numeric_domain() {
                    #[allow(clippy::cast_possible_wrap)]
                    let mask = choices.pack(keys) as i64;
                    Some(SqlParam::Int(mask))
                } else {
                    let joined = keys
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(",");
                    Some(SqlParam::Text(joined))
                }
            }
            (_, FieldValue::Bool(b)) => Some(SqlParam::Int(i64::from(*b))),
        }
    }

    /// `(column, parameter)` pairs this field writes, sub-fields included.
    #[must_use]
    pub fn sql_assignments(&self) -> Vec<(String, Option<SqlParam>)> {
        match &self.kind {
            FieldKind::Composite(composite) => composite
                .fields()
                .flat_map(|(_, sub)| sub.sql_assignments())
                .collect(),
            _ => vec![(self.id.clone(), self.sql_param())],
        }
    }

    /// Legacy SQL literal for the value, or `DEFAULT` when there is none.
    ///
    /// Numbers are left bare, ZIP codes are always quoted.
    #[must_use]
    pub fn sql_value(&self) -> String {
        if let FieldKind::Composite(composite) = &self.kind {
            return composite
                .fields()
                .map(|(_, sub)| sub.sql_value())
                .collect::<Vec<_>>()
                .join(", ");
        }
        let Some(param) = self.sql_param() else {
            return "DEFAULT".to_string();
        };
        match (&self.kind, param) {
            (FieldKind::Zip, SqlParam::Text(s)) => sql_quote(&s),
            (FieldKind::Multiple { .. } | FieldKind::TimeMenu { .. }, SqlParam::Text(s)) => {
                sql_quote(&s)
            }
            (_, SqlParam::Text(s)) => sql_literal(&s),
            (_, param) => param.to_literal(),
        }
    }

    /// Column read expression. Enums with numeric keys are read back as
    /// numbers with `+0`.
    #[must_use]
    pub fn sql_field(&self) -> String {
        match &self.kind {
            FieldKind::Composite(composite) => composite
                .fields()
                .map(|(_, sub)| sub.sql_field())
                .collect::<Vec<_>>()
                .join(", "),
            FieldKind::Single { choices, .. } | FieldKind::Multiple { choices, .. }
                if choices.first_key_is_numeric() =>
            {
                let ident = sql_ident(&self.id);
                format!("{ident}+0 AS {ident}")
            }
            _ => sql_ident(&self.id),
        }
    }

    /// DDL column type; `None` for composites, whose columns belong to
    /// their sub-fields.
    #[must_use]
    pub fn sql_type(&self) -> Option<String> {
        let ty = match &self.kind {
            FieldKind::Composite(_) => return None,
            FieldKind::TextArea => {
                let max = self.maxlength.unwrap_or(255);
                if max < 256 {
                    format!("VARCHAR({max})")
                } else {
                    "TEXT".to_string()
                }
            }
            FieldKind::Number(range) => number_type(range.min, range.max),
            FieldKind::Year => "YEAR".to_string(),
            FieldKind::Date | FieldKind::Birthdate => "DATE".to_string(),
            FieldKind::Daytime => "DATETIME".to_string(),
            FieldKind::Single { choices, .. } => format!("ENUM({})", enum_members(choices)),
            FieldKind::Multiple { choices, .. } => format!("SET({})", enum_members(choices)),
            FieldKind::Boolean => "TINYINT(1)".to_string(),
            FieldKind::TimeMenu { .. } => "TIME".to_string(),
            _ => format!("VARCHAR({})", self.maxlength().unwrap_or(63)),
        };
        Some(ty)
    }

    /// Column definition for `CREATE TABLE`.
    #[must_use]
    pub fn sql_table_column(&self) -> String {
        if let FieldKind::Composite(composite) = &self.kind {
            return composite
                .fields()
                .map(|(_, sub)| sub.sql_table_column())
                .collect::<Vec<_>>()
                .join(",\n  ");
        }
        let name = sql_ident(&self.id);
        let ty = self.sql_type().unwrap_or_default();
        if self.required {
            format!("{name} {ty} NOT NULL")
        } else if let Some(default) = self.default.as_deref() {
            format!("{name} {ty} NOT NULL DEFAULT {}", sql_literal(default))
        } else {
            format!("{name} {ty} NULL DEFAULT NULL")
        }
    }

    /// `` `id` = value `` assignment(s).
    #[must_use]
    pub fn sql_form(&self) -> String {
        match &self.kind {
            FieldKind::Composite(composite) => composite
                .fields()
                .map(|(_, sub)| sub.sql_form())
                .collect::<Vec<_>>()
                .join(", "),
            _ => format!("{} = {}", sql_ident(&self.id), self.sql_value()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseContext;
    use crate::field::{NumberRange, TimeRange};
    use crate::source::{Submission, Submitted};

    fn parsed(mut field: Field, raw: impl Into<Submitted>) -> Field {
        let mut source = Submission::new();
        source.insert(field.input().to_string(), raw);
        field.parse_value(&source, &ParseContext::default());
        field
    }

    #[test]
    fn missing_value_is_default() {
        let field = parsed(Field::new("note", FieldKind::Text).optional(), "");
        assert_eq!(field.sql_value(), "DEFAULT");
        assert_eq!(field.sql_param(), None);
        assert_eq!(field.sql_form(), "`note` = DEFAULT");
    }

    #[test]
    fn literals_quote_text_and_zip() {
        let name = parsed(Field::new("name", FieldKind::Text), "O'Brien");
        assert_eq!(name.sql_value(), "'O\\'Brien'");
        let zip = parsed(Field::new("zip", FieldKind::Zip), "02138");
        assert_eq!(zip.sql_value(), "'02138'");
        let age = parsed(Field::new("age", FieldKind::Number(NumberRange::default())), "42");
        assert_eq!(age.sql_value(), "42");
        assert_eq!(age.sql_param(), Some(SqlParam::Int(42)));
    }

    #[test]
    fn multiple_choice_packs_numeric_keys() {
        let choices = Choices::from_pairs([(1, "Cats"), (2, "Dogs"), (3, "Fish")]);
        let field = parsed(
            Field::new("pets", FieldKind::checkbox(choices)),
            Submitted::List(vec!["1".into(), "3".into()]),
        );
        assert_eq!(field.sql_value(), "5");
        assert_eq!(field.sql_field(), "`pets`+0 AS `pets`");

        let named = Choices::from_labels(["red", "blue"]);
        let field = parsed(
            Field::new("colors", FieldKind::checkbox(named)),
            Submitted::List(vec!["red".into(), "blue".into()]),
        );
        assert_eq!(field.sql_value(), "'red,blue'");
        assert_eq!(field.sql_field(), "`colors`");
        assert_eq!(field.sql_type().as_deref(), Some("SET('red', 'blue')"));
    }

    #[test]
    fn time_menu_stores_clock_time() {
        let kind = FieldKind::time_menu("start", TimeRange::new(5.0, 22.0, 0.25)).unwrap();
        let field = parsed(Field::new("start", kind), "5");
        assert_eq!(field.sql_value(), "'06:15'");
        assert_eq!(field.sql_type().as_deref(), Some("TIME"));
    }

    #[test]
    fn booleans_store_bits() {
        let field = parsed(Field::new("ok", FieldKind::Boolean), "on");
        assert_eq!(field.sql_value(), "1");
        assert_eq!(field.sql_type().as_deref(), Some("TINYINT(1)"));
    }

    #[test]
    fn column_types() {
        let number = |min, max| {
            Field::new("n", FieldKind::Number(NumberRange { min, max, step: None }))
                .sql_type()
                .unwrap()
        };
        assert_eq!(number(Some(0.0), Some(100.0)), "TINYINT(2)");
        assert_eq!(number(Some(-5000.0), Some(10.0)), "INT(4)");
        assert_eq!(number(None, Some(1.0e10)), "DECIMAL(10)");
        assert_eq!(number(None, None), "INT");
        assert_eq!(
            Field::new("bio", FieldKind::TextArea).sql_type().as_deref(),
            Some("VARCHAR(255)")
        );
        assert_eq!(
            Field::new("bio", FieldKind::TextArea).with_maxlength(4000).sql_type().as_deref(),
            Some("TEXT")
        );
        assert_eq!(
            Field::new("state", FieldKind::State).sql_type().as_deref(),
            Some("VARCHAR(2)")
        );
        assert_eq!(
            Field::new("size", FieldKind::radio(Choices::from_pairs([(1, "S"), (2, "M")])))
                .sql_type()
                .as_deref(),
            Some("ENUM('S', 'M')")
        );
    }

    #[test]
    fn table_columns() {
        assert_eq!(
            Field::new("email", FieldKind::Email).sql_table_column(),
            "`email` VARCHAR(254) NOT NULL"
        );
        assert_eq!(
            Field::new("note", FieldKind::Text).optional().sql_table_column(),
            "`note` VARCHAR(63) NULL DEFAULT NULL"
        );
        assert_eq!(
            Field::new("count", FieldKind::Number(NumberRange::default()))
                .optional()
                .with_default("0")
                .sql_table_column(),
            "`count` INT NOT NULL DEFAULT 0"
        );
    }
}
