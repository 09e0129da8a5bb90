//! Parameterized SQL statements and the record mutations they express.

use formwork_core::escape::sql_ident;
use formwork_core::SqlParam;

/// Column and typed value; `None` writes the column default.
pub type Assignment = (String, Option<SqlParam>);

/// SQL text with `?` placeholders and the values bound to them, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<SqlParam>,
}

impl Statement {
    /// The statement with every placeholder replaced by its literal.
    /// For logs and dry runs only; execute `sql` with `params`.
    #[must_use]
    pub fn inline(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut params = self.params.iter();
        let mut quoted = false;
        for c in self.sql.chars() {
            match c {
                '`' => {
                    quoted = !quoted;
                    out.push(c);
                }
                '?' if !quoted => match params.next() {
                    Some(param) => out.push_str(&param.to_literal()),
                    None => out.push(c),
                },
                _ => out.push(c),
            }
        }
        out
    }
}

/// A write against one table.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Insert {
        table: String,
        values: Vec<Assignment>,
        /// Columns set to the current time.
        stamps: Vec<String>,
    },
    Update {
        table: String,
        id_column: String,
        id: String,
        values: Vec<Assignment>,
        stamps: Vec<String>,
    },
    Delete {
        table: String,
        id_column: String,
        id: String,
    },
}

impl Mutation {
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::Insert { table, .. } | Self::Update { table, .. } | Self::Delete { table, .. } => {
                table
            }
        }
    }

    /// The parameterized statement for this mutation.
    #[must_use]
    pub fn statement(&self) -> Statement {
        let mut params = Vec::new();
        let sql = match self {
            Self::Insert {
                table,
                values,
                stamps,
            } => {
                let set = set_clause(values, stamps, &mut params);
                if set.is_empty() {
                    format!("INSERT INTO {} () VALUES ()", sql_ident(table))
                } else {
                    format!("INSERT INTO {} SET {set}", sql_ident(table))
                }
            }
            Self::Update {
                table,
                id_column,
                id,
                values,
                stamps,
            } => {
                let mut set = set_clause(values, stamps, &mut params);
                if set.is_empty() {
                    // Nothing to change; keep the statement valid.
                    let id_column = sql_ident(id_column);
                    set = format!("{id_column} = {id_column}");
                }
                params.push(SqlParam::from_text(id));
                format!(
                    "UPDATE {} SET {set} WHERE {} = ?",
                    sql_ident(table),
                    sql_ident(id_column)
                )
            }
            Self::Delete {
                table,
                id_column,
                id,
            } => {
                params.push(SqlParam::from_text(id));
                format!(
                    "DELETE FROM {} WHERE {} = ?",
                    sql_ident(table),
                    sql_ident(id_column)
                )
            }
        };
        Statement { sql, params }
    }
}

fn set_clause(values: &[Assignment], stamps: &[String], params: &mut Vec<SqlParam>) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(values.len() + stamps.len());
    for (column, value) in values {
        match value {
            Some(param) => {
                params.push(param.clone());
                parts.push(format!("{} = ?", sql_ident(column)));
            }
            None => parts.push(format!("{} = DEFAULT", sql_ident(column))),
        }
    }
    parts.extend(stamps.iter().map(|c| format!("{} = NOW()", sql_ident(c))));
    parts.join(", ")
}

/// `SELECT fields FROM table`, narrowed to one record when `id` is given.
#[must_use]
pub fn select(table: &str, fields: &str, id_column: &str, id: Option<&str>) -> Statement {
    let mut sql = format!("SELECT {fields} FROM {}", sql_ident(table));
    let mut params = Vec::new();
    if let Some(id) = id {
        sql.push_str(&format!(" WHERE {} = ?", sql_ident(id_column)));
        params.push(SqlParam::from_text(id));
    }
    Statement { sql, params }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values() -> Vec<Assignment> {
        vec![
            ("name".into(), Some(SqlParam::Text("Ann".into()))),
            ("age".into(), Some(SqlParam::Int(42))),
            ("note".into(), None),
        ]
    }

    #[test]
    fn insert_binds_values_and_stamps_times() {
        let statement = Mutation::Insert {
            table: "people".into(),
            values: values(),
            stamps: vec!["created".into(), "modified".into()],
        }
        .statement();
        assert_eq!(
            statement.sql,
            "INSERT INTO `people` SET `name` = ?, `age` = ?, `note` = DEFAULT, `created` = NOW(), `modified` = NOW()"
        );
        assert_eq!(
            statement.params,
            vec![SqlParam::Text("Ann".into()), SqlParam::Int(42)]
        );
    }

    #[test]
    fn update_and_delete_bind_the_id_last() {
        let update = Mutation::Update {
            table: "people".into(),
            id_column: "id".into(),
            id: "7".into(),
            values: values(),
            stamps: vec![],
        }
        .statement();
        assert_eq!(
            update.sql,
            "UPDATE `people` SET `name` = ?, `age` = ?, `note` = DEFAULT WHERE `id` = ?"
        );
        assert_eq!(update.params.last(), Some(&SqlParam::Int(7)));

        let delete = Mutation::Delete {
            table: "people".into(),
            id_column: "id".into(),
            id: "7".into(),
        }
        .statement();
        assert_eq!(delete.sql, "DELETE FROM `people` WHERE `id` = ?");
        assert_eq!(delete.inline(), "DELETE FROM `people` WHERE `id` = 7");
    }

    #[test]
    fn inline_escapes_text() {
        let statement = Mutation::Insert {
            table: "odd?table".into(),
            values: vec![("name".into(), Some(SqlParam::Text("O'Brien".into())))],
            stamps: vec![],
        }
        .statement();
        assert_eq!(
            statement.inline(),
            "INSERT INTO `odd?table` SET `name` = 'O\\'Brien'"
        );
    }

    #[test]
    fn empty_insert_uses_defaults() {
        let statement = Mutation::Insert {
            table: "t".into(),
            values: vec![],
            stamps: vec![],
        }
        .statement();
        assert_eq!(statement.sql, "INSERT INTO `t` () VALUES ()");
    }

    #[test]
    fn empty_update_stays_valid() {
        let statement = Mutation::Update {
            table: "t".into(),
            id_column: "id".into(),
            id: "3".into(),
            values: vec![],
            stamps: vec![],
        }
        .statement();
        assert_eq!(statement.sql, "UPDATE `t` SET `id` = `id` WHERE `id` = ?");
        assert_eq!(statement.params, vec![SqlParam::Int(3)]);
    }

    #[test]
    fn select_by_id() {
        let statement = select("people", "`name`, `age`", "id", Some("abc"));
        assert_eq!(statement.sql, "SELECT `name`, `age` FROM `people` WHERE `id` = ?");
        assert_eq!(statement.params, vec![SqlParam::Text("abc".into())]);
        assert!(select("people", "*", "id", None).params.is_empty());
    }
}
