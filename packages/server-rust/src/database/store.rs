//! Record persistence seam.
//!
//! [`RecordStore`] is what a [`DatabaseForm`](super::DatabaseForm) writes
//! through. A SQL-backed store executes [`Mutation::statement`]; the
//! [`MemoryStore`] applies the mutation to in-memory rows.

use std::collections::{BTreeMap, HashMap};

use anyhow::Context as _;
use chrono::Utc;
use formwork_core::SqlParam;

use super::statement::Mutation;

/// One stored record: column name to value. Columns left at their default
/// are absent.
pub type Row = BTreeMap<String, SqlParam>;

/// Persistence for form records.
pub trait RecordStore {
    /// Applies `mutation` and returns the id of the affected record (the
    /// new id for an insert), or `None` if no record matched.
    fn apply(&mut self, mutation: &Mutation) -> anyhow::Result<Option<String>>;

    /// Loads one record by id.
    fn fetch(&self, table: &str, id_column: &str, id: &str) -> anyhow::Result<Option<Row>>;
}

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, Row>,
}

/// In-memory [`RecordStore`] with auto-increment ids per table.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: HashMap<String, MemoryTable>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in `table`.
    #[must_use]
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |t| t.rows.len())
    }

    #[must_use]
    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }

    /// Record `id` of `table`, without the id column.
    #[must_use]
    pub fn row(&self, table: &str, id: i64) -> Option<&Row> {
        self.tables.get(table)?.rows.get(&id)
    }
}

fn parse_id(id: &str) -> anyhow::Result<i64> {
    id.trim()
        .parse()
        .with_context(|| format!("record id {id:?} is not an integer"))
}

fn write(row: &mut Row, values: &[(String, Option<SqlParam>)], stamps: &[String]) {
    for (column, value) in values {
        match value {
            Some(param) => {
                row.insert(column.clone(), param.clone());
            }
            None => {
                row.remove(column);
            }
        }
    }
    let now = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    for column in stamps {
        row.insert(column.clone(), SqlParam::Text(now.clone()));
    }
}

impl RecordStore for MemoryStore {
    fn apply(&mut self, mutation: &Mutation) -> anyhow::Result<Option<String>> {
        let table = self.tables.entry(mutation.table().to_string()).or_default();
        match mutation {
            Mutation::Insert { values, stamps, .. } => {
                table.last_id += 1;
                let mut row = Row::new();
                write(&mut row, values, stamps);
                table.rows.insert(table.last_id, row);
                Ok(Some(table.last_id.to_string()))
            }
            Mutation::Update {
                id, values, stamps, ..
            } => {
                let key = parse_id(id)?;
                Ok(table.rows.get_mut(&key).map(|row| {
                    write(row, values, stamps);
                    key.to_string()
                }))
            }
            Mutation::Delete { id, .. } => {
                let key = parse_id(id)?;
                Ok(table.rows.remove(&key).map(|_| key.to_string()))
            }
        }
    }

    fn fetch(&self, table: &str, id_column: &str, id: &str) -> anyhow::Result<Option<Row>> {
        let key = parse_id(id)?;
        let Some(row) = self.tables.get(table).and_then(|t| t.rows.get(&key)) else {
            return Ok(None);
        };
        let mut row = row.clone();
        row.insert(id_column.to_string(), SqlParam::Int(key));
        Ok(Some(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert(store: &mut MemoryStore, name: &str) -> String {
        store
            .apply(&Mutation::Insert {
                table: "people".into(),
                values: vec![("name".into(), Some(SqlParam::Text(name.into())))],
                stamps: vec!["created".into()],
            })
            .unwrap()
            .unwrap()
    }

    #[test]
    fn ids_auto_increment() {
        let mut store = MemoryStore::new();
        assert_eq!(insert(&mut store, "Ann"), "1");
        assert_eq!(insert(&mut store, "Bob"), "2");
        assert_eq!(store.len("people"), 2);
        assert!(store.is_empty("pets"));
        assert!(store.row("people", 1).unwrap().contains_key("created"));
    }

    #[test]
    fn update_merges_and_defaults() {
        let mut store = MemoryStore::new();
        let id = insert(&mut store, "Ann");
        let updated = store
            .apply(&Mutation::Update {
                table: "people".into(),
                id_column: "id".into(),
                id: id.clone(),
                values: vec![
                    ("name".into(), None),
                    ("age".into(), Some(SqlParam::Int(40))),
                ],
                stamps: vec![],
            })
            .unwrap();
        assert_eq!(updated.as_deref(), Some("1"));
        let row = store.fetch("people", "id", &id).unwrap().unwrap();
        assert!(!row.contains_key("name"));
        assert_eq!(row.get("age"), Some(&SqlParam::Int(40)));
        assert_eq!(row.get("id"), Some(&SqlParam::Int(1)));
    }

    #[test]
    fn missing_records_are_none() {
        let mut store = MemoryStore::new();
        let deleted = store
            .apply(&Mutation::Delete {
                table: "people".into(),
                id_column: "id".into(),
                id: "9".into(),
            })
            .unwrap();
        assert!(deleted.is_none());
        assert!(store.fetch("people", "id", "9").unwrap().is_none());
    }

    #[test]
    fn non_numeric_ids_are_errors() {
        let store = MemoryStore::new();
        let err = store.fetch("people", "id", "abc").unwrap_err();
        assert!(err.to_string().contains("not an integer"));
    }
}
