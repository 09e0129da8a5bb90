//! Forms backed by a database table.
//!
//! A [`DatabaseForm`] owns a [`Form`] built against the table's columns and
//! enum lookups, and turns parsed values into [`Mutation`]s for a
//! [`RecordStore`]. Setting an id column makes the form editable: a record
//! id arriving in the query (or posted back) selects the record to load,
//! update, or delete.

mod statement;
mod store;

pub use statement::{select, Assignment, Mutation, Statement};
pub use store::{MemoryStore, RecordStore, Row};

use std::collections::{BTreeMap, HashMap};

use formwork_core::escape::html_escape;
use formwork_core::{Choices, ColumnTable, Form, Submission};
use tracing::{debug, info};

use crate::config::{DatabaseConfig, HandlerConfig};
use crate::context::RequestContext;
use crate::error::ServerError;
use crate::session::ProcessToken;

/// Turns an enum lookup (description → stored index) into choices keyed by
/// index. A `None` index means "no choice" and is dropped.
pub fn invert_lookup<'a>(lookup: impl IntoIterator<Item = (&'a str, Option<i64>)>) -> Choices {
    let mut choices = Choices::new();
    for (description, index) in lookup {
        if let Some(index) = index {
            choices.insert(index, description);
        }
    }
    choices
}

/// A form whose records live in one table.
#[derive(Debug, Clone)]
pub struct DatabaseForm {
    form: Form,
    table: String,
    config: DatabaseConfig,
    record_id: Option<String>,
}

impl DatabaseForm {
    /// A form over `table`. `lookups` maps a column to its enum lookup,
    /// as for [`invert_lookup`].
    #[must_use]
    pub fn new(
        table: impl Into<String>,
        columns: ColumnTable,
        lookups: &HashMap<String, Vec<(String, Option<i64>)>>,
        config: DatabaseConfig,
    ) -> Self {
        let table = table.into();
        let name = config.name.clone().unwrap_or_else(|| table.clone());
        let mut form = Form::new(name)
            .with_action(config.action.clone())
            .with_method(config.method.clone())
            .with_divs(config.usedivs)
            .with_config(config.form.clone())
            .with_columns(columns);
        for (column, lookup) in lookups {
            form.add_choices(
                column.clone(),
                invert_lookup(lookup.iter().map(|(d, i)| (d.as_str(), *i))),
            );
        }
        Self {
            form,
            table,
            config,
            record_id: None,
        }
    }

    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut Form {
        &mut self.form
    }

    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    #[must_use]
    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.config.idname.is_some()
    }

    /// Record selected by the last [`DatabaseForm::initialize`].
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Adds fields for the table's columns, skipping the id and timestamp
    /// columns. See [`Form::auto_add_fields`].
    ///
    /// # Errors
    ///
    /// Returns the first error from building a field.
    pub fn auto_add_fields(
        &mut self,
        include: Option<&[&str]>,
        omit: &[&str],
    ) -> Result<usize, ServerError> {
        let reserved = self.config.reserved_columns();
        Ok(self.form.auto_add_fields(include, omit, &reserved)?)
    }

    /// Picks up the record id of an editable form: from the query if
    /// present, otherwise from the posted body.
    pub fn initialize(&mut self, ctx: &RequestContext) {
        self.record_id = self.config.idname.as_deref().and_then(|idname| {
            ctx.queried(idname)
                .or_else(|| ctx.posted(idname))
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
        });
        debug!(table = %self.table, record = ?self.record_id, "initialized form");
    }

    fn id_column(&self) -> Result<&str, ServerError> {
        self.config
            .idname
            .as_deref()
            .ok_or_else(|| ServerError::NotEditable {
                table: self.table.clone(),
            })
    }

    /// Id of the record to change: the selected record, else the value of
    /// the id field.
    fn target_id(&self, operation: &'static str) -> Result<(String, String), ServerError> {
        let id_column = self.id_column()?;
        let id = self
            .record_id
            .clone()
            .or_else(|| self.form.field_text_value(id_column, None))
            .ok_or(ServerError::MissingRecordId { operation })?;
        Ok((id_column.to_string(), id))
    }

    /// Inserts the parsed values, stamping both timestamp columns.
    #[must_use]
    pub fn insert_mutation(&self) -> Mutation {
        let stamps = [&self.config.createdname, &self.config.modifiedname]
            .into_iter()
            .flatten()
            .cloned()
            .collect();
        Mutation::Insert {
            table: self.table.clone(),
            values: self.form.sql_assignments(None),
            stamps,
        }
    }

    /// Updates the target record, stamping the modified column.
    ///
    /// # Errors
    ///
    /// Fails if the form is not editable or no record is targeted.
    pub fn update_mutation(&self) -> Result<Mutation, ServerError> {
        let (id_column, id) = self.target_id("update")?;
        Ok(Mutation::Update {
            table: self.table.clone(),
            id_column,
            id,
            values: self.form.sql_assignments(None),
            stamps: self.config.modifiedname.iter().cloned().collect(),
        })
    }

    /// # Errors
    ///
    /// Fails if the form is not editable or no record is targeted.
    pub fn delete_mutation(&self) -> Result<Mutation, ServerError> {
        let (id_column, id) = self.target_id("delete")?;
        Ok(Mutation::Delete {
            table: self.table.clone(),
            id_column,
            id,
        })
    }

    /// `SELECT` of every field's column, for record `id` if given.
    ///
    /// # Errors
    ///
    /// Fails if `id` is given but the form has no id column.
    pub fn select_statement(&self, id: Option<&str>) -> Result<Statement, ServerError> {
        let fields = self.form.sql_fields(None);
        match id {
            Some(id) => Ok(select(&self.table, &fields, self.id_column()?, Some(id))),
            None => Ok(select(&self.table, &fields, "", None)),
        }
    }

    /// Stores a new record; returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`] if the store fails.
    pub fn insert(&self, store: &mut dyn RecordStore) -> Result<Option<String>, ServerError> {
        let id = store
            .apply(&self.insert_mutation())
            .map_err(ServerError::Store)?;
        info!(table = %self.table, id = ?id, "inserted record");
        Ok(id)
    }

    /// Rewrites the target record; returns its id, or `None` if it is gone.
    ///
    /// # Errors
    ///
    /// Fails without a target record or if the store fails.
    pub fn update(&self, store: &mut dyn RecordStore) -> Result<Option<String>, ServerError> {
        let id = store
            .apply(&self.update_mutation()?)
            .map_err(ServerError::Store)?;
        info!(table = %self.table, id = ?id, "updated record");
        Ok(id)
    }

    /// Deletes the target record; returns its id, or `None` if it is gone.
    ///
    /// # Errors
    ///
    /// Fails without a target record or if the store fails.
    pub fn delete(&self, store: &mut dyn RecordStore) -> Result<Option<String>, ServerError> {
        let id = store
            .apply(&self.delete_mutation()?)
            .map_err(ServerError::Store)?;
        info!(table = %self.table, id = ?id, "deleted record");
        Ok(id)
    }

    /// Replaces the form's values with record `id`. Returns whether the
    /// record exists.
    ///
    /// # Errors
    ///
    /// Fails if the form is not editable or the store fails.
    pub fn load(&mut self, store: &dyn RecordStore, id: &str) -> Result<bool, ServerError> {
        let id_column = self.id_column()?.to_string();
        let Some(row) = store
            .fetch(&self.table, &id_column, id)
            .map_err(ServerError::Store)?
        else {
            return Ok(false);
        };
        let mut source = Submission::new();
        for (column, value) in &row {
            if let Some(text) = value.to_submitted_text() {
                source.insert(column.clone(), text);
            }
        }
        self.form.reset();
        let complete = self.form.parse_values(&source, false);
        debug!(table = %self.table, id, complete, "loaded record");
        Ok(true)
    }

    /// The form HTML with a freshly issued process token. A form showing a
    /// stored record gets update, revert and delete buttons and carries the
    /// record id.
    pub fn html_form(
        &self,
        session: &mut BTreeMap<String, String>,
        labels: &HandlerConfig,
    ) -> String {
        let token = ProcessToken::issue(session);
        let buttons = match (&self.config.idname, &self.record_id) {
            (Some(idname), Some(id)) => format!(
                "<input type=\"submit\" name=\"updateButton\" value=\"{update}\">&nbsp;&nbsp;\n      <input type=\"submit\" name=\"cancelButton\" value=\"{revert}\">&nbsp;&nbsp;\n      <input class=\"submit\" onclick=\"return confirm('Are you sure you want to delete this entry?')\" type=\"submit\" name=\"deleteButton\" value=\"{delete}\">\n      <input type=\"hidden\" id=\"{idname}\" name=\"{idname}\" value=\"{id}\">",
                update = html_escape(&labels.update_label),
                revert = html_escape(&labels.revert_label),
                delete = html_escape(&labels.delete_label),
                id = html_escape(id),
            ),
            _ => format!(
                "<input type=\"submit\" name=\"submitButton\" value=\"{}\">&nbsp;&nbsp;&nbsp;<input type=\"reset\" value=\"Reset Form\">",
                html_escape(&labels.submit_label)
            ),
        };
        self.form.html_form(token.as_str(), Some(&buttons))
    }
}
