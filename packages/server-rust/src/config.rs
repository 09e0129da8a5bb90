//! Configuration for database-backed forms and button handling.

use formwork_core::FormConfig;

/// Table wiring for a [`DatabaseForm`](crate::database::DatabaseForm).
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Form name; defaults to the table name.
    pub name: Option<String>,
    /// URL the form posts to.
    pub action: String,
    pub method: String,
    /// Lay rows out with `<div>`s instead of a table.
    pub usedivs: bool,
    /// Primary key column. Setting it makes the form editable.
    pub idname: Option<String>,
    /// Column stamped with the insert time.
    pub createdname: Option<String>,
    /// Column stamped on every insert and update.
    pub modifiedname: Option<String>,
    /// Applied to every field of the form.
    pub form: FormConfig,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: None,
            action: String::new(),
            method: "post".to_string(),
            usedivs: false,
            idname: None,
            createdname: None,
            modifiedname: None,
            form: FormConfig::default(),
        }
    }
}

impl DatabaseConfig {
    /// Columns never turned into fields: the id and timestamp columns.
    #[must_use]
    pub fn reserved_columns(&self) -> Vec<&str> {
        [&self.idname, &self.createdname, &self.modifiedname]
            .into_iter()
            .filter_map(|c| c.as_deref())
            .collect()
    }
}

/// Button labels and redirect targets for
/// [`DatabaseForm::handle_buttons`](crate::database::DatabaseForm::handle_buttons).
///
/// A button counts as pressed only when its submitted value equals the
/// label. Redirect targets left as `None` fall back to the edit page of the
/// affected record (or the bare action after a delete).
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    pub submit_label: String,
    pub update_label: String,
    pub delete_label: String,
    pub revert_label: String,
    pub on_submit: Option<String>,
    pub on_update: Option<String>,
    pub on_delete: Option<String>,
    pub on_cancel: Option<String>,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            submit_label: "Submit Form".to_string(),
            update_label: "Update Entry".to_string(),
            delete_label: "Delete Entry".to_string(),
            revert_label: "Revert Entry".to_string(),
            on_submit: None,
            on_update: None,
            on_delete: None,
            on_cancel: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_config_defaults() {
        let config = DatabaseConfig::default();
        assert!(config.name.is_none());
        assert_eq!(config.method, "post");
        assert!(!config.usedivs);
        assert!(config.reserved_columns().is_empty());
        assert!(config.form.html5);
    }

    #[test]
    fn reserved_columns_skip_unset_names() {
        let config = DatabaseConfig {
            idname: Some("id".into()),
            modifiedname: Some("modified".into()),
            ..DatabaseConfig::default()
        };
        assert_eq!(config.reserved_columns(), vec!["id", "modified"]);
    }

    #[test]
    fn handler_config_defaults() {
        let config = HandlerConfig::default();
        assert_eq!(config.submit_label, "Submit Form");
        assert_eq!(config.update_label, "Update Entry");
        assert_eq!(config.delete_label, "Delete Entry");
        assert_eq!(config.revert_label, "Revert Entry");
        assert!(config.on_submit.is_none());
        assert!(config.on_cancel.is_none());
    }
}
