//! Button handling for database-backed forms.
//!
//! [`DatabaseForm::handle_buttons`] decides what a request means (a fresh
//! submission, an edit, a delete, a revert, or a plain page view) and
//! reports it as an [`Outcome`]. Sending the redirect is left to the caller.

use tracing::debug;

use crate::config::HandlerConfig;
use crate::context::{Method, RequestContext};
use crate::database::{DatabaseForm, RecordStore};
use crate::error::ServerError;
use crate::session::is_valid_post;
use crate::submission::with_query;

/// Result of handling one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Show the form again, with any errors from parsing.
    Redisplay,
    /// A stored record was loaded into the form for editing.
    Loaded(String),
    /// A record was created. Without a redirect, show an acknowledgement.
    Inserted { id: String, redirect: Option<String> },
    Updated { id: String, redirect: String },
    Deleted { id: String, redirect: String },
    /// Edits were abandoned.
    Reverted { redirect: String },
}

impl Outcome {
    /// Location to send the client to, if any.
    #[must_use]
    pub fn redirect(&self) -> Option<&str> {
        match self {
            Self::Redisplay | Self::Loaded(_) => None,
            Self::Inserted { redirect, .. } => redirect.as_deref(),
            Self::Updated { redirect, .. }
            | Self::Deleted { redirect, .. }
            | Self::Reverted { redirect } => Some(redirect),
        }
    }
}

fn pressed(ctx: &RequestContext, button: &str, label: &str) -> bool {
    ctx.posted(button) == Some(label)
}

impl DatabaseForm {
    fn edit_location(&self, id: &str) -> String {
        let idname = self.config().idname.as_deref().unwrap_or_default();
        with_query(self.form().action(), idname, id)
    }

    /// Handles the request in `ctx`.
    ///
    /// A post counts only if it echoes the session's process token; the
    /// values are then parsed, and validated if a submit, update or delete
    /// button was pressed. Update, delete and revert need an editable
    /// form. A GET naming the selected record loads it. Call
    /// [`DatabaseForm::initialize`] first.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Store`] if the store fails, or
    /// [`ServerError::MissingRecordId`] for an update or delete with no
    /// record to act on.
    pub fn handle_buttons(
        &mut self,
        ctx: &RequestContext,
        store: &mut dyn RecordStore,
        config: &HandlerConfig,
    ) -> Result<Outcome, ServerError> {
        let editable = self.is_editable();
        if ctx.method == Method::Post && is_valid_post(ctx) {
            let submit = pressed(ctx, "submitButton", &config.submit_label);
            let delete = editable && pressed(ctx, "deleteButton", &config.delete_label);
            let update = editable && pressed(ctx, "updateButton", &config.update_label);
            let valid = self
                .form_mut()
                .parse_values(&ctx.body, submit || delete || update);
            debug!(table = %self.table(), submit, update, delete, valid, "handling post");

            if editable && pressed(ctx, "cancelButton", &config.revert_label) {
                let id = self.record_id().unwrap_or_default();
                let redirect = config
                    .on_cancel
                    .clone()
                    .unwrap_or_else(|| self.edit_location(id));
                return Ok(Outcome::Reverted { redirect });
            }
            if !valid {
                return Ok(Outcome::Redisplay);
            }
            if submit {
                let Some(id) = self.insert(store)? else {
                    return Ok(Outcome::Redisplay);
                };
                let redirect = config
                    .on_submit
                    .clone()
                    .or_else(|| editable.then(|| self.edit_location(&id)));
                return Ok(Outcome::Inserted { id, redirect });
            }
            if delete {
                if let Some(id) = self.delete(store)? {
                    let redirect = config.on_delete.clone().unwrap_or_else(|| {
                        let action = self.form().action();
                        action.split_once('?').map_or(action, |(base, _)| base).to_string()
                    });
                    return Ok(Outcome::Deleted { id, redirect });
                }
            } else if update {
                if let Some(id) = self.update(store)? {
                    let redirect = config
                        .on_update
                        .clone()
                        .unwrap_or_else(|| self.edit_location(&id));
                    return Ok(Outcome::Updated { id, redirect });
                }
            }
            return Ok(Outcome::Redisplay);
        }

        if ctx.method == Method::Get && editable {
            let idname = self.config().idname.clone().unwrap_or_default();
            if let Some(id) = self.record_id().map(str::to_string) {
                if ctx.queried(&idname).map(str::trim) == Some(id.as_str())
                    && self.load(&*store, &id)?
                {
                    return Ok(Outcome::Loaded(id));
                }
            }
        }
        Ok(Outcome::Redisplay)
    }
}
