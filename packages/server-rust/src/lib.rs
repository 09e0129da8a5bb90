//! formwork server glue: decodes requests, guards posts with process
//! tokens, and persists database-backed forms through a record store.

pub mod config;
pub mod context;
pub mod database;
pub mod definition;
pub mod error;
pub mod handler;
pub mod session;
pub mod submission;

pub use config::{DatabaseConfig, HandlerConfig};
pub use context::{Method, RequestContext};
pub use database::{DatabaseForm, MemoryStore, Mutation, RecordStore, Statement};
pub use definition::{FormDefinition, SectionDefinition};
pub use error::ServerError;
pub use handler::Outcome;
pub use session::ProcessToken;

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn root_exports_cover_a_request() {
        let json = r#"{"name": "smoke", "fields": [{"name": "full_name"}]}"#;
        let definition = FormDefinition::from_json(json).unwrap();
        let mut form = definition.into_form(formwork_core::FormConfig::default()).unwrap();
        let ctx = RequestContext::post("", "full_name=Ann", BTreeMap::new());
        assert_eq!(ctx.method, Method::Post);
        assert!(form.parse_values(&ctx.body, true));
        assert_eq!(HandlerConfig::default().submit_label, "Submit Form");
    }
}
