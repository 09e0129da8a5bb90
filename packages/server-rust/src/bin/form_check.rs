//! form-check
//!
//! Runs a urlencoded submission through a JSON form definition and prints
//! the result.
//!
//! # Usage
//!
//! ```bash
//! form-check --definition signup.json --submission 'full_name=Ann&size=2'
//! form-check --definition signup.json --submission-file body.txt --output sql
//! FORMWORK_ISO_DATES=true form-check -d signup.json -s 'born=3/5/14' -o json
//! ```

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use formwork_core::{Form, FormConfig};
use formwork_server::submission::decode;
use formwork_server::{FormDefinition, ProcessToken};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Output {
    /// Error messages, one per line
    Errors,
    /// Every field as "Label: value"
    Text,
    /// Fields with values, labelled by id
    Brief,
    /// Column assignments
    Sql,
    /// CREATE TABLE statement
    Table,
    /// The form as HTML
    Html,
    /// Machine-readable report
    Json,
}

#[derive(Parser)]
#[command(name = "form-check")]
#[command(version)]
#[command(about = "Validate a submission against a form definition", long_about = None)]
struct Cli {
    /// JSON form definition
    #[arg(long, short, env = "FORMWORK_DEFINITION")]
    definition: PathBuf,

    /// Urlencoded submission, e.g. 'name=Ann&pets[]=1'
    #[arg(long, short, conflicts_with = "submission_file")]
    submission: Option<String>,

    /// File holding the urlencoded submission
    #[arg(long)]
    submission_file: Option<PathBuf>,

    /// What to print
    #[arg(long, short, value_enum, default_value = "errors")]
    output: Output,

    /// Present dates and times in ISO form
    #[arg(long, env = "FORMWORK_ISO_DATES")]
    iso_dates: bool,

    /// Emit plain HTML4 inputs
    #[arg(long, env = "FORMWORK_NO_HTML5")]
    no_html5: bool,

    /// Pin the century for 2-digit years (e.g. 19)
    #[arg(long, env = "FORMWORK_CENTURY")]
    century: Option<i32>,

    /// Parse without validating
    #[arg(long)]
    no_validate: bool,
}

impl Cli {
    fn form_config(&self) -> FormConfig {
        FormConfig {
            iso_dates: self.iso_dates,
            html5: !self.no_html5,
            century: self.century,
        }
    }

    fn submission(&self) -> anyhow::Result<String> {
        if let Some(path) = &self.submission_file {
            let body = fs::read_to_string(path)
                .with_context(|| format!("reading submission {}", path.display()))?;
            return Ok(body.trim_end().to_string());
        }
        Ok(self.submission.clone().unwrap_or_default())
    }
}

fn report(form: &Form, output: Output) -> anyhow::Result<String> {
    let text = match output {
        Output::Errors => form.errors().join("\n"),
        Output::Text => form.text_form(false, None),
        Output::Brief => form.text_form(true, None),
        Output::Sql => form.sql_form(None),
        Output::Table => form.sql_table(None),
        Output::Html => form.html_form(ProcessToken::generate().as_str(), None),
        Output::Json => {
            let values: serde_json::Map<String, serde_json::Value> = form
                .fields()
                .filter(|f| f.has_value())
                .map(|f| (f.id().to_string(), json!(f.text_value())))
                .collect();
            let report = json!({
                "form": form.name(),
                "complete": form.is_complete(),
                "errors": form.errors(),
                "values": values,
                "assignments": form.sql_assignments(None),
            });
            serde_json::to_string_pretty(&report).context("encoding report")?
        }
    };
    Ok(text)
}

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let json = fs::read_to_string(&cli.definition)
        .with_context(|| format!("reading definition {}", cli.definition.display()))?;
    let definition = FormDefinition::from_json(&json)
        .with_context(|| format!("parsing definition {}", cli.definition.display()))?;
    let mut form = definition
        .into_form(cli.form_config())
        .context("building form")?;

    let source = decode(&cli.submission()?);
    debug!(form = %form.name(), inputs = source.len(), "checking submission");
    let complete = form.parse_values(&source, !cli.no_validate);

    let text = report(&form, cli.output)?;
    if !text.is_empty() {
        println!("{text}");
    }
    Ok(complete)
}

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    if run(&cli)? {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
