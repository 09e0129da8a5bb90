//! Forms: ordered fields grouped into sections, the priority-tiered parse
//! pipeline, and whole-form SQL, text and HTML output.

use std::collections::{BTreeMap, HashMap};
use std::fmt::Write as _;

use tracing::{debug, warn};

use crate::choice::{ChoiceItem, Choices};
use crate::config::{FormConfig, ParseContext, SystemYear, YearSource};
use crate::declare::{field as field_spec, FieldSpec};
use crate::error::FormError;
use crate::escape::{sql_ident, SqlParam};
use crate::field::{Field, FieldKind, FieldValue, Presentation};
use crate::source::{ColumnTable, Submission};

/// Priority for fields that must be checked only once everything else
/// passes (a CAPTCHA, say).
pub const LAST_PRIORITY: i64 = i64::MAX;

const DEFAULT_BUTTONS: &str = "<input type=\"submit\" name=\"submitButton\" value=\"Submit Form\">&nbsp;&nbsp;&nbsp;<input type=\"reset\" value=\"Reset Form\">";

#[derive(Debug, Clone)]
enum Entry {
    Field(Field),
    /// Literal HTML inserted between rows (section headers and footers).
    Markup(String),
}

/// A form definition plus the state of one request against it.
#[derive(Debug, Clone)]
pub struct Form {
    name: String,
    action: String,
    method: String,
    usedivs: bool,
    config: FormConfig,
    columns: Option<ColumnTable>,
    enums: HashMap<String, Choices>,
    entries: Vec<Entry>,
    /// Entry indices in form order.
    order: Vec<usize>,
    /// Finished sections and the entries they hold.
    sections: Vec<(String, Vec<usize>)>,
    section_name: String,
    /// Entries before this index already belong to a finished section.
    last: usize,
    errors: Vec<String>,
    complete: bool,
}

impl Form {
    /// A form whose first section is named after the form.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            section_name: name.clone(),
            name,
            action: String::new(),
            method: "post".to_string(),
            usedivs: false,
            config: FormConfig::default(),
            columns: None,
            enums: HashMap::new(),
            entries: Vec::new(),
            order: Vec::new(),
            sections: Vec::new(),
            last: 0,
            errors: Vec::new(),
            complete: false,
        }
    }

    #[must_use]
    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = action.into();
        self
    }

    #[must_use]
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Lay rows out with `<div>`s instead of a table.
    #[must_use]
    pub fn with_divs(mut self, usedivs: bool) -> Self {
        self.usedivs = usedivs;
        self
    }

    /// Configuration applied to fields as they are added.
    #[must_use]
    pub fn with_config(mut self, config: FormConfig) -> Self {
        self.config = config;
        self
    }

    /// Column descriptors consulted as fields are added.
    #[must_use]
    pub fn with_columns(mut self, columns: ColumnTable) -> Self {
        self.columns = Some(columns);
        self
    }

    /// Registers the choice table for fields named `name` added from now on.
    pub fn add_choices(&mut self, name: impl Into<String>, choices: Choices) {
        self.enums.insert(name.into(), choices);
    }

    // --- assembly ---

    /// Adds a field, binding it to this form's columns and choices.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::DuplicateField`] if the id is taken, or the
    /// error from [`Field::bind`].
    pub fn add_field(&mut self, mut field: Field) -> Result<(), FormError> {
        if self.field_by_id(field.id()).is_some() {
            return Err(FormError::DuplicateField(field.id().to_string()));
        }
        field.bind(self.columns.as_ref(), &self.enums, &self.config)?;
        self.push(Entry::Field(field));
        Ok(())
    }

    /// Builds a spec against this form's columns and choices, then adds it.
    ///
    /// # Errors
    ///
    /// Returns any error from [`FieldSpec::build`] or [`Form::add_field`].
    pub fn add_spec(&mut self, spec: &FieldSpec) -> Result<(), FormError> {
        let field = spec.build(&self.enums, self.columns.as_ref())?;
        self.add_field(field)
    }

    /// Adds every spec in order.
    ///
    /// # Errors
    ///
    /// Stops at the first spec that fails.
    pub fn add_specs<'a>(
        &mut self,
        specs: impl IntoIterator<Item = &'a FieldSpec>,
    ) -> Result<(), FormError> {
        specs.into_iter().try_for_each(|spec| self.add_spec(spec))
    }

    /// Inserts literal HTML at the current position.
    pub fn add_markup(&mut self, html: impl Into<String>) {
        self.push(Entry::Markup(html.into()));
    }

    fn push(&mut self, entry: Entry) {
        self.order.push(self.entries.len());
        self.entries.push(entry);
    }

    /// Adds a field for each column, inferring its kind.
    ///
    /// Columns outside `include` (when given), in `omit`, or in `reserved`
    /// (id and timestamp columns) are skipped, as are columns that already
    /// have a field. Upload columns are skipped with a warning. Returns the
    /// number of fields added.
    ///
    /// # Errors
    ///
    /// Returns the first error from building or adding a field.
    pub fn auto_add_fields(
        &mut self,
        include: Option<&[&str]>,
        omit: &[&str],
        reserved: &[&str],
    ) -> Result<usize, FormError> {
        let Some(columns) = &self.columns else {
            return Ok(0);
        };
        let names: Vec<String> = columns
            .iter()
            .map(|(name, _)| name.to_string())
            .filter(|name| include.is_none_or(|inc| inc.contains(&name.as_str())))
            .filter(|name| !omit.contains(&name.as_str()) && !reserved.contains(&name.as_str()))
            .collect();

        let mut added = 0;
        for name in names {
            if self.field_by_id(&name).is_some() {
                continue;
            }
            let spec = field_spec(name.clone());
            let field = match spec.build(&self.enums, self.columns.as_ref()) {
                Ok(field) => field,
                Err(FormError::Unsupported { kind }) => {
                    warn!(column = %name, kind, "skipping column with no field support");
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.add_field(field)?;
            added += 1;
        }
        debug!(form = %self.name, added, "auto-added fields");
        Ok(added)
    }

    /// Moves the named fields to the front, in the given order. Other
    /// entries keep their relative order and markup keeps its slot.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownField`] for an id with no field.
    pub fn set_field_order(&mut self, ids: &[&str]) -> Result<(), FormError> {
        let mut ranked: Vec<usize> = Vec::with_capacity(self.order.len());
        for id in ids {
            let index = self
                .index_of(id)
                .ok_or_else(|| FormError::UnknownField((*id).to_string()))?;
            if !ranked.contains(&index) {
                ranked.push(index);
            }
        }
        for &index in &self.order {
            if matches!(self.entries[index], Entry::Field(_)) && !ranked.contains(&index) {
                ranked.push(index);
            }
        }
        let rank: HashMap<usize, usize> = ranked
            .into_iter()
            .enumerate()
            .map(|(rank, index)| (index, rank))
            .collect();

        reorder_fields(&mut self.order, &rank);
        for (_, indices) in &mut self.sections {
            reorder_fields(indices, &rank);
        }
        Ok(())
    }

    // --- sections ---

    /// Starts a new section, closing the current one. `header` is inserted
    /// as markup at the top of the new section.
    pub fn start_section(&mut self, name: impl Into<String>, header: Option<&str>) {
        self.finish_section(None);
        self.section_name = name.into();
        if let Some(header) = header.filter(|h| !h.is_empty()) {
            self.add_markup(header);
        }
    }

    /// Closes the current section, appending `footer` first. Safe to call
    /// repeatedly; a section reopened under a used name extends it.
    pub fn finish_section(&mut self, footer: Option<&str>) {
        if let Some(footer) = footer.filter(|f| !f.is_empty()) {
            self.add_markup(footer);
        }
        if self.last >= self.entries.len() {
            return;
        }
        let indices: Vec<usize> = self
            .order
            .iter()
            .copied()
            .filter(|&i| i >= self.last)
            .collect();
        match self
            .sections
            .iter_mut()
            .find(|(name, _)| *name == self.section_name)
        {
            Some((_, existing)) => existing.extend(indices),
            None => self.sections.push((self.section_name.clone(), indices)),
        }
        self.last = self.entries.len();
    }

    /// Sections with their entries, including the one still open.
    fn section_view(&self) -> Vec<(&str, Vec<usize>)> {
        let mut view: Vec<(&str, Vec<usize>)> = self
            .sections
            .iter()
            .map(|(name, indices)| (name.as_str(), indices.clone()))
            .collect();
        let pending: Vec<usize> = self
            .order
            .iter()
            .copied()
            .filter(|&i| i >= self.last)
            .collect();
        if !pending.is_empty() {
            match view.iter_mut().find(|(name, _)| *name == self.section_name) {
                Some((_, existing)) => existing.extend(pending),
                None => view.push((self.section_name.as_str(), pending)),
            }
        }
        view
    }

    /// Section names, in order.
    #[must_use]
    pub fn section_names(&self) -> Vec<&str> {
        self.section_view().into_iter().map(|(name, _)| name).collect()
    }

    /// Fields of one section, or of the whole form. An unknown section has
    /// no fields.
    #[must_use]
    pub fn section_fields(&self, section: Option<&str>) -> Vec<&Field> {
        let indices: Vec<usize> = match section {
            None => self.order.clone(),
            Some(wanted) => self
                .section_view()
                .into_iter()
                .find(|(name, _)| *name == wanted)
                .map(|(_, indices)| indices)
                .unwrap_or_default(),
        };
        indices
            .into_iter()
            .filter_map(|i| match &self.entries[i] {
                Entry::Field(field) => Some(field),
                Entry::Markup(_) => None,
            })
            .collect()
    }

    // --- lookup ---

    fn index_of(&self, id: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|e| matches!(e, Entry::Field(f) if f.id() == id))
    }

    fn field_by_id(&self, id: &str) -> Option<&Field> {
        self.index_of(id).and_then(|i| match &self.entries[i] {
            Entry::Field(field) => Some(field),
            Entry::Markup(_) => None,
        })
    }

    /// The field `name` (with its instance suffix, if any).
    #[must_use]
    pub fn field(&self, name: &str, instance: Option<&str>) -> Option<&Field> {
        self.field_by_id(&format!("{name}{}", instance.unwrap_or_default()))
    }

    pub fn field_mut(&mut self, name: &str, instance: Option<&str>) -> Option<&mut Field> {
        let index = self.index_of(&format!("{name}{}", instance.unwrap_or_default()))?;
        match &mut self.entries[index] {
            Entry::Field(field) => Some(field),
            Entry::Markup(_) => None,
        }
    }

    /// All fields in form order.
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.order.iter().filter_map(|&i| match &self.entries[i] {
            Entry::Field(field) => Some(field),
            Entry::Markup(_) => None,
        })
    }

    #[must_use]
    pub fn field_has_value(&self, name: &str, instance: Option<&str>) -> bool {
        self.field(name, instance).is_some_and(Field::has_value)
    }

    #[must_use]
    pub fn field_value(&self, name: &str, instance: Option<&str>) -> Option<Presentation> {
        self.field(name, instance).and_then(Field::choice)
    }

    #[must_use]
    pub fn field_html_value(&self, name: &str, instance: Option<&str>) -> Option<String> {
        self.field(name, instance)
            .filter(|f| f.has_value())
            .map(Field::html_value)
    }

    /// Legacy SQL literal; `DEFAULT` for a field without a value.
    #[must_use]
    pub fn field_sql_value(&self, name: &str, instance: Option<&str>) -> Option<String> {
        self.field(name, instance).map(Field::sql_value)
    }

    #[must_use]
    pub fn field_text_value(&self, name: &str, instance: Option<&str>) -> Option<String> {
        self.field(name, instance)
            .filter(|f| f.has_value())
            .map(Field::text_value)
    }

    // --- accessors ---

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    #[must_use]
    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    #[must_use]
    pub fn columns(&self) -> Option<&ColumnTable> {
        self.columns.as_ref()
    }

    /// Whether the last parse accepted every field it attempted.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Forgets every parsed value and error.
    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            if let Entry::Field(field) = entry {
                field.reset();
            }
        }
        self.errors.clear();
        self.complete = false;
    }

    // --- parsing ---

    /// Parses `source` against the system clock. See
    /// [`Form::parse_values_with`].
    pub fn parse_values(&mut self, source: &Submission, validate: bool) -> bool {
        self.parse_values_with(source, validate, &SystemYear)
    }

    /// Parses every present field, tier by tier in ascending priority.
    ///
    /// Fields absent from `source` are skipped. Once a tier has a failure,
    /// later tiers are not attempted. Error messages replace the form's
    /// error list only when `validate` is set. Returns whether every
    /// attempted field was valid.
    pub fn parse_values_with(
        &mut self,
        source: &Submission,
        validate: bool,
        years: &dyn YearSource,
    ) -> bool {
        let ctx = ParseContext::new(&self.config, years);
        let mut tiers: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for &index in &self.order {
            if let Entry::Field(field) = &self.entries[index] {
                tiers.entry(field.priority()).or_default().push(index);
            }
        }

        let mut ok = true;
        let mut errors = Vec::new();
        for (priority, indices) in tiers {
            for index in indices {
                let Entry::Field(field) = &mut self.entries[index] else {
                    continue;
                };
                if !field.is_present(source) {
                    continue;
                }
                if !field.parse_value(source, &ctx) {
                    ok = false;
                    errors.push(field.error_message());
                }
            }
            debug!(form = %self.name, priority, ok, "parsed priority tier");
            if !ok {
                break;
            }
        }

        if validate {
            self.errors = errors;
        }
        self.complete = ok;
        ok
    }

    // --- output ---

    /// True if any field (of `section`, if given) has a value.
    #[must_use]
    pub fn has_value(&self, section: Option<&str>) -> bool {
        self.section_fields(section).iter().any(|f| f.has_value())
    }

    /// `` `col` = value `` assignments, comma separated.
    #[must_use]
    pub fn sql_form(&self, section: Option<&str>) -> String {
        self.join_fields(section, ", ", Field::sql_form)
    }

    #[must_use]
    pub fn sql_values(&self, section: Option<&str>) -> String {
        self.join_fields(section, ", ", Field::sql_value)
    }

    /// Column read expressions for a `SELECT`.
    #[must_use]
    pub fn sql_fields(&self, section: Option<&str>) -> String {
        self.join_fields(section, ", ", Field::sql_field)
    }

    /// Typed `(column, parameter)` pairs; `None` means `DEFAULT`.
    #[must_use]
    pub fn sql_assignments(&self, section: Option<&str>) -> Vec<(String, Option<SqlParam>)> {
        self.section_fields(section)
            .into_iter()
            .flat_map(Field::sql_assignments)
            .collect()
    }

    /// `CREATE TABLE` statement named after the form.
    #[must_use]
    pub fn sql_table(&self, section: Option<&str>) -> String {
        format!(
            "CREATE TABLE {} (\n  {}\n) ENGINE=InnoDB DEFAULT CHARSET=utf8;",
            sql_ident(&self.name),
            self.join_fields(section, ",\n  ", Field::sql_table_column)
        )
    }

    /// Plain-text rendering, fields separated by blank lines. `brief`
    /// labels by id and leaves out fields without a value.
    #[must_use]
    pub fn text_form(&self, brief: bool, section: Option<&str>) -> String {
        self.section_fields(section)
            .into_iter()
            .filter(|f| !brief || f.has_value())
            .map(|f| f.text_form(brief))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn join_fields(
        &self,
        section: Option<&str>,
        separator: &str,
        render: impl Fn(&Field) -> String,
    ) -> String {
        self.section_fields(section)
            .into_iter()
            .map(render)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// One table (or div) per section.
    #[must_use]
    pub fn html_form_table(&self) -> String {
        let element = if self.usedivs { "div" } else { "table" };
        let mut html = String::new();
        for (name, indices) in self.section_view() {
            let _ = write!(html, "\n    <{element} class=\"{name}\">");
            if !self.usedivs {
                html.push_str("\n      <col class=\"label\"><col class=\"field\"><col class=\"annotation\">");
            }
            for index in indices {
                match &self.entries[index] {
                    Entry::Field(field) => html.push_str(&field.html_table_row(self.usedivs)),
                    Entry::Markup(markup) => html.push_str(markup),
                }
            }
            let _ = write!(html, "\n    </{element}>");
        }
        html
    }

    /// The whole form: error list, sections, the `process` token and the
    /// buttons (submit and reset when `buttons` is `None`).
    #[must_use]
    pub fn html_form(&self, process: &str, buttons: Option<&str>) -> String {
        let mut html = String::new();
        if !self.errors.is_empty() {
            html.push_str("\n  <div class='errortext'>");
            for message in &self.errors {
                let _ = write!(html, "\n    <p class=\"errortext\">{message}</p>");
            }
            html.push_str("\n  </div>");
        }
        let _ = write!(
            html,
            "\n  <form class=\"{name}\" name=\"{name}\" method=\"{}\" action=\"{}\" enctype=\"multipart/form-data\">",
            self.method,
            self.action,
            name = self.name,
        );
        html.push_str(&self.html_form_table());
        let _ = write!(
            html,
            "\n    <input type=\"hidden\" name=\"process\" value=\"{process}\">\n    <div class=\"buttons\">\n      {}\n    </div>\n  </form>\n",
            buttons.unwrap_or(DEFAULT_BUTTONS)
        );
        html
    }

    /// Distinct string payload entries under `key` of every selected item,
    /// in form order (e.g. the contact addresses of chosen classes).
    #[must_use]
    pub fn selected_payload(&self, key: &str) -> Vec<String> {
        let mut items = Vec::new();
        for field in self.fields() {
            selected_items(field, &mut items);
        }
        let mut found: Vec<String> = Vec::new();
        for text in items.into_iter().filter_map(|item| item.text(key)) {
            if !found.iter().any(|f| f == text) {
                found.push(text.to_string());
            }
        }
        found
    }
}

/// Refills the field slots of `indices` in rank order; other slots stay.
fn reorder_fields(indices: &mut [usize], rank: &HashMap<usize, usize>) {
    let mut fields: Vec<usize> = indices
        .iter()
        .copied()
        .filter(|i| rank.contains_key(i))
        .collect();
    fields.sort_by_key(|i| rank.get(i).copied().unwrap_or(usize::MAX));
    let mut next = fields.into_iter();
    for slot in indices.iter_mut().filter(|i| rank.contains_key(*i)) {
        if let Some(index) = next.next() {
            *slot = index;
        }
    }
}

fn selected_items<'a>(field: &'a Field, out: &mut Vec<&'a ChoiceItem>) {
    if let FieldKind::Composite(composite) = field.kind() {
        for (_, sub) in composite.fields() {
            selected_items(sub, out);
        }
        return;
    }
    let Some(choices) = field.kind().choices() else {
        return;
    };
    let keys = match field.value() {
        Some(FieldValue::Key(key)) => std::slice::from_ref(key),
        Some(FieldValue::Keys(keys)) => keys.as_slice(),
        _ => return,
    };
    out.extend(
        keys.iter()
            .filter_map(|k| choices.get(k))
            .filter_map(|c| c.as_item()),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FixedYear;
    use crate::declare::{field, opt_field};
    use crate::source::ColumnDescriptor;

    fn submission(pairs: &[(&str, &str)]) -> Submission {
        Submission::from_pairs(pairs.iter().copied())
    }

    fn contact_form() -> Form {
        let mut form = Form::new("contact").with_action("/contact");
        form.add_spec(&field("name")).unwrap();
        form.add_spec(&field("email")).unwrap();
        form.add_spec(&opt_field("phone")).unwrap();
        form
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut form = contact_form();
        assert!(matches!(
            form.add_spec(&field("email")),
            Err(FormError::DuplicateField(id)) if id == "email"
        ));
        form.add_spec(&field("email").instance("2")).unwrap();
        assert!(form.field("email", Some("2")).is_some());
    }

    #[test]
    fn absent_fields_are_skipped() {
        let mut form = contact_form();
        assert!(form.parse_values(&submission(&[("name", "Ann")]), true));
        assert!(form.is_complete());
        assert!(!form.field_has_value("email", None));
    }

    #[test]
    fn errors_are_collected_in_order() {
        let mut form = contact_form();
        let ok = form.parse_values(
            &submission(&[("name", ""), ("email", "nope"), ("phone", "12")]),
            true,
        );
        assert!(!ok);
        assert_eq!(form.errors().len(), 3);
        assert!(form.errors()[0].starts_with("Name is a required field"));
        assert!(form.errors()[1].starts_with("Email: \"nope\""));
    }

    #[test]
    fn validate_false_keeps_error_list() {
        let mut form = contact_form();
        assert!(!form.parse_values(&submission(&[("name", "")]), false));
        assert!(form.errors().is_empty());
        assert!(!form.is_complete());
    }

    #[test]
    fn sections_partition_fields() {
        let mut form = Form::new("signup");
        form.add_spec(&field("name")).unwrap();
        form.start_section("address", Some("<tr><th>Address</th></tr>"));
        form.add_spec(&field("zip")).unwrap();
        form.add_spec(&field("state")).unwrap();
        form.finish_section(None);
        form.finish_section(None);
        assert_eq!(form.section_names(), vec!["signup", "address"]);
        let ids: Vec<&str> = form
            .section_fields(Some("address"))
            .iter()
            .map(|f| f.id())
            .collect();
        assert_eq!(ids, vec!["zip", "state"]);
        assert!(form.section_fields(Some("nowhere")).is_empty());
        assert!(form.html_form_table().contains("<tr><th>Address</th></tr>"));
    }

    #[test]
    fn open_section_is_visible_before_finishing() {
        let mut form = Form::new("quick");
        form.add_spec(&field("name")).unwrap();
        assert_eq!(form.section_names(), vec!["quick"]);
        assert_eq!(form.section_fields(Some("quick")).len(), 1);
    }

    #[test]
    fn field_order_can_be_changed() {
        let mut form = contact_form();
        form.set_field_order(&["phone", "name"]).unwrap();
        let ids: Vec<&str> = form.fields().map(Field::id).collect();
        assert_eq!(ids, vec!["phone", "name", "email"]);
        assert!(matches!(
            form.set_field_order(&["fax"]),
            Err(FormError::UnknownField(id)) if id == "fax"
        ));
    }

    #[test]
    fn auto_add_uses_columns() {
        let columns: ColumnTable = [
            ("id", ColumnDescriptor::new("int(11)", false, None)),
            ("title", ColumnDescriptor::new("varchar(80)", false, None)),
            ("body", ColumnDescriptor::new("text", true, None)),
            ("attachment", ColumnDescriptor::new("longblob", true, None)),
        ]
        .into_iter()
        .collect();
        let mut form = Form::new("posts").with_columns(columns);
        let added = form.auto_add_fields(None, &[], &["id"]).unwrap();
        assert_eq!(added, 2);
        let title = form.field("title", None).unwrap();
        assert!(title.required());
        assert_eq!(title.maxlength(), Some(80));
        assert!(!form.field("body", None).unwrap().required());
        assert!(form.field("attachment", None).is_none());
    }

    #[test]
    fn whole_form_sql() {
        let mut form = contact_form();
        form.parse_values_with(
            &submission(&[("name", "Ann"), ("email", "ann@example.org")]),
            true,
            &FixedYear(2026),
        );
        assert_eq!(
            form.sql_form(None),
            "`name` = 'Ann', `email` = 'ann@example.org', `phone` = DEFAULT"
        );
        assert_eq!(form.sql_fields(None), "`name`, `email`, `phone`");
        assert_eq!(
            form.sql_table(None),
            "CREATE TABLE `contact` (\n  `name` VARCHAR(63) NOT NULL,\n  `email` VARCHAR(254) NOT NULL,\n  `phone` VARCHAR(16) NULL DEFAULT NULL\n) ENGINE=InnoDB DEFAULT CHARSET=utf8;"
        );
        let params = form.sql_assignments(None);
        assert_eq!(params[0], ("name".to_string(), Some(SqlParam::Text("Ann".into()))));
        assert_eq!(params[2], ("phone".to_string(), None));
    }

    #[test]
    fn brief_text_skips_empty_fields() {
        let mut form = contact_form();
        form.parse_values(&submission(&[("name", "Ann"), ("phone", "")]), true);
        assert_eq!(form.text_form(true, None), "name: Ann");
        assert_eq!(form.text_form(false, None), "Name: Ann\n\nEmail: \n\nPhone: ");
    }

    #[test]
    fn html_form_lists_errors_and_token() {
        let mut form = contact_form();
        form.parse_values(&submission(&[("name", "")]), true);
        let html = form.html_form("tok123", None);
        assert!(html.contains("<p class=\"errortext\">Name is a required field. Please enter it below.</p>"));
        assert!(html.contains("<form class=\"contact\" name=\"contact\" method=\"post\" action=\"/contact\""));
        assert!(html.contains("<input type=\"hidden\" name=\"process\" value=\"tok123\">"));
        assert!(html.contains("value=\"Submit Form\""));
        assert!(html.contains("<table class=\"contact\">"));
    }
}
