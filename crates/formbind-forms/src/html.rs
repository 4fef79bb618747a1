//! Built-in form engine rendering plain HTML

use crate::button::Button;
use crate::engine::{Bindings, Form, FormEngine, FormOptions, ValidationFailure, WidgetResources};
use crate::fields::{FieldKind, SchemaField};
use crate::schema::{IdentitySerializer, Schema, StepSerializer};
use formbind_core::{Request, Result};
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

type Predicate = Arc<dyn Fn(&dyn Request) -> bool + Send + Sync>;

/// Schema made of [`SchemaField`]s, understood by [`HtmlEngine`].
///
/// # Examples
///
/// ```
/// use formbind_core::RequestContext;
/// use formbind_forms::{FieldKind, FieldSchema, Schema, SchemaField};
///
/// let schema = FieldSchema::new("account")
///     .with_title("Account")
///     .with_description("Pick a login")
///     .with_csrf()
///     .with_field(SchemaField::text("username").required())
///     .with_next_ok(|request| request.query_param("locked").is_none());
///
/// let request = RequestContext::new("http://example.com/").with_query("locked", "1");
/// assert_eq!(schema.name(), "account");
/// assert_eq!(schema.fields().len(), 2);
/// assert!(!schema.next_ok(&request));
/// assert!(schema.prev_ok(&request));
/// ```
#[derive(Clone)]
pub struct FieldSchema {
	name: String,
	title: String,
	description: String,
	fields: Vec<SchemaField>,
	appstruct: Option<Value>,
	prev_ok: Option<Predicate>,
	next_ok: Option<Predicate>,
	serializer: Option<Arc<dyn StepSerializer + Send + Sync>>,
	resources: WidgetResources,
}

impl fmt::Debug for FieldSchema {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldSchema")
			.field("name", &self.name)
			.field("title", &self.title)
			.field("fields", &self.fields)
			.field("appstruct", &self.appstruct)
			.finish_non_exhaustive()
	}
}

impl FieldSchema {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			title: String::new(),
			description: String::new(),
			fields: Vec::new(),
			appstruct: None,
			prev_ok: None,
			next_ok: None,
			serializer: None,
			resources: WidgetResources::default(),
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = description.into();
		self
	}

	pub fn with_field(mut self, field: SchemaField) -> Self {
		self.fields.push(field);
		self
	}

	/// Prepend the hidden CSRF token node.
	pub fn with_csrf(mut self) -> Self {
		self.fields.insert(0, SchemaField::csrf_token());
		self
	}

	/// Default value used to prefill the form.
	pub fn with_appstruct(mut self, appstruct: Value) -> Self {
		self.appstruct = Some(appstruct);
		self
	}

	pub fn with_prev_ok<F>(mut self, predicate: F) -> Self
	where
		F: Fn(&dyn Request) -> bool + Send + Sync + 'static,
	{
		self.prev_ok = Some(Arc::new(predicate));
		self
	}

	pub fn with_next_ok<F>(mut self, predicate: F) -> Self
	where
		F: Fn(&dyn Request) -> bool + Send + Sync + 'static,
	{
		self.next_ok = Some(Arc::new(predicate));
		self
	}

	pub fn with_serializer<S>(mut self, serializer: S) -> Self
	where
		S: StepSerializer + Send + Sync + 'static,
	{
		self.serializer = Some(Arc::new(serializer));
		self
	}

	/// Declare scripts and stylesheets the form needs.
	pub fn with_resources(mut self, resources: WidgetResources) -> Self {
		self.resources = resources;
		self
	}

	pub fn fields(&self) -> &[SchemaField] {
		&self.fields
	}
}

impl Schema for FieldSchema {
	fn name(&self) -> &str {
		&self.name
	}

	fn title(&self) -> &str {
		&self.title
	}

	fn description(&self) -> &str {
		&self.description
	}

	fn appstruct(&self) -> Option<Value> {
		self.appstruct.clone()
	}

	fn prev_ok(&self, request: &dyn Request) -> bool {
		self.prev_ok.as_ref().is_none_or(|predicate| predicate(request))
	}

	fn next_ok(&self, request: &dyn Request) -> bool {
		self.next_ok.as_ref().is_none_or(|predicate| predicate(request))
	}

	fn wizard_serializer(&self) -> Box<dyn StepSerializer + '_> {
		match &self.serializer {
			Some(serializer) => Box::new(Arc::clone(serializer)),
			None => Box::new(IdentitySerializer),
		}
	}
}

/// Engine building [`HtmlForm`]s from [`FieldSchema`]s.
#[derive(Debug, Clone)]
pub struct HtmlEngine {
	form_id: String,
	action: String,
}

impl Default for HtmlEngine {
	fn default() -> Self {
		Self {
			form_id: "deform".to_string(),
			action: String::new(),
		}
	}
}

impl HtmlEngine {
	pub fn new() -> Self {
		Self::default()
	}

	/// `id` attribute of rendered forms, also used to derive field ids.
	pub fn with_form_id(mut self, form_id: impl Into<String>) -> Self {
		self.form_id = form_id.into();
		self
	}

	/// `action` attribute of rendered forms. Empty posts back to the page.
	pub fn with_action(mut self, action: impl Into<String>) -> Self {
		self.action = action.into();
		self
	}
}

impl FormEngine for HtmlEngine {
	type Schema = FieldSchema;

	fn build(
		&self,
		schema: &FieldSchema,
		bindings: &Bindings,
		buttons: Vec<Button>,
		options: &FormOptions,
	) -> Result<Box<dyn Form>> {
		Ok(Box::new(HtmlForm {
			form_id: self.form_id.clone(),
			action: self.action.clone(),
			fields: schema.fields.clone(),
			bindings: bindings.clone(),
			buttons,
			options: options.clone(),
			resources: schema.resources.clone(),
		}))
	}
}

/// A [`FieldSchema`] bound for one request.
#[derive(Debug, Clone)]
pub struct HtmlForm {
	form_id: String,
	action: String,
	fields: Vec<SchemaField>,
	bindings: Bindings,
	buttons: Vec<Button>,
	options: FormOptions,
	resources: WidgetResources,
}

impl HtmlForm {
	fn render_with(&self, values: &Map<String, Value>, errors: &BTreeMap<String, Vec<String>>) -> String {
		let id = encode_double_quoted_attribute(&self.form_id);
		let mut html = format!(
			"<form id=\"{}\" action=\"{}\" method=\"POST\" enctype=\"multipart/form-data\" accept-charset=\"utf-8\"",
			id,
			encode_double_quoted_attribute(&self.action)
		);
		if self.options.use_ajax {
			html.push_str(&format!(
				" data-ajax=\"true\" data-ajax-options=\"{}\"",
				encode_double_quoted_attribute(&self.options.ajax_options)
			));
		}
		html.push_str(">\n<fieldset>\n");

		if !errors.is_empty() {
			html.push_str(
				"<div class=\"alert alert-danger\">There was a problem with your submission</div>\n",
			);
		}

		for field in &self.fields {
			let value = values.get(&field.name).unwrap_or(&Value::Null);
			let field_errors = errors.get(&field.name).map(Vec::as_slice).unwrap_or(&[]);
			self.render_field(&mut html, field, value, field_errors);
		}

		html.push_str("<div class=\"form-group buttons\">\n");
		for button in &self.buttons {
			html.push_str(&format!(
				"<button id=\"{}{}\" name=\"{}\" type=\"{}\" value=\"{}\"{}>{}</button>\n",
				id,
				encode_double_quoted_attribute(&button.name),
				encode_double_quoted_attribute(&button.name),
				button.kind.as_str(),
				encode_double_quoted_attribute(&button.value),
				if button.disabled {
					" disabled=\"disabled\""
				} else {
					""
				},
				encode_text(&button.title)
			));
		}
		html.push_str("</div>\n</fieldset>\n</form>\n");
		html
	}

	fn render_field(&self, html: &mut String, field: &SchemaField, value: &Value, errors: &[String]) {
		let name = encode_double_quoted_attribute(&field.name);
		let field_id = format!("{}-{}", encode_double_quoted_attribute(&self.form_id), name);

		if field.kind == FieldKind::Hidden {
			html.push_str(&format!(
				"<input type=\"hidden\" name=\"{}\" value=\"{}\"/>\n",
				name,
				encode_double_quoted_attribute(&display_value(value))
			));
			for error in errors {
				html.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(error)));
			}
			return;
		}

		html.push_str(&format!(
			"<div class=\"form-group{}\" id=\"item-{}\">\n",
			if errors.is_empty() { "" } else { " has-error" },
			field_id
		));
		html.push_str(&format!(
			"<label for=\"{}\">{}{}</label>\n",
			field_id,
			encode_text(&field.title),
			if field.required {
				" <span class=\"req\">*</span>"
			} else {
				""
			}
		));

		match field.kind {
			FieldKind::Boolean => html.push_str(&format!(
				"<input type=\"checkbox\" name=\"{}\" value=\"true\" id=\"{}\"{}/>\n",
				name,
				field_id,
				if is_checked(value) {
					" checked=\"checked\""
				} else {
					""
				}
			)),
			_ => html.push_str(&format!(
				"<input type=\"text\" name=\"{}\" value=\"{}\" id=\"{}\"/>\n",
				name,
				encode_double_quoted_attribute(&display_value(value)),
				field_id
			)),
		}

		if let Some(description) = &field.description {
			html.push_str(&format!(
				"<p class=\"help-block\">{}</p>\n",
				encode_text(description)
			));
		}
		for error in errors {
			html.push_str(&format!("<p class=\"error\">{}</p>\n", encode_text(error)));
		}
		html.push_str("</div>\n");
	}
}

impl Form for HtmlForm {
	fn buttons(&self) -> &[Button] {
		&self.buttons
	}

	fn validate(
		&self,
		controls: &[(String, String)],
	) -> std::result::Result<Value, ValidationFailure> {
		let submitted: HashMap<&str, &str> = controls
			.iter()
			.map(|(name, value)| (name.as_str(), value.as_str()))
			.collect();

		let mut cleaned = Map::new();
		let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
		for field in &self.fields {
			match field.clean(submitted.get(field.name.as_str()).copied(), &self.bindings) {
				Ok(value) => {
					cleaned.insert(field.name.clone(), value);
				}
				Err(message) => errors.entry(field.name.clone()).or_default().push(message),
			}
		}

		if errors.is_empty() {
			return Ok(Value::Object(cleaned));
		}

		let values: Map<String, Value> = self
			.fields
			.iter()
			.filter_map(|field| {
				submitted
					.get(field.name.as_str())
					.map(|raw| (field.name.clone(), Value::String(raw.to_string())))
			})
			.collect();
		Err(ValidationFailure::new(
			self.render_with(&values, &errors),
			errors,
		))
	}

	fn render(&self, appstruct: Option<&Value>) -> String {
		let mut values = Map::new();
		for field in &self.fields {
			let value = appstruct
				.and_then(|appstruct| appstruct.get(&field.name))
				.filter(|value| !value.is_null())
				.cloned()
				.or_else(|| field.resolve_default(&self.bindings));
			if let Some(value) = value {
				values.insert(field.name.clone(), value);
			}
		}
		self.render_with(&values, &BTreeMap::new())
	}

	fn widget_resources(&self) -> WidgetResources {
		self.resources.clone()
	}
}

fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::String(text) => text.clone(),
		other => other.to_string(),
	}
}

fn is_checked(value: &Value) -> bool {
	match value {
		Value::Bool(checked) => *checked,
		Value::String(text) => !text.is_empty() && text != "false",
		_ => false,
	}
}
