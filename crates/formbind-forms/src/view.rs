//! Generic form view
//!
//! A [`FormView`] binds one schema for one request, builds the form, and
//! dispatches a submitted button to the handler registered for it:
//!
//! ```
//! use formbind_core::{Request, RequestContext, ViewResponse};
//! use formbind_forms::{Button, FieldSchema, FormView, HtmlEngine, SchemaField};
//!
//! #[derive(Default)]
//! struct Saved(Vec<serde_json::Value>);
//!
//! let engine = HtmlEngine::new();
//! let schema = FieldSchema::new("contact").with_field(SchemaField::text("email").required());
//! let view = FormView::new(&engine, &schema)
//!     .with_buttons(vec![Button::new("save")])
//!     .on_success("save", |saved: &mut Saved, request, validated| {
//!         saved.0.push(validated);
//!         Ok(ViewResponse::found(request.path_url()))
//!     });
//! view.validate().unwrap();
//!
//! let mut saved = Saved::default();
//! let mut request = RequestContext::new("http://example.com/contact")
//!     .with_post("email", "ada@example.com")
//!     .with_post("save", "save");
//! let response = view.call(&mut saved, &mut request).unwrap();
//!
//! assert!(response.is_redirect());
//! assert_eq!(saved.0.len(), 1);
//! ```

use crate::button::Button;
use crate::csrf::CSRF_BINDING;
use crate::engine::{Bindings, Form, FormEngine, FormOptions, ValidationFailure};
use crate::schema::Schema;
use formbind_core::{Error, RenderedPage, Request, Result, ViewResponse};
use serde_json::Value;
use std::collections::HashMap;

/// Runs after a submitted button validated.
pub type SuccessHandler<'a, C> =
	Box<dyn Fn(&mut C, &mut dyn Request, Value) -> Result<ViewResponse> + 'a>;

/// Runs after a submitted button failed validation.
pub type FailureHandler<'a, C> =
	Box<dyn Fn(&mut C, &mut dyn Request, ValidationFailure) -> Result<ViewResponse> + 'a>;

type PrefillHook<'a, C> = Box<dyn Fn(&mut C, &mut dyn Request) -> Result<Option<Value>> + 'a>;
type BindHook<'a> = Box<dyn Fn(&mut dyn Request) -> Bindings + 'a>;
type BeforeHook<'a> = Box<dyn Fn(&mut dyn Form) + 'a>;

/// Form view over engine `E`, with handlers acting on a context of type `C`.
pub struct FormView<'a, E: FormEngine, C> {
	engine: &'a E,
	schema: &'a E::Schema,
	buttons: Vec<Button>,
	options: FormOptions,
	success: HashMap<String, SuccessHandler<'a, C>>,
	failure: HashMap<String, FailureHandler<'a, C>>,
	prefill: Option<PrefillHook<'a, C>>,
	bind_data: Option<BindHook<'a>>,
	before: Option<BeforeHook<'a>>,
}

impl<'a, E: FormEngine, C> FormView<'a, E, C> {
	pub fn new(engine: &'a E, schema: &'a E::Schema) -> Self {
		Self {
			engine,
			schema,
			buttons: Vec::new(),
			options: FormOptions::default(),
			success: HashMap::new(),
			failure: HashMap::new(),
			prefill: None,
			bind_data: None,
			before: None,
		}
	}

	pub fn with_buttons(mut self, buttons: Vec<Button>) -> Self {
		self.buttons = buttons;
		self
	}

	pub fn with_options(mut self, options: FormOptions) -> Self {
		self.options = options;
		self
	}

	/// Register the handler run when `button` is submitted and validates.
	pub fn on_success<F>(mut self, button: impl Into<String>, handler: F) -> Self
	where
		F: Fn(&mut C, &mut dyn Request, Value) -> Result<ViewResponse> + 'a,
	{
		self.success.insert(button.into(), Box::new(handler));
		self
	}

	/// Register the handler run when `button` is submitted and fails
	/// validation. Buttons without one re-render the failed form.
	pub fn on_failure<F>(mut self, button: impl Into<String>, handler: F) -> Self
	where
		F: Fn(&mut C, &mut dyn Request, ValidationFailure) -> Result<ViewResponse> + 'a,
	{
		self.failure.insert(button.into(), Box::new(handler));
		self
	}

	/// Supply the value a freshly shown form is prefilled with. Without it
	/// the schema's default value is used.
	pub fn with_prefill<F>(mut self, prefill: F) -> Self
	where
		F: Fn(&mut C, &mut dyn Request) -> Result<Option<Value>> + 'a,
	{
		self.prefill = Some(Box::new(prefill));
		self
	}

	/// Replace the default bind data (the session CSRF token).
	pub fn with_bind_data<F>(mut self, bind_data: F) -> Self
	where
		F: Fn(&mut dyn Request) -> Bindings + 'a,
	{
		self.bind_data = Some(Box::new(bind_data));
		self
	}

	/// Adjust the form right after it is built.
	pub fn with_before<F>(mut self, before: F) -> Self
	where
		F: Fn(&mut dyn Form) + 'a,
	{
		self.before = Some(Box::new(before));
		self
	}

	pub fn buttons(&self) -> &[Button] {
		&self.buttons
	}

	/// Check that every declared button has a success handler.
	pub fn validate(&self) -> Result<()> {
		for button in &self.buttons {
			if !self.success.contains_key(&button.name) {
				return Err(Error::configuration(format!(
					"form '{}' declares button '{}' without a success handler",
					self.schema.name(),
					button.name
				)));
			}
		}
		Ok(())
	}

	/// Handle one request.
	///
	/// The first declared button found among the submitted controls decides
	/// the handler. Without a submitted button the form is shown. Page
	/// results carry the widgets' script and stylesheet links.
	pub fn call(&self, ctx: &mut C, request: &mut dyn Request) -> Result<ViewResponse> {
		self.validate()?;

		let bindings = match &self.bind_data {
			Some(bind_data) => bind_data(request),
			None => default_bindings(request),
		};
		let mut form = self
			.engine
			.build(self.schema, &bindings, self.buttons.clone(), &self.options)?;
		if let Some(before) = &self.before {
			before(form.as_mut());
		}
		let resources = form.widget_resources();

		let submitted = form
			.buttons()
			.iter()
			.find(|button| request.has_control(&button.name))
			.map(|button| button.name.clone());

		let mut result = match submitted {
			Some(button) => {
				let controls = request.post().to_vec();
				match form.validate(&controls) {
					Ok(validated) => {
						tracing::debug!(
							form = self.schema.name(),
							button = %button,
							"form validated"
						);
						let handler = self.success.get(&button).ok_or_else(|| {
							Error::configuration(format!(
								"no success handler for button '{}'",
								button
							))
						})?;
						handler(ctx, request, validated)?
					}
					Err(failure) => {
						tracing::debug!(
							form = self.schema.name(),
							button = %button,
							fields = failure.errors().len(),
							"form validation failed"
						);
						match self.failure.get(&button) {
							Some(handler) => handler(ctx, request, failure)?,
							None => ViewResponse::Page(RenderedPage::new(failure.render())),
						}
					}
				}
			}
			None => self.show(ctx, request, form.as_ref())?,
		};

		if let ViewResponse::Page(page) = &mut result {
			page.js_links = resources.js;
			page.css_links = resources.css;
		}
		Ok(result)
	}

	fn show(&self, ctx: &mut C, request: &mut dyn Request, form: &dyn Form) -> Result<ViewResponse> {
		let appstruct = match &self.prefill {
			Some(prefill) => prefill(ctx, request)?,
			None => self.schema.appstruct(),
		};
		Ok(ViewResponse::Page(RenderedPage::new(
			form.render(appstruct.as_ref()),
		)))
	}
}

/// Bind data used when none is configured: the session's CSRF token.
pub fn default_bindings(request: &mut dyn Request) -> Bindings {
	let mut bindings = Bindings::new();
	bindings.insert(
		CSRF_BINDING.to_string(),
		Value::String(request.session_mut().csrf_token()),
	);
	bindings
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::engine::WidgetResources;
	use crate::fields::SchemaField;
	use crate::html::{FieldSchema, HtmlEngine};
	use formbind_core::RequestContext;
	use rstest::{fixture, rstest};
	use serde_json::json;
	use std::cell::Cell;

	#[derive(Default)]
	struct Calls {
		saved: Vec<Value>,
		failures: usize,
	}

	#[fixture]
	fn engine() -> HtmlEngine {
		HtmlEngine::new()
	}

	#[fixture]
	fn schema() -> FieldSchema {
		FieldSchema::new("contact")
			.with_csrf()
			.with_field(SchemaField::text("email").required())
			.with_appstruct(json!({"email": "default@example.com"}))
			.with_resources(WidgetResources {
				js: vec!["deform.js".to_string()],
				css: vec!["form.css".to_string()],
			})
	}

	fn view<'a>(engine: &'a HtmlEngine, schema: &'a FieldSchema) -> FormView<'a, HtmlEngine, Calls> {
		FormView::new(engine, schema)
			.with_buttons(vec![Button::new("save"), Button::new("cancel")])
			.on_success("save", |calls: &mut Calls, request, validated| {
				calls.saved.push(validated);
				Ok(ViewResponse::found(request.path_url()))
			})
			.on_success("cancel", |_: &mut Calls, _, _| {
				Ok(ViewResponse::Custom(json!("cancelled")))
			})
	}

	fn request_with_token() -> (RequestContext, String) {
		let mut request = RequestContext::new("http://example.com/contact");
		let token = request.session_mut().csrf_token();
		(request, token)
	}

	#[rstest]
	fn test_show_uses_schema_appstruct(engine: HtmlEngine, schema: FieldSchema) {
		let mut calls = Calls::default();
		let mut request = RequestContext::new("http://example.com/contact");

		let response = view(&engine, &schema).call(&mut calls, &mut request).unwrap();
		let page = response.page().unwrap();

		assert!(page.form.contains("value=\"default@example.com\""));
		assert_eq!(page.js_links, vec!["deform.js"]);
		assert_eq!(page.css_links, vec!["form.css"]);
		assert!(calls.saved.is_empty());
	}

	#[rstest]
	fn test_success_dispatches_to_button_handler(engine: HtmlEngine, schema: FieldSchema) {
		let mut calls = Calls::default();
		let (request, token) = request_with_token();
		let mut request = request
			.with_post("csrf_token", token.clone())
			.with_post("email", "ada@example.com")
			.with_post("save", "save");

		let response = view(&engine, &schema).call(&mut calls, &mut request).unwrap();

		assert_eq!(response.location(), Some("http://example.com/contact"));
		assert_eq!(
			calls.saved,
			vec![json!({"csrf_token": token, "email": "ada@example.com"})]
		);
	}

	#[rstest]
	fn test_first_declared_button_wins(engine: HtmlEngine, schema: FieldSchema) {
		let mut calls = Calls::default();
		let (request, token) = request_with_token();
		let mut request = request
			.with_post("csrf_token", token)
			.with_post("email", "ada@example.com")
			.with_post("cancel", "cancel")
			.with_post("save", "save");

		let response = view(&engine, &schema).call(&mut calls, &mut request).unwrap();

		assert!(response.is_redirect());
		assert_eq!(calls.saved.len(), 1);
	}

	#[rstest]
	fn test_custom_result_gets_no_links(engine: HtmlEngine, schema: FieldSchema) {
		let mut calls = Calls::default();
		let (request, token) = request_with_token();
		let mut request = request
			.with_post("csrf_token", token)
			.with_post("email", "ada@example.com")
			.with_post("cancel", "cancel");

		let response = view(&engine, &schema).call(&mut calls, &mut request).unwrap();
		assert_eq!(response, ViewResponse::Custom(json!("cancelled")));
	}

	#[rstest]
	fn test_default_failure_renders_errors(engine: HtmlEngine, schema: FieldSchema) {
		let mut calls = Calls::default();
		let mut request = RequestContext::new("http://example.com/contact")
			.with_post("csrf_token", "forged")
			.with_post("email", "")
			.with_post("save", "save");

		let response = view(&engine, &schema).call(&mut calls, &mut request).unwrap();
		let page = response.page().unwrap();

		assert!(page.form.contains("Invalid cross-site scripting token"));
		assert!(page.form.contains("Required"));
		assert_eq!(page.js_links, vec!["deform.js"]);
		assert!(calls.saved.is_empty());
	}

	#[rstest]
	fn test_failure_handler_overrides_default(engine: HtmlEngine, schema: FieldSchema) {
		let mut calls = Calls::default();
		let mut request = RequestContext::new("http://example.com/contact").with_post("save", "save");

		let response = view(&engine, &schema)
			.on_failure("save", |calls: &mut Calls, _, failure| {
				calls.failures += 1;
				Ok(ViewResponse::Custom(json!(failure.errors().len())))
			})
			.call(&mut calls, &mut request)
			.unwrap();

		assert_eq!(calls.failures, 1);
		assert_eq!(response, ViewResponse::Custom(json!(2)));
	}

	#[rstest]
	fn test_missing_success_handler_is_configuration_error(
		engine: HtmlEngine,
		schema: FieldSchema,
	) {
		let view: FormView<'_, HtmlEngine, Calls> =
			FormView::new(&engine, &schema).with_buttons(vec![Button::new("delete")]);

		let err = view.validate().unwrap_err();
		assert!(matches!(err, Error::ImproperlyConfigured(_)));

		let mut request = RequestContext::new("http://example.com/contact");
		assert!(view.call(&mut Calls::default(), &mut request).is_err());
	}

	#[rstest]
	fn test_prefill_and_hooks(engine: HtmlEngine, schema: FieldSchema) {
		let before_runs = Cell::new(0);
		let mut calls = Calls::default();
		let mut request = RequestContext::new("http://example.com/contact");

		let response = view(&engine, &schema)
			.with_prefill(|_: &mut Calls, _| Ok(Some(json!({"email": "stored@example.com"}))))
			.with_bind_data(|_| {
				let mut bindings = Bindings::new();
				bindings.insert("csrf_token".to_string(), json!("fixed"));
				bindings
			})
			.with_before(|_| before_runs.set(before_runs.get() + 1))
			.call(&mut calls, &mut request)
			.unwrap();
		let page = response.page().unwrap();

		assert_eq!(before_runs.get(), 1);
		assert!(page.form.contains("value=\"stored@example.com\""));
		assert!(page.form.contains("value=\"fixed\""));
		assert!(request.session().data().is_empty());
	}

	#[rstest]
	fn test_default_bindings_carry_session_token() {
		let mut request = RequestContext::new("http://example.com/");
		let bindings = default_bindings(&mut request);
		let token = request.session_mut().csrf_token();

		assert_eq!(bindings.get("csrf_token"), Some(&json!(token)));
	}
}
