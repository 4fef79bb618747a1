//! The seam between form views and a form engine

use crate::button::Button;
use crate::schema::Schema;
use formbind_core::Result;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Values a schema is bound with before building a form.
///
/// Deferred schema values (such as the CSRF token) are resolved from here.
pub type Bindings = Map<String, Value>;

/// Static assets a form's widgets need on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetResources {
	pub js: Vec<String>,
	pub css: Vec<String>,
}

/// Options forwarded to the engine when a form is built.
#[derive(Debug, Clone, PartialEq)]
pub struct FormOptions {
	pub use_ajax: bool,
	pub ajax_options: String,
	/// Engine specific options.
	pub extra: Map<String, Value>,
}

impl Default for FormOptions {
	fn default() -> Self {
		Self {
			use_ajax: false,
			ajax_options: "{}".to_string(),
			extra: Map::new(),
		}
	}
}

/// Raised by [`Form::validate`] when submitted controls do not validate.
///
/// Carries a rendering of the form with the submitted values and error
/// messages in place, ready to be shown again.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Form validation failed ({} field(s) with errors)", .errors.len())]
pub struct ValidationFailure {
	rendered: String,
	errors: BTreeMap<String, Vec<String>>,
}

impl ValidationFailure {
	pub fn new(rendered: impl Into<String>, errors: BTreeMap<String, Vec<String>>) -> Self {
		Self {
			rendered: rendered.into(),
			errors,
		}
	}

	/// The re-rendered form.
	pub fn render(&self) -> &str {
		&self.rendered
	}

	/// Error messages keyed by field name.
	pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
		&self.errors
	}
}

/// A form built for one request.
pub trait Form {
	/// Buttons declared on the form, in display order.
	fn buttons(&self) -> &[Button];

	/// Validate submitted controls and return the validated value.
	fn validate(&self, controls: &[(String, String)])
	-> std::result::Result<Value, ValidationFailure>;

	/// Render the form, prefilled with `appstruct` when given.
	fn render(&self, appstruct: Option<&Value>) -> String;

	/// Scripts and stylesheets required by the form's widgets.
	fn widget_resources(&self) -> WidgetResources;
}

/// Builds forms from schemas.
pub trait FormEngine {
	type Schema: Schema;

	/// Bind `schema` with `bindings` and build a form carrying `buttons`.
	fn build(
		&self,
		schema: &Self::Schema,
		bindings: &Bindings,
		buttons: Vec<Button>,
		options: &FormOptions,
	) -> Result<Box<dyn Form>>;
}
