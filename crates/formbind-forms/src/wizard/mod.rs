//! Multi-step form wizards
//!
//! A [`FormWizard`] presents an ordered list of schemas across several
//! requests. Each request is handled by a fresh [`WizardView`], which reads
//! the current step from the session, shows or processes that step's form,
//! and redirects back to the same URL after a step is submitted. When the
//! step counter moves past the last schema, the completion callback receives
//! every stored step value and the session bucket is cleared.
//!
//! ```
//! use formbind_core::{Request, RequestContext, ViewResponse};
//! use formbind_forms::{FieldSchema, FormWizard, HtmlEngine, SchemaField};
//! use serde_json::json;
//!
//! let wizard = FormWizard::new("signup", HtmlEngine::new(), |_request, states| {
//!     Ok(ViewResponse::Custom(json!({"completed": states.len()})))
//! })
//! .with_step(FieldSchema::new("a").with_field(SchemaField::text("x")))
//! .with_step(FieldSchema::new("b").with_field(SchemaField::text("y")));
//!
//! let url = "http://example.com/signup";
//! let submit = |session, field: &str, value: &str| {
//!     let mut request = RequestContext::new(url)
//!         .with_session(session)
//!         .with_post(field, value)
//!         .with_post("next", "next");
//!     let response = wizard.call(&mut request).unwrap();
//!     assert_eq!(response.location(), Some(url));
//!     request.into_session()
//! };
//!
//! let session = submit(Default::default(), "x", "1");
//! let session = submit(session, "y", "2");
//!
//! let mut request = RequestContext::new(url).with_session(session);
//! let response = wizard.call(&mut request).unwrap();
//! assert_eq!(response, ViewResponse::Custom(json!({"completed": 2})));
//! ```

pub mod state;
pub mod view;

pub use state::{STEP_PARAM, StepOverridePolicy, StepStates, WIZARDS_SESSION_KEY, WizardState};
pub use view::{NEXT_BUTTON, PREVIOUS_BUTTON, WizardView};

use crate::engine::{FormEngine, FormOptions};
use crate::schema::Schema;
use formbind_core::{Request, Result, ViewResponse};
use serde::Serialize;
use std::fmt;

type DoneCallback = Box<dyn Fn(&mut dyn Request, StepStates) -> Result<ViewResponse> + Send + Sync>;

/// Display metadata for one wizard step, for the host's progress template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepSummary {
	pub num: usize,
	pub name: String,
	pub title: String,
	pub desc: String,
	pub current: bool,
	/// Link selecting this step through the `step` query parameter.
	pub url: String,
	pub first: bool,
	pub last: bool,
	/// Space separated subset of `first`, `last` and `hilight`.
	pub class: String,
}

/// An ordered list of step schemas plus a completion callback.
pub struct FormWizard<E: FormEngine> {
	name: String,
	engine: E,
	steps: Vec<E::Schema>,
	done: DoneCallback,
	policy: StepOverridePolicy,
	form_options: FormOptions,
}

impl<E: FormEngine> fmt::Debug for FormWizard<E> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FormWizard")
			.field("name", &self.name)
			.field(
				"steps",
				&self.steps.iter().map(|s| s.name()).collect::<Vec<_>>(),
			)
			.field("policy", &self.policy)
			.finish_non_exhaustive()
	}
}

impl<E: FormEngine> FormWizard<E> {
	/// Create a wizard named `name`; the name keys its session bucket.
	///
	/// `done` runs once every step has been submitted, with the stored value
	/// of each step. Its result is returned to the host.
	pub fn new<F>(name: impl Into<String>, engine: E, done: F) -> Self
	where
		F: Fn(&mut dyn Request, StepStates) -> Result<ViewResponse> + Send + Sync + 'static,
	{
		Self {
			name: name.into(),
			engine,
			steps: Vec::new(),
			done: Box::new(done),
			policy: StepOverridePolicy::default(),
			form_options: FormOptions::default(),
		}
	}

	pub fn with_step(mut self, schema: E::Schema) -> Self {
		self.steps.push(schema);
		self
	}

	pub fn with_steps(mut self, schemas: impl IntoIterator<Item = E::Schema>) -> Self {
		self.steps.extend(schemas);
		self
	}

	/// How a `step` query parameter may move the wizard.
	pub fn with_policy(mut self, policy: StepOverridePolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn with_form_options(mut self, options: FormOptions) -> Self {
		self.form_options = options;
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn engine(&self) -> &E {
		&self.engine
	}

	pub fn steps(&self) -> &[E::Schema] {
		&self.steps
	}

	pub fn policy(&self) -> StepOverridePolicy {
		self.policy
	}

	pub fn form_options(&self) -> &FormOptions {
		&self.form_options
	}

	/// State store bound to this wizard's session bucket.
	pub fn state(&self) -> WizardState {
		WizardState::new(self.name.clone()).with_policy(self.policy)
	}

	/// Handle one request.
	///
	/// A wizard without steps is complete from the start, so `done` runs
	/// with empty states.
	pub fn call(&self, request: &mut dyn Request) -> Result<ViewResponse> {
		WizardView::new(self).call(request)
	}

	/// Per-step display metadata.
	///
	/// Reading the current step applies a `step` query parameter exactly as
	/// [`FormWizard::call`] would.
	pub fn summary(&self, request: &mut dyn Request) -> Result<Vec<StepSummary>> {
		let current = self.state().step_number(request)?;
		let last = self.steps.len().saturating_sub(1);

		Ok(self
			.steps
			.iter()
			.enumerate()
			.map(|(num, schema)| {
				let first = num == 0;
				let is_last = num == last;
				let is_current = num == current;
				let class = [(first, "first"), (is_last, "last"), (is_current, "hilight")]
					.iter()
					.filter(|(on, _)| *on)
					.map(|(_, class)| *class)
					.collect::<Vec<_>>()
					.join(" ");

				StepSummary {
					num,
					name: schema.name().to_string(),
					title: schema.title().to_string(),
					desc: schema.description().to_string(),
					current: is_current,
					url: format!("{}?{}={}", request.path_url(), STEP_PARAM, num),
					first,
					last: is_last,
					class,
				}
			})
			.collect())
	}

	pub(crate) fn complete(
		&self,
		request: &mut dyn Request,
		states: StepStates,
	) -> Result<ViewResponse> {
		(self.done)(request, states)
	}
}
