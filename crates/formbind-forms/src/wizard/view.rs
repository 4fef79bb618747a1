//! Per-request wizard handling

use super::FormWizard;
use super::state::{StepStates, WizardState};
use crate::button::Button;
use crate::engine::FormEngine;
use crate::schema::Schema;
use crate::view::FormView;
use formbind_core::{Request, Result, ViewResponse};
use serde_json::Value;

pub const PREVIOUS_BUTTON: &str = "previous";
pub const NEXT_BUTTON: &str = "next";

/// Handles one request against a [`FormWizard`].
///
/// The persisted step decides what happens: a step past the last schema
/// finishes the wizard, anything else shows or processes that step's form.
pub struct WizardView<'w, E: FormEngine> {
	wizard: &'w FormWizard<E>,
	state: WizardState,
	step: usize,
}

impl<'w, E: FormEngine> WizardView<'w, E> {
	pub fn new(wizard: &'w FormWizard<E>) -> Self {
		Self {
			state: wizard.state(),
			wizard,
			step: 0,
		}
	}

	pub fn call(&mut self, request: &mut dyn Request) -> Result<ViewResponse> {
		let wizard = self.wizard;
		let step = self.state.step_number(request)?;

		if step >= wizard.steps().len() {
			return self.finish(request);
		}
		self.step = step;

		let schema = &wizard.steps()[step];
		let prev_disabled = !schema.prev_ok(request);
		let next_disabled = !schema.next_ok(request);

		let mut buttons = Vec::with_capacity(2);
		if step > 0 {
			buttons.push(
				Button::new(PREVIOUS_BUTTON)
					.with_title("Previous")
					.disabled(prev_disabled),
			);
		}
		let next_title = if step + 1 < wizard.steps().len() {
			"Next"
		} else {
			"Done"
		};
		buttons.push(
			Button::new(NEXT_BUTTON)
				.with_title(next_title)
				.disabled(next_disabled),
		);

		tracing::debug!(
			wizard = wizard.name(),
			step,
			schema = schema.name(),
			"showing wizard step"
		);

		let view = FormView::new(wizard.engine(), schema)
			.with_buttons(buttons)
			.with_options(wizard.form_options().clone())
			.on_success(NEXT_BUTTON, Self::next_success)
			.on_success(PREVIOUS_BUTTON, Self::previous_success)
			.on_failure(PREVIOUS_BUTTON, Self::previous_failure)
			.with_prefill(Self::prefill);
		view.call(self, request)
	}

	/// Index of the step this view is handling.
	pub fn step(&self) -> usize {
		self.step
	}

	fn schema(&self) -> &'w E::Schema {
		&self.wizard.steps()[self.step]
	}

	fn finish(&mut self, request: &mut dyn Request) -> Result<ViewResponse> {
		let states: StepStates = self.state.step_states(request)?;
		tracing::info!(
			wizard = self.wizard.name(),
			steps = states.len(),
			"wizard complete"
		);
		let result = self.wizard.complete(request, states)?;
		self.state.clear(request)?;
		Ok(result)
	}

	fn serialize(&self, value: Value) -> Result<Value> {
		self.schema().wizard_serializer().serialize(value)
	}

	fn deserialize(&self, value: Value) -> Result<Value> {
		self.schema().wizard_serializer().deserialize(value)
	}

	fn prefill(&mut self, request: &mut dyn Request) -> Result<Option<Value>> {
		let state = self.state.step_state(request, self.schema().appstruct())?;
		Ok(Some(self.deserialize(state)?))
	}

	fn next_success(&mut self, request: &mut dyn Request, validated: Value) -> Result<ViewResponse> {
		let validated = self.serialize(validated)?;
		self.state.set_state(request, self.schema().name(), validated)?;
		self.state.increment_step(request)?;
		Ok(ViewResponse::found(request.path_url()))
	}

	fn previous_success(
		&mut self,
		request: &mut dyn Request,
		validated: Value,
	) -> Result<ViewResponse> {
		let validated = self.serialize(validated)?;
		self.state.set_state(request, self.schema().name(), validated)?;
		self.state.decrement_step(request)?;
		Ok(ViewResponse::found(request.path_url()))
	}

	fn previous_failure(
		&mut self,
		request: &mut dyn Request,
		_failure: crate::engine::ValidationFailure,
	) -> Result<ViewResponse> {
		self.state.decrement_step(request)?;
		Ok(ViewResponse::found(request.path_url()))
	}
}
