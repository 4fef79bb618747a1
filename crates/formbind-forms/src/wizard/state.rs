//! Session-backed wizard progress
//!
//! Each wizard keeps one bucket in the session under
//! [`WIZARDS_SESSION_KEY`], keyed by wizard name:
//!
//! ```text
//! { "formbind.wizards": { "<name>": { "step": 1, "states": { ... } } } }
//! ```
//!
//! The bucket is created on first access and removed by
//! [`WizardState::clear`]. Every mutation marks the session changed.

use formbind_core::{Error, Request, Result, Session};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Session key holding every wizard bucket.
pub const WIZARDS_SESSION_KEY: &str = "formbind.wizards";

/// Query parameter selecting a step directly.
pub const STEP_PARAM: &str = "step";

/// How a `step` query parameter interacts with persisted progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepOverridePolicy {
	/// The query value always wins and overwrites the persisted step.
	#[default]
	Always,
	/// The query parameter is never consulted.
	Ignore,
	/// Moving back is always allowed. Moving forward is allowed only when
	/// every step before the target has stored state.
	CompletedOnly,
}

impl StepOverridePolicy {
	fn permits(&self, target: usize, data: &WizardData) -> bool {
		match self {
			Self::Always => true,
			Self::Ignore => false,
			Self::CompletedOnly => {
				target <= data.step || (0..target).all(|step| data.states.get(step).is_some())
			}
		}
	}
}

/// Last validated value of each visited step.
///
/// Values are reachable both by step index and by step name; the two views
/// are always written together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStates {
	#[serde(default)]
	by_index: BTreeMap<usize, Value>,
	#[serde(default)]
	by_name: BTreeMap<String, Value>,
}

impl StepStates {
	pub fn new() -> Self {
		Self::default()
	}

	/// Store `state` under both `index` and `name`.
	pub fn insert(&mut self, index: usize, name: impl Into<String>, state: Value) {
		self.by_index.insert(index, state.clone());
		self.by_name.insert(name.into(), state);
	}

	pub fn get(&self, index: usize) -> Option<&Value> {
		self.by_index.get(&index)
	}

	pub fn get_by_name(&self, name: &str) -> Option<&Value> {
		self.by_name.get(name)
	}

	/// Number of stored steps.
	pub fn len(&self) -> usize {
		self.by_index.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_index.is_empty()
	}

	/// Stored values in step order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &Value)> {
		self.by_index.iter().map(|(index, value)| (*index, value))
	}

	/// Stored values keyed by step name.
	pub fn by_name(&self) -> &BTreeMap<String, Value> {
		&self.by_name
	}
}

/// Contents of one wizard bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct WizardData {
	#[serde(default)]
	pub(crate) step: usize,
	#[serde(default)]
	pub(crate) states: StepStates,
}

/// Reads and writes one wizard's bucket in the request's session.
///
/// # Examples
///
/// ```
/// use formbind_core::RequestContext;
/// use formbind_forms::WizardState;
/// use serde_json::json;
///
/// let state = WizardState::new("signup");
/// let mut request = RequestContext::new("http://example.com/signup");
///
/// assert_eq!(state.step_number(&mut request).unwrap(), 0);
/// state.set_state(&mut request, "account", json!({"x": 1})).unwrap();
/// state.increment_step(&mut request).unwrap();
///
/// let states = state.step_states(&mut request).unwrap();
/// assert_eq!(state.step_number(&mut request).unwrap(), 1);
/// assert_eq!(states.get(0), Some(&json!({"x": 1})));
/// assert_eq!(states.get_by_name("account"), Some(&json!({"x": 1})));
/// ```
#[derive(Debug, Clone)]
pub struct WizardState {
	wizard_name: String,
	policy: StepOverridePolicy,
}

impl WizardState {
	pub fn new(wizard_name: impl Into<String>) -> Self {
		Self {
			wizard_name: wizard_name.into(),
			policy: StepOverridePolicy::default(),
		}
	}

	pub fn with_policy(mut self, policy: StepOverridePolicy) -> Self {
		self.policy = policy;
		self
	}

	pub fn wizard_name(&self) -> &str {
		&self.wizard_name
	}

	pub fn policy(&self) -> StepOverridePolicy {
		self.policy
	}

	/// Current step.
	///
	/// A permitted `step` query parameter is returned and persisted as the
	/// new current step. Otherwise the persisted step is returned, `0` for a
	/// fresh wizard.
	pub fn step_number(&self, request: &mut dyn Request) -> Result<usize> {
		let data = self.load(request.session_mut())?;

		if self.policy != StepOverridePolicy::Ignore
			&& let Some(raw) = request.query_param(STEP_PARAM)
		{
			match raw.trim().parse::<usize>() {
				Ok(step) if self.policy.permits(step, &data) => {
					let raw = raw.to_string();
					self.set_step_number(request, step)?;
					tracing::debug!(
						wizard = %self.wizard_name,
						step,
						query = %raw,
						"step selected from query"
					);
					return Ok(step);
				}
				Ok(step) => {
					tracing::warn!(
						wizard = %self.wizard_name,
						step,
						current = data.step,
						"step query refused by policy"
					);
				}
				Err(_) => {
					tracing::warn!(
						wizard = %self.wizard_name,
						query = %raw,
						"ignoring malformed step query"
					);
				}
			}
		}

		Ok(data.step)
	}

	pub fn set_step_number(&self, request: &mut dyn Request, step: usize) -> Result<()> {
		let session = request.session_mut();
		let mut data = self.load(session)?;
		data.step = step;
		self.store(session, &data)
	}

	/// All stored step values.
	pub fn step_states(&self, request: &mut dyn Request) -> Result<StepStates> {
		Ok(self.load(request.session_mut())?.states)
	}

	/// Stored value of the current step, `default` when absent.
	///
	/// A `None` default yields an empty object.
	pub fn step_state(&self, request: &mut dyn Request, default: Option<Value>) -> Result<Value> {
		let step = self.step_number(request)?;
		let states = self.step_states(request)?;
		Ok(states
			.get(step)
			.cloned()
			.unwrap_or_else(|| default.unwrap_or_else(|| Value::Object(Map::new()))))
	}

	/// Store `state` under step `step` and under `name`.
	pub fn set_step_state(
		&self,
		request: &mut dyn Request,
		step: usize,
		name: &str,
		state: Value,
	) -> Result<()> {
		let session = request.session_mut();
		let mut data = self.load(session)?;
		data.states.insert(step, name, state);
		self.store(session, &data)
	}

	/// Store `state` for the current step.
	pub fn set_state(&self, request: &mut dyn Request, name: &str, state: Value) -> Result<()> {
		let step = self.step_number(request)?;
		self.set_step_state(request, step, name, state)
	}

	pub fn increment_step(&self, request: &mut dyn Request) -> Result<()> {
		let step = self.step_number(request)?;
		self.set_step_number(request, step + 1)
	}

	/// Move back one step. Does nothing at step 0.
	pub fn decrement_step(&self, request: &mut dyn Request) -> Result<()> {
		let step = self.step_number(request)?;
		if step > 0 {
			self.set_step_number(request, step - 1)?;
		}
		Ok(())
	}

	/// Drop the whole bucket.
	pub fn clear(&self, request: &mut dyn Request) -> Result<()> {
		let session = request.session_mut();
		if let Some(Value::Object(wizards)) = session.data_mut().get_mut(WIZARDS_SESSION_KEY) {
			wizards.remove(&self.wizard_name);
		}
		session.changed();
		tracing::debug!(wizard = %self.wizard_name, "wizard state cleared");
		Ok(())
	}

	fn wizards<'s>(&self, session: &'s mut dyn Session) -> Result<&'s mut Map<String, Value>> {
		session
			.data_mut()
			.entry(WIZARDS_SESSION_KEY)
			.or_insert_with(|| Value::Object(Map::new()))
			.as_object_mut()
			.ok_or_else(|| Error::SessionData {
				key: WIZARDS_SESSION_KEY.to_string(),
				reason: "expected an object".to_string(),
			})
	}

	fn load(&self, session: &mut dyn Session) -> Result<WizardData> {
		let wizards = self.wizards(session)?;
		let existing = match wizards.get(&self.wizard_name) {
			Some(bucket) => Some(serde_json::from_value::<WizardData>(bucket.clone()).map_err(
				|e| Error::SessionData {
					key: format!("{}.{}", WIZARDS_SESSION_KEY, self.wizard_name),
					reason: e.to_string(),
				},
			)?),
			None => None,
		};

		match existing {
			Some(data) => Ok(data),
			None => {
				let data = WizardData::default();
				wizards.insert(self.wizard_name.clone(), serde_json::to_value(&data)?);
				session.changed();
				Ok(data)
			}
		}
	}

	fn store(&self, session: &mut dyn Session, data: &WizardData) -> Result<()> {
		let value = serde_json::to_value(data)?;
		self.wizards(session)?
			.insert(self.wizard_name.clone(), value);
		session.changed();
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formbind_core::{MemorySession, RequestContext};
	use proptest::prelude::*;
	use rstest::{fixture, rstest};
	use serde_json::json;

	#[fixture]
	fn state() -> WizardState {
		WizardState::new("wiz")
	}

	#[fixture]
	fn request() -> RequestContext {
		RequestContext::new("http://example.com/wiz")
	}

	fn with_query(request: RequestContext, step: &str) -> RequestContext {
		let session = request.into_session();
		RequestContext::new("http://example.com/wiz")
			.with_session(session)
			.with_query(STEP_PARAM, step)
	}

	#[rstest]
	fn test_fresh_wizard_starts_at_zero(state: WizardState, mut request: RequestContext) {
		assert_eq!(state.step_number(&mut request).unwrap(), 0);
		assert!(request.host_session().is_changed());
		assert_eq!(
			request.host_session().data().get(WIZARDS_SESSION_KEY),
			Some(&json!({"wiz": {"step": 0, "states": {"by_index": {}, "by_name": {}}}}))
		);
	}

	#[rstest]
	fn test_set_step_number_marks_changed(state: WizardState, mut request: RequestContext) {
		state.step_number(&mut request).unwrap();
		request.host_session_mut().reset_changed();

		state.set_step_number(&mut request, 3).unwrap();

		assert!(request.host_session().is_changed());
		assert_eq!(state.step_number(&mut request).unwrap(), 3);
	}

	#[rstest]
	fn test_query_overrides_and_persists(state: WizardState, mut request: RequestContext) {
		state.set_step_number(&mut request, 1).unwrap();
		let mut request = with_query(request, "4");

		assert_eq!(state.step_number(&mut request).unwrap(), 4);

		let mut request = RequestContext::new("http://example.com/wiz").with_session(request.into_session());
		assert_eq!(state.step_number(&mut request).unwrap(), 4);
	}

	#[rstest]
	#[case("abc")]
	#[case("-1")]
	#[case("")]
	fn test_malformed_query_is_ignored(state: WizardState, mut request: RequestContext, #[case] raw: &str) {
		state.set_step_number(&mut request, 2).unwrap();
		let mut request = with_query(request, raw);

		assert_eq!(state.step_number(&mut request).unwrap(), 2);
	}

	#[rstest]
	fn test_ignore_policy(mut request: RequestContext) {
		let state = WizardState::new("wiz").with_policy(StepOverridePolicy::Ignore);
		state.set_step_number(&mut request, 1).unwrap();
		let mut request = with_query(request, "0");

		assert_eq!(state.step_number(&mut request).unwrap(), 1);
	}

	#[rstest]
	fn test_completed_only_policy(mut request: RequestContext) {
		let state = WizardState::new("wiz").with_policy(StepOverridePolicy::CompletedOnly);
		state.set_step_state(&mut request, 0, "a", json!({})).unwrap();
		state.set_step_number(&mut request, 1).unwrap();

		// backward
		let mut back = with_query(request, "0");
		assert_eq!(state.step_number(&mut back).unwrap(), 0);

		// forward to 1 is allowed: step 0 has state
		let mut forward = with_query(back, "1");
		assert_eq!(state.step_number(&mut forward).unwrap(), 1);

		// forward to 3 skips an incomplete step 1
		let mut skip = with_query(forward, "3");
		assert_eq!(state.step_number(&mut skip).unwrap(), 1);
	}

	#[rstest]
	fn test_state_written_under_index_and_name(state: WizardState, mut request: RequestContext) {
		state.set_state(&mut request, "a", json!({"x": 1})).unwrap();

		let states = state.step_states(&mut request).unwrap();
		assert_eq!(states.get(0), Some(&json!({"x": 1})));
		assert_eq!(states.get_by_name("a"), Some(&json!({"x": 1})));
		assert_eq!(states.len(), 1);
	}

	#[rstest]
	fn test_step_state_defaults(state: WizardState, mut request: RequestContext) {
		assert_eq!(state.step_state(&mut request, None).unwrap(), json!({}));
		assert_eq!(
			state.step_state(&mut request, Some(json!({"d": true}))).unwrap(),
			json!({"d": true})
		);

		state.set_state(&mut request, "a", json!({"x": 1})).unwrap();
		assert_eq!(
			state.step_state(&mut request, Some(json!({"d": true}))).unwrap(),
			json!({"x": 1})
		);
	}

	#[rstest]
	fn test_decrement_at_zero_is_noop(state: WizardState, mut request: RequestContext) {
		state.decrement_step(&mut request).unwrap();
		assert_eq!(state.step_number(&mut request).unwrap(), 0);
	}

	#[rstest]
	fn test_clear_removes_bucket(state: WizardState, mut request: RequestContext) {
		state.set_state(&mut request, "a", json!(1)).unwrap();
		state.increment_step(&mut request).unwrap();
		request.host_session_mut().reset_changed();

		state.clear(&mut request).unwrap();

		assert!(request.host_session().is_changed());
		assert_eq!(
			request.host_session().data().get(WIZARDS_SESSION_KEY),
			Some(&json!({}))
		);
		assert_eq!(state.step_number(&mut request).unwrap(), 0);
		assert!(state.step_states(&mut request).unwrap().is_empty());
	}

	#[rstest]
	fn test_buckets_are_per_wizard(mut request: RequestContext) {
		let first = WizardState::new("first");
		let second = WizardState::new("second");

		first.increment_step(&mut request).unwrap();
		assert_eq!(first.step_number(&mut request).unwrap(), 1);
		assert_eq!(second.step_number(&mut request).unwrap(), 0);

		first.clear(&mut request).unwrap();
		second.increment_step(&mut request).unwrap();
		assert_eq!(second.step_number(&mut request).unwrap(), 1);
	}

	#[rstest]
	fn test_corrupt_bucket_is_reported(state: WizardState) {
		let mut data = Map::new();
		data.insert(WIZARDS_SESSION_KEY.to_string(), json!({"wiz": {"step": "x"}}));
		let mut request = RequestContext::new("http://example.com/wiz")
			.with_session(MemorySession::with_data(data));

		let err = state.step_number(&mut request).unwrap_err();
		assert!(matches!(err, Error::SessionData { .. }));
	}

	#[rstest]
	fn test_non_object_wizards_key_is_reported(state: WizardState) {
		let mut data = Map::new();
		data.insert(WIZARDS_SESSION_KEY.to_string(), json!([]));
		let mut request = RequestContext::new("http://example.com/wiz")
			.with_session(MemorySession::with_data(data));

		assert!(state.step_number(&mut request).is_err());
	}

	proptest! {
		#[test]
		fn prop_step_counter_matches_model(moves in proptest::collection::vec(any::<bool>(), 0..40)) {
			let state = WizardState::new("wiz");
			let mut request = RequestContext::new("http://example.com/wiz");
			let mut model: usize = 0;

			for forward in moves {
				if forward {
					state.increment_step(&mut request).unwrap();
					model += 1;
				} else {
					state.decrement_step(&mut request).unwrap();
					model = model.saturating_sub(1);
				}
				prop_assert_eq!(state.step_number(&mut request).unwrap(), model);
			}
		}
	}
}
