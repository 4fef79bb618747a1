//! Schema capabilities used by form views and wizards

use formbind_core::{Request, Result};
use serde_json::Value;
use std::sync::Arc;

/// Transform applied to a step's validated value before it is stored in the
/// session, and reversed when the step is shown again.
pub trait StepSerializer {
	fn serialize(&self, value: Value) -> Result<Value>;
	fn deserialize(&self, value: Value) -> Result<Value>;
}

/// Stores values unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentitySerializer;

impl StepSerializer for IdentitySerializer {
	fn serialize(&self, value: Value) -> Result<Value> {
		Ok(value)
	}

	fn deserialize(&self, value: Value) -> Result<Value> {
		Ok(value)
	}
}

impl<T: StepSerializer + ?Sized> StepSerializer for Arc<T> {
	fn serialize(&self, value: Value) -> Result<Value> {
		(**self).serialize(value)
	}

	fn deserialize(&self, value: Value) -> Result<Value> {
		(**self).deserialize(value)
	}
}

/// A form schema as seen by views and wizards.
///
/// Only [`Schema::name`] is mandatory. Every other capability has a default:
/// empty title and description, no default value, navigation always
/// permitted and identity serialization.
pub trait Schema {
	fn name(&self) -> &str;

	fn title(&self) -> &str {
		""
	}

	fn description(&self) -> &str {
		""
	}

	/// Default value used to prefill the form.
	fn appstruct(&self) -> Option<Value> {
		None
	}

	/// Whether the wizard's `previous` button is enabled.
	fn prev_ok(&self, _request: &dyn Request) -> bool {
		true
	}

	/// Whether the wizard's `next` (or `done`) button is enabled.
	fn next_ok(&self, _request: &dyn Request) -> bool {
		true
	}

	/// Serializer applied to this schema's values in wizard state.
	fn wizard_serializer(&self) -> Box<dyn StepSerializer + '_> {
		Box::new(IdentitySerializer)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formbind_core::RequestContext;
	use rstest::rstest;
	use serde_json::json;

	struct Bare;

	impl Schema for Bare {
		fn name(&self) -> &str {
			"bare"
		}
	}

	#[rstest]
	fn test_capability_defaults() {
		let request = RequestContext::new("http://example.com/");
		let schema = Bare;

		assert_eq!(schema.title(), "");
		assert_eq!(schema.description(), "");
		assert_eq!(schema.appstruct(), None);
		assert!(schema.prev_ok(&request));
		assert!(schema.next_ok(&request));
	}

	#[rstest]
	fn test_default_serializer_is_identity() {
		let schema = Bare;
		let serializer = schema.wizard_serializer();
		let value = json!({"a": [1, 2]});

		assert_eq!(serializer.serialize(value.clone()).unwrap(), value);
		assert_eq!(serializer.deserialize(value.clone()).unwrap(), value);
	}
}
