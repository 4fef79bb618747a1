//! Schema nodes for the built-in engine

use crate::csrf::{CSRF_BINDING, CSRF_FIELD_NAME, CSRF_INVALID_MESSAGE, tokens_match};
use crate::engine::Bindings;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

pub const REQUIRED_MESSAGE: &str = "Required";

/// Value type and widget of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
	/// Single line text input.
	Text,
	/// Text input parsed as a signed integer.
	Integer,
	/// Checkbox; absent means `false`.
	Boolean,
	/// Hidden input holding text.
	Hidden,
}

/// Default value of a field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldDefault {
	Value(Value),
	/// Resolved from the bind context when the form is built.
	Binding(String),
}

type CustomValidator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

/// Check run against a cleaned value.
#[derive(Clone)]
pub enum FieldValidator {
	/// The value must equal the string bound under `binding`.
	MatchesBinding { binding: String, message: String },
	/// Character count bounds for text values.
	Length {
		min: Option<usize>,
		max: Option<usize>,
	},
	Custom(CustomValidator),
}

impl fmt::Debug for FieldValidator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::MatchesBinding { binding, message } => f
				.debug_struct("MatchesBinding")
				.field("binding", binding)
				.field("message", message)
				.finish(),
			Self::Length { min, max } => f
				.debug_struct("Length")
				.field("min", min)
				.field("max", max)
				.finish(),
			Self::Custom(_) => f.write_str("Custom(..)"),
		}
	}
}

impl FieldValidator {
	pub fn custom<F>(check: F) -> Self
	where
		F: Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
	{
		Self::Custom(Arc::new(check))
	}

	fn check(&self, value: &Value, bindings: &Bindings) -> Result<(), String> {
		match self {
			Self::MatchesBinding { binding, message } => {
				let expected = bindings.get(binding).and_then(Value::as_str);
				match (value.as_str(), expected) {
					(Some(submitted), Some(expected)) if tokens_match(submitted, expected) => {
						Ok(())
					}
					_ => Err(message.clone()),
				}
			}
			Self::Length { min, max } => {
				let Some(text) = value.as_str() else {
					return Ok(());
				};
				let count = text.chars().count();
				if let Some(min) = min
					&& count < *min
				{
					return Err(format!("Shorter than minimum length {}", min));
				}
				if let Some(max) = max
					&& count > *max
				{
					return Err(format!("Longer than maximum length {}", max));
				}
				Ok(())
			}
			Self::Custom(check) => check(value),
		}
	}
}

/// A node of a [`FieldSchema`](crate::FieldSchema).
///
/// # Examples
///
/// ```
/// use formbind_forms::{Bindings, FieldKind, SchemaField};
/// use serde_json::json;
///
/// let age = SchemaField::new("age", FieldKind::Integer).required();
/// let bindings = Bindings::new();
///
/// assert_eq!(age.clean(Some(" 42 "), &bindings), Ok(json!(42)));
/// assert_eq!(age.clean(Some(""), &bindings), Err("Required".to_string()));
/// ```
#[derive(Debug, Clone)]
pub struct SchemaField {
	pub name: String,
	pub title: String,
	pub description: Option<String>,
	pub kind: FieldKind,
	pub required: bool,
	pub default: Option<FieldDefault>,
	pub validators: Vec<FieldValidator>,
}

impl SchemaField {
	pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
		let name = name.into();
		Self {
			title: title_from_name(&name),
			name,
			description: None,
			kind,
			required: false,
			default: None,
			validators: Vec::new(),
		}
	}

	/// Shorthand for a text field.
	pub fn text(name: impl Into<String>) -> Self {
		Self::new(name, FieldKind::Text)
	}

	/// Hidden CSRF token node.
	///
	/// Its default is the bound session token and submissions must echo it
	/// back exactly.
	pub fn csrf_token() -> Self {
		Self::new(CSRF_FIELD_NAME, FieldKind::Hidden)
			.required()
			.with_default(FieldDefault::Binding(CSRF_BINDING.to_string()))
			.with_validator(FieldValidator::MatchesBinding {
				binding: CSRF_BINDING.to_string(),
				message: CSRF_INVALID_MESSAGE.to_string(),
			})
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn with_default(mut self, default: FieldDefault) -> Self {
		self.default = Some(default);
		self
	}

	pub fn with_validator(mut self, validator: FieldValidator) -> Self {
		self.validators.push(validator);
		self
	}

	/// Default value after resolving bindings.
	pub fn resolve_default(&self, bindings: &Bindings) -> Option<Value> {
		match &self.default {
			Some(FieldDefault::Value(value)) => Some(value.clone()),
			Some(FieldDefault::Binding(key)) => bindings.get(key).cloned(),
			None => None,
		}
	}

	/// Turn a submitted control into a validated value.
	pub fn clean(&self, raw: Option<&str>, bindings: &Bindings) -> Result<Value, String> {
		let value = match self.kind {
			FieldKind::Boolean => Value::Bool(matches!(
				raw.map(str::trim),
				Some(v) if !v.is_empty() && v != "false"
			)),
			FieldKind::Text | FieldKind::Hidden | FieldKind::Integer => {
				let raw = raw.map(str::trim).unwrap_or("");
				if raw.is_empty() {
					if self.required {
						return Err(REQUIRED_MESSAGE.to_string());
					}
					return Ok(Value::Null);
				}
				if self.kind == FieldKind::Integer {
					raw.parse::<i64>()
						.map(Value::from)
						.map_err(|_| format!("\"{}\" is not a number", raw))?
				} else {
					Value::String(raw.to_string())
				}
			}
		};

		for validator in &self.validators {
			validator.check(&value, bindings)?;
		}
		Ok(value)
	}
}

fn title_from_name(name: &str) -> String {
	name.split('_')
		.filter(|part| !part.is_empty())
		.map(|part| {
			let mut chars = part.chars();
			match chars.next() {
				Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
				None => String::new(),
			}
		})
		.collect::<Vec<_>>()
		.join(" ")
}
