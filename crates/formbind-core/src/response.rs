//! View results handed back to the host

use serde::Serialize;
use serde_json::{Map, Value};

/// Page data for the host template.
///
/// Serializes to `{"form": ..., "js_links": [...], "css_links": [...]}` with
/// any extra keys flattened alongside.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RenderedPage {
	pub form: String,
	pub js_links: Vec<String>,
	pub css_links: Vec<String>,
	#[serde(flatten)]
	pub extra: Map<String, Value>,
}

impl RenderedPage {
	pub fn new(form: impl Into<String>) -> Self {
		Self {
			form: form.into(),
			..Self::default()
		}
	}

	pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
		self.extra.insert(key.into(), value);
		self
	}
}

/// Result of running a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewResponse {
	/// `302 Found` pointing at `location`.
	Redirect { location: String },
	/// Data for the host to render.
	Page(RenderedPage),
	/// Any other value produced by an application callback.
	Custom(Value),
}

impl ViewResponse {
	/// Build a `302 Found` redirect.
	///
	/// # Examples
	///
	/// ```
	/// use formbind_core::ViewResponse;
	///
	/// let response = ViewResponse::found("http://example.com/wizard");
	/// assert_eq!(response.location(), Some("http://example.com/wizard"));
	/// ```
	pub fn found(location: impl Into<String>) -> Self {
		Self::Redirect {
			location: location.into(),
		}
	}

	pub fn location(&self) -> Option<&str> {
		match self {
			Self::Redirect { location } => Some(location),
			_ => None,
		}
	}

	pub fn page(&self) -> Option<&RenderedPage> {
		match self {
			Self::Page(page) => Some(page),
			_ => None,
		}
	}

	pub fn is_redirect(&self) -> bool {
		matches!(self, Self::Redirect { .. })
	}
}

impl From<RenderedPage> for ViewResponse {
	fn from(page: RenderedPage) -> Self {
		Self::Page(page)
	}
}
