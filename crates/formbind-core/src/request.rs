//! Host request abstraction

use crate::session::{MemorySession, Session};
use std::collections::HashMap;

/// The parts of an incoming request formbind reads.
///
/// The active session travels with the request, so every operation that
/// needs session state receives it explicitly.
pub trait Request {
	/// Request URL without the query string.
	fn path_url(&self) -> &str;

	/// Value of a query string parameter.
	fn query_param(&self, name: &str) -> Option<&str>;

	/// Submitted form controls, in submission order.
	fn post(&self) -> &[(String, String)];

	fn session(&self) -> &dyn Session;

	fn session_mut(&mut self) -> &mut dyn Session;

	/// Host registry setting, if the host exposes settings per request.
	fn setting(&self, _name: &str) -> Option<&str> {
		None
	}

	/// Negotiated locale of the request.
	fn locale(&self) -> Option<&str> {
		None
	}

	/// Whether a control with `name` was submitted.
	fn has_control(&self, name: &str) -> bool {
		self.post().iter().any(|(key, _)| key == name)
	}
}

/// Builder-style [`Request`] implementation.
///
/// # Examples
///
/// ```
/// use formbind_core::{Request, RequestContext};
///
/// let request = RequestContext::new("http://example.com/form")
///     .with_post("name", "Ada")
///     .with_post("next", "next")
///     .with_setting("formbind.tempdir", "/tmp/uploads");
///
/// assert_eq!(request.path_url(), "http://example.com/form");
/// assert!(request.has_control("next"));
/// assert_eq!(request.setting("formbind.tempdir"), Some("/tmp/uploads"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext<S = MemorySession> {
	path_url: String,
	query: Vec<(String, String)>,
	post: Vec<(String, String)>,
	settings: HashMap<String, String>,
	locale: Option<String>,
	session: S,
}

impl RequestContext<MemorySession> {
	/// Create a request with an empty in-memory session.
	pub fn new(path_url: impl Into<String>) -> Self {
		Self::from_session(path_url, MemorySession::new())
	}
}

impl<S: Session> RequestContext<S> {
	/// Create a request bound to an existing host session.
	pub fn from_session(path_url: impl Into<String>, session: S) -> Self {
		Self {
			path_url: path_url.into(),
			query: Vec::new(),
			post: Vec::new(),
			settings: HashMap::new(),
			locale: None,
			session,
		}
	}

	pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.push((name.into(), value.into()));
		self
	}

	pub fn with_post(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.post.push((name.into(), value.into()));
		self
	}

	pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.settings.insert(name.into(), value.into());
		self
	}

	pub fn with_settings(mut self, settings: HashMap<String, String>) -> Self {
		self.settings.extend(settings);
		self
	}

	pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
		self.locale = Some(locale.into());
		self
	}

	/// Replace the session, keeping everything else.
	pub fn with_session(mut self, session: S) -> Self {
		self.session = session;
		self
	}

	/// Borrow the concrete host session.
	pub fn host_session(&self) -> &S {
		&self.session
	}

	pub fn host_session_mut(&mut self) -> &mut S {
		&mut self.session
	}

	/// Consume the request and hand the session back, e.g. to carry it into
	/// the next request.
	pub fn into_session(self) -> S {
		self.session
	}
}

impl<S: Session> Request for RequestContext<S> {
	fn path_url(&self) -> &str {
		&self.path_url
	}

	fn query_param(&self, name: &str) -> Option<&str> {
		self.query
			.iter()
			.find(|(key, _)| key == name)
			.map(|(_, value)| value.as_str())
	}

	fn post(&self) -> &[(String, String)] {
		&self.post
	}

	fn session(&self) -> &dyn Session {
		&self.session
	}

	fn session_mut(&mut self) -> &mut dyn Session {
		&mut self.session
	}

	fn setting(&self, name: &str) -> Option<&str> {
		self.settings.get(name).map(String::as_str)
	}

	fn locale(&self) -> Option<&str> {
		self.locale.as_deref()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_query_param_first_value_wins() {
		let request = RequestContext::new("http://example.com/")
			.with_query("step", "2")
			.with_query("step", "5");
		assert_eq!(request.query_param("step"), Some("2"));
		assert_eq!(request.query_param("missing"), None);
	}

	#[rstest]
	fn test_post_preserves_order() {
		let request = RequestContext::new("http://example.com/")
			.with_post("b", "2")
			.with_post("a", "1");
		let names: Vec<&str> = request.post().iter().map(|(k, _)| k.as_str()).collect();
		assert_eq!(names, vec!["b", "a"]);
	}

	#[rstest]
	fn test_session_survives_into_next_request() {
		let mut first = RequestContext::new("http://example.com/");
		first
			.session_mut()
			.data_mut()
			.insert("k".to_string(), json!(1));

		let second = RequestContext::new("http://example.com/").with_session(first.into_session());
		assert_eq!(second.session().data().get("k"), Some(&json!(1)));
	}

	#[rstest]
	fn test_defaults_without_settings_or_locale() {
		let request = RequestContext::new("http://example.com/");
		assert_eq!(request.setting("anything"), None);
		assert_eq!(request.locale(), None);
		assert!(!request.has_control("next"));
	}
}
