//! Host session abstraction
//!
//! The host owns session storage and its durability contract. formbind only
//! assumes a mutable JSON mapping plus a "changed" notification that the
//! host acts on when persisting.

use rand::RngCore;
use serde_json::{Map, Value};

/// Session key under which the CSRF token is kept.
pub const CSRF_TOKEN_KEY: &str = "_csrft_";

/// Mapping-like session supplied by the host.
pub trait Session {
	/// Borrow the session contents.
	fn data(&self) -> &Map<String, Value>;

	/// Mutably borrow the session contents.
	///
	/// Mutating through this reference does not flag the session; callers
	/// follow up with [`Session::changed`].
	fn data_mut(&mut self) -> &mut Map<String, Value>;

	/// Mark the session as needing persistence.
	fn changed(&mut self);

	/// Return the CSRF token bound to this session, creating it on first use.
	fn csrf_token(&mut self) -> String {
		if let Some(Value::String(token)) = self.data().get(CSRF_TOKEN_KEY) {
			return token.clone();
		}
		let token = new_csrf_token();
		self.data_mut()
			.insert(CSRF_TOKEN_KEY.to_string(), Value::String(token.clone()));
		self.changed();
		token
	}
}

/// Generate a fresh CSRF token: 20 random bytes, hex encoded.
pub fn new_csrf_token() -> String {
	let mut bytes = [0u8; 20];
	rand::thread_rng().fill_bytes(&mut bytes);
	bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// In-memory session.
///
/// Useful for hosts that keep sessions elsewhere and only need a scratch
/// mapping per request, and for tests that inspect the dirty flag.
///
/// # Examples
///
/// ```
/// use formbind_core::{MemorySession, Session};
///
/// let mut session = MemorySession::new();
/// assert!(!session.is_changed());
///
/// let token = session.csrf_token();
/// assert_eq!(token.len(), 40);
/// assert!(session.is_changed());
/// assert_eq!(session.csrf_token(), token);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
	data: Map<String, Value>,
	changed: bool,
}

impl MemorySession {
	pub fn new() -> Self {
		Self::default()
	}

	/// Create a session pre-populated with `data`.
	pub fn with_data(data: Map<String, Value>) -> Self {
		Self {
			data,
			changed: false,
		}
	}

	/// Whether [`Session::changed`] has been called since creation or the
	/// last [`MemorySession::reset_changed`].
	pub fn is_changed(&self) -> bool {
		self.changed
	}

	pub fn reset_changed(&mut self) {
		self.changed = false;
	}

	/// Consume the session and return its contents.
	pub fn into_data(self) -> Map<String, Value> {
		self.data
	}
}

impl Session for MemorySession {
	fn data(&self) -> &Map<String, Value> {
		&self.data
	}

	fn data_mut(&mut self) -> &mut Map<String, Value> {
		&mut self.data
	}

	fn changed(&mut self) {
		self.changed = true;
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_new_session_is_clean() {
		let session = MemorySession::new();
		assert!(session.data().is_empty());
		assert!(!session.is_changed());
	}

	#[rstest]
	fn test_csrf_token_is_stable_and_hex() {
		let mut session = MemorySession::new();
		let token = session.csrf_token();

		assert_eq!(token.len(), 40);
		assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
		assert_eq!(session.csrf_token(), token);
		assert_eq!(session.data().get(CSRF_TOKEN_KEY), Some(&json!(token)));
	}

	#[rstest]
	fn test_existing_csrf_token_is_reused() {
		let mut data = Map::new();
		data.insert(CSRF_TOKEN_KEY.to_string(), json!("abc"));
		let mut session = MemorySession::with_data(data);

		assert_eq!(session.csrf_token(), "abc");
		assert!(!session.is_changed());
	}

	#[rstest]
	fn test_reset_changed() {
		let mut session = MemorySession::new();
		session.changed();
		assert!(session.is_changed());

		session.reset_changed();
		assert!(!session.is_changed());
	}

	#[rstest]
	fn test_tokens_differ_between_sessions() {
		assert_ne!(new_csrf_token(), new_csrf_token());
	}
}
