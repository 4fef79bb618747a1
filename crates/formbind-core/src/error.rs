//! Error types shared by every formbind crate

/// Errors raised while wiring or running form views.
///
/// Form validation failures are deliberately absent: they are recovered
/// inside the view that triggered them and never reach the host.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// A required setting or registration is missing or malformed.
	///
	/// Raised at setup time and treated as fatal.
	#[error("Improperly configured: {0}")]
	ImproperlyConfigured(String),
	/// Data found in the session does not have the expected shape.
	#[error("Corrupt session data under '{key}': {reason}")]
	SessionData { key: String, reason: String },
	/// A step serializer rejected a value.
	#[error("Step serializer error: {0}")]
	Serializer(String),
	#[error("Template error: {0}")]
	Template(String),
	#[error(transparent)]
	Json(#[from] serde_json::Error),
	#[error(transparent)]
	Io(#[from] std::io::Error),
}

impl Error {
	/// Shorthand for [`Error::ImproperlyConfigured`].
	pub fn configuration(message: impl Into<String>) -> Self {
		Self::ImproperlyConfigured(message.into())
	}
}

pub type Result<T> = std::result::Result<T, Error>;
