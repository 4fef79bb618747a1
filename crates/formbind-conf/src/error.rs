//! Configuration errors

use formbind_core::Error;

/// Errors raised while reading settings or wiring assets.
#[derive(Debug, thiserror::Error)]
pub enum ConfError {
	#[error("Invalid asset spec '{0}': expected 'package:resource'")]
	InvalidAssetSpec(String),

	#[error("Unknown package '{0}'")]
	UnknownPackage(String),

	#[error("Invalid value for '{key}': {message}")]
	InvalidValue { key: String, message: String },

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("Template error: {0}")]
	Template(#[from] tera::Error),

	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
}

pub type ConfResult<T> = std::result::Result<T, ConfError>;

impl From<ConfError> for Error {
	fn from(err: ConfError) -> Self {
		match err {
			ConfError::Template(e) => Error::Template(e.to_string()),
			ConfError::Io(e) => Error::Io(e),
			other => Error::configuration(other.to_string()),
		}
	}
}
