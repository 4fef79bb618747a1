//! CSRF schema node
//!
//! The node is a hidden, required field whose default and expected value are
//! both taken from the bind context. Form views put the session token into
//! the bindings under [`CSRF_BINDING`], so a schema only needs
//! [`SchemaField::csrf_token`](crate::SchemaField::csrf_token) (or
//! [`FieldSchema::with_csrf`](crate::FieldSchema::with_csrf)) to get
//! protection.
//!
//! ```
//! use formbind_forms::{Bindings, SchemaField};
//! use serde_json::json;
//!
//! let field = SchemaField::csrf_token();
//! let mut bindings = Bindings::new();
//! bindings.insert("csrf_token".to_string(), json!("t0k3n"));
//!
//! assert_eq!(field.resolve_default(&bindings), Some(json!("t0k3n")));
//! assert!(field.clean(Some("t0k3n"), &bindings).is_ok());
//! assert_eq!(
//!     field.clean(Some("forged"), &bindings).unwrap_err(),
//!     "Invalid cross-site scripting token"
//! );
//! ```

use subtle::ConstantTimeEq;

/// Name of the hidden control carrying the token.
pub const CSRF_FIELD_NAME: &str = "csrf_token";

/// Binding key the expected token is read from.
pub const CSRF_BINDING: &str = "csrf_token";

pub const CSRF_INVALID_MESSAGE: &str = "Invalid cross-site scripting token";

/// Compare tokens without short-circuiting on the first differing byte.
pub(crate) fn tokens_match(submitted: &str, expected: &str) -> bool {
	submitted.len() == expected.len()
		&& bool::from(submitted.as_bytes().ct_eq(expected.as_bytes()))
}
