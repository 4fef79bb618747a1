//! Host request, session and response abstractions.
//!
//! ```rust
//! use formbind::core::{Request, RequestContext, Session};
//!
//! let mut request = RequestContext::new("http://example.com/").with_post("name", "Ada");
//! assert!(request.has_control("name"));
//! assert_eq!(request.session_mut().csrf_token().len(), 40);
//! ```

pub use formbind_core::*;
