//! # formbind-core
//!
//! Abstractions over the web host that formbind plugs into.
//!
//! formbind never owns HTTP handling, routing or session storage. Instead it
//! talks to the host through a small set of traits:
//!
//! - [`Session`]: a mapping with an explicit "mark changed" notification
//! - [`Request`]: query parameters, submitted controls, settings and the
//!   active session, passed explicitly through every call
//! - [`ViewResponse`]: what a view hands back to the host (a redirect, page
//!   data for the host template, or an arbitrary value)
//!
//! [`MemorySession`] and [`RequestContext`] are ready-made implementations
//! for simple hosts and for tests.
//!
//! ## Example
//!
//! ```
//! use formbind_core::{MemorySession, Request, RequestContext, Session};
//! use serde_json::json;
//!
//! let mut request = RequestContext::new("http://example.com/signup")
//!     .with_query("step", "1")
//!     .with_session(MemorySession::new());
//!
//! assert_eq!(request.query_param("step"), Some("1"));
//!
//! request.session_mut().data_mut().insert("seen".to_string(), json!(true));
//! request.session_mut().changed();
//! assert_eq!(request.session().data().get("seen"), Some(&json!(true)));
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod session;

pub use error::{Error, Result};
pub use request::{Request, RequestContext};
pub use response::{RenderedPage, ViewResponse};
pub use session::{MemorySession, Session};
