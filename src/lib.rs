//! # formbind
//!
//! Bindings between a schema-driven form engine and a web host's request and
//! session lifecycle.
//!
//! formbind does not parse HTTP, route URLs or store sessions. The host hands
//! every call a [`Request`](crate::core::Request) carrying the submitted
//! controls, query parameters, settings and the active session, and receives
//! a [`ViewResponse`](crate::core::ViewResponse) back.
//!
//! ## Feature Flags
//!
//! - `forms` - [`FormView`](crate::forms::FormView), the form engine seam and
//!   the built-in HTML engine
//! - `wizard` - multi-step [`FormWizard`](crate::forms::FormWizard) with
//!   session-backed progress
//! - `upload` - session-backed upload temp storage
//! - `conf` - settings, the `include` startup hook, template search path and
//!   translator
//! - `minimal` - `forms` only
//! - `full` (default) - everything
//!
//! ## Quick Example
//!
//! ```rust
//! use formbind::prelude::*;
//! use serde_json::json;
//!
//! let wizard = FormWizard::new("signup", HtmlEngine::new(), |_request, states| {
//!     Ok(ViewResponse::Custom(json!(states.by_name())))
//! })
//! .with_step(FieldSchema::new("account").with_field(SchemaField::text("login").required()))
//! .with_step(FieldSchema::new("profile").with_field(SchemaField::text("bio")));
//!
//! let mut request = RequestContext::new("http://example.com/signup");
//! let response = wizard.call(&mut request).unwrap();
//! assert!(response.page().unwrap().form.contains("name=\"login\""));
//! ```

pub mod core;
#[cfg(feature = "conf")]
pub mod conf;
#[cfg(feature = "forms")]
pub mod forms;

pub use formbind_core::{Error, Result};

/// Commonly used types.
pub mod prelude {
	pub use crate::core::{
		Error, MemorySession, RenderedPage, Request, RequestContext, Result, Session, ViewResponse,
	};

	#[cfg(feature = "forms")]
	pub use crate::forms::{
		Button, FieldKind, FieldSchema, Form, FormEngine, FormView, HtmlEngine, Schema,
		SchemaField, StepSerializer, ValidationFailure,
	};

	#[cfg(feature = "wizard")]
	pub use crate::forms::{FormWizard, StepOverridePolicy, StepStates, WizardState};

	#[cfg(feature = "upload")]
	pub use crate::forms::{SessionFileUploadTempStore, UploadData};

	#[cfg(feature = "conf")]
	pub use crate::conf::{AppConfig, Configurator, FormSettings, Translator, include};
}
