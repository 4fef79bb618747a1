//! Form views and multi-step wizards for formbind
//!
//! This crate adapts a schema-driven form engine to the host request and
//! session lifecycle described in `formbind-core`:
//!
//! - [`FormView`]: binds a schema, dispatches the submitted button to an
//!   explicitly registered handler and produces page data for the host
//! - [`FormWizard`]: a sequence of schemas presented across requests, with
//!   per-step state kept in the host session
//! - [`SchemaField::csrf_token`]: a hidden CSRF node resolved from the bind
//!   context
//! - [`SessionFileUploadTempStore`]: keeps uploads alive across failed
//!   validations
//!
//! The [`FormEngine`] and [`Schema`] traits are the seam to the form engine.
//! A small built-in engine ([`HtmlEngine`] over [`FieldSchema`]) is provided
//! so the crate works on its own.

pub mod button;
pub mod csrf;
pub mod engine;
pub mod fields;
pub mod html;
pub mod schema;
#[cfg(feature = "upload")]
pub mod upload;
pub mod view;
#[cfg(feature = "wizard")]
pub mod wizard;

pub use button::{Button, ButtonKind};
pub use csrf::{CSRF_BINDING, CSRF_FIELD_NAME, CSRF_INVALID_MESSAGE};
pub use engine::{Bindings, Form, FormEngine, FormOptions, ValidationFailure, WidgetResources};
pub use fields::{FieldDefault, FieldKind, FieldValidator, SchemaField};
pub use html::{FieldSchema, HtmlEngine, HtmlForm};
pub use schema::{IdentitySerializer, Schema, StepSerializer};
#[cfg(feature = "upload")]
pub use upload::{SessionFileUploadTempStore, StoredUpload, UploadData};
pub use view::{FailureHandler, FormView, SuccessHandler};
#[cfg(feature = "wizard")]
pub use wizard::{
	FormWizard, StepOverridePolicy, StepStates, StepSummary, WizardState, WizardView,
};
