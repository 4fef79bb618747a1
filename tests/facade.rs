//! Facade re-export tests

use formbind::prelude::*;
use rstest::rstest;
use serde_json::json;

#[rstest]
fn test_form_view_through_prelude() {
	let engine = HtmlEngine::new();
	let schema = FieldSchema::new("contact")
		.with_csrf()
		.with_field(SchemaField::text("email").required());
	let view = FormView::new(&engine, &schema)
		.with_buttons(vec![Button::new("save")])
		.on_success("save", |_: &mut (), _request, validated| {
			Ok(ViewResponse::Custom(validated))
		});

	let mut request = RequestContext::new("http://example.com/contact");
	let token = request.session_mut().csrf_token();
	let mut request = RequestContext::new("http://example.com/contact")
		.with_session(request.into_session())
		.with_post("csrf_token", token.clone())
		.with_post("email", "ada@example.com")
		.with_post("save", "save");

	let response = view.call(&mut (), &mut request).unwrap();
	assert_eq!(
		response,
		ViewResponse::Custom(json!({"csrf_token": token, "email": "ada@example.com"}))
	);
}

#[rstest]
fn test_wizard_state_through_prelude() {
	let state = WizardState::new("w").with_policy(StepOverridePolicy::Ignore);
	let mut request = RequestContext::new("http://example.com/w").with_query("step", "3");

	state.increment_step(&mut request).unwrap();
	assert_eq!(state.step_number(&mut request).unwrap(), 1);
}

#[rstest]
fn test_settings_through_prelude() {
	let settings = FormSettings::from_toml_str("[formbind]\nstatic_path = \"x\"\n").unwrap();
	assert_eq!(settings.static_path, "x");
}
