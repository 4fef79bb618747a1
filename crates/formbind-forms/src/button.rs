//! Form buttons

/// HTML button type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonKind {
	#[default]
	Submit,
	Reset,
	Button,
}

impl ButtonKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			Self::Submit => "submit",
			Self::Reset => "reset",
			Self::Button => "button",
		}
	}
}

/// A button declared on a form.
///
/// The button name doubles as the submitted control that identifies which
/// handler runs.
///
/// # Examples
///
/// ```
/// use formbind_forms::Button;
///
/// let button = Button::new("next");
/// assert_eq!(button.title, "Next");
/// assert_eq!(button.value, "next");
/// assert!(!button.disabled);
///
/// let done = Button::new("next").with_title("Done").disabled(true);
/// assert_eq!(done.title, "Done");
/// assert!(done.disabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
	pub name: String,
	pub title: String,
	pub value: String,
	pub kind: ButtonKind,
	pub disabled: bool,
}

impl Button {
	/// Create a submit button titled after its capitalised name.
	pub fn new(name: impl Into<String>) -> Self {
		let name = name.into();
		Self {
			title: capitalize(&name),
			value: name.clone(),
			name,
			kind: ButtonKind::Submit,
			disabled: false,
		}
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_value(mut self, value: impl Into<String>) -> Self {
		self.value = value.into();
		self
	}

	pub fn with_kind(mut self, kind: ButtonKind) -> Self {
		self.kind = kind;
		self
	}

	pub fn disabled(mut self, disabled: bool) -> Self {
		self.disabled = disabled;
		self
	}
}

fn capitalize(name: &str) -> String {
	let mut chars = name.chars();
	match chars.next() {
		Some(first) => first.to_uppercase().chain(chars).collect(),
		None => String::new(),
	}
}
