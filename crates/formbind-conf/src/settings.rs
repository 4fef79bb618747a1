//! formbind settings
//!
//! Settings arrive either as the host's flat string registry (keys prefixed
//! with `formbind.`) or as a `[formbind]` table in a TOML document:
//!
//! ```toml
//! [formbind]
//! template_search_path = "myapp:templates shared:forms"
//! static_path = "assets/forms"
//! ```
//!
//! The upload store's `formbind.tempdir` key is read by the forms crate
//! directly from the request settings and is not part of [`FormSettings`].

use crate::error::{ConfError, ConfResult};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::Path;

pub const TEMPLATE_SEARCH_PATH_SETTING: &str = "formbind.template_search_path";
pub const STATIC_PATH_SETTING: &str = "formbind.static_path";

/// Mount point of the static view when none is configured.
pub const DEFAULT_STATIC_PATH: &str = "static-deform";

const TOML_TABLE: &str = "formbind";

/// Resolved formbind settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSettings {
	/// `package:resource` specs searched before the built-in templates.
	#[serde(default, deserialize_with = "deserialize_search_path")]
	pub template_search_path: Vec<String>,

	#[serde(default = "default_static_path")]
	pub static_path: String,
}

impl Default for FormSettings {
	fn default() -> Self {
		Self {
			template_search_path: Vec::new(),
			static_path: default_static_path(),
		}
	}
}

fn default_static_path() -> String {
	DEFAULT_STATIC_PATH.to_string()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SearchPath {
	Joined(String),
	List(Vec<String>),
}

fn deserialize_search_path<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	Ok(match SearchPath::deserialize(deserializer)? {
		SearchPath::Joined(joined) => split_search_path(&joined),
		SearchPath::List(list) => list
			.iter()
			.flat_map(|entry| split_search_path(entry))
			.collect(),
	})
}

fn split_search_path(raw: &str) -> Vec<String> {
	raw.split_whitespace().map(str::to_string).collect()
}

impl FormSettings {
	/// Read settings from the host's flat registry.
	///
	/// Missing keys fall back to their defaults; a blank static path counts
	/// as missing.
	pub fn from_settings(settings: &HashMap<String, String>) -> Self {
		let static_path = settings
			.get(STATIC_PATH_SETTING)
			.map(|path| path.trim())
			.filter(|path| !path.is_empty())
			.map_or_else(default_static_path, str::to_string);

		Self {
			template_search_path: settings
				.get(TEMPLATE_SEARCH_PATH_SETTING)
				.map(|raw| split_search_path(raw))
				.unwrap_or_default(),
			static_path,
		}
	}

	/// Read the `[formbind]` table of a TOML document.
	///
	/// A document without the table yields the defaults.
	pub fn from_toml_str(source: &str) -> ConfResult<Self> {
		let mut document: toml::Table = toml::from_str(source)?;
		let settings = match document.remove(TOML_TABLE) {
			Some(table @ toml::Value::Table(_)) => table.try_into::<FormSettings>()?,
			Some(other) => {
				return Err(ConfError::InvalidValue {
					key: TOML_TABLE.to_string(),
					message: format!("expected a table, found {}", other.type_str()),
				});
			}
			None => Self::default(),
		};
		Ok(settings.normalized())
	}

	pub fn from_toml_file(path: impl AsRef<Path>) -> ConfResult<Self> {
		let source = std::fs::read_to_string(path.as_ref())?;
		Self::from_toml_str(&source)
	}

	/// Flatten back into registry form.
	pub fn to_settings(&self) -> HashMap<String, String> {
		let mut settings = HashMap::new();
		settings.insert(
			TEMPLATE_SEARCH_PATH_SETTING.to_string(),
			self.template_search_path.join(" "),
		);
		settings.insert(STATIC_PATH_SETTING.to_string(), self.static_path.clone());
		settings
	}

	fn normalized(mut self) -> Self {
		let trimmed = self.static_path.trim();
		self.static_path = if trimmed.is_empty() {
			default_static_path()
		} else {
			trimmed.to_string()
		};
		self
	}
}
