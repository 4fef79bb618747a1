//! Template search path for form rendering
//!
//! Search path entries are asset specs of the form `package:resource`. Each
//! spec is resolved to a directory through a [`ResourceResolver`] and the
//! configured entries are placed ahead of the built-in `formbind:templates`
//! directory, so a template found earlier in the path overrides one with the
//! same name further down.

use crate::error::{ConfError, ConfResult};
use crate::translator::{TranslationString, Translator};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tera::Tera;

/// Built-in templates, always last on the search path.
pub const DEFAULT_TEMPLATES: &str = "formbind:templates";

/// A `package:resource` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetSpec {
	package: String,
	resource: String,
}

impl AssetSpec {
	pub fn new(package: impl Into<String>, resource: impl Into<String>) -> Self {
		Self {
			package: package.into(),
			resource: resource.into(),
		}
	}

	pub fn package(&self) -> &str {
		&self.package
	}

	pub fn resource(&self) -> &str {
		&self.resource
	}
}

impl FromStr for AssetSpec {
	type Err = ConfError;

	fn from_str(spec: &str) -> ConfResult<Self> {
		let spec = spec.trim();
		match spec.split_once(':') {
			Some((package, resource))
				if !package.is_empty() && !resource.is_empty() && !resource.contains(':') =>
			{
				Ok(Self::new(package, resource))
			}
			_ => Err(ConfError::InvalidAssetSpec(spec.to_string())),
		}
	}
}

impl fmt::Display for AssetSpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.package, self.resource)
	}
}

/// Maps asset specs to filesystem paths.
pub trait ResourceResolver {
	fn resolve(&self, spec: &AssetSpec) -> ConfResult<PathBuf>;
}

/// Resolver backed by a root directory per package.
///
/// ```
/// use formbind_conf::{AssetSpec, PackageRoots, ResourceResolver};
/// use std::path::Path;
///
/// let roots = PackageRoots::new().with_package("myapp", "/srv/myapp");
/// let path = roots.resolve(&"myapp:templates/forms".parse().unwrap()).unwrap();
///
/// assert_eq!(path, Path::new("/srv/myapp/templates/forms"));
/// assert!(roots.resolve(&AssetSpec::new("other", "x")).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct PackageRoots {
	roots: HashMap<String, PathBuf>,
}

impl PackageRoots {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_package(mut self, package: impl Into<String>, root: impl Into<PathBuf>) -> Self {
		self.roots.insert(package.into(), root.into());
		self
	}

	pub fn root(&self, package: &str) -> Option<&Path> {
		self.roots.get(package).map(PathBuf::as_path)
	}
}

impl ResourceResolver for PackageRoots {
	fn resolve(&self, spec: &AssetSpec) -> ConfResult<PathBuf> {
		self.roots
			.get(spec.package())
			.map(|root| root.join(spec.resource()))
			.ok_or_else(|| ConfError::UnknownPackage(spec.package().to_string()))
	}
}

/// Resolved template search path plus the translator used while rendering.
#[derive(Clone)]
pub struct RendererConfig {
	search_path: Vec<PathBuf>,
	translator: Option<Arc<Translator>>,
}

impl fmt::Debug for RendererConfig {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RendererConfig")
			.field("search_path", &self.search_path)
			.field("translator", &self.translator.is_some())
			.finish()
	}
}

impl RendererConfig {
	/// Resolve `search_path` and place it ahead of the built-in templates.
	///
	/// Every entry must be a `package:resource` spec the resolver knows.
	pub fn configure<I, S>(
		search_path: I,
		resolver: &dyn ResourceResolver,
		translator: Option<Arc<Translator>>,
	) -> ConfResult<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut paths = Vec::new();
		for entry in search_path {
			let spec: AssetSpec = entry.as_ref().parse()?;
			paths.push(resolver.resolve(&spec)?);
		}
		let default: AssetSpec = DEFAULT_TEMPLATES.parse()?;
		paths.push(resolver.resolve(&default)?);

		tracing::debug!(search_path = ?paths, "configured template search path");
		Ok(Self {
			search_path: paths,
			translator,
		})
	}

	pub fn search_path(&self) -> &[PathBuf] {
		&self.search_path
	}

	pub fn translator(&self) -> Option<&Arc<Translator>> {
		self.translator.as_ref()
	}

	/// Load every template on the search path into a [`Tera`] instance.
	///
	/// Templates are named by their path relative to their search path
	/// directory, with `/` separators. Missing directories are skipped. When
	/// a translator is configured it is exposed to templates as the
	/// `translate(msgid=..., locale=..., default=...)` function; any other
	/// argument fills the message's `${name}` placeholders.
	pub fn load_templates(&self) -> ConfResult<Tera> {
		let mut templates: HashMap<String, String> = HashMap::new();
		for dir in self.search_path.iter().rev() {
			if !dir.is_dir() {
				tracing::debug!(dir = %dir.display(), "template directory missing, skipped");
				continue;
			}
			collect_templates(dir, dir, &mut templates)?;
		}

		let mut tera = Tera::default();
		tera.add_raw_templates(templates)?;
		if let Some(translator) = &self.translator {
			tera.register_function("translate", TranslateFunction(Arc::clone(translator)));
		}
		Ok(tera)
	}
}

fn collect_templates(
	root: &Path,
	dir: &Path,
	templates: &mut HashMap<String, String>,
) -> ConfResult<()> {
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_dir() {
			collect_templates(root, &path, templates)?;
			continue;
		}
		let Ok(relative) = path.strip_prefix(root) else {
			continue;
		};
		let name = relative
			.components()
			.map(|component| component.as_os_str().to_string_lossy())
			.collect::<Vec<_>>()
			.join("/");
		templates.insert(name, std::fs::read_to_string(&path)?);
	}
	Ok(())
}

struct TranslateFunction(Arc<Translator>);

impl tera::Function for TranslateFunction {
	fn call(&self, args: &HashMap<String, tera::Value>) -> tera::Result<tera::Value> {
		let msgid = args
			.get("msgid")
			.and_then(tera::Value::as_str)
			.ok_or_else(|| tera::Error::msg("translate requires a string `msgid` argument"))?;
		let locale = args.get("locale").and_then(tera::Value::as_str);

		let mut term = TranslationString::new(msgid);
		if let Some(default) = args.get("default").and_then(tera::Value::as_str) {
			term = term.with_default(default);
		}
		for (name, value) in args {
			if matches!(name.as_str(), "msgid" | "locale" | "default") {
				continue;
			}
			let value = match value {
				tera::Value::String(text) => text.clone(),
				other => other.to_string(),
			};
			term = term.with_mapping(name.as_str(), value);
		}

		Ok(tera::Value::String(self.0.translate(&term, locale)))
	}

	fn is_safe(&self) -> bool {
		false
	}
}
