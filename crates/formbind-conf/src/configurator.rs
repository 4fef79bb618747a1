//! Host configuration hook
//!
//! [`include`] wires formbind into a host application through the
//! [`Configurator`] trait: it registers the translation directory, mounts the
//! static assets and installs the template search path read from the host's
//! settings.

use crate::renderer::{AssetSpec, PackageRoots, RendererConfig, ResourceResolver};
use crate::settings::FormSettings;
use crate::translator::Translator;
use formbind_core::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Translation directory registered by [`include`].
pub const LOCALE_DIR: &str = "formbind:locale";

/// Static assets mounted by [`include`].
pub const STATIC_ASSETS: &str = "formbind:static";

/// The parts of a host application's configuration formbind talks to.
pub trait Configurator {
	/// Flat settings registry.
	fn settings(&self) -> &HashMap<String, String>;

	fn resolver(&self) -> &dyn ResourceResolver;

	fn add_translation_dirs(&mut self, specs: &[&str]) -> Result<()>;

	/// Serve the directory behind `spec` under the URL prefix `name`.
	fn add_static_view(&mut self, name: &str, spec: &str) -> Result<()>;

	fn set_renderer(&mut self, renderer: RendererConfig);

	/// Translator handed to the renderer.
	fn translator(&self) -> Option<Arc<Translator>> {
		None
	}
}

/// Register formbind's translations, static view and renderer with `config`.
pub fn include(config: &mut dyn Configurator) -> Result<()> {
	let settings = FormSettings::from_settings(config.settings());

	config.add_translation_dirs(&[LOCALE_DIR])?;
	config.add_static_view(&settings.static_path, STATIC_ASSETS)?;

	let renderer = RendererConfig::configure(
		&settings.template_search_path,
		config.resolver(),
		config.translator(),
	)?;
	config.set_renderer(renderer);

	tracing::info!(
		static_path = %settings.static_path,
		search_path = settings.template_search_path.len(),
		"formbind configured"
	);
	Ok(())
}

/// A static view registered through [`Configurator::add_static_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticView {
	pub name: String,
	pub path: PathBuf,
}

/// In-process [`Configurator`] recording every registration.
///
/// ```
/// use formbind_conf::{AppConfig, PackageRoots, include};
///
/// let roots = PackageRoots::new().with_package("formbind", "/usr/share/formbind");
/// let mut config = AppConfig::new(roots).with_setting("formbind.static_path", "assets");
///
/// include(&mut config).unwrap();
///
/// assert_eq!(config.static_views()[0].name, "assets");
/// assert_eq!(config.renderer().unwrap().search_path().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
	settings: HashMap<String, String>,
	resolver: PackageRoots,
	translator: Translator,
	translation_dirs: Vec<PathBuf>,
	static_views: Vec<StaticView>,
	renderer: Option<RendererConfig>,
}

impl AppConfig {
	pub fn new(resolver: PackageRoots) -> Self {
		Self {
			settings: HashMap::new(),
			resolver,
			translator: Translator::new(),
			translation_dirs: Vec::new(),
			static_views: Vec::new(),
			renderer: None,
		}
	}

	pub fn with_setting(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.settings.insert(name.into(), value.into());
		self
	}

	pub fn with_settings(mut self, settings: HashMap<String, String>) -> Self {
		self.settings.extend(settings);
		self
	}

	pub fn translation_dirs(&self) -> &[PathBuf] {
		&self.translation_dirs
	}

	pub fn static_views(&self) -> &[StaticView] {
		&self.static_views
	}

	pub fn renderer(&self) -> Option<&RendererConfig> {
		self.renderer.as_ref()
	}

	/// Catalogs loaded from the registered translation directories.
	pub fn catalogs(&self) -> &Translator {
		&self.translator
	}
}

impl Configurator for AppConfig {
	fn settings(&self) -> &HashMap<String, String> {
		&self.settings
	}

	fn resolver(&self) -> &dyn ResourceResolver {
		&self.resolver
	}

	/// Resolve each spec; directories that exist are loaded right away.
	fn add_translation_dirs(&mut self, specs: &[&str]) -> Result<()> {
		for spec in specs {
			let spec: AssetSpec = spec.parse()?;
			let dir = self.resolver.resolve(&spec)?;
			if dir.is_dir() {
				self.translator.load_dir(&dir)?;
			}
			self.translation_dirs.push(dir);
		}
		Ok(())
	}

	fn add_static_view(&mut self, name: &str, spec: &str) -> Result<()> {
		let spec: AssetSpec = spec.parse()?;
		let path = self.resolver.resolve(&spec)?;
		self.static_views.push(StaticView {
			name: name.trim_matches('/').to_string(),
			path,
		});
		Ok(())
	}

	fn set_renderer(&mut self, renderer: RendererConfig) {
		self.renderer = Some(renderer);
	}

	fn translator(&self) -> Option<Arc<Translator>> {
		Some(Arc::new(self.translator.clone()))
	}
}
