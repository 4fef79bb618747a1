//! # formbind-conf
//!
//! Application-level configuration for formbind.
//!
//! - [`FormSettings`]: settings read from the host registry or a TOML file
//! - [`include`]: the hook a host calls once at startup through its
//!   [`Configurator`]
//! - [`RendererConfig`]: the resolved template search path, loadable into a
//!   `tera::Tera` instance
//! - [`Translator`]: per-locale message catalogs used while rendering
//!
//! ## Settings
//!
//! | Key | Default | Meaning |
//! |-----|---------|---------|
//! | `formbind.template_search_path` | empty | whitespace separated `package:resource` specs |
//! | `formbind.static_path` | `static-deform` | URL prefix of the static assets |

pub mod configurator;
pub mod error;
pub mod renderer;
pub mod settings;
pub mod translator;

pub use configurator::{AppConfig, Configurator, LOCALE_DIR, STATIC_ASSETS, StaticView, include};
pub use error::{ConfError, ConfResult};
pub use renderer::{
	AssetSpec, DEFAULT_TEMPLATES, PackageRoots, RendererConfig, ResourceResolver,
};
pub use settings::{
	DEFAULT_STATIC_PATH, FormSettings, STATIC_PATH_SETTING, TEMPLATE_SEARCH_PATH_SETTING,
};
pub use translator::{MessageCatalog, TranslationString, Translator};
