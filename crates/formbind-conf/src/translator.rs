//! Message translation for rendered forms
//!
//! Terms are [`TranslationString`]s: a message id, an optional default text
//! and a mapping substituted into `${name}` placeholders. A [`Translator`]
//! looks the id up in the catalog for the request's locale and interpolates
//! the result; without a translation the term's own text is interpolated.
//!
//! Catalogs are loaded from translation directories holding one TOML file
//! per locale:
//!
//! ```toml
//! # locale/fr.toml
//! "Required" = "Requis"
//! "${value} is not a number" = "${value} n'est pas un nombre"
//! ```

use crate::error::{ConfError, ConfResult};
use formbind_core::Request;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

/// A translatable message.
///
/// # Examples
///
/// ```
/// use formbind_conf::TranslationString;
///
/// let term = TranslationString::new("not_a_number")
///     .with_default("\"${value}\" is not a number")
///     .with_mapping("value", "abc");
///
/// assert_eq!(term.interpolate(), "\"abc\" is not a number");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationString {
	msgid: String,
	default: Option<String>,
	mapping: BTreeMap<String, String>,
}

impl TranslationString {
	pub fn new(msgid: impl Into<String>) -> Self {
		Self {
			msgid: msgid.into(),
			default: None,
			mapping: BTreeMap::new(),
		}
	}

	/// Text used when no catalog has a translation. Defaults to the id.
	pub fn with_default(mut self, default: impl Into<String>) -> Self {
		self.default = Some(default.into());
		self
	}

	pub fn with_mapping(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.mapping.insert(name.into(), value.into());
		self
	}

	pub fn msgid(&self) -> &str {
		&self.msgid
	}

	pub fn mapping(&self) -> &BTreeMap<String, String> {
		&self.mapping
	}

	/// The untranslated text with placeholders substituted.
	pub fn interpolate(&self) -> String {
		self.interpolate_into(self.default.as_deref().unwrap_or(&self.msgid))
	}

	/// Substitute this term's mapping into `text`.
	///
	/// Placeholders without a mapping entry are left as they are.
	pub fn interpolate_into(&self, text: &str) -> String {
		let mut out = String::with_capacity(text.len());
		let mut rest = text;
		while let Some(start) = rest.find("${") {
			out.push_str(&rest[..start]);
			let after = &rest[start + 2..];
			match after.find('}') {
				Some(end) => {
					let name = &after[..end];
					match self.mapping.get(name) {
						Some(value) => out.push_str(value),
						None => out.push_str(&rest[start..start + 2 + end + 1]),
					}
					rest = &after[end + 1..];
				}
				None => {
					out.push_str(&rest[start..]);
					rest = "";
				}
			}
		}
		out.push_str(rest);
		out
	}
}

impl From<&str> for TranslationString {
	fn from(msgid: &str) -> Self {
		Self::new(msgid)
	}
}

/// Translations for one locale.
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
	locale: String,
	messages: HashMap<String, String>,
}

impl MessageCatalog {
	pub fn new(locale: impl Into<String>) -> Self {
		Self {
			locale: locale.into(),
			messages: HashMap::new(),
		}
	}

	pub fn locale(&self) -> &str {
		&self.locale
	}

	pub fn add_translation(&mut self, msgid: impl Into<String>, translation: impl Into<String>) {
		self.messages.insert(msgid.into(), translation.into());
	}

	pub fn get(&self, msgid: &str) -> Option<&str> {
		self.messages.get(msgid).map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.messages.len()
	}

	pub fn is_empty(&self) -> bool {
		self.messages.is_empty()
	}

	/// Parse a flat TOML table of `msgid = "translation"` pairs.
	pub fn from_toml_str(locale: impl Into<String>, source: &str) -> ConfResult<Self> {
		let locale = locale.into();
		let table: toml::Table = toml::from_str(source)?;
		let mut catalog = Self::new(locale.clone());
		for (msgid, value) in table {
			match value {
				toml::Value::String(translation) => catalog.add_translation(msgid, translation),
				other => {
					return Err(ConfError::InvalidValue {
						key: format!("{}.{}", locale, msgid),
						message: format!("expected a string, found {}", other.type_str()),
					});
				}
			}
		}
		Ok(catalog)
	}

	fn merge(&mut self, other: MessageCatalog) {
		self.messages.extend(other.messages);
	}
}

/// Translates terms against per-locale catalogs.
#[derive(Debug, Clone, Default)]
pub struct Translator {
	catalogs: HashMap<String, MessageCatalog>,
}

impl Translator {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add `catalog`, merging into any catalog already held for its locale.
	pub fn add_catalog(&mut self, catalog: MessageCatalog) {
		match self.catalogs.get_mut(catalog.locale()) {
			Some(existing) => existing.merge(catalog),
			None => {
				self.catalogs.insert(catalog.locale().to_string(), catalog);
			}
		}
	}

	pub fn with_catalog(mut self, catalog: MessageCatalog) -> Self {
		self.add_catalog(catalog);
		self
	}

	pub fn catalog(&self, locale: &str) -> Option<&MessageCatalog> {
		self.catalogs.get(locale)
	}

	/// Load every `<locale>.toml` file found in `dir`.
	///
	/// Returns the number of catalogs loaded. Other files are skipped.
	pub fn load_dir(&mut self, dir: &Path) -> ConfResult<usize> {
		let mut loaded = 0;
		for entry in std::fs::read_dir(dir)? {
			let path = entry?.path();
			if !path.is_file() || path.extension().is_none_or(|ext| ext != "toml") {
				continue;
			}
			let Some(locale) = path.file_stem().and_then(|stem| stem.to_str()) else {
				continue;
			};
			let source = std::fs::read_to_string(&path)?;
			self.add_catalog(MessageCatalog::from_toml_str(locale, &source)?);
			loaded += 1;
		}
		tracing::debug!(dir = %dir.display(), catalogs = loaded, "loaded translation directory");
		Ok(loaded)
	}

	/// Translate `term` for `locale`.
	///
	/// A region-qualified locale such as `fr_CA` falls back to `fr`. Without
	/// a translation, or without a locale, the term's own text is used.
	pub fn translate(&self, term: &TranslationString, locale: Option<&str>) -> String {
		let translated = locale.and_then(|locale| {
			self.lookup(locale, term.msgid()).or_else(|| {
				locale
					.split_once(['_', '-'])
					.and_then(|(language, _)| self.lookup(language, term.msgid()))
			})
		});
		match translated {
			Some(text) => term.interpolate_into(text),
			None => term.interpolate(),
		}
	}

	/// Translate `term` for the locale negotiated for `request`.
	pub fn translate_for(&self, request: &dyn Request, term: &TranslationString) -> String {
		self.translate(term, request.locale())
	}

	fn lookup(&self, locale: &str, msgid: &str) -> Option<&str> {
		self.catalogs.get(locale)?.get(msgid)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use formbind_core::RequestContext;
	use rstest::{fixture, rstest};

	#[fixture]
	fn translator() -> Translator {
		let mut fr = MessageCatalog::new("fr");
		fr.add_translation("Required", "Requis");
		fr.add_translation("not_a_number", "\"${value}\" n'est pas un nombre");
		Translator::new().with_catalog(fr)
	}

	fn not_a_number() -> TranslationString {
		TranslationString::new("not_a_number")
			.with_default("\"${value}\" is not a number")
			.with_mapping("value", "x")
	}

	#[rstest]
	#[case("${a} and ${b}", "1 and ${b}")]
	#[case("no placeholders", "no placeholders")]
	#[case("dangling ${a", "dangling ${a")]
	#[case("${a}${a}", "11")]
	fn test_interpolate_into(#[case] text: &str, #[case] expected: &str) {
		let term = TranslationString::new("id").with_mapping("a", "1");
		assert_eq!(term.interpolate_into(text), expected);
	}

	#[rstest]
	fn test_interpolate_uses_msgid_without_default() {
		assert_eq!(TranslationString::from("Required").interpolate(), "Required");
	}

	#[rstest]
	fn test_translate_with_catalog(translator: Translator) {
		assert_eq!(
			translator.translate(&not_a_number(), Some("fr")),
			"\"x\" n'est pas un nombre"
		);
	}

	#[rstest]
	#[case(Some("fr_CA"), "Requis")]
	#[case(Some("fr-BE"), "Requis")]
	#[case(Some("de"), "Required")]
	#[case(None, "Required")]
	fn test_translate_locale_fallback(
		translator: Translator,
		#[case] locale: Option<&str>,
		#[case] expected: &str,
	) {
		assert_eq!(translator.translate(&"Required".into(), locale), expected);
	}

	#[rstest]
	fn test_missing_translation_interpolates_default(translator: Translator) {
		assert_eq!(
			translator.translate(&not_a_number(), Some("de")),
			"\"x\" is not a number"
		);
	}

	#[rstest]
	fn test_translate_for_request(translator: Translator) {
		let request = RequestContext::new("http://example.com/").with_locale("fr");
		assert_eq!(translator.translate_for(&request, &"Required".into()), "Requis");
	}

	#[rstest]
	fn test_catalog_from_toml() {
		let catalog = MessageCatalog::from_toml_str("de", "Required = \"Erforderlich\"\n").unwrap();
		assert_eq!(catalog.get("Required"), Some("Erforderlich"));
		assert_eq!(catalog.len(), 1);

		let err = MessageCatalog::from_toml_str("de", "Required = 1\n").unwrap_err();
		assert!(matches!(err, ConfError::InvalidValue { .. }));
	}

	#[rstest]
	fn test_catalogs_merge_per_locale(mut translator: Translator) {
		let mut more = MessageCatalog::new("fr");
		more.add_translation("Next", "Suivant");
		translator.add_catalog(more);

		let fr = translator.catalog("fr").unwrap();
		assert_eq!(fr.get("Next"), Some("Suivant"));
		assert_eq!(fr.get("Required"), Some("Requis"));
	}

	#[rstest]
	fn test_load_dir(mut translator: Translator) {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("es.toml"), "Required = \"Obligatorio\"\n").unwrap();
		std::fs::write(dir.path().join("fr.toml"), "Previous = \"Précédent\"\n").unwrap();
		std::fs::write(dir.path().join("README.txt"), "not a catalog").unwrap();

		assert_eq!(translator.load_dir(dir.path()).unwrap(), 2);
		assert_eq!(translator.translate(&"Required".into(), Some("es")), "Obligatorio");
		assert_eq!(translator.translate(&"Previous".into(), Some("fr")), "Précédent");
		assert_eq!(translator.translate(&"Required".into(), Some("fr")), "Requis");
	}
}
