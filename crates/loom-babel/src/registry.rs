// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The owning entry point: catalogs, resolution and cached locales together.

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::accept::candidate_codes;
use crate::cache::{CachePolicy, LocaleCache};
use crate::config::{load_config_with_file, I18nConfig};
use crate::error::{ConfigError, I18nError};
use crate::lazy::{make_lazy_gettext, LazyGettext, Translator};
use crate::locale::Locale;
use crate::resolve::closest_match;
use crate::store::{CatalogStore, LoadSummary};

/// Catalog store, locale resolver and locale cache for one application.
///
/// Loading takes `&mut self`; resolution and lookups take `&self`. Share a
/// registry between request handlers behind an `RwLock` and take the write
/// lock only to load.
#[derive(Debug)]
pub struct LocaleRegistry {
	config: I18nConfig,
	store: CatalogStore,
	cache: LocaleCache,
}

impl LocaleRegistry {
	pub fn new(config: I18nConfig) -> Self {
		let store = CatalogStore::new(config.default_locale.clone(), config.domain_precedence);
		Self {
			config,
			store,
			cache: LocaleCache::new(),
		}
	}

	/// Build a registry from a config file (plus `LOOM_BABEL_*` overrides).
	pub fn from_config_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
		Ok(Self::new(load_config_with_file(path)?))
	}

	pub fn config(&self) -> &I18nConfig {
		&self.config
	}

	pub fn store(&self) -> &CatalogStore {
		&self.store
	}

	pub fn default_locale(&self) -> &str {
		self.store.default_locale()
	}

	pub fn set_default_locale(&mut self, code: impl Into<String>) {
		let code = code.into();
		self.config.default_locale = code.clone();
		self.store.set_default_locale(code);
	}

	pub fn supported_locales(&self) -> &BTreeSet<String> {
		self.store.supported_locales()
	}

	/// Load one domain from `directory` into the store.
	pub fn load(
		&mut self,
		directory: impl AsRef<Path>,
		domain: &str,
	) -> Result<LoadSummary, I18nError> {
		let summary = self.store.load(directory, domain)?;
		if self.config.cache_policy == CachePolicy::InvalidateOnLoad {
			debug!(cached = self.cache.len(), "invalidating cached locales");
			self.cache.clear();
		}
		Ok(summary)
	}

	/// Load every configured domain from the configured locales directory.
	///
	/// Returns no summaries when no directory is configured.
	pub fn load_configured(&mut self) -> Result<Vec<LoadSummary>, I18nError> {
		let Some(directory) = self.config.locales_dir.clone() else {
			info!("no locales directory configured, skipping catalog load");
			return Ok(Vec::new());
		};

		let domains = self.config.domains.clone();
		domains
			.iter()
			.map(|domain| self.load(&directory, domain))
			.collect()
	}

	/// The closest supported code for `candidates`, or the default.
	pub fn resolve_code<I, S>(&self, candidates: I) -> String
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		closest_match(
			self.store.supported_locales(),
			self.store.default_locale(),
			candidates,
		)
	}

	/// The cached locale closest to `candidates`.
	pub fn resolve<I, S>(&self, candidates: I) -> Arc<Locale>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let code = self.resolve_code(candidates);
		self.locale_for_supported(&code)
	}

	/// The cached locale for a supported `code`.
	///
	/// Asking for a code outside the supported set is a caller bug and
	/// returns [`I18nError::UnsupportedLocale`].
	pub fn get(&self, code: &str) -> Result<Arc<Locale>, I18nError> {
		if !self.store.is_supported(code) {
			return Err(I18nError::UnsupportedLocale {
				code: code.to_string(),
			});
		}
		Ok(self.locale_for_supported(code))
	}

	fn locale_for_supported(&self, code: &str) -> Arc<Locale> {
		self.cache
			.get_or_create(code, || Locale::new(code, self.store.catalog(code)))
	}

	/// Locale for a request's `Accept-Language` header.
	///
	/// Without usable preferences, `default` is resolved instead.
	pub fn browser_locale(&self, accept_language: Option<&str>, default: &str) -> Arc<Locale> {
		let codes = candidate_codes(accept_language);
		if codes.is_empty() {
			return self.resolve([default]);
		}
		self.resolve(codes)
	}

	/// Locale for a request: an application-chosen code (e.g. a stored user
	/// preference) first, then the `Accept-Language` header.
	pub fn request_locale(
		&self,
		preferred: Option<&str>,
		accept_language: Option<&str>,
	) -> Arc<Locale> {
		let candidates = preferred
			.into_iter()
			.map(str::to_string)
			.chain(candidate_codes(accept_language));
		self.resolve(candidates)
	}

	/// Lazy gettext whose translator is chosen by `source` at render time.
	pub fn lazy_gettext<F>(source: F) -> LazyGettext
	where
		F: Fn() -> Arc<Locale> + Send + Sync + 'static,
	{
		make_lazy_gettext(move || source() as Arc<dyn Translator>)
	}
}

impl Default for LocaleRegistry {
	fn default() -> Self {
		Self::new(I18nConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::catalog::test_support::write_mo;
	use tempfile::TempDir;

	fn locales() -> TempDir {
		let dir = TempDir::new().unwrap();
		write_mo(&dir.path().join("fr_FR/messages.mo"), &[("Welcome", "bienvenu")]);
		write_mo(&dir.path().join("es_ES/messages.mo"), &[("Welcome", "bienvenido")]);
		write_mo(&dir.path().join("pt/messages.mo"), &[("Welcome", "bem-vindo")]);
		dir
	}

	fn loaded(config: I18nConfig) -> (LocaleRegistry, TempDir) {
		let dir = locales();
		let mut registry = LocaleRegistry::new(config);
		registry.load(dir.path(), "messages").unwrap();
		(registry, dir)
	}

	#[test]
	fn test_resolve_and_translate() {
		let (registry, _dir) = loaded(I18nConfig::default());
		assert_eq!(registry.resolve(["fr_FR"]).translate("Welcome"), "bienvenu");
		assert_eq!(registry.resolve(["es-es"]).translate("Welcome"), "bienvenido");
		assert_eq!(registry.resolve(["pt_BR"]).translate("Welcome"), "bem-vindo");
		assert_eq!(registry.resolve(["de_DE"]).translate("Welcome"), "Welcome");
		assert_eq!(registry.resolve(["de_DE"]).code(), "en_US");
	}

	#[test]
	fn test_get_unsupported_is_error() {
		let (registry, _dir) = loaded(I18nConfig::default());
		assert!(matches!(
			registry.get("de_DE"),
			Err(I18nError::UnsupportedLocale { .. })
		));
		assert!(registry.get("en_US").is_ok());
	}

	#[test]
	fn test_get_returns_cached_instance() {
		let (registry, _dir) = loaded(I18nConfig::default());
		let first = registry.get("fr_FR").unwrap();
		let second = registry.resolve(["fr-FR"]);
		assert!(Arc::ptr_eq(&first, &second));
	}

	#[test]
	fn test_retain_policy_keeps_stale_locale() {
		let (mut registry, dir) = loaded(I18nConfig::default());
		let before = registry.get("fr_FR").unwrap();

		write_mo(&dir.path().join("fr_FR/addit.mo"), &[("Goodbye", "Au revoir")]);
		registry.load(dir.path(), "addit").unwrap();

		let after = registry.get("fr_FR").unwrap();
		assert!(Arc::ptr_eq(&before, &after));
		assert_eq!(after.translate("Goodbye"), "Goodbye");
	}

	#[test]
	fn test_invalidate_policy_refreshes_locale() {
		let config = I18nConfig {
			cache_policy: CachePolicy::InvalidateOnLoad,
			..I18nConfig::default()
		};
		let (mut registry, dir) = loaded(config);
		let before = registry.get("fr_FR").unwrap();

		write_mo(&dir.path().join("fr_FR/addit.mo"), &[("Goodbye", "Au revoir")]);
		registry.load(dir.path(), "addit").unwrap();

		let after = registry.get("fr_FR").unwrap();
		assert!(!Arc::ptr_eq(&before, &after));
		assert_eq!(after.translate("Goodbye"), "Au revoir");
		assert_eq!(after.translate("Welcome"), "bienvenu");
	}

	#[test]
	fn test_browser_locale() {
		let (registry, _dir) = loaded(I18nConfig::default());
		let locale = registry.browser_locale(Some("de;q=0.9, fr-FR;q=0.8, es"), "en_US");
		assert_eq!(locale.code(), "fr_FR");
		let locale = registry.browser_locale(Some("de, es-ES;q=0.8"), "en_US");
		assert_eq!(locale.code(), "es_ES");
	}

	#[test]
	fn test_browser_locale_without_header_uses_default() {
		let (registry, _dir) = loaded(I18nConfig::default());
		assert_eq!(registry.browser_locale(None, "es_ES").code(), "es_ES");
		assert_eq!(registry.browser_locale(Some(""), "xx").code(), "en_US");
	}

	#[test]
	fn test_request_locale_prefers_override() {
		let (registry, _dir) = loaded(I18nConfig::default());
		let locale = registry.request_locale(Some("es_ES"), Some("fr"));
		assert_eq!(locale.code(), "es_ES");
		let locale = registry.request_locale(Some("xx"), Some("fr-FR"));
		assert_eq!(locale.code(), "fr_FR");
		let locale = registry.request_locale(None, None);
		assert_eq!(locale.code(), "en_US");
	}

	#[test]
	fn test_set_default_locale() {
		let (mut registry, _dir) = loaded(I18nConfig::default());
		registry.set_default_locale("es_ES");
		assert_eq!(registry.resolve(["de_DE"]).code(), "es_ES");
		assert!(!registry.supported_locales().contains("en_US"));
	}

	#[test]
	fn test_load_configured() {
		let dir = locales();
		write_mo(&dir.path().join("fr_FR/addit.mo"), &[("Goodbye", "Au revoir")]);
		let config = I18nConfig {
			locales_dir: Some(dir.path().to_path_buf()),
			domains: vec!["messages".to_string(), "addit".to_string()],
			..I18nConfig::default()
		};
		let mut registry = LocaleRegistry::new(config);
		let summaries = registry.load_configured().unwrap();

		assert_eq!(summaries.len(), 2);
		assert!(summaries[0].is_complete());
		assert!(!summaries[1].is_complete());
		let fr = registry.get("fr_FR").unwrap();
		assert_eq!(fr.translate("Welcome"), "bienvenu");
		assert_eq!(fr.translate("Goodbye"), "Au revoir");
	}

	#[test]
	fn test_load_configured_without_directory() {
		let mut registry = LocaleRegistry::default();
		assert!(registry.load_configured().unwrap().is_empty());
	}

	#[test]
	fn test_lazy_gettext_follows_current_locale() {
		let (registry, _dir) = loaded(I18nConfig::default());
		let registry = Arc::new(registry);
		let current = Arc::new(parking_lot::RwLock::new("es_ES".to_string()));

		let lazy = {
			let registry = registry.clone();
			let current = current.clone();
			LocaleRegistry::lazy_gettext(move || registry.resolve([current.read().as_str()]))
		};

		let welcome = lazy.gettext("Welcome");
		assert_eq!(welcome, "bienvenido");
		*current.write() = "fr_FR".to_string();
		assert_eq!(welcome, "bienvenu");
	}
}
