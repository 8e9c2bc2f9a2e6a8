// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Catalog store: merged catalogs per locale and the supported-locale set.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::catalog::{DomainCatalog, DomainPrecedence, MergedCatalog};
use crate::error::I18nError;

/// Outcome of loading one locale directory.
#[derive(Debug)]
pub struct LocaleLoad {
	pub locale: String,
	/// Catalog file that was merged, or why the locale was skipped.
	pub result: Result<PathBuf, I18nError>,
}

/// Per-locale results of one [`CatalogStore::load`] call.
#[derive(Debug)]
pub struct LoadSummary {
	pub domain: String,
	pub results: Vec<LocaleLoad>,
}

impl LoadSummary {
	/// Locales whose catalog was merged.
	pub fn loaded(&self) -> impl Iterator<Item = &str> {
		self.results
			.iter()
			.filter(|r| r.result.is_ok())
			.map(|r| r.locale.as_str())
	}

	/// Locales that were skipped, with the reason.
	pub fn failed(&self) -> impl Iterator<Item = (&str, &I18nError)> {
		self.results
			.iter()
			.filter_map(|r| r.result.as_ref().err().map(|e| (r.locale.as_str(), e)))
	}

	/// Whether every locale directory produced a catalog.
	pub fn is_complete(&self) -> bool {
		self.results.iter().all(|r| r.result.is_ok())
	}
}

/// Merged catalogs keyed by locale directory name.
#[derive(Debug)]
pub struct CatalogStore {
	catalogs: HashMap<String, Arc<MergedCatalog>>,
	supported: BTreeSet<String>,
	default_locale: String,
	precedence: DomainPrecedence,
}

impl CatalogStore {
	pub fn new(default_locale: impl Into<String>, precedence: DomainPrecedence) -> Self {
		let mut store = Self {
			catalogs: HashMap::new(),
			supported: BTreeSet::new(),
			default_locale: default_locale.into(),
			precedence,
		};
		store.recompute_supported();
		store
	}

	pub fn default_locale(&self) -> &str {
		&self.default_locale
	}

	/// Change the default locale; it is always part of the supported set.
	pub fn set_default_locale(&mut self, code: impl Into<String>) {
		self.default_locale = code.into();
		self.recompute_supported();
	}

	/// Codes with at least one loaded domain, plus the default.
	pub fn supported_locales(&self) -> &BTreeSet<String> {
		&self.supported
	}

	pub fn is_supported(&self, code: &str) -> bool {
		self.supported.contains(code)
	}

	/// The merged catalog registered for exactly `code`.
	pub fn catalog(&self, code: &str) -> Option<Arc<MergedCatalog>> {
		self.catalogs.get(code).cloned()
	}

	/// Load `<directory>/<locale>/<domain>.mo` for every locale directory and
	/// merge each catalog under `domain`.
	///
	/// A locale whose catalog is missing or unreadable is recorded in the
	/// summary and keeps whatever it had before. Only failing to list
	/// `directory` itself is an error.
	pub fn load(
		&mut self,
		directory: impl AsRef<Path>,
		domain: &str,
	) -> Result<LoadSummary, I18nError> {
		let directory = directory.as_ref();
		let entries = std::fs::read_dir(directory).map_err(|e| I18nError::ReadDir {
			path: directory.to_path_buf(),
			source: e,
		})?;

		let mut locales = Vec::new();
		for entry in entries {
			let entry = match entry {
				Ok(entry) => entry,
				Err(e) => {
					warn!(directory = %directory.display(), error = %e, "skipping unreadable directory entry");
					continue;
				}
			};
			let Some(name) = entry.file_name().to_str().map(str::to_string) else {
				debug!(path = %entry.path().display(), "skipping non UTF-8 locale directory");
				continue;
			};
			if name.starts_with('.') || !entry.path().is_dir() {
				continue;
			}
			locales.push(name);
		}
		locales.sort();

		let mut results = Vec::with_capacity(locales.len());
		for locale in locales {
			let result = read_catalog(&directory.join(&locale), &locale, domain).map(
				|(path, catalog)| {
					self.merge(&locale, domain, catalog);
					path
				},
			);
			if let Err(e) = &result {
				warn!(locale = %locale, domain = %domain, error = %e, "Cannot load translation");
			}
			results.push(LocaleLoad { locale, result });
		}

		self.recompute_supported();
		info!(
			domain = %domain,
			supported = ?self.supported,
			"Supported locales"
		);

		Ok(LoadSummary {
			domain: domain.to_string(),
			results,
		})
	}

	fn merge(&mut self, locale: &str, domain: &str, catalog: DomainCatalog) {
		let precedence = self.precedence;
		let merged = self
			.catalogs
			.entry(locale.to_string())
			.or_insert_with(|| Arc::new(MergedCatalog::new(precedence)));
		// Locales handed out earlier keep their snapshot.
		let replaced = Arc::make_mut(merged).insert_domain(domain, catalog);
		debug!(locale = %locale, domain = %domain, replaced, "merged catalog");
	}

	fn recompute_supported(&mut self) {
		self.supported = self
			.catalogs
			.iter()
			.filter(|(_, catalog)| !catalog.is_empty())
			.map(|(code, _)| code.clone())
			.chain(std::iter::once(self.default_locale.clone()))
			.collect();
	}
}

/// Find and parse the catalog for `domain` inside one locale directory.
///
/// Both `<locale>/<domain>.mo` and the gettext layout
/// `<locale>/LC_MESSAGES/<domain>.mo` are accepted.
fn read_catalog(
	locale_dir: &Path,
	locale: &str,
	domain: &str,
) -> Result<(PathBuf, DomainCatalog), I18nError> {
	let file_name = format!("{domain}.mo");
	let path = [
		locale_dir.join(&file_name),
		locale_dir.join("LC_MESSAGES").join(&file_name),
	]
	.into_iter()
	.find(|p| p.is_file())
	.ok_or_else(|| I18nError::CatalogMissing {
		locale: locale.to_string(),
		domain: domain.to_string(),
	})?;

	let bytes = std::fs::read(&path).map_err(|e| I18nError::CatalogOpen {
		path: path.clone(),
		source: e,
	})?;
	let catalog = DomainCatalog::parse(&bytes).map_err(|e| I18nError::CatalogParse {
		path: path.clone(),
		source: e,
	})?;

	Ok((path, catalog))
}
