// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration: built-in defaults, a TOML file and `LOOM_BABEL_*`
//! environment variables.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

use crate::cache::CachePolicy;
use crate::catalog::DomainPrecedence;
use crate::error::ConfigError;

/// Locale used when no candidate matches and none is configured.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Domain loaded when none is configured.
pub const DEFAULT_DOMAIN: &str = "messages";

/// Configuration layer - all fields are Option for merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct I18nConfigLayer {
	#[serde(default)]
	pub default_locale: Option<String>,
	#[serde(default)]
	pub locales_dir: Option<PathBuf>,
	#[serde(default)]
	pub domains: Option<Vec<String>>,
	#[serde(default)]
	pub domain_precedence: Option<DomainPrecedence>,
	#[serde(default)]
	pub cache_policy: Option<CachePolicy>,
}

impl I18nConfigLayer {
	/// Merge another layer into this one. Other layer takes precedence.
	pub fn merge(&mut self, other: Self) {
		if other.default_locale.is_some() {
			self.default_locale = other.default_locale;
		}
		if other.locales_dir.is_some() {
			self.locales_dir = other.locales_dir;
		}
		if other.domains.is_some() {
			self.domains = other.domains;
		}
		if other.domain_precedence.is_some() {
			self.domain_precedence = other.domain_precedence;
		}
		if other.cache_policy.is_some() {
			self.cache_policy = other.cache_policy;
		}
	}

	pub fn finalize(self) -> I18nConfig {
		I18nConfig {
			default_locale: self
				.default_locale
				.unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
			locales_dir: self.locales_dir,
			domains: self
				.domains
				.unwrap_or_else(|| vec![DEFAULT_DOMAIN.to_string()]),
			domain_precedence: self.domain_precedence.unwrap_or_default(),
			cache_policy: self.cache_policy.unwrap_or_default(),
		}
	}
}

/// Fully resolved i18n configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct I18nConfig {
	pub default_locale: String,
	/// Root of the `<locale>/<domain>.mo` tree, if catalogs are loaded from config.
	pub locales_dir: Option<PathBuf>,
	pub domains: Vec<String>,
	pub domain_precedence: DomainPrecedence,
	pub cache_policy: CachePolicy,
}

impl Default for I18nConfig {
	fn default() -> Self {
		I18nConfigLayer::default().finalize()
	}
}

/// Source precedence levels (higher = overrides lower).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
	Defaults = 10,
	ConfigFile = 20,
	Environment = 50,
}

/// Trait for configuration sources.
pub trait ConfigSource: Send + Sync {
	fn name(&self) -> &'static str;
	fn precedence(&self) -> Precedence;
	fn load(&self) -> Result<I18nConfigLayer, ConfigError>;
}

/// Built-in defaults source.
pub struct DefaultsSource;

impl ConfigSource for DefaultsSource {
	fn name(&self) -> &'static str {
		"defaults"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Defaults
	}

	fn load(&self) -> Result<I18nConfigLayer, ConfigError> {
		debug!("loading defaults");
		Ok(I18nConfigLayer::default())
	}
}

/// TOML file configuration source.
pub struct TomlSource {
	path: PathBuf,
}

impl TomlSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	pub fn system() -> Self {
		Self::new("/etc/loom/babel.toml")
	}
}

impl ConfigSource for TomlSource {
	fn name(&self) -> &'static str {
		"toml-config"
	}

	fn precedence(&self) -> Precedence {
		Precedence::ConfigFile
	}

	fn load(&self) -> Result<I18nConfigLayer, ConfigError> {
		if !self.path.exists() {
			debug!(path = %self.path.display(), "config file not found, skipping");
			return Ok(I18nConfigLayer::default());
		}

		debug!(path = %self.path.display(), "loading config file");
		let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::FileRead {
			path: self.path.clone(),
			source: e,
		})?;

		let layer: I18nConfigLayer =
			toml::from_str(&content).map_err(|e| ConfigError::TomlParse {
				path: self.path.clone(),
				source: e,
			})?;

		trace!("parsed config layer from TOML");
		Ok(layer)
	}
}

/// Environment variable source.
///
/// Convention: LOOM_BABEL_<FIELD>
pub struct EnvSource;

impl ConfigSource for EnvSource {
	fn name(&self) -> &'static str {
		"environment"
	}

	fn precedence(&self) -> Precedence {
		Precedence::Environment
	}

	fn load(&self) -> Result<I18nConfigLayer, ConfigError> {
		debug!("loading environment variables");
		layer_from_vars(env_var)
	}
}

fn env_var(name: &str) -> Option<String> {
	std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn layer_from_vars(
	var: impl Fn(&str) -> Option<String>,
) -> Result<I18nConfigLayer, ConfigError> {
	let domain_precedence = match var("LOOM_BABEL_DOMAIN_PRECEDENCE") {
		Some(v) => Some(v.parse().map_err(|message| ConfigError::InvalidValue {
			key: "LOOM_BABEL_DOMAIN_PRECEDENCE".to_string(),
			message,
		})?),
		None => None,
	};

	let cache_policy = match var("LOOM_BABEL_CACHE_POLICY") {
		Some(v) => Some(v.parse().map_err(|message| ConfigError::InvalidValue {
			key: "LOOM_BABEL_CACHE_POLICY".to_string(),
			message,
		})?),
		None => None,
	};

	Ok(I18nConfigLayer {
		default_locale: var("LOOM_BABEL_DEFAULT_LOCALE"),
		locales_dir: var("LOOM_BABEL_LOCALES_DIR").map(PathBuf::from),
		domains: var("LOOM_BABEL_DOMAINS").map(|v| {
			v.split(',')
				.map(|d| d.trim().to_string())
				.filter(|d| !d.is_empty())
				.collect()
		}),
		domain_precedence,
		cache_policy,
	})
}

/// Load configuration from all sources with standard precedence.
///
/// Precedence (highest to lowest):
/// 1. Environment variables (`LOOM_BABEL_*`)
/// 2. Config file (`/etc/loom/babel.toml`)
/// 3. Built-in defaults
pub fn load_config() -> Result<I18nConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(config_path: impl AsRef<Path>) -> Result<I18nConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path.as_ref())),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<I18nConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = I18nConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

fn finalize(layer: I18nConfigLayer) -> Result<I18nConfig, ConfigError> {
	let config = layer.finalize();
	validate_config(&config)?;

	info!(
		default_locale = %config.default_locale,
		locales_dir = ?config.locales_dir,
		domains = ?config.domains,
		domain_precedence = ?config.domain_precedence,
		cache_policy = ?config.cache_policy,
		"i18n configuration loaded"
	);

	Ok(config)
}

fn validate_config(config: &I18nConfig) -> Result<(), ConfigError> {
	if config.default_locale.trim().is_empty() {
		return Err(ConfigError::Validation(
			"default_locale must not be empty".to_string(),
		));
	}

	if config.domains.is_empty() {
		return Err(ConfigError::Validation(
			"at least one translation domain must be configured".to_string(),
		));
	}

	if config.domains.iter().any(|d| d.trim().is_empty()) {
		return Err(ConfigError::Validation(
			"domain names must not be empty".to_string(),
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashMap;
	use tempfile::TempDir;

	fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
		let map: HashMap<String, String> = pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect();
		move |name| map.get(name).cloned()
	}

	#[test]
	fn test_defaults() {
		let config = I18nConfig::default();
		assert_eq!(config.default_locale, "en_US");
		assert_eq!(config.domains, vec!["messages".to_string()]);
		assert_eq!(config.domain_precedence, DomainPrecedence::LastLoaded);
		assert_eq!(config.cache_policy, CachePolicy::Retain);
		assert!(config.locales_dir.is_none());
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = I18nConfigLayer {
			default_locale: Some("en_US".to_string()),
			..Default::default()
		};
		base.merge(I18nConfigLayer {
			default_locale: Some("fr_FR".to_string()),
			cache_policy: Some(CachePolicy::InvalidateOnLoad),
			..Default::default()
		});
		assert_eq!(base.default_locale.as_deref(), Some("fr_FR"));
		assert_eq!(base.cache_policy, Some(CachePolicy::InvalidateOnLoad));
	}

	#[test]
	fn test_merge_preserves_base_when_none() {
		let mut base = I18nConfigLayer {
			domains: Some(vec!["messages".to_string(), "addit".to_string()]),
			..Default::default()
		};
		base.merge(I18nConfigLayer::default());
		assert_eq!(
			base.domains,
			Some(vec!["messages".to_string(), "addit".to_string()])
		);
	}

	#[test]
	fn test_deserialize_toml() {
		let layer: I18nConfigLayer = toml::from_str(
			r#"
default_locale = "es_ES"
locales_dir = "/srv/app/locales"
domains = ["messages", "addit"]
domain_precedence = "first-loaded"
cache_policy = "invalidate-on-load"
"#,
		)
		.unwrap();
		let config = layer.finalize();
		assert_eq!(config.default_locale, "es_ES");
		assert_eq!(config.locales_dir, Some(PathBuf::from("/srv/app/locales")));
		assert_eq!(config.domains.len(), 2);
		assert_eq!(config.domain_precedence, DomainPrecedence::FirstLoaded);
		assert_eq!(config.cache_policy, CachePolicy::InvalidateOnLoad);
	}

	#[test]
	fn test_deserialize_empty() {
		let layer: I18nConfigLayer = toml::from_str("").unwrap();
		assert_eq!(layer, I18nConfigLayer::default());
	}

	#[test]
	fn test_env_layer() {
		let layer = layer_from_vars(vars(&[
			("LOOM_BABEL_DEFAULT_LOCALE", "de_DE"),
			("LOOM_BABEL_DOMAINS", "messages, addit,,"),
			("LOOM_BABEL_CACHE_POLICY", "invalidate-on-load"),
		]))
		.unwrap();
		assert_eq!(layer.default_locale.as_deref(), Some("de_DE"));
		assert_eq!(
			layer.domains,
			Some(vec!["messages".to_string(), "addit".to_string()])
		);
		assert_eq!(layer.cache_policy, Some(CachePolicy::InvalidateOnLoad));
		assert!(layer.domain_precedence.is_none());
	}

	#[test]
	fn test_env_invalid_precedence() {
		let result = layer_from_vars(vars(&[("LOOM_BABEL_DOMAIN_PRECEDENCE", "random")]));
		assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
	}

	#[test]
	fn test_toml_source_missing_file_is_skipped() {
		let dir = TempDir::new().unwrap();
		let layer = TomlSource::new(dir.path().join("absent.toml"))
			.load()
			.unwrap();
		assert_eq!(layer, I18nConfigLayer::default());
	}

	#[test]
	fn test_toml_source_parse_error() {
		let dir = TempDir::new().unwrap();
		let path = dir.path().join("babel.toml");
		std::fs::write(&path, "default_locale = [").unwrap();
		let result = TomlSource::new(&path).load();
		assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
	}

	#[test]
	fn test_validation_rejects_empty_domains() {
		let config = I18nConfigLayer {
			domains: Some(vec![]),
			..Default::default()
		}
		.finalize();
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn test_validation_rejects_empty_default_locale() {
		let config = I18nConfigLayer {
			default_locale: Some("  ".to_string()),
			..Default::default()
		}
		.finalize();
		assert!(validate_config(&config).is_err());
	}

	#[test]
	fn test_precedence_ordering() {
		assert!(Precedence::Defaults < Precedence::ConfigFile);
		assert!(Precedence::ConfigFile < Precedence::Environment);
	}
}
