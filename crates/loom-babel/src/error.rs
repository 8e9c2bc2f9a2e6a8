// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for catalog loading, locale lookup and configuration.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum I18nError {
	#[error("Locale '{code}' is not in the supported locale set")]
	UnsupportedLocale { code: String },

	#[error("Failed to read locale directory {path}: {source}")]
	ReadDir {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("No catalog for domain '{domain}' in locale '{locale}'")]
	CatalogMissing { locale: String, domain: String },

	#[error("Failed to open catalog {path}: {source}")]
	CatalogOpen {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse catalog {path}: {source}")]
	CatalogParse {
		path: PathBuf,
		#[source]
		source: gettext::Error,
	},

	#[error("Invalid date/time pattern '{pattern}'")]
	InvalidPattern { pattern: String },

	#[error("No formatting data for locale '{locale}': {message}")]
	FormatData { locale: String, message: String },

	#[error("Value {value} is outside the supported calendar range")]
	OutOfRange { value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
	#[error("Invalid value for {key}: {message}")]
	InvalidValue { key: String, message: String },

	#[error("Failed to parse TOML config at {path}: {source}")]
	TomlParse {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Failed to read config file {path}: {source}")]
	FileRead {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Validation error: {0}")]
	Validation(String),
}
