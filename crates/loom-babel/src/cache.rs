// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-code memo of bound [`Locale`] values.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::locale::Locale;

/// What happens to cached locales when catalogs are loaded later.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CachePolicy {
	/// Keep cached locales; they go on serving the catalogs they were built with.
	#[default]
	Retain,
	/// Drop every cached locale after each load.
	InvalidateOnLoad,
}

impl FromStr for CachePolicy {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"retain" => Ok(Self::Retain),
			"invalidate-on-load" | "invalidate" => Ok(Self::InvalidateOnLoad),
			other => Err(format!(
				"unknown cache policy '{other}' (expected retain or invalidate-on-load)"
			)),
		}
	}
}

/// Locales created on first request and shared afterwards.
#[derive(Default)]
pub struct LocaleCache {
	entries: RwLock<HashMap<String, Arc<Locale>>>,
}

impl LocaleCache {
	pub fn new() -> Self {
		Self::default()
	}

	/// Return the cached locale for `code`, building it with `create` the
	/// first time.
	pub fn get_or_create(&self, code: &str, create: impl FnOnce() -> Locale) -> Arc<Locale> {
		if let Some(locale) = self.entries.read().get(code) {
			return locale.clone();
		}

		let mut entries = self.entries.write();
		entries
			.entry(code.to_string())
			.or_insert_with(|| {
				debug!(locale = %code, "creating cached locale");
				Arc::new(create())
			})
			.clone()
	}

	pub fn get(&self, code: &str) -> Option<Arc<Locale>> {
		self.entries.read().get(code).cloned()
	}

	pub fn clear(&self) {
		self.entries.write().clear();
	}

	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}
}

impl fmt::Debug for LocaleCache {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let entries = self.entries.read();
		let mut codes: Vec<&String> = entries.keys().collect();
		codes.sort();
		f.debug_struct("LocaleCache").field("codes", &codes).finish()
	}
}
