// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Closest-match locale resolution.

use std::collections::BTreeSet;

/// A candidate code after separator and case normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCode {
	/// `language` or `language_REGION`.
	pub code: String,
	/// Lowercased language part.
	pub language: String,
}

/// Normalize a raw candidate code.
///
/// `-` becomes `_`. A `language_region` pair is rewritten to lowercase
/// language and uppercase region; a bare language is kept as given. Codes
/// with more than two parts are rejected.
///
/// # Example
///
/// ```
/// use loom_babel::normalize_code;
///
/// let code = normalize_code("fr-fr").unwrap();
/// assert_eq!(code.code, "fr_FR");
/// assert_eq!(code.language, "fr");
///
/// assert!(normalize_code("zh-Hant-TW").is_none());
/// ```
pub fn normalize_code(raw: &str) -> Option<NormalizedCode> {
	if raw.is_empty() {
		return None;
	}

	let replaced = raw.replace('-', "_");
	let parts: Vec<&str> = replaced.split('_').collect();
	match parts.as_slice() {
		[language] => Some(NormalizedCode {
			code: (*language).to_string(),
			language: language.to_lowercase(),
		}),
		[language, region] => {
			let language = language.to_lowercase();
			Some(NormalizedCode {
				code: format!("{language}_{}", region.to_uppercase()),
				language,
			})
		}
		_ => None,
	}
}

/// Resolve the closest supported locale for an ordered list of candidates.
///
/// Each candidate is tried in turn: first the normalized code exactly, then
/// its language alone. The first hit wins. If nothing matches, `default` is
/// returned.
///
/// # Example
///
/// ```
/// use std::collections::BTreeSet;
/// use loom_babel::closest_match;
///
/// let supported: BTreeSet<String> =
/// 	["en_US", "fr_FR", "es"].iter().map(|s| s.to_string()).collect();
///
/// assert_eq!(closest_match(&supported, "en_US", ["fr-FR"]), "fr_FR");
/// assert_eq!(closest_match(&supported, "en_US", ["es_MX", "fr_FR"]), "es");
/// assert_eq!(closest_match(&supported, "en_US", ["de_DE"]), "en_US");
/// ```
pub fn closest_match<I, S>(supported: &BTreeSet<String>, default: &str, candidates: I) -> String
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	for candidate in candidates {
		let Some(normalized) = normalize_code(candidate.as_ref()) else {
			continue;
		};

		if supported.contains(&normalized.code) {
			return normalized.code;
		}

		if supported.contains(&normalized.language) {
			return normalized.language;
		}
	}

	default.to_string()
}
