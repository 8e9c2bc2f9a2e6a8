// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! `Accept-Language` parsing into quality-ordered candidate codes.

/// One language preference from an `Accept-Language` header.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
	pub code: String,
	/// Quality in `[0.0, 1.0]`.
	pub quality: f32,
}

/// Parse an `Accept-Language` value, highest quality first.
///
/// Missing or unparseable `q` values count as `1.0`. Entries with equal
/// quality keep their header order.
///
/// # Example
///
/// ```
/// use loom_babel::parse_accept_language;
///
/// let entries = parse_accept_language("fr;q=0.5, es-ES, de;q=0.8");
/// let codes: Vec<_> = entries.iter().map(|e| e.code.as_str()).collect();
/// assert_eq!(codes, ["es-ES", "de", "fr"]);
/// ```
pub fn parse_accept_language(header: &str) -> Vec<CandidateEntry> {
	let mut entries: Vec<CandidateEntry> = header
		.split(',')
		.filter_map(|segment| {
			let mut parts = segment.trim().split(';');
			let code = parts.next().unwrap_or("").trim();
			if code.is_empty() {
				return None;
			}
			let quality = parts.next().map_or(1.0, parse_quality);
			Some(CandidateEntry {
				code: code.to_string(),
				quality,
			})
		})
		.collect();

	// `sort_by` is stable, so ties keep header order.
	entries.sort_by(|a, b| b.quality.total_cmp(&a.quality));
	entries
}

fn parse_quality(param: &str) -> f32 {
	let Some(value) = param.trim().strip_prefix("q=") else {
		return 1.0;
	};
	match value.trim().parse::<f32>() {
		Ok(q) if q.is_finite() => q.clamp(0.0, 1.0),
		_ => 1.0,
	}
}

/// Candidate codes from an optional header value, in preference order.
///
/// An absent or empty header yields an empty list; callers then fall back to
/// their configured default.
pub fn candidate_codes(header: Option<&str>) -> Vec<String> {
	match header {
		Some(value) if !value.trim().is_empty() => parse_accept_language(value)
			.into_iter()
			.map(|entry| entry.code)
			.collect(),
		_ => Vec::new(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;

	fn codes(header: &str) -> Vec<String> {
		candidate_codes(Some(header))
	}

	#[test]
	fn test_orders_by_quality() {
		assert_eq!(
			codes("da, en-gb;q=0.8, en;q=0.7"),
			vec!["da", "en-gb", "en"]
		);
		assert_eq!(
			codes("en;q=0.2, fr_FR;q=0.9, es"),
			vec!["es", "fr_FR", "en"]
		);
	}

	#[test]
	fn test_ties_keep_header_order() {
		assert_eq!(codes("de, fr, es"), vec!["de", "fr", "es"]);
		assert_eq!(
			codes("de;q=0.5, fr;q=0.5, es;q=0.5"),
			vec!["de", "fr", "es"]
		);
	}

	#[test]
	fn test_malformed_quality_defaults_to_one() {
		let entries = parse_accept_language("de;q=abc, fr;q=0.9, es;level=1");
		assert_eq!(entries[0].code, "de");
		assert_eq!(entries[0].quality, 1.0);
		assert_eq!(entries[1].code, "es");
		assert_eq!(entries[1].quality, 1.0);
		assert_eq!(entries[2].code, "fr");
	}

	#[test]
	fn test_quality_is_clamped() {
		let entries = parse_accept_language("de;q=7, fr;q=-1");
		assert_eq!(entries[0].quality, 1.0);
		assert_eq!(entries[1].quality, 0.0);
	}

	#[test]
	fn test_empty_segments_skipped() {
		assert_eq!(codes(" , fr ,, "), vec!["fr"]);
	}

	#[test]
	fn test_absent_or_blank_header() {
		assert!(candidate_codes(None).is_empty());
		assert!(candidate_codes(Some("")).is_empty());
		assert!(candidate_codes(Some("   ")).is_empty());
	}

	proptest! {
		/// Output is always sorted by descending quality.
		#[test]
		fn output_sorted_descending(qs in proptest::collection::vec(0u8..=10, 1..8)) {
			let header = qs
				.iter()
				.enumerate()
				.map(|(i, q)| format!("l{i};q={}", f32::from(*q) / 10.0))
				.collect::<Vec<_>>()
				.join(", ");
			let entries = parse_accept_language(&header);
			prop_assert_eq!(entries.len(), qs.len());
			for pair in entries.windows(2) {
				prop_assert!(pair[0].quality >= pair[1].quality);
			}
		}

		/// Arbitrary header text never panics and never yields empty codes.
		#[test]
		fn arbitrary_headers_are_tolerated(header in ".{0,64}") {
			for entry in parse_accept_language(&header) {
				prop_assert!(!entry.code.is_empty());
				prop_assert!((0.0..=1.0).contains(&entry.quality));
			}
		}
	}
}
