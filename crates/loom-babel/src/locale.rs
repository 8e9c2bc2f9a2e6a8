// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! A locale bound to its merged catalog, with translation and formatting.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::catalog::MergedCatalog;
use crate::error::I18nError;
use crate::format::{FormatStyle, LocaleFormats, TimeUnit};
use crate::lazy::Translator;

/// Text direction for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
	Ltr,
	/// Arabic, Hebrew, Persian, Urdu and the other [`is_rtl`] languages.
	Rtl,
}

const RTL_LANGUAGES: &[&str] = &["ar", "he", "fa", "ur", "yi", "ps", "dv", "ckb"];

/// Check if a language code uses right-to-left text direction.
pub fn is_rtl(language: &str) -> bool {
	RTL_LANGUAGES.contains(&language)
}

/// A locale bound to the translations registered for its exact code.
pub struct Locale {
	code: String,
	language: String,
	region: Option<String>,
	direction: Direction,
	formats: LocaleFormats,
	catalog: Option<Arc<MergedCatalog>>,
}

impl Locale {
	/// Build a locale for `code`. Without a catalog every lookup returns the
	/// source text.
	pub fn new(code: impl Into<String>, catalog: Option<Arc<MergedCatalog>>) -> Self {
		let code = code.into();
		let mut parts = code.split(['_', '-']);
		let language = parts.next().unwrap_or_default().to_lowercase();
		let region = parts.next().map(str::to_uppercase);
		let direction = if is_rtl(&language) {
			Direction::Rtl
		} else {
			Direction::Ltr
		};
		let formats = LocaleFormats::new(&language, region.as_deref());

		Self {
			code,
			language,
			region,
			direction,
			formats,
			catalog,
		}
	}

	pub fn code(&self) -> &str {
		&self.code
	}

	pub fn language(&self) -> &str {
		&self.language
	}

	pub fn region(&self) -> Option<&str> {
		self.region.as_deref()
	}

	pub fn direction(&self) -> Direction {
		self.direction
	}

	pub fn is_rtl(&self) -> bool {
		self.direction == Direction::Rtl
	}

	/// Calendar data used for month and weekday names in strftime patterns.
	pub fn time_locale(&self) -> chrono::Locale {
		self.formats.names()
	}

	pub fn catalog(&self) -> &MergedCatalog {
		self.catalog.as_deref().unwrap_or(MergedCatalog::empty())
	}

	/// Translate `message`, or return it unchanged when no catalog has it.
	pub fn translate(&self, message: &str) -> String {
		self.catalog().gettext(message).to_string()
	}

	/// Translate a plural message for `count`.
	///
	/// Untranslated messages use `message` for a count of one and
	/// `plural_message` otherwise.
	pub fn translate_plural(&self, message: &str, plural_message: &str, count: u64) -> String {
		self.catalog()
			.ngettext(message, plural_message, count)
			.to_string()
	}

	/// Translate `message` from a single domain.
	pub fn dgettext(&self, domain: &str, message: &str) -> String {
		self.catalog().dgettext(domain, message).to_string()
	}

	/// Format a timestamp in `tz`.
	///
	/// Presets use the locale's CLDR date and time formats; a
	/// [`FormatStyle::Pattern`] is a strftime string.
	///
	/// ```
	/// use chrono::{TimeZone, Utc};
	/// use loom_babel::{FormatStyle, Locale};
	///
	/// let locale = Locale::new("pt_BR", None);
	/// let dt = Utc.with_ymd_and_hms(2007, 4, 1, 15, 30, 0).unwrap();
	/// let short = locale.format_datetime(&dt, FormatStyle::Short, &Utc).unwrap();
	/// assert!(short.starts_with("01/04/2007"));
	/// assert_eq!(
	/// 	locale.format_datetime(&dt, "%d/%m/%Y %H:%M:%S", &Utc).unwrap(),
	/// 	"01/04/2007 15:30:00"
	/// );
	/// ```
	pub fn format_datetime<'p, Tz>(
		&self,
		value: &DateTime<Utc>,
		style: impl Into<FormatStyle<'p>>,
		tz: &Tz,
	) -> Result<String, I18nError>
	where
		Tz: TimeZone,
		Tz::Offset: fmt::Display,
	{
		self.formats.datetime(&value.with_timezone(tz), style.into())
	}

	/// Format a calendar date.
	pub fn format_date<'p>(
		&self,
		date: NaiveDate,
		style: impl Into<FormatStyle<'p>>,
	) -> Result<String, I18nError> {
		self.formats.date(date, style.into())
	}

	/// Format the time of day of a timestamp in `tz`.
	pub fn format_time<'p, Tz>(
		&self,
		value: &DateTime<Utc>,
		style: impl Into<FormatStyle<'p>>,
		tz: &Tz,
	) -> Result<String, I18nError>
	where
		Tz: TimeZone,
		Tz::Offset: fmt::Display,
	{
		self.formats.time(&value.with_timezone(tz), style.into())
	}

	/// Describe a duration, e.g. `3 hours`.
	///
	/// The largest unit whose value reaches `threshold` is used, but never a
	/// unit finer than `granularity`.
	pub fn format_timedelta(
		&self,
		delta: chrono::Duration,
		granularity: TimeUnit,
		threshold: f64,
	) -> String {
		self.formats.timedelta(delta, granularity, threshold)
	}

	/// Format an integer with locale digit grouping.
	pub fn format_number(&self, value: i64) -> String {
		self.formats.integer(value)
	}

	/// Format a decimal with locale separators and fixed fraction digits.
	pub fn format_decimal(&self, value: f64, fraction_digits: usize) -> String {
		self.formats.decimal(value, fraction_digits)
	}
}

impl Translator for Locale {
	fn gettext(&self, message: &str) -> String {
		self.translate(message)
	}

	fn ngettext(&self, message: &str, plural_message: &str, count: u64) -> String {
		self.translate_plural(message, plural_message, count)
	}
}

impl fmt::Debug for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Locale")
			.field("code", &self.code)
			.field("direction", &self.direction)
			.field("catalog", &self.catalog)
			.finish()
	}
}

impl fmt::Display for Locale {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.code)
	}
}
