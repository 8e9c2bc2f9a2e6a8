// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Date, time, duration and number rendering helpers used by [`crate::Locale`].
//!
//! Named presets, digit grouping and plural categories come from CLDR data
//! through `icu`. Custom patterns are strftime strings rendered by chrono with
//! localized month and weekday names.

use std::fmt::{self, Write};
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use fixed_decimal::{Decimal, FloatPrecision};
use icu::calendar::{Date, Iso};
use icu::datetime::fieldsets::enums::{DateAndTimeFieldSet, DateFieldSet, TimeFieldSet};
use icu::datetime::fieldsets::{T, YMD, YMDE};
use icu::datetime::options::Length;
use icu::datetime::{input, DateTimeFormatter};
use icu::decimal::options::DecimalFormatterOptions;
use icu::decimal::DecimalFormatter;
use icu::locale::{locale, Locale as CldrLocale};
use icu::plurals::{PluralCategory, PluralRuleType, PluralRules};
use tracing::debug;

use crate::error::I18nError;

/// Default fraction of the next unit at which durations round up.
pub const DEFAULT_TIMEDELTA_THRESHOLD: f64 = 0.85;

/// A named CLDR preset or a strftime pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FormatStyle<'a> {
	/// Long date with weekday.
	Full,
	Long,
	#[default]
	Medium,
	Short,
	Pattern(&'a str),
}

impl<'a> From<&'a str> for FormatStyle<'a> {
	fn from(value: &'a str) -> Self {
		match value {
			"full" => FormatStyle::Full,
			"long" => FormatStyle::Long,
			"medium" => FormatStyle::Medium,
			"short" => FormatStyle::Short,
			pattern => FormatStyle::Pattern(pattern),
		}
	}
}

/// Units for duration rendering, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeUnit {
	Year,
	Month,
	Week,
	Day,
	Hour,
	Minute,
	Second,
}

impl TimeUnit {
	pub const ALL: [TimeUnit; 7] = [
		TimeUnit::Year,
		TimeUnit::Month,
		TimeUnit::Week,
		TimeUnit::Day,
		TimeUnit::Hour,
		TimeUnit::Minute,
		TimeUnit::Second,
	];

	pub fn seconds(self) -> u64 {
		match self {
			TimeUnit::Year => 3600 * 24 * 365,
			TimeUnit::Month => 3600 * 24 * 30,
			TimeUnit::Week => 3600 * 24 * 7,
			TimeUnit::Day => 3600 * 24,
			TimeUnit::Hour => 3600,
			TimeUnit::Minute => 60,
			TimeUnit::Second => 1,
		}
	}

	fn index(self) -> usize {
		self as usize
	}
}

impl FromStr for TimeUnit {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"year" => Ok(TimeUnit::Year),
			"month" => Ok(TimeUnit::Month),
			"week" => Ok(TimeUnit::Week),
			"day" => Ok(TimeUnit::Day),
			"hour" => Ok(TimeUnit::Hour),
			"minute" => Ok(TimeUnit::Minute),
			"second" => Ok(TimeUnit::Second),
			other => Err(format!("unknown time unit '{other}'")),
		}
	}
}

/// Most fraction digits [`LocaleFormats::decimal`] renders.
const MAX_FRACTION_DIGITS: usize = 20;

/// Formatting data for one locale.
#[derive(Debug, Clone)]
pub(crate) struct LocaleFormats {
	language: String,
	cldr: CldrLocale,
	names: chrono::Locale,
}

impl LocaleFormats {
	pub(crate) fn new(language: &str, region: Option<&str>) -> Self {
		Self {
			language: language.to_string(),
			cldr: cldr_locale(language, region),
			names: time_locale_for(language, region),
		}
	}

	/// Calendar data used for month and weekday names in strftime patterns.
	pub(crate) fn names(&self) -> chrono::Locale {
		self.names
	}

	pub(crate) fn date(&self, date: NaiveDate, style: FormatStyle<'_>) -> Result<String, I18nError> {
		if let FormatStyle::Pattern(pattern) = style {
			let midnight = Utc.from_utc_datetime(&date.and_time(NaiveTime::default()));
			return render(&midnight, pattern, self.names);
		}

		let formatter = DateTimeFormatter::try_new(self.cldr.clone().into(), date_fields(style))
			.map_err(|e| self.missing_data(e))?;
		Ok(formatter.format(&iso_date(date)?).to_string())
	}

	pub(crate) fn time<Tz>(
		&self,
		value: &DateTime<Tz>,
		style: FormatStyle<'_>,
	) -> Result<String, I18nError>
	where
		Tz: TimeZone,
		Tz::Offset: fmt::Display,
	{
		if let FormatStyle::Pattern(pattern) = style {
			return render(value, pattern, self.names);
		}

		let formatter = DateTimeFormatter::try_new(self.cldr.clone().into(), time_fields(style))
			.map_err(|e| self.missing_data(e))?;
		Ok(formatter.format(&iso_time(value.naive_local())?).to_string())
	}

	pub(crate) fn datetime<Tz>(
		&self,
		value: &DateTime<Tz>,
		style: FormatStyle<'_>,
	) -> Result<String, I18nError>
	where
		Tz: TimeZone,
		Tz::Offset: fmt::Display,
	{
		if let FormatStyle::Pattern(pattern) = style {
			return render(value, pattern, self.names);
		}

		let local = value.naive_local();
		let input = input::DateTime {
			date: iso_date(local.date())?,
			time: iso_time(local)?,
		};
		let formatter = DateTimeFormatter::try_new(self.cldr.clone().into(), datetime_fields(style))
			.map_err(|e| self.missing_data(e))?;
		Ok(formatter.format(&input).to_string())
	}

	/// Render a duration in the coarsest unit reaching `threshold` of itself,
	/// never finer than `granularity`. The sign of `delta` is ignored.
	pub(crate) fn timedelta(
		&self,
		delta: chrono::Duration,
		granularity: TimeUnit,
		threshold: f64,
	) -> String {
		let seconds = delta.num_seconds().unsigned_abs();
		let names = unit_names(&self.language);
		let rules = PluralRules::try_new(self.cldr.clone().into(), PluralRuleType::Cardinal.into());
		if let Err(e) = &rules {
			debug!(locale = %self.cldr, error = ?e, "no plural rules, using one/other by count");
		}

		for unit in TimeUnit::ALL {
			let mut value = seconds as f64 / unit.seconds() as f64;
			if value >= threshold || unit == granularity {
				if unit == granularity && value > 0.0 {
					value = value.max(1.0);
				}
				let rounded = value.round() as u64;
				let singular = match &rules {
					Ok(rules) => rules.category_for(rounded) == PluralCategory::One,
					Err(_) => rounded == 1,
				};
				let pattern = if singular {
					names.one[unit.index()]
				} else {
					names.other[unit.index()]
				};
				return pattern.replace("{0}", &rounded.to_string());
			}
		}

		String::new()
	}

	pub(crate) fn integer(&self, value: i64) -> String {
		match self.decimal_formatter() {
			Some(formatter) => formatter.format(&Decimal::from(value)).to_string(),
			None => value.to_string(),
		}
	}

	/// Round to `fraction_digits` (at most 20) and pad with trailing zeros.
	pub(crate) fn decimal(&self, value: f64, fraction_digits: usize) -> String {
		if !value.is_finite() {
			return value.to_string();
		}

		let scale = fraction_digits.min(MAX_FRACTION_DIGITS) as i16;
		// No "-0.00" for values that round to zero.
		let value = if (value.abs() * 10f64.powi(i32::from(scale))).round() == 0.0 {
			0.0
		} else {
			value
		};
		let Ok(mut decimal) = Decimal::try_from_f64(value, FloatPrecision::RoundTrip) else {
			return value.to_string();
		};
		decimal.round(-scale);
		decimal.pad_end(-scale);

		match self.decimal_formatter() {
			Some(formatter) => formatter.format(&decimal).to_string(),
			None => decimal.to_string(),
		}
	}

	fn decimal_formatter(&self) -> Option<DecimalFormatter> {
		let options = DecimalFormatterOptions::default();
		match DecimalFormatter::try_new(self.cldr.clone().into(), options) {
			Ok(formatter) => Some(formatter),
			Err(e) => {
				debug!(locale = %self.cldr, error = ?e, "no number data, using plain digits");
				None
			}
		}
	}

	fn missing_data(&self, error: impl fmt::Debug) -> I18nError {
		I18nError::FormatData {
			locale: self.cldr.to_string(),
			message: format!("{error:?}"),
		}
	}
}

/// CLDR locale for a language and optional region; unparseable codes use the
/// root locale.
fn cldr_locale(language: &str, region: Option<&str>) -> CldrLocale {
	let tag = match region {
		Some(region) => format!("{language}-{region}"),
		None => language.to_string(),
	};
	tag.parse::<CldrLocale>()
		.or_else(|_| language.parse::<CldrLocale>())
		.unwrap_or_else(|_| {
			debug!(locale = %tag, "not a BCP 47 tag, using root CLDR data");
			locale!("und")
		})
}

/// Pick chrono calendar names for a language and optional region.
///
/// A bare language tries `xx_XX` (e.g. `fr` → `fr_FR`); unknown codes fall
/// back to POSIX (English names).
fn time_locale_for(language: &str, region: Option<&str>) -> chrono::Locale {
	let candidate = match region {
		Some(region) => format!("{language}_{region}"),
		None => format!("{language}_{}", language.to_uppercase()),
	};
	match chrono::Locale::try_from(candidate.as_str()) {
		Ok(locale) => locale,
		Err(_) => {
			debug!(locale = %candidate, "no calendar data for locale, using POSIX");
			chrono::Locale::POSIX
		}
	}
}

fn date_fields(style: FormatStyle<'_>) -> DateFieldSet {
	match style {
		FormatStyle::Full => DateFieldSet::YMDE(YMDE::for_length(Length::Long)),
		FormatStyle::Long => DateFieldSet::YMD(YMD::for_length(Length::Long)),
		FormatStyle::Medium | FormatStyle::Pattern(_) => {
			DateFieldSet::YMD(YMD::for_length(Length::Medium))
		}
		FormatStyle::Short => DateFieldSet::YMD(YMD::for_length(Length::Short)),
	}
}

fn time_fields(style: FormatStyle<'_>) -> TimeFieldSet {
	match style {
		FormatStyle::Short => TimeFieldSet::T(T::hm().with_length(Length::Short)),
		FormatStyle::Full | FormatStyle::Long => {
			TimeFieldSet::T(T::hms().with_length(Length::Long))
		}
		FormatStyle::Medium | FormatStyle::Pattern(_) => {
			TimeFieldSet::T(T::hms().with_length(Length::Medium))
		}
	}
}

fn datetime_fields(style: FormatStyle<'_>) -> DateAndTimeFieldSet {
	match style {
		FormatStyle::Full => {
			DateAndTimeFieldSet::YMDET(YMDE::for_length(Length::Long).with_time_hms())
		}
		FormatStyle::Long => {
			DateAndTimeFieldSet::YMDT(YMD::for_length(Length::Long).with_time_hms())
		}
		FormatStyle::Medium | FormatStyle::Pattern(_) => {
			DateAndTimeFieldSet::YMDT(YMD::for_length(Length::Medium).with_time_hms())
		}
		FormatStyle::Short => {
			DateAndTimeFieldSet::YMDT(YMD::for_length(Length::Short).with_time_hm())
		}
	}
}

fn iso_date(date: NaiveDate) -> Result<Date<Iso>, I18nError> {
	// chrono months and days always fit in a u8.
	Date::try_new_iso(date.year(), date.month() as u8, date.day() as u8).map_err(|_| {
		I18nError::OutOfRange {
			value: date.to_string(),
		}
	})
}

fn iso_time(value: NaiveDateTime) -> Result<input::Time, I18nError> {
	// Presets never show fractional seconds; leap seconds clamp to :59.
	input::Time::try_new(
		value.hour() as u8,
		value.minute() as u8,
		value.second().min(59) as u8,
		0,
	)
	.map_err(|_| I18nError::OutOfRange {
		value: value.to_string(),
	})
}

/// Render `value` with localized month and weekday names.
pub(crate) fn render<Tz>(
	value: &DateTime<Tz>,
	pattern: &str,
	locale: chrono::Locale,
) -> Result<String, I18nError>
where
	Tz: TimeZone,
	Tz::Offset: fmt::Display,
{
	let mut out = String::new();
	write!(out, "{}", value.format_localized(pattern, locale)).map_err(|_| {
		I18nError::InvalidPattern {
			pattern: pattern.to_string(),
		}
	})?;
	Ok(out)
}

/// Duration unit names; the CLDR plural category picks `one` or `other`.
struct UnitNames {
	one: [&'static str; 7],
	other: [&'static str; 7],
}

const EN_UNITS: UnitNames = UnitNames {
	one: ["{0} year", "{0} month", "{0} week", "{0} day", "{0} hour", "{0} minute", "{0} second"],
	other: [
		"{0} years",
		"{0} months",
		"{0} weeks",
		"{0} days",
		"{0} hours",
		"{0} minutes",
		"{0} seconds",
	],
};

const FR_UNITS: UnitNames = UnitNames {
	one: ["{0} an", "{0} mois", "{0} semaine", "{0} jour", "{0} heure", "{0} minute", "{0} seconde"],
	other: [
		"{0} ans",
		"{0} mois",
		"{0} semaines",
		"{0} jours",
		"{0} heures",
		"{0} minutes",
		"{0} secondes",
	],
};

const ES_UNITS: UnitNames = UnitNames {
	one: ["{0} año", "{0} mes", "{0} semana", "{0} día", "{0} hora", "{0} minuto", "{0} segundo"],
	other: [
		"{0} años",
		"{0} meses",
		"{0} semanas",
		"{0} días",
		"{0} horas",
		"{0} minutos",
		"{0} segundos",
	],
};

const DE_UNITS: UnitNames = UnitNames {
	one: ["{0} Jahr", "{0} Monat", "{0} Woche", "{0} Tag", "{0} Stunde", "{0} Minute", "{0} Sekunde"],
	other: [
		"{0} Jahre",
		"{0} Monate",
		"{0} Wochen",
		"{0} Tage",
		"{0} Stunden",
		"{0} Minuten",
		"{0} Sekunden",
	],
};

const PT_UNITS: UnitNames = UnitNames {
	one: ["{0} ano", "{0} mês", "{0} semana", "{0} dia", "{0} hora", "{0} minuto", "{0} segundo"],
	other: [
		"{0} anos",
		"{0} meses",
		"{0} semanas",
		"{0} dias",
		"{0} horas",
		"{0} minutos",
		"{0} segundos",
	],
};

const IT_UNITS: UnitNames = UnitNames {
	one: ["{0} anno", "{0} mese", "{0} settimana", "{0} giorno", "{0} ora", "{0} minuto", "{0} secondo"],
	other: [
		"{0} anni",
		"{0} mesi",
		"{0} settimane",
		"{0} giorni",
		"{0} ore",
		"{0} minuti",
		"{0} secondi",
	],
};

const NL_UNITS: UnitNames = UnitNames {
	one: ["{0} jaar", "{0} maand", "{0} week", "{0} dag", "{0} uur", "{0} minuut", "{0} seconde"],
	other: [
		"{0} jaar",
		"{0} maanden",
		"{0} weken",
		"{0} dagen",
		"{0} uur",
		"{0} minuten",
		"{0} seconden",
	],
};

const JA_UNITS: UnitNames = UnitNames {
	one: ["{0} 年", "{0} か月", "{0} 週間", "{0} 日", "{0} 時間", "{0} 分", "{0} 秒"],
	other: ["{0} 年", "{0} か月", "{0} 週間", "{0} 日", "{0} 時間", "{0} 分", "{0} 秒"],
};

const ZH_UNITS: UnitNames = UnitNames {
	one: ["{0}年", "{0}个月", "{0}周", "{0}天", "{0}小时", "{0}分钟", "{0}秒"],
	other: ["{0}年", "{0}个月", "{0}周", "{0}天", "{0}小时", "{0}分钟", "{0}秒"],
};

fn unit_names(language: &str) -> &'static UnitNames {
	match language {
		"fr" => &FR_UNITS,
		"es" => &ES_UNITS,
		"de" => &DE_UNITS,
		"pt" => &PT_UNITS,
		"it" => &IT_UNITS,
		"nl" => &NL_UNITS,
		"ja" => &JA_UNITS,
		"zh" => &ZH_UNITS,
		_ => &EN_UNITS,
	}
}
