// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Locale negotiation and gettext translation for Loom web handlers.
//!
//! Compiled `.mo` catalogs are loaded from a `<root>/<locale>/<domain>.mo`
//! tree. Every domain loaded for a locale is merged into one catalog, so
//! `messages` and `addit` can be looked up together. Requests are matched to
//! the closest supported locale from their `Accept-Language` header, and the
//! resulting [`Locale`] translates, pluralizes and formats dates, durations
//! and numbers.
//!
//! # Example
//!
//! ```no_run
//! use loom_babel::{I18nConfig, LocaleRegistry};
//!
//! let mut registry = LocaleRegistry::new(I18nConfig::default());
//! registry.load("/srv/app/translations", "messages")?;
//! registry.load("/srv/app/translations", "addit")?;
//!
//! let locale = registry.browser_locale(Some("fr-FR,fr;q=0.9,en;q=0.5"), "en_US");
//! let welcome = locale.translate("Welcome");
//! let apples = locale.translate_plural("%(num)d apple", "%(num)d apples", 3);
//! # let _ = (welcome, apples);
//! # Ok::<(), loom_babel::I18nError>(())
//! ```

mod accept;
mod cache;
mod catalog;
mod config;
mod error;
mod format;
mod lazy;
mod locale;
mod registry;
mod resolve;
mod store;

pub use accept::{candidate_codes, parse_accept_language, CandidateEntry};
pub use cache::{CachePolicy, LocaleCache};
pub use catalog::{DomainCatalog, DomainPrecedence, MergedCatalog};
pub use config::{
	load_config, load_config_with_file, ConfigSource, DefaultsSource, EnvSource, I18nConfig,
	I18nConfigLayer, Precedence, TomlSource, DEFAULT_DOMAIN, DEFAULT_LOCALE,
};
pub use error::{ConfigError, I18nError};
pub use format::{FormatStyle, TimeUnit, DEFAULT_TIMEDELTA_THRESHOLD};
pub use lazy::{make_lazy_gettext, LazyGettext, LazyInput, LazyString, Translator, TranslatorSource};
pub use locale::{is_rtl, Direction, Locale};
pub use registry::LocaleRegistry;
pub use resolve::{closest_match, normalize_code, NormalizedCode};
pub use store::{CatalogStore, LoadSummary, LocaleLoad};

/// Re-exported for [`DomainCatalog::catalog`].
pub use gettext::Catalog;
