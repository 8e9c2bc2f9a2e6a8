// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Deferred translations.
//!
//! A [`LazyString`] records what to translate and where to find the
//! translator, and performs the lookup each time the text is needed. Templates
//! and handlers can build messages before the request's locale has been
//! decided, and a value kept across requests follows each request's locale.

use std::fmt;
use std::sync::Arc;

/// Anything that can translate singular and plural messages.
pub trait Translator: Send + Sync {
	fn gettext(&self, message: &str) -> String;
	fn ngettext(&self, message: &str, plural_message: &str, count: u64) -> String;
}

/// Returns the translator active at the moment it is called.
pub type TranslatorSource = Arc<dyn Fn() -> Arc<dyn Translator> + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Request {
	Singular(String),
	Plural {
		message: String,
		plural_message: String,
		count: u64,
	},
}

struct Inner {
	source: TranslatorSource,
	request: Request,
}

/// A translation evaluated against the active translator whenever it is read.
#[derive(Clone)]
pub struct LazyString {
	inner: Arc<Inner>,
}

impl LazyString {
	fn new(source: TranslatorSource, request: Request) -> Self {
		Self {
			inner: Arc::new(Inner { source, request }),
		}
	}

	/// Translate with the translator active right now.
	pub fn resolve_text(&self) -> String {
		let translator = (self.inner.source)();
		match &self.inner.request {
			Request::Singular(message) => translator.gettext(message),
			Request::Plural {
				message,
				plural_message,
				count,
			} => translator.ngettext(message, plural_message, *count),
		}
	}

	/// The untranslated singular message.
	pub fn message(&self) -> &str {
		match &self.inner.request {
			Request::Singular(message) | Request::Plural { message, .. } => message,
		}
	}

	/// Whether both values share the same deferred lookup.
	pub fn ptr_eq(&self, other: &LazyString) -> bool {
		Arc::ptr_eq(&self.inner, &other.inner)
	}
}

impl fmt::Display for LazyString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.resolve_text())
	}
}

impl fmt::Debug for LazyString {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("LazyString")
			.field("request", &self.inner.request)
			.finish()
	}
}

impl PartialEq<str> for LazyString {
	fn eq(&self, other: &str) -> bool {
		self.resolve_text() == other
	}
}

impl PartialEq<&str> for LazyString {
	fn eq(&self, other: &&str) -> bool {
		self.resolve_text() == *other
	}
}

impl From<LazyString> for String {
	fn from(value: LazyString) -> Self {
		value.resolve_text()
	}
}

/// Input to [`LazyGettext::gettext`]: plain text or an existing lazy value.
pub enum LazyInput {
	Text(String),
	Lazy(LazyString),
}

impl From<&str> for LazyInput {
	fn from(value: &str) -> Self {
		LazyInput::Text(value.to_string())
	}
}

impl From<String> for LazyInput {
	fn from(value: String) -> Self {
		LazyInput::Text(value)
	}
}

impl From<LazyString> for LazyInput {
	fn from(value: LazyString) -> Self {
		LazyInput::Lazy(value)
	}
}

impl From<&LazyString> for LazyInput {
	fn from(value: &LazyString) -> Self {
		LazyInput::Lazy(value.clone())
	}
}

/// Factory for [`LazyString`]s bound to one translator source.
#[derive(Clone)]
pub struct LazyGettext {
	source: TranslatorSource,
}

impl LazyGettext {
	/// Defer translation of `message`.
	///
	/// An input that is already lazy is returned as is, never wrapped twice.
	pub fn gettext(&self, message: impl Into<LazyInput>) -> LazyString {
		match message.into() {
			LazyInput::Lazy(existing) => existing,
			LazyInput::Text(text) => LazyString::new(self.source.clone(), Request::Singular(text)),
		}
	}

	/// Defer translation of a plural message.
	pub fn ngettext(
		&self,
		message: impl Into<String>,
		plural_message: impl Into<String>,
		count: u64,
	) -> LazyString {
		LazyString::new(
			self.source.clone(),
			Request::Plural {
				message: message.into(),
				plural_message: plural_message.into(),
				count,
			},
		)
	}
}

/// Create a lazy gettext factory that asks `source` for the active translator
/// every time one of its [`LazyString`]s is rendered.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use std::sync::{Arc, RwLock};
/// use loom_babel::{make_lazy_gettext, Translator};
///
/// struct Table(HashMap<String, String>);
///
/// impl Translator for Table {
/// 	fn gettext(&self, message: &str) -> String {
/// 		self.0.get(message).cloned().unwrap_or_else(|| message.to_string())
/// 	}
/// 	fn ngettext(&self, message: &str, plural: &str, count: u64) -> String {
/// 		if count == 1 { self.gettext(message) } else { self.gettext(plural) }
/// 	}
/// }
///
/// let active = Arc::new(RwLock::new(Arc::new(Table(HashMap::new()))));
/// let current = active.clone();
/// let lazy = make_lazy_gettext(move || current.read().unwrap().clone() as Arc<dyn Translator>);
///
/// let yes = lazy.gettext("Yes");
/// *active.write().unwrap() =
/// 	Arc::new(Table(HashMap::from([("Yes".to_string(), "Ja".to_string())])));
/// assert_eq!(yes.resolve_text(), "Ja");
///
/// *active.write().unwrap() =
/// 	Arc::new(Table(HashMap::from([("Yes".to_string(), "Si".to_string())])));
/// assert_eq!(yes.resolve_text(), "Si");
/// ```
pub fn make_lazy_gettext<F>(source: F) -> LazyGettext
where
	F: Fn() -> Arc<dyn Translator> + Send + Sync + 'static,
{
	LazyGettext {
		source: Arc::new(source),
	}
}
