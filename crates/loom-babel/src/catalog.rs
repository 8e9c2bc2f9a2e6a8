// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Per-locale translation table merged from several gettext domains.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use gettext::Catalog;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Which domain answers first when the same message id is translated in more
/// than one domain of a locale.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainPrecedence {
	/// The most recently added domain wins.
	#[default]
	LastLoaded,
	/// The first domain added wins; later domains only fill gaps.
	FirstLoaded,
}

impl FromStr for DomainPrecedence {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"last-loaded" | "last" => Ok(Self::LastLoaded),
			"first-loaded" | "first" => Ok(Self::FirstLoaded),
			other => Err(format!(
				"unknown domain precedence '{other}' (expected last-loaded or first-loaded)"
			)),
		}
	}
}

/// One domain's compiled catalog together with the message ids it defines.
///
/// A missing key and an identity translation (`"OK"` to `"OK"`) look the same
/// through `gettext::Catalog`; the id set tells them apart.
#[derive(Clone)]
pub struct DomainCatalog {
	catalog: Arc<Catalog>,
	msgids: Arc<HashSet<String>>,
}

impl DomainCatalog {
	/// Parse the bytes of a compiled `.mo` file.
	pub fn parse(bytes: &[u8]) -> Result<Self, gettext::Error> {
		let catalog = Catalog::parse(bytes)?;
		Ok(Self {
			catalog: Arc::new(catalog),
			msgids: Arc::new(mo_msgids(bytes)),
		})
	}

	/// Whether the catalog defines `msgid` (the singular id for plural entries).
	pub fn contains(&self, msgid: &str) -> bool {
		self.msgids.contains(msgid)
	}

	/// Number of messages, excluding the header entry.
	pub fn len(&self) -> usize {
		self.msgids.len()
	}

	pub fn is_empty(&self) -> bool {
		self.msgids.is_empty()
	}

	pub fn catalog(&self) -> &Catalog {
		&self.catalog
	}
}

impl fmt::Debug for DomainCatalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DomainCatalog")
			.field("messages", &self.msgids.len())
			.finish()
	}
}

/// Read the original-string table of a `.mo` file.
///
/// Only called after `Catalog::parse` accepted the same bytes, so a short
/// table just ends the scan.
fn mo_msgids(bytes: &[u8]) -> HashSet<String> {
	let mut msgids = HashSet::new();
	let Some(magic) = read_u32(bytes, 0, false) else {
		return msgids;
	};
	let big_endian = magic == 0xde12_0495;
	let (Some(count), Some(table)) = (read_u32(bytes, 8, big_endian), read_u32(bytes, 12, big_endian))
	else {
		return msgids;
	};

	for index in 0..count as usize {
		let at = table as usize + index * 8;
		let (Some(len), Some(offset)) = (read_u32(bytes, at, big_endian), read_u32(bytes, at + 4, big_endian))
		else {
			break;
		};
		let Some(raw) = bytes.get(offset as usize..offset as usize + len as usize) else {
			break;
		};
		// Plural entries store `singular\0plural`; gettext keys them by the singular.
		let singular = raw.split(|&b| b == 0).next().unwrap_or_default();
		if !singular.is_empty() {
			msgids.insert(String::from_utf8_lossy(singular).into_owned());
		}
	}
	msgids
}

fn read_u32(bytes: &[u8], at: usize, big_endian: bool) -> Option<u32> {
	let word: [u8; 4] = bytes.get(at..at + 4)?.try_into().ok()?;
	Some(if big_endian {
		u32::from_be_bytes(word)
	} else {
		u32::from_le_bytes(word)
	})
}

#[derive(Clone)]
struct Domain {
	name: String,
	entries: DomainCatalog,
}

/// Translations for one locale, one gettext catalog per domain.
///
/// Domains are kept in the order they were first added. Re-adding a domain
/// swaps its catalog in place, so the other domains' entries are untouched.
#[derive(Clone, Default)]
pub struct MergedCatalog {
	domains: Vec<Domain>,
	precedence: DomainPrecedence,
}

static EMPTY: Lazy<MergedCatalog> = Lazy::new(MergedCatalog::default);

impl MergedCatalog {
	pub fn new(precedence: DomainPrecedence) -> Self {
		Self {
			domains: Vec::new(),
			precedence,
		}
	}

	/// Shared catalog with no domains; every lookup returns the source text.
	pub fn empty() -> &'static MergedCatalog {
		&EMPTY
	}

	/// Add or replace the catalog for `domain`.
	///
	/// Returns `true` when an earlier catalog for the same domain was replaced.
	pub fn insert_domain(&mut self, domain: impl Into<String>, catalog: DomainCatalog) -> bool {
		let name = domain.into();
		match self.domains.iter_mut().find(|d| d.name == name) {
			Some(existing) => {
				existing.entries = catalog;
				true
			}
			None => {
				self.domains.push(Domain {
					name,
					entries: catalog,
				});
				false
			}
		}
	}

	pub fn is_empty(&self) -> bool {
		self.domains.is_empty()
	}

	pub fn precedence(&self) -> DomainPrecedence {
		self.precedence
	}

	/// Domain names in load order.
	pub fn domains(&self) -> impl Iterator<Item = &str> {
		self.domains.iter().map(|d| d.name.as_str())
	}

	pub fn has_domain(&self, domain: &str) -> bool {
		self.domains.iter().any(|d| d.name == domain)
	}

	fn in_precedence_order(&self) -> Box<dyn Iterator<Item = &Domain> + '_> {
		match self.precedence {
			DomainPrecedence::LastLoaded => Box::new(self.domains.iter().rev()),
			DomainPrecedence::FirstLoaded => Box::new(self.domains.iter()),
		}
	}

	/// Look up `msgid` in the first domain, by precedence, that defines it.
	pub fn lookup<'a>(&'a self, msgid: &'a str) -> Option<&'a str> {
		self.in_precedence_order()
			.find(|d| d.entries.contains(msgid))
			.map(|d| d.entries.catalog.gettext(msgid))
	}

	/// Look up a plural message across all domains.
	///
	/// The plural form is chosen by the owning catalog's `Plural-Forms` rule.
	pub fn lookup_plural<'a>(
		&'a self,
		msgid: &'a str,
		msgid_plural: &'a str,
		n: u64,
	) -> Option<&'a str> {
		self.in_precedence_order()
			.find(|d| d.entries.contains(msgid))
			.map(|d| d.entries.catalog.ngettext(msgid, msgid_plural, n))
	}

	/// Translate `msgid`, falling back to the msgid itself.
	pub fn gettext<'a>(&'a self, msgid: &'a str) -> &'a str {
		self.lookup(msgid).unwrap_or(msgid)
	}

	/// Translate a plural message, falling back to `msgid` when `n == 1` and
	/// `msgid_plural` otherwise.
	pub fn ngettext<'a>(&'a self, msgid: &'a str, msgid_plural: &'a str, n: u64) -> &'a str {
		self.lookup_plural(msgid, msgid_plural, n)
			.unwrap_or(if n == 1 { msgid } else { msgid_plural })
	}

	/// Translate `msgid` using only `domain`.
	pub fn dgettext<'a>(&'a self, domain: &str, msgid: &'a str) -> &'a str {
		match self.domains.iter().find(|d| d.name == domain) {
			Some(d) => d.entries.catalog.gettext(msgid),
			None => msgid,
		}
	}

	/// Translate a plural message using only `domain`.
	pub fn dngettext<'a>(
		&'a self,
		domain: &str,
		msgid: &'a str,
		msgid_plural: &'a str,
		n: u64,
	) -> &'a str {
		match self.domains.iter().find(|d| d.name == domain) {
			Some(d) => d.entries.catalog.ngettext(msgid, msgid_plural, n),
			None if n == 1 => msgid,
			None => msgid_plural,
		}
	}
}

impl fmt::Debug for MergedCatalog {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("MergedCatalog")
			.field("domains", &self.domains().collect::<Vec<_>>())
			.field("precedence", &self.precedence)
			.finish()
	}
}

#[cfg(test)]
#[path = "../tests/common/mo.rs"]
pub(crate) mod mo_file;
