// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Writes GNU `.mo` files so tests don't depend on `msgfmt`.
//!
//! Shared by the unit tests (through `catalog::test_support`) and the
//! integration tests (through `tests/common`).

use std::path::Path;

const HEADER: &str = "Content-Type: text/plain; charset=UTF-8\n\
                      Plural-Forms: nplurals=2; plural=(n != 1);\n";

/// A `(msgid, msgstr)` pair; plural entries use `\0` separated forms.
pub type Entry<'a> = (&'a str, &'a str);

/// Encode entries as a little-endian `.mo` file with a UTF-8, two-form header.
pub fn mo_bytes(entries: &[Entry<'_>]) -> Vec<u8> {
	let mut all: Vec<Entry<'_>> = vec![("", HEADER)];
	all.extend_from_slice(entries);
	all.sort_by(|a, b| a.0.cmp(b.0));

	let count = all.len() as u32;
	let ids_at = 28u32;
	let strs_at = ids_at + count * 8;
	let mut next = strs_at + count * 8;

	let mut table = Vec::new();
	let mut data = Vec::new();
	for text in all.iter().map(|e| e.0).chain(all.iter().map(|e| e.1)) {
		table.push((text.len() as u32, next));
		data.extend_from_slice(text.as_bytes());
		data.push(0);
		next += text.len() as u32 + 1;
	}

	let mut out = Vec::new();
	for word in [0x9504_12de_u32, 0, count, ids_at, strs_at, 0, 0] {
		out.extend_from_slice(&word.to_le_bytes());
	}
	for (len, offset) in table {
		out.extend_from_slice(&len.to_le_bytes());
		out.extend_from_slice(&offset.to_le_bytes());
	}
	out.extend_from_slice(&data);
	out
}

pub fn write_mo(path: &Path, entries: &[Entry<'_>]) {
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap();
	}
	std::fs::write(path, mo_bytes(entries)).unwrap();
}
