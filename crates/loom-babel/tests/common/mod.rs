// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Shared fixtures: a compiled translation tree in a temp directory.

#![allow(dead_code)]

mod mo;

use tempfile::TempDir;

pub use mo::{mo_bytes, write_mo};

/// `fr_FR` and `es_ES` with a `messages` and an `addit` domain.
pub fn translations() -> TempDir {
	let dir = TempDir::new().unwrap();
	let root = dir.path();
	write_mo(
		&root.join("fr_FR/messages.mo"),
		&[
			("Welcome", "bienvenu"),
			("%(num)d apple\0%(num)d apples", "%(num)d pomme\0%(num)d pommes"),
		],
	);
	write_mo(
		&root.join("es_ES/messages.mo"),
		&[
			("Welcome", "bienvenido"),
			("%(num)d apple\0%(num)d apples", "%(num)d manzana\0%(num)d manzanas"),
		],
	);
	write_mo(&root.join("fr_FR/addit.mo"), &[("Goodbye", "Au revoir")]);
	write_mo(&root.join("es_ES/addit.mo"), &[("Goodbye", "Adios")]);
	dir
}
