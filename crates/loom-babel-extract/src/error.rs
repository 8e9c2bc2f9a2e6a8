// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
	#[error("line {line}: missing '{close}' to end tag")]
	UnclosedTag { line: usize, close: &'static str },

	#[error("line {line}: empty tag")]
	EmptyTag { line: usize },

	#[error("line {line}: unterminated string literal")]
	UnterminatedString { line: usize },

	#[error("line {line}: unbalanced brackets in expression")]
	UnbalancedBrackets { line: usize },

	#[error("failed to read template: {0}")]
	Read(#[from] std::io::Error),

	#[error("failed to read template {path}: {source}")]
	ReadFile {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
}

impl ExtractError {
	/// Template line the error was found on, when it came from parsing.
	pub fn line(&self) -> Option<usize> {
		match self {
			ExtractError::UnclosedTag { line, .. }
			| ExtractError::EmptyTag { line }
			| ExtractError::UnterminatedString { line }
			| ExtractError::UnbalancedBrackets { line } => Some(*line),
			ExtractError::Read(_) | ExtractError::ReadFile { .. } => None,
		}
	}
}
