// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Translatable message extraction for Tornado-style templates.
//!
//! Walks `{{ ... }}` and `{% raw ... %}` expressions, finds calls to gettext
//! functions (`_`, `_N`, `gettext`, `ngettext` by default) and reports each
//! call's line, function name and string arguments, ready to be written to a
//! message template.
//!
//! # Example
//!
//! ```
//! use loom_babel_extract::{extract, MessageArgs};
//!
//! let messages = extract("\n{{ _N(\"%(num)d apple\", \"%(num)d apples\", count) }}").unwrap();
//! assert_eq!(messages[0].line, 2);
//! assert_eq!(messages[0].function, "_N");
//! assert_eq!(
//! 	messages[0].message,
//! 	MessageArgs::Tuple(vec![
//! 		Some("%(num)d apple".to_string()),
//! 		Some("%(num)d apples".to_string()),
//! 		None,
//! 	])
//! );
//! ```

mod error;
mod expr;
mod template;

use std::io::Read;
use std::path::Path;

use serde::Serialize;
use tracing::{debug, trace};

pub use error::ExtractError;

/// Function names recognized when none are configured.
pub const DEFAULT_FUNCTIONS: &[&str] = &["_", "_N", "gettext", "ngettext"];

/// The arguments of one gettext call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MessageArgs {
	/// A call with exactly one argument.
	Single(Option<String>),
	/// Any other arity, in argument order.
	Tuple(Vec<Option<String>>),
}

impl MessageArgs {
	fn from_arguments(mut arguments: Vec<Option<String>>) -> Self {
		if arguments.len() == 1 {
			MessageArgs::Single(arguments.remove(0))
		} else {
			MessageArgs::Tuple(arguments)
		}
	}

	/// The first argument, when it is a string.
	pub fn msgid(&self) -> Option<&str> {
		match self {
			MessageArgs::Single(value) => value.as_deref(),
			MessageArgs::Tuple(values) => values.first().and_then(|v| v.as_deref()),
		}
	}
}

/// One translatable call found in a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedMessage {
	/// 1-based line of the tag containing the call.
	pub line: usize,
	pub function: String,
	pub message: MessageArgs,
	/// Translator comments attached to this call.
	pub comments: Vec<String>,
}

/// Configurable message extractor.
#[derive(Debug, Clone)]
pub struct Extractor {
	functions: Vec<String>,
	comment_tags: Vec<String>,
}

impl Default for Extractor {
	fn default() -> Self {
		Self {
			functions: DEFAULT_FUNCTIONS.iter().map(|f| f.to_string()).collect(),
			comment_tags: Vec::new(),
		}
	}
}

impl Extractor {
	pub fn new() -> Self {
		Self::default()
	}

	/// Replace the recognized function names.
	pub fn with_functions<I, S>(mut self, functions: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.functions = functions.into_iter().map(Into::into).collect();
		self
	}

	/// Collect `{# TAG ... #}` comments that start with one of `tags`.
	pub fn with_comment_tags<I, S>(mut self, tags: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.comment_tags = tags.into_iter().map(Into::into).collect();
		self
	}

	pub fn functions(&self) -> &[String] {
		&self.functions
	}

	pub fn comment_tags(&self) -> &[String] {
		&self.comment_tags
	}

	/// Extract messages from template source.
	///
	/// A tagged comment attaches to the calls of the next expression when
	/// that expression starts on the comment's last line or the line after.
	/// Consecutive tagged comments accumulate.
	pub fn extract_str(&self, source: &str) -> Result<Vec<ExtractedMessage>, ExtractError> {
		let mut messages = Vec::new();
		let mut pending: Vec<String> = Vec::new();
		let mut pending_end = 0;

		for node in template::parse(source)? {
			match node {
				template::Node::Comment {
					line,
					end_line,
					text,
				} => {
					if !self.is_tagged(text) {
						continue;
					}
					if line > pending_end + 1 {
						pending.clear();
					}
					pending.push(text.to_string());
					pending_end = end_line;
				}
				template::Node::Expression { line, code } => {
					let comments = if !pending.is_empty() && line <= pending_end + 1 {
						std::mem::take(&mut pending)
					} else {
						pending.clear();
						Vec::new()
					};

					for call in expr::find_calls(code, line, &self.functions)? {
						trace!(line, function = call.function, "found gettext call");
						messages.push(ExtractedMessage {
							line,
							function: call.function.to_string(),
							message: MessageArgs::from_arguments(call.arguments),
							comments: comments.clone(),
						});
					}
				}
			}
		}

		debug!(count = messages.len(), "extracted messages");
		Ok(messages)
	}

	pub fn extract_reader(&self, mut reader: impl Read) -> Result<Vec<ExtractedMessage>, ExtractError> {
		let mut source = String::new();
		reader.read_to_string(&mut source)?;
		self.extract_str(&source)
	}

	pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Vec<ExtractedMessage>, ExtractError> {
		let path = path.as_ref();
		let source = std::fs::read_to_string(path).map_err(|e| ExtractError::ReadFile {
			path: path.to_path_buf(),
			source: e,
		})?;
		debug!(path = %path.display(), "extracting messages");
		self.extract_str(&source)
	}

	fn is_tagged(&self, text: &str) -> bool {
		self.comment_tags
			.iter()
			.any(|tag| text.starts_with(tag.as_str()))
	}
}

/// Extract messages with the default function names and no comment tags.
pub fn extract(source: &str) -> Result<Vec<ExtractedMessage>, ExtractError> {
	Extractor::default().extract_str(source)
}
