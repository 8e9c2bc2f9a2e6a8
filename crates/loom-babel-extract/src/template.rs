// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Splits template source into the tags extraction cares about.

use crate::error::ExtractError;

/// A tag that can carry translatable text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<'a> {
	/// `{{ code }}` or `{% raw code %}`.
	Expression { line: usize, code: &'a str },
	/// `{# text #}`, trimmed.
	Comment {
		line: usize,
		end_line: usize,
		text: &'a str,
	},
}

/// Parse `source` into expression and comment nodes, in source order.
///
/// Text and control statements (`{% if %}`, `{% block %}`, ...) are skipped.
/// `{{!`, `{%!` and `{#!` are literal text. Lines are 1-based and refer to
/// where each tag opens.
pub fn parse(source: &str) -> Result<Vec<Node<'_>>, ExtractError> {
	let bytes = source.as_bytes();
	let mut nodes = Vec::new();
	let mut pos = 0;
	let mut line = 1;

	while let Some(offset) = source[pos..].find('{') {
		let start = pos + offset;
		line += count_lines(&source[pos..start]);
		pos = start + 1;

		let close = match bytes.get(start + 1) {
			Some(b'{') => "}}",
			Some(b'%') => "%}",
			Some(b'#') => "#}",
			_ => continue,
		};

		// In runs like `{{{`, the innermost pair opens the tag.
		if close == "}}" && bytes.get(start + 2) == Some(&b'{') {
			continue;
		}

		if bytes.get(start + 2) == Some(&b'!') {
			pos = start + 3;
			continue;
		}

		let body_start = start + 2;
		let Some(length) = source[body_start..].find(close) else {
			return Err(ExtractError::UnclosedTag { line, close });
		};
		let body = &source[body_start..body_start + length];
		let tag_line = line;
		line += count_lines(body);
		pos = body_start + length + close.len();

		match close {
			"}}" => nodes.push(expression(body, tag_line)?),
			"#}" => nodes.push(Node::Comment {
				line: tag_line,
				end_line: line,
				text: body.trim(),
			}),
			_ => {
				if let Some(node) = statement(body, tag_line)? {
					nodes.push(node);
				}
			}
		}
	}

	Ok(nodes)
}

fn expression(body: &str, line: usize) -> Result<Node<'_>, ExtractError> {
	let code = body.trim();
	if code.is_empty() {
		return Err(ExtractError::EmptyTag { line });
	}
	Ok(Node::Expression { line, code })
}

fn statement(body: &str, line: usize) -> Result<Option<Node<'_>>, ExtractError> {
	let body = body.trim();
	if body.is_empty() {
		return Err(ExtractError::EmptyTag { line });
	}

	let (keyword, rest) = body.split_once(char::is_whitespace).unwrap_or((body, ""));
	if keyword == "raw" {
		return expression(rest, line).map(Some);
	}
	Ok(None)
}

fn count_lines(text: &str) -> usize {
	text.bytes().filter(|&b| b == b'\n').count()
}
