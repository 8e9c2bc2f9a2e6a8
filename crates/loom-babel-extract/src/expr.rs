// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Finds gettext calls inside a template expression.
//!
//! Expressions are Python. Only as much of the language is tokenized as is
//! needed to locate `name(...)` calls, split their arguments and decode
//! string literals.

use crate::error::ExtractError;

/// One call to a gettext function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call<'a> {
	pub function: &'a str,
	/// Each argument's string value, or `None` when it is not a plain string.
	pub arguments: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
	Name(&'a str),
	/// `None` for bytes and f-strings.
	Str(Option<String>),
	Open(char),
	Close(char),
	Comma,
	Dot,
	Star,
	DoubleStar,
	Assign,
	Other,
}

/// Every call in `code` whose callee is a bare name listed in `functions`,
/// outer calls before the calls nested in their arguments.
pub fn find_calls<'a>(
	code: &'a str,
	line: usize,
	functions: &[String],
) -> Result<Vec<Call<'a>>, ExtractError> {
	let tokens = Lexer::new(code, line).lex()?;
	check_brackets(&tokens, line)?;

	let mut calls = Vec::new();
	for (index, token) in tokens.iter().enumerate() {
		let Token::Name(name) = token else {
			continue;
		};
		if !functions.iter().any(|f| f == name) {
			continue;
		}
		if tokens.get(index + 1) != Some(&Token::Open('(')) {
			continue;
		}
		if index > 0 && tokens[index - 1] == Token::Dot {
			continue;
		}

		calls.push(Call {
			function: name,
			arguments: arguments(&tokens[index + 2..]),
		});
	}
	Ok(calls)
}

/// Split the tokens after an opening `(` into classified arguments, stopping
/// at the matching `)`.
fn arguments(tokens: &[Token<'_>]) -> Vec<Option<String>> {
	let mut arguments = Vec::new();
	let mut depth = 0usize;
	let mut start = 0;

	for (index, token) in tokens.iter().enumerate() {
		match token {
			Token::Open(_) => depth += 1,
			Token::Close(_) if depth == 0 => {
				push_argument(&mut arguments, &tokens[start..index]);
				break;
			}
			Token::Close(_) => depth -= 1,
			Token::Comma if depth == 0 => {
				push_argument(&mut arguments, &tokens[start..index]);
				start = index + 1;
			}
			_ => {}
		}
	}
	arguments
}

fn push_argument(arguments: &mut Vec<Option<String>>, tokens: &[Token<'_>]) {
	let value = match tokens {
		// Trailing comma.
		[] => return,
		[Token::Star, ..] | [Token::DoubleStar, ..] => None,
		[Token::Name(_), Token::Assign, ..] => None,
		_ => concatenated_string(tokens),
	};
	arguments.push(value);
}

/// Adjacent string literals join into one value; anything else is `None`.
fn concatenated_string(tokens: &[Token<'_>]) -> Option<String> {
	let mut value = String::new();
	for token in tokens {
		match token {
			Token::Str(Some(part)) => value.push_str(part),
			_ => return None,
		}
	}
	Some(value)
}

fn check_brackets(tokens: &[Token<'_>], line: usize) -> Result<(), ExtractError> {
	let mut stack = Vec::new();
	for token in tokens {
		match token {
			Token::Open(open) => stack.push(*open),
			Token::Close(close) => {
				let expected = match close {
					')' => '(',
					']' => '[',
					_ => '{',
				};
				if stack.pop() != Some(expected) {
					return Err(ExtractError::UnbalancedBrackets { line });
				}
			}
			_ => {}
		}
	}
	if stack.is_empty() {
		Ok(())
	} else {
		Err(ExtractError::UnbalancedBrackets { line })
	}
}

struct Lexer<'a> {
	input: &'a str,
	offset: usize,
	/// Template line of the expression, for errors.
	line: usize,
}

impl<'a> Lexer<'a> {
	fn new(input: &'a str, line: usize) -> Self {
		Self {
			input,
			offset: 0,
			line,
		}
	}

	fn lex(&mut self) -> Result<Vec<Token<'a>>, ExtractError> {
		let mut tokens = Vec::new();

		while let Some(ch) = self.peek() {
			match ch {
				c if c.is_whitespace() => self.bump(c),
				'\\' if self.peek_nth(1) == Some('\n') => self.offset += 2,
				'\'' | '"' => tokens.push(self.string(Prefix::default())?),
				c if c.is_alphabetic() || c == '_' => {
					let name = self.consume_while(|c| c.is_alphanumeric() || c == '_');
					match (Prefix::parse(name), self.peek()) {
						(Some(prefix), Some('\'' | '"')) => tokens.push(self.string(prefix)?),
						_ => tokens.push(Token::Name(name)),
					}
				}
				c if c.is_ascii_digit() => {
					self.consume_while(|c| c.is_alphanumeric() || c == '_' || c == '.');
					tokens.push(Token::Other);
				}
				'(' | '[' | '{' => {
					self.bump(ch);
					tokens.push(Token::Open(ch));
				}
				')' | ']' | '}' => {
					self.bump(ch);
					tokens.push(Token::Close(ch));
				}
				',' => {
					self.bump(ch);
					tokens.push(Token::Comma);
				}
				'.' => {
					self.bump(ch);
					tokens.push(Token::Dot);
				}
				'*' => {
					self.bump(ch);
					if self.peek() == Some('*') {
						self.bump('*');
						tokens.push(Token::DoubleStar);
					} else {
						tokens.push(Token::Star);
					}
				}
				'=' => {
					self.bump(ch);
					if self.peek() == Some('=') {
						self.bump('=');
						tokens.push(Token::Other);
					} else {
						tokens.push(Token::Assign);
					}
				}
				_ => {
					// Comparison and augmented operators (`<=`, `!=`, `:=`) are one token.
					self.bump(ch);
					if self.peek() == Some('=') {
						self.bump('=');
					}
					tokens.push(Token::Other);
				}
			}
		}

		Ok(tokens)
	}

	fn string(&mut self, prefix: Prefix) -> Result<Token<'a>, ExtractError> {
		let Some(quote) = self.peek() else {
			return Err(self.unterminated());
		};
		let triple = self.input[self.offset..].starts_with(&quote.to_string().repeat(3));
		let quote_len = if triple { 3 } else { 1 };
		self.offset += quote_len;

		let mut value = String::new();
		loop {
			let Some(ch) = self.peek() else {
				return Err(self.unterminated());
			};

			if ch == quote {
				if !triple {
					self.bump(ch);
					break;
				}
				if self.input[self.offset..].starts_with(&quote.to_string().repeat(3)) {
					self.offset += 3;
					break;
				}
			}

			if ch == '\n' && !triple {
				return Err(self.unterminated());
			}

			self.bump(ch);
			if ch != '\\' {
				value.push(ch);
				continue;
			}

			let Some(escaped) = self.peek() else {
				return Err(self.unterminated());
			};
			self.bump(escaped);
			if prefix.raw {
				value.push('\\');
				value.push(escaped);
			} else {
				self.unescape(escaped, &mut value);
			}
		}

		if prefix.bytes || prefix.format {
			Ok(Token::Str(None))
		} else {
			Ok(Token::Str(Some(value)))
		}
	}

	/// Decode the escape sequence whose first character after `\` is `escaped`.
	fn unescape(&mut self, escaped: char, value: &mut String) {
		let simple = match escaped {
			'\n' => return,
			'\\' => Some('\\'),
			'\'' => Some('\''),
			'"' => Some('"'),
			'a' => Some('\u{07}'),
			'b' => Some('\u{08}'),
			'f' => Some('\u{0c}'),
			'n' => Some('\n'),
			'r' => Some('\r'),
			't' => Some('\t'),
			'v' => Some('\u{0b}'),
			_ => None,
		};
		if let Some(c) = simple {
			value.push(c);
			return;
		}

		let decoded = match escaped {
			'0'..='7' => {
				let rest = self.take_digits(2, 8);
				let digits = format!("{escaped}{rest}");
				u32::from_str_radix(&digits, 8).ok().and_then(char::from_u32)
			}
			'x' => self.hex_escape(2),
			'u' => self.hex_escape(4),
			'U' => self.hex_escape(8),
			_ => None,
		};
		match decoded {
			Some(c) => value.push(c),
			None => {
				value.push('\\');
				value.push(escaped);
			}
		}
	}

	fn hex_escape(&mut self, width: usize) -> Option<char> {
		let digits: String = self.input[self.offset..].chars().take(width).collect();
		if digits.len() < width || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
			return None;
		}
		let code = u32::from_str_radix(&digits, 16).ok()?;
		let c = char::from_u32(code)?;
		self.offset += width;
		Some(c)
	}

	fn take_digits(&mut self, max: usize, radix: u32) -> &'a str {
		let start = self.offset;
		let mut taken = 0;
		while taken < max {
			match self.peek() {
				Some(c) if c.is_digit(radix) => {
					self.bump(c);
					taken += 1;
				}
				_ => break,
			}
		}
		let input = self.input;
		&input[start..self.offset]
	}

	fn unterminated(&self) -> ExtractError {
		ExtractError::UnterminatedString { line: self.line }
	}

	fn peek(&self) -> Option<char> {
		self.input[self.offset..].chars().next()
	}

	fn peek_nth(&self, n: usize) -> Option<char> {
		self.input[self.offset..].chars().nth(n)
	}

	fn bump(&mut self, ch: char) {
		self.offset += ch.len_utf8();
	}

	fn consume_while(&mut self, condition: impl Fn(char) -> bool) -> &'a str {
		let start = self.offset;
		while let Some(ch) = self.peek() {
			if !condition(ch) {
				break;
			}
			self.bump(ch);
		}
		let input = self.input;
		&input[start..self.offset]
	}
}

/// String literal prefix flags (`r`, `u`, `b`, `f` and their pairs).
#[derive(Debug, Default, Clone, Copy)]
struct Prefix {
	raw: bool,
	bytes: bool,
	format: bool,
}

impl Prefix {
	fn parse(name: &str) -> Option<Self> {
		if name.is_empty() || name.len() > 2 {
			return None;
		}
		let mut prefix = Prefix::default();
		let mut unicode = false;
		for c in name.chars() {
			let flag = match c.to_ascii_lowercase() {
				'r' => &mut prefix.raw,
				'b' => &mut prefix.bytes,
				'f' => &mut prefix.format,
				'u' => &mut unicode,
				_ => return None,
			};
			if *flag {
				return None;
			}
			*flag = true;
		}
		let kinds = [prefix.bytes, prefix.format, unicode]
			.iter()
			.filter(|&&set| set)
			.count();
		if kinds > 1 || (unicode && prefix.raw) {
			return None;
		}
		Some(prefix)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn defaults() -> Vec<String> {
		["_", "_N", "gettext", "ngettext"]
			.iter()
			.map(|s| s.to_string())
			.collect()
	}

	fn calls(code: &str) -> Vec<(String, Vec<Option<String>>)> {
		find_calls(code, 1, &defaults())
			.unwrap()
			.into_iter()
			.map(|call| (call.function.to_string(), call.arguments))
			.collect()
	}

	fn s(text: &str) -> Option<String> {
		Some(text.to_string())
	}

	#[test]
	fn test_single_string() {
		assert_eq!(calls(r#"_("Test String")"#), vec![("_".into(), vec![s("Test String")])]);
	}

	#[test]
	fn test_plural_with_variable() {
		assert_eq!(
			calls(r#"_N("%(num)d apple", "%(num)d apples", count)"#),
			vec![(
				"_N".into(),
				vec![s("%(num)d apple"), s("%(num)d apples"), None]
			)]
		);
	}

	#[test]
	fn test_non_string_arguments() {
		assert_eq!(
			calls(r#"gettext(msg, *args, flag=True, **kwargs)"#),
			vec![("gettext".into(), vec![None, None, None, None])]
		);
		assert_eq!(calls("_(1 + 2)"), vec![("_".into(), vec![None])]);
		assert_eq!(calls(r#"_("a" + b)"#), vec![("_".into(), vec![None])]);
	}

	#[test]
	fn test_keyword_detection_ignores_comparisons() {
		assert_eq!(calls("_(a == b)"), vec![("_".into(), vec![None])]);
		assert_eq!(calls("_(a <= b, c=1)"), vec![("_".into(), vec![None, None])]);
	}

	#[test]
	fn test_attribute_and_unknown_calls_ignored() {
		assert!(calls(r#"locale.translate("Hello")"#).is_empty());
		assert!(calls(r#"handler._("Hello")"#).is_empty());
		assert!(calls(r#"escape("Hello")"#).is_empty());
		assert!(calls("_").is_empty());
	}

	#[test]
	fn test_nested_calls_outer_first() {
		assert_eq!(
			calls(r#"_("Hello %s") % escape(_("World"))"#),
			vec![
				("_".into(), vec![s("Hello %s")]),
				("_".into(), vec![s("World")]),
			]
		);
		assert_eq!(
			calls(r#"ngettext(_("one"), "many", n)"#),
			vec![
				("ngettext".into(), vec![None, s("many"), None]),
				("_".into(), vec![s("one")]),
			]
		);
	}

	#[test]
	fn test_string_forms() {
		assert_eq!(calls(r#"_('single')"#)[0].1, vec![s("single")]);
		assert_eq!(calls(r#"_(u"unicode")"#)[0].1, vec![s("unicode")]);
		assert_eq!(calls(r#"_("""tri"ple""")"#)[0].1, vec![s("tri\"ple")]);
		assert_eq!(calls("_('''a\nb''')")[0].1, vec![s("a\nb")]);
		assert_eq!(calls(r#"_("implicit " 'concat')"#)[0].1, vec![s("implicit concat")]);
		assert_eq!(calls(r#"_(b"bytes")"#)[0].1, vec![None]);
		assert_eq!(calls(r#"_(f"{x}")"#)[0].1, vec![None]);
	}

	#[test]
	fn test_escapes() {
		assert_eq!(calls(r#"_("tab\there")"#)[0].1, vec![s("tab\there")]);
		assert_eq!(calls(r#"_("quote \" inside")"#)[0].1, vec![s("quote \" inside")]);
		assert_eq!(calls(r#"_("caf\xe9 é \101")"#)[0].1, vec![s("café é A")]);
		assert_eq!(calls(r#"_("keep \q")"#)[0].1, vec![s("keep \\q")]);
		assert_eq!(calls(r#"_(r"raw\n")"#)[0].1, vec![s("raw\\n")]);
		assert_eq!(calls(r#"_(r"raw \" quote")"#)[0].1, vec![s("raw \\\" quote")]);
	}

	#[test]
	fn test_trailing_comma_and_empty_call() {
		assert_eq!(calls(r#"_("a",)"#)[0].1, vec![s("a")]);
		assert_eq!(calls("_()")[0].1, Vec::<Option<String>>::new());
	}

	#[test]
	fn test_prefix_names_are_still_names() {
		assert_eq!(calls(r#"_(rb)"#)[0].1, vec![None]);
		assert_eq!(calls(r#"_(u + "x")"#)[0].1, vec![None]);
	}

	#[test]
	fn test_unterminated_string() {
		let err = find_calls(r#"_("oops)"#, 7, &defaults()).unwrap_err();
		assert!(matches!(err, ExtractError::UnterminatedString { line: 7 }));
		let err = find_calls("_('a\nb')", 2, &defaults()).unwrap_err();
		assert!(matches!(err, ExtractError::UnterminatedString { line: 2 }));
	}

	#[test]
	fn test_unbalanced_brackets() {
		for code in [r#"_("a""#, "_(a]", "f(a))"] {
			assert!(matches!(
				find_calls(code, 1, &defaults()),
				Err(ExtractError::UnbalancedBrackets { .. })
			));
		}
	}

	#[test]
	fn test_custom_functions() {
		let functions = vec!["tr".to_string()];
		let found = find_calls(r#"tr("x") + _("y")"#, 1, &functions).unwrap();
		assert_eq!(found.len(), 1);
		assert_eq!(found[0].function, "tr");
	}

	#[test]
	fn test_prefix_parse() {
		assert!(Prefix::parse("rb").is_some());
		assert!(Prefix::parse("Rb").is_some());
		assert!(Prefix::parse("fR").is_some());
		assert!(Prefix::parse("ur").is_none());
		assert!(Prefix::parse("bf").is_none());
		assert!(Prefix::parse("rr").is_none());
		assert!(Prefix::parse("x").is_none());
	}
}
