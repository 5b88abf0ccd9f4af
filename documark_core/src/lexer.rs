use std::fmt::Display;
use std::ops::Range;

use logos::Logos;

use crate::DocumarkError;
use crate::DocumarkResult;
use crate::position::Span;

/// The keyword shared by every accepted marker spelling.
pub const MARKER_KEYWORD: &str = "documentary";

/// Raw tokens produced by logos for flat tokenization of a comment's inner
/// text. Only the characters that can take part in a marker are tokenized;
/// everything else surfaces as a lexing error and is skipped by the walker.
#[derive(Logos, Debug, PartialEq)]
enum RawToken {
	#[token("{")]
	BraceOpen,
	#[token("}")]
	BraceClose,
	#[token("@")]
	At,
	#[token(":")]
	Colon,
	#[token("*")]
	Star,
	#[token("\n")]
	Newline,
	#[regex(r"[ \t\r]+")]
	Whitespace,
	#[regex(r"[a-zA-Z_][a-zA-Z0-9_]*")]
	Ident,
}

/// Which of the accepted marker spellings matched.
///
/// All variants reduce to the same [`MarkerReference`] shape and resolve
/// identically; the variant is recorded for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MarkerSyntax {
	/// `{documentary:name}`
	Brace,
	/// `{@documentary:name}`
	AtBrace,
	/// `@documentary name` on its own comment line.
	AnnotationLine,
}

impl Display for MarkerSyntax {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Brace => write!(f, "{{{MARKER_KEYWORD}:…}}"),
			Self::AtBrace => write!(f, "{{@{MARKER_KEYWORD}:…}}"),
			Self::AnnotationLine => write!(f, "@{MARKER_KEYWORD} …"),
		}
	}
}

/// A recognized template reference extracted from a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerReference {
	/// The referenced template name. Case-sensitive.
	pub name: String,
	/// Optional selector modifier. Carried for diagnostics; resolution
	/// ignores it.
	pub selector: Option<String>,
	/// The spelling that matched.
	pub syntax: MarkerSyntax,
	/// Span of the marker token run, in the coordinates `scan_markers` was
	/// given (or file coordinates after [`extract`]).
	pub span: Span,
}

/// Extract the marker of one comment, if any.
///
/// `inner` is the comment's text between the delimiters and `base` its byte
/// offset in the file; returned spans and error offsets are in file
/// coordinates. Zero markers is a pass-through, one marker is a reference,
/// and two or more markers make the comment ambiguous.
pub fn extract(inner: &str, base: usize) -> DocumarkResult<Option<MarkerReference>> {
	let mut markers = scan_markers(inner);

	match markers.len() {
		0 => Ok(None),
		1 => {
			let mut marker = markers.remove(0);
			marker.span = marker.span.offset_by(base);
			Ok(Some(marker))
		}
		// The ambiguity belongs to the comment as a whole, so report its
		// offset rather than either marker's.
		_ => Err(DocumarkError::AmbiguousMarker { offset: base }),
	}
}

/// Find every marker occurrence in `text`, in source order, with spans
/// relative to `text`. Shared by [`extract`] and by nested template-body
/// expansion in the resolver.
pub fn scan_markers(text: &str) -> Vec<MarkerReference> {
	MarkerWalker::new(text).walk()
}

/// Walks the logos token stream, recognizing markers with one-token-run
/// lookahead and falling back to a plain cursor advance when a candidate
/// fails to parse.
struct MarkerWalker<'a> {
	text: &'a str,
	raw_tokens: Vec<(Result<RawToken, ()>, Range<usize>)>,
	cursor: usize,
	/// Whether only whitespace and `*` decoration precede the cursor on the
	/// current line. Annotation-line markers must start on a fresh line.
	line_fresh: bool,
	markers: Vec<MarkerReference>,
}

impl<'a> MarkerWalker<'a> {
	fn new(text: &'a str) -> Self {
		Self {
			text,
			raw_tokens: RawToken::lexer(text).spanned().collect(),
			cursor: 0,
			line_fresh: true,
			markers: vec![],
		}
	}

	fn walk(mut self) -> Vec<MarkerReference> {
		while self.cursor < self.raw_tokens.len() {
			match &self.raw_tokens[self.cursor] {
				(Ok(RawToken::BraceOpen), span) => {
					let start = span.start;
					if let Some(marker) = self.try_brace_marker(start) {
						self.markers.push(marker);
					} else {
						self.cursor += 1;
					}
					self.line_fresh = false;
				}
				(Ok(RawToken::At), span) => {
					let start = span.start;
					if self.line_fresh
						&& let Some(marker) = self.try_annotation_marker(start)
					{
						self.markers.push(marker);
					} else {
						self.cursor += 1;
					}
					self.line_fresh = false;
				}
				(Ok(RawToken::Newline), _) => {
					self.line_fresh = true;
					self.cursor += 1;
				}
				(Ok(RawToken::Whitespace | RawToken::Star), _) => {
					self.cursor += 1;
				}
				_ => {
					self.line_fresh = false;
					self.cursor += 1;
				}
			}
		}

		self.markers
	}

	/// Slice of the token at `index`, if any.
	fn token_at(&self, index: usize) -> Option<(&RawToken, &Range<usize>)> {
		match self.raw_tokens.get(index) {
			Some((Ok(token), span)) => Some((token, span)),
			_ => None,
		}
	}

	/// Advance `index` past a single run of inline whitespace.
	fn skip_ws(&self, mut index: usize) -> usize {
		while matches!(self.token_at(index), Some((RawToken::Whitespace, _))) {
			index += 1;
		}
		index
	}

	/// Attempt `{documentary:name}` / `{@documentary:name}` (with an optional
	/// `:selector` segment) starting at the current `{`. Whitespace inside
	/// the braces is trimmed and ignored. On success the cursor moves past
	/// the closing brace; on failure the cursor is left untouched.
	fn try_brace_marker(&mut self, start: usize) -> Option<MarkerReference> {
		let mut index = self.skip_ws(self.cursor + 1);

		let at_prefixed = matches!(self.token_at(index), Some((RawToken::At, _)));
		if at_prefixed {
			index = self.skip_ws(index + 1);
		}

		let (RawToken::Ident, keyword_span) = self.token_at(index)? else {
			return None;
		};
		if &self.text[keyword_span.clone()] != MARKER_KEYWORD {
			return None;
		}
		index = self.skip_ws(index + 1);

		let (RawToken::Colon, _) = self.token_at(index)? else {
			return None;
		};
		index = self.skip_ws(index + 1);

		let (RawToken::Ident, name_span) = self.token_at(index)? else {
			return None;
		};
		let name = self.text[name_span.clone()].to_string();
		index = self.skip_ws(index + 1);

		let mut selector = None;
		if matches!(self.token_at(index), Some((RawToken::Colon, _))) {
			index = self.skip_ws(index + 1);
			let (RawToken::Ident, selector_span) = self.token_at(index)? else {
				return None;
			};
			selector = Some(self.text[selector_span.clone()].to_string());
			index = self.skip_ws(index + 1);
		}

		let (RawToken::BraceClose, close_span) = self.token_at(index)? else {
			return None;
		};
		let end = close_span.end;
		self.cursor = index + 1;

		Some(MarkerReference {
			name,
			selector,
			syntax: if at_prefixed {
				MarkerSyntax::AtBrace
			} else {
				MarkerSyntax::Brace
			},
			span: Span::new(start, end),
		})
	}

	/// Attempt `@documentary name [selector]` starting at the current `@`.
	/// The marker must exhaust its line apart from trailing whitespace.
	fn try_annotation_marker(&mut self, start: usize) -> Option<MarkerReference> {
		let mut index = self.cursor + 1;

		let (RawToken::Ident, keyword_span) = self.token_at(index)? else {
			return None;
		};
		if &self.text[keyword_span.clone()] != MARKER_KEYWORD {
			return None;
		}

		index += 1;
		let (RawToken::Whitespace, _) = self.token_at(index)? else {
			return None;
		};
		index += 1;

		let (RawToken::Ident, name_span) = self.token_at(index)? else {
			return None;
		};
		let name = self.text[name_span.clone()].to_string();
		let mut end = name_span.end;
		index += 1;

		let mut selector = None;
		let after_name = self.skip_ws(index);
		if after_name > index
			&& let Some((RawToken::Ident, selector_span)) = self.token_at(after_name)
		{
			selector = Some(self.text[selector_span.clone()].to_string());
			end = selector_span.end;
			index = after_name + 1;
		}

		// Anything further on the line other than whitespace disqualifies
		// the annotation.
		index = self.skip_ws(index);
		match self.token_at(index) {
			None | Some((RawToken::Newline, _)) => {}
			Some(_) => return None,
		}
		if index < self.raw_tokens.len() && self.token_at(index).is_none() {
			// Unlexable bytes remain on the line.
			return None;
		}

		self.cursor = index;

		Some(MarkerReference {
			name,
			selector,
			syntax: MarkerSyntax::AnnotationLine,
			span: Span::new(start, end),
		})
	}
}
