use crate::DocumarkError;
use crate::DocumarkResult;
use crate::position::Span;

/// A doc comment attached to the declaration that follows it.
///
/// Comments are referenced purely by byte offsets into the original source
/// text, never by live pointers, so computing edits for earlier comments can
/// never invalidate later ones within the same scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
	/// Span of the whole comment, `/**` and `*/` delimiters included.
	pub span: Span,
	/// Span of the text between the delimiters.
	pub inner: Span,
	/// The content of the line preceding the opener, normalized to
	/// whitespace. Used to re-indent continuation lines of the rendered
	/// replacement.
	pub indent: String,
}

impl Comment {
	/// The raw text between `/**` and `*/`.
	pub fn inner_text<'s>(&self, source: &'s str) -> &'s str {
		&source[self.inner.start..self.inner.end]
	}
}

const DOC_OPEN: &[u8] = b"/**";
const COMMENT_CLOSE: &[u8] = b"*/";

/// Scan source text for doc comments attached to declarations.
///
/// The scan is lazy and restartable: it holds no state beyond its cursor, so
/// scanning the same text twice always yields the same sequence, in ascending
/// start-offset order. An unterminated opener yields one error and ends the
/// sequence — partial matches are never reported.
pub fn scan(source: &str) -> CommentScan<'_> {
	CommentScan {
		source,
		cursor: 0,
		failed: false,
	}
}

/// Iterator over the attached doc comments of one source text.
#[derive(Debug)]
pub struct CommentScan<'a> {
	source: &'a str,
	cursor: usize,
	failed: bool,
}

impl Iterator for CommentScan<'_> {
	type Item = DocumarkResult<Comment>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.failed {
			return None;
		}

		let bytes = self.source.as_bytes();

		while self.cursor < bytes.len() {
			let Some(found) = memstr(&bytes[self.cursor..], DOC_OPEN) else {
				self.cursor = bytes.len();
				return None;
			};
			let open = self.cursor + found;

			// An opener sitting behind `//` on the same line is inside a line
			// comment, not a doc comment. Skip the rest of that line.
			let line_start = line_start_before(bytes, open);
			let prefix = &self.source[line_start..open];
			if prefix.contains("//") || prefix.contains('#') {
				self.cursor = end_of_line(bytes, open);
				continue;
			}

			let Some(close) = memstr(&bytes[open + 2..], COMMENT_CLOSE) else {
				self.failed = true;
				return Some(Err(DocumarkError::UnterminatedComment { offset: open }));
			};
			let close_start = open + 2 + close;
			let close_end = close_start + COMMENT_CLOSE.len();
			self.cursor = close_end;

			// `/**/` has an overlapping close; the inner text is then empty.
			let inner_start = (open + DOC_OPEN.len()).min(close_start);
			let inner = Span::new(inner_start, close_start.max(inner_start));

			// Only comments immediately followed by a declaration-introducing
			// token qualify. Anything that is not another comment, blank
			// space, or end of file counts as a declaration.
			if !followed_by_declaration(self.source, close_end) {
				continue;
			}

			return Some(Ok(Comment {
				span: Span::new(open, close_end),
				inner,
				indent: normalize_indent(prefix),
			}));
		}

		None
	}
}

/// Check whether the text after `offset`, skipping only whitespace and
/// newlines, begins with a non-comment token run.
fn followed_by_declaration(source: &str, offset: usize) -> bool {
	let rest = source[offset..].trim_start();

	if rest.is_empty() {
		return false;
	}

	!(rest.starts_with("/*") || rest.starts_with("//") || rest.starts_with('#'))
}

/// Byte offset of the start of the line containing `offset`.
fn line_start_before(bytes: &[u8], offset: usize) -> usize {
	bytes[..offset]
		.iter()
		.rposition(|&byte| byte == b'\n')
		.map_or(0, |idx| idx + 1)
}

/// Byte offset just past the end of the line containing `offset`.
fn end_of_line(bytes: &[u8], offset: usize) -> usize {
	bytes[offset..]
		.iter()
		.position(|&byte| byte == b'\n')
		.map_or(bytes.len(), |idx| offset + idx + 1)
}

/// Reduce the line prefix before an opener to pure indentation. A prefix that
/// already is whitespace is kept verbatim (tabs preserved); any other prefix
/// is replaced by spaces of the same width so continuation lines still align.
fn normalize_indent(prefix: &str) -> String {
	if prefix.chars().all(char::is_whitespace) {
		prefix.to_string()
	} else {
		" ".repeat(prefix.chars().count())
	}
}

pub fn memstr(haystack: &[u8], needle: &[u8]) -> Option<usize> {
	haystack
		.windows(needle.len())
		.position(|window| window == needle)
}
