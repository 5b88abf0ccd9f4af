use serde::Deserialize;
use serde::Serialize;

/// A half-open byte range into a source file's original text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
	/// Byte offset of the first byte in the span.
	pub start: usize,
	/// Byte offset one past the last byte in the span.
	pub end: usize,
}

impl Span {
	pub fn new(start: usize, end: usize) -> Self {
		Self { start, end }
	}

	pub fn len(&self) -> usize {
		self.end.saturating_sub(self.start)
	}

	pub fn is_empty(&self) -> bool {
		self.end <= self.start
	}

	/// Shift both ends of the span by `base` bytes. Used to lift spans
	/// measured inside a comment's inner text back into file coordinates.
	pub fn offset_by(&self, base: usize) -> Self {
		Self {
			start: self.start + base,
			end: self.end + base,
		}
	}
}

/// A 1-indexed line/column location together with its byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
	pub line: usize,
	pub column: usize,
	pub offset: usize,
}

impl Point {
	pub fn new(line: usize, column: usize, offset: usize) -> Self {
		Self {
			line,
			column,
			offset,
		}
	}
}

/// Pre-computed table of line-start byte offsets for efficient offset-to-point
/// conversion. Instead of scanning the entire string for each offset (O(n*m)),
/// we build this table once (O(n)) and use binary search (O(log n)) per lookup.
#[derive(Debug)]
pub struct LineTable {
	/// Byte offsets of the start of each line. `line_starts[0]` is always 0.
	line_starts: Vec<usize>,
}

impl LineTable {
	pub fn new(content: &str) -> Self {
		let mut line_starts = vec![0];
		for (i, byte) in content.bytes().enumerate() {
			if byte == b'\n' {
				line_starts.push(i + 1);
			}
		}
		Self { line_starts }
	}

	/// Convert a byte offset to a [`Point`] (1-indexed line/column). Uses
	/// binary search over the pre-computed line table.
	pub fn point_at(&self, offset: usize) -> Point {
		let line_idx = match self.line_starts.binary_search(&offset) {
			Ok(exact) => exact,
			Err(insert) => insert.saturating_sub(1),
		};

		Point {
			line: line_idx + 1,
			column: offset - self.line_starts[line_idx] + 1,
			offset,
		}
	}
}
