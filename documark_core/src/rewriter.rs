use crate::DocumarkError;
use crate::DocumarkResult;
use crate::position::Span;

/// One planned replacement against the original text's coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
	/// The span of original text to replace.
	pub span: Span,
	/// The text to substitute for the span.
	pub replacement: String,
}

/// Apply a set of edits to the original text in one left-to-right splice
/// pass, copying every untouched span verbatim.
///
/// Edits must be sorted ascending by start offset and must not overlap. The
/// locator guarantees disjoint comment spans, so a violation here is an
/// internal bug rather than a user error.
pub fn apply(source: &str, edits: &[Edit]) -> DocumarkResult<String> {
	let mut previous_end = 0;
	for (index, edit) in edits.iter().enumerate() {
		if edit.span.start < previous_end || edit.span.end < edit.span.start {
			return Err(DocumarkError::OverlappingEdits { index });
		}
		if edit.span.end > source.len() {
			return Err(DocumarkError::OverlappingEdits { index });
		}
		previous_end = edit.span.end;
	}

	let extra: usize = edits.iter().map(|edit| edit.replacement.len()).sum();
	let mut result = String::with_capacity(source.len() + extra);
	let mut copied_until = 0;

	for edit in edits {
		result.push_str(&source[copied_until..edit.span.start]);
		result.push_str(&edit.replacement);
		copied_until = edit.span.end;
	}

	result.push_str(&source[copied_until..]);
	Ok(result)
}
