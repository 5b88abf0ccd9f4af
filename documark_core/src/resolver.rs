use std::collections::HashSet;

use crate::DocumarkError;
use crate::DocumarkResult;
use crate::lexer::MARKER_KEYWORD;
use crate::lexer::MarkerReference;
use crate::lexer::scan_markers;
use crate::registry::TemplateRegistry;

/// Maximum depth of transitive template composition. Cycles are caught by the
/// visited-name set regardless of this bound; the bound only stops
/// pathologically deep acyclic chains.
pub const MAX_RESOLUTION_DEPTH: usize = 8;

/// Options controlling how resolved comments are rendered.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
	/// Keep the `{@documentary:name}` marker as the first line of the
	/// rendered comment so the expansion stays re-resolvable in place.
	/// Re-running the engine over such output is still a fixed point.
	pub keep_marker: bool,
}

/// Resolve a marker to its fully expanded template body.
///
/// Nested references in template bodies are expanded in place against the
/// same registry. All cycles — direct, indirect, or mutual — are detected via
/// the visited-name set threaded through the recursion and fail with
/// [`DocumarkError::TemplateRecursion`], as does exceeding
/// [`MAX_RESOLUTION_DEPTH`].
pub fn resolve(marker: &MarkerReference, registry: &TemplateRegistry) -> DocumarkResult<String> {
	let template = registry.get(&marker.name).ok_or_else(|| {
		DocumarkError::UnknownTemplate {
			name: marker.name.clone(),
			offset: marker.span.start,
		}
	})?;

	let mut visited = HashSet::from([marker.name.clone()]);
	expand_body(&template.body, registry, &mut visited, 1)
}

/// Expand every nested marker occurrence inside a template body, splicing the
/// expansions at the markers' spans. `visited` holds the names along the
/// current resolution path.
fn expand_body(
	body: &str,
	registry: &TemplateRegistry,
	visited: &mut HashSet<String>,
	depth: usize,
) -> DocumarkResult<String> {
	let markers = scan_markers(body);

	if markers.is_empty() {
		return Ok(body.to_string());
	}

	if depth >= MAX_RESOLUTION_DEPTH {
		return Err(DocumarkError::TemplateRecursion {
			name: markers[0].name.clone(),
		});
	}

	let mut result = String::with_capacity(body.len());
	let mut copied_until = 0;

	for marker in markers {
		result.push_str(&body[copied_until..marker.span.start]);

		if !visited.insert(marker.name.clone()) {
			return Err(DocumarkError::TemplateRecursion { name: marker.name });
		}

		let template = registry.get(&marker.name).ok_or_else(|| {
			DocumarkError::UnknownTemplate {
				name: marker.name.clone(),
				offset: marker.span.start,
			}
		})?;

		let expanded = expand_body(&template.body, registry, visited, depth + 1)?;
		result.push_str(&expanded);

		visited.remove(&marker.name);
		copied_until = marker.span.end;
	}

	result.push_str(&body[copied_until..]);
	Ok(result)
}

/// Render a resolved body as a complete doc comment, replacing the original
/// comment delimiters and all. Single-line bodies stay on one line;
/// multi-line bodies become a block whose continuation lines carry the
/// original comment's indentation plus ` * `.
pub fn render_comment(
	body: &str,
	marker_name: &str,
	indent: &str,
	options: &RenderOptions,
) -> String {
	let body = body.trim();

	let mut lines: Vec<&str> = Vec::new();
	let marker_line;
	if options.keep_marker {
		marker_line = format!("{{@{MARKER_KEYWORD}:{marker_name}}}");
		lines.push(&marker_line);
	}
	lines.extend(body.lines());

	match lines.as_slice() {
		[] => "/** */".to_string(),
		[single] => format!("/** {single} */"),
		many => {
			let mut rendered = String::from("/**\n");
			for line in many {
				let prefixed = format!("{indent} * {line}");
				rendered.push_str(prefixed.trim_end());
				rendered.push('\n');
			}
			rendered.push_str(indent);
			rendered.push_str(" */");
			rendered
		}
	}
}
