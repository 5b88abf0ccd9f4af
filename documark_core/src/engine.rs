use std::collections::HashMap;
use std::path::PathBuf;

use crate::DocumarkError;
use crate::DocumarkResult;
use crate::lexer;
use crate::locator;
use crate::position::LineTable;
use crate::registry::TemplateRegistry;
use crate::resolver;
use crate::resolver::RenderOptions;
use crate::rewriter;
use crate::rewriter::Edit;

use crate::project::ProjectContext;

/// A doc comment whose marker resolved to a replacement block.
#[derive(Debug)]
pub struct ResolvedComment {
	/// The marker found inside the comment.
	pub marker: lexer::MarkerReference,
	/// The span of the entire original comment, opener through closer.
	pub span: crate::position::Span,
	/// The original comment text.
	pub current: String,
	/// The fully rendered replacement comment.
	pub replacement: String,
}

/// Expand all marker comments in `source`, returning the rewritten text.
///
/// Comments without a marker are left untouched. A source with no markers
/// comes back unchanged. The whole file fails on the first malformed comment
/// or unresolvable marker.
pub fn process(source: &str, registry: &TemplateRegistry) -> DocumarkResult<String> {
	process_with_options(source, registry, &RenderOptions::default())
}

/// Like [`process`], with control over comment rendering.
pub fn process_with_options(
	source: &str,
	registry: &TemplateRegistry,
	options: &RenderOptions,
) -> DocumarkResult<String> {
	let resolved = resolve_comments(source, registry, options)?;
	if resolved.is_empty() {
		return Ok(source.to_string());
	}

	let edits: Vec<Edit> = resolved
		.into_iter()
		.map(|comment| {
			Edit {
				span: comment.span,
				replacement: comment.replacement,
			}
		})
		.collect();

	rewriter::apply(source, &edits)
}

/// Locate, lex, and resolve every marker comment in `source`. Returns the
/// resolved comments in ascending offset order. Comments that carry no marker
/// are skipped.
pub fn resolve_comments(
	source: &str,
	registry: &TemplateRegistry,
	options: &RenderOptions,
) -> DocumarkResult<Vec<ResolvedComment>> {
	let mut resolved = Vec::new();

	for comment in locator::scan(source) {
		let comment = comment?;
		let Some(marker) = lexer::extract(comment.inner_text(source), comment.inner.start)? else {
			continue;
		};

		let body = resolver::resolve(&marker, registry)?;
		let replacement = resolver::render_comment(&body, &marker.name, &comment.indent, options);

		resolved.push(ResolvedComment {
			marker,
			current: source[comment.span.start..comment.span.end].to_string(),
			span: comment.span,
			replacement,
		});
	}

	Ok(resolved)
}

/// Result of checking a project for unexpanded or out-of-date comments.
#[derive(Debug)]
pub struct CheckResult {
	/// Marker comments whose current text differs from the rendered template.
	pub stale: Vec<StaleEntry>,
	/// Files that failed to process. These are collected instead of aborting
	/// so that the check reports all problems at once.
	pub failures: Vec<FileFailure>,
}

impl CheckResult {
	/// Returns true if every comment is up to date and no file failed.
	pub fn is_ok(&self) -> bool {
		self.stale.is_empty() && self.failures.is_empty()
	}

	/// Returns true if any file failed to process.
	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

/// A marker comment that is out of date.
#[derive(Debug)]
pub struct StaleEntry {
	/// Path to the file containing the stale comment.
	pub file: PathBuf,
	/// Name of the template the comment references.
	pub template_name: String,
	/// The current comment text.
	pub current_content: String,
	/// The expected comment text after expansion.
	pub expected_content: String,
	/// 1-indexed line number of the comment opener.
	pub line: usize,
	/// 1-indexed column number of the comment opener.
	pub column: usize,
}

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
	/// Path to the file that failed.
	pub file: PathBuf,
	/// What went wrong.
	pub error: DocumarkError,
}

/// Result of updating a project.
#[derive(Debug)]
pub struct UpdateResult {
	/// Files that were modified and their new content.
	pub updated_files: HashMap<PathBuf, String>,
	/// Number of marker comments that were expanded.
	pub updated_count: usize,
	/// Files that failed to process.
	pub failures: Vec<FileFailure>,
}

/// Check whether every marker comment in the project is up to date.
/// Per-file failures are collected rather than aborting, so the check reports
/// all problems in a single pass.
pub fn check_project(ctx: &ProjectContext) -> DocumarkResult<CheckResult> {
	let mut stale = Vec::new();
	let mut failures = Vec::new();

	for file in &ctx.files {
		let source = match std::fs::read_to_string(file) {
			Ok(source) => source,
			Err(error) => {
				failures.push(FileFailure {
					file: file.clone(),
					error: error.into(),
				});
				continue;
			}
		};
		let resolved = match resolve_comments(&source, &ctx.registry, &ctx.render_options) {
			Ok(resolved) => resolved,
			Err(error) => {
				failures.push(FileFailure {
					file: file.clone(),
					error,
				});
				continue;
			}
		};

		let mut line_table = None;
		for comment in resolved {
			if comment.current == comment.replacement {
				continue;
			}

			let table = line_table.get_or_insert_with(|| LineTable::new(&source));
			let point = table.point_at(comment.span.start);
			stale.push(StaleEntry {
				file: file.clone(),
				template_name: comment.marker.name,
				current_content: comment.current,
				expected_content: comment.replacement,
				line: point.line,
				column: point.column,
			});
		}
	}

	Ok(CheckResult { stale, failures })
}

/// Compute the updated contents for every file with stale marker comments.
/// Files that come back byte-identical are not included in the result.
pub fn compute_updates(ctx: &ProjectContext) -> DocumarkResult<UpdateResult> {
	let mut updated_files = HashMap::new();
	let mut updated_count = 0;
	let mut failures = Vec::new();

	for file in &ctx.files {
		let source = match std::fs::read_to_string(file) {
			Ok(source) => source,
			Err(error) => {
				failures.push(FileFailure {
					file: file.clone(),
					error: error.into(),
				});
				continue;
			}
		};
		let resolved = match resolve_comments(&source, &ctx.registry, &ctx.render_options) {
			Ok(resolved) => resolved,
			Err(error) => {
				failures.push(FileFailure {
					file: file.clone(),
					error,
				});
				continue;
			}
		};

		let changed = resolved
			.iter()
			.filter(|comment| comment.current != comment.replacement)
			.count();
		if changed == 0 {
			continue;
		}

		let edits: Vec<Edit> = resolved
			.into_iter()
			.map(|comment| {
				Edit {
					span: comment.span,
					replacement: comment.replacement,
				}
			})
			.collect();

		match rewriter::apply(&source, &edits) {
			Ok(updated) => {
				updated_count += changed;
				updated_files.insert(file.clone(), updated);
			}
			Err(error) => {
				failures.push(FileFailure {
					file: file.clone(),
					error,
				});
			}
		}
	}

	Ok(UpdateResult {
		updated_files,
		updated_count,
		failures,
	})
}

/// Write the updated contents back to disk.
pub fn write_updates(updates: &UpdateResult) -> DocumarkResult<()> {
	for (path, content) in &updates.updated_files {
		std::fs::write(path, content)?;
	}
	Ok(())
}
