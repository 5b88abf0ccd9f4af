use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DocumarkError {
	#[error(transparent)]
	#[diagnostic(code(documark::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(documark::config_parse),
		help("check that documark.toml is valid TOML with [templates], [exclude] and/or [include] sections")
	)]
	ConfigParse(String),

	#[error("failed to load template file `{path}`: {reason}")]
	#[diagnostic(code(documark::template_parse))]
	TemplateParse { path: String, reason: String },

	#[error("unsupported template file format: `{0}`")]
	#[diagnostic(
		code(documark::unsupported_template_format),
		help("template definition files must be JSON or TOML maps of name to body text")
	)]
	UnsupportedTemplateFormat(String),

	#[error("duplicate template `{name}`: defined in `{first_file}` and `{second_file}`")]
	#[diagnostic(
		code(documark::duplicate_template),
		help("each template name must be unique across all template definition files")
	)]
	DuplicateTemplate {
		name: String,
		first_file: String,
		second_file: String,
	},

	#[error("unterminated doc comment at offset {offset}")]
	#[diagnostic(
		code(documark::unterminated_comment),
		help("add a closing `*/` to this comment")
	)]
	UnterminatedComment { offset: usize },

	#[error("more than one template marker in the comment at offset {offset}")]
	#[diagnostic(
		code(documark::ambiguous_marker),
		help("each comment may reference at most one template")
	)]
	AmbiguousMarker { offset: usize },

	#[error("unknown template `{name}` referenced at offset {offset}")]
	#[diagnostic(
		code(documark::unknown_template),
		help("define the template in a template definition file, or fix the marker name")
	)]
	UnknownTemplate { name: String, offset: usize },

	#[error("template `{name}` recurses beyond the resolution limit")]
	#[diagnostic(
		code(documark::template_recursion),
		help("remove the cyclic reference, or flatten template chains deeper than 8 levels")
	)]
	TemplateRecursion { name: String },

	// Internal invariant violation. The locator guarantees disjoint comment
	// spans, so overlapping edits indicate a bug rather than bad input.
	#[error("internal error: overlapping or unsorted edit at index {index}")]
	#[diagnostic(code(documark::overlapping_edits))]
	OverlappingEdits { index: usize },

	#[error("file too large: `{path}` is {size} bytes (limit: {limit} bytes)")]
	#[diagnostic(
		code(documark::file_too_large),
		help("increase the file size limit in documark.toml or exclude this file")
	)]
	FileTooLarge { path: String, size: u64, limit: u64 },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(documark::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type DocumarkResult<T> = Result<T, DocumarkError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
