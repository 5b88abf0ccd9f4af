use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Expand doc-comment template markers across your project.",
	long_about = "documark expands named placeholder markers embedded in source-code doc \
	              comments into full documentation blocks from a template registry.\n\nWrite a \
	              documentation block once in a template definition file, reference it with \
	              `{documentary:name}` inside a `/** ... */` comment, and stamp it into every \
	              file that needs it.\n\nQuick start:\n  documark init    Create a sample \
	              template file\n  documark update  Expand all marker comments\n  documark \
	              check   Verify everything is up to date\n  documark list    Show loaded \
	              templates and marker sites"
)]
pub struct DocumarkCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Initialize documark in a project by creating a sample template file.
	///
	/// Creates a `documentary/templates.json` definition file and a
	/// `documark.toml` config in the project root. Existing files are left
	/// untouched and the command exits successfully.
	Init,
	/// Check that all marker comments are up to date.
	///
	/// Scans source files for doc comments carrying template markers and
	/// compares their current text against the fully expanded template.
	/// Exits with a non-zero status code if any comments are stale or any
	/// file fails to process.
	///
	/// Ideal for CI pipelines. Use `--diff` to see exactly what would change
	/// and `--format` to control the output style.
	Check {
		/// Show a unified diff for each stale comment, highlighting the
		/// differences between current and expected text.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output, `json` for programmatic consumption, or `github` for
		/// GitHub Actions annotations that appear inline on PRs.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,

		/// Watch for file changes and re-run checks automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Expand all marker comments with the latest template content.
	///
	/// Loads template definitions from the files named in `documark.toml`,
	/// resolves every marker comment, and rewrites the affected files in
	/// place. Files without markers are never touched.
	///
	/// Use `--dry-run` to preview changes without writing to disk, or
	/// `--watch` to automatically re-run whenever source files change.
	Update {
		/// Preview changes without writing files. Prints which files would
		/// be modified.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch for file changes and re-run updates automatically.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// List all loaded templates and the marker sites that reference them.
	///
	/// Displays every template in the registry with its definition file,
	/// plus every marker comment found across the project. Useful for
	/// auditing template coverage and discovering dangling markers.
	List,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each stale entry includes
	/// the file path, template name, line, and column.
	Json,
	/// GitHub Actions annotation format. Emits `::warning` or `::error`
	/// annotations that appear inline on pull request diffs.
	Github,
}
