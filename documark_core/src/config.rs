use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::DocumarkError;
use crate::DocumarkResult;

/// Default maximum file size in bytes (10 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = [
	"documark.toml",
	".documark.toml",
	".config/documark.toml",
];

/// Configuration loaded from a `documark.toml` file.
///
/// ```toml
/// [templates]
/// paths = ["documentary"]
///
/// [exclude]
/// patterns = ["vendor/", "*.generated.php"]
///
/// [include]
/// patterns = ["extra/**/*.php"]
///
/// keep_markers = false
/// max_file_size = 10485760
/// disable_gitignore = false
/// ```
#[derive(Debug, Deserialize)]
pub struct DocumarkConfig {
	/// Template definition sources — files or directories, relative to the
	/// project root.
	#[serde(default)]
	pub templates: TemplatesConfig,
	/// Exclusion configuration using gitignore-style patterns.
	#[serde(default)]
	pub exclude: ExcludeConfig,
	/// Inclusion configuration — additional glob patterns to scan.
	#[serde(default)]
	pub include: IncludeConfig,
	/// Keep the template marker as the first line of each expanded comment
	/// so files stay re-expandable in place.
	#[serde(default)]
	pub keep_markers: bool,
	/// Maximum file size in bytes to scan. Files larger than this fail the
	/// scan. Defaults to 10 MB.
	#[serde(default = "default_max_file_size")]
	pub max_file_size: u64,
	/// When true, `.gitignore` files are not used for filtering. By default
	/// (`false`), documark respects `.gitignore` patterns and skips files
	/// that would be ignored by git.
	#[serde(default)]
	pub disable_gitignore: bool,
}

fn default_max_file_size() -> u64 {
	DEFAULT_MAX_FILE_SIZE
}

impl Default for DocumarkConfig {
	fn default() -> Self {
		Self {
			templates: TemplatesConfig::default(),
			exclude: ExcludeConfig::default(),
			include: IncludeConfig::default(),
			keep_markers: false,
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

/// Configuration for template definition sources.
#[derive(Debug, Deserialize)]
pub struct TemplatesConfig {
	/// Files or directories holding `*.json` / `*.toml` template definition
	/// files, relative to the project root.
	#[serde(default = "default_template_paths")]
	pub paths: Vec<PathBuf>,
}

impl Default for TemplatesConfig {
	fn default() -> Self {
		Self {
			paths: default_template_paths(),
		}
	}
}

fn default_template_paths() -> Vec<PathBuf> {
	vec![PathBuf::from("documentary")]
}

/// Configuration for excluding files and directories from scanning.
///
/// Patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set). Supports negation
/// (`!pattern`), directory markers (trailing `/`), and all standard
/// gitignore wildcards.
#[derive(Debug, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns for files and directories to skip during
	/// scanning. These are relative to the project root.
	#[serde(default)]
	pub patterns: Vec<String>,
}

/// Configuration for including additional files in scanning.
#[derive(Debug, Default, Deserialize)]
pub struct IncludeConfig {
	/// Additional glob patterns for files to scan, relative to the project
	/// root.
	#[serde(default)]
	pub patterns: Vec<String>,
}

impl DocumarkConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> DocumarkResult<Option<DocumarkConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config: DocumarkConfig =
			toml::from_str(&content).map_err(|e| DocumarkError::ConfigParse(e.to_string()))?;

		Ok(Some(config))
	}
}
