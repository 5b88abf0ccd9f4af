use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;

use globset::Glob;
use globset::GlobSet;
use globset::GlobSetBuilder;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DocumarkError;
use crate::DocumarkResult;
use crate::config::CONFIG_FILE_CANDIDATES;
use crate::config::DEFAULT_MAX_FILE_SIZE;
use crate::config::DocumarkConfig;
use crate::registry::TemplateRegistry;
use crate::registry::load_templates;
use crate::resolver::RenderOptions;

/// Options for controlling how a project is scanned.
///
/// Use [`ScanOptions::default()`] for sensible defaults or
/// [`ScanOptions::from_config`] to construct from a [`DocumarkConfig`].
#[derive(Debug, Clone)]
pub struct ScanOptions {
	/// Gitignore-style patterns to exclude from scanning.
	pub exclude_patterns: Vec<String>,
	/// Glob patterns restricting which additional files to include.
	pub include_set: GlobSet,
	/// Maximum file size to scan in bytes.
	pub max_file_size: u64,
	/// Whether to disable `.gitignore` integration.
	pub disable_gitignore: bool,
}

impl Default for ScanOptions {
	fn default() -> Self {
		Self {
			exclude_patterns: Vec::new(),
			include_set: GlobSet::empty(),
			max_file_size: DEFAULT_MAX_FILE_SIZE,
			disable_gitignore: false,
		}
	}
}

impl ScanOptions {
	/// Construct [`ScanOptions`] from a [`DocumarkConfig`].
	pub fn from_config(config: Option<&DocumarkConfig>) -> Self {
		let exclude_patterns = config
			.map(|c| c.exclude.patterns.clone())
			.unwrap_or_default();
		let include_patterns = config.map(|c| &c.include.patterns[..]).unwrap_or_default();
		let max_file_size = config.map_or(DEFAULT_MAX_FILE_SIZE, |c| c.max_file_size);
		let disable_gitignore = config.is_some_and(|c| c.disable_gitignore);
		let include_set = build_glob_set(include_patterns);

		Self {
			exclude_patterns,
			include_set,
			max_file_size,
			disable_gitignore,
		}
	}
}

/// A scanned project: the source files to process together with the loaded
/// template registry.
///
/// This is the main entry point returned by [`scan_project_with_config`] and
/// consumed by [`check_project`](crate::check_project) and
/// [`compute_updates`](crate::compute_updates).
#[derive(Debug)]
pub struct ProjectContext {
	/// The project root directory.
	pub root: PathBuf,
	/// Source files to process, sorted for deterministic ordering.
	pub files: Vec<PathBuf>,
	/// Templates loaded from the definition files named in `documark.toml`.
	pub registry: TemplateRegistry,
	/// How to render expanded comments.
	pub render_options: RenderOptions,
}

/// Scan a directory and collect all scannable source files.
pub fn scan_project(root: &Path) -> DocumarkResult<Vec<PathBuf>> {
	scan_project_with_options(root, &ScanOptions::default())
}

/// Scan a project with config — loads discovered project config, reads
/// template definition files, and collects source files.
pub fn scan_project_with_config(root: &Path) -> DocumarkResult<ProjectContext> {
	let config = DocumarkConfig::load(root)?;
	let options = ScanOptions::from_config(config.as_ref());
	let files = scan_project_with_options(root, &options)?;
	let registry = match &config {
		Some(config) => load_templates(root, config)?,
		None => load_templates(root, &DocumarkConfig::default())?,
	};
	let render_options = RenderOptions {
		keep_marker: config.is_some_and(|c| c.keep_markers),
	};

	Ok(ProjectContext {
		root: root.to_path_buf(),
		files,
		registry,
		render_options,
	})
}

/// Scan a directory with the given [`ScanOptions`].
pub fn scan_project_with_options(root: &Path, options: &ScanOptions) -> DocumarkResult<Vec<PathBuf>> {
	let mut files = collect_files(root, &options.exclude_patterns, options.disable_gitignore)?;

	if !options.include_set.is_empty() {
		let custom_exclude = build_exclude_matcher(root, &options.exclude_patterns)?;
		collect_included_files(
			root,
			root,
			&options.include_set,
			&custom_exclude,
			&mut files,
			true,
		)?;
		files.sort();
	}

	for file in &files {
		let metadata = std::fs::metadata(file)?;
		if metadata.len() > options.max_file_size {
			return Err(DocumarkError::FileTooLarge {
				path: file.display().to_string(),
				size: metadata.len(),
				limit: options.max_file_size,
			});
		}
	}

	Ok(files)
}

/// Build a `GlobSet` from a list of glob pattern strings.
fn build_glob_set(patterns: &[String]) -> GlobSet {
	let mut builder = GlobSetBuilder::new();
	for pattern in patterns {
		if let Ok(glob) = Glob::new(pattern) {
			builder.add(glob);
		}
	}
	builder.build().unwrap_or_else(|_| GlobSet::empty())
}

/// Normalize CRLF line endings to LF.
pub fn normalize_line_endings(content: &str) -> String {
	if content.contains('\r') {
		content.replace("\r\n", "\n").replace('\r', "\n")
	} else {
		content.to_string()
	}
}

/// Build a `Gitignore` matcher from exclude patterns specified in
/// `documark.toml` `[exclude]`. These follow `.gitignore` syntax and are
/// applied on top of any `.gitignore` rules.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> DocumarkResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			DocumarkError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| DocumarkError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| {
		let empty = GitignoreBuilder::new(root);
		empty.build().unwrap_or_else(|_| {
			// Should never happen — an empty builder always succeeds.
			Gitignore::empty()
		})
	})
}

/// Collect all scannable source files from a directory tree.
///
/// When `disable_gitignore` is false (the default), files matched by the
/// project's `.gitignore` are skipped. Exclude patterns from `[exclude]` in
/// `documark.toml` follow gitignore syntax and are always applied on top.
fn collect_files(
	root: &Path,
	exclude_patterns: &[String],
	disable_gitignore: bool,
) -> DocumarkResult<Vec<PathBuf>> {
	let mut files = Vec::new();
	let mut visited_dirs = HashSet::new();

	let gitignore = if disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};

	let custom_exclude = build_exclude_matcher(root, exclude_patterns)?;

	walk_dir(
		root,
		root,
		&mut files,
		true,
		&gitignore,
		&custom_exclude,
		&mut visited_dirs,
	)?;
	// Sort for deterministic ordering.
	files.sort();
	Ok(files)
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target" || name == "vendor"
}

fn has_project_config(dir: &Path) -> bool {
	CONFIG_FILE_CANDIDATES
		.iter()
		.any(|candidate| dir.join(candidate).is_file())
}

#[allow(clippy::only_used_in_recursion)]
fn walk_dir(
	root: &Path,
	dir: &Path,
	files: &mut Vec<PathBuf>,
	is_root: bool,
	gitignore: &Gitignore,
	custom_exclude: &Gitignore,
	visited_dirs: &mut HashSet<PathBuf>,
) -> DocumarkResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	// Detect symlink cycles by tracking canonical paths.
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !visited_dirs.insert(canonical.clone()) {
		return Err(DocumarkError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	let entries = std::fs::read_dir(dir)?;

	for entry in entries {
		let entry = entry?;
		let path = entry.path();

		// Skip hidden directories and common non-source directories.
		if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
			if is_ignored_directory_name(name) {
				continue;
			}
		}

		let is_dir = path.is_dir();

		if gitignore.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if custom_exclude.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if is_dir {
			// Skip subdirectories that have their own documark config file
			// (separate project scope).
			if !is_root && has_project_config(&path) {
				continue;
			}
			walk_dir(
				root,
				&path,
				files,
				false,
				gitignore,
				custom_exclude,
				visited_dirs,
			)?;
		} else if is_scannable_file(&path) {
			files.push(path);
		}
	}

	Ok(())
}

/// Recursively collect files matching include patterns.
fn collect_included_files(
	root: &Path,
	dir: &Path,
	include_set: &GlobSet,
	exclude_matcher: &Gitignore,
	files: &mut Vec<PathBuf>,
	is_root: bool,
) -> DocumarkResult<()> {
	if !dir.is_dir() {
		return Ok(());
	}

	let entries = std::fs::read_dir(dir)?;

	for entry in entries {
		let entry = entry?;
		let path = entry.path();

		if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
			if is_ignored_directory_name(name) {
				continue;
			}
		}

		let is_dir = path.is_dir();

		if exclude_matcher.matched(&path, is_dir).is_ignore() {
			continue;
		}

		if let Ok(rel_path) = path.strip_prefix(root) {
			if path.is_file() && include_set.is_match(rel_path) && !files.contains(&path) {
				files.push(path.clone());
			}
		}

		if is_dir {
			if !is_root && has_project_config(&path) {
				continue;
			}
			collect_included_files(root, &path, include_set, exclude_matcher, files, false)?;
		}
	}

	Ok(())
}

/// Check if a file should be scanned for documentation markers.
fn is_scannable_file(path: &Path) -> bool {
	let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
		return false;
	};

	matches!(
		ext,
		"php" | "js" | "ts" | "tsx" | "jsx" | "java" | "c" | "cpp" | "h" | "cs" | "go"
	)
}
