use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use crate::DocumarkError;
use crate::DocumarkResult;
use crate::config::DocumarkConfig;

/// A named block of canonical documentation text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
	/// The name markers use to reference this template.
	pub name: String,
	/// The canonical body text. May itself contain further markers, which are
	/// expanded transitively during resolution.
	pub body: String,
	/// The definition file this entry was loaded from. Carried for duplicate
	/// and diagnostic messages.
	pub file: PathBuf,
}

/// An in-memory registry mapping template names to their bodies.
///
/// Built once per run from the configured template definition files, then
/// treated as read-only. Lookups never mutate, so a registry can be shared
/// freely across file-processing workers.
#[derive(Debug, Default)]
pub struct TemplateRegistry {
	templates: HashMap<String, Template>,
}

impl TemplateRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of templates in the registry.
	pub fn len(&self) -> usize {
		self.templates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.templates.is_empty()
	}

	/// Pure lookup by name. Name matching is case-sensitive.
	pub fn get(&self, name: &str) -> Option<&Template> {
		self.templates.get(name)
	}

	/// Template names in sorted order, for deterministic listings.
	pub fn names(&self) -> Vec<&str> {
		let mut names: Vec<&str> = self.templates.keys().map(String::as_str).collect();
		names.sort_unstable();
		names
	}

	/// Insert a template, failing when the name is already taken.
	pub fn insert(&mut self, template: Template) -> DocumarkResult<()> {
		if let Some(existing) = self.templates.get(&template.name) {
			return Err(DocumarkError::DuplicateTemplate {
				name: template.name,
				first_file: existing.file.display().to_string(),
				second_file: template.file.display().to_string(),
			});
		}

		self.templates.insert(template.name.clone(), template);
		Ok(())
	}

	/// Build a registry from in-memory `(name, body)` pairs. Duplicate names
	/// fail the load. Mainly useful for tests and embedding.
	pub fn from_pairs<I, N, B>(pairs: I) -> DocumarkResult<Self>
	where
		I: IntoIterator<Item = (N, B)>,
		N: Into<String>,
		B: Into<String>,
	{
		let mut registry = Self::new();
		for (name, body) in pairs {
			registry.insert(Template {
				name: name.into(),
				body: body.into(),
				file: PathBuf::new(),
			})?;
		}
		Ok(registry)
	}
}

/// Load every template definition file referenced by the config into one
/// registry. Paths may name individual files or directories; directories are
/// scanned recursively for `*.json` and `*.toml` definition files.
pub fn load_templates(root: &Path, config: &DocumarkConfig) -> DocumarkResult<TemplateRegistry> {
	let mut registry = TemplateRegistry::new();

	for rel_path in &config.templates.paths {
		let abs_path = root.join(rel_path);

		if !abs_path.exists() {
			tracing::debug!(path = %abs_path.display(), "template path does not exist, skipping");
			continue;
		}

		if abs_path.is_dir() {
			let mut files = Vec::new();
			collect_definition_files(&abs_path, &mut files)?;
			// Sorted so duplicate errors are deterministic across runs.
			files.sort();
			for file in files {
				load_definition_file(&file, &mut registry)?;
			}
		} else {
			load_definition_file(&abs_path, &mut registry)?;
		}
	}

	tracing::debug!(templates = registry.len(), "template registry loaded");
	Ok(registry)
}

fn collect_definition_files(dir: &Path, files: &mut Vec<PathBuf>) -> DocumarkResult<()> {
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();

		if path.is_dir() {
			collect_definition_files(&path, files)?;
			continue;
		}

		if matches!(
			path.extension().and_then(|ext| ext.to_str()),
			Some("json" | "toml")
		) {
			files.push(path);
		}
	}

	Ok(())
}

/// Parse one definition file into `name -> body` entries and merge them into
/// the registry. The on-disk format is the template source's concern; the
/// registry only ever sees the mapping.
fn load_definition_file(path: &Path, registry: &mut TemplateRegistry) -> DocumarkResult<()> {
	let content = std::fs::read_to_string(path).map_err(|e| {
		DocumarkError::TemplateParse {
			path: path.display().to_string(),
			reason: e.to_string(),
		}
	})?;

	let format = path
		.extension()
		.and_then(|ext| ext.to_str())
		.unwrap_or("")
		.to_ascii_lowercase();

	let entries = parse_definition_content(&content, &format, &path.display().to_string())?;

	for (name, body) in entries {
		registry.insert(Template {
			name,
			body,
			file: path.to_path_buf(),
		})?;
	}

	Ok(())
}

/// Parse definition file content into name/body pairs based on its format.
/// A `BTreeMap` keeps the insertion order deterministic.
fn parse_definition_content(
	content: &str,
	format: &str,
	path_display: &str,
) -> DocumarkResult<BTreeMap<String, String>> {
	match format {
		"json" => {
			serde_json::from_str(content).map_err(|e| {
				DocumarkError::TemplateParse {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		"toml" => {
			toml::from_str(content).map_err(|e| {
				DocumarkError::TemplateParse {
					path: path_display.to_string(),
					reason: e.to_string(),
				}
			})
		}
		other => Err(DocumarkError::UnsupportedTemplateFormat(other.to_string())),
	}
}
