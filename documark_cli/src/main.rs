use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use documark_cli::Commands;
use documark_cli::DocumarkCli;
use documark_cli::OutputFormat;
use documark_core::CheckResult;
use documark_core::DocumarkError;
use documark_core::FileFailure;
use documark_core::LineTable;
use documark_core::MarkerReference;
use documark_core::StaleEntry;
use documark_core::check_project;
use documark_core::compute_updates;
use documark_core::lexer;
use documark_core::locator;
use documark_core::project::ProjectContext;
use documark_core::project::scan_project_with_config;
use documark_core::write_updates;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DocumarkCli::parse();

	// Respect NO_COLOR env var and --no-color flag.
	let use_color = !args.no_color && std::env::var_os("NO_COLOR").is_none();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	if args.verbose {
		tracing_subscriber::fmt()
			.with_max_level(tracing_subscriber::filter::LevelFilter::DEBUG)
			.with_writer(std::io::stderr)
			.init();
	}

	// Install miette's fancy handler for rich error diagnostics.
	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	let result = match args.command {
		Some(Commands::Init) => run_init(&args),
		Some(Commands::Check {
			diff,
			format,
			watch,
		}) => run_check(&args, diff, format, watch),
		Some(Commands::Update { dry_run, watch }) => run_update(&args, dry_run, watch),
		Some(Commands::List) => run_list(&args),
		None => {
			eprintln!("No subcommand specified. Run `documark --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		// Try to render through miette for rich diagnostics with help text
		// and error codes.
		match e.downcast::<DocumarkError>() {
			Ok(err) => {
				let report: miette::Report = (*err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

fn resolve_root(args: &DocumarkCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

fn run_init(args: &DocumarkCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let template_path = root.join("documentary/templates.json");
	let config_path = root.join("documark.toml");

	let template_exists = template_path.exists();
	let config_exists = config_path.exists();

	if template_exists {
		println!("Template file already exists: {}", template_path.display());
	} else {
		let sample_content = "{\n\t\"greet\": \"Greets a person by name.\\n\\n@param string \
		                      $name The name to greet.\\n@return string The greeting.\"\n}\n";

		if let Some(parent) = template_path.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&template_path, sample_content)?;
		println!("Created template file: {}", template_path.display());
	}

	if config_exists {
		// Skip silently if config already exists.
	} else {
		let sample_config = "# documark configuration\n\n[templates]\n# Files or directories \
		                     holding template definitions (JSON or TOML).\npaths = \
		                     [\"documentary\"]\n\n# Keep the marker as the first line of each \
		                     expanded comment so files stay\n# re-expandable in place.\n# \
		                     keep_markers = false\n\n# Gitignore-style patterns to skip during \
		                     scanning.\n# [exclude]\n# patterns = [\"vendor/\"]\n";

		std::fs::write(&config_path, sample_config)?;
		println!("Created documark.toml");
	}

	if !template_exists {
		println!();
		println!("Next steps:");
		println!(
			"  1. Edit {} to define your documentation templates",
			template_path.display()
		);
		println!("  2. Add marker comments above your declarations:");
		println!("     /** {{documentary:greet}} */");
		println!("  3. Run `documark update` to expand them");
	}

	Ok(())
}

fn scan_and_report(args: &DocumarkCli) -> Result<ProjectContext, Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let ctx = scan_project_with_config(&root)?;

	if args.verbose {
		println!(
			"Scanned project: {} template(s), {} source file(s)",
			ctx.registry.len(),
			ctx.files.len()
		);

		if !ctx.registry.is_empty() {
			println!("  Templates:");
			for name in ctx.registry.names() {
				if let Some(template) = ctx.registry.get(name) {
					println!("    {name} ({})", template.file.display());
				}
			}
		}
	}

	Ok(ctx)
}

fn run_check(
	args: &DocumarkCli,
	show_diff: bool,
	format: OutputFormat,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial check.
	let is_stale = run_check_once(args, show_diff, format)?;

	if !watch {
		if is_stale {
			process::exit(1);
		}
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, checking...");
		if let Err(e) = run_check_once(args, show_diff, format) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

/// Run a single check and return whether anything is stale or failing.
fn run_check_once(
	args: &DocumarkCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<bool, Box<dyn std::error::Error>> {
	let ctx = scan_and_report(args)?;
	let root = resolve_root(args);
	let result = check_project(&ctx)?;

	if result.is_ok() {
		match format {
			OutputFormat::Json => {
				println!("{{\"ok\":true,\"stale\":[]}}");
			}
			OutputFormat::Github | OutputFormat::Text => {
				println!("Check passed: all marker comments are up to date.");
			}
		}
		return Ok(false);
	}

	match format {
		OutputFormat::Json => {
			let stale_entries: Vec<serde_json::Value> = result
				.stale
				.iter()
				.map(|entry| {
					let rel = make_relative(&entry.file, &root);
					serde_json::json!({
						"file": rel,
						"template": entry.template_name,
						"line": entry.line,
						"column": entry.column,
					})
				})
				.collect();
			let failure_entries: Vec<serde_json::Value> = result
				.failures
				.iter()
				.map(|failure| {
					let rel = make_relative(&failure.file, &root);
					serde_json::json!({
						"file": rel,
						"message": failure.error.to_string(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": false,
				"stale": stale_entries,
				"errors": failure_entries,
			});
			println!("{output}");
		}
		OutputFormat::Github => {
			for failure in &result.failures {
				let rel = make_relative(&failure.file, &root);
				println!("::error file={rel}::{}", failure.error);
			}
			for entry in &result.stale {
				let rel = make_relative(&entry.file, &root);
				println!(
					"::warning file={rel},line={},col={}::Marker comment for template `{}` is \
					 out of date",
					entry.line, entry.column, entry.template_name
				);
			}
			eprintln!("{}", check_summary(&result));
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");
			eprintln!("  file errors: {}", result.failures.len());
			eprintln!("  stale comments: {}", result.stale.len());

			let sorted_failures = sorted_failures(&result, &root);
			if !sorted_failures.is_empty() {
				eprintln!();
				eprintln!("File errors:");
				for failure in sorted_failures {
					let rel = make_relative(&failure.file, &root);
					eprintln!("  {rel}: {}", failure.error);
				}
			}

			let sorted_stale = sorted_stale_entries(&result, &root);
			if !sorted_stale.is_empty() {
				eprintln!();
				eprintln!("Stale comments:");
				for entry in sorted_stale {
					let rel = make_relative(&entry.file, &root);
					eprintln!(
						"  template `{}` at {rel}:{}:{}",
						entry.template_name, entry.line, entry.column
					);

					if show_diff {
						print_diff(&entry.current_content, &entry.expected_content);
					}
				}
			}

			eprintln!();
			eprintln!("{}", check_summary(&result));
		}
	}

	Ok(true)
}

fn check_summary(result: &CheckResult) -> String {
	let mut parts = Vec::new();
	if !result.failures.is_empty() {
		parts.push(format!("{} file error(s)", result.failures.len()));
	}
	if !result.stale.is_empty() {
		parts.push(format!(
			"{} marker comment(s) are out of date",
			result.stale.len()
		));
	}
	format!("{}. Run `documark update` to fix.", parts.join(" and "))
}

fn sorted_stale_entries<'a>(result: &'a CheckResult, root: &Path) -> Vec<&'a StaleEntry> {
	let mut stale_entries: Vec<_> = result.stale.iter().collect();
	stale_entries.sort_by(|a, b| {
		make_relative(&a.file, root)
			.cmp(&make_relative(&b.file, root))
			.then_with(|| a.line.cmp(&b.line))
			.then_with(|| a.column.cmp(&b.column))
			.then_with(|| a.template_name.cmp(&b.template_name))
	});
	stale_entries
}

fn sorted_failures<'a>(result: &'a CheckResult, root: &Path) -> Vec<&'a FileFailure> {
	let mut failures: Vec<_> = result.failures.iter().collect();
	failures.sort_by(|a, b| make_relative(&a.file, root).cmp(&make_relative(&b.file, root)));
	failures
}

fn run_update(
	args: &DocumarkCli,
	dry_run: bool,
	watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
	// Run the initial update.
	run_update_once(args, dry_run)?;

	if !watch || dry_run {
		return Ok(());
	}

	// Watch mode
	println!("\nWatching for file changes... (press Ctrl+C to stop)");

	let root = resolve_root(args);
	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_) | notify::EventKind::Create(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&root, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, updating...");
		if let Err(e) = run_update_once(args, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run_update_once(args: &DocumarkCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = scan_and_report(args)?;
	let root = resolve_root(args);
	let updates = compute_updates(&ctx)?;

	for failure in &updates.failures {
		let rel = make_relative(&failure.file, &root);
		eprintln!(
			"{} skipping {rel}: {}",
			colored!("warning:", yellow),
			failure.error
		);
	}

	if updates.updated_count == 0 {
		println!("All marker comments are already up to date.");
		return Ok(());
	}

	if dry_run {
		println!(
			"Dry run: would expand {} comment(s) in {} file(s):",
			updates.updated_count,
			updates.updated_files.len()
		);
		let mut paths: Vec<_> = updates.updated_files.keys().collect();
		paths.sort();
		for path in paths {
			let rel = make_relative(path, &root);
			println!("  {rel}");
		}
	} else {
		write_updates(&updates)?;
		println!(
			"Expanded {} comment(s) in {} file(s).",
			updates.updated_count,
			updates.updated_files.len()
		);

		if args.verbose {
			let mut paths: Vec<_> = updates.updated_files.keys().collect();
			paths.sort();
			for path in paths {
				let rel = make_relative(path, &root);
				println!("  {rel}");
			}
		}
	}

	Ok(())
}

/// A marker comment discovered for listing, with its file position.
struct MarkerSite {
	file: PathBuf,
	marker: MarkerReference,
	line: usize,
	column: usize,
}

fn collect_marker_sites(
	ctx: &ProjectContext,
	root: &Path,
) -> Result<Vec<MarkerSite>, Box<dyn std::error::Error>> {
	let mut sites = Vec::new();

	for file in &ctx.files {
		let rel = make_relative(file, root);
		let source = match std::fs::read_to_string(file) {
			Ok(source) => source,
			Err(error) => {
				eprintln!("{} skipping {rel}: {error}", colored!("warning:", yellow));
				continue;
			}
		};
		let mut line_table = None;

		for comment in locator::scan(&source) {
			let comment = match comment {
				Ok(comment) => comment,
				Err(error) => {
					eprintln!("{} {rel}: {error}", colored!("warning:", yellow));
					break;
				}
			};
			let Ok(Some(marker)) = lexer::extract(comment.inner_text(&source), comment.inner.start)
			else {
				continue;
			};

			let table = line_table.get_or_insert_with(|| LineTable::new(&source));
			let point = table.point_at(comment.span.start);
			sites.push(MarkerSite {
				file: file.clone(),
				marker,
				line: point.line,
				column: point.column,
			});
		}
	}

	Ok(sites)
}

fn run_list(args: &DocumarkCli) -> Result<(), Box<dyn std::error::Error>> {
	let ctx = scan_and_report(args)?;
	let root = resolve_root(args);
	let sites = collect_marker_sites(&ctx, &root)?;

	if ctx.registry.is_empty() && sites.is_empty() {
		println!("No templates or marker comments found.");
		return Ok(());
	}

	if !ctx.registry.is_empty() {
		println!("{}", colored!("Templates:", bold));
		for name in ctx.registry.names() {
			let Some(template) = ctx.registry.get(name) else {
				continue;
			};
			let rel = make_relative(&template.file, &root);
			let site_count = sites
				.iter()
				.filter(|site| site.marker.name == *name)
				.count();
			println!("  {name} {rel} ({site_count} marker(s))");
		}
	}

	if !sites.is_empty() {
		if !ctx.registry.is_empty() {
			println!();
		}
		println!("{}", colored!("Markers:", bold));
		for site in &sites {
			let rel = make_relative(&site.file, &root);
			let status = if ctx.registry.get(&site.marker.name).is_some() {
				"linked"
			} else {
				"dangling"
			};
			println!(
				"  {} {rel}:{}:{} [{status}]",
				site.marker.name, site.line, site.column
			);
		}
	}

	println!(
		"\n{} template(s), {} marker(s)",
		ctx.registry.len(),
		sites.len()
	);

	Ok(())
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
	// Comment bodies rarely end in a newline, keep the output tidy.
	if !expected.ends_with('\n') || !current.ends_with('\n') {
		eprintln!();
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
