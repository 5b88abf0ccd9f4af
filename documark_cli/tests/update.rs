use assert_cmd::Command;
use documark_core::AnyEmptyResult;
use similar_asserts::assert_eq;

fn write_templates(root: &std::path::Path) -> AnyEmptyResult {
	std::fs::create_dir_all(root.join("documentary"))?;
	std::fs::write(
		root.join("documentary/templates.json"),
		r#"{"greet": "Greets a person.\n\n@param string $name"}"#,
	)?;
	Ok(())
}

#[test]
fn update_expands_marker_comments() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_templates(tmp.path())?;

	std::fs::write(
		tmp.path().join("greet.php"),
		"<?php\n\n/** {documentary:greet} */\nfunction greet($name) {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Expanded 1 comment(s)"));

	let content = std::fs::read_to_string(tmp.path().join("greet.php"))?;
	assert!(content.contains(" * Greets a person."));
	assert!(content.contains(" * @param string $name"));
	assert!(!content.contains("{documentary:greet}"));

	Ok(())
}

#[test]
fn update_noop_when_in_sync() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_templates(tmp.path())?;

	std::fs::write(
		tmp.path().join("lib.php"),
		"<?php\n\n/** Handwritten docs. */\nfunction add($a, $b) {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));

	Ok(())
}

#[test]
fn update_dry_run_does_not_write() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_templates(tmp.path())?;

	let original = "/** {documentary:greet} */\nfunction greet($name) {}\n";
	std::fs::write(tmp.path().join("greet.php"), original)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("would expand"))
		.stdout(predicates::str::contains("greet.php"));

	// File should not have changed
	let content = std::fs::read_to_string(tmp.path().join("greet.php"))?;
	assert_eq!(content, original);

	Ok(())
}

#[test]
fn update_is_idempotent() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_templates(tmp.path())?;

	std::fs::write(
		tmp.path().join("greet.php"),
		"/** {documentary:greet} */\nfunction greet($name) {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
	let after_first = std::fs::read_to_string(tmp.path().join("greet.php"))?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("already up to date"));
	let after_second = std::fs::read_to_string(tmp.path().join("greet.php"))?;

	assert_eq!(after_first, after_second);

	Ok(())
}

#[test]
fn update_honors_keep_markers_config() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_templates(tmp.path())?;
	std::fs::write(tmp.path().join("documark.toml"), "keep_markers = true\n")?;

	std::fs::write(
		tmp.path().join("greet.php"),
		"/** {documentary:greet} */\nfunction greet($name) {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	let content = std::fs::read_to_string(tmp.path().join("greet.php"))?;
	assert!(content.contains("{@documentary:greet}"));
	assert!(content.contains(" * Greets a person."));

	Ok(())
}

#[test]
fn update_skips_failing_files_and_continues() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	write_templates(tmp.path())?;

	std::fs::write(
		tmp.path().join("bad.php"),
		"/** {documentary:ghost} */\nfunction a() {}\n",
	)?;
	std::fs::write(
		tmp.path().join("good.php"),
		"/** {documentary:greet} */\nfunction b() {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("update")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("skipping bad.php"));

	// The healthy sibling is still expanded.
	let good = std::fs::read_to_string(tmp.path().join("good.php"))?;
	assert!(good.contains(" * Greets a person."));

	// The failing file is untouched.
	let bad = std::fs::read_to_string(tmp.path().join("bad.php"))?;
	assert!(bad.contains("{documentary:ghost}"));

	Ok(())
}
