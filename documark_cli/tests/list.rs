use assert_cmd::Command;
use documark_core::AnyEmptyResult;

#[test]
fn list_shows_templates_and_marker_sites() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("documentary"))?;
	std::fs::write(
		tmp.path().join("documentary/templates.json"),
		r#"{"greet": "Greets a person.", "unused": "Never referenced."}"#,
	)?;
	std::fs::write(
		tmp.path().join("greet.php"),
		"/** {documentary:greet} */\nfunction greet() {}\n\n/** {documentary:ghost} \
		 */\nfunction g() {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("greet documentary/templates.json (1 marker(s))"))
		.stdout(predicates::str::contains("unused documentary/templates.json (0 marker(s))"))
		.stdout(predicates::str::contains("greet greet.php:1:1 [linked]"))
		.stdout(predicates::str::contains("ghost greet.php:4:1 [dangling]"))
		.stdout(predicates::str::contains("2 template(s), 2 marker(s)"));

	Ok(())
}

#[test]
fn list_warns_on_malformed_files_and_keeps_going() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;
	std::fs::create_dir_all(tmp.path().join("documentary"))?;
	std::fs::write(
		tmp.path().join("documentary/templates.json"),
		r#"{"greet": "Greets a person."}"#,
	)?;
	std::fs::write(
		tmp.path().join("broken.php"),
		"/** never closed\nfunction a() {}\n",
	)?;
	std::fs::write(
		tmp.path().join("greet.php"),
		"/** {documentary:greet} */\nfunction greet() {}\n",
	)?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(predicates::str::contains("warning:"))
		.stderr(predicates::str::contains("broken.php"))
		.stdout(predicates::str::contains("greet greet.php:1:1 [linked]"));

	Ok(())
}

#[test]
fn list_reports_empty_projects() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	let mut cmd = Command::cargo_bin("documark")?;
	cmd.env("NO_COLOR", "1")
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("No templates or marker comments found."));

	Ok(())
}
