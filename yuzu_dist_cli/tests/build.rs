mod common;

use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use serde_json::json;
use similar_asserts::assert_eq;
use yuzu_dist::AnyEmptyResult;

#[test]
fn build_writes_output_tree() -> AnyEmptyResult {
	let tmp = common::sample_project();

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("Wrote 12 asset(s), 0 unchanged."));

	let data: Value =
		serde_json::from_str(&std::fs::read_to_string(tmp.path().join("_templates/data/home.json"))?)?;
	assert_eq!(
		data,
		json!({
			"title": "Home",
			"button": { "label": "Start", "size": "small", "_ref": "button" }
		})
	);

	let template = std::fs::read_to_string(tmp.path().join("_templates/src/blocks/button.hbs"))?;
	assert_eq!(template, "<button>{{label}}</button>\n");
	assert!(tmp.path().join("_templates/markup$/blocks/button.html").is_file());
	assert!(tmp.path().join("_templates/schema/blocks/list.meta").is_file());

	let manifest = std::fs::read_to_string(tmp.path().join("_client/templatePaths.json"))?;
	assert_eq!(
		manifest,
		"[\n    {\n        \"name\": \"home\",\n        \"url\": \"/yuzu.html#/home\"\n    }\n]"
	);

	Ok(())
}

#[test]
fn build_dry_run_writes_nothing() -> AnyEmptyResult {
	let tmp = common::sample_project();

	common::dist_cmd()
		.arg("build")
		.arg("--dry-run")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("Dry run: would write 12 asset(s):")
				.and(predicates::str::contains("_templates/data/home.json")),
		);

	assert!(!tmp.path().join("_templates").exists());
	assert!(!tmp.path().join("_client").exists());

	Ok(())
}

#[test]
fn build_twice_leaves_files_untouched() -> AnyEmptyResult {
	let tmp = common::sample_project();

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"All 12 asset(s) are already up to date.",
		));

	Ok(())
}

#[test]
fn build_uses_configured_output_root() -> AnyEmptyResult {
	let tmp = common::sample_project();
	common::write_file(tmp.path(), "yuzu.toml", "output_root = \"dist/\"\n");

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();

	assert!(tmp.path().join("dist/schema/pages/home.schema").is_file());
	assert!(!tmp.path().join("_templates").exists());

	Ok(())
}

#[test]
fn build_warns_on_output_collision() -> AnyEmptyResult {
	let tmp = common::sample_project();
	common::write_file(
		tmp.path(),
		"_dev/_templates/pages/nested/home.json",
		r#"{"title": "Nested"}"#,
	);

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stderr(
			predicates::str::contains("warning:").and(predicates::str::contains(
				"overwrote `_dev/_templates/pages/home.json` at output path \
				 `_templates/data/home.json`",
			)),
		);

	let data = std::fs::read_to_string(tmp.path().join("_templates/data/home.json"))?;
	assert!(data.contains("Nested"));

	Ok(())
}

#[test]
fn build_fails_for_file_without_block_type() -> AnyEmptyResult {
	let tmp = common::sample_project();
	common::write_file(tmp.path(), "_dev/_templates/stray.hbs", "<p></p>\n");

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains(
			"cannot derive a block type from `_dev/_templates/stray.hbs`",
		));

	assert!(!tmp.path().join("_templates").exists());

	Ok(())
}

#[test]
fn build_fails_for_unknown_partial() -> AnyEmptyResult {
	let tmp = common::sample_project();
	common::write_file(
		tmp.path(),
		"_dev/_templates/pages/about.json",
		r#"{"card": {"$ref": "/card"}}"#,
	);

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("unknown data partial `card`"));

	Ok(())
}

#[test]
fn build_fails_for_invalid_config() -> AnyEmptyResult {
	let tmp = common::sample_project();
	common::write_file(tmp.path(), "yuzu.toml", "output_root = [\n");

	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(2)
		.stderr(predicates::str::contains("failed to parse config file"));

	Ok(())
}
