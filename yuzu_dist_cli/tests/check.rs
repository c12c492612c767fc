mod common;

use predicates::prelude::PredicateBooleanExt;
use serde_json::Value;
use similar_asserts::assert_eq;
use yuzu_dist::AnyEmptyResult;

fn build(tmp: &tempfile::TempDir) {
	common::dist_cmd()
		.arg("build")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success();
}

#[test]
fn check_passes_after_build() -> AnyEmptyResult {
	let tmp = common::sample_project();
	build(&tmp);

	common::dist_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"Check passed: all 12 asset(s) are up to date.",
		));

	Ok(())
}

#[test]
fn check_fails_before_build() -> AnyEmptyResult {
	let tmp = common::sample_project();

	common::dist_cmd()
		.arg("check")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("_templates/data/home.json [missing]")
				.and(predicates::str::contains("12 asset(s) are out of date")),
		);

	Ok(())
}

#[test]
fn check_fails_when_source_changes() -> AnyEmptyResult {
	let tmp = common::sample_project();
	build(&tmp);
	common::write_file(
		tmp.path(),
		"_dev/_templates/blocks/button/button.hbs",
		"<button class=\"big\">{{label}}</button>\n",
	);

	common::dist_cmd()
		.arg("check")
		.arg("--diff")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.code(1)
		.stderr(
			predicates::str::contains("_templates/src/blocks/button.hbs [changed]")
				.and(predicates::str::contains("-<button>{{label}}</button>"))
				.and(predicates::str::contains(
					"+<button class=\"big\">{{label}}</button>",
				)),
		);

	Ok(())
}

#[test]
fn check_json_lists_stale_assets() -> AnyEmptyResult {
	let tmp = common::sample_project();
	build(&tmp);
	std::fs::remove_file(tmp.path().join("_client/templatePaths.json"))?;

	let output = common::dist_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.output()?;

	assert_eq!(output.status.code(), Some(1));
	let report: Value = serde_json::from_slice(&output.stdout)?;
	assert_eq!(
		report,
		serde_json::json!({
			"ok": false,
			"stale": [{ "path": "_client/templatePaths.json", "exists": false }]
		})
	);

	Ok(())
}

#[test]
fn check_json_reports_ok() -> AnyEmptyResult {
	let tmp = common::sample_project();
	build(&tmp);

	common::dist_cmd()
		.arg("check")
		.arg("--format")
		.arg("json")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains("{\"ok\":true,\"stale\":[]}"));

	Ok(())
}
