mod common;

use predicates::prelude::PredicateBooleanExt;
use yuzu_dist::AnyEmptyResult;

#[test]
fn list_shows_block_types_and_passes() -> AnyEmptyResult {
	let tmp = common::sample_project();

	common::dist_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(
			predicates::str::contains("_dev/_templates/pages/home.json [pages (page)] data")
				.and(predicates::str::contains(
					"_dev/_templates/_dataStructures/list.schema [blocks] schema",
				))
				.and(predicates::str::contains(
					"_dev/_templates/blocks/button/button.html [blocks] markup",
				))
				.and(predicates::str::contains("9 source file(s)")),
		);

	Ok(())
}

#[test]
fn list_marks_unclassified_files() -> AnyEmptyResult {
	let tmp = common::sample_project();
	common::write_file(tmp.path(), "_dev/_templates/notes.txt", "todo\n");

	common::dist_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"_dev/_templates/notes.txt [no block type] -",
		));

	Ok(())
}

#[test]
fn list_without_sources() -> AnyEmptyResult {
	let tmp = tempfile::tempdir()?;

	common::dist_cmd()
		.arg("list")
		.arg("--path")
		.arg(tmp.path())
		.assert()
		.success()
		.stdout(predicates::str::contains(
			"No source files found under _dev/_templates.",
		));

	Ok(())
}
