#![allow(dead_code)]

use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

pub fn dist_cmd() -> Command {
	let mut cmd =
		Command::cargo_bin("yuzu-dist").unwrap_or_else(|e| panic!("yuzu-dist binary: {e}"));
	cmd.env("NO_COLOR", "1");
	cmd.env_remove("RUST_LOG");
	cmd
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
	}
	std::fs::write(&path, contents).unwrap_or_else(|e| panic!("write: {e}"));
}

/// A page that references a button block, plus a data structure and a
/// layout.
pub fn sample_project() -> TempDir {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let root = tmp.path();

	write_file(
		root,
		"_dev/_templates/pages/home.json",
		r#"{"title": "Home", "button": {"$ref": "/button", "label": "Start"}}"#,
	);
	write_file(
		root,
		"_dev/_templates/pages/home.schema",
		r#"{"type": "object", "properties": {"title": {"type": "string"}, "button": {"$ref": "/button"}}}"#,
	);
	write_file(root, "_dev/_templates/pages/home.hbs", "<main>{{> button}}</main>\n");
	write_file(
		root,
		"_dev/_templates/blocks/button/button.json",
		r#"{"label": "Go", "size": "small"}"#,
	);
	write_file(
		root,
		"_dev/_templates/blocks/button/button.schema",
		r#"{"type": "object", "properties": {"label": {"type": "string"}}}"#,
	);
	write_file(root, "_dev/_templates/blocks/button/button.hbs", "<button>{{label}}</button>\n");
	write_file(root, "_dev/_templates/blocks/button/button.html", "<button>Go</button>\n");
	write_file(
		root,
		"_dev/_templates/_dataStructures/list.schema",
		r#"{"type": "array", "items": {"type": "string"}}"#,
	);
	write_file(root, "_dev/_templates/_layouts/_default.hbs", "<html>{{{body}}}</html>\n");

	tmp
}
