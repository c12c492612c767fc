use std::cell::RefCell;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

use crate::ExternalsSetup;
use crate::ResolveError;
use crate::TemplateResolver;
use crate::source_walker::path_key;

/// A resolver that parses contents as JSON and hands them back unchanged,
/// recording how it was called.
#[derive(Debug, Default)]
pub struct FakeResolver {
	pub setups: RefCell<Vec<ExternalsSetup>>,
	pub data_calls: RefCell<Vec<(PathBuf, Vec<String>)>>,
	pub path_calls: RefCell<Vec<String>>,
	pub preview_calls: RefCell<Vec<(Vec<PathBuf>, String)>>,
	/// Contents containing this marker are rejected.
	pub reject: Option<String>,
}

impl FakeResolver {
	pub fn rejecting(marker: &str) -> Self {
		Self {
			reject: Some(marker.to_string()),
			..Self::default()
		}
	}

	fn parse(&self, contents: &str) -> Result<Value, ResolveError> {
		if let Some(marker) = &self.reject {
			if contents.contains(marker.as_str()) {
				return Err(ResolveError::new(format!("rejected `{marker}`")));
			}
		}
		serde_json::from_str(contents).map_err(|e| ResolveError::new(e.to_string()))
	}
}

#[derive(Debug)]
pub struct FakeContext;

impl TemplateResolver for FakeResolver {
	type Context = FakeContext;

	fn setup(&self, setup: &ExternalsSetup) -> Result<FakeContext, ResolveError> {
		self.setups.borrow_mut().push(setup.clone());
		Ok(FakeContext)
	}

	fn resolve_data_string(
		&self,
		contents: &str,
		file_path: &Path,
		_context: &FakeContext,
		modifiers: &[String],
	) -> Result<Value, ResolveError> {
		self.data_calls
			.borrow_mut()
			.push((file_path.to_path_buf(), modifiers.to_vec()));
		self.parse(contents)
	}

	fn resolve_schema(&self, contents: &str, _context: &FakeContext) -> Result<Value, ResolveError> {
		self.parse(contents)
	}

	fn resolve_paths(
		&self,
		contents: &str,
		_context: &FakeContext,
		relative_path: &str,
	) -> Result<Value, ResolveError> {
		self.parse(contents)?;
		self.path_calls.borrow_mut().push(relative_path.to_string());
		Ok(json!({ "path": relative_path }))
	}

	fn get_previews(
		&self,
		dependency_paths: &[PathBuf],
		root_page: &str,
	) -> Result<Value, ResolveError> {
		self.preview_calls
			.borrow_mut()
			.push((dependency_paths.to_vec(), root_page.to_string()));
		Ok(Value::Array(
			dependency_paths
				.iter()
				.map(|path| Value::String(path_key(path)))
				.collect(),
		))
	}
}

pub fn write_file(root: &Path, relative: &str, contents: &str) {
	let path = root.join(relative);
	if let Some(parent) = path.parent() {
		std::fs::create_dir_all(parent).unwrap_or_else(|e| panic!("create_dir_all: {e}"));
	}
	std::fs::write(&path, contents).unwrap_or_else(|e| panic!("write: {e}"));
}

pub const HOME_DATA: &str = r#"{"title": "Home", "button": {"$ref": "/button", "label": "Start"}}"#;
pub const HOME_SCHEMA: &str = r#"{"type": "object", "properties": {"title": {"type": "string"}, "button": {"$ref": "/button"}}}"#;
pub const BUTTON_DATA: &str = r#"{"label": "Go", "size": "small"}"#;
pub const BUTTON_SCHEMA: &str = r#"{"type": "object", "properties": {"label": {"type": "string"}}}"#;
pub const LIST_SCHEMA: &str = r#"{"type": "array", "items": {"type": "string"}}"#;

/// A small project using the default `_dev/_templates` layout:
///
/// ```text
/// _dev/_templates/
///   _dataStructures/list.schema
///   _layouts/_default.hbs
///   blocks/button/button.{json,schema,hbs,html}
///   pages/home.{json,schema,hbs}
/// ```
pub fn sample_project() -> TempDir {
	let tmp = tempfile::tempdir().unwrap_or_else(|e| panic!("tempdir: {e}"));
	let root = tmp.path();

	write_file(root, "_dev/_templates/pages/home.json", HOME_DATA);
	write_file(root, "_dev/_templates/pages/home.schema", HOME_SCHEMA);
	write_file(root, "_dev/_templates/pages/home.hbs", "<main>{{> button}}</main>\n");
	write_file(root, "_dev/_templates/blocks/button/button.json", BUTTON_DATA);
	write_file(root, "_dev/_templates/blocks/button/button.schema", BUTTON_SCHEMA);
	write_file(root, "_dev/_templates/blocks/button/button.hbs", "<button>{{label}}</button>\n");
	write_file(root, "_dev/_templates/blocks/button/button.html", "<button>Go</button>\n");
	write_file(root, "_dev/_templates/_dataStructures/list.schema", LIST_SCHEMA);
	write_file(root, "_dev/_templates/_layouts/_default.hbs", "<html>{{{body}}}</html>\n");

	tmp
}
