use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::DistError;
use crate::DistResult;
use crate::config::DistConfig;
use crate::resolver::TemplateResolver;
use crate::source_walker::normalize_relative;

/// A property the resolver adds to object schemas on its own.
///
/// ```toml
/// [[auto_schema_properties]]
/// name = "_ref"
/// schema = { type = "string" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservedSchemaProperty {
	pub name: String,
	pub schema: Value,
}

impl ReservedSchemaProperty {
	pub fn new(name: impl Into<String>, schema: Value) -> Self {
		Self {
			name: name.into(),
			schema,
		}
	}
}

/// The resolver-level auto properties used when `yuzu.toml` does not list
/// any: `_ref` and `_modifiers`, both plain strings.
///
/// `_modifiers` is a plain string here, while
/// [`augment`](crate::schema::augment) patches it in as an array of strings.
pub fn default_reserved_properties() -> Vec<ReservedSchemaProperty> {
	vec![
		ReservedSchemaProperty::new("_ref", json!({ "type": "string" })),
		ReservedSchemaProperty::new("_modifiers", json!({ "type": "string" })),
	]
}

/// Everything a resolver needs to build its shared context for one build
/// cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalsSetup {
	/// Directories whose files are treated as pre-rendered partials, in
	/// lookup order.
	pub partial_dirs: Vec<PathBuf>,
	/// The layouts directory.
	pub layouts_dir: PathBuf,
	/// Auto schema properties.
	pub reserved_properties: Vec<ReservedSchemaProperty>,
}

impl ExternalsSetup {
	/// Resolve the configured directories against the project `root`.
	pub fn from_config(root: &Path, config: &DistConfig) -> Self {
		Self {
			partial_dirs: config
				.sources
				.rendered_partial_directories
				.iter()
				.map(|dir| root.join(normalize_relative(dir)))
				.collect(),
			layouts_dir: root.join(normalize_relative(&config.sources.layouts_directory)),
			reserved_properties: config.auto_schema_properties.clone(),
		}
	}
}

/// Build the externals context for one build cycle.
///
/// Called once per cycle. The returned context is only ever borrowed
/// immutably by the passes.
pub fn build_externals<R: TemplateResolver>(
	resolver: &R,
	setup: &ExternalsSetup,
) -> DistResult<R::Context> {
	tracing::debug!(
		partial_dirs = setup.partial_dirs.len(),
		layouts_dir = %setup.layouts_dir.display(),
		reserved_properties = setup.reserved_properties.len(),
		"building externals context"
	);

	resolver
		.setup(setup)
		.map_err(|e| DistError::Resolution {
			path: "externals".to_string(),
			reason: e.to_string(),
		})
}
