use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;

use crate::DistError;
use crate::DistResult;

/// A generated file, keyed by its output path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputAsset {
	pub path: String,
	pub content: String,
}

impl OutputAsset {
	pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			content: content.into(),
		}
	}

	/// Length of the content in bytes.
	pub fn size(&self) -> usize {
		self.content.len()
	}
}

/// A non-fatal problem found during a build cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub enum BuildWarning {
	/// Two sources were emitted to the same output path. The later one
	/// replaced the earlier one.
	PathCollision {
		path: String,
		first: String,
		second: String,
	},
}

impl BuildWarning {
	/// Human-readable message for this warning.
	pub fn message(&self) -> String {
		match self {
			Self::PathCollision {
				path,
				first,
				second,
			} => format!("`{second}` overwrote `{first}` at output path `{path}`"),
		}
	}
}

/// Per-build state shared with the host: the emitted assets, the files the
/// build depends on and any warnings.
///
/// Assets are kept ordered by path so that iterating a compilation is
/// deterministic.
#[derive(Debug, Default)]
pub struct Compilation {
	assets: BTreeMap<String, OutputAsset>,
	origins: HashMap<String, String>,
	file_dependencies: Vec<PathBuf>,
	warnings: Vec<BuildWarning>,
}

impl Compilation {
	pub fn new() -> Self {
		Self::default()
	}

	/// Start a compilation whose host already discovered `dependencies`.
	pub fn with_dependencies(dependencies: Vec<PathBuf>) -> Self {
		Self {
			file_dependencies: dependencies,
			..Self::default()
		}
	}

	pub fn add_dependency(&mut self, path: PathBuf) {
		self.file_dependencies.push(path);
	}

	pub fn file_dependencies(&self) -> &[PathBuf] {
		&self.file_dependencies
	}

	/// Deposit an asset. `origin` names what produced it and is only used to
	/// describe collisions: an existing asset at the same path is replaced
	/// and a [`BuildWarning::PathCollision`] is recorded.
	pub fn emit(&mut self, path: impl Into<String>, content: impl Into<String>, origin: &str) {
		let asset = OutputAsset::new(path, content);
		tracing::debug!(path = %asset.path, size = asset.size(), origin, "emit asset");

		if let Some(first) = self.origins.insert(asset.path.clone(), origin.to_string()) {
			let warning = BuildWarning::PathCollision {
				path: asset.path.clone(),
				first,
				second: origin.to_string(),
			};
			tracing::warn!("{}", warning.message());
			self.warnings.push(warning);
		}

		self.assets.insert(asset.path.clone(), asset);
	}

	pub fn asset(&self, path: &str) -> Option<&OutputAsset> {
		self.assets.get(path)
	}

	/// All assets ordered by path.
	pub fn assets(&self) -> impl Iterator<Item = &OutputAsset> {
		self.assets.values()
	}

	pub fn asset_paths(&self) -> impl Iterator<Item = &str> {
		self.assets.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.assets.len()
	}

	pub fn is_empty(&self) -> bool {
		self.assets.is_empty()
	}

	pub fn warnings(&self) -> &[BuildWarning] {
		&self.warnings
	}
}

/// Serialize `value` as JSON indented with four spaces. `path` is only used
/// for the error.
pub fn format_json(value: &Value, path: &str) -> DistResult<String> {
	let mut buffer = Vec::new();
	let formatter = PrettyFormatter::with_indent(b"    ");
	let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
	value
		.serialize(&mut serializer)
		.map_err(|e| DistError::Serialize {
			path: path.to_string(),
			reason: e.to_string(),
		})?;

	String::from_utf8(buffer).map_err(|e| {
		DistError::Serialize {
			path: path.to_string(),
			reason: e.to_string(),
		}
	})
}
