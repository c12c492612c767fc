use std::path::Path;
use std::path::PathBuf;

use serde_json::Value;

use crate::DistError;
use crate::DistResult;
use crate::compilation::Compilation;
use crate::compilation::format_json;
use crate::config::TemplatePathsConfig;
use crate::resolver::TemplateResolver;
use crate::source_walker::path_key;

/// Whether `path` is a template data file: it contains `marker` and has a
/// `.json` extension.
pub fn is_template_dependency(path: &Path, marker: &str) -> bool {
	path.extension().is_some_and(|ext| ext == "json") && path_key(path).contains(marker)
}

/// Derives the preview manifest from the dependency list the host already
/// discovered. It never touches the filesystem.
#[derive(Debug, Clone, Copy)]
pub struct TemplatePathExtractor<'a> {
	options: &'a TemplatePathsConfig,
}

impl<'a> TemplatePathExtractor<'a> {
	pub fn new(options: &'a TemplatePathsConfig) -> Self {
		Self { options }
	}

	/// Keep the template data files from `dependencies`, preserving their
	/// order.
	pub fn filter_dependencies(&self, dependencies: &[PathBuf]) -> Vec<PathBuf> {
		dependencies
			.iter()
			.filter(|path| is_template_dependency(path, &self.options.templates_folder_name))
			.cloned()
			.collect()
	}

	/// Ask the resolver for the manifest of the filtered dependencies.
	pub fn extract<R: TemplateResolver>(
		&self,
		resolver: &R,
		dependencies: &[PathBuf],
	) -> DistResult<Value> {
		let filtered = self.filter_dependencies(dependencies);
		tracing::debug!(
			dependencies = dependencies.len(),
			templates = filtered.len(),
			"computing previews"
		);

		resolver
			.get_previews(&filtered, &self.options.root_path)
			.map_err(|e| {
				DistError::Resolution {
					path: self.options.output_path.clone(),
					reason: e.to_string(),
				}
			})
	}

	/// Extract the manifest from the compilation's dependencies and emit it
	/// under the configured output path.
	pub fn run<R: TemplateResolver>(
		&self,
		resolver: &R,
		compilation: &mut Compilation,
	) -> DistResult<()> {
		let manifest = self.extract(resolver, compilation.file_dependencies())?;
		let content = format_json(&manifest, &self.options.output_path)?;
		compilation.emit(self.options.output_path.clone(), content, "template paths");

		Ok(())
	}
}
