use std::path::Path;
use std::path::PathBuf;

use crate::DistError;
use crate::DistResult;
use crate::classify::PathClassifier;
use crate::compilation::Compilation;
use crate::compilation::format_json;
use crate::config::DistConfig;
use crate::config::SourcePatterns;
use crate::externals::ExternalsSetup;
use crate::externals::build_externals;
use crate::resolver::TemplateResolver;
use crate::schema;
use crate::source_walker::SourceTree;
use crate::source_walker::path_key;

/// The kinds of asset a build emits. Each maps to its own output subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetCategory {
	/// Resolved page data, `<root>/data/<file>`.
	Data,
	/// Resolved schemas, `<root>/schema/<blockType>/<file>`.
	Schema,
	/// Schema path metadata, `<root>/schema/<blockType>/<file>.meta`.
	Meta,
	/// Template markup copied verbatim, `<root>/src/<blockType>/<file>`.
	Template,
	/// Static markup copied verbatim, `<root>/markup$/<blockType>/<file>`.
	Markup,
}

/// Compute the output key for a source file. `output_root` must not end with
/// a separator (see [`DistConfig::output_prefix`]).
///
/// Data assets are flat: their block type does not appear in the path.
pub fn output_path(
	output_root: &str,
	category: AssetCategory,
	block_type: &str,
	file_name: &str,
) -> String {
	match category {
		AssetCategory::Data => format!("{output_root}/data/{file_name}"),
		AssetCategory::Schema => format!("{output_root}/schema/{block_type}/{file_name}"),
		AssetCategory::Meta => {
			format!(
				"{output_root}/schema/{block_type}/{}",
				meta_file_name(file_name)
			)
		}
		AssetCategory::Template => format!("{output_root}/src/{block_type}/{file_name}"),
		AssetCategory::Markup => format!("{output_root}/markup$/{block_type}/{file_name}"),
	}
}

/// `button.schema` becomes `button.meta`.
pub fn meta_file_name(schema_file_name: &str) -> String {
	schema_file_name.replacen(".schema", ".meta", 1)
}

/// A source file read for one pass. Its block type is derived from `path`
/// whenever needed rather than stored.
#[derive(Debug, Clone)]
pub struct SourceFile {
	/// Project-relative path.
	pub path: PathBuf,
	/// The file name, used as the output file name.
	pub name: String,
	pub contents: String,
}

impl SourceFile {
	/// Read `path` (relative to `root`) fresh from disk.
	pub fn read(root: &Path, path: &Path) -> DistResult<Self> {
		let contents = std::fs::read_to_string(root.join(path)).map_err(|e| {
			DistError::SourceRead {
				path: path_key(path),
				reason: e.to_string(),
			}
		})?;
		let name = path
			.file_name()
			.map(|name| name.to_string_lossy().into_owned())
			.unwrap_or_default();

		Ok(Self {
			path: path.to_path_buf(),
			name,
			contents,
		})
	}

	fn key(&self) -> String {
		path_key(&self.path)
	}
}

/// Runs the data, schema, template and markup passes for one build cycle.
pub struct Aggregator<'a, R: TemplateResolver> {
	root: &'a Path,
	config: &'a DistConfig,
	resolver: &'a R,
	classifier: PathClassifier,
	patterns: SourcePatterns,
}

impl<'a, R: TemplateResolver> Aggregator<'a, R> {
	/// Prepare an aggregator for the project at `root`. Fails when a pass
	/// glob does not compile.
	pub fn new(root: &'a Path, config: &'a DistConfig, resolver: &'a R) -> DistResult<Self> {
		Ok(Self {
			root,
			config,
			resolver,
			classifier: PathClassifier::from_config(config),
			patterns: SourcePatterns::from_config(&config.sources)?,
		})
	}

	pub fn classifier(&self) -> &PathClassifier {
		&self.classifier
	}

	pub fn patterns(&self) -> &SourcePatterns {
		&self.patterns
	}

	/// Build the externals context once, then run all four passes in order.
	pub fn run(&self, tree: &SourceTree, compilation: &mut Compilation) -> DistResult<()> {
		let setup = ExternalsSetup::from_config(self.root, self.config);
		let externals = build_externals(self.resolver, &setup)?;

		self.add_data(tree, &externals, compilation)?;
		self.add_schema(tree, &externals, compilation)?;
		self.add_templates(tree, compilation)?;
		self.add_markup(tree, compilation)?;

		Ok(())
	}

	/// Emit resolved data for page blocks. Data files of other block types
	/// are matched but produce nothing.
	pub fn add_data(
		&self,
		tree: &SourceTree,
		externals: &R::Context,
		compilation: &mut Compilation,
	) -> DistResult<usize> {
		let mut emitted = 0;

		for path in tree.matching(&self.patterns.data) {
			if !self.classifier.is_page_block(path)? {
				tracing::trace!(path = %path.display(), "skipping non-page data");
				continue;
			}

			let file = SourceFile::read(self.root, path)?;
			let data = self
				.resolver
				.resolve_data_string(&file.contents, &self.root.join(path), externals, &[])
				.map_err(|e| resolution_error(&file, &e))?;

			let emit_path = output_path(
				self.config.output_prefix(),
				AssetCategory::Data,
				"",
				&file.name,
			);
			let content = format_json(&data, &emit_path)?;
			compilation.emit(emit_path, content, &file.key());
			emitted += 1;
		}

		tracing::info!(pass = "data", emitted, "pass complete");
		Ok(emitted)
	}

	/// Emit every schema and its path metadata. Non-page object schemas are
	/// patched with the reserved properties.
	pub fn add_schema(
		&self,
		tree: &SourceTree,
		externals: &R::Context,
		compilation: &mut Compilation,
	) -> DistResult<usize> {
		let mut emitted = 0;

		for path in tree.matching(&self.patterns.schema) {
			let classification = self.classifier.classify(path)?;
			let file = SourceFile::read(self.root, path)?;

			let mut resolved = self
				.resolver
				.resolve_schema(&file.contents, externals)
				.map_err(|e| resolution_error(&file, &e))?;
			if schema::augment_if_qualified(&mut resolved, classification.is_page) {
				tracing::trace!(path = %path.display(), "added reserved schema properties");
			}

			let schema_path = output_path(
				self.config.output_prefix(),
				AssetCategory::Schema,
				&classification.block_type,
				&file.name,
			);
			let content = format_json(&resolved, &schema_path)?;
			compilation.emit(schema_path, content, &file.key());

			let relative = self.classifier.root_relative_key(path)?;
			let meta = self
				.resolver
				.resolve_paths(&file.contents, externals, &relative)
				.map_err(|e| resolution_error(&file, &e))?;
			let meta_path = output_path(
				self.config.output_prefix(),
				AssetCategory::Meta,
				&classification.block_type,
				&file.name,
			);
			let content = format_json(&meta, &meta_path)?;
			compilation.emit(meta_path, content, &file.key());

			emitted += 1;
		}

		tracing::info!(pass = "schema", emitted, "pass complete");
		Ok(emitted)
	}

	/// Copy template markup verbatim.
	pub fn add_templates(&self, tree: &SourceTree, compilation: &mut Compilation) -> DistResult<usize> {
		self.copy_verbatim(tree, AssetCategory::Template, compilation)
	}

	/// Copy static markup verbatim.
	pub fn add_markup(&self, tree: &SourceTree, compilation: &mut Compilation) -> DistResult<usize> {
		self.copy_verbatim(tree, AssetCategory::Markup, compilation)
	}

	fn copy_verbatim(
		&self,
		tree: &SourceTree,
		category: AssetCategory,
		compilation: &mut Compilation,
	) -> DistResult<usize> {
		let (matcher, pass) = match category {
			AssetCategory::Markup => (&self.patterns.markup, "markup"),
			_ => (&self.patterns.template, "template"),
		};
		let mut emitted = 0;

		for path in tree.matching(matcher) {
			let classification = self.classifier.classify(path)?;
			let file = SourceFile::read(self.root, path)?;
			let emit_path = output_path(
				self.config.output_prefix(),
				category,
				&classification.block_type,
				&file.name,
			);
			let key = file.key();
			compilation.emit(emit_path, file.contents, &key);
			emitted += 1;
		}

		tracing::info!(pass, emitted, "pass complete");
		Ok(emitted)
	}
}

fn resolution_error(file: &SourceFile, error: &crate::ResolveError) -> DistError {
	DistError::Resolution {
		path: file.key(),
		reason: error.to_string(),
	}
}
