use std::io::ErrorKind;
use std::path::Path;
use std::path::PathBuf;

use crate::DistResult;
use crate::aggregator::Aggregator;
use crate::compilation::Compilation;
use crate::config::DistConfig;
use crate::resolver::TemplateResolver;
use crate::source_walker::walk_sources;
use crate::template_paths::TemplatePathExtractor;

/// Run one build cycle for the project at `root`.
///
/// Every walked source file is recorded as a dependency, the aggregator
/// passes run against a single externals context, and the preview manifest
/// is derived from the recorded dependencies. Nothing is written to disk;
/// see [`write_assets`].
pub fn build_project<R: TemplateResolver>(
	root: &Path,
	config: &DistConfig,
	resolver: &R,
) -> DistResult<Compilation> {
	let tree = walk_sources(root, config)?;
	tracing::debug!(files = tree.len(), "walked source root");

	let dependencies: Vec<PathBuf> = tree.iter().map(|path| root.join(path)).collect();
	let mut compilation = Compilation::with_dependencies(dependencies);

	Aggregator::new(root, config, resolver)?.run(&tree, &mut compilation)?;
	TemplatePathExtractor::new(&config.template_paths).run(resolver, &mut compilation)?;

	tracing::info!(
		assets = compilation.len(),
		warnings = compilation.warnings().len(),
		"build complete"
	);
	Ok(compilation)
}

/// Outcome of [`write_assets`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WriteSummary {
	/// Assets that were created or changed on disk.
	pub written: Vec<String>,
	/// Assets whose file already had the expected content.
	pub unchanged: usize,
}

/// Write every asset of `compilation` below `root`, creating directories as
/// needed. Files that already hold the expected content are not touched.
pub fn write_assets(root: &Path, compilation: &Compilation) -> DistResult<WriteSummary> {
	let mut summary = WriteSummary::default();

	for asset in compilation.assets() {
		let target = root.join(&asset.path);
		if read_existing(&target)?.as_deref() == Some(asset.content.as_str()) {
			summary.unchanged += 1;
			continue;
		}

		if let Some(parent) = target.parent() {
			std::fs::create_dir_all(parent)?;
		}
		std::fs::write(&target, &asset.content)?;
		summary.written.push(asset.path.clone());
	}

	Ok(summary)
}

/// An asset whose file on disk is missing or differs from the build output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaleAsset {
	/// Output path relative to the project root.
	pub path: String,
	/// The current file content, `None` when the file does not exist.
	pub current: Option<String>,
	/// The content the build produced.
	pub expected: String,
}

/// Result of comparing a build against the files on disk.
#[derive(Debug, Default)]
pub struct CheckResult {
	pub stale: Vec<StaleAsset>,
}

impl CheckResult {
	/// Returns true if every asset on disk is up to date.
	pub fn is_ok(&self) -> bool {
		self.stale.is_empty()
	}
}

/// Compare every asset of `compilation` with the file below `root`.
pub fn check_assets(root: &Path, compilation: &Compilation) -> DistResult<CheckResult> {
	let mut result = CheckResult::default();

	for asset in compilation.assets() {
		let current = read_existing(&root.join(&asset.path))?;
		if current.as_deref() != Some(asset.content.as_str()) {
			result.stale.push(StaleAsset {
				path: asset.path.clone(),
				current,
				expected: asset.content.clone(),
			});
		}
	}

	Ok(result)
}

fn read_existing(path: &Path) -> DistResult<Option<String>> {
	match std::fs::read_to_string(path) {
		Ok(content) => Ok(Some(content)),
		Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
		Err(e) => Err(e.into()),
	}
}
