use std::collections::HashSet;
use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use derive_more::Deref;
use globset::GlobMatcher;
use ignore::gitignore::Gitignore;
use ignore::gitignore::GitignoreBuilder;

use crate::DistError;
use crate::DistResult;
use crate::config::DistConfig;

/// Every file found below the source root, as sorted project-relative paths.
///
/// A build walks the tree once; each pass then filters it with its own glob.
#[derive(Debug, Clone, Default, Deref)]
pub struct SourceTree(#[deref] Vec<PathBuf>);

impl SourceTree {
	pub fn new(mut files: Vec<PathBuf>) -> Self {
		files.sort();
		files.dedup();
		Self(files)
	}

	/// Files whose project-relative path matches `matcher`, in sorted order.
	pub fn matching<'a>(&'a self, matcher: &'a GlobMatcher) -> impl Iterator<Item = &'a Path> {
		self.0
			.iter()
			.filter(move |path| matcher.is_match(path))
			.map(PathBuf::as_path)
	}
}

/// Drop `.` components so `./_dev/_templates` and `_dev/_templates` compare
/// equal.
pub fn normalize_relative(path: &Path) -> PathBuf {
	path.components()
		.filter(|component| !matches!(component, Component::CurDir))
		.collect()
}

/// Render a path with `/` separators regardless of platform.
pub fn path_key(path: &Path) -> String {
	path.to_string_lossy().replace('\\', "/")
}

/// Walk the configured source root below `root`.
///
/// A missing source root produces an empty tree. Files matched by the
/// project's `.gitignore` are skipped unless `disable_gitignore` is set, and
/// `[exclude]` patterns are always applied on top.
pub fn walk_sources(root: &Path, config: &DistConfig) -> DistResult<SourceTree> {
	let source_dir = root.join(config.source_root());
	if !source_dir.is_dir() {
		tracing::debug!(path = %source_dir.display(), "source root does not exist");
		return Ok(SourceTree::default());
	}

	let gitignore = if config.exclude.disable_gitignore {
		Gitignore::empty()
	} else {
		build_gitignore(root)
	};
	let custom_exclude = build_exclude_matcher(root, &config.exclude.patterns)?;

	let mut files = Vec::new();
	let mut ancestors = HashSet::new();
	walk_dir(
		&source_dir,
		&mut files,
		&gitignore,
		&custom_exclude,
		&mut ancestors,
	)?;

	let relative = files
		.into_iter()
		.map(|file| {
			file.strip_prefix(root)
				.map(Path::to_path_buf)
				.unwrap_or(file)
		})
		.collect();

	Ok(SourceTree::new(relative))
}

/// Build a `Gitignore` matcher from exclude patterns specified in
/// `yuzu.toml` `[exclude]`.
fn build_exclude_matcher(root: &Path, patterns: &[String]) -> DistResult<Gitignore> {
	let mut builder = GitignoreBuilder::new(root);
	for pattern in patterns {
		builder.add_line(None, pattern).map_err(|e| {
			DistError::ConfigParse(format!("invalid exclude pattern `{pattern}`: {e}"))
		})?;
	}
	builder
		.build()
		.map_err(|e| DistError::ConfigParse(format!("failed to build exclude rules: {e}")))
}

/// Build a `Gitignore` matcher from the project's `.gitignore` file (if any).
fn build_gitignore(root: &Path) -> Gitignore {
	let mut builder = GitignoreBuilder::new(root);
	let gitignore_path = root.join(".gitignore");
	if gitignore_path.exists() {
		let _ = builder.add(gitignore_path);
	}
	builder.build().unwrap_or_else(|_| Gitignore::empty())
}

fn is_ignored_directory_name(name: &str) -> bool {
	name.starts_with('.') || name == "node_modules" || name == "target"
}

/// Recursively collect files below `dir`.
///
/// `ancestors` holds the canonical paths of the directories currently being
/// walked. Re-entering one of them is a symlink cycle. Two links to the same
/// directory from different branches are walked twice.
fn walk_dir(
	dir: &Path,
	files: &mut Vec<PathBuf>,
	gitignore: &Gitignore,
	custom_exclude: &Gitignore,
	ancestors: &mut HashSet<PathBuf>,
) -> DistResult<()> {
	let canonical = dir.canonicalize().unwrap_or_else(|_| dir.to_path_buf());
	if !ancestors.insert(canonical.clone()) {
		return Err(DistError::SymlinkCycle {
			path: dir.display().to_string(),
		});
	}

	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		let is_dir = path.is_dir();

		if is_dir
			&& path
				.file_name()
				.and_then(|n| n.to_str())
				.is_some_and(is_ignored_directory_name)
		{
			continue;
		}

		if gitignore.matched(&path, is_dir).is_ignore()
			|| custom_exclude.matched(&path, is_dir).is_ignore()
		{
			continue;
		}

		if is_dir {
			walk_dir(&path, files, gitignore, custom_exclude, ancestors)?;
		} else if path.is_file() {
			files.push(path);
		}
	}

	ancestors.remove(&canonical);
	Ok(())
}
