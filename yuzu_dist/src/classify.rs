use std::path::Component;
use std::path::Path;
use std::path::PathBuf;

use crate::DistError;
use crate::DistResult;
use crate::config::DistConfig;
use crate::source_walker::normalize_relative;
use crate::source_walker::path_key;

/// The block type whose files are page blocks.
pub const PAGE_BLOCK_TYPE: &str = "pages";
/// Directory name that is reported as [`BLOCKS_BLOCK_TYPE`].
pub const DATA_STRUCTURES_DIRECTORY: &str = "_dataStructures";
/// Block type shared by reusable blocks and data structures.
pub const BLOCKS_BLOCK_TYPE: &str = "blocks";

/// The semantic category of a source file, derived from where it sits in the
/// source tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Classification {
	/// The block type tag, e.g. `pages` or `blocks`.
	pub block_type: String,
	/// Whether the file is a page block.
	pub is_page: bool,
}

impl Classification {
	fn from_segment(segment: &str) -> Self {
		let block_type = if segment == DATA_STRUCTURES_DIRECTORY {
			BLOCKS_BLOCK_TYPE
		} else {
			segment
		};

		Self {
			block_type: block_type.to_string(),
			is_page: block_type == PAGE_BLOCK_TYPE,
		}
	}
}

/// Maps source paths to their [`Classification`].
///
/// The block type is the first directory below the source root:
/// `_dev/_templates/blocks/button/button.schema` is a `blocks` file and
/// `_dev/_templates/pages/home.json` is a page block. Classification only
/// looks at the path string, so the same path always yields the same result.
#[derive(Debug, Clone)]
pub struct PathClassifier {
	root: PathBuf,
}

impl PathClassifier {
	pub fn new(source_root: impl AsRef<Path>) -> Self {
		Self {
			root: normalize_relative(source_root.as_ref()),
		}
	}

	pub fn from_config(config: &DistConfig) -> Self {
		Self::new(config.source_root())
	}

	/// The source root every classified path is measured against.
	pub fn root(&self) -> &Path {
		&self.root
	}

	/// Classify `path`.
	///
	/// Fails with [`DistError::Classification`] when the path is outside the
	/// source root or has no directory between the root and the file name.
	pub fn classify(&self, path: &Path) -> DistResult<Classification> {
		let relative = self.relative_path(path)?;
		let mut segments = relative.components().filter_map(|component| {
			match component {
				Component::Normal(segment) => segment.to_str(),
				_ => None,
			}
		});

		let (Some(block_type), Some(_file_name)) = (segments.next(), segments.next()) else {
			return Err(classification_error(path));
		};

		Ok(Classification::from_segment(block_type))
	}

	/// Shorthand for `classify(path)?.is_page`.
	pub fn is_page_block(&self, path: &Path) -> DistResult<bool> {
		Ok(self.classify(path)?.is_page)
	}

	/// `path` relative to the source root.
	pub fn relative_path(&self, path: &Path) -> DistResult<PathBuf> {
		normalize_relative(path)
			.strip_prefix(&self.root)
			.map(Path::to_path_buf)
			.map_err(|_| classification_error(path))
	}

	/// `path` relative to the source root, `/`-separated with a leading `/`.
	/// This is the form handed to the resolver's path metadata function.
	pub fn root_relative_key(&self, path: &Path) -> DistResult<String> {
		Ok(format!("/{}", path_key(&self.relative_path(path)?)))
	}
}

fn classification_error(path: &Path) -> DistError {
	DistError::Classification {
		path: path_key(path),
	}
}
