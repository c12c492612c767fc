use miette::Diagnostic;
use thiserror::Error;

/// Error returned by a [`TemplateResolver`](crate::TemplateResolver) when it
/// rejects the content it was asked to resolve.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct ResolveError(pub String);

impl ResolveError {
	pub fn new(message: impl Into<String>) -> Self {
		Self(message.into())
	}
}

#[derive(Debug, Diagnostic, Error)]
#[non_exhaustive]
pub enum DistError {
	#[error(transparent)]
	#[diagnostic(code(yuzu::io_error))]
	Io(#[from] std::io::Error),

	#[error("failed to parse config file: {0}")]
	#[diagnostic(
		code(yuzu::config_parse),
		help("check that yuzu.toml is valid TOML with [sources] and/or [template_paths] sections")
	)]
	ConfigParse(String),

	#[error("invalid glob pattern for `{key}`: `{pattern}` ({reason})")]
	#[diagnostic(code(yuzu::invalid_glob))]
	InvalidGlob {
		key: String,
		pattern: String,
		reason: String,
	},

	#[error("cannot derive a block type from `{path}`")]
	#[diagnostic(
		code(yuzu::classification),
		help("source files must live in a block type directory below the source root, e.g. `<root>/blocks/button.schema`")
	)]
	Classification { path: String },

	#[error("failed to read source file `{path}`: {reason}")]
	#[diagnostic(code(yuzu::source_read))]
	SourceRead { path: String, reason: String },

	#[error("failed to resolve `{path}`: {reason}")]
	#[diagnostic(code(yuzu::resolution))]
	Resolution { path: String, reason: String },

	#[error("failed to serialize `{path}`: {reason}")]
	#[diagnostic(code(yuzu::serialize))]
	Serialize { path: String, reason: String },

	#[error("symlink cycle detected at: `{path}`")]
	#[diagnostic(
		code(yuzu::symlink_cycle),
		help("remove the circular symlink or exclude this path")
	)]
	SymlinkCycle { path: String },
}

pub type DistResult<T> = Result<T, DistError>;
pub type AnyError = Box<dyn std::error::Error>;
pub type AnyEmptyResult = Result<(), AnyError>;
pub type AnyResult<T> = Result<T, AnyError>;
