use std::path::Path;
use std::path::PathBuf;

use globset::GlobBuilder;
use globset::GlobMatcher;
use serde::Deserialize;

use crate::DistError;
use crate::DistResult;
use crate::externals::ReservedSchemaProperty;
use crate::externals::default_reserved_properties;
use crate::source_walker::normalize_relative;

/// Supported config file locations in discovery order (highest precedence
/// first).
pub const CONFIG_FILE_CANDIDATES: [&str; 3] = ["yuzu.toml", ".yuzu.toml", ".config/yuzu.toml"];

/// Configuration loaded from a `yuzu.toml` file.
///
/// Every key is optional. Missing keys fall back to the conventional
/// `_dev/_templates` layout:
///
/// ```toml
/// output_root = "_templates"
///
/// [sources]
/// root = "_dev/_templates"
/// data = "_dev/_templates/**/*.json"
/// schema = "_dev/_templates/**/*.schema"
/// template = "_dev/_templates/**/*.hbs"
/// markup = "_dev/_templates/**/*.html"
/// layouts_directory = "_dev/_templates/_layouts"
/// rendered_partial_directories = ["_dev/_templates/blocks", "_dev/_templates/_dataStructures"]
///
/// [[auto_schema_properties]]
/// name = "_ref"
/// schema = { type = "string" }
///
/// [template_paths]
/// templates_folder_name = "_templates"
/// output_path = "_client/templatePaths.json"
/// root_path = "yuzu.html"
///
/// [exclude]
/// patterns = ["_dev/_templates/_drafts/"]
/// ```
///
/// The value is built once per process and shared by reference; nothing
/// mutates it after loading.
#[derive(Debug, Clone, Deserialize)]
pub struct DistConfig {
	/// Directory (relative to the project root) that receives every emitted
	/// asset except the preview manifest.
	#[serde(default = "default_output_root")]
	pub output_root: String,
	/// Where the authoring files live and which globs select each pass.
	#[serde(default)]
	pub sources: SourcesConfig,
	/// Properties the resolver adds automatically to referenced object
	/// schemas. Defaults to `_ref` and `_modifiers`, both plain strings.
	#[serde(default = "default_reserved_properties")]
	pub auto_schema_properties: Vec<ReservedSchemaProperty>,
	/// Preview manifest settings.
	#[serde(default)]
	pub template_paths: TemplatePathsConfig,
	/// Exclusion configuration applied while walking the source root.
	#[serde(default)]
	pub exclude: ExcludeConfig,
}

impl Default for DistConfig {
	fn default() -> Self {
		Self {
			output_root: default_output_root(),
			sources: SourcesConfig::default(),
			auto_schema_properties: default_reserved_properties(),
			template_paths: TemplatePathsConfig::default(),
			exclude: ExcludeConfig::default(),
		}
	}
}

/// The `[sources]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
	/// Template source root. Block types are derived from the first directory
	/// below it.
	#[serde(default = "default_source_root")]
	pub root: PathBuf,
	/// Glob selecting structured data files.
	#[serde(default = "default_data_glob")]
	pub data: String,
	/// Glob selecting schema descriptors.
	#[serde(default = "default_schema_glob")]
	pub schema: String,
	/// Glob selecting template markup.
	#[serde(default = "default_template_glob", alias = "hbs")]
	pub template: String,
	/// Glob selecting static markup.
	#[serde(default = "default_markup_glob")]
	pub markup: String,
	/// Directory holding page layouts.
	#[serde(default = "default_layouts_directory")]
	pub layouts_directory: PathBuf,
	/// Directories whose files are treated as pre-rendered partials, in
	/// lookup order.
	#[serde(default = "default_rendered_partial_directories")]
	pub rendered_partial_directories: Vec<PathBuf>,
}

impl Default for SourcesConfig {
	fn default() -> Self {
		Self {
			root: default_source_root(),
			data: default_data_glob(),
			schema: default_schema_glob(),
			template: default_template_glob(),
			markup: default_markup_glob(),
			layouts_directory: default_layouts_directory(),
			rendered_partial_directories: default_rendered_partial_directories(),
		}
	}
}

/// The `[template_paths]` section controlling the preview manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatePathsConfig {
	/// Substring a dependency path must contain to be considered a template.
	#[serde(default = "default_templates_folder_name")]
	pub templates_folder_name: String,
	/// Asset key the manifest is emitted under.
	#[serde(default = "default_manifest_output_path")]
	pub output_path: String,
	/// Identifier of the page that hosts the previews.
	#[serde(default = "default_root_path")]
	pub root_path: String,
}

impl Default for TemplatePathsConfig {
	fn default() -> Self {
		Self {
			templates_folder_name: default_templates_folder_name(),
			output_path: default_manifest_output_path(),
			root_path: default_root_path(),
		}
	}
}

/// Configuration for excluding files and directories while walking the
/// source root.
///
/// Patterns follow gitignore syntax and are applied on top of any
/// `.gitignore` rules (unless `disable_gitignore` is set).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExcludeConfig {
	/// Gitignore-style patterns relative to the project root.
	#[serde(default)]
	pub patterns: Vec<String>,
	/// When true, the project's `.gitignore` is not consulted.
	#[serde(default)]
	pub disable_gitignore: bool,
}

fn default_output_root() -> String {
	"_templates".to_string()
}

fn default_source_root() -> PathBuf {
	PathBuf::from("_dev/_templates")
}

fn default_data_glob() -> String {
	"_dev/_templates/**/*.json".to_string()
}

fn default_schema_glob() -> String {
	"_dev/_templates/**/*.schema".to_string()
}

fn default_template_glob() -> String {
	"_dev/_templates/**/*.hbs".to_string()
}

fn default_markup_glob() -> String {
	"_dev/_templates/**/*.html".to_string()
}

fn default_layouts_directory() -> PathBuf {
	PathBuf::from("_dev/_templates/_layouts")
}

fn default_rendered_partial_directories() -> Vec<PathBuf> {
	vec![
		PathBuf::from("_dev/_templates/blocks"),
		PathBuf::from("_dev/_templates/_dataStructures"),
	]
}

fn default_templates_folder_name() -> String {
	"_templates".to_string()
}

fn default_manifest_output_path() -> String {
	"_client/templatePaths.json".to_string()
}

fn default_root_path() -> String {
	"yuzu.html".to_string()
}

impl DistConfig {
	/// Resolve the config path from known discovery candidates.
	#[must_use]
	pub fn resolve_path(root: &Path) -> Option<PathBuf> {
		CONFIG_FILE_CANDIDATES
			.iter()
			.map(|candidate| root.join(candidate))
			.find(|path| path.is_file())
	}

	/// Load the config from the first discovered config file at `root`.
	/// Returns `None` if no config file exists.
	pub fn load(root: &Path) -> DistResult<Option<DistConfig>> {
		let Some(config_path) = Self::resolve_path(root) else {
			return Ok(None);
		};

		let content = std::fs::read_to_string(&config_path)?;
		let config = Self::from_toml(&content)?;

		Ok(Some(config))
	}

	/// Load the discovered config, falling back to defaults when the project
	/// has none.
	pub fn load_or_default(root: &Path) -> DistResult<DistConfig> {
		Ok(Self::load(root)?.unwrap_or_default())
	}

	/// Parse a config from TOML text.
	pub fn from_toml(content: &str) -> DistResult<DistConfig> {
		toml::from_str(content).map_err(|e| DistError::ConfigParse(e.to_string()))
	}

	/// The output root without trailing separators, used as the prefix of
	/// every emitted asset key.
	pub fn output_prefix(&self) -> &str {
		let trimmed = self.output_root.trim_end_matches('/');
		trimmed.strip_prefix("./").unwrap_or(trimmed)
	}

	/// The source root with any leading `./` removed.
	pub fn source_root(&self) -> PathBuf {
		normalize_relative(&self.sources.root)
	}
}

/// The four per-pass glob matchers compiled from `[sources]`.
#[derive(Debug, Clone)]
pub struct SourcePatterns {
	pub data: GlobMatcher,
	pub schema: GlobMatcher,
	pub template: GlobMatcher,
	pub markup: GlobMatcher,
}

impl SourcePatterns {
	/// Compile the pass globs. Patterns are matched against project-relative
	/// paths, so a leading `./` is dropped.
	pub fn from_config(sources: &SourcesConfig) -> DistResult<Self> {
		Ok(Self {
			data: compile_glob("sources.data", &sources.data)?,
			schema: compile_glob("sources.schema", &sources.schema)?,
			template: compile_glob("sources.template", &sources.template)?,
			markup: compile_glob("sources.markup", &sources.markup)?,
		})
	}
}

fn compile_glob(key: &str, pattern: &str) -> DistResult<GlobMatcher> {
	let normalized = pattern.strip_prefix("./").unwrap_or(pattern);
	// `*` stays within one path segment; only `**` crosses directories.
	let glob = GlobBuilder::new(normalized)
		.literal_separator(true)
		.build()
		.map_err(|e| {
			DistError::InvalidGlob {
				key: key.to_string(),
				pattern: pattern.to_string(),
				reason: e.kind().to_string(),
			}
		})?;

	Ok(glob.compile_matcher())
}
