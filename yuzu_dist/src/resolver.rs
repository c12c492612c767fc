use std::collections::BTreeMap;
use std::path::Path;
use std::path::PathBuf;

use serde_json::Map;
use serde_json::Value;

use crate::ResolveError;
use crate::classify::PAGE_BLOCK_TYPE;
use crate::externals::ExternalsSetup;
use crate::externals::ReservedSchemaProperty;

/// Key marking a reference to a partial in data and schema documents.
pub const REF_KEY: &str = "$ref";
/// Key a page's data uses to name its layout.
pub const LAYOUT_KEY: &str = "_layout";

/// Resolves template content for the aggregator.
///
/// Implementations own content resolution entirely: the aggregator only
/// reads files, hands their text over, and lays out what comes back. Every
/// method must be deterministic for identical inputs.
pub trait TemplateResolver {
	/// Shared, read-only state built once per build cycle.
	type Context;

	/// Build the context from partial directories, the layouts directory and
	/// the auto schema properties.
	fn setup(&self, setup: &ExternalsSetup) -> Result<Self::Context, ResolveError>;

	/// Resolve a data file's contents into its final JSON value.
	fn resolve_data_string(
		&self,
		contents: &str,
		file_path: &Path,
		context: &Self::Context,
		modifiers: &[String],
	) -> Result<Value, ResolveError>;

	/// Resolve a schema descriptor into a JSON schema document.
	fn resolve_schema(&self, contents: &str, context: &Self::Context) -> Result<Value, ResolveError>;

	/// Compute path metadata for a schema descriptor. `relative_path` is the
	/// file's path below the source root with a leading `/`.
	fn resolve_paths(
		&self,
		contents: &str,
		context: &Self::Context,
		relative_path: &str,
	) -> Result<Value, ResolveError>;

	/// Build the preview manifest from page data dependencies.
	fn get_previews(
		&self,
		dependency_paths: &[PathBuf],
		root_page: &str,
	) -> Result<Value, ResolveError>;
}

/// Partials, layouts and auto schema properties loaded by
/// [`DefinitionResolver::setup`].
#[derive(Debug, Clone, Default)]
pub struct ExternalsContext {
	data_partials: BTreeMap<String, Value>,
	schema_partials: BTreeMap<String, Value>,
	layouts: Vec<String>,
	reserved_properties: Vec<ReservedSchemaProperty>,
}

impl ExternalsContext {
	pub fn data_partial(&self, name: &str) -> Option<&Value> {
		self.data_partials.get(name)
	}

	pub fn schema_partial(&self, name: &str) -> Option<&Value> {
		self.schema_partials.get(name)
	}

	pub fn layouts(&self) -> &[String] {
		&self.layouts
	}

	pub fn reserved_properties(&self) -> &[ReservedSchemaProperty] {
		&self.reserved_properties
	}
}

/// The bundled resolver for JSON data and schema definitions.
///
/// - Any object carrying `"$ref": "name"` is replaced by the partial `name`
///   (a `name.json` or `name.schema` file in one of the partial directories).
///   Sibling keys of the reference are laid over the partial.
/// - Resolved data references gain a `_ref` key naming the partial.
/// - Referenced object schemas gain every auto schema property they do not
///   already declare.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefinitionResolver;

impl DefinitionResolver {
	pub fn new() -> Self {
		Self
	}
}

impl TemplateResolver for DefinitionResolver {
	type Context = ExternalsContext;

	fn setup(&self, setup: &ExternalsSetup) -> Result<ExternalsContext, ResolveError> {
		let mut context = ExternalsContext {
			reserved_properties: setup.reserved_properties.clone(),
			..ExternalsContext::default()
		};

		for dir in &setup.partial_dirs {
			for file in list_files(dir)? {
				let Some(name) = file_stem(&file) else {
					continue;
				};
				let target = match file.extension().and_then(|ext| ext.to_str()) {
					Some("json") => &mut context.data_partials,
					Some("schema") => &mut context.schema_partials,
					_ => continue,
				};
				// Earlier directories take precedence.
				if target.contains_key(&name) {
					continue;
				}
				let contents = std::fs::read_to_string(&file)
					.map_err(|e| ResolveError::new(format!("{}: {e}", file.display())))?;
				let value = parse_json(&contents, &file)?;
				target.insert(name, value);
			}
		}

		context.layouts = list_files(&setup.layouts_dir)?
			.iter()
			.filter_map(|file| file_stem(file))
			.collect();

		Ok(context)
	}

	fn resolve_data_string(
		&self,
		contents: &str,
		file_path: &Path,
		context: &ExternalsContext,
		modifiers: &[String],
	) -> Result<Value, ResolveError> {
		let value = parse_json(contents, file_path)?;
		let mut resolved = resolve_data_refs(value, context, &mut Vec::new())?;

		if let Value::Object(map) = &mut resolved {
			if let Some(layout) = map.get(LAYOUT_KEY).and_then(Value::as_str) {
				if !context.layouts.iter().any(|name| name == layout) {
					return Err(ResolveError::new(format!("unknown layout `{layout}`")));
				}
			}

			if !modifiers.is_empty() {
				map.insert(
					"_modifiers".to_string(),
					Value::Array(modifiers.iter().cloned().map(Value::String).collect()),
				);
			}
		}

		Ok(resolved)
	}

	fn resolve_schema(
		&self,
		contents: &str,
		context: &ExternalsContext,
	) -> Result<Value, ResolveError> {
		let value = parse_json(contents, Path::new("schema"))?;
		resolve_schema_refs(value, context, &mut Vec::new())
	}

	fn resolve_paths(
		&self,
		contents: &str,
		context: &ExternalsContext,
		relative_path: &str,
	) -> Result<Value, ResolveError> {
		let value = parse_json(contents, Path::new(relative_path))?;
		let mut refs = Map::new();
		collect_refs(&value, "", &mut refs);

		for name in refs.values().filter_map(Value::as_str) {
			if context.schema_partial(name).is_none() {
				return Err(ResolveError::new(format!("unknown schema partial `{name}`")));
			}
		}

		let mut meta = Map::new();
		meta.insert("path".to_string(), Value::String(relative_path.to_string()));
		meta.insert("refs".to_string(), Value::Object(refs));
		Ok(Value::Object(meta))
	}

	fn get_previews(
		&self,
		dependency_paths: &[PathBuf],
		root_page: &str,
	) -> Result<Value, ResolveError> {
		let root_page = root_page.trim_start_matches('/');
		let previews = dependency_paths
			.iter()
			.filter(|path| {
				path.components()
					.any(|component| component.as_os_str() == PAGE_BLOCK_TYPE)
			})
			.filter_map(|path| file_stem(path))
			.map(|name| {
				let mut preview = Map::new();
				preview.insert("name".to_string(), Value::String(name.clone()));
				preview.insert(
					"url".to_string(),
					Value::String(format!("/{root_page}#/{name}")),
				);
				Value::Object(preview)
			})
			.collect();

		Ok(Value::Array(previews))
	}
}

fn parse_json(contents: &str, path: &Path) -> Result<Value, ResolveError> {
	serde_json::from_str(contents)
		.map_err(|e| ResolveError::new(format!("invalid JSON in `{}`: {e}", path.display())))
}

fn file_stem(path: &Path) -> Option<String> {
	path.file_stem()
		.and_then(|stem| stem.to_str())
		.map(ToString::to_string)
}

/// All files below `dir`, sorted. A missing directory has no files.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, ResolveError> {
	let mut files = Vec::new();
	if dir.is_dir() {
		collect_files(dir, &mut files)
			.map_err(|e| ResolveError::new(format!("{}: {e}", dir.display())))?;
	}
	files.sort();
	Ok(files)
}

fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
	for entry in std::fs::read_dir(dir)? {
		let path = entry?.path();
		if path.is_dir() {
			collect_files(&path, files)?;
		} else {
			files.push(path);
		}
	}
	Ok(())
}

/// `"/button"` and `"button"` both name the partial `button`.
fn ref_name(value: &Value) -> Option<&str> {
	value.as_str().map(|name| name.trim_start_matches('/'))
}

fn enter_ref(name: &str, stack: &mut Vec<String>) -> Result<(), ResolveError> {
	if stack.iter().any(|entry| entry == name) {
		stack.push(name.to_string());
		return Err(ResolveError::new(format!(
			"reference cycle: {}",
			stack.join(" -> ")
		)));
	}
	stack.push(name.to_string());
	Ok(())
}

fn resolve_data_refs(
	value: Value,
	context: &ExternalsContext,
	stack: &mut Vec<String>,
) -> Result<Value, ResolveError> {
	match value {
		Value::Object(map) => {
			let Some(name) = map.get(REF_KEY).and_then(ref_name).map(ToString::to_string) else {
				return map
					.into_iter()
					.map(|(key, value)| Ok((key, resolve_data_refs(value, context, stack)?)))
					.collect::<Result<Map<String, Value>, ResolveError>>()
					.map(Value::Object);
			};

			let partial = context
				.data_partial(&name)
				.cloned()
				.ok_or_else(|| ResolveError::new(format!("unknown data partial `{name}`")))?;
			enter_ref(&name, stack)?;
			let resolved = resolve_data_refs(partial, context, stack)?;
			stack.pop();

			let Value::Object(mut merged) = resolved else {
				return Ok(resolved);
			};
			for (key, value) in map {
				if key == REF_KEY {
					continue;
				}
				merged.insert(key, resolve_data_refs(value, context, stack)?);
			}
			merged.insert("_ref".to_string(), Value::String(name));

			Ok(Value::Object(merged))
		}
		Value::Array(items) => {
			items
				.into_iter()
				.map(|item| resolve_data_refs(item, context, stack))
				.collect::<Result<Vec<Value>, ResolveError>>()
				.map(Value::Array)
		}
		other => Ok(other),
	}
}

fn resolve_schema_refs(
	value: Value,
	context: &ExternalsContext,
	stack: &mut Vec<String>,
) -> Result<Value, ResolveError> {
	match value {
		Value::Object(map) => {
			let Some(name) = map.get(REF_KEY).and_then(ref_name).map(ToString::to_string) else {
				return map
					.into_iter()
					.map(|(key, value)| Ok((key, resolve_schema_refs(value, context, stack)?)))
					.collect::<Result<Map<String, Value>, ResolveError>>()
					.map(Value::Object);
			};

			let partial = context
				.schema_partial(&name)
				.cloned()
				.ok_or_else(|| ResolveError::new(format!("unknown schema partial `{name}`")))?;
			enter_ref(&name, stack)?;
			let resolved = resolve_schema_refs(partial, context, stack)?;
			stack.pop();

			let Value::Object(mut merged) = resolved else {
				return Ok(resolved);
			};
			for (key, value) in map {
				if key == REF_KEY {
					continue;
				}
				merged.insert(key, resolve_schema_refs(value, context, stack)?);
			}
			add_reserved_properties(&mut merged, &context.reserved_properties);

			Ok(Value::Object(merged))
		}
		Value::Array(items) => {
			items
				.into_iter()
				.map(|item| resolve_schema_refs(item, context, stack))
				.collect::<Result<Vec<Value>, ResolveError>>()
				.map(Value::Array)
		}
		other => Ok(other),
	}
}

/// Add auto properties to an object schema without touching properties it
/// already declares.
fn add_reserved_properties(schema: &mut Map<String, Value>, reserved: &[ReservedSchemaProperty]) {
	if schema.get("type").and_then(Value::as_str) != Some("object") {
		return;
	}
	let Some(Value::Object(properties)) = schema.get_mut("properties") else {
		return;
	};

	for property in reserved {
		properties
			.entry(property.name.clone())
			.or_insert_with(|| property.schema.clone());
	}
}

/// Record every `$ref` below `value` keyed by its JSON pointer. A `$ref` on
/// the document itself is keyed by the empty pointer.
fn collect_refs(value: &Value, pointer: &str, refs: &mut Map<String, Value>) {
	match value {
		Value::Object(map) => {
			if let Some(name) = map.get(REF_KEY).and_then(ref_name) {
				refs.insert(pointer.to_string(), Value::String(name.to_string()));
			}
			for (key, child) in map {
				let escaped = key.replace('~', "~0").replace('/', "~1");
				collect_refs(child, &format!("{pointer}/{escaped}"), refs);
			}
		}
		Value::Array(items) => {
			for (index, child) in items.iter().enumerate() {
				collect_refs(child, &format!("{pointer}/{index}"), refs);
			}
		}
		_ => {}
	}
}
