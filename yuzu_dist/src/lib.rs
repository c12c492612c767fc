//! `yuzu_dist` compiles a tree of template authoring files (JSON data, schema
//! descriptors, template markup and static markup) into the normalized output
//! tree consumed by the rendering runtime. Content resolution itself is
//! delegated to a [`TemplateResolver`]; this crate decides which files are
//! read, what block type they belong to, how schemas are patched and where
//! every result lands.
//!
//! ## Processing Pipeline
//!
//! ```text
//! Source root
//!   → Source walker (one sorted walk per build, honouring .gitignore and [exclude])
//!   → Externals context (built once from partial dirs, layouts and auto schema properties)
//!   → Data pass      (page blocks only)        → <output>/data/<file>
//!   → Schema pass    (+ reserved properties)   → <output>/schema/<blockType>/<file> and .meta
//!   → Template pass  (verbatim)                → <output>/src/<blockType>/<file>
//!   → Markup pass    (verbatim)                → <output>/markup$/<blockType>/<file>
//!   → Template paths (preview manifest from the dependency list)
//! ```
//!
//! ## Modules
//!
//! - [`config`]: `yuzu.toml` discovery and the immutable [`DistConfig`].
//! - [`classify`]: block type classification relative to the source root.
//! - [`aggregator`]: the four passes and the output path convention.
//! - [`schema`]: reserved property patch for block schemas.
//! - [`resolver`]: the [`TemplateResolver`] seam and the bundled
//!   [`DefinitionResolver`].
//! - [`template_paths`]: preview manifest extraction.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use yuzu_dist::DefinitionResolver;
//! use yuzu_dist::DistConfig;
//! use yuzu_dist::build_project;
//! use yuzu_dist::write_assets;
//!
//! let root = Path::new(".");
//! let config = DistConfig::load_or_default(root).unwrap();
//! let compilation = build_project(root, &config, &DefinitionResolver::new()).unwrap();
//!
//! for warning in compilation.warnings() {
//!     eprintln!("warning: {}", warning.message());
//! }
//!
//! write_assets(root, &compilation).unwrap();
//! ```

pub use aggregator::*;
pub use build::*;
pub use classify::*;
pub use compilation::*;
pub use config::*;
pub use error::*;
pub use externals::*;
pub use resolver::*;
pub use source_walker::*;
pub use template_paths::*;

pub mod aggregator;
mod build;
pub mod classify;
mod compilation;
pub mod config;
#[allow(unused_assignments)]
mod error;
mod externals;
pub mod resolver;
pub mod schema;
pub mod source_walker;
pub mod template_paths;

#[cfg(test)]
mod __fixtures;
