use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;

#[derive(Parser)]
#[command(
	author,
	version,
	about = "Aggregate template sources into a normalized distribution tree.",
	long_about = "yuzu-dist walks a template source root, classifies every file by block type and \
	              emits resolved data, patched schemas, schema path metadata, template markup and \
	              static markup under a single output root, plus a preview manifest.\n\nQuick \
	              start:\n  yuzu-dist build   Write the output tree\n  yuzu-dist check   Verify \
	              the output tree is up to date\n  yuzu-dist list    Show how each source file is \
	              classified"
)]
pub struct DistCli {
	#[command(subcommand)]
	pub command: Option<Commands>,

	/// Path to the project root directory.
	#[arg(long, short, global = true)]
	pub path: Option<PathBuf>,

	/// Enable verbose output.
	#[arg(long, short, global = true, default_value_t = false)]
	pub verbose: bool,

	/// Disable colored output.
	#[arg(long, global = true, default_value_t = false)]
	pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
	/// Run a build and write every asset below the project root.
	///
	/// Walks the configured source root, runs the data, schema, template and
	/// markup passes and writes the results under the output root. The
	/// preview manifest is written to its configured output path. Files
	/// whose content is already current are left untouched.
	Build {
		/// Print the assets that would be written, with their sizes, without
		/// touching the filesystem.
		#[arg(long, default_value_t = false)]
		dry_run: bool,

		/// Watch the source root and rebuild whenever a file changes.
		#[arg(long, default_value_t = false)]
		watch: bool,
	},
	/// Check that the output tree on disk matches a fresh build.
	///
	/// Exits with a non-zero status code if any asset is missing or stale,
	/// which makes it suitable for CI.
	Check {
		/// Show a unified diff for every stale asset.
		#[arg(long, default_value_t = false)]
		diff: bool,

		/// Output format for check results. Use `text` for human-readable
		/// output or `json` for programmatic consumption.
		#[arg(long, value_enum, default_value_t = OutputFormat::Text)]
		format: OutputFormat,
	},
	/// List every source file with its block type and the passes that pick
	/// it up.
	List,
	/// Print the preview manifest for a list of dependency paths.
	///
	/// Paths are taken from the arguments, or read one per line from stdin
	/// when none are given.
	Paths {
		/// Dependency paths to filter.
		files: Vec<PathBuf>,
	},
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
	/// Human-readable text output with colors and formatting.
	Text,
	/// JSON output for programmatic consumption. Each stale entry includes
	/// the asset path and whether it exists on disk.
	Json,
}
