use std::path::Path;
use std::path::PathBuf;
use std::process;
use std::sync::mpsc;
use std::time::Duration;

use clap::Parser;
use owo_colors::OwoColorize;
use similar::ChangeTag;
use similar::TextDiff;
use tracing_subscriber::EnvFilter;
use yuzu_dist::BuildWarning;
use yuzu_dist::Compilation;
use yuzu_dist::DefinitionResolver;
use yuzu_dist::DistConfig;
use yuzu_dist::PathClassifier;
use yuzu_dist::SourcePatterns;
use yuzu_dist::TemplatePathExtractor;
use yuzu_dist::build_project;
use yuzu_dist::check_assets;
use yuzu_dist::format_json;
use yuzu_dist::path_key;
use yuzu_dist::walk_sources;
use yuzu_dist::write_assets;
use yuzu_dist_cli::Commands;
use yuzu_dist_cli::DistCli;
use yuzu_dist_cli::OutputFormat;

static USE_COLOR: std::sync::atomic::AtomicBool = std::sync::atomic::AtomicBool::new(true);

fn color_enabled() -> bool {
	USE_COLOR.load(std::sync::atomic::Ordering::Relaxed)
}

/// Apply ANSI color codes only when color is enabled.
macro_rules! colored {
	($text:expr,red) => {
		if color_enabled() {
			format!("{}", $text.red())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,green) => {
		if color_enabled() {
			format!("{}", $text.green())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,yellow) => {
		if color_enabled() {
			format!("{}", $text.yellow())
		} else {
			format!("{}", $text)
		}
	};
	($text:expr,bold) => {
		if color_enabled() {
			format!("{}", $text.bold())
		} else {
			format!("{}", $text)
		}
	};
}

fn main() {
	let args = DistCli::parse();

	// Respect NO_COLOR env var, --no-color and non-color terminals.
	let use_color = !args.no_color
		&& std::env::var_os("NO_COLOR").is_none()
		&& supports_color::on(supports_color::Stream::Stderr).is_some();
	if !use_color {
		USE_COLOR.store(false, std::sync::atomic::Ordering::Relaxed);
	}

	miette::set_hook(Box::new(move |_| {
		Box::new(
			miette::MietteHandlerOpts::new()
				.color(use_color)
				.unicode(use_color)
				.build(),
		)
	}))
	.ok();

	init_tracing(args.verbose, use_color);

	let result = match &args.command {
		Some(Commands::Build { dry_run, watch }) => run_build(&args, *dry_run, *watch),
		Some(Commands::Check { diff, format }) => run_check(&args, *diff, *format),
		Some(Commands::List) => run_list(&args),
		Some(Commands::Paths { files }) => run_paths(&args, files),
		None => {
			eprintln!("No subcommand specified. Run `yuzu-dist --help` for usage.");
			process::exit(1);
		}
	};

	if let Err(e) = result {
		match e.downcast::<yuzu_dist::DistError>() {
			Ok(dist_err) => {
				let report: miette::Report = (*dist_err).into();
				eprintln!("{report:?}");
			}
			Err(e) => {
				eprintln!("{} {e}", colored!("error:", red));
			}
		}
		process::exit(2);
	}
}

/// Library logs go to stderr. `RUST_LOG` takes precedence over `--verbose`.
fn init_tracing(verbose: bool, use_color: bool) {
	let default_directive = if verbose { "yuzu_dist=debug" } else { "error" };
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_ansi(use_color)
		.with_target(false)
		.try_init()
		.ok();
}

fn resolve_root(args: &DistCli) -> PathBuf {
	args.path
		.clone()
		.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Load the config and run one build cycle with the bundled resolver.
fn build_and_warn(args: &DistCli) -> Result<(PathBuf, Compilation), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DistConfig::load_or_default(&root)?;
	let compilation = build_project(&root, &config, &DefinitionResolver::new())?;

	print_build_warnings(compilation.warnings());

	Ok((root, compilation))
}

fn run_build(args: &DistCli, dry_run: bool, watch: bool) -> Result<(), Box<dyn std::error::Error>> {
	run_build_once(args, dry_run)?;

	if !watch || dry_run {
		return Ok(());
	}

	let root = resolve_root(args);
	let config = DistConfig::load_or_default(&root)?;
	let source_dir = root.join(config.source_root());
	println!(
		"\nWatching {} for changes... (press Ctrl+C to stop)",
		make_relative(&source_dir, &root)
	);

	let (tx, rx) = mpsc::channel();

	let mut watcher =
		notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
			if let Ok(event) = res {
				if matches!(
					event.kind,
					notify::EventKind::Modify(_)
						| notify::EventKind::Create(_)
						| notify::EventKind::Remove(_)
				) {
					let _ = tx.send(());
				}
			}
		})?;

	use notify::Watcher;
	watcher.watch(&source_dir, notify::RecursiveMode::Recursive)?;

	loop {
		rx.recv()?;
		// Debounce: drain additional events within 200ms.
		while rx.recv_timeout(Duration::from_millis(200)).is_ok() {}

		println!("\nFile change detected, rebuilding...");
		if let Err(e) = run_build_once(args, false) {
			eprintln!("{} {e}", colored!("error:", red));
		}
	}
}

fn run_build_once(args: &DistCli, dry_run: bool) -> Result<(), Box<dyn std::error::Error>> {
	let (root, compilation) = build_and_warn(args)?;

	if dry_run {
		println!("Dry run: would write {} asset(s):", compilation.len());
		for asset in compilation.assets() {
			println!("  {} ({} bytes)", asset.path, asset.size());
		}
		return Ok(());
	}

	let summary = write_assets(&root, &compilation)?;
	if summary.written.is_empty() {
		println!("All {} asset(s) are already up to date.", summary.unchanged);
		return Ok(());
	}

	println!(
		"Wrote {} asset(s), {} unchanged.",
		summary.written.len(),
		summary.unchanged
	);
	if args.verbose {
		for path in &summary.written {
			println!("  {path}");
		}
	}

	Ok(())
}

fn run_check(
	args: &DistCli,
	show_diff: bool,
	format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
	let (root, compilation) = build_and_warn(args)?;
	let result = check_assets(&root, &compilation)?;

	if result.is_ok() {
		match format {
			OutputFormat::Json => {
				println!("{{\"ok\":true,\"stale\":[]}}");
			}
			OutputFormat::Text => {
				println!(
					"Check passed: all {} asset(s) are up to date.",
					compilation.len()
				);
			}
		}
		return Ok(());
	}

	match format {
		OutputFormat::Json => {
			let stale_entries: Vec<serde_json::Value> = result
				.stale
				.iter()
				.map(|entry| {
					serde_json::json!({
						"path": entry.path,
						"exists": entry.current.is_some(),
					})
				})
				.collect();
			let output = serde_json::json!({
				"ok": false,
				"stale": stale_entries,
			});
			println!("{output}");
		}
		OutputFormat::Text => {
			eprintln!("Check failed.");
			eprintln!();
			eprintln!("Stale assets:");
			for entry in &result.stale {
				let status = if entry.current.is_some() {
					"changed"
				} else {
					"missing"
				};
				eprintln!("  {} [{status}]", entry.path);

				if show_diff {
					print_diff(entry.current.as_deref().unwrap_or_default(), &entry.expected);
				}
			}
			eprintln!();
			eprintln!(
				"{} asset(s) are out of date. Run `yuzu-dist build` to fix.",
				result.stale.len()
			);
		}
	}

	process::exit(1);
}

fn run_list(args: &DistCli) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DistConfig::load_or_default(&root)?;
	let tree = walk_sources(&root, &config)?;

	if tree.is_empty() {
		println!(
			"No source files found under {}.",
			config.source_root().display()
		);
		return Ok(());
	}

	let patterns = SourcePatterns::from_config(&config.sources)?;
	let classifier = PathClassifier::from_config(&config);

	println!("{}", colored!("Sources:", bold));
	for path in tree.iter() {
		let block_type = match classifier.classify(path) {
			Ok(classification) if classification.is_page => {
				format!("{} (page)", classification.block_type)
			}
			Ok(classification) => classification.block_type,
			Err(_) => colored!("no block type", yellow),
		};
		let passes = source_passes(&patterns, path);
		let passes = if passes.is_empty() {
			"-".to_string()
		} else {
			passes.join(", ")
		};
		println!("  {} [{block_type}] {passes}", path_key(path));
	}

	println!("\n{} source file(s)", tree.len());

	Ok(())
}

fn source_passes(patterns: &SourcePatterns, path: &Path) -> Vec<&'static str> {
	[
		(&patterns.data, "data"),
		(&patterns.schema, "schema"),
		(&patterns.template, "template"),
		(&patterns.markup, "markup"),
	]
	.into_iter()
	.filter(|(matcher, _)| matcher.is_match(path))
	.map(|(_, pass)| pass)
	.collect()
}

fn run_paths(args: &DistCli, files: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
	let root = resolve_root(args);
	let config = DistConfig::load_or_default(&root)?;

	let dependencies = if files.is_empty() {
		read_stdin_paths()?
	} else {
		files.to_vec()
	};

	let extractor = TemplatePathExtractor::new(&config.template_paths);
	let manifest = extractor.extract(&DefinitionResolver::new(), &dependencies)?;
	println!(
		"{}",
		format_json(&manifest, &config.template_paths.output_path)?
	);

	Ok(())
}

/// One path per non-empty line.
fn read_stdin_paths() -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
	let input = std::io::read_to_string(std::io::stdin())?;
	Ok(input
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(PathBuf::from)
		.collect())
}

fn print_build_warnings(warnings: &[BuildWarning]) {
	for warning in warnings {
		eprintln!("{} {}", colored!("warning:", yellow), warning.message());
	}
}

/// Print a unified diff between two strings, colorized.
fn print_diff(current: &str, expected: &str) {
	let diff = TextDiff::from_lines(current, expected);
	for change in diff.iter_all_changes() {
		match change.tag() {
			ChangeTag::Delete => {
				eprint!("  {}", colored!(format!("-{change}"), red));
			}
			ChangeTag::Insert => {
				eprint!("  {}", colored!(format!("+{change}"), green));
			}
			ChangeTag::Equal => {
				eprint!("   {change}");
			}
		}
	}
}

/// Make a path relative to root for display purposes.
fn make_relative(path: &Path, root: &Path) -> String {
	path.strip_prefix(root)
		.unwrap_or(path)
		.display()
		.to_string()
}
