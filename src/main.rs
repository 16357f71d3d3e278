//! CLI entry point for ddiff

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};
use ddiff::{
    DiffEngine, DiffError, DiffFormatter, EngineConfig, OutputConfig, Status, StatusCounts,
    print_json,
};
use tracing_subscriber::EnvFilter;

/// Color output mode
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum ColorMode {
    /// Auto-detect based on terminal and environment
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Determine whether to use color output based on mode and environment.
fn should_use_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            // Respect NO_COLOR environment variable (https://no-color.org/)
            if std::env::var_os("NO_COLOR").is_some() {
                return false;
            }
            // Respect FORCE_COLOR environment variable
            if std::env::var_os("FORCE_COLOR").is_some() {
                return true;
            }
            // Respect TERM=dumb
            if std::env::var("TERM").map(|t| t == "dumb").unwrap_or(false) {
                return false;
            }
            // Check if stdout is a TTY
            std::io::stdout().is_terminal()
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ddiff")]
#[command(about = "Compare two directory trees entry by entry")]
#[command(version)]
struct Args {
    /// Left directory root
    left: PathBuf,

    /// Right directory root
    right: PathBuf,

    /// Relative path under both roots whose children are compared
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Ignore names matching regex, anchored at the start
    /// (can be used multiple times)
    #[arg(short = 'x', long = "exclude", value_name = "REGEX")]
    exclude: Vec<String>,

    /// Descend into paired subdirectories of the same kind, printing nested
    /// entries (a subkind mismatch, e.g. sticky vs plain, is reported as
    /// different without descending)
    #[arg(short = 'r', long = "recursive", conflicts_with = "json")]
    recursive: bool,

    /// Report only the rolled-up status of the two directories
    #[arg(short = 'q', long = "brief", conflicts_with_all = ["recursive", "json"])]
    brief: bool,

    /// Output in JSON format
    #[arg(long = "json")]
    json: bool,

    /// Control color output: auto, always, never
    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    color: ColorMode,

    /// Number of parallel workers for directory recursion
    /// (0 = auto-detect, 1 = sequential, N = use N workers)
    #[arg(short = 'j', long = "jobs", default_value = "0")]
    jobs: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("DDIFF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let engine = match DiffEngine::new(EngineConfig {
        exclude_patterns: args.exclude.clone(),
        parallel_workers: args.jobs,
    }) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("ddiff: {}", e);
            process::exit(2);
        }
    };

    match run(&engine, &args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("ddiff: {}", e);
            process::exit(2);
        }
    }
}

enum RunError {
    Diff(DiffError),
    Io(std::io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Diff(e) => e.fmt(f),
            RunError::Io(e) => write!(f, "error writing output: {}", e),
        }
    }
}

impl From<DiffError> for RunError {
    fn from(e: DiffError) -> Self {
        RunError::Diff(e)
    }
}

impl From<std::io::Error> for RunError {
    fn from(e: std::io::Error) -> Self {
        RunError::Io(e)
    }
}

/// Run the comparison. Returns Ok(true) when everything matched.
fn run(engine: &DiffEngine, args: &Args) -> Result<bool, RunError> {
    let left_dir = args.left.join(&args.path);
    let right_dir = args.right.join(&args.path);

    if args.brief {
        let status = engine.diff_dir(&left_dir, &right_dir)?;
        match status {
            Status::Matching => println!("directories match"),
            Status::Different => println!(
                "directories {} and {} differ",
                left_dir.display(),
                right_dir.display()
            ),
            _ => println!(
                "directories {} and {} cannot be fully compared",
                left_dir.display(),
                right_dir.display()
            ),
        }
        return Ok(status == Status::Matching);
    }

    if args.json {
        let entries = engine.entries(&args.left, &args.right, &args.path)?;
        let all_matching = entries.iter().all(|e| e.status == Status::Matching);
        print_json(&entries)?;
        return Ok(all_matching);
    }

    let formatter = DiffFormatter::new(OutputConfig {
        use_color: should_use_color(args.color),
    });
    let mut out = formatter.stdout();
    let mut counts = StatusCounts::default();
    print_level(
        engine,
        &formatter,
        &mut out,
        &left_dir,
        &right_dir,
        0,
        args.recursive,
        &mut counts,
    )?;
    use std::io::Write;
    writeln!(out)?;
    writeln!(out, "{}", counts.summary())?;
    Ok(counts.all_matching())
}

/// Print one directory level, recursing into paired subdirectories when
/// requested.
#[allow(clippy::too_many_arguments)]
fn print_level(
    engine: &DiffEngine,
    formatter: &DiffFormatter,
    out: &mut termcolor::StandardStream,
    left_dir: &Path,
    right_dir: &Path,
    depth: usize,
    recursive: bool,
    counts: &mut StatusCounts,
) -> Result<(), RunError> {
    for entry in engine.entries_at(left_dir, right_dir)? {
        formatter.print_entry(out, &entry, depth)?;
        counts.record(entry.status);
        // A directory-subkind mismatch (sticky vs plain) is Different by
        // type alone; the children never informed that status, so do not
        // imply otherwise by listing them.
        if recursive && entry.left == entry.right && entry.left.is_directory_kind() {
            print_level(
                engine,
                formatter,
                out,
                &left_dir.join(&entry.name),
                &right_dir.join(&entry.name),
                depth + 1,
                recursive,
                counts,
            )?;
        }
    }
    Ok(())
}
