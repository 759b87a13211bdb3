use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Generates a CSV of allocation data from Windows file systems.
#[derive(Parser, Debug)]
#[command(name = "freespace", version, about)]
struct Cli {
    /// Directory tree to read. Defaults to the root of the drive hosting
    /// this program.
    #[arg(long, short)]
    include: Option<PathBuf>,

    /// Path to the output CSV. Defaults to a temporary location.
    #[arg(long, short)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let output = cli
        .output
        .unwrap_or_else(|| std::env::temp_dir().join("freespace").join("data.csv"));
    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {}", parent.display()))?;
    }

    let include = match cli.include {
        Some(path) => path,
        None => default_include()?,
    };
    anyhow::ensure!(
        include.is_dir(),
        "directory for --include/-i does not exist: {}",
        include.display()
    );
    let root = include
        .to_str()
        .context("--include path is not valid UTF-8")?;

    println!("Include:");
    println!(" {}", include.display());
    println!("Output:");
    println!(" {}", output.display());

    run(root, &output)
}

/// Root of the drive hosting this executable.
fn default_include() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("no --include provided and the program location is unknown")?;
    let root = exe
        .ancestors()
        .last()
        .context("no --include provided and the program location has no root")?;
    Ok(root.to_path_buf())
}

#[cfg(windows)]
fn run(root: &str, output: &std::path::Path) -> Result<()> {
    use std::time::Instant;

    let started = Instant::now();
    let stats = freespace_core::scan_to_csv(&freespace_core::WindowsSource, root, output)?;

    println!(
        "Completed {} rows ({} directories, {} skipped) in {:?}",
        stats.entries,
        stats.directories,
        stats.failed_directories,
        started.elapsed()
    );
    Ok(())
}

#[cfg(not(windows))]
fn run(_root: &str, _output: &std::path::Path) -> Result<()> {
    anyhow::bail!("the native directory-metadata source is Windows-only on this build")
}
