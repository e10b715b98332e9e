// cache-utils command line.
// Inspects, prunes and clears cache snapshot files.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use cache_utils::cache::{self, Snapshot, paths};
use cache_utils::error::{CacheError, Result};
use cache_utils::logging;

#[derive(Parser, Debug)]
#[command(name = "cache-utils", version, about = "Inspect and maintain cache snapshots")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the entries of a snapshot file
    Inspect { path: PathBuf },
    /// Rewrite a snapshot file without its expired entries
    Prune { path: PathBuf },
    /// Delete the default snapshot for a tag
    Clear { tag: String },
    /// Print the cache and config locations
    Paths,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Inspect { path } => inspect(&path),
        Command::Prune { path } => prune(&path),
        Command::Clear { tag } => clear(&tag),
        Command::Paths => {
            print_path("cache", paths::cache_dir());
            print_path("snapshots", paths::snapshots_dir());
            print_path("config", paths::config_path());
            Ok(())
        }
    }
}

fn read_required(path: &Path) -> Result<Snapshot<serde_json::Value>> {
    cache::read_snapshot(path)?
        .ok_or_else(|| CacheError::Other(format!("No snapshot at {}", path.display())))
}

fn inspect(path: &Path) -> Result<()> {
    let snapshot = read_required(path)?;

    println!("tag:      {}", snapshot.tag);
    println!("saved at: {}", snapshot.saved_at.to_rfc3339());
    println!("entries:  {}", snapshot.items.len());

    for item in &snapshot.items {
        let status = match item.expire_in() {
            None => "never".to_string(),
            Some(_) if item.is_expired() => "expired".to_string(),
            Some(left) => format!("{}s", left.num_seconds()),
        };
        println!("  {:<32} {}", item.key, status);
    }

    Ok(())
}

fn prune(path: &Path) -> Result<()> {
    let mut snapshot = read_required(path)?;
    let dropped = snapshot.prune_expired();
    cache::write_snapshot(path, &snapshot)?;

    println!(
        "dropped {} expired entries, {} remain",
        dropped,
        snapshot.items.len()
    );
    Ok(())
}

fn clear(tag: &str) -> Result<()> {
    let path = paths::snapshot_path(tag)
        .ok_or_else(|| CacheError::Other("No cache directory available".to_string()))?;
    cache::delete_snapshot(&path)?;

    println!("cleared {}", path.display());
    Ok(())
}

fn print_path(label: &str, path: Option<PathBuf>) {
    match path {
        Some(path) => println!("{:<10} {}", label, path.display()),
        None => println!("{:<10} unavailable", label),
    }
}
