//! CLI binary for lineage: an interactive family-tree console plus a few
//! one-shot queries against saved snapshots.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use lineage_cli::console::Console;
use lineage_cli::render;
use lineage_cli::shell::{self, Shell};
use lineage_core::config::LineageConfig;
use lineage_core::lineage::Lineage;
use lineage_core::person::PersonId;
use lineage_core::session::Session;
use lineage_core::storage;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "lineage", about = "Personal genealogy console")]
struct Cli {
    /// Data directory for snapshots and config.toml (defaults to $LINEAGE_HOME or ~/.lineage)
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive console (default)
    Shell {
        /// Load this snapshot instead of asking
        #[arg(long)]
        load: Option<PathBuf>,

        /// Load the newest snapshot in the data directory
        #[arg(long, conflicts_with = "load")]
        latest: bool,

        /// Start with an empty lineage without asking
        #[arg(long, conflicts_with_all = ["load", "latest"])]
        new: bool,
    },

    /// List saved snapshots, newest first
    Snapshots {
        /// List autosave snapshots instead
        #[arg(long)]
        autosave: bool,
    },

    /// Show a person from a snapshot by ID or name
    Show {
        /// Person ID (e.g. 3 or P3) or part of a name
        query: String,

        /// Snapshot to read (defaults to the newest)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Shortest relationship path between two persons in a snapshot
    Path {
        from: PersonId,
        to: PersonId,

        /// Snapshot to read (defaults to the newest)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = storage::data_dir(cli.data_dir.as_deref())?;
    storage::ensure_dirs(&data_dir)
        .with_context(|| format!("failed to prepare {}", data_dir.display()))?;
    let config = LineageConfig::load(&data_dir)?;

    match cli.command.unwrap_or(Commands::Shell {
        load: None,
        latest: false,
        new: false,
    }) {
        Commands::Shell { load, latest, new } => {
            cmd_shell(&data_dir, config, load.as_deref(), latest, new)
        }
        Commands::Snapshots { autosave } => cmd_snapshots(&data_dir, autosave),
        Commands::Show { query, file } => cmd_show(&data_dir, &config, &query, file.as_deref()),
        Commands::Path { from, to, file } => cmd_path(&data_dir, from, to, file.as_deref()),
    }
}

fn cmd_shell(
    data_dir: &Path,
    config: LineageConfig,
    load: Option<&Path>,
    latest: bool,
    new: bool,
) -> Result<()> {
    let mut console = Console::stdio();
    console.heading("LINEAGE")?;

    let session = if new {
        Session::default()
    } else if let Some(path) = load {
        Session::open(path)?
    } else if latest {
        match storage::latest_snapshot(data_dir)? {
            Some(path) => Session::open(&path)?,
            None => {
                console.yellow("No saved lineage found, creating new lineage")?;
                Session::default()
            }
        }
    } else {
        shell::choose_session(&mut console, data_dir)?
    };

    let mut shell = Shell::new(console, session, config, data_dir.to_path_buf());
    shell.run()
}

fn cmd_snapshots(data_dir: &Path, autosave: bool) -> Result<()> {
    let dir = if autosave {
        storage::autosave_dir(data_dir)
    } else {
        data_dir.to_path_buf()
    };
    let files = storage::list_snapshots(&dir)?;
    if files.is_empty() {
        eprintln!("No snapshots in {}", dir.display());
        return Ok(());
    }
    for file in files {
        println!("{}", file.display());
    }
    Ok(())
}

/// Load an explicit snapshot or the newest one in the data directory.
fn load_snapshot(data_dir: &Path, file: Option<&Path>) -> Result<Lineage> {
    let path = match file {
        Some(p) => p.to_path_buf(),
        None => storage::latest_snapshot(data_dir)?.ok_or_else(|| {
            anyhow::anyhow!(
                "No snapshots in {}. Run `lineage` and `save` first.",
                data_dir.display()
            )
        })?,
    };
    Ok(Lineage::load_from_file(&path)?)
}

fn cmd_show(data_dir: &Path, config: &LineageConfig, query: &str, file: Option<&Path>) -> Result<()> {
    let lineage = load_snapshot(data_dir, file)?;
    let persons = match shell::parse_id_query(query) {
        Some(id) => lineage.find_person_by_id(id).into_iter().collect(),
        None => lineage.find_person_by_name(query, config.search.case_sensitive),
    };
    if persons.is_empty() {
        anyhow::bail!("No person matches {:?}", query);
    }
    for (i, person) in persons.iter().enumerate() {
        if i > 0 {
            println!("{}", " - ".repeat(17).bright_black());
        }
        for (label, value) in render::person_details(&lineage, person) {
            println!("{} {}", format!("{label}:").bright_blue(), value.bright_cyan());
        }
    }
    Ok(())
}

fn cmd_path(data_dir: &Path, from: PersonId, to: PersonId, file: Option<&Path>) -> Result<()> {
    let lineage = load_snapshot(data_dir, file)?;
    match lineage.shortest_path(from, to)? {
        Some(path) => {
            println!("{}", render::path_line(&lineage, &path).bright_cyan());
            println!("{} {}", "Length:".bright_blue(), path.len());
        }
        None => println!("{}", format!("No path found between {from} and {to}").bright_red()),
    }
    Ok(())
}
