use clap::{Parser, Subcommand};
use colored::Colorize;
use eyre::{Context, Result, eyre};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use todostore::render::{render_list, render_stats};
use todostore::{Backend, Config, FilePersistence, Persistence, SqlitePersistence, TaskError, TaskFilter, TaskStore};
use tracing::{Level, debug};

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "todostore - add, complete, delete and filter tasks stored locally")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Config file (default: <config dir>/todostore/config.yaml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory holding the .todostore store (overrides config)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage backend: file or sqlite (overrides config)
    #[arg(short, long, value_parser = parse_backend)]
    backend: Option<Backend>,

    /// More logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a task
    Add {
        /// Task text (words are joined with spaces)
        text: Vec<String>,
    },

    /// Toggle a task between pending and completed
    Toggle { id: i64 },

    /// Delete a task
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks
    List {
        /// all, completed or pending
        #[arg(short, long, default_value = "all", value_parser = parse_filter)]
        filter: TaskFilter,
    },

    /// Show task counts
    Stats,
}

fn parse_backend(s: &str) -> Result<Backend, String> {
    s.parse().map_err(|e: eyre::Report| e.to_string())
}

fn parse_filter(s: &str) -> Result<TaskFilter, String> {
    s.parse().map_err(|e: TaskError| e.to_string())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(store_path) = cli.store_path {
        config.store_path = store_path;
    }
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }

    // Setup tracing
    let level = match cli.verbose {
        0 => config.log_level()?,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(level)
        .init();

    debug!(store_path = ?config.store_path, backend = ?config.backend, key = %config.key, "Opening store");
    let mut store = TaskStore::open(open_persistence(&config)?);

    match cli.command {
        Commands::Add { text } => match store.add(&text.join(" ")) {
            Ok(task) => println!("Added task {}", task.id),
            Err(TaskError::EmptyInput) => return Err(eyre!("Please enter a task!")),
            Err(e) => return Err(e.into()),
        },
        Commands::Toggle { id } => {
            if let Err(e) = store.toggle_completed(id) {
                debug!(id, error = %e, "Nothing toggled");
            }
        }
        Commands::Delete { id, yes } => {
            if yes || confirm("Are you sure you want to delete this task?")? {
                delete_task(&mut store, id);
            }
        }
        Commands::List { filter } => store.set_filter(filter),
        Commands::Stats => {
            println!("{}", render_stats(&store.stats()));
            return Ok(());
        }
    }

    println!("{}", render_list(&store.list_filtered(), store.filter()));
    println!();
    println!("{}", render_stats(&store.stats()));

    Ok(())
}

/// Delete after confirmation; an unknown id is a logged no-op
fn delete_task<P: Persistence>(store: &mut TaskStore<P>, id: i64) -> bool {
    let removed = store.delete(id);
    if !removed {
        debug!(id, "Nothing deleted");
    }
    removed
}

fn open_persistence(config: &Config) -> Result<Box<dyn Persistence>> {
    let persistence: Box<dyn Persistence> = match config.backend {
        Backend::File => Box::new(FilePersistence::open(&config.store_path, &config.key)?),
        Backend::Sqlite => Box::new(SqlitePersistence::open(&config.store_path, &config.key)?),
    };
    Ok(persistence)
}

/// Ask a yes/no question on stdin; anything but y/yes is a no
fn confirm(question: &str) -> Result<bool> {
    print!("{} {} ", question, "[y/N]".dimmed());
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
