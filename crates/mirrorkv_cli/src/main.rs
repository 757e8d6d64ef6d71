//! mirrorkv CLI
//!
//! Command-line tools for inspecting and editing mirrorkv store files.
//!
//! # Commands
//!
//! - `get` / `has` / `list` - Read keys
//! - `set` / `delete` / `clear` - Change keys
//! - `reconcile` - Add missing keys from a JSON template
//! - `copy-key` / `copy-from` - Copy keys from another store

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// mirrorkv command-line store tools.
#[derive(Parser)]
#[command(name = "mirrorkv")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Store address (a path; scheme and extension are optional)
    #[arg(global = true, short, long)]
    path: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    /// Keep changes in memory only; nothing is written back
    #[arg(global = true, long)]
    dev: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value of a key
    Get {
        /// Key to read
        key: String,

        /// JSON value to store and print if the key is missing
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Exit successfully if a key exists
    Has {
        /// Key to check
        key: String,
    },

    /// List all keys, or all entries with --values
    List {
        /// Print values as a JSON object
        #[arg(long)]
        values: bool,
    },

    /// Store a JSON value under a key
    Set {
        /// Key to write
        key: String,

        /// JSON value
        value: String,
    },

    /// Remove a key
    Delete {
        /// Key to remove
        key: String,
    },

    /// Remove every key
    Clear,

    /// Add keys from a JSON object file without overwriting
    Reconcile {
        /// Path to a JSON file holding an object
        template: PathBuf,
    },

    /// Copy one key from another store
    CopyKey {
        /// Address of the source store
        source: String,

        /// Key to copy
        key: String,

        /// JSON value to use (and store in the source) if the key is missing
        #[arg(short, long)]
        default: Option<String>,
    },

    /// Copy every key from another store
    CopyFrom {
        /// Address of the source store
        source: String,

        /// Remove existing keys first
        #[arg(short, long)]
        wipe: bool,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let path = cli.path.as_deref();
    let dev = cli.dev;

    match cli.command {
        Commands::Get { key, default } => commands::with_store(path, dev, |store| {
            commands::read::get(store, &key, default.as_deref())
        })?,
        Commands::Has { key } => {
            commands::with_store(path, dev, |store| commands::read::has(store, &key))?
        }
        Commands::List { values } => {
            commands::with_store(path, dev, |store| commands::read::list(store, values))?
        }
        Commands::Set { key, value } => commands::with_store(path, dev, |store| {
            commands::write::set(store, &key, &value)
        })?,
        Commands::Delete { key } => {
            commands::with_store(path, dev, |store| commands::write::delete(store, &key))?
        }
        Commands::Clear => commands::with_store(path, dev, commands::write::clear)?,
        Commands::Reconcile { template } => commands::with_store(path, dev, |store| {
            commands::write::reconcile(store, &template)
        })?,
        Commands::CopyKey {
            source,
            key,
            default,
        } => commands::with_store(path, dev, |store| {
            commands::copy::copy_key(store, &source, &key, default.as_deref(), dev)
        })?,
        Commands::CopyFrom { source, wipe } => commands::with_store(path, dev, |store| {
            commands::copy::copy_from(store, &source, wipe, dev)
        })?,
        Commands::Version => {
            println!("mirrorkv CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("mirrorkv core v{}", mirrorkv_core::VERSION);
        }
    }

    Ok(())
}
