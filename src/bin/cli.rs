//! recstore CLI
//!
//! Command-line interface for inspecting and editing a record store.

use std::process;

use clap::{Parser, Subcommand};
use recstore::{BytesCodec, CommitSync, Config, Engine, StringCodec};
use tracing_subscriber::{fmt, EnvFilter};

/// recstore CLI
#[derive(Parser, Debug)]
#[command(name = "recstore-cli")]
#[command(about = "CLI for the recstore embedded record store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./recstore_data")]
    data_dir: String,

    /// Address-space page size in bytes
    #[arg(short, long, default_value = "1048576")]
    page_size: usize,

    /// Skip fsync on commit
    #[arg(long)]
    no_sync: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store a string, print its recid
    Put {
        /// The value to store
        value: String,
    },

    /// Print the string stored at a recid
    Get {
        /// The record id
        recid: u64,
    },

    /// Replace the string stored at a recid
    Update {
        /// The record id
        recid: u64,

        /// The new value
        value: String,
    },

    /// Delete a record
    Delete {
        /// The record id
        recid: u64,
    },

    /// Print store counters
    Stats,

    /// Bulk-insert zeroed byte arrays
    Fill {
        /// Number of records
        count: u64,

        /// Bytes per record
        size: usize,
    },
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,recstore=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .page_size(args.page_size)
        .commit_sync(if args.no_sync { CommitSync::OsBuffered } else { CommitSync::Fsync })
        .build();

    let engine = match Engine::open(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Failed to open engine: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&engine, args.command) {
        tracing::error!("Command failed: {}", e);
        process::exit(1);
    }

    if let Err(e) = engine.close() {
        tracing::error!("Failed to close engine: {}", e);
        process::exit(1);
    }
}

fn run(engine: &Engine, command: Commands) -> recstore::Result<()> {
    match command {
        Commands::Put { value } => {
            let recid = engine.put(&value, &StringCodec)?;
            println!("{}", recid);
        }
        Commands::Get { recid } => {
            let value = engine.get(recid, &StringCodec)?;
            println!("{}", value);
        }
        Commands::Update { recid, value } => {
            engine.update(recid, &value, &StringCodec)?;
            println!("OK");
        }
        Commands::Delete { recid } => {
            engine.delete(recid)?;
            println!("OK");
        }
        Commands::Stats => {
            let stats = engine.stats()?;
            println!("index slots:  {}", stats.index_slots);
            println!("live records: {}", stats.live_records);
            println!("free recids:  {}", stats.free_recids);
            println!("data end:     {}", stats.data_end);
            println!("index pages:  {}", stats.index_pages);
            println!("data pages:   {}", stats.data_pages);
        }
        Commands::Fill { count, size } => {
            let payload = vec![0u8; size];
            let step = (count / 100).max(1);
            for i in 0..count {
                engine.put(&payload, &BytesCodec)?;
                if i % step == 0 {
                    tracing::info!("{:.1}%", 100.0 * i as f64 / count as f64);
                }
            }
            engine.commit()?;
            println!("inserted {} records", count);
        }
    }
    Ok(())
}
