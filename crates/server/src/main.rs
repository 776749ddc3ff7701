//! Edulib Server
//!
//! Serves an educational library directory over HTTP.

use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use library::{format_size, Entry, LibraryManager, ServeOutcome};
use server::config::Config;
use server::{http, logging};

/// Edulib Server - serves an educational library over HTTP.
#[derive(Parser, Debug)]
#[command(name = "edulib")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Library root directory (overrides the configuration file)
    #[arg(short, long, global = true, value_name = "DIR")]
    pub library: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Address to listen on (e.g. 127.0.0.1:5000)
        #[arg(long, short)]
        bind: Option<String>,
    },

    /// Print the library tree
    Tree {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show how a client path would be served
    Resolve {
        /// Path relative to the library root
        path: String,
    },

    /// Create a sample library with placeholder files
    Seed,

    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default()?
    };

    // Apply environment and command line overrides
    config.apply_env_overrides();
    if let Some(root) = &cli.library {
        config.library.root = root.clone();
    }
    if let Commands::Start { bind: Some(bind) } = &cli.command {
        config.server.bind_addr = bind.clone();
    }

    config.validate()?;

    logging::init_logging(&config.server.log_level, cli.verbose);

    match cli.command {
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
        Commands::Start { .. } => {
            let library = open_library(&config)?;
            tracing::info!("Serving library from {:?}", library.root());

            let app = http::router(Arc::new(library), &config.server);
            let addr = config.bind_addr()?;
            let listener = tokio::net::TcpListener::bind(addr)
                .await
                .with_context(|| format!("Failed to bind to {}", addr))?;

            http::serve(listener, app, wait_for_shutdown_signal()).await?;
        }
        Commands::Tree { json } => {
            let library = open_library(&config)?;
            let entries = library.list_library();

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("Library at {} is empty.", library.root().display());
            } else {
                print!("{}", render_tree(&entries));
            }
        }
        Commands::Resolve { path } => {
            let library = open_library(&config)?;

            match library.resolve_for_serving(&path) {
                ServeOutcome::File(file) => {
                    println!("File:  {}", file.path.display());
                    println!("  MIME: {}", file.mime);
                    println!("  Size: {} ({})", file.size, format_size(file.size));
                }
                ServeOutcome::NotFound => println!("Not found"),
                ServeOutcome::Invalid => println!("Invalid: not a regular file"),
            }
        }
        Commands::Seed => {
            let library = open_library(&config)?;
            let written = library.seed_sample_library()?;
            println!(
                "Sample library created at {} ({} files written)",
                library.root().display(),
                written
            );
        }
    }

    Ok(())
}

/// Open the configured library; a bad root is fatal.
fn open_library(config: &Config) -> anyhow::Result<LibraryManager> {
    LibraryManager::open(&config.library.root, config.library_options()).with_context(|| {
        format!(
            "Failed to open library root: {}",
            config.library.root.display()
        )
    })
}

/// Render entries as an indented tree, two spaces per level.
fn render_tree(entries: &[Entry]) -> String {
    fn render(out: &mut String, entries: &[Entry], indent: usize) {
        let prefix = "  ".repeat(indent);
        for entry in entries {
            match entry {
                Entry::Folder(folder) => {
                    let _ = writeln!(out, "{}{} {}/", prefix, folder.icon, folder.name);
                    render(out, &folder.children, indent + 1);
                }
                Entry::File(file) => {
                    let _ = writeln!(
                        out,
                        "{}{} {} ({})",
                        prefix, file.icon, file.name, file.size_human
                    );
                }
            }
        }
    }

    let mut out = String::new();
    render(&mut out, entries, 0);
    out
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = sigterm.recv() => {
                        tracing::info!("Received SIGTERM");
                    }
                    _ = tokio::signal::ctrl_c() => {
                        tracing::info!("Received SIGINT");
                    }
                }
                return;
            }
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", e);
            }
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Received SIGINT");
}
