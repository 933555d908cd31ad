//! urlshelf CLI - serve the URL list, or manage it from the terminal

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use urlshelf::config::{self, Overrides, Settings, UrlshelfConfig};
use urlshelf::output::{OutputMode, emit_success, failure_json, success_line};
use urlshelf::ui::{self, Icons};
use urlshelf::{UrlId, UrlOperations, UrlRecord, UrlService};

#[derive(Parser)]
#[command(name = "urlshelf")]
#[command(version)]
#[command(about = "URL Summarizer - store and manage your URLs")]
#[command(long_about = r#"
urlshelf keeps a list of URLs in a local SQLite database and serves it as a
single page that updates live whenever the list changes.

Example usage:
  urlshelf init
  urlshelf serve --port 3000
  urlshelf add https://example.com
  urlshelf list
  urlshelf delete 0f8fad5b-d9cb-469f-a165-70867728950e
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to ./urlshelf.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the web page and JSON API
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a default urlshelf.toml in the current directory
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Add a URL
    Add {
        /// The URL to store (stored as given)
        url: String,
    },

    /// List stored URLs, most recent first
    List,

    /// Delete a URL by id
    Delete {
        /// Id printed by `add` or `list`
        id: String,
    },

    /// Print the list every time it changes
    Watch,

    /// Show statistics about the store
    Stats,
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Serve { .. } => "serve",
            Commands::Init { .. } => "init",
            Commands::Add { .. } => "add",
            Commands::List => "list",
            Commands::Delete { .. } => "delete",
            Commands::Watch => "watch",
            Commands::Stats => "stats",
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let mode = OutputMode::from_flag(cli.json);
    let command = cli.command.name();

    if let Err(e) = run(cli, mode).await {
        match mode {
            OutputMode::Json => match failure_json(command, &e.to_string()) {
                Ok(out) => println!("{}", out),
                Err(_) => ui::error(&e.to_string()),
            },
            OutputMode::Human => ui::error(&e.to_string()),
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli, mode: OutputMode) -> anyhow::Result<()> {
    let file_config = config::load_config(cli.config.as_deref())?;

    let (host, port) = match &cli.command {
        Commands::Serve { host, port } => (host.clone(), *port),
        _ => (None, None),
    };
    let settings = Settings::resolve(
        Overrides {
            database: cli.database.clone(),
            host,
            port,
        },
        file_config,
    );

    match cli.command {
        Commands::Init { force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            config::write_config(&path, &UrlshelfConfig::with_defaults(), force)?;
            config::ensure_gitignore(Path::new("."))?;

            if mode.is_human() {
                ui::success(&format!("Wrote {}", path.display()));
            } else {
                emit_success(mode, "init", serde_json::json!({ "config": path }))?;
            }
        }

        Commands::Serve { .. } => {
            let service = open_service(&settings)?;
            ui::header("Serving URL Summarizer");
            ui::info("Database", &settings.database.display().to_string());
            urlshelf::server::start_server(&settings, service).await?;
        }

        Commands::Add { url } => {
            if url.trim().is_empty() {
                if mode.is_human() {
                    ui::warn("Nothing to add: URL is empty");
                } else {
                    emit_success(mode, "add", serde_json::json!({ "id": null }))?;
                }
                return Ok(());
            }

            let service = open_service(&settings)?;
            let id = service.add(&url)?;
            if mode.is_human() {
                ui::success(&format!("Added {}", url));
                ui::info("Id", &id.to_string());
            } else {
                emit_success(mode, "add", serde_json::json!({ "id": id }))?;
            }
        }

        Commands::List => {
            let service = open_service(&settings)?;
            let urls = service.list()?;
            if mode.is_human() {
                print_urls(&urls);
            } else {
                emit_success(mode, "list", &urls)?;
            }
        }

        Commands::Delete { id } => {
            let id = UrlId::parse(&id)?;
            let service = open_service(&settings)?;
            service.delete(&id)?;
            if mode.is_human() {
                println!("{} Deleted {}", Icons::DEL, id);
            } else {
                emit_success(mode, "delete", serde_json::json!({ "id": id }))?;
            }
        }

        Commands::Watch => {
            let service = open_service(&settings)?;
            let poller = service.watch_external(settings.poll_interval);
            let mut live = service.subscribe();

            if mode.is_human() {
                println!(
                    "{} Watching {} (Ctrl-C to stop)",
                    Icons::EYE,
                    settings.database.display()
                );
            }

            loop {
                tokio::select! {
                    snapshot = live.next() => match snapshot {
                        Some(Ok(urls)) => {
                            if mode.is_human() {
                                ui::section(&format!("{} URLs", urls.len()));
                                print_urls(&urls);
                            } else {
                                println!("{}", success_line("watch", &urls)?);
                            }
                        }
                        Some(Err(e)) => ui::warn(&format!("Failed to evaluate list: {}", e)),
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }

            poller.abort();
        }

        Commands::Stats => {
            let service = open_service(&settings)?;
            let stats = service.stats()?;
            if mode.is_human() {
                println!("{} urlshelf Statistics ({})", Icons::STATS, settings.database.display());
                println!("------------------------------------");
                println!("{}", stats);
            } else {
                emit_success(mode, "stats", &stats)?;
            }
        }
    }

    Ok(())
}

fn open_service(settings: &Settings) -> anyhow::Result<UrlService> {
    config::ensure_db_dir(&settings.database)?;
    tracing::debug!("Opening {}", settings.database.display());
    Ok(UrlService::open(&settings.database)?)
}

fn print_urls(urls: &[UrlRecord]) {
    if urls.is_empty() {
        println!("{} {}", Icons::EMPTY, ui::dim(urlshelf::view::EMPTY_MESSAGE));
    } else {
        println!("{}", ui::url_table(urls));
    }
}
