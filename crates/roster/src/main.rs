//! `roster` - CLI for the roster record table
//!
//! One-shot commands for listing and editing records, plus an interactive
//! shell.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;

use roster::cli::{AddCommand, BackendArg, Cli, Command, ConfigCommand, EditCommand, OutputFormat};
use roster::shell::Shell;
use roster::{init_logging, open_backend, render, Config, Intent, RecordStore, ViewController};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    // Config commands load what they need themselves.
    let command = match cli.command {
        Command::Config(cmd) => return handle_config(cli.config, cli.backend, cmd),
        other => other,
    };
    let config = load_config(cli.config, cli.backend)?;

    match command {
        // Handled above.
        Command::Config(_) => Ok(()),
        Command::List(cmd) => {
            let store = open_store(&config).await?;
            print_records(&store, cmd.format)
        }
        Command::Add(cmd) => handle_add(&config, &cmd).await,
        Command::Edit(cmd) => handle_edit(&config, &cmd).await,
        Command::Delete(cmd) => {
            let mut store = open_store(&config).await?;
            let removed = store.remove(&cmd.target).await?;
            println!("Deleted {} <{}>", removed.name, removed.email);
            Ok(())
        }
        Command::Shell => {
            let store = open_store(&config).await?;
            let input = BufReader::new(tokio::io::stdin());
            let mut shell = Shell::new(ViewController::new(store), input, tokio::io::stdout());
            shell.run().await?;
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>, backend: Option<BackendArg>) -> anyhow::Result<Config> {
    let mut config = Config::load_from(path).context("loading configuration")?;
    if let Some(backend) = backend {
        config.store.backend = backend.into();
    }
    Ok(config)
}

async fn open_store(config: &Config) -> anyhow::Result<RecordStore> {
    let backend = open_backend(config)
        .with_context(|| format!("opening {} backend", config.store.backend))?;
    let store = RecordStore::open(backend)
        .await
        .with_context(|| format!("loading records from {} backend", config.store.backend))?;
    Ok(store)
}

fn print_records(store: &RecordStore, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Table => print!("{}", render::table(store.list())),
        OutputFormat::Plain => print!("{}", render::plain(store.list())),
        OutputFormat::Json => println!("{}", render::json(store.list())?),
    }
    Ok(())
}

async fn handle_add(config: &Config, cmd: &AddCommand) -> anyhow::Result<()> {
    let mut controller = ViewController::new(open_store(config).await?);
    controller.handle(Intent::Add).await?;
    controller.handle(Intent::Submit(cmd.candidate())).await?;

    if let Some(record) = controller.records().last() {
        println!("Added {} <{}> as {}", record.name, record.email, record.id);
    }
    Ok(())
}

async fn handle_edit(config: &Config, cmd: &EditCommand) -> anyhow::Result<()> {
    let mut controller = ViewController::new(open_store(config).await?);
    match cmd.run(&mut controller).await? {
        Some(record) => println!("Updated {} <{}> age {}", record.name, record.email, record.age),
        None => println!("Updated {}; it has since been removed", cmd.target),
    }
    Ok(())
}

fn handle_config(
    path: Option<PathBuf>,
    backend: Option<BackendArg>,
    cmd: ConfigCommand,
) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = load_config(path, backend)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Store]");
                println!("  Backend:              {}", config.store.backend);
                println!("  Database path:        {}", config.database_path().display());
                println!();
                println!("[Remote]");
                println!("  Base URL:             {}", config.remote.base_url);
                println!("  Timeout (secs):       {}", config.remote.timeout_secs);
                println!(
                    "  Refetch after update: {}",
                    config.remote.refetch_after_update
                );
            }
        }
        ConfigCommand::Path => {
            let path = path.unwrap_or_else(Config::default_config_path);
            println!("{}", path.display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.or(path).unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::check_file(&path)
                .with_context(|| format!("configuration {} is invalid", path.display()))?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
