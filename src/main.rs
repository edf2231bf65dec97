use std::path::PathBuf;

use anyhow::Context;
use axum::extract::FromRef;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod controllers;
mod db;
mod error;
mod ids;
mod models;
mod templates;
mod types;

pub(crate) use error::{AppError, AppResult};

use config::Config;
use db::Database;
use ids::IdGenerator;
use templates::Templates;

/// A small text-sharing service with expiring pastes.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Path to the config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone, Copy)]
enum Command {
    /// Run the web server (default).
    Serve,
    /// Delete all expired pastes and exit.
    PurgeExpired,
}

#[derive(Clone, FromRef)]
pub struct App {
    config: Config,
    database: Database,
    ids: IdGenerator,
    templates: Templates,
}

impl App {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let database = Database::connect(&config.database.url, config.database.max_connections)
            .await?;
        database
            .migrate()
            .await
            .context("failed to create database schema")?;

        Ok(App {
            config,
            database,
            ids: IdGenerator::from_time(),
            templates: Templates::load().context("failed to load templates")?,
        })
    }

    #[cfg(test)]
    pub async fn for_tests(config: Config) -> Self {
        Self::for_tests_with(config, Database::in_memory().await).await
    }

    #[cfg(test)]
    pub async fn for_tests_with(config: Config, database: Database) -> Self {
        database.migrate().await.unwrap();

        App {
            config,
            database,
            ids: IdGenerator::from_time(),
            templates: Templates::load().unwrap(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // try to load .env, ignoring any errors
    _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let config = Config::load(args.config.as_deref()).context("failed to load config")?;
    let app = App::new(config).await?;

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => commands::serve::run(app).await,
        Command::PurgeExpired => commands::purge_expired::run(app).await,
    }
}
