use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod cache;
mod commands;
pub mod config;
pub mod error;
pub mod provision;
pub mod registry;
pub mod request;
pub mod sqlite;
pub mod utils;
pub mod valet;
pub mod wp_cli;

use crate::commands::new::NewArgs;
use crate::config::{AppContext, load_config};
use crate::utils::log::init_logger;

/// wp-valet - Spin up local WordPress sites served by Laravel Valet.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
  /// Log every delegated command and its outcome
  #[arg(long, global = true)]
  debug: bool,
  #[command(subcommand)]
  command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
  /// Download, configure and install a new WordPress site
  New(NewArgs),
}

pub fn parse() -> Cli {
  Cli::parse()
}

pub fn run() -> Result<()> {
  let cli = parse();
  init_logger(cli.debug);

  let cwd = std::env::current_dir()?;
  let config = load_config(&cwd)?;
  let ctx = AppContext { cwd, config };

  match &cli.command {
    Commands::New(args) => {
      commands::new::run(&ctx, args)?;
    }
  }

  Ok(())
}
