mod export;
mod staff;
mod students;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config;

#[derive(Debug, Parser)]
#[command(
    name = "cardpack",
    version,
    about = "Bulk ID-card export for the school/madrasah portal"
)]
pub struct Cli {
    #[command(flatten)]
    pub globals: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// Config file (default: ~/.config/cardpack/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Portal base URL, e.g. https://portal.example.org/api
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Bearer token for the portal API
    #[arg(long, global = true)]
    pub token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Staff roster and staff ID cards
    #[command(subcommand)]
    Staff(staff::StaffCmd),

    /// Student roster and student ID cards
    #[command(subcommand, visible_alias = "student")]
    Students(students::StudentsCmd),
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let config = config::resolve(&self.globals)?;
        match self.command {
            Command::Staff(cmd) => cmd.run(&config).await,
            Command::Students(cmd) => cmd.run(&config).await,
        }
    }
}
