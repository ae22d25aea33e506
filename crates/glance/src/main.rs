//! glance - inspect the voice agent's configuration and prompt
//!
//! Subcommands:
//! - `glance config` - Print the effective configuration and where it came from
//! - `glance prompt` - Print the agent instructions, knowledge base included

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glance::knowledge::KnowledgeBase;
use glance::{prompt, telemetry};
use glanceconf::GlanceConfig;

#[derive(Parser)]
#[command(name = "glance")]
#[command(about = "Screen-share aware voice agent")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective configuration as TOML
    Config {
        /// Config file to use instead of ./glance.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the agent's system instructions
    Prompt {
        /// Config file to use instead of ./glance.toml
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Config { config } => {
            let (config, sources) = GlanceConfig::load_with_sources_from(config.as_deref())
                .context("Failed to load configuration")?;
            telemetry::init_console(&config.telemetry.log_level);

            for file in &sources.files {
                println!("# file: {}", file.display());
            }
            for var in &sources.env_overrides {
                println!("# env: {}", var);
            }
            print!("{}", config.to_toml());
        }
        Commands::Prompt { config } => {
            let config = GlanceConfig::load_from(config.as_deref())
                .context("Failed to load configuration")?;
            telemetry::init_console(&config.telemetry.log_level);

            let knowledge = KnowledgeBase::load(&config.agent.knowledge_dir);
            print!("{}", prompt::instructions(&knowledge));
        }
    }

    Ok(())
}
