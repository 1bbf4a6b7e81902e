mod cli;

use anyhow::Result;
use clap::Parser;
use dotenvy::dotenv;

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file from current directory
    dotenv().ok();

    let cli = Cli::parse();
    monitoring::init_logging()?;

    match &cli.command {
        Commands::Network => cli::network::handle_network_command(&cli).await,
        Commands::Teacher { command } => cli::teacher::handle_teacher_command(&cli, command.clone()).await,
        Commands::Student { command } => cli::student::handle_student_command(&cli, command.clone()).await,
    }
}
