//! Transcoder CLI: codes interview transcripts with an Azure OpenAI model.
//!
//! Reads a `.docx` transcript, highlights passages by research category and
//! writes a coded copy with a legend.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
