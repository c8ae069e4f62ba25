use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tldr::config::SourceKind;

#[derive(Parser)]
#[command(
    name = "tldr",
    about = "YouTube video summarization service",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file (defaults to ~/.config/tldr/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// LLM model for summarization
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Caption source
    #[arg(long, value_enum, global = true)]
    pub source: Option<SourceKind>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to bind
        #[arg(long)]
        bind: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Summarize one video and print the result
    Summarize {
        /// YouTube watch URL or video ID
        video: String,
    },

    /// Print the flattened transcript of one video
    Transcript {
        /// YouTube watch URL or video ID
        video: String,
    },
}
