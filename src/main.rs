use clap::Parser;
use eyre::{Result, bail};
use log::{debug, info};

use tldr::SummarizeRequest;
use tldr::config::Config;
use tldr::server::{self, AppState};
use tldr::service::SummaryService;

mod cli;

use cli::{Cli, Command};

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    }
    .with_env(|key| std::env::var(key).ok());

    // CLI flags take priority
    if let Some(ref model) = cli.model {
        config.model = Some(model.clone());
    }
    if let Some(source) = cli.source {
        config.transcript_source = Some(source);
    }
    if let Command::Serve { ref bind, port } = cli.command {
        if let Some(bind) = bind {
            config.bind = Some(bind.clone());
        }
        if let Some(port) = port {
            config.port = Some(port);
        }
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = load_config(&cli)?;
    debug!("Config path: {}", tldr::config::config_path().display());

    let client = reqwest::Client::new();
    let service = SummaryService::from_config(&config, client);

    match cli.command {
        Command::Serve { .. } => {
            info!("tldr {} starting", env!("GIT_DESCRIBE"));
            server::run(AppState { service }, config.bind(), config.port()).await?;
        }
        Command::Summarize { ref video } => {
            let request = SummarizeRequest::from_input(video);
            match service.summarize(&request).await {
                Ok(summary) => println!("{summary}"),
                Err(e) => bail!("{} ({})", e, e.kind()),
            }
        }
        Command::Transcript { ref video } => {
            let video_id = tldr::resolve_video_id(&SummarizeRequest::from_input(video))?;
            match service.transcript(&video_id).await {
                Ok(text) => println!("{text}"),
                Err(e) => bail!("{} ({})", e, e.kind()),
            }
        }
    }

    Ok(())
}
