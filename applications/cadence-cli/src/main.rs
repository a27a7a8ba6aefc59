/// Cadence - terminal controller for a playback session
use anyhow::Context;
use cadence_catalog::{HttpCatalog, StaticCatalog};
use cadence_cli::{
    commands::{self, ReplCommand},
    config::{CatalogSource, CliConfig},
    demo_catalog, describe, render_queue, SimulatedResource,
};
use cadence_core::{TrackCatalog, TrackId};
use cadence_playback::{Intent, PlaybackSession, PlaybackStatus};
use clap::{Parser, Subcommand};
use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Cadence playback session controller", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Catalog server URL (overrides the config file)
    #[arg(long, global = true, env = "CADENCE_URL")]
    url: Option<String>,

    /// JSON fixture to use as the catalog
    #[arg(long, global = true)]
    fixture: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive player (default)
    Repl,
    /// Write the built-in demo catalog as a fixture file
    ExportDemo {
        /// Output path
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with REPL output on stdout
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cadence=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = CliConfig::load(cli.config.as_deref())?;
    if cli.url.is_some() {
        config.catalog.url = cli.url;
    }
    if cli.fixture.is_some() {
        config.catalog.fixture = cli.fixture;
    }

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => repl(config).await,
        Commands::ExportDemo { output } => export_demo(&output),
    }
}

fn export_demo(output: &Path) -> anyhow::Result<()> {
    let document = demo_catalog()?.to_document();
    let json = serde_json::to_string_pretty(&document)?;
    std::fs::write(output, json)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!("Demo catalog written to {}", output.display());
    Ok(())
}

fn build_catalog(config: &CliConfig) -> anyhow::Result<Arc<dyn TrackCatalog>> {
    let latency = Duration::from_millis(config.catalog.latency_ms);

    let catalog: Arc<dyn TrackCatalog> = match config.catalog_source() {
        CatalogSource::Http(settings) => {
            tracing::info!("Using catalog server at {}", settings.url);
            Arc::new(HttpCatalog::new(settings)?)
        }
        CatalogSource::Fixture(path) => {
            let catalog = StaticCatalog::from_json_file(&path)
                .with_context(|| format!("Failed to load fixture {}", path.display()))?;
            Arc::new(catalog.with_latency(latency))
        }
        CatalogSource::Demo => {
            tracing::info!("No catalog configured, using the demo catalog");
            Arc::new(demo_catalog()?.with_latency(latency))
        }
    };
    Ok(catalog)
}

async fn repl(config: CliConfig) -> anyhow::Result<()> {
    let catalog = build_catalog(&config)?;
    let resource = SimulatedResource::new(config.media.clone());

    let session = PlaybackSession::start(
        config.session.clone(),
        catalog.clone(),
        Box::new(resource),
    );
    let session = cadence_playback::init_global(session)?;

    let last_seen = Mutex::new((PlaybackStatus::Idle, None::<TrackId>));
    let _logger = session.subscribe(move |snapshot| {
        let track = snapshot.current_track.as_ref().map(|t| t.id.clone());
        let mut last = last_seen.lock().unwrap_or_else(PoisonError::into_inner);
        if last.0 != snapshot.status || last.1 != track {
            tracing::info!(token = %snapshot.request_token, "{}", describe(snapshot));
            *last = (snapshot.status, track);
        } else {
            tracing::debug!(position = snapshot.position_seconds, "Session updated");
        }
    });

    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let command = match commands::parse(&line) {
            None => continue,
            Some(Ok(command)) => command,
            Some(Err(e)) => {
                println!("{e}");
                continue;
            }
        };

        match command {
            ReplCommand::Intent(intent) => session.dispatch(intent),
            ReplCommand::Enqueue(id) => match catalog.get_track(&id).await {
                Ok(track) => session.dispatch(Intent::AddToQueue(track)),
                Err(e) => println!("Cannot add {id}: {e}"),
            },
            ReplCommand::Queue => {
                session.sync().await?;
                println!("{}", render_queue(&session.snapshot()));
            }
            ReplCommand::Status => {
                session.sync().await?;
                println!("{}", describe(&session.snapshot()));
            }
            ReplCommand::Help => println!("{}", commands::HELP),
            ReplCommand::Quit => break,
        }
    }

    session.shutdown().await?;
    tracing::info!("Goodbye");
    Ok(())
}
