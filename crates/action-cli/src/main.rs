use std::sync::Arc;

use action_core::config::{ClientConfig, Config};
use action_core::{ActionError, EventHub, Registry};
use anyhow::Context;
use asset_client::AssetClient;
use clap::{Parser, ValueEnum};

#[derive(Parser)]
#[command(
    name = "component-add",
    about = "Hub action that attaches a file component to an asset version and publishes it",
    version
)]
struct Cli {
    /// Set the logging output verbosity.
    #[arg(short = 'v', long, value_enum, default_value_t = Verbosity::Info)]
    verbosity: Verbosity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Verbosity {
    Notset,
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Verbosity {
    fn level(self) -> tracing::Level {
        match self {
            Verbosity::Notset => tracing::Level::TRACE,
            Verbosity::Debug => tracing::Level::DEBUG,
            Verbosity::Info => tracing::Level::INFO,
            Verbosity::Warning => tracing::Level::WARN,
            Verbosity::Error | Verbosity::Critical => tracing::Level::ERROR,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(cli.verbosity.level().into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run() {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let client_config = config.client_config()?;
    let username = config.username()?.to_string();

    // The blocking client must be built outside the async runtime.
    let client = connect(&client_config)
        .with_context(|| format!("connecting to {}", client_config.server_url))?;

    let hub = EventHub::new();
    action_core::register(Registry::event_handlers(), &hub, &username, Arc::new(client))?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(action_server::serve(hub, config.listen))
}

fn connect(config: &ClientConfig) -> action_core::Result<AssetClient> {
    Ok(AssetClient::connect(config)?)
}
