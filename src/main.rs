// ABOUTME: Entry point for the switchboard binary.
// ABOUTME: Loads .env, initializes tracing, compiles the swarm, and serves the HTTP API.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use switchboard_agent::{ClientResolver, SwarmRunner, tools};
use switchboard_core::swarm::{SwarmDefinition, SwarmVariant};
use switchboard_server::{AppState, Settings, create_router};

#[derive(Parser)]
#[command(name = "switchboard", version, about = "Multi-agent chat service with agent hand-offs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API (default).
    Serve(ServeArgs),
    /// Validate a swarm definition and print it.
    Check(SwarmArgs),
}

#[derive(Args, Default)]
struct SwarmArgs {
    /// Built-in wiring: directory or single.
    #[arg(long)]
    variant: Option<SwarmVariant>,

    /// YAML swarm definition; takes precedence over --variant.
    #[arg(long)]
    swarm_file: Option<PathBuf>,
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Address to listen on; overrides SWITCHBOARD_BIND.
    #[arg(long)]
    bind: Option<SocketAddr>,

    #[command(flatten)]
    swarm: SwarmArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before anything reads the environment; real env vars win.
    let dotenv = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchboard=debug,tower_http=debug".into()),
        )
        .init();

    if let Some(e) = dotenv_failure(dotenv) {
        tracing::warn!(error = %e, "failed to load .env");
    }

    let cli = Cli::parse();
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(args).await,
        Command::Check(args) => check(args),
    }
}

/// A missing .env is normal; anything else is worth reporting.
fn dotenv_failure<T>(result: Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => Some(e),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut settings = Settings::from_env()?;
    if let Some(bind) = args.bind {
        settings.bind = bind;
    }
    if let Some(variant) = args.swarm.variant {
        settings.variant = variant;
    }
    if let Some(path) = args.swarm.swarm_file {
        settings.swarm_file = Some(path);
    }

    let definition = settings.swarm_definition()?;
    let http = tools::http_client()?;
    let mut resolver = ClientResolver::new(settings.providers.clone());
    let runner = SwarmRunner::compile(definition, http, |model| resolver.resolve(model))?
        .with_max_steps(settings.max_steps);

    tracing::info!(
        variant = %settings.variant,
        swarm_file = ?settings.swarm_file,
        default_active_agent = %runner.default_active_agent(),
        max_steps = settings.max_steps,
        "switchboard starting up"
    );

    let state = Arc::new(AppState::new(runner));
    let app = create_router(state, settings.api_key.clone());

    let listener = tokio::net::TcpListener::bind(settings.bind)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind))?;
    tracing::info!(addr = %settings.bind, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("switchboard shut down");
    Ok(())
}

fn check(args: SwarmArgs) -> anyhow::Result<()> {
    let definition = match args.swarm_file {
        Some(path) => SwarmDefinition::load(&path)?,
        None => {
            let definition = args.variant.unwrap_or_default().definition();
            definition.validate()?;
            definition
        }
    };

    println!("{}", serde_json::to_string_pretty(&definition)?);
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
