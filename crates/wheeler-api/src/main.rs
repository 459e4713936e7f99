//! # wheeler-api — Binary Entry Point
//!
//! `wheeler-api [serve]` starts the HTTP server (default port 5000).
//! `wheeler-api token` prints a signed bearer token for local development
//! and operator scripts.

use std::net::SocketAddr;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;
use wheeler_api::auth::{SecretToken, TokenVerifier};
use wheeler_api::config::{LogFormat, Settings};
use wheeler_core::Role;

/// Wheeler Dealer marketplace backend.
#[derive(Parser, Debug)]
#[command(name = "wheeler-api", version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    settings: Settings,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Mint a bearer token signed with the configured secret.
    Token {
        /// Subject user id. A random id is used when omitted.
        #[arg(long)]
        subject: Option<Uuid>,

        #[arg(long, value_enum, default_value_t = RoleArg::Standard)]
        role: RoleArg,

        /// Lifetime in hours.
        #[arg(long, default_value_t = 24)]
        ttl_hours: i64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Standard,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Standard => Role::Standard,
            RoleArg::Admin => Role::Admin,
        }
    }
}

fn init_tracing(format: LogFormat) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

fn token_ttl(hours: i64) -> anyhow::Result<chrono::Duration> {
    chrono::Duration::try_hours(hours)
        .with_context(|| format!("--ttl-hours {hours} is out of range"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.settings.log_format);

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.settings).await,
        Command::Token {
            subject,
            role,
            ttl_hours,
        } => {
            let verifier = TokenVerifier::new(&SecretToken::new(cli.settings.jwt_secret.clone()))
                .context("invalid JWT secret")?;
            let subject = subject.unwrap_or_else(Uuid::new_v4);
            let ttl = token_ttl(ttl_hours)?;
            let token = verifier
                .issue(subject, role.into(), ttl)
                .context("failed to sign token")?;
            println!("{token}");
            Ok(())
        }
    }
}

async fn serve(settings: &Settings) -> anyhow::Result<()> {
    tracing::debug!(?settings, "starting with settings");

    let state = wheeler_api::bootstrap::bootstrap(settings)
        .await
        .inspect_err(|e| tracing::error!("Bootstrap failed: {e:#}"))?;

    let app = wheeler_api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("Wheeler Dealer API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
