#![deny(unsafe_code)]

mod commands;
mod exit_code;

use std::io;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
#[cfg(feature = "tokio-console")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use panshare_client::{ClientConfig, ClientError, Credentials, DEFAULT_BASE_URL, PanClient};
use panshare_core::{Error as NamespaceError, GatewayError, Namespace, NamespaceConfig};

use crate::commands::{ls, serve, url};

/// Serve a 123pan drive and its shared links over WebDAV
#[derive(Parser)]
#[command(name = "panshare")]
#[command(author, version)]
#[command(propagate_version = true)]
#[command(after_help = "EXAMPLES:
    # Serve the drive and every active share on port 8123
    panshare -u 13800000000 -p secret serve

    # List a public share
    PANSHARE_TOKEN=eyJ... panshare ls /abcd-wxyz

    # Print the download URL of a file
    panshare url /0/docs/report.pdf
")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Account name (phone number or e-mail)
    #[arg(short, long, env = "PANSHARE_USER", global = true)]
    user: Option<String>,

    /// Account password (prefer PANSHARE_PASSWORD)
    #[arg(short, long, env = "PANSHARE_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Access token from a previous login, used instead of user and password
    #[arg(short, long, env = "PANSHARE_TOKEN", hide_env_values = true, global = true)]
    token: Option<String>,

    /// Base URL of the remote web API
    #[arg(long, env = "PANSHARE_API_URL", default_value = DEFAULT_BASE_URL, global = true, hide = true)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the namespace over WebDAV
    Serve(serve::Args),

    /// List a folder of the namespace
    Ls(ls::Args),

    /// Print the signed download URL of a file
    Url(url::Args),
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            let code = categorize_error(&e);

            // Only print error if not quiet mode (quiet is parsed separately for this)
            let is_quiet = std::env::args().any(|a| a == "-q" || a == "--quiet");
            if !is_quiet {
                eprintln!("Error: {e:#}");
            }

            ExitCode::from(code)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if !cli.quiet {
        setup_tracing(cli.verbose);
    }

    let credentials = Credentials::from_parts(
        cli.user.as_deref().unwrap_or_default(),
        cli.password.as_deref().unwrap_or_default(),
        cli.token.as_deref().unwrap_or_default(),
    )
    .ok_or(CliError::MissingCredentials)?;

    let config = ClientConfig::default().with_base_url(cli.api_url.clone());
    let client = PanClient::new(config, credentials).context("Failed to create API client")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    runtime.block_on(async move {
        let ns = connect(client).await?;
        match cli.command {
            Commands::Serve(args) => serve::execute(ns, &args, cli.quiet).await,
            Commands::Ls(args) => ls::execute(&ns, &args).await,
            Commands::Url(args) => url::execute(&ns, &args).await,
        }
    })
}

/// Sign in and wrap the client in a namespace.
async fn connect(client: PanClient) -> Result<Arc<Namespace>> {
    client.login().await.context("Login failed")?;
    Ok(Namespace::new(Arc::new(client), NamespaceConfig::default()).into_shared())
}

/// Errors raised by the command line itself.
#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("no credentials: pass --token, or --user and --password (or set PANSHARE_TOKEN)")]
    MissingCredentials,
}

/// Set up tracing/logging based on verbosity level
fn setup_tracing(verbose: u8) {
    let filter = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    #[cfg(feature = "tokio-console")]
    {
        use std::net::SocketAddr;
        use tracing_subscriber::Layer;

        let console_port: u16 = std::env::var("TOKIO_CONSOLE_PORT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(6669);

        let console_addr: SocketAddr = ([127, 0, 0, 1], console_port).into();
        let port_available = std::net::TcpListener::bind(console_addr).is_ok();

        let fmt_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into());

        if port_available {
            let console_layer = console_subscriber::ConsoleLayer::builder()
                .server_addr(console_addr)
                .spawn();
            tracing_subscriber::registry()
                .with(console_layer)
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_filter(fmt_filter))
                .init();
            tracing::info!("tokio-console enabled, connect with: tokio-console http://127.0.0.1:{}", console_port);
        } else {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_filter(fmt_filter))
                .init();
            tracing::warn!(
                "tokio-console port {} already in use, running without console instrumentation.",
                console_port
            );
        }
    }

    #[cfg(not(feature = "tokio-console"))]
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(io::stderr)
        .init();
}

/// Categorize an error into an exit code using typed error downcasting
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if cause.downcast_ref::<CliError>().is_some() {
            return exit_code::USAGE;
        }

        if let Some(ns_err) = cause.downcast_ref::<NamespaceError>() {
            match ns_err {
                NamespaceError::NotFound(_) => return exit_code::NOT_FOUND,
                NamespaceError::Remote(gateway_err) => return gateway_exit_code(gateway_err),
            }
        }

        if let Some(gateway_err) = cause.downcast_ref::<GatewayError>() {
            return gateway_exit_code(gateway_err);
        }

        if let Some(client_err) = cause.downcast_ref::<ClientError>() {
            return match client_err {
                ClientError::BaseUrl { .. } => exit_code::USAGE,
                ClientError::Http(_) => exit_code::GENERAL_ERROR,
            };
        }

        if let Some(io_err) = cause.downcast_ref::<io::Error>()
            && io_err.kind() == io::ErrorKind::Interrupted
        {
            return exit_code::CANCELLED;
        }
    }

    exit_code::GENERAL_ERROR
}

fn gateway_exit_code(e: &GatewayError) -> u8 {
    match e {
        GatewayError::Auth(_) => exit_code::AUTH_FAILED,
        GatewayError::Status { .. } | GatewayError::Unavailable(_) | GatewayError::Decode(_) => {
            exit_code::REMOTE_UNAVAILABLE
        }
    }
}
