//! runbox server binary

use anyhow::{Context, Result};
use clap::Parser;
use runbox_sandbox::SandboxService;
use runbox_server::config::ENV_CONFIG;
use runbox_server::{
    init_tracing, serve, shutdown_signal, AppState, ConfigOverrides, LogFormat, ServerConfig,
};
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "runbox-server")]
#[command(about = "Screen and execute untrusted code snippets over HTTP", long_about = None)]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = ENV_CONFIG)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to bind
    #[arg(short, long)]
    port: Option<u16>,

    /// Timeout applied when a request gives none
    #[arg(long)]
    default_timeout_ms: Option<u64>,

    /// Interpreter executable
    #[arg(long)]
    interpreter: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            host: self.host.clone(),
            port: self.port,
            default_timeout_ms: self.default_timeout_ms,
            interpreter: self.interpreter.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let mut config = ServerConfig::load(args.config.as_deref())?;
    config.apply_overrides(&args.overrides());
    config.validate().context("Invalid configuration")?;

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    init_tracing(args.verbose, args.log_format)?;

    info!(
        interpreter = %config.sandbox.interpreter.program,
        default_timeout_ms = config.sandbox.limits.default_timeout.as_millis() as u64,
        grace_period_ms = config.sandbox.limits.grace_period.as_millis() as u64,
        allowed_modules = ?config.sandbox.policy.allowed_modules,
        "Configuration loaded"
    );

    let service = SandboxService::from_config(&config.sandbox)?;
    let state = AppState::new(service);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    serve(listener, state, shutdown_signal()).await
}
