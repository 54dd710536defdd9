use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quant::config::{Config, LogFormat};
use quant::gateway::{AnalysisGateway, HttpGateway};
use quant::render::{Osc52Clipboard, Theme};
use quant::terminal::{Interrupts, Terminal, ViewExit};

#[derive(Parser)]
#[command(name = "quant")]
#[command(about = "Analyse a social-media profile and chat with an assistant about it")]
struct Args {
    /// Display theme (overrides QUANT_THEME)
    #[arg(long, global = true)]
    theme: Option<Theme>,

    /// Analysis gateway base URL (overrides QUANT_GATEWAY_URL)
    #[arg(long, global = true)]
    gateway_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch a profile, show its metrics, then chat about it
    Analyze {
        /// Profile handle, without the leading @
        username: String,
    },
    /// Analytical chat with charts against sample data
    Demo,
    /// Check that the gateway is reachable
    Health,
}

fn init_tracing(config: &Config) {
    let filter = config
        .logging
        .filter
        .as_deref()
        .and_then(|f| tracing_subscriber::EnvFilter::try_new(f).ok())
        .unwrap_or_else(|| "quant=info".into());

    let (json, pretty) = match config.logging.format {
        LogFormat::Json => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            ),
            None,
        ),
        LogFormat::Pretty => (
            None,
            Some(tracing_subscriber::fmt::layer().with_writer(std::io::stderr)),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}

fn terminal(http: HttpGateway, config: Config) -> Terminal<tokio::io::Stdin, tokio::io::Stdout> {
    let gateway: Arc<dyn AnalysisGateway> = Arc::new(http);
    Terminal::new(
        tokio::io::stdin(),
        tokio::io::stdout(),
        gateway,
        Box::new(Osc52Clipboard::stdout()),
        config,
    )
    .with_interrupts(Interrupts::ctrl_c())
}

async fn check_health(http: &HttpGateway) -> anyhow::Result<()> {
    if http.health().await? {
        println!("Gateway at {} is healthy", http.base_url());
        Ok(())
    } else {
        Err(anyhow::anyhow!("Gateway at {} is not healthy", http.base_url()))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    dotenvy::dotenv().ok();

    let mut config = Config::from_env();
    init_tracing(&config);

    if let Some(theme) = args.theme {
        config.display.theme = theme;
    }
    if let Some(url) = args.gateway_url {
        config.gateway.base_url = url;
    }

    let http = HttpGateway::new(&config.gateway)?;
    tracing::info!("Using analysis gateway at {}", http.base_url());

    let exit = match args.command {
        Command::Health => return check_health(&http).await,
        Command::Analyze { username } => {
            let username = username.trim().trim_start_matches('@').to_string();
            if username.is_empty() {
                return Err(anyhow::anyhow!("A profile handle is required"));
            }
            terminal(http, config).run_analysis(&username).await?
        }
        Command::Demo => terminal(http, config).run_demo().await?,
    };

    match exit {
        ViewExit::Left(route) => tracing::info!(%route, "Left page"),
        ViewExit::EndOfInput => tracing::info!("Input closed"),
    }

    Ok(())
}
