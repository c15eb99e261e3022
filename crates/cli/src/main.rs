mod job_commands;

use std::{io::Read, path::PathBuf};

use {
    anyhow::Context,
    chrono_tz::Tz,
    clap::{Parser, Subcommand},
    dailybot_config::{BotConfig, DEFAULT_TIMEZONE},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "dailybot", about = "dailybot: LINE push summaries and webhook acknowledgments")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides BIND).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides PORT).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server and scheduler (default when no subcommand is provided).
    Serve,
    /// List scheduled jobs and their next fire times.
    Jobs {
        #[arg(long, env = "BOT_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
        timezone: String,
    },
    /// Build one job's message and push it now.
    RunJob { name: String },
    /// Build one job's message and print it without pushing.
    Preview { name: String },
    /// Print the X-Line-Signature for a request body (file, or stdin).
    Sign {
        file: Option<PathBuf>,
        #[arg(long, env = "LINE_CHANNEL_SECRET", hide_env_values = true)]
        secret: String,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Environment config with CLI overrides applied.
fn load_config(cli: &Cli) -> anyhow::Result<BotConfig> {
    let mut config = BotConfig::from_env().context("configuration is incomplete")?;
    if let Some(bind) = &cli.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    Ok(config)
}

fn sign_body(file: Option<&PathBuf>, secret: &str) -> anyhow::Result<()> {
    let body = match file {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
        },
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("failed to read stdin")?;
            buf
        },
    };
    println!("{}", dailybot_line::sign(&body, secret)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);

    match &cli.command {
        None | Some(Commands::Serve) => {
            let config = load_config(&cli)?;
            info!(version = env!("CARGO_PKG_VERSION"), "dailybot starting");
            dailybot_gateway::server::start_gateway(config).await
        },
        Some(Commands::Jobs { timezone }) => {
            let timezone: Tz = timezone
                .parse()
                .map_err(|_| anyhow::anyhow!("unknown timezone: {timezone}"))?;
            job_commands::list(timezone)
        },
        Some(Commands::RunJob { name }) => job_commands::run(&load_config(&cli)?, name).await,
        Some(Commands::Preview { name }) => {
            job_commands::preview(&load_config(&cli)?, name).await
        },
        Some(Commands::Sign { file, secret }) => sign_body(file.as_ref(), secret),
    }
}
