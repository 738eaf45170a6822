use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "warelay")]
#[command(about = "warelay CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Run the API server (relays send requests to the WhatsApp Web bridge). The bridge must be paired separately (QR scan against the bridge itself).
    Serve {
        /// Config file path (default: WARELAY_CONFIG_PATH or ~/.warelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,

        /// HTTP port (default from config or 3000)
        #[arg(long, short)]
        port: Option<u16>,
    },

    /// Query a running server's /status and print the JSON.
    Status {
        /// Config file path (default: WARELAY_CONFIG_PATH or ~/.warelay/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<std::path::PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("warelay {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Serve { config, port }) => {
            if let Err(e) = run_serve(config, port).await {
                log::error!("serve failed: {}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Status { config }) => {
            if let Err(e) = run_status(config).await {
                log::error!("status failed: {}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

async fn run_serve(
    config_path: Option<std::path::PathBuf>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let (mut config, _path) = lib::config::load_config(config_path)?;
    if let Some(p) = port {
        config.api.port = p;
    }
    log::info!("starting api on {}:{}", config.api.bind, config.api.port);
    lib::api::run_api(config).await
}

async fn run_status(config_path: Option<std::path::PathBuf>) -> anyhow::Result<()> {
    let (config, _path) = lib::config::load_config(config_path)?;
    let url = format!("http://{}:{}/status", config.api.bind, config.api.port);
    let res = reqwest::get(&url).await?;
    if !res.status().is_success() {
        anyhow::bail!("GET {} returned {}", url, res.status());
    }
    let status: serde_json::Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&status)?);
    Ok(())
}
