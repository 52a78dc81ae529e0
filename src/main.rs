use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use recollector_core::ChatSession;
use recollector_edit::repl::{self, ReplOptions};
use recollector_edit::{ClientConfig, HttpGateway};
use tokio::io::BufReader;
use tracing::info;

/// Edit a generated 3D model by chatting with the Blender backend.
#[derive(Debug, Parser)]
#[command(name = "recollector_edit", version)]
struct Cli {
    /// Task id of the generated model to edit.
    #[arg(long, env = "RECOLLECTOR_TASK_ID")]
    task: String,

    /// Backend base URL.
    #[arg(long, env = "RECOLLECTOR_API_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "RECOLLECTOR_API_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Directory for `/download` when no path is given.
    #[arg(long, env = "RECOLLECTOR_DOWNLOAD_DIR", default_value = ".")]
    download_dir: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the transcript
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "recollector_edit=info,recollector_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ClientConfig::new(cli.base_url, cli.timeout_secs);
    info!(
        "Editing task {} via {} (timeout {:?})",
        cli.task, config.base_url, config.timeout
    );

    let gateway = HttpGateway::new(&config)?;
    let session = ChatSession::new(cli.task, gateway);

    let options = ReplOptions { base_url: config.base_url.clone(), download_dir: cli.download_dir };
    let stdout = Rc::new(RefCell::new(std::io::stdout()));
    repl::run(&session, &options, BufReader::new(tokio::io::stdin()), stdout).await
}
