use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use tokio::net::TcpListener;

use minidoc::config::{DEFAULT_HOST, DEFAULT_PORT};
use minidoc::logger::Logger;
use minidoc::{AppState, Config, DocError, Templates, router};

/// Serve a tree of slide decks, articles and HTML pages
#[derive(Parser, Debug)]
#[command(name = "minidoc", version, about)]
struct Cli {
    /// Directory to serve
    #[arg(long, env = "MINIDOC_ROOT", default_value = ".")]
    root: PathBuf,

    /// Directory holding the page templates
    #[arg(long, env = "MINIDOC_TEMPLATES", default_value = "templates")]
    templates: PathBuf,

    #[arg(long, env = "MINIDOC_HOST", default_value = DEFAULT_HOST)]
    host: String,

    #[arg(long, env = "MINIDOC_PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Mark runnable Go snippets as playable
    #[arg(long, env = "MINIDOC_PLAY")]
    play: bool,

    /// Log level: error, warn, info, debug or trace
    #[arg(long)]
    log_level: Option<String>,

    /// Also append log lines to this file
    #[arg(long, env = "MINIDOC_LOG_FILE")]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), DocError> {
    let cli = Cli::parse();
    if let Err(err) = Logger::init(cli.log_level.as_deref(), cli.log_file.clone()) {
        eprintln!("failed to install logger: {err}");
    }

    let config = Config {
        host: cli.host,
        port: cli.port,
        play_enabled: cli.play,
        ..Config::new(cli.root, cli.templates)
    };
    let templates = Templates::load(&config.template_dir, config.play_enabled)
        .inspect_err(|err| error!("Failed to load templates: {}", err))?;

    let addr = config.socket_addr()?;
    info!("Serving {:?} on http://{}", config.root, addr);
    let app = router(AppState::new(config, templates));

    let listener = TcpListener::bind(addr).await.map_err(DocError::Serve)?;
    axum::serve(listener, app).await.map_err(DocError::Serve)?;
    Ok(())
}
