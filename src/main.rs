use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use tunebuddy::{Commands, Container, ContainerConfig, Router, DEFAULT_END_USER};

#[derive(Parser)]
#[command(name = "tunebuddy")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(short, long, global = true, default_value = "~/.tunebuddy")]
    data_dir: String,

    /// Keep sessions in memory for this run only
    #[arg(long, global = true)]
    memory_storage: bool,

    /// Do not save chat history
    #[arg(long, global = true, conflicts_with = "memory_storage")]
    no_persist: bool,

    /// Answer with a canned reply instead of calling the API
    #[arg(long, global = true)]
    mock_recommendations: bool,

    /// Send the API's conversation id back on follow-up questions
    #[arg(long, global = true)]
    retain_context: bool,

    /// End-user identifier sent to the API
    #[arg(long, global = true, default_value = DEFAULT_END_USER)]
    user: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let data_dir = expand_tilde(&cli.data_dir);
    debug!("Data dir: {}", data_dir);

    let container = Container::new(ContainerConfig {
        data_dir,
        memory_storage: cli.memory_storage,
        no_persist: cli.no_persist,
        mock_recommendations: cli.mock_recommendations,
        retain_context: cli.retain_context,
        user: cli.user,
    });

    let router = Router::new(&container);
    let output = router.route(cli.command.unwrap_or_default()).await?;
    println!("{}", output);

    Ok(())
}

fn expand_tilde(path: &str) -> String {
    if path == "~" || path.starts_with("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            if path == "~" {
                return home.to_string_lossy().to_string();
            }
            return path.replacen("~", &home.to_string_lossy(), 1);
        }
    }
    path.to_string()
}
