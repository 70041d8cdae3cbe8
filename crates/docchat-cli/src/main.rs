use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod display;

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "DocChat - chat with your documents", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Backend base URL (overrides config file and DOCCHAT_BACKEND_URL)
    #[arg(long, global = true)]
    pub backend_url: Option<String>,

    /// Local cache directory (overrides config file and DOCCHAT_CACHE_DIR)
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Keep the local cache in memory only
    #[arg(long, global = true)]
    pub ephemeral: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List chat sessions
    Sessions,
    /// Start a new chat
    New,
    /// Make a chat the active one
    Select { id: String },
    /// Show the active chat
    Show,
    /// Ask a question in the active chat
    Ask {
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// Upload a document into the active chat (creates one if needed)
    Upload { path: PathBuf },
    /// Delete a chat
    Delete { id: String },
    /// Delete every chat and reset local state
    Clear,
    /// Show or set the similarity threshold of the active chat
    Threshold { value: Option<f64> },
    /// Show or update preferences
    Prefs(commands::settings::PrefsArgs),
    /// Toggle light/dark theme
    Theme,
    /// Toggle the collapsed sidebar flag
    Sidebar,
    /// List the documents of every chat
    Docs,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let manager = app::bootstrap(&cli.global).await?;

    match cli.command {
        Commands::Sessions => commands::sessions::list(&manager).await,
        Commands::New => commands::sessions::create(&manager).await,
        Commands::Select { id } => commands::sessions::select(&manager, &id).await,
        Commands::Show => commands::conversation::show(&manager).await,
        Commands::Ask { question } => {
            commands::conversation::ask(&manager, &question.join(" ")).await
        }
        Commands::Upload { path } => commands::conversation::upload(&manager, &path).await,
        Commands::Delete { id } => commands::sessions::delete(&manager, &id).await,
        Commands::Clear => commands::sessions::clear(&manager).await,
        Commands::Threshold { value } => commands::settings::threshold(&manager, value).await,
        Commands::Prefs(args) => commands::settings::prefs(&manager, args).await,
        Commands::Theme => commands::settings::theme(&manager).await,
        Commands::Sidebar => commands::settings::sidebar(&manager).await,
        Commands::Docs => commands::conversation::docs(&manager).await,
    }
}
