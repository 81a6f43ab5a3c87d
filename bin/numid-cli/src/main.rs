//! numid – terminal chat client for numid-server.

mod attach;
mod chat;
mod client;

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use colored::Colorize;
use numid_core::DEFAULT_MODEL;
use numid_session::{FileStorage, SessionList, SessionStore};
use numid_types::Message;
use tracing_subscriber::EnvFilter;

use crate::chat::ChatLoop;
use crate::client::ApiClient;

#[derive(Parser)]
#[command(name = "numid")]
#[command(about = "Chat with Gemini through a numid server")]
#[command(version)]
struct Cli {
    /// Base URL of the numid server
    #[arg(long, env = "NUMID_SERVER", default_value = "http://localhost:3001", global = true)]
    server: String,

    /// Where sessions are stored (default: the platform data directory)
    #[arg(long, env = "NUMID_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Upstream model to ask for
    #[arg(long, default_value = DEFAULT_MODEL, global = true)]
    model: String,

    /// Log requests and stream handling to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive chat in the active session (the default)
    Chat,
    /// Ask a single question without touching stored sessions
    Ask {
        #[arg(required = true)]
        prompt: Vec<String>,
    },
    /// Manage stored sessions
    Sessions {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Describe an image file
    Describe {
        image: PathBuf,
        /// Instruction sent with the image
        #[arg(long)]
        prompt: Option<String>,
    },
    /// Generate an SVG image from a text prompt
    Svg {
        #[arg(required = true)]
        prompt: Vec<String>,
        /// Write the SVG here instead of stdout
        #[arg(long, short)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum SessionCommands {
    /// List sessions, newest first
    List,
    /// Delete a session by id
    Delete { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let client = ApiClient::new(&cli.server, &cli.model)?;

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => ChatLoop::new(client, open_store(cli.data_dir)?).run().await,
        Commands::Ask { prompt } => {
            let reply = client.chat(&[Message::user(prompt.join(" "))]).await?;
            println!("{reply}");
            Ok(())
        }
        Commands::Sessions { command } => {
            let store = open_store(cli.data_dir)?;
            match command {
                SessionCommands::List => {
                    let sessions = store.load();
                    if sessions.is_empty() {
                        println!("{}", "no sessions".dimmed());
                    } else {
                        chat::print_sessions(&SessionList::open(sessions));
                    }
                }
                SessionCommands::Delete { id } => {
                    let mut list = SessionList::open(store.load());
                    if !list.delete(&id) {
                        bail!("no session {id}");
                    }
                    store.save(list.sessions());
                    println!("{}", format!("deleted session {id}").dimmed());
                }
            }
            Ok(())
        }
        Commands::Describe { image, prompt } => {
            let attachment = attach::load(&image)?;
            let mime_type = attachment.mime_type.as_deref().unwrap_or(numid_core::DEFAULT_MIME_TYPE);
            let text = client.describe(&attachment.data_uri, mime_type, prompt.as_deref()).await?;
            println!("{text}");
            Ok(())
        }
        Commands::Svg { prompt, out } => {
            let svg = client.svg(&prompt.join(" ")).await?;
            match out {
                Some(path) => {
                    std::fs::write(&path, &svg).with_context(|| format!("failed to write {}", path.display()))?;
                    println!("{}", format!("wrote {}", path.display()).dimmed());
                }
                None => {
                    let mut stdout = std::io::stdout();
                    stdout.write_all(svg.as_bytes())?;
                    stdout.write_all(b"\n")?;
                }
            }
            Ok(())
        }
    }
}

fn open_store(data_dir: Option<PathBuf>) -> anyhow::Result<SessionStore<FileStorage>> {
    let dir = data_dir
        .or_else(FileStorage::default_dir)
        .context("could not determine a data directory; pass --data-dir")?;
    tracing::debug!(dir = %dir.display(), "session storage");
    Ok(SessionStore::new(FileStorage::new(dir)))
}
