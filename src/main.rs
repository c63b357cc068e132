mod commands;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use anonbox_client::api::types::MessageStatus;
use anonbox_client::session::FileStorage;
use anonbox_client::{AppState, ClientConfig, SessionStore};

use commands::{LinkNavigator, MessageAction};

#[derive(Parser, Debug)]
#[command(name = "anonbox", version, about = "Command-line client for AnonBox anonymous messaging")]
struct Args {
    /// Backend API base URL
    #[arg(long, global = true, env = "ANONBOX_API_URL")]
    api_url: Option<String>,

    /// Web app base URL used to print shareable links
    #[arg(long, global = true, env = "ANONBOX_APP_URL")]
    app_url: Option<String>,

    /// Where the session is kept between runs
    #[arg(long, global = true, value_enum, default_value_t = StorageKind::File)]
    storage: StorageKind,

    /// Request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    File,
    Keychain,
    Memory,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusFilter {
    Unread,
    Read,
}

impl From<StatusFilter> for MessageStatus {
    fn from(value: StatusFilter) -> Self {
        match value {
            StatusFilter::Unread => MessageStatus::Unread,
            StatusFilter::Read => MessageStatus::Read,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a new profile and store its private token
    Register { display_name: String },
    /// Log in with a private token from your private link
    Login { token: String },
    /// Check that the stored session is still valid
    Verify,
    /// Show the current session
    Whoami,
    /// Forget the stored session
    Logout,
    /// Issue a new private token; the old link stops working
    RegenerateToken,
    /// Show a public profile
    Profile { handle: String },
    /// Send an anonymous message
    Send {
        handle: String,
        content: String,
        #[arg(long)]
        prompt: Option<u64>,
    },
    /// List received messages
    Inbox {
        #[arg(long, value_enum)]
        status: Option<StatusFilter>,
        #[arg(long)]
        prompt: Option<u64>,
    },
    /// Mark a message as read
    Read { id: u64 },
    /// Reply to a message
    Reply { id: u64, text: String },
    /// Delete a message
    Delete { id: u64 },
    /// Mark a message as shared
    Share { id: u64 },
    /// Generate a share card for a message and save the image
    Card {
        id: u64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Remove old generated cards
    CleanupCards,
    /// Manage questions
    #[command(subcommand)]
    Prompt(PromptCommand),
    /// Check backend health
    Health,
}

#[derive(Subcommand, Debug)]
enum PromptCommand {
    /// Publish a new question
    Create { text: String },
    /// List the questions of a user
    List { handle: String },
    /// Show one question
    Show { id: u64 },
    /// Delete one of your questions
    Delete { id: u64 },
    /// Count a share of a question
    Share { id: u64 },
}

fn open_session_store(kind: StorageKind) -> SessionStore {
    match kind {
        StorageKind::Memory => SessionStore::in_memory(),
        StorageKind::File => match FileStorage::default_path() {
            Some(path) => {
                log::debug!("Session file: {}", path.display());
                SessionStore::new(FileStorage::new(path))
            }
            None => {
                log::warn!("No config directory found, session will not be kept");
                SessionStore::unavailable()
            }
        },
        #[cfg(feature = "keychain")]
        StorageKind::Keychain => SessionStore::new(anonbox_client::session::KeychainStorage::new()),
        #[cfg(not(feature = "keychain"))]
        StorageKind::Keychain => {
            log::warn!("Built without keychain support, session will not be kept");
            SessionStore::unavailable()
        }
    }
}

/// Apply command-line flags over the environment configuration.
fn apply_overrides(mut config: ClientConfig, args: &Args) -> ClientConfig {
    if let Some(url) = &args.api_url {
        config.api_url = url.trim_end_matches('/').to_string();
    }
    if let Some(url) = &args.app_url {
        config.app_url = url.trim_end_matches('/').to_string();
    }
    if let Some(secs) = args.timeout_secs {
        config.timeout = Duration::from_secs(secs);
    }
    config
}

async fn run(args: Args) -> Result<(), String> {
    let config = apply_overrides(ClientConfig::from_env(), &args);
    log::info!("Using API at {}", config.api_url);

    let navigator = Arc::new(LinkNavigator::new(&config.app_url));
    let mut state = AppState::new(config, open_session_store(args.storage), navigator);

    match args.command {
        Command::Register { display_name } => commands::register(&mut state, &display_name).await,
        Command::Login { token } => commands::login(&mut state, &token).await,
        Command::Verify => commands::verify(&mut state).await,
        Command::Whoami => commands::whoami(&state),
        Command::Logout => commands::logout(&mut state),
        Command::RegenerateToken => commands::regenerate_token(&mut state).await,
        Command::Profile { handle } => commands::profile(&state, &handle).await,
        Command::Send { handle, content, prompt } => commands::send(&state, &handle, &content, prompt).await,
        Command::Inbox { status, prompt } => {
            commands::inbox(&mut state, status.map(MessageStatus::from), prompt).await
        }
        Command::Read { id } => commands::message_action(&mut state, id, MessageAction::Read).await,
        Command::Reply { id, text } => commands::message_action(&mut state, id, MessageAction::Reply(text)).await,
        Command::Delete { id } => commands::message_action(&mut state, id, MessageAction::Delete).await,
        Command::Share { id } => commands::message_action(&mut state, id, MessageAction::Share).await,
        Command::Card { id, output } => commands::card(&mut state, id, output.as_deref()).await,
        Command::CleanupCards => commands::cleanup_cards(&mut state).await,
        Command::Prompt(cmd) => match cmd {
            PromptCommand::Create { text } => commands::prompt_create(&mut state, &text).await,
            PromptCommand::List { handle } => commands::prompt_list(&state, &handle).await,
            PromptCommand::Show { id } => commands::prompt_show(&state, id).await,
            PromptCommand::Delete { id } => commands::prompt_delete(&mut state, id).await,
            PromptCommand::Share { id } => commands::prompt_share(&state, id).await,
        },
        Command::Health => commands::health(&state).await,
    }
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
