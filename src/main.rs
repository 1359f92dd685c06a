use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use pollclient::models::{CreatePollRequest, Credentials, Poll, RegisterRequest, VoteRequest};
use pollclient::storage::StorageError;
use pollclient::{
    ApiClient, ApiError, ClientConfig, ConfigError, FileStorage, HttpApi, KeyValueStore, PollStore, SessionStore,
    StoreError,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("storage: {0}")]
    Storage(#[from] StorageError),
    #[error("http client: {0}")]
    Api(#[from] ApiError),
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("not logged in; run `pollctl login` first")]
    NotLoggedIn,
    #[error("{0}")]
    PollList(String),
}

#[derive(Parser, Debug)]
#[command(name = "pollctl", about = "Poll backend client with a persisted session")]
struct Cli {
    /// API base URL, overriding `POLL_API_BASE_URL`.
    #[arg(long)]
    base_url: Option<String>,

    /// Session storage file, overriding `POLL_STORAGE_PATH`.
    #[arg(long)]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "POLL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "POLL_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Logout,
    Whoami,
    Polls(PollsCommand),
}

#[derive(Args, Debug)]
struct PollsCommand {
    #[command(subcommand)]
    command: PollsSubcommand,
}

#[derive(Subcommand, Debug)]
enum PollsSubcommand {
    List,
    Show {
        id: i64,
        #[arg(long)]
        public: bool,
    },
    Create {
        #[arg(long)]
        title: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long = "option", required = true)]
        options: Vec<String>,
        #[arg(long)]
        expires_at: Option<String>,
    },
    Vote {
        poll_id: i64,
        option_id: i64,
        #[arg(long)]
        public: bool,
    },
    Results {
        id: i64,
        #[arg(long)]
        public: bool,
    },
    Delete {
        id: i64,
    },
}

struct CliContext {
    session: SessionStore,
    polls: PollStore,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn build_context(base_url: Option<&str>, storage_path: Option<PathBuf>) -> Result<CliContext, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(url) = base_url {
        config = config.with_base_url(url)?;
    }
    if let Some(path) = storage_path {
        config.storage_path = path;
    }

    let storage: Arc<dyn KeyValueStore> = Arc::new(FileStorage::open(&config.storage_path)?);
    let api: Arc<dyn ApiClient> = Arc::new(HttpApi::new(&config, storage.clone())?);

    let session = SessionStore::new(api.clone(), storage);
    session.init_auth();
    Ok(CliContext { session, polls: PollStore::new(api) })
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let ctx = build_context(cli.base_url.as_deref(), cli.storage)?;

    match cli.command {
        Command::Login { username, password } => {
            let data = ctx.session.login(&Credentials { username, password }).await?;
            eprintln!("logged in as {}", data.user.username);
            print_json(&data.user)
        }
        Command::Register { username, email, password } => {
            let data = ctx
                .session
                .register(&RegisterRequest { username, email, password })
                .await?;
            eprintln!("registered {}", data.user.username);
            print_json(&data.user)
        }
        Command::Logout => {
            ctx.session.logout();
            eprintln!("logged out");
            Ok(())
        }
        Command::Whoami => {
            let user = ctx.session.user().ok_or(CliError::NotLoggedIn)?;
            print_json(&user)
        }
        Command::Polls(polls) => run_polls(&ctx, polls.command).await,
    }
}

async fn run_polls(ctx: &CliContext, command: PollsSubcommand) -> Result<(), CliError> {
    let store = &ctx.polls;
    match command {
        PollsSubcommand::List => {
            store.fetch_polls().await;
            if let Some(message) = store.error() {
                return Err(CliError::PollList(message));
            }
            print_json(&store.polls())
        }
        PollsSubcommand::Show { id, public } => print_json(&store.fetch_poll_by_id(id, public).await?),
        PollsSubcommand::Create { title, description, options, expires_at } => {
            let poll = store
                .create_poll(&CreatePollRequest { title, description, options, expires_at })
                .await?;
            eprintln!("created poll: {}", poll.id());
            print_json(&poll)
        }
        PollsSubcommand::Vote { poll_id, option_id, public } => {
            let body = store.vote_poll(&VoteRequest { poll_id, option_id }, public).await?;
            print_json(&body)
        }
        PollsSubcommand::Results { id, public } => {
            let body = store.get_poll_results(id, public).await?;
            if let Ok(poll) = serde_json::from_value::<Poll>(body.clone()) {
                for option in poll.options() {
                    eprintln!("{:>6.1}%  {}", poll.vote_share(option.id), option.option_text);
                }
            }
            print_json(&body)
        }
        PollsSubcommand::Delete { id } => {
            store.delete_poll(id).await?;
            eprintln!("deleted poll: {id}");
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
