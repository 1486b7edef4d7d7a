//! Peach CLI
//!
//! # Configuration
//!
//! Configuration is resolved with priority:
//!
//! 1. CLI arguments (highest priority)
//! 2. Environment variables (`PEACH_*`)
//! 3. Config file (`~/.config/peach/config.toml`, or `--config`)
//! 4. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `PEACH_BASE_URL`: API root, absolute or relative to the origin
//! - `PEACH_ORIGIN`: scheme and host used to resolve a relative API root
//! - `PEACH_NAMESPACE`: session namespace
//! - `PEACH_AUTO_INIT`: log in with stored credentials before commands
//! - `PEACH_STATE_DIR`: directory for session files
//! - `RUST_LOG`: log filter (default: `warn`)

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use peach_application::ports::{EventSink, HttpTransport, StateStore};
use peach_application::{ClientConfig, ClientResult, Credentials, PeachClient, Registration};
use peach_infrastructure::{BroadcastEventBus, ConfigLoader, FileStateStore, ReqwestTransport};
use serde_json::Value;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

/// Command line client for the Peach social API
#[derive(Parser, Debug)]
#[command(name = "peach")]
#[command(version, about, long_about = None)]
struct Args {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// API root (also: PEACH_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Origin for a relative API root (also: PEACH_ORIGIN)
    #[arg(long, global = true)]
    origin: Option<Url>,

    /// Session namespace (also: PEACH_NAMESPACE)
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Directory for session files (also: PEACH_STATE_DIR)
    #[arg(long, global = true)]
    state_dir: Option<PathBuf>,

    /// Skip the stored-credential login before the command
    #[arg(long, global = true)]
    no_init: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session.
    Login {
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Create an account and store the session.
    Register {
        /// Display name
        name: String,
        /// Account email
        email: String,
        /// Account password
        password: String,
    },
    /// Forget the session token (stored credentials are kept).
    Logout,
    /// Show the session phase and user id.
    Status,
    /// List connections.
    Connections,
    /// List suggested streams.
    Explore,
    /// Show a user's stream.
    Stream {
        /// Stream id, or "me"
        #[arg(default_value = "me")]
        id: String,
    },
    /// Show your own profile.
    Me,
    /// Publish a text post.
    Post {
        /// Post text
        text: String,
    },
    /// Like a post.
    Like {
        /// Post id
        post_id: String,
    },
    /// Remove a like from a post.
    Unlike {
        /// Post id
        post_id: String,
    },
    /// Read or change stream visibility.
    Visibility {
        #[command(subcommand)]
        action: VisibilityAction,
    },
    /// Send a connection request.
    AddFriend {
        /// Username to connect with
        username: String,
    },
}

#[derive(Subcommand, Debug)]
enum VisibilityAction {
    /// Show current settings.
    Get,
    /// Replace settings with a JSON object, e.g. '{"friendsOnly":true}'.
    Set {
        /// Settings as JSON
        settings: String,
    },
}

impl Command {
    /// Commands that manage the session themselves.
    const fn skips_init(&self) -> bool {
        matches!(
            self,
            Self::Login { .. } | Self::Register { .. } | Self::Logout | Self::Status
        )
    }
}

fn resolve_config(args: &Args) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let mut loader = ConfigLoader::new();
    if let Some(path) = &args.config {
        loader = loader.with_file(path);
    }
    let mut config = loader.load()?;

    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }
    if let Some(origin) = &args.origin {
        config.origin = Some(origin.clone());
    }
    if let Some(namespace) = &args.namespace {
        config.namespace.clone_from(namespace);
    }
    if let Some(state_dir) = &args.state_dir {
        config.state_dir = Some(state_dir.clone());
    }
    Ok(config)
}

async fn run(client: &PeachClient, command: Command) -> ClientResult<Value> {
    match command {
        Command::Login { email, password } => {
            client.login(&Credentials::new(email, password)).await
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            client
                .register(&Registration::new(name, email, password))
                .await
        }
        Command::Logout => client.logout().await.map(|()| Value::Null),
        Command::Status => {
            let state = client.session().await?;
            Ok(serde_json::json!({
                "namespace": client.store().namespace(),
                "phase": client.phase().await?.to_string(),
                "id": state.id,
                "email": state.email,
            }))
        }
        Command::Connections => client.connections().await,
        Command::Explore => client.explore().await,
        Command::Stream { id } => client.user_stream(id).await,
        Command::Me => client.me().await,
        Command::Post { text } => client.post(text).await,
        Command::Like { post_id } => client.like(&post_id).await,
        Command::Unlike { post_id } => client.unlike(&post_id).await,
        Command::Visibility { action } => match action {
            VisibilityAction::Get => client.get_visibility().await,
            VisibilityAction::Set { settings } => {
                let settings: Value = serde_json::from_str(&settings)?;
                client.set_visibility(settings).await
            }
        },
        Command::AddFriend { username } => client.add_friend(&username).await,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config)?);
    let store: Arc<dyn StateStore> = Arc::new(FileStateStore::for_config(&config).await?);
    let bus = BroadcastEventBus::new();
    let mut events = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(channel = event.name(), "session event");
        }
    });
    let sink: Arc<dyn EventSink> = Arc::new(bus);

    let auto_init = config.auto_init && !args.no_init && !args.command.skips_init();
    let client = PeachClient::new(config, transport, store, sink);

    if auto_init
        && !client.is_logged_in().await?
        && let Err(error) = client.init().await
    {
        eprintln!("Error: {error}");
        return Ok(ExitCode::FAILURE);
    }

    match run(&client, args.command).await {
        Ok(Value::Null) => Ok(ExitCode::SUCCESS),
        Ok(data) => {
            println!("{}", serde_json::to_string_pretty(&data)?);
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            match error.status() {
                Some(status) => eprintln!("Error ({status}): {error}"),
                None => eprintln!("Error: {error}"),
            }
            Ok(ExitCode::FAILURE)
        }
    }
}
