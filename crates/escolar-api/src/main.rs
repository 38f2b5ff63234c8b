//! escolar-server binary.
//!
//! Reads `config.toml` (or the path given with `--config`) layered with
//! `ESCOLAR_*` environment variables, opens the SQLite store, and either
//! serves the HTTP API or runs one of the provisioning commands.
//!
//! ```text
//! escolar-server add-user --username ana --first-name Ana \
//!   --last-name López --email ana@example.edu --role student
//! escolar-server issue-token --username ana
//! escolar-server remove-user --username ana
//! escolar-server serve
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use escolar_api::{AppState, ServerConfig, provision};
use escolar_core::actor::{NewIdentity, Role};
use escolar_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Escolar academic events server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API. The default when no command is given.
  Serve,

  /// Create an identity, with an empty profile for its role.
  AddUser {
    #[arg(long)]
    username:   String,
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name:  String,
    #[arg(long)]
    email:      String,
    /// administrator, student or teacher. Omit for an identity that only
    /// sees general-public events.
    #[arg(long)]
    role:       Option<Role>,
  },

  /// Issue a bearer token for an existing identity. The token is printed
  /// once and only its digest is stored.
  IssueToken {
    #[arg(long)]
    username: String,
  },

  /// Delete an identity with its profile, tokens and the events it owns.
  RemoveUser {
    #[arg(long)]
    username: String,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8000)?
    .set_default("store_path", "escolar.db")?
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("ESCOLAR"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(store, server_cfg).await,
    Command::AddUser { username, first_name, last_name, email, role } => {
      let identity = provision::add_user(&store, NewIdentity {
        username,
        first_name,
        last_name,
        email,
        role,
      })
      .await
      .context("failed to create identity")?;
      println!("{}", identity.identity_id);
      Ok(())
    }
    Command::IssueToken { username } => {
      let token = provision::issue_token(&store, &username)
        .await
        .context("failed to issue token")?;
      println!("{token}");
      Ok(())
    }
    Command::RemoveUser { username } => {
      provision::remove_user(&store, &username)
        .await
        .context("failed to remove identity")?;
      Ok(())
    }
  }
}

async fn serve(store: SqliteStore, server_cfg: ServerConfig) -> anyhow::Result<()> {
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);
  let state = AppState { store: Arc::new(store) };
  let app = escolar_api::router(state);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
