use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};

use petal_db::{Backend, RemoteConfig};

#[derive(Debug, Clone)]
pub enum StoreConfig {
    Local { db_path: PathBuf },
    Remote(RemoteConfig),
}

impl StoreConfig {
    pub fn backend(&self) -> Backend {
        match self {
            Self::Local { .. } => Backend::Local,
            Self::Remote(_) => Backend::Remote,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub store: StoreConfig,
    pub require_message: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unset keys fall back to defaults.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str, default: &str| var(key).unwrap_or_else(|| default.into());

        let host = get("PETAL_HOST", "0.0.0.0");
        let port: u16 = get("PETAL_PORT", "3000")
            .parse()
            .context("PETAL_PORT must be a port number")?;
        let addr: SocketAddr = format!("{}:{}", host, port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", host, port))?;

        let store = match get("PETAL_BACKEND", "local").as_str() {
            "local" => StoreConfig::Local {
                db_path: PathBuf::from(get("PETAL_DB_PATH", "petal.db")),
            },
            "remote" => {
                let base_url = var("PETAL_REMOTE_URL")
                    .context("PETAL_REMOTE_URL is required for the remote backend")?;
                let auth_url = var("PETAL_REMOTE_AUTH_URL")
                    .context("PETAL_REMOTE_AUTH_URL is required for the remote backend")?;

                let mut remote = RemoteConfig::new(base_url, auth_url);
                if let Some(collection) = var("PETAL_REMOTE_COLLECTION") {
                    remote.collection = collection;
                }
                remote.server_ordering = parse_flag(&get("PETAL_REMOTE_SERVER_ORDERING", "false"))
                    .context("PETAL_REMOTE_SERVER_ORDERING must be true or false")?;
                let secs: u64 = get("PETAL_REMOTE_TIMEOUT_SECS", "10")
                    .parse()
                    .context("PETAL_REMOTE_TIMEOUT_SECS must be a whole number")?;
                remote.timeout = Duration::from_secs(secs);
                StoreConfig::Remote(remote)
            }
            other => bail!("unknown PETAL_BACKEND {:?} (expected local or remote)", other),
        };

        let require_message = parse_flag(&get("PETAL_REQUIRE_MESSAGE", "true"))
            .context("PETAL_REQUIRE_MESSAGE must be true or false")?;

        Ok(Self {
            addr,
            store,
            require_message,
        })
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
