use std::{env, path::PathBuf};

/// Process-level settings read from the environment (and `.env`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub config_path: PathBuf,
    pub keypair_path: PathBuf,
    pub rpc_url: Option<String>,
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            config_path: env::var("CONFIG_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("./config/config.json")),
            keypair_path: env::var("KEYPAIR_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_keypair_path()),
            rpc_url: env::var("RPC_URL").ok().filter(|url| !url.trim().is_empty()),
        }
    }
}

/// The Solana CLI default keypair location.
fn default_keypair_path() -> PathBuf {
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".config/solana/id.json")
}
