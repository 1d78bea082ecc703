use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::targets;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub imap: ImapConfig,
    pub targets: TargetsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImapConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub mailbox: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetsConfig {
    pub file: Option<PathBuf>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            imap: ImapConfig {
                server: std::env::var("IMAP_SERVER")
                    .unwrap_or_else(|_| "imap.mail.me.com".to_string()),
                port: std::env::var("IMAP_PORT")
                    .unwrap_or_else(|_| "993".to_string())
                    .parse()?,
                username: std::env::var("IMAP_USERNAME")?,
                password: std::env::var("IMAP_PASSWORD")?,
                mailbox: std::env::var("IMAP_MAILBOX").unwrap_or_else(|_| "INBOX".to_string()),
            },
            targets: TargetsConfig {
                file: std::env::var("TARGET_EMAILS_FILE").ok().map(PathBuf::from),
            },
        })
    }
}

/// Resolve the target sender list with one documented precedence order:
/// explicit addresses win, then the `--file` argument, then the file named
/// in the environment. A missing or unreadable file yields no targets
/// rather than an error; whether an empty list is fatal is the batch
/// orchestrator's call.
pub async fn resolve_targets(
    explicit: Vec<String>,
    file_arg: Option<&Path>,
    config_file: Option<&Path>,
) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit;
    }
    if let Some(path) = file_arg.or(config_file) {
        return targets::load_target_file(path).await;
    }
    Vec::new()
}
