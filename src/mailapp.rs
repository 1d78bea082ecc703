use async_trait::async_trait;
use tokio::process::Command;

/// Coordination hook for a local mail client that would fight the cleanup
/// over mailbox state (re-syncing messages as they are expunged). The
/// engine only ever talks to this trait; platform detection lives in the
/// implementations, picked once at startup.
#[async_trait]
pub trait MailClientGuard: Send + Sync {
    /// Whether a competing local mail client is currently running.
    async fn is_running(&self) -> bool;

    /// Ask the client to shut down.
    async fn request_close(&self) -> anyhow::Result<()>;
}

/// Apple Mail on macOS, driven through AppleScript.
pub struct AppleMailGuard;

#[async_trait]
impl MailClientGuard for AppleMailGuard {
    async fn is_running(&self) -> bool {
        let script = r#"tell application "System Events" to (name of processes) contains "Mail""#;
        match Command::new("osascript").arg("-e").arg(script).output().await {
            Ok(output) => String::from_utf8_lossy(&output.stdout)
                .to_lowercase()
                .contains("true"),
            Err(err) => {
                tracing::warn!("Could not check for a running Mail app: {err}");
                false
            }
        }
    }

    async fn request_close(&self) -> anyhow::Result<()> {
        let script = r#"tell application "Mail" to quit"#;
        Command::new("osascript").arg("-e").arg(script).output().await?;
        tracing::info!("Asked Mail to quit");
        Ok(())
    }
}

/// Platforms without a mail client we know how to talk to.
pub struct NoopGuard;

#[async_trait]
impl MailClientGuard for NoopGuard {
    async fn is_running(&self) -> bool {
        false
    }

    async fn request_close(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Pick the guard implementation for the current platform.
pub fn platform_guard() -> Box<dyn MailClientGuard> {
    if cfg!(target_os = "macos") {
        Box::new(AppleMailGuard)
    } else {
        Box::new(NoopGuard)
    }
}
