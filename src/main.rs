mod cleaner;
mod config;
mod mailapp;
mod targets;

use anyhow::Context;
use clap::Parser;

use cleaner::{run_batch, ImapMailbox, RetryPolicy};
use config::AppConfig;

/// Bulk-delete mailbox messages from unwanted senders over IMAP.
#[derive(Debug, Parser)]
#[command(name = "mailsweep", version, about)]
struct Cli {
    /// Sender address to clean up; repeat the flag for several senders
    #[arg(long = "email", value_name = "ADDRESS")]
    emails: Vec<String>,

    /// File with one target sender address per line
    #[arg(long, value_name = "PATH")]
    file: Option<std::path::PathBuf>,

    /// Leave a running local mail client alone
    #[arg(long)]
    keep_mail_open: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let cfg = AppConfig::from_env()?;
    tracing::info!("mailsweep starting...");
    tracing::info!("Server: {}:{}", cfg.imap.server, cfg.imap.port);
    tracing::info!("Account: {} ({})", cfg.imap.username, cfg.imap.mailbox);

    let senders = config::resolve_targets(
        cli.emails,
        cli.file.as_deref(),
        cfg.targets.file.as_deref(),
    )
    .await;

    let guard = if cli.keep_mail_open {
        None
    } else {
        Some(mailapp::platform_guard())
    };

    let transport = ImapMailbox::new(
        cfg.imap.server.clone(),
        cfg.imap.port,
        cfg.imap.username.clone(),
        cfg.imap.password.clone(),
        cfg.imap.mailbox.clone(),
    );

    let report = run_batch(transport, RetryPolicy::default(), &senders, guard.as_deref())
        .await
        .context("mailbox cleanup failed")?;

    // Human-readable summary; the detailed trail is in the logs.
    for sender in &report.senders {
        if sender.errors.is_empty() {
            println!("{}: {} deleted", sender.sender, sender.deleted);
        } else {
            println!(
                "{}: {} deleted, {} error(s)",
                sender.sender,
                sender.deleted,
                sender.errors.len()
            );
            for err in &sender.errors {
                println!("  - {err}");
            }
        }
    }
    println!("Total: {} email(s) deleted", report.total());

    Ok(())
}
