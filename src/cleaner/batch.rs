use super::connection::Connection;
use super::drain::{drain_sender, SenderReport};
use super::error::EngineError;
use super::retry::RetryPolicy;
use super::transport::MailboxTransport;
use crate::mailapp::MailClientGuard;

/// Results of one cleanup run: one entry per requested sender, in input
/// order, plus the derived total.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub senders: Vec<SenderReport>,
}

impl BatchReport {
    /// Total messages deleted across all senders.
    pub fn total(&self) -> u64 {
        self.senders.iter().map(|s| s.deleted).sum()
    }
}

/// Run the full cleanup: connect once, drain every sender sequentially over
/// the single session, and always log out at the end.
///
/// An empty target list is a configuration mistake and fails before any
/// connection is attempted. A connection that cannot be established at all
/// aborts the batch; everything past that point is recorded per sender and
/// the run keeps going.
pub async fn run_batch<T: MailboxTransport>(
    transport: T,
    policy: RetryPolicy,
    senders: &[String],
    mail_guard: Option<&dyn MailClientGuard>,
) -> Result<BatchReport, EngineError> {
    if senders.is_empty() {
        return Err(EngineError::NoTargets);
    }

    // A local mail client syncing the same mailbox fights the expunge; ask
    // it to step aside before we start.
    if let Some(guard) = mail_guard {
        if guard.is_running().await {
            tracing::info!("A local mail client is running, asking it to close");
            if let Err(err) = guard.request_close().await {
                tracing::warn!("Could not close the local mail client: {err}");
            }
        }
    }

    let mut conn = Connection::open(transport, policy).await?;

    // Per-sender failures are folded into the reports rather than raised,
    // so nothing between here and `close` can skip the teardown.
    let mut reports = Vec::with_capacity(senders.len());
    for sender in senders {
        reports.push(drain_sender(&mut conn, sender).await);
    }
    conn.close().await;

    let report = BatchReport { senders: reports };
    tracing::info!("Cleanup finished: {} email(s) deleted", report.total());
    Ok(report)
}
