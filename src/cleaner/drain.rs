use super::connection::Connection;
use super::error::EngineError;
use super::ops;
use super::transport::{MailboxTransport, MessageId};

/// Outcome of draining one sender: how many messages went away, plus every
/// error hit along the way, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderReport {
    pub sender: String,
    pub deleted: u64,
    pub errors: Vec<String>,
}

impl SenderReport {
    fn new(sender: &str) -> Self {
        Self {
            sender: sender.to_string(),
            deleted: 0,
            errors: Vec::new(),
        }
    }
}

enum DrainState {
    Searching,
    Processing(Vec<MessageId>),
    Committing,
    Done,
}

/// Basic shape check on a target address: a local part, an `@`, and a
/// domain carrying a dot-separated label. Deliberately far short of
/// RFC 5322; it only has to catch list typos before they are spliced into
/// a search query.
pub fn is_valid_address(addr: &str) -> bool {
    let Some((local, domain)) = addr.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((head, tail)) => !head.is_empty() && !tail.is_empty(),
        None => false,
    }
}

/// Drive the search → flag → expunge cycle for one sender until a search
/// comes back empty. Providers cap how many identifiers a single search
/// returns, so a busy sender takes several rounds before the mailbox is
/// actually clean.
///
/// Failures never escape: a search failure ends this sender's loop, and
/// per-message failures are recorded while processing continues. The
/// caller always gets a report.
pub async fn drain_sender<T: MailboxTransport>(
    conn: &mut Connection<T>,
    sender: &str,
) -> SenderReport {
    let mut report = SenderReport::new(sender);

    if !is_valid_address(sender) {
        tracing::warn!("Skipping {sender:?}: invalid format");
        report
            .errors
            .push(EngineError::Validation(sender.to_string()).to_string());
        return report;
    }

    let mut state = DrainState::Searching;
    loop {
        state = match state {
            DrainState::Searching => match ops::search_sender(conn, sender).await {
                Ok(ids) if ids.is_empty() => DrainState::Done,
                Ok(ids) => {
                    tracing::info!("Found {} message(s) from {sender}", ids.len());
                    DrainState::Processing(ids)
                }
                Err(err) => {
                    report.errors.push(err.to_string());
                    DrainState::Done
                }
            },
            DrainState::Processing(ids) => {
                for id in ids {
                    match ops::fetch_uid(conn, id).await {
                        Ok(Some(uid)) => match ops::mark_deleted(conn, uid).await {
                            Ok(()) => report.deleted += 1,
                            Err(err) => report.errors.push(err.to_string()),
                        },
                        // Already gone, or an unusable FETCH response:
                        // skip, not an error.
                        Ok(None) => {
                            tracing::debug!("Message {id} has no UID, skipping");
                        }
                        Err(err) => report.errors.push(err.to_string()),
                    }
                }
                DrainState::Committing
            }
            DrainState::Committing => match ops::commit(conn).await {
                // Re-search the same sender: the next page of a chunked
                // result set only shows up after the expunge.
                Ok(()) => DrainState::Searching,
                Err(err) => {
                    report.errors.push(err.to_string());
                    DrainState::Done
                }
            },
            DrainState::Done => break,
        };
    }

    tracing::info!(
        "Cleanup for {sender} finished: {} deleted, {} error(s)",
        report.deleted,
        report.errors.len()
    );
    report
}
