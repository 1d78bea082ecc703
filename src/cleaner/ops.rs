use super::connection::Connection;
use super::error::EngineError;
use super::transport::{MailboxTransport, MessageId, MessageUid};

/// Search for every message from `sender` in the selected mailbox.
///
/// An empty result is a normal outcome, not an error. A dropped session
/// gets one transparent reconnect and re-issue; any other transient
/// failure retries on the shared backoff schedule before surfacing as a
/// `Search` error.
pub async fn search_sender<T: MailboxTransport>(
    conn: &mut Connection<T>,
    sender: &str,
) -> Result<Vec<MessageId>, EngineError> {
    let policy = conn.policy;
    let mut attempt = 0;
    let mut reconnected = false;
    loop {
        match conn.transport.search_from(sender).await {
            Ok(ids) => return Ok(ids),
            Err(err) if err.is_dropped() && !reconnected => {
                tracing::warn!("Session dropped during search for {sender}: {err}");
                conn.mark_dropped();
                conn.ensure_connected().await?;
                reconnected = true;
            }
            Err(err) if err.is_dropped() => {
                return Err(EngineError::Search {
                    sender: sender.to_string(),
                    source: err,
                });
            }
            Err(err) => {
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(EngineError::Search {
                        sender: sender.to_string(),
                        source: err,
                    });
                }
                tracing::warn!("Search attempt {attempt} for {sender} failed: {err}, retrying");
                policy.pause(attempt - 1).await;
            }
        }
    }
}

/// Resolve one search identifier to its stable UID.
///
/// `Ok(None)` means the message vanished (expunged by someone else) or the
/// FETCH response was unusable; callers skip such identifiers. UIDs must be
/// fetched fresh per identifier because sequence numbers go stale whenever
/// the mailbox mutates underneath them.
pub async fn fetch_uid<T: MailboxTransport>(
    conn: &mut Connection<T>,
    id: MessageId,
) -> Result<Option<MessageUid>, EngineError> {
    match conn.transport.fetch_uid(id).await {
        Ok(uid) => Ok(uid),
        Err(err) => {
            if err.is_dropped() {
                conn.mark_dropped();
            }
            Err(EngineError::Fetch { id, source: err })
        }
    }
}

/// Flag one UID for deletion. Retries transiently; exhaustion reports a
/// per-item `Deletion` error and leaves sibling UIDs untouched.
pub async fn mark_deleted<T: MailboxTransport>(
    conn: &mut Connection<T>,
    uid: MessageUid,
) -> Result<(), EngineError> {
    let policy = conn.policy;
    let mut attempt = 0;
    loop {
        conn.ensure_connected().await?;
        match conn.transport.store_deleted(uid).await {
            Ok(()) => return Ok(()),
            Err(err) => {
                if err.is_dropped() {
                    conn.mark_dropped();
                }
                attempt += 1;
                if attempt >= policy.max_attempts {
                    return Err(EngineError::Deletion { uid, source: err });
                }
                tracing::warn!("Store attempt {attempt} for UID {uid} failed: {err}, retrying");
                policy.pause(attempt - 1).await;
            }
        }
    }
}

/// Expunge every flagged message in the mailbox. Retries transiently; a
/// persistent failure is demoted to a `Commit` error the caller records as
/// soft: the `\Deleted` flags survive on the server, so a later pass picks
/// the same messages up again.
pub async fn commit<T: MailboxTransport>(conn: &mut Connection<T>) -> Result<(), EngineError> {
    let policy = conn.policy;
    let mut attempt = 0;
    loop {
        match conn.transport.expunge().await {
            Ok(()) => return Ok(()),
            Err(err) => {
                if err.is_dropped() {
                    conn.mark_dropped();
                }
                attempt += 1;
                if attempt >= policy.max_attempts {
                    tracing::warn!("Expunge failed after {attempt} attempts: {err}");
                    return Err(EngineError::Commit(err));
                }
                tracing::warn!("Expunge attempt {attempt} failed: {err}, retrying");
                policy.pause(attempt - 1).await;
                conn.ensure_connected().await?;
            }
        }
    }
}
