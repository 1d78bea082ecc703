use async_trait::async_trait;

/// Sequence-relative message identifier from one search response.
/// Expunge renumbers the mailbox, so an identifier is only good until
/// the next mutating command.
pub type MessageId = u32;

/// Stable per-mailbox UID; valid until the message itself is expunged.
pub type MessageUid = u64;

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server discarded the session; only a fresh login helps.
    #[error("connection dropped: {0}")]
    Dropped(String),
    #[error("authentication rejected: {0}")]
    Auth(String),
    #[error("mailbox error: {0}")]
    Protocol(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TransportError {
    pub fn is_dropped(&self) -> bool {
        matches!(self, TransportError::Dropped(_))
    }
}

/// One IMAP mailbox, reduced to the commands the cleanup engine needs.
/// Every method is a single protocol attempt; retry, backoff and reconnect
/// policy all sit above this seam.
#[async_trait]
pub trait MailboxTransport: Send {
    /// Connect, authenticate and select the mailbox, replacing any
    /// previous handle.
    async fn open(&mut self) -> Result<(), TransportError>;

    /// `SEARCH FROM "<sender>"` against the selected mailbox. The sender
    /// string is spliced into the query verbatim; callers validate it
    /// upstream.
    async fn search_from(&mut self, sender: &str) -> Result<Vec<MessageId>, TransportError>;

    /// Resolve a search identifier to its stable UID. `None` when the
    /// response is malformed or the message has already vanished.
    async fn fetch_uid(&mut self, id: MessageId) -> Result<Option<MessageUid>, TransportError>;

    /// `UID STORE +FLAGS (\Deleted)`. Re-flagging an already flagged UID
    /// is a server-side no-op.
    async fn store_deleted(&mut self, uid: MessageUid) -> Result<(), TransportError>;

    /// `EXPUNGE`: permanently removes every flagged message. Irreversible.
    async fn expunge(&mut self) -> Result<(), TransportError>;

    /// Best-effort logout and teardown of the current handle.
    async fn logout(&mut self) -> Result<(), TransportError>;
}
