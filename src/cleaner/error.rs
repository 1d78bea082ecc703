use super::transport::{MessageId, MessageUid, TransportError};

/// Error taxonomy of the cleanup engine. Connection and configuration
/// errors are fatal to a batch; the rest are recorded per sender or per
/// message and the run keeps going.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("connection failed: {0}")]
    Connection(TransportError),

    #[error("search for {sender:?} failed: {source}")]
    Search {
        sender: String,
        source: TransportError,
    },

    #[error("could not resolve UID for message {id}: {source}")]
    Fetch {
        id: MessageId,
        source: TransportError,
    },

    #[error("could not flag UID {uid} deleted: {source}")]
    Deletion {
        uid: MessageUid,
        source: TransportError,
    },

    #[error("expunge failed: {0}")]
    Commit(TransportError),

    #[error("invalid format: {0:?}")]
    Validation(String),

    #[error("no target senders configured")]
    NoTargets,

    #[error("session was closed and its credentials cleared")]
    InvalidState,
}
