pub mod batch;
pub mod connection;
pub mod drain;
pub mod error;
pub mod ops;
pub mod retry;
pub mod session;
pub mod transport;

#[cfg(test)]
pub(crate) mod mock;

pub use batch::{run_batch, BatchReport};
pub use drain::SenderReport;
pub use error::EngineError;
pub use retry::RetryPolicy;
pub use session::ImapMailbox;
