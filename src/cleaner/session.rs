use async_imap::Session;
use async_native_tls::TlsStream;
use async_trait::async_trait;
use futures::io::{AsyncRead, AsyncWrite};
use futures::StreamExt;
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncReadCompatExt};

use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use super::transport::{MailboxTransport, MessageId, MessageUid, TransportError};

/// Wrapper for either TLS or plain IMAP stream
enum StreamWrapper {
    Tls(TlsStream<Compat<TcpStream>>),
    Plain(Compat<TcpStream>),
}

impl AsyncRead for StreamWrapper {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut [u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            StreamWrapper::Tls(s) => Pin::new(s).poll_read(cx, buf),
            StreamWrapper::Plain(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for StreamWrapper {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            StreamWrapper::Tls(s) => Pin::new(s).poll_write(cx, buf),
            StreamWrapper::Plain(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            StreamWrapper::Tls(s) => Pin::new(s).poll_flush(cx),
            StreamWrapper::Plain(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_close(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            StreamWrapper::Tls(s) => Pin::new(s).poll_close(cx),
            StreamWrapper::Plain(s) => Pin::new(s).poll_close(cx),
        }
    }
}

impl std::fmt::Debug for StreamWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamWrapper::Tls(_) => write!(f, "StreamWrapper::Tls"),
            StreamWrapper::Plain(_) => write!(f, "StreamWrapper::Plain"),
        }
    }
}

unsafe impl Send for StreamWrapper {}
impl Unpin for StreamWrapper {}

/// The real IMAP transport: one mailbox on one server, reached over TLS
/// (or a plain socket against a local test server).
pub struct ImapMailbox {
    server: String,
    port: u16,
    username: String,
    password: String,
    mailbox: String,
    session: Option<Session<StreamWrapper>>,
}

impl ImapMailbox {
    pub fn new(
        server: String,
        port: u16,
        username: String,
        password: String,
        mailbox: String,
    ) -> Self {
        Self {
            server,
            port,
            username,
            password,
            mailbox,
            session: None,
        }
    }

    /// Establish a new IMAP connection: dial, TLS, login, select.
    async fn dial(&self) -> Result<Session<StreamWrapper>, TransportError> {
        tracing::info!("Connecting to IMAP {}:{}", self.server, self.port);

        let tcp = TcpStream::connect((self.server.as_str(), self.port)).await?;

        let stream = if self.port == 993 || self.port == 3993 {
            let tls = async_native_tls::TlsConnector::new();
            let tls_stream = tls
                .connect(&self.server, tcp.compat())
                .await
                .map_err(|e| TransportError::Protocol(format!("TLS handshake failed: {e}")))?;
            StreamWrapper::Tls(tls_stream)
        } else {
            tracing::warn!("Port {} is not an IMAPS port, using plain IMAP", self.port);
            StreamWrapper::Plain(tcp.compat())
        };

        let client = async_imap::Client::new(stream);

        let mut session = client
            .login(&self.username, &self.password)
            .await
            .map_err(|(err, _)| TransportError::Auth(err.to_string()))?;

        session.select(&self.mailbox).await.map_err(classify)?;

        tracing::info!(
            "IMAP login successful for {} ({})",
            self.username,
            self.mailbox
        );
        Ok(session)
    }

    fn session(&mut self) -> Result<&mut Session<StreamWrapper>, TransportError> {
        self.session
            .as_mut()
            .ok_or_else(|| TransportError::Dropped("no open session".into()))
    }
}

/// Map async-imap errors onto the engine's taxonomy. Everything that means
/// "the server let go of this session" must land in `Dropped`, so the
/// executors know a reconnect is worth trying.
fn classify(err: async_imap::error::Error) -> TransportError {
    use async_imap::error::Error;
    match err {
        Error::ConnectionLost => TransportError::Dropped("connection lost".into()),
        Error::Io(e) => TransportError::Dropped(e.to_string()),
        other => {
            let text = other.to_string();
            // iCloud phrases a killed session as a "logged out" BYE/NO.
            if text.to_ascii_lowercase().contains("logged out") {
                TransportError::Dropped(text)
            } else {
                TransportError::Protocol(text)
            }
        }
    }
}

#[async_trait]
impl MailboxTransport for ImapMailbox {
    async fn open(&mut self) -> Result<(), TransportError> {
        // Drop any stale handle before reconnecting.
        if let Some(mut old) = self.session.take() {
            let _ = old.logout().await;
        }
        self.session = Some(self.dial().await?);
        Ok(())
    }

    async fn search_from(&mut self, sender: &str) -> Result<Vec<MessageId>, TransportError> {
        let session = self.session()?;
        let query = format!("FROM \"{sender}\"");
        let ids = session.search(&query).await.map_err(classify)?;

        // The response set is unordered; process low to high so the drain
        // walks the mailbox in sequence order.
        let mut ids: Vec<MessageId> = ids.into_iter().collect();
        ids.sort_unstable();
        Ok(ids)
    }

    async fn fetch_uid(&mut self, id: MessageId) -> Result<Option<MessageUid>, TransportError> {
        let session = self.session()?;
        let mut fetches = session
            .fetch(id.to_string(), "UID")
            .await
            .map_err(classify)?;

        let mut uid = None;
        while let Some(item) = fetches.next().await {
            let fetch = item.map_err(classify)?;
            if let Some(found) = fetch.uid {
                uid = Some(MessageUid::from(found));
            }
        }
        Ok(uid)
    }

    async fn store_deleted(&mut self, uid: MessageUid) -> Result<(), TransportError> {
        let session = self.session()?;
        let updates = session
            .uid_store(uid.to_string(), "+FLAGS (\\Deleted)")
            .await
            .map_err(classify)?;
        tokio::pin!(updates);
        while let Some(item) = updates.next().await {
            item.map_err(classify)?;
        }
        Ok(())
    }

    async fn expunge(&mut self) -> Result<(), TransportError> {
        let session = self.session()?;
        let removed = session.expunge().await.map_err(classify)?;
        tokio::pin!(removed);
        while let Some(item) = removed.next().await {
            item.map_err(classify)?;
        }
        Ok(())
    }

    async fn logout(&mut self) -> Result<(), TransportError> {
        if let Some(mut session) = self.session.take() {
            session.logout().await.map_err(classify)?;
        }
        Ok(())
    }
}
