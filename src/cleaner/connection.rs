use super::error::EngineError;
use super::retry::RetryPolicy;
use super::transport::MailboxTransport;

/// Owns one logical IMAP session. Connect, reconnect and teardown all go
/// through here; the executors only borrow the transport to issue commands,
/// so every downstream operation can self-heal via `ensure_connected`
/// instead of growing its own reconnect logic.
pub struct Connection<T> {
    pub(super) transport: T,
    pub(super) policy: RetryPolicy,
    connected: bool,
    closed: bool,
}

impl<T: MailboxTransport> Connection<T> {
    /// Open a session, retrying the whole connect/login/select sequence on
    /// the shared backoff schedule before surfacing a `Connection` error.
    pub async fn open(transport: T, policy: RetryPolicy) -> Result<Self, EngineError> {
        let mut conn = Self {
            transport,
            policy,
            connected: false,
            closed: false,
        };
        conn.establish().await?;
        Ok(conn)
    }

    async fn establish(&mut self) -> Result<(), EngineError> {
        let mut attempt = 0;
        loop {
            match self.transport.open().await {
                Ok(()) => {
                    self.connected = true;
                    return Ok(());
                }
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.policy.max_attempts {
                        self.connected = false;
                        return Err(EngineError::Connection(err));
                    }
                    tracing::warn!("Connect attempt {attempt} failed: {err}, retrying");
                    self.policy.pause(attempt - 1).await;
                }
            }
        }
    }

    /// Reconnect if the server has dropped the session. Refuses with
    /// `InvalidState` once `close` has cleared the credentials.
    pub async fn ensure_connected(&mut self) -> Result<(), EngineError> {
        if self.closed {
            return Err(EngineError::InvalidState);
        }
        if self.connected {
            return Ok(());
        }
        tracing::info!("Reconnecting IMAP session...");
        self.establish().await
    }

    /// Record that the server discarded the session; the next
    /// `ensure_connected` will dial again.
    pub fn mark_dropped(&mut self) {
        self.connected = false;
    }

    /// Best-effort logout. Errors are logged and swallowed, and credential
    /// and handle state is cleared either way; calling this twice is
    /// harmless.
    pub async fn close(&mut self) {
        if self.closed {
            return;
        }
        if let Err(err) = self.transport.logout().await {
            tracing::warn!("IMAP logout failed: {err}");
        } else {
            tracing::info!("IMAP connection closed");
        }
        self.connected = false;
        self.closed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::mock::MockTransport;

    #[tokio::test]
    async fn test_connect_succeeds_on_third_attempt() {
        let mock = MockTransport::new();
        mock.fail_opens(2);

        let conn = Connection::open(mock.clone(), RetryPolicy::immediate()).await;
        assert!(conn.is_ok());
        assert_eq!(mock.opens(), 3);
    }

    #[tokio::test]
    async fn test_connect_gives_up_after_three_attempts() {
        let mock = MockTransport::new();
        mock.fail_opens(5);

        let err = Connection::open(mock.clone(), RetryPolicy::immediate())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::Connection(_)));
        assert_eq!(mock.opens(), 3);
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let mock = MockTransport::new();
        let mut conn = Connection::open(mock.clone(), RetryPolicy::immediate())
            .await
            .unwrap();

        conn.close().await;
        conn.close().await;
        assert_eq!(mock.logouts(), 1);
    }

    #[tokio::test]
    async fn test_close_swallows_logout_errors() {
        let mock = MockTransport::new();
        mock.fail_logouts(1);
        let mut conn = Connection::open(mock.clone(), RetryPolicy::immediate())
            .await
            .unwrap();

        // Must not panic or surface the error.
        conn.close().await;
        assert_eq!(mock.logouts(), 1);
    }

    #[tokio::test]
    async fn test_ensure_connected_after_close_is_invalid_state() {
        let mock = MockTransport::new();
        let mut conn = Connection::open(mock.clone(), RetryPolicy::immediate())
            .await
            .unwrap();

        conn.close().await;
        let err = conn.ensure_connected().await.err().unwrap();
        assert!(matches!(err, EngineError::InvalidState));
        // No reconnect was attempted.
        assert_eq!(mock.opens(), 1);
    }

    #[tokio::test]
    async fn test_ensure_connected_redials_after_drop() {
        let mock = MockTransport::new();
        let mut conn = Connection::open(mock.clone(), RetryPolicy::immediate())
            .await
            .unwrap();

        conn.mark_dropped();
        conn.ensure_connected().await.unwrap();
        assert_eq!(mock.opens(), 2);

        // Connected sessions are left alone.
        conn.ensure_connected().await.unwrap();
        assert_eq!(mock.opens(), 2);
    }
}
