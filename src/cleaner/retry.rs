use std::time::Duration;

/// Shared retry schedule for transient IMAP failures: bounded attempts
/// with capped exponential backoff. One policy instance is handed to the
/// connection manager and reused by every executor, instead of each call
/// site growing its own retry loop parameters.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: u32,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(4),
            factor: 2,
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt`, 0-based: the wait after the
    /// first failed attempt is `base_delay`, doubling up to `max_delay`.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(self.factor.saturating_pow(attempt))
            .min(self.max_delay)
    }

    /// Sleep out the backoff before the next attempt.
    pub async fn pause(&self, attempt: u32) {
        tokio::time::sleep(self.delay(attempt)).await;
    }

    /// Same attempt budget, zero delays. Tests only.
    #[cfg(test)]
    pub fn immediate() -> Self {
        Self {
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(4));
        assert_eq!(policy.delay(1), Duration::from_secs(8));
        // 16s capped at 10s
        assert_eq!(policy.delay(2), Duration::from_secs(10));
        assert_eq!(policy.delay(10), Duration::from_secs(10));
    }

    #[test]
    fn test_immediate_keeps_attempt_budget() {
        let policy = RetryPolicy::immediate();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.delay(5), Duration::ZERO);
    }
}
