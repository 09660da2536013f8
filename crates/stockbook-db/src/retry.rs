//! Bounded retry for transient database failures.

use std::time::Duration;

use tracing::warn;

use crate::error::DbError;

/// Retry policy applied around individual storage operations.
///
/// Only [`DbError::Transient`] failures are retried; every other error
/// returns immediately. The delay between attempts is fixed.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without waiting. Intended for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }

    /// Runs `op`, retrying transient failures until the attempt budget is
    /// spent. The final error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, DbError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbError>>,
    {
        let budget = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < budget => {
                    warn!(
                        attempt,
                        budget,
                        error = %err,
                        "Transient database error, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
