//! Per-call deadline and cancellation

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::{BuildClientError, Result};

/// Deadline and cancellation applied to every round trip a client makes
///
/// The default context never expires and cannot be cancelled; the
/// configured request timeout still applies.
///
/// ```rust,no_run
/// # use std::time::Duration;
/// # use build_client::{BuildClient, CallContext};
/// # async fn example(client: BuildClient) -> build_client::Result<()> {
/// let ctx = CallContext::new().with_timeout(Duration::from_secs(5));
/// let models = client.with_context(ctx).list_models().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    deadline: Option<Instant>,
    cancel: Option<CancellationToken>,
}

impl CallContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort calls still in flight at `deadline`
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Deadline `timeout` from now
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Abort calls in flight when `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancel.as_ref()
    }

    /// Run `fut` under this context.
    ///
    /// An already-passed deadline or an already-cancelled token fails
    /// before `fut` is polled, so no request leaves the process.
    pub async fn run<F, T>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.cancel.as_ref().is_some_and(|c| c.is_cancelled()) {
            return Err(BuildClientError::Cancelled);
        }
        if self.deadline.is_some_and(|d| d <= Instant::now()) {
            return Err(BuildClientError::DeadlineExceeded);
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending().await,
            }
        };
        let cancelled = async {
            match &self.cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            result = fut => result,
            _ = deadline => Err(BuildClientError::DeadlineExceeded),
            _ = cancelled => Err(BuildClientError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_context_passes_through() {
        let ctx = CallContext::default();
        let value = ctx.run(async { Ok(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new().with_cancellation(token);

        let result = ctx.run(async { Ok(()) }).await;
        assert!(matches!(result, Err(BuildClientError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_in_flight() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token.clone());

        let canceller = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            token.cancel();
        });

        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        canceller.await.unwrap();
        assert!(matches!(result, Err(BuildClientError::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_in_flight() {
        let ctx = CallContext::new().with_timeout(Duration::from_millis(50));

        let result: Result<()> = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(BuildClientError::DeadlineExceeded)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_deadline() {
        let ctx = CallContext::new().with_deadline(Instant::now());
        tokio::time::advance(Duration::from_millis(1)).await;

        let result = ctx.run(async { Ok(()) }).await;
        assert!(matches!(result, Err(BuildClientError::DeadlineExceeded)));
    }

    #[test]
    fn test_accessors() {
        let token = CancellationToken::new();
        let ctx = CallContext::new().with_cancellation(token);
        assert!(ctx.deadline().is_none());
        assert!(ctx.cancellation().is_some());
    }
}
