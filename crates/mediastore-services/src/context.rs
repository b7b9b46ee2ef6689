//! Per-request cancellation and deadline handling.

use std::future::Future;
use std::time::Duration;

use mediastore_core::AppError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation token and optional deadline shared by every step of one request.
///
/// Dropping the HTTP connection or hitting the deadline aborts whichever store or
/// object call is in flight. Work already committed stays committed.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RequestContext {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            cancel: CancellationToken::new(),
            deadline: Some(Instant::now() + timeout),
        }
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Drive `fut` unless the request is cancelled or runs out of time first.
    ///
    /// `operation` names the work for the returned `Cancelled`/`DeadlineExceeded` error.
    pub async fn run<T, F>(&self, operation: &str, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        if self.cancel.is_cancelled() {
            return Err(AppError::Cancelled(operation.to_string()));
        }

        let deadline = async {
            match self.deadline {
                Some(at) => tokio::time::sleep_until(at).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(AppError::Cancelled(operation.to_string())),
            _ = deadline => Err(AppError::DeadlineExceeded(operation.to_string())),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_background_context_runs_to_completion() {
        let ctx = RequestContext::background();
        let value = ctx.run("noop", async { Ok::<_, AppError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_cancelled_context_short_circuits() {
        let ctx = RequestContext::background();
        ctx.cancel();

        let err = ctx
            .run("load_staging", async { Ok::<_, AppError>(()) })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled(op) if op == "load_staging"));
    }

    #[tokio::test]
    async fn test_cancel_interrupts_pending_work() {
        let ctx = RequestContext::background();
        let token = ctx.cancellation_token().clone();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            token.cancel();
        });

        let err = ctx
            .run("transfer_bytes", std::future::pending::<Result<(), AppError>>())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let ctx = RequestContext::with_timeout(Duration::from_secs(5));

        let err = ctx
            .run("finalize", async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok::<_, AppError>(())
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DeadlineExceeded(op) if op == "finalize"));
    }
}
