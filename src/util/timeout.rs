//! Timeout helper.

use std::future::Future;
use std::time::Duration;

use crate::error::ClientError;

/// Wrap a fallible future with a deadline; expiry becomes [`ClientError::Timeout`].
pub async fn with_timeout<T>(
    duration: Duration,
    future: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    match tokio::time::timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(ClientError::Timeout(duration.as_millis() as u64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn expired_future_reports_timeout() {
        let result: Result<(), ClientError> = with_timeout(Duration::from_millis(250), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ClientError::Timeout(250))));
    }

    #[tokio::test]
    async fn completed_future_passes_through() {
        let result = with_timeout(Duration::from_secs(1), async { Ok::<_, ClientError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }
}
