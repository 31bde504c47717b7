//! Failure logging around fallible async operations.
//!
//! Both wrappers log the operation name, the error and a captured backtrace. They
//! differ only in what the caller gets back.

use std::backtrace::Backtrace;
use std::fmt::{Debug, Display};
use std::future::Future;

/// Runs `future`, logging and suppressing a failure.
///
/// For work whose failure must not affect the caller.
pub async fn observe<T, E, F>(operation: &str, future: F) -> Option<T>
where
    F: Future<Output = Result<T, E>>,
    E: Display + Debug,
{
    match future.await {
        Ok(value) => Some(value),
        Err(error) => {
            log_failure(operation, &error);
            None
        }
    }
}

/// Runs `future`, logging a failure and returning it unchanged.
pub async fn observe_and_propagate<T, E, F>(operation: &str, future: F) -> Result<T, E>
where
    F: Future<Output = Result<T, E>>,
    E: Display + Debug,
{
    future
        .await
        .inspect_err(|error| log_failure(operation, error))
}

fn log_failure<E: Display + Debug>(operation: &str, error: &E) {
    let backtrace = Backtrace::force_capture();
    tracing::error!(
        operation,
        error = %error,
        details = ?error,
        %backtrace,
        "Operation failed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use appointsync_core::storage::StoreError;

    #[tokio::test]
    async fn test_observe_returns_value() {
        let result = observe("get", async { Ok::<_, StoreError>(7) }).await;
        assert_eq!(result, Some(7));
    }

    #[tokio::test]
    async fn test_observe_suppresses_error() {
        let result: Option<()> =
            observe("save", async { Err(StoreError::EmptyUpdate) }).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_observe_and_propagate_returns_error_unchanged() {
        let result: Result<(), StoreError> = observe_and_propagate("update", async {
            Err(StoreError::ConnectionFailed("refused".to_string()))
        })
        .await;

        assert_eq!(
            result,
            Err(StoreError::ConnectionFailed("refused".to_string()))
        );
    }
}
