//! 数据库读路径重试
//!
//! 只对瞬态的连接类故障做退避重试；业务错误与校验错误直接放行。
//! 写事务不在此重试，提交结果不明时重放会产生二义性。

use std::future::Future;

use campus_common::retry::{RetryConfig, is_retryable_error, with_conditional_retry};
use campus_errors::{AppError, AppResult};

/// 判断 AppError 是否为可重试的瞬态故障
pub fn is_transient(error: &AppError) -> bool {
    match error {
        AppError::Database(msg) | AppError::ExternalService(msg) => is_retryable_error(msg),
        _ => false,
    }
}

/// 带瞬态重试的数据库读操作执行器
pub async fn with_db_retry<F, Fut, T>(
    config: &RetryConfig,
    operation_name: &str,
    operation: F,
) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    with_conditional_retry(config, operation_name, operation, is_transient).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[test]
    fn business_errors_are_not_transient() {
        assert!(!is_transient(&AppError::validation("missing isbn")));
        assert!(!is_transient(&AppError::failed_precondition(
            "borrowing limit reached"
        )));
        assert!(!is_transient(&AppError::database("duplicate key value")));
        assert!(is_transient(&AppError::database("connection reset by peer")));
    }

    #[tokio::test]
    async fn transient_database_error_is_retried() {
        let config = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(2));
        let calls = AtomicU32::new(0);
        let result = with_db_retry(&config, "find_book", || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(AppError::database("connection refused"))
                } else {
                    Ok(42)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn precondition_failure_is_never_retried() {
        let config = RetryConfig::new(3, Duration::from_millis(1), Duration::from_millis(2));
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = with_db_retry(&config, "issue_book", || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(AppError::failed_precondition("no copies available")) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
