//! Per-call time budget for PostgreSQL adapters.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Await `call`, or fail with `on_timeout` once `budget` elapses.
///
/// Dropping the future cancels the in-flight query; an open transaction is
/// rolled back when its connection returns to the pool.
pub(crate) async fn with_call_timeout<T, E, Fut, F>(
    budget: Duration,
    operation: &'static str,
    call: Fut,
    on_timeout: F,
) -> Result<T, E>
where
    Fut: Future<Output = Result<T, E>>,
    F: FnOnce(String) -> E,
{
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation,
                budget_ms = budget.as_millis(),
                "store call exceeded its time budget"
            );
            Err(on_timeout(format!(
                "{operation} exceeded {}ms",
                budget.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_results_within_budget() {
        let result: Result<u8, String> =
            with_call_timeout(Duration::from_secs(1), "fast", async { Ok(7) }, |m| m).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test(start_paused = true)]
    async fn reports_timeout_after_budget() {
        let result: Result<u8, String> = with_call_timeout(
            Duration::from_millis(50),
            "slow insert",
            async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(1)
            },
            |message| message,
        )
        .await;
        assert_eq!(result, Err("slow insert exceeded 50ms".to_owned()));
    }
}
