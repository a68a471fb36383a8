//! Observability wrapper around tool handlers.

use crate::error::McpError;
use crate::metrics::{Metrics, STATUS_ERROR, STATUS_SUCCESS};
use crate::protocol::CallToolResult;
use std::future::Future;

/// Run `call` and record exactly one duration observation and one counter
/// increment under `{tool, account, status}`.
///
/// The status is `success` only when the call returns a result that is not
/// flagged as an error. The outcome is returned untouched.
pub async fn instrument<F>(
    metrics: &Metrics,
    tool: &str,
    account: &str,
    call: F,
) -> Result<CallToolResult, McpError>
where
    F: Future<Output = Result<CallToolResult, McpError>>,
{
    let _connection = metrics.track_connection(account);
    let timer = metrics.tool_timer(tool, account);

    let outcome = call.await;

    let status = match &outcome {
        Ok(result) if !result.is_error => STATUS_SUCCESS,
        _ => STATUS_ERROR,
    };
    timer.finish(status);

    match &outcome {
        Ok(result) if result.is_error => {
            tracing::debug!(tool, account, "Tool returned an error result")
        }
        Ok(_) => tracing::debug!(tool, account, "Tool completed"),
        Err(e) => tracing::warn!(tool, account, error = %e, "Tool failed"),
    }

    outcome
}
