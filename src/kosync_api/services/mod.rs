pub mod health;
pub mod progress;
pub mod users;

use poem_openapi::payload::Json;

use super::models::ErrorDto;
use crate::{domain::User, error::SyncError, sync::SyncService};

/// Runs `work` on tokio's blocking pool. Credential hashing and store
/// access are synchronous and must stay off the async workers. If the task
/// panics, `on_failure` builds the response instead.
pub(crate) async fn run_blocking<R, F>(work: F, on_failure: impl FnOnce() -> R) -> R
where
    F: FnOnce() -> R + Send + 'static,
    R: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "request task failed");
            on_failure()
        }
    }
}

pub(crate) fn error_json(message: impl Into<String>) -> Json<ErrorDto> {
    Json(ErrorDto::from(message.into()))
}

/// Resolves the `x-auth-user` / `x-auth-key` pair to a user. Missing
/// headers are treated like an unknown user.
pub(crate) fn authorize(
    sync: &SyncService,
    username: Option<&str>,
    auth_key: Option<&str>,
) -> Result<User, SyncError> {
    sync.authenticate(username.unwrap_or_default(), auth_key.unwrap_or_default())
}
