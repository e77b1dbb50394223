//! Request handlers.

pub mod projects;
pub mod tickets;

use crate::error::ApiError;
use crate::state::SharedState;

/// Persist storage after a mutation.
///
/// If the save fails, memory is reloaded from disk so subsequent requests
/// don't observe state the file never recorded, and the mutation is
/// reported as failed.
pub(crate) async fn persist(state: &SharedState) -> Result<(), ApiError> {
    let saved = state.store.read().await.save().await;
    if let Err(err) = saved {
        tracing::error!(error = %err, "failed to persist storage; reloading from disk");
        if let Err(reload_err) = state.store.write().await.reload().await {
            tracing::error!(error = %reload_err, "reload after failed save also failed");
        }
        return Err(ApiError::Internal(format!(
            "failed to persist changes: {err}"
        )));
    }
    Ok(())
}
