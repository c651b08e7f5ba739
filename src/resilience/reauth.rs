use std::future::Future;

use tracing::info;

use crate::error::Result;
use crate::sources::TokenSource;

/// Runs `operation`; if the provider rejects the bearer token with 401,
/// forces one token refresh and runs it a second time.
///
/// The core operations never do this on their own.
pub async fn with_reauth<F, Fut, T>(source: &TokenSource, mut operation: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    match operation().await {
        Err(err) if err.is_unauthorized() => {
            info!("provider rejected bearer token, refreshing once");
            source.refresh().await?;
            operation().await
        }
        other => other,
    }
}
