use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::warn;

/// Cap concurrent backend calls at the hardware parallelism the host
/// reports.
pub(crate) fn worker_limiter() -> Arc<Semaphore> {
    let workers = std::thread::available_parallelism()
        .map(usize::from)
        .unwrap_or(4);
    Arc::new(Semaphore::new(workers))
}

/// Run one blocking backend call on the pool, holding a worker permit for
/// its duration. `None` when the pool task itself failed.
pub(crate) async fn run_limited<T, F>(limiter: &Arc<Semaphore>, work: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let permit = limiter.clone().acquire_owned().await.ok();
    let joined = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        work()
    })
    .await;
    match joined {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(%error, "worker task failed");
            None
        }
    }
}
