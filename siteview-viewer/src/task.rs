//! Local task spawning for the single-threaded viewer

use futures::future::{AbortHandle, Abortable};
use std::future::Future;

/// Spawn a `!Send` future on the current thread and return a handle that cancels it.
///
/// Natively this requires a running `tokio::task::LocalSet`.
pub fn spawn_local<F>(future: F) -> AbortHandle
where
    F: Future<Output = ()> + 'static,
{
    let (handle, registration) = AbortHandle::new_pair();
    let task = Abortable::new(future, registration);

    #[cfg(not(target_arch = "wasm32"))]
    tokio::task::spawn_local(async move {
        let _ = task.await;
    });

    #[cfg(target_arch = "wasm32")]
    wasm_bindgen_futures::spawn_local(async move {
        let _ = task.await;
    });

    handle
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tokio::task::LocalSet;

    #[tokio::test]
    async fn test_abort_stops_task() {
        LocalSet::new()
            .run_until(async {
                let counter = Rc::new(Cell::new(0));
                let seen = counter.clone();
                let handle = spawn_local(async move {
                    loop {
                        seen.set(seen.get() + 1);
                        tokio::task::yield_now().await;
                    }
                });

                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }
                handle.abort();
                let stopped_at = counter.get();
                assert!(stopped_at > 0);

                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }
                assert!(handle.is_aborted());
                assert!(counter.get() <= stopped_at + 1);
            })
            .await;
    }
}
