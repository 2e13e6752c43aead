//! Single-flight execution of one shared operation
//!
//! Wraps the `async_singleflight` crate: while a call is in progress every
//! other caller waits for its result instead of starting a second one. The
//! in-flight marker is registered synchronously on the first poll, before the
//! operation reaches its first await point.
//!
//! The group stores the whole `Result` as its value, so waiters see the
//! leader's error itself rather than a bare "leader failed" marker.

use std::convert::Infallible;
use std::sync::Arc;

/// Error type for [`SingleFlight`] operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum SingleFlightError<E> {
    /// The group reported a leader failure without an outcome
    #[error("single-flight leader dropped before completing")]
    WorkerFailed,
    /// The underlying operation failed
    #[error("{0}")]
    Inner(E),
}

/// Deduplicates concurrent executions of one operation.
#[derive(Clone)]
pub struct SingleFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    name: &'static str,
    group: Arc<async_singleflight::Group<&'static str, Result<V, E>, Infallible>>,
}

impl<V, E> SingleFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            group: Arc::new(async_singleflight::Group::new()),
        }
    }

    /// Run `f`, or join the run already in progress.
    ///
    /// A waiter whose own future is dropped simply stops waiting; if the
    /// leader is dropped, one of the remaining waiters drives its own future.
    pub async fn run<Fut>(&self, f: Fut) -> Result<V, SingleFlightError<E>>
    where
        Fut: std::future::Future<Output = Result<V, E>> + Send,
    {
        let outcome = self
            .group
            .work(&self.name, async move { Ok::<_, Infallible>(f.await) })
            .await;
        match outcome {
            Ok(result) => result.map_err(SingleFlightError::Inner),
            Err(_) => Err(SingleFlightError::WorkerFailed),
        }
    }

    /// Like [`run`](Self::run), converting a leader failure with `error_factory`.
    pub async fn run_or<Fut, Ef>(&self, f: Fut, error_factory: Ef) -> Result<V, E>
    where
        Fut: std::future::Future<Output = Result<V, E>> + Send,
        Ef: FnOnce() -> E,
    {
        self.run(f).await.map_err(|e| match e {
            SingleFlightError::WorkerFailed => error_factory(),
            SingleFlightError::Inner(err) => err,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_single_call() {
        let sf: SingleFlight<i32, String> = SingleFlight::new("test");
        let counter = Arc::new(AtomicU32::new(0));

        let c = counter.clone();
        let result = sf
            .run(async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok(42)
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_calls_share_one_execution() {
        let sf: SingleFlight<i32, String> = SingleFlight::new("test");
        let counter = Arc::new(AtomicU32::new(0));

        let mut handles = vec![];
        for _ in 0..10 {
            let sf = sf.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                sf.run(async move {
                    sleep(Duration::from_millis(50)).await;
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(123)
                })
                .await
            }));
        }

        for handle in handles {
            assert_eq!(handle.await.unwrap().unwrap(), 123);
        }
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_error_reaches_every_waiter() {
        let sf: SingleFlight<i32, String> = SingleFlight::new("test");

        let mut handles = vec![];
        for _ in 0..5 {
            let sf = sf.clone();
            handles.push(tokio::spawn(async move {
                sf.run(async {
                    sleep(Duration::from_millis(30)).await;
                    Err("rejected".to_string())
                })
                .await
            }));
        }

        for handle in handles {
            match handle.await.unwrap() {
                Err(SingleFlightError::Inner(msg)) => assert_eq!(msg, "rejected"),
                other => panic!("expected inner error, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_next_call_runs_again_after_completion() {
        let sf: SingleFlight<i32, String> = SingleFlight::new("test");

        let result = sf.run(async { Err("first".to_string()) }).await;
        assert!(result.is_err());

        let result = sf.run_or(async { Ok(7) }, || "leader gone".to_string()).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_waiter_takes_over_when_leader_is_aborted() {
        let sf: SingleFlight<&'static str, String> = SingleFlight::new("test");
        let started = Arc::new(AtomicU32::new(0));

        let leader = {
            let sf = sf.clone();
            let started = started.clone();
            tokio::spawn(async move {
                sf.run(async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(200)).await;
                    Ok("leader")
                })
                .await
            })
        };
        sleep(Duration::from_millis(20)).await;

        let mut waiters = vec![];
        for _ in 0..3 {
            let sf = sf.clone();
            let started = started.clone();
            waiters.push(tokio::spawn(async move {
                sf.run(async move {
                    started.fetch_add(1, Ordering::SeqCst);
                    sleep(Duration::from_millis(30)).await;
                    Ok("waiter")
                })
                .await
            }));
        }
        sleep(Duration::from_millis(20)).await;
        leader.abort();

        for waiter in waiters {
            assert_eq!(waiter.await.unwrap().unwrap(), "waiter");
        }
        // The aborted leader plus exactly one waiter that took over.
        assert_eq!(started.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_dropped_waiter_does_not_disturb_the_others() {
        let sf: SingleFlight<i32, String> = SingleFlight::new("test");

        let slow = || async {
            sleep(Duration::from_millis(80)).await;
            Ok(5)
        };
        let keeper = {
            let sf = sf.clone();
            tokio::spawn(async move { sf.run(slow()).await })
        };
        sleep(Duration::from_millis(5)).await;
        let impatient = tokio::time::timeout(Duration::from_millis(10), sf.run(slow())).await;

        assert!(impatient.is_err());
        assert_eq!(keeper.await.unwrap().unwrap(), 5);
    }
}
