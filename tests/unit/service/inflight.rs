use std::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};

use tokio::sync::Semaphore;

use super::*;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_callers_share_one_run() {
    let registry: Arc<InFlight<&'static str, u32>> = Arc::new(InFlight::new());
    let runs = Arc::new(AtomicUsize::new(0));
    let gate = Arc::new(Semaphore::new(0));

    let mut waiters = Vec::new();
    for _ in 0..20 {
        let job = registry.join_or_start("k", || {
            let runs = Arc::clone(&runs);
            let gate = Arc::clone(&gate);
            async move {
                runs.fetch_add(1, Ordering::SeqCst);
                let _permit = gate.acquire().await;
                Ok(42)
            }
        });
        waiters.push(tokio::spawn(job));
    }
    assert_eq!(registry.len(), 1);
    gate.add_permits(1);

    for w in waiters {
        assert_eq!(w.await.unwrap().unwrap(), 42);
    }
    assert_eq!(runs.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn finished_jobs_leave_the_registry() {
    let registry: InFlight<u8, u8> = InFlight::new();
    registry.join_or_start(1, || async { Ok(1) }).await.unwrap();
    for _ in 0..100 {
        if registry.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(registry.is_empty());

    let again = registry.join_or_start(1, || async { Ok(2) }).await.unwrap();
    assert_eq!(again, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn every_waiter_sees_the_same_failure() {
    let registry: InFlight<u8, u8> = InFlight::new();
    let gate = Arc::new(Semaphore::new(0));
    let start = || {
        let gate = Arc::clone(&gate);
        async move {
            let _permit = gate.acquire().await;
            Err(BackdropError::source_unavailable("cover 404"))
        }
    };
    let a = registry.join_or_start(7, start);
    let b = registry.join_or_start(7, start);
    gate.add_permits(1);

    let (a, b) = (a.await.unwrap_err(), b.await.unwrap_err());
    assert_eq!(a.to_string(), b.to_string());
    assert!(matches!(a, BackdropError::SourceUnavailable(_)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn job_completes_after_all_callers_drop() {
    let registry: InFlight<u8, u8> = InFlight::new();
    let finished = Arc::new(AtomicUsize::new(0));
    let flag = Arc::clone(&finished);
    let job = registry.join_or_start(3, move || async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        flag.fetch_add(1, Ordering::SeqCst);
        Ok(3)
    });
    drop(job);

    for _ in 0..100 {
        if finished.load(Ordering::SeqCst) == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(finished.load(Ordering::SeqCst), 1);
}
