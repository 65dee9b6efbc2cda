//! Concurrency properties of the metrics store.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;
use std::thread;

use assetwatch_core::MetricsStore;

#[test]
fn concurrent_hits_are_never_lost() {
    const THREADS: usize = 8;
    const PER_THREAD: usize = 2_000;

    let m = Arc::new(MetricsStore::new(true));
    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                let client = format!("10.0.0.{i}");
                for _ in 0..PER_THREAD {
                    m.record_hit("/logo.png");
                    m.record_miss();
                    m.record_client(&client);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let total = (THREADS * PER_THREAD) as u64;
    assert_eq!(m.hit_count("/logo.png"), total);
    assert_eq!(m.misses(), total);
    for i in 0..THREADS {
        assert_eq!(m.client_count(&format!("10.0.0.{i}")), PER_THREAD as u64);
    }
}

#[test]
fn snapshots_only_observe_committed_monotonic_values() {
    const WRITERS: usize = 4;
    const PER_WRITER: u64 = 5_000;
    let total = WRITERS as u64 * PER_WRITER;

    let m = Arc::new(MetricsStore::new(false));
    let writers: Vec<_> = (0..WRITERS)
        .map(|_| {
            let m = Arc::clone(&m);
            thread::spawn(move || {
                for _ in 0..PER_WRITER {
                    m.record_hit("/app.js");
                }
            })
        })
        .collect();

    let reader = {
        let m = Arc::clone(&m);
        thread::spawn(move || {
            let mut last = 0u64;
            loop {
                let seen = m.snapshot().hits.get("/app.js").copied().unwrap_or(0);
                assert!(seen <= total, "observed {seen} > {total}");
                assert!(seen >= last, "snapshot went backwards: {seen} < {last}");
                last = seen;
                if seen == total {
                    break;
                }
                thread::yield_now();
            }
        })
    };

    for w in writers {
        w.join().unwrap();
    }
    reader.join().unwrap();
    assert_eq!(m.hit_count("/app.js"), total);
}

#[test]
fn snapshot_is_idempotent_without_writes() {
    let m = MetricsStore::new(true);
    m.record_hit("/b.css");
    m.record_hit("/a.css");
    m.record_client("10.0.0.2");
    m.record_client("10.0.0.1");
    m.record_miss();

    let a = m.snapshot();
    let b = m.snapshot();
    assert_eq!(a, b);

    let keys: Vec<_> = a.hits.keys().cloned().collect();
    assert_eq!(keys, vec!["/a.css".to_string(), "/b.css".to_string()]);
}

#[test]
fn snapshot_serializes_sorted() {
    let m = MetricsStore::new(false);
    m.record_hit("/z");
    m.record_hit("/a");
    m.record_miss();

    let json = serde_json::to_string(&m.snapshot()).unwrap();
    assert_eq!(json, r#"{"hits":{"/a":1,"/z":1},"misses":1,"max_path_len":2}"#);
}
