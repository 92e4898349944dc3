//! Fleet-wide scheduling: the period lock keeps probing single-runner

mod common;

use common::Cluster;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use vigil_health::{CheckType, CheckerConfig};

async fn counting_listener() -> (std::net::SocketAddr, Arc<AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&hits);

    tokio::spawn(async move {
        loop {
            if listener.accept().await.is_ok() {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    (addr, hits)
}

fn tcp_config(interval: f64) -> CheckerConfig {
    let mut config = CheckerConfig::new("upstream");
    config.checks.active.check_type = CheckType::Tcp;
    config.checks.active.timeout = 0.5;
    config.checks.active.healthy.interval = interval;
    config
}

#[tokio::test]
async fn one_worker_probes_per_tick_window() {
    let (addr, hits) = counting_listener().await;
    let cluster = Cluster::new();

    let worker_a = cluster.checker(tcp_config(0.2)).await;
    let worker_b = cluster.checker(tcp_config(0.2)).await;

    worker_a
        .add_target(&addr.ip().to_string(), addr.port(), None, true, None)
        .await
        .unwrap();

    worker_a.start().unwrap();
    worker_b.start().unwrap();
    tokio::time::sleep(Duration::from_millis(700)).await;
    worker_a.stop();
    worker_b.stop();

    let count = hits.load(Ordering::SeqCst);
    assert!(count >= 1, "somebody must have probed");
    assert!(
        count <= 4,
        "period lock must keep probing single-runner per window, saw {count} probes"
    );
}

#[tokio::test]
async fn surviving_worker_takes_over_the_window() {
    let (addr, hits) = counting_listener().await;
    let cluster = Cluster::new();

    let worker_a = cluster.checker(tcp_config(0.1)).await;
    let worker_b = cluster.checker(tcp_config(0.1)).await;

    worker_a
        .add_target(&addr.ip().to_string(), addr.port(), None, true, None)
        .await
        .unwrap();

    worker_a.start().unwrap();
    worker_b.start().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;

    // One worker goes away; probing must continue
    worker_a.stop();
    let before = hits.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(500)).await;
    worker_b.stop();

    assert!(
        hits.load(Ordering::SeqCst) > before,
        "the surviving worker should keep probing"
    );
}

#[tokio::test]
async fn disabled_interval_never_probes() {
    let (addr, hits) = counting_listener().await;
    let cluster = Cluster::new();

    // Both intervals default to 0: active checking disabled
    let mut config = CheckerConfig::new("upstream");
    config.checks.active.check_type = CheckType::Tcp;
    let checker = cluster.checker(config).await;

    checker
        .add_target(&addr.ip().to_string(), addr.port(), None, true, None)
        .await
        .unwrap();

    checker.start().unwrap();
    tokio::time::sleep(Duration::from_millis(300)).await;
    checker.stop();

    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
