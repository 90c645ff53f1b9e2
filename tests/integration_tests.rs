//! Integration tests against the real network stack
//!
//! These need a `ping` binary that may send ICMP and a routing table where
//! 10.255.255.1 goes nowhere, so they are ignored by default:
//! `cargo test -- --ignored`

use pinghosts::network::{Prober, SystemPinger};
use pinghosts::output::{OutputConfig, OutputFormat, OutputManager};
use pinghosts::{HostStatus, PingConfig, ProbePool};
use std::time::Duration;
use tokio::time::timeout;

#[tokio::test]
#[ignore = "needs a working ping binary"]
async fn test_loopback_is_up() {
    let status = SystemPinger::default().probe("127.0.0.1").await.unwrap();
    assert_eq!(status, HostStatus::Up);
}

#[tokio::test]
#[ignore = "needs a working ping binary"]
async fn test_unroutable_address_is_down() {
    let status = timeout(
        Duration::from_secs(10),
        SystemPinger::default().probe("10.255.255.1"),
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(status, HostStatus::Down);
}

#[tokio::test]
#[ignore = "needs a working ping binary"]
async fn test_unresolvable_name_is_down() {
    let status = SystemPinger::default().probe("host.invalid").await.unwrap();
    assert_eq!(status, HostStatus::Down);
}

#[tokio::test]
#[ignore = "needs a working ping binary"]
async fn test_end_to_end_csv_report() {
    let pool = ProbePool::from_config(&PingConfig::default()).unwrap();
    let mut results = pool
        .run(vec!["127.0.0.1".to_string(), "10.255.255.1".to_string()])
        .await
        .unwrap();
    results.sort_by_input_order();

    assert_eq!(results.status_of("127.0.0.1"), Some(HostStatus::Up));
    assert_eq!(results.status_of("10.255.255.1"), Some(HostStatus::Down));

    let report = OutputManager::new(OutputConfig {
        format: OutputFormat::Csv,
        colored: false,
    })
    .render(&results)
    .unwrap();
    assert_eq!(report, "127.0.0.1,up\n10.255.255.1,down\n1/2 hosts are up\n");
}
