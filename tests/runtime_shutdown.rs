// tests/runtime_shutdown.rs

use std::error::Error;
use std::time::Duration;

use snapwatch::engine::{Runtime, RuntimeOptions, shutdown_channel};
use snapwatch::hash::digest_bytes;
use snapwatch_test_utils::fixtures::Workspace;
use snapwatch_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn monitor_picks_up_changes_between_polls_and_stops_on_request() -> TestResult {
    init_tracing();

    let mut ws = Workspace::new()?;
    ws.write("a.txt", b"v1")?;
    let watcher = ws.watcher()?;
    let (trigger, signal) = shutdown_channel();
    let options = RuntimeOptions {
        interval: Duration::from_millis(20),
        exit_after_first_poll: false,
    };
    let handle = tokio::spawn(Runtime::new(watcher, signal, options).run());

    let v1 = format!("a.txt_{}", digest_bytes(b"v1"));
    let v2 = format!("a.txt_{}", digest_bytes(b"v2"));

    with_timeout(async {
        while !ws.backup_names().unwrap().contains(&v1) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    ws.write("a.txt", b"v2")?;

    with_timeout(async {
        while !ws.backup_names().unwrap().contains(&v2) {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;

    trigger.trigger();
    let summary = with_timeout(handle).await??;

    assert!(summary.polls >= 2);
    assert_eq!(summary.snapshots_created, 2);
    assert_eq!(summary.failures, 0);
    Ok(())
}

#[tokio::test]
async fn once_mode_snapshots_and_returns() -> TestResult {
    init_tracing();

    let mut ws = Workspace::new()?;
    ws.write("x", b"1")?;
    ws.write("y", b"2")?;
    let (_trigger, signal) = shutdown_channel();
    let options = RuntimeOptions {
        interval: Duration::from_secs(3600),
        exit_after_first_poll: true,
    };

    let summary = with_timeout(Runtime::new(ws.watcher()?, signal, options).run()).await?;

    assert_eq!(summary.polls, 1);
    assert_eq!(ws.backup_names()?.len(), 2);
    Ok(())
}
