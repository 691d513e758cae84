/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! End-to-end: store, scheduler and a virtual bus driven through
//! [`SimulationControl`].

use std::sync::Arc;
use std::time::Duration;

use canvector::frame::CanFrame;
use canvector::scheduler::TransmissionScheduler;
use canvector::simulation::{Simulation, SimulationControl};
use canvector::store::{MessageStore, StoreError};
use canvector::transport::{BusLog, TransportConfig, VirtualBus};
use tempfile::TempDir;

const EIGHT_BYTES: &str = "0x01 0x02 0x03 0x04 0x05 0x06 0x07 0x08";

struct Bench {
    dir: TempDir,
    log: BusLog,
    sim: Simulation,
}

fn bench(tick: Duration) -> Bench {
    let dir = tempfile::tempdir().unwrap();
    let store = MessageStore::open(dir.path().join("candb").join("db.csv"))
        .unwrap()
        .into_shared();

    let log = BusLog::new();
    let bus = VirtualBus::with_log(&TransportConfig::default(), log.clone()).unwrap();
    let scheduler =
        TransmissionScheduler::new(Arc::clone(&store), Some(Box::new(bus))).with_tick(tick);

    Bench {
        dir,
        log,
        sim: Simulation::new(store, scheduler),
    }
}

#[test]
fn heartbeat_reaches_the_bus_on_trigger() {
    let b = bench(Duration::from_millis(100));

    assert_eq!(b.sim.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap(), 0);
    b.sim.set_enabled(true);
    assert_eq!(b.sim.trigger(0), Ok(true));

    let frames = b.log.frames();
    assert_eq!(
        frames,
        vec![CanFrame {
            id: 0x100,
            data: vec![1, 2, 3, 4, 5, 6, 7, 8],
            extended: false,
        }]
    );
}

#[test]
fn disarmed_trigger_never_reaches_the_bus() {
    let b = bench(Duration::from_millis(100));
    b.sim.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap();

    assert_eq!(b.sim.trigger(0), Ok(false));
    assert!(b.log.is_empty());
}

#[test]
fn table_survives_reopen() {
    let b = bench(Duration::from_millis(100));
    b.sim.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap();
    b.sim.add("NM", "0x567", "0x50 0x40 0x30").unwrap();
    b.sim.modify(1, "NM", "0x567", "0x50 0x40 0x30", true).unwrap();

    let reopened = MessageStore::open(b.dir.path().join("candb").join("db.csv")).unwrap();
    assert_eq!(reopened.get_all(), b.sim.get_all().as_slice());
    assert!(reopened.get_all()[1].periodic_enabled);
}

#[test]
fn rejected_add_leaves_table_unchanged() {
    let b = bench(Duration::from_millis(100));
    b.sim.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap();

    let err = b.sim.add("Bad", "0x100", "0x1FF").unwrap_err();
    assert!(matches!(err, StoreError::Invalid(_)));
    assert_eq!(b.sim.get_all().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn periodic_rows_are_sent_while_armed() {
    let mut b = bench(Duration::from_millis(10));
    b.sim.add("Heartbeat", "0x100", EIGHT_BYTES).unwrap();
    b.sim.add("Quiet", "0x200", "0x00").unwrap();
    b.sim.modify(0, "Heartbeat", "0x100", EIGHT_BYTES, true).unwrap();

    b.sim.start();
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(b.log.is_empty(), "disarmed loop must not send");

    b.sim.set_enabled(true);
    tokio::time::sleep(Duration::from_millis(100)).await;
    b.sim.set_enabled(false);
    tokio::time::sleep(Duration::from_millis(30)).await;

    let sent = b.log.count_id(0x100);
    assert!(sent >= 2, "expected several periodic sends, got {sent}");
    assert_eq!(b.log.count_id(0x200), 0);

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(b.log.count_id(0x100), sent, "no sends after disarm");

    tokio::time::timeout(Duration::from_secs(2), b.sim.shutdown())
        .await
        .expect("shutdown must complete");
}
