// End-to-end behaviour of store + service + watcher + lifecycle working together.

use std::{sync::Arc, time::Duration};

use chrono::{DateTime, TimeZone, Utc};
use chrono_tz::Tz;
use tokio::sync::Barrier;
use smartreminder_core::{Clock, ManualClock, NewReminder, ReminderId, SystemClock};
use smartreminder_scheduler::{
    ChannelNotifier, LifecycleController, ReminderService, ReminderStore, SchedulerError,
    TriggerWatcher, WatcherState,
};

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2030, 3, 1, 10, 0, 0).unwrap()
}

fn request(id: i64, remind_at: DateTime<Utc>) -> NewReminder {
    NewReminder {
        id: ReminderId(id),
        title: format!("reminder {id}"),
        message: format!("body {id}"),
        remind_at: remind_at.to_rfc3339(),
    }
}

struct Harness {
    clock: ManualClock,
    service: ReminderService,
    watcher: Arc<TriggerWatcher>,
    fired: tokio::sync::mpsc::Receiver<smartreminder_core::Firing>,
}

fn harness() -> Harness {
    let clock = ManualClock::new(t0());
    let store = ReminderStore::new();
    let service = ReminderService::new(store.clone(), Arc::new(clock.clone()), Tz::UTC);
    let (notifier, fired) = ChannelNotifier::channel(256);
    let watcher = Arc::new(TriggerWatcher::new(
        store,
        Arc::new(notifier),
        Arc::new(clock.clone()),
        Duration::from_secs(10),
    ));
    Harness {
        clock,
        service,
        watcher,
        fired,
    }
}

fn drain(rx: &mut tokio::sync::mpsc::Receiver<smartreminder_core::Firing>) -> Vec<ReminderId> {
    let mut ids = Vec::new();
    while let Ok(firing) = rx.try_recv() {
        ids.push(firing.id);
    }
    ids
}

#[tokio::test]
async fn due_soon_fires_once_and_due_later_remains() {
    let mut h = harness();
    h.service
        .create(request(1, t0() + chrono::Duration::seconds(1)))
        .unwrap();
    h.service
        .create(request(2, t0() + chrono::Duration::hours(1)))
        .unwrap();

    // two poll intervals
    for _ in 0..2 {
        h.clock.advance(chrono::Duration::seconds(10));
        h.watcher.scan().await;
    }

    let remaining: Vec<_> = h.service.list().iter().map(|r| r.id).collect();
    assert_eq!(remaining, vec![ReminderId(2)]);
    assert_eq!(drain(&mut h.fired), vec![ReminderId(1)]);
    assert!(matches!(
        h.service.get(ReminderId(1)),
        Err(SchedulerError::NotFound { .. })
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn scans_started_together_fire_once() {
    let mut h = harness();
    for id in 0..20 {
        h.service
            .create(request(id, t0() + chrono::Duration::seconds(1)))
            .unwrap();
    }
    h.clock.advance(chrono::Duration::seconds(5));

    let barrier = Arc::new(Barrier::new(2));
    let scans: Vec<_> = (0..2)
        .map(|_| {
            let w = Arc::clone(&h.watcher);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                w.scan().await
            })
        })
        .collect();
    for scan in scans {
        scan.await.unwrap();
    }
    // whichever scan was skipped, a follow-up finds nothing left to fire
    h.watcher.scan().await;

    let mut fired = drain(&mut h.fired);
    fired.sort();
    assert_eq!(fired, (0..20).map(ReminderId).collect::<Vec<_>>());
    assert!(h.service.list().is_empty());
}

#[tokio::test]
async fn deleted_before_due_never_fires() {
    let mut h = harness();
    h.service
        .create(request(7, t0() + chrono::Duration::seconds(30)))
        .unwrap();
    h.service.delete(ReminderId(7)).unwrap();

    h.clock.advance(chrono::Duration::minutes(5));
    let report = h.watcher.scan().await.report().unwrap();
    assert_eq!(report.due, 0);
    assert!(drain(&mut h.fired).is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_deletes_have_exactly_one_success() {
    let h = harness();
    h.service
        .create(request(9, t0() + chrono::Duration::hours(1)))
        .unwrap();

    let barrier = Arc::new(Barrier::new(32));
    let tasks: Vec<_> = (0..32)
        .map(|_| {
            let svc = h.service.clone();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                svc.delete(ReminderId(9))
            })
        })
        .collect();

    let mut ok = 0;
    let mut not_found = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(_) => ok += 1,
            Err(SchedulerError::NotFound { .. }) => not_found += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(not_found, 31);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn creates_interleave_with_scans() {
    let mut h = harness();
    h.clock.advance(chrono::Duration::seconds(1));

    // eight writers plus the scanner
    let barrier = Arc::new(Barrier::new(9));
    let writers: Vec<_> = (0..8)
        .map(|w| {
            let svc = h.service.clone();
            let now = h.clock.now();
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                for i in 0..25 {
                    let id = w * 100 + i;
                    svc.create(request(id, now + chrono::Duration::seconds(2)))
                        .unwrap();
                }
            })
        })
        .collect();
    let scanner = tokio::spawn({
        let w = Arc::clone(&h.watcher);
        let barrier = Arc::clone(&barrier);
        async move {
            barrier.wait().await;
            for _ in 0..10 {
                w.scan().await;
                tokio::task::yield_now().await;
            }
        }
    });
    for w in writers {
        w.await.unwrap();
    }
    scanner.await.unwrap();

    // nothing was due yet, so everything is still pending
    assert_eq!(h.service.pending(), 200);
    assert!(drain(&mut h.fired).is_empty());

    h.clock.advance(chrono::Duration::seconds(5));
    h.watcher.scan().await;
    assert_eq!(h.service.pending(), 0);
    assert_eq!(drain(&mut h.fired).len(), 200);
}

#[tokio::test]
async fn running_watcher_fires_in_real_time() {
    let store = ReminderStore::new();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let service = ReminderService::new(store.clone(), Arc::clone(&clock), Tz::UTC);
    let (notifier, mut fired) = ChannelNotifier::channel(8);
    let watcher = TriggerWatcher::new(
        store,
        Arc::new(notifier),
        clock,
        Duration::from_millis(50),
    );
    let controller = LifecycleController::start(watcher, Duration::from_secs(2)).unwrap();

    service
        .create(request(1, Utc::now() + chrono::Duration::milliseconds(150)))
        .unwrap();
    service
        .create(request(2, Utc::now() + chrono::Duration::hours(1)))
        .unwrap();

    let firing = tokio::time::timeout(Duration::from_secs(3), fired.recv())
        .await
        .expect("reminder did not fire")
        .expect("channel closed");
    assert_eq!(firing.id, ReminderId(1));
    assert!(firing.fired_at >= firing.remind_at);

    // a few more intervals: no duplicate firing
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(fired.try_recv().is_err());
    assert_eq!(service.list().len(), 1);
    assert_eq!(controller.fired_total(), 1);

    let mut states = controller.subscribe_state();
    controller.shutdown().await.unwrap();
    assert_eq!(*states.borrow_and_update(), WatcherState::Stopped);
}
