//! Integration tests for notification ordering, registry lifecycle and
//! re-entrant subscribers.

use parking_lot::Mutex;
use proptest::prelude::*;
use state_hub::notify::subscriber;
use state_hub::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

type Log = Arc<Mutex<Vec<String>>>;

fn recorder(name: &str, log: &Log) -> Arc<dyn Subscriber<String>> {
    let log = Arc::clone(log);
    let tag = name.to_string();
    subscriber::from_fn(name.to_string(), move |s: &String| {
        log.lock().push(format!("{}:{}", tag, s));
    })
}

#[test]
fn test_reference_scenario() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();
    let a = recorder("A", &log);
    let b = recorder("B", &log);

    hub.subscribe(Arc::clone(&a));
    hub.subscribe(Arc::clone(&b));
    hub.set_state("S1".to_string()).unwrap();

    hub.unsubscribe(&a);
    hub.set_state("S2".to_string()).unwrap();

    assert_eq!(*log.lock(), vec!["A:S1", "B:S1", "B:S2"]);
    assert_eq!(hub.get_state(), "S2");
}

#[test]
fn test_get_state_has_no_side_effects() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();
    hub.subscribe(recorder("A", &log));
    hub.set_state("v".to_string()).unwrap();

    for _ in 0..5 {
        assert_eq!(hub.get_state(), "v");
    }
    assert_eq!(log.lock().len(), 1);
}

#[test]
fn test_unsubscribe_never_subscribed_or_removed() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();
    let a = recorder("A", &log);
    let stranger = recorder("X", &log);

    assert!(!hub.unsubscribe(&stranger));

    hub.subscribe(Arc::clone(&a));
    assert!(hub.unsubscribe(&a));
    assert!(!hub.unsubscribe(&a));

    hub.set_state("quiet".to_string()).unwrap();
    assert!(log.lock().is_empty());
}

#[test]
fn test_duplicate_registration() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();
    let a = recorder("A", &log);
    let b = recorder("B", &log);

    let first = hub.subscribe(Arc::clone(&a));
    hub.subscribe(Arc::clone(&b));
    let second = hub.subscribe(Arc::clone(&a));
    assert_ne!(first, second);

    hub.set_state("1".to_string()).unwrap();
    assert_eq!(*log.lock(), vec!["A:1", "B:1", "A:1"]);
    log.lock().clear();

    // identity removal drops the earliest registration only
    hub.unsubscribe(&a);
    hub.set_state("2".to_string()).unwrap();
    assert_eq!(*log.lock(), vec!["B:2", "A:2"]);
    log.lock().clear();

    hub.unsubscribe_id(second);
    hub.set_state("3".to_string()).unwrap();
    assert_eq!(*log.lock(), vec!["B:3"]);
}

#[test]
fn test_unsubscribe_during_pass_uses_snapshot() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();
    let b = recorder("B", &log);

    let hub_clone = hub.clone();
    let b_clone = Arc::clone(&b);
    let log_clone = Arc::clone(&log);
    hub.on_change("A", move |s: &String| {
        log_clone.lock().push(format!("A:{}", s));
        hub_clone.unsubscribe(&b_clone);
    });
    hub.subscribe(Arc::clone(&b));

    hub.set_state("S1".to_string()).unwrap();
    assert_eq!(*log.lock(), vec!["A:S1", "B:S1"]);

    hub.set_state("S2".to_string()).unwrap();
    assert_eq!(*log.lock(), vec!["A:S1", "B:S1", "A:S2"]);
}

#[test]
fn test_subscribe_during_pass_waits_for_next_pass() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();
    let late = recorder("late", &log);

    let hub_clone = hub.clone();
    let added = Arc::new(AtomicUsize::new(0));
    let added_clone = Arc::clone(&added);
    hub.on_change("adder", move |_: &String| {
        if added_clone.fetch_add(1, Ordering::SeqCst) == 0 {
            hub_clone.subscribe(Arc::clone(&late));
        }
    });

    hub.set_state("S1".to_string()).unwrap();
    assert!(log.lock().is_empty());

    hub.set_state("S2".to_string()).unwrap();
    assert_eq!(*log.lock(), vec!["late:S2"]);
}

#[test]
fn test_nested_set_state_runs_nested_pass() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();

    let hub_clone = hub.clone();
    let log_clone = Arc::clone(&log);
    hub.on_change("A", move |s: &String| {
        log_clone.lock().push(format!("A:{}", s));
        if s == "outer" {
            hub_clone.set_state("inner".to_string()).unwrap();
        }
    });
    hub.subscribe(recorder("B", &log));

    hub.set_state("outer".to_string()).unwrap();

    assert_eq!(*log.lock(), vec!["A:outer", "A:inner", "B:inner", "B:outer"]);
    assert_eq!(hub.get_state(), "inner");
}

#[test]
fn test_scoped_subscription() {
    let hub: NotificationHub = NotificationHub::new();
    let log = Log::default();

    {
        let _handle = hub.subscribe_scoped(recorder("scoped", &log));
        hub.set_state("inside".to_string()).unwrap();
    }
    hub.set_state("outside".to_string()).unwrap();

    let kept = hub.subscribe_scoped(recorder("kept", &log)).detach();
    hub.set_state("detached".to_string()).unwrap();

    assert_eq!(*log.lock(), vec!["scoped:inside", "kept:detached"]);
    assert!(hub.unsubscribe_id(kept));
}

#[test]
fn test_custom_subscriber_type() {
    struct Counter {
        hits: AtomicUsize,
    }

    impl Subscriber<String> for Counter {
        fn notify(&self, _state: &String) -> std::result::Result<(), SubscriberError> {
            self.hits.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn name(&self) -> &str {
            "counter"
        }
    }

    let hub: NotificationHub = NotificationHub::new();
    let counter = Arc::new(Counter {
        hits: AtomicUsize::new(0),
    });
    hub.subscribe(counter.clone());

    hub.set_state("a".to_string()).unwrap();
    hub.set_state("b".to_string()).unwrap();
    hub.unsubscribe(&counter);
    hub.set_state("c".to_string()).unwrap();

    assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
}

#[test]
fn test_concurrent_set_state() {
    let hub: NotificationHub = NotificationHub::new();
    let total = Arc::new(AtomicUsize::new(0));
    let total_clone = Arc::clone(&total);
    hub.on_change("count", move |_: &String| {
        total_clone.fetch_add(1, Ordering::SeqCst);
    });

    let workers: Vec<_> = (0..4)
        .map(|worker| {
            let hub = hub.clone();
            thread::spawn(move || {
                for i in 0..25 {
                    hub.set_state(format!("{}-{}", worker, i)).unwrap();
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().unwrap();
    }

    assert_eq!(total.load(Ordering::SeqCst), 100);
    assert!(hub.get_state().ends_with("-24"));
}

proptest! {
    #[test]
    fn prop_every_subscriber_notified_once_in_order(count in 0usize..16, value in ".*") {
        let hub: NotificationHub = NotificationHub::new();
        let log = Log::default();
        for i in 0..count {
            hub.subscribe(recorder(&i.to_string(), &log));
        }

        let report = hub.set_state(value.clone()).unwrap();

        let expected: Vec<String> = (0..count).map(|i| format!("{}:{}", i, value)).collect();
        prop_assert_eq!(report.delivered, count);
        prop_assert_eq!(log.lock().clone(), expected);
        prop_assert_eq!(hub.get_state(), value);
    }

    #[test]
    fn prop_removed_subscriber_is_never_notified(count in 1usize..12, removed in 0usize..12) {
        let removed = removed % count;
        let hub: NotificationHub = NotificationHub::new();
        let log = Log::default();
        let subs: Vec<_> = (0..count).map(|i| recorder(&i.to_string(), &log)).collect();
        for sub in &subs {
            hub.subscribe(Arc::clone(sub));
        }

        hub.unsubscribe(&subs[removed]);
        hub.set_state("v".to_string()).unwrap();

        let expected: Vec<String> = (0..count)
            .filter(|i| *i != removed)
            .map(|i| format!("{}:v", i))
            .collect();
        prop_assert_eq!(log.lock().clone(), expected);
    }
}
