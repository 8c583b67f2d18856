use std::sync::{Arc, Mutex};

use kyrocast::{
    invoke, negate, negate_transformer, square, square_transformer, Callback, CallbackList,
    CastError, DispatchError, Notifier, NotifierState, Transformer, ValueChanged,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Log = Arc<Mutex<Vec<&'static str>>>;

fn named(log: &Log, name: &'static str) -> Callback<u32> {
    let log = Arc::clone(log);
    Callback::new(move |_: &u32| log.lock().unwrap().push(name))
}

#[test]
fn targets_run_in_combination_order() {
    init_logging();
    let log: Log = Arc::default();
    let names = ["t1", "t2", "t3", "t4", "t5"];

    let mut list = CallbackList::new();
    for name in names {
        list += named(&log, name);
    }
    invoke(&list, &0).unwrap();

    assert_eq!(*log.lock().unwrap(), names.to_vec());
}

#[test]
fn combining_does_not_change_the_original_list() {
    init_logging();
    let log: Log = Arc::default();
    let original = CallbackList::from(named(&log, "a"));
    let _grown = original.combine(named(&log, "b"));

    invoke(&original, &0).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["a"]);
}

#[test]
fn removing_a_duplicate_keeps_one_occurrence() {
    let log: Log = Arc::default();
    let base = CallbackList::from(named(&log, "base"));
    let t = named(&log, "t");

    let doubled = base.combine(t.clone()).combine(t.clone());
    assert_eq!(doubled.remove(&t), base.combine(t));
}

#[test]
fn removing_an_absent_target_is_a_noop() {
    let log: Log = Arc::default();
    let list = CallbackList::from(named(&log, "a")).combine(named(&log, "b"));
    let stranger = named(&log, "a");
    assert_eq!(list.remove(&stranger), list);
}

#[test]
fn function_handles_built_in_the_library_are_removed_by_local_handles() {
    let list = CallbackList::from(negate_transformer::<i64>()).combine(square_transformer());

    let local_negate: Transformer<i64> = Callback::from_fn(negate::<i64>);
    let local_square: Transformer<i64> = Callback::from_fn(square);
    assert!(list.contains(&local_negate));
    assert!(list.contains(&local_square));
    assert!(list.remove(&local_negate).remove(&local_square).is_empty());

    let other_width: Transformer<i32> = Callback::from_fn(negate::<i32>);
    assert_ne!(other_width.key(), local_negate.key());
}

#[test]
fn failure_in_the_middle_stops_later_targets() {
    init_logging();
    let log: Log = Arc::default();
    let b_log = Arc::clone(&log);
    let b: Callback<u32> = Callback::try_new(move |_: &u32| {
        b_log.lock().unwrap().push("b");
        Err("b exploded")
    });
    let list = CallbackList::from(named(&log, "a"))
        .combine(b)
        .combine(named(&log, "c"));

    let err = invoke(&list, &0).unwrap_err();

    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    assert!(matches!(
        err,
        CastError::Dispatch(DispatchError::TargetFailed { index: 1, target_count: 3, .. })
    ));
}

#[test]
fn subscribing_during_dispatch_affects_only_the_next_dispatch() {
    init_logging();
    let notifier = Arc::new(Notifier::new(0_u32));
    let log: Log = Arc::default();

    let late = {
        let log = Arc::clone(&log);
        Callback::new(move |_: &ValueChanged<u32>| log.lock().unwrap().push("late"))
    };
    let early = {
        let log = Arc::clone(&log);
        let weak = Arc::downgrade(&notifier);
        Callback::new(move |e: &ValueChanged<u32>| {
            log.lock().unwrap().push("early");
            if e.current == 1 {
                if let Some(n) = weak.upgrade() {
                    assert_eq!(n.state(), NotifierState::Dispatching);
                    n.subscribe(late.clone());
                }
            }
        })
    };
    notifier.subscribe(early);

    notifier.set(1).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["early"]);

    notifier.set(2).unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["early", "early", "late"]);
}

#[test]
fn unsubscribing_during_dispatch_still_runs_the_snapshot() {
    let notifier = Arc::new(Notifier::new(0_u32));
    let log: Log = Arc::default();

    let second = {
        let log = Arc::clone(&log);
        Callback::new(move |_: &ValueChanged<u32>| log.lock().unwrap().push("second"))
    };
    let first = {
        let log = Arc::clone(&log);
        let weak = Arc::downgrade(&notifier);
        let second = second.clone();
        Callback::new(move |_: &ValueChanged<u32>| {
            log.lock().unwrap().push("first");
            if let Some(n) = weak.upgrade() {
                n.unsubscribe(&second);
            }
        })
    };
    notifier.subscribe(first);
    notifier.subscribe(second);

    notifier.set(1).unwrap();
    notifier.set(2).unwrap();

    assert_eq!(*log.lock().unwrap(), vec!["first", "second", "first"]);
}

#[test]
fn notifier_failure_surfaces_to_the_setter() {
    let notifier = Notifier::new("draft".to_string());
    notifier.subscribe(Callback::try_new(|e: &ValueChanged<String>| {
        if e.current.is_empty() {
            Err("empty title")
        } else {
            Ok(())
        }
    }));

    assert!(notifier.set("final".to_string()).unwrap());
    let err = notifier.set(String::new()).unwrap_err();
    assert_eq!(err.target_error().map(ToString::to_string).as_deref(), Some("empty title"));
}
