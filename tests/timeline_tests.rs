use gotrace_studio::model::{Diagnostic, Event, EventId, EventType, Trace, TraceBuilder};
use gotrace_studio::timeline::{analyze, build_timelines, goroutine_stats};
use pretty_assertions::assert_eq;

/// A lives 0..100, B is created at 60; a GC runs 20..40
fn two_goroutines() -> (Trace, [EventId; 10]) {
    let mut b = TraceBuilder::new();
    let create_a = b.push_event(Event::new(EventType::GoCreate, 0, 0).with_args([1, 0, 0]));
    let start_a = b.push_event(Event::new(EventType::GoStart, 5, 1));
    let gc = b.push_event(Event::new(EventType::GCStart, 20, 0));
    let gc_done = b.push_event(Event::new(EventType::GCDone, 40, 0));
    let block = b.push_event(Event::new(EventType::GoBlockRecv, 50, 1));
    let create_b = b.push_event(Event::new(EventType::GoCreate, 60, 1).with_args([2, 0, 0]));
    let unblock = b.push_event(Event::new(EventType::GoUnblock, 70, 2).with_args([1, 0, 0]));
    let start_b = b.push_event(Event::new(EventType::GoStart, 75, 2));
    let restart_a = b.push_event(Event::new(EventType::GoStart, 80, 1));
    let end_a = b.push_event(Event::new(EventType::GoEnd, 100, 1));
    b.set_link(create_a, start_a);
    b.set_link(gc, gc_done);
    b.set_link(block, unblock);
    b.set_link(create_b, start_b);
    b.set_link(unblock, restart_a);
    let ids = [
        create_a, start_a, gc, gc_done, block, create_b, unblock, start_b, restart_a, end_a,
    ];
    (b.build().unwrap(), ids)
}

#[test]
fn test_durations_per_bucket() {
    let (trace, _) = two_goroutines();
    let stats = goroutine_stats(&trace);

    let a = &stats[&1];
    assert_eq!(a.sched_wait_time, 5 + 10);
    assert_eq!(a.block_time, 20);
    assert_eq!(a.exec_time, 45 + 20);
    assert_eq!(a.gc_time, 20);
    assert_eq!(a.total_time, 100);

    let b = &stats[&2];
    assert_eq!(b.creation_time, 60);
    assert_eq!(b.sched_wait_time, 15);
    assert_eq!(b.exec_time, 25);
    assert_eq!(b.gc_time, 0);
}

#[test]
fn test_gc_attributed_only_to_live_goroutines() {
    let (trace, ids) = two_goroutines();
    let [_, _, gc, gc_done, ..] = ids;
    let timelines = analyze(&trace);

    let a = timelines.get(1).unwrap().events();
    assert!(a.contains(&gc) && a.contains(&gc_done));

    let b = timelines.get(2).unwrap().events();
    assert!(!b.contains(&gc));
}

#[test]
fn test_event_and_link_appear_once_in_order() {
    let (trace, ids) = two_goroutines();
    let [create_a, start_a, gc, gc_done, block, create_b, unblock, start_b, restart_a, end_a] = ids;
    let timelines = analyze(&trace);

    // A's list includes B's creation and its first start; B's includes the
    // unblock it performed and the restart it linked to.
    assert_eq!(
        timelines.get(1).unwrap().events(),
        &[create_a, start_a, gc, gc_done, block, create_b, unblock, start_b, restart_a, end_a]
    );
    assert_eq!(
        timelines.get(2).unwrap().events(),
        &[create_b, unblock, start_b, restart_a]
    );
}

#[test]
fn test_unknown_goroutine_reported() {
    let mut b = TraceBuilder::new();
    b.push_event(Event::new(EventType::GoCreate, 0, 0).with_args([1, 0, 0]));
    let stray = b.push_event(Event::new(EventType::GoStart, 3, 42));
    let trace = b.build().unwrap();

    let stats = goroutine_stats(&trace);
    let timelines = build_timelines(&trace, &stats);

    assert_eq!(timelines.len(), 1);
    assert_eq!(
        timelines.diagnostics,
        vec![Diagnostic::UnknownGoroutine { event: stray, goroutine: 42 }]
    );
}
