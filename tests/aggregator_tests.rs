use gotrace_studio::aggregator::{
    build_collapsed_stacks, calculate_delay_distribution, calculate_hot_paths, compute_profile,
};
use gotrace_studio::codec::{marshal_to_vec, unmarshal_slice};
use gotrace_studio::model::{
    Diagnostic, Event, EventId, EventType, Frame, GoroutineMap, ProfileKind, Trace, TraceBuilder,
};
use gotrace_studio::timeline::analyze;
use pretty_assertions::assert_eq;

/// Two goroutines blocking on the same mutex from the same call site,
/// one receive whose unblock never arrives, one syscall
fn blocking_trace() -> Trace {
    let mut b = TraceBuilder::new();
    let lock = b.intern_frame(Frame::new(0x10, "sync.(*Mutex).Lock", "sync/mutex.go", 81));
    let main = b.intern_frame(Frame::new(0x20, "main.update", "main.go", 42));
    let recv = b.intern_frame(Frame::new(0x30, "runtime.chanrecv1", "runtime/chan.go", 442));
    let read = b.intern_frame(Frame::new(0x40, "syscall.read", "syscall/zsyscall.go", 12));

    let b1 = b.push_event(Event::new(EventType::GoBlockSync, 100, 1).with_stack(1, vec![lock, main]));
    let b2 = b.push_event(Event::new(EventType::GoBlockSync, 110, 2).with_stack(1, vec![lock, main]));
    b.push_event(Event::new(EventType::GoBlockRecv, 115, 3).with_stack(2, vec![recv]));
    let u1 = b.push_event(Event::new(EventType::GoUnblock, 130, 9).with_args([1, 0, 0]));
    let sys = b.push_event(Event::new(EventType::GoSysCall, 140, 4).with_stack(3, vec![read]));
    let u2 = b.push_event(Event::new(EventType::GoUnblock, 170, 9).with_args([2, 0, 0]));
    let exit = b.push_event(Event::new(EventType::GoSysExit, 200, 4));
    b.set_link(b1, u1);
    b.set_link(b2, u2);
    b.set_link(sys, exit);
    b.build().unwrap()
}

#[test]
fn test_identical_stacks_merge() {
    let profile = compute_profile(&blocking_trace(), ProfileKind::Block);

    assert_eq!(profile.samples.len(), 1);
    let sample = &profile.samples[0];
    assert_eq!(sample.count, 2);
    assert_eq!(sample.duration_ns, 30 + 60);
    assert_eq!(sample.folded_stack(), "main.update;sync.(*Mutex).Lock");
}

#[test]
fn test_unmatched_begin_contributes_nothing() {
    let profile = compute_profile(&blocking_trace(), ProfileKind::Block);

    assert_eq!(profile.total_count(), 2);
    assert_eq!(profile.diagnostics.len(), 1);
    assert!(matches!(
        profile.diagnostics[0],
        Diagnostic::UnmatchedPair { profile: ProfileKind::Block, .. }
    ));
}

#[test]
fn test_profiles_are_independent() {
    let trace = blocking_trace();

    let syscall = compute_profile(&trace, ProfileKind::Syscall);
    assert_eq!(syscall.total_duration(), 60);
    assert!(syscall.diagnostics.is_empty());

    assert!(compute_profile(&trace, ProfileKind::Io).is_empty());
    assert!(compute_profile(&trace, ProfileKind::Sched).is_empty());
}

#[test]
fn test_calculate_hot_paths() {
    let profile = compute_profile(&blocking_trace(), ProfileKind::Block);
    let hot_paths = calculate_hot_paths(&profile, 10);

    assert_eq!(hot_paths.len(), 1);
    assert_eq!(hot_paths[0].duration_ns, 90);
    assert_eq!(hot_paths[0].percentage, 100.0);
    assert_eq!(hot_paths[0].location.as_deref(), Some("sync/mutex.go:81"));
}

#[test]
fn test_delay_distribution() {
    let profile = compute_profile(&blocking_trace(), ProfileKind::Block);
    let dist = calculate_delay_distribution(&profile);

    assert_eq!(dist.total_ns, 90);
    assert_eq!(dist.stack_count, 1);
    assert_eq!(dist.sample_count, 2);
    assert!(dist.is_highly_concentrated());
}

#[test]
fn test_collapsed_stacks() {
    let profile = compute_profile(&blocking_trace(), ProfileKind::Syscall);
    let stacks = build_collapsed_stacks(&profile);

    assert_eq!(stacks.len(), 1);
    assert_eq!(stacks[0].to_line(), "syscall.read 60");
    assert_eq!(profile.collapsed(), vec!["syscall.read 60".to_string()]);
}

#[test]
fn test_decoded_extreme_timestamps_do_not_panic() {
    let mut b = TraceBuilder::new();
    let f = b.intern_frame(Frame::new(0x50, "net.(*conn).Read", "net/net.go", 183));
    b.push_event(Event::new(EventType::GoCreate, i64::MIN, 0).with_args([1, 0, 0]));
    let block = b.push_event(Event::new(EventType::GoBlockNet, i64::MIN, 1).with_stack(1, vec![f]));
    let unblock = b.push_event(Event::new(EventType::GoUnblock, 1, 0).with_args([1, 0, 0]));
    b.set_link(block, unblock);
    let bytes = marshal_to_vec(&b.build().unwrap(), &GoroutineMap::new()).unwrap();

    let snapshot = unmarshal_slice(&bytes).unwrap();
    let profile = compute_profile(&snapshot.trace, ProfileKind::Io);
    assert!(profile.is_empty());
    assert_eq!(
        profile.diagnostics,
        vec![Diagnostic::DurationOverflow { event: EventId::new(1) }]
    );

    let timelines = analyze(&snapshot.trace);
    assert_eq!(timelines.get(1).unwrap().stats.io_time, i64::MAX);
}
