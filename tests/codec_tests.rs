use gotrace_studio::codec::{marshal_to_vec, read_snapshot, unmarshal_slice, write_snapshot};
use gotrace_studio::model::{
    Event, EventId, EventType, Frame, GoroutineMap, GoroutineStats, Trace, TraceBuilder,
};
use gotrace_studio::timeline::goroutine_stats;
use gotrace_studio::utils::error::CodecError;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn two_events() -> Trace {
    let mut b = TraceBuilder::new();
    b.push_event(Event::new(EventType::GoStart, 1, 1));
    b.push_event(Event::new(EventType::GoEnd, 2, 1));
    b.build().unwrap()
}

#[test]
fn test_header_claims_more_events_than_present() {
    let mut bytes = marshal_to_vec(&two_events(), &GoroutineMap::new()).unwrap();
    bytes[..8].copy_from_slice(&3i64.to_le_bytes());

    let err = unmarshal_slice(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::Truncated { .. }));
    assert!(err.is_format_error());
}

#[test]
fn test_absent_link_stays_absent() {
    let bytes = marshal_to_vec(&two_events(), &GoroutineMap::new()).unwrap();
    let snapshot = unmarshal_slice(&bytes).unwrap();
    assert!(snapshot.trace.events().iter().all(|ev| ev.link.is_none()));
}

#[test]
fn test_file_round_trip_with_computed_stats() {
    let mut b = TraceBuilder::new();
    let f = b.intern_frame(Frame::new(7, "main.loop", "main.go", 18));
    let create = b.push_event(Event::new(EventType::GoCreate, 0, 0).with_args([3, 0, 0]));
    let start = b.push_event(Event::new(EventType::GoStart, 4, 3).with_p(2).with_stack(1, vec![f]));
    b.push_event(Event::new(EventType::GoSched, 9, 3).with_p(2).with_stack(1, vec![f]));
    b.set_link(create, start);
    let trace = b.build().unwrap();
    let stats = goroutine_stats(&trace);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("trace.snap");
    write_snapshot(&path, &trace, &stats).unwrap();
    let snapshot = read_snapshot(&path).unwrap();

    assert_eq!(snapshot.trace, trace);
    assert_eq!(snapshot.goroutines, stats);
    assert_eq!(snapshot.goroutines[&3].name, "main.loop");
    assert_eq!(snapshot.trace.events()[0].link, Some(EventId::new(1)));
}

#[test]
fn test_arena_order_not_preserved_but_content_is() {
    let main = Frame::new(1, "main.main", "main.go", 10);
    let work = Frame::new(2, "main.work", "main.go", 20);

    let mut b = TraceBuilder::new();
    b.push_frame(Frame::new(3, "main.unused", "main.go", 30));
    let w = b.push_frame(work.clone());
    let m1 = b.push_frame(main.clone());
    let m2 = b.push_frame(main.clone());
    b.push_event(Event::new(EventType::GoStart, 1, 1).with_stack(1, vec![m1, w]));
    b.push_event(Event::new(EventType::GoSched, 2, 1).with_stack(2, vec![m2, w]));
    let trace = b.build().unwrap();

    let bytes = marshal_to_vec(&trace, &GoroutineMap::new()).unwrap();
    let decoded = unmarshal_slice(&bytes).unwrap().trace;

    // Only referenced frames are written, in first-encounter order.
    assert_eq!(decoded.frames(), &[main.clone(), work, main]);
    assert_ne!(decoded, trace);
    assert!(decoded.is_equivalent(&trace));
}

fn arb_frame() -> impl Strategy<Value = Frame> {
    (any::<u64>(), "[a-z.]{1,12}", "[a-z/]{0,10}\\.go", any::<i64>())
        .prop_map(|(pc, func, file, line)| Frame::new(pc, func, file, line))
}

fn arb_stats() -> impl Strategy<Value = GoroutineStats> {
    (any::<u64>(), "[a-z.]{0,10}", any::<u64>(), prop::array::uniform11(any::<i64>())).prop_map(
        |(id, name, pc, t)| GoroutineStats {
            id,
            name,
            pc,
            creation_time: t[0],
            start_time: t[1],
            end_time: t[2],
            exec_time: t[3],
            sched_wait_time: t[4],
            io_time: t[5],
            block_time: t[6],
            syscall_time: t[7],
            gc_time: t[8],
            sweep_time: t[9],
            total_time: t[10],
        },
    )
}

/// One generated event: kind, ts delta, p, g, stk_id, stack picks, args,
/// link pick, off
type RawEvent = (
    EventType,
    u16,
    i32,
    u64,
    u64,
    Vec<usize>,
    [u64; 3],
    Option<usize>,
    i32,
);

fn arb_event() -> impl Strategy<Value = RawEvent> {
    (
        prop::sample::select(EventType::all().collect::<Vec<_>>()),
        any::<u16>(),
        any::<i32>(),
        any::<u64>(),
        any::<u64>(),
        prop::collection::vec(0usize..8, 0..5),
        prop::array::uniform3(any::<u64>()),
        prop::option::of(any::<usize>()),
        any::<i32>(),
    )
}

/// Build a trace whose frame arena is `pool` as given: any order, possibly
/// with frames no event uses and equal frames under separate identities
fn build_trace(pool: &[Frame], raw: &[RawEvent]) -> Trace {
    let mut b = TraceBuilder::new();
    let arena: Vec<_> = pool.iter().map(|f| b.push_frame(f.clone())).collect();
    let mut ts = i64::MIN / 2;
    let mut ids = Vec::new();
    for (ty, delta, p, g, stk_id, picks, args, _, off) in raw {
        ts += i64::from(*delta);
        let stk = picks.iter().map(|i| arena[i % arena.len()]).collect();
        let ev = Event::new(*ty, ts, *g)
            .with_p(*p)
            .with_stack(*stk_id, stk)
            .with_args(*args)
            .with_off(*off);
        ids.push(b.push_event(ev));
    }
    for (i, (.., link, _)) in raw.iter().enumerate() {
        if let Some(target) = link {
            b.set_link(ids[i], ids[target % ids.len()]);
        }
    }
    b.build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_snapshot_round_trip(
        pool in prop::collection::vec(arb_frame(), 1..8),
        raw in prop::collection::vec(arb_event(), 0..40),
        stats in prop::collection::vec(arb_stats(), 0..6),
    ) {
        let trace = build_trace(&pool, &raw);
        let goroutines: GoroutineMap = stats.into_iter().map(|s| (s.id, s)).collect();

        let bytes = marshal_to_vec(&trace, &goroutines).unwrap();
        let decoded = unmarshal_slice(&bytes).unwrap();

        prop_assert!(decoded.trace.is_equivalent(&trace));
        prop_assert!(trace.is_equivalent(&decoded.trace));
        prop_assert_eq!(&decoded.goroutines, &goroutines);
    }

    #[test]
    fn prop_truncation_never_yields_a_snapshot(
        pool in prop::collection::vec(arb_frame(), 1..4),
        raw in prop::collection::vec(arb_event(), 1..10),
        cut in any::<prop::sample::Index>(),
    ) {
        let trace = build_trace(&pool, &raw);
        let bytes = marshal_to_vec(&trace, &GoroutineMap::new()).unwrap();
        let cut = cut.index(bytes.len());

        let err = unmarshal_slice(&bytes[..cut]).unwrap_err();
        prop_assert!(err.is_format_error());
    }
}
