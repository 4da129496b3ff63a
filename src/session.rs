//! Loading context for one trace snapshot.
//!
//! A session loads its snapshot at most once and memoizes everything
//! derived from it. After loading, readers share `&Snapshot` without
//! locking; the mutex only serialises the first load so a failed load can
//! be retried and concurrent first callers never decode twice.

use crate::aggregator::{compute_profile, Profile};
use crate::codec::{read_snapshot, Snapshot};
use crate::model::{GoroutineMap, ProfileKind, Trace};
use crate::timeline::{build_timelines, goroutine_stats, Timelines};
use crate::utils::config::SessionConfig;
use crate::utils::error::{CodecError, LoadError};
use log::{debug, info};
use std::path::Path;
use std::sync::{Mutex, OnceLock};

/// One loaded (or loadable) trace and its derived analyses
#[derive(Debug)]
pub struct TraceSession {
    config: Option<SessionConfig>,
    snapshot: OnceLock<Snapshot>,
    init: Mutex<()>,
    timelines: OnceLock<Timelines>,
    profiles: [OnceLock<Profile>; 4],
}

impl TraceSession {
    /// Session that loads `config.snapshot_path` on first use
    pub fn from_config(config: SessionConfig) -> Self {
        Self {
            config: Some(config),
            snapshot: OnceLock::new(),
            init: Mutex::new(()),
            timelines: OnceLock::new(),
            profiles: Default::default(),
        }
    }

    /// Session over an in-memory trace
    pub fn from_parts(trace: Trace, goroutines: GoroutineMap) -> Self {
        let session = Self {
            config: None,
            snapshot: OnceLock::new(),
            init: Mutex::new(()),
            timelines: OnceLock::new(),
            profiles: Default::default(),
        };
        let _ = session.snapshot.set(Snapshot::new(trace, goroutines));
        session
    }

    /// Load the snapshot if needed and return it
    ///
    /// # Errors
    /// * `LoadError::Open` - the file could not be opened or read
    /// * `LoadError::Decode` - the file is not a valid snapshot
    /// * `LoadError::Poisoned` - an earlier loader panicked
    pub fn snapshot(&self) -> Result<&Snapshot, LoadError> {
        if let Some(snapshot) = self.snapshot.get() {
            return Ok(snapshot);
        }

        let _guard = self.init.lock().map_err(|_| LoadError::Poisoned)?;
        if let Some(snapshot) = self.snapshot.get() {
            return Ok(snapshot);
        }

        let Some(config) = &self.config else {
            // In-memory sessions are filled at construction.
            return Ok(self.snapshot.get_or_init(Snapshot::default));
        };

        let loaded = load(config)?;
        Ok(self.snapshot.get_or_init(|| loaded))
    }

    /// Snapshot path, for sessions loaded from disk
    pub fn source(&self) -> Option<&Path> {
        self.config.as_ref().map(|c| c.snapshot_path.as_path())
    }

    pub fn trace(&self) -> Result<&Trace, LoadError> {
        Ok(&self.snapshot()?.trace)
    }

    /// Goroutine timelines, built on first use
    ///
    /// Statistics stored in the snapshot are used as-is; a snapshot
    /// without any is analysed from its events.
    pub fn timelines(&self) -> Result<&Timelines, LoadError> {
        if let Some(timelines) = self.timelines.get() {
            return Ok(timelines);
        }
        let snapshot = self.snapshot()?;
        Ok(self.timelines.get_or_init(|| {
            if snapshot.goroutines.is_empty() && !snapshot.trace.is_empty() {
                debug!("Snapshot has no goroutine statistics; computing them");
                build_timelines(&snapshot.trace, &goroutine_stats(&snapshot.trace))
            } else {
                build_timelines(&snapshot.trace, &snapshot.goroutines)
            }
        }))
    }

    /// Profile of one kind, computed on first use
    pub fn profile(&self, kind: ProfileKind) -> Result<&Profile, LoadError> {
        let slot = &self.profiles[kind.index()];
        if let Some(profile) = slot.get() {
            return Ok(profile);
        }
        let trace = self.trace()?;
        Ok(slot.get_or_init(|| compute_profile(trace, kind)))
    }

    /// Tear down the session, keeping the snapshot
    pub fn into_snapshot(self) -> Result<Snapshot, LoadError> {
        if let Some(snapshot) = self.snapshot.into_inner() {
            return Ok(snapshot);
        }
        match &self.config {
            Some(config) => load(config),
            None => Ok(Snapshot::default()),
        }
    }
}

fn load(config: &SessionConfig) -> Result<Snapshot, LoadError> {
    let path = &config.snapshot_path;
    info!("Loading trace snapshot: {}", path.display());

    read_snapshot(path).map_err(|err| match err {
        CodecError::Io(source) => LoadError::Open {
            path: path.clone(),
            source,
        },
        source => LoadError::Decode {
            path: path.clone(),
            source,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::write_snapshot;
    use crate::model::{Event, EventType, Frame, TraceBuilder};

    fn sample() -> Trace {
        let mut b = TraceBuilder::new();
        let f = b.intern_frame(Frame::new(1, "main.main", "main.go", 4));
        b.push_event(Event::new(EventType::GoCreate, 0, 0).with_args([1, 0, 0]));
        let call = b.push_event(Event::new(EventType::GoSysCall, 5, 1).with_stack(1, vec![f]));
        let exit = b.push_event(Event::new(EventType::GoSysExit, 9, 1));
        b.set_link(call, exit);
        b.build().unwrap()
    }

    #[test]
    fn test_session_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TraceSession>();
    }

    #[test]
    fn test_concurrent_first_access_computes_once() {
        let session = TraceSession::from_parts(sample(), GoroutineMap::new());
        let addrs: Vec<usize> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..4)
                .map(|_| s.spawn(|| session.profile(ProfileKind::Syscall).unwrap() as *const Profile as usize))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(addrs.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(session.profile(ProfileKind::Syscall).unwrap().total_duration(), 4);
    }

    #[test]
    fn test_timelines_computed_when_snapshot_has_no_stats() {
        let session = TraceSession::from_parts(sample(), GoroutineMap::new());
        let t = session.timelines().unwrap();
        assert_eq!(t.len(), 1);
        assert_eq!(t.get(1).unwrap().stats.syscall_time, 0);
    }

    #[test]
    fn test_lazy_load_and_retry_after_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.snap");
        let session = TraceSession::from_config(SessionConfig::new(&path));

        assert!(matches!(session.snapshot(), Err(LoadError::Open { .. })));

        let trace = sample();
        write_snapshot(&path, &trace, &goroutine_stats(&trace)).unwrap();
        assert_eq!(session.trace().unwrap().len(), 3);
        assert_eq!(session.into_snapshot().unwrap().trace, trace);
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.snap");
        std::fs::write(&path, [1, 2, 3]).unwrap();

        let session = TraceSession::from_config(SessionConfig::new(&path));
        assert!(matches!(session.snapshot(), Err(LoadError::Decode { .. })));
    }
}
