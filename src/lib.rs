//! Go Trace Studio
//!
//! Goroutine timeline reconstruction, blocking profiles and binary
//! snapshots for Go execution traces.
//!
//! This crate provides the core implementation for the
//! `gotrace` CLI tool.
//!
//! ## Getting Started
//!
//! Most users should pack a decoded trace and use the CLI:
//!
//! ```bash
//! gotrace pack --input trace.json --output trace.snap
//! gotrace --snapshot trace.snap profile block --summary
//! ```
//!
//! Library users load a snapshot through a [`session::TraceSession`] and
//! ask it for timelines and profiles:
//!
//! ```ignore
//! use gotrace_studio::session::TraceSession;
//! use gotrace_studio::utils::config::SessionConfig;
//! use gotrace_studio::model::ProfileKind;
//!
//! let session = TraceSession::from_config(SessionConfig::new("trace.snap"));
//! let block = session.profile(ProfileKind::Block)?;
//! ```

pub mod aggregator;
pub mod codec;
pub mod commands;
pub mod model;
pub mod output;
pub mod parser;
pub mod query;
pub mod session;
pub mod timeline;
pub mod utils;
