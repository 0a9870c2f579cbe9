//! Replay of Tarmac scenario recordings.
//!
//! Reconstructs the exact set of active entities and their attributes at
//! any simulation timestamp by walking a recording's frame deltas forward
//! or backward against a materialized per-entity cache.
//!
//! # Architecture
//!
//! - [`Replay`] — the session: cursor, seek engine, and read accessors
//! - [`StateCache`] — last known state per entity, index-bound into the
//!   timeline
//! - [`merge`] — aligns several recordings into one namespaced timeline
//! - [`discover_recordings`] — batch-result directory scanning
//! - [`sample_times`] — export timestamp schedules for CSV/report
//!   consumers
//!
//! # Seeking
//!
//! ```
//! use tarmac_core::record::LogHeader;
//! use tarmac_core::{EntityId, Package, Timeline};
//! use tarmac_replay::Replay;
//!
//! let mut timeline = Timeline::new(LogHeader {
//!     version: 2,
//!     odr_path: "road.xodr".into(),
//!     model_path: "scene.osgb".into(),
//! });
//! timeline.push(Package::Time(0.0));
//! timeline.push(Package::EntityId(EntityId(1)));
//! timeline.push(Package::EntityAdded);
//! timeline.push(Package::Speed(10.0));
//! timeline.push(Package::Time(0.1));
//! timeline.push(Package::EntityId(EntityId(1)));
//! timeline.push(Package::Speed(12.0));
//! timeline.push(Package::EndOfScenario);
//!
//! let mut replay = Replay::from_timeline(timeline).unwrap();
//! replay.seek(0.1);
//! assert_eq!(replay.speed(EntityId(1)).unwrap(), 12.0);
//! replay.seek(0.0);
//! assert_eq!(replay.speed(EntityId(1)).unwrap(), 10.0);
//! ```
//!
//! The session is single-threaded and not re-entrant; a host sharing one
//! session across threads must serialize access externally.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod discover;
pub mod error;
pub mod export;
pub mod merge;
pub mod session;
pub mod state;

pub use discover::{discover_recordings, RECORDING_EXTENSION};
pub use error::ReplayError;
pub use export::{sample_times, ExportMode};
pub use merge::{merge, Recording, GROUP_STRIDE};
pub use session::Replay;
pub use state::{AttrSlot, CachedEntity, StateCache};
