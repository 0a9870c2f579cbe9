//! Tarmac: driving-scenario recording and replay.
//!
//! Records a scenario simulation as an append-only binary log of typed
//! packages, and replays it: given any simulation timestamp, the replay
//! session reconstructs the exact set of active entities and their
//! attributes at that instant, walking frame deltas forward or backward
//! against a materialized state cache. Several independently recorded
//! logs can be merged into one id-namespaced timeline.
//!
//! This is the top-level facade crate re-exporting the public API from
//! the Tarmac sub-crates; adding `tarmac` as a single dependency is
//! sufficient for most users.
//!
//! # Quick start
//!
//! ```
//! use tarmac::prelude::*;
//!
//! // Record two frames of a one-vehicle scenario to an in-memory sink.
//! let header = LogHeader {
//!     version: FORMAT_VERSION,
//!     odr_path: "road.xodr".into(),
//!     model_path: "scene.osgb".into(),
//! };
//! let mut buf = Vec::new();
//! let mut writer = LogWriter::new(&mut buf, &header).unwrap();
//! for (t, speed) in [(0.0, 10.0), (0.1, 12.0)] {
//!     writer.write_package(&Package::Time(t)).unwrap();
//!     writer.write_package(&Package::EntityId(EntityId(1))).unwrap();
//!     if t == 0.0 {
//!         writer.write_package(&Package::EntityAdded).unwrap();
//!     }
//!     writer.write_package(&Package::Speed(speed)).unwrap();
//! }
//! writer.write_package(&Package::EndOfScenario).unwrap();
//! drop(writer);
//!
//! // Replay it and seek around.
//! let timeline = LogReader::from_reader(buf.as_slice(), "in-memory")
//!     .unwrap()
//!     .read_timeline()
//!     .unwrap();
//! let mut replay = Replay::from_timeline(timeline).unwrap();
//! replay.seek(0.1);
//! assert_eq!(replay.speed(EntityId(1)).unwrap(), 12.0);
//! replay.seek(0.0);
//! assert_eq!(replay.speed(EntityId(1)).unwrap(), 10.0);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `tarmac-core` | Ids, package alphabet, timeline, time tolerance |
//! | [`format`] | `tarmac-format` | Binary codec, log reader/writer, version gate |
//! | [`replay`] | `tarmac-replay` | Replay session, state cache, merge, export sampling |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types: ids, the package alphabet, and the timeline (`tarmac-core`).
pub use tarmac_core as types;

/// The on-disk format: codec and log I/O (`tarmac-format`).
pub use tarmac_format as format;

/// Replay session, state cache, merge, and export sampling
/// (`tarmac-replay`).
pub use tarmac_replay as replay;

/// Common imports for typical Tarmac usage.
///
/// ```
/// use tarmac::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use tarmac_core::record::LogHeader;
    pub use tarmac_core::{
        times_equal, BoundingBox, EntityId, Package, Position, RecordKind, Timeline,
        TIME_TOLERANCE,
    };

    // Format
    pub use tarmac_format::{
        write_recording, FormatError, LogReader, LogWriter, FORMAT_VERSION,
    };

    // Replay
    pub use tarmac_replay::{
        discover_recordings, merge, sample_times, ExportMode, Recording, Replay, ReplayError,
        StateCache,
    };
}
