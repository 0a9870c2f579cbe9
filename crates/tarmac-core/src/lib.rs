//! Core types for the Tarmac scenario recording and replay engine.
//!
//! Defines the vocabulary shared by the format and replay crates: entity
//! ids, the fixed package alphabet with typed payloads, the [`Timeline`]
//! container with frame and entity-block iteration, and the single
//! timestamp tolerance every component compares times with.
//!
//! This crate is I/O-free; the wire format lives in `tarmac-format` and
//! the seek/cache machinery in `tarmac-replay`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod id;
pub mod record;
pub mod time;
pub mod timeline;

pub use id::EntityId;
pub use record::{BoundingBox, LogHeader, Package, Position, RecordKind};
pub use time::{times_equal, TIME_TOLERANCE};
pub use timeline::{EntityBlock, EntityBlocks, Frame, Timeline};
