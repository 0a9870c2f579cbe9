//! Binary recording format for Tarmac scenario logs.
//!
//! A recording is a bare header followed by framed records until
//! end-of-stream:
//!
//! ```text
//! [version i32] [odr_path u32+bytes] [model_path u32+bytes]
//! [Record 1] [Record 2] ... [Record N]
//! ```
//!
//! Each record is `{ id: u32, content_size: u32, payload }`, little-endian
//! throughout. The `content_size` prefix keeps the stream aligned across
//! record kinds a reader does not know, so the alphabet can grow without
//! breaking old readers.
//!
//! # Components
//!
//! - [`codec`] — field-by-field encode/decode of headers and packages
//! - [`LogReader`] — header validation (version gate) and timeline loading
//! - [`LogWriter`] — live recording and merged-timeline serialization
//!
//! Truncated tails are not errors: a recording cut short mid-record loads
//! up to its last complete record. Unknown record ids are logged and
//! skipped. Only structural failures — unreadable file, unsupported
//! version, corrupt framing — abort a load.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use error::FormatError;
pub use reader::LogReader;
pub use writer::{write_recording, LogWriter};

/// The single supported recording format version.
///
/// A header carrying any other value fails the load with
/// [`FormatError::VersionMismatch`] before the body is interpreted.
pub const FORMAT_VERSION: i32 = 2;
