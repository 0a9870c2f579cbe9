//! Error types for recording I/O.

use std::fmt;
use std::io;

/// Errors that can occur while reading or writing a recording.
///
/// Content-level anomalies (unknown package kinds, a truncated trailing
/// record) are not represented here — they are logged and repaired in
/// place so the rest of the recording stays usable. Only structural
/// failures that abort the whole operation surface as errors.
#[derive(Debug)]
pub enum FormatError {
    /// An I/O error occurred during read or write.
    Io(io::Error),
    /// The recording was produced with an unsupported format version.
    ///
    /// Fatal for the whole load: the body is never interpreted after a
    /// mismatch.
    VersionMismatch {
        /// The recording that failed the gate.
        path: String,
        /// The version stored in its header.
        found: i32,
        /// The version this build supports.
        supported: i32,
    },
    /// A package could not be decoded from otherwise well-formed framing.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::VersionMismatch {
                path,
                found,
                supported,
            } => write!(
                f,
                "version mismatch: {path} is version {found} while supported version \
                 is {supported}, please re-create the recording"
            ),
            Self::Malformed { detail } => write!(f, "malformed package: {detail}"),
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for FormatError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
