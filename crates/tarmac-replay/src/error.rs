//! Error types for the replay session and merger.

use std::fmt;
use std::io;

use tarmac_core::EntityId;
use tarmac_format::FormatError;

/// Errors that can occur constructing, seeking, or merging replays.
#[derive(Debug)]
pub enum ReplayError {
    /// The underlying recording could not be loaded or written.
    Format(FormatError),
    /// An I/O error outside the recording format itself (directory scan).
    Io(io::Error),
    /// The recording holds no frames, so there is nothing to replay.
    EmptyRecording,
    /// An accessor was called with an entity id the recording never
    /// mentions up to the current time.
    ///
    /// Distinct from a known entity with an unset attribute, which
    /// yields that attribute's documented default instead.
    UnknownEntity {
        /// The id that failed the lookup.
        id: EntityId,
    },
    /// Merge requires at least two recordings; use the plain replay path
    /// for a single one.
    TooFewRecordings {
        /// How many recordings were supplied.
        found: usize,
    },
    /// A directory scan matched no recordings.
    NoRecordings {
        /// The directory that was scanned.
        dir: String,
        /// The filename filter that was applied.
        filter: String,
    },
    /// A resampling step that cannot advance time.
    InvalidTimeStep {
        /// The rejected step, in seconds.
        delta: f64,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Format(e) => write!(f, "{e}"),
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::EmptyRecording => write!(f, "recording contains no frames"),
            Self::UnknownEntity { id } => write!(f, "unknown entity id {id}"),
            Self::TooFewRecordings { found } => write!(
                f,
                "merge needs at least two recordings, got {found}; \
                 use the single-recording replay path instead"
            ),
            Self::NoRecordings { dir, filter } => {
                write!(f, "no recordings matching '{filter}' found in {dir}")
            }
            Self::InvalidTimeStep { delta } => {
                write!(f, "time step {delta} cannot advance the sample clock")
            }
        }
    }
}

impl std::error::Error for ReplayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Format(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FormatError> for ReplayError {
    fn from(e: FormatError) -> Self {
        Self::Format(e)
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
