//! Recording playback reader.
//!
//! [`LogReader`] decodes one recording into a [`Timeline`]. The header is
//! read and version-gated on construction, before any of the body is
//! touched; a version mismatch therefore aborts the load with no frames
//! decoded. Generic over `R: Read` so tests can feed `&[u8]` while
//! production code uses a buffered file.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use tarmac_core::record::LogHeader;
use tarmac_core::{Package, Timeline};
use tracing::info;

use crate::codec::{decode_header, decode_package};
use crate::error::FormatError;
use crate::FORMAT_VERSION;

/// Reads a recording from a byte stream.
#[derive(Debug)]
pub struct LogReader<R: Read> {
    reader: R,
    header: LogHeader,
    packages_read: u64,
}

impl LogReader<BufReader<File>> {
    /// Open a recording file, reading and validating its header.
    ///
    /// Fails with [`FormatError::VersionMismatch`] before any body
    /// parsing if the stored format version is unsupported. The file
    /// handle is dropped on every failure path.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FormatError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), &path.display().to_string())
    }
}

impl<R: Read> LogReader<R> {
    /// Wrap an open byte stream, reading and validating its header.
    ///
    /// `origin` names the stream in diagnostics (usually the file path).
    pub fn from_reader(mut reader: R, origin: &str) -> Result<Self, FormatError> {
        let header = decode_header(&mut reader)?;
        if header.version != FORMAT_VERSION {
            return Err(FormatError::VersionMismatch {
                path: origin.to_string(),
                found: header.version,
                supported: FORMAT_VERSION,
            });
        }
        info!(
            recording = origin,
            version = header.version,
            odr = %header.odr_path,
            model = %header.model_path,
            "recording opened"
        );
        Ok(Self {
            reader,
            header,
            packages_read: 0,
        })
    }

    /// The validated recording header.
    pub fn header(&self) -> &LogHeader {
        &self.header
    }

    /// Decode the next package, or `None` once the stream is exhausted.
    pub fn next_package(&mut self) -> Result<Option<Package>, FormatError> {
        let package = decode_package(&mut self.reader)?;
        if package.is_some() {
            self.packages_read += 1;
        }
        Ok(package)
    }

    /// Number of body packages decoded so far.
    pub fn packages_read(&self) -> u64 {
        self.packages_read
    }

    /// Consume the reader, decoding every remaining package into a
    /// [`Timeline`] whose first element is the header record.
    pub fn read_timeline(mut self) -> Result<Timeline, FormatError> {
        let mut timeline = Timeline::new(self.header.clone());
        while let Some(package) = self.next_package()? {
            timeline.push(package);
        }
        Ok(timeline)
    }
}
