//! Recording writer.
//!
//! [`LogWriter`] streams packages to any `Write` sink, writing the bare
//! header immediately on construction. It serves both live recording (one
//! package at a time as the simulation emits them) and re-serialization
//! of a merged [`Timeline`].

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use tarmac_core::record::LogHeader;
use tarmac_core::{Package, Timeline};

use crate::codec::{encode_header, encode_package};
use crate::error::FormatError;

/// Writes a recording to a byte stream.
pub struct LogWriter<W: Write> {
    writer: W,
    packages_written: u64,
}

impl LogWriter<BufWriter<File>> {
    /// Create a recording file and write its header.
    pub fn create(path: impl AsRef<Path>, header: &LogHeader) -> Result<Self, FormatError> {
        let file = File::create(path)?;
        Self::new(BufWriter::new(file), header)
    }
}

impl<W: Write> LogWriter<W> {
    /// Wrap a sink, immediately writing the bare header.
    pub fn new(mut writer: W, header: &LogHeader) -> Result<Self, FormatError> {
        encode_header(&mut writer, header)?;
        Ok(Self {
            writer,
            packages_written: 0,
        })
    }

    /// Append one body package.
    ///
    /// The header is written once at construction; passing a
    /// [`Package::Header`] here is rejected as malformed rather than
    /// silently producing a second header mid-stream.
    pub fn write_package(&mut self, package: &Package) -> Result<(), FormatError> {
        if matches!(package, Package::Header(_)) {
            return Err(FormatError::Malformed {
                detail: "header package in record stream".into(),
            });
        }
        encode_package(&mut self.writer, package)?;
        self.packages_written += 1;
        Ok(())
    }

    /// Append every body package of `timeline` in order.
    ///
    /// The timeline's leading header record is skipped — the sink already
    /// carries the header this writer was constructed with.
    pub fn write_timeline(&mut self, timeline: &Timeline) -> Result<(), FormatError> {
        for package in &timeline.packages()[1..] {
            self.write_package(package)?;
        }
        Ok(())
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<(), FormatError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Number of body packages written so far.
    pub fn packages_written(&self) -> u64 {
        self.packages_written
    }

    /// Consume the writer and return the underlying sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// Serialize a whole timeline to a new recording file.
///
/// Uses the timeline's own header; the file is flushed and closed before
/// returning.
pub fn write_recording(path: impl AsRef<Path>, timeline: &Timeline) -> Result<(), FormatError> {
    let mut writer = LogWriter::create(path, timeline.header())?;
    writer.write_timeline(timeline)?;
    writer.flush()
}
