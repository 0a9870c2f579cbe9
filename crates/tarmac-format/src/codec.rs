//! Binary encode/decode for the recording format.
//!
//! All integers are little-endian. Strings are length-prefixed with a
//! `u32` byte count, not NUL-terminated. The format is intentionally
//! simple — no compression, no alignment padding, no self-describing
//! schema. Every payload is decoded field-by-field; nothing depends on
//! host struct layout.
//!
//! The file header is serialized bare at the start of the stream (no
//! id/size framing); every subsequent record is framed as
//! `{ id: u32, content_size: u32, payload }`. The `content_size` prefix
//! is what keeps the stream aligned across unknown record kinds: a reader
//! that does not recognize an id skips exactly `content_size` bytes and
//! keeps going.

use std::io::{self, Read, Write};

use tarmac_core::record::{BoundingBox, LogHeader, Package, Position, RecordKind};
use tarmac_core::EntityId;
use tracing::warn;

use crate::error::FormatError;

// ── Primitive writers ───────────────────────────────────────────

/// Write a little-endian u32.
pub fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), FormatError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian i32.
pub fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), FormatError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a little-endian f64.
pub fn write_f64_le(w: &mut dyn Write, v: f64) -> Result<(), FormatError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

/// Write a length-prefixed UTF-8 string (u32 byte count + bytes).
pub fn write_length_prefixed_str(w: &mut dyn Write, s: &str) -> Result<(), FormatError> {
    write_u32_le(w, s.len() as u32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

/// Read a little-endian u32.
pub fn read_u32_le(r: &mut dyn Read) -> Result<u32, FormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

/// Read a little-endian i32.
pub fn read_i32_le(r: &mut dyn Read) -> Result<i32, FormatError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a little-endian f64.
pub fn read_f64_le(r: &mut dyn Read) -> Result<f64, FormatError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(f64::from_le_bytes(buf))
}

/// Read a length-prefixed UTF-8 string.
pub fn read_length_prefixed_str(r: &mut dyn Read) -> Result<String, FormatError> {
    let len = read_u32_le(r)? as usize;
    let mut buf = vec![0u8; len];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| FormatError::Malformed {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

/// Fill `buf` as far as the stream allows, returning the byte count.
///
/// Unlike `read_exact`, end-of-stream is not an error here — the caller
/// decides whether a short read means clean EOF or a truncated tail.
fn fill(r: &mut dyn Read, buf: &mut [u8]) -> Result<usize, FormatError> {
    let mut filled = 0;
    while filled < buf.len() {
        match r.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(FormatError::Io(e)),
        }
    }
    Ok(filled)
}

// ── Header encode/decode ────────────────────────────────────────

/// Encode the bare file header: version, road network path, model path.
pub fn encode_header(w: &mut dyn Write, header: &LogHeader) -> Result<(), FormatError> {
    write_i32_le(w, header.version)?;
    write_length_prefixed_str(w, &header.odr_path)?;
    write_length_prefixed_str(w, &header.model_path)?;
    Ok(())
}

/// Decode the bare file header.
///
/// Does not apply the version gate — the caller checks the returned
/// version against [`FORMAT_VERSION`](crate::FORMAT_VERSION) before any
/// of the body is parsed.
pub fn decode_header(r: &mut dyn Read) -> Result<LogHeader, FormatError> {
    Ok(LogHeader {
        version: read_i32_le(r)?,
        odr_path: read_length_prefixed_str(r)?,
        model_path: read_length_prefixed_str(r)?,
    })
}

// ── Package encode/decode ───────────────────────────────────────

/// Exact payload size of fixed-size kinds, `None` for variable-size ones.
fn expected_size(kind: RecordKind) -> Option<usize> {
    Some(match kind {
        RecordKind::Time
        | RecordKind::Speed
        | RecordKind::WheelAngle
        | RecordKind::WheelRotation
        | RecordKind::PosOffset
        | RecordKind::PosT
        | RecordKind::PosS => 8,
        RecordKind::EntityId
        | RecordKind::ModelId
        | RecordKind::ObjType
        | RecordKind::ObjCategory
        | RecordKind::CtrlType
        | RecordKind::ScaleMode
        | RecordKind::VisibilityMask
        | RecordKind::RoadId
        | RecordKind::LaneId => 4,
        RecordKind::EntityAdded | RecordKind::EntityRemoved | RecordKind::EndOfScenario => 0,
        RecordKind::Position | RecordKind::BoundingBox => 48,
        RecordKind::Name | RecordKind::Header => return None,
    })
}

/// Encode one package.
///
/// A [`Package::Header`] is written in the bare header form and is only
/// valid as the very first element of a stream; all other packages get
/// the `{ id, content_size, payload }` framing.
pub fn encode_package(w: &mut dyn Write, package: &Package) -> Result<(), FormatError> {
    let mut payload: Vec<u8> = Vec::new();
    match package {
        Package::Header(h) => return encode_header(w, h),
        Package::Time(t) => write_f64_le(&mut payload, *t)?,
        Package::EntityId(id) => write_i32_le(&mut payload, id.0)?,
        Package::EntityAdded | Package::EntityRemoved | Package::EndOfScenario => {}
        Package::ModelId(v)
        | Package::ObjType(v)
        | Package::ObjCategory(v)
        | Package::CtrlType(v)
        | Package::ScaleMode(v)
        | Package::VisibilityMask(v)
        | Package::RoadId(v)
        | Package::LaneId(v) => write_i32_le(&mut payload, *v)?,
        Package::Speed(v)
        | Package::WheelAngle(v)
        | Package::WheelRotation(v)
        | Package::PosOffset(v)
        | Package::PosT(v)
        | Package::PosS(v) => write_f64_le(&mut payload, *v)?,
        Package::Position(pos) => {
            write_f64_le(&mut payload, pos.x)?;
            write_f64_le(&mut payload, pos.y)?;
            write_f64_le(&mut payload, pos.z)?;
            write_f64_le(&mut payload, pos.h)?;
            write_f64_le(&mut payload, pos.r)?;
            write_f64_le(&mut payload, pos.p)?;
        }
        Package::BoundingBox(bb) => {
            write_f64_le(&mut payload, bb.x)?;
            write_f64_le(&mut payload, bb.y)?;
            write_f64_le(&mut payload, bb.z)?;
            write_f64_le(&mut payload, bb.width)?;
            write_f64_le(&mut payload, bb.length)?;
            write_f64_le(&mut payload, bb.height)?;
        }
        Package::Name(name) => payload.extend_from_slice(name.as_bytes()),
    }

    write_u32_le(w, package.kind().wire_id())?;
    write_u32_le(w, payload.len() as u32)?;
    w.write_all(&payload)?;
    Ok(())
}

/// Decode the next package from the stream.
///
/// Returns `Ok(None)` when the stream is exhausted. A record truncated by
/// end-of-stream — in its framing or its payload — is discarded with a
/// warning and also reported as a clean end, so a recording cut short by
/// a crashed recorder still loads up to its last complete record. Unknown
/// record ids are skipped over their `content_size` and logged; decoding
/// continues with the next record.
pub fn decode_package(r: &mut dyn Read) -> Result<Option<Package>, FormatError> {
    loop {
        let mut framing = [0u8; 8];
        let got = fill(r, &mut framing)?;
        if got == 0 {
            return Ok(None);
        }
        if got < framing.len() {
            warn!(bytes = got, "truncated record framing at end of stream, discarding");
            return Ok(None);
        }

        let id = u32::from_le_bytes([framing[0], framing[1], framing[2], framing[3]]);
        let size = u32::from_le_bytes([framing[4], framing[5], framing[6], framing[7]]) as usize;

        let mut payload = vec![0u8; size];
        let got = fill(r, &mut payload)?;
        if got < size {
            warn!(
                id,
                expected = size,
                bytes = got,
                "truncated record payload at end of stream, discarding"
            );
            return Ok(None);
        }

        let kind = match RecordKind::from_wire(id) {
            Some(RecordKind::Header) => {
                warn!(size, "header record inside package stream, skipping");
                continue;
            }
            Some(kind) => kind,
            None => {
                warn!(id, size, "unknown package id, skipping");
                continue;
            }
        };

        return decode_payload(kind, &payload).map(Some);
    }
}

/// Decode a known kind's payload from its raw bytes.
fn decode_payload(kind: RecordKind, bytes: &[u8]) -> Result<Package, FormatError> {
    if let Some(expected) = expected_size(kind) {
        if bytes.len() != expected {
            return Err(FormatError::Malformed {
                detail: format!(
                    "{kind} record has content size {}, expected {expected}",
                    bytes.len()
                ),
            });
        }
    }

    let take_f64 = |off: usize| {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes[off..off + 8]);
        f64::from_le_bytes(raw)
    };
    let take_i32 = || {
        let mut raw = [0u8; 4];
        raw.copy_from_slice(&bytes[0..4]);
        i32::from_le_bytes(raw)
    };

    Ok(match kind {
        RecordKind::Time => Package::Time(take_f64(0)),
        RecordKind::EntityId => Package::EntityId(EntityId(take_i32())),
        RecordKind::EntityAdded => Package::EntityAdded,
        RecordKind::EntityRemoved => Package::EntityRemoved,
        RecordKind::EndOfScenario => Package::EndOfScenario,
        RecordKind::ModelId => Package::ModelId(take_i32()),
        RecordKind::ObjType => Package::ObjType(take_i32()),
        RecordKind::ObjCategory => Package::ObjCategory(take_i32()),
        RecordKind::CtrlType => Package::CtrlType(take_i32()),
        RecordKind::ScaleMode => Package::ScaleMode(take_i32()),
        RecordKind::VisibilityMask => Package::VisibilityMask(take_i32()),
        RecordKind::RoadId => Package::RoadId(take_i32()),
        RecordKind::LaneId => Package::LaneId(take_i32()),
        RecordKind::Speed => Package::Speed(take_f64(0)),
        RecordKind::WheelAngle => Package::WheelAngle(take_f64(0)),
        RecordKind::WheelRotation => Package::WheelRotation(take_f64(0)),
        RecordKind::PosOffset => Package::PosOffset(take_f64(0)),
        RecordKind::PosT => Package::PosT(take_f64(0)),
        RecordKind::PosS => Package::PosS(take_f64(0)),
        RecordKind::Position => Package::Position(Position {
            x: take_f64(0),
            y: take_f64(8),
            z: take_f64(16),
            h: take_f64(24),
            r: take_f64(32),
            p: take_f64(40),
        }),
        RecordKind::BoundingBox => Package::BoundingBox(BoundingBox {
            x: take_f64(0),
            y: take_f64(8),
            z: take_f64(16),
            width: take_f64(24),
            length: take_f64(32),
            height: take_f64(40),
        }),
        RecordKind::Name => Package::Name(
            String::from_utf8(bytes.to_vec()).map_err(|e| FormatError::Malformed {
                detail: format!("invalid UTF-8 in NAME record: {e}"),
            })?,
        ),
        RecordKind::Header => unreachable!("header records are filtered by decode_package"),
    })
}
