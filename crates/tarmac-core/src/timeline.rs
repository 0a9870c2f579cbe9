//! The decoded package stream: frames and entity blocks.
//!
//! A [`Timeline`] holds every package of one recording in recording order,
//! which for a single recording is also time order. It is append-only while
//! being loaded and read-only afterwards; all downstream state (the replay
//! cache in particular) refers to packages by index into the timeline, so
//! package storage never needs to be stable in memory, only in position.
//!
//! A *frame* is the run of packages from one [`Package::Time`] marker up to
//! the next. Within a frame, an *entity block* is an [`Package::EntityId`]
//! marker followed by the packages recorded for that entity in that frame:
//! optionally an added/removed marker, then any subset of attribute kinds.
//! An attribute kind absent from a block means "unchanged", not "default".

use smallvec::SmallVec;

use crate::id::EntityId;
use crate::record::{LogHeader, Package, RecordKind};
use crate::time::TIME_TOLERANCE;

/// One frame of the timeline: the packages recorded for a single
/// simulation timestamp.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Position of this frame in the frame sequence.
    pub index: usize,
    /// Simulation timestamp of the frame.
    pub time: f64,
    /// Package index of the frame's time marker.
    pub start: usize,
    /// Package index one past the frame's last package.
    pub end: usize,
}

#[derive(Clone, Copy, Debug)]
struct FrameMark {
    start: usize,
    time: f64,
}

/// The decoded package stream of one recording.
///
/// Always begins with exactly one [`Package::Header`]; time markers are
/// non-decreasing; an [`Package::EndOfScenario`] marker, when present,
/// terminates the stream.
#[derive(Clone, Debug)]
pub struct Timeline {
    packages: Vec<Package>,
    frames: Vec<FrameMark>,
    min_time_step: Option<f64>,
}

impl Timeline {
    /// Create a timeline containing only the header record.
    pub fn new(header: LogHeader) -> Self {
        Self {
            packages: vec![Package::Header(header)],
            frames: Vec::new(),
            min_time_step: None,
        }
    }

    /// Append a package, tracking frame boundaries.
    ///
    /// A [`Package::Time`] marker starts a new frame; the smallest distinct
    /// inter-frame delta is tracked for resampling exports.
    pub fn push(&mut self, package: Package) {
        if let Package::Time(t) = package {
            if let Some(last) = self.frames.last() {
                let dt = (t - last.time).abs();
                if dt > TIME_TOLERANCE {
                    self.min_time_step =
                        Some(self.min_time_step.map_or(dt, |m| m.min(dt)));
                }
            }
            self.frames.push(FrameMark {
                start: self.packages.len(),
                time: t,
            });
        }
        self.packages.push(package);
    }

    /// The recording header.
    pub fn header(&self) -> &LogHeader {
        match self.packages.first() {
            Some(Package::Header(h)) => h,
            _ => unreachable!("timeline always begins with a header record"),
        }
    }

    /// All packages in recording order. Index 0 is the header.
    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    /// The package at `index`, if any.
    pub fn get(&self, index: usize) -> Option<&Package> {
        self.packages.get(index)
    }

    /// Number of packages, header included.
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the timeline holds nothing beyond the header.
    pub fn is_empty(&self) -> bool {
        self.packages.len() <= 1
    }

    /// Number of frames (time markers).
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The frame at `index` in the frame sequence.
    pub fn frame(&self, index: usize) -> Option<Frame> {
        let mark = self.frames.get(index)?;
        let end = self
            .frames
            .get(index + 1)
            .map_or(self.packages.len(), |next| next.start);
        Some(Frame {
            index,
            time: mark.time,
            start: mark.start,
            end,
        })
    }

    /// Iterate over all frames in order.
    pub fn frames(&self) -> impl Iterator<Item = Frame> + '_ {
        (0..self.frames.len()).filter_map(move |i| self.frame(i))
    }

    /// Timestamp of the first frame.
    pub fn start_time(&self) -> Option<f64> {
        self.frames.first().map(|f| f.time)
    }

    /// Timestamp of the last frame.
    pub fn stop_time(&self) -> Option<f64> {
        self.frames.last().map(|f| f.time)
    }

    /// Smallest distinct delta between consecutive frame timestamps.
    ///
    /// Deltas within [`TIME_TOLERANCE`] are ignored so that repeated
    /// timestamps (as produced by merge alignment) cannot collapse the
    /// step to zero.
    pub fn min_time_step(&self) -> Option<f64> {
        self.min_time_step
    }

    /// Iterate over the entity blocks of `frame`.
    pub fn entity_blocks(&self, frame: Frame) -> EntityBlocks<'_> {
        EntityBlocks {
            packages: &self.packages,
            pos: frame.start,
            end: frame.end,
        }
    }
}

// ── Entity blocks ───────────────────────────────────────────────

/// One entity's packages within a single frame.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityBlock {
    /// The entity the block belongs to.
    pub entity: EntityId,
    /// Package index of the entity-id marker.
    pub marker: usize,
    /// The block carries an entity-added marker.
    pub added: bool,
    /// The block carries an entity-removed marker.
    pub removed: bool,
    /// Package indices of the block's attribute records, in block order.
    pub attrs: SmallVec<[usize; 8]>,
}

/// Iterator over the entity blocks of one frame.
pub struct EntityBlocks<'a> {
    packages: &'a [Package],
    pos: usize,
    end: usize,
}

impl Iterator for EntityBlocks<'_> {
    type Item = EntityBlock;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.end {
            let marker = self.pos;
            self.pos += 1;
            let entity = match self.packages[marker] {
                Package::EntityId(id) => id,
                _ => continue,
            };

            let mut block = EntityBlock {
                entity,
                marker,
                added: false,
                removed: false,
                attrs: SmallVec::new(),
            };

            while self.pos < self.end {
                match self.packages[self.pos].kind() {
                    RecordKind::EntityId | RecordKind::Time | RecordKind::EndOfScenario => break,
                    RecordKind::EntityAdded => block.added = true,
                    RecordKind::EntityRemoved => block.removed = true,
                    kind if kind.is_attribute() => block.attrs.push(self.pos),
                    _ => {}
                }
                self.pos += 1;
            }

            return Some(block);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Position;

    fn header() -> LogHeader {
        LogHeader {
            version: 2,
            odr_path: "road.xodr".into(),
            model_path: "scene.osgb".into(),
        }
    }

    fn two_frame_timeline() -> Timeline {
        let mut tl = Timeline::new(header());
        tl.push(Package::Time(0.0));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Position(Position::default()));
        tl.push(Package::Speed(3.0));
        tl.push(Package::EntityId(EntityId(2)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Name("target".into()));
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(4.0));
        tl.push(Package::EndOfScenario);
        tl
    }

    #[test]
    fn frames_and_bounds() {
        let tl = two_frame_timeline();
        assert_eq!(tl.frame_count(), 2);

        let f0 = tl.frame(0).unwrap();
        assert_eq!(f0.time, 0.0);
        assert_eq!(f0.start, 1);
        assert_eq!(f0.end, 8);

        let f1 = tl.frame(1).unwrap();
        assert_eq!(f1.time, 0.1);
        assert_eq!(f1.end, tl.len());

        assert_eq!(tl.start_time(), Some(0.0));
        assert_eq!(tl.stop_time(), Some(0.1));
        assert!(tl.frame(2).is_none());
    }

    #[test]
    fn entity_blocks_split_on_markers() {
        let tl = two_frame_timeline();
        let f0 = tl.frame(0).unwrap();
        let blocks: Vec<_> = tl.entity_blocks(f0).collect();
        assert_eq!(blocks.len(), 2);

        assert_eq!(blocks[0].entity, EntityId(1));
        assert!(blocks[0].added);
        assert!(!blocks[0].removed);
        assert_eq!(blocks[0].attrs.len(), 2);

        assert_eq!(blocks[1].entity, EntityId(2));
        assert_eq!(blocks[1].attrs.len(), 1);
        assert!(matches!(
            tl.get(blocks[1].attrs[0]),
            Some(Package::Name(n)) if n == "target"
        ));
    }

    #[test]
    fn end_of_scenario_terminates_block() {
        let tl = two_frame_timeline();
        let f1 = tl.frame(1).unwrap();
        let blocks: Vec<_> = tl.entity_blocks(f1).collect();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].attrs.len(), 1);
        assert!(!blocks[0].added);
    }

    #[test]
    fn min_time_step_ignores_duplicates() {
        let mut tl = Timeline::new(header());
        tl.push(Package::Time(0.0));
        tl.push(Package::Time(0.1));
        tl.push(Package::Time(0.1));
        tl.push(Package::Time(0.15));
        let step = tl.min_time_step().unwrap();
        assert!((step - 0.05).abs() < 1e-12);
    }

    #[test]
    fn empty_timeline_has_no_times() {
        let tl = Timeline::new(header());
        assert!(tl.is_empty());
        assert_eq!(tl.start_time(), None);
        assert_eq!(tl.min_time_step(), None);
        assert_eq!(tl.header().version, 2);
    }
}
