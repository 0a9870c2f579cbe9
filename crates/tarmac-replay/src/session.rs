//! The replay session: cursor, seek engine, and read accessors.
//!
//! [`Replay`] owns one [`Timeline`] and the [`StateCache`] materialized
//! against it. `seek` moves the cursor to an arbitrary timestamp by
//! applying frame deltas going forward or reverting them going backward;
//! every read accessor then answers from the cache in O(lookup).
//!
//! The session is single-threaded and not re-entrant: a seek runs to
//! completion before the next call, and the timeline is immutable for the
//! session's lifetime.

use std::path::Path;

use tarmac_core::record::LogHeader;
use tarmac_core::timeline::{EntityBlock, Frame};
use tarmac_core::{
    times_equal, BoundingBox, EntityId, Package, Position, RecordKind, Timeline, TIME_TOLERANCE,
};
use tarmac_format::{write_recording, LogReader};
use tracing::debug;

use crate::discover::discover_recordings;
use crate::error::ReplayError;
use crate::merge::{merge, Recording};
use crate::state::{CachedEntity, StateCache};

/// A replay session over one recording.
pub struct Replay {
    timeline: Timeline,
    cache: StateCache,
    /// Frame index of the last-processed time marker.
    cursor: usize,
    start_frame: usize,
    stop_frame: usize,
    start_time: f64,
    stop_time: f64,
}

impl Replay {
    /// Open a recording file and position the session at its start time.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let timeline = LogReader::open(path)?.read_timeline()?;
        Self::from_timeline(timeline)
    }

    /// Discover, merge, and replay every recording under `dir` whose
    /// filename contains `filter`.
    ///
    /// Requires at least two matching recordings; the merged timeline is
    /// optionally serialized to `merge_output` as a single recording
    /// before the session starts.
    pub fn from_directory(
        dir: impl AsRef<Path>,
        filter: &str,
        merge_output: Option<&Path>,
    ) -> Result<Self, ReplayError> {
        let paths = discover_recordings(dir, filter)?;
        let mut recordings = Vec::with_capacity(paths.len());
        for path in paths {
            recordings.push(Recording::load(path)?);
        }
        let merged = merge(&recordings)?;
        if let Some(out) = merge_output {
            write_recording(out, &merged)?;
        }
        Self::from_timeline(merged)
    }

    /// Build a session over an already-loaded timeline.
    ///
    /// The cache is populated from the first frame, so entities present
    /// at the start time are queryable immediately.
    pub fn from_timeline(timeline: Timeline) -> Result<Self, ReplayError> {
        let (Some(start_time), Some(stop_time)) = (timeline.start_time(), timeline.stop_time())
        else {
            return Err(ReplayError::EmptyRecording);
        };
        let stop_frame = timeline.frame_count() - 1;

        let mut replay = Self {
            timeline,
            cache: StateCache::default(),
            cursor: 0,
            start_frame: 0,
            stop_frame,
            start_time,
            stop_time,
        };
        replay.cache.set_sim_time(start_time);
        if let Some(first) = replay.timeline.frame(0) {
            replay.apply_frame_forward(first, start_time);
        }
        Ok(replay)
    }

    // ── Cursor movement ─────────────────────────────────────────

    /// Move the session to `target` seconds of simulation time.
    ///
    /// Targets outside the replay window clamp to its bounds. A target
    /// epsilon-equal to the current time is a no-op. Within one frame,
    /// markers are applied after the attribute merge and a block carrying
    /// both markers resolves to removed; backward seeks apply the exact
    /// inverse.
    pub fn seek(&mut self, target: f64) {
        if target.is_nan() {
            return;
        }
        let target = target.clamp(self.start_time, self.stop_time);
        if times_equal(target, self.cache.sim_time()) {
            return;
        }

        if target > self.cache.sim_time() {
            self.walk_forward(target);
        } else {
            self.walk_backward(target);
        }
        self.cache.set_sim_time(target);
        debug!(
            sim_time = target,
            cursor = self.cursor,
            "seek complete"
        );
    }

    /// Move relative to the current simulation time.
    pub fn seek_by_delta(&mut self, dt: f64) {
        self.seek(self.cache.sim_time() + dt);
    }

    /// Move to the start of the replay window.
    pub fn move_to_start(&mut self) {
        self.seek(self.start_time);
    }

    /// Move to the end of the replay window.
    pub fn move_to_end(&mut self) {
        self.seek(self.stop_time);
    }

    /// Move to the frame after the current cursor position.
    pub fn move_to_next_frame(&mut self) {
        let next = (self.cursor + 1).min(self.stop_frame);
        if let Some(frame) = self.timeline.frame(next) {
            self.seek(frame.time);
        }
    }

    /// Move to the frame before the current position.
    ///
    /// When the current time lies between two frames, this first snaps
    /// back to the frame the cursor already rests on.
    pub fn move_to_previous_frame(&mut self) {
        let Some(current) = self.timeline.frame(self.cursor) else {
            return;
        };
        if self.cache.sim_time() > current.time + TIME_TOLERANCE {
            self.seek(current.time);
        } else if self.cursor > self.start_frame {
            if let Some(prev) = self.timeline.frame(self.cursor - 1) {
                self.seek(prev.time);
            }
        } else {
            self.seek(self.start_time);
        }
    }

    fn walk_forward(&mut self, target: f64) {
        while self.cursor < self.stop_frame {
            let Some(next) = self.timeline.frame(self.cursor + 1) else {
                break;
            };
            if next.time > target + TIME_TOLERANCE {
                // consuming this frame would overshoot the target
                break;
            }
            self.cursor += 1;
            self.apply_frame_forward(next, target);
        }
    }

    fn walk_backward(&mut self, target: f64) {
        while self.cursor > self.start_frame {
            let Some(current) = self.timeline.frame(self.cursor) else {
                break;
            };
            if current.time <= target + TIME_TOLERANCE {
                break;
            }
            self.revert_frame(current);
            self.cursor -= 1;
        }
    }

    /// Apply one frame's deltas while moving forward.
    fn apply_frame_forward(&mut self, frame: Frame, target: f64) {
        let blocks: Vec<EntityBlock> = self.timeline.entity_blocks(frame).collect();
        for block in blocks {
            if self.cache.contains(block.entity) {
                self.cache.merge_block(&self.timeline, &block, frame.time);
            } else {
                self.cache.materialize(&self.timeline, &block, target);
            }
            if block.removed {
                self.cache.set_active(block.entity, false);
            } else if block.added {
                self.cache.set_active(block.entity, true);
            }
        }
    }

    /// Revert one frame's deltas while moving backward: the cache is
    /// rebuilt to the state just prior to `frame`.
    ///
    /// Markers invert — a removal means the entity existed before this
    /// frame, an addition means it did not. Every attribute kind the
    /// frame recorded is rebound to its previous occurrence, or cleared
    /// back to the unset state when this frame held its first record.
    fn revert_frame(&mut self, frame: Frame) {
        let blocks: Vec<EntityBlock> = self.timeline.entity_blocks(frame).collect();
        for block in blocks {
            if block.removed {
                if !self.cache.contains(block.entity) {
                    self.cache.materialize(&self.timeline, &block, frame.time);
                }
                self.cache.set_active(block.entity, true);
            }
            if block.added {
                self.cache.set_active(block.entity, false);
            }

            for &index in &block.attrs {
                let Some(kind) = self.timeline.get(index).map(Package::kind) else {
                    continue;
                };
                match self.prior_attr(block.entity, kind, frame.index) {
                    Some((prev_index, prev_time)) => {
                        self.cache.rebind(block.entity, kind, prev_index, prev_time);
                    }
                    None => self.cache.clear_attr(block.entity, kind),
                }
            }
        }
    }

    /// Latest package of (`entity`, `kind`) in any frame before
    /// `before_frame`.
    fn prior_attr(
        &self,
        entity: EntityId,
        kind: RecordKind,
        before_frame: usize,
    ) -> Option<(usize, f64)> {
        for fi in (0..before_frame).rev() {
            let frame = self.timeline.frame(fi)?;
            let mut found = None;
            for block in self.timeline.entity_blocks(frame) {
                if block.entity != entity {
                    continue;
                }
                for &idx in block.attrs.iter().rev() {
                    if self.timeline.get(idx).map(Package::kind) == Some(kind) {
                        found = Some((idx, frame.time));
                        break;
                    }
                }
            }
            if found.is_some() {
                return found;
            }
        }
        None
    }

    // ── Window and metadata ─────────────────────────────────────

    /// Current simulation time of the cache.
    pub fn sim_time(&self) -> f64 {
        self.cache.sim_time()
    }

    /// Start of the replay window.
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// End of the replay window.
    pub fn stop_time(&self) -> f64 {
        self.stop_time
    }

    /// Narrow the window's start. Clamped to the recorded range; the
    /// session seeks forward if it currently sits before the new start.
    pub fn set_start_time(&mut self, t: f64) {
        let lo = self.timeline.start_time().unwrap_or(self.start_time);
        self.start_time = t.clamp(lo, self.stop_time);
        self.start_frame = self.frame_at_or_after(self.start_time);
        if self.cache.sim_time() < self.start_time {
            self.seek(self.start_time);
        }
    }

    /// Narrow the window's end. Clamped to the recorded range; the
    /// session seeks backward if it currently sits past the new end.
    pub fn set_stop_time(&mut self, t: f64) {
        let hi = self.timeline.stop_time().unwrap_or(self.stop_time);
        self.stop_time = t.clamp(self.start_time, hi);
        self.stop_frame = self.frame_at_or_before(self.stop_time);
        if self.cache.sim_time() > self.stop_time {
            self.seek(self.stop_time);
        }
    }

    fn frame_at_or_after(&self, t: f64) -> usize {
        self.timeline
            .frames()
            .find(|f| f.time >= t - TIME_TOLERANCE)
            .map_or(self.stop_frame, |f| f.index)
    }

    fn frame_at_or_before(&self, t: f64) -> usize {
        let mut result = self.start_frame;
        for frame in self.timeline.frames() {
            if frame.time <= t + TIME_TOLERANCE {
                result = frame.index;
            } else {
                break;
            }
        }
        result
    }

    /// The recording header.
    pub fn header(&self) -> &LogHeader {
        self.timeline.header()
    }

    /// The timeline this session replays.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Smallest distinct delta between consecutive frames.
    pub fn min_time_step(&self) -> Option<f64> {
        self.timeline.min_time_step()
    }

    // ── Entity enumeration ──────────────────────────────────────

    /// Ids of every entity active at the current simulation time.
    pub fn active_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.cache
            .entities()
            .filter(|e| e.is_active())
            .map(CachedEntity::id)
    }

    /// Ids of every entity the session has materialized so far,
    /// inactive ones included.
    pub fn cached_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.cache.entities().map(CachedEntity::id)
    }

    /// Every entity in the recording with the time of its first frame.
    ///
    /// Scans the whole timeline, independent of the current seek
    /// position.
    pub fn recorded_entities(&self) -> Vec<(EntityId, f64)> {
        let mut seen: Vec<(EntityId, f64)> = Vec::new();
        for frame in self.timeline.frames() {
            for block in self.timeline.entity_blocks(frame) {
                if !seen.iter().any(|(id, _)| *id == block.entity) {
                    seen.push((block.entity, frame.time));
                }
            }
        }
        seen
    }

    // ── Read accessors ──────────────────────────────────────────
    //
    // Unknown entity ids are caller errors; a known entity whose
    // attribute was never recorded up to the current time reports the
    // attribute's documented default instead.

    fn entity(&self, id: EntityId) -> Result<&CachedEntity, ReplayError> {
        self.cache
            .entity(id)
            .ok_or(ReplayError::UnknownEntity { id })
    }

    fn attr_package(
        &self,
        id: EntityId,
        kind: RecordKind,
    ) -> Result<Option<&Package>, ReplayError> {
        Ok(self
            .entity(id)?
            .attr(kind)
            .and_then(|slot| self.timeline.get(slot.index)))
    }

    fn f64_attr(&self, id: EntityId, kind: RecordKind, default: f64) -> Result<f64, ReplayError> {
        Ok(match self.attr_package(id, kind)? {
            Some(
                Package::Speed(v)
                | Package::WheelAngle(v)
                | Package::WheelRotation(v)
                | Package::PosOffset(v)
                | Package::PosT(v)
                | Package::PosS(v),
            ) => *v,
            _ => default,
        })
    }

    fn i32_attr(&self, id: EntityId, kind: RecordKind, default: i32) -> Result<i32, ReplayError> {
        Ok(match self.attr_package(id, kind)? {
            Some(
                Package::ModelId(v)
                | Package::ObjType(v)
                | Package::ObjCategory(v)
                | Package::CtrlType(v)
                | Package::ScaleMode(v)
                | Package::VisibilityMask(v)
                | Package::RoadId(v)
                | Package::LaneId(v),
            ) => *v,
            _ => default,
        })
    }

    /// Whether the entity is part of the scenario at the current time.
    pub fn is_active(&self, id: EntityId) -> Result<bool, ReplayError> {
        Ok(self.entity(id)?.is_active())
    }

    /// World pose; a zeroed pose if never recorded.
    pub fn position(&self, id: EntityId) -> Result<Position, ReplayError> {
        Ok(match self.attr_package(id, RecordKind::Position)? {
            Some(Package::Position(p)) => *p,
            _ => Position::default(),
        })
    }

    /// Bounding box; zeroed if never recorded.
    pub fn bounding_box(&self, id: EntityId) -> Result<BoundingBox, ReplayError> {
        Ok(match self.attr_package(id, RecordKind::BoundingBox)? {
            Some(Package::BoundingBox(bb)) => *bb,
            _ => BoundingBox::default(),
        })
    }

    /// Entity name; empty if never recorded.
    pub fn name(&self, id: EntityId) -> Result<String, ReplayError> {
        Ok(match self.attr_package(id, RecordKind::Name)? {
            Some(Package::Name(name)) => name.clone(),
            _ => String::new(),
        })
    }

    /// Longitudinal speed, m/s; 0.0 if never recorded.
    pub fn speed(&self, id: EntityId) -> Result<f64, ReplayError> {
        self.f64_attr(id, RecordKind::Speed, 0.0)
    }

    /// Steering wheel angle, rad; 0.0 if never recorded.
    pub fn wheel_angle(&self, id: EntityId) -> Result<f64, ReplayError> {
        self.f64_attr(id, RecordKind::WheelAngle, 0.0)
    }

    /// Wheel rotation, rad; 0.0 if never recorded.
    pub fn wheel_rotation(&self, id: EntityId) -> Result<f64, ReplayError> {
        self.f64_attr(id, RecordKind::WheelRotation, 0.0)
    }

    /// Lateral offset from lane center; 0.0 if never recorded.
    pub fn lane_offset(&self, id: EntityId) -> Result<f64, ReplayError> {
        self.f64_attr(id, RecordKind::PosOffset, 0.0)
    }

    /// Road-relative t coordinate; 0.0 if never recorded.
    pub fn pos_t(&self, id: EntityId) -> Result<f64, ReplayError> {
        self.f64_attr(id, RecordKind::PosT, 0.0)
    }

    /// Road-relative s coordinate; 0.0 if never recorded.
    pub fn pos_s(&self, id: EntityId) -> Result<f64, ReplayError> {
        self.f64_attr(id, RecordKind::PosS, 0.0)
    }

    /// Road id of the road-relative position; -1 if never recorded.
    pub fn road_id(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::RoadId, -1)
    }

    /// Lane id of the road-relative position; -1 if never recorded.
    pub fn lane_id(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::LaneId, -1)
    }

    /// 3D model reference; -1 if never recorded.
    pub fn model_id(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::ModelId, -1)
    }

    /// Object type classification; -1 if never recorded.
    pub fn object_type(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::ObjType, -1)
    }

    /// Object category classification; -1 if never recorded.
    pub fn object_category(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::ObjCategory, -1)
    }

    /// Controller type; -1 if never recorded.
    pub fn controller_type(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::CtrlType, -1)
    }

    /// Visibility bitmask; -1 if never recorded.
    pub fn visibility_mask(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::VisibilityMask, -1)
    }

    /// Model scale mode; -1 if never recorded.
    pub fn scale_mode(&self, id: EntityId) -> Result<i32, ReplayError> {
        self.i32_attr(id, RecordKind::ScaleMode, -1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> LogHeader {
        LogHeader {
            version: 2,
            odr_path: "road.xodr".into(),
            model_path: "scene.osgb".into(),
        }
    }

    /// The worked example: two frames, one entity, x moves 0.0 → 1.0.
    fn two_frame_timeline() -> Timeline {
        let mut tl = Timeline::new(header());
        tl.push(Package::Time(0.0));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Position(Position {
            x: 0.0,
            ..Position::default()
        }));
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Position(Position {
            x: 1.0,
            ..Position::default()
        }));
        tl.push(Package::EndOfScenario);
        tl
    }

    #[test]
    fn initial_state_is_first_frame() {
        let replay = Replay::from_timeline(two_frame_timeline()).unwrap();
        assert_eq!(replay.sim_time(), 0.0);
        assert!(replay.is_active(EntityId(1)).unwrap());
        assert_eq!(replay.position(EntityId(1)).unwrap().x, 0.0);
    }

    #[test]
    fn worked_example_forward_then_back() {
        let mut replay = Replay::from_timeline(two_frame_timeline()).unwrap();

        replay.seek(0.1);
        assert_eq!(replay.position(EntityId(1)).unwrap().x, 1.0);
        assert!(replay.is_active(EntityId(1)).unwrap());

        replay.seek(0.0);
        assert_eq!(replay.position(EntityId(1)).unwrap().x, 0.0);
        assert!(replay.is_active(EntityId(1)).unwrap());
    }

    #[test]
    fn seek_is_idempotent() {
        let mut replay = Replay::from_timeline(two_frame_timeline()).unwrap();
        replay.seek(0.1);
        let x1 = replay.position(EntityId(1)).unwrap().x;
        replay.seek(0.1);
        assert_eq!(replay.position(EntityId(1)).unwrap().x, x1);
        assert_eq!(replay.sim_time(), 0.1);
    }

    #[test]
    fn seek_clamps_to_window() {
        let mut replay = Replay::from_timeline(two_frame_timeline()).unwrap();
        replay.seek(5.0);
        assert_eq!(replay.sim_time(), 0.1);
        replay.seek(-5.0);
        assert_eq!(replay.sim_time(), 0.0);
    }

    #[test]
    fn mid_interval_target_uses_preceding_frame() {
        let mut replay = Replay::from_timeline(two_frame_timeline()).unwrap();
        replay.seek(0.05);
        assert_eq!(replay.sim_time(), 0.05);
        // The 0.1 frame must not have been applied.
        assert_eq!(replay.position(EntityId(1)).unwrap().x, 0.0);
    }

    #[test]
    fn unknown_entity_is_an_error_not_a_default() {
        let replay = Replay::from_timeline(two_frame_timeline()).unwrap();
        assert!(matches!(
            replay.speed(EntityId(42)),
            Err(ReplayError::UnknownEntity { id: EntityId(42) })
        ));
    }

    #[test]
    fn unset_attribute_reports_default() {
        let replay = Replay::from_timeline(two_frame_timeline()).unwrap();
        assert_eq!(replay.speed(EntityId(1)).unwrap(), 0.0);
        assert_eq!(replay.road_id(EntityId(1)).unwrap(), -1);
        assert_eq!(replay.name(EntityId(1)).unwrap(), "");
    }

    /// Wheel angle recorded only at the first frame persists to later ones.
    #[test]
    fn partial_update_persists() {
        let mut tl = Timeline::new(header());
        tl.push(Package::Time(0.0));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityAdded);
        tl.push(Package::WheelAngle(0.25));
        tl.push(Package::Speed(1.0));
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(2.0));
        tl.push(Package::Time(0.2));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(3.0));
        tl.push(Package::EndOfScenario);

        let mut replay = Replay::from_timeline(tl).unwrap();
        replay.seek(0.2);
        assert_eq!(replay.wheel_angle(EntityId(1)).unwrap(), 0.25);
        assert_eq!(replay.speed(EntityId(1)).unwrap(), 3.0);
    }

    fn add_remove_timeline() -> Timeline {
        let mut tl = Timeline::new(header());
        tl.push(Package::Time(0.0));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Speed(10.0));
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(11.0));
        tl.push(Package::Time(0.2));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityRemoved);
        tl.push(Package::Time(0.3));
        tl.push(Package::EndOfScenario);
        tl
    }

    #[test]
    fn removed_entity_goes_inactive_but_stays_queryable() {
        let mut replay = Replay::from_timeline(add_remove_timeline()).unwrap();
        replay.seek(0.3);
        assert!(!replay.is_active(EntityId(1)).unwrap());
        // Last known values survive removal.
        assert_eq!(replay.speed(EntityId(1)).unwrap(), 11.0);
    }

    #[test]
    fn backward_over_removal_reactivates() {
        let mut replay = Replay::from_timeline(add_remove_timeline()).unwrap();
        replay.seek(0.3);
        assert!(!replay.is_active(EntityId(1)).unwrap());
        replay.seek(0.1);
        assert!(replay.is_active(EntityId(1)).unwrap());
        assert_eq!(replay.speed(EntityId(1)).unwrap(), 11.0);
    }

    #[test]
    fn backward_over_addition_deactivates() {
        let mut tl = Timeline::new(header());
        tl.push(Package::Time(0.0));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Speed(1.0));
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(2)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Speed(5.0));
        tl.push(Package::Time(0.2));
        tl.push(Package::EndOfScenario);

        let mut replay = Replay::from_timeline(tl).unwrap();
        replay.seek(0.2);
        assert!(replay.is_active(EntityId(2)).unwrap());
        replay.seek(0.0);
        assert!(!replay.is_active(EntityId(2)).unwrap());
        assert!(replay.is_active(EntityId(1)).unwrap());
    }

    #[test]
    fn frame_stepping() {
        let mut replay = Replay::from_timeline(add_remove_timeline()).unwrap();
        replay.move_to_next_frame();
        assert_eq!(replay.sim_time(), 0.1);
        replay.move_to_next_frame();
        assert_eq!(replay.sim_time(), 0.2);
        replay.move_to_previous_frame();
        assert_eq!(replay.sim_time(), 0.1);

        // Mid-interval: previous frame first snaps to the cursor frame.
        replay.seek(0.15);
        replay.move_to_previous_frame();
        assert_eq!(replay.sim_time(), 0.1);
    }

    #[test]
    fn move_to_start_and_end() {
        let mut replay = Replay::from_timeline(add_remove_timeline()).unwrap();
        replay.move_to_end();
        assert_eq!(replay.sim_time(), 0.3);
        replay.move_to_start();
        assert_eq!(replay.sim_time(), 0.0);
        assert_eq!(replay.speed(EntityId(1)).unwrap(), 10.0);
    }

    #[test]
    fn window_narrowing_moves_session_inside() {
        let mut replay = Replay::from_timeline(add_remove_timeline()).unwrap();
        replay.set_start_time(0.1);
        assert_eq!(replay.start_time(), 0.1);
        assert_eq!(replay.sim_time(), 0.1);

        replay.move_to_end();
        replay.set_stop_time(0.2);
        assert_eq!(replay.stop_time(), 0.2);
        assert_eq!(replay.sim_time(), 0.2);

        // Clamping now honors the narrowed window.
        replay.seek(10.0);
        assert_eq!(replay.sim_time(), 0.2);
        replay.seek(-10.0);
        assert_eq!(replay.sim_time(), 0.1);
    }

    #[test]
    fn enumeration_tracks_activity() {
        let mut replay = Replay::from_timeline(add_remove_timeline()).unwrap();
        replay.seek(0.3);
        assert_eq!(replay.active_entities().count(), 0);
        assert_eq!(replay.cached_entities().count(), 1);

        let recorded = replay.recorded_entities();
        assert_eq!(recorded, vec![(EntityId(1), 0.0)]);
    }

    #[test]
    fn empty_timeline_rejected() {
        let tl = Timeline::new(header());
        assert!(matches!(
            Replay::from_timeline(tl),
            Err(ReplayError::EmptyRecording)
        ));
    }
}
