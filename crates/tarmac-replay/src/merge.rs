//! Multi-recording merge: one namespaced, timestamp-ordered timeline.
//!
//! Each input recording is loaded, its entity ids shifted into a disjoint
//! group (`id + 100 × recording_index`), and its package stream decomposed
//! into per-entity entries of `(timestamp, entity, block packages)`. A
//! cleanup pass repairs monotonicity per recording, then a k-way
//! interleave emits every recording's entries instant by instant, aligning
//! epsilon-equal timestamps onto one shared frame marker. The result is a
//! plain [`Timeline`] — replayable directly or serialized back out through
//! the log writer with the first recording's header.

use std::path::{Path, PathBuf};

use tarmac_core::{times_equal, EntityId, Package, Timeline, TIME_TOLERANCE};
use tarmac_format::LogReader;
use tracing::{info, warn};

use crate::error::ReplayError;

/// Entity id distance between the groups of merged recordings.
///
/// Recording 0 keeps its ids, recording 1 maps id `k` to `k + 100`, and
/// so on; a single recording must therefore stay below 100 entities for
/// the groups to be collision-free.
pub const GROUP_STRIDE: i32 = 100;

/// One loaded recording, ready to merge.
pub struct Recording {
    /// Where the recording was loaded from.
    pub path: PathBuf,
    /// Its decoded package stream.
    pub timeline: Timeline,
}

impl Recording {
    /// Load a recording through the full reader path, version gate
    /// included.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
        let path = path.as_ref().to_path_buf();
        let timeline = LogReader::open(&path)?.read_timeline()?;
        Ok(Self { path, timeline })
    }
}

/// One entity block flattened for merging: the frame timestamp it was
/// recorded at, the (already namespaced) entity id, and the block's
/// packages in order.
#[derive(Clone, Debug)]
struct MergeEntry {
    time: f64,
    entity: EntityId,
    added: bool,
    removed: bool,
    attrs: Vec<Package>,
}

/// Decompose a recording into merge entries, offsetting entity ids into
/// the group of `recording_index`.
fn decompose(timeline: &Timeline, recording_index: usize) -> Vec<MergeEntry> {
    let offset = GROUP_STRIDE * recording_index as i32;
    let mut entries = Vec::new();
    for frame in timeline.frames() {
        for block in timeline.entity_blocks(frame) {
            entries.push(MergeEntry {
                time: frame.time,
                entity: EntityId(block.entity.0 + offset),
                added: block.added,
                removed: block.removed,
                attrs: block
                    .attrs
                    .iter()
                    .filter_map(|&i| timeline.get(i).cloned())
                    .collect(),
            });
        }
    }
    entries
}

/// Repair monotonicity within one recording's entries.
///
/// An entry whose timestamp regresses relative to the previous kept entry
/// is dropped; among entries sharing (within tolerance) one timestamp and
/// one entity id, only the last survives.
fn clean_entries(entries: Vec<MergeEntry>, origin: &Path) -> Vec<MergeEntry> {
    let mut kept: Vec<MergeEntry> = Vec::new();
    let mut dropped_regressions = 0usize;
    let mut dropped_duplicates = 0usize;

    for entry in entries {
        if let Some(last) = kept.last() {
            if entry.time < last.time - TIME_TOLERANCE {
                dropped_regressions += 1;
                continue;
            }
        }
        if let Some(pos) = kept
            .iter()
            .rposition(|p| p.entity == entry.entity && times_equal(p.time, entry.time))
        {
            kept.remove(pos);
            dropped_duplicates += 1;
        }
        kept.push(entry);
    }

    if dropped_regressions > 0 || dropped_duplicates > 0 {
        warn!(
            recording = %origin.display(),
            regressions = dropped_regressions,
            duplicates = dropped_duplicates,
            "dropped non-monotonic entries during merge cleanup"
        );
    }
    kept
}

/// Merge two or more recordings into one namespaced timeline.
///
/// The merged timeline carries the first recording's header. Entries from
/// different recordings whose timestamps agree within tolerance land on
/// one shared frame marker, rewritten to the common merged value.
pub fn merge(recordings: &[Recording]) -> Result<Timeline, ReplayError> {
    if recordings.len() < 2 {
        return Err(ReplayError::TooFewRecordings {
            found: recordings.len(),
        });
    }

    // Decompose with group offsets assigned in input order, then repair
    // monotonicity per recording.
    let mut streams: Vec<(usize, &Path, Vec<MergeEntry>)> = recordings
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let entries = clean_entries(decompose(&rec.timeline, i), &rec.path);
            (i, rec.path.as_path(), entries)
        })
        .collect();

    // Order by first timestamp; informational, but also fixes the
    // emission order of same-instant entries.
    streams.sort_by(|a, b| {
        let ta = a.2.first().map_or(f64::INFINITY, |e| e.time);
        let tb = b.2.first().map_or(f64::INFINITY, |e| e.time);
        ta.partial_cmp(&tb).unwrap_or(std::cmp::Ordering::Equal)
    });

    for (index, path, _) in &streams {
        info!(
            ids_from = GROUP_STRIDE * *index as i32,
            ids_to = GROUP_STRIDE * (*index as i32 + 1) - 1,
            recording = %path.display(),
            "merge id group assignment"
        );
    }

    let mut merged = Timeline::new(recordings[0].timeline.header().clone());
    let mut cursors = vec![0usize; streams.len()];

    loop {
        // The earliest timestamp any stream still has to offer.
        let mut min_time = f64::INFINITY;
        for ((_, _, entries), &cursor) in streams.iter().zip(&cursors) {
            if let Some(entry) = entries.get(cursor) {
                min_time = min_time.min(entry.time);
            }
        }
        if !min_time.is_finite() {
            break;
        }

        merged.push(Package::Time(min_time));
        for ((_, _, entries), cursor) in streams.iter().zip(cursors.iter_mut()) {
            while let Some(entry) = entries.get(*cursor) {
                if entry.time > min_time + TIME_TOLERANCE {
                    break;
                }
                // Aligned onto the shared frame marker: the entry's own
                // timestamp is rewritten to the merged value by omission.
                merged.push(Package::EntityId(entry.entity));
                if entry.added {
                    merged.push(Package::EntityAdded);
                }
                if entry.removed {
                    merged.push(Package::EntityRemoved);
                }
                for attr in &entry.attrs {
                    merged.push(attr.clone());
                }
                *cursor += 1;
            }
        }
    }

    merged.push(Package::EndOfScenario);
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarmac_core::record::LogHeader;
    use tarmac_format::FORMAT_VERSION;

    fn header(odr: &str) -> LogHeader {
        LogHeader {
            version: FORMAT_VERSION,
            odr_path: odr.into(),
            model_path: "scene.osgb".into(),
        }
    }

    fn single_entity_timeline(odr: &str, times: &[f64], speed_base: f64) -> Timeline {
        let mut tl = Timeline::new(header(odr));
        for (i, &t) in times.iter().enumerate() {
            tl.push(Package::Time(t));
            tl.push(Package::EntityId(EntityId(1)));
            if i == 0 {
                tl.push(Package::EntityAdded);
            }
            tl.push(Package::Speed(speed_base + i as f64));
        }
        tl.push(Package::EndOfScenario);
        tl
    }

    fn recording(name: &str, timeline: Timeline) -> Recording {
        Recording {
            path: PathBuf::from(name),
            timeline,
        }
    }

    #[test]
    fn merging_one_recording_is_a_usage_error() {
        let recs = vec![recording(
            "a.dat",
            single_entity_timeline("a.xodr", &[0.0, 0.1], 1.0),
        )];
        assert!(matches!(
            merge(&recs),
            Err(ReplayError::TooFewRecordings { found: 1 })
        ));
    }

    #[test]
    fn entity_ids_are_namespaced() {
        let recs = vec![
            recording("a.dat", single_entity_timeline("a.xodr", &[0.0, 0.1], 1.0)),
            recording("b.dat", single_entity_timeline("b.xodr", &[0.0, 0.1], 10.0)),
        ];
        let merged = merge(&recs).unwrap();

        let mut ids: Vec<EntityId> = Vec::new();
        for pkg in merged.packages() {
            if let Package::EntityId(id) = pkg {
                if !ids.contains(id) {
                    ids.push(*id);
                }
            }
        }
        assert_eq!(ids, vec![EntityId(1), EntityId(101)]);
    }

    #[test]
    fn merged_header_comes_from_first_recording() {
        let recs = vec![
            recording("a.dat", single_entity_timeline("a.xodr", &[0.0], 1.0)),
            recording("b.dat", single_entity_timeline("b.xodr", &[0.0], 2.0)),
        ];
        let merged = merge(&recs).unwrap();
        assert_eq!(merged.header().odr_path, "a.xodr");
    }

    #[test]
    fn epsilon_equal_timestamps_share_one_frame() {
        let recs = vec![
            recording("a.dat", single_entity_timeline("a.xodr", &[0.0, 0.1], 1.0)),
            recording(
                "b.dat",
                single_entity_timeline("b.xodr", &[1e-9, 0.1 + 1e-9], 10.0),
            ),
        ];
        let merged = merge(&recs).unwrap();
        // Two instants, not four.
        assert_eq!(merged.frame_count(), 2);

        let f0 = merged.frame(0).unwrap();
        let blocks: Vec<_> = merged.entity_blocks(f0).collect();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].entity, EntityId(1));
        assert_eq!(blocks[1].entity, EntityId(101));
    }

    #[test]
    fn interleave_orders_disjoint_instants() {
        let recs = vec![
            recording("a.dat", single_entity_timeline("a.xodr", &[0.0, 0.2], 1.0)),
            recording("b.dat", single_entity_timeline("b.xodr", &[0.1, 0.3], 10.0)),
        ];
        let merged = merge(&recs).unwrap();
        let times: Vec<f64> = merged.frames().map(|f| f.time).collect();
        assert_eq!(times, vec![0.0, 0.1, 0.2, 0.3]);
    }

    #[test]
    fn later_starting_recording_keeps_input_group() {
        // Recording 0 starts later than recording 1: sorting by first
        // timestamp must not reshuffle the id groups assigned at load.
        let recs = vec![
            recording("late.dat", single_entity_timeline("a.xodr", &[5.0, 5.1], 1.0)),
            recording("early.dat", single_entity_timeline("b.xodr", &[0.0, 0.1], 2.0)),
        ];
        let merged = merge(&recs).unwrap();

        let f0 = merged.frame(0).unwrap();
        assert!(times_equal(f0.time, 0.0));
        let blocks: Vec<_> = merged.entity_blocks(f0).collect();
        // The early recording is input index 1, so its entity is 101.
        assert_eq!(blocks[0].entity, EntityId(101));
    }

    #[test]
    fn cleanup_drops_regressions_and_same_instant_duplicates() {
        let mut tl = Timeline::new(header("a.xodr"));
        tl.push(Package::Time(0.0));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::EntityAdded);
        tl.push(Package::Speed(1.0));
        // Regression: goes backward in time.
        tl.push(Package::Time(-0.5));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(99.0));
        // Duplicate instant for the same entity: the later one wins.
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(2.0));
        tl.push(Package::Time(0.1));
        tl.push(Package::EntityId(EntityId(1)));
        tl.push(Package::Speed(3.0));
        tl.push(Package::EndOfScenario);

        let entries = clean_entries(decompose(&tl, 0), Path::new("a.dat"));
        assert_eq!(entries.len(), 2);
        assert!(times_equal(entries[0].time, 0.0));
        assert!(times_equal(entries[1].time, 0.1));
        assert_eq!(entries[1].attrs, vec![Package::Speed(3.0)]);
    }

    #[test]
    fn merged_timeline_replays() {
        use crate::session::Replay;

        let recs = vec![
            recording("a.dat", single_entity_timeline("a.xodr", &[0.0, 0.1], 1.0)),
            recording("b.dat", single_entity_timeline("b.xodr", &[0.0, 0.1], 10.0)),
        ];
        let merged = merge(&recs).unwrap();
        let mut replay = Replay::from_timeline(merged).unwrap();

        replay.seek(0.1);
        assert_eq!(replay.speed(EntityId(1)).unwrap(), 2.0);
        assert_eq!(replay.speed(EntityId(101)).unwrap(), 11.0);
        assert_eq!(replay.active_entities().count(), 2);
    }
}
