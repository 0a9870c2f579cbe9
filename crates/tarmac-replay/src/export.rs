//! Export timestamp sampling.
//!
//! External CSV/report consumers drive a [`Replay`](crate::Replay) by
//! seeking to a schedule of timestamps and reading the active entities at
//! each one. [`sample_times`] produces that schedule from a timeline and
//! an [`ExportMode`]; the writing of rows stays with the consumer.

use tarmac_core::{Timeline, TIME_TOLERANCE};

use crate::error::ReplayError;

/// How export timestamps are generated from a recording.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ExportMode {
    /// Emit exactly the timestamps present in the recording.
    TimeStamps,
    /// Resample at the smallest observed inter-frame delta, skipping
    /// original frames that do not land on a sample.
    MinimumTimeStep,
    /// Resample at a caller-specified delta, in seconds.
    FixedTimeStep(f64),
    /// Resample at a delta while still emitting original frame
    /// timestamps that fall between samples. Typically driven with the
    /// recording's minimum time step.
    Mixed(f64),
}

/// Generate the export timestamp schedule for `timeline` under `mode`.
///
/// Schedules always start at the first and end at the last recorded
/// timestamp. Resampling modes reject steps that cannot advance the
/// sample clock ([`ReplayError::InvalidTimeStep`]); an empty timeline is
/// rejected as [`ReplayError::EmptyRecording`].
pub fn sample_times(timeline: &Timeline, mode: ExportMode) -> Result<Vec<f64>, ReplayError> {
    let (Some(start), Some(stop)) = (timeline.start_time(), timeline.stop_time()) else {
        return Err(ReplayError::EmptyRecording);
    };

    match mode {
        ExportMode::TimeStamps => Ok(dedup_times(timeline.frames().map(|f| f.time))),
        ExportMode::MinimumTimeStep => {
            let step = timeline
                .min_time_step()
                .ok_or(ReplayError::InvalidTimeStep { delta: 0.0 })?;
            Ok(resample(start, stop, step))
        }
        ExportMode::FixedTimeStep(step) => {
            validate_step(step)?;
            Ok(resample(start, stop, step))
        }
        ExportMode::Mixed(step) => {
            validate_step(step)?;
            let samples = resample(start, stop, step);
            let originals = dedup_times(timeline.frames().map(|f| f.time));
            Ok(merge_sorted(&samples, &originals))
        }
    }
}

fn validate_step(step: f64) -> Result<(), ReplayError> {
    if !step.is_finite() || step <= TIME_TOLERANCE {
        return Err(ReplayError::InvalidTimeStep { delta: step });
    }
    Ok(())
}

/// `start, start + step, ...`, ending exactly on `stop`.
fn resample(start: f64, stop: f64, step: f64) -> Vec<f64> {
    let mut times = Vec::new();
    let mut t = start;
    while t < stop - TIME_TOLERANCE {
        times.push(t);
        t += step;
    }
    times.push(stop);
    times
}

/// Drop consecutive epsilon-equal timestamps (merged recordings repeat
/// the shared frame marker value once per source).
fn dedup_times(times: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = Vec::new();
    for t in times {
        if out.last().is_none_or(|&last| (t - last).abs() > TIME_TOLERANCE) {
            out.push(t);
        }
    }
    out
}

/// Merge two ascending schedules, collapsing epsilon-equal entries.
fn merge_sorted(a: &[f64], b: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() || j < b.len() {
        let next = match (a.get(i), b.get(j)) {
            (Some(&x), Some(&y)) => {
                if x <= y {
                    i += 1;
                    x
                } else {
                    j += 1;
                    y
                }
            }
            (Some(&x), None) => {
                i += 1;
                x
            }
            (None, Some(&y)) => {
                j += 1;
                y
            }
            (None, None) => break,
        };
        if out
            .last()
            .is_none_or(|&last: &f64| (next - last).abs() > TIME_TOLERANCE)
        {
            out.push(next);
        }
    }
    out
}
