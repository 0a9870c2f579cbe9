//! Strongly-typed identifiers.

use std::fmt;

/// Identifies one simulated entity (vehicle, pedestrian, misc object)
/// within a recording.
///
/// Ids are assigned by the recording simulator and are unique within a
/// single recording. When several recordings are merged, each recording's
/// ids are shifted into a disjoint group so they stay unique in the
/// combined timeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(pub i32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for EntityId {
    fn from(v: i32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_matches_inner() {
        assert_eq!(EntityId(7).to_string(), "7");
        assert_eq!(EntityId(-1).to_string(), "-1");
    }

    #[test]
    fn ordering_follows_inner() {
        assert!(EntityId(1) < EntityId(101));
    }
}
