//! The record alphabet: package kinds and their typed payloads.
//!
//! A recording is a stream of typed, length-prefixed packages. The alphabet
//! is fixed: one header, the frame marker ([`Package::Time`]), the entity
//! block markers, and one package kind per recorded attribute. Payloads are
//! decoded field-by-field into the variants here — no struct overlays — so
//! the wire layout lives entirely in `tarmac-format` and the rest of the
//! workspace only ever sees typed values.

use std::fmt;

use crate::id::EntityId;

// ── Kind tags ───────────────────────────────────────────────────

/// Discriminates the package kinds of the recording format.
///
/// The `u32` values are the on-wire ids and must never be reordered or
/// reused; retired kinds would be skipped by old readers via the
/// length-prefix, new kinds by the unknown-id skip path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u32)]
pub enum RecordKind {
    /// File header: format version plus source file references.
    Header = 1,
    /// Frame marker carrying the simulation timestamp.
    Time = 2,
    /// Entity block marker: subsequent packages belong to this entity.
    EntityId = 3,
    /// The entity enters the scenario in this frame.
    EntityAdded = 4,
    /// The entity leaves the scenario in this frame.
    EntityRemoved = 5,
    /// Terminates the recording.
    EndOfScenario = 6,
    /// 3D model reference of the entity.
    ModelId = 7,
    /// World pose: x, y, z, heading, roll, pitch.
    Position = 8,
    /// Longitudinal speed, m/s.
    Speed = 9,
    /// Object type classification.
    ObjType = 10,
    /// Object category classification.
    ObjCategory = 11,
    /// Controller type driving the entity.
    CtrlType = 12,
    /// Steering wheel angle, rad.
    WheelAngle = 13,
    /// Wheel rotation, rad.
    WheelRotation = 14,
    /// Axis-aligned bounding box: center offset and dimensions.
    BoundingBox = 15,
    /// How the 3D model is scaled against the bounding box.
    ScaleMode = 16,
    /// Visibility bitmask (graphics, sensors, traffic).
    VisibilityMask = 17,
    /// Entity name, UTF-8.
    Name = 18,
    /// Road id of the road-relative position.
    RoadId = 19,
    /// Lane id of the road-relative position.
    LaneId = 20,
    /// Lateral offset from lane center.
    PosOffset = 21,
    /// Road-relative t coordinate.
    PosT = 22,
    /// Road-relative s coordinate.
    PosS = 23,
}

impl RecordKind {
    /// The on-wire id of this kind.
    pub fn wire_id(self) -> u32 {
        self as u32
    }

    /// Map an on-wire id back to a kind, `None` for unknown ids.
    pub fn from_wire(id: u32) -> Option<Self> {
        Some(match id {
            1 => Self::Header,
            2 => Self::Time,
            3 => Self::EntityId,
            4 => Self::EntityAdded,
            5 => Self::EntityRemoved,
            6 => Self::EndOfScenario,
            7 => Self::ModelId,
            8 => Self::Position,
            9 => Self::Speed,
            10 => Self::ObjType,
            11 => Self::ObjCategory,
            12 => Self::CtrlType,
            13 => Self::WheelAngle,
            14 => Self::WheelRotation,
            15 => Self::BoundingBox,
            16 => Self::ScaleMode,
            17 => Self::VisibilityMask,
            18 => Self::Name,
            19 => Self::RoadId,
            20 => Self::LaneId,
            21 => Self::PosOffset,
            22 => Self::PosT,
            23 => Self::PosS,
            _ => return None,
        })
    }

    /// Whether packages of this kind carry per-entity attribute state.
    ///
    /// Attribute packages are the ones the state cache tracks per entity;
    /// structural kinds (header, frame and block markers, end marker) are
    /// interpreted by the timeline walk itself.
    pub fn is_attribute(self) -> bool {
        !matches!(
            self,
            Self::Header
                | Self::Time
                | Self::EntityId
                | Self::EntityAdded
                | Self::EntityRemoved
                | Self::EndOfScenario
        )
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "HEADER",
            Self::Time => "TIME",
            Self::EntityId => "ENTITY_ID",
            Self::EntityAdded => "ENTITY_ADDED",
            Self::EntityRemoved => "ENTITY_REMOVED",
            Self::EndOfScenario => "END_OF_SCENARIO",
            Self::ModelId => "MODEL_ID",
            Self::Position => "POSITION",
            Self::Speed => "SPEED",
            Self::ObjType => "OBJ_TYPE",
            Self::ObjCategory => "OBJ_CATEGORY",
            Self::CtrlType => "CTRL_TYPE",
            Self::WheelAngle => "WHEEL_ANGLE",
            Self::WheelRotation => "WHEEL_ROTATION",
            Self::BoundingBox => "BOUNDING_BOX",
            Self::ScaleMode => "SCALE_MODE",
            Self::VisibilityMask => "VISIBILITY_MASK",
            Self::Name => "NAME",
            Self::RoadId => "ROAD_ID",
            Self::LaneId => "LANE_ID",
            Self::PosOffset => "POS_OFFSET",
            Self::PosT => "POS_T",
            Self::PosS => "POS_S",
        };
        f.write_str(name)
    }
}

// ── Payload value types ─────────────────────────────────────────

/// World pose of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position {
    /// World x coordinate, m.
    pub x: f64,
    /// World y coordinate, m.
    pub y: f64,
    /// World z coordinate, m.
    pub z: f64,
    /// Heading, rad.
    pub h: f64,
    /// Roll, rad.
    pub r: f64,
    /// Pitch, rad.
    pub p: f64,
}

/// Bounding box of an entity: center offset relative to the entity
/// reference point, plus dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoundingBox {
    /// Center offset x, m.
    pub x: f64,
    /// Center offset y, m.
    pub y: f64,
    /// Center offset z, m.
    pub z: f64,
    /// Width (lateral extent), m.
    pub width: f64,
    /// Length (longitudinal extent), m.
    pub length: f64,
    /// Height, m.
    pub height: f64,
}

/// Recording file header: format version plus references to the road
/// network and 3D model files that were loaded when recording.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogHeader {
    /// Recording format version. A reader supports exactly one version.
    pub version: i32,
    /// Path of the OpenDRIVE road network used during recording.
    pub odr_path: String,
    /// Path of the 3D scenery model used during recording.
    pub model_path: String,
}

// ── Package ─────────────────────────────────────────────────────

/// One decoded package: the typed unit of the recording stream.
///
/// Packages own their payload; a [`Timeline`](crate::Timeline) owns its
/// packages for the lifetime of the replay session, and downstream state
/// is expressed as indices into that timeline rather than references.
#[derive(Clone, Debug, PartialEq)]
pub enum Package {
    /// File header, always the first element of a timeline.
    Header(LogHeader),
    /// Frame marker: simulation timestamp in seconds.
    Time(f64),
    /// Entity block marker.
    EntityId(EntityId),
    /// Entity enters the scenario.
    EntityAdded,
    /// Entity leaves the scenario.
    EntityRemoved,
    /// End of the recording.
    EndOfScenario,
    /// 3D model reference.
    ModelId(i32),
    /// World pose.
    Position(Position),
    /// Longitudinal speed, m/s.
    Speed(f64),
    /// Object type classification.
    ObjType(i32),
    /// Object category classification.
    ObjCategory(i32),
    /// Controller type.
    CtrlType(i32),
    /// Steering wheel angle, rad.
    WheelAngle(f64),
    /// Wheel rotation, rad.
    WheelRotation(f64),
    /// Bounding box.
    BoundingBox(BoundingBox),
    /// Model scale mode.
    ScaleMode(i32),
    /// Visibility bitmask.
    VisibilityMask(i32),
    /// Entity name.
    Name(String),
    /// Road id.
    RoadId(i32),
    /// Lane id.
    LaneId(i32),
    /// Lateral offset from lane center.
    PosOffset(f64),
    /// Road-relative t coordinate.
    PosT(f64),
    /// Road-relative s coordinate.
    PosS(f64),
}

impl Package {
    /// The kind tag of this package.
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::Header(_) => RecordKind::Header,
            Self::Time(_) => RecordKind::Time,
            Self::EntityId(_) => RecordKind::EntityId,
            Self::EntityAdded => RecordKind::EntityAdded,
            Self::EntityRemoved => RecordKind::EntityRemoved,
            Self::EndOfScenario => RecordKind::EndOfScenario,
            Self::ModelId(_) => RecordKind::ModelId,
            Self::Position(_) => RecordKind::Position,
            Self::Speed(_) => RecordKind::Speed,
            Self::ObjType(_) => RecordKind::ObjType,
            Self::ObjCategory(_) => RecordKind::ObjCategory,
            Self::CtrlType(_) => RecordKind::CtrlType,
            Self::WheelAngle(_) => RecordKind::WheelAngle,
            Self::WheelRotation(_) => RecordKind::WheelRotation,
            Self::BoundingBox(_) => RecordKind::BoundingBox,
            Self::ScaleMode(_) => RecordKind::ScaleMode,
            Self::VisibilityMask(_) => RecordKind::VisibilityMask,
            Self::Name(_) => RecordKind::Name,
            Self::RoadId(_) => RecordKind::RoadId,
            Self::LaneId(_) => RecordKind::LaneId,
            Self::PosOffset(_) => RecordKind::PosOffset,
            Self::PosT(_) => RecordKind::PosT,
            Self::PosS(_) => RecordKind::PosS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_ids_roundtrip() {
        for id in 1..=23u32 {
            let kind = RecordKind::from_wire(id).unwrap();
            assert_eq!(kind.wire_id(), id);
        }
        assert_eq!(RecordKind::from_wire(0), None);
        assert_eq!(RecordKind::from_wire(24), None);
        assert_eq!(RecordKind::from_wire(u32::MAX), None);
    }

    #[test]
    fn attribute_classification() {
        assert!(RecordKind::Speed.is_attribute());
        assert!(RecordKind::Name.is_attribute());
        assert!(RecordKind::BoundingBox.is_attribute());
        assert!(!RecordKind::Time.is_attribute());
        assert!(!RecordKind::EntityId.is_attribute());
        assert!(!RecordKind::EntityAdded.is_attribute());
        assert!(!RecordKind::EndOfScenario.is_attribute());
        assert!(!RecordKind::Header.is_attribute());
    }

    #[test]
    fn package_kind_matches_variant() {
        assert_eq!(Package::Time(1.0).kind(), RecordKind::Time);
        assert_eq!(
            Package::EntityId(EntityId(3)).kind(),
            RecordKind::EntityId
        );
        assert_eq!(Package::Speed(5.0).kind(), RecordKind::Speed);
        assert_eq!(
            Package::Name("ego".into()).kind(),
            RecordKind::Name
        );
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(RecordKind::Time.to_string(), "TIME");
        assert_eq!(RecordKind::EntityRemoved.to_string(), "ENTITY_REMOVED");
        assert_eq!(RecordKind::PosS.to_string(), "POS_S");
    }
}
