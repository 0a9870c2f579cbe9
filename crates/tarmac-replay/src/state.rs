//! The materialized state cache: last known state per entity.
//!
//! The cache is the event-sourced view the seek engine maintains while the
//! cursor moves: for every entity ever observed, which attribute package
//! holds its latest value at the current simulation time. Attribute values
//! are not copied — each slot stores the package's **index** into the
//! timeline, resolved to a value only when an accessor reads it. Indices
//! stay valid however the timeline's backing storage moves, which is what
//! makes the cache safe against the reallocation-aliasing trap of keeping
//! raw references into a vector.
//!
//! Entities are never removed from the cache. An entity that leaves the
//! scenario is flagged inactive but keeps its attribute slots, so its last
//! known state remains queryable after removal.

use indexmap::IndexMap;

use tarmac_core::timeline::EntityBlock;
use tarmac_core::{EntityId, RecordKind, Timeline};

/// One cached attribute: where its latest package lives and the
/// simulation time it was taken from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AttrSlot {
    /// Index of the attribute package in the timeline.
    pub index: usize,
    /// Simulation time the slot was last (re)bound at.
    pub as_of: f64,
}

/// Last known state of one entity.
#[derive(Clone, Debug)]
pub struct CachedEntity {
    id: EntityId,
    active: bool,
    attrs: IndexMap<RecordKind, AttrSlot>,
}

impl CachedEntity {
    /// The entity this state belongs to.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Whether the entity is part of the scenario at the current time.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The slot holding the latest package of `kind`, if any was ever
    /// recorded at or before the current time.
    pub fn attr(&self, kind: RecordKind) -> Option<AttrSlot> {
        self.attrs.get(&kind).copied()
    }

    /// Iterate over all bound attribute slots.
    pub fn attrs(&self) -> impl Iterator<Item = (RecordKind, AttrSlot)> + '_ {
        self.attrs.iter().map(|(k, v)| (*k, *v))
    }
}

/// The materialized per-entity state at `sim_time`.
///
/// Mutated only by the seek engine; read by every accessor. Never
/// serialized.
#[derive(Clone, Debug, Default)]
pub struct StateCache {
    sim_time: f64,
    entities: IndexMap<EntityId, CachedEntity>,
}

impl StateCache {
    /// The simulation time the cache currently reflects.
    pub fn sim_time(&self) -> f64 {
        self.sim_time
    }

    /// Look up an entity's cached state.
    pub fn entity(&self, id: EntityId) -> Option<&CachedEntity> {
        self.entities.get(&id)
    }

    /// Whether the entity has ever been materialized.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Iterate over every cached entity in materialization order.
    pub fn entities(&self) -> impl Iterator<Item = &CachedEntity> + '_ {
        self.entities.values()
    }

    pub(crate) fn set_sim_time(&mut self, t: f64) {
        self.sim_time = t;
    }

    /// Materialize an entity from a full entity block.
    ///
    /// Stores a slot for every attribute in the block, stamped `as_of`;
    /// the entity starts active (a removal marker in the same block is
    /// applied by the caller afterwards).
    pub(crate) fn materialize(&mut self, timeline: &Timeline, block: &EntityBlock, as_of: f64) {
        let mut attrs = IndexMap::new();
        for &index in &block.attrs {
            if let Some(pkg) = timeline.get(index) {
                attrs.insert(pkg.kind(), AttrSlot { index, as_of });
            }
        }
        self.entities.insert(
            block.entity,
            CachedEntity {
                id: block.entity,
                active: true,
                attrs,
            },
        );
    }

    /// Merge a block's attributes into an already-cached entity:
    /// last write wins per kind, kinds absent from the block keep their
    /// previous slot.
    pub(crate) fn merge_block(&mut self, timeline: &Timeline, block: &EntityBlock, as_of: f64) {
        let Some(entity) = self.entities.get_mut(&block.entity) else {
            return;
        };
        for &index in &block.attrs {
            if let Some(pkg) = timeline.get(index) {
                entity.attrs.insert(pkg.kind(), AttrSlot { index, as_of });
            }
        }
    }

    /// Flag an entity active or inactive. No-op for unknown ids.
    pub(crate) fn set_active(&mut self, id: EntityId, active: bool) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.active = active;
        }
    }

    /// Rebind one attribute slot to an earlier package (backward seek).
    pub(crate) fn rebind(&mut self, id: EntityId, kind: RecordKind, index: usize, as_of: f64) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.attrs.insert(kind, AttrSlot { index, as_of });
        }
    }

    /// Drop one attribute slot entirely (backward seek past the
    /// attribute's first record); the accessor default applies again.
    pub(crate) fn clear_attr(&mut self, id: EntityId, kind: RecordKind) {
        if let Some(entity) = self.entities.get_mut(&id) {
            entity.attrs.shift_remove(&kind);
        }
    }
}
