use std::collections::BTreeMap;

use foundation::math::Vec3;
use scene::{AnnotationKind, EntityId, GroupId, PrimitiveRole, World};

use crate::geometry::TerrainProfile;

/// Key of a label slot whose text the user replaced.
pub type LabelSlot = (PrimitiveRole, u32);

/// One measurement: its clicked coordinates plus bookkeeping for the
/// primitives derived from them.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub id: GroupId,
    pub kind: AnnotationKind,
    pub coordinates: Vec<Vec3>,
    /// Live cursor position while drawing; rendered as a trailing preview.
    pub cursor: Option<Vec3>,
    pub complete: bool,
    pub highlighted: bool,
    /// Hidden annotations keep their primitives but are neither drawn nor
    /// picked.
    pub hidden: bool,
    pub label_overrides: BTreeMap<LabelSlot, String>,
    /// Primitives currently spawned for this annotation.
    pub entities: Vec<EntityId>,
    pub profile: Option<TerrainProfile>,
}

impl Annotation {
    pub fn new(id: GroupId, kind: AnnotationKind) -> Self {
        Self {
            id,
            kind,
            coordinates: Vec::new(),
            cursor: None,
            complete: false,
            highlighted: false,
            hidden: false,
            label_overrides: BTreeMap::new(),
            entities: Vec::new(),
            profile: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        !self.complete
    }

    /// Coordinates followed by the cursor preview, if any.
    pub fn preview_coordinates(&self) -> Vec<Vec3> {
        let mut out = self.coordinates.clone();
        if let Some(cursor) = self.cursor {
            out.push(cursor);
        }
        out
    }

    /// Removes vertex `index`, shifting label overrides of later segments so
    /// that custom names stay attached to the same geometry where possible.
    pub fn remove_vertex(&mut self, index: usize) -> Option<Vec3> {
        if index >= self.coordinates.len() {
            return None;
        }
        let removed = self.coordinates.remove(index);
        let idx = index as u32;
        let shifted: BTreeMap<LabelSlot, String> = std::mem::take(&mut self.label_overrides)
            .into_iter()
            .filter_map(|((role, i), text)| match role {
                PrimitiveRole::SegmentLabel if i + 1 == idx || i == idx => None,
                PrimitiveRole::SegmentLabel if i > idx => Some(((role, i - 1), text)),
                _ => Some(((role, i), text)),
            })
            .collect();
        self.label_overrides = shifted;
        Some(removed)
    }

    /// Reverses the vertex order so that drawing can continue from the
    /// first vertex.
    pub fn reverse(&mut self) {
        self.coordinates.reverse();
        let segments = self.coordinates.len().saturating_sub(1) as u32;
        let flipped: BTreeMap<LabelSlot, String> = std::mem::take(&mut self.label_overrides)
            .into_iter()
            .map(|((role, i), text)| match role {
                PrimitiveRole::SegmentLabel if i < segments => ((role, segments - 1 - i), text),
                _ => ((role, i), text),
            })
            .collect();
        self.label_overrides = flipped;
    }
}

/// All annotations of the session, keyed by group id.
///
/// Ordering contract: iteration is in ascending `GroupId`, which is creation
/// order.
#[derive(Debug, Default)]
pub struct AnnotationStore {
    next_id: u64,
    annotations: BTreeMap<GroupId, Annotation>,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, kind: AnnotationKind) -> GroupId {
        self.next_id += 1;
        let id = GroupId(self.next_id);
        self.annotations.insert(id, Annotation::new(id, kind));
        id
    }

    pub fn get(&self, id: GroupId) -> Option<&Annotation> {
        self.annotations.get(&id)
    }

    pub fn get_mut(&mut self, id: GroupId) -> Option<&mut Annotation> {
        self.annotations.get_mut(&id)
    }

    pub fn contains(&self, id: GroupId) -> bool {
        self.annotations.contains_key(&id)
    }

    /// Removes the annotation and despawns its primitives.
    pub fn remove(&mut self, world: &mut World, id: GroupId) -> Option<Annotation> {
        let mut annotation = self.annotations.remove(&id)?;
        for entity in world.entities_in_group(id) {
            world.despawn(entity);
        }
        annotation.entities.clear();
        Some(annotation)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.values()
    }

    pub fn ids(&self) -> Vec<GroupId> {
        self.annotations.keys().copied().collect()
    }

    pub fn by_kind(&self, kind: AnnotationKind) -> impl Iterator<Item = &Annotation> + '_ {
        self.annotations.values().filter(move |a| a.kind == kind)
    }

    /// Owning annotation of a primitive, resolved through its tag.
    pub fn group_of(&self, world: &World, entity: EntityId) -> Option<GroupId> {
        let tag = world.tag(entity)?;
        self.contains(tag.group).then_some(tag.group)
    }

    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// Drops every annotation and every primitive in `world`. Ids keep
    /// counting up.
    pub fn clear(&mut self, world: &mut World) {
        self.annotations.clear();
        world.clear();
    }
}
