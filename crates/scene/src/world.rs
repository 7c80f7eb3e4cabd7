use crate::entity::EntityId;
use crate::primitives::{AnnotationTag, GroupId, Primitive, Visibility};
use crate::snapshot::SceneSnapshot;
use foundation::handles::Handle;

/// Shared primitive collections for every annotation on the globe.
///
/// Storage is slot based: each entity index owns one optional primitive, an
/// optional tag and an optional visibility override. Freed slots are reused
/// with a bumped generation, so handles held across a despawn go stale
/// instead of aliasing the next occupant.
#[derive(Debug, Default)]
pub struct World {
    generations: Vec<u32>,
    free: Vec<u32>,
    primitives: Vec<Option<Primitive>>,
    tags: Vec<Option<AnnotationTag>>,
    visibility: Vec<Option<Visibility>>,
    live: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(
        &mut self,
        primitive: impl Into<Primitive>,
        tag: Option<AnnotationTag>,
    ) -> EntityId {
        let index = match self.free.pop() {
            Some(index) => index,
            None => {
                let index = self.generations.len() as u32;
                self.generations.push(0);
                self.primitives.push(None);
                self.tags.push(None);
                self.visibility.push(None);
                index
            }
        };
        let idx = index as usize;
        self.primitives[idx] = Some(primitive.into());
        self.tags[idx] = tag;
        self.visibility[idx] = None;
        self.live += 1;
        EntityId(Handle::new(index, self.generations[idx]))
    }

    /// Removes `entity`, returning its primitive if it was alive.
    pub fn despawn(&mut self, entity: EntityId) -> Option<Primitive> {
        if !self.is_alive(entity) {
            return None;
        }
        let idx = entity.index() as usize;
        let primitive = self.primitives[idx].take();
        self.tags[idx] = None;
        self.visibility[idx] = None;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free.push(entity.index());
        self.live -= 1;
        primitive
    }

    pub fn is_alive(&self, entity: EntityId) -> bool {
        let idx = entity.index() as usize;
        self.generations.get(idx) == Some(&entity.generation())
            && self.primitives.get(idx).is_some_and(|p| p.is_some())
    }

    pub fn primitive(&self, entity: EntityId) -> Option<&Primitive> {
        if !self.is_alive(entity) {
            return None;
        }
        self.primitives[entity.index() as usize].as_ref()
    }

    pub fn primitive_mut(&mut self, entity: EntityId) -> Option<&mut Primitive> {
        if !self.is_alive(entity) {
            return None;
        }
        self.primitives[entity.index() as usize].as_mut()
    }

    pub fn tag(&self, entity: EntityId) -> Option<AnnotationTag> {
        if !self.is_alive(entity) {
            return None;
        }
        self.tags[entity.index() as usize]
    }

    /// Replaces the text of a label entity. Returns `false` for anything
    /// that is not a live label.
    pub fn set_label_text(&mut self, entity: EntityId, text: impl Into<String>) -> bool {
        match self.primitive_mut(entity) {
            Some(Primitive::Label(label)) => {
                label.text = text.into();
                true
            }
            _ => false,
        }
    }

    pub fn set_visibility(&mut self, entity: EntityId, visibility: Visibility) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        self.visibility[entity.index() as usize] = Some(visibility);
        true
    }

    pub fn is_visible(&self, entity: EntityId) -> bool {
        self.is_alive(entity)
            && self.visibility[entity.index() as usize]
                .map(|v| v.visible)
                .unwrap_or(true)
    }

    /// Visible primitives in ascending index order.
    pub fn visible_primitives(&self) -> impl Iterator<Item = (EntityId, &Primitive)> + '_ {
        self.primitives
            .iter()
            .enumerate()
            .filter_map(move |(idx, primitive)| {
                let primitive = primitive.as_ref()?;
                let visible = self.visibility[idx].map(|v| v.visible).unwrap_or(true);
                if !visible {
                    return None;
                }
                Some((EntityId(Handle::new(idx as u32, self.generations[idx])), primitive))
            })
    }

    /// Live entities tagged with `group`, in ascending index order.
    pub fn entities_in_group(&self, group: GroupId) -> Vec<EntityId> {
        let mut out = Vec::new();
        for (idx, tag) in self.tags.iter().enumerate() {
            let Some(tag) = tag else { continue };
            if tag.group != group || self.primitives[idx].is_none() {
                continue;
            }
            out.push(EntityId(Handle::new(idx as u32, self.generations[idx])));
        }
        out
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Despawns everything. Generations survive so old handles stay stale.
    pub fn clear(&mut self) {
        for idx in 0..self.primitives.len() {
            if self.primitives[idx].is_some() {
                self.despawn(EntityId(Handle::new(idx as u32, self.generations[idx])));
            }
        }
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot::from_world(self)
    }
}
