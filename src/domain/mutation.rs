//! The mutation operations of the collection engine.
//!
//! Every operation is a pure function `&Snapshot -> Result<Snapshot>`:
//! it validates against the current snapshot, then builds and returns
//! a new one. Nothing is mutated in place, so a failed operation
//! leaves the caller's snapshot untouched (all-or-nothing) and any
//! sequence of operations can be replayed in tests.

use crate::{
    domain::{
        entity::{Attributes, Entity, EntityKind},
        snapshot::{order_key, Snapshot, ROOT_KEY},
    },
    error::{Result, TrellisError},
};

impl Snapshot {
    /// Adds a new entity at the end of `parent_id`'s children.
    ///
    /// `None` for `parent_id` addresses the root level, legal only
    /// for root kinds. A `title` of `None` falls back to the kind's
    /// default; an explicit empty or whitespace-only title is
    /// rejected. Caller-supplied attributes override the stamped
    /// defaults key by key.
    pub fn add_child(
        &self,
        parent_id: Option<&str>,
        kind: EntityKind,
        title: impl Into<Option<&'static str>>,
        attributes: Attributes,
    ) -> Result<(String, Snapshot)> {
        self.add_child_titled(parent_id, kind, title.into().map(String::from), attributes)
    }

    /// [`add_child`](Self::add_child) with an owned optional title,
    /// for callers that build titles at runtime.
    pub fn add_child_titled(
        &self,
        parent_id: Option<&str>,
        kind: EntityKind,
        title: Option<String>,
        attributes: Attributes,
    ) -> Result<(String, Snapshot)> {
        match parent_id {
            None => {
                if !kind.is_root() {
                    return Err(TrellisError::KindMismatch {
                        parent: ROOT_KEY.to_string(),
                        child: kind.to_string(),
                    });
                }
            }
            Some(pid) => {
                let parent = self
                    .entities
                    .get(pid)
                    .ok_or_else(|| TrellisError::ParentNotFound(pid.to_string()))?;
                if !parent.kind.allows_child(kind) {
                    return Err(TrellisError::KindMismatch {
                        parent: parent.kind.to_string(),
                        child: kind.to_string(),
                    });
                }
            }
        }

        let title = match title {
            Some(t) => {
                if t.trim().is_empty() {
                    return Err(TrellisError::EmptyTitle);
                }
                t
            }
            None => kind.default_title().to_string(),
        };

        let mut entity = Entity::new(kind, parent_id.map(str::to_string), title);
        entity.attributes.extend(attributes);
        let id = entity.id.clone();

        let mut next = self.clone();
        next.order
            .entry(order_key(parent_id).to_string())
            .or_default()
            .push(id.clone());
        next.entities.insert(id.clone(), entity);

        Ok((id, next))
    }

    /// Retitles an entity. Whitespace-only titles are rejected, not
    /// coerced; timestamps are untouched (a caller concern, layered
    /// on via [`update_attributes`](Self::update_attributes)).
    pub fn rename(&self, id: &str, new_title: &str) -> Result<Snapshot> {
        self.entity(id)?;
        if new_title.trim().is_empty() {
            return Err(TrellisError::EmptyTitle);
        }

        let mut next = self.clone();
        if let Some(entity) = next.entities.get_mut(id) {
            entity.title = new_title.to_string();
        }
        Ok(next)
    }

    /// Merges `partial` into an entity's attributes; keys not named
    /// are left untouched.
    pub fn update_attributes(&self, id: &str, partial: Attributes) -> Result<Snapshot> {
        self.entity(id)?;

        let mut next = self.clone();
        if let Some(entity) = next.entities.get_mut(id) {
            entity.attributes.extend(partial);
        }
        Ok(next)
    }

    /// Deletes an entity together with its entire descendant subtree.
    ///
    /// Removes every descendant record, every removed container's
    /// order list, and the entity's own slot in its parent's order
    /// list. The closure is computed over the order index.
    pub fn delete_subtree(&self, id: &str) -> Result<Snapshot> {
        let entity = self.entity(id)?;
        let parent_key = order_key(entity.parent_id.as_deref()).to_string();

        let mut doomed = Vec::new();
        let mut pending = vec![id.to_string()];
        while let Some(current) = pending.pop() {
            pending.extend(self.child_ids(Some(&current)).iter().cloned());
            doomed.push(current);
        }

        let mut next = self.clone();
        for victim in &doomed {
            next.entities.remove(victim);
            next.order.remove(victim);
        }
        if let Some(siblings) = next.order.get_mut(&parent_key) {
            siblings.retain(|sibling| sibling != id);
        }

        Ok(next)
    }

    /// Moves an entity to `new_index` within its current parent.
    ///
    /// The index is clamped to the valid range; moving to the current
    /// position is a no-op that returns the snapshot unchanged.
    pub fn move_within_parent(&self, id: &str, new_index: usize) -> Result<Snapshot> {
        let entity = self.entity(id)?;
        let key = order_key(entity.parent_id.as_deref()).to_string();
        let from = self.position_of(id)?;

        let len = self.child_ids(entity.parent_id.as_deref()).len();
        let to = new_index.min(len - 1);
        if to == from {
            return Ok(self.clone());
        }

        let mut next = self.clone();
        if let Some(siblings) = next.order.get_mut(&key) {
            let moved = siblings.remove(from);
            siblings.insert(to, moved);
        }
        Ok(next)
    }

    /// Index form of [`move_within_parent`](Self::move_within_parent),
    /// for callers that already hold positions (as drag event index
    /// lookups do). Delegates, so the two always agree.
    pub fn reorder_siblings(
        &self,
        parent_id: Option<&str>,
        from_index: usize,
        to_index: usize,
    ) -> Result<Snapshot> {
        let children = self.children(parent_id)?;
        let child = children.get(from_index).ok_or_else(|| {
            TrellisError::NotFound(format!(
                "{}[{}]",
                order_key(parent_id),
                from_index
            ))
        })?;

        self.move_within_parent(&child.id.clone(), to_index)
    }

    /// Moves an entity under a different parent, inserting at
    /// `new_index` (clamped to `0..=len`) in the target's order list.
    ///
    /// The target must exist and its kind must be able to contain the
    /// entity's kind, so a leaf can only move between column-level
    /// containers and a container between parents of its own family.
    /// A target equal to the current parent degrades to
    /// within-parent semantics: the entity is neither duplicated nor
    /// lost.
    pub fn move_across_parent(
        &self,
        id: &str,
        new_parent_id: &str,
        new_index: usize,
    ) -> Result<Snapshot> {
        let entity = self.entity(id)?;
        let target = self
            .entities
            .get(new_parent_id)
            .ok_or_else(|| TrellisError::NotFound(new_parent_id.to_string()))?;

        if !target.kind.allows_child(entity.kind) {
            return Err(TrellisError::KindMismatch {
                parent: target.kind.to_string(),
                child: entity.kind.to_string(),
            });
        }

        if entity.parent_id.as_deref() == Some(new_parent_id) {
            return self.move_within_parent(id, new_index);
        }

        let old_key = order_key(entity.parent_id.as_deref()).to_string();

        let mut next = self.clone();
        if let Some(siblings) = next.order.get_mut(&old_key) {
            siblings.retain(|sibling| sibling != id);
        }

        let destination = next.order.entry(new_parent_id.to_string()).or_default();
        let to = new_index.min(destination.len());
        destination.insert(to, id.to_string());

        if let Some(entity) = next.entities.get_mut(id) {
            entity.parent_id = Some(new_parent_id.to_string());
        }

        Ok(next)
    }
}
