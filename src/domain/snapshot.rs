use crate::{
    domain::entity::Entity,
    error::{Result, TrellisError},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Reserved order-index key under which root-level entities (those
/// with no parent) are ordered. Generated ids are kind-prefixed
/// uuids, so this can never collide with a real entity id.
pub const ROOT_KEY: &str = "root";

/// Maps an optional parent id to its order-index key.
pub fn order_key(parent_id: Option<&str>) -> &str {
    parent_id.unwrap_or(ROOT_KEY)
}

/// The full normalized state of a board hierarchy: a flat entity
/// store plus a per-parent ordered list of child ids.
///
/// This is the unit of persistence and is replaced wholesale on every
/// committed mutation; the mutation operations in
/// [`mutation`](crate::domain::mutation) never modify a snapshot in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub entities: HashMap<String, Entity>,
    pub order: HashMap<String, Vec<String>>,
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up an entity by id.
    pub fn entity(&self, id: &str) -> Result<&Entity> {
        self.entities
            .get(id)
            .ok_or_else(|| TrellisError::NotFound(id.to_string()))
    }

    /// Resolves the ordered children of a parent into full records.
    ///
    /// `None` addresses the conceptual root. A non-root parent that
    /// does not exist fails with `ParentNotFound`; a parent with no
    /// order list yet simply has no children.
    pub fn children(&self, parent_id: Option<&str>) -> Result<Vec<&Entity>> {
        if let Some(pid) = parent_id {
            if !self.entities.contains_key(pid) {
                return Err(TrellisError::ParentNotFound(pid.to_string()));
            }
        }

        let ids = self
            .order
            .get(order_key(parent_id))
            .map(Vec::as_slice)
            .unwrap_or_default();

        ids.iter().map(|id| self.entity(id)).collect()
    }

    /// The ordered child-id list for a parent, empty if none exist.
    pub fn child_ids(&self, parent_id: Option<&str>) -> &[String] {
        self.order
            .get(order_key(parent_id))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Position of `id` within its parent's order list.
    pub fn position_of(&self, id: &str) -> Result<usize> {
        let entity = self.entity(id)?;
        self.child_ids(entity.parent_id.as_deref())
            .iter()
            .position(|other| other == id)
            .ok_or_else(|| TrellisError::NotFound(id.to_string()))
    }

    /// Verifies the structural invariants of the snapshot:
    ///
    /// 1. every `parent_id` names an existing entity whose kind may
    ///    contain the child's kind, and only root kinds have no parent;
    /// 2. every order list is a permutation of exactly the ids whose
    ///    records name that parent (no duplicates, omissions, or
    ///    foreign ids), and every order key is the root key or a
    ///    container's id;
    /// 3. no title is empty or whitespace-only.
    ///
    /// Used by tests after every mutation; mutations themselves
    /// preserve these by construction.
    pub fn check_integrity(&self) -> Result<()> {
        for entity in self.entities.values() {
            if entity.title.trim().is_empty() {
                return Err(TrellisError::EmptyTitle);
            }

            match entity.parent_id.as_deref() {
                None => {
                    if !entity.kind.is_root() {
                        return Err(TrellisError::ParentNotFound(entity.id.clone()));
                    }
                }
                Some(pid) => {
                    let parent = self
                        .entities
                        .get(pid)
                        .ok_or_else(|| TrellisError::ParentNotFound(pid.to_string()))?;
                    if !parent.kind.allows_child(entity.kind) {
                        return Err(TrellisError::KindMismatch {
                            parent: parent.kind.to_string(),
                            child: entity.kind.to_string(),
                        });
                    }
                }
            }

            let listed = self
                .child_ids(entity.parent_id.as_deref())
                .iter()
                .filter(|id| *id == &entity.id)
                .count();
            if listed != 1 {
                return Err(TrellisError::NotFound(entity.id.clone()));
            }
        }

        for (key, ids) in &self.order {
            if key != ROOT_KEY {
                let owner = self
                    .entities
                    .get(key)
                    .ok_or_else(|| TrellisError::ParentNotFound(key.clone()))?;
                if !owner.kind.is_container() {
                    return Err(TrellisError::KindMismatch {
                        parent: owner.kind.to_string(),
                        child: "child list".to_string(),
                    });
                }
            }

            let mut seen = HashSet::new();
            for id in ids {
                if !seen.insert(id) {
                    return Err(TrellisError::NotFound(id.clone()));
                }
                let entity = self.entity(id)?;
                let expected = order_key(entity.parent_id.as_deref());
                if expected != key {
                    return Err(TrellisError::NotFound(id.clone()));
                }
            }
        }

        Ok(())
    }
}
