use crate::{
    domain::{Attributes, EntityKind, Snapshot},
    error::Result,
    reporter::ErrorReporter,
    storage::Storage,
};

/// The single injected engine instance owned by the event loop.
///
/// Holds the current [`Snapshot`] as an immutable value that is
/// replaced wholesale on each committed mutation; failures are routed
/// to the [`ErrorReporter`] and leave the snapshot untouched. None of
/// the mutation entry points panic.
#[derive(Debug, Default)]
pub struct Engine {
    snapshot: Snapshot,
    reporter: ErrorReporter,
    dirty: bool,
}

impl Engine {
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            snapshot,
            reporter: ErrorReporter::new(),
            dirty: false,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn reporter(&self) -> &ErrorReporter {
        &self.reporter
    }

    pub fn reporter_mut(&mut self) -> &mut ErrorReporter {
        &mut self.reporter
    }

    /// Whether the snapshot has committed changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Replaces the snapshot wholesale. Used by the drag session to
    /// roll back provisional moves; the rollback itself needs
    /// persisting, since a save may have landed mid-session, so the
    /// snapshot is marked dirty.
    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.snapshot = snapshot;
        self.dirty = true;
    }

    fn commit(&mut self, result: Result<Snapshot>) -> bool {
        match result {
            Ok(next) => {
                self.snapshot = next;
                self.dirty = true;
                true
            }
            Err(err) => {
                self.reporter.report(err);
                false
            }
        }
    }

    /// Adds an entity at the end of the parent's children, returning
    /// its generated id on success.
    pub fn add_child(
        &mut self,
        parent_id: Option<&str>,
        kind: EntityKind,
        title: Option<String>,
        attributes: Attributes,
    ) -> Option<String> {
        match self.snapshot.add_child_titled(parent_id, kind, title, attributes) {
            Ok((id, next)) => {
                self.snapshot = next;
                self.dirty = true;
                Some(id)
            }
            Err(err) => {
                self.reporter.report(err);
                None
            }
        }
    }

    pub fn rename(&mut self, id: &str, new_title: &str) -> bool {
        let result = self.snapshot.rename(id, new_title);
        self.commit(result)
    }

    pub fn update_attributes(&mut self, id: &str, partial: Attributes) -> bool {
        let result = self.snapshot.update_attributes(id, partial);
        self.commit(result)
    }

    pub fn delete_subtree(&mut self, id: &str) -> bool {
        let result = self.snapshot.delete_subtree(id);
        self.commit(result)
    }

    pub fn move_within_parent(&mut self, id: &str, new_index: usize) -> bool {
        let result = self.snapshot.move_within_parent(id, new_index);
        self.commit(result)
    }

    pub fn move_across_parent(&mut self, id: &str, new_parent_id: &str, new_index: usize) -> bool {
        let result = self.snapshot.move_across_parent(id, new_parent_id, new_index);
        self.commit(result)
    }

    pub fn reorder_siblings(
        &mut self,
        parent_id: Option<&str>,
        from_index: usize,
        to_index: usize,
    ) -> bool {
        let result = self.snapshot.reorder_siblings(parent_id, from_index, to_index);
        self.commit(result)
    }

    /// Loads the persisted snapshot, if one exists. An absent
    /// snapshot leaves the current one in place; a failed load is
    /// reported and the in-memory snapshot stays authoritative.
    pub async fn load_from(&mut self, storage: &dyn Storage) -> bool {
        match storage.load().await {
            Ok(Some(snapshot)) => {
                self.snapshot = snapshot;
                self.dirty = false;
                true
            }
            Ok(None) => true,
            Err(err) => {
                self.reporter.report(err);
                false
            }
        }
    }

    /// Saves the current snapshot. A failure is reported, never
    /// retried here; the in-memory snapshot remains the source of
    /// truth either way.
    pub async fn persist(&mut self, storage: &dyn Storage) -> bool {
        match storage.save(&self.snapshot).await {
            Ok(()) => {
                self.dirty = false;
                true
            }
            Err(err) => {
                self.reporter.report(err);
                false
            }
        }
    }
}
