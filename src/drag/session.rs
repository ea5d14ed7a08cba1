use crate::{domain::Entity, domain::Snapshot, drag::ident::DragRef, engine::Engine};

/// State retained between a pick-up event and its matching drop or
/// abort.
#[derive(Debug)]
struct ActiveDrag {
    dragged: DragRef,
    /// The entity record at pick-up time, for the floating preview.
    entity: Entity,
    /// The snapshot as of pick-up, for rolling back provisional
    /// hover-time moves when the drop lands on no valid target.
    origin: Snapshot,
    hover_moved: bool,
}

/// Translates drag lifecycle events into engine calls.
///
/// Event identifiers arrive as composite-identifier strings (see
/// [`DragRef`]); anything unparseable or stale degrades to a no-op
/// rather than a crash. A drop with no valid target rolls back any
/// provisional hover-time move, restoring the pick-up snapshot.
#[derive(Debug, Default)]
pub struct DragSession {
    active: Option<ActiveDrag>,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The dragged entity as it looked at pick-up time, for rendering
    /// a floating preview.
    pub fn active_entity(&self) -> Option<&Entity> {
        self.active.as_ref().map(|drag| &drag.entity)
    }

    /// Starts a drag session for the entity named by `dragged`.
    ///
    /// Fails silently (no session) if the identifier cannot be parsed
    /// or resolved. A pick-up while another session is active first
    /// discards that session.
    pub fn pick_up(&mut self, engine: &mut Engine, dragged: &str) {
        if self.active.is_some() {
            self.abort(engine);
        }

        let Ok(reference) = dragged.parse::<DragRef>() else {
            return;
        };
        let Ok(entity) = engine.snapshot().entity(&reference.id) else {
            return;
        };

        self.active = Some(ActiveDrag {
            entity: entity.clone(),
            origin: engine.snapshot().clone(),
            dragged: reference,
            hover_moved: false,
        });
    }

    /// Handles a hover over a candidate target while dragging.
    ///
    /// Hovering over a container of a different parent that can
    /// legally hold the dragged entity provisionally moves it to the
    /// end of that container, so the UI previews the pending drop
    /// location. Same-parent and invalid targets are no-ops;
    /// same-parent reordering is resolved only on drop.
    pub fn hover(&mut self, engine: &mut Engine, target: &str) {
        let Some(active) = self.active.as_mut() else {
            return;
        };
        let Ok(target_ref) = target.parse::<DragRef>() else {
            return;
        };
        if target_ref.id == active.dragged.id {
            return;
        }

        let Ok(current) = engine.snapshot().entity(&active.dragged.id).cloned() else {
            return;
        };
        let Ok(target_entity) = engine.snapshot().entity(&target_ref.id).cloned() else {
            return;
        };

        if !target_entity.kind.allows_child(current.kind) {
            return;
        }
        if current.parent_id.as_deref() == Some(target_entity.id.as_str()) {
            return;
        }

        let end = engine.snapshot().child_ids(Some(&target_entity.id)).len();
        if engine.move_across_parent(&current.id, &target_entity.id, end) {
            active.hover_moved = true;
        }
    }

    /// Resolves the drop, then clears the session regardless of
    /// outcome.
    ///
    /// `None` means the item was released outside any target; any
    /// provisional hover move is rolled back in that case.
    pub fn drop_on(&mut self, engine: &mut Engine, target: Option<&str>) {
        let Some(active) = self.active.take() else {
            return;
        };

        let target_entity = target
            .and_then(|t| t.parse::<DragRef>().ok())
            .and_then(|r| engine.snapshot().entity(&r.id).ok().cloned());

        let Some(target_entity) = target_entity else {
            if active.hover_moved {
                engine.restore(active.origin);
            }
            return;
        };

        let Ok(current) = engine.snapshot().entity(&active.dragged.id).cloned() else {
            return;
        };

        let handled = if target_entity.id == current.id {
            // Released over itself; keep whatever hover arranged.
            true
        } else if current.kind.is_container() && target_entity.kind == current.kind {
            Self::reorder_onto_sibling(engine, &current, &target_entity)
        } else if !current.kind.is_container() && target_entity.kind.allows_child(current.kind) {
            if current.parent_id.as_deref() == Some(target_entity.id.as_str()) {
                // Hover already placed it in this container.
                true
            } else {
                let end = engine.snapshot().child_ids(Some(&target_entity.id)).len();
                engine.move_across_parent(&current.id, &target_entity.id, end)
            }
        } else if !current.kind.is_container() && !target_entity.kind.is_container() {
            if current.parent_id == target_entity.parent_id {
                Self::reorder_onto_sibling(engine, &current, &target_entity)
            } else {
                Self::insert_beside_leaf(engine, &current, &target_entity)
            }
        } else {
            false
        };

        if !handled && active.hover_moved {
            engine.restore(active.origin);
        }
    }

    /// Cancels the session (lost pointer capture, escape key),
    /// rolling back any provisional hover move.
    pub fn abort(&mut self, engine: &mut Engine) {
        if let Some(active) = self.active.take() {
            if active.hover_moved {
                engine.restore(active.origin);
            }
        }
    }

    /// Reorders `current` to `target`'s slot within their shared
    /// parent. Targets living under a different parent are not
    /// siblings, so nothing happens.
    fn reorder_onto_sibling(engine: &mut Engine, current: &Entity, target: &Entity) -> bool {
        let parent = current.parent_id.as_deref();
        let siblings = engine.snapshot().child_ids(parent);
        let from = siblings.iter().position(|id| id == &current.id);
        let to = siblings.iter().position(|id| id == &target.id);

        match (from, to) {
            (Some(from), Some(to)) if from != to => engine.reorder_siblings(parent, from, to),
            (Some(_), Some(_)) => true,
            _ => false,
        }
    }

    /// Moves a leaf into the parent of another leaf, at that leaf's
    /// position.
    fn insert_beside_leaf(engine: &mut Engine, current: &Entity, target: &Entity) -> bool {
        let Some(target_parent) = target.parent_id.as_deref() else {
            return false;
        };
        let Ok(index) = engine.snapshot().position_of(&target.id) else {
            return false;
        };

        engine.move_across_parent(&current.id, target_parent, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Attributes, EntityKind};

    struct Fixture {
        engine: Engine,
        column_x: String,
        column_y: String,
        task_t: String,
        task_u: String,
        task_v: String,
    }

    /// Board with columns X=[T, U] and Y=[V].
    fn fixture() -> Fixture {
        let mut engine = Engine::new(Snapshot::new());
        let board = engine
            .add_child(None, EntityKind::Board, None, Attributes::new())
            .unwrap();
        let column_x = engine
            .add_child(Some(&board), EntityKind::Column, Some("X".to_string()), Attributes::new())
            .unwrap();
        let column_y = engine
            .add_child(Some(&board), EntityKind::Column, Some("Y".to_string()), Attributes::new())
            .unwrap();
        let task_t = engine
            .add_child(Some(&column_x), EntityKind::Task, Some("T".to_string()), Attributes::new())
            .unwrap();
        let task_u = engine
            .add_child(Some(&column_x), EntityKind::Task, Some("U".to_string()), Attributes::new())
            .unwrap();
        let task_v = engine
            .add_child(Some(&column_y), EntityKind::Task, Some("V".to_string()), Attributes::new())
            .unwrap();

        Fixture {
            engine,
            column_x,
            column_y,
            task_t,
            task_u,
            task_v,
        }
    }

    fn task_ref(id: &str) -> String {
        format!("task:{}", id)
    }

    fn column_ref(id: &str) -> String {
        format!("column:{}", id)
    }

    #[test]
    fn test_pick_up_records_preview_entity() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));

        assert!(session.is_active());
        assert_eq!(session.active_entity().unwrap().title, "T");
    }

    #[test]
    fn test_pick_up_fails_silently_on_bad_identifier() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, "not-a-ref");
        assert!(!session.is_active());

        session.pick_up(&mut fx.engine, &task_ref("missing"));
        assert!(!session.is_active());
        assert!(fx.engine.reporter().last().is_none());
    }

    #[test]
    fn test_new_pick_up_discards_previous_session() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_y));

        // Second pick-up rolls the provisional move back first.
        session.pick_up(&mut fx.engine, &task_ref(&fx.task_u));

        assert_eq!(session.active_entity().unwrap().title, "U");
        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&fx.column_x)),
            &[fx.task_t.clone(), fx.task_u.clone()]
        );
    }

    #[test]
    fn test_hover_moves_provisionally_to_end_of_other_column() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_y));

        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&fx.column_y)),
            &[fx.task_v.clone(), fx.task_t.clone()]
        );
        assert_eq!(fx.engine.snapshot().child_ids(Some(&fx.column_x)), &[fx.task_u.clone()]);
    }

    #[test]
    fn test_hover_over_own_column_is_noop() {
        let mut fx = fixture();
        let mut session = DragSession::new();
        let before = fx.engine.snapshot().clone();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_x));

        assert_eq!(fx.engine.snapshot(), &before);
    }

    #[test]
    fn test_hover_over_invalid_target_is_noop() {
        let mut fx = fixture();
        let mut session = DragSession::new();
        let before = fx.engine.snapshot().clone();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        // A task cannot contain another task.
        session.hover(&mut fx.engine, &task_ref(&fx.task_v));
        session.hover(&mut fx.engine, "garbage");

        assert_eq!(fx.engine.snapshot(), &before);
        assert!(fx.engine.reporter().last().is_none());
    }

    #[test]
    fn test_drop_on_container_after_hover_does_not_duplicate() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_y));
        session.drop_on(&mut fx.engine, Some(&column_ref(&fx.column_y)));

        assert!(!session.is_active());
        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&fx.column_y)),
            &[fx.task_v.clone(), fx.task_t.clone()]
        );
        fx.engine.snapshot().check_integrity().unwrap();
    }

    #[test]
    fn test_drop_on_container_without_hover_moves_to_end() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.drop_on(&mut fx.engine, Some(&column_ref(&fx.column_y)));

        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&fx.column_y)),
            &[fx.task_v.clone(), fx.task_t.clone()]
        );
    }

    #[test]
    fn test_drop_outside_rolls_back_provisional_move() {
        let mut fx = fixture();
        let mut session = DragSession::new();
        let before = fx.engine.snapshot().clone();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_y));
        session.drop_on(&mut fx.engine, None);

        assert!(!session.is_active());
        assert_eq!(fx.engine.snapshot(), &before);
        fx.engine.snapshot().check_integrity().unwrap();
    }

    #[tokio::test]
    async fn test_rollback_after_mid_drag_persist_stays_dirty() {
        use crate::storage::{file_storage::FileStorage, Storage};
        use tempfile::TempDir;

        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::new(temp_dir.path());
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_y));

        // The provisional move is a commit, so a save can land here.
        assert!(fx.engine.persist(&storage).await);
        assert!(!fx.engine.is_dirty());

        session.drop_on(&mut fx.engine, None);

        // The rollback diverges from what is on disk; it must be
        // flagged for persisting or the cancelled move would
        // reappear on reload.
        assert!(fx.engine.is_dirty());
        assert!(fx.engine.persist(&storage).await);

        let reloaded = storage.load().await.unwrap().unwrap();
        assert_eq!(&reloaded, fx.engine.snapshot());
        assert_eq!(
            reloaded.entity(&fx.task_t).unwrap().parent_id.as_deref(),
            Some(fx.column_x.as_str())
        );
    }

    #[test]
    fn test_abort_rolls_back_provisional_move() {
        let mut fx = fixture();
        let mut session = DragSession::new();
        let before = fx.engine.snapshot().clone();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.hover(&mut fx.engine, &column_ref(&fx.column_y));
        session.abort(&mut fx.engine);

        assert!(!session.is_active());
        assert_eq!(fx.engine.snapshot(), &before);
    }

    #[test]
    fn test_drop_leaf_on_sibling_leaf_reorders() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.drop_on(&mut fx.engine, Some(&task_ref(&fx.task_u)));

        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&fx.column_x)),
            &[fx.task_u.clone(), fx.task_t.clone()]
        );
    }

    #[test]
    fn test_drop_leaf_on_foreign_leaf_inserts_at_its_index() {
        let mut fx = fixture();
        let mut session = DragSession::new();

        session.pick_up(&mut fx.engine, &task_ref(&fx.task_t));
        session.drop_on(&mut fx.engine, Some(&task_ref(&fx.task_v)));

        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&fx.column_y)),
            &[fx.task_t.clone(), fx.task_v.clone()]
        );
        assert_eq!(
            fx.engine
                .snapshot()
                .entity(&fx.task_t)
                .unwrap()
                .parent_id
                .as_deref(),
            Some(fx.column_y.as_str())
        );
        fx.engine.snapshot().check_integrity().unwrap();
    }

    #[test]
    fn test_drop_column_on_column_reorders_within_board() {
        let mut fx = fixture();
        let mut session = DragSession::new();
        let board = fx
            .engine
            .snapshot()
            .entity(&fx.column_x)
            .unwrap()
            .parent_id
            .clone()
            .unwrap();

        session.pick_up(&mut fx.engine, &column_ref(&fx.column_x));
        session.drop_on(&mut fx.engine, Some(&column_ref(&fx.column_y)));

        assert_eq!(
            fx.engine.snapshot().child_ids(Some(&board)),
            &[fx.column_y.clone(), fx.column_x.clone()]
        );
    }

    #[test]
    fn test_drop_without_pick_up_is_noop() {
        let mut fx = fixture();
        let mut session = DragSession::new();
        let before = fx.engine.snapshot().clone();

        session.drop_on(&mut fx.engine, Some(&column_ref(&fx.column_y)));

        assert_eq!(fx.engine.snapshot(), &before);
    }
}
