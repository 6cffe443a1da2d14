//! Reordering engine
//!
//! Translates a hold-and-drag pointer gesture over a rendered list into
//! reorder operations: compute the target index from the pointer position,
//! apply the move to the local list optimistically, and emit a persistence
//! request for the moved item's new absolute order. A failed persistence
//! call rolls the whole list back to the last externally-supplied snapshot.
//!
//! The engine is deterministic and I/O-free: timestamps and item bounds are
//! supplied by the caller, and persistence goes through the [`OrderStore`]
//! port. This keeps it testable and independent of any particular UI loop.

pub mod gesture;
pub mod list;

use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;

use crate::types::TrackerError;

pub use gesture::{target_index, HoldTracker, ItemBounds, Release, HOLD_THRESHOLD};
pub use list::OrderedList;

/// An entry the engine can reorder. Implemented by the client item types.
pub trait ListEntry {
    /// Opaque store-assigned identifier
    fn id(&self) -> &str;
}

/// Persistence port for order updates.
///
/// One call per applied move, carrying the moved item's identifier and the
/// absolute order value to store. Siblings are never renumbered.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn persist_order(&self, item_id: &str, new_order: f64) -> Result<(), TrackerError>;
}

/// An order-update request emitted after an optimistic move.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistOrder {
    pub item_id: String,
    pub new_order: f64,
}

/// A single drag interaction over an ordered list.
///
/// The session owns the optimistic list state and the hold/drag tracking for
/// one list. Drivers feed it pointer events and forward each emitted
/// [`PersistOrder`] to an [`OrderStore`], then report the outcome back via
/// [`DragSession::resolve_persist`]. In-flight calls are never cancelled;
/// whichever result is resolved last decides whether the list rolls back.
pub struct DragSession<T: ListEntry + Clone> {
    list: OrderedList<T>,
    hold: HoldTracker,
    drag_index: Option<usize>,
}

impl<T: ListEntry + Clone> DragSession<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            list: OrderedList::new(items),
            hold: HoldTracker::new(),
            drag_index: None,
        }
    }

    /// Replace the list with a fresh server-supplied snapshot.
    ///
    /// This is the only way the rollback snapshot advances; a successful
    /// persist does not. An active drag is abandoned since its index no
    /// longer refers to anything meaningful.
    pub fn sync(&mut self, items: Vec<T>) {
        self.detach();
        self.list.sync(items);
    }

    /// Current (possibly optimistic) list state
    pub fn items(&self) -> &[T] {
        self.list.items()
    }

    /// Pointer pressed on the item at `index`. Starts the hold timer.
    pub fn pointer_down(&mut self, index: usize, at: Instant) {
        if index >= self.list.len() {
            return;
        }
        self.drag_index = Some(index);
        self.hold.pointer_down(at);
    }

    /// Pointer moved while held.
    ///
    /// `bounds` is the bounding box of the currently-dragged item and
    /// `pointer_y` the pointer's vertical position. Returns the order-update
    /// request to persist when a move was applied, one position at a time.
    pub fn pointer_move(
        &mut self,
        pointer_y: f64,
        bounds: ItemBounds,
        at: Instant,
    ) -> Option<PersistOrder> {
        if !self.hold.poll(at) {
            return None;
        }

        let current = self.drag_index?;
        let target = target_index(&bounds, pointer_y, current, self.list.len());
        if target == current {
            return None;
        }

        if !self.list.apply_move(current, target) {
            return None;
        }
        self.drag_index = Some(target);

        let item_id = self.list.items()[target].id().to_string();
        debug!(from = current, to = target, item = %item_id, "Applied optimistic move");
        Some(PersistOrder {
            item_id,
            new_order: target as f64,
        })
    }

    /// Pointer released (or left the tracked area).
    ///
    /// Detaches move/up tracking and clears the hold timer if still pending.
    /// Returns whether this was a plain click or the end of a drag.
    pub fn pointer_up(&mut self, at: Instant) -> Release {
        let release = self.hold.pointer_up(at);
        self.drag_index = None;
        release
    }

    /// Report the outcome of a persistence call.
    ///
    /// On failure the optimistic list is discarded wholesale and replaced
    /// with the last externally-supplied snapshot. Returns true if a
    /// rollback happened.
    pub fn resolve_persist(&mut self, result: Result<(), TrackerError>) -> bool {
        match result {
            Ok(()) => false,
            Err(e) => {
                debug!("Order persistence failed, rolling back: {}", e);
                self.detach();
                self.list.rollback();
                true
            }
        }
    }

    /// Whether a drag is active (hold threshold elapsed, not yet released)
    pub fn is_dragging(&self) -> bool {
        self.hold.is_dragging()
    }

    fn detach(&mut self) {
        self.drag_index = None;
        self.hold.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[derive(Clone, Debug, PartialEq)]
    struct Entry(&'static str);

    impl ListEntry for Entry {
        fn id(&self) -> &str {
            self.0
        }
    }

    fn session() -> DragSession<Entry> {
        DragSession::new(vec![Entry("a"), Entry("b"), Entry("c")])
    }

    fn ids(session: &DragSession<Entry>) -> Vec<&str> {
        session.items().iter().map(|e| e.0).collect()
    }

    /// Row of height 20 at the given top edge
    fn row(top: f64) -> ItemBounds {
        ItemBounds {
            top,
            bottom: top + 20.0,
        }
    }

    fn after_hold(start: Instant) -> Instant {
        start + HOLD_THRESHOLD + Duration::from_millis(1)
    }

    #[test]
    fn test_release_before_threshold_is_a_click() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        let release = s.pointer_up(start + Duration::from_millis(100));

        assert_eq!(release, Release::Click);
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_move_before_threshold_does_nothing() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        // Pointer well above the row, but the hold has not matured yet
        let persist = s.pointer_move(0.0, row(20.0), start + Duration::from_millis(100));

        assert!(persist.is_none());
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_drag_up_one_step() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        let persist = s.pointer_move(5.0, row(20.0), after_hold(start));

        assert_eq!(
            persist,
            Some(PersistOrder {
                item_id: "b".into(),
                new_order: 0.0,
            })
        );
        assert_eq!(ids(&s), vec!["b", "a", "c"]);
        assert!(s.is_dragging());
    }

    #[test]
    fn test_pointer_within_midpoint_is_a_no_op() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        // Dead center of the dragged row: neither above nor below the midpoint
        let persist = s.pointer_move(30.0, row(20.0), after_hold(start));

        assert!(persist.is_none());
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_first_item_cannot_move_up() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(0, start);
        let persist = s.pointer_move(-50.0, row(0.0), after_hold(start));

        assert!(persist.is_none());
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_last_item_cannot_move_down() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(2, start);
        let persist = s.pointer_move(500.0, row(40.0), after_hold(start));

        assert!(persist.is_none());
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_continued_drag_moves_one_position_per_step() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(2, start);
        // Pointer far above the whole list: still only one step per move event
        let first = s.pointer_move(-100.0, row(40.0), after_hold(start));
        assert_eq!(first.map(|p| p.new_order), Some(1.0));
        assert_eq!(ids(&s), vec!["a", "c", "b"]);

        let second = s.pointer_move(-100.0, row(20.0), after_hold(start));
        assert_eq!(second.map(|p| p.new_order), Some(0.0));
        assert_eq!(ids(&s), vec!["c", "a", "b"]);

        // Already at the top; further moves are no-ops
        let third = s.pointer_move(-100.0, row(0.0), after_hold(start));
        assert!(third.is_none());
        assert_eq!(ids(&s), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_failed_persist_rolls_back_to_snapshot() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        let persist = s.pointer_move(5.0, row(20.0), after_hold(start));
        assert!(persist.is_some());
        assert_eq!(ids(&s), vec!["b", "a", "c"]);

        let rolled_back = s.resolve_persist(Err(TrackerError::Auth("Token has expired".into())));

        assert!(rolled_back);
        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_successful_persist_keeps_optimistic_state() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        s.pointer_move(5.0, row(20.0), after_hold(start));

        let rolled_back = s.resolve_persist(Ok(()));

        assert!(!rolled_back);
        assert_eq!(ids(&s), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_rollback_reverts_whole_drag_session_not_single_move() {
        let mut s = session();
        let start = Instant::now();

        // Two successful-looking optimistic moves, then the second one fails:
        // the list reverts to the pre-session snapshot, not the intermediate.
        s.pointer_down(2, start);
        s.pointer_move(-100.0, row(40.0), after_hold(start));
        s.resolve_persist(Ok(()));
        s.pointer_move(-100.0, row(20.0), after_hold(start));
        assert_eq!(ids(&s), vec!["c", "a", "b"]);

        s.resolve_persist(Err(TrackerError::Http("connection reset".into())));

        assert_eq!(ids(&s), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sync_advances_the_rollback_snapshot() {
        let mut s = session();
        s.sync(vec![Entry("x"), Entry("y")]);

        let start = Instant::now();
        s.pointer_down(1, start);
        s.pointer_move(5.0, row(20.0), after_hold(start));
        assert_eq!(ids(&s), vec!["y", "x"]);

        s.resolve_persist(Err(TrackerError::Internal("boom".into())));

        assert_eq!(ids(&s), vec!["x", "y"]);
    }

    mod driven {
        //! End-to-end drives of a session against a mock order store

        use super::{after_hold, row};
        use crate::client::types::GoalItem;
        use crate::db::schemas::GoalType;
        use crate::engine::{DragSession, OrderStore, PersistOrder};
        use crate::types::TrackerError;
        use async_trait::async_trait;
        use std::sync::Mutex;
        use std::time::Instant;

        fn goal(id: &str, title: &str, order: f64) -> GoalItem {
            GoalItem {
                id: id.into(),
                title: title.into(),
                completed: false,
                order,
                goal_type: GoalType::General,
            }
        }

        /// Records every persist call; fails when told to
        struct MockStore {
            calls: Mutex<Vec<PersistOrder>>,
            fail: bool,
        }

        impl MockStore {
            fn new(fail: bool) -> Self {
                Self {
                    calls: Mutex::new(Vec::new()),
                    fail,
                }
            }
        }

        #[async_trait]
        impl OrderStore for MockStore {
            async fn persist_order(
                &self,
                item_id: &str,
                new_order: f64,
            ) -> Result<(), TrackerError> {
                self.calls.lock().unwrap().push(PersistOrder {
                    item_id: item_id.to_string(),
                    new_order,
                });
                if self.fail {
                    Err(TrackerError::Auth("Token has expired".into()))
                } else {
                    Ok(())
                }
            }
        }

        /// Drag the second goal above the first and persist the move
        async fn drag_second_to_top(
            session: &mut DragSession<GoalItem>,
            store: &MockStore,
        ) -> bool {
            let start = Instant::now();
            session.pointer_down(1, start);
            let persist = session
                .pointer_move(5.0, row(20.0), after_hold(start))
                .expect("move should be applied");
            session.pointer_up(after_hold(start));

            let result = store.persist_order(&persist.item_id, persist.new_order).await;
            session.resolve_persist(result)
        }

        #[tokio::test]
        async fn test_reorder_persists_moved_item_only() {
            let store = MockStore::new(false);
            let mut session =
                DragSession::new(vec![goal("g1", "first", 0.0), goal("g2", "second", 1.0)]);

            let rolled_back = drag_second_to_top(&mut session, &store).await;

            assert!(!rolled_back);
            let titles: Vec<&str> = session.items().iter().map(|g| g.title.as_str()).collect();
            assert_eq!(titles, vec!["second", "first"]);

            // Exactly one call, for the moved item, with the absolute index
            let calls = store.calls.lock().unwrap();
            assert_eq!(
                *calls,
                vec![PersistOrder {
                    item_id: "g2".into(),
                    new_order: 0.0,
                }]
            );
        }

        #[tokio::test]
        async fn test_failed_reorder_reverts_to_server_list() {
            let store = MockStore::new(true);
            let mut session =
                DragSession::new(vec![goal("g1", "first", 0.0), goal("g2", "second", 1.0)]);

            let rolled_back = drag_second_to_top(&mut session, &store).await;

            assert!(rolled_back);
            let titles: Vec<&str> = session.items().iter().map(|g| g.title.as_str()).collect();
            assert_eq!(titles, vec!["first", "second"]);
        }
    }

    #[test]
    fn test_pointer_up_detaches_tracking() {
        let mut s = session();
        let start = Instant::now();

        s.pointer_down(1, start);
        s.pointer_move(5.0, row(20.0), after_hold(start));
        let release = s.pointer_up(after_hold(start));
        assert_eq!(release, Release::DragEnd);

        // Move events after release are ignored
        let persist = s.pointer_move(5.0, row(0.0), after_hold(start) + Duration::from_secs(1));
        assert!(persist.is_none());
        assert_eq!(ids(&s), vec!["b", "a", "c"]);
    }
}
