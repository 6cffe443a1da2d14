//! Hold-to-drag gesture tracking and target-index computation

use std::time::{Duration, Instant};

/// How long the pointer must stay down before a drag starts.
///
/// A release before the threshold is a plain click, which is how the other
/// row controls (edit, delete, completion toggle) stay reachable.
pub const HOLD_THRESHOLD: Duration = Duration::from_millis(500);

/// Vertical bounding box of the currently-dragged item, in the same
/// coordinate space as the pointer position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemBounds {
    pub top: f64,
    pub bottom: f64,
}

impl ItemBounds {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Compute the target index for a drag step.
///
/// Pointer above the box midpoint with a previous sibling moves the item up
/// one slot; pointer below the midpoint (measured from the bottom edge) with
/// a next sibling moves it down one slot; anything else stays put. The
/// result is always within `[0, len - 1]`, one step away at most.
pub fn target_index(bounds: &ItemBounds, pointer_y: f64, current: usize, len: usize) -> usize {
    let half = bounds.height() / 2.0;

    if pointer_y < bounds.top + half && current > 0 {
        current - 1
    } else if pointer_y > bounds.bottom - half && current + 1 < len {
        current + 1
    } else {
        current
    }
}

/// How a pointer-up resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    /// Released before the hold threshold; no drag happened
    Click,
    /// Released after the hold matured; ends the drag
    DragEnd,
}

#[derive(Debug, Clone, Copy)]
enum HoldState {
    Idle,
    Holding { since: Instant },
    Dragging,
}

/// Tracks the hold timer for a single pointer interaction.
///
/// Timestamps are injected so the tracker never reads the wall clock.
#[derive(Debug)]
pub struct HoldTracker {
    state: HoldState,
}

impl HoldTracker {
    pub fn new() -> Self {
        Self {
            state: HoldState::Idle,
        }
    }

    /// Pointer pressed: start the hold timer
    pub fn pointer_down(&mut self, at: Instant) {
        self.state = HoldState::Holding { since: at };
    }

    /// Check whether the drag is active at `at`, promoting a matured hold.
    pub fn poll(&mut self, at: Instant) -> bool {
        match self.state {
            HoldState::Dragging => true,
            HoldState::Holding { since } if at.duration_since(since) >= HOLD_THRESHOLD => {
                self.state = HoldState::Dragging;
                true
            }
            _ => false,
        }
    }

    /// Pointer released: clears the hold timer if still pending and reports
    /// whether this ended a drag or was a plain click.
    pub fn pointer_up(&mut self, at: Instant) -> Release {
        let release = match self.state {
            HoldState::Dragging => Release::DragEnd,
            HoldState::Holding { since } if at.duration_since(since) >= HOLD_THRESHOLD => {
                Release::DragEnd
            }
            _ => Release::Click,
        };
        self.state = HoldState::Idle;
        release
    }

    /// Whether the hold has matured into a drag
    pub fn is_dragging(&self) -> bool {
        matches!(self.state, HoldState::Dragging)
    }

    /// Drop any tracking state (session teardown)
    pub fn reset(&mut self) {
        self.state = HoldState::Idle;
    }
}

impl Default for HoldTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn bounds() -> ItemBounds {
        // Row spanning y = 100..140, midpoint at 120
        ItemBounds {
            top: 100.0,
            bottom: 140.0,
        }
    }

    #[test]
    fn test_target_above_midpoint_moves_up() {
        assert_eq!(target_index(&bounds(), 110.0, 2, 5), 1);
    }

    #[test]
    fn test_target_below_midpoint_moves_down() {
        assert_eq!(target_index(&bounds(), 130.0, 2, 5), 3);
    }

    #[test]
    fn test_target_at_midpoint_stays() {
        assert_eq!(target_index(&bounds(), 120.0, 2, 5), 2);
    }

    #[test]
    fn test_no_previous_sibling_stays() {
        assert_eq!(target_index(&bounds(), 90.0, 0, 5), 0);
    }

    #[test]
    fn test_no_next_sibling_stays() {
        assert_eq!(target_index(&bounds(), 150.0, 4, 5), 4);
    }

    #[test]
    fn test_single_item_never_moves() {
        assert_eq!(target_index(&bounds(), 0.0, 0, 1), 0);
        assert_eq!(target_index(&bounds(), 500.0, 0, 1), 0);
    }

    #[test]
    fn test_hold_matures_after_threshold() {
        let mut hold = HoldTracker::new();
        let start = Instant::now();

        hold.pointer_down(start);
        assert!(!hold.poll(start + Duration::from_millis(499)));
        assert!(hold.poll(start + HOLD_THRESHOLD));
        assert!(hold.is_dragging());
    }

    #[test]
    fn test_release_before_threshold_is_click() {
        let mut hold = HoldTracker::new();
        let start = Instant::now();

        hold.pointer_down(start);
        assert_eq!(
            hold.pointer_up(start + Duration::from_millis(100)),
            Release::Click
        );
        assert!(!hold.is_dragging());
    }

    #[test]
    fn test_release_after_threshold_ends_drag() {
        let mut hold = HoldTracker::new();
        let start = Instant::now();

        hold.pointer_down(start);
        hold.poll(start + HOLD_THRESHOLD);
        assert_eq!(hold.pointer_up(start + HOLD_THRESHOLD), Release::DragEnd);
        assert!(!hold.is_dragging());
    }

    #[test]
    fn test_poll_without_pointer_down_is_inert() {
        let mut hold = HoldTracker::new();
        assert!(!hold.poll(Instant::now()));
    }
}
