#![forbid(unsafe_code)]

//! Pan gesture handling for the floating preview.
//!
//! [`PanTracker`] converts a serialized stream of [`PanEvent`]s into
//! [`CornerSnapController`] calls:
//!
//! - `Began` captures the offset between the touch and the item center, then
//!   disables snapping.
//! - `Changed` moves the item, keeping that offset, clamped to the reference
//!   area.
//! - `Ended` / `Cancelled` re-enable snapping and hand the release velocity
//!   to the animator.
//!
//! # Invariants
//!
//! 1. `Changed`, `Ended` and `Cancelled` without a preceding `Began` are ignored.
//! 2. A second `Began` during a drag restarts the drag with a fresh offset.
//! 3. After `reset()` no drag is in progress.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Vector};
use crate::snap::{Corner, CornerSnapController, SnapAnimator};

/// Discrete pan recognizer output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum PanEvent {
    Began { location: Point },
    Changed { location: Point },
    Ended { velocity: Vector },
    Cancelled { velocity: Vector },
}

/// What a processed event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "corner", rename_all = "snake_case")]
pub enum PanOutcome {
    /// Event arrived outside a drag and was dropped.
    Ignored,
    DragStarted,
    Moved,
    /// Drag finished; carries the corner the item was sent to.
    Released(Option<Corner>),
}

/// Tracks one pan interaction at a time.
#[derive(Debug, Clone, Default)]
pub struct PanTracker {
    offset: Option<Vector>,
}

impl PanTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event.
    pub fn process<A: SnapAnimator + ?Sized>(
        &mut self,
        event: PanEvent,
        controller: &mut CornerSnapController,
        animator: &mut A,
    ) -> PanOutcome {
        match event {
            PanEvent::Began { location } => {
                self.offset = Some(location - controller.center());
                controller.begin_drag();
                PanOutcome::DragStarted
            }
            PanEvent::Changed { location } => match self.offset {
                Some(offset) => {
                    controller.update_drag(location, offset);
                    PanOutcome::Moved
                }
                None => PanOutcome::Ignored,
            },
            PanEvent::Ended { velocity } | PanEvent::Cancelled { velocity } => {
                if self.offset.take().is_none() {
                    return PanOutcome::Ignored;
                }
                PanOutcome::Released(controller.end_drag(velocity, animator))
            }
        }
    }

    /// Whether a drag is currently in progress.
    #[inline]
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.offset.is_some()
    }

    /// Forget any drag in progress without touching the controller.
    pub fn reset(&mut self) {
        self.offset = None;
    }
}
