#![forbid(unsafe_code)]

//! Sticky-corner snapping for a draggable overlay.
//!
//! [`CornerSnapController`] keeps one overlay (the [`TrackedItem`]) inside a
//! reference area and decides which of four corner [`Zone`]s it rests in.
//! The controller never simulates motion. When the item is released it picks
//! a corner and hands `(anchor, release velocity)` to a [`SnapAnimator`],
//! which owns the spring/collision physics.
//!
//! # Zones
//!
//! With `dx = inset + item.width / 2` and `dy = inset + item.height / 2`,
//! the anchors are `(dx, dy)`, `(dx, h - dy)`, `(w - dx, dy)` and
//! `(w - dx, h - dy)`. Each zone's region is a rectangle of
//! `(w - 2dx, h - 2dy)` centered on its anchor, so the four regions cover the
//! four quadrants and touch along the center lines.
//!
//! # Invariants
//!
//! 1. Anchors are inset from every edge by `inset + half extent`.
//! 2. `update_drag` never places the center outside
//!    `[half_w, w - half_w] x [half_h, h - half_h]`.
//! 3. Corner lookup is deterministic: regions that share an edge resolve in
//!    [`Corner::ALL`] order (TopLeft, BottomLeft, TopRight, BottomRight).
//! 4. Once settled with bounds known, the controller always has a target
//!    corner.
//!
//! # Failure Modes
//!
//! - Zero-area, negative or non-finite bounds are ignored and the previous
//!   zones are kept.
//! - `current_corner` returns `None` while tracking is disabled, before any
//!   bounds were set, or when the item sits outside every region (for
//!   example, halfway through an animated resize).

use serde::{Deserialize, Serialize};

use crate::config::SnapConfig;
use crate::geometry::{Point, Size, Vector, clamp_item_center};

/// One of the four resting zones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Corner {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Corner {
    /// All corners in lookup (tie-break) order.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::BottomLeft,
        Corner::TopRight,
        Corner::BottomRight,
    ];

    /// Position in [`Corner::ALL`].
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::TopLeft => 0,
            Self::BottomLeft => 1,
            Self::TopRight => 2,
            Self::BottomRight => 3,
        }
    }

    #[inline]
    const fn is_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::BottomLeft)
    }

    #[inline]
    const fn is_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::TopRight)
    }
}

/// Resting anchor plus containment region for one corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Zone {
    pub anchor: Point,
    /// Region size, centered on `anchor`.
    pub region: Size,
}

impl Zone {
    /// Check whether `p` lies in this zone's region.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        let local = p - self.anchor;
        self.region.contains_centered(Point::new(local.dx, local.dy))
    }
}

/// The draggable overlay.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackedItem {
    pub center: Point,
    pub size: Size,
}

/// Whether zone attraction is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapState {
    /// Tracking disabled (mid-drag, or during a bounds transition).
    Idle,
    /// Tracking enabled; the item rests in or moves toward a zone.
    Settled,
}

/// External physics that carries the item to rest.
pub trait SnapAnimator {
    /// Animate the item to `target`, starting with `initial_velocity`.
    fn animate_to(&mut self, target: Point, initial_velocity: Vector);
}

/// A resize in progress, returned by
/// [`CornerSnapController::begin_bounds_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundsTransition {
    pub corner: Corner,
    /// Anchor of `corner` in the new bounds.
    pub target: Point,
    #[serde(skip)]
    drag_generation: u64,
}

/// Sticky-corner state machine.
#[derive(Debug, Clone)]
pub struct CornerSnapController {
    config: SnapConfig,
    item: TrackedItem,
    bounds: Option<Size>,
    zones: [Zone; 4],
    state: SnapState,
    target_corner: Option<Corner>,
    drag_generation: u64,
}

impl CornerSnapController {
    /// Create a controller for an item of `item_size` centered at `center`.
    ///
    /// Tracking starts enabled; zones are unknown until the first
    /// [`set_reference_bounds`](Self::set_reference_bounds).
    #[must_use]
    pub fn new(config: SnapConfig, item_size: Size, center: Point) -> Self {
        Self {
            config,
            item: TrackedItem {
                center,
                size: item_size,
            },
            bounds: None,
            zones: [Zone::default(); 4],
            state: SnapState::Settled,
            target_corner: None,
            drag_generation: 0,
        }
    }

    /// Recompute the four zones for a reference area of `width x height`.
    ///
    /// Does not move the item. When settled, the target position follows the
    /// target corner's new anchor.
    pub fn set_reference_bounds(&mut self, width: f64, height: f64) {
        let size = Size::new(width, height);
        if !size.is_valid() || size.is_empty() {
            tracing::debug!(
                target: "pipcam.snap",
                width,
                height,
                "ignoring degenerate reference bounds"
            );
            return;
        }

        self.bounds = Some(size);
        self.rebuild_zones();

        if self.state == SnapState::Settled && self.target_corner.is_none() {
            self.target_corner = Some(self.locate(self.item.center));
        }

        tracing::debug!(
            target: "pipcam.snap",
            width,
            height,
            target_corner = ?self.target_corner,
            "reference bounds updated"
        );
    }

    /// Change the item size and recompute zones for the current bounds.
    pub fn set_item_size(&mut self, size: Size) {
        if !size.is_valid() {
            return;
        }
        self.item.size = size;
        if self.bounds.is_some() {
            self.rebuild_zones();
        }
    }

    /// Corner whose region contains the item center.
    #[must_use]
    pub fn current_corner(&self) -> Option<Corner> {
        if self.state == SnapState::Idle || self.bounds.is_none() {
            return None;
        }
        self.containing_corner(self.item.center)
    }

    /// Anchor point for `corner`. Meaningless before bounds are set.
    #[inline]
    #[must_use]
    pub fn position_for_corner(&self, corner: Corner) -> Point {
        self.zones[corner.index()].anchor
    }

    /// Zone data for `corner`.
    #[inline]
    #[must_use]
    pub fn zone(&self, corner: Corner) -> Zone {
        self.zones[corner.index()]
    }

    /// Start a drag. Disables zone attraction.
    pub fn begin_drag(&mut self) {
        self.drag_generation = self.drag_generation.wrapping_add(1);
        self.state = SnapState::Idle;
    }

    /// Move the item to `raw_position - drag_start_offset`, clamped into the
    /// reference area. The center never leaves the reference rectangle, even
    /// for an item larger than the bounds.
    pub fn update_drag(&mut self, raw_position: Point, drag_start_offset: Vector) {
        let desired = raw_position - drag_start_offset;
        let Some(bounds) = self.bounds else {
            self.item.center = desired;
            return;
        };

        self.item.center = clamp_item_center(desired, self.item.size, bounds);
    }

    /// Release the item. Re-enables tracking, picks the target corner, and
    /// hands the anchor and velocity to `animator`.
    ///
    /// Returns `None` (and does not animate) before bounds are known.
    pub fn end_drag<A: SnapAnimator + ?Sized>(
        &mut self,
        release_velocity: Vector,
        animator: &mut A,
    ) -> Option<Corner> {
        self.state = SnapState::Settled;
        let bounds = self.bounds?;

        let velocity = if release_velocity.is_finite() {
            release_velocity
        } else {
            Vector::ZERO
        };
        let projected = self.project_release(velocity, bounds);
        let corner = self.locate(projected);
        self.target_corner = Some(corner);

        let anchor = self.position_for_corner(corner);
        tracing::debug!(
            target: "pipcam.snap",
            ?corner,
            anchor_x = anchor.x,
            anchor_y = anchor.y,
            velocity_x = velocity.dx,
            velocity_y = velocity.dy,
            "drag released"
        );
        animator.animate_to(anchor, velocity);
        Some(corner)
    }

    /// Enable or disable zone attraction.
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled {
            self.state = SnapState::Settled;
            if self.bounds.is_some() && self.target_corner.is_none() {
                self.target_corner = Some(self.locate(self.item.center));
            }
        } else {
            self.state = SnapState::Idle;
        }
    }

    /// Prepare for a reference-size change while keeping the current corner.
    ///
    /// Returns `None` when the item is not resting in any zone; the caller
    /// then leaves everything as is.
    pub fn begin_bounds_transition(&mut self, new_bounds: Size) -> Option<BoundsTransition> {
        let corner = self.current_corner()?;
        self.set_enabled(false);
        self.set_reference_bounds(new_bounds.width, new_bounds.height);
        self.target_corner = Some(corner);
        Some(BoundsTransition {
            corner,
            target: self.position_for_corner(corner),
            drag_generation: self.drag_generation,
        })
    }

    /// Finish a transition started by
    /// [`begin_bounds_transition`](Self::begin_bounds_transition).
    ///
    /// Returns `false` and leaves the item alone if a drag began meanwhile.
    pub fn complete_bounds_transition(&mut self, transition: &BoundsTransition) -> bool {
        if transition.drag_generation != self.drag_generation {
            tracing::debug!(target: "pipcam.snap", "bounds transition interrupted by drag");
            return false;
        }
        self.item.center = transition.target;
        self.target_corner = Some(transition.corner);
        self.set_enabled(true);
        true
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> SnapState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn item(&self) -> TrackedItem {
        self.item
    }

    #[inline]
    #[must_use]
    pub fn center(&self) -> Point {
        self.item.center
    }

    /// Place the item directly (presentation-layer write).
    pub fn set_center(&mut self, center: Point) {
        self.item.center = center;
    }

    #[inline]
    #[must_use]
    pub fn reference_bounds(&self) -> Option<Size> {
        self.bounds
    }

    #[inline]
    #[must_use]
    pub fn target_corner(&self) -> Option<Corner> {
        self.target_corner
    }

    /// Anchor the item is resting at or heading to.
    #[must_use]
    pub fn target_position(&self) -> Option<Point> {
        self.bounds?;
        self.target_corner.map(|c| self.position_for_corner(c))
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SnapConfig {
        &self.config
    }
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

impl CornerSnapController {
    fn rebuild_zones(&mut self) {
        let Some(bounds) = self.bounds else {
            return;
        };
        let dx = self.config.corner_inset + self.item.size.half_width();
        let dy = self.config.corner_inset + self.item.size.half_height();
        let region = Size::new(bounds.width - dx * 2.0, bounds.height - dy * 2.0);

        for corner in Corner::ALL {
            let x = if corner.is_left() { dx } else { bounds.width - dx };
            let y = if corner.is_top() { dy } else { bounds.height - dy };
            self.zones[corner.index()] = Zone {
                anchor: Point::new(x, y),
                region,
            };
        }
    }

    fn containing_corner(&self, p: Point) -> Option<Corner> {
        Corner::ALL
            .into_iter()
            .find(|corner| self.zones[corner.index()].contains(p))
    }

    /// Containing corner, falling back to the nearest anchor.
    fn locate(&self, p: Point) -> Corner {
        if let Some(corner) = self.containing_corner(p) {
            return corner;
        }
        let mut best = Corner::TopLeft;
        let mut best_distance = f64::INFINITY;
        for corner in Corner::ALL {
            let d = p.distance_to(self.position_for_corner(corner));
            if d < best_distance {
                best = corner;
                best_distance = d;
            }
        }
        best
    }

    /// Where a released item would coast to under exponential damping.
    fn project_release(&self, velocity: Vector, bounds: Size) -> Point {
        let dt = f64::from(self.config.throw_horizon_ms) / 1_000.0;
        let damping = self.config.throw_damping;
        let gain = if damping <= f64::EPSILON {
            dt
        } else {
            (1.0 - (-damping * dt).exp()) / damping
        };
        let projected = self.item.center + velocity.scaled(gain);
        clamp_item_center(projected, self.item.size, bounds)
    }
}
