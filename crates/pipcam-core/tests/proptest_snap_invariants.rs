//! Property-based invariant tests for CornerSnapController.
//!
//! 1. Zone anchors are symmetric for any bounds large enough to hold them
//! 2. Anchors sit exactly `inset + half extent` from the edges
//! 3. `update_drag` keeps the center inside the reference area for any input
//! 4. An item placed on an anchor reports that anchor's corner
//! 5. Arbitrary pan sequences never panic and leave the center in bounds
//! 6. An item larger than the bounds still keeps its center in the area

use pipcam_core::config::SnapConfig;
use pipcam_core::gesture::{PanEvent, PanTracker};
use pipcam_core::snap::{Corner, CornerSnapController, SnapAnimator};
use pipcam_core::{Point, Size, Vector};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

struct NullAnimator;

impl SnapAnimator for NullAnimator {
    fn animate_to(&mut self, _target: Point, _initial_velocity: Vector) {}
}

/// (inset, item size, bounds) with bounds > 2 * (inset + half extent).
fn roomy_layout() -> impl Strategy<Value = (f64, Size, Size)> {
    (0.0f64..60.0, 10.0f64..200.0, 10.0f64..200.0).prop_flat_map(|(inset, iw, ih)| {
        let min_w = 2.0 * (inset + iw / 2.0) + 1.0;
        let min_h = 2.0 * (inset + ih / 2.0) + 1.0;
        (
            Just(inset),
            Just(Size::new(iw, ih)),
            (min_w..min_w + 2_000.0, min_h..min_h + 2_000.0).prop_map(|(w, h)| Size::new(w, h)),
        )
    })
}

/// (inset, item size, bounds) where the item is wider or taller than
/// twice the bounds on at least one axis.
fn oversized_layout() -> impl Strategy<Value = (f64, Size, Size)> {
    (
        0.0f64..60.0,
        10.0f64..500.0,
        10.0f64..500.0,
        2.0f64..8.0,
        0.1f64..8.0,
        any::<bool>(),
    )
        .prop_map(|(inset, bw, bh, big, other, wide)| {
            let bounds = Size::new(bw, bh);
            let item = if wide {
                Size::new(bw * big, bh * other)
            } else {
                Size::new(bw * other, bh * big)
            };
            (inset, item, bounds)
        })
}

fn any_coordinate() -> impl Strategy<Value = f64> {
    prop_oneof![
        -10_000.0f64..10_000.0,
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
        Just(f64::MAX),
        Just(f64::MIN),
    ]
}

fn pan_strategy() -> impl Strategy<Value = PanEvent> {
    let point = (-1_000.0f64..3_000.0, -1_000.0f64..3_000.0).prop_map(|(x, y)| Point::new(x, y));
    let velocity =
        (-5_000.0f64..5_000.0, -5_000.0f64..5_000.0).prop_map(|(dx, dy)| Vector::new(dx, dy));
    prop_oneof![
        point.clone().prop_map(|location| PanEvent::Began { location }),
        point.prop_map(|location| PanEvent::Changed { location }),
        velocity.clone().prop_map(|velocity| PanEvent::Ended { velocity }),
        velocity.prop_map(|velocity| PanEvent::Cancelled { velocity }),
    ]
}

fn build(inset: f64, item: Size, bounds: Size) -> CornerSnapController {
    let config = SnapConfig {
        corner_inset: inset,
        ..SnapConfig::default()
    };
    let mut c = CornerSnapController::new(config, item, Point::new(item.width, item.height));
    c.set_reference_bounds(bounds.width, bounds.height);
    c
}

fn assert_in_bounds(center: Point, item: Size, bounds: Size) -> Result<(), TestCaseError> {
    let eps = 1e-9;
    prop_assert!(center.x >= item.width / 2.0 - eps, "x below range: {center:?}");
    prop_assert!(center.x <= bounds.width - item.width / 2.0 + eps, "x above range: {center:?}");
    prop_assert!(center.y >= item.height / 2.0 - eps, "y below range: {center:?}");
    prop_assert!(center.y <= bounds.height - item.height / 2.0 + eps, "y above range: {center:?}");
    Ok(())
}

fn assert_inside_area(center: Point, bounds: Size) -> Result<(), TestCaseError> {
    prop_assert!((0.0..=bounds.width).contains(&center.x), "x outside area: {center:?}");
    prop_assert!((0.0..=bounds.height).contains(&center.y), "y outside area: {center:?}");
    Ok(())
}

// ── Properties ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn anchors_are_symmetric((inset, item, bounds) in roomy_layout()) {
        let c = build(inset, item, bounds);
        let tl = c.position_for_corner(Corner::TopLeft);
        let bl = c.position_for_corner(Corner::BottomLeft);
        let tr = c.position_for_corner(Corner::TopRight);
        let br = c.position_for_corner(Corner::BottomRight);
        prop_assert_eq!(tl.x, bl.x);
        prop_assert_eq!(tr.x, br.x);
        prop_assert_eq!(tl.y, tr.y);
        prop_assert_eq!(bl.y, br.y);
    }

    #[test]
    fn anchors_are_inset_from_edges((inset, item, bounds) in roomy_layout()) {
        let c = build(inset, item, bounds);
        let dx = inset + item.width / 2.0;
        let dy = inset + item.height / 2.0;
        let tl = c.position_for_corner(Corner::TopLeft);
        let br = c.position_for_corner(Corner::BottomRight);
        prop_assert!((tl.x - dx).abs() < 1e-9);
        prop_assert!((tl.y - dy).abs() < 1e-9);
        prop_assert!((bounds.width - br.x - dx).abs() < 1e-9);
        prop_assert!((bounds.height - br.y - dy).abs() < 1e-9);
    }

    #[test]
    fn update_drag_stays_in_bounds(
        (inset, item, bounds) in roomy_layout(),
        x in any_coordinate(),
        y in any_coordinate(),
        ox in -500.0f64..500.0,
        oy in -500.0f64..500.0,
    ) {
        let mut c = build(inset, item, bounds);
        c.begin_drag();
        c.update_drag(Point::new(x, y), Vector::new(ox, oy));
        assert_in_bounds(c.center(), item, bounds)?;
    }

    #[test]
    fn anchor_reports_its_corner((inset, item, bounds) in roomy_layout(), idx in 0usize..4) {
        let mut c = build(inset, item, bounds);
        let corner = Corner::ALL[idx];
        c.set_center(c.position_for_corner(corner));
        prop_assert_eq!(c.current_corner(), Some(corner));
    }

    #[test]
    fn pan_sequences_never_escape(
        (inset, item, bounds) in roomy_layout(),
        events in proptest::collection::vec(pan_strategy(), 0..64),
    ) {
        let mut c = build(inset, item, bounds);
        let mut tracker = PanTracker::new();
        let mut animator = NullAnimator;
        let mut moved = false;
        for event in events {
            tracker.process(event, &mut c, &mut animator);
            moved |= matches!(event, PanEvent::Changed { .. }) && tracker.is_dragging();
        }
        if moved {
            assert_in_bounds(c.center(), item, bounds)?;
        }
        if !tracker.is_dragging() && moved {
            prop_assert!(c.target_corner().is_some());
        }
    }

    #[test]
    fn oversized_item_center_stays_in_area(
        (inset, item, bounds) in oversized_layout(),
        x in any_coordinate(),
        y in any_coordinate(),
        ox in -500.0f64..500.0,
        oy in -500.0f64..500.0,
    ) {
        let mut c = build(inset, item, bounds);
        c.begin_drag();
        c.update_drag(Point::new(x, y), Vector::new(ox, oy));
        assert_inside_area(c.center(), bounds)?;
    }

    #[test]
    fn oversized_pan_sequences_stay_in_area(
        (inset, item, bounds) in oversized_layout(),
        events in proptest::collection::vec(pan_strategy(), 0..64),
    ) {
        let mut c = build(inset, item, bounds);
        let mut tracker = PanTracker::new();
        let mut animator = NullAnimator;
        let mut moved = false;
        for event in events {
            tracker.process(event, &mut c, &mut animator);
            moved |= matches!(event, PanEvent::Changed { .. }) && tracker.is_dragging();
        }
        if moved {
            assert_inside_area(c.center(), bounds)?;
        }
    }
}
