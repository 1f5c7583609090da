#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pipcam_core::config::SnapConfig;
use pipcam_core::{CornerSnapController, PanEvent, PanTracker, Point, Size, SnapAnimator, Vector};

#[derive(Debug, Arbitrary)]
enum Op {
    Began(f64, f64),
    Changed(f64, f64),
    Ended(f64, f64),
    Cancelled(f64, f64),
    Resize(f64, f64),
    SetItem(f64, f64),
    Rotate(f64, f64, bool),
}

#[derive(Debug, Arbitrary)]
struct Input {
    inset: f64,
    item: (f64, f64),
    bounds: (f64, f64),
    ops: Vec<Op>,
}

struct Landing(Option<Point>);

impl SnapAnimator for Landing {
    fn animate_to(&mut self, target: Point, _initial_velocity: Vector) {
        self.0 = Some(target);
    }
}

fuzz_target!(|input: Input| {
    let config = SnapConfig {
        corner_inset: input.inset,
        ..SnapConfig::default()
    };
    let item = Size::new(input.item.0, input.item.1);
    let mut controller = CornerSnapController::new(config, item, Point::ZERO);
    controller.set_reference_bounds(input.bounds.0, input.bounds.1);

    let mut tracker = PanTracker::new();
    let mut animator = Landing(None);

    for op in input.ops.into_iter().take(256) {
        let event = match op {
            Op::Began(x, y) => Some(PanEvent::Began { location: Point::new(x, y) }),
            Op::Changed(x, y) => Some(PanEvent::Changed { location: Point::new(x, y) }),
            Op::Ended(dx, dy) => Some(PanEvent::Ended { velocity: Vector::new(dx, dy) }),
            Op::Cancelled(dx, dy) => Some(PanEvent::Cancelled { velocity: Vector::new(dx, dy) }),
            Op::Resize(w, h) => {
                controller.set_reference_bounds(w, h);
                None
            }
            Op::SetItem(w, h) => {
                controller.set_item_size(Size::new(w, h));
                None
            }
            Op::Rotate(w, h, interrupt) => {
                if let Some(transition) = controller.begin_bounds_transition(Size::new(w, h)) {
                    if interrupt {
                        controller.begin_drag();
                        assert!(!controller.complete_bounds_transition(&transition));
                        tracker.reset();
                        controller.set_enabled(true);
                    } else {
                        assert!(controller.complete_bounds_transition(&transition));
                    }
                }
                None
            }
        };
        if let Some(event) = event {
            let _ = tracker.process(event, &mut controller, &mut animator);
        }
        if let Some(target) = animator.0.take() {
            controller.set_center(target);
        }
        // Corner lookup must never panic, whatever the geometry.
        let _ = controller.current_corner();
    }
});
