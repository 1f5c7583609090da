#![forbid(unsafe_code)]

//! Scenario files and the reports produced by replaying them.
//!
//! Scenarios are JSON. A drag scenario lists [`PanEvent`]s against a screen;
//! a session scenario lists [`SessionEvent`]s against a simulated device.
//! Missing fields fall back to a stock device and default events.

use std::path::Path;

use pipcam_core::gesture::PanOutcome;
use pipcam_core::monitor::{MonitorReaction, SessionStatus, SetupResult};
use pipcam_core::snap::{BoundsTransition, SnapState, Zone};
use pipcam_core::{
    Corner, PanEvent, PanTracker, PipConfig, Point, PreviewLayout, SessionCostReducer,
    SessionEvent, SessionMonitor, Size,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::sim::{Animation, DeviceSpec, DeviceState, RecordingAnimator, SimulatedSession};

/// Read and decode a JSON scenario file.
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).map_err(|source| HarnessError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HarnessError::Scenario {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_screen(screen: Size) -> Result<()> {
    if screen.is_valid() && !screen.is_empty() {
        Ok(())
    } else {
        Err(HarnessError::invalid_argument(format!(
            "screen must be positive and finite, got {}x{}",
            screen.width, screen.height
        )))
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CornerZone {
    pub corner: Corner,
    pub zone: Zone,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayoutReport {
    pub layout: PreviewLayout,
    pub zones: Vec<CornerZone>,
}

/// Preview size, inset and corner zones for one screen.
pub fn run_layout(screen: Size, config: &PipConfig) -> Result<LayoutReport> {
    validate_screen(screen)?;
    let layout = PreviewLayout::for_screen(screen, &config.preview);
    let controller = layout.controller(&config.snap);
    let zones = Corner::ALL
        .into_iter()
        .map(|corner| CornerZone {
            corner,
            zone: controller.zone(corner),
        })
        .collect();
    Ok(LayoutReport { layout, zones })
}

// ---------------------------------------------------------------------------
// Drag
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DragScenario {
    pub screen: Size,
    /// Corner the preview rests in before the first event.
    #[serde(default)]
    pub start_corner: Option<Corner>,
    pub events: Vec<PanEvent>,
    /// Screen size to rotate to after the events, if any.
    #[serde(default)]
    pub rotate_to: Option<Size>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragStep {
    pub event: PanEvent,
    pub outcome: PanOutcome,
    pub center: Point,
    pub state: SnapState,
    pub corner: Option<Corner>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RotationRecord {
    pub screen: Size,
    /// `None` when the preview was not resting in a corner.
    pub transition: Option<BoundsTransition>,
    pub completed: bool,
    pub center: Point,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragReport {
    pub layout: PreviewLayout,
    pub steps: Vec<DragStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotation: Option<RotationRecord>,
    pub final_corner: Option<Corner>,
}

/// Replay pan events against a preview on `scenario.screen`.
///
/// The animator lands instantly: after each release the preview is placed
/// on the requested anchor before the next event.
pub fn run_drag(scenario: &DragScenario, config: &PipConfig) -> Result<DragReport> {
    validate_screen(scenario.screen)?;
    let layout = PreviewLayout::for_screen(scenario.screen, &config.preview);
    let mut controller = layout.controller(&config.snap);
    if let Some(corner) = scenario.start_corner {
        controller.set_center(controller.position_for_corner(corner));
    }

    let mut tracker = PanTracker::new();
    let mut animator = RecordingAnimator::new();
    let mut steps = Vec::with_capacity(scenario.events.len());

    for &event in &scenario.events {
        let outcome = tracker.process(event, &mut controller, &mut animator);
        let animation = animator.drain().pop();
        if let Some(animation) = animation {
            controller.set_center(animation.target);
        }
        steps.push(DragStep {
            event,
            outcome,
            center: controller.center(),
            state: controller.state(),
            corner: controller.current_corner(),
            animation,
        });
    }

    let rotation = match scenario.rotate_to {
        Some(screen) => {
            validate_screen(screen)?;
            let rotated = PreviewLayout::for_screen(screen, &config.preview);
            controller.set_item_size(rotated.item);
            let transition = controller.begin_bounds_transition(screen);
            let completed = transition
                .as_ref()
                .is_some_and(|t| controller.complete_bounds_transition(t));
            Some(RotationRecord {
                screen,
                transition,
                completed,
                center: controller.center(),
            })
        }
        None => None,
    };

    tracing::info!(
        steps = steps.len(),
        final_corner = ?controller.current_corner(),
        "drag scenario replayed"
    );

    Ok(DragReport {
        layout,
        steps,
        rotation,
        final_corner: controller.current_corner(),
    })
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

fn default_setup() -> SetupResult {
    SetupResult::Success
}

fn default_session_events() -> Vec<SessionEvent> {
    vec![SessionEvent::RunningChanged(true), SessionEvent::CostsChanged]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionScenario {
    #[serde(default = "DeviceSpec::stock")]
    pub device: DeviceSpec,
    #[serde(default = "default_setup")]
    pub setup: SetupResult,
    #[serde(default = "default_session_events")]
    pub events: Vec<SessionEvent>,
}

impl Default for SessionScenario {
    fn default() -> Self {
        Self {
            device: DeviceSpec::stock(),
            setup: default_setup(),
            events: default_session_events(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStep {
    pub event: SessionEvent,
    pub reaction: MonitorReaction,
    pub status: SessionStatus,
    pub device: DeviceState,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionReport {
    pub initial: DeviceState,
    pub steps: Vec<SessionStep>,
    pub within_limits: bool,
}

/// Replay session events through a [`SessionMonitor`] over a simulated
/// device.
pub fn run_session(scenario: &SessionScenario, config: &PipConfig) -> Result<SessionReport> {
    let session = SimulatedSession::new(&scenario.device);
    let reducer = SessionCostReducer::new(config.cost);
    let mut monitor = SessionMonitor::new(reducer.clone());
    monitor.record_setup(scenario.setup);

    let initial = session.state();
    let steps = scenario
        .events
        .iter()
        .map(|&event| {
            let reaction = monitor.handle(event, &session);
            SessionStep {
                event,
                reaction,
                status: monitor.status(),
                device: session.state(),
            }
        })
        .collect();

    let within_limits = reducer.exceeded(&session).is_empty();
    tracing::info!(within_limits, "session scenario replayed");

    Ok(SessionReport {
        initial,
        steps,
        within_limits,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipcam_core::{ReductionOutcome, Vector};

    #[test]
    fn layout_for_phone_screen() {
        let report = run_layout(Size::new(390.0, 844.0), &PipConfig::default()).unwrap();
        assert_eq!(report.layout.item, Size::new(126.0, 180.0));
        assert!((report.layout.corner_inset - 37.8).abs() < 1e-9);
        assert_eq!(report.zones.len(), 4);
        assert_eq!(report.zones[0].corner, Corner::TopLeft);
        assert!((report.zones[0].zone.anchor.x - (37.8 + 63.0)).abs() < 1e-9);
    }

    #[test]
    fn layout_rejects_empty_screen() {
        let err = run_layout(Size::new(0.0, 844.0), &PipConfig::default()).unwrap_err();
        assert!(matches!(err, HarnessError::InvalidArgument { .. }));
    }

    #[test]
    fn fling_to_bottom_right() {
        let scenario = DragScenario {
            screen: Size::new(390.0, 844.0),
            start_corner: None,
            events: vec![
                PanEvent::Began {
                    location: Point::new(100.0, 100.0),
                },
                PanEvent::Changed {
                    location: Point::new(300.0, 700.0),
                },
                PanEvent::Ended {
                    velocity: Vector::new(50.0, 50.0),
                },
            ],
            rotate_to: None,
        };
        let report = run_drag(&scenario, &PipConfig::default()).unwrap();
        assert_eq!(report.steps.len(), 3);
        assert_eq!(report.steps[0].state, SnapState::Idle);
        assert_eq!(report.steps[0].corner, None);
        assert_eq!(
            report.steps[2].outcome,
            PanOutcome::Released(Some(Corner::BottomRight))
        );
        let landed = report.steps[2].animation.expect("release animates");
        assert_eq!(report.steps[2].center, landed.target);
        assert_eq!(report.final_corner, Some(Corner::BottomRight));
    }

    #[test]
    fn rotation_keeps_the_corner() {
        let scenario = DragScenario {
            screen: Size::new(390.0, 844.0),
            start_corner: Some(Corner::BottomLeft),
            events: Vec::new(),
            rotate_to: Some(Size::new(844.0, 390.0)),
        };
        let report = run_drag(&scenario, &PipConfig::default()).unwrap();
        let rotation = report.rotation.expect("rotation recorded");
        assert!(rotation.completed);
        assert_eq!(rotation.transition.map(|t| t.corner), Some(Corner::BottomLeft));
        assert_eq!(report.final_corner, Some(Corner::BottomLeft));
        assert!((rotation.center.y - (390.0 - 37.8 - 90.0)).abs() < 1e-9);
    }

    #[test]
    fn stock_session_resolves_on_first_cost_event() {
        let report = run_session(&SessionScenario::default(), &PipConfig::default()).unwrap();
        assert!(report.within_limits);
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].status, SessionStatus::Running);
        match &report.steps[1].reaction {
            MonitorReaction::Reduced(r) => assert_eq!(r.outcome, ReductionOutcome::Resolved),
            other => panic!("expected a reduction, got {other:?}"),
        }
    }

    #[test]
    fn failed_setup_ignores_events() {
        let scenario = SessionScenario {
            setup: SetupResult::MultiCamNotSupported,
            ..SessionScenario::default()
        };
        let report = run_session(&scenario, &PipConfig::default()).unwrap();
        assert!(report.steps.iter().all(|s| s.reaction == MonitorReaction::None));
        assert!(!report.within_limits);
        assert_eq!(report.initial, report.steps[1].device);
    }

    #[test]
    fn scenario_defaults_from_empty_object() {
        let scenario: SessionScenario = serde_json::from_str("{}").unwrap();
        assert_eq!(scenario, SessionScenario::default());
    }
}
