// Forbid unsafe in production; deny in tests.
#![cfg_attr(not(test), forbid(unsafe_code))]
#![cfg_attr(test, deny(unsafe_code))]

//! Core: sticky-corner snapping and capture-session cost mitigation.
//!
//! # Role in PiPCam
//! `pipcam-core` holds the decision logic of a picture-in-picture camera.
//! Everything platform-specific (camera hardware, physics, gesture
//! recognition, rendering) sits behind traits implemented elsewhere.
//!
//! # Primary responsibilities
//! - **CornerSnapController**: four corner zones, drag clamping, release
//!   targeting, resize transitions.
//! - **PanTracker**: pan events into controller calls.
//! - **PreviewLayout**: floating preview size and inset per screen.
//! - **SessionCostReducer**: the fixed-priority mitigation ladder.
//! - **SessionMonitor**: reactions to pushed session events.
//!
//! # How it fits in the system
//! The platform layer owns the capture session and the dynamics engine. It
//! implements [`capture::CaptureSession`] and [`snap::SnapAnimator`], feeds
//! [`gesture::PanEvent`]s and [`monitor::SessionEvent`]s in, and applies
//! the positions and reactions that come back. `pipcam-harness` does the same
//! against a simulated device.

pub mod capture;
pub mod config;
pub mod cost;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod monitor;
pub mod preview;
pub mod snap;

pub use capture::{
    CameraSide, CaptureSession, CostMetrics, FormatControl, FrameDuration, PortControl,
    SessionCosts, VideoFormat,
};
pub use config::PipConfig;
pub use cost::{
    ExceededCosts, MitigationAction, ReductionOutcome, ReductionReport, SessionCostReducer,
};
pub use error::{CaptureError, ConfigError};
pub use geometry::{Point, Size, Vector};
pub use gesture::{PanEvent, PanTracker};
pub use monitor::{SessionEvent, SessionMonitor};
pub use preview::PreviewLayout;
pub use snap::{Corner, CornerSnapController, SnapAnimator, SnapState};
