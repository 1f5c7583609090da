#![forbid(unsafe_code)]

//! Session event handling.
//!
//! The platform layer pushes typed [`SessionEvent`]s (cost changes, thermal
//! pressure, interruptions, runtime errors) into a [`SessionMonitor`]. The
//! monitor tracks session status and returns a [`MonitorReaction`] telling
//! the presentation layer what to do. Cost and pressure events run the
//! [`SessionCostReducer`] against the session passed in.
//!
//! Events are ignored until setup has been recorded as successful.

use serde::{Deserialize, Serialize};

use crate::capture::CaptureSession;
use crate::cost::{ReductionReport, SessionCostReducer};

/// Result of configuring the capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetupResult {
    Success,
    NotAuthorized,
    ConfigurationFailed,
    MultiCamNotSupported,
}

/// Thermal / power pressure reported by a capture device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PressureLevel {
    Nominal,
    Fair,
    Serious,
    Critical,
    /// The system stopped the session.
    Shutdown,
}

/// Why the session was interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptionReason {
    VideoDeviceNotAvailableInBackground,
    AudioDeviceInUseByAnotherClient,
    VideoDeviceInUseByAnotherClient,
    VideoDeviceNotAvailableWithMultipleForegroundApps,
    VideoDeviceNotAvailableDueToSystemPressure,
}

/// Events pushed by the capture collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum SessionEvent {
    /// Session costs may have changed; re-check them.
    CostsChanged,
    PressureChanged(PressureLevel),
    Interrupted(InterruptionReason),
    InterruptionEnded,
    RuntimeError { media_services_reset: bool },
    RunningChanged(bool),
}

/// Session status as seen by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum SessionStatus {
    NotConfigured,
    Running,
    Stopped,
    Interrupted(InterruptionReason),
    StoppedByPressure,
}

/// What the presentation layer should do after an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reaction", content = "report", rename_all = "snake_case")]
pub enum MonitorReaction {
    None,
    /// Cost mitigation ran.
    Reduced(ReductionReport),
    /// Offer a "resume" control.
    ShowResume,
    /// Tell the user the camera is unavailable.
    ShowCameraUnavailable,
    /// Dismiss interruption UI.
    HideInterruptionUi,
    /// Restart the session automatically.
    RestartSession,
    /// The system stopped the session due to pressure.
    SessionStopped,
}

/// Tracks session status and reacts to pushed events.
#[derive(Debug, Clone)]
pub struct SessionMonitor {
    reducer: SessionCostReducer,
    setup: Option<SetupResult>,
    status: SessionStatus,
    running: bool,
}

impl SessionMonitor {
    #[must_use]
    pub fn new(reducer: SessionCostReducer) -> Self {
        Self {
            reducer,
            setup: None,
            status: SessionStatus::NotConfigured,
            running: false,
        }
    }

    /// Record how session setup went.
    pub fn record_setup(&mut self, result: SetupResult) {
        self.setup = Some(result);
        self.status = match result {
            SetupResult::Success => SessionStatus::Stopped,
            _ => SessionStatus::NotConfigured,
        };
        if result != SetupResult::Success {
            tracing::warn!(target: "pipcam.monitor", ?result, "capture session setup failed");
        }
    }

    #[inline]
    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[inline]
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    #[must_use]
    pub fn setup(&self) -> Option<SetupResult> {
        self.setup
    }

    /// Handle one event.
    pub fn handle<S: CaptureSession + ?Sized>(
        &mut self,
        event: SessionEvent,
        session: &S,
    ) -> MonitorReaction {
        if self.setup != Some(SetupResult::Success) {
            tracing::debug!(
                target: "pipcam.monitor",
                ?event,
                "ignoring event before successful setup"
            );
            return MonitorReaction::None;
        }

        match event {
            SessionEvent::CostsChanged => {
                MonitorReaction::Reduced(self.reducer.reduce_if_needed(session))
            }
            SessionEvent::PressureChanged(level) => self.on_pressure(level, session),
            SessionEvent::Interrupted(reason) => {
                tracing::info!(
                    target: "pipcam.monitor",
                    ?reason,
                    "capture session was interrupted"
                );
                self.status = SessionStatus::Interrupted(reason);
                match reason {
                    InterruptionReason::VideoDeviceInUseByAnotherClient => {
                        MonitorReaction::ShowResume
                    }
                    InterruptionReason::VideoDeviceNotAvailableWithMultipleForegroundApps => {
                        MonitorReaction::ShowCameraUnavailable
                    }
                    _ => MonitorReaction::None,
                }
            }
            SessionEvent::InterruptionEnded => {
                tracing::info!(target: "pipcam.monitor", "capture session interruption ended");
                self.status = if self.running {
                    SessionStatus::Running
                } else {
                    SessionStatus::Stopped
                };
                MonitorReaction::HideInterruptionUi
            }
            SessionEvent::RuntimeError {
                media_services_reset,
            } => {
                tracing::error!(
                    target: "pipcam.monitor",
                    media_services_reset,
                    "capture session runtime error"
                );
                if media_services_reset && self.running {
                    MonitorReaction::RestartSession
                } else {
                    MonitorReaction::ShowResume
                }
            }
            SessionEvent::RunningChanged(running) => {
                self.running = running;
                match self.status {
                    SessionStatus::Interrupted(_) => {}
                    SessionStatus::StoppedByPressure if !running => {}
                    _ => {
                        self.status = if running {
                            SessionStatus::Running
                        } else {
                            SessionStatus::Stopped
                        };
                    }
                }
                MonitorReaction::None
            }
        }
    }

    fn on_pressure<S: CaptureSession + ?Sized>(
        &mut self,
        level: PressureLevel,
        session: &S,
    ) -> MonitorReaction {
        match level {
            PressureLevel::Shutdown => {
                tracing::warn!(
                    target: "pipcam.monitor",
                    "session stopped running due to system pressure level"
                );
                self.running = false;
                self.status = SessionStatus::StoppedByPressure;
                MonitorReaction::SessionStopped
            }
            PressureLevel::Serious | PressureLevel::Critical => {
                tracing::warn!(target: "pipcam.monitor", ?level, "elevated system pressure");
                MonitorReaction::Reduced(self.reducer.reduce_if_needed(session))
            }
            PressureLevel::Nominal | PressureLevel::Fair => MonitorReaction::None,
        }
    }
}
