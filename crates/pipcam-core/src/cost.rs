#![forbid(unsafe_code)]

//! Capture-session cost mitigation ladder.
//!
//! [`SessionCostReducer::reduce_if_needed`] is a bounded fixed-point loop:
//!
//! 1. Read [`SessionCosts`] and derive the [`ExceededCosts`] flags.
//! 2. Pick the ladder for those flags (see [`ladder_for`]).
//! 3. Try each [`MitigationAction`] in order. After the first one that
//!    applies, go back to step 1, so relief short-circuits the rest.
//! 4. Stop when nothing is exceeded, when a whole ladder is not applicable,
//!    or after `max_reductions` successful actions.
//!
//! # Ladders
//!
//! | Exceeded                  | Ladder                                                    |
//! |---------------------------|-----------------------------------------------------------|
//! | system pressure           | res(front), ports, res(back), fps(front), fps(back)       |
//! | hardware                  | res(front), res(back), fps(front), fps(back)              |
//! | system pressure + hardware| same as hardware (no ports step)                          |
//!
//! The combined case deliberately matches the hardware ladder and skips the
//! port reduction.
//!
//! # Failure Modes
//!
//! Exhausting the ladder with costs still exceeded is not an error. It is
//! logged at `warn` and the session keeps running degraded.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::capture::{
    CameraSide, CaptureSession, CostMetrics, SessionCosts, reduce_frame_rate, reduce_input_ports,
    reduce_resolution,
};
use crate::config::CostConfig;

bitflags! {
    /// Which session costs are over their thresholds.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ExceededCosts: u8 {
        const SYSTEM_PRESSURE = 1 << 0;
        const HARDWARE        = 1 << 1;
    }
}

impl ExceededCosts {
    /// Flags for `costs` under the thresholds in `config`.
    #[must_use]
    pub fn from_costs(costs: SessionCosts, config: &CostConfig) -> Self {
        let mut exceeded = Self::empty();
        if costs.system_pressure > config.system_pressure_threshold {
            exceeded |= Self::SYSTEM_PRESSURE;
        }
        if costs.hardware > config.hardware_threshold {
            exceeded |= Self::HARDWARE;
        }
        exceeded
    }
}

/// One step on the mitigation ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "action", content = "side", rename_all = "snake_case")]
pub enum MitigationAction {
    ReduceResolution(CameraSide),
    ReduceInputPorts,
    ReduceFrameRate(CameraSide),
}

impl MitigationAction {
    /// Stable name for logs and reports.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ReduceResolution(CameraSide::Front) => "reduce_resolution_front",
            Self::ReduceResolution(CameraSide::Back) => "reduce_resolution_back",
            Self::ReduceInputPorts => "reduce_input_ports",
            Self::ReduceFrameRate(CameraSide::Front) => "reduce_frame_rate_front",
            Self::ReduceFrameRate(CameraSide::Back) => "reduce_frame_rate_back",
        }
    }

    /// Run the action. `true` means something was actually reduced.
    pub fn apply<S: CaptureSession + ?Sized>(self, session: &S, config: &CostConfig) -> bool {
        match self {
            Self::ReduceResolution(side) => reduce_resolution(session, side, config),
            Self::ReduceInputPorts => reduce_input_ports(session),
            Self::ReduceFrameRate(side) => reduce_frame_rate(session, side, config),
        }
    }
}

const SYSTEM_PRESSURE_LADDER: [MitigationAction; 5] = [
    MitigationAction::ReduceResolution(CameraSide::Front),
    MitigationAction::ReduceInputPorts,
    MitigationAction::ReduceResolution(CameraSide::Back),
    MitigationAction::ReduceFrameRate(CameraSide::Front),
    MitigationAction::ReduceFrameRate(CameraSide::Back),
];

const HARDWARE_LADDER: [MitigationAction; 4] = [
    MitigationAction::ReduceResolution(CameraSide::Front),
    MitigationAction::ReduceResolution(CameraSide::Back),
    MitigationAction::ReduceFrameRate(CameraSide::Front),
    MitigationAction::ReduceFrameRate(CameraSide::Back),
];

/// Prioritized actions for a combination of exceeded costs.
#[must_use]
pub fn ladder_for(exceeded: ExceededCosts) -> &'static [MitigationAction] {
    if exceeded.contains(ExceededCosts::HARDWARE) {
        &HARDWARE_LADDER
    } else if exceeded.contains(ExceededCosts::SYSTEM_PRESSURE) {
        &SYSTEM_PRESSURE_LADDER
    } else {
        &[]
    }
}

/// How a `reduce_if_needed` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReductionOutcome {
    /// Nothing was exceeded on entry.
    NotNeeded,
    /// At least one action ran and costs are now within limits.
    Resolved,
    /// Every ladder entry was not applicable while costs were exceeded.
    Exhausted { remaining: ExceededCosts },
    /// The successful-action budget ran out while costs were exceeded.
    ReductionLimit { remaining: ExceededCosts },
}

/// Record of one `reduce_if_needed` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionReport {
    /// Actions that applied, in order.
    pub applied: Vec<MitigationAction>,
    /// Every action invoked, applicable or not.
    pub attempts: usize,
    pub outcome: ReductionOutcome,
}

impl ReductionReport {
    /// Costs are within limits after the call.
    #[must_use]
    pub fn is_within_limits(&self) -> bool {
        matches!(
            self.outcome,
            ReductionOutcome::NotNeeded | ReductionOutcome::Resolved
        )
    }
}

/// Runs the mitigation ladder against a [`CaptureSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionCostReducer {
    config: CostConfig,
}

impl SessionCostReducer {
    #[must_use]
    pub fn new(config: CostConfig) -> Self {
        Self { config }
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Current exceeded flags for `session`.
    #[must_use]
    pub fn exceeded<S: CostMetrics + ?Sized>(&self, session: &S) -> ExceededCosts {
        ExceededCosts::from_costs(session.session_costs(), &self.config)
    }

    /// Apply ladder actions until costs are within limits or nothing more
    /// can be reduced.
    pub fn reduce_if_needed<S: CaptureSession + ?Sized>(&self, session: &S) -> ReductionReport {
        let span = tracing::debug_span!(
            "cost.reduce",
            attempts = tracing::field::Empty,
            applied = tracing::field::Empty,
        );
        let _guard = span.enter();

        let mut applied = Vec::new();
        let mut attempts = 0usize;

        let outcome = loop {
            let exceeded = self.exceeded(session);
            if exceeded.is_empty() {
                break if applied.is_empty() {
                    ReductionOutcome::NotNeeded
                } else {
                    ReductionOutcome::Resolved
                };
            }

            if applied.len() >= self.config.max_reductions {
                tracing::warn!(
                    target: "pipcam.cost",
                    remaining = ?exceeded,
                    max_reductions = self.config.max_reductions,
                    "reduction budget spent with costs still exceeded"
                );
                break ReductionOutcome::ReductionLimit {
                    remaining: exceeded,
                };
            }

            let mut progressed = false;
            for &action in ladder_for(exceeded) {
                attempts += 1;
                if action.apply(session, &self.config) {
                    tracing::debug!(
                        target: "pipcam.cost",
                        action = action.name(),
                        exceeded = ?exceeded,
                        "mitigation applied"
                    );
                    applied.push(action);
                    progressed = true;
                    break;
                }
            }

            if !progressed {
                tracing::warn!(
                    target: "pipcam.cost",
                    remaining = ?exceeded,
                    "unable to further reduce session cost"
                );
                break ReductionOutcome::Exhausted {
                    remaining: exceeded,
                };
            }
        };

        span.record("attempts", attempts as u64);
        span.record("applied", applied.len() as u64);

        ReductionReport {
            applied,
            attempts,
            outcome,
        }
    }
}
