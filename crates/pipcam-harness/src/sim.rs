#![forbid(unsafe_code)]

//! Simulated capture device and animator.
//!
//! [`SimulatedSession`] implements the core capability traits over two
//! in-memory cameras. Costs are a linear function of the pixel rate each
//! camera produces, so every successful reduction visibly lowers them.
//! Cameras can be configured to refuse their configuration lock.

use std::cell::{Cell, RefCell};

use pipcam_core::capture::{
    CameraSide, CostMetrics, FormatControl, FrameDuration, PortControl, SessionCosts, VideoFormat,
};
use pipcam_core::error::CaptureError;
use pipcam_core::{Point, SnapAnimator, Vector};
use serde::{Deserialize, Serialize};

/// Pixel rate of one 1920x1080 stream at 30 fps.
const REFERENCE_PIXEL_RATE: f64 = 1920.0 * 1080.0 * 30.0;

/// One camera as described in a scenario file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraSpec {
    /// Offered formats, lowest quality first.
    pub formats: Vec<VideoFormat>,
    /// Index into `formats` of the initially active format.
    #[serde(default)]
    pub active: Option<usize>,
    #[serde(default = "default_frame_rate")]
    pub frame_rate: i32,
    /// Every configuration attempt fails.
    #[serde(default)]
    pub lock_fails: bool,
}

fn default_frame_rate() -> i32 {
    30
}

/// Weights turning stream load into session costs.
///
/// A camera's load is its pixel rate relative to 1080p30.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModel {
    pub hardware_per_load: f64,
    pub pressure_per_load: f64,
    /// Extra system pressure while the dual-camera input is attached.
    pub dual_camera_pressure: f64,
}

impl Default for CostModel {
    fn default() -> Self {
        Self {
            hardware_per_load: 0.55,
            pressure_per_load: 0.4,
            dual_camera_pressure: 0.3,
        }
    }
}

/// Device description: both cameras plus the cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceSpec {
    pub front: CameraSpec,
    pub back: CameraSpec,
    #[serde(default)]
    pub dual_camera: bool,
    #[serde(default)]
    pub cost_model: CostModel,
}

impl DeviceSpec {
    /// Both cameras at 1080p30 with the usual format ladder.
    #[must_use]
    pub fn stock() -> Self {
        let formats = vec![
            VideoFormat::new(640, 480, true),
            VideoFormat::new(1280, 720, true),
            VideoFormat::new(1920, 1080, true),
            VideoFormat::new(3840, 2160, false),
        ];
        let camera = CameraSpec {
            formats,
            active: Some(2),
            frame_rate: 30,
            lock_fails: false,
        };
        Self {
            front: camera.clone(),
            back: camera,
            dual_camera: true,
            cost_model: CostModel::default(),
        }
    }
}

#[derive(Debug)]
struct SimCamera {
    formats: Vec<VideoFormat>,
    active: Option<VideoFormat>,
    min_frame_duration: FrameDuration,
    lock_fails: bool,
}

impl SimCamera {
    fn from_spec(spec: &CameraSpec) -> Self {
        let active = match spec.active {
            Some(index) => spec.formats.get(index).copied(),
            None => spec.formats.last().copied(),
        };
        Self {
            formats: spec.formats.clone(),
            active,
            min_frame_duration: FrameDuration::new(1, spec.frame_rate),
            lock_fails: spec.lock_fails,
        }
    }

    fn load(&self) -> f64 {
        let Some(format) = self.active else {
            return 0.0;
        };
        let fps = self.min_frame_duration.frame_rate().unwrap_or(0.0);
        f64::from(format.width) * f64::from(format.height) * fps / REFERENCE_PIXEL_RATE
    }

    fn lock(&self, side: CameraSide) -> Result<(), CaptureError> {
        if self.lock_fails {
            return Err(CaptureError::ConfigurationLockFailed {
                side,
                reason: "simulated lock failure".into(),
            });
        }
        Ok(())
    }
}

/// Snapshot of one simulated camera, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub active: Option<VideoFormat>,
    pub frame_rate: Option<f64>,
}

/// Snapshot of the simulated device, for reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DeviceState {
    pub front: CameraState,
    pub back: CameraState,
    pub dual_camera: bool,
    pub costs: SessionCosts,
    /// Successful configuration changes so far.
    pub reconfigurations: u32,
}

/// In-memory capture session.
#[derive(Debug)]
pub struct SimulatedSession {
    front: RefCell<SimCamera>,
    back: RefCell<SimCamera>,
    dual_camera: Cell<bool>,
    cost_model: CostModel,
    reconfigurations: Cell<u32>,
}

impl SimulatedSession {
    #[must_use]
    pub fn new(spec: &DeviceSpec) -> Self {
        Self {
            front: RefCell::new(SimCamera::from_spec(&spec.front)),
            back: RefCell::new(SimCamera::from_spec(&spec.back)),
            dual_camera: Cell::new(spec.dual_camera),
            cost_model: spec.cost_model,
            reconfigurations: Cell::new(0),
        }
    }

    fn camera(&self, side: CameraSide) -> &RefCell<SimCamera> {
        match side {
            CameraSide::Front => &self.front,
            CameraSide::Back => &self.back,
        }
    }

    fn camera_state(&self, side: CameraSide) -> CameraState {
        let camera = self.camera(side).borrow();
        CameraState {
            active: camera.active,
            frame_rate: camera.min_frame_duration.frame_rate(),
        }
    }

    #[must_use]
    pub fn state(&self) -> DeviceState {
        DeviceState {
            front: self.camera_state(CameraSide::Front),
            back: self.camera_state(CameraSide::Back),
            dual_camera: self.dual_camera.get(),
            costs: self.session_costs(),
            reconfigurations: self.reconfigurations.get(),
        }
    }

    fn bump(&self) {
        self.reconfigurations.set(self.reconfigurations.get() + 1);
    }
}

impl CostMetrics for SimulatedSession {
    fn session_costs(&self) -> SessionCosts {
        let load = self.front.borrow().load() + self.back.borrow().load();
        let dual = if self.dual_camera.get() {
            self.cost_model.dual_camera_pressure
        } else {
            0.0
        };
        SessionCosts {
            system_pressure: load * self.cost_model.pressure_per_load + dual,
            hardware: load * self.cost_model.hardware_per_load,
        }
    }
}

impl FormatControl for SimulatedSession {
    fn formats(&self, side: CameraSide) -> Vec<VideoFormat> {
        self.camera(side).borrow().formats.clone()
    }

    fn active_format(&self, side: CameraSide) -> Option<VideoFormat> {
        self.camera(side).borrow().active
    }

    fn set_active_format(&self, side: CameraSide, format: VideoFormat) -> Result<(), CaptureError> {
        let mut camera = self.camera(side).borrow_mut();
        camera.lock(side)?;
        if !camera.formats.contains(&format) {
            return Err(CaptureError::FormatRejected {
                side,
                width: format.width,
                height: format.height,
            });
        }
        camera.active = Some(format);
        self.bump();
        Ok(())
    }

    fn min_frame_duration(&self, side: CameraSide) -> Option<FrameDuration> {
        Some(self.camera(side).borrow().min_frame_duration)
    }

    fn set_min_frame_duration(
        &self,
        side: CameraSide,
        duration: FrameDuration,
    ) -> Result<(), CaptureError> {
        let mut camera = self.camera(side).borrow_mut();
        camera.lock(side)?;
        camera.min_frame_duration = duration;
        self.bump();
        Ok(())
    }
}

impl PortControl for SimulatedSession {
    fn downgrade_to_single_camera(&self) -> Result<bool, CaptureError> {
        if !self.dual_camera.replace(false) {
            return Ok(false);
        }
        self.bump();
        Ok(true)
    }
}

/// One `animate_to` call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Animation {
    pub target: Point,
    pub initial_velocity: Vector,
}

/// Animator that records requests and lands instantly.
#[derive(Debug, Default)]
pub struct RecordingAnimator {
    animations: Vec<Animation>,
}

impl RecordingAnimator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the requests recorded since the last call.
    pub fn drain(&mut self) -> Vec<Animation> {
        std::mem::take(&mut self.animations)
    }
}

impl SnapAnimator for RecordingAnimator {
    fn animate_to(&mut self, target: Point, initial_velocity: Vector) {
        self.animations.push(Animation {
            target,
            initial_velocity,
        });
    }
}
