#![forbid(unsafe_code)]

//! Capture-session capabilities and the reduction actions built on them.
//!
//! The core never touches camera hardware. A platform layer implements
//! [`CostMetrics`], [`FormatControl`] and [`PortControl`]; the functions here
//! decide *whether* and *how* to reduce, then call into those traits.
//!
//! Each reduction returns `true` only if it changed something. Capability
//! errors (including a failed configuration lock) are logged and reported as
//! `false`, so the mitigation ladder simply moves on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::CostConfig;
use crate::error::CaptureError;

/// Which camera an action targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraSide {
    Front,
    Back,
}

impl fmt::Display for CameraSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Front => f.write_str("front"),
            Self::Back => f.write_str("back"),
        }
    }
}

/// One capture format offered by a camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFormat {
    pub width: u32,
    pub height: u32,
    /// Usable while several cameras run at once.
    pub multi_cam_supported: bool,
}

impl VideoFormat {
    #[must_use]
    pub const fn new(width: u32, height: u32, multi_cam_supported: bool) -> Self {
        Self {
            width,
            height,
            multi_cam_supported,
        }
    }
}

/// Rational frame duration (`value / timescale` seconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDuration {
    pub value: i64,
    pub timescale: i32,
}

impl FrameDuration {
    #[must_use]
    pub const fn new(value: i64, timescale: i32) -> Self {
        Self { value, timescale }
    }

    /// Duration of one frame at `fps`, truncated to whole frames per second.
    #[must_use]
    pub fn from_frame_rate(fps: f64) -> Self {
        Self::new(1, fps as i32)
    }

    /// Frames per second this duration allows, if well formed.
    #[must_use]
    pub fn frame_rate(self) -> Option<f64> {
        if self.value <= 0 || self.timescale <= 0 {
            return None;
        }
        Some(f64::from(self.timescale) / self.value as f64)
    }
}

/// Session cost figures as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionCosts {
    pub system_pressure: f64,
    pub hardware: f64,
}

/// Reports current session costs.
pub trait CostMetrics {
    fn session_costs(&self) -> SessionCosts;
}

/// Queries and changes per-camera format and frame rate.
pub trait FormatControl {
    /// Formats the camera offers, in device order (lowest quality first).
    fn formats(&self, side: CameraSide) -> Vec<VideoFormat>;

    fn active_format(&self, side: CameraSide) -> Option<VideoFormat>;

    /// Lock the device and activate `format`.
    fn set_active_format(&self, side: CameraSide, format: VideoFormat) -> Result<(), CaptureError>;

    fn min_frame_duration(&self, side: CameraSide) -> Option<FrameDuration>;

    /// Lock the device and cap its frame rate via the minimum frame duration.
    fn set_min_frame_duration(
        &self,
        side: CameraSide,
        duration: FrameDuration,
    ) -> Result<(), CaptureError>;
}

/// Reconfigures input port connections.
pub trait PortControl {
    /// Replace a dual-camera input with its wide-angle port, keeping the
    /// existing output or preview attached.
    ///
    /// `Ok(false)` means there was no dual-camera input to replace.
    fn downgrade_to_single_camera(&self) -> Result<bool, CaptureError>;
}

/// Everything the mitigation ladder needs.
pub trait CaptureSession: CostMetrics + FormatControl + PortControl {}

impl<T: CostMetrics + FormatControl + PortControl + ?Sized> CaptureSession for T {}

fn is_at_floor(format: VideoFormat, config: &CostConfig) -> bool {
    format.width <= config.resolution_floor.width && format.height <= config.resolution_floor.height
}

fn log_not_applicable(action: &str, side: Option<CameraSide>, err: &CaptureError) {
    tracing::warn!(
        target: "pipcam.capture",
        action,
        side = ?side,
        error = %err,
        "reduction failed; treating as not applicable"
    );
}

/// Pick the format `reduce_resolution` would switch to.
///
/// Walks the formats listed before the active one, nearest first, and
/// returns the first multi-cam format smaller in both dimensions.
#[must_use]
pub fn next_lower_format(
    formats: &[VideoFormat],
    active: VideoFormat,
    config: &CostConfig,
) -> Option<VideoFormat> {
    if is_at_floor(active, config) {
        return None;
    }
    let active_index = formats.iter().position(|f| *f == active)?;
    formats[..active_index]
        .iter()
        .rev()
        .filter(|f| f.multi_cam_supported)
        .find(|f| f.width < active.width && f.height < active.height)
        .copied()
}

/// Switch `side` to a smaller capture format.
pub fn reduce_resolution<S: FormatControl + ?Sized>(
    session: &S,
    side: CameraSide,
    config: &CostConfig,
) -> bool {
    let Some(active) = session.active_format(side) else {
        return false;
    };
    let formats = session.formats(side);
    let Some(target) = next_lower_format(&formats, active, config) else {
        tracing::debug!(
            target: "pipcam.capture",
            %side,
            width = active.width,
            height = active.height,
            "no smaller multi-cam format"
        );
        return false;
    };

    match session.set_active_format(side, target) {
        Ok(()) => {
            tracing::info!(
                target: "pipcam.capture",
                %side,
                width = target.width,
                height = target.height,
                "reduced resolution"
            );
            true
        }
        Err(err) => {
            log_not_applicable("reduce_resolution", Some(side), &err);
            false
        }
    }
}

/// Frame rate `reduce_frame_rate` would cap `side` to, if any.
#[must_use]
pub fn next_lower_frame_rate(current: FrameDuration, config: &CostConfig) -> Option<f64> {
    let candidate = current.frame_rate()? - config.frame_rate_step;
    (candidate >= config.frame_rate_floor).then_some(candidate)
}

/// Lower the maximum frame rate of `side` by one step.
pub fn reduce_frame_rate<S: FormatControl + ?Sized>(
    session: &S,
    side: CameraSide,
    config: &CostConfig,
) -> bool {
    let Some(current) = session.min_frame_duration(side) else {
        return false;
    };
    let Some(candidate) = next_lower_frame_rate(current, config) else {
        return false;
    };

    match session.set_min_frame_duration(side, FrameDuration::from_frame_rate(candidate)) {
        Ok(()) => {
            tracing::info!(target: "pipcam.capture", %side, fps = candidate, "reduced frame rate");
            true
        }
        Err(err) => {
            log_not_applicable("reduce_frame_rate", Some(side), &err);
            false
        }
    }
}

/// Swap a dual-camera input for a single wide-angle input.
pub fn reduce_input_ports<S: PortControl + ?Sized>(session: &S) -> bool {
    match session.downgrade_to_single_camera() {
        Ok(true) => {
            tracing::info!(target: "pipcam.capture", "changed input from dual to single camera");
            true
        }
        Ok(false) => false,
        Err(err) => {
            log_not_applicable("reduce_input_ports", None, &err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    const F480: VideoFormat = VideoFormat::new(640, 480, true);
    const F720: VideoFormat = VideoFormat::new(1280, 720, true);
    const F1080: VideoFormat = VideoFormat::new(1920, 1080, true);
    const F1080_SOLO: VideoFormat = VideoFormat::new(1920, 1080, false);
    const F4K: VideoFormat = VideoFormat::new(3840, 2160, true);

    struct Camera {
        formats: Vec<VideoFormat>,
        active: RefCell<VideoFormat>,
        duration: RefCell<FrameDuration>,
        lock_fails: bool,
        dual: RefCell<bool>,
    }

    impl Camera {
        fn new(formats: Vec<VideoFormat>, active: VideoFormat, fps: i32) -> Self {
            Self {
                formats,
                active: RefCell::new(active),
                duration: RefCell::new(FrameDuration::new(1, fps)),
                lock_fails: false,
                dual: RefCell::new(false),
            }
        }

        fn lock(&self, side: CameraSide) -> Result<(), CaptureError> {
            if self.lock_fails {
                Err(CaptureError::ConfigurationLockFailed {
                    side,
                    reason: "device busy".into(),
                })
            } else {
                Ok(())
            }
        }
    }

    impl FormatControl for Camera {
        fn formats(&self, _side: CameraSide) -> Vec<VideoFormat> {
            self.formats.clone()
        }

        fn active_format(&self, _side: CameraSide) -> Option<VideoFormat> {
            Some(*self.active.borrow())
        }

        fn set_active_format(
            &self,
            side: CameraSide,
            format: VideoFormat,
        ) -> Result<(), CaptureError> {
            self.lock(side)?;
            *self.active.borrow_mut() = format;
            Ok(())
        }

        fn min_frame_duration(&self, _side: CameraSide) -> Option<FrameDuration> {
            Some(*self.duration.borrow())
        }

        fn set_min_frame_duration(
            &self,
            side: CameraSide,
            duration: FrameDuration,
        ) -> Result<(), CaptureError> {
            self.lock(side)?;
            *self.duration.borrow_mut() = duration;
            Ok(())
        }
    }

    impl PortControl for Camera {
        fn downgrade_to_single_camera(&self) -> Result<bool, CaptureError> {
            Ok(self.dual.replace(false))
        }
    }

    #[test]
    fn resolution_steps_down_one_format() {
        let cam = Camera::new(vec![F480, F720, F1080, F4K], F4K, 30);
        let cfg = CostConfig::default();
        assert!(reduce_resolution(&cam, CameraSide::Back, &cfg));
        assert_eq!(*cam.active.borrow(), F1080);
        assert!(reduce_resolution(&cam, CameraSide::Back, &cfg));
        assert!(reduce_resolution(&cam, CameraSide::Back, &cfg));
        assert_eq!(*cam.active.borrow(), F480);
        assert!(!reduce_resolution(&cam, CameraSide::Back, &cfg));
    }

    #[test]
    fn resolution_skips_single_cam_formats() {
        let cam = Camera::new(vec![F720, F1080_SOLO, F4K], F4K, 30);
        assert!(reduce_resolution(&cam, CameraSide::Front, &CostConfig::default()));
        assert_eq!(*cam.active.borrow(), F720);
    }

    #[test]
    fn resolution_requires_both_dimensions_smaller() {
        let wide = VideoFormat::new(1920, 720, true);
        let cam = Camera::new(vec![wide, F1080], F1080, 30);
        assert!(!reduce_resolution(&cam, CameraSide::Front, &CostConfig::default()));
    }

    #[test]
    fn resolution_at_floor_is_not_applicable() {
        let small = VideoFormat::new(320, 240, true);
        let cam = Camera::new(vec![small, F480], F480, 30);
        assert!(!reduce_resolution(&cam, CameraSide::Front, &CostConfig::default()));
    }

    #[test]
    fn lock_failure_counts_as_not_applicable() {
        let mut cam = Camera::new(vec![F720, F1080], F1080, 30);
        cam.lock_fails = true;
        let cfg = CostConfig::default();
        assert!(!reduce_resolution(&cam, CameraSide::Back, &cfg));
        assert!(!reduce_frame_rate(&cam, CameraSide::Back, &cfg));
        assert_eq!(*cam.active.borrow(), F1080);
    }

    #[test]
    fn frame_rate_steps_by_ten_until_floor() {
        let cam = Camera::new(vec![F1080], F1080, 30);
        let cfg = CostConfig::default();
        assert!(reduce_frame_rate(&cam, CameraSide::Front, &cfg));
        assert_eq!(*cam.duration.borrow(), FrameDuration::new(1, 20));
        // 20 - 10 = 10 < 15
        assert!(!reduce_frame_rate(&cam, CameraSide::Front, &cfg));
    }

    #[test]
    fn frame_rate_24_is_not_reducible() {
        assert_eq!(
            next_lower_frame_rate(FrameDuration::new(1, 24), &CostConfig::default()),
            None
        );
        assert_eq!(
            next_lower_frame_rate(FrameDuration::new(1, 25), &CostConfig::default()),
            Some(15.0)
        );
    }

    #[test]
    fn malformed_duration_has_no_rate() {
        assert_eq!(FrameDuration::new(0, 30).frame_rate(), None);
        assert_eq!(FrameDuration::new(1, 0).frame_rate(), None);
        assert_eq!(FrameDuration::new(1001, 30_000).frame_rate().map(f64::round), Some(30.0));
    }

    #[test]
    fn ports_downgrade_once() {
        let cam = Camera::new(vec![F1080], F1080, 30);
        *cam.dual.borrow_mut() = true;
        assert!(reduce_input_ports(&cam));
        assert!(!reduce_input_ports(&cam));
    }

    #[test]
    fn unknown_active_format_is_not_applicable() {
        let cam = Camera::new(vec![F480, F720], F1080, 30);
        assert!(!reduce_resolution(&cam, CameraSide::Back, &CostConfig::default()));
    }
}
