#![no_main]

use std::cell::Cell;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pipcam_core::config::CostConfig;
use pipcam_core::error::CaptureError;
use pipcam_core::{
    CameraSide, CostMetrics, FormatControl, FrameDuration, PortControl, ReductionOutcome,
    SessionCostReducer, SessionCosts, VideoFormat,
};

#[derive(Debug, Arbitrary)]
struct Camera {
    formats: Vec<(u16, u16, bool)>,
    active: u8,
    fps: u8,
    lock_fails: bool,
}

#[derive(Debug, Arbitrary)]
struct Input {
    front: Camera,
    back: Camera,
    dual: bool,
    /// Cost contributions: constant part and per-megapixel part.
    base: (u8, u8),
    per_megapixel: (u8, u8),
    max_reductions: u8,
}

struct Device {
    formats: [Vec<VideoFormat>; 2],
    active: [Cell<Option<VideoFormat>>; 2],
    duration: [Cell<FrameDuration>; 2],
    lock_fails: [bool; 2],
    dual: Cell<bool>,
    base: (f64, f64),
    per_megapixel: (f64, f64),
}

fn slot(side: CameraSide) -> usize {
    match side {
        CameraSide::Front => 0,
        CameraSide::Back => 1,
    }
}

impl CostMetrics for Device {
    fn session_costs(&self) -> SessionCosts {
        let megapixels: f64 = self
            .active
            .iter()
            .filter_map(Cell::get)
            .map(|f| f64::from(f.width) * f64::from(f.height) / 1_000_000.0)
            .sum();
        SessionCosts {
            system_pressure: self.base.0 + self.per_megapixel.0 * megapixels,
            hardware: self.base.1 + self.per_megapixel.1 * megapixels,
        }
    }
}

impl FormatControl for Device {
    fn formats(&self, side: CameraSide) -> Vec<VideoFormat> {
        self.formats[slot(side)].clone()
    }

    fn active_format(&self, side: CameraSide) -> Option<VideoFormat> {
        self.active[slot(side)].get()
    }

    fn set_active_format(&self, side: CameraSide, format: VideoFormat) -> Result<(), CaptureError> {
        if self.lock_fails[slot(side)] {
            return Err(CaptureError::ConfigurationLockFailed {
                side,
                reason: "fuzz".into(),
            });
        }
        self.active[slot(side)].set(Some(format));
        Ok(())
    }

    fn min_frame_duration(&self, side: CameraSide) -> Option<FrameDuration> {
        Some(self.duration[slot(side)].get())
    }

    fn set_min_frame_duration(
        &self,
        side: CameraSide,
        duration: FrameDuration,
    ) -> Result<(), CaptureError> {
        if self.lock_fails[slot(side)] {
            return Err(CaptureError::NotApplicable);
        }
        self.duration[slot(side)].set(duration);
        Ok(())
    }
}

impl PortControl for Device {
    fn downgrade_to_single_camera(&self) -> Result<bool, CaptureError> {
        Ok(self.dual.replace(false))
    }
}

fn formats(camera: &Camera) -> Vec<VideoFormat> {
    camera
        .formats
        .iter()
        .take(32)
        .map(|&(w, h, multi)| VideoFormat::new(u32::from(w), u32::from(h), multi))
        .collect()
}

fuzz_target!(|input: Input| {
    let front = formats(&input.front);
    let back = formats(&input.back);
    let active = |camera: &Camera, list: &[VideoFormat]| {
        list.get(usize::from(camera.active) % list.len().max(1)).copied()
    };
    let device = Device {
        active: [
            Cell::new(active(&input.front, &front)),
            Cell::new(active(&input.back, &back)),
        ],
        formats: [front, back],
        duration: [
            Cell::new(FrameDuration::new(1, i32::from(input.front.fps))),
            Cell::new(FrameDuration::new(1, i32::from(input.back.fps))),
        ],
        lock_fails: [input.front.lock_fails, input.back.lock_fails],
        dual: Cell::new(input.dual),
        base: (f64::from(input.base.0) / 100.0, f64::from(input.base.1) / 100.0),
        per_megapixel: (
            f64::from(input.per_megapixel.0) / 100.0,
            f64::from(input.per_megapixel.1) / 100.0,
        ),
    };

    let config = CostConfig {
        max_reductions: usize::from(input.max_reductions).max(1),
        ..CostConfig::default()
    };
    let budget = config.max_reductions;
    let report = SessionCostReducer::new(config).reduce_if_needed(&device);

    assert!(report.applied.len() <= budget);
    assert!(report.attempts >= report.applied.len());
    assert!(report.attempts <= (budget + 1) * 5);
    if let ReductionOutcome::Resolved | ReductionOutcome::NotNeeded = report.outcome {
        assert!(SessionCostReducer::default().exceeded(&device).is_empty());
    }
});
