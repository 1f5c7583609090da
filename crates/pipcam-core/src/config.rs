#![forbid(unsafe_code)]

//! Tunables for snapping, preview sizing, and cost mitigation.
//!
//! Every default equals the constant the app ships with, so
//! `PipConfig::default()` reproduces stock behavior. With the
//! `policy-config` feature the same structure can be loaded from TOML;
//! missing keys fall back to their defaults.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Corner inset used when no preview layout supplies one.
pub const DEFAULT_CORNER_INSET: f64 = 30.0;

/// Formats at or below this size cannot be reduced further.
pub const RESOLUTION_FLOOR: VideoDimensions = VideoDimensions {
    width: 640,
    height: 480,
};

/// Frame rate is never reduced below this (frames per second).
pub const FRAME_RATE_FLOOR: f64 = 15.0;

/// Each frame-rate reduction removes this many frames per second.
pub const FRAME_RATE_STEP: f64 = 10.0;

/// Costs strictly above this value count as exceeded.
pub const COST_THRESHOLD: f64 = 1.0;

/// Width and height of a capture format in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDimensions {
    pub width: u32,
    pub height: u32,
}

/// Corner snapping parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConfig {
    /// Gap between a resting item and the reference edges.
    pub corner_inset: f64,
    /// Exponential velocity damping per second used to project a release.
    pub throw_damping: f64,
    /// How far ahead a release is projected, in milliseconds.
    pub throw_horizon_ms: u16,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            corner_inset: DEFAULT_CORNER_INSET,
            throw_damping: 7.5,
            throw_horizon_ms: 220,
        }
    }
}

/// Floating preview sizing relative to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Preview width as a fraction of the longer screen side.
    pub size_fraction: f64,
    /// Width divided by height.
    pub aspect_ratio: f64,
    /// Corner inset as a fraction of the preview width.
    pub inset_fraction: f64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            size_fraction: 0.15,
            aspect_ratio: 0.70,
            inset_fraction: 0.3,
        }
    }
}

/// Mitigation ladder parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostConfig {
    pub system_pressure_threshold: f64,
    pub hardware_threshold: f64,
    pub resolution_floor: VideoDimensions,
    pub frame_rate_floor: f64,
    pub frame_rate_step: f64,
    /// Upper bound on successful reductions per `reduce_if_needed` call.
    pub max_reductions: usize,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            system_pressure_threshold: COST_THRESHOLD,
            hardware_threshold: COST_THRESHOLD,
            resolution_floor: RESOLUTION_FLOOR,
            frame_rate_floor: FRAME_RATE_FLOOR,
            frame_rate_step: FRAME_RATE_STEP,
            max_reductions: 64,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipConfig {
    pub snap: SnapConfig,
    pub preview: PreviewConfig,
    pub cost: CostConfig,
}

impl PipConfig {
    /// Reject values that would make the controllers misbehave.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!(
                    "{name} must be a positive number, got {value}"
                )))
            }
        }

        if !(self.snap.corner_inset.is_finite() && self.snap.corner_inset >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "snap.corner_inset must be non-negative, got {}",
                self.snap.corner_inset
            )));
        }
        if !(self.snap.throw_damping.is_finite() && self.snap.throw_damping >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "snap.throw_damping must be non-negative, got {}",
                self.snap.throw_damping
            )));
        }
        positive("preview.size_fraction", self.preview.size_fraction)?;
        positive("preview.aspect_ratio", self.preview.aspect_ratio)?;
        positive("preview.inset_fraction", self.preview.inset_fraction)?;
        positive("cost.system_pressure_threshold", self.cost.system_pressure_threshold)?;
        positive("cost.hardware_threshold", self.cost.hardware_threshold)?;
        positive("cost.frame_rate_floor", self.cost.frame_rate_floor)?;
        positive("cost.frame_rate_step", self.cost.frame_rate_step)?;
        if self.cost.resolution_floor.width == 0 || self.cost.resolution_floor.height == 0 {
            return Err(ConfigError::Invalid(
                "cost.resolution_floor must have non-zero dimensions".into(),
            ));
        }
        if self.cost.max_reductions == 0 {
            return Err(ConfigError::Invalid(
                "cost.max_reductions must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PipConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    #[cfg(feature = "policy-config")]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(PipConfig::default().validate().is_ok());
    }

    #[test]
    fn defaults_match_shipping_constants() {
        let cfg = PipConfig::default();
        assert_eq!(cfg.cost.resolution_floor, VideoDimensions { width: 640, height: 480 });
        assert_eq!(cfg.cost.frame_rate_floor, 15.0);
        assert_eq!(cfg.cost.frame_rate_step, 10.0);
        assert_eq!(cfg.cost.hardware_threshold, 1.0);
    }

    #[test]
    fn zero_step_is_rejected() {
        let mut cfg = PipConfig::default();
        cfg.cost.frame_rate_step = 0.0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("cost.frame_rate_step"));
    }

    #[test]
    fn negative_inset_is_rejected() {
        let mut cfg = PipConfig::default();
        cfg.snap.corner_inset = -1.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_reduction_budget_is_rejected() {
        let mut cfg = PipConfig::default();
        cfg.cost.max_reductions = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: PipConfig =
            serde_json::from_str(r#"{ "snap": { "corner_inset": 12.0 } }"#).unwrap();
        assert_eq!(cfg.snap.corner_inset, 12.0);
        assert_eq!(cfg.snap.throw_horizon_ms, 220);
        assert_eq!(cfg.cost, CostConfig::default());
    }
}
