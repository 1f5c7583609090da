#![forbid(unsafe_code)]

//! Floating preview sizing.

use serde::{Deserialize, Serialize};

use crate::config::{PreviewConfig, SnapConfig};
use crate::geometry::{Point, Size};
use crate::snap::CornerSnapController;

/// Size and corner inset of the floating preview for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewLayout {
    /// Full-screen reference area.
    pub screen: Size,
    /// Floating preview size, whole points.
    pub item: Size,
    pub corner_inset: f64,
}

impl PreviewLayout {
    /// Derive the layout from a screen size.
    ///
    /// The preview width is a fraction of the longer screen side, rounded
    /// down; the height follows the aspect ratio, also rounded down.
    #[must_use]
    pub fn for_screen(screen: Size, config: &PreviewConfig) -> Self {
        let length = (config.size_fraction * screen.width.max(screen.height)).floor();
        let height = (length / config.aspect_ratio).floor();
        Self {
            screen,
            item: Size::new(length, height),
            corner_inset: length * config.inset_fraction,
        }
    }

    /// Build a snap controller for this layout, resting the preview in the
    /// top-left corner.
    #[must_use]
    pub fn controller(&self, snap: &SnapConfig) -> CornerSnapController {
        let config = SnapConfig {
            corner_inset: self.corner_inset,
            ..*snap
        };
        let mut controller = CornerSnapController::new(
            config,
            self.item,
            Point::new(self.item.half_width(), self.item.half_height()),
        );
        controller.set_reference_bounds(self.screen.width, self.screen.height);
        let home = controller.position_for_corner(crate::snap::Corner::TopLeft);
        controller.set_center(home);
        controller
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snap::Corner;

    #[test]
    fn phone_portrait_layout() {
        let layout = PreviewLayout::for_screen(Size::new(390.0, 844.0), &PreviewConfig::default());
        assert_eq!(layout.item, Size::new(126.0, 180.0));
        assert!((layout.corner_inset - 37.8).abs() < 1e-9);
    }

    #[test]
    fn layout_uses_longer_side_in_landscape() {
        let config = PreviewConfig::default();
        let portrait = PreviewLayout::for_screen(Size::new(390.0, 844.0), &config);
        let landscape = PreviewLayout::for_screen(Size::new(844.0, 390.0), &config);
        assert_eq!(portrait.item, landscape.item);
    }

    #[test]
    fn controller_starts_top_left() {
        let layout = PreviewLayout::for_screen(Size::new(390.0, 844.0), &PreviewConfig::default());
        let controller = layout.controller(&SnapConfig::default());
        assert_eq!(controller.current_corner(), Some(Corner::TopLeft));
        assert_eq!(controller.config().corner_inset, layout.corner_inset);
    }
}
