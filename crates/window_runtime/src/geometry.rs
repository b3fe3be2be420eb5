//! Viewport geometry for floating windows.
//!
//! Both functions are pure: the caller passes the measured viewport (or `None` outside a
//! browser) and the chrome allowances from [`GeometryConfig`].

use platform_host::{Viewport, FALLBACK_VIEWPORT};
use serde::{Deserialize, Serialize};

use crate::model::{WindowPosition, WindowSize};

/// Fixed page-chrome allowances used for placement and clamping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Height reserved for the page header when centering.
    pub header_offset: i32,
    /// Space kept free below a centered window.
    pub bottom_offset: i32,
    /// Horizontal margin on each side when centering.
    pub side_offset: i32,
    /// Smallest allowed `x`.
    pub side_padding: i32,
    /// Smallest allowed `y`; keeps the title bar below the page header.
    pub min_top_padding: i32,
    /// Space kept free below a clamped window.
    pub min_bottom_padding: i32,
    /// Width of a window that must always stay on screen.
    pub min_visible_width: i32,
    /// Placement used when no viewport can be measured.
    pub fallback_position: WindowPosition,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            header_offset: 80,
            bottom_offset: 40,
            side_offset: 40,
            side_padding: 20,
            min_top_padding: 80,
            min_bottom_padding: 40,
            min_visible_width: 200,
            fallback_position: WindowPosition::new(100, 100),
        }
    }
}

/// Centers a window of `size` inside the viewport area left over after page chrome.
///
/// A window larger than the available area is pinned to the top-left chrome margins. Without a
/// viewport the configured fallback position is returned.
pub fn default_center_position(
    size: WindowSize,
    viewport: Option<Viewport>,
    config: &GeometryConfig,
) -> WindowPosition {
    let Some(viewport) = viewport else {
        return config.fallback_position;
    };

    let available_width = viewport.width - config.side_offset * 2;
    let available_height = viewport.height - config.header_offset - config.bottom_offset;

    WindowPosition {
        x: config.side_offset + ((available_width - size.width) / 2).max(0),
        y: config.header_offset + ((available_height - size.height) / 2).max(0),
    }
}

/// Clamps `position` so the window stays reachable inside the viewport.
///
/// `x` lands in `[side_padding, max(side_padding, viewport_width - min_visible_width)]` and `y` in
/// `[min_top_padding, max(min_top_padding, viewport_height - height - min_bottom_padding)]`.
/// Idempotent. Without a viewport, [`FALLBACK_VIEWPORT`] bounds apply.
pub fn constrain_to_viewport(
    position: WindowPosition,
    size: WindowSize,
    viewport: Option<Viewport>,
    config: &GeometryConfig,
) -> WindowPosition {
    let viewport = viewport.unwrap_or(FALLBACK_VIEWPORT);
    let (min_x, max_x) = horizontal_bounds(viewport, config);
    let (min_y, max_y) = vertical_bounds(viewport, size, config);

    WindowPosition {
        x: position.x.clamp(min_x, max_x),
        y: position.y.clamp(min_y, max_y),
    }
}

fn horizontal_bounds(viewport: Viewport, config: &GeometryConfig) -> (i32, i32) {
    let min = config.side_padding;
    (min, min.max(viewport.width - config.min_visible_width))
}

fn vertical_bounds(viewport: Viewport, size: WindowSize, config: &GeometryConfig) -> (i32, i32) {
    let min = config.min_top_padding;
    (
        min,
        min.max(viewport.height - size.height - config.min_bottom_padding),
    )
}
