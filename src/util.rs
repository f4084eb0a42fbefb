pub const FOCUSED_COL: u32 = 0xdddddd;
pub const UNFOCUSED_COL: u32 = 0x555555;
pub const DISABLED_COL: u32 = 0x888888;
pub const URGENT_COL: u32 = 0xdd0000;

// Overlay fill and its _NET_WM_WINDOW_OPACITY
pub const OVERLAY_COL: u32 = 0x3c7fd8;
pub const OVERLAY_OPACITY: f32 = 0.35;

// Default height of a title bar in pixels
pub const TITLEBAR_HEIGHT: i32 = 24;

// Title font size in pixels
pub const FONT_SIZE: f32 = 13.0;

/// Converts an opacity in [0.0, 1.0] into a `_NET_WM_WINDOW_OPACITY` value.
pub fn opacity_cardinal(opacity: f32) -> u32 {
    (opacity.clamp(0.0, 1.0) as f64 * u32::MAX as f64) as u32
}
