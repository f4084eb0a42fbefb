//! Types for configuring a `DecorationManager`.
//!
//! This module contains [`Config`], which holds the colours and
//! sizes used to draw title bars and the snap preview, as well as
//! the log level used by the binary.
use std::path::{Path, PathBuf};

use custom_debug_derive::Debug;

use tracing::Level;

use crate::core::Color;
use crate::overlay::OverlayStyle;
use crate::util;
use crate::{DecoError::InvalidConfig, Result};

/// The central configuration object.
///
/// `Config` is built from its `Default` and adjusted with its
/// `with_*` methods. It provides a `validate` method that ensures it
/// can be used in a `DecorationManager`, and that can also run
/// user-defined checks.
///
/// # Example
///
/// ```rust
/// use toarudeco::manager::config::{Config, NO_CHECKS};
/// use toarudeco::core::Color;
///
/// let config = Config::new()
///     .with_titlebar_height(28)
///     .with_focused(Color::from_rgb(0x3c7fd8));
///
/// config.validate(NO_CHECKS).expect("invalid config");
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// The height of a title bar.
    pub(crate) titlebar_height: i32,
    /// The title bar colour of the focused window.
    pub(crate) focused: Color,
    /// The title bar colour of unfocused windows.
    pub(crate) unfocused: Color,
    /// The title bar colour of windows that cannot be interacted with.
    pub(crate) disabled: Color,
    /// The colour of the close button.
    pub(crate) urgent: Color,
    /// The title text colour of the focused window.
    pub(crate) text_focused: Color,
    /// The title text colour of unfocused windows.
    pub(crate) text_unfocused: Color,
    pub(crate) button_size: i32,
    pub(crate) button_spacing: i32,
    /// The corner radius of resizable windows.
    pub(crate) corner_radius: i32,
    /// The corner radius of fixed-size windows.
    pub(crate) fixed_corner_radius: i32,
    /// The fill colour of the snap preview.
    pub(crate) overlay_color: Color,
    /// The opacity of the snap preview.
    pub(crate) overlay_opacity: f32,
    /// A font file to draw titles with. System fonts are tried if unset.
    pub(crate) font: Option<PathBuf>,
    /// The title font size in pixels.
    pub(crate) font_size: f32,
    #[debug(skip)]
    pub(crate) log_level: Level,
}

//* I would use an Option<F> instead of doing this bodge, but
//* passing in None would cause type inference issues.
const fn no_checks(_: &Config) -> Result<()> {
    Ok(())
}

/// A constant signifying no user-defined checks are required.
///
/// Pass this into `Config::validate` if you have no additional
/// validation checks to run on your config.
pub const NO_CHECKS: fn(&Config) -> Result<()> = no_checks;

impl Default for Config {
    fn default() -> Config {
        Config {
            titlebar_height: util::TITLEBAR_HEIGHT,
            focused: Color::from_rgb(util::FOCUSED_COL),
            unfocused: Color::from_rgb(util::UNFOCUSED_COL),
            disabled: Color::from_rgb(util::DISABLED_COL),
            urgent: Color::from_rgb(util::URGENT_COL),
            text_focused: Color::from_rgb(0x202020),
            text_unfocused: Color::from_rgb(0xb0b0b0),
            button_size: 14,
            button_spacing: 6,
            corner_radius: 6,
            fixed_corner_radius: 2,
            overlay_color: Color::from_rgb(util::OVERLAY_COL),
            overlay_opacity: util::OVERLAY_OPACITY,
            font: None,
            font_size: util::FONT_SIZE,
            log_level: Level::DEBUG,
        }
    }
}

impl Config {
    /// Returns the default construction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks the configuration to verify that all invariants are upheld.
    ///
    /// Additional checks can be passed in as a closure. If you have
    /// none, pass in the [`NO_CHECKS`] constant.
    pub fn validate<F>(&self, checks: F) -> Result<()>
    where
        F: FnOnce(&Config) -> Result<()>,
    {
        if self.titlebar_height <= 0 {
            return Err(InvalidConfig("titlebar height must be positive".into()));
        }
        if self.button_size <= 0 || self.button_spacing < 0 {
            return Err(InvalidConfig("button sizes must be positive".into()));
        }
        if self.corner_radius < 0 || self.fixed_corner_radius < 0 {
            return Err(InvalidConfig("corner radius cannot be negative".into()));
        }
        if self.corner_radius * 2 > self.titlebar_height {
            return Err(InvalidConfig(format!(
                "corner radius {} does not fit in a titlebar of height {}",
                self.corner_radius, self.titlebar_height
            )));
        }
        if !(0.0..=1.0).contains(&self.overlay_opacity) {
            return Err(InvalidConfig(format!(
                "overlay opacity {} is not between 0 and 1",
                self.overlay_opacity
            )));
        }
        if !(self.font_size > 0.0 && self.font_size.is_finite()) {
            return Err(InvalidConfig(format!(
                "font size {} must be positive",
                self.font_size
            )));
        }
        checks(self)?;
        Ok(())
    }

    pub fn with_titlebar_height(mut self, height: i32) -> Self {
        self.titlebar_height = height;
        self
    }

    pub fn with_focused(mut self, color: Color) -> Self {
        self.focused = color;
        self
    }

    pub fn with_unfocused(mut self, color: Color) -> Self {
        self.unfocused = color;
        self
    }

    pub fn with_disabled(mut self, color: Color) -> Self {
        self.disabled = color;
        self
    }

    pub fn with_urgent(mut self, color: Color) -> Self {
        self.urgent = color;
        self
    }

    /// Sets the title text colours for focused and unfocused windows.
    pub fn with_text(mut self, focused: Color, unfocused: Color) -> Self {
        self.text_focused = focused;
        self.text_unfocused = unfocused;
        self
    }

    pub fn with_buttons(mut self, size: i32, spacing: i32) -> Self {
        self.button_size = size;
        self.button_spacing = spacing;
        self
    }

    /// Sets the corner radii for resizable and fixed-size windows.
    pub fn with_corner_radius(mut self, resizable: i32, fixed: i32) -> Self {
        self.corner_radius = resizable;
        self.fixed_corner_radius = fixed;
        self
    }

    pub fn with_overlay(mut self, color: Color, opacity: f32) -> Self {
        self.overlay_color = color;
        self.overlay_opacity = opacity;
        self
    }

    /// Sets the font file used for titles.
    pub fn with_font<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.font = Some(path.into());
        self
    }

    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_log_level(mut self, level: Level) -> Self {
        self.log_level = level;
        self
    }

    /// The height of a title bar, in pixels.
    pub fn titlebar_height(&self) -> i32 {
        self.titlebar_height
    }

    /// The title bar colour of the focused window.
    pub fn focused(&self) -> Color {
        self.focused
    }

    /// The title bar colour of unfocused windows.
    pub fn unfocused(&self) -> Color {
        self.unfocused
    }

    /// The title bar colour of disabled windows.
    pub fn disabled(&self) -> Color {
        self.disabled
    }

    pub fn font(&self) -> Option<&Path> {
        self.font.as_deref()
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn log_level(&self) -> Level {
        self.log_level
    }

    /// The style of the snap preview overlay.
    pub fn overlay_style(&self) -> OverlayStyle {
        OverlayStyle {
            color: self.overlay_color,
            opacity: self.overlay_opacity,
        }
    }
}
