use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use wealth_overlay_core::{Color, OverlaySettings, OverlayStyle, Zoom, DEFAULT_OPACITY};
use wealth_overlay_rendering::{RendererConfig, DEFAULT_ELEVATION, DEFAULT_RENDER_QUEUE};

/// Overlay appearance and persisted zoom loaded from a TOML file.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct OverlayConfig {
    /// Base tint as `[red, green, blue, alpha]`.
    pub(crate) base_color: [f32; 4],
    /// Fraction of the base alpha applied to the overlay material.
    pub(crate) opacity: f32,
    /// Render-order key handed to the sink.
    pub(crate) render_queue: i32,
    /// Height of the overlay quads.
    pub(crate) elevation: f32,
    /// Persisted zoom level.
    pub(crate) zoom: Zoom,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let color = Color::YELLOW;
        Self {
            base_color: [color.red, color.green, color.blue, color.alpha],
            opacity: DEFAULT_OPACITY,
            render_queue: DEFAULT_RENDER_QUEUE,
            elevation: DEFAULT_ELEVATION,
            zoom: Zoom::NATIVE,
        }
    }
}

impl OverlayConfig {
    /// Reads and validates the configuration stored at `path`.
    pub(crate) fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read overlay config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid overlay config at {}", path.display()))
    }

    /// Parses and validates configuration from TOML text.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(contents).context("failed to parse overlay config toml contents")?;
        if !(0.0..=1.0).contains(&config.opacity) {
            bail!(
                "opacity must lie within 0.0..=1.0 (received {})",
                config.opacity
            );
        }
        if config
            .base_color
            .iter()
            .any(|channel| !(0.0..=1.0).contains(channel))
        {
            bail!("base_color channels must lie within 0.0..=1.0");
        }
        Ok(config)
    }

    /// Style shared by the grid and the renderer.
    #[must_use]
    pub(crate) fn style(&self) -> OverlayStyle {
        let [red, green, blue, alpha] = self.base_color;
        OverlayStyle::new(Color::new(red, green, blue, alpha), self.opacity)
    }

    /// Renderer configuration derived from the file.
    #[must_use]
    pub(crate) fn renderer(&self) -> RendererConfig {
        RendererConfig {
            opacity: self.opacity,
            render_queue: self.render_queue,
            elevation: self.elevation,
            ..RendererConfig::default()
        }
    }

    /// Settings the overlay should be loaded with.
    #[must_use]
    pub(crate) fn settings(&self) -> OverlaySettings {
        OverlaySettings::new(self.zoom)
    }
}

/// Writes persisted overlay settings as TOML.
pub(crate) fn save_settings(path: impl AsRef<Path>, settings: OverlaySettings) -> Result<()> {
    let path = path.as_ref();
    let contents = toml::to_string(&settings).context("failed to serialise overlay settings")?;
    fs::write(path, contents)
        .with_context(|| format!("failed to write overlay settings to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = OverlayConfig::parse("").expect("empty config is valid");
        assert_eq!(config, OverlayConfig::default());
        assert_eq!(config.style(), OverlayStyle::default());
    }

    #[test]
    fn fields_override_defaults() {
        let config = OverlayConfig::parse(
            r#"
            base_color = [0.0, 1.0, 0.0, 0.5]
            opacity = 0.5
            render_queue = 10
            zoom = 3
        "#,
        )
        .expect("config should parse");

        assert_eq!(
            config.style().translucent_color(),
            Color::new(0.0, 1.0, 0.0, 0.25)
        );
        assert_eq!(config.renderer().render_queue, 10);
        assert_eq!(config.settings().zoom.get(), 3);
    }

    #[test]
    fn zero_zoom_is_rejected() {
        assert!(OverlayConfig::parse("zoom = 0").is_err());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(
            OverlayConfig::parse("max_cells = 5").is_err(),
            "unknown keys must be rejected"
        );
    }

    #[test]
    fn saved_settings_load_back_as_config() {
        let file_name = format!("wealth-overlay-settings-{}.toml", std::process::id());
        let path = std::env::temp_dir().join(file_name);
        let zoom = Zoom::new(4).expect("valid zoom");

        save_settings(&path, OverlaySettings::new(zoom)).expect("settings written");
        let config = OverlayConfig::from_path(&path);
        let _ = fs::remove_file(&path);

        let config = config.expect("saved settings parse as config");
        assert_eq!(config.zoom.get(), 4);
        assert_eq!(
            config,
            OverlayConfig {
                zoom,
                ..OverlayConfig::default()
            }
        );
    }

    #[test]
    fn opacity_outside_unit_range_is_rejected() {
        assert!(OverlayConfig::parse("opacity = 1.5").is_err());
    }
}
