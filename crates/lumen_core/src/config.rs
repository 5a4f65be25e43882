//! Render settings.

use serde::{Deserialize, Serialize};

/// Width used when neither the scene nor the caller picks one.
pub const DEFAULT_WIDTH: u32 = 256;

/// Render configuration.
///
/// Read-only for the duration of a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Recursion ceiling; 0 traces primary rays only
    pub max_depth: u32,
    /// Per-channel intensity below which secondary bounces are pruned
    pub threshold: f64,
    /// Sub-pixel grid size per axis (0 = one sample per pixel)
    pub supersample: u32,
    /// Randomly perturb supersamples within their sub-cell
    pub jitter: bool,
    /// Use the background image for rays that escape the scene
    pub background_enabled: bool,
    /// Framebuffer width in pixels
    pub width: u32,
    /// Framebuffer height; derived from the camera aspect ratio when unset
    pub height: Option<u32>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 0,
            threshold: 0.0,
            supersample: 0,
            jitter: false,
            background_enabled: false,
            width: DEFAULT_WIDTH,
            height: None,
        }
    }
}

impl RenderConfig {
    /// Framebuffer size for a camera with the given aspect ratio (width / height).
    pub fn resolution(&self, aspect_ratio: f64) -> (u32, u32) {
        let width = self.width.max(1);
        let height = match self.height {
            Some(h) => h.max(1),
            None if aspect_ratio > 0.0 && aspect_ratio.is_finite() => {
                ((width as f64 / aspect_ratio + 0.5) as u32).max(1)
            }
            None => width,
        };
        (width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RenderConfig::default();
        assert_eq!(config.max_depth, 0);
        assert_eq!(config.supersample, 0);
        assert!(!config.jitter);
        assert!(!config.background_enabled);
        assert_eq!(config.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_resolution_from_aspect_ratio() {
        let config = RenderConfig::default();
        assert_eq!(config.resolution(1.0), (256, 256));
        assert_eq!(config.resolution(16.0 / 9.0), (256, 144));

        let fixed = RenderConfig {
            width: 100,
            height: Some(40),
            ..Default::default()
        };
        assert_eq!(fixed.resolution(1.0), (100, 40));
    }

    #[test]
    fn test_partial_json() {
        let config: RenderConfig = serde_json::from_str(r#"{ "max_depth": 5, "jitter": true }"#).unwrap();
        assert_eq!(config.max_depth, 5);
        assert!(config.jitter);
        assert_eq!(config.width, DEFAULT_WIDTH);
    }
}
