//! Scene configuration
//!
//! Everything has a default, so an empty TOML document is a valid config.

use crate::easing::Easing;
use crate::error::{SceneError, SceneResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default clamp applied to a single frame's delta time
pub const DEFAULT_MAX_FRAME_DELTA_MS: u64 = 100;

/// Initial viewport size
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ViewportConfig {
    pub width: f32,
    pub height: f32,
}

/// Scene-wide settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    /// Upper bound for one frame's delta, in milliseconds.
    ///
    /// A host that stalls (debugger, backgrounded window) would otherwise
    /// hand the animation tick a delta large enough to finish every tween
    /// in a single frame.
    pub max_frame_delta_ms: u64,
    /// Text wrapping used when no ancestor sets `wordWrap`
    pub word_wrap: bool,
    /// Easing used by [`Scene::instruction`](crate::Scene::instruction)
    pub default_easing: Easing,
    /// Viewport known at startup; `None` defers layout until the host
    /// reports a size
    pub viewport: Option<ViewportConfig>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            max_frame_delta_ms: DEFAULT_MAX_FRAME_DELTA_MS,
            word_wrap: true,
            default_easing: Easing::default(),
            viewport: None,
        }
    }
}

impl SceneConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(source: &str) -> SceneResult<Self> {
        let config: SceneConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SceneResult<()> {
        if self.max_frame_delta_ms == 0 {
            return Err(SceneError::Config(
                "max_frame_delta_ms must be greater than zero".to_string(),
            ));
        }

        if let Some(viewport) = self.viewport {
            let valid = |v: f32| v.is_finite() && v >= 0.0;
            if !valid(viewport.width) || !valid(viewport.height) {
                return Err(SceneError::Config(format!(
                    "viewport must be finite and non-negative, got {}x{}",
                    viewport.width, viewport.height
                )));
            }
        }

        Ok(())
    }

    pub fn max_frame_delta(&self) -> Duration {
        Duration::from_millis(self.max_frame_delta_ms)
    }
}
