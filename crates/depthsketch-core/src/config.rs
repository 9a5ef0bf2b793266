//! Tunable constants for drawing, picking and gizmo interaction.

use crate::brush::BrushType;
use crate::scene::{Color, PickParams};
use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Canvas configuration.
///
/// Every field has a default, so a partial JSON document is enough to
/// override a single value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Size of the drawing surface in pixels.
    pub viewport: Size,
    /// Minimum time between two accepted stroke samples.
    pub sample_interval_ms: f64,
    /// Minimum world distance between samples for line and spray brushes.
    pub min_sample_distance: f32,
    /// Minimum world distance between samples for watercolor and oil.
    pub min_blob_sample_distance: f32,
    /// Distance in front of the camera where a new 3D stroke starts.
    pub new_stroke_depth: f32,
    /// Scale change per world unit dragged along a scale handle.
    pub scale_sensitivity: f32,
    /// Lower bound of a scale drag factor.
    pub min_scale: f32,
    /// Ray picking thresholds.
    pub pick: PickParams,
    /// Radians of camera orbit per dragged pixel.
    pub orbit_speed: f64,
    /// Color of newly inserted primitives.
    pub primitive_color: Color,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            viewport: Size::new(1280.0, 800.0),
            sample_interval_ms: 16.0,
            min_sample_distance: 0.01,
            min_blob_sample_distance: 0.005,
            new_stroke_depth: 5.0,
            scale_sensitivity: 0.5,
            min_scale: 0.1,
            pick: PickParams::default(),
            orbit_speed: 0.005,
            primitive_color: Color::new(0x00, 0x77, 0xff),
        }
    }
}

impl CanvasConfig {
    /// Minimum accepted sample distance for a brush.
    pub fn min_distance_for(&self, brush: BrushType) -> f32 {
        if brush.is_blob() {
            self.min_blob_sample_distance
        } else {
            self.min_sample_distance
        }
    }

    /// World size of the fixed 2D drawing plane.
    pub fn drawing_plane_size(&self) -> (f32, f32) {
        (
            (self.viewport.width / 40.0) as f32,
            (self.viewport.height / 40.0) as f32,
        )
    }

    /// Parse a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
