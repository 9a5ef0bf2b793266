//! Brush types and per-brush settings.

use crate::error::ParseError;
use crate::scene::{BlendMode, Color};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Kind of brush used to paint a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrushType {
    #[default]
    Round,
    Square,
    Spray,
    Watercolor,
    Oil,
    Eraser,
}

impl BrushType {
    pub const ALL: [BrushType; 6] = [
        BrushType::Round,
        BrushType::Square,
        BrushType::Spray,
        BrushType::Watercolor,
        BrushType::Oil,
        BrushType::Eraser,
    ];

    /// Brushes that stamp a disc at each sample instead of drawing a line.
    pub fn is_blob(self) -> bool {
        matches!(self, BrushType::Watercolor | BrushType::Oil)
    }

    pub fn name(self) -> &'static str {
        match self {
            BrushType::Round => "round",
            BrushType::Square => "square",
            BrushType::Spray => "spray",
            BrushType::Watercolor => "watercolor",
            BrushType::Oil => "oil",
            BrushType::Eraser => "eraser",
        }
    }
}

impl fmt::Display for BrushType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BrushType {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BrushType::ALL
            .into_iter()
            .find(|brush| brush.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownBrush(s.to_string()))
    }
}

/// Settings of a single brush.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSettings {
    pub thickness: f32,
    pub color: Color,
    /// Fraction in `0.0..=1.0`.
    pub opacity: f32,
    /// Spray spread; points scatter in a cube of side `spray_radius / 50`.
    pub spray_radius: f32,
    /// Points per spray sample.
    pub spray_density: u32,
    /// Watercolor disc size.
    pub spread: f32,
    /// Overlapping watercolor washes mix instead of occluding.
    pub blending: bool,
    pub blend_mode: BlendMode,
}

impl BrushSettings {
    /// Default settings of a brush type.
    pub fn defaults_for(brush: BrushType) -> Self {
        let base = Self {
            thickness: 10.0,
            color: Color::black(),
            opacity: 1.0,
            spray_radius: 0.0,
            spray_density: 0,
            spread: 0.0,
            blending: false,
            blend_mode: BlendMode::Normal,
        };
        match brush {
            BrushType::Round | BrushType::Square => base,
            BrushType::Spray => Self {
                thickness: 5.0,
                opacity: 0.5,
                spray_radius: 10.0,
                spray_density: 30,
                ..base
            },
            BrushType::Watercolor => Self {
                thickness: 20.0,
                opacity: 0.3,
                spread: 15.0,
                blending: true,
                ..base
            },
            BrushType::Oil => Self {
                thickness: 15.0,
                opacity: 0.8,
                blend_mode: BlendMode::Multiply,
                ..base
            },
            BrushType::Eraser => Self {
                thickness: 20.0,
                color: Color::white(),
                ..base
            },
        }
    }
}

/// The active brush and the settings of every brush type.
#[derive(Debug, Clone)]
pub struct Brushes {
    active: BrushType,
    /// Color picked in the toolbar, shared by every non-eraser brush.
    toolbar_color: Color,
    settings: HashMap<BrushType, BrushSettings>,
}

impl Default for Brushes {
    fn default() -> Self {
        Self {
            active: BrushType::default(),
            toolbar_color: Color::black(),
            settings: BrushType::ALL
                .into_iter()
                .map(|brush| (brush, BrushSettings::defaults_for(brush)))
                .collect(),
        }
    }
}

impl Brushes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> BrushType {
        self.active
    }

    pub fn toolbar_color(&self) -> Color {
        self.toolbar_color
    }

    /// Settings of a brush type.
    pub fn settings(&self, brush: BrushType) -> BrushSettings {
        self.settings
            .get(&brush)
            .copied()
            .unwrap_or_else(|| BrushSettings::defaults_for(brush))
    }

    /// Settings of the active brush.
    pub fn active_settings(&self) -> BrushSettings {
        self.settings(self.active)
    }

    fn active_mut(&mut self) -> &mut BrushSettings {
        let active = self.active;
        self.settings
            .entry(active)
            .or_insert_with(|| BrushSettings::defaults_for(active))
    }

    /// Switch brush. The eraser keeps its own color.
    pub fn set_brush_type(&mut self, brush: BrushType) {
        self.active = brush;
        if brush != BrushType::Eraser {
            let color = self.toolbar_color;
            self.active_mut().color = color;
        }
    }

    pub fn set_color(&mut self, color: Color) {
        self.toolbar_color = color;
        if self.active != BrushType::Eraser {
            self.active_mut().color = color;
        }
    }

    pub fn set_thickness(&mut self, thickness: f32) {
        self.active_mut().thickness = thickness.max(0.0);
    }

    /// Set opacity from a toolbar percentage.
    pub fn set_opacity_percent(&mut self, percent: f32) {
        self.active_mut().opacity = percent.clamp(0.0, 100.0) / 100.0;
    }
}
