//! Colors and materials attached to scene nodes.

use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque RGB color, serialized as a `#rrggbb` string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255)
    }

    /// Parse `#rgb` or `#rrggbb`.
    pub fn from_hex(value: &str) -> Result<Self, ParseError> {
        let invalid = || ParseError::InvalidColor(value.to_string());
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
        match hex.len() {
            3 => Ok(Self::new(
                channel(&hex[0..1])? * 17,
                channel(&hex[1..2])? * 17,
                channel(&hex[2..3])? * 17,
            )),
            6 => Ok(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Color {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// How a material combines with what is already drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlendMode {
    #[default]
    Normal,
    Additive,
    Subtractive,
    Multiply,
}

/// Surface description of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
    pub double_sided: bool,
    pub depth_write: bool,
    pub depth_test: bool,
    pub wireframe: bool,
    pub blend_mode: BlendMode,
}

impl Material {
    /// Unlit opaque material.
    pub fn basic(color: Color) -> Self {
        Self {
            color,
            opacity: 1.0,
            transparent: false,
            double_sided: false,
            depth_write: true,
            depth_test: true,
            wireframe: false,
            blend_mode: BlendMode::Normal,
        }
    }

    /// Material with an opacity; marks it transparent.
    pub fn translucent(color: Color, opacity: f32) -> Self {
        Self {
            opacity,
            transparent: true,
            ..Self::basic(color)
        }
    }

    pub fn double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn without_depth_write(mut self) -> Self {
        self.depth_write = false;
        self
    }

    pub fn without_depth_test(mut self) -> Self {
        self.depth_test = false;
        self
    }

    pub fn wireframe(mut self) -> Self {
        self.wireframe = true;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: BlendMode) -> Self {
        self.blend_mode = blend_mode;
        self
    }
}

/// Handle to a material stored in a [`Scene`](super::Scene).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MaterialId(pub(crate) u64);
