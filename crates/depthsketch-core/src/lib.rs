//! DepthSketch Core Library
//!
//! Platform-agnostic scene, stroke history, layer and transform logic for the
//! DepthSketch 2D/3D drawing tool.

pub mod brush;
pub mod camera;
pub mod canvas;
pub mod config;
pub mod drawing;
pub mod error;
pub mod gizmo;
pub mod history;
pub mod input;
pub mod layers;
pub mod primitives;
pub mod ray;
pub mod scene;
pub mod transform;

pub use brush::{BrushSettings, BrushType, Brushes};
pub use camera::{Camera, ViewMode};
pub use canvas::{Canvas, ObjectEntry, ObjectList};
pub use config::CanvasConfig;
pub use drawing::{DrawContext, DrawingEngine, build_segment};
pub use error::ParseError;
pub use gizmo::{Axis, GizmoKind};
pub use history::{Stroke, StrokeHistory};
pub use input::{Command, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use layers::{Layer, LayerRegistry};
pub use primitives::PrimitiveKind;
pub use ray::{Plane, Ray};
pub use scene::{Color, Geometry, Material, Node, NodeId, NodeTag, Scene};
pub use transform::{TransformEngine, TransformMode};
