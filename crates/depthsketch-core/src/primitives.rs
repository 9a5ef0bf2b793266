//! Ready-made 2D shapes and 3D solids that can be placed on a layer.

use crate::error::ParseError;
use crate::scene::{Color, Geometry, Material, Node, NodeId, NodeTag, Scene};
use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};
use std::fmt;
use std::str::FromStr;

/// Segments used to outline curved flat shapes.
const OUTLINE_SEGMENTS: usize = 64;

/// Kind of primitive mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Square,
    Rectangle,
    Triangle,
    EquilateralTriangle,
    Circle,
    Ellipse,
    Star,
    Hexagon,
    Semicircle,
    Ring,
    Cube,
    Sphere,
    Cylinder,
    Cone,
    Torus,
    Plane,
}

impl PrimitiveKind {
    pub const ALL: [PrimitiveKind; 16] = [
        PrimitiveKind::Square,
        PrimitiveKind::Rectangle,
        PrimitiveKind::Triangle,
        PrimitiveKind::EquilateralTriangle,
        PrimitiveKind::Circle,
        PrimitiveKind::Ellipse,
        PrimitiveKind::Star,
        PrimitiveKind::Hexagon,
        PrimitiveKind::Semicircle,
        PrimitiveKind::Ring,
        PrimitiveKind::Cube,
        PrimitiveKind::Sphere,
        PrimitiveKind::Cylinder,
        PrimitiveKind::Cone,
        PrimitiveKind::Torus,
        PrimitiveKind::Plane,
    ];

    /// Toolbar name of the primitive.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Square => "square",
            PrimitiveKind::Rectangle => "rectangle",
            PrimitiveKind::Triangle => "triangle",
            PrimitiveKind::EquilateralTriangle => "equilateralTriangle",
            PrimitiveKind::Circle => "circle",
            PrimitiveKind::Ellipse => "ellipse",
            PrimitiveKind::Star => "star",
            PrimitiveKind::Hexagon => "hexagon",
            PrimitiveKind::Semicircle => "semicircle",
            PrimitiveKind::Ring => "ring",
            PrimitiveKind::Cube => "cube",
            PrimitiveKind::Sphere => "sphere",
            PrimitiveKind::Cylinder => "cylinder",
            PrimitiveKind::Cone => "cone",
            PrimitiveKind::Torus => "torus",
            PrimitiveKind::Plane => "plane",
        }
    }

    pub fn is_3d(self) -> bool {
        matches!(
            self,
            PrimitiveKind::Cube
                | PrimitiveKind::Sphere
                | PrimitiveKind::Cylinder
                | PrimitiveKind::Cone
                | PrimitiveKind::Torus
                | PrimitiveKind::Plane
        )
    }

    /// Geometry of the primitive, centred on the origin.
    pub fn geometry(self) -> Geometry {
        match self {
            PrimitiveKind::Square => polygon(&[(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)]),
            PrimitiveKind::Rectangle => polygon(&[(-1.0, -0.5), (1.0, -0.5), (1.0, 0.5), (-1.0, 0.5)]),
            PrimitiveKind::Triangle => polygon(&[(0.0, 0.5), (-0.5, -0.5), (0.5, -0.5)]),
            PrimitiveKind::EquilateralTriangle => {
                let h = 3.0_f32.sqrt() / 2.0;
                polygon(&[(-0.5, -h / 3.0), (0.5, -h / 3.0), (0.0, 2.0 * h / 3.0)])
            }
            PrimitiveKind::Circle => Geometry::Disc {
                radius: 0.5,
                segments: OUTLINE_SEGMENTS as u32,
            },
            PrimitiveKind::Ellipse => Geometry::Shape {
                outline: arc(Vec2::new(0.7, 0.4), 0.0, TAU, OUTLINE_SEGMENTS),
            },
            PrimitiveKind::Star => Geometry::Shape {
                outline: (0..10)
                    .map(|i| {
                        let angle = i as f32 * PI / 5.0;
                        let r: f32 = if i % 2 == 0 { 0.5 } else { 0.2 };
                        Vec2::from_angle(angle) * r
                    })
                    .collect(),
            },
            PrimitiveKind::Hexagon => Geometry::Shape {
                outline: arc(Vec2::splat(0.5), 0.0, TAU, 6),
            },
            PrimitiveKind::Semicircle => Geometry::Shape {
                outline: arc(Vec2::splat(0.5), PI, PI, OUTLINE_SEGMENTS / 2),
            },
            PrimitiveKind::Ring => Geometry::Ring { inner: 0.3, outer: 0.5 },
            PrimitiveKind::Cube => Geometry::Cuboid { size: Vec3::ONE },
            PrimitiveKind::Sphere => Geometry::Sphere { radius: 0.5, segments: 32 },
            PrimitiveKind::Cylinder => Geometry::Cylinder {
                radius_top: 0.5,
                radius_bottom: 0.5,
                height: 1.0,
            },
            PrimitiveKind::Cone => Geometry::Cylinder {
                radius_top: 0.0,
                radius_bottom: 0.5,
                height: 1.0,
            },
            PrimitiveKind::Torus => Geometry::Torus { radius: 0.5, tube: 0.2 },
            PrimitiveKind::Plane => Geometry::Plane { width: 1.0, height: 1.0 },
        }
    }

    /// Add the primitive at the origin with a double-sided material.
    pub fn spawn(self, scene: &mut Scene, color: Color) -> NodeId {
        let material = scene.create_material(Material::basic(color).double_sided());
        scene.add(Node::mesh(NodeTag::Primitive, self.geometry(), material).named(self.name()))
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveKind {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s.trim())
            .ok_or_else(|| ParseError::UnknownPrimitive(s.to_string()))
    }
}

fn polygon(points: &[(f32, f32)]) -> Geometry {
    Geometry::Shape {
        outline: points.iter().map(|&(x, y)| Vec2::new(x, y)).collect(),
    }
}

/// Elliptic arc from `start` sweeping `sweep` radians counter-clockwise.
/// A full turn omits the duplicated closing point.
fn arc(radii: Vec2, start: f32, sweep: f32, segments: usize) -> Vec<Vec2> {
    let closed = (sweep - TAU).abs() < f32::EPSILON;
    let count = if closed { segments } else { segments + 1 };
    (0..count)
        .map(|i| {
            let angle = start + sweep * i as f32 / segments as f32;
            Vec2::from_angle(angle) * radii
        })
        .collect()
}
