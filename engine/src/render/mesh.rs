//! CPU tessellation of the drawing primitives into triangle lists.
//!
//! Everything is rebuilt every frame; the scenes this renderer is meant for hold a
//! handful of shapes, so there is no mesh caching beyond the unit sphere.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::{Vec3, Vec3Swizzles};

use super::draw::{Color, DrawCommand, Pose, Primitive};

/// Segments around the axis of cylinders and capsules.
const AXIAL_SEGMENTS: u32 = 24;
/// Latitude rings per capsule end cap.
const CAP_RINGS: u32 = 6;
/// Highest accepted sphere quality; each level multiplies the triangle count by four.
pub const MAX_SPHERE_QUALITY: u32 = 5;

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
    pub uv: [f32; 2],
    /// 1.0 when the fragment samples the ground texture, 0.0 for flat colour.
    pub textured: f32,
}

impl Vertex {
    pub const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x4,
        3 => Float32x2,
        4 => Float32
    ];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// How the ground plane is filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GroundStyle {
    Textured { scale: f32 },
    Flat(Color),
}

pub struct Tessellator {
    sphere_quality: u32,
    unit_sphere: Vec<[Vec3; 3]>,
}

impl Tessellator {
    pub fn new(sphere_quality: u32) -> Self {
        let sphere_quality = sphere_quality.min(MAX_SPHERE_QUALITY);
        Self {
            sphere_quality,
            unit_sphere: icosphere(sphere_quality),
        }
    }

    pub fn sphere_quality(&self) -> u32 {
        self.sphere_quality
    }

    pub fn set_sphere_quality(&mut self, quality: u32) {
        let quality = quality.min(MAX_SPHERE_QUALITY);
        if quality != self.sphere_quality {
            self.sphere_quality = quality;
            self.unit_sphere = icosphere(quality);
        }
    }

    pub fn tessellate(&self, command: &DrawCommand, out: &mut Vec<Vertex>) {
        let mut emit = Emitter {
            pose: command.pose,
            color: command.color.clamped(),
            out,
        };
        match command.primitive {
            Primitive::Sphere { radius } => {
                for tri in &self.unit_sphere {
                    for &n in tri {
                        emit.vertex(n * radius, n);
                    }
                }
            }
            Primitive::Cylinder { length, radius } => {
                tube(&mut emit, length, radius);
                disc(&mut emit, 0.5 * length, radius, 1.0);
                disc(&mut emit, -0.5 * length, radius, -1.0);
            }
            Primitive::Capsule { length, radius } => {
                tube(&mut emit, length, radius);
                hemisphere(&mut emit, 0.5 * length, radius, 1.0);
                hemisphere(&mut emit, -0.5 * length, radius, -1.0);
            }
            Primitive::Box { sides } => cuboid(&mut emit, 0.5 * sides),
        }
    }

    /// A square of `2 * half_size` on the `z = 0` plane, facing +Z.
    pub fn ground(&self, half_size: f32, style: GroundStyle, out: &mut Vec<Vertex>) {
        let (color, textured, scale) = match style {
            GroundStyle::Textured { scale } => (Color::WHITE.clamped(), 1.0, scale),
            GroundStyle::Flat(color) => (color.clamped(), 0.0, 0.0),
        };
        let h = half_size;
        let corners = [
            Vec3::new(-h, -h, 0.0),
            Vec3::new(h, -h, 0.0),
            Vec3::new(h, h, 0.0),
            Vec3::new(-h, -h, 0.0),
            Vec3::new(h, h, 0.0),
            Vec3::new(-h, h, 0.0),
        ];
        out.extend(corners.iter().map(|p| Vertex {
            position: p.to_array(),
            normal: [0.0, 0.0, 1.0],
            color,
            uv: [p.x * scale, p.y * scale],
            textured,
        }));
    }
}

struct Emitter<'a> {
    pose: Pose,
    color: [f32; 4],
    out: &'a mut Vec<Vertex>,
}

impl Emitter<'_> {
    fn vertex(&mut self, local: Vec3, normal: Vec3) {
        self.out.push(Vertex {
            position: self.pose.transform_point(local).to_array(),
            normal: self.pose.transform_vector(normal).to_array(),
            color: self.color,
            uv: [0.0, 0.0],
            textured: 0.0,
        });
    }

    fn quad(&mut self, corners: [Vec3; 4], normals: [Vec3; 4]) {
        for i in [0, 1, 2, 0, 2, 3] {
            self.vertex(corners[i], normals[i]);
        }
    }
}

fn ring_direction(i: u32) -> Vec3 {
    let angle = TAU * i as f32 / AXIAL_SEGMENTS as f32;
    Vec3::new(angle.cos(), angle.sin(), 0.0)
}

fn tube(emit: &mut Emitter<'_>, length: f32, radius: f32) {
    let top = Vec3::Z * (0.5 * length);
    for i in 0..AXIAL_SEGMENTS {
        let n0 = ring_direction(i);
        let n1 = ring_direction(i + 1);
        emit.quad(
            [
                n0 * radius - top,
                n1 * radius - top,
                n1 * radius + top,
                n0 * radius + top,
            ],
            [n0, n1, n1, n0],
        );
    }
}

fn disc(emit: &mut Emitter<'_>, z: f32, radius: f32, facing: f32) {
    let center = Vec3::new(0.0, 0.0, z);
    let normal = Vec3::Z * facing;
    for i in 0..AXIAL_SEGMENTS {
        emit.vertex(center, normal);
        emit.vertex(center + ring_direction(i) * radius, normal);
        emit.vertex(center + ring_direction(i + 1) * radius, normal);
    }
}

fn hemisphere(emit: &mut Emitter<'_>, z: f32, radius: f32, facing: f32) {
    let center = Vec3::new(0.0, 0.0, z);
    let point = |ring: u32, seg: u32| {
        let latitude = FRAC_PI_2 * ring as f32 / CAP_RINGS as f32;
        let around = ring_direction(seg) * latitude.cos();
        around + Vec3::Z * (facing * latitude.sin())
    };
    for ring in 0..CAP_RINGS {
        for seg in 0..AXIAL_SEGMENTS {
            let n = [
                point(ring, seg),
                point(ring, seg + 1),
                point(ring + 1, seg + 1),
                point(ring + 1, seg),
            ];
            emit.quad(n.map(|d| center + d * radius), n);
        }
    }
}

fn cuboid(emit: &mut Emitter<'_>, half: Vec3) {
    for axis in [Vec3::X, Vec3::Y, Vec3::Z] {
        for sign in [1.0, -1.0] {
            let normal = axis * sign;
            // Two directions spanning the face.
            let u = axis.yzx();
            let v = axis.zxy() * sign;
            let c = normal * half;
            let (hu, hv) = (u * half, v * half);
            emit.quad(
                [c - hu - hv, c + hu - hv, c + hu + hv, c - hu + hv],
                [normal; 4],
            );
        }
    }
}

/// Unit icosahedron split `quality` times, as a flat list of triangles.
fn icosphere(quality: u32) -> Vec<[Vec3; 3]> {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let v = [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .map(Vec3::normalize);
    const FACES: [[usize; 3]; 20] = [
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    let mut triangles: Vec<[Vec3; 3]> = FACES.iter().map(|f| f.map(|i| v[i])).collect();
    for _ in 0..quality {
        triangles = triangles
            .into_iter()
            .flat_map(|[a, b, c]| {
                let ab = (a + b).normalize();
                let bc = (b + c).normalize();
                let ca = (c + a).normalize();
                [[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]
            })
            .collect();
    }
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::draw::{Canvas, DrawList};

    fn tessellate_one(tess: &Tessellator, draw: impl FnOnce(&mut DrawList)) -> Vec<Vertex> {
        let mut list = DrawList::new();
        draw(&mut list);
        let mut out = Vec::new();
        tess.tessellate(&list.commands()[0], &mut out);
        out
    }

    #[test]
    fn sphere_triangle_count_grows_with_quality() {
        for quality in 0..=3 {
            let tess = Tessellator::new(quality);
            let verts = tessellate_one(&tess, |c| c.draw_sphere(Pose::IDENTITY, 1.0));
            assert_eq!(verts.len(), 3 * 20 * 4usize.pow(quality));
        }
    }

    #[test]
    fn sphere_quality_is_capped() {
        let tess = Tessellator::new(99);
        assert_eq!(tess.sphere_quality(), MAX_SPHERE_QUALITY);
    }

    #[test]
    fn sphere_vertices_lie_on_radius() {
        let tess = Tessellator::new(2);
        let center = Vec3::new(1.0, -2.0, 3.0);
        let pose = Pose::new(center, glam::Quat::IDENTITY);
        let verts = tessellate_one(&tess, |c| c.draw_sphere(pose, 0.25));
        for v in verts {
            let d = Vec3::from_array(v.position).distance(center);
            assert!((d - 0.25).abs() < 1e-5, "distance {d}");
        }
    }

    #[test]
    fn box_has_twelve_triangles_within_extents() {
        let tess = Tessellator::new(0);
        let sides = Vec3::new(0.3, 0.4, 0.5);
        let verts = tessellate_one(&tess, |c| c.draw_box(Pose::IDENTITY, sides));
        assert_eq!(verts.len(), 36);
        for v in verts {
            let p = Vec3::from_array(v.position).abs();
            assert!(p.cmple(sides * 0.5 + 1e-6).all(), "{p} outside box");
        }
    }

    #[test]
    fn cylinder_spans_its_length_along_local_z() {
        let tess = Tessellator::new(0);
        let verts = tessellate_one(&tess, |c| c.draw_cylinder(Pose::IDENTITY, 0.5, 0.1));
        let (lo, hi) = verts.iter().fold((f32::MAX, f32::MIN), |(lo, hi), v| {
            (lo.min(v.position[2]), hi.max(v.position[2]))
        });
        assert!((lo + 0.25).abs() < 1e-6 && (hi - 0.25).abs() < 1e-6);
    }

    #[test]
    fn capsule_caps_extend_past_the_tube() {
        let tess = Tessellator::new(0);
        let verts = tessellate_one(&tess, |c| c.draw_capsule(Pose::IDENTITY, 0.5, 0.1));
        let hi = verts.iter().map(|v| v.position[2]).fold(f32::MIN, f32::max);
        assert!((hi - 0.35).abs() < 1e-5, "top at {hi}");
    }

    #[test]
    fn ground_is_two_triangles_on_the_plane() {
        let tess = Tessellator::new(0);
        let mut out = Vec::new();
        tess.ground(10.0, GroundStyle::Textured { scale: 0.4 }, &mut out);
        assert_eq!(out.len(), 6);
        assert!(out.iter().all(|v| v.position[2] == 0.0 && v.textured == 1.0));
    }
}
