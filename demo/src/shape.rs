//! Shape kinds, their mass distributions, and the registry of live shapes.

use std::f32::consts::{FRAC_PI_2, PI};

use engine::Color;
use rapier3d::na::{Unit, UnitQuaternion};
use rapier3d::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::DemoError;
use crate::world::PhysicsWorld;

/// Geometry of one shape. Cylinders and capsules run along the body's local Z axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShapeKind {
    Sphere { radius: f32 },
    Cylinder { radius: f32, length: f32 },
    /// `length` excludes the two hemispherical caps.
    Capsule { radius: f32, length: f32 },
    /// Full edge lengths along local X, Y, Z.
    Box { sides: [f32; 3] },
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Sphere { .. } => "sphere",
            ShapeKind::Cylinder { .. } => "cylinder",
            ShapeKind::Capsule { .. } => "capsule",
            ShapeKind::Box { .. } => "box",
        }
    }

    fn dimensions(&self) -> Vec<(&'static str, f32)> {
        match *self {
            ShapeKind::Sphere { radius } => vec![("radius", radius)],
            ShapeKind::Cylinder { radius, length } | ShapeKind::Capsule { radius, length } => {
                vec![("radius", radius), ("length", length)]
            }
            ShapeKind::Box { sides: [x, y, z] } => vec![("x side", x), ("y side", y), ("z side", z)],
        }
    }

    /// Check that every dimension and the mass are positive and finite.
    pub fn validate(&self, mass: f32) -> Result<(), String> {
        let checks = self.dimensions().into_iter().chain([("mass", mass)]);
        for (label, value) in checks {
            if !(value.is_finite() && value > 0.0) {
                return Err(format!("{label} must be positive, got {value}"));
            }
        }
        Ok(())
    }

    pub fn volume(&self) -> f32 {
        match *self {
            ShapeKind::Sphere { radius } => 4.0 / 3.0 * PI * radius.powi(3),
            ShapeKind::Cylinder { radius, length } => PI * radius.powi(2) * length,
            ShapeKind::Capsule { radius, length } => {
                PI * radius.powi(2) * length + 4.0 / 3.0 * PI * radius.powi(3)
            }
            ShapeKind::Box { sides: [x, y, z] } => x * y * z,
        }
    }

    /// Principal moments of inertia of a uniform solid with total `mass`, about the
    /// centre of mass and the local axes.
    pub fn principal_inertia(&self, mass: f32) -> Vector<Real> {
        match *self {
            ShapeKind::Sphere { radius } => {
                let i = 0.4 * mass * radius * radius;
                vector![i, i, i]
            }
            ShapeKind::Cylinder { radius, length } => {
                let r2 = radius * radius;
                let across = mass * (0.25 * r2 + length * length / 12.0);
                vector![across, across, 0.5 * mass * r2]
            }
            ShapeKind::Capsule { radius, length } => {
                // Split the mass between the tube and the two caps by volume.
                let tube_volume = PI * radius * radius * length;
                let caps_volume = 4.0 / 3.0 * PI * radius.powi(3);
                let density = mass / (tube_volume + caps_volume);
                let (m_tube, m_caps) = (density * tube_volume, density * caps_volume);
                let r2 = radius * radius;
                let across = m_tube * (0.25 * r2 + length * length / 12.0)
                    + m_caps * (0.4 * r2 + 0.375 * radius * length + 0.25 * length * length);
                vector![across, across, (0.5 * m_tube + 0.4 * m_caps) * r2]
            }
            ShapeKind::Box { sides: [x, y, z] } => {
                let k = mass / 12.0;
                vector![k * (y * y + z * z), k * (x * x + z * z), k * (x * x + y * y)]
            }
        }
    }

    pub fn mass_properties(&self, mass: f32) -> MassProperties {
        MassProperties::new(Point::origin(), mass, self.principal_inertia(mass))
    }

    /// Collision geometry for this kind. Mass comes from the body, not the geometry.
    pub fn collider(&self) -> ColliderBuilder {
        let builder = match *self {
            ShapeKind::Sphere { radius } => ColliderBuilder::ball(radius),
            // Rapier cylinders run along Y; turn them onto the body's Z axis.
            ShapeKind::Cylinder { radius, length } => {
                ColliderBuilder::cylinder(0.5 * length, radius).rotation(vector![FRAC_PI_2, 0.0, 0.0])
            }
            ShapeKind::Capsule { radius, length } => ColliderBuilder::capsule_z(0.5 * length, radius),
            ShapeKind::Box { sides: [x, y, z] } => ColliderBuilder::cuboid(0.5 * x, 0.5 * y, 0.5 * z),
        };
        builder.density(0.0)
    }
}

fn default_axis() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

/// Everything needed to create one shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeSpec {
    #[serde(flatten)]
    pub kind: ShapeKind,
    pub mass: f32,
    pub position: [f32; 3],
    #[serde(default = "default_axis")]
    pub rotation_axis: [f32; 3],
    #[serde(default)]
    pub rotation_degrees: f32,
    #[serde(default)]
    pub color: Color,
}

impl ShapeSpec {
    /// Sphere, cylinder, capsule and box side by side one metre above the ground.
    pub fn default_scene() -> Vec<ShapeSpec> {
        let at = |kind, mass, position, color| ShapeSpec {
            kind,
            mass,
            position,
            rotation_axis: default_axis(),
            rotation_degrees: 0.0,
            color,
        };
        vec![
            at(
                ShapeKind::Sphere { radius: 0.25 },
                14.0,
                [0.0, -2.0, 1.0],
                Color::rgb(1.2, 0.0, 0.0),
            ),
            at(
                ShapeKind::Cylinder {
                    radius: 0.1,
                    length: 0.5,
                },
                1.0,
                [0.0, -0.7, 1.0],
                Color::rgb(1.2, 1.0, 0.0),
            ),
            at(
                ShapeKind::Capsule {
                    radius: 0.1,
                    length: 0.5,
                },
                1.0,
                [0.0, 0.7, 1.0],
                Color::rgb(1.2, 0.0, 1.0),
            ),
            at(
                ShapeKind::Box {
                    sides: [0.3, 0.4, 0.5],
                },
                1.0,
                [0.0, 2.0, 1.0],
                Color::rgb(0.2, 0.0, 0.0),
            ),
        ]
    }

    pub fn translation(&self) -> Vector<Real> {
        let [x, y, z] = self.position;
        vector![x, y, z]
    }

    /// Initial orientation; a zero axis means no rotation.
    pub fn rotation(&self) -> Rotation<Real> {
        let [x, y, z] = self.rotation_axis;
        match Unit::try_new(vector![x, y, z], f32::EPSILON) {
            Some(axis) => UnitQuaternion::from_axis_angle(&axis, self.rotation_degrees.to_radians()),
            None => UnitQuaternion::identity(),
        }
    }
}

/// One live shape: a body in the world and the geometry attached to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeRecord {
    spec: ShapeSpec,
    body: RigidBodyHandle,
    geometry: ColliderHandle,
}

impl ShapeRecord {
    fn create(world: &mut PhysicsWorld, spec: &ShapeSpec) -> Result<Self, DemoError> {
        let what = spec.kind.name();
        spec.kind
            .validate(spec.mass)
            .map_err(|reason| DemoError::ResourceCreation { what, reason })?;

        let body = world.insert_body(
            RigidBodyBuilder::dynamic()
                .translation(spec.translation())
                // Resting shapes keep producing ground contacts every step.
                .can_sleep(false)
                .additional_mass_properties(spec.kind.mass_properties(spec.mass))
                .build(),
        );
        let geometry = world.attach_geometry(spec.kind.collider().build(), body);
        if world.geometry_body(geometry) != Some(body) {
            world.remove_geometry(geometry);
            world.remove_body(body);
            return Err(DemoError::ResourceCreation {
                what,
                reason: "geometry did not bind to its body".to_string(),
            });
        }
        if let Some(rb) = world.body_mut(body) {
            rb.set_rotation(spec.rotation(), true);
        }

        log::debug!("created {what} (mass {}) at {:?}", spec.mass, spec.position);
        Ok(Self {
            spec: *spec,
            body,
            geometry,
        })
    }

    fn destroy(self, world: &mut PhysicsWorld) {
        world.remove_geometry(self.geometry);
        world.remove_body(self.body);
    }

    pub fn spec(&self) -> &ShapeSpec {
        &self.spec
    }

    pub fn kind(&self) -> ShapeKind {
        self.spec.kind
    }

    pub fn body(&self) -> RigidBodyHandle {
        self.body
    }

    pub fn geometry(&self) -> ColliderHandle {
        self.geometry
    }
}

/// The set of live shapes, in creation order.
#[derive(Debug, Default)]
pub struct ShapeRegistry {
    records: Vec<ShapeRecord>,
}

impl ShapeRegistry {
    /// Create every shape in `specs`. On failure the shapes created so far are removed
    /// again and the world is left as it was.
    pub fn create(world: &mut PhysicsWorld, specs: &[ShapeSpec]) -> Result<Self, DemoError> {
        let mut registry = Self {
            records: Vec::with_capacity(specs.len()),
        };
        for spec in specs {
            match ShapeRecord::create(world, spec) {
                Ok(record) => registry.records.push(record),
                Err(err) => {
                    registry.destroy(world);
                    return Err(err);
                }
            }
        }
        Ok(registry)
    }

    pub fn destroy(self, world: &mut PhysicsWorld) {
        for record in self.records {
            record.destroy(world);
        }
    }

    pub fn records(&self) -> &[ShapeRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.records.iter().map(|r| r.kind().name()).collect()
    }
}
