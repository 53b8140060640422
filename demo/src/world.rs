//! The dynamics world and collision space, wrapped around rapier's sets and pipeline.

use std::f32::consts::TAU;

use rapier3d::prelude::*;

use crate::collision::LinkedPairs;
use crate::config::{ContactConfig, WorldConfig};
use crate::error::DemoError;

/// Spring parameters equivalent to an ERP/CFM pair at a given timestep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    /// Hz.
    pub natural_frequency: Real,
    pub damping_ratio: Real,
}

impl Spring {
    /// Convert error reduction and constraint force mixing to stiffness and damping, for a
    /// unit effective mass: `kp = erp / (dt * cfm)`, `kd = (1 - erp) / cfm`.
    pub fn from_erp_cfm(erp: Real, cfm: Real, dt: Real) -> Self {
        let stiffness = erp / (dt * cfm);
        let damping = (1.0 - erp) / cfm;
        let omega = stiffness.sqrt();
        Self {
            natural_frequency: omega / TAU,
            damping_ratio: damping / (2.0 * omega),
        }
    }
}

pub struct PhysicsWorld {
    gravity: Vector<Real>,
    params: IntegrationParameters,
    pipeline: PhysicsPipeline,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    ground: ColliderHandle,
}

impl PhysicsWorld {
    /// An empty world with gravity, solver parameters and the static ground plane `z = 0`.
    ///
    /// Settings that would give the solver a non-finite spring are rejected.
    pub fn new(world: &WorldConfig, contact: &ContactConfig) -> Result<Self, DemoError> {
        world.validate()?;
        contact.validate()?;
        let [gx, gy, gz] = world.gravity;
        let dt = world.timestep;

        let mut params = IntegrationParameters::default();
        params.dt = dt;
        let joints = Spring::from_erp_cfm(world.erp, world.cfm, dt);
        params.joint_natural_frequency = joints.natural_frequency;
        params.joint_damping_ratio = joints.damping_ratio;
        let contacts = Spring::from_erp_cfm(contact.soft_erp, contact.soft_cfm, dt);
        params.contact_natural_frequency = contacts.natural_frequency;
        params.contact_damping_ratio = contacts.damping_ratio;
        log::debug!("joint spring {joints:?}, contact spring {contacts:?}");

        let mut colliders = ColliderSet::new();
        let ground = colliders.insert(
            ColliderBuilder::halfspace(Vector::z_axis())
                .active_hooks(ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::MODIFY_SOLVER_CONTACTS)
                .build(),
        );

        Ok(Self {
            gravity: vector![gx, gy, gz],
            params,
            pipeline: PhysicsPipeline::new(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders,
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            ground,
        })
    }

    pub fn ground(&self) -> ColliderHandle {
        self.ground
    }

    pub fn timestep(&self) -> Real {
        self.params.dt
    }

    pub fn insert_body(&mut self, body: RigidBody) -> RigidBodyHandle {
        self.bodies.insert(body)
    }

    /// Insert `collider` bound to `body`, so its pose follows the body.
    pub fn attach_geometry(&mut self, collider: Collider, body: RigidBodyHandle) -> ColliderHandle {
        let mut collider = collider;
        collider.set_active_hooks(
            ActiveHooks::FILTER_CONTACT_PAIRS | ActiveHooks::MODIFY_SOLVER_CONTACTS,
        );
        self.colliders
            .insert_with_parent(collider, body, &mut self.bodies)
    }

    pub fn remove_body(&mut self, body: RigidBodyHandle) -> bool {
        self.bodies
            .remove(
                body,
                &mut self.islands,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn remove_geometry(&mut self, geometry: ColliderHandle) -> bool {
        self.colliders
            .remove(geometry, &mut self.islands, &mut self.bodies, true)
            .is_some()
    }

    pub fn body(&self, body: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(body)
    }

    pub fn body_mut(&mut self, body: RigidBodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(body)
    }

    pub fn geometry(&self, geometry: ColliderHandle) -> Option<&Collider> {
        self.colliders.get(geometry)
    }

    /// The body a geometry is bound to, if any.
    pub fn geometry_body(&self, geometry: ColliderHandle) -> Option<RigidBodyHandle> {
        self.colliders.get(geometry).and_then(Collider::parent)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Includes the ground plane.
    pub fn geometry_count(&self) -> usize {
        self.colliders.len()
    }

    /// Rigidly join two bodies with contacts between them disabled.
    pub fn join(&mut self, body1: RigidBodyHandle, body2: RigidBodyHandle) -> ImpulseJointHandle {
        let joint = FixedJointBuilder::new().contacts_enabled(false);
        self.impulse_joints.insert(body1, body2, joint, true)
    }

    /// Body pairs held together by a joint that disables contacts between them.
    pub fn linked_pairs(&self) -> LinkedPairs {
        let mut links = LinkedPairs::default();
        for (_, joint) in self.impulse_joints.iter() {
            if !joint.data.contacts_enabled {
                links.insert(joint.body1, joint.body2);
            }
        }
        links
    }

    /// Advance by one timestep. Every candidate contact pair is routed through `hooks`.
    pub fn step(&mut self, hooks: &dyn PhysicsHooks) {
        self.pipeline.step(
            &self.gravity,
            &self.params,
            &mut self.islands,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            hooks,
            &(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soft_contact_spring_matches_hand_computation() {
        // kp = 0.1 / (0.01 * 0.001) = 1e4, kd = 0.9 / 0.001 = 900.
        let spring = Spring::from_erp_cfm(0.1, 0.001, 0.01);
        assert!((spring.natural_frequency - 100.0 / TAU).abs() < 1e-3);
        assert!((spring.damping_ratio - 4.5).abs() < 1e-4);
    }

    #[test]
    fn stiffer_erp_gives_higher_frequency() {
        let soft = Spring::from_erp_cfm(0.1, 1e-4, 0.01);
        let stiff = Spring::from_erp_cfm(0.9, 1e-4, 0.01);
        assert!(stiff.natural_frequency > soft.natural_frequency);
        assert!(stiff.damping_ratio < soft.damping_ratio);
    }

    #[test]
    fn new_world_holds_only_the_ground() {
        let world = PhysicsWorld::new(&WorldConfig::default(), &ContactConfig::default()).unwrap();
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.geometry_count(), 1);
        assert_eq!(world.geometry_body(world.ground()), None);
        assert_eq!(world.timestep(), 0.01);
    }

    #[test]
    fn degenerate_settings_do_not_build_a_world() {
        let contact = ContactConfig {
            soft_cfm: 0.0,
            ..ContactConfig::default()
        };
        assert!(PhysicsWorld::new(&WorldConfig::default(), &contact).is_err());

        let world = WorldConfig {
            timestep: -0.01,
            ..WorldConfig::default()
        };
        assert!(PhysicsWorld::new(&world, &ContactConfig::default()).is_err());
    }

    #[test]
    fn joined_bodies_are_linked_both_ways() {
        let mut world = PhysicsWorld::new(&WorldConfig::default(), &ContactConfig::default()).unwrap();
        let a = world.insert_body(RigidBodyBuilder::dynamic().build());
        let b = world.insert_body(RigidBodyBuilder::dynamic().build());
        let c = world.insert_body(RigidBodyBuilder::dynamic().build());
        world.join(a, b);

        let links = world.linked_pairs();
        assert!(links.contains(a, b) && links.contains(b, a));
        assert!(!links.contains(a, c));
    }

    #[test]
    fn gravity_pulls_free_bodies_down() {
        let mut world = PhysicsWorld::new(&WorldConfig::default(), &ContactConfig::default()).unwrap();
        let body = world.insert_body(
            RigidBodyBuilder::dynamic()
                .translation(vector![0.0, 0.0, 5.0])
                .build(),
        );
        world.attach_geometry(ColliderBuilder::ball(0.1).build(), body);
        for _ in 0..10 {
            world.step(&());
        }
        let z = world.body(body).unwrap().translation().z;
        assert!(z < 5.0 && z > 4.0, "z = {z}");
    }
}
