//! Per-pair collision handling: which pairs collide, and with what surface.
//!
//! Rapier finds candidate pairs and their contact points; [`ContactHooks`] routes every
//! pair through a [`CollisionResolver`], which decides how many of those points become
//! contact constraints and records each one in the frame's [`ContactGroup`].

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use rapier3d::prelude::*;

use crate::config::ContactConfig;

/// Contact points kept per colliding pair.
pub const MAX_CONTACTS: usize = 7;

/// Friction handed to the solver in place of an infinite coefficient.
const UNBOUNDED_FRICTION: Real = 1.0e4;

/// Contact surface parameters.
///
/// Friction and bounce are applied to each solver contact. The solver has no per-contact
/// softness, so `soft_erp` and `soft_cfm` are recorded here but act only through the
/// world's contact spring (see [`PhysicsWorld::new`](crate::world::PhysicsWorld::new)),
/// for every contact alike.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    /// Coulomb friction; infinite means no sliding.
    pub mu: Real,
    pub bounce: Option<Real>,
    pub soft_erp: Option<Real>,
    pub soft_cfm: Option<Real>,
}

impl Surface {
    /// Friction coefficient in a form the solver can multiply with.
    pub fn solver_friction(&self) -> Real {
        if self.mu.is_finite() {
            self.mu
        } else {
            UNBOUNDED_FRICTION
        }
    }

    pub fn restitution(&self) -> Real {
        self.bounce.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactPoint {
    pub position: Point<Real>,
    /// Penetration depth; positive when the geometries overlap.
    pub depth: Real,
}

/// A contact constraint created for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactJoint {
    pub body1: Option<RigidBodyHandle>,
    pub body2: Option<RigidBodyHandle>,
    pub contact: ContactPoint,
    pub surface: Surface,
}

/// A pair of geometries whose bounding volumes overlap, with the bodies they belong to.
/// The ground has no body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePair {
    pub geometry1: ColliderHandle,
    pub geometry2: ColliderHandle,
    pub body1: Option<RigidBodyHandle>,
    pub body2: Option<RigidBodyHandle>,
}

/// Body pairs joined by a joint that disables contacts between them.
#[derive(Debug, Clone, Default)]
pub struct LinkedPairs {
    pairs: HashSet<(RigidBodyHandle, RigidBodyHandle)>,
}

impl LinkedPairs {
    pub fn insert(&mut self, a: RigidBodyHandle, b: RigidBodyHandle) {
        self.pairs.insert((a, b));
        self.pairs.insert((b, a));
    }

    pub fn contains(&self, a: RigidBodyHandle, b: RigidBodyHandle) -> bool {
        self.pairs.contains(&(a, b))
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Contact constraints of the current step. Emptied after every step.
#[derive(Debug, Default)]
pub struct ContactGroup {
    joints: Mutex<Vec<ContactJoint>>,
}

impl ContactGroup {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ContactJoint>> {
        self.joints.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, joint: ContactJoint) {
        self.lock().push(joint);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn joints(&self) -> Vec<ContactJoint> {
        self.lock().clone()
    }

    pub fn clear(&mut self) {
        self.joints
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionResolver {
    ground: ColliderHandle,
    max_contacts: usize,
    surface: Surface,
}

impl CollisionResolver {
    pub fn new(ground: ColliderHandle, contact: &ContactConfig) -> Self {
        Self {
            ground,
            max_contacts: contact.max_contacts.min(MAX_CONTACTS),
            surface: Surface {
                mu: contact.friction,
                bounce: Some(contact.bounce),
                soft_erp: Some(contact.soft_erp),
                soft_cfm: Some(contact.soft_cfm),
            },
        }
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    /// True if the pair's bodies are linked with contacts disabled.
    pub fn is_excluded(&self, pair: &CandidatePair, links: &LinkedPairs) -> bool {
        match (pair.body1, pair.body2) {
            (Some(a), Some(b)) => links.contains(a, b),
            _ => false,
        }
    }

    pub fn involves_ground(&self, pair: &CandidatePair) -> bool {
        pair.geometry1 == self.ground || pair.geometry2 == self.ground
    }

    /// Create contact constraints for one pair and return how many were created. Only
    /// pairs touching the ground are constrained; at most `max_contacts` points are used.
    pub fn resolve(
        &self,
        pair: &CandidatePair,
        links: &LinkedPairs,
        contacts: &[ContactPoint],
        group: &ContactGroup,
    ) -> usize {
        if self.is_excluded(pair, links) || !self.involves_ground(pair) {
            return 0;
        }
        if contacts.len() > self.max_contacts {
            log::debug!(
                "{} contact points between {:?} and {:?}, keeping {}",
                contacts.len(),
                pair.geometry1,
                pair.geometry2,
                self.max_contacts
            );
        }
        let kept = &contacts[..contacts.len().min(self.max_contacts)];
        for contact in kept {
            group.push(ContactJoint {
                body1: pair.body1,
                body2: pair.body2,
                contact: *contact,
                surface: self.surface,
            });
        }
        kept.len()
    }
}

/// Rapier hooks for one step. Contact points rapier keeps after the hooks run are exactly
/// the constraints the resolver created.
pub struct ContactHooks<'a> {
    pub resolver: &'a CollisionResolver,
    pub links: &'a LinkedPairs,
    pub group: &'a ContactGroup,
}

impl PhysicsHooks for ContactHooks<'_> {
    fn filter_contact_pair(&self, context: &PairFilterContext) -> Option<SolverFlags> {
        let pair = CandidatePair {
            geometry1: context.collider1,
            geometry2: context.collider2,
            body1: context.rigid_body1,
            body2: context.rigid_body2,
        };
        if self.resolver.is_excluded(&pair, self.links) {
            None
        } else {
            Some(SolverFlags::COMPUTE_IMPULSES)
        }
    }

    fn modify_solver_contacts(&self, context: &mut ContactModificationContext) {
        let pair = CandidatePair {
            geometry1: context.collider1,
            geometry2: context.collider2,
            body1: context.rigid_body1,
            body2: context.rigid_body2,
        };
        let points: Vec<ContactPoint> = context
            .solver_contacts
            .iter()
            .map(|c| ContactPoint {
                position: c.point,
                depth: -c.dist,
            })
            .collect();

        let created = self.resolver.resolve(&pair, self.links, &points, self.group);
        context.solver_contacts.truncate(created);

        let surface = self.resolver.surface();
        for contact in context.solver_contacts.iter_mut() {
            contact.friction = surface.solver_friction();
            contact.restitution = surface.restitution();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Fixture {
        ground: ColliderHandle,
        shape: ColliderHandle,
        other: ColliderHandle,
        body: RigidBodyHandle,
        other_body: RigidBodyHandle,
    }

    fn fixture() -> Fixture {
        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();
        let ground = colliders.insert(ColliderBuilder::halfspace(Vector::z_axis()));
        let body = bodies.insert(RigidBodyBuilder::dynamic());
        let other_body = bodies.insert(RigidBodyBuilder::dynamic());
        let shape = colliders.insert_with_parent(ColliderBuilder::ball(0.25), body, &mut bodies);
        let other =
            colliders.insert_with_parent(ColliderBuilder::ball(0.25), other_body, &mut bodies);
        Fixture {
            ground,
            shape,
            other,
            body,
            other_body,
        }
    }

    fn points(k: usize) -> Vec<ContactPoint> {
        (0..k)
            .map(|i| ContactPoint {
                position: point![i as Real * 0.01, 0.0, 0.0],
                depth: 0.001,
            })
            .collect()
    }

    fn ground_pair(f: &Fixture) -> CandidatePair {
        CandidatePair {
            geometry1: f.shape,
            geometry2: f.ground,
            body1: Some(f.body),
            body2: None,
        }
    }

    #[test]
    fn ground_contacts_become_soft_frictional_joints() {
        let f = fixture();
        let resolver = CollisionResolver::new(f.ground, &ContactConfig::default());
        let group = ContactGroup::new();

        for k in 1..=MAX_CONTACTS {
            let fresh = ContactGroup::new();
            let created = resolver.resolve(&ground_pair(&f), &LinkedPairs::default(), &points(k), &fresh);
            assert_eq!(created, k);
            assert_eq!(fresh.len(), k);
        }

        resolver.resolve(&ground_pair(&f), &LinkedPairs::default(), &points(3), &group);
        for joint in group.joints() {
            assert!(joint.surface.mu.is_infinite());
            assert_eq!(joint.surface.soft_erp, Some(0.1));
            assert_eq!(joint.surface.soft_cfm, Some(0.001));
            assert_eq!(joint.surface.bounce, Some(0.0));
            assert_eq!((joint.body1, joint.body2), (Some(f.body), None));
        }
    }

    #[test]
    fn excess_contacts_are_truncated() {
        let f = fixture();
        let resolver = CollisionResolver::new(f.ground, &ContactConfig::default());
        let group = ContactGroup::new();

        let created = resolver.resolve(&ground_pair(&f), &LinkedPairs::default(), &points(12), &group);
        assert_eq!(created, MAX_CONTACTS);
        let kept: Vec<_> = group.joints().iter().map(|j| j.contact).collect();
        assert_eq!(kept, points(MAX_CONTACTS));
    }

    #[test]
    fn ground_may_be_either_geometry() {
        let f = fixture();
        let resolver = CollisionResolver::new(f.ground, &ContactConfig::default());
        let group = ContactGroup::new();
        let pair = CandidatePair {
            geometry1: f.ground,
            geometry2: f.shape,
            body1: None,
            body2: Some(f.body),
        };
        assert_eq!(resolver.resolve(&pair, &LinkedPairs::default(), &points(2), &group), 2);
        assert_eq!(group.joints()[0].body2, Some(f.body));
    }

    #[test]
    fn shape_pairs_are_not_constrained() {
        let f = fixture();
        let resolver = CollisionResolver::new(f.ground, &ContactConfig::default());
        let group = ContactGroup::new();
        let pair = CandidatePair {
            geometry1: f.shape,
            geometry2: f.other,
            body1: Some(f.body),
            body2: Some(f.other_body),
        };
        assert_eq!(resolver.resolve(&pair, &LinkedPairs::default(), &points(4), &group), 0);
        assert!(group.is_empty());
    }

    #[test]
    fn linked_bodies_are_skipped() {
        let f = fixture();
        let resolver = CollisionResolver::new(f.ground, &ContactConfig::default());
        let group = ContactGroup::new();
        let pair = CandidatePair {
            geometry1: f.shape,
            geometry2: f.other,
            body1: Some(f.body),
            body2: Some(f.other_body),
        };
        let mut links = LinkedPairs::default();
        links.insert(f.other_body, f.body);

        assert!(resolver.is_excluded(&pair, &links));
        assert!(!resolver.is_excluded(&ground_pair(&f), &links));
        assert_eq!(resolver.resolve(&pair, &links, &points(4), &group), 0);
    }

    #[test]
    fn configured_limit_cannot_exceed_seven() {
        let f = fixture();
        let contact = ContactConfig {
            max_contacts: 3,
            ..ContactConfig::default()
        };
        let group = ContactGroup::new();
        let fewer = CollisionResolver::new(f.ground, &contact);
        assert_eq!(fewer.resolve(&ground_pair(&f), &LinkedPairs::default(), &points(5), &group), 3);

        let contact = ContactConfig {
            max_contacts: 50,
            ..ContactConfig::default()
        };
        let capped = CollisionResolver::new(f.ground, &contact);
        assert_eq!(capped.resolve(&ground_pair(&f), &LinkedPairs::default(), &points(9), &group), 7);
    }

    #[test]
    fn infinite_friction_stays_finite_for_the_solver() {
        let surface = CollisionResolver::new(ColliderHandle::invalid(), &ContactConfig::default()).surface();
        assert!(surface.solver_friction().is_finite());
        assert!(surface.solver_friction() > 1.0);

        let finite = Surface { mu: 0.5, ..surface };
        assert_eq!(finite.solver_friction(), 0.5);
    }
}
