use engine::{Canvas, Flow, Pose, Simulation, ViewSettings};
use glam::{Quat, Vec3};
use rapier3d::prelude::*;

use crate::collision::{CollisionResolver, ContactGroup, ContactHooks};
use crate::config::DemoConfig;
use crate::error::DemoError;
use crate::input::Action;
use crate::shape::{ShapeKind, ShapeRecord, ShapeRegistry};
use crate::world::PhysicsWorld;

/// The whole simulation: world, shapes and per-step contact state.
pub struct ShapesDemo {
    config: DemoConfig,
    world: PhysicsWorld,
    resolver: CollisionResolver,
    registry: ShapeRegistry,
    contacts: ContactGroup,
    steps: u64,
    last_contacts: usize,
}

impl ShapesDemo {
    /// Build the world and create the configured shapes.
    pub fn new(config: DemoConfig) -> Result<Self, DemoError> {
        let mut world = PhysicsWorld::new(&config.world, &config.contact)?;
        let resolver = CollisionResolver::new(world.ground(), &config.contact);
        let registry = ShapeRegistry::create(&mut world, &config.shapes)?;
        log::info!("created {} shapes: {:?}", registry.len(), registry.kinds());

        Ok(Self {
            config,
            world,
            resolver,
            registry,
            contacts: ContactGroup::new(),
            steps: 0,
            last_contacts: 0,
        })
    }

    pub fn config(&self) -> &DemoConfig {
        &self.config
    }

    /// Steps taken since startup or the last reset.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn registry(&self) -> &ShapeRegistry {
        &self.registry
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    /// Contact constraints currently held. Always empty between frames.
    pub fn contacts(&self) -> &ContactGroup {
        &self.contacts
    }

    /// How many contact constraints the most recent step created.
    pub fn last_step_contacts(&self) -> usize {
        self.last_contacts
    }

    /// Advance one step unless paused, then draw every shape.
    pub fn frame(&mut self, paused: bool, canvas: &mut dyn Canvas) {
        if !paused {
            self.step();
        }
        self.draw(canvas);
    }

    fn step(&mut self) {
        self.steps += 1;
        let links = self.world.linked_pairs();
        let hooks = ContactHooks {
            resolver: &self.resolver,
            links: &links,
            group: &self.contacts,
        };
        self.world.step(&hooks);
        self.last_contacts = self.contacts.len();
        self.contacts.clear();
    }

    fn draw(&self, canvas: &mut dyn Canvas) {
        for record in self.registry.records() {
            let Some(body) = self.world.body(record.body()) else {
                continue;
            };
            let pose = to_pose(body.position());
            canvas.set_color(record.spec().color);
            match record.kind() {
                ShapeKind::Sphere { radius } => canvas.draw_sphere(pose, radius),
                ShapeKind::Cylinder { radius, length } => canvas.draw_cylinder(pose, length, radius),
                ShapeKind::Capsule { radius, length } => canvas.draw_capsule(pose, length, radius),
                ShapeKind::Box { sides } => {
                    canvas.draw_box(pose, self.box_sides(record).unwrap_or(Vec3::from(sides)))
                }
            }
        }
    }

    /// Full side lengths of a box, as the collision geometry reports them.
    fn box_sides(&self, record: &ShapeRecord) -> Option<Vec3> {
        let cuboid = self.world.geometry(record.geometry())?.shape().as_cuboid()?;
        let half = cuboid.half_extents;
        Some(Vec3::new(half.x, half.y, half.z) * 2.0)
    }

    /// Recreate every shape at its initial pose and start counting steps from zero.
    ///
    /// The new set is built before the old one is removed; if building fails the
    /// current scene stays as it is.
    pub fn reset(&mut self) -> Result<(), DemoError> {
        let fresh = ShapeRegistry::create(&mut self.world, &self.config.shapes)?;
        let old = std::mem::replace(&mut self.registry, fresh);
        old.destroy(&mut self.world);
        self.contacts = ContactGroup::new();
        self.steps = 0;
        self.last_contacts = 0;
        log::info!("reset {} shapes", self.registry.len());
        Ok(())
    }

    pub fn dispatch(&mut self, key: char) -> Flow {
        match Action::for_key(key) {
            Action::Reset => {
                if let Err(err) = self.reset() {
                    log::error!("reset failed, keeping the current scene: {err}");
                }
                Flow::Continue
            }
            Action::Quit => Flow::Exit,
            Action::Unrecognized(key) => {
                log::warn!("key missed: {key:?}");
                Flow::Continue
            }
        }
    }
}

fn to_pose(position: &Isometry<Real>) -> Pose {
    let t = position.translation.vector;
    let r = position.rotation;
    Pose::new(Vec3::new(t.x, t.y, t.z), Quat::from_xyzw(r.i, r.j, r.k, r.w))
}

impl Simulation for ShapesDemo {
    fn on_start(&mut self, view: &mut ViewSettings) {
        *view = self.config.view;
        log::info!("press 'r' to reset the shapes, 'q' to quit");
    }

    fn on_frame(&mut self, paused: bool, canvas: &mut dyn Canvas) {
        self.frame(paused, canvas);
    }

    fn on_command(&mut self, key: char) -> Flow {
        self.dispatch(key)
    }
}
