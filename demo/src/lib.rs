//! Four primitive shapes dropped onto a ground plane.
//!
//! [`ShapesDemo`] owns the physics world and the shapes in it and implements
//! [`engine::Simulation`], so the same value runs in a window or under
//! [`engine::HeadlessRunner`].

pub mod collision;
pub mod config;
pub mod demo;
pub mod error;
pub mod input;
pub mod shape;
pub mod world;

pub use collision::{CollisionResolver, ContactGroup, ContactJoint, Surface, MAX_CONTACTS};
pub use config::{ContactConfig, DemoConfig, WorldConfig};
pub use demo::ShapesDemo;
pub use error::DemoError;
pub use input::Action;
pub use shape::{ShapeKind, ShapeRecord, ShapeRegistry, ShapeSpec};
pub use world::PhysicsWorld;
