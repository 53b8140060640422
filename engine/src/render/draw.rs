use glam::{Quat, Vec3};

/// RGBA colour. Channels above 1.0 are accepted and clamped when drawn.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn clamped(self) -> [f32; 4] {
        [
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Position and orientation of a drawn primitive in world space.
///
/// Cylinders and capsules are drawn along the pose's local Z axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub const IDENTITY: Pose = Pose {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }
}

/// Immediate-mode primitive drawing, one call per shape per frame.
pub trait Canvas {
    fn set_color(&mut self, color: Color);
    fn draw_sphere(&mut self, pose: Pose, radius: f32);
    fn draw_cylinder(&mut self, pose: Pose, length: f32, radius: f32);
    fn draw_capsule(&mut self, pose: Pose, length: f32, radius: f32);
    /// `sides` are full edge lengths, not half extents.
    fn draw_box(&mut self, pose: Pose, sides: Vec3);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Sphere { radius: f32 },
    Cylinder { length: f32, radius: f32 },
    Capsule { length: f32, radius: f32 },
    Box { sides: Vec3 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub color: Color,
    pub pose: Pose,
    pub primitive: Primitive,
}

/// A [`Canvas`] that records what was drawn during one frame.
///
/// The GPU renderer tessellates the recorded commands; tests inspect them directly.
#[derive(Debug, Default, Clone)]
pub struct DrawList {
    color: Color,
    commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Forget the recorded commands and reset the current colour.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.color = Color::WHITE;
    }

    fn push(&mut self, pose: Pose, primitive: Primitive) {
        self.commands.push(DrawCommand {
            color: self.color,
            pose,
            primitive,
        });
    }
}

impl Canvas for DrawList {
    fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    fn draw_sphere(&mut self, pose: Pose, radius: f32) {
        self.push(pose, Primitive::Sphere { radius });
    }

    fn draw_cylinder(&mut self, pose: Pose, length: f32, radius: f32) {
        self.push(pose, Primitive::Cylinder { length, radius });
    }

    fn draw_capsule(&mut self, pose: Pose, length: f32, radius: f32) {
        self.push(pose, Primitive::Capsule { length, radius });
    }

    fn draw_box(&mut self, pose: Pose, sides: Vec3) {
        self.push(pose, Primitive::Box { sides });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn records_color_with_each_command() {
        let mut list = DrawList::new();
        list.set_color(Color::rgb(1.0, 0.0, 0.0));
        list.draw_sphere(Pose::IDENTITY, 0.5);
        list.set_color(Color::rgb(0.0, 0.0, 1.0));
        list.draw_box(Pose::IDENTITY, Vec3::new(1.0, 2.0, 3.0));

        let colors: Vec<Color> = list.commands().iter().map(|c| c.color).collect();
        assert_eq!(
            colors,
            vec![Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.0, 0.0, 1.0)]
        );
        assert_eq!(
            list.commands()[1].primitive,
            Primitive::Box {
                sides: Vec3::new(1.0, 2.0, 3.0)
            }
        );
    }

    #[test]
    fn clear_resets_current_color() {
        let mut list = DrawList::new();
        list.set_color(Color::rgb(0.2, 0.0, 0.0));
        list.draw_capsule(Pose::IDENTITY, 0.5, 0.1);
        list.clear();
        list.draw_cylinder(Pose::IDENTITY, 0.5, 0.1);

        assert_eq!(list.len(), 1);
        assert_eq!(list.commands()[0].color, Color::WHITE);
    }

    #[test]
    fn overbright_channels_are_clamped() {
        assert_eq!(Color::rgb(1.2, 1.0, -0.5).clamped(), [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn pose_rotates_then_translates() {
        let pose = Pose::new(
            Vec3::new(0.0, 0.0, 1.0),
            Quat::from_rotation_x(std::f32::consts::FRAC_PI_2),
        );
        let p = pose.transform_point(Vec3::Y);
        assert!((p - Vec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
    }
}
