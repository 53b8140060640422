pub mod camera;
pub mod draw;
pub mod graphics;
pub mod mesh;
pub mod texture;
