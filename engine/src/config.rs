use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Window and asset settings, read once when the loop starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Directory searched for `ground.png` / `ground.ppm`.
    pub textures: PathBuf,
    /// Texture repeats per metre on the ground plane.
    pub ground_scale: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Simulation".to_string(),
            width: 640,
            height: 480,
            textures: PathBuf::from("textures"),
            ground_scale: 0.4,
        }
    }
}

/// Camera and tessellation settings a simulation may adjust from `on_start`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub xyz: [f32; 3],
    /// Heading, pitch, roll in degrees.
    pub hpr: [f32; 3],
    pub sphere_quality: u32,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            xyz: [2.0, 0.0, 1.0],
            hpr: [180.0, 0.0, 0.0],
            sphere_quality: 1,
        }
    }
}
