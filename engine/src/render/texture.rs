use std::path::{Path, PathBuf};

use crate::error::EngineError;

/// File names tried, in order, for the ground texture.
const GROUND_FILES: [&str; 2] = ["ground.png", "ground.ppm"];
const CHECKER_SIZE: u32 = 64;
const CHECKER_CELL: u32 = 8;

/// Decoded RGBA8 pixels, row-major, no padding.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl TextureImage {
    /// A two-tone checkerboard used when no ground image is available.
    pub fn checker() -> Self {
        let (light, dark) = ([178u8, 166, 140], [140u8, 128, 104]);
        let mut rgba = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
        for y in 0..CHECKER_SIZE {
            for x in 0..CHECKER_SIZE {
                let cell = (x / CHECKER_CELL + y / CHECKER_CELL) % 2;
                let [r, g, b] = if cell == 0 { light } else { dark };
                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
        Self {
            width: CHECKER_SIZE,
            height: CHECKER_SIZE,
            rgba,
        }
    }

    pub fn open(path: &Path) -> Result<Self, EngineError> {
        let image = image::open(path)
            .map_err(|source| EngineError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        Ok(Self {
            width,
            height,
            rgba: image.into_raw(),
        })
    }
}

fn ground_path(dir: &Path) -> Option<PathBuf> {
    GROUND_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

/// Load the ground texture from `dir`, falling back to [`TextureImage::checker`].
pub fn load_ground(dir: &Path) -> TextureImage {
    let Some(path) = ground_path(dir) else {
        log::info!("no ground texture in {}, using checker", dir.display());
        return TextureImage::checker();
    };
    match TextureImage::open(&path) {
        Ok(image) => {
            log::debug!(
                "loaded {} ({}x{})",
                path.display(),
                image.width,
                image.height
            );
            image
        }
        Err(err) => {
            log::warn!("{err}; using checker");
            TextureImage::checker()
        }
    }
}
