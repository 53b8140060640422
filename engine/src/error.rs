use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("event loop failed")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("could not create a window")]
    Window(#[from] winit::error::OsError),

    #[error("could not create a drawing surface")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable graphics adapter")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("could not open the graphics device")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface is not supported by the adapter")]
    UnsupportedSurface,

    #[error("could not read texture {path}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
