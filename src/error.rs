//! Error types for the particle field.
//!
//! Configuration and animator errors are recoverable and returned to the
//! caller. GPU and window errors only come out of the native host.

use thiserror::Error;

/// Errors produced while loading or validating a [`FieldConfig`](crate::FieldConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The particle count must be a positive integer.
    #[error("particle count must be at least 1")]
    ZeroParticles,
    /// The connection threshold must be a positive, finite distance.
    #[error("connection distance must be positive and finite, got {0}")]
    InvalidConnectionDistance(f32),
    /// Line opacity is an alpha value.
    #[error("max line opacity must be within 0.0..=1.0, got {0}")]
    InvalidOpacity(f32),
    /// Speed is the half-width of a symmetric range.
    #[error("max speed must be non-negative and finite, got {0}")]
    InvalidSpeed(f32),
    /// Radius range is empty, inverted or non-positive.
    #[error("radius range {min}..{max} is invalid")]
    InvalidRadius { min: f32, max: f32 },
    /// Stroke width must be positive.
    #[error("line width must be positive and finite, got {0}")]
    InvalidLineWidth(f32),
    /// Failed to parse or serialize JSON.
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// Failed to read or write the config file.
    #[error("failed to access config file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors produced by the animator itself.
#[derive(Debug, Error)]
pub enum FieldError {
    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    /// `initialize` was asked for zero particles.
    #[error("cannot initialize a field with zero particles")]
    EmptyField,
    /// The drawing surface has no area to place particles in.
    #[error("drawing surface has no area ({width}x{height})")]
    EmptySurface { width: f32, height: f32 },
}

/// Errors that can occur during GPU initialization.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum GpuError {
    /// Failed to create a surface for rendering.
    #[error("failed to create GPU surface: {0}")]
    SurfaceCreation(#[from] wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    #[error("no compatible GPU adapter found; ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support")]
    NoAdapter,
    /// Failed to create GPU device.
    #[error("failed to create GPU device: {0}")]
    DeviceCreation(#[from] wgpu::RequestDeviceError),
    /// The surface reports no usable texture format.
    #[error("GPU surface reports no supported texture formats")]
    NoSurfaceFormat,
}

/// Errors that can occur when running the native window host.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Error)]
pub enum RunError {
    /// Failed to create event loop.
    #[error("failed to create event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    /// Failed to create window.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),
    /// GPU initialization failed.
    #[error("GPU error: {0}")]
    Gpu(#[from] GpuError),
    /// The animator rejected its configuration or state.
    #[error("particle field error: {0}")]
    Field(#[from] FieldError),
}
