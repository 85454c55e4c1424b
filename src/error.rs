//! Error types for coreflow-fx.
//!
//! Simulation itself never fails: every input to the particle field and
//! connection graph is generated internally or bounded by the caller. Errors
//! only come from loading scene configuration and, with the `viewer` feature,
//! from setting up a window and GPU device.

use std::fmt;

/// Errors that can occur while loading or validating a scene configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to read or write the configuration file.
    Io(std::io::Error),
    /// The file was not valid scene JSON.
    Json(serde_json::Error),
    /// The configuration parsed but describes an impossible scene.
    Invalid(String),
    /// No preset with the given name exists.
    UnknownPreset(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to access scene config: {}", e),
            ConfigError::Json(e) => write!(f, "Failed to parse scene config: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid scene config: {}", msg),
            ConfigError::UnknownPreset(name) => write!(
                f,
                "Unknown scene preset '{}'. Available: {}",
                name,
                crate::presets::PRESET_NAMES.join(", ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::Invalid(_) | ConfigError::UnknownPreset(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Json(e)
    }
}

/// Errors that can occur when opening the scene viewer.
#[cfg(feature = "viewer")]
#[derive(Debug)]
pub enum ViewerError {
    /// Failed to create event loop.
    EventLoop(winit::error::EventLoopError),
    /// Failed to create window.
    Window(winit::error::OsError),
    /// Failed to create a surface for rendering.
    Surface(wgpu::CreateSurfaceError),
    /// No compatible GPU adapter found.
    NoAdapter,
    /// Failed to create GPU device.
    Device(wgpu::RequestDeviceError),
    /// The requested scene could not be configured.
    Config(ConfigError),
}

#[cfg(feature = "viewer")]
impl fmt::Display for ViewerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewerError::EventLoop(e) => write!(f, "Failed to create event loop: {}", e),
            ViewerError::Window(e) => write!(f, "Failed to create window: {}", e),
            ViewerError::Surface(e) => write!(f, "Failed to create GPU surface: {}", e),
            ViewerError::NoAdapter => write!(f, "No compatible GPU adapter found. Ensure your system has a GPU with WebGPU/Vulkan/Metal/DX12 support."),
            ViewerError::Device(e) => write!(f, "Failed to create GPU device: {}", e),
            ViewerError::Config(e) => write!(f, "{}", e),
        }
    }
}

#[cfg(feature = "viewer")]
impl std::error::Error for ViewerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewerError::EventLoop(e) => Some(e),
            ViewerError::Window(e) => Some(e),
            ViewerError::Surface(e) => Some(e),
            ViewerError::Device(e) => Some(e),
            ViewerError::Config(e) => Some(e),
            ViewerError::NoAdapter => None,
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::error::EventLoopError> for ViewerError {
    fn from(e: winit::error::EventLoopError) -> Self {
        ViewerError::EventLoop(e)
    }
}

#[cfg(feature = "viewer")]
impl From<winit::error::OsError> for ViewerError {
    fn from(e: winit::error::OsError) -> Self {
        ViewerError::Window(e)
    }
}

#[cfg(feature = "viewer")]
impl From<wgpu::CreateSurfaceError> for ViewerError {
    fn from(e: wgpu::CreateSurfaceError) -> Self {
        ViewerError::Surface(e)
    }
}

#[cfg(feature = "viewer")]
impl From<wgpu::RequestDeviceError> for ViewerError {
    fn from(e: wgpu::RequestDeviceError) -> Self {
        ViewerError::Device(e)
    }
}

#[cfg(feature = "viewer")]
impl From<ConfigError> for ViewerError {
    fn from(e: ConfigError) -> Self {
        ViewerError::Config(e)
    }
}
