//! Error types surfaced by the renderer and its backends.

use std::path::PathBuf;

/// Configuration or programming error detected while setting up GPU state.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("shader compilation failed ({stage}):\n{message}")]
    ShaderCompile { stage: &'static str, message: String },

    #[error("shader is missing entry point `{entry}` ({stage})")]
    MissingEntryPoint { stage: &'static str, entry: &'static str },

    #[error("vertex shader reads location {location}, which the vertex layout does not provide")]
    UnknownVertexInput { location: u32 },

    #[error("uniform not found: {0}")]
    UnknownUniform(String),

    #[error("uniform `{name}` expects a {expected}, got a {got}")]
    UniformMismatch {
        name: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("render target of {width}x{height} is incomplete (limit {max})")]
    IncompleteTarget { width: u32, height: u32, max: u32 },
}

/// Failure of an asynchronous texture load; delivered to the caller, never fatal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TextureLoadError {
    #[error("failed to read texture {path}: {message}")]
    Io { path: PathBuf, message: String },

    #[error("failed to decode texture {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("texture loader shut down before {path} finished")]
    Abandoned { path: PathBuf },
}
