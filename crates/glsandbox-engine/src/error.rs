//! Engine error types.

use std::path::PathBuf;

use crate::gl::{CallSite, GlErrorCode, ShaderStage};

/// Errors surfaced by the GPU wrapper layer.
#[derive(Debug, thiserror::Error)]
pub enum GraphicsError {
    /// The driver error queue was non-empty after a checked call.
    #[error("driver reported {} at {site}", format_codes(.codes))]
    Driver {
        site: CallSite,
        codes: Vec<GlErrorCode>,
    },

    /// The driver refused to allocate a handle.
    #[error("failed to create {kind}: {reason}")]
    ResourceCreation { kind: &'static str, reason: String },

    /// The combined shader file could not be read.
    #[error("failed to read shader source {}: {source}", .path.display())]
    ShaderSourceIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A shader stage failed to compile.
    #[error("failed to compile {stage} shader: {log}")]
    ShaderCompile { stage: ShaderStage, log: String },

    /// The program failed to link.
    #[error("failed to link shader program: {log}")]
    ProgramLink { log: String },
}

pub type Result<T, E = GraphicsError> = std::result::Result<T, E>;

fn format_codes(codes: &[GlErrorCode]) -> String {
    codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
