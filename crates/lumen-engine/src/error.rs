//! Typed failures surfaced by the resource builders and the platform layer.
//!
//! Builders return these as values. The lifecycle converts them to `anyhow`
//! errors at the application boundary, where they are logged and end the run.

use std::path::PathBuf;

use thiserror::Error;

use crate::device::{BufferUsage, ComponentType, StageKind};

/// Reading a shader source file failed.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to read '{}': {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("'{}' is empty", path.display())]
    Empty { path: PathBuf },
}

impl IoError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Unreadable { path, .. } | Self::Empty { path } => path,
        }
    }
}

/// A single stage failed to become a usable program.
///
/// `diagnostic` is the shader translator's output, unmodified.
#[derive(Debug, Clone, Error)]
pub enum CompileError {
    #[error("{stage} stage '{label}' failed to compile:\n{diagnostic}")]
    Compile {
        stage: StageKind,
        label: String,
        diagnostic: String,
    },

    #[error("{stage} stage '{label}' failed to link:\n{diagnostic}")]
    Link {
        stage: StageKind,
        label: String,
        diagnostic: String,
    },
}

impl CompileError {
    pub fn stage(&self) -> StageKind {
        match self {
            Self::Compile { stage, .. } | Self::Link { stage, .. } => *stage,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Compile { label, .. } | Self::Link { label, .. } => label,
        }
    }

    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Compile { diagnostic, .. } | Self::Link { diagnostic, .. } => diagnostic,
        }
    }
}

/// Building a program pipeline failed. Nothing built so far is retained.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error("pipeline '{label}' has no {stage} stage")]
    MissingStage { label: String, stage: StageKind },

    #[error("pipeline '{label}' already has a {stage} stage")]
    DuplicateStage { label: String, stage: StageKind },
}

/// An input layout was declared or bound inconsistently.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("layout '{label}' declares attribute {attribute_index} more than once")]
    DuplicateAttribute { label: String, attribute_index: u32 },

    #[error(
        "layout '{label}': attribute {attribute_index} has no vertex format for \
         {component_count} x {component_type:?} (normalized: {normalized})"
    )]
    UnsupportedFormat {
        label: String,
        attribute_index: u32,
        component_count: u32,
        component_type: ComponentType,
        normalized: bool,
    },

    #[error("layout '{label}': buffer '{buffer}' was created as {found:?}, expected {expected:?}")]
    BufferUsage {
        label: String,
        buffer: String,
        expected: BufferUsage,
        found: BufferUsage,
    },
}

/// The windowing side of the platform failed.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The windowing subsystem did not start.
    #[error("windowing subsystem failed to initialize: {0}")]
    Initialization(String),

    #[error("failed to create window: {0}")]
    WindowCreation(String),

    /// The window exists but no graphics device could be bound to it.
    #[error("failed to acquire graphics context: {0}")]
    Context(String),

    #[error("no window has been created")]
    NoWindow,
}
