//! Graphics device abstraction and its wgpu implementation.
//!
//! This module is responsible for:
//! - the object-level `GraphicsDevice` contract and its handle/format types
//! - WGSL stage validation shared by every backend
//! - the asynchronous diagnostic channel
//! - creating the wgpu Instance/Adapter/Device/Queue and configuring the Surface

mod backend;
mod debug;
mod error;
mod frame;
mod gpu;
mod graphics;
mod init;
mod surface;
mod types;
pub mod wgsl;

pub use backend::WgpuDevice;
pub use debug::{DebugKind, DebugMessage, DebugSeverity, DebugSink, DebugSource};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use graphics::GraphicsDevice;
pub use init::GpuInit;
pub use types::{
    vertex_format, BufferId, BufferUsage, ClearFlags, ComponentType, CullMode, FrontFace,
    IndexType, PipelineId, ProgramId, RenderState, StageKind, Topology, VertexAttribute,
    VertexLayoutId,
};
