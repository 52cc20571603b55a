use crate::coords::Viewport;
use crate::paint::Color;

use super::wgsl::StageDiagnostic;
use super::{
    BufferId, BufferUsage, ClearFlags, DebugSink, IndexType, PipelineId, ProgramId, RenderState,
    StageKind, Topology, VertexAttribute, VertexLayoutId,
};

/// Object-level graphics API consumed by the resource builders and the lifecycle.
///
/// All methods take `&self`; implementations keep their tables behind interior
/// mutability so resource handles can share one device and release through it
/// when dropped. Unknown ids are ignored with a warning rather than panicking.
pub trait GraphicsDevice {
    /// Compiles `source` into a separable single-stage program labelled `label`.
    ///
    /// On failure no program is created.
    fn create_stage_program(
        &self,
        stage: StageKind,
        source: &str,
        label: &str,
    ) -> Result<ProgramId, StageDiagnostic>;

    fn destroy_stage_program(&self, id: ProgramId);

    fn create_pipeline(&self, label: &str) -> PipelineId;

    /// Binds `program` to the `stage` slot of `pipeline`, replacing any previous one.
    fn attach_stage(&self, pipeline: PipelineId, stage: StageKind, program: ProgramId);

    fn destroy_pipeline(&self, id: PipelineId);

    /// Creates an immutable buffer initialized with `contents`.
    fn create_buffer(&self, label: &str, usage: BufferUsage, contents: &[u8]) -> BufferId;

    fn destroy_buffer(&self, id: BufferId);

    fn create_vertex_layout(&self, label: &str) -> VertexLayoutId;

    /// Declares and enables one attribute of `layout`.
    fn declare_attribute(&self, layout: VertexLayoutId, attribute: VertexAttribute);

    /// Sources binding slot `slot` of `layout` from `buffer`.
    fn bind_vertex_buffer(
        &self,
        layout: VertexLayoutId,
        slot: u32,
        buffer: BufferId,
        offset: u64,
        stride: u64,
    );

    fn bind_index_buffer(&self, layout: VertexLayoutId, buffer: BufferId, index_type: IndexType);

    fn destroy_vertex_layout(&self, id: VertexLayoutId);

    fn bind_pipeline(&self, id: PipelineId);

    fn bind_vertex_layout(&self, id: VertexLayoutId);

    fn set_viewport(&self, viewport: Viewport);

    fn set_clear_color(&self, color: Color);

    fn set_clear_depth(&self, depth: f32);

    fn set_render_state(&self, state: RenderState);

    /// Clears the selected planes of the current frame.
    fn clear(&self, flags: ClearFlags);

    /// Non-indexed draw with the bound pipeline and layout.
    fn draw(&self, topology: Topology, first_vertex: u32, vertex_count: u32);

    /// Indexed draw from the bound layout's index buffer.
    fn draw_indexed(&self, topology: Topology, index_count: u32, index_type: IndexType);

    /// Adapts the backbuffer to a new framebuffer size in physical pixels.
    fn resize_framebuffer(&self, width: u32, height: u32);

    /// Submits the work recorded for the current frame and presents it.
    fn present(&self) -> anyhow::Result<()>;

    /// Registers the channel that receives asynchronous backend diagnostics.
    fn set_debug_sink(&self, sink: DebugSink);
}
