use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::coords::Viewport;
use crate::device::wgsl::{self, StageDiagnostic};
use crate::device::{
    BufferId, BufferUsage, ClearFlags, DebugMessage, DebugSink, GraphicsDevice, IndexType,
    PipelineId, ProgramId, RenderState, StageKind, Topology, VertexAttribute, VertexLayoutId,
};
use crate::paint::Color;

/// One call received by a [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceCall {
    CreateStageProgram {
        id: ProgramId,
        stage: StageKind,
        label: String,
    },
    /// Compilation was attempted and rejected; no program exists.
    RejectStageProgram {
        stage: StageKind,
        label: String,
    },
    DestroyStageProgram(ProgramId),
    CreatePipeline {
        id: PipelineId,
        label: String,
    },
    AttachStage {
        pipeline: PipelineId,
        stage: StageKind,
        program: ProgramId,
    },
    DestroyPipeline(PipelineId),
    CreateBuffer {
        id: BufferId,
        label: String,
        usage: BufferUsage,
        size: u64,
    },
    DestroyBuffer(BufferId),
    CreateVertexLayout {
        id: VertexLayoutId,
        label: String,
    },
    DeclareAttribute {
        layout: VertexLayoutId,
        attribute: VertexAttribute,
    },
    BindVertexBuffer {
        layout: VertexLayoutId,
        slot: u32,
        buffer: BufferId,
        offset: u64,
        stride: u64,
    },
    BindIndexBuffer {
        layout: VertexLayoutId,
        buffer: BufferId,
        index_type: IndexType,
    },
    DestroyVertexLayout(VertexLayoutId),
    BindPipeline(PipelineId),
    BindVertexLayout(VertexLayoutId),
    SetViewport(Viewport),
    SetClearColor(Color),
    SetClearDepth(f32),
    SetRenderState(RenderState),
    Clear(ClearFlags),
    /// Non-indexed draw, with the pipeline and layout bound at the time.
    Draw {
        pipeline: Option<PipelineId>,
        layout: Option<VertexLayoutId>,
        topology: Topology,
        first_vertex: u32,
        vertex_count: u32,
    },
    /// Indexed draw, with the pipeline and layout bound at the time.
    DrawIndexed {
        pipeline: Option<PipelineId>,
        layout: Option<VertexLayoutId>,
        topology: Topology,
        index_count: u32,
        index_type: IndexType,
    },
    ResizeFramebuffer {
        width: u32,
        height: u32,
    },
    Present,
}

impl DeviceCall {
    pub fn is_clear(&self) -> bool {
        matches!(self, DeviceCall::Clear(_))
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, DeviceCall::Draw { .. } | DeviceCall::DrawIndexed { .. })
    }
}

/// A live program as tracked by a [`HeadlessDevice`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramRecord {
    pub stage: StageKind,
    pub label: String,
    pub entry_point: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRecord {
    pub label: String,
    pub stages: BTreeMap<StageKind, ProgramId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BufferRecord {
    pub label: String,
    pub usage: BufferUsage,
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutRecord {
    pub label: String,
    pub attributes: Vec<VertexAttribute>,
    /// slot -> (buffer, offset, stride)
    pub vertex_buffers: BTreeMap<u32, (BufferId, u64, u64)>,
    pub index_buffer: Option<(BufferId, IndexType)>,
}

#[derive(Default)]
struct HeadlessState {
    next_id: u64,
    calls: Vec<DeviceCall>,
    programs: BTreeMap<ProgramId, ProgramRecord>,
    pipelines: BTreeMap<PipelineId, PipelineRecord>,
    buffers: BTreeMap<BufferId, BufferRecord>,
    layouts: BTreeMap<VertexLayoutId, LayoutRecord>,
    bound_pipeline: Option<PipelineId>,
    bound_layout: Option<VertexLayoutId>,
    viewport: Option<Viewport>,
    clear_color: Option<Color>,
    clear_depth: Option<f32>,
    render_state: Option<RenderState>,
    framebuffer: (u32, u32),
    presents: u64,
    sink: Option<DebugSink>,
}

impl HeadlessState {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// [`GraphicsDevice`] that keeps object tables in memory and records every call.
///
/// Stage sources go through the same WGSL validation as the wgpu backend, so
/// compile and link diagnostics match. Nothing is rendered.
#[derive(Default)]
pub struct HeadlessDevice {
    state: RefCell<HeadlessState>,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.state.borrow().calls.clone()
    }

    /// Calls received since the last [`Present`](DeviceCall::Present).
    pub fn calls_since_present(&self) -> Vec<DeviceCall> {
        let state = self.state.borrow();
        let start = state
            .calls
            .iter()
            .rposition(|c| *c == DeviceCall::Present)
            .map_or(0, |i| i + 1);
        state.calls[start..].to_vec()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn live_programs(&self) -> BTreeMap<ProgramId, ProgramRecord> {
        self.state.borrow().programs.clone()
    }

    pub fn live_pipelines(&self) -> BTreeMap<PipelineId, PipelineRecord> {
        self.state.borrow().pipelines.clone()
    }

    pub fn live_buffers(&self) -> BTreeMap<BufferId, BufferRecord> {
        self.state.borrow().buffers.clone()
    }

    pub fn live_layouts(&self) -> BTreeMap<VertexLayoutId, LayoutRecord> {
        self.state.borrow().layouts.clone()
    }

    /// Number of device objects not yet destroyed.
    pub fn live_object_count(&self) -> usize {
        let state = self.state.borrow();
        state.programs.len() + state.pipelines.len() + state.buffers.len() + state.layouts.len()
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.state.borrow().viewport
    }

    pub fn clear_color(&self) -> Option<Color> {
        self.state.borrow().clear_color
    }

    pub fn clear_depth(&self) -> Option<f32> {
        self.state.borrow().clear_depth
    }

    pub fn render_state(&self) -> Option<RenderState> {
        self.state.borrow().render_state
    }

    pub fn bound_pipeline(&self) -> Option<PipelineId> {
        self.state.borrow().bound_pipeline
    }

    pub fn bound_layout(&self) -> Option<VertexLayoutId> {
        self.state.borrow().bound_layout
    }

    pub fn framebuffer_size(&self) -> (u32, u32) {
        self.state.borrow().framebuffer
    }

    pub fn present_count(&self) -> u64 {
        self.state.borrow().presents
    }

    pub fn has_debug_sink(&self) -> bool {
        self.state.borrow().sink.is_some()
    }

    /// Delivers `message` through the registered diagnostic channel.
    ///
    /// Returns `false` when no sink is registered or the receiver is gone.
    pub fn emit_debug_message(&self, message: DebugMessage) -> bool {
        match &self.state.borrow().sink {
            Some(sink) => sink.send(message).is_ok(),
            None => false,
        }
    }

    fn record(&self, call: DeviceCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsDevice for HeadlessDevice {
    fn create_stage_program(
        &self,
        stage: StageKind,
        source: &str,
        label: &str,
    ) -> Result<ProgramId, StageDiagnostic> {
        let entry_point = match wgsl::compile_stage(stage, source) {
            Ok(entry_point) => entry_point,
            Err(diag) => {
                self.record(DeviceCall::RejectStageProgram {
                    stage,
                    label: label.to_string(),
                });
                return Err(diag);
            }
        };

        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.next_id());
        state.programs.insert(
            id,
            ProgramRecord {
                stage,
                label: label.to_string(),
                entry_point,
            },
        );
        state.calls.push(DeviceCall::CreateStageProgram {
            id,
            stage,
            label: label.to_string(),
        });
        Ok(id)
    }

    fn destroy_stage_program(&self, id: ProgramId) {
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&id).is_none() {
            log::warn!("HeadlessDevice: destroy of unknown program {id}");
        }
        state.calls.push(DeviceCall::DestroyStageProgram(id));
    }

    fn create_pipeline(&self, label: &str) -> PipelineId {
        let mut state = self.state.borrow_mut();
        let id = PipelineId(state.next_id());
        state.pipelines.insert(
            id,
            PipelineRecord {
                label: label.to_string(),
                stages: BTreeMap::new(),
            },
        );
        state.calls.push(DeviceCall::CreatePipeline {
            id,
            label: label.to_string(),
        });
        id
    }

    fn attach_stage(&self, pipeline: PipelineId, stage: StageKind, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        match state.pipelines.get_mut(&pipeline) {
            Some(record) => {
                record.stages.insert(stage, program);
            }
            None => log::warn!("HeadlessDevice: attach to unknown pipeline {pipeline}"),
        }
        state.calls.push(DeviceCall::AttachStage {
            pipeline,
            stage,
            program,
        });
    }

    fn destroy_pipeline(&self, id: PipelineId) {
        let mut state = self.state.borrow_mut();
        if state.pipelines.remove(&id).is_none() {
            log::warn!("HeadlessDevice: destroy of unknown pipeline {id}");
        }
        if state.bound_pipeline == Some(id) {
            state.bound_pipeline = None;
        }
        state.calls.push(DeviceCall::DestroyPipeline(id));
    }

    fn create_buffer(&self, label: &str, usage: BufferUsage, contents: &[u8]) -> BufferId {
        let mut state = self.state.borrow_mut();
        let id = BufferId(state.next_id());
        state.buffers.insert(
            id,
            BufferRecord {
                label: label.to_string(),
                usage,
                contents: contents.to_vec(),
            },
        );
        state.calls.push(DeviceCall::CreateBuffer {
            id,
            label: label.to_string(),
            usage,
            size: contents.len() as u64,
        });
        id
    }

    fn destroy_buffer(&self, id: BufferId) {
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(&id).is_none() {
            log::warn!("HeadlessDevice: destroy of unknown buffer {id}");
        }
        state.calls.push(DeviceCall::DestroyBuffer(id));
    }

    fn create_vertex_layout(&self, label: &str) -> VertexLayoutId {
        let mut state = self.state.borrow_mut();
        let id = VertexLayoutId(state.next_id());
        state.layouts.insert(
            id,
            LayoutRecord {
                label: label.to_string(),
                ..LayoutRecord::default()
            },
        );
        state.calls.push(DeviceCall::CreateVertexLayout {
            id,
            label: label.to_string(),
        });
        id
    }

    fn declare_attribute(&self, layout: VertexLayoutId, attribute: VertexAttribute) {
        let mut state = self.state.borrow_mut();
        match state.layouts.get_mut(&layout) {
            Some(record) => record.attributes.push(attribute),
            None => log::warn!("HeadlessDevice: attribute for unknown layout {layout}"),
        }
        state
            .calls
            .push(DeviceCall::DeclareAttribute { layout, attribute });
    }

    fn bind_vertex_buffer(
        &self,
        layout: VertexLayoutId,
        slot: u32,
        buffer: BufferId,
        offset: u64,
        stride: u64,
    ) {
        let mut state = self.state.borrow_mut();
        match state.layouts.get_mut(&layout) {
            Some(record) => {
                record.vertex_buffers.insert(slot, (buffer, offset, stride));
            }
            None => log::warn!("HeadlessDevice: buffer bound to unknown layout {layout}"),
        }
        state.calls.push(DeviceCall::BindVertexBuffer {
            layout,
            slot,
            buffer,
            offset,
            stride,
        });
    }

    fn bind_index_buffer(&self, layout: VertexLayoutId, buffer: BufferId, index_type: IndexType) {
        let mut state = self.state.borrow_mut();
        match state.layouts.get_mut(&layout) {
            Some(record) => record.index_buffer = Some((buffer, index_type)),
            None => log::warn!("HeadlessDevice: index buffer bound to unknown layout {layout}"),
        }
        state.calls.push(DeviceCall::BindIndexBuffer {
            layout,
            buffer,
            index_type,
        });
    }

    fn destroy_vertex_layout(&self, id: VertexLayoutId) {
        let mut state = self.state.borrow_mut();
        if state.layouts.remove(&id).is_none() {
            log::warn!("HeadlessDevice: destroy of unknown vertex layout {id}");
        }
        if state.bound_layout == Some(id) {
            state.bound_layout = None;
        }
        state.calls.push(DeviceCall::DestroyVertexLayout(id));
    }

    fn bind_pipeline(&self, id: PipelineId) {
        let mut state = self.state.borrow_mut();
        state.bound_pipeline = Some(id);
        state.calls.push(DeviceCall::BindPipeline(id));
    }

    fn bind_vertex_layout(&self, id: VertexLayoutId) {
        let mut state = self.state.borrow_mut();
        state.bound_layout = Some(id);
        state.calls.push(DeviceCall::BindVertexLayout(id));
    }

    fn set_viewport(&self, viewport: Viewport) {
        let mut state = self.state.borrow_mut();
        state.viewport = Some(viewport);
        state.calls.push(DeviceCall::SetViewport(viewport));
    }

    fn set_clear_color(&self, color: Color) {
        let mut state = self.state.borrow_mut();
        state.clear_color = Some(color);
        state.calls.push(DeviceCall::SetClearColor(color));
    }

    fn set_clear_depth(&self, depth: f32) {
        let mut state = self.state.borrow_mut();
        state.clear_depth = Some(depth);
        state.calls.push(DeviceCall::SetClearDepth(depth));
    }

    fn set_render_state(&self, render_state: RenderState) {
        let mut state = self.state.borrow_mut();
        state.render_state = Some(render_state);
        state.calls.push(DeviceCall::SetRenderState(render_state));
    }

    fn clear(&self, flags: ClearFlags) {
        self.record(DeviceCall::Clear(flags));
    }

    fn draw(&self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        let mut state = self.state.borrow_mut();
        let call = DeviceCall::Draw {
            pipeline: state.bound_pipeline,
            layout: state.bound_layout,
            topology,
            first_vertex,
            vertex_count,
        };
        state.calls.push(call);
    }

    fn draw_indexed(&self, topology: Topology, index_count: u32, index_type: IndexType) {
        let mut state = self.state.borrow_mut();
        let call = DeviceCall::DrawIndexed {
            pipeline: state.bound_pipeline,
            layout: state.bound_layout,
            topology,
            index_count,
            index_type,
        };
        state.calls.push(call);
    }

    fn resize_framebuffer(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.framebuffer = (width, height);
        state
            .calls
            .push(DeviceCall::ResizeFramebuffer { width, height });
    }

    fn present(&self) -> anyhow::Result<()> {
        let mut state = self.state.borrow_mut();
        state.presents += 1;
        state.calls.push(DeviceCall::Present);
        Ok(())
    }

    fn set_debug_sink(&self, sink: DebugSink) {
        self.state.borrow_mut().sink = Some(sink);
    }
}
