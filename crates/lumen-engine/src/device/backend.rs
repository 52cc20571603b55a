use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use anyhow::bail;
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;

use crate::coords::Viewport;
use crate::paint::Color;

use super::gpu::DEPTH_FORMAT;
use super::wgsl::{self, StageDiagnostic};
use super::{
    BufferId, BufferUsage, ClearFlags, CullMode, DebugKind, DebugMessage, DebugSeverity,
    DebugSink, DebugSource, FrontFace, Gpu, GraphicsDevice, IndexType, PipelineId, ProgramId,
    RenderState, StageKind, SurfaceErrorAction, Topology, VertexAttribute, VertexLayoutId,
};

/// Message ids for diagnostics raised by this backend.
const ID_VALIDATION: u32 = 1;
const ID_OUT_OF_MEMORY: u32 = 2;
const ID_INTERNAL: u32 = 3;
const ID_DRAW_STATE: u32 = 10;

/// [`GraphicsDevice`] on top of wgpu.
///
/// Object-level calls only update tables. Render pipelines are created lazily
/// the first time a pipeline/layout/state combination is drawn and then cached.
/// Clears and draws are recorded for the current frame and encoded in one
/// submission by [`present`](GraphicsDevice::present), so rendering twice in a
/// frame only costs an extra pass.
pub struct WgpuDevice {
    gpu: RefCell<Gpu>,
    state: RefCell<BackendState>,
    sink: Arc<Mutex<Option<DebugSink>>>,
}

struct ProgramEntry {
    label: String,
    stage: StageKind,
    module: wgpu::ShaderModule,
    entry_point: String,
}

struct PipelineEntry {
    label: String,
    stages: BTreeMap<StageKind, ProgramId>,
}

struct BufferEntry {
    label: String,
    usage: BufferUsage,
    buffer: Rc<wgpu::Buffer>,
}

#[derive(Copy, Clone)]
struct SlotBinding {
    buffer: BufferId,
    offset: u64,
    stride: u64,
}

struct LayoutEntry {
    label: String,
    attributes: Vec<VertexAttribute>,
    slots: BTreeMap<u32, SlotBinding>,
    index: Option<(BufferId, IndexType)>,
}

#[derive(Clone, Copy, Eq, PartialEq, Hash)]
struct PipelineKey {
    pipeline: PipelineId,
    layout: Option<VertexLayoutId>,
    topology: Topology,
    strip_index: Option<IndexType>,
    state: RenderState,
}

enum DrawKind {
    Vertices { first: u32, count: u32 },
    Indexed { count: u32 },
}

struct RecordedDraw {
    pipeline: Rc<wgpu::RenderPipeline>,
    viewport: Viewport,
    vertex_buffers: Vec<(u32, Rc<wgpu::Buffer>, u64)>,
    index_buffer: Option<(Rc<wgpu::Buffer>, wgpu::IndexFormat)>,
    kind: DrawKind,
}

#[derive(Default)]
struct RecordedPass {
    clear_color: Option<Color>,
    clear_depth: Option<f32>,
    draws: Vec<RecordedDraw>,
}

struct BackendState {
    next_id: u64,
    programs: HashMap<ProgramId, ProgramEntry>,
    pipelines: HashMap<PipelineId, PipelineEntry>,
    buffers: HashMap<BufferId, BufferEntry>,
    layouts: HashMap<VertexLayoutId, LayoutEntry>,
    render_pipelines: HashMap<PipelineKey, Rc<wgpu::RenderPipeline>>,

    bound_pipeline: Option<PipelineId>,
    bound_layout: Option<VertexLayoutId>,
    viewport: Viewport,
    clear_color: Color,
    clear_depth: f32,
    render_state: RenderState,

    passes: Vec<RecordedPass>,
}

impl BackendState {
    fn new(width: u32, height: u32) -> Self {
        Self {
            next_id: 1,
            programs: HashMap::new(),
            pipelines: HashMap::new(),
            buffers: HashMap::new(),
            layouts: HashMap::new(),
            render_pipelines: HashMap::new(),
            bound_pipeline: None,
            bound_layout: None,
            viewport: Viewport::from_size(width as i32, height as i32),
            clear_color: Color::black(),
            clear_depth: 1.0,
            render_state: RenderState::default(),
            passes: Vec::new(),
        }
    }

    fn next_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn invalidate_pipeline(&mut self, id: PipelineId) {
        self.render_pipelines.retain(|k, _| k.pipeline != id);
    }

    fn invalidate_layout(&mut self, id: VertexLayoutId) {
        self.render_pipelines.retain(|k, _| k.layout != Some(id));
    }

    fn current_pass(&mut self) -> &mut RecordedPass {
        if self.passes.is_empty() {
            self.passes.push(RecordedPass::default());
        }
        let last = self.passes.len() - 1;
        &mut self.passes[last]
    }
}

impl WgpuDevice {
    pub fn new(gpu: Gpu) -> Self {
        let sink: Arc<Mutex<Option<DebugSink>>> = Arc::new(Mutex::new(None));

        let forward = Arc::clone(&sink);
        gpu.device().on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            let message = message_from_wgpu_error(&err);
            match forward.lock() {
                Ok(guard) => match guard.as_ref() {
                    Some(sink) => {
                        if sink.send(message.clone()).is_err() {
                            log::error!("wgpu: {message}");
                        }
                    }
                    None => log::error!("wgpu: {message}"),
                },
                Err(_) => log::error!("wgpu: {message}"),
            }
        }));

        let size = gpu.size();
        log::info!(
            "WgpuDevice: surface {}x{} {:?}",
            size.width,
            size.height,
            gpu.surface_format()
        );

        Self {
            gpu: RefCell::new(gpu),
            state: RefCell::new(BackendState::new(size.width, size.height)),
            sink,
        }
    }

    /// Reports a diagnostic raised by this backend itself.
    fn report(&self, id: u32, severity: DebugSeverity, text: String) {
        let message = DebugMessage::new(id, DebugSource::Api, DebugKind::Error, severity, text);
        let delivered = match self.sink.lock() {
            Ok(guard) => guard
                .as_ref()
                .is_some_and(|sink| sink.send(message.clone()).is_ok()),
            Err(_) => false,
        };
        if !delivered {
            log::error!("WgpuDevice: {message}");
        }
    }

    fn record_draw(&self, topology: Topology, kind: DrawKind, indexed: Option<IndexType>) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;

        let Some(pipeline_id) = state.bound_pipeline else {
            drop(guard);
            self.report(ID_DRAW_STATE, DebugSeverity::High, "draw issued with no pipeline bound".into());
            return;
        };

        let layout_id = state.bound_layout;

        let key = PipelineKey {
            pipeline: pipeline_id,
            layout: layout_id,
            topology,
            strip_index: indexed.filter(|_| is_strip(topology)),
            state: state.render_state,
        };

        let pipeline = match state.render_pipelines.get(&key) {
            Some(p) => Rc::clone(p),
            None => {
                let gpu = self.gpu.borrow();
                match create_render_pipeline(&gpu, state, &key) {
                    Ok(p) => {
                        let p = Rc::new(p);
                        state.render_pipelines.insert(key, Rc::clone(&p));
                        p
                    }
                    Err(text) => {
                        drop(gpu);
                        drop(guard);
                        self.report(ID_DRAW_STATE, DebugSeverity::High, text);
                        return;
                    }
                }
            }
        };

        let mut vertex_buffers = Vec::new();
        let mut index_buffer = None;

        if let Some(layout) = layout_id.and_then(|id| state.layouts.get(&id)) {
            for (slot, binding) in &layout.slots {
                if let Some(entry) = state.buffers.get(&binding.buffer) {
                    if binding.offset < entry.buffer.size() {
                        vertex_buffers.push((*slot, Rc::clone(&entry.buffer), binding.offset));
                    }
                }
            }

            if let Some(index_type) = indexed {
                match layout.index.and_then(|(id, ty)| state.buffers.get(&id).map(|e| (e, ty))) {
                    Some((entry, ty)) if entry.buffer.size() > 0 => {
                        if ty != index_type {
                            log::warn!(
                                "WgpuDevice: draw asks for {index_type:?} indices, '{}' holds {ty:?}",
                                entry.label
                            );
                        }
                        index_buffer = Some((Rc::clone(&entry.buffer), index_format(index_type)));
                    }
                    _ => {}
                }
            }
        }

        if indexed.is_some() && index_buffer.is_none() {
            drop(guard);
            self.report(
                ID_DRAW_STATE,
                DebugSeverity::High,
                "indexed draw issued with no index buffer bound".into(),
            );
            return;
        }

        let draw = RecordedDraw {
            pipeline,
            viewport: state.viewport,
            vertex_buffers,
            index_buffer,
            kind,
        };
        state.current_pass().draws.push(draw);
    }
}

fn is_strip(topology: Topology) -> bool {
    matches!(topology, Topology::LineStrip | Topology::TriangleStrip)
}

fn index_format(ty: IndexType) -> wgpu::IndexFormat {
    match ty {
        IndexType::U16 => wgpu::IndexFormat::Uint16,
        IndexType::U32 => wgpu::IndexFormat::Uint32,
    }
}

fn primitive_topology(topology: Topology) -> wgpu::PrimitiveTopology {
    match topology {
        Topology::PointList => wgpu::PrimitiveTopology::PointList,
        Topology::LineList => wgpu::PrimitiveTopology::LineList,
        Topology::LineStrip => wgpu::PrimitiveTopology::LineStrip,
        Topology::TriangleList => wgpu::PrimitiveTopology::TriangleList,
        Topology::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
    }
}

fn create_render_pipeline(
    gpu: &Gpu,
    state: &BackendState,
    key: &PipelineKey,
) -> Result<wgpu::RenderPipeline, String> {
    let entry = state
        .pipelines
        .get(&key.pipeline)
        .ok_or_else(|| format!("pipeline {} does not exist", key.pipeline))?;

    let program = |kind: StageKind| {
        entry
            .stages
            .get(&kind)
            .and_then(|id| state.programs.get(id))
            .ok_or_else(|| format!("pipeline '{}' has no {kind} stage", entry.label))
    };
    let vertex = program(StageKind::Vertex)?;
    let fragment = program(StageKind::Fragment)?;

    // One wgpu buffer layout per slot up to the highest referenced slot; gaps
    // get empty layouts so slot numbers match `set_vertex_buffer` indices.
    let mut slots: Vec<(u64, Vec<wgpu::VertexAttribute>)> = Vec::new();
    if let Some(layout) = key.layout.and_then(|id| state.layouts.get(&id)) {
        let max_slot = layout
            .attributes
            .iter()
            .map(|a| a.binding)
            .chain(layout.slots.keys().copied())
            .max();

        if let Some(max_slot) = max_slot {
            slots = (0..=max_slot).map(|_| (0, Vec::new())).collect();

            for a in &layout.attributes {
                slots[a.binding as usize].1.push(wgpu::VertexAttribute {
                    format: a.format,
                    offset: a.offset,
                    shader_location: a.index,
                });
            }

            for (slot, (stride, attrs)) in slots.iter_mut().enumerate() {
                *stride = match layout.slots.get(&(slot as u32)) {
                    Some(binding) => binding.stride,
                    None => attrs
                        .iter()
                        .map(|a| a.offset + a.format.size())
                        .max()
                        .unwrap_or(0),
                };
            }
        }
    }

    let buffers: Vec<wgpu::VertexBufferLayout<'_>> = slots
        .iter()
        .map(|(stride, attrs)| wgpu::VertexBufferLayout {
            array_stride: *stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: attrs,
        })
        .collect();

    let rs = key.state;
    let label = format!("{} pipeline", entry.label);

    Ok(gpu.device().create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(&label),
        layout: None,

        vertex: wgpu::VertexState {
            module: &vertex.module,
            entry_point: Some(&vertex.entry_point),
            compilation_options: Default::default(),
            buffers: &buffers,
        },

        fragment: Some(wgpu::FragmentState {
            module: &fragment.module,
            entry_point: Some(&fragment.entry_point),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: gpu.surface_format(),
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),

        primitive: wgpu::PrimitiveState {
            topology: primitive_topology(key.topology),
            strip_index_format: key.strip_index.map(index_format),
            front_face: match rs.front_face {
                FrontFace::Ccw => wgpu::FrontFace::Ccw,
                FrontFace::Cw => wgpu::FrontFace::Cw,
            },
            cull_mode: match rs.cull_mode {
                CullMode::None => None,
                CullMode::Front => Some(wgpu::Face::Front),
                CullMode::Back => Some(wgpu::Face::Back),
            },
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },

        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: rs.depth_test && rs.depth_write,
            depth_compare: if rs.depth_test {
                wgpu::CompareFunction::Less
            } else {
                wgpu::CompareFunction::Always
            },
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),

        multiview_mask: None,
        cache: None,
    }))
}

/// Converts a bottom-left-origin viewport into a wgpu viewport clamped to the
/// target. Returns `None` when nothing of it is visible.
fn target_viewport(vp: Viewport, width: u32, height: u32) -> Option<(f32, f32, f32, f32)> {
    let (tw, th) = (width as i32, height as i32);

    let x0 = vp.x.clamp(0, tw);
    let x1 = (vp.x + vp.width).clamp(0, tw);
    let top = (th - (vp.y + vp.height)).clamp(0, th);
    let bottom = (th - vp.y).clamp(0, th);

    if x1 <= x0 || bottom <= top {
        return None;
    }
    Some((x0 as f32, top as f32, (x1 - x0) as f32, (bottom - top) as f32))
}

fn message_from_wgpu_error(err: &wgpu::Error) -> DebugMessage {
    let (id, severity) = match err {
        wgpu::Error::Validation { .. } => (ID_VALIDATION, DebugSeverity::High),
        wgpu::Error::OutOfMemory { .. } => (ID_OUT_OF_MEMORY, DebugSeverity::High),
        _ => (ID_INTERNAL, DebugSeverity::Medium),
    };
    DebugMessage::new(id, DebugSource::Api, DebugKind::Error, severity, err.to_string())
}

fn to_wgpu_color(c: Color) -> wgpu::Color {
    wgpu::Color {
        r: c.r as f64,
        g: c.g as f64,
        b: c.b as f64,
        a: c.a as f64,
    }
}

impl GraphicsDevice for WgpuDevice {
    fn create_stage_program(
        &self,
        stage: StageKind,
        source: &str,
        label: &str,
    ) -> Result<ProgramId, StageDiagnostic> {
        let entry_point = wgsl::compile_stage(stage, source)?;

        let module = self
            .gpu
            .borrow()
            .device()
            .create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(label),
                source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(source)),
            });

        let mut state = self.state.borrow_mut();
        let id = ProgramId(state.next_id());
        state.programs.insert(
            id,
            ProgramEntry {
                label: label.to_string(),
                stage,
                module,
                entry_point,
            },
        );

        log::debug!("WgpuDevice: created {stage} program '{label}' ({id})");
        Ok(id)
    }

    fn destroy_stage_program(&self, id: ProgramId) {
        match self.state.borrow_mut().programs.remove(&id) {
            Some(p) => log::debug!("WgpuDevice: destroyed {} program '{}' ({id})", p.stage, p.label),
            None => log::warn!("WgpuDevice: destroy of unknown program {id}"),
        }
    }

    fn create_pipeline(&self, label: &str) -> PipelineId {
        let mut state = self.state.borrow_mut();
        let id = PipelineId(state.next_id());
        state.pipelines.insert(
            id,
            PipelineEntry {
                label: label.to_string(),
                stages: BTreeMap::new(),
            },
        );
        log::debug!("WgpuDevice: created pipeline '{label}' ({id})");
        id
    }

    fn attach_stage(&self, pipeline: PipelineId, stage: StageKind, program: ProgramId) {
        let mut state = self.state.borrow_mut();
        match state.pipelines.get_mut(&pipeline) {
            Some(entry) => {
                entry.stages.insert(stage, program);
                state.invalidate_pipeline(pipeline);
            }
            None => log::warn!("WgpuDevice: attach to unknown pipeline {pipeline}"),
        }
    }

    fn destroy_pipeline(&self, id: PipelineId) {
        let mut state = self.state.borrow_mut();
        if state.bound_pipeline == Some(id) {
            state.bound_pipeline = None;
        }
        state.invalidate_pipeline(id);
        match state.pipelines.remove(&id) {
            Some(p) => log::debug!("WgpuDevice: destroyed pipeline '{}' ({id})", p.label),
            None => log::warn!("WgpuDevice: destroy of unknown pipeline {id}"),
        }
    }

    fn create_buffer(&self, label: &str, usage: BufferUsage, contents: &[u8]) -> BufferId {
        let usages = match usage {
            BufferUsage::Vertex => wgpu::BufferUsages::VERTEX,
            BufferUsage::Index(_) => wgpu::BufferUsages::INDEX,
        };

        let buffer = self
            .gpu
            .borrow()
            .device()
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents,
                usage: usages,
            });

        let mut state = self.state.borrow_mut();
        let id = BufferId(state.next_id());
        state.buffers.insert(
            id,
            BufferEntry {
                label: label.to_string(),
                usage,
                buffer: Rc::new(buffer),
            },
        );

        log::debug!("WgpuDevice: created {usage:?} buffer '{label}' ({} bytes, {id})", contents.len());
        id
    }

    fn destroy_buffer(&self, id: BufferId) {
        match self.state.borrow_mut().buffers.remove(&id) {
            Some(b) => log::debug!("WgpuDevice: destroyed {:?} buffer '{}' ({id})", b.usage, b.label),
            None => log::warn!("WgpuDevice: destroy of unknown buffer {id}"),
        }
    }

    fn create_vertex_layout(&self, label: &str) -> VertexLayoutId {
        let mut state = self.state.borrow_mut();
        let id = VertexLayoutId(state.next_id());
        state.layouts.insert(
            id,
            LayoutEntry {
                label: label.to_string(),
                attributes: Vec::new(),
                slots: BTreeMap::new(),
                index: None,
            },
        );
        log::debug!("WgpuDevice: created vertex layout '{label}' ({id})");
        id
    }

    fn declare_attribute(&self, layout: VertexLayoutId, attribute: VertexAttribute) {
        let mut state = self.state.borrow_mut();
        match state.layouts.get_mut(&layout) {
            Some(entry) => {
                entry.attributes.retain(|a| a.index != attribute.index);
                entry.attributes.push(attribute);
                state.invalidate_layout(layout);
            }
            None => log::warn!("WgpuDevice: attribute for unknown layout {layout}"),
        }
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
        let Some(entry) = state.layouts.get_mut(&layout) else {
            log::warn!("WgpuDevice: buffer bound to unknown layout {layout}");
            return;
        };

        let previous = entry.slots.insert(slot, SlotBinding { buffer, offset, stride });
        if previous.map(|p| p.stride) != Some(stride) {
            state.invalidate_layout(layout);
        }
    }

    fn bind_index_buffer(&self, layout: VertexLayoutId, buffer: BufferId, index_type: IndexType) {
        let mut state = self.state.borrow_mut();
        match state.layouts.get_mut(&layout) {
            Some(entry) => entry.index = Some((buffer, index_type)),
            None => log::warn!("WgpuDevice: index buffer bound to unknown layout {layout}"),
        }
    }

    fn destroy_vertex_layout(&self, id: VertexLayoutId) {
        let mut state = self.state.borrow_mut();
        if state.bound_layout == Some(id) {
            state.bound_layout = None;
        }
        state.invalidate_layout(id);
        match state.layouts.remove(&id) {
            Some(l) => log::debug!("WgpuDevice: destroyed vertex layout '{}' ({id})", l.label),
            None => log::warn!("WgpuDevice: destroy of unknown vertex layout {id}"),
        }
    }

    fn bind_pipeline(&self, id: PipelineId) {
        self.state.borrow_mut().bound_pipeline = Some(id);
    }

    fn bind_vertex_layout(&self, id: VertexLayoutId) {
        self.state.borrow_mut().bound_layout = Some(id);
    }

    fn set_viewport(&self, viewport: Viewport) {
        self.state.borrow_mut().viewport = viewport;
    }

    fn set_clear_color(&self, color: Color) {
        self.state.borrow_mut().clear_color = color;
    }

    fn set_clear_depth(&self, depth: f32) {
        self.state.borrow_mut().clear_depth = depth.clamp(0.0, 1.0);
    }

    fn set_render_state(&self, state: RenderState) {
        self.state.borrow_mut().render_state = state;
    }

    fn clear(&self, flags: ClearFlags) {
        let mut state = self.state.borrow_mut();
        let pass = RecordedPass {
            clear_color: flags.color.then_some(state.clear_color),
            clear_depth: flags.depth.then_some(state.clear_depth),
            draws: Vec::new(),
        };
        state.passes.push(pass);
    }

    fn draw(&self, topology: Topology, first_vertex: u32, vertex_count: u32) {
        self.record_draw(
            topology,
            DrawKind::Vertices {
                first: first_vertex,
                count: vertex_count,
            },
            None,
        );
    }

    fn draw_indexed(&self, topology: Topology, index_count: u32, index_type: IndexType) {
        self.record_draw(topology, DrawKind::Indexed { count: index_count }, Some(index_type));
    }

    fn resize_framebuffer(&self, width: u32, height: u32) {
        self.gpu.borrow_mut().resize(PhysicalSize::new(width, height));
    }

    fn present(&self) -> anyhow::Result<()> {
        let mut passes = std::mem::take(&mut self.state.borrow_mut().passes);
        if passes.is_empty() {
            passes.push(RecordedPass::default());
        }

        let mut gpu = self.gpu.borrow_mut();
        let size = gpu.size();
        if size.width == 0 || size.height == 0 {
            return Ok(());
        }

        let mut frame = match gpu.begin_frame() {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("WgpuDevice: surface error: {err}");
                return match gpu.handle_surface_error(err) {
                    SurfaceErrorAction::Fatal => bail!("surface is out of memory"),
                    SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => Ok(()),
                };
            }
        };

        for pass in &passes {
            let color_load = match pass.clear_color {
                Some(c) => wgpu::LoadOp::Clear(to_wgpu_color(c)),
                None => wgpu::LoadOp::Load,
            };
            let depth_load = match pass.clear_depth {
                Some(d) => wgpu::LoadOp::Clear(d),
                None => wgpu::LoadOp::Load,
            };

            let mut rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("lumen frame pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame.view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: color_load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: gpu.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: depth_load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            for draw in &pass.draws {
                let Some((x, y, w, h)) = target_viewport(draw.viewport, size.width, size.height)
                else {
                    continue;
                };

                rpass.set_pipeline(&draw.pipeline);
                rpass.set_viewport(x, y, w, h, 0.0, 1.0);

                for (slot, buffer, offset) in &draw.vertex_buffers {
                    rpass.set_vertex_buffer(*slot, buffer.slice(*offset..));
                }

                match draw.kind {
                    DrawKind::Vertices { first, count } => rpass.draw(first..first + count, 0..1),
                    DrawKind::Indexed { count } => {
                        if let Some((buffer, format)) = &draw.index_buffer {
                            rpass.set_index_buffer(buffer.slice(..), *format);
                            rpass.draw_indexed(0..count, 0, 0..1);
                        }
                    }
                }
            }
        }

        gpu.submit(frame);
        Ok(())
    }

    fn set_debug_sink(&self, sink: DebugSink) {
        match self.sink.lock() {
            Ok(mut guard) => *guard = Some(sink),
            Err(poisoned) => *poisoned.into_inner() = Some(sink),
        }
    }
}
