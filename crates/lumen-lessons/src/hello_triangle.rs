use anyhow::Context as _;
use lumen_engine::device::{IndexType, Topology};
use lumen_engine::paint::Color;
use lumen_engine::resource::{Buffer, InputLayout, ProgramPipeline};
use lumen_engine::{AppConfig, AppContext, Application};

use crate::data_path;
use crate::vertex::VertexPositionUv;

pub const VERTEX_SHADER: &str = data_path!("shaders/simple.vs.wgsl");
pub const FRAGMENT_SHADER: &str = data_path!("shaders/simple.fs.wgsl");

const VERTICES: [VertexPositionUv; 3] = [
    VertexPositionUv::new([0.0, 0.5, 0.0], [0.5, 1.0]),
    VertexPositionUv::new([-0.5, -0.5, 0.0], [0.0, 0.0]),
    VertexPositionUv::new([0.5, -0.5, 0.0], [1.0, 0.0]),
];

const INDICES: [u32; 3] = [0, 1, 2];

struct Scene {
    program: ProgramPipeline,
    layout: InputLayout,
    index_count: u32,
}

/// One indexed triangle drawn with a separable program pipeline and a
/// decoupled input layout.
#[derive(Default)]
pub struct HelloTriangleApplication {
    scene: Option<Scene>,
}

impl HelloTriangleApplication {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Application for HelloTriangleApplication {
    fn config(&self) -> AppConfig {
        AppConfig::default().with_title("Hello Triangle")
    }

    fn load(&mut self, ctx: &mut AppContext) -> anyhow::Result<()> {
        let device = ctx.device();

        let program = ProgramPipeline::build(device, "Simple", VERTEX_SHADER, FRAGMENT_SHADER)
            .context("building program Simple failed")?;

        let vertices = Buffer::vertex(device, "Triangle_Vertices", &VERTICES);
        let indices = Buffer::index(device, "Triangle_Indices", &INDICES);

        let mut layout = InputLayout::new(device, "PositionUv", &VertexPositionUv::ELEMENTS)?;
        layout.add_vertex_buffer_binding(&vertices, 0, 0, VertexPositionUv::STRIDE)?;
        layout.add_index_buffer_binding(&indices)?;

        device.set_clear_color(Color::opaque(0.05, 0.05, 0.05));

        self.scene = Some(Scene {
            program,
            layout,
            index_count: INDICES.len() as u32,
        });
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut AppContext) {
        self.scene = None;
    }

    fn render(&mut self, ctx: &mut AppContext) {
        ctx.clear();

        let Some(scene) = &self.scene else {
            return;
        };

        scene.layout.bind();
        scene.program.bind();
        ctx.device()
            .draw_indexed(Topology::TriangleList, scene.index_count, IndexType::U32);
    }
}
