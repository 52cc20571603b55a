use std::fmt;

macro_rules! handle_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", stringify!($name), self.0)
            }
        }
    };
}

handle_id!(
    /// Device handle of a compiled single-stage program.
    ProgramId
);
handle_id!(
    /// Device handle of a program pipeline.
    PipelineId
);
handle_id!(
    /// Device handle of an immutable GPU buffer.
    BufferId
);
handle_id!(
    /// Device handle of a vertex input layout.
    VertexLayoutId
);

/// Pipeline stage a program targets.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub const ALL: [StageKind; 2] = [StageKind::Vertex, StageKind::Fragment];

    /// Prefix used for the stage programs of a built pipeline (`VS_`, `FS_`).
    pub fn label_prefix(self) -> &'static str {
        match self {
            StageKind::Vertex => "VS_",
            StageKind::Fragment => "FS_",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StageKind::Vertex => "vertex",
            StageKind::Fragment => "fragment",
        })
    }
}

/// Scalar type of one vertex attribute component.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ComponentType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F16,
    F32,
}

/// Element type of an index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    pub fn size_bytes(self) -> u64 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// What a buffer was created for.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    Vertex,
    Index(IndexType),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum Topology {
    PointList,
    LineList,
    LineStrip,
    #[default]
    TriangleList,
    TriangleStrip,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum FrontFace {
    Ccw,
    Cw,
}

/// Fixed-function state applied to every draw.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct RenderState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub depth_test: bool,
    pub depth_write: bool,
}

impl Default for RenderState {
    /// Back-face culling, counter-clockwise front faces, depth test on.
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::Ccw,
            depth_test: true,
            depth_write: true,
        }
    }
}

/// Which framebuffer planes a clear touches.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    pub const COLOR: ClearFlags = ClearFlags { color: true, depth: false };
    pub const DEPTH: ClearFlags = ClearFlags { color: false, depth: true };
    pub const COLOR_DEPTH: ClearFlags = ClearFlags { color: true, depth: true };
}

/// One attribute declared against a vertex layout.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub index: u32,
    pub format: wgpu::VertexFormat,
    pub offset: u64,
    pub binding: u32,
}

/// Resolves a component description to a fetchable vertex format.
///
/// Returns `None` for combinations no backend can fetch, such as three
/// 8-bit components or normalized floats.
pub fn vertex_format(
    component_count: u32,
    component_type: ComponentType,
    normalized: bool,
) -> Option<wgpu::VertexFormat> {
    use wgpu::VertexFormat as F;
    use ComponentType as T;

    let format = match (component_type, normalized, component_count) {
        (T::F32, false, 1) => F::Float32,
        (T::F32, false, 2) => F::Float32x2,
        (T::F32, false, 3) => F::Float32x3,
        (T::F32, false, 4) => F::Float32x4,

        (T::F16, false, 1) => F::Float16,
        (T::F16, false, 2) => F::Float16x2,
        (T::F16, false, 4) => F::Float16x4,

        (T::U32, false, 1) => F::Uint32,
        (T::U32, false, 2) => F::Uint32x2,
        (T::U32, false, 3) => F::Uint32x3,
        (T::U32, false, 4) => F::Uint32x4,
        (T::I32, false, 1) => F::Sint32,
        (T::I32, false, 2) => F::Sint32x2,
        (T::I32, false, 3) => F::Sint32x3,
        (T::I32, false, 4) => F::Sint32x4,

        (T::U16, false, 1) => F::Uint16,
        (T::U16, false, 2) => F::Uint16x2,
        (T::U16, false, 4) => F::Uint16x4,
        (T::U16, true, 1) => F::Unorm16,
        (T::U16, true, 2) => F::Unorm16x2,
        (T::U16, true, 4) => F::Unorm16x4,
        (T::I16, false, 1) => F::Sint16,
        (T::I16, false, 2) => F::Sint16x2,
        (T::I16, false, 4) => F::Sint16x4,
        (T::I16, true, 1) => F::Snorm16,
        (T::I16, true, 2) => F::Snorm16x2,
        (T::I16, true, 4) => F::Snorm16x4,

        (T::U8, false, 1) => F::Uint8,
        (T::U8, false, 2) => F::Uint8x2,
        (T::U8, false, 4) => F::Uint8x4,
        (T::U8, true, 1) => F::Unorm8,
        (T::U8, true, 2) => F::Unorm8x2,
        (T::U8, true, 4) => F::Unorm8x4,
        (T::I8, false, 1) => F::Sint8,
        (T::I8, false, 2) => F::Sint8x2,
        (T::I8, false, 4) => F::Sint8x4,
        (T::I8, true, 1) => F::Snorm8,
        (T::I8, true, 2) => F::Snorm8x2,
        (T::I8, true, 4) => F::Snorm8x4,

        _ => return None,
    };

    Some(format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_vectors_resolve() {
        assert_eq!(
            vertex_format(3, ComponentType::F32, false),
            Some(wgpu::VertexFormat::Float32x3)
        );
        assert_eq!(
            vertex_format(2, ComponentType::F32, false),
            Some(wgpu::VertexFormat::Float32x2)
        );
    }

    #[test]
    fn normalized_bytes_resolve() {
        assert_eq!(
            vertex_format(4, ComponentType::U8, true),
            Some(wgpu::VertexFormat::Unorm8x4)
        );
    }

    #[test]
    fn unfetchable_combinations_are_rejected() {
        assert_eq!(vertex_format(3, ComponentType::U8, false), None);
        assert_eq!(vertex_format(2, ComponentType::F32, true), None);
        assert_eq!(vertex_format(0, ComponentType::F32, false), None);
        assert_eq!(vertex_format(5, ComponentType::I32, false), None);
    }

    #[test]
    fn stage_prefixes() {
        assert_eq!(StageKind::Vertex.label_prefix(), "VS_");
        assert_eq!(StageKind::Fragment.label_prefix(), "FS_");
    }
}
