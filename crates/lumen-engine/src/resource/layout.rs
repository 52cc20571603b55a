use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use crate::device::{
    vertex_format, BufferUsage, ComponentType, GraphicsDevice, IndexType, VertexAttribute,
    VertexLayoutId,
};
use crate::error::LayoutError;

use super::buffer::Buffer;

/// One attribute of a vertex record, described independently of any buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct InputLayoutElement {
    /// Shader input location; unique within a layout.
    pub attribute_index: u32,
    pub component_count: u32,
    pub component_type: ComponentType,
    pub normalized: bool,
    /// Byte offset of the attribute inside one vertex record.
    pub offset: u64,
    /// Binding slot the attribute is fetched from.
    pub binding_index: u32,
}

impl InputLayoutElement {
    pub const fn new(
        attribute_index: u32,
        component_count: u32,
        component_type: ComponentType,
        normalized: bool,
        offset: u64,
        binding_index: u32,
    ) -> Self {
        Self {
            attribute_index,
            component_count,
            component_type,
            normalized,
            offset,
            binding_index,
        }
    }

    /// Non-normalized `f32` vector attribute.
    pub const fn float(
        attribute_index: u32,
        component_count: u32,
        offset: u64,
        binding_index: u32,
    ) -> Self {
        Self::new(
            attribute_index,
            component_count,
            ComponentType::F32,
            false,
            offset,
            binding_index,
        )
    }
}

/// Buffer bound to one binding slot.
#[derive(Debug, Clone)]
pub struct VertexBinding {
    pub buffer: Buffer,
    pub offset: u64,
    pub stride: u64,
}

/// Vertex-fetch schema plus the buffers currently bound to it.
///
/// The schema is fixed at creation; binding buffers is the only mutation.
/// Drawing with a slot referenced by an element but never bound is a caller
/// error that is reported by [`unbound_slots`](Self::unbound_slots) but not
/// prevented.
pub struct InputLayout {
    device: Rc<dyn GraphicsDevice>,
    id: VertexLayoutId,
    label: String,
    elements: Vec<InputLayoutElement>,
    vertex_bindings: BTreeMap<u32, VertexBinding>,
    index_buffer: Option<Buffer>,
}

impl InputLayout {
    /// Creates the layout and declares every element against it.
    ///
    /// No buffer needs to exist yet. Duplicate attribute indices and component
    /// formats that cannot be fetched are rejected before any device object is
    /// created.
    pub fn new(
        device: &Rc<dyn GraphicsDevice>,
        label: impl Into<String>,
        elements: &[InputLayoutElement],
    ) -> Result<Self, LayoutError> {
        let label = label.into();

        let mut seen = BTreeSet::new();
        let mut attributes = Vec::with_capacity(elements.len());

        for e in elements {
            if !seen.insert(e.attribute_index) {
                return Err(LayoutError::DuplicateAttribute {
                    label,
                    attribute_index: e.attribute_index,
                });
            }

            let Some(format) = vertex_format(e.component_count, e.component_type, e.normalized)
            else {
                return Err(LayoutError::UnsupportedFormat {
                    label,
                    attribute_index: e.attribute_index,
                    component_count: e.component_count,
                    component_type: e.component_type,
                    normalized: e.normalized,
                });
            };

            attributes.push(VertexAttribute {
                index: e.attribute_index,
                format,
                offset: e.offset,
                binding: e.binding_index,
            });
        }

        let id = device.create_vertex_layout(&label);
        for attribute in attributes {
            device.declare_attribute(id, attribute);
        }

        Ok(Self {
            device: Rc::clone(device),
            id,
            label,
            elements: elements.to_vec(),
            vertex_bindings: BTreeMap::new(),
            index_buffer: None,
        })
    }

    /// Sources `binding_index` from `buffer`, replacing any previous binding.
    pub fn add_vertex_buffer_binding(
        &mut self,
        buffer: &Buffer,
        binding_index: u32,
        offset: u64,
        stride: u64,
    ) -> Result<(), LayoutError> {
        if buffer.usage() != BufferUsage::Vertex {
            return Err(self.usage_mismatch(buffer, BufferUsage::Vertex));
        }

        self.device
            .bind_vertex_buffer(self.id, binding_index, buffer.id(), offset, stride);

        self.vertex_bindings.insert(
            binding_index,
            VertexBinding {
                buffer: buffer.clone(),
                offset,
                stride,
            },
        );
        Ok(())
    }

    /// Attaches the layout's index buffer, replacing any previous one.
    pub fn add_index_buffer_binding(&mut self, buffer: &Buffer) -> Result<(), LayoutError> {
        let Some(index_type) = buffer.index_type() else {
            return Err(self.usage_mismatch(buffer, BufferUsage::Index(IndexType::U32)));
        };

        self.device.bind_index_buffer(self.id, buffer.id(), index_type);
        self.index_buffer = Some(buffer.clone());
        Ok(())
    }

    /// Makes this the active vertex-fetch source. Idempotent.
    pub fn bind(&self) {
        self.device.bind_vertex_layout(self.id);
    }

    /// Binding slots referenced by an element that have no buffer yet.
    pub fn unbound_slots(&self) -> Vec<u32> {
        self.elements
            .iter()
            .map(|e| e.binding_index)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter(|slot| !self.vertex_bindings.contains_key(slot))
            .collect()
    }

    pub fn id(&self) -> VertexLayoutId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn elements(&self) -> &[InputLayoutElement] {
        &self.elements
    }

    pub fn vertex_binding(&self, binding_index: u32) -> Option<&VertexBinding> {
        self.vertex_bindings.get(&binding_index)
    }

    pub fn index_buffer(&self) -> Option<&Buffer> {
        self.index_buffer.as_ref()
    }

    pub fn index_type(&self) -> Option<IndexType> {
        self.index_buffer.as_ref().and_then(Buffer::index_type)
    }

    fn usage_mismatch(&self, buffer: &Buffer, expected: BufferUsage) -> LayoutError {
        LayoutError::BufferUsage {
            label: self.label.clone(),
            buffer: buffer.label().to_string(),
            expected,
            found: buffer.usage(),
        }
    }
}

impl Drop for InputLayout {
    fn drop(&mut self) {
        self.device.destroy_vertex_layout(self.id);
    }
}

impl fmt::Debug for InputLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputLayout")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("elements", &self.elements)
            .field("vertex_bindings", &self.vertex_bindings)
            .field("index_buffer", &self.index_buffer)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::{DeviceCall, HeadlessDevice};

    fn headless() -> (Rc<HeadlessDevice>, Rc<dyn GraphicsDevice>) {
        let headless = Rc::new(HeadlessDevice::new());
        let device: Rc<dyn GraphicsDevice> = headless.clone();
        (headless, device)
    }

    const ELEMENTS: [InputLayoutElement; 2] = [
        InputLayoutElement::float(0, 3, 0, 0),
        InputLayoutElement::float(1, 2, 12, 0),
    ];

    #[test]
    fn elements_are_declared_without_buffers() {
        let (headless, device) = headless();

        let layout = InputLayout::new(&device, "pos_uv", &ELEMENTS).unwrap();

        let layouts = headless.live_layouts();
        let record = &layouts[&layout.id()];
        assert_eq!(record.label, "pos_uv");
        assert_eq!(record.attributes.len(), 2);
        assert_eq!(record.attributes[1].format, wgpu::VertexFormat::Float32x2);
        assert_eq!(record.attributes[1].offset, 12);
        assert!(record.vertex_buffers.is_empty());
        assert_eq!(layout.unbound_slots(), vec![0]);
    }

    #[test]
    fn duplicate_attribute_index_is_rejected_before_creation() {
        let (headless, device) = headless();

        let err = InputLayout::new(
            &device,
            "dup",
            &[InputLayoutElement::float(0, 3, 0, 0), InputLayoutElement::float(0, 2, 12, 0)],
        )
        .unwrap_err();

        assert!(matches!(err, LayoutError::DuplicateAttribute { attribute_index: 0, .. }));
        assert!(headless.calls().is_empty());
    }

    #[test]
    fn unfetchable_format_is_rejected() {
        let (_headless, device) = headless();

        let err = InputLayout::new(
            &device,
            "bad",
            &[InputLayoutElement::new(0, 3, ComponentType::U8, true, 0, 0)],
        )
        .unwrap_err();

        assert!(matches!(err, LayoutError::UnsupportedFormat { component_count: 3, .. }));
    }

    #[test]
    fn bindings_record_buffers_and_index_type() {
        let (headless, device) = headless();

        let vertices = Buffer::vertex(&device, "verts", &[[0.0f32; 5]; 3]);
        let indices = Buffer::index(&device, "indices", &[0u32, 1, 2]);

        let mut layout = InputLayout::new(&device, "pos_uv", &ELEMENTS).unwrap();
        layout.add_vertex_buffer_binding(&vertices, 0, 0, 20).unwrap();
        layout.add_index_buffer_binding(&indices).unwrap();

        assert!(layout.unbound_slots().is_empty());
        assert_eq!(layout.index_type(), Some(IndexType::U32));

        let layouts = headless.live_layouts();
        let record = &layouts[&layout.id()];
        assert_eq!(record.vertex_buffers[&0], (vertices.id(), 0, 20));
        assert_eq!(record.index_buffer, Some((indices.id(), IndexType::U32)));
    }

    #[test]
    fn wrong_usage_is_rejected() {
        let (_headless, device) = headless();

        let vertices = Buffer::vertex(&device, "verts", &[[0.0f32; 5]; 3]);
        let indices = Buffer::index(&device, "indices", &[0u16, 1, 2]);
        let mut layout = InputLayout::new(&device, "pos_uv", &ELEMENTS).unwrap();

        assert!(matches!(
            layout.add_vertex_buffer_binding(&indices, 0, 0, 20),
            Err(LayoutError::BufferUsage { found: BufferUsage::Index(IndexType::U16), .. })
        ));
        assert!(matches!(
            layout.add_index_buffer_binding(&vertices),
            Err(LayoutError::BufferUsage { found: BufferUsage::Vertex, .. })
        ));
    }

    #[test]
    fn bind_is_idempotent() {
        let (headless, device) = headless();
        let layout = InputLayout::new(&device, "pos_uv", &ELEMENTS).unwrap();

        layout.bind();
        layout.bind();

        assert_eq!(headless.bound_layout(), Some(layout.id()));
        assert_eq!(
            headless
                .calls()
                .iter()
                .filter(|c| **c == DeviceCall::BindVertexLayout(layout.id()))
                .count(),
            2
        );
    }

    #[test]
    fn layout_keeps_bound_buffers_alive() {
        let (headless, device) = headless();

        let mut layout = InputLayout::new(&device, "pos_uv", &ELEMENTS).unwrap();
        {
            let vertices = Buffer::vertex(&device, "verts", &[[0.0f32; 5]; 3]);
            layout.add_vertex_buffer_binding(&vertices, 0, 0, 20).unwrap();
        }
        assert_eq!(headless.live_buffers().len(), 1);

        drop(layout);
        assert_eq!(headless.live_object_count(), 0);
    }
}
