use std::fmt;
use std::rc::Rc;

use crate::device::{BufferId, BufferUsage, GraphicsDevice, IndexType};

mod sealed {
    pub trait Sealed {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Scalar types usable as index buffer elements.
pub trait IndexElement: bytemuck::Pod + sealed::Sealed {
    const INDEX_TYPE: IndexType;
}

impl IndexElement for u16 {
    const INDEX_TYPE: IndexType = IndexType::U16;
}

impl IndexElement for u32 {
    const INDEX_TYPE: IndexType = IndexType::U32;
}

/// Shared handle to an immutable, upload-once GPU buffer.
///
/// Clones refer to the same device object, which is released when the last
/// clone is dropped. Layouts hold clones of the buffers bound to them.
#[derive(Clone)]
pub struct Buffer {
    inner: Rc<BufferInner>,
}

struct BufferInner {
    device: Rc<dyn GraphicsDevice>,
    id: BufferId,
    label: String,
    usage: BufferUsage,
    size: u64,
}

impl Buffer {
    /// Uploads `vertices` into a new vertex buffer.
    pub fn vertex<T: bytemuck::Pod>(
        device: &Rc<dyn GraphicsDevice>,
        label: impl Into<String>,
        vertices: &[T],
    ) -> Self {
        Self::create(device, label.into(), BufferUsage::Vertex, bytemuck::cast_slice(vertices))
    }

    /// Uploads `indices` into a new index buffer; the index type follows `I`.
    pub fn index<I: IndexElement>(
        device: &Rc<dyn GraphicsDevice>,
        label: impl Into<String>,
        indices: &[I],
    ) -> Self {
        Self::create(
            device,
            label.into(),
            BufferUsage::Index(I::INDEX_TYPE),
            bytemuck::cast_slice(indices),
        )
    }

    fn create(
        device: &Rc<dyn GraphicsDevice>,
        label: String,
        usage: BufferUsage,
        contents: &[u8],
    ) -> Self {
        let id = device.create_buffer(&label, usage, contents);
        Self {
            inner: Rc::new(BufferInner {
                device: Rc::clone(device),
                id,
                label,
                usage,
                size: contents.len() as u64,
            }),
        }
    }

    pub fn id(&self) -> BufferId {
        self.inner.id
    }

    pub fn label(&self) -> &str {
        &self.inner.label
    }

    pub fn usage(&self) -> BufferUsage {
        self.inner.usage
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.inner.size
    }

    /// Index type for index buffers, `None` for vertex buffers.
    pub fn index_type(&self) -> Option<IndexType> {
        match self.inner.usage {
            BufferUsage::Index(ty) => Some(ty),
            BufferUsage::Vertex => None,
        }
    }

    /// Number of indices held by an index buffer.
    pub fn index_count(&self) -> Option<u32> {
        self.index_type()
            .map(|ty| (self.inner.size / ty.size_bytes()) as u32)
    }
}

impl Drop for BufferInner {
    fn drop(&mut self) {
        self.device.destroy_buffer(self.id);
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("id", &self.inner.id)
            .field("label", &self.inner.label)
            .field("usage", &self.inner.usage)
            .field("size", &self.inner.size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessDevice;

    #[test]
    fn index_buffer_reports_type_and_count() {
        let headless = Rc::new(HeadlessDevice::new());
        let device: Rc<dyn GraphicsDevice> = headless.clone();

        let short = Buffer::index(&device, "short", &[0u16, 1, 2, 2, 3, 0]);
        assert_eq!(short.index_type(), Some(IndexType::U16));
        assert_eq!(short.index_count(), Some(6));
        assert_eq!(short.size(), 12);

        let verts = Buffer::vertex(&device, "verts", &[1.0f32, 2.0, 3.0]);
        assert_eq!(verts.index_type(), None);
        assert_eq!(headless.live_buffers()[&verts.id()].contents.len(), 12);
    }

    #[test]
    fn last_clone_releases_the_device_buffer() {
        let headless = Rc::new(HeadlessDevice::new());
        let device: Rc<dyn GraphicsDevice> = headless.clone();

        let a = Buffer::vertex(&device, "shared", &[0u8; 16]);
        let b = a.clone();
        assert_eq!(a.id(), b.id());

        drop(a);
        assert_eq!(headless.live_buffers().len(), 1);
        drop(b);
        assert!(headless.live_buffers().is_empty());
    }
}
