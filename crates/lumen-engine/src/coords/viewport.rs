/// Rendering viewport in framebuffer pixels.
///
/// Origin is the bottom-left corner for GL-style backends and the top-left corner
/// for wgpu; the framework only ever sets full-framebuffer viewports, so the
/// distinction does not leak into application code.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Viewport covering a whole framebuffer of `width` x `height`.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}
