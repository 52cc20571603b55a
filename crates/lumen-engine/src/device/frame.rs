/// Represents a single acquired frame.
///
/// Holding the surface texture prevents acquisition of subsequent frames, so the
/// frame is encoded and submitted within one `present` call.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
