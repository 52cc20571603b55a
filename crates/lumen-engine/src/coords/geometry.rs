/// Primary monitor bounds in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct MonitorBounds {
    pub width: u32,
    pub height: u32,
    pub left: i32,
    pub top: i32,
}

/// Window position and size in physical pixels.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct WindowGeometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl MonitorBounds {
    #[inline]
    pub const fn new(width: u32, height: u32, left: i32, top: i32) -> Self {
        Self { width, height, left, top }
    }

    /// Geometry covering the whole monitor.
    pub fn fullscreen(&self) -> WindowGeometry {
        WindowGeometry {
            x: self.left,
            y: self.top,
            width: self.width,
            height: self.height,
        }
    }

    /// Window of `scale` times the monitor size, centred on the monitor.
    ///
    /// Sizes are truncated, and the centring uses integer halves of both the
    /// screen and the window, so the result is stable across repeated calls.
    pub fn centered(&self, scale: f32) -> WindowGeometry {
        let scale = if scale.is_finite() { scale.clamp(0.05, 1.0) } else { 1.0 };

        let width = ((self.width as f32 * scale) as u32).max(1);
        let height = ((self.height as f32 * scale) as u32).max(1);

        let x = (self.width / 2) as i32 - (width / 2) as i32 + self.left;
        let y = (self.height / 2) as i32 - (height / 2) as i32 + self.top;

        WindowGeometry { x, y, width, height }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_is_eighty_percent_and_centred() {
        let m = MonitorBounds::new(1920, 1080, 0, 0);
        let g = m.centered(0.8);
        assert_eq!(g, WindowGeometry { x: 192, y: 108, width: 1536, height: 864 });
    }

    #[test]
    fn centered_respects_monitor_origin() {
        let m = MonitorBounds::new(2560, 1440, 1920, -200);
        let g = m.centered(0.8);
        assert_eq!(g.width, 2048);
        assert_eq!(g.height, 1152);
        assert_eq!(g.x, 1280 - 1024 + 1920);
        assert_eq!(g.y, 720 - 576 - 200);
    }

    #[test]
    fn centered_handles_odd_sizes() {
        let m = MonitorBounds::new(1366, 767, 0, 0);
        let g = m.centered(0.8);
        assert_eq!(g.width, 1092);
        assert_eq!(g.height, 613);
        assert_eq!(g.x, 683 - 546);
        assert_eq!(g.y, 383 - 306);
    }

    #[test]
    fn fullscreen_matches_bounds() {
        let m = MonitorBounds::new(1920, 1080, -1920, 0);
        assert_eq!(
            m.fullscreen(),
            WindowGeometry { x: -1920, y: 0, width: 1920, height: 1080 }
        );
    }

    #[test]
    fn centered_is_deterministic() {
        let m = MonitorBounds::new(3840, 2160, 0, 0);
        assert_eq!(m.centered(0.8), m.centered(0.8));
    }
}
