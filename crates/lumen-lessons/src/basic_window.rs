use lumen_engine::input::KeyEvent;
use lumen_engine::time::FrameTime;
use lumen_engine::{AppConfig, AppContext, Application};

/// A window cleared every frame. Escape closes it, F11 toggles fullscreen.
#[derive(Debug, Default)]
pub struct BasicWindowApplication {
    frames: u64,
    seconds: f32,
}

impl BasicWindowApplication {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Application for BasicWindowApplication {
    fn config(&self) -> AppConfig {
        AppConfig::default().with_title("Basic Window")
    }

    fn update(&mut self, _ctx: &mut AppContext, time: FrameTime) {
        self.frames += 1;
        self.seconds += time.dt;

        if self.seconds >= 5.0 {
            log::debug!("{} frames, {:.1}s", self.frames, time.elapsed);
            self.seconds = 0.0;
        }
    }

    fn on_key_down(&mut self, ctx: &mut AppContext, event: &KeyEvent) {
        log::trace!("key down: {}", event.key);
        ctx.handle_default_key_down(event);
    }
}
