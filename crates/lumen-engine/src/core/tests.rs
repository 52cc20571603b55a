use std::rc::Rc;

use crate::coords::{MonitorBounds, Viewport, WindowGeometry};
use crate::core::DebugBreakPolicy;
use crate::device::{
    DebugKind, DebugMessage, DebugSeverity, DebugSource, GraphicsDevice, RenderState,
};
use crate::headless::{DeviceCall, HeadlessDevice, HeadlessPlatform};
use crate::input::{Key, KeyEvent};
use crate::paint::Color;
use crate::resource::{Buffer, InputLayout, InputLayoutElement, ProgramPipeline};
use crate::time::FrameTime;
use crate::window::PlatformEvent;
use crate::{AppConfig, AppContext, Application, LifecycleState, Runtime};

const VERTEX: &str = r#"
@vertex
fn main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return vec4<f32>(position, 1.0);
}
"#;

const FRAGMENT: &str = r#"
@fragment
fn main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.5, 0.0, 1.0);
}
"#;

fn key_down(key: Key) -> PlatformEvent {
    PlatformEvent::Key(KeyEvent::pressed(key))
}

fn resize(width: i32, height: i32) -> PlatformEvent {
    PlatformEvent::FramebufferResized { width, height }
}

fn error_message(id: u32) -> DebugMessage {
    DebugMessage::new(id, DebugSource::Api, DebugKind::Error, DebugSeverity::High, "invalid draw")
}

#[derive(Default)]
struct Recorder {
    device: Option<Rc<HeadlessDevice>>,
    fail_load: bool,
    create_resources: bool,
    toggle_on_load: bool,
    toggle_on_first_update: bool,

    initialized: u32,
    loaded: u32,
    unloaded: u32,
    updates: u32,
    renders: u32,
    renders_at_update: Vec<u32>,
    renders_at_resize: Vec<u32>,
    resizes: Vec<(i32, i32)>,
    keys_up: Vec<Key>,
    messages: Vec<u32>,
    geometries: Vec<Option<WindowGeometry>>,
    fullscreen: Vec<bool>,

    pipeline: Option<ProgramPipeline>,
    layout: Option<InputLayout>,
    buffer: Option<Buffer>,
}

impl Application for Recorder {
    fn config(&self) -> AppConfig {
        AppConfig {
            debug_break_policy: DebugBreakPolicy::LogOnly,
            ..AppConfig::default().with_title("recorder")
        }
    }

    fn initialize(&mut self, _ctx: &mut AppContext) -> anyhow::Result<()> {
        self.initialized += 1;
        Ok(())
    }

    fn load(&mut self, ctx: &mut AppContext) -> anyhow::Result<()> {
        self.loaded += 1;

        if self.create_resources {
            let device = ctx.device();
            self.pipeline = Some(ProgramPipeline::from_sources(device, "flat", VERTEX, FRAGMENT)?);

            let buffer = Buffer::vertex(device, "points", &[[0.0f32; 3]; 3]);
            let mut layout = InputLayout::new(device, "points", &[InputLayoutElement::float(0, 3, 0, 0)])?;
            layout.add_vertex_buffer_binding(&buffer, 0, 0, 12)?;
            self.buffer = Some(buffer);
            self.layout = Some(layout);
        }

        if self.fail_load {
            anyhow::bail!("asset missing");
        }
        if self.toggle_on_load {
            ctx.toggle_fullscreen();
        }
        Ok(())
    }

    fn unload(&mut self, _ctx: &mut AppContext) {
        self.unloaded += 1;
        self.layout = None;
        self.buffer = None;
        self.pipeline = None;
    }

    fn update(&mut self, ctx: &mut AppContext, time: FrameTime) {
        self.updates += 1;
        self.renders_at_update.push(self.renders);
        self.geometries.push(ctx.window_geometry());
        self.fullscreen.push(ctx.is_fullscreen());

        if self.toggle_on_first_update && time.frame_index == 0 {
            ctx.toggle_fullscreen();
        }

        if time.frame_index == 0 {
            if let Some(device) = &self.device {
                device.emit_debug_message(error_message(1282));
                device.emit_debug_message(error_message(131185));
                device.emit_debug_message(DebugMessage::new(
                    5,
                    DebugSource::Application,
                    DebugKind::Other,
                    DebugSeverity::Notification,
                    "marker",
                ));
            }
        }
    }

    fn render(&mut self, ctx: &mut AppContext) {
        self.renders += 1;
        ctx.clear();
    }

    fn on_framebuffer_resized(&mut self, ctx: &mut AppContext, width: i32, height: i32) {
        self.renders_at_resize.push(self.renders);
        self.resizes.push((width, height));
        ctx.apply_framebuffer_viewport();
    }

    fn on_key_up(&mut self, _ctx: &mut AppContext, event: &KeyEvent) {
        self.keys_up.push(event.key);
    }

    fn on_debug_message(&mut self, ctx: &mut AppContext, message: &DebugMessage) {
        self.messages.push(message.id);
        ctx.report_debug_message(message);
    }
}

#[test]
fn baseline_state_is_applied_after_initialize() {
    let platform = HeadlessPlatform::new().with_frame_limit(1);
    let probe = platform.probe();
    let mut app = Recorder::default();

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.frames, 1);
    assert_eq!(summary.final_state, LifecycleState::Unloaded);
    assert_eq!((app.initialized, app.loaded, app.unloaded), (1, 1, 1));

    let device = probe.device();
    assert_eq!(device.render_state(), Some(RenderState::default()));
    assert_eq!(device.clear_color(), Some(Color::new(0.35, 0.76, 0.16, 1.0)));
    assert_eq!(device.clear_depth(), Some(1.0));
    assert_eq!(device.viewport(), Some(Viewport::new(0, 0, 1536, 864)));
    assert!(device.has_debug_sink());
    assert_eq!(device.present_count(), 1);
    assert_eq!(probe.swaps(), 1);
}

#[test]
fn window_is_centred_at_eighty_percent() {
    let platform = HeadlessPlatform::new()
        .with_monitor(MonitorBounds::new(2560, 1440, 1920, 0))
        .with_frame_limit(1);
    let mut app = Recorder::default();

    Runtime::run(&mut app, platform).unwrap();

    assert_eq!(
        app.geometries,
        vec![Some(WindowGeometry {
            x: 2176,
            y: 144,
            width: 2048,
            height: 1152
        })]
    );
}

#[test]
fn non_positive_resize_is_ignored() {
    let platform = HeadlessPlatform::new()
        .with_poll([resize(0, 600)])
        .with_poll([resize(800, -1)])
        .with_poll([resize(0, 0)]);
    let probe = platform.probe();
    let mut app = Recorder::default();

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.frames, 3);
    assert!(app.resizes.is_empty());
    assert_eq!(app.renders, 3);
    assert_eq!(probe.device().viewport(), Some(Viewport::new(0, 0, 1536, 864)));
    assert!(
        !probe
            .device()
            .calls()
            .iter()
            .any(|c| matches!(c, DeviceCall::ResizeFramebuffer { .. }))
    );
}

#[test]
fn resize_updates_viewport_and_renders_immediately() {
    let platform = HeadlessPlatform::new().with_poll([resize(640, 480)]);
    let probe = platform.probe();
    let mut app = Recorder::default();

    Runtime::run(&mut app, platform).unwrap();

    assert_eq!(app.resizes, vec![(640, 480)]);
    assert_eq!(app.renders, 2);
    assert_eq!(probe.device().viewport(), Some(Viewport::new(0, 0, 640, 480)));
    assert_eq!(probe.device().framebuffer_size(), (640, 480));
}

#[test]
fn escape_stops_the_loop_at_the_next_check() {
    let platform = HeadlessPlatform::new()
        .with_poll([])
        .with_poll([key_down(Key::Escape)])
        .with_poll([])
        .with_poll([])
        .with_frame_limit(10);
    let probe = platform.probe();
    let mut app = Recorder::default();

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.frames, 2);
    assert_eq!(app.updates, 2);
    assert_eq!(app.renders, 2);
    assert_eq!(probe.polls(), 2);
    assert_eq!(app.unloaded, 1);
}

#[test]
fn key_release_goes_to_on_key_up() {
    let platform = HeadlessPlatform::new().with_poll([
        PlatformEvent::Key(KeyEvent::released(Key::Escape)),
        PlatformEvent::Key(KeyEvent::released(Key::A)),
    ]);
    let mut app = Recorder::default();

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.frames, 1);
    assert_eq!(app.keys_up, vec![Key::Escape, Key::A]);
}

#[test]
fn fullscreen_toggle_round_trips_exactly() {
    let platform = HeadlessPlatform::new()
        .with_poll([])
        .with_poll([key_down(Key::F11)])
        .with_poll([])
        .with_poll([key_down(Key::F11)])
        .with_poll([]);
    let mut app = Recorder::default();

    Runtime::run(&mut app, platform).unwrap();

    let windowed = Some(WindowGeometry {
        x: 192,
        y: 108,
        width: 1536,
        height: 864,
    });
    let full = Some(WindowGeometry {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    });

    assert_eq!(app.geometries, vec![windowed, full, full, windowed, windowed]);
    assert_eq!(app.fullscreen, vec![false, true, true, false, false]);
    assert_eq!(app.resizes, vec![(1920, 1080), (1536, 864)]);
}

#[test]
fn fullscreen_toggle_forces_a_render() {
    let platform = HeadlessPlatform::new().with_poll([key_down(Key::F11)]);
    let mut app = Recorder::default();

    Runtime::run(&mut app, platform).unwrap();

    assert_eq!(app.updates, 1);
    assert_eq!(app.renders, 2);
}

#[test]
fn toggle_from_update_renders_within_the_same_frame() {
    let platform = HeadlessPlatform::new();
    let probe = platform.probe();
    let mut app = Recorder {
        toggle_on_first_update: true,
        ..Recorder::default()
    };

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.frames, 1);
    assert_eq!(app.renders_at_update, vec![0]);
    assert_eq!(app.renders, 2);
    assert_eq!(probe.device().calls().iter().filter(|c| c.is_clear()).count(), 2);
}

#[test]
fn toggle_from_load_renders_before_the_first_poll() {
    let platform = HeadlessPlatform::new().with_poll([]);
    let mut app = Recorder {
        toggle_on_load: true,
        ..Recorder::default()
    };

    Runtime::run(&mut app, platform).unwrap();

    assert_eq!(app.renders_at_resize, vec![1]);
    assert_eq!(app.resizes, vec![(1920, 1080)]);
    assert_eq!(app.renders_at_update, vec![2]);
    assert_eq!(app.renders, 3);
}

#[test]
fn error_diagnostic_requests_exactly_one_break() {
    let platform = HeadlessPlatform::new().with_frame_limit(2);
    let mut app = Recorder {
        device: Some(platform.device()),
        ..Recorder::default()
    };

    let summary = Runtime::run(&mut app, platform).unwrap();

    assert_eq!(summary.debug_breaks, 1);
    assert_eq!(app.messages, vec![1282, 5]);
}

#[test]
fn every_handle_is_released_after_unload() {
    let platform = HeadlessPlatform::new().with_frame_limit(3);
    let probe = platform.probe();
    let mut app = Recorder {
        create_resources: true,
        ..Recorder::default()
    };

    Runtime::run(&mut app, platform).unwrap();

    assert_eq!(probe.device().live_object_count(), 0);
    assert!(!probe.has_window());
    assert_eq!(probe.windows_created(), 1);
    assert_eq!(probe.windows_destroyed(), 1);
    assert!(probe.is_terminated());
}

#[test]
fn failed_load_still_unloads_and_tears_down() {
    let platform = HeadlessPlatform::new().with_frame_limit(3);
    let probe = platform.probe();
    let mut app = Recorder {
        create_resources: true,
        fail_load: true,
        ..Recorder::default()
    };

    let err = Runtime::run(&mut app, platform).unwrap_err();

    assert!(format!("{err:#}").contains("asset missing"));
    assert_eq!(app.unloaded, 1);
    assert_eq!(app.updates, 0);
    assert_eq!(probe.swaps(), 0);
    assert_eq!(probe.device().present_count(), 0);
    assert_eq!(probe.device().live_object_count(), 0);
    assert!(!probe.has_window());
    assert!(probe.is_terminated());
}

#[test]
fn initialization_failures_abort_before_any_hook() {
    let platform = HeadlessPlatform::new().fail_initialization("no display");
    let probe = platform.probe();
    let mut app = Recorder::default();

    let err = Runtime::run(&mut app, platform).unwrap_err();
    assert!(format!("{err:#}").contains("no display"));
    assert_eq!((app.initialized, app.loaded, app.unloaded), (0, 0, 0));
    assert_eq!(probe.windows_created(), 0);

    let platform = HeadlessPlatform::new().fail_window_creation("denied");
    let probe = platform.probe();
    assert!(Runtime::run(&mut app, platform).is_err());
    assert!(probe.is_terminated());

    let platform = HeadlessPlatform::new().fail_graphics_context("no adapter");
    let probe = platform.probe();
    assert!(Runtime::run(&mut app, platform).is_err());
    assert_eq!(probe.windows_created(), 1);
    assert_eq!(probe.windows_destroyed(), 1);
    assert!(probe.is_terminated());
    assert_eq!(app.initialized, 0);
}

#[test]
fn default_hooks_clear_once_per_frame() {
    struct Blank;
    impl Application for Blank {}

    let platform = HeadlessPlatform::new().with_frame_limit(4);
    let probe = platform.probe();

    let summary = Runtime::run(&mut Blank, platform).unwrap();

    assert_eq!(summary.frames, 4);
    let clears = probe.device().calls().iter().filter(|c| c.is_clear()).count();
    assert_eq!(clears, 4);
}

#[test]
fn device_is_usable_through_the_trait_object() {
    let headless = Rc::new(HeadlessDevice::new());
    let device: Rc<dyn GraphicsDevice> = headless.clone();

    device.set_viewport(Viewport::from_size(8, 8));
    assert_eq!(headless.viewport(), Some(Viewport::new(0, 0, 8, 8)));
}
