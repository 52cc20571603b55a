use std::rc::Rc;
use std::sync::mpsc;

use anyhow::Context as _;

use crate::coords::Viewport;
use crate::device::GraphicsDevice;
use crate::input::KeyState;
use crate::time::FrameClock;
use crate::window::{Platform, PlatformEvent};

use super::app::Application;
use super::config::AppConfig;
use super::ctx::AppContext;

/// Lifecycle position of a run.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LifecycleState {
    Unstarted,
    Initialized,
    Loaded,
    Running,
    Unloaded,
}

/// Outcome of a run that reached Unload normally.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct RunSummary {
    /// Frames that went through update, render and present.
    pub frames: u64,
    pub final_state: LifecycleState,
    pub debug_breaks: u32,
}

/// Drives an [`Application`] through Initialize, Load, the frame loop and
/// Unload on the calling thread.
pub struct Runtime {
    state: LifecycleState,
    frames: u64,
}

impl Runtime {
    /// Runs `app` on `platform` until the close flag is set.
    ///
    /// Errors from initialization, `initialize`/`load` hooks or presentation
    /// end the run; the window and device are torn down before returning.
    pub fn run<A, P>(app: &mut A, platform: P) -> anyhow::Result<RunSummary>
    where
        A: Application + ?Sized,
        P: Platform + 'static,
    {
        let mut runtime = Runtime {
            state: LifecycleState::Unstarted,
            frames: 0,
        };
        runtime.run_boxed(app, Box::new(platform))
    }

    fn run_boxed<A>(&mut self, app: &mut A, platform: Box<dyn Platform>) -> anyhow::Result<RunSummary>
    where
        A: Application + ?Sized,
    {
        let config = app.config();

        let mut ctx = match initialize_base(platform, config) {
            Ok(ctx) => ctx,
            Err(err) => {
                log::error!("App: initialization failed: {err:#}");
                return Err(err);
            }
        };

        if let Err(err) = app.initialize(&mut ctx).context("initialize hook failed") {
            log::error!("App: {err:#}");
            self.unload(app, ctx);
            return Err(err);
        }
        render_if_requested(app, &mut ctx);
        self.transition(LifecycleState::Initialized);
        log::info!("App: Initialized");

        if let Err(err) = app.load(&mut ctx).context("load hook failed") {
            log::error!("App: {err:#}");
            self.unload(app, ctx);
            return Err(err);
        }
        render_if_requested(app, &mut ctx);
        self.transition(LifecycleState::Loaded);
        log::info!("App: Loaded");

        let result = self.frame_loop(app, &mut ctx);
        let debug_breaks = ctx.debug_breaks();
        self.unload(app, ctx);

        result.map(|()| RunSummary {
            frames: self.frames,
            final_state: self.state,
            debug_breaks,
        })
    }

    fn frame_loop<A>(&mut self, app: &mut A, ctx: &mut AppContext) -> anyhow::Result<()>
    where
        A: Application + ?Sized,
    {
        self.transition(LifecycleState::Running);

        let mut clock = FrameClock::new();

        while !ctx.should_close() {
            for event in ctx.platform.poll_events() {
                dispatch_event(app, ctx, event);
                render_if_requested(app, ctx);
            }

            dispatch_diagnostics(app, ctx);
            render_if_requested(app, ctx);
            app.update(ctx, clock.tick());
            render_if_requested(app, ctx);
            app.render(ctx);
            render_if_requested(app, ctx);
            dispatch_diagnostics(app, ctx);
            render_if_requested(app, ctx);

            ctx.platform.swap_buffers();
            ctx.device()
                .present()
                .with_context(|| format!("presenting frame {}", self.frames))?;

            self.frames += 1;
        }

        log::debug!("frame loop finished after {} frames", self.frames);
        Ok(())
    }

    fn unload<A>(&mut self, app: &mut A, mut ctx: AppContext)
    where
        A: Application + ?Sized,
    {
        log::info!("App: Unloading");
        app.unload(&mut ctx);
        dispatch_diagnostics(app, &mut ctx);
        ctx.shutdown();
        self.transition(LifecycleState::Unloaded);
        log::info!("App: Unloaded");
    }

    fn transition(&mut self, next: LifecycleState) {
        log::debug!("lifecycle: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

/// Window, device and baseline state. Tears down whatever was created when a
/// step fails.
fn initialize_base(mut platform: Box<dyn Platform>, config: AppConfig) -> anyhow::Result<AppContext> {
    platform
        .initialize()
        .context("failed to start the windowing subsystem")?;

    let created = create_window_and_device(platform.as_mut(), &config);
    let (monitor, device) = match created {
        Ok(parts) => parts,
        Err(err) => {
            platform.destroy_window();
            platform.terminate();
            return Err(err);
        }
    };

    let (sink, diagnostics) = mpsc::channel();
    device.set_debug_sink(sink);

    device.set_render_state(config.render_state);
    device.set_clear_color(config.clear_color);
    device.set_clear_depth(config.clear_depth);

    let (w, h) = platform.framebuffer_size();
    device.set_viewport(Viewport::from_size(w as i32, h as i32));

    log::debug!(
        "window \"{}\" {}x{} on monitor {}x{}",
        config.title,
        w,
        h,
        monitor.width,
        monitor.height
    );

    Ok(AppContext::new(platform, device, config, monitor, diagnostics))
}

fn create_window_and_device(
    platform: &mut dyn Platform,
    config: &AppConfig,
) -> anyhow::Result<(crate::coords::MonitorBounds, Rc<dyn GraphicsDevice>)> {
    let monitor = platform
        .primary_monitor()
        .context("failed to query the primary monitor")?;
    let geometry = monitor.centered(config.window_scale);

    platform
        .create_window(geometry.width, geometry.height, &config.title)
        .context("failed to create the window")?;
    platform.set_window_position(geometry.x, geometry.y);

    let device = platform
        .create_graphics_device(&config.gpu)
        .context("failed to create the graphics device")?;

    Ok((monitor, device))
}

fn dispatch_event<A>(app: &mut A, ctx: &mut AppContext, event: PlatformEvent)
where
    A: Application + ?Sized,
{
    match event {
        PlatformEvent::FramebufferResized { width, height } => {
            if width <= 0 || height <= 0 {
                return;
            }
            ctx.set_framebuffer(width, height);
            app.on_framebuffer_resized(ctx, width, height);
            app.render(ctx);
        }
        PlatformEvent::Key(key) => match key.state {
            KeyState::Pressed => app.on_key_down(ctx, &key),
            KeyState::Released => app.on_key_up(ctx, &key),
        },
    }
}

fn dispatch_diagnostics<A>(app: &mut A, ctx: &mut AppContext)
where
    A: Application + ?Sized,
{
    for message in ctx.pending_diagnostics() {
        app.on_debug_message(ctx, &message);
    }
}

/// Runs the render a hook asked for (a fullscreen toggle) before anything else.
/// Checked once per hook, so a render that toggles does not recurse.
fn render_if_requested<A>(app: &mut A, ctx: &mut AppContext)
where
    A: Application + ?Sized,
{
    if ctx.take_render_request() {
        app.render(ctx);
    }
}
