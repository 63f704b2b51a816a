use std::{ffi::CString, num::NonZeroU32};

use anyhow::{Context as _, anyhow, bail};
use cgmath::Vector2;
use glutin::{
    config::ConfigTemplateBuilder,
    context::{ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version},
    display::{Display, DisplayApiPreference},
    prelude::*,
    surface::{Surface, SwapInterval, WindowSurface},
};
use glutin_winit::{GlWindow, finalize_window};
use instant::Duration;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle, RawWindowHandle};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    platform::pump_events::{EventLoopExtPumpEvents, PumpStatus},
    window::{Window, WindowId},
};

use crate::{
    data_structures::uniforms::SurfaceState,
    engine::Platform,
    gpu::{GlowGpu, Gpu},
    settings::Settings,
    timestep::Clock,
};

/// How often the event loop is pumped while waiting for the window.
const CREATE_ATTEMPTS: u32 = 100;
const CREATE_POLL: Duration = Duration::from_millis(10);

/// The desktop platform: one window with a current GL context.
///
/// Created once per [`crate::engine::Engine::run`] and dropped when it returns.
/// Events are collected by pumping the winit loop without blocking, so the
/// engine keeps control of the frame.
#[derive(Debug)]
pub struct Context {
    // Field order is drop order: GL objects go before the window and the loop.
    target: GlTarget,
    collector: EventCollector,
    event_loop: EventLoop<()>,
    clock: Clock,
}

impl Context {
    /// Opens the window described by `settings` and makes a GL context
    /// current on it.
    pub fn new(settings: &Settings) -> anyhow::Result<Self> {
        let mut event_loop = new_event_loop()?;
        let mut collector = EventCollector::new(settings.clone());

        let mut target = None;
        for _ in 0..CREATE_ATTEMPTS {
            if let PumpStatus::Exit(code) =
                event_loop.pump_app_events(Some(CREATE_POLL), &mut collector)
            {
                bail!("event loop exited with code {code} before the window was created");
            }
            if let Some(created) = collector.created.take() {
                target = Some(created?);
                break;
            }
        }
        let target = target.context("the event loop never resumed, no window was created")?;

        log::info!(
            "Opened \"{}\" ({}x{})",
            settings.title,
            target.resolution.x,
            target.resolution.y
        );
        Ok(Self {
            target,
            collector,
            event_loop,
            clock: Clock::new(),
        })
    }

    pub fn window(&self) -> &Window {
        &self.target.window
    }
}

impl Platform for Context {
    type Gpu = GlowGpu;

    fn gpu(&self) -> &GlowGpu {
        &self.target.gpu
    }

    fn elapsed(&mut self) -> Duration {
        self.clock.restart()
    }

    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        let status = self
            .event_loop
            .pump_app_events(Some(Duration::ZERO), &mut self.collector);
        if let PumpStatus::Exit(_) = status {
            self.collector.exited = true;
        }
        events.append(&mut self.collector.events);
        if self.collector.exited {
            events.push(WindowEvent::CloseRequested);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        let target = &mut self.target;
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            target.surface.resize(&target.context, w, h);
        }
        target.gpu.viewport(0, 0, width as i32, height as i32);
        target.resolution = Vector2::new(width as f32, height as f32);
    }

    fn surface_state(&self) -> SurfaceState {
        SurfaceState::new(self.target.resolution, self.collector.cursor)
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.target
            .surface
            .swap_buffers(&self.target.context)
            .context("failed to swap buffers")
    }
}

#[cfg(not(feature = "integration-tests"))]
fn new_event_loop() -> anyhow::Result<EventLoop<()>> {
    EventLoop::new().context("failed to create an event loop")
}

#[cfg(feature = "integration-tests")]
fn new_event_loop() -> anyhow::Result<EventLoop<()>> {
    let mut builder = EventLoop::builder();

    // Test harnesses run off the main thread.
    #[cfg(target_os = "linux")]
    {
        use winit::platform::wayland::EventLoopBuilderExtWayland;
        builder.with_any_thread(true);
    }
    #[cfg(target_os = "windows")]
    {
        use winit::platform::windows::EventLoopBuilderExtWindows;
        builder.with_any_thread(true);
    }

    builder.build().context("failed to create an event loop")
}

/// Window, surface and context. The GL loader is bound to the context.
struct GlTarget {
    gpu: GlowGpu,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    resolution: Vector2<f32>,
}

impl std::fmt::Debug for GlTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlTarget")
            .field("window", &self.window.id())
            .field("resolution", &self.resolution)
            .finish()
    }
}

impl GlTarget {
    fn new(event_loop: &ActiveEventLoop, settings: &Settings) -> anyhow::Result<Self> {
        let attributes = Window::default_attributes()
            .with_title(settings.title.clone())
            .with_inner_size(PhysicalSize::new(settings.width, settings.height));
        let template = ConfigTemplateBuilder::new()
            .with_depth_size(settings.gl.depth_bits)
            .with_stencil_size(settings.gl.stencil_bits);
        let max_samples = settings.gl.samples;

        // WGL needs a window before the display exists.
        #[cfg(target_os = "windows")]
        let early_window = Some(
            event_loop
                .create_window(attributes.clone())
                .context("failed to create the window")?,
        );
        #[cfg(not(target_os = "windows"))]
        let early_window: Option<Window> = None;
        let native_window = early_window
            .as_ref()
            .and_then(|window| window.window_handle().ok())
            .map(|handle| handle.as_raw());

        let display = open_display(event_loop, native_window)?;
        let template = match native_window {
            Some(handle) => template.compatible_with_native_window(handle),
            None => template,
        };
        let configs = unsafe { display.find_configs(template.build()) }
            .map_err(|e| anyhow!("failed to query GL configs: {e}"))?;
        let config = best_config(configs, |config| config.num_samples(), max_samples)
            .context("the display offered no GL config")?;
        let window = match early_window {
            Some(window) => window,
            None => finalize_window(event_loop, attributes, &config)
                .context("failed to create the window")?,
        };
        log::debug!(
            "GL config: {} samples, depth {}, stencil {}",
            config.num_samples(),
            config.depth_size(),
            config.stencil_size()
        );

        let (major, minor) = settings.gl.version;
        let raw_window_handle = window.window_handle().ok().map(|handle| handle.as_raw());
        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(major, minor))))
            .with_profile(GlProfile::Core)
            .build(raw_window_handle);
        let not_current = unsafe { display.create_context(&config, &context_attributes) }
            .with_context(|| format!("failed to create a GL {major}.{minor} core context"))?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("failed to describe the window surface")?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attributes) }
            .context("failed to create the window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make the GL context current")?;

        if settings.gl.vsync {
            if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN))
            {
                log::warn!("Could not enable vsync: {}", e);
            }
        }

        let gl = unsafe {
            glow::Context::from_loader_function(|symbol| match CString::new(symbol) {
                Ok(symbol) => display.get_proc_address(&symbol),
                Err(_) => std::ptr::null(),
            })
        };
        let gpu = GlowGpu::new(gl);

        let [red, green, blue, alpha] = settings.clear_colour;
        gpu.clear_color(red, green, blue, alpha);
        let size = window.inner_size();
        gpu.viewport(0, 0, size.width as i32, size.height as i32);

        Ok(Self {
            gpu,
            surface,
            context,
            window,
            resolution: Vector2::new(size.width as f32, size.height as f32),
        })
    }
}

/// Opens the platform's GL display, falling back to EGL where the native API
/// is unavailable.
fn open_display(
    event_loop: &ActiveEventLoop,
    _native_window: Option<RawWindowHandle>,
) -> anyhow::Result<Display> {
    #[cfg(target_os = "windows")]
    let preference = DisplayApiPreference::WglThenEgl(_native_window);
    #[cfg(target_os = "macos")]
    let preference = DisplayApiPreference::Cgl;
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let preference = DisplayApiPreference::GlxThenEgl(Box::new(
        winit::platform::x11::register_xlib_error_hook,
    ));

    let handle = event_loop
        .display_handle()
        .context("the event loop has no display handle")?
        .as_raw();
    unsafe { Display::new(handle, preference) }
        .map_err(|e| anyhow!("failed to open the GL display: {e}"))
}

/// Picks the config with the best sample count, or `None` when there is none.
fn best_config<T>(
    configs: impl Iterator<Item = T>,
    samples: impl Fn(&T) -> u8,
    max_samples: u8,
) -> Option<T> {
    configs.reduce(|best, next| {
        if sample_score(samples(&next), max_samples) > sample_score(samples(&best), max_samples) {
            next
        } else {
            best
        }
    })
}

/// Ranks a config by its sample count: the most samples up to `max_samples`
/// win, anything above the limit ranks below every config within it.
fn sample_score(samples: u8, max_samples: u8) -> i16 {
    if samples <= max_samples {
        samples as i16
    } else {
        -(samples as i16)
    }
}

/// Receives winit callbacks while the loop is pumped.
#[derive(Debug)]
struct EventCollector {
    settings: Settings,
    resumed: bool,
    created: Option<anyhow::Result<GlTarget>>,
    events: Vec<WindowEvent>,
    cursor: Vector2<f32>,
    exited: bool,
}

impl EventCollector {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            resumed: false,
            created: None,
            events: Vec::new(),
            cursor: Vector2::new(0.0, 0.0),
            exited: false,
        }
    }
}

impl ApplicationHandler for EventCollector {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.resumed {
            return;
        }
        self.resumed = true;
        self.created = Some(GlTarget::new(event_loop, &self.settings));
    }

    fn window_event(&mut self, _event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let WindowEvent::CursorMoved { position, .. } = &event {
            self.cursor = Vector2::new(position.x as f32, position.y as f32);
        }
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pick(samples: &[u8], max: u8) -> Option<u8> {
        best_config(samples.iter().copied(), |&s| s, max)
    }

    #[test]
    fn should_prefer_the_most_samples_within_the_limit() {
        assert_eq!(pick(&[0, 2, 4, 8], 4), Some(4));
        assert_eq!(pick(&[0, 2, 16], 4), Some(2));
        assert_eq!(pick(&[0], 4), Some(0));
    }

    #[test]
    fn should_fall_back_to_the_smallest_oversampled_config() {
        assert_eq!(pick(&[8, 16], 4), Some(8));
    }

    #[test]
    fn should_pick_nothing_from_an_empty_config_list() {
        assert_eq!(pick(&[], 4), None);
    }

    #[test]
    fn should_keep_the_first_of_equally_sampled_configs() {
        let configs = [("a", 4), ("b", 4), ("c", 2)];
        let best = best_config(configs.into_iter(), |&(_, samples)| samples, 4);
        assert_eq!(best, Some(("a", 4)));
    }
}
