//! The fixed-timestep engine.
//!
//! Simulation and rendering are decoupled: wall time since the previous frame
//! is added to a debt, and for every whole tick in that debt the engine drains
//! window events and advances the scene by exactly one tick. Rendering then
//! happens once per frame regardless of how many ticks ran.
//!
//! # User-facing types
//!
//! - [`Engine`] owns the settings and the attached scene and opens the window
//!   in [`Engine::run`]
//! - [`Platform`] is what the loop runs against; [`Context`] is the desktop
//!   implementation
//! - [`drive`] is the loop itself, usable with any platform and scene
//!
//! # Lifecycle Flow
//!
//! 1. `Scene::init` once
//! 2. accumulate elapsed wall time
//! 3. for every whole tick: poll events (close marks the loop as stopping,
//!    resize sets the viewport, all of them reach `Scene::handle_event`), then
//!    `Scene::update`
//! 4. `Scene::clear`, `Scene::render`, present
//! 5. repeat from 2 while running, then `Scene::destroy` once
//!
//! A close request never cuts a frame short: the ticks already owed still
//! run and the frame is still presented before the loop ends.

use instant::Duration;
use winit::event::WindowEvent;

use crate::{
    context::Context,
    data_structures::uniforms::SurfaceState,
    gpu::{GlowGpu, Gpu},
    logging::init_logging,
    scene::Scene,
    settings::Settings,
    timestep::{FixedTimestep, LoopState},
};

/// A window with a GL context, as seen by the loop.
pub trait Platform {
    type Gpu: Gpu;

    fn gpu(&self) -> &Self::Gpu;

    /// Wall time since the previous call.
    fn elapsed(&mut self) -> Duration;

    /// Appends every window event received since the previous call.
    fn poll_events(&mut self, events: &mut Vec<WindowEvent>);

    /// Resizes the drawable and the GL viewport to `width`×`height` pixels.
    fn set_viewport(&mut self, width: u32, height: u32);

    fn surface_state(&self) -> SurfaceState;

    /// Shows the frame that was just rendered.
    fn present(&mut self) -> anyhow::Result<()>;
}

/// Loop parameters taken from [`Settings`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopConfig {
    /// Simulated time per update.
    pub tick: Duration,
    /// Stop after this many presented frames.
    pub frame_limit: Option<u64>,
}

impl LoopConfig {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            tick: FixedTimestep::from_rate(settings.tick_rate).step(),
            frame_limit: settings.frame_limit,
        }
    }
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            tick: FixedTimestep::default().step(),
            frame_limit: None,
        }
    }
}

/// What a finished loop did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoopReport {
    pub frames: u64,
    pub updates: u64,
}

/// Runs `scene` on `platform` until a close request or the frame limit.
///
/// `init` errors are returned after the scene has been destroyed. Failing to
/// present a frame is logged and the loop goes on.
pub fn drive<P, S>(
    platform: &mut P,
    scene: &mut S,
    config: LoopConfig,
) -> anyhow::Result<LoopReport>
where
    P: Platform,
    S: Scene<P::Gpu> + ?Sized,
{
    if let Err(e) = scene.init(platform.gpu()) {
        scene.destroy(platform.gpu());
        return Err(e.context(format!("failed to initialise {}", scene.name())));
    }

    let mut timestep = FixedTimestep::new(config.tick);
    let mut state = LoopState::Running;
    let mut report = LoopReport::default();
    let mut events = Vec::new();
    // The first measurement would include init time.
    platform.elapsed();

    while state.is_running() {
        timestep.accumulate(platform.elapsed());
        while timestep.consume_tick() {
            platform.poll_events(&mut events);
            for event in events.drain(..) {
                match &event {
                    WindowEvent::CloseRequested => state = LoopState::Stopped,
                    WindowEvent::Resized(size) => platform.set_viewport(size.width, size.height),
                    _ => {}
                }
                scene.handle_event(&event);
            }
            scene.update(timestep.step());
            report.updates += 1;
        }

        scene.clear(platform.gpu());
        let surface = platform.surface_state();
        scene.render(platform.gpu(), &surface);
        if let Err(e) = platform.present() {
            log::error!("Unable to present frame {}: {:#}", report.frames, e);
        }
        report.frames += 1;

        if config.frame_limit.is_some_and(|limit| report.frames >= limit) {
            log::debug!("Frame limit of {} reached", report.frames);
            state = LoopState::Stopped;
        }
    }

    scene.destroy(platform.gpu());
    log::info!(
        "{} stopped after {} frames and {} updates",
        scene.name(),
        report.frames,
        report.updates
    );
    Ok(report)
}

/// Owns the configuration and the scene; opens the window on [`Engine::run`].
///
/// Nothing touches the windowing system before `run`, so an engine can be
/// built and configured anywhere.
#[derive(Debug)]
pub struct Engine {
    settings: Settings,
    scene: Option<Box<dyn Scene<GlowGpu>>>,
}

impl Engine {
    pub fn new(width: u32, height: u32) -> Self {
        Self::with_settings(Settings::default().with_size(width, height))
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings,
            scene: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Takes ownership of `scene`, replacing any previous one. The window
    /// title becomes the scene's name.
    pub fn attach_scene<S: Scene<GlowGpu> + 'static>(&mut self, mut scene: S) {
        self.settings.title = scene.name().to_string();
        scene.attach(self.settings.resolution());
        self.scene = Some(Box::new(scene));
    }

    pub fn has_scene(&self) -> bool {
        self.scene.is_some()
    }

    /// Opens the window and runs the attached scene until the window closes.
    ///
    /// Without a scene this returns immediately. If no window or GL context
    /// can be created the error is logged and the run is skipped. Errors from
    /// the scene's `init` are returned.
    pub fn run(self) -> anyhow::Result<()> {
        init_logging(&self.settings.logging);

        let Some(mut scene) = self.scene else {
            log::warn!("No scene attached, nothing to run");
            return Ok(());
        };

        let mut context = match Context::new(&self.settings) {
            Ok(context) => context,
            Err(e) => {
                log::error!("Graphics initialisation failed: {:#}", e);
                return Ok(());
            }
        };

        drive(
            &mut context,
            scene.as_mut(),
            LoopConfig::from_settings(&self.settings),
        )?;
        Ok(())
    }
}
