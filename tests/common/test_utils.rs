#![allow(dead_code)]

use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    path::PathBuf,
    rc::Rc,
};

use instant::Duration;
use shader_ngin::{
    Platform, PhysicalSize, Scene, Vector2, WindowEvent,
    data_structures::uniforms::SurfaceState,
    gpu::Gpu,
};

/// The repository's `data/` directory.
pub fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// One call received by [`RecordingGpu`]. Handles are plain numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    CreateShader { kind: u32, shader: u32 },
    ShaderSource(u32),
    CompileShader(u32),
    DeleteShader(u32),
    CreateProgram(u32),
    AttachShader { program: u32, shader: u32 },
    LinkProgram(u32),
    UseProgram(Option<u32>),
    DeleteProgram(u32),
    UniformI32 { name: String, value: i32 },
    UniformF32 { name: String, value: f32 },
    Uniform2F32 { name: String, x: f32, y: f32 },
    CreateVertexArray(u32),
    BindVertexArray(Option<u32>),
    DeleteVertexArray(u32),
    CreateBuffer(u32),
    BindBuffer { target: u32, buffer: Option<u32> },
    BufferData { target: u32, len: usize },
    DeleteBuffer(u32),
    VertexAttribPointer { index: u32, size: i32, stride: i32 },
    EnableVertexAttribArray(u32),
    DrawElements { mode: u32, count: i32 },
    CreateTexture(u32),
    ActiveTexture(u32),
    BindTexture(Option<u32>),
    TexParameter { parameter: u32, value: i32 },
    PixelStore { parameter: u32, value: i32 },
    TexImage2d { width: i32, height: i32, len: Option<usize> },
    GenerateMipmap,
    DeleteTexture(u32),
    ClearColor([f32; 4]),
    Clear(u32),
    Viewport { width: i32, height: i32 },
}

/// A backend that hands out increasing handles and records every call.
///
/// Shader compilation succeeds unless the stage's kind was marked with
/// [`RecordingGpu::failing_stage`]; linking succeeds unless
/// [`RecordingGpu::failing_link`] was set.
#[derive(Debug, Default)]
pub struct RecordingGpu {
    next_handle: Cell<u32>,
    calls: RefCell<Vec<GpuCall>>,
    shader_kinds: RefCell<HashMap<u32, u32>>,
    failing_stages: Vec<u32>,
    failing_link: bool,
}

impl RecordingGpu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_stage(mut self, kind: u32) -> Self {
        self.failing_stages.push(kind);
        self
    }

    pub fn failing_link(mut self) -> Self {
        self.failing_link = true;
        self
    }

    pub fn calls(&self) -> Vec<GpuCall> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, predicate: impl Fn(&GpuCall) -> bool) -> usize {
        self.calls.borrow().iter().filter(|call| predicate(call)).count()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    fn record(&self, call: GpuCall) {
        self.calls.borrow_mut().push(call);
    }

    fn handle(&self) -> u32 {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        handle
    }
}

impl Gpu for RecordingGpu {
    type Shader = u32;
    type Program = u32;
    type Buffer = u32;
    type VertexArray = u32;
    type Texture = u32;
    type UniformLocation = String;

    fn create_shader(&self, kind: u32) -> Result<u32, String> {
        let shader = self.handle();
        self.shader_kinds.borrow_mut().insert(shader, kind);
        self.record(GpuCall::CreateShader { kind, shader });
        Ok(shader)
    }

    fn shader_source(&self, shader: u32, _source: &str) {
        self.record(GpuCall::ShaderSource(shader));
    }

    fn compile_shader(&self, shader: u32) {
        self.record(GpuCall::CompileShader(shader));
    }

    fn get_shader_compile_status(&self, shader: u32) -> bool {
        let kind = self.shader_kinds.borrow()[&shader];
        !self.failing_stages.contains(&kind)
    }

    fn get_shader_info_log(&self, shader: u32) -> String {
        format!("0:1({shader}): error C0000: syntax error")
    }

    fn delete_shader(&self, shader: u32) {
        self.record(GpuCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<u32, String> {
        let program = self.handle();
        self.record(GpuCall::CreateProgram(program));
        Ok(program)
    }

    fn attach_shader(&self, program: u32, shader: u32) {
        self.record(GpuCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: u32) {
        self.record(GpuCall::LinkProgram(program));
    }

    fn get_program_link_status(&self, _program: u32) -> bool {
        !self.failing_link && self.failing_stages.is_empty()
    }

    fn get_program_info_log(&self, _program: u32) -> String {
        "error: linking with uncompiled/unspecialized shader".to_string()
    }

    fn use_program(&self, program: Option<u32>) {
        self.record(GpuCall::UseProgram(program));
    }

    fn delete_program(&self, program: u32) {
        self.record(GpuCall::DeleteProgram(program));
    }

    fn get_uniform_location(&self, _program: u32, name: &str) -> Option<String> {
        Some(name.to_string())
    }

    fn uniform_1_i32(&self, location: Option<&String>, value: i32) {
        if let Some(name) = location {
            self.record(GpuCall::UniformI32 {
                name: name.clone(),
                value,
            });
        }
    }

    fn uniform_1_f32(&self, location: Option<&String>, value: f32) {
        if let Some(name) = location {
            self.record(GpuCall::UniformF32 {
                name: name.clone(),
                value,
            });
        }
    }

    fn uniform_2_f32(&self, location: Option<&String>, x: f32, y: f32) {
        if let Some(name) = location {
            self.record(GpuCall::Uniform2F32 {
                name: name.clone(),
                x,
                y,
            });
        }
    }

    fn create_vertex_array(&self) -> Result<u32, String> {
        let vao = self.handle();
        self.record(GpuCall::CreateVertexArray(vao));
        Ok(vao)
    }

    fn bind_vertex_array(&self, vao: Option<u32>) {
        self.record(GpuCall::BindVertexArray(vao));
    }

    fn delete_vertex_array(&self, vao: u32) {
        self.record(GpuCall::DeleteVertexArray(vao));
    }

    fn create_buffer(&self) -> Result<u32, String> {
        let buffer = self.handle();
        self.record(GpuCall::CreateBuffer(buffer));
        Ok(buffer)
    }

    fn bind_buffer(&self, target: u32, buffer: Option<u32>) {
        self.record(GpuCall::BindBuffer { target, buffer });
    }

    fn buffer_data_u8_slice(&self, target: u32, data: &[u8], _usage: u32) {
        self.record(GpuCall::BufferData {
            target,
            len: data.len(),
        });
    }

    fn delete_buffer(&self, buffer: u32) {
        self.record(GpuCall::DeleteBuffer(buffer));
    }

    fn vertex_attrib_pointer_f32(
        &self,
        index: u32,
        size: i32,
        _data_type: u32,
        _normalized: bool,
        stride: i32,
        _offset: i32,
    ) {
        self.record(GpuCall::VertexAttribPointer {
            index,
            size,
            stride,
        });
    }

    fn enable_vertex_attrib_array(&self, index: u32) {
        self.record(GpuCall::EnableVertexAttribArray(index));
    }

    fn draw_elements(&self, mode: u32, count: i32, _element_type: u32, _offset: i32) {
        self.record(GpuCall::DrawElements { mode, count });
    }

    fn create_texture(&self) -> Result<u32, String> {
        let texture = self.handle();
        self.record(GpuCall::CreateTexture(texture));
        Ok(texture)
    }

    fn active_texture(&self, unit: u32) {
        self.record(GpuCall::ActiveTexture(unit));
    }

    fn bind_texture(&self, _target: u32, texture: Option<u32>) {
        self.record(GpuCall::BindTexture(texture));
    }

    fn tex_parameter_i32(&self, _target: u32, parameter: u32, value: i32) {
        self.record(GpuCall::TexParameter { parameter, value });
    }

    fn pixel_store_i32(&self, parameter: u32, value: i32) {
        self.record(GpuCall::PixelStore { parameter, value });
    }

    fn tex_image_2d(
        &self,
        _target: u32,
        _level: i32,
        _internal_format: i32,
        width: i32,
        height: i32,
        _border: i32,
        _format: u32,
        _ty: u32,
        pixels: Option<&[u8]>,
    ) {
        self.record(GpuCall::TexImage2d {
            width,
            height,
            len: pixels.map(<[u8]>::len),
        });
    }

    fn generate_mipmap(&self, _target: u32) {
        self.record(GpuCall::GenerateMipmap);
    }

    fn delete_texture(&self, texture: u32) {
        self.record(GpuCall::DeleteTexture(texture));
    }

    fn clear_color(&self, red: f32, green: f32, blue: f32, alpha: f32) {
        self.record(GpuCall::ClearColor([red, green, blue, alpha]));
    }

    fn clear(&self, mask: u32) {
        self.record(GpuCall::Clear(mask));
    }

    fn viewport(&self, _x: i32, _y: i32, width: i32, height: i32) {
        self.record(GpuCall::Viewport { width, height });
    }
}

/// Ordered log shared by a [`ScriptedPlatform`] and a [`TracingScene`].
pub type Journal = Rc<RefCell<Vec<String>>>;

pub fn journal() -> Journal {
    Rc::new(RefCell::new(Vec::new()))
}

/// A platform that replays scripted frame times and event batches.
///
/// Like a clock, the first `elapsed` call only starts timing and returns zero.
/// Each later call returns the next scripted duration. Once the durations run
/// out it returns `fallback` and the following `poll_events` delivers
/// `CloseRequested`.
#[derive(Debug)]
pub struct ScriptedPlatform {
    pub gpu: RecordingGpu,
    durations: VecDeque<Duration>,
    events: VecDeque<Vec<WindowEvent>>,
    fallback: Duration,
    started: bool,
    exhausted: bool,
    resolution: Vector2<f32>,
    cursor: Vector2<f32>,
    journal: Journal,
}

impl ScriptedPlatform {
    pub fn new(journal: Journal) -> Self {
        Self {
            gpu: RecordingGpu::new(),
            durations: VecDeque::new(),
            events: VecDeque::new(),
            fallback: Duration::from_millis(10),
            started: false,
            exhausted: false,
            resolution: Vector2::new(800.0, 600.0),
            cursor: Vector2::new(0.0, 0.0),
            journal,
        }
    }

    pub fn with_gpu(mut self, gpu: RecordingGpu) -> Self {
        self.gpu = gpu;
        self
    }

    pub fn with_durations(mut self, durations: impl IntoIterator<Item = Duration>) -> Self {
        self.durations.extend(durations);
        self
    }

    /// Queues one batch per `poll_events` call, in order.
    pub fn with_event_batch(mut self, batch: Vec<WindowEvent>) -> Self {
        self.events.push_back(batch);
        self
    }

    pub fn with_cursor(mut self, x: f32, y: f32) -> Self {
        self.cursor = Vector2::new(x, y);
        self
    }

    pub fn resolution(&self) -> Vector2<f32> {
        self.resolution
    }
}

impl Platform for ScriptedPlatform {
    type Gpu = RecordingGpu;

    fn gpu(&self) -> &RecordingGpu {
        &self.gpu
    }

    fn elapsed(&mut self) -> Duration {
        if !self.started {
            self.started = true;
            return Duration::ZERO;
        }
        match self.durations.pop_front() {
            Some(duration) => duration,
            None => {
                self.exhausted = true;
                self.fallback
            }
        }
    }

    fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        if let Some(batch) = self.events.pop_front() {
            events.extend(batch);
        }
        if self.exhausted {
            events.push(WindowEvent::CloseRequested);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.journal
            .borrow_mut()
            .push(format!("viewport {width}x{height}"));
        self.gpu.viewport(0, 0, width as i32, height as i32);
        self.resolution = Vector2::new(width as f32, height as f32);
    }

    fn surface_state(&self) -> SurfaceState {
        SurfaceState::new(self.resolution, self.cursor)
    }

    fn present(&mut self) -> anyhow::Result<()> {
        self.journal.borrow_mut().push("present".to_string());
        Ok(())
    }
}

/// A scene that writes every hook call to a [`Journal`].
#[derive(Debug)]
pub struct TracingScene {
    journal: Journal,
    fail_init: bool,
}

impl TracingScene {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            fail_init: false,
        }
    }

    pub fn failing_init(mut self) -> Self {
        self.fail_init = true;
        self
    }

    fn trace(&self, entry: impl Into<String>) {
        self.journal.borrow_mut().push(entry.into());
    }
}

impl<G: Gpu> Scene<G> for TracingScene {
    fn name(&self) -> &str {
        "Tracing Scene"
    }

    fn attach(&mut self, resolution: Vector2<f32>) {
        self.trace(format!("attach {}x{}", resolution.x, resolution.y));
    }

    fn init(&mut self, _gpu: &G) -> anyhow::Result<()> {
        self.trace("init");
        if self.fail_init {
            anyhow::bail!("scripted init failure");
        }
        Ok(())
    }

    fn clear(&mut self, _gpu: &G) {
        self.trace("clear");
    }

    fn render(&mut self, _gpu: &G, surface: &SurfaceState) {
        self.trace(format!(
            "render {}x{}",
            surface.resolution.x, surface.resolution.y
        ));
    }

    fn destroy(&mut self, _gpu: &G) {
        self.trace("destroy");
    }

    fn handle_event(&mut self, event: &WindowEvent) {
        let entry = match event {
            WindowEvent::CloseRequested => "event close".to_string(),
            WindowEvent::Resized(size) => format!("event resize {}x{}", size.width, size.height),
            other => format!("event {other:?}"),
        };
        self.trace(entry);
    }

    fn update(&mut self, _dt: Duration) {
        self.trace("update");
    }
}

pub fn resized(width: u32, height: u32) -> WindowEvent {
    WindowEvent::Resized(PhysicalSize::new(width, height))
}

/// Journal entries equal to `entry`.
pub fn occurrences(journal: &Journal, entry: &str) -> usize {
    journal.borrow().iter().filter(|e| *e == entry).count()
}
