// =============================================================================
// OPENGL TRIANGLES - Minimal shader + vertex buffer sample
// =============================================================================
//
// Opens a window, builds a shader program from GLSL files next to the
// executable, uploads two triangles and draws them every frame. The window
// title shows the current frame rate.
//
// SETUP:
// 1. Resolve the shader directory (WorkingDir / argv[0]), load config.toml
// 2. Window + GL context (vsync, depth test, debug output)
// 3. Compile + link the vertex/fragment program
// 4. Upload triangle buffers, set rasterizer state
//
// FRAME FLOW:
// 1. Sample FPS, update title
// 2. Clear color + depth
// 3. Bind program, draw each triangle
// 4. Dispatch input (Escape closes)
// 5. Present (swap buffers)
//
// =============================================================================

mod backend;
mod config;
mod environment;
mod frame;
mod input;
mod logging;
mod scene;

use anyhow::{Context, Result};
use backend::{pipeline, shader, GlHost, ShaderProgram, TriangleMesh};
use config::Config;
use frame::{FpsCounter, LoopState};
use glow::HasContext;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    // The working directory comes first: config.toml may live next to the
    // executable as well as in the current directory
    let argv0 = std::env::args_os()
        .next()
        .map(|arg| arg.to_string_lossy().into_owned())
        .context("Process was started without argv[0]")?;
    let working_dir = environment::resolve_working_dir(&argv0)?;

    let config = Config::load(&working_dir);

    logging::init_logging(&config.debug);
    log::info!("Starting OpenGL triangles");
    log::info!("Working directory: {}", working_dir);
    log::info!("Window: {}x{}", config.window.width, config.window.height);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config, working_dir);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Everything the frame loop owns.
///
/// IMPORTANT: GL objects must be released while the context is still alive,
/// so meshes and program are declared (and dropped) before the host.
struct App {
    config: Config,
    working_dir: String,

    meshes: Vec<TriangleMesh>,
    program: Option<ShaderProgram>,
    host: Option<GlHost>,

    state: LoopState,
    fps: FpsCounter,
    /// First fatal error; returned from main for a failure exit code
    fatal: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config, working_dir: String) -> Self {
        let fps = FpsCounter::new(config.debug.fps_interval());
        Self {
            config,
            working_dir,
            meshes: Vec::new(),
            program: None,
            host: None,
            state: LoopState::Running,
            fps,
            fatal: None,
        }
    }

    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Create the window and every GL object the frame loop draws with.
    fn init_gl(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let host = GlHost::new(event_loop, &self.config)?;
        let graphics = &self.config.graphics;

        pipeline::apply_depth_state(&host.gl, graphics);

        let vs_path = environment::shader_path(&self.working_dir, &self.config.shaders.vertex);
        let ps_path = environment::shader_path(&self.working_dir, &self.config.shaders.fragment);
        let program = shader::build_pipeline(&host.gl, &vs_path, &ps_path)?;

        let meshes = backend::buffer::upload_triangles(&host.gl, &scene::default_triangles())?;

        pipeline::apply_rasterizer_state(&host.gl, graphics);
        let [r, g, b, a] = graphics.clear_color;
        unsafe { host.gl.clear_color(r, g, b, a) };

        log::info!("Uploaded {} triangles", meshes.len());

        self.meshes = meshes;
        self.program = Some(program);
        self.host = Some(host);
        self.fps = FpsCounter::new(self.config.debug.fps_interval());
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{:#}", error);
        if self.fatal.is_none() {
            self.fatal = Some(error);
        }
        self.state.request_close();
        event_loop.exit();
    }

    // =========================================================================
    // RENDER LOOP
    // =========================================================================

    /// Render and present a single frame.
    fn render_frame(&mut self) {
        let (Some(host), Some(program)) = (self.host.as_ref(), self.program.as_ref()) else {
            return;
        };

        if self.config.debug.show_fps {
            if let Some(fps) = self.fps.tick() {
                host.set_title(&frame::fps_title(&self.config.window.title, fps));
            }
        }

        unsafe {
            host.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
        }
        program.bind();
        for mesh in &self.meshes {
            mesh.draw();
        }

        // Presentation failures are reported and the loop carries on
        if let Err(e) = host.swap_buffers() {
            log::error!("{:#}", e);
        }
    }

    // =========================================================================
    // CLEANUP
    // =========================================================================

    fn teardown(&mut self) {
        if self.state == LoopState::Terminated {
            return;
        }
        log::info!("Releasing GL resources...");
        self.meshes.clear();
        self.program = None;
        self.host = None;
        self.state = LoopState::Terminated;
        log::info!("Cleanup complete");
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.host.is_some() || !self.state.is_running() {
            return;
        }

        if let Err(e) = self.init_gl(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, shutting down...");
                self.state.request_close();
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if input::closes_window(event.physical_key, event.state, event.repeat) {
                    log::info!("ESC pressed, exiting...");
                    self.state.request_close();
                }
            }

            WindowEvent::Resized(size) => {
                log::debug!("Window resized to {}x{}", size.width, size.height);
                if let Some(ref host) = self.host {
                    host.resize(size.width, size.height);
                }
            }

            WindowEvent::RedrawRequested => {
                if self.state != LoopState::Terminated {
                    self.render_frame();
                }
            }

            _ => {}
        }
    }

    /// Runs once per loop iteration after input has been dispatched.
    /// Either ends the loop or schedules the next frame.
    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        match self.state {
            LoopState::Running => {
                if let Some(ref host) = self.host {
                    host.request_redraw();
                }
            }
            LoopState::CloseRequested => event_loop.exit(),
            LoopState::Terminated => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}
