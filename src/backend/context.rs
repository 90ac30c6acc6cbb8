// Window + OpenGL context
//
// Responsibilities:
// - Window creation through glutin-winit (picks a GL framebuffer config)
// - Context creation and make-current
// - Vsync, viewport, presentation
// - Function loading into a shared glow::Context

use anyhow::{Context, Result};
use glutin::config::{Config as FramebufferConfig, ConfigTemplateBuilder};
use glutin::context::{ContextAttributesBuilder, PossiblyCurrentContext};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use std::ffi::CStr;
use std::num::NonZeroU32;
use std::rc::Rc;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use super::debug;
use crate::config::Config;

/// The window, its GL surface and the current context.
///
/// IMPORTANT: Field order matters for Drop! The context goes before the
/// surface, the surface before the window.
pub struct GlHost {
    pub gl: Rc<glow::Context>,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
}

impl GlHost {
    /// Open the window and make its GL context current.
    pub fn new(event_loop: &ActiveEventLoop, config: &Config) -> Result<Self> {
        let window_attributes = WindowAttributes::default()
            .with_title(&config.window.title)
            .with_inner_size(winit::dpi::PhysicalSize::new(
                config.window.width,
                config.window.height,
            ));

        // ─────────────────────────────────────────────────────────────────────
        // STEP 1: Window + framebuffer config
        // ─────────────────────────────────────────────────────────────────────
        let template = ConfigTemplateBuilder::new().with_depth_size(24);
        let (window, gl_config) = DisplayBuilder::new()
            .with_window_attributes(Some(window_attributes))
            .build(event_loop, template, pick_config)
            .map_err(|e| anyhow::anyhow!("Failed to create window: {}", e))?;
        let window = window.context("Display builder returned no window")?;

        // The sample count is a hint; the chosen config is not filtered on it.
        log::info!(
            "Multisample hint: {} samples (framebuffer has {})",
            config.graphics.multisample_hint,
            gl_config.num_samples()
        );

        // ─────────────────────────────────────────────────────────────────────
        // STEP 2: Context + window surface
        // ─────────────────────────────────────────────────────────────────────
        let raw_window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();
        let gl_display = gl_config.display();
        let context_attributes = ContextAttributesBuilder::new().build(Some(raw_window_handle));

        let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes) }
            .context("Failed to create OpenGL context")?;

        let surface_attributes = window
            .build_surface_attributes(Default::default())
            .context("Failed to describe window surface")?;
        let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes) }
            .context("Failed to create window surface")?;

        let context = not_current
            .make_current(&surface)
            .context("Failed to make OpenGL context current")?;

        // ─────────────────────────────────────────────────────────────────────
        // STEP 3: Vsync
        // ─────────────────────────────────────────────────────────────────────
        let interval = if config.graphics.vsync {
            SwapInterval::Wait(NonZeroU32::MIN)
        } else {
            SwapInterval::DontWait
        };
        if let Err(e) = surface.set_swap_interval(&context, interval) {
            log::warn!("Failed to set swap interval {:?}: {}", interval, e);
        }

        // ─────────────────────────────────────────────────────────────────────
        // STEP 4: Load GL functions
        // ─────────────────────────────────────────────────────────────────────
        let mut gl = unsafe {
            glow::Context::from_loader_function_cstr(|name: &CStr| gl_display.get_proc_address(name))
        };
        if config.debug.gl_debug_output {
            debug::install_debug_callback(&mut gl);
        }

        let host = Self {
            gl: Rc::new(gl),
            context,
            surface,
            window,
        };
        host.log_driver_info();
        Ok(host)
    }

    fn log_driver_info(&self) {
        use glow::HasContext;
        let (renderer, version) = unsafe {
            (
                self.gl.get_parameter_string(glow::RENDERER),
                self.gl.get_parameter_string(glow::VERSION),
            )
        };
        log::info!("Renderer: {}", renderer);
        log::info!("OpenGL version supported {}", version);
    }

    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn request_redraw(&self) {
        self.window.request_redraw();
    }

    /// Resize the surface and viewport. Zero-sized (minimized) is ignored.
    pub fn resize(&self, width: u32, height: u32) {
        use glow::HasContext;
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return;
        };
        self.surface.resize(&self.context, w, h);
        unsafe {
            self.gl.viewport(0, 0, clamp_i32(width), clamp_i32(height));
        }
    }

    /// Present the back buffer. Blocks on vsync when enabled.
    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("Failed to swap buffers")
    }
}

/// Take the first hardware-accelerated config. Sample count is not part of
/// the selection.
fn pick_config(configs: Box<dyn Iterator<Item = FramebufferConfig> + '_>) -> FramebufferConfig {
    // `DisplayBuilder::build` forwards the `find_configs` error when nothing
    // matches the template, so the picker always sees at least one config.
    prefer_accelerated(configs, |config| config.hardware_accelerated())
        .expect("glutin-winit calls the config picker with a non-empty iterator")
}

/// First accelerated candidate, else the first candidate. `None` when empty.
fn prefer_accelerated<T>(
    candidates: impl Iterator<Item = T>,
    accelerated: impl Fn(&T) -> bool,
) -> Option<T> {
    candidates.reduce(|chosen, candidate| {
        if !accelerated(&chosen) && accelerated(&candidate) {
            candidate
        } else {
            chosen
        }
    })
}

fn clamp_i32(value: u32) -> i32 {
    value.min(i32::MAX as u32) as i32
}
