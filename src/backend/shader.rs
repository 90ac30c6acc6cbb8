// Shader loading, compilation and linking
//
// GLSL sources are read from disk as text, compiled per stage and linked
// into a single program. Every object is owned by a wrapper that deletes it
// on drop.

use anyhow::{Context, Result};
use glow::HasContext;
use std::fmt;
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl ShaderKind {
    fn gl_enum(self) -> u32 {
        match self {
            ShaderKind::Vertex => glow::VERTEX_SHADER,
            ShaderKind::Fragment => glow::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderKind::Vertex => f.write_str("vertex"),
            ShaderKind::Fragment => f.write_str("fragment"),
        }
    }
}

#[derive(Debug)]
pub enum ShaderError {
    /// The driver refused to create an object
    Create(String),
    Compile { kind: ShaderKind, log: String },
    Link { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::Create(msg) => write!(f, "failed to create GL object: {}", msg),
            ShaderError::Compile { kind, log } if log.is_empty() => {
                write!(f, "{} shader failed to compile", kind)
            }
            ShaderError::Compile { kind, log } => {
                write!(f, "{} shader failed to compile:\n{}", kind, log)
            }
            ShaderError::Link { log } if log.is_empty() => f.write_str("program failed to link"),
            ShaderError::Link { log } => write!(f, "program failed to link:\n{}", log),
        }
    }
}

impl std::error::Error for ShaderError {}

/// The GL calls the shader pipeline needs.
///
/// `glow::Context` is the real implementation; keeping the surface this
/// small lets the compile/link sequencing run without a context.
pub trait ShaderDevice {
    type Shader: Copy;
    type Program: Copy;

    fn new_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String>;
    /// Set source, compile, return the compile status.
    fn compile(&self, shader: Self::Shader, source: &str) -> bool;
    fn shader_log(&self, shader: Self::Shader) -> String;
    fn release_shader(&self, shader: Self::Shader);

    fn new_program(&self) -> Result<Self::Program, String>;
    /// Attach both stages, link, detach, return the link status.
    fn link(&self, program: Self::Program, vertex: Self::Shader, fragment: Self::Shader) -> bool;
    fn program_log(&self, program: Self::Program) -> String;
    fn bind_program(&self, program: Self::Program);
    fn release_program(&self, program: Self::Program);
}

impl ShaderDevice for glow::Context {
    type Shader = glow::NativeShader;
    type Program = glow::NativeProgram;

    fn new_shader(&self, kind: ShaderKind) -> Result<Self::Shader, String> {
        unsafe { self.create_shader(kind.gl_enum()) }
    }

    fn compile(&self, shader: Self::Shader, source: &str) -> bool {
        unsafe {
            self.shader_source(shader, source);
            self.compile_shader(shader);
            self.get_shader_compile_status(shader)
        }
    }

    fn shader_log(&self, shader: Self::Shader) -> String {
        unsafe { self.get_shader_info_log(shader) }
    }

    fn release_shader(&self, shader: Self::Shader) {
        unsafe { self.delete_shader(shader) };
    }

    fn new_program(&self) -> Result<Self::Program, String> {
        unsafe { self.create_program() }
    }

    fn link(&self, program: Self::Program, vertex: Self::Shader, fragment: Self::Shader) -> bool {
        unsafe {
            self.attach_shader(program, vertex);
            self.attach_shader(program, fragment);
            self.link_program(program);
            self.detach_shader(program, vertex);
            self.detach_shader(program, fragment);
            self.get_program_link_status(program)
        }
    }

    fn program_log(&self, program: Self::Program) -> String {
        unsafe { self.get_program_info_log(program) }
    }

    fn bind_program(&self, program: Self::Program) {
        unsafe { self.use_program(Some(program)) };
    }

    fn release_program(&self, program: Self::Program) {
        unsafe { self.delete_program(program) };
    }
}

/// A compiled shader stage. Deleted on drop; a program that already linked
/// it keeps working.
pub struct ShaderStage<D: ShaderDevice = glow::Context> {
    gl: Rc<D>,
    raw: D::Shader,
    kind: ShaderKind,
}

impl<D: ShaderDevice> ShaderStage<D> {
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }
}

impl<D: ShaderDevice> Drop for ShaderStage<D> {
    fn drop(&mut self) {
        self.gl.release_shader(self.raw);
    }
}

/// The linked vertex + fragment program
pub struct ShaderProgram<D: ShaderDevice = glow::Context> {
    gl: Rc<D>,
    raw: D::Program,
}

impl<D: ShaderDevice> ShaderProgram<D> {
    pub fn bind(&self) {
        self.gl.bind_program(self.raw);
    }
}

impl<D: ShaderDevice> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.gl.release_program(self.raw);
    }
}

/// Compile one stage from source text.
///
/// A failed compile logs the driver's info log and returns
/// `ShaderError::Compile`; the half-built object is released.
pub fn compile_shader<D: ShaderDevice>(
    gl: &Rc<D>,
    kind: ShaderKind,
    source: &str,
) -> Result<ShaderStage<D>, ShaderError> {
    let raw = gl.new_shader(kind).map_err(ShaderError::Create)?;
    let stage = ShaderStage {
        gl: Rc::clone(gl),
        raw,
        kind,
    };

    if gl.compile(raw, source) {
        log::debug!("Compiled {} shader", kind);
        return Ok(stage);
    }

    let log = trim_info_log(gl.shader_log(raw));
    if !log.is_empty() {
        log::error!("{}", log);
    }
    Err(ShaderError::Compile { kind, log })
}

/// Link a vertex and a fragment stage into a program.
pub fn build_program<D: ShaderDevice>(
    gl: &Rc<D>,
    vertex: &ShaderStage<D>,
    fragment: &ShaderStage<D>,
) -> Result<ShaderProgram<D>, ShaderError> {
    debug_assert_eq!(vertex.kind(), ShaderKind::Vertex);
    debug_assert_eq!(fragment.kind(), ShaderKind::Fragment);

    let raw = gl.new_program().map_err(ShaderError::Create)?;
    let program = ShaderProgram {
        gl: Rc::clone(gl),
        raw,
    };

    if gl.link(raw, vertex.raw, fragment.raw) {
        return Ok(program);
    }

    let log = trim_info_log(gl.program_log(raw));
    if !log.is_empty() {
        log::error!("{}", log);
    }
    Err(ShaderError::Link { log })
}

/// Load both stages from disk, compile them and link the program.
///
/// The vertex stage is compiled first; if either stage fails nothing is
/// linked.
pub fn build_pipeline<D: ShaderDevice>(
    gl: &Rc<D>,
    vs_path: &Path,
    ps_path: &Path,
) -> Result<ShaderProgram<D>> {
    let vs_source = load_source(vs_path)?;
    let ps_source = load_source(ps_path)?;

    let vertex = compile_shader(gl, ShaderKind::Vertex, &vs_source)
        .with_context(|| format!("Failed to build {:?}", vs_path))?;
    let fragment = compile_shader(gl, ShaderKind::Fragment, &ps_source)
        .with_context(|| format!("Failed to build {:?}", ps_path))?;

    let program = build_program(gl, &vertex, &fragment)?;
    log::info!("Shader program linked ({:?}, {:?})", vs_path, ps_path);
    Ok(program)
}

fn load_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read shader: {:?}", path))
}

/// Drivers pad info logs with NULs and trailing newlines
fn trim_info_log(log: String) -> String {
    log.trim_end_matches(['\0', '\n', '\r', ' ']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    #[test]
    fn info_log_padding_is_stripped() {
        assert_eq!(
            trim_info_log("0:3(1): error: syntax error\n\0".to_string()),
            "0:3(1): error: syntax error"
        );
        assert_eq!(trim_info_log("\0".to_string()), "");
    }

    #[test]
    fn compile_error_names_the_stage() {
        let err = ShaderError::Compile {
            kind: ShaderKind::Fragment,
            log: "0:1: 'foo' : undeclared identifier".to_string(),
        };
        let text = err.to_string();
        assert!(text.starts_with("fragment shader failed to compile"));
        assert!(text.contains("undeclared identifier"));

        let silent = ShaderError::Compile {
            kind: ShaderKind::Vertex,
            log: String::new(),
        };
        assert_eq!(silent.to_string(), "vertex shader failed to compile");
    }

    #[test]
    fn link_error_display() {
        let err = ShaderError::Link { log: String::new() };
        assert_eq!(err.to_string(), "program failed to link");
    }

    #[test]
    fn shader_error_is_matchable_through_anyhow() {
        let err: anyhow::Error = ShaderError::Compile {
            kind: ShaderKind::Vertex,
            log: "bad".to_string(),
        }
        .into();
        let err = err.context("Failed to build \"shader_vs.glsl\"");
        assert!(matches!(
            err.downcast_ref::<ShaderError>(),
            Some(ShaderError::Compile { kind: ShaderKind::Vertex, .. })
        ));
    }

    #[test]
    fn missing_source_file_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_vs.glsl");
        let err = load_source(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("shader_vs.glsl"));
    }

    #[test]
    fn source_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shader_ps.glsl");
        let text = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";
        std::fs::write(&path, text).unwrap();
        assert_eq!(load_source(&path).unwrap(), text);
    }

    /// Records every call; sources containing `#error` fail to compile.
    #[derive(Default)]
    struct RecordingDevice {
        calls: RefCell<Vec<String>>,
        next_id: Cell<u32>,
        link_fails: bool,
    }

    impl RecordingDevice {
        fn record(&self, call: String) {
            self.calls.borrow_mut().push(call);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }

        fn called(&self, prefix: &str) -> usize {
            self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
        }

        fn next(&self) -> u32 {
            let id = self.next_id.get() + 1;
            self.next_id.set(id);
            id
        }
    }

    impl ShaderDevice for RecordingDevice {
        type Shader = u32;
        type Program = u32;

        fn new_shader(&self, kind: ShaderKind) -> Result<u32, String> {
            let id = self.next();
            self.record(format!("new_shader {} {}", kind, id));
            Ok(id)
        }

        fn compile(&self, shader: u32, source: &str) -> bool {
            self.record(format!("compile {}", shader));
            !source.contains("#error")
        }

        fn shader_log(&self, shader: u32) -> String {
            format!("0:1({}): error: syntax error\n\0", shader)
        }

        fn release_shader(&self, shader: u32) {
            self.record(format!("release_shader {}", shader));
        }

        fn new_program(&self) -> Result<u32, String> {
            let id = self.next();
            self.record(format!("new_program {}", id));
            Ok(id)
        }

        fn link(&self, program: u32, vertex: u32, fragment: u32) -> bool {
            self.record(format!("link {} {} {}", program, vertex, fragment));
            !self.link_fails
        }

        fn program_log(&self, _program: u32) -> String {
            "error: unresolved varying".to_string()
        }

        fn bind_program(&self, program: u32) {
            self.record(format!("bind_program {}", program));
        }

        fn release_program(&self, program: u32) {
            self.record(format!("release_program {}", program));
        }
    }

    const GOOD_VS: &str = "#version 330 core\nvoid main() { gl_Position = vec4(0.0); }\n";
    const GOOD_PS: &str = "#version 330 core\nout vec4 c;\nvoid main() { c = vec4(1.0); }\n";
    const BAD: &str = "#version 330 core\n#error broken\n";

    fn write_pair(vs: &str, ps: &str) -> (tempfile::TempDir, std::path::PathBuf, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let vs_path = dir.path().join("shader_vs.glsl");
        let ps_path = dir.path().join("shader_ps.glsl");
        std::fs::write(&vs_path, vs).unwrap();
        std::fs::write(&ps_path, ps).unwrap();
        (dir, vs_path, ps_path)
    }

    #[test]
    fn well_formed_pair_links_a_program() {
        let (_dir, vs, ps) = write_pair(GOOD_VS, GOOD_PS);
        let device = Rc::new(RecordingDevice::default());

        let program = build_pipeline(&device, &vs, &ps).unwrap();
        program.bind();

        assert_eq!(
            device.calls(),
            vec![
                "new_shader vertex 1",
                "compile 1",
                "new_shader fragment 2",
                "compile 2",
                "new_program 3",
                "link 3 1 2",
                // stages are released once linked, the program stays
                "release_shader 2",
                "release_shader 1",
                "bind_program 3",
            ]
        );

        drop(program);
        assert_eq!(device.called("release_program 3"), 1);
    }

    #[test]
    fn vertex_compile_failure_stops_before_link() {
        let (_dir, vs, ps) = write_pair(BAD, GOOD_PS);
        let device = Rc::new(RecordingDevice::default());

        let err = build_pipeline(&device, &vs, &ps).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ShaderError>(),
            Some(ShaderError::Compile { kind: ShaderKind::Vertex, log }) if log.contains("syntax error")
        ));

        // The fragment stage is never even created
        assert_eq!(device.called("new_shader fragment"), 0);
        assert_eq!(device.called("new_program"), 0);
        assert_eq!(device.called("link"), 0);
        assert_eq!(device.called("release_shader 1"), 1);
    }

    #[test]
    fn fragment_compile_failure_stops_before_link() {
        let (_dir, vs, ps) = write_pair(GOOD_VS, BAD);
        let device = Rc::new(RecordingDevice::default());

        let err = build_pipeline(&device, &vs, &ps).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<ShaderError>(),
            Some(ShaderError::Compile { kind: ShaderKind::Fragment, .. })
        ));

        assert_eq!(device.called("new_program"), 0);
        assert_eq!(device.called("link"), 0);
        // both stages released
        assert_eq!(device.called("release_shader"), 2);
    }

    #[test]
    fn link_failure_is_reported_and_program_released() {
        let (_dir, vs, ps) = write_pair(GOOD_VS, GOOD_PS);
        let device = Rc::new(RecordingDevice {
            link_fails: true,
            ..Default::default()
        });

        let err = build_pipeline(&device, &vs, &ps).err().unwrap();
        match err.downcast_ref::<ShaderError>() {
            Some(ShaderError::Link { log }) => assert_eq!(log, "error: unresolved varying"),
            other => panic!("expected link error, got {:?}", other),
        }
        assert_eq!(device.called("release_program 3"), 1);
        assert_eq!(device.called("release_shader"), 2);
    }

    #[test]
    fn compile_shader_returns_stage_of_requested_kind() {
        let device = Rc::new(RecordingDevice::default());
        let stage = compile_shader(&device, ShaderKind::Fragment, GOOD_PS).unwrap();
        assert_eq!(stage.kind(), ShaderKind::Fragment);

        let err = compile_shader(&device, ShaderKind::Vertex, BAD).err().unwrap();
        assert!(matches!(err, ShaderError::Compile { kind: ShaderKind::Vertex, .. }));
    }
}
