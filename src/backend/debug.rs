// GL debug output
//
// Routes driver messages into the log. Errors are reported, never fatal.

use glow::HasContext;

/// Install the debug message callback if the context supports it.
///
/// Needs `&mut` access, so call it before the context is shared.
pub fn install_debug_callback(gl: &mut glow::Context) -> bool {
    if !supports_debug_output(gl) {
        log::info!("GL debug output not available on this context");
        return false;
    }

    unsafe {
        gl.enable(glow::DEBUG_OUTPUT);
        gl.enable(glow::DEBUG_OUTPUT_SYNCHRONOUS);
        gl.debug_message_callback(|source, kind, id, severity, message| {
            log_debug_message(source, kind, id, severity, message);
        });
    }
    true
}

fn supports_debug_output(gl: &glow::Context) -> bool {
    let version = gl.version();
    let core = if version.is_embedded {
        (version.major, version.minor) >= (3, 2)
    } else {
        (version.major, version.minor) >= (4, 3)
    };
    core || gl.supported_extensions().contains("GL_KHR_debug")
}

fn log_debug_message(source: u32, kind: u32, id: u32, severity: u32, message: &str) {
    let level = message_level(kind, severity);
    log::log!(
        level,
        "[GL] {} {} #{}: {}",
        source_name(source),
        type_name(kind),
        id,
        message.trim_end()
    );
}

/// Errors always log as errors; otherwise the driver's severity decides.
fn message_level(kind: u32, severity: u32) -> log::Level {
    if kind == glow::DEBUG_TYPE_ERROR {
        return log::Level::Error;
    }
    match severity {
        glow::DEBUG_SEVERITY_HIGH => log::Level::Error,
        glow::DEBUG_SEVERITY_MEDIUM => log::Level::Warn,
        glow::DEBUG_SEVERITY_LOW => log::Level::Info,
        _ => log::Level::Debug,
    }
}

fn source_name(source: u32) -> &'static str {
    match source {
        glow::DEBUG_SOURCE_API => "api",
        glow::DEBUG_SOURCE_WINDOW_SYSTEM => "window-system",
        glow::DEBUG_SOURCE_SHADER_COMPILER => "shader-compiler",
        glow::DEBUG_SOURCE_THIRD_PARTY => "third-party",
        glow::DEBUG_SOURCE_APPLICATION => "application",
        _ => "other",
    }
}

fn type_name(kind: u32) -> &'static str {
    match kind {
        glow::DEBUG_TYPE_ERROR => "error",
        glow::DEBUG_TYPE_DEPRECATED_BEHAVIOR => "deprecated",
        glow::DEBUG_TYPE_UNDEFINED_BEHAVIOR => "undefined-behavior",
        glow::DEBUG_TYPE_PORTABILITY => "portability",
        glow::DEBUG_TYPE_PERFORMANCE => "performance",
        glow::DEBUG_TYPE_MARKER => "marker",
        _ => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_wins_over_severity() {
        assert_eq!(
            message_level(glow::DEBUG_TYPE_ERROR, glow::DEBUG_SEVERITY_NOTIFICATION),
            log::Level::Error
        );
    }

    #[test]
    fn severity_maps_to_level() {
        let other = glow::DEBUG_TYPE_OTHER;
        assert_eq!(message_level(other, glow::DEBUG_SEVERITY_HIGH), log::Level::Error);
        assert_eq!(message_level(other, glow::DEBUG_SEVERITY_MEDIUM), log::Level::Warn);
        assert_eq!(message_level(other, glow::DEBUG_SEVERITY_LOW), log::Level::Info);
        assert_eq!(
            message_level(other, glow::DEBUG_SEVERITY_NOTIFICATION),
            log::Level::Debug
        );
    }

    #[test]
    fn names() {
        assert_eq!(source_name(glow::DEBUG_SOURCE_SHADER_COMPILER), "shader-compiler");
        assert_eq!(type_name(glow::DEBUG_TYPE_PERFORMANCE), "performance");
        assert_eq!(type_name(0), "other");
    }
}
