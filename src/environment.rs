// Working directory discovery
//
// Shader files live next to the executable. The directory is taken from the
// `WorkingDir` environment variable, or derived from argv[0] and exported
// under that name so later lookups see the same value.

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable holding the shader base directory
pub const WORKING_DIR_VAR: &str = "WorkingDir";

/// Resolve the shader base directory from `WorkingDir` or `argv0`.
pub fn resolve_working_dir(argv0: &str) -> Result<String> {
    resolve_working_dir_in(WORKING_DIR_VAR, argv0)
}

fn resolve_working_dir_in(var: &str, argv0: &str) -> Result<String> {
    if let Some(dir) = read_env(var) {
        log::debug!("{} already set: {}", var, dir);
        return Ok(dir);
    }

    let dir = executable_dir(argv0)
        .with_context(|| format!("{} is unset and argv[0] {:?} has no directory part", var, argv0))?;
    std::env::set_var(var, dir);
    log::info!("{} derived from argv[0]: {}", var, dir);

    Ok(dir.to_string())
}

/// Value of an environment variable, or `None` when unset or not unicode.
pub fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Directory part of an invocation path, trailing separator included.
///
/// Both `/` and `\` count as separators regardless of platform.
pub fn executable_dir(argv0: &str) -> Option<&str> {
    argv0
        .rfind(['/', '\\'])
        .map(|pos| &argv0[..=pos])
}

/// `<working_dir><file_name>`
pub fn shader_path(working_dir: &str, file_name: &str) -> PathBuf {
    let mut path = String::with_capacity(working_dir.len() + file_name.len());
    path.push_str(working_dir);
    path.push_str(file_name);
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn windows_style_argv0_keeps_trailing_separator() {
        assert_eq!(executable_dir("C:\\app\\bin\\demo.exe"), Some("C:\\app\\bin\\"));
    }

    #[test]
    fn unix_and_mixed_separators() {
        assert_eq!(executable_dir("/usr/local/bin/demo"), Some("/usr/local/bin/"));
        assert_eq!(executable_dir("./demo"), Some("./"));
        assert_eq!(executable_dir("C:/app\\bin/demo.exe"), Some("C:/app\\bin/"));
    }

    #[test]
    fn bare_name_has_no_directory() {
        assert_eq!(executable_dir("demo.exe"), None);
    }

    // The only test that touches the process environment. Tests run on
    // parallel threads, so every set/remove happens here in sequence.
    #[test]
    fn working_dir_resolution_against_environment() {
        let var = "GL_TRIANGLES_TEST_WORKING_DIR";

        // Unset and argv[0] has no directory: error, nothing exported
        std::env::remove_var(var);
        assert!(resolve_working_dir_in(var, "demo").is_err());
        assert_eq!(read_env(var), None);

        // Unset: derived from argv[0] and exported
        let dir = resolve_working_dir_in(var, "C:\\app\\bin\\demo.exe").unwrap();
        assert_eq!(dir, "C:\\app\\bin\\");
        assert_eq!(read_env(var).as_deref(), Some("C:\\app\\bin\\"));

        // Set: returned verbatim, argv[0] ignored
        std::env::set_var(var, "D:\\shaders");
        let dir = resolve_working_dir_in(var, "/usr/bin/demo").unwrap();
        assert_eq!(dir, "D:\\shaders");

        std::env::remove_var(var);
    }

    #[test]
    fn shader_path_concatenates() {
        assert_eq!(
            shader_path("/opt/app/", "shader_vs.glsl"),
            PathBuf::from("/opt/app/shader_vs.glsl")
        );
    }
}
