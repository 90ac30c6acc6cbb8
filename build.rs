// Build script to stage GLSL shaders next to the executable
//
// The renderer locates its shaders relative to argv[0] at runtime, so the
// sources under shaders/ are copied into target/<profile>/.

use std::fs;
use std::path::{Path, PathBuf};

const SHADERS: &[&str] = &["shader_vs.glsl", "shader_ps.glsl"];

fn main() {
    println!("cargo:rerun-if-changed=shaders/");

    let Some(target_dir) = profile_dir() else {
        println!("cargo:warning=Could not locate target profile directory; shaders not staged");
        return;
    };

    for name in SHADERS {
        stage_shader(&Path::new("shaders").join(name), &target_dir.join(name));
    }
}

/// OUT_DIR is target/<profile>/build/<pkg>-<hash>/out
fn profile_dir() -> Option<PathBuf> {
    let out_dir = PathBuf::from(std::env::var_os("OUT_DIR")?);
    out_dir.ancestors().nth(3).map(Path::to_path_buf)
}

fn stage_shader(input: &Path, output: &Path) {
    match fs::copy(input, output) {
        Ok(_) => {}
        Err(e) => {
            println!(
                "cargo:warning=Failed to stage {} -> {}: {}",
                input.display(),
                output.display(),
                e
            );
        }
    }
}
