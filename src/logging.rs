// Logging setup
//
// env_logger drives the `log` facade. Records go to stderr and, when enabled,
// to a size-bounded rolling file: log.txt -> log.1.txt -> log.2.txt ...

use crate::config::DebugConfig;
use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Initialize logging. Console output is always on; the rolling file is
/// added when `log_to_file` is set and the file can be opened.
pub fn init_logging(config: &DebugConfig) {
    use env_logger::{Builder, Target};
    use log::LevelFilter;

    let mut builder = Builder::new();
    builder.filter_level(LevelFilter::Info);
    // RUST_LOG overrides the default level
    builder.parse_env(env_logger::Env::default());

    let mut file_error = None;
    if config.log_to_file {
        match RollingFile::open(&config.log_file, config.log_max_bytes, config.log_max_files) {
            Ok(file) => {
                builder.target(Target::Pipe(Box::new(Tee {
                    console: io::stderr(),
                    file,
                })));
            }
            Err(e) => file_error = Some(e),
        }
    }

    builder.init();

    if let Some(e) = file_error {
        log::warn!("File logging disabled: {:#}", e);
    }
}

/// Writes every record to the console and the log file.
struct Tee {
    console: io::Stderr,
    file: RollingFile,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        // A failing log file must not take the console down with it
        let _ = self.file.write_all(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        let _ = self.file.flush();
        Ok(())
    }
}

/// Append-only log file with size-based rotation.
///
/// Holds at most `max_files` files: the active one plus `max_files - 1`
/// rotated backups. A single write larger than `max_bytes` still lands in
/// one file; rotation happens before the write, never in the middle of it.
pub struct RollingFile {
    path: PathBuf,
    max_bytes: u64,
    max_files: usize,
    file: File,
    written: u64,
}

impl RollingFile {
    pub fn open<P: AsRef<Path>>(path: P, max_bytes: u64, max_files: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path))?;
        let written = file
            .metadata()
            .with_context(|| format!("Failed to stat log file: {:?}", path))?
            .len();

        Ok(Self {
            path,
            max_bytes: max_bytes.max(1),
            max_files: max_files.max(1),
            file,
            written,
        })
    }

    /// Path of the n-th backup: `log.txt` -> `log.<n>.txt`
    pub fn backup_path(&self, n: usize) -> PathBuf {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = match self.path.extension() {
            Some(ext) => format!("{}.{}.{}", stem, n, ext.to_string_lossy()),
            None => format!("{}.{}", stem, n),
        };
        self.path.with_file_name(name)
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files > 1 {
            let oldest = self.backup_path(self.max_files - 1);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for n in (1..self.max_files - 1).rev() {
                let from = self.backup_path(n);
                if from.exists() {
                    fs::rename(&from, self.backup_path(n + 1))?;
                }
            }
            fs::rename(&self.path, self.backup_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&self.path)?;
        self.written = 0;
        Ok(())
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.written > 0 && self.written + buf.len() as u64 > self.max_bytes {
            self.rotate()?;
        }
        let n = self.file.write(buf)?;
        self.written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}
