//! Demucs subprocess driver.
//!
//! Runs `demucs -n <model> --two-stems=vocals -o <root> [--mp3] <input>` and
//! checks that both stems landed where the core layout expects them.

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};
use vocalswap_core::separation::{DEFAULT_MODEL, DEFAULT_OUTPUT_ROOT};
use vocalswap_core::{AudioFormat, StemPaths, StemSeparator, VocalSwapResult};

use crate::error::{SeparationError, SeparationResult};

/// Default timeout for a separation run (30 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 30 * 60;

/// Environment variable pointing at the Demucs executable.
pub const DEMUCS_PATH_ENV: &str = "DEMUCS_PATH";

/// Lines of stderr kept in failure messages.
const STDERR_TAIL_LINES: usize = 20;

/// Configuration for the Demucs separator.
#[derive(Debug, Clone)]
pub struct SeparatorConfig {
    /// Path to the Demucs executable.
    pub executable: Option<PathBuf>,
    /// Pretrained model name.
    pub model: String,
    /// Root directory for separated stems.
    pub output_root: PathBuf,
    /// Stem encoding.
    pub stem_format: AudioFormat,
    /// Timeout for one run.
    pub timeout: Duration,
    /// Whether to capture Demucs' stderr.
    pub capture_output: bool,
}

impl Default for SeparatorConfig {
    fn default() -> Self {
        Self {
            executable: None,
            model: DEFAULT_MODEL.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_ROOT),
            stem_format: AudioFormat::Wav,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            capture_output: true,
        }
    }
}

impl SeparatorConfig {
    /// Sets the Demucs executable path.
    pub fn executable(mut self, path: impl Into<PathBuf>) -> Self {
        self.executable = Some(path.into());
        self
    }

    /// Sets the model name.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the output root.
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }

    /// Sets the stem format.
    pub fn stem_format(mut self, format: AudioFormat) -> Self {
        self.stem_format = format;
        self
    }

    /// Sets the timeout duration.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// Enables or disables stderr capture.
    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }
}

/// Separates stems by running Demucs as a subprocess.
#[derive(Debug, Clone, Default)]
pub struct DemucsSeparator {
    config: SeparatorConfig,
}

impl DemucsSeparator {
    /// Creates a separator with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a separator with the given configuration.
    pub fn with_config(config: SeparatorConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &SeparatorConfig {
        &self.config
    }

    /// Finds the Demucs executable.
    ///
    /// Order: configured path, `DEMUCS_PATH`, then `demucs` on `PATH`.
    pub fn find_executable(&self) -> SeparationResult<PathBuf> {
        if let Some(ref path) = self.config.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            warn!(path = %path.display(), "configured Demucs path does not exist");
        }

        if let Ok(path) = std::env::var(DEMUCS_PATH_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Ok(path);
            }
            warn!(path = %path.display(), "{} does not exist", DEMUCS_PATH_ENV);
        }

        let names = if cfg!(windows) {
            vec!["demucs.exe", "demucs"]
        } else {
            vec!["demucs"]
        };
        for name in names {
            if let Ok(path) = which::which(name) {
                return Ok(path);
            }
        }

        Err(SeparationError::ExecutableNotFound)
    }

    /// Arguments passed to Demucs for `input`.
    pub fn command_args(&self, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-n".into(),
            self.config.model.clone().into(),
            "--two-stems=vocals".into(),
            "-o".into(),
            self.config.output_root.clone().into_os_string(),
        ];
        if self.config.stem_format == AudioFormat::Mp3 {
            args.push("--mp3".into());
        }
        args.push(input.as_os_str().to_os_string());
        args
    }

    /// Runs Demucs on `input` and verifies both stems exist.
    pub fn run(&self, input: &Path) -> SeparationResult<StemPaths> {
        let executable = self.find_executable()?;
        let args = self.command_args(input);
        info!(
            executable = %executable.display(),
            model = %self.config.model,
            input = %input.display(),
            "running Demucs"
        );

        let mut cmd = Command::new(&executable);
        cmd.args(&args).stdin(Stdio::null());
        if self.config.capture_output {
            cmd.stdout(Stdio::null()).stderr(Stdio::piped());
        }

        let child = cmd.spawn().map_err(SeparationError::SpawnFailed)?;
        let started = Instant::now();
        let (status, stderr) = wait_with_timeout(child, self.config.timeout)?;
        debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Demucs exited");

        if !status.success() {
            let exit_code = status.code().unwrap_or(-1);
            return Err(SeparationError::process_failed(exit_code, stderr_tail(&stderr)));
        }

        let paths = self.stem_paths(input);
        for path in [&paths.vocals, &paths.instrumental] {
            if !path.is_file() {
                return Err(SeparationError::OutputMissing { path: path.clone() });
            }
        }
        Ok(paths)
    }
}

impl StemSeparator for DemucsSeparator {
    fn stem_paths(&self, input: &Path) -> StemPaths {
        StemPaths::for_input(
            &self.config.output_root,
            &self.config.model,
            input,
            self.config.stem_format,
        )
    }

    fn separate(&self, input: &Path) -> VocalSwapResult<StemPaths> {
        Ok(self.run(input)?)
    }
}

/// Polls the child until it exits or `timeout` elapses.
///
/// Stderr is drained on a separate thread; Demucs writes progress bars there
/// and a full pipe would stall it.
fn wait_with_timeout(mut child: Child, timeout: Duration) -> SeparationResult<(ExitStatus, String)> {
    let reader = child.stderr.take().map(|mut err| {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = err.read_to_end(&mut buf);
            String::from_utf8_lossy(&buf).into_owned()
        })
    });

    let start = Instant::now();
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if start.elapsed() > timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SeparationError::Timeout {
                        timeout_secs: timeout.as_secs(),
                    });
                }
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => return Err(SeparationError::SpawnFailed(e)),
        }
    };

    let stderr = reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default();
    Ok((status, stderr))
}

/// Last lines of `stderr`, with progress-bar carriage returns collapsed.
fn stderr_tail(stderr: &str) -> String {
    let lines: Vec<&str> = stderr
        .lines()
        .filter_map(|line| line.rsplit('\r').next())
        .filter(|line| !line.trim().is_empty())
        .collect();
    let skip = lines.len().saturating_sub(STDERR_TAIL_LINES);
    lines[skip..].join("\n")
}
