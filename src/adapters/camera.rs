//! Camera adapters.
//!
//! Implements [`CameraPort`] two ways:
//!
//! - [`CommandCamera`] spawns a still-capture program (default
//!   `libcamera-still`) that writes one encoded image to stdout and
//!   decodes it.
//! - [`SimulatedCamera`] synthesizes deterministic frames for bench
//!   setups and tests.

use std::env;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use image::{Rgb, RgbImage};
use log::{debug, info};

use crate::app::ports::CameraPort;
use crate::config::{CameraConfig, CameraKind};
use crate::error::CaptureError;

/// Build the camera selected by `config`. Fails with
/// [`CaptureError::Init`] when the capture program cannot be found or the
/// device does not answer the startup probe.
pub fn open(config: &CameraConfig) -> Result<Box<dyn CameraPort>, CaptureError> {
    match config.kind {
        CameraKind::Command => Ok(Box::new(CommandCamera::open(
            &config.program,
            config.args.clone(),
            config.probe_args.as_deref(),
        )?)),
        CameraKind::Simulated => Ok(Box::new(SimulatedCamera::new(
            config.sim_width,
            config.sim_height,
        ))),
    }
}

// ───────────────────────────────────────────────────────────────
// Still-capture program
// ───────────────────────────────────────────────────────────────

pub struct CommandCamera {
    program: PathBuf,
    args: Vec<String>,
}

impl CommandCamera {
    /// Locate the capture program and check that the device answers.
    ///
    /// With `probe` set, the program is run once with those arguments and
    /// must exit cleanly with some output. Without it, one frame is
    /// acquired and decoded. Either failure is [`CaptureError::Init`].
    pub fn open(
        program: &str,
        args: Vec<String>,
        probe: Option<&[String]>,
    ) -> Result<Self, CaptureError> {
        let resolved = resolve_program(program)
            .ok_or_else(|| CaptureError::Init(format!("{program}: not found")))?;
        let mut camera = Self {
            program: resolved,
            args,
        };

        match probe {
            Some(probe_args) => {
                let listing = camera.run(probe_args).map_err(init_failure)?;
                if listing.is_empty() {
                    return Err(CaptureError::Init(format!(
                        "{}: device probe printed nothing",
                        camera.program.display()
                    )));
                }
            }
            None => {
                camera.acquire_frame().map_err(init_failure)?;
            }
        }

        info!(
            "Camera: using {} {}",
            camera.program.display(),
            camera.args.join(" ")
        );
        Ok(camera)
    }

    /// Run the program with `args` and return its stdout.
    fn run(&self, args: &[String]) -> Result<Vec<u8>, CaptureError> {
        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| CaptureError::Hardware(format!("spawn failed: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CaptureError::Hardware(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                stderr.trim()
            )));
        }
        Ok(output.stdout)
    }
}

fn init_failure(err: CaptureError) -> CaptureError {
    CaptureError::Init(format!("device check failed: {err}"))
}

impl CameraPort for CommandCamera {
    fn acquire_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let stdout = self.run(&self.args)?;
        if stdout.is_empty() {
            return Err(CaptureError::EmptyFrame);
        }
        debug!("camera returned {} bytes", stdout.len());

        let decoded = image::load_from_memory(&stdout)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        Ok(decoded.to_rgb8())
    }
}

/// A program name with a `/` is taken as a path; anything else is looked
/// up on `PATH`.
fn resolve_program(program: &str) -> Option<PathBuf> {
    if program.contains('/') {
        let path = Path::new(program);
        return path.is_file().then(|| path.to_path_buf());
    }
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|candidate| candidate.is_file())
}

// ───────────────────────────────────────────────────────────────
// Simulation
// ───────────────────────────────────────────────────────────────

/// Produces frames whose brightness steps through five bands, one per
/// acquisition, so consecutive captures differ.
pub struct SimulatedCamera {
    width: u32,
    height: u32,
    frame_no: u32,
}

impl SimulatedCamera {
    pub fn new(width: u32, height: u32) -> Self {
        info!("Camera: simulated {width}x{height}");
        Self {
            width,
            height,
            frame_no: 0,
        }
    }
}

impl CameraPort for SimulatedCamera {
    fn acquire_frame(&mut self) -> Result<RgbImage, CaptureError> {
        let band = (self.frame_no % 5) as u8;
        self.frame_no = self.frame_no.wrapping_add(1);
        let base = 40 + band * 40;
        Ok(RgbImage::from_fn(self.width, self.height, |x, y| {
            let ripple = ((x / 8 + y / 8) % 4) as u8 * 3;
            Rgb([base.saturating_add(ripple), base, base.saturating_sub(ripple)])
        }))
    }
}
