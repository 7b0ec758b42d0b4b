//! Error taxonomy for the colorimetry server.
//!
//! Each subsystem owns a small error enum with a hand-written `Display`.
//! The dispatcher folds all of them into [`DispatchError`] and asks it for
//! a [`Disposition`]: drop the connection, answer the peer with an error
//! payload, or stop the process.

use core::fmt;
use std::io;
use std::path::PathBuf;

use crate::app::commands::Response;

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Socket-level failure on the listener or the active connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// The listening socket could not be bound or advertised.
    Bind(io::ErrorKind),
    /// `accept` failed.
    Accept(io::ErrorKind),
    /// Reading a command from the peer failed.
    Read(io::ErrorKind),
    /// Writing a response to the peer failed.
    Write(io::ErrorKind),
    /// The listener was already closed.
    Closed,
}

impl TransportError {
    /// Whether the listener can keep accepting after this error.
    ///
    /// Every `accept` failure is survivable, including resource exhaustion
    /// such as `EMFILE`; only a closed listener ends the loop.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Accept(_) | Self::Read(_) | Self::Write(_) => true,
            Self::Bind(_) | Self::Closed => false,
        }
    }
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bind(kind) => write!(f, "bind failed: {kind}"),
            Self::Accept(kind) => write!(f, "accept failed: {kind}"),
            Self::Read(kind) => write!(f, "read failed: {kind}"),
            Self::Write(kind) => write!(f, "write failed: {kind}"),
            Self::Closed => write!(f, "listener closed"),
        }
    }
}

impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Capture errors
// ---------------------------------------------------------------------------

/// The camera could not deliver a frame, or the normalized artifact could
/// not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    /// Camera handle could not be opened at startup.
    Init(String),
    /// Hardware fault while acquiring a frame.
    Hardware(String),
    /// The camera produced bytes that are not a decodable image.
    Decode(String),
    /// The frame has zero width or height.
    EmptyFrame,
    /// The normalized artifact could not be persisted.
    Storage { path: PathBuf, reason: String },
}

impl fmt::Display for CaptureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init(msg) => write!(f, "camera init: {msg}"),
            Self::Hardware(msg) => write!(f, "frame acquisition: {msg}"),
            Self::Decode(msg) => write!(f, "frame decode: {msg}"),
            Self::EmptyFrame => write!(f, "camera returned an empty frame"),
            Self::Storage { path, reason } => {
                write!(f, "cannot store artifact {}: {reason}", path.display())
            }
        }
    }
}

impl std::error::Error for CaptureError {}

// ---------------------------------------------------------------------------
// Missing artifact
// ---------------------------------------------------------------------------

/// Classification or retrieval was requested before any capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoArtifactError;

impl fmt::Display for NoArtifactError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no artifact has been captured")
    }
}

impl std::error::Error for NoArtifactError {}

// ---------------------------------------------------------------------------
// Publish errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishError {
    /// The local artifact could not be read.
    Io(String),
    /// The upload request did not complete.
    Network(String),
    /// The service answered with a non-success status.
    Status(u16),
    /// The service answered but the body carried no usable locator.
    MalformedResponse(String),
    /// The publisher kind is not available in this build.
    Unavailable(&'static str),
}

impl fmt::Display for PublishError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "artifact read: {msg}"),
            Self::Network(msg) => write!(f, "upload: {msg}"),
            Self::Status(code) => write!(f, "upload rejected with HTTP {code}"),
            Self::MalformedResponse(msg) => write!(f, "malformed upload response: {msg}"),
            Self::Unavailable(kind) => write!(f, "publisher '{kind}' not compiled in"),
        }
    }
}

impl std::error::Error for PublishError {}

// ---------------------------------------------------------------------------
// Classification errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifyError {
    /// The reference set has no patterns.
    EmptyReferenceSet,
    /// The two images compared by the similarity metric differ in size.
    DimensionMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },
    /// The image is smaller than the similarity window.
    ImageTooSmall { width: u32, height: u32 },
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyReferenceSet => write!(f, "reference pattern set is empty"),
            Self::DimensionMismatch { expected, actual } => write!(
                f,
                "dimension mismatch: expected {}x{}, got {}x{}",
                expected.0, expected.1, actual.0, actual.1
            ),
            Self::ImageTooSmall { width, height } => {
                write!(f, "image {width}x{height} is smaller than the SSIM window")
            }
        }
    }
}

impl std::error::Error for ClassifyError {}

// ---------------------------------------------------------------------------
// Reference set errors (startup-fatal)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// A reference image could not be read or decoded.
    Load { path: PathBuf, reason: String },
    /// A level outside 1..=5 was supplied.
    InvalidLevel(u8),
    /// The same level appears twice.
    DuplicateLevel(u8),
    /// No patterns were supplied.
    Empty,
}

impl fmt::Display for ReferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Load { path, reason } => {
                write!(f, "cannot load reference {}: {reason}", path.display())
            }
            Self::InvalidLevel(level) => write!(f, "reference level {level} outside 1..=5"),
            Self::DuplicateLevel(level) => write!(f, "reference level {level} defined twice"),
            Self::Empty => write!(f, "no reference patterns supplied"),
        }
    }
}

impl std::error::Error for ReferenceError {}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The config file could not be read.
    Io(String),
    /// The config file is not valid JSON for [`ServerConfig`](crate::config::ServerConfig).
    Corrupted(String),
    /// A config field failed range validation.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "config I/O error: {msg}"),
            Self::Corrupted(msg) => write!(f, "config corrupted: {msg}"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// What the dispatcher does with a failed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Drop the active connection and go back to listening.
    AbandonConnection,
    /// Send this payload to the peer and keep serving the connection.
    Respond(Response),
    /// Close everything and return from the loop with the error.
    AbortProcess,
}

/// Every failure the dispatch loop can observe.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The listening socket failed.
    Listener(TransportError),
    /// The active connection failed.
    Transport(TransportError),
    /// `click` could not capture a frame.
    Capture(CaptureError),
    /// `click` captured but could not publish.
    Publish(PublishError),
    /// `analyze` was sent before any `click`.
    NothingToAnalyze(NoArtifactError),
    /// `sendthyresult` was sent with no reference for the current artifact.
    NoResult(NoArtifactError),
    /// The similarity computation failed on a present artifact.
    Classify(ClassifyError),
}

impl DispatchError {
    pub fn disposition(&self) -> Disposition {
        match self {
            Self::Listener(e) if e.is_transient() => Disposition::AbandonConnection,
            Self::Listener(_) => Disposition::AbortProcess,
            Self::Transport(_) => Disposition::AbandonConnection,
            Self::Capture(_) => Disposition::Respond(Response::capture_failed()),
            Self::Publish(_) => Disposition::Respond(Response::publish_failed()),
            Self::NothingToAnalyze(_) => Disposition::Respond(Response::nothing_to_analyze()),
            Self::NoResult(_) => Disposition::Respond(Response::no_result()),
            Self::Classify(_) => Disposition::Respond(Response::analysis_failed()),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listener(e) => write!(f, "listener: {e}"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::Capture(e) => write!(f, "capture: {e}"),
            Self::Publish(e) => write!(f, "publish: {e}"),
            Self::NothingToAnalyze(e) => write!(f, "analyze: {e}"),
            Self::NoResult(_) => write!(f, "sendthyresult: no published result"),
            Self::Classify(e) => write!(f, "classify: {e}"),
        }
    }
}

impl std::error::Error for DispatchError {}

impl From<CaptureError> for DispatchError {
    fn from(e: CaptureError) -> Self {
        Self::Capture(e)
    }
}

impl From<PublishError> for DispatchError {
    fn from(e: PublishError) -> Self {
        Self::Publish(e)
    }
}

impl From<ClassifyError> for DispatchError {
    fn from(e: ClassifyError) -> Self {
        Self::Classify(e)
    }
}
