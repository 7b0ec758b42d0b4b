//! Inbound commands and outbound responses.
//!
//! The wire protocol is one text token per read. Matching is exact and
//! case-sensitive: `"click"`, `"sendthyresult"` and `"analyze"` are the
//! only verbs; everything else gets the fixed fallback reply.

use core::fmt;

/// Commands a connected peer can send to the
/// [`ServerContext`](super::service::ServerContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Capture a frame, normalize it, publish it, remember the reference.
    Click,
    /// Return the reference published for the current artifact.
    SendResult,
    /// Classify the current artifact against the reference patterns.
    Analyze,
    /// Anything else, kept verbatim for logging.
    Unsupported(String),
}

impl Command {
    pub const CLICK: &'static str = "click";
    pub const SEND_RESULT: &'static str = "sendthyresult";
    pub const ANALYZE: &'static str = "analyze";

    pub fn parse(text: &str) -> Self {
        match text {
            Self::CLICK => Self::Click,
            Self::SEND_RESULT => Self::SendResult,
            Self::ANALYZE => Self::Analyze,
            other => Self::Unsupported(other.to_owned()),
        }
    }

    /// Decode a raw read. Invalid UTF-8 is replaced rather than rejected,
    /// so it lands in [`Command::Unsupported`].
    pub fn decode(bytes: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(bytes))
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Click => Self::CLICK,
            Self::SendResult => Self::SEND_RESULT,
            Self::Analyze => Self::ANALYZE,
            Self::Unsupported(text) => text,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single text payload written back to the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response(String);

impl Response {
    pub const NOT_SUPPORTED: &'static str = "msg:Not supported";
    pub const CAPTURE_FAILED: &'static str = "msg:Capture failed";
    pub const PUBLISH_FAILED: &'static str = "msg:Publish failed";
    pub const NO_RESULT: &'static str = "msg:No result available";
    pub const NOTHING_TO_ANALYZE: &'static str = "msg:Nothing to analyze";
    pub const ANALYSIS_FAILED: &'static str = "msg:Analysis failed";

    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn not_supported() -> Self {
        Self::new(Self::NOT_SUPPORTED)
    }

    pub fn capture_failed() -> Self {
        Self::new(Self::CAPTURE_FAILED)
    }

    pub fn publish_failed() -> Self {
        Self::new(Self::PUBLISH_FAILED)
    }

    pub fn no_result() -> Self {
        Self::new(Self::NO_RESULT)
    }

    pub fn nothing_to_analyze() -> Self {
        Self::new(Self::NOTHING_TO_ANALYZE)
    }

    pub fn analysis_failed() -> Self {
        Self::new(Self::ANALYSIS_FAILED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
