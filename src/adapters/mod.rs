//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter            | Implements          | Connects to                  |
//! |--------------------|---------------------|------------------------------|
//! | `camera`           | CameraPort          | still-capture program / sim  |
//! | `config_file`      | ConfigPort          | JSON file on disk            |
//! | `filestack`        | PublishPort         | Filestack store HTTP API     |
//! | `local_publisher`  | PublishPort         | local `file://` references   |
//! | `log_sink`         | EventSink           | `log` facade                 |
//! | `stream_transport` | Listener/Connection | stream socket                |

pub mod camera;
pub mod config_file;
#[cfg(feature = "filestack")]
pub mod filestack;
pub mod local_publisher;
pub mod log_sink;
pub mod stream_transport;

use crate::app::ports::PublishPort;
use crate::config::{PublisherConfig, PublisherKind};
use crate::error::PublishError;

/// Build the publisher selected by `config`.
pub fn open_publisher(config: &PublisherConfig) -> Result<Box<dyn PublishPort>, PublishError> {
    match config.kind {
        PublisherKind::Local => Ok(Box::new(local_publisher::LocalPublisher::new())),
        #[cfg(feature = "filestack")]
        PublisherKind::Filestack => Ok(Box::new(filestack::FilestackPublisher::new(config)?)),
        #[cfg(not(feature = "filestack"))]
        PublisherKind::Filestack => Err(PublishError::Unavailable("filestack")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn local_kind_builds_offline_publisher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"png").unwrap();

        let config = PublisherConfig {
            kind: PublisherKind::Local,
            ..PublisherConfig::default()
        };
        let mut publisher = open_publisher(&config).ok().unwrap();
        assert!(publisher.publish(&path, "image/png").unwrap().starts_with("file://"));
    }
}
