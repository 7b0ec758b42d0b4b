//! Colorimetry server — main entry point.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  CommandCamera     FilestackPublisher   LogEventSink           │
//! │  (CameraPort)      (PublishPort)        (EventSink)            │
//! │  JsonFileConfig    StreamListener                              │
//! │  (ConfigPort)      (Listener)                                  │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │            ServerContext (pure logic)                  │    │
//! │  │  CapturePipeline · ClassificationEngine · Session      │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  Dispatcher (single-client loop) · ShutdownFlag (ctrlc)        │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Startup aborts if the reference set, the camera or the listener
//! cannot be brought up.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};

use colorimetry::adapters::camera;
use colorimetry::adapters::config_file::JsonFileConfig;
use colorimetry::adapters::log_sink::LogEventSink;
use colorimetry::adapters::open_publisher;
use colorimetry::adapters::stream_transport::{ServiceRecord, StreamListener};
use colorimetry::app::ports::ConfigPort;
use colorimetry::app::service::ServerContext;
use colorimetry::capture::{CapturePipeline, CaptureSettings};
use colorimetry::classify::ClassificationEngine;
use colorimetry::classify::reference::ReferencePatternSet;
use colorimetry::dispatcher::Dispatcher;
use colorimetry::logging;
use colorimetry::shutdown::ShutdownFlag;

#[derive(Parser, Debug)]
#[command(author, version, about = "Colorimetry command server", long_about = None)]
struct Args {
    /// JSON configuration file. Missing file means built-in defaults.
    #[arg(short, long, default_value = "/etc/raspibtsrv.json")]
    config: PathBuf,

    /// Log file, in addition to stdout.
    #[arg(short, long, default_value = "/var/log/raspibtsrv.log")]
    log: PathBuf,

    /// One of off, error, warn, info, debug, trace.
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // ── 1. Logging ────────────────────────────────────────────
    logging::init(&args.log, logging::parse_level(&args.log_level))?;
    info!("Colorimetry server v{}", env!("CARGO_PKG_VERSION"));

    // ── 2. Configuration ──────────────────────────────────────
    let mut config = JsonFileConfig::new(&args.config)
        .load()
        .context("loading configuration")?;
    config.apply_env();
    config.validate().context("invalid configuration")?;

    // ── 3. Reference patterns (fatal) ─────────────────────────
    let references = ReferencePatternSet::load(&config.reference_paths, config.canonical_size)
        .context("loading reference pattern set")?;
    info!("{} reference patterns loaded", references.len());

    // ── 4. Camera (fatal) ─────────────────────────────────────
    let camera = camera::open(&config.camera).context("initializing camera")?;

    // ── 5. Publish collaborator ───────────────────────────────
    let publisher = open_publisher(&config.publisher).context("initializing publisher")?;

    // ── 6. Listener (fatal) ───────────────────────────────────
    let listener = StreamListener::bind(
        &config.bind_addr,
        config.poll_interval(),
        ServiceRecord {
            name: config.service_name.clone(),
            uuid: config.service_uuid.clone(),
        },
    )
    .with_context(|| format!("binding listener on {}", config.bind_addr))?;

    // ── 7. Interrupt handling ─────────────────────────────────
    let shutdown = ShutdownFlag::new();
    shutdown
        .install_interrupt_handler()
        .context("installing interrupt handler")?;

    // ── 8. Serve ──────────────────────────────────────────────
    let mut ctx = ServerContext::new(
        CapturePipeline::new(camera, CaptureSettings::from_config(&config)),
        ClassificationEngine::new(references),
        publisher,
        config.publisher.content_type.clone(),
        config.retain_artifacts,
    );
    let mut dispatcher = Dispatcher::new(listener, config.read_buffer_size, shutdown);
    let mut sink = LogEventSink::new();

    let outcome = dispatcher.run(&mut ctx, &mut sink);
    info!("Server going down");
    if let Err(e) = &outcome {
        error!("Dispatch loop aborted: {e}");
    }
    outcome.context("dispatch loop")
}
