//! Command dispatcher: the single-threaded server loop.
//!
//! ```text
//!  Listening ──accept──▶ Connected ──▶ AwaitingCommand ──read──▶ Handling
//!      ▲                                   ▲                         │
//!      │ peer closed / transport error      └────── Responding ◀─────┘
//!      └───────────────────────────────────────────────┘
//!  interrupt (any state) ──▶ Closed
//! ```
//!
//! One connection is served at a time. Further peers wait in the
//! listener's backlog until the active one disconnects. Each blocking wait
//! is sliced by the transport's poll interval so the shutdown flag is
//! observed promptly; an in-flight command always runs to completion.

use log::{debug, error, info, warn};

use crate::app::commands::{Command, Response};
use crate::app::events::AppEvent;
use crate::app::ports::{CameraPort, EventSink, PublishPort};
use crate::app::service::ServerContext;
use crate::error::{DispatchError, Disposition};
use crate::shutdown::ShutdownFlag;
use crate::transport::{Connection, Listener};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatcherState {
    Listening,
    Connected,
    AwaitingCommand,
    Handling,
    Responding,
    Closed,
}

/// Why a connection stopped being served.
enum Ending {
    PeerClosed,
    Abandoned(DispatchError),
    Shutdown,
}

impl Ending {
    fn describe(&self) -> String {
        match self {
            Self::PeerClosed => "peer closed".into(),
            Self::Abandoned(e) => e.to_string(),
            Self::Shutdown => "server shutting down".into(),
        }
    }
}

pub struct Dispatcher<L> {
    listener: L,
    read_buffer_size: usize,
    shutdown: ShutdownFlag,
    state: DispatcherState,
}

impl<L: Listener> Dispatcher<L> {
    pub fn new(listener: L, read_buffer_size: usize, shutdown: ShutdownFlag) -> Self {
        Self {
            listener,
            read_buffer_size: read_buffer_size.max(1),
            shutdown,
            state: DispatcherState::Listening,
        }
    }

    pub fn state(&self) -> DispatcherState {
        self.state
    }

    /// Serve peers until the shutdown flag is set or the listener fails
    /// permanently. The listener is closed on every exit path.
    pub fn run<C, P>(
        &mut self,
        ctx: &mut ServerContext<C, P>,
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError>
    where
        C: CameraPort,
        P: PublishPort,
    {
        let outcome = self.accept_loop(ctx, sink);
        self.listener.close();
        self.state = DispatcherState::Closed;
        sink.emit(&AppEvent::ShuttingDown);
        outcome
    }

    fn accept_loop<C, P>(
        &mut self,
        ctx: &mut ServerContext<C, P>,
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError>
    where
        C: CameraPort,
        P: PublishPort,
    {
        let mut announce = true;
        while !self.shutdown.is_requested() {
            self.state = DispatcherState::Listening;
            if announce {
                sink.emit(&AppEvent::Listening {
                    endpoint: self.listener.endpoint(),
                });
                announce = false;
            }

            let conn = match self.listener.poll_accept() {
                Ok(Some(conn)) => conn,
                Ok(None) => continue,
                Err(e) => {
                    let err = DispatchError::Listener(e);
                    match err.disposition() {
                        Disposition::AbortProcess => {
                            error!("Listener failed: {err}");
                            return Err(err);
                        }
                        _ => {
                            warn!("Accept failed, still listening: {err}");
                            continue;
                        }
                    }
                }
            };

            self.serve(conn, ctx, sink)?;
            announce = true;
        }
        info!("Shutdown requested, leaving dispatch loop");
        Ok(())
    }

    /// Request/response loop over one connection.
    fn serve<C, P>(
        &mut self,
        mut conn: L::Conn,
        ctx: &mut ServerContext<C, P>,
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError>
    where
        C: CameraPort,
        P: PublishPort,
    {
        self.state = DispatcherState::Connected;
        let peer = conn.peer();
        sink.emit(&AppEvent::ConnectionAccepted { peer: peer.clone() });

        let mut buf = vec![0u8; self.read_buffer_size];
        let mut fatal = None;
        let ending = loop {
            if self.shutdown.is_requested() {
                break Ending::Shutdown;
            }
            self.state = DispatcherState::AwaitingCommand;
            let len = match conn.poll_read(&mut buf) {
                Ok(None) => continue,
                Ok(Some(0)) => break Ending::PeerClosed,
                Ok(Some(n)) => n,
                Err(e) => break Ending::Abandoned(DispatchError::Transport(e)),
            };

            self.state = DispatcherState::Handling;
            let command = Command::decode(&buf[..len]);
            sink.emit(&AppEvent::CommandReceived(command.to_string()));

            let response = match ctx.handle_command(&command, sink) {
                Ok(response) => response,
                Err(err) => match err.disposition() {
                    Disposition::Respond(response) => {
                        sink.emit(&AppEvent::CommandFailed {
                            command: command.to_string(),
                            reason: err.to_string(),
                        });
                        response
                    }
                    Disposition::AbandonConnection => break Ending::Abandoned(err),
                    Disposition::AbortProcess => {
                        fatal = Some(err.clone());
                        break Ending::Abandoned(err);
                    }
                },
            };

            self.state = DispatcherState::Responding;
            if let Err(e) = self.respond(&mut conn, &response, sink) {
                break Ending::Abandoned(e);
            }
        };

        if let Ending::Abandoned(e) = &ending {
            warn!("Abandoning connection from {peer}: {e}");
        } else {
            debug!("Connection from {peer} ended: {}", ending.describe());
        }
        conn.close();
        sink.emit(&AppEvent::ConnectionClosed {
            peer,
            reason: ending.describe(),
        });
        fatal.map_or(Ok(()), Err)
    }

    fn respond(
        &self,
        conn: &mut L::Conn,
        response: &Response,
        sink: &mut impl EventSink,
    ) -> Result<(), DispatchError> {
        conn.write_all(response.as_bytes())
            .map_err(DispatchError::Transport)?;
        sink.emit(&AppEvent::ResponseSent(response.to_string()));
        Ok(())
    }
}
