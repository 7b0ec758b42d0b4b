//! End-to-end tests: the real dispatcher serving a loopback stream socket.

use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use colorimetry::adapters::stream_transport::{ServiceRecord, StreamListener};
use colorimetry::dispatcher::Dispatcher;
use colorimetry::error::DispatchError;
use colorimetry::shutdown::ShutdownFlag;

use crate::mock_hw::{MockCamera, RecordingSink, context};

const POLL: Duration = Duration::from_millis(20);

struct Server {
    addr: SocketAddr,
    shutdown: ShutdownFlag,
    handle: JoinHandle<(Result<(), DispatchError>, RecordingSink)>,
    _dir: tempfile::TempDir,
}

impl Server {
    fn start(greys: &'static [u8]) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let artifact_dir: PathBuf = dir.path().to_path_buf();
        let listener = StreamListener::bind(
            "127.0.0.1:0",
            POLL,
            ServiceRecord {
                name: "RaspiBtSrv".into(),
                uuid: "7be1fcb3-5776-42fb-91fd-2ee7b5bbb86d".into(),
            },
        )
        .unwrap();
        let addr = listener.local_addr();
        let shutdown = ShutdownFlag::new();
        let flag = shutdown.clone();

        let handle = thread::spawn(move || {
            let mut ctx = context(&artifact_dir, MockCamera::greys(greys));
            let mut sink = RecordingSink::default();
            let mut dispatcher = Dispatcher::new(listener, 1024, flag);
            let outcome = dispatcher.run(&mut ctx, &mut sink);
            (outcome, sink)
        });

        Self {
            addr,
            shutdown,
            handle,
            _dir: dir,
        }
    }

    fn stop(self) -> RecordingSink {
        self.shutdown.request();
        let (outcome, sink) = self.handle.join().unwrap();
        outcome.unwrap();
        sink
    }
}

fn connect(addr: SocketAddr) -> TcpStream {
    let stream = TcpStream::connect(addr).unwrap();
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
}

fn send(stream: &mut TcpStream, command: &str) -> String {
    stream.write_all(command.as_bytes()).unwrap();
    let mut buf = [0u8; 1024];
    let n = stream.read(&mut buf).unwrap();
    String::from_utf8(buf[..n].to_vec()).unwrap()
}

#[test]
fn full_session_over_one_connection() {
    let server = Server::start(&[100, 200]);
    let mut client = connect(server.addr);

    let r1 = send(&mut client, "click");
    assert!(r1.starts_with("https://cdn.mock/"), "{r1}");
    assert_eq!(send(&mut client, "sendthyresult"), r1);

    let r2 = send(&mut client, "click");
    assert_ne!(r2, r1);

    let level = send(&mut client, "analyze");
    assert_eq!(level, "4");
    assert_eq!(send(&mut client, "hello"), "msg:Not supported");

    drop(client);
    let sink = server.stop();
    assert!(!sink.events.is_empty());
}

#[test]
fn error_replies_keep_the_connection_open() {
    let server = Server::start(&[]);
    let mut client = connect(server.addr);

    assert_eq!(send(&mut client, "analyze"), "msg:Nothing to analyze");
    assert_eq!(send(&mut client, "sendthyresult"), "msg:No result available");
    assert!(send(&mut client, "click").starts_with("https://"));

    drop(client);
    server.stop();
}

#[test]
fn session_survives_reconnect() {
    let server = Server::start(&[150]);

    let mut first = connect(server.addr);
    let r1 = send(&mut first, "click");
    drop(first);

    let mut second = connect(server.addr);
    assert_eq!(send(&mut second, "sendthyresult"), r1);
    assert_eq!(send(&mut second, "analyze"), "3");

    drop(second);
    server.stop();
}

#[test]
fn second_peer_waits_until_first_disconnects() {
    let server = Server::start(&[100]);

    let mut first = connect(server.addr);
    let r1 = send(&mut first, "click");

    let mut second = connect(server.addr);
    second
        .set_read_timeout(Some(Duration::from_millis(300)))
        .unwrap();
    second.write_all(b"sendthyresult").unwrap();
    let mut buf = [0u8; 1024];
    let err = second.read(&mut buf).unwrap_err();
    assert!(
        matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut),
        "second peer was served while the first was active: {err}"
    );

    // The first connection is still fully served.
    assert_eq!(send(&mut first, "sendthyresult"), r1);
    drop(first);

    second
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let n = second.read(&mut buf).unwrap();
    assert_eq!(String::from_utf8_lossy(&buf[..n]), r1);

    drop(second);
    server.stop();
}

#[test]
fn shutdown_closes_an_idle_connection() {
    let server = Server::start(&[]);
    let mut client = connect(server.addr);
    assert_eq!(send(&mut client, "ping"), "msg:Not supported");

    let sink = server.stop();

    // The server side shut the socket down.
    let mut buf = [0u8; 8];
    let n = client.read(&mut buf).unwrap_or(0);
    assert_eq!(n, 0);
    assert!(sink.events.iter().any(|e| matches!(
        e,
        colorimetry::app::events::AppEvent::ShuttingDown
    )));
}
