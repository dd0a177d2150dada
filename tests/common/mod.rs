//! Shared helpers for integration tests: a recording HTTP server and a
//! scan runner that drives the full pipeline from CLI arguments.

#![allow(dead_code)]

use axum::extract::{Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use clap::Parser;
use dirscout::config::{CliArgs, Command, ScanConfig};
use dirscout::output::ResultCollector;
use dirscout::scan::{ScanCoordinator, ScanSummary};
use dirscout::ScanError;
use parking_lot::Mutex;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::oneshot;

/// One request as seen by the test server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: HeaderMap,
}

impl RecordedRequest {
    /// Header value as a string, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> Response + Send + Sync>;

#[derive(Clone)]
struct ServerState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    responder: Responder,
}

async fn record(State(state): State<ServerState>, request: Request) -> Response {
    let recorded = RecordedRequest {
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        headers: request.headers().clone(),
    };
    let response = (state.responder)(&recorded);
    state.requests.lock().push(recorded);
    response
}

/// HTTP server on an ephemeral port that records every request
pub struct TestServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Start a server answering every request with `responder`
    pub fn start<F>(responder: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Response + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let state = ServerState {
            requests: Arc::clone(&requests),
            responder: Arc::new(responder),
        };
        let app = Router::new().fallback(record).with_state(state);

        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("test runtime");

            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind test server");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("report address");

                axum::serve(listener, app)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        let addr = addr_rx.recv().expect("test server failed to start");
        Self {
            addr,
            requests,
            shutdown: Some(shutdown_tx),
        }
    }

    /// Server answering `status` to everything
    pub fn with_status(status: StatusCode) -> Self {
        Self::start(move |_| status.into_response())
    }

    /// Base URL, e.g. `http://127.0.0.1:41234/`
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Snapshot of the recorded requests, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Number of requests received
    pub fn len(&self) -> usize {
        self.requests.lock().len()
    }

    /// Sorted request paths
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.requests().into_iter().map(|r| r.path).collect();
        paths.sort();
        paths
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Minimal SOCKS5 proxy (no auth, CONNECT only) relaying to real targets
pub struct Socks5Proxy {
    addr: SocketAddr,
    tunnels: Arc<AtomicUsize>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Socks5Proxy {
    /// Start the proxy on an ephemeral port
    pub fn start() -> Self {
        let tunnels = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&tunnels);

        let (addr_tx, addr_rx) = mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("proxy runtime");

            runtime.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                    .await
                    .expect("bind proxy");
                addr_tx
                    .send(listener.local_addr().expect("local addr"))
                    .expect("report address");

                tokio::select! {
                    _ = accept_tunnels(listener, counter) => {}
                    _ = shutdown_rx => {}
                }
            });
        });

        let addr = addr_rx.recv().expect("proxy failed to start");
        Self {
            addr,
            tunnels,
            shutdown: Some(shutdown_tx),
        }
    }

    /// `host:port` to pass to `--socks5`
    pub fn address(&self) -> String {
        self.addr.to_string()
    }

    /// Tunnels established to a target
    pub fn tunnels(&self) -> usize {
        self.tunnels.load(Ordering::SeqCst)
    }
}

impl Drop for Socks5Proxy {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn accept_tunnels(listener: tokio::net::TcpListener, tunnels: Arc<AtomicUsize>) {
    while let Ok((client, _)) = listener.accept().await {
        let tunnels = Arc::clone(&tunnels);
        tokio::spawn(async move {
            // Errors just close the client connection
            let _ = tunnel(client, &tunnels).await;
        });
    }
}

async fn tunnel(mut client: TcpStream, tunnels: &AtomicUsize) -> io::Result<()> {
    // Greeting: version, method count, methods; answer "no auth"
    let mut greeting = [0u8; 2];
    client.read_exact(&mut greeting).await?;
    let mut methods = vec![0u8; greeting[1] as usize];
    client.read_exact(&mut methods).await?;
    client.write_all(&[0x05, 0x00]).await?;

    // Request: version, command, reserved, address type
    let mut request = [0u8; 4];
    client.read_exact(&mut request).await?;
    if request[1] != 0x01 {
        return Err(io::Error::new(io::ErrorKind::Unsupported, "only CONNECT"));
    }

    let host = match request[3] {
        0x01 => {
            let mut ip = [0u8; 4];
            client.read_exact(&mut ip).await?;
            Ipv4Addr::from(ip).to_string()
        }
        0x03 => {
            let len = client.read_u8().await?;
            let mut name = vec![0u8; len as usize];
            client.read_exact(&mut name).await?;
            String::from_utf8_lossy(&name).into_owned()
        }
        0x04 => {
            let mut ip = [0u8; 16];
            client.read_exact(&mut ip).await?;
            Ipv6Addr::from(ip).to_string()
        }
        _ => {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "bad address type"));
        }
    };
    let port = client.read_u16().await?;

    let mut upstream = TcpStream::connect((host.as_str(), port)).await?;
    tunnels.fetch_add(1, Ordering::SeqCst);
    client
        .write_all(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0])
        .await?;

    tokio::io::copy_bidirectional(&mut client, &mut upstream).await?;
    Ok(())
}

/// Address that refuses connections: bound once, then released
pub fn closed_port_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    addr.to_string()
}

/// Path of a dictionary under `tests/testdata/`
pub fn testdata(name: &str) -> String {
    format!("{}/tests/testdata/{}", env!("CARGO_MANIFEST_DIR"), name)
}

/// Parse `dirscout scan ...` arguments and run the scan to completion
pub fn run_scan(argv: &[&str]) -> Result<(ScanSummary, Arc<ResultCollector>), ScanError> {
    let mut full = vec!["dirscout", "scan"];
    full.extend_from_slice(argv);

    let cli = CliArgs::try_parse_from(full).expect("valid command line");
    let Command::Scan(args) = cli.command;

    let config = ScanConfig::from_args(args)?;
    let collector = Arc::new(ResultCollector::new());
    let coordinator = ScanCoordinator::from_config(&config, collector.clone())?;
    let summary = coordinator.run()?;

    Ok((summary, collector))
}
