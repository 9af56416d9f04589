#![allow(dead_code)]

use std::net::{SocketAddr, TcpListener};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::Router;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nstub-image";

pub fn png_b64() -> String {
    BASE64.encode(PNG_BYTES)
}

/// Reserve a local port so handlers can know their own address before serving.
pub fn bind() -> (TcpListener, SocketAddr) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
    listener.set_nonblocking(true).expect("nonblocking");
    let addr = listener.local_addr().expect("local addr");
    (listener, addr)
}

pub fn serve(listener: TcpListener, app: Router) {
    let server = axum::Server::from_tcp(listener)
        .expect("stub server")
        .serve(app.into_make_service());
    tokio::spawn(server);
}

/// Request counter shared between a stub and the test body.
#[derive(Clone, Default)]
pub struct Hits(Arc<AtomicUsize>);

impl Hits {
    /// Record a hit and return its one-based number.
    pub fn next(&self) -> usize {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn read_ledger(path: &Path) -> Vec<csv::StringRecord> {
    let mut rdr = csv::Reader::from_path(path).expect("ledger exists");
    rdr.records().map(|r| r.expect("ledger row")).collect()
}
