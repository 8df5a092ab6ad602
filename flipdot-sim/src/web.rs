//! Live web view of the simulated sign
//!
//! Serves the current sign contents and the packet history over HTTP:
//!
//! | Path       | Response                                             |
//! |------------|------------------------------------------------------|
//! | `/`        | HTML page that redraws on every event                |
//! | `/display` | `{"pixels": [[bool]], "json": "[[0,1,..]]"}`         |
//! | `/packets` | `[{"Timestamp": .., "Length": ..}]`                  |
//! | `/events`  | server-sent events, one `{"json": ..}` per update    |
//!
//! The packet processor publishes into a [`SharedView`]; the server only
//! ever reads from it.

use std::io::{self, Read, Write};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};
use serde_json::json;
use tiny_http::{Header, Request, Response, Server};

use flipdot_display::PixelBuffer;

use crate::packet_log::PacketHistory;

/// How often the accept loop checks the running flag
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Updates queued per event-stream client before updates are skipped
const EVENT_QUEUE_LEN: usize = 8;

const INDEX_HTML: &str = include_str!("web/index.html");

/// Snapshot of the simulator state served over HTTP
#[derive(Debug)]
pub struct LiveView {
    display: PixelBuffer,
    history: PacketHistory,
    subscribers: Vec<SyncSender<String>>,
}

/// Live view shared between the processor and the server
pub type SharedView = Arc<Mutex<LiveView>>;

impl LiveView {
    pub fn new(columns: u16, rows: u16, history_len: usize) -> Self {
        Self {
            display: PixelBuffer::new(columns, rows),
            history: PacketHistory::new(history_len),
            subscribers: Vec::new(),
        }
    }

    /// Wrap for sharing between threads
    pub fn shared(self) -> SharedView {
        Arc::new(Mutex::new(self))
    }

    /// Replace the snapshot and notify event-stream clients
    ///
    /// Clients whose queue is full miss this update; disconnected clients
    /// are dropped.
    pub fn publish(&mut self, display: &PixelBuffer, history: &PacketHistory) {
        self.display.clone_from(display);
        self.history.clone_from(history);

        let event = self.event_json();
        self.subscribers
            .retain(|client| match client.try_send(event.clone()) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    debug!("Event client not ready, skipped update");
                    true
                }
                Err(TrySendError::Disconnected(_)) => false,
            });
    }

    /// Register an event-stream client
    ///
    /// The current state is queued right away.
    pub fn subscribe(&mut self) -> Receiver<String> {
        let (tx, rx) = sync_channel(EVENT_QUEUE_LEN);
        let _ = tx.try_send(self.event_json());
        self.subscribers.push(tx);
        rx
    }

    /// Number of connected event-stream clients
    pub fn subscribers(&self) -> usize {
        self.subscribers.len()
    }

    /// Body of `/display`
    pub fn display_json(&self) -> String {
        let pixels: Vec<&[bool]> = self.display.rows().collect();
        json!({
            "pixels": pixels,
            "json": self.display.to_json_matrix(),
        })
        .to_string()
    }

    /// Body of `/packets`
    pub fn packets_json(&self) -> serde_json::Result<String> {
        self.history.to_json()
    }

    fn event_json(&self) -> String {
        json!({ "json": self.display.to_json_matrix() }).to_string()
    }
}

/// Lock the view, recovering from a poisoned lock
pub fn lock(view: &SharedView) -> MutexGuard<'_, LiveView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a request resolves to
#[derive(Debug)]
pub enum Reply {
    Page(&'static str),
    Json(String),
    Events(Receiver<String>),
    NotFound,
}

/// Resolve a request path against the view
pub fn route(view: &SharedView, url: &str) -> Reply {
    let path = url.split('?').next().unwrap_or(url);
    match path {
        "/" | "/index.html" => Reply::Page(INDEX_HTML),
        "/display" => Reply::Json(lock(view).display_json()),
        "/packets" => match lock(view).packets_json() {
            Ok(body) => Reply::Json(body),
            Err(e) => {
                error!("Failed to serialise packet history: {}", e);
                Reply::Json("[]".to_owned())
            }
        },
        "/events" => Reply::Events(lock(view).subscribe()),
        _ => Reply::NotFound,
    }
}

/// Listen address for a configured `web_port`
///
/// `":8080"` listens on every interface; an empty value disables the view.
pub fn bind_address(web_port: &str) -> Option<String> {
    let web_port = web_port.trim();
    if web_port.is_empty() {
        None
    } else if web_port.starts_with(':') {
        Some(format!("0.0.0.0{}", web_port))
    } else {
        Some(web_port.to_owned())
    }
}

/// HTTP server for the live view
pub struct WebView {
    server: Server,
}

impl WebView {
    /// Bind to `addr` (for example `0.0.0.0:8080`)
    pub fn bind(addr: &str) -> io::Result<Self> {
        let server = Server::http(addr).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        info!("Web view listening on {}", addr);
        Ok(Self { server })
    }

    /// Bound socket address
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Serve requests until `running` is cleared
    pub fn serve(&self, view: &SharedView, running: &AtomicBool) {
        while running.load(Ordering::Relaxed) {
            match self.server.recv_timeout(ACCEPT_POLL) {
                Ok(Some(request)) => handle(request, view),
                Ok(None) => {}
                Err(e) => {
                    error!("Web view stopped: {}", e);
                    return;
                }
            }
        }
        info!("Web view stopped");
    }
}

fn handle(request: Request, view: &SharedView) {
    debug!("{} {}", request.method(), request.url());

    let reply = route(view, request.url());
    let result = match reply {
        Reply::Page(html) => request.respond(with_content_type(
            Response::from_string(html),
            "text/html; charset=utf-8",
        )),
        Reply::Json(body) => {
            request.respond(with_content_type(Response::from_string(body), "application/json"))
        }
        Reply::Events(events) => {
            let spawned = thread::Builder::new()
                .name("web-events".into())
                .spawn(move || stream_events(request, events));
            if let Err(e) = spawned {
                error!("Failed to start event stream: {}", e);
            }
            Ok(())
        }
        Reply::NotFound => request.respond(Response::from_string("not found").with_status_code(404)),
    };

    if let Err(e) = result {
        warn!("Failed to answer web request: {}", e);
    }
}

fn with_content_type<R: Read>(response: Response<R>, value: &str) -> Response<R> {
    match Header::from_bytes(&b"Content-Type"[..], value.as_bytes()) {
        Ok(header) => response.with_header(header),
        Err(()) => response,
    }
}

/// Write server-sent events until the client or the view goes away
fn stream_events(request: Request, events: Receiver<String>) {
    let mut out = request.into_writer();
    if let Err(e) = write_events(&mut out, events) {
        debug!("Event client disconnected: {}", e);
    }
}

fn write_events<W: Write>(out: &mut W, events: Receiver<String>) -> io::Result<()> {
    out.write_all(
        b"HTTP/1.1 200 OK\r\n\
          Content-Type: text/event-stream\r\n\
          Cache-Control: no-cache\r\n\
          Connection: keep-alive\r\n\
          Access-Control-Allow-Origin: *\r\n\r\n",
    )?;
    out.flush()?;

    for event in events {
        write!(out, "event: message\ndata: {}\n\n", event)?;
        out.flush()?;
    }
    Ok(())
}
