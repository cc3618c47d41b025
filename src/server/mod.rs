//! Loopback HTTP control server.
//!
//! Accepts manual or scripted reload triggers and hands them to the
//! [`ReloadDispatcher`]. Requests are answered on the accept thread; the
//! reload itself runs later on the host's main thread.

mod page;
mod response;
pub mod router;


use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use anyhow::Result;
use parking_lot::Mutex;
use rayon::ThreadPool;
use thiserror::Error;
use tiny_http::{Request, Server};

use crate::reload::ReloadDispatcher;
use crate::{debug, log};
use page::{PageVars, TRIGGER_HTML};
use router::{Route, parse_selection, resolve, route};

pub use response::RELOAD_TRIGGERED;
pub use router::RELOAD_PATH;

/// Largest accepted `POST /hot-reload` body.
pub const MAX_BODY: u64 = 64 * 1024;

/// Request handler threads.
const WORKERS: usize = 4;

/// Failures starting the control server. Never fatal to the host.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind control server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("failed to spawn control server thread")]
    Thread(#[source] io::Error),

    #[error("failed to create request pool")]
    Pool(#[source] rayon::ThreadPoolBuildError),
}

/// Running control server.
pub struct ControlServer {
    server: Arc<Server>,
    addr: SocketAddr,
    accept: Mutex<Option<JoinHandle<()>>>,
    stopped: AtomicBool,
}

impl ControlServer {
    /// Bind the listener and spawn the accept loop.
    pub fn start(addr: SocketAddr, dispatcher: ReloadDispatcher) -> Result<Self, ServerError> {
        let server = Server::http(addr).map_err(|source| ServerError::Bind { addr, source })?;
        let addr = server.server_addr().to_ip().unwrap_or(addr);
        let server = Arc::new(server);

        // Handlers may block on a slow client; the accept loop never does.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKERS)
            .thread_name(|i| format!("modreload-http-{i}"))
            .build()
            .map_err(ServerError::Pool)?;

        let page: Arc<str> = TRIGGER_HTML.render(&PageVars {
            version: env!("CARGO_PKG_VERSION"),
            mods: dispatcher
                .registry()
                .iter()
                .map(|m| m.name().to_string())
                .collect(),
        })
        .into();

        let accept_server = Arc::clone(&server);
        let accept = thread::Builder::new()
            .name("modreload-http".to_string())
            .spawn(move || run_request_loop(&accept_server, pool, &dispatcher, &page))
            .map_err(ServerError::Thread)?;

        log!("server"; "http://{}", addr);

        Ok(Self {
            server,
            addr,
            accept: Mutex::new(Some(accept)),
            stopped: AtomicBool::new(false),
        })
    }

    /// The bound address (the real port when started on port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Unblock the accept loop and wait for it to exit. Idempotent.
    ///
    /// Handlers still waiting on a client are not joined.
    pub fn shutdown(&self) {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return;
        }

        self.server.unblock();
        if let Some(accept) = self.accept.lock().take() {
            let _ = accept.join();
        }
        debug!("server"; "stopped");
    }
}

impl Drop for ControlServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run_request_loop(
    server: &Server,
    pool: ThreadPool,
    dispatcher: &ReloadDispatcher,
    page: &Arc<str>,
) {
    // Ends when `unblock` is called.
    for request in server.incoming_requests() {
        let dispatcher = dispatcher.clone();
        let page = Arc::clone(page);
        pool.spawn(move || {
            if let Err(e) = handle_request(request, &dispatcher, &page) {
                log!("server"; "request error: {e}");
            }
        });
    }
    // Dropping the pool does not wait for running handlers.
    drop(pool);
}

/// Handle a single HTTP request
fn handle_request(mut request: Request, dispatcher: &ReloadDispatcher, page: &str) -> Result<()> {
    debug!("server"; "{} {}", request.method(), request.url());

    match route(request.method(), request.url()) {
        Route::TriggerPage => response::respond_page(request, page),
        Route::NotFound => response::respond_not_found(request),
        Route::HotReload => {
            let Some(body) = read_body(request.as_reader())? else {
                log!("warn"; "rejected {} request: body over {} bytes", RELOAD_PATH, MAX_BODY);
                return response::respond_too_large(request);
            };

            let selection = match parse_selection(&body) {
                Ok(selection) => selection,
                Err(e) => {
                    log!("warn"; "rejected {} request: {}", RELOAD_PATH, e);
                    return response::respond_bad_request(request, &e);
                }
            };

            log!("server"; "reload triggered via POST {}", RELOAD_PATH);
            if let Some(reload) = resolve(selection, dispatcher.registry()) {
                dispatcher.reload(reload);
            }
            response::respond_triggered(request)
        }
    }
}

/// Read at most [`MAX_BODY`] bytes. `None` when the body is larger.
fn read_body(reader: impl Read) -> io::Result<Option<Vec<u8>>> {
    let mut body = Vec::new();
    reader.take(MAX_BODY + 1).read_to_end(&mut body)?;
    if body.len() as u64 > MAX_BODY {
        return Ok(None);
    }
    Ok(Some(body))
}
