//! Tiny HTTP server which answers only the requests a test anticipated beforehand.
//!
//! Requests are matched by their path and query, e.g. `/KEY/geocoding/v2/find.js?query=x`.
//! Anything else gets `418 I'm a teapot` and makes the [`Server`] panic when dropped.

use http_body_util::Full;
use hyper::{Request, Response, server::conn::http1, service::Service};
use hyper_util::rt::TokioIo;
use std::{
    collections::HashMap,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot};

pub use hyper;
pub use hyper::StatusCode;
pub use hyper::body::Bytes;

type MockResponse = Response<Full<Bytes>>;

/// Anticipation registered by [`Server::anticipate`], waiting for the incoming request.
struct Anticipation {
    request_tx: oneshot::Sender<Request<()>>,
    response_rx: oneshot::Receiver<MockResponse>,
}

#[derive(Default)]
struct State {
    anticipations: HashMap<String, Anticipation>,
    unexpected: Vec<String>,
}

pub struct Server {
    port: u16,
    state: Arc<Mutex<State>>,
}

impl Server {
    /// Create new [`Server`], and bind it to a random port on the loopback interface.
    pub async fn bind() -> Server {
        let state = Arc::new(Mutex::new(State::default()));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state_clone = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);

                let state = state_clone.clone();
                tokio::task::spawn(async move {
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(io, MockRequest { state })
                        .await
                    {
                        log::warn!("Connection error: {e}.");
                    }
                });
            }
        });

        Server { port, state }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL of this server, without the trailing slash.
    pub fn url(&self) -> String {
        format!("http://localhost:{}", self.port)
    }

    /// Anticipate a request for `path_and_query`. It will not be answered until
    /// [`AnticipatedRequest::respond`] or [`AnticipatedRequest::respond_with_status`] is called.
    pub async fn anticipate(&self, path_and_query: impl Into<String>) -> AnticipatedRequest {
        let path_and_query = path_and_query.into();
        log::info!("Anticipating '{path_and_query}'.");

        let (request_tx, request_rx) = oneshot::channel();
        let (response_tx, response_rx) = oneshot::channel();

        self.state.lock().unwrap().anticipations.insert(
            path_and_query,
            Anticipation {
                request_tx,
                response_rx,
            },
        );

        AnticipatedRequest {
            request_rx,
            response_tx,
        }
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }

        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() {
            panic!("there are unexpected requests: {:?}", state.unexpected);
        }
    }
}

pub struct AnticipatedRequest {
    request_rx: oneshot::Receiver<Request<()>>,
    response_tx: oneshot::Sender<MockResponse>,
}

impl AnticipatedRequest {
    /// Wait until the anticipated request comes, and return its head.
    pub async fn expect(&mut self) -> Request<()> {
        (&mut self.request_rx).await.unwrap()
    }

    /// Respond with `200 OK` and given body.
    pub async fn respond(self, payload: impl Into<Bytes>) {
        log::info!("Responding.");
        self.send(Response::new(Full::new(payload.into())));
    }

    /// Respond with given status and an empty body.
    pub async fn respond_with_status(self, status: StatusCode) {
        log::info!("Responding with {status}.");
        let response = Response::builder()
            .status(status)
            .body(Full::new(Bytes::new()))
            .unwrap();
        self.send(response);
    }

    fn send(self, response: MockResponse) {
        // Client might have given up already, nobody to respond to then.
        let _ = self.response_tx.send(response);
    }
}

struct MockRequest {
    state: Arc<Mutex<State>>,
}

impl Service<Request<hyper::body::Incoming>> for MockRequest {
    type Response = MockResponse;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<hyper::body::Incoming>) -> Self::Future {
        let path_and_query = request
            .uri()
            .path_and_query()
            .map(|p| p.as_str().to_owned())
            .unwrap_or_default();

        log::info!("Incoming request '{path_and_query}'.");
        let state = self.state.clone();

        let (parts, _body) = request.into_parts();

        Box::pin(async move {
            let anticipation = state
                .lock()
                .unwrap()
                .anticipations
                .remove(&path_and_query);

            if let Some(anticipation) = anticipation {
                // Test might not be interested in the request itself.
                let _ = anticipation.request_tx.send(Request::from_parts(parts, ()));

                match anticipation.response_rx.await {
                    Ok(response) => Ok(response),
                    Err(_) => Ok(Response::builder()
                        .status(StatusCode::INTERNAL_SERVER_ERROR)
                        .body(Full::new(Bytes::from_static(b"anticipation dropped")))
                        .unwrap()),
                }
            } else {
                log::warn!("Unexpected '{path_and_query}'.");
                state.lock().unwrap().unexpected.push(path_and_query);
                Ok(Response::builder()
                    .status(StatusCode::IM_A_TEAPOT)
                    .body(Full::new(Bytes::from_static(b"unexpected")))
                    .unwrap())
            }
        })
    }
}
