//! JSON-RPC listener resolving foreign calls over HTTP.

use crate::config::OracleConfig;
use crate::dispatch::handle_request;
use crate::error::{OracleError, CODE_INTERNAL_ERROR, CODE_INVALID_REQUEST, CODE_PARSE_ERROR};
use crate::net::http::{
    build_json_response, build_preflight_response, read_http_request, HttpReadError, HttpRequest,
    MAX_BODY_BYTES, MAX_HEADER_BYTES,
};
use crate::protocol::{error_body, success_body, ForeignCallRequest, ForeignCallResult};
use serde_json::{json, Value};
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::{task, time};

/// Bound oracle listener.
#[derive(Debug)]
pub struct OracleServer {
    listener: TcpListener,
    cfg: OracleConfig,
}

impl OracleServer {
    /// Binds the listening socket described by `cfg`.
    pub async fn bind(cfg: OracleConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(cfg.listen).await?;
        Ok(Self { listener, cfg })
    }

    /// Address actually bound, useful when the configured port was `0`.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves connections until `shutdown` resolves, then releases the socket.
    pub async fn serve_with_shutdown<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()>,
    {
        let addr = self.local_addr()?;
        tracing::info!(target: "oracle::server", %addr, "oracle server listening");
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!(target: "oracle::server", %addr, "shutdown requested, closing listener");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (mut stream, peer) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            tracing::warn!(target: "oracle::server", error = %err, "accept failed");
                            continue;
                        }
                    };
                    let timeout = self.cfg.request_timeout;
                    tokio::spawn(async move {
                        if let Err(err) = handle_connection(&mut stream, timeout).await {
                            tracing::warn!(target: "oracle::server", %peer, error = %err, "connection error");
                        }
                    });
                }
            }
        }
        Ok(())
    }

    /// Serves connections until the process exits.
    pub async fn serve(self) -> io::Result<()> {
        self.serve_with_shutdown(std::future::pending()).await
    }
}

/// Binds and serves until Ctrl-C (or SIGTERM on unix).
pub async fn run_oracle_server(cfg: OracleConfig) -> io::Result<()> {
    let server = OracleServer::bind(cfg).await?;
    server.serve_with_shutdown(shutdown_signal()).await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(target: "oracle::server", error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(target: "oracle::server", error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

async fn handle_connection<S>(stream: &mut S, timeout: Duration) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let req = match read_http_request(stream, MAX_HEADER_BYTES, MAX_BODY_BYTES, timeout).await {
        Ok(req) => req,
        Err(err) => {
            tracing::debug!(target: "oracle::server", error = %err, "rejecting unreadable request");
            let (code, message) = match &err {
                HttpReadError::TimedOut => (CODE_INTERNAL_ERROR, OracleError::Timeout.to_string()),
                HttpReadError::TooLarge(_) => (CODE_INVALID_REQUEST, err.to_string()),
                _ => (CODE_PARSE_ERROR, format!("parse error: {err}")),
            };
            let body = error_body(Value::Null, code, message).to_string();
            let resp = build_json_response(err.status(), &body);
            if let Err(err) = stream.write_all(&resp).await {
                tracing::debug!(target: "oracle::server", error = %err, "failed to send rejection");
            }
            if let Err(err) = stream.shutdown().await {
                tracing::debug!(target: "oracle::server", error = %err, "failed to close rejected connection");
            }
            return Ok(());
        }
    };

    let resp = route(req, timeout).await;
    stream.write_all(&resp).await?;
    stream.shutdown().await
}

async fn route(req: HttpRequest, timeout: Duration) -> Vec<u8> {
    match (req.method.as_str(), req.path.as_str()) {
        ("OPTIONS", _) => build_preflight_response(),
        ("GET", "/health") => build_json_response("200 OK", &json!({"status": "ok"}).to_string()),
        ("POST", "/") => {
            let (status, body) = handle_rpc_body(&req.body, timeout).await;
            build_json_response(status, &body.to_string())
        }
        (_, "/") | (_, "/health") => {
            let body = error_body(Value::Null, CODE_INVALID_REQUEST, "invalid request method");
            build_json_response("405 Method Not Allowed", &body.to_string())
        }
        (_, path) => {
            let body = error_body(
                Value::Null,
                CODE_INVALID_REQUEST,
                format!("no route for {path}"),
            );
            build_json_response("404 Not Found", &body.to_string())
        }
    }
}

/// Resolves one JSON-RPC body, returning the HTTP status and response envelope.
async fn handle_rpc_body(body: &[u8], timeout: Duration) -> (&'static str, Value) {
    handle_rpc_body_with(body, timeout, |req| handle_request(&req)).await
}

/// Like [`handle_rpc_body`], resolving through `resolver` on the blocking pool.
async fn handle_rpc_body_with<F>(
    body: &[u8],
    timeout: Duration,
    resolver: F,
) -> (&'static str, Value)
where
    F: FnOnce(ForeignCallRequest) -> Result<ForeignCallResult, OracleError> + Send + 'static,
{
    let value: Value = match serde_json::from_slice(body) {
        Ok(v) => v,
        Err(err) => {
            return (
                "400 Bad Request",
                error_body(Value::Null, CODE_PARSE_ERROR, format!("parse error: {err}")),
            );
        }
    };
    let parsed = ForeignCallRequest::from_json(value);

    let id = parsed.response_id();
    let method = parsed.method_label();
    let outcome = match time::timeout(timeout, task::spawn_blocking(move || resolver(parsed))).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(join_err)) => {
            tracing::error!(target: "oracle::server", error = %join_err, "foreign call handler panicked");
            let body = error_body(id, CODE_INTERNAL_ERROR, "Internal error");
            return ("200 OK", body);
        }
        Err(_) => Err(OracleError::Timeout),
    };

    let body = match outcome {
        Ok(result) => success_body(id, &result),
        Err(err) => {
            tracing::info!(target: "oracle::server", %method, error = %err, "foreign call rejected");
            error_body(id, err.code(), err.to_string())
        }
    };
    ("200 OK", body)
}
