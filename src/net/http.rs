//! Minimal HTTP/1.1 framing for the oracle listener.
//!
//! One request is read per connection and every response closes the
//! connection, which is all the foreign-call client needs.

use std::collections::HashMap;
use std::io;
use std::str;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time;

/// Largest accepted request head.
pub const MAX_HEADER_BYTES: usize = 32 * 1024;
/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Parsed HTTP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Upper-cased request method.
    pub method: String,
    /// Request path without the query string.
    pub path: String,
    /// Headers keyed by lower-cased name.
    pub headers: HashMap<String, String>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

/// Reasons a request could not be framed.
#[derive(Debug, Error)]
pub enum HttpReadError {
    #[error("read timeout")]
    /// The peer did not deliver the request in time.
    TimedOut,
    #[error("{0}")]
    /// Head or body exceeded its size limit.
    TooLarge(&'static str),
    #[error("{0}")]
    /// The request was not valid HTTP/1.1.
    Malformed(&'static str),
    #[error("io error: {0}")]
    /// Socket failure.
    Io(#[from] io::Error),
}

impl HttpReadError {
    /// HTTP status line used when rejecting the request.
    pub fn status(&self) -> &'static str {
        match self {
            HttpReadError::TimedOut => "408 Request Timeout",
            HttpReadError::TooLarge(_) => "413 Payload Too Large",
            HttpReadError::Malformed(_) | HttpReadError::Io(_) => "400 Bad Request",
        }
    }
}

async fn read_chunk<S>(stream: &mut S, buf: &mut [u8], timeout: Duration) -> Result<usize, HttpReadError>
where
    S: AsyncRead + Unpin,
{
    time::timeout(timeout, stream.read(buf))
        .await
        .map_err(|_| HttpReadError::TimedOut)?
        .map_err(HttpReadError::from)
}

/// Reads one request head and its `Content-Length` body.
pub async fn read_http_request<S>(
    stream: &mut S,
    max_header_bytes: usize,
    max_body_bytes: usize,
    timeout: Duration,
) -> Result<HttpRequest, HttpReadError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let mut buf = Vec::new();
    let mut header_end = None;
    loop {
        let mut tmp = [0u8; 1024];
        let n = read_chunk(stream, &mut tmp, timeout).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            header_end = Some(pos + 4);
            break;
        }
        if buf.len() > max_header_bytes {
            return Err(HttpReadError::TooLarge("header too large"));
        }
    }

    let end = header_end.ok_or(HttpReadError::Malformed("malformed request"))?;
    let header_str =
        str::from_utf8(&buf[..end]).map_err(|_| HttpReadError::Malformed("invalid header"))?;
    let mut lines = header_str.split("\r\n").filter(|line| !line.is_empty());
    let request_line = lines
        .next()
        .ok_or(HttpReadError::Malformed("missing request line"))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or(HttpReadError::Malformed("missing method"))?
        .to_ascii_uppercase();
    let target = parts
        .next()
        .ok_or(HttpReadError::Malformed("missing request target"))?;
    let path = target.split('?').next().unwrap_or(target).to_string();
    let mut headers = HashMap::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
        }
    }

    if headers
        .get("transfer-encoding")
        .is_some_and(|v| v.to_ascii_lowercase().contains("chunked"))
    {
        return Err(HttpReadError::Malformed(
            "chunked transfer encoding is not supported",
        ));
    }
    let content_len: usize = match headers.get("content-length") {
        Some(v) => v
            .parse()
            .map_err(|_| HttpReadError::Malformed("invalid content-length"))?,
        None => 0,
    };
    if content_len > max_body_bytes {
        return Err(HttpReadError::TooLarge("content-length exceeds limit"));
    }

    let mut body = buf[end..].to_vec();
    if body.len() < content_len
        && headers
            .get("expect")
            .is_some_and(|v| v.eq_ignore_ascii_case("100-continue"))
    {
        stream.write_all(b"HTTP/1.1 100 Continue\r\n\r\n").await?;
    }
    while body.len() < content_len {
        let remaining = content_len - body.len();
        let mut tmp = vec![0u8; remaining.min(8192)];
        let n = read_chunk(stream, &mut tmp, timeout).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&tmp[..n]);
    }
    if body.len() < content_len {
        return Err(HttpReadError::Malformed("incomplete request body"));
    }
    body.truncate(content_len);

    Ok(HttpRequest {
        method,
        path,
        headers,
        body,
    })
}

/// Builds a complete JSON response with CORS headers.
pub fn build_json_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status}\r\n\
         Content-Type: application/json\r\n\
         Access-Control-Allow-Origin: *\r\n\
         Access-Control-Allow-Methods: POST, OPTIONS, GET\r\n\
         Access-Control-Allow-Headers: content-type\r\n\
         Content-Length: {}\r\n\
         Connection: close\r\n\r\n{}",
        body.len(),
        body
    )
    .into_bytes()
}

/// Builds the CORS preflight reply.
pub fn build_preflight_response() -> Vec<u8> {
    b"HTTP/1.1 204 No Content\r\n\
      Access-Control-Allow-Origin: *\r\n\
      Access-Control-Allow-Methods: POST, OPTIONS, GET\r\n\
      Access-Control-Allow-Headers: content-type\r\n\
      Content-Length: 0\r\n\
      Connection: close\r\n\r\n"
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::duplex;

    const TIMEOUT: Duration = Duration::from_secs(2);

    async fn parse(raw: &[u8]) -> Result<HttpRequest, HttpReadError> {
        let (mut client, mut server) = duplex(64 * 1024);
        client.write_all(raw).await.unwrap();
        read_http_request(&mut server, MAX_HEADER_BYTES, 64, TIMEOUT).await
    }

    #[tokio::test]
    async fn reads_post_with_body() {
        let req = parse(b"post /?x=1 HTTP/1.1\r\nHost: a\r\nContent-Length: 4\r\n\r\n{\"a\"").await;
        let req = req.unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.path, "/");
        assert_eq!(req.headers.get("host").map(String::as_str), Some("a"));
        assert_eq!(req.body, b"{\"a\"");
    }

    #[tokio::test]
    async fn rejects_oversized_body() {
        let err = parse(b"POST / HTTP/1.1\r\nContent-Length: 65\r\n\r\n")
            .await
            .unwrap_err();
        assert_eq!(err.status(), "413 Payload Too Large");
    }

    #[tokio::test]
    async fn rejects_bad_content_length_and_chunked() {
        let err = parse(b"POST / HTTP/1.1\r\nContent-Length: x\r\n\r\n")
            .await
            .unwrap_err();
        assert_eq!(err.status(), "400 Bad Request");
        let err = parse(b"POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chunked"));
    }

    #[tokio::test]
    async fn times_out_on_stalled_body() {
        let (mut client, mut server) = duplex(1024);
        client
            .write_all(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
            .await
            .unwrap();
        let err = read_http_request(
            &mut server,
            MAX_HEADER_BYTES,
            MAX_BODY_BYTES,
            Duration::from_millis(50),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HttpReadError::TimedOut));
        drop(client);
    }

    #[test]
    fn json_response_sets_length_and_cors() {
        let resp = String::from_utf8(build_json_response("200 OK", "{}")).unwrap();
        assert!(resp.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(resp.contains("Content-Length: 2\r\n"));
        assert!(resp.contains("Access-Control-Allow-Origin: *\r\n"));
        assert!(resp.ends_with("\r\n\r\n{}"));
    }
}
