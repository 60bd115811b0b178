//! Building and sending one outbound response.

use http::{StatusCode, Version};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// A fully-formed response. Built exclusively by the request handler; never
/// exists half-written — serialization happens into one buffer before any
/// byte reaches the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub body: String,
    pub version: Version,
}

impl Response {
    fn with_status(status: StatusCode, body: String) -> Self {
        Self {
            status,
            body,
            version: Version::HTTP_11,
        }
    }

    /// 200 with the looked-up display value as the body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(StatusCode::OK, body.into())
    }

    /// 400: the request carried no identifier.
    pub fn bad_request() -> Self {
        Self::with_status(StatusCode::BAD_REQUEST, String::new())
    }

    /// 404: valid identifier, no matching record. A normal outcome, not a
    /// fault.
    pub fn not_found() -> Self {
        Self::with_status(StatusCode::NOT_FOUND, String::new())
    }

    /// 500: pool or backend failure surfaced at the handler boundary.
    pub fn internal_error() -> Self {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR, String::new())
    }

    /// Mirror the request's protocol version.
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }

    /// Serialize the complete message: status line, headers, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let version = match self.version {
            Version::HTTP_10 => "HTTP/1.0",
            _ => "HTTP/1.1",
        };
        let reason = self.status.canonical_reason().unwrap_or("Unknown");
        let head = format!(
            "{} {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            version,
            self.status.as_u16(),
            reason,
            self.body.len()
        );
        let mut out = Vec::with_capacity(head.len() + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(self.body.as_bytes());
        out
    }

    /// Send the whole response in a single write.
    pub async fn write_to<S>(&self, stream: &mut S) -> std::io::Result<()>
    where
        S: AsyncWrite + Unpin,
    {
        stream.write_all(&self.to_bytes()).await?;
        stream.flush().await
    }
}
