//! Reading and representing one inbound request.

use bytes::BytesMut;
use http::{Method, Version};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Upper bound on the request head (request line + headers).
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

const MAX_HEADERS: usize = 64;

/// Malformed bytes on the wire. Not recoverable into a response; the
/// session aborts the connection instead.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The bytes received do not form a valid HTTP/1.x request head.
    #[error("malformed request head")]
    Malformed,
    /// The request head exceeds [`MAX_HEAD_BYTES`].
    #[error("request head larger than {MAX_HEAD_BYTES} bytes")]
    TooLarge,
    /// The peer closed the connection before a full head arrived.
    #[error("connection closed mid-request")]
    UnexpectedEof,
    /// The socket itself failed.
    #[error("socket read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// One parsed request. Immutable once read; only the request line is
/// interpreted by the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub target: String,
    pub version: Version,
}

/// Read one full request head from `stream`, suspending until the blank
/// line terminating the headers has arrived.
///
/// Body bytes, if the peer sends any, are left unread; the connection is
/// closed after the response regardless. Cancel-safe: dropping this future
/// leaves `buf` with whatever arrived, and the caller drops the socket.
pub async fn read_request<S>(stream: &mut S, buf: &mut BytesMut) -> Result<Request, ProtocolError>
where
    S: AsyncRead + Unpin,
{
    loop {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Request::new(&mut headers);

        match parsed.parse(buf) {
            Ok(httparse::Status::Complete(_)) => {
                let method = parsed
                    .method
                    .and_then(|m| Method::from_bytes(m.as_bytes()).ok())
                    .ok_or(ProtocolError::Malformed)?;
                let target = parsed.path.ok_or(ProtocolError::Malformed)?.to_owned();
                let version = match parsed.version {
                    Some(0) => Version::HTTP_10,
                    Some(1) => Version::HTTP_11,
                    _ => return Err(ProtocolError::Malformed),
                };
                return Ok(Request {
                    method,
                    target,
                    version,
                });
            }
            Ok(httparse::Status::Partial) => {
                if buf.len() >= MAX_HEAD_BYTES {
                    return Err(ProtocolError::TooLarge);
                }
            }
            Err(_) => return Err(ProtocolError::Malformed),
        }

        let read = stream.read_buf(buf).await?;
        if read == 0 {
            return Err(ProtocolError::UnexpectedEof);
        }
    }
}
