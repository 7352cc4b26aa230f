//! Terminal responses written once the delay has elapsed.
//!
//! An HTTP client gets its answer in two pieces: the status line and
//! `Content-Type` right after the delay, and the empty-body trailer at the end
//! of the draining phase. Anything else gets a plain greeting.

const HTTP_VERSION: &str = "HTTP/1.1";

/// Status codes the tarpit answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 503 Service Unavailable
    ServiceUnavailable,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use tarpit::http::response::StatusCode;
    /// assert_eq!(StatusCode::ServiceUnavailable.as_u16(), 503);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::ServiceUnavailable => 503,
        }
    }

    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// Serialized status line including the trailing CRLF.
    pub fn status_line(&self) -> String {
        format!(
            "{} {} {}\r\n",
            HTTP_VERSION,
            self.as_u16(),
            self.reason_phrase()
        )
    }
}

/// Body sent to clients that did not look like HTTP.
pub const GREETING: &[u8] = b"Hello, world!\r\n";

/// Header line sent together with the status line.
pub const CONTENT_TYPE_LINE: &[u8] = b"Content-Type: text/plain\r\n";

/// Closes the header block of the 503 answer.
pub const EMPTY_BODY_TRAILER: &[u8] = b"Content-Length: 0\r\n\r\n";

/// What a connection ended up sending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    /// Nothing was written.
    None,
    /// Only the 503 status line and content type reached the client.
    HeaderOnly,
    /// The complete 503 sequence.
    ServiceUnavailable,
    /// The plain-text greeting.
    Greeting,
}

/// Status line and content type for the 503 answer.
pub fn service_unavailable_head() -> Vec<u8> {
    let mut buf = StatusCode::ServiceUnavailable.status_line().into_bytes();
    buf.extend_from_slice(CONTENT_TYPE_LINE);
    buf
}
