/// Version tokens that end an HTTP/1.x request line.
const REQUEST_LINE_MARKERS: [&[u8]; 2] = [b"HTTP/1.0\r\n", b"HTTP/1.1\r\n"];

/// Detects an HTTP/1.0 or HTTP/1.1 request line in accumulated input.
///
/// Detection is sticky: once a request line has been seen, later input is
/// not inspected again.
#[derive(Debug, Default)]
pub struct RequestSniffer {
    request_line: Option<String>,
}

impl RequestSniffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_http(&self) -> bool {
        self.request_line.is_some()
    }

    /// The first request line seen, without its line terminator.
    pub fn request_line(&self) -> Option<&str> {
        self.request_line.as_deref()
    }

    /// Inspects everything held so far.
    ///
    /// Returns the request line only on the call that first detects it.
    pub fn inspect(&mut self, held: &[u8]) -> Option<&str> {
        if self.request_line.is_some() {
            return None;
        }

        if !REQUEST_LINE_MARKERS
            .iter()
            .any(|marker| contains(held, marker))
        {
            return None;
        }

        // A marker ends in CRLF, so there is always a CR to stop at.
        let end = held.iter().position(|&b| b == b'\r').unwrap_or(held.len());
        self.request_line = Some(String::from_utf8_lossy(&held[..end]).into_owned());
        self.request_line.as_deref()
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
