use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::ConnectionError;

/// Writes one response fragment, resuming after partial writes.
pub struct ResponseWriter<'a> {
    buffer: &'a [u8],
    written: usize,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(buffer: &'a [u8]) -> Self {
        Self { buffer, written: 0 }
    }

    pub async fn write_to_stream<W>(&mut self, stream: &mut W) -> Result<(), ConnectionError>
    where
        W: AsyncWrite + Unpin,
    {
        while self.written < self.buffer.len() {
            let n = match stream.write(&self.buffer[self.written..]).await {
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(ConnectionError::Write(e)),
            };

            if n == 0 {
                return Err(ConnectionError::Write(std::io::Error::new(
                    std::io::ErrorKind::WriteZero,
                    "connection closed while writing",
                )));
            }

            self.written += n;
        }

        Ok(())
    }
}
