/// Fixed-capacity store for client input.
///
/// Bytes are retained until `capacity` is reached. After that, reads land in a
/// scratch region of the same size that is overwritten each time, so the
/// socket keeps draining while the retained prefix stays untouched.
#[derive(Debug)]
pub struct InputBuffer {
    data: Vec<u8>,
    held: usize,
    scratch: Vec<u8>,
}

impl InputBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: vec![0; capacity],
            held: 0,
            scratch: vec![0; capacity.max(1)],
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of retained bytes.
    pub fn held(&self) -> usize {
        self.held
    }

    pub fn is_full(&self) -> bool {
        self.held == self.data.len()
    }

    /// The retained bytes, oldest first.
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.held]
    }

    /// Destination for the next read and whether bytes written there are kept.
    ///
    /// Never returns an empty slice, so a zero-length read always means EOF.
    pub fn spare_mut(&mut self) -> (&mut [u8], bool) {
        if self.is_full() {
            (&mut self.scratch[..], false)
        } else {
            (&mut self.data[self.held..], true)
        }
    }

    /// Marks `n` bytes of the spare region as retained.
    pub fn commit(&mut self, n: usize) {
        self.held = (self.held + n).min(self.data.len());
    }

    /// Scratch space for reads whose content is thrown away.
    pub fn discard_mut(&mut self) -> &mut [u8] {
        &mut self.scratch[..]
    }
}
