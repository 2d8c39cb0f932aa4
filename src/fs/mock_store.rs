use std::io;

use crate::fs::store::ByteStore;

/// In-memory byte store used by tests and demos.
pub struct MockStore {
    buf: Vec<u8>,
}

impl MockStore {
    pub fn new(size: usize) -> Self {
        MockStore { buf: vec![0u8; size] }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    fn check_range(&self, offset: u64, len: usize) -> io::Result<usize> {
        let start = offset as usize;
        let end = start.checked_add(len).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "offset overflow")
        })?;
        if end > self.buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "access past end of store",
            ));
        }
        Ok(start)
    }
}

impl ByteStore for MockStore {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<()> {
        let start = self.check_range(offset, buf.len())?;
        buf.copy_from_slice(&self.buf[start..start + buf.len()]);
        Ok(())
    }

    fn write_at(&mut self, offset: u64, data: &[u8]) -> io::Result<()> {
        let start = self.check_range(offset, data.len())?;
        self.buf[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    fn size(&mut self) -> io::Result<u64> {
        Ok(self.buf.len() as u64)
    }
}
