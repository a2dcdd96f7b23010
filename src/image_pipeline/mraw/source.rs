//! Byte sources an MRAW stream can be read from.

use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;

use tracing::trace;

use crate::image_pipeline::common::error::{MrawError, Result};

/// Anything that can hand out "N bytes at offset O".
pub trait ByteSource {
    /// Fills `buf` with the bytes starting at `offset`.
    ///
    /// Fails with `ShortRead` when the source ends before `buf` is full. The
    /// contents of `buf` are unspecified after a failure.
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Total number of bytes in the source.
    fn byte_len(&mut self) -> Result<u64>;
}

/// Adapter for any `Read + Seek` stream: one seek, then one read of the
/// requested length.
#[derive(Debug)]
pub struct SeekableSource<R> {
    inner: R,
}

impl<R: Read + Seek> SeekableSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl SeekableSource<File> {
    /// Opens an MRAW file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MrawError::InputReadError(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(file))
    }
}

impl<R: Read + Seek> ByteSource for SeekableSource<R> {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;

        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        trace!(offset, requested = buf.len(), filled, "Read from seekable source");

        if filled < buf.len() {
            return Err(MrawError::ShortRead {
                offset,
                expected: buf.len(),
                available: filled,
            });
        }
        Ok(())
    }

    fn byte_len(&mut self) -> Result<u64> {
        Ok(self.inner.seek(SeekFrom::End(0))?)
    }
}

/// A read-only view over bytes already in memory.
///
/// Unlike [`SeekableSource`] this is `Copy` and `Sync`, so one buffer can
/// back many concurrent decodes of different frames.
#[derive(Debug, Clone, Copy)]
pub struct MemorySource<'a> {
    bytes: &'a [u8],
}

impl<'a> MemorySource<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Borrows `len` bytes at `offset` without copying.
    pub fn slice_at(&self, offset: u64, len: usize) -> Result<&'a [u8]> {
        let total = self.bytes.len();
        let start = usize::try_from(offset).unwrap_or(usize::MAX).min(total);
        let available = total - start;
        if available < len {
            return Err(MrawError::ShortRead {
                offset,
                expected: len,
                available,
            });
        }
        Ok(&self.bytes[start..start + len])
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl ByteSource for MemorySource<'_> {
    fn read_exact_at(&mut self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let src = self.slice_at(offset, buf.len())?;
        buf.copy_from_slice(src);
        Ok(())
    }

    fn byte_len(&mut self) -> Result<u64> {
        Ok(self.bytes.len() as u64)
    }
}
