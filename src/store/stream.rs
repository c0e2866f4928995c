//! Lazily decompressed object content

use crate::model::ObjectId;
use crate::store::codec::ObjectHeader;
use std::fs::File;
use std::io::{self, BufReader, Chain, Cursor, Read};
use tracing::trace;
use zstd::stream::read::Decoder;

pub(crate) type ObjectDecoder = Decoder<'static, BufReader<File>>;

/// Content of a stored object, decompressed as it is read
///
/// Yields first the bytes the header parser read past the terminator, then
/// the rest of the decompression stream. The declared content length is
/// enforced: a short stream fails with [`io::ErrorKind::UnexpectedEof`], and
/// bytes past the declared length fail with [`io::ErrorKind::InvalidData`].
///
/// The file handle and decompressor are held until [`release`] is called or
/// the stream is dropped, whichever comes first.
///
/// [`release`]: ContentStream::release
pub struct ContentStream {
    id: ObjectId,
    header: ObjectHeader,
    remaining: u64,
    source: Chain<Cursor<Vec<u8>>, ObjectDecoder>,
}

impl ContentStream {
    pub(crate) fn new(
        id: ObjectId,
        header: ObjectHeader,
        leftover: Vec<u8>,
        decoder: ObjectDecoder,
    ) -> Self {
        trace!(%id, size = header.size, buffered = leftover.len(), "content stream opened");
        let remaining = header.size;
        ContentStream {
            id,
            header,
            remaining,
            source: Cursor::new(leftover).chain(decoder),
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn header(&self) -> &ObjectHeader {
        &self.header
    }

    /// Content bytes not yet read
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Close the decompressor and the underlying file.
    ///
    /// Valid at any point: after exhaustion, after a read error, or part way
    /// through the content.
    pub fn release(self) {
        drop(self)
    }
}

impl Read for ContentStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }

        if self.remaining == 0 {
            let mut probe = [0u8; 1];
            return match self.source.read(&mut probe)? {
                0 => Ok(0),
                _ => Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "object {} has content past its declared length {}",
                        self.id, self.header.size
                    ),
                )),
            };
        }

        let want = (buf.len() as u64).min(self.remaining) as usize;
        let n = self.source.read(&mut buf[..want])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "object {} truncated: {} of {} content bytes missing",
                    self.id, self.remaining, self.header.size
                ),
            ));
        }
        self.remaining -= n as u64;
        Ok(n)
    }
}

impl Drop for ContentStream {
    fn drop(&mut self) {
        trace!(id = %self.id, remaining = self.remaining, "content stream released");
    }
}

impl std::fmt::Debug for ContentStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentStream")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("remaining", &self.remaining)
            .finish_non_exhaustive()
    }
}
