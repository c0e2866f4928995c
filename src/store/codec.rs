//! Object header encoding
//!
//! Encoded form:
//! ```text
//! <type> SP <decimal length> NUL <content bytes>
//! ```
//!
//! The digest of an object is the SHA-1 of this whole encoded form, and the
//! stored file is its zstd compression.

use crate::model::ObjectKind;
use std::io::{self, Read};
use thiserror::Error;

/// Default cap on how many decompressed bytes the incremental parser will
/// buffer while looking for the header terminator.
pub const DEFAULT_HEADER_LIMIT: usize = 512;

const READ_CHUNK: usize = 64;

/// Parsed object header
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObjectHeader {
    pub kind: ObjectKind,
    /// Declared content length in bytes
    pub size: u64,
}

/// Reasons a header fails to decode
#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("missing space after object type")]
    MissingSpace,

    #[error("missing NUL after content length")]
    MissingNul,

    #[error("invalid object type {0:?}")]
    InvalidType(String),

    #[error("invalid content length {0:?}")]
    InvalidLength(String),

    #[error("header exceeds {0} bytes")]
    TooLong(usize),

    #[error("read failed while parsing header: {0}")]
    Io(#[from] io::Error),
}

/// Encode `type SP length NUL`.
pub fn encode_header(kind: &ObjectKind, size: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(kind.as_str().len() + 22);
    out.extend_from_slice(kind.as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(size.to_string().as_bytes());
    out.push(0);
    out
}

/// Decode a header from the start of `bytes`.
///
/// Returns the header and the number of bytes it occupied, so the content
/// starts at `bytes[header_len..]`.
pub fn decode_header(bytes: &[u8]) -> Result<(ObjectHeader, usize), HeaderError> {
    let space = bytes
        .iter()
        .position(|&b| b == b' ')
        .ok_or(HeaderError::MissingSpace)?;
    let nul = bytes[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| space + 1 + i)
        .ok_or(HeaderError::MissingNul)?;

    let type_bytes = &bytes[..space];
    let kind = ObjectKind::from_bytes(type_bytes).ok_or_else(|| {
        HeaderError::InvalidType(String::from_utf8_lossy(type_bytes).into_owned())
    })?;

    let size = parse_length(&bytes[space + 1..nul])?;

    Ok((ObjectHeader { kind, size }, nul + 1))
}

/// Canonical decimal only: digits, no sign, no leading zeros except "0".
fn parse_length(field: &[u8]) -> Result<u64, HeaderError> {
    let invalid = || HeaderError::InvalidLength(String::from_utf8_lossy(field).into_owned());

    if field.is_empty() || !field.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    if field.len() > 1 && field[0] == b'0' {
        return Err(invalid());
    }
    // all ASCII digits, so utf8 cannot fail
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or_else(invalid)
}

/// Pull bytes from `reader` until the header terminator shows up.
///
/// Reads in small chunks and never buffers more than `limit` bytes (plus one
/// chunk) looking for the NUL. Any bytes read past the header are returned
/// so the caller can replay them ahead of the rest of the stream.
pub fn read_header<R: Read>(
    reader: &mut R,
    limit: usize,
) -> Result<(ObjectHeader, Vec<u8>), HeaderError> {
    let mut buf: Vec<u8> = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    loop {
        let scanned = buf.len();
        let n = match reader.read(&mut chunk) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            // stream ended before the terminator; let decode pick the error
            return decode_header(&buf).map(|(header, _)| (header, Vec::new()));
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(i) = buf[scanned..].iter().position(|&b| b == 0) {
            let end = scanned + i + 1;
            if end > limit {
                return Err(HeaderError::TooLong(limit));
            }
            let (header, header_len) = decode_header(&buf[..end])?;
            debug_assert_eq!(header_len, end);
            let rest = buf.split_off(end);
            return Ok((header, rest));
        }
        if buf.len() >= limit {
            return Err(HeaderError::TooLong(limit));
        }
    }
}
