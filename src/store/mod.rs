//! Content-addressed object store
//!
//! Objects are stored as loose files keyed by the SHA-1 of their encoded
//! form (`type SP length NUL content`) and compressed with zstd.

pub mod codec;
mod file_store;
mod object;
mod stream;

pub use codec::{decode_header, encode_header, HeaderError, ObjectHeader};
pub use file_store::ObjectStore;
pub use object::Object;
pub use stream::ContentStream;
