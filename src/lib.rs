//! # minigit
//!
//! A minimal content-addressable object store: the layer a git-like tool
//! builds on.
//!
//! Byte payloads are persisted under the SHA-1 digest of their encoded form
//! and read back by that digest, either whole or as a lazily decompressed
//! stream.
//!
//! ## Core Concepts
//!
//! - **Repository layout**: the `.minigit` directory skeleton, created with
//!   [`RepoLayout::create`] and found again from any subdirectory with
//!   [`RepoLayout::discover`]
//! - **Objects**: a type tag plus content, encoded as `type SP length NUL
//!   content` and stored zstd-compressed at `objects/<2 hex>/<38 hex>`
//! - **Object ids**: 40-character lowercase hex SHA-1 of the encoded form
//!
//! ## Example
//!
//! ```no_run
//! use minigit::{ObjectStore, RepoLayout};
//!
//! # fn main() -> minigit::Result<()> {
//! let layout = RepoLayout::discover(".")?;
//! let store = ObjectStore::open(layout)?;
//! let id = store.write_blob("hello world")?;
//! assert_eq!(store.read(&id)?.content, b"hello world");
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod model;
pub mod repository;
pub mod store;

mod error;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use model::{IntoObjectId, ObjectId, ObjectKind, TypeTag};
pub use repository::{RepoLayout, MARKER_DIR};
pub use store::{
    decode_header, encode_header, ContentStream, HeaderError, Object, ObjectHeader, ObjectStore,
};
